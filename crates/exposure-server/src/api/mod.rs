//! API routes for the exposure server.

mod routes;
pub mod score;

use axum::Router;

pub fn routes() -> Router<std::sync::Arc<crate::state::AppState>> {
    routes::create_router()
}
