//! REST API routes.

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use chrono::Utc;
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;

use crate::api::score;
use crate::state::AppState;

/// Create the API router.
pub fn create_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/v1/score", post(score::score))
        .route("/v1/env", get(get_env))
        .route("/v1/conditions", get(list_conditions))
}

#[derive(Debug, Deserialize)]
struct EnvQuery {
    lat: f64,
    lon: f64,
}

/// Current environmental snapshot for a coordinate (cached or fetched).
async fn get_env(
    State(state): State<Arc<AppState>>,
    Query(query): Query<EnvQuery>,
) -> impl IntoResponse {
    if !(-90.0..=90.0).contains(&query.lat) || !(-180.0..=180.0).contains(&query.lon) {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({
                "error": "Coordinates out of range",
                "timestamp": Utc::now().to_rfc3339(),
            })),
        );
    }

    let snapshot = state.fetcher.get(query.lat, query.lon).await;
    (StatusCode::OK, Json(json!(snapshot)))
}

/// Read-only listing of the condition-sensitivity table.
async fn list_conditions(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let entries: Vec<_> = state
        .conditions
        .iter()
        .map(|(condition, profile)| {
            json!({
                "condition": condition,
                "aqi_sensitivity": profile.aqi_sensitivity,
                "pollution_risk": profile.pollution_risk,
            })
        })
        .collect();

    Json(json!({ "conditions": entries }))
}
