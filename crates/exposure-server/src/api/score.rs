//! Score endpoint: lenient request coercion, feature assembly, scoring,
//! and advice in one response.
//!
//! Every request field is optional and individually coerced; a field that
//! is present but untypeable reverts to its default with a warning. The
//! only hard failure is a body that is not a JSON object.

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use chrono::{Local, Timelike, Utc};
use serde_json::{json, Map, Value};
use std::collections::BTreeSet;
use std::sync::Arc;

use exposure_core::features::defaults;
use exposure_core::{assemble, ConditionId, EnvSnapshot, HealthProfile, RouteInfo, SnapshotSource};

use crate::state::AppState;

/// Fully coerced score request. `None` means the field was absent or
/// untypeable; defaulting happens in feature assembly.
#[derive(Debug, Default)]
pub(crate) struct ScoreRequest {
    pub lat: Option<f64>,
    pub lon: Option<f64>,
    pub route: Option<RouteInfo>,
    pub profile: Option<HealthProfile>,
    /// Client-supplied readings, used only when no coordinates are given
    pub env: Option<EnvSnapshot>,
    pub hour_of_day: Option<u32>,
    pub is_weekend: bool,
}

pub async fn score(
    State(state): State<Arc<AppState>>,
    body: Result<Json<Value>, JsonRejection>,
) -> impl IntoResponse {
    let payload = match body {
        Ok(Json(payload)) => payload,
        Err(rejection) => {
            return (
                StatusCode::BAD_REQUEST,
                Json(json!({
                    "error": "Malformed request body",
                    "detail": rejection.body_text(),
                    "timestamp": Utc::now().to_rfc3339(),
                })),
            );
        }
    };

    let request = match parse_score_request(&payload) {
        Ok(request) => request,
        Err(message) => {
            return (
                StatusCode::BAD_REQUEST,
                Json(json!({
                    "error": message,
                    "timestamp": Utc::now().to_rfc3339(),
                })),
            );
        }
    };

    let hour = request
        .hour_of_day
        .unwrap_or_else(|| Local::now().hour());

    // Coordinates take precedence over client-supplied readings
    let snapshot = match (request.lat, request.lon) {
        (Some(lat), Some(lon)) => Some(state.fetcher.get_at_hour(lat, lon, hour).await),
        _ => request.env.clone(),
    };

    let features = assemble(
        request.route.as_ref(),
        request.profile.as_ref(),
        snapshot.as_ref(),
        hour,
        request.is_weekend,
    );

    let outcome = state.scoring.score(&features);
    let advice = state.advice.advise(&features);
    let risk_profile = HealthProfile {
        age: features.age,
        conditions: features.conditions.clone(),
        sensitivity_level: features.sensitivity_level,
        has_respiratory_issues: features.has_respiratory_issues,
        prefer_green_routes: features.prefer_green_routes,
    };
    let risk_factor = state.conditions.risk_factor(&risk_profile);

    (
        StatusCode::OK,
        Json(json!({
            "score": outcome.score,
            "method": outcome.method,
            "risk_factor": risk_factor,
            "advice": advice,
            "snapshot": snapshot,
            "timestamp": Utc::now().to_rfc3339(),
        })),
    )
}

/// Coerce a JSON object into a [`ScoreRequest`]. Only a non-object body
/// is an error; everything else degrades per field.
pub(crate) fn parse_score_request(payload: &Value) -> Result<ScoreRequest, &'static str> {
    let obj = payload
        .as_object()
        .ok_or("Request body must be a JSON object")?;

    let lat = coerce_f64(obj, &["lat", "latitude", "start_lat"])
        .filter(|lat| (-90.0..=90.0).contains(lat));
    let lon = coerce_f64(obj, &["lon", "longitude", "start_lon"])
        .filter(|lon| (-180.0..=180.0).contains(lon));

    let distance_km =
        coerce_f64(obj, &["distance_km", "route_distance"]).filter(|distance| *distance > 0.0);
    let duration_min =
        coerce_f64(obj, &["duration_min", "route_duration"]).filter(|duration| *duration > 0.0);
    let green_score =
        coerce_f64(obj, &["green_score"]).filter(|score| (0.0..=1.0).contains(score));
    let route = if distance_km.is_some() || duration_min.is_some() || green_score.is_some() {
        Some(RouteInfo {
            distance_km: distance_km.unwrap_or(defaults::DISTANCE_KM),
            duration_min: duration_min.unwrap_or(defaults::DURATION_MIN),
            green_score,
        })
    } else {
        None
    };

    let age = coerce_f64(obj, &["age", "user_age"])
        .filter(|age| (0.0..=130.0).contains(age))
        .map(|age| age as u32);
    let sensitivity_level = coerce_f64(obj, &["sensitivity_level"])
        .filter(|level| (1.0..=4.0).contains(level))
        .map(|level| level as u8);
    let has_respiratory_issues = coerce_bool(obj, &["has_respiratory_issues"]);
    let prefer_green_routes = coerce_bool(obj, &["prefer_green_routes"]);
    let conditions = coerce_conditions(obj);
    let profile = if age.is_some()
        || sensitivity_level.is_some()
        || has_respiratory_issues.is_some()
        || prefer_green_routes.is_some()
        || !conditions.is_empty()
    {
        Some(HealthProfile {
            age: age.unwrap_or(defaults::AGE),
            conditions,
            sensitivity_level: sensitivity_level.unwrap_or(defaults::SENSITIVITY_LEVEL),
            has_respiratory_issues: has_respiratory_issues
                .unwrap_or(defaults::HAS_RESPIRATORY_ISSUES),
            prefer_green_routes: prefer_green_routes.unwrap_or(defaults::PREFER_GREEN_ROUTES),
        })
    } else {
        None
    };

    let aqi = coerce_f64(obj, &["aqi"]).map(|aqi| aqi.clamp(0.0, 500.0));
    let pm25 = coerce_f64(obj, &["pm25", "pm2_5"]).filter(|v| *v >= 0.0);
    let pm10 = coerce_f64(obj, &["pm10"]).filter(|v| *v >= 0.0);
    let traffic_level =
        coerce_f64(obj, &["traffic_level"]).filter(|level| (0.0..=1.0).contains(level));
    let env = if aqi.is_some() || pm25.is_some() || pm10.is_some() || traffic_level.is_some() {
        Some(EnvSnapshot {
            aqi: aqi.unwrap_or(defaults::AQI) as u16,
            pm25: pm25.unwrap_or(defaults::PM25),
            pm10: pm10.unwrap_or(defaults::PM10),
            no2: 0.0,
            o3: 0.0,
            so2: 0.0,
            co: 0.0,
            traffic_level: traffic_level.unwrap_or(defaults::TRAFFIC_LEVEL),
            source: SnapshotSource::Fallback,
            fetched_at: Utc::now(),
        })
    } else {
        None
    };

    let hour_of_day = coerce_f64(obj, &["hour_of_day"])
        .filter(|hour| (0.0..24.0).contains(hour))
        .map(|hour| hour as u32);
    let is_weekend = coerce_bool(obj, &["is_weekend"]).unwrap_or(false);

    Ok(ScoreRequest {
        lat,
        lon,
        route,
        profile,
        env,
        hour_of_day,
        is_weekend,
    })
}

/// First matching key wins. Numbers pass through; numeric strings are
/// parsed; anything else is logged and dropped.
fn coerce_f64(obj: &Map<String, Value>, keys: &[&str]) -> Option<f64> {
    for key in keys {
        let Some(value) = obj.get(*key) else {
            continue;
        };
        match value {
            Value::Number(number) => return number.as_f64(),
            Value::String(text) => {
                if let Ok(parsed) = text.trim().parse::<f64>() {
                    return Some(parsed);
                }
                tracing::warn!(field = *key, value = %text, "untypeable numeric field, using default");
                return None;
            }
            other => {
                tracing::warn!(field = *key, value = %other, "untypeable numeric field, using default");
                return None;
            }
        }
    }
    None
}

fn coerce_bool(obj: &Map<String, Value>, keys: &[&str]) -> Option<bool> {
    for key in keys {
        let Some(value) = obj.get(*key) else {
            continue;
        };
        match value {
            Value::Bool(flag) => return Some(*flag),
            Value::Number(number) => return number.as_f64().map(|n| n != 0.0),
            Value::String(text) => match text.trim().to_ascii_lowercase().as_str() {
                "true" | "1" | "yes" => return Some(true),
                "false" | "0" | "no" => return Some(false),
                _ => {
                    tracing::warn!(field = *key, value = %text, "untypeable boolean field, using default");
                    return None;
                }
            },
            other => {
                tracing::warn!(field = *key, value = %other, "untypeable boolean field, using default");
                return None;
            }
        }
    }
    None
}

/// Conditions arrive as an array of names; unknown names are dropped with
/// a warning rather than failing the request.
fn coerce_conditions(obj: &Map<String, Value>) -> BTreeSet<ConditionId> {
    let mut conditions = BTreeSet::new();
    for key in ["conditions", "health_conditions"] {
        let Some(Value::Array(entries)) = obj.get(key) else {
            continue;
        };
        for entry in entries {
            match serde_json::from_value::<ConditionId>(entry.clone()) {
                Ok(condition) => {
                    conditions.insert(condition);
                }
                Err(_) => {
                    tracing::warn!(value = %entry, "unknown condition, ignoring");
                }
            }
        }
        break;
    }
    conditions
}
