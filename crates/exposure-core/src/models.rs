//! Core data models for the health exposure service.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Where an environmental snapshot came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SnapshotSource {
    /// Fetched from an upstream provider
    Live,
    /// Synthesized because providers were unavailable
    Fallback,
}

/// A normalized environmental reading for one location.
///
/// Immutable once created; the cache hands out copies, never references
/// into its own storage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnvSnapshot {
    /// Air Quality Index, 0 (best) to 500 (worst)
    pub aqi: u16,
    #[serde(default)]
    pub pm25: f64,
    #[serde(default)]
    pub pm10: f64,
    #[serde(default)]
    pub no2: f64,
    #[serde(default)]
    pub o3: f64,
    #[serde(default)]
    pub so2: f64,
    #[serde(default)]
    pub co: f64,
    /// Congestion level, 0.0 (free flow) to 1.0 (standstill)
    pub traffic_level: f64,
    pub source: SnapshotSource,
    pub fetched_at: DateTime<Utc>,
}

/// Health conditions known to the condition-sensitivity table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConditionId {
    Asthma,
    Copd,
    HeartDisease,
    Pregnancy,
    Diabetes,
    Hypertension,
    Allergies,
    None,
}

impl ConditionId {
    /// Human-readable name used in advisory messages.
    pub fn display_name(&self) -> &'static str {
        match self {
            ConditionId::Asthma => "asthma",
            ConditionId::Copd => "COPD",
            ConditionId::HeartDisease => "heart disease",
            ConditionId::Pregnancy => "pregnancy",
            ConditionId::Diabetes => "diabetes",
            ConditionId::Hypertension => "hypertension",
            ConditionId::Allergies => "allergies",
            ConditionId::None => "no condition",
        }
    }
}

/// A rider's health profile, supplied per request and never persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthProfile {
    pub age: u32,
    #[serde(default)]
    pub conditions: BTreeSet<ConditionId>,
    /// Personal pollution susceptibility, 1 (low) to 4 (high)
    pub sensitivity_level: u8,
    #[serde(default)]
    pub has_respiratory_issues: bool,
    #[serde(default = "default_prefer_green")]
    pub prefer_green_routes: bool,
}

fn default_prefer_green() -> bool {
    true
}

/// Metadata for the route being scored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteInfo {
    pub distance_km: f64,
    pub duration_min: f64,
    /// Share of the route through green areas, 0.0 to 1.0
    #[serde(default)]
    pub green_score: Option<f64>,
}

/// Which scoring path produced the result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoreMethod {
    MlModel,
    RuleBased,
}

/// Category of an advisory item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AdviceKind {
    Warning,
    Health,
    Route,
    Tip,
}

/// Advisory priority, used for sorting (high first).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    High,
    Medium,
    Low,
}

impl Priority {
    /// Sort rank: high 0, medium 1, low 2.
    pub fn rank(&self) -> u8 {
        match self {
            Priority::High => 0,
            Priority::Medium => 1,
            Priority::Low => 2,
        }
    }
}

/// A single human-readable recommendation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdviceItem {
    pub kind: AdviceKind,
    pub message: String,
    pub priority: Priority,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn score_method_serializes_to_wire_names() {
        assert_eq!(
            serde_json::to_value(ScoreMethod::MlModel).unwrap(),
            serde_json::json!("ml_model")
        );
        assert_eq!(
            serde_json::to_value(ScoreMethod::RuleBased).unwrap(),
            serde_json::json!("rule_based")
        );
    }

    #[test]
    fn condition_ids_parse_from_snake_case() {
        let parsed: ConditionId = serde_json::from_value(serde_json::json!("heart_disease")).unwrap();
        assert_eq!(parsed, ConditionId::HeartDisease);
    }

    #[test]
    fn priority_ranks_are_ordered() {
        assert!(Priority::High.rank() < Priority::Medium.rank());
        assert!(Priority::Medium.rank() < Priority::Low.rank());
    }
}
