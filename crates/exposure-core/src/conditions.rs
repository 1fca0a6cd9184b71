//! Condition-sensitivity table shared by the advice engine.
//!
//! Built once at startup and passed by reference; the table itself is
//! immutable for the life of the process.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::models::{ConditionId, HealthProfile};

/// How strongly a condition is affected by pollution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PollutionRisk {
    Low,
    Moderate,
    High,
    VeryHigh,
}

/// Sensitivity data for a single condition.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ConditionProfile {
    /// Multiplier applied to AQI-driven risk, always >= 1.0
    pub aqi_sensitivity: f64,
    pub pollution_risk: PollutionRisk,
}

/// Static mapping from condition to its sensitivity profile.
#[derive(Debug, Clone)]
pub struct ConditionTable {
    entries: BTreeMap<ConditionId, ConditionProfile>,
}

impl Default for ConditionTable {
    fn default() -> Self {
        use ConditionId::*;
        use PollutionRisk::*;

        let entries = BTreeMap::from([
            (Asthma, ConditionProfile { aqi_sensitivity: 2.0, pollution_risk: High }),
            (Copd, ConditionProfile { aqi_sensitivity: 2.5, pollution_risk: VeryHigh }),
            (HeartDisease, ConditionProfile { aqi_sensitivity: 1.8, pollution_risk: High }),
            (Pregnancy, ConditionProfile { aqi_sensitivity: 1.5, pollution_risk: Moderate }),
            (Diabetes, ConditionProfile { aqi_sensitivity: 1.3, pollution_risk: Moderate }),
            (Hypertension, ConditionProfile { aqi_sensitivity: 1.4, pollution_risk: Moderate }),
            (Allergies, ConditionProfile { aqi_sensitivity: 1.7, pollution_risk: High }),
            (None, ConditionProfile { aqi_sensitivity: 1.0, pollution_risk: Low }),
        ]);
        Self { entries }
    }
}

impl ConditionTable {
    /// Look up the profile for a condition, if the table knows it.
    pub fn get(&self, condition: ConditionId) -> Option<&ConditionProfile> {
        self.entries.get(&condition)
    }

    /// Iterate all known conditions in stable order.
    pub fn iter(&self) -> impl Iterator<Item = (&ConditionId, &ConditionProfile)> {
        self.entries.iter()
    }

    /// Overall risk multiplier for a profile.
    ///
    /// Combines an age factor, each condition's AQI sensitivity, and the
    /// declared sensitivity level. Capped at 5.0.
    pub fn risk_factor(&self, profile: &HealthProfile) -> f64 {
        let mut risk = 1.0;

        if profile.age < 12 || profile.age > 65 {
            risk *= 1.5;
        }

        for condition in &profile.conditions {
            if let Some(entry) = self.get(*condition) {
                risk *= entry.aqi_sensitivity;
            }
        }

        risk *= match profile.sensitivity_level {
            1 => 1.0,
            2 => 1.2,
            3 => 1.5,
            4 => 2.0,
            _ => 1.0,
        };

        risk.min(5.0)
    }
}
