//! Dual-path scoring engine.
//!
//! Prefers a loaded [`Scorer`] (a learned model behind a one-method
//! capability) and falls back to the rule-based formula when no scorer is
//! loaded or a prediction fails. Both paths run through the same
//! post-processing, so the invariants (score in [0,100], extreme-AQI caps)
//! hold regardless of which path produced the raw value.

use thiserror::Error;

use crate::features::FeatureRecord;
use crate::models::ScoreMethod;

/// Failure reported by a scorer. Absorbed per call; the engine falls back
/// to the rule path without disabling the scorer for later requests.
#[derive(Debug, Error)]
pub enum ScorerError {
    #[error("prediction failed: {0}")]
    Prediction(String),
    #[error("model not ready")]
    NotReady,
}

/// Capability contract for a learned model.
///
/// How the model is trained or loaded is out of scope here; anything that
/// can map a feature record to a raw score plugs in.
pub trait Scorer: Send + Sync {
    fn predict(&self, features: &FeatureRecord) -> Result<f64, ScorerError>;
}

/// Result of scoring one feature record.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoreOutcome {
    pub score: f64,
    pub method: ScoreMethod,
}

/// Scoring engine with an optional learned-model scorer.
pub struct ScoringEngine {
    scorer: Option<Box<dyn Scorer>>,
}

impl ScoringEngine {
    /// Engine with no model loaded; every request takes the rule path.
    pub fn new() -> Self {
        Self { scorer: None }
    }

    /// Engine that delegates to the given scorer when it succeeds.
    pub fn with_scorer(scorer: Box<dyn Scorer>) -> Self {
        Self {
            scorer: Some(scorer),
        }
    }

    pub fn has_scorer(&self) -> bool {
        self.scorer.is_some()
    }

    /// Score a feature record. Never fails; always returns a value in
    /// [0, 100] and the method that produced it.
    pub fn score(&self, features: &FeatureRecord) -> ScoreOutcome {
        if let Some(scorer) = &self.scorer {
            match scorer.predict(features) {
                Ok(raw) if raw.is_finite() => {
                    return ScoreOutcome {
                        score: post_process(raw, features),
                        method: ScoreMethod::MlModel,
                    };
                }
                Ok(raw) => {
                    tracing::warn!(raw, "scorer returned non-finite value, using rule path");
                }
                Err(err) => {
                    tracing::warn!(error = %err, "scorer failed, using rule path");
                }
            }
        }

        ScoreOutcome {
            score: post_process(rule_based_score(features), features),
            method: ScoreMethod::RuleBased,
        }
    }
}

impl Default for ScoringEngine {
    fn default() -> Self {
        Self::new()
    }
}

/// Fixed-formula fallback score.
pub fn rule_based_score(f: &FeatureRecord) -> f64 {
    let mut score = 100.0;

    // AQI penalty kicks in above the "good" band
    score -= (f.aqi - 50.0).max(0.0) * 0.15;

    // Shorter routes are better; both penalties cap at 15 points
    score -= ((f.distance_km - 2.0).max(0.0) * 0.5).min(15.0);
    score -= ((f.duration_min - 15.0).max(0.0) * 0.3).min(15.0);

    if f.age < 12 || f.age > 65 {
        score *= 0.9;
    }

    if f.has_respiratory_issues {
        score *= 0.85;
    }

    score *= sensitivity_multiplier(f.sensitivity_level);

    if f.prefer_green_routes && f.aqi < 50.0 {
        score *= 1.1;
    }

    score.clamp(0.0, 100.0)
}

/// Rule-path multiplier per declared sensitivity level. Levels outside
/// 1..=4 get no multiplier.
fn sensitivity_multiplier(level: u8) -> f64 {
    match level {
        1 => 1.0,
        2 => 0.9,
        3 => 0.8,
        4 => 0.7,
        _ => 1.0,
    }
}

/// Post-processing applied identically after either path.
///
/// Order matters: extreme-AQI ceiling first (descending thresholds, first
/// match wins), then the sensitivity adjustment, then the final clamp.
pub fn post_process(raw: f64, f: &FeatureRecord) -> f64 {
    let mut score = raw;

    if f.aqi > 200.0 {
        score = score.min(30.0);
    } else if f.aqi > 150.0 {
        score = score.min(50.0);
    }

    if f.sensitivity_level >= 4 {
        score *= 0.8;
    } else if f.sensitivity_level <= 1 {
        score *= 1.1;
    }

    score.clamp(0.0, 100.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::assemble;
    use crate::models::{HealthProfile, RouteInfo};

    struct FixedScorer(f64);

    impl Scorer for FixedScorer {
        fn predict(&self, _features: &FeatureRecord) -> Result<f64, ScorerError> {
            Ok(self.0)
        }
    }

    struct FailingScorer;

    impl Scorer for FailingScorer {
        fn predict(&self, _features: &FeatureRecord) -> Result<f64, ScorerError> {
            Err(ScorerError::Prediction("artifact missing".into()))
        }
    }

    fn features(aqi: f64, sensitivity: u8) -> FeatureRecord {
        let mut f = assemble(None, None, None, 12, false);
        f.aqi = aqi;
        f.sensitivity_level = sensitivity;
        f
    }

    #[test]
    fn golden_rule_based_scenario() {
        let route = RouteInfo {
            distance_km: 3.5,
            duration_min: 25.0,
            green_score: None,
        };
        let profile = HealthProfile {
            age: 35,
            conditions: Default::default(),
            sensitivity_level: 2,
            has_respiratory_issues: false,
            prefer_green_routes: true,
        };
        let mut f = assemble(Some(&route), Some(&profile), None, 12, false);
        f.aqi = 45.0;

        // 100 - 0 (aqi) - 0.75 (distance) - 3.0 (duration), *0.9, *1.1
        let outcome = ScoringEngine::new().score(&f);
        assert_eq!(outcome.method, ScoreMethod::RuleBased);
        assert!((outcome.score - 95.2875).abs() < 1e-6);
    }

    #[test]
    fn extreme_aqi_caps_rule_path() {
        let engine = ScoringEngine::new();
        let severe = engine.score(&features(250.0, 2));
        assert!(severe.score <= 30.0);

        let unhealthy = engine.score(&features(180.0, 2));
        assert!(unhealthy.score <= 50.0);
    }

    #[test]
    fn extreme_aqi_caps_learned_path() {
        let engine = ScoringEngine::with_scorer(Box::new(FixedScorer(95.0)));
        let severe = engine.score(&features(250.0, 2));
        assert_eq!(severe.method, ScoreMethod::MlModel);
        assert!(severe.score <= 30.0);

        let unhealthy = engine.score(&features(180.0, 2));
        assert!(unhealthy.score <= 50.0);
    }

    #[test]
    fn learned_prediction_is_clamped() {
        let engine = ScoringEngine::with_scorer(Box::new(FixedScorer(250.0)));
        let outcome = engine.score(&features(40.0, 2));
        assert_eq!(outcome.method, ScoreMethod::MlModel);
        assert_eq!(outcome.score, 100.0);

        let engine = ScoringEngine::with_scorer(Box::new(FixedScorer(-50.0)));
        assert_eq!(engine.score(&features(40.0, 2)).score, 0.0);
    }

    #[test]
    fn failing_scorer_falls_back_per_call() {
        let engine = ScoringEngine::with_scorer(Box::new(FailingScorer));
        let outcome = engine.score(&features(45.0, 2));
        assert_eq!(outcome.method, ScoreMethod::RuleBased);
        assert!(outcome.score >= 0.0 && outcome.score <= 100.0);

        // Still falls back on the next call, scorer stays loaded
        assert!(engine.has_scorer());
        assert_eq!(engine.score(&features(45.0, 2)).method, ScoreMethod::RuleBased);
    }

    #[test]
    fn non_finite_prediction_falls_back() {
        let engine = ScoringEngine::with_scorer(Box::new(FixedScorer(f64::NAN)));
        let outcome = engine.score(&features(45.0, 2));
        assert_eq!(outcome.method, ScoreMethod::RuleBased);
    }

    #[test]
    fn sensitivity_post_adjustment_boundaries() {
        let engine = ScoringEngine::with_scorer(Box::new(FixedScorer(50.0)));

        let high = engine.score(&features(40.0, 4));
        assert!((high.score - 40.0).abs() < 1e-9);

        let low = engine.score(&features(40.0, 1));
        assert!((low.score - 55.0).abs() < 1e-9);

        let mid = engine.score(&features(40.0, 3));
        assert!((mid.score - 50.0).abs() < 1e-9);
    }

    #[test]
    fn unknown_sensitivity_level_gets_no_rule_multiplier() {
        let mut with_level = features(45.0, 0);
        with_level.prefer_green_routes = false;
        let mut baseline = with_level.clone();
        baseline.sensitivity_level = 1;

        // Level 0 hits the <=1 post adjustment, but the rule multiplier
        // itself must match the table default of 1.0
        assert_eq!(rule_based_score(&with_level), rule_based_score(&baseline));
    }

    #[test]
    fn rule_path_always_in_bounds() {
        let engine = ScoringEngine::new();
        for aqi in [0.0, 45.0, 120.0, 250.0, 500.0] {
            for sensitivity in 0..=5 {
                let outcome = engine.score(&features(aqi, sensitivity));
                assert!(outcome.score >= 0.0 && outcome.score <= 100.0);
            }
        }
    }
}
