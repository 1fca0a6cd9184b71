//! Rule-driven advisory generator.
//!
//! Derives prioritized recommendations from the same feature record the
//! scoring engine sees. Rules run in a fixed order and the final stable
//! sort by priority keeps same-priority items in evaluation order.

use std::sync::Arc;

use crate::aqi::AqiBand;
use crate::conditions::{ConditionTable, PollutionRisk};
use crate::features::FeatureRecord;
use crate::models::{AdviceItem, AdviceKind, Priority};

pub struct AdviceEngine {
    conditions: Arc<ConditionTable>,
}

impl AdviceEngine {
    pub fn new(conditions: Arc<ConditionTable>) -> Self {
        Self { conditions }
    }

    /// Generate advice for a feature record, highest priority first.
    /// Never fails; an empty list is a valid result.
    pub fn advise(&self, f: &FeatureRecord) -> Vec<AdviceItem> {
        let mut advice = Vec::new();
        let aqi = f.aqi;
        let band = AqiBand::from_aqi(aqi);

        if band.is_warning_level() {
            advice.push(AdviceItem {
                kind: AdviceKind::Warning,
                message: format!(
                    "Current AQI is {} ({}). Consider limiting outdoor exposure.",
                    aqi as i64,
                    band.label()
                ),
                priority: Priority::High,
            });
        }

        if aqi > 100.0 {
            for condition in &f.conditions {
                let Some(entry) = self.conditions.get(*condition) else {
                    continue;
                };
                if matches!(
                    entry.pollution_risk,
                    PollutionRisk::High | PollutionRisk::VeryHigh
                ) {
                    advice.push(AdviceItem {
                        kind: AdviceKind::Health,
                        message: format!(
                            "As someone with {}, you should avoid areas with high pollution today.",
                            condition.display_name()
                        ),
                        priority: Priority::High,
                    });
                }
            }
        }

        if (f.age < 12 || f.age > 65) && aqi > 100.0 {
            advice.push(AdviceItem {
                kind: AdviceKind::Health,
                message: "People in your age group are more sensitive to air pollution. \
                          Consider staying indoors."
                    .to_string(),
                priority: Priority::Medium,
            });
        }

        if f.distance_km > 5.0 && aqi > 100.0 {
            advice.push(AdviceItem {
                kind: AdviceKind::Route,
                message: "This is a longer route through areas with elevated pollution. \
                          Consider breaking it into shorter segments."
                    .to_string(),
                priority: Priority::Medium,
            });
        }

        if aqi > 100.0 {
            advice.push(AdviceItem {
                kind: AdviceKind::Tip,
                message: "Consider wearing a mask if you need to go outside.".to_string(),
                priority: Priority::Low,
            });
            advice.push(AdviceItem {
                kind: AdviceKind::Tip,
                message: "Keep windows closed and use air purifiers if available.".to_string(),
                priority: Priority::Low,
            });
        }

        advice.sort_by_key(|item| item.priority.rank());
        advice
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::assemble;
    use crate::models::{ConditionId, HealthProfile, RouteInfo};

    fn engine() -> AdviceEngine {
        AdviceEngine::new(Arc::new(ConditionTable::default()))
    }

    fn record(aqi: f64, age: u32, conditions: &[ConditionId], distance_km: f64) -> FeatureRecord {
        let route = RouteInfo {
            distance_km,
            duration_min: 30.0,
            green_score: None,
        };
        let profile = HealthProfile {
            age,
            conditions: conditions.iter().copied().collect(),
            sensitivity_level: 2,
            has_respiratory_issues: false,
            prefer_green_routes: true,
        };
        let mut f = assemble(Some(&route), Some(&profile), None, 12, false);
        f.aqi = aqi;
        f
    }

    #[test]
    fn clean_air_yields_no_advice() {
        let advice = engine().advise(&record(45.0, 35, &[], 3.0));
        assert!(advice.is_empty());
    }

    #[test]
    fn elderly_asthmatic_long_route_in_severe_air() {
        let advice = engine().advise(&record(250.0, 70, &[ConditionId::Asthma], 10.0));

        // Warning + condition + age + route + two tips
        assert_eq!(advice.len(), 6);
        assert_eq!(advice[0].priority, Priority::High);
        assert!(advice.iter().any(|a| a.priority == Priority::Medium));
        assert!(advice.iter().any(|a| a.kind == AdviceKind::Route));

        // Priority rank never decreases down the list
        for pair in advice.windows(2) {
            assert!(pair[0].priority.rank() <= pair[1].priority.rank());
        }
    }

    #[test]
    fn condition_advice_names_the_condition() {
        let advice = engine().advise(&record(160.0, 35, &[ConditionId::Copd], 3.0));
        assert!(advice
            .iter()
            .any(|a| a.kind == AdviceKind::Health && a.message.contains("COPD")));
    }

    #[test]
    fn moderate_risk_conditions_stay_quiet() {
        // Diabetes is moderate risk: no condition-specific item
        let advice = engine().advise(&record(160.0, 35, &[ConditionId::Diabetes], 3.0));
        assert!(!advice.iter().any(|a| a.kind == AdviceKind::Health));
    }

    #[test]
    fn tips_only_above_aqi_100() {
        let below = engine().advise(&record(100.0, 35, &[], 3.0));
        assert!(below.iter().all(|a| a.kind != AdviceKind::Tip));

        let above = engine().advise(&record(101.0, 35, &[], 3.0));
        let tips: Vec<_> = above.iter().filter(|a| a.kind == AdviceKind::Tip).collect();
        assert_eq!(tips.len(), 2);
        assert!(tips[0].message.contains("mask"));
        assert!(tips[1].message.contains("windows"));
    }

    #[test]
    fn equal_priority_keeps_evaluation_order() {
        // Both items are high: the AQI warning is evaluated before the
        // condition rule and must stay first
        let advice = engine().advise(&record(220.0, 35, &[ConditionId::Asthma], 3.0));
        assert_eq!(advice[0].kind, AdviceKind::Warning);
        assert_eq!(advice[1].kind, AdviceKind::Health);
    }
}
