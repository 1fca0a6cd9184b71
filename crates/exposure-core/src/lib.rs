pub mod advice;
pub mod aqi;
pub mod conditions;
pub mod features;
pub mod models;
pub mod scoring;

pub use advice::AdviceEngine;
pub use aqi::AqiBand;
pub use conditions::{ConditionProfile, ConditionTable, PollutionRisk};
pub use features::{assemble, FeatureRecord};
pub use models::{
    AdviceItem, AdviceKind, ConditionId, EnvSnapshot, HealthProfile, Priority, RouteInfo,
    ScoreMethod, SnapshotSource,
};
pub use scoring::{Scorer, ScorerError, ScoreOutcome, ScoringEngine};
