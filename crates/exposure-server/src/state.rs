//! Shared application state.
//!
//! Everything here is constructed once in `main` and injected into the
//! handlers; the engines and condition table have no global fallbacks.

use std::sync::Arc;
use std::time::Duration;

use exposure_core::{AdviceEngine, ConditionTable, ScoringEngine};
use exposure_envdata::{EnvClient, EnvDataCache, EnvDataFetcher};

use crate::config::Config;

pub struct AppState {
    pub fetcher: EnvDataFetcher<EnvClient>,
    pub scoring: ScoringEngine,
    pub advice: AdviceEngine,
    pub conditions: Arc<ConditionTable>,
}

impl AppState {
    pub fn new(config: &Config) -> Self {
        Self::with_scoring_engine(config, ScoringEngine::new())
    }

    /// State with a caller-supplied scoring engine (used by tests to load
    /// a mock scorer).
    pub fn with_scoring_engine(config: &Config, scoring: ScoringEngine) -> Self {
        let conditions = Arc::new(ConditionTable::default());
        let client = EnvClient::new(
            &config.aqi_base_url,
            &config.aqi_token,
            &config.traffic_base_url,
            &config.traffic_key,
            Duration::from_secs(config.provider_timeout_secs),
        );
        let cache = EnvDataCache::new(Duration::from_secs(config.cache_ttl_secs));

        Self {
            fetcher: EnvDataFetcher::new(client, cache),
            scoring,
            advice: AdviceEngine::new(conditions.clone()),
            conditions,
        }
    }
}
