//! Server configuration from environment.

use std::env;

#[derive(Debug, Clone)]
pub struct Config {
    pub server_port: u16,
    pub aqi_base_url: String,
    pub aqi_token: String,
    pub traffic_base_url: String,
    pub traffic_key: String,
    /// Per-request timeout for upstream provider calls
    pub provider_timeout_secs: u64,
    /// How long a fetched snapshot stays valid
    pub cache_ttl_secs: u64,
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            server_port: env::var("EXPOSURE_PORT")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(3000),
            aqi_base_url: env::var("AQICN_API_URL")
                .unwrap_or_else(|_| "https://api.waqi.info".to_string()),
            aqi_token: env::var("AQICN_TOKEN").unwrap_or_default(),
            traffic_base_url: env::var("TOMTOM_TRAFFIC_API_URL").unwrap_or_else(|_| {
                "https://api.tomtom.com/traffic/services/4/flowSegmentData/absolute/10/json"
                    .to_string()
            }),
            traffic_key: env::var("TOMTOM_API_KEY").unwrap_or_default(),
            provider_timeout_secs: env::var("PROVIDER_TIMEOUT_SECS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(10),
            cache_ttl_secs: env::var("ENV_CACHE_TTL_SECS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(30 * 60),
        }
    }
}
