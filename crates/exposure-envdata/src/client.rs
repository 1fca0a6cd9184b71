//! HTTP clients for the two upstream environmental providers.
//!
//! Air quality comes from the WAQI feed, congestion from the TomTom flow
//! segment API. Both contracts are "parseable JSON or an error"; schema
//! beyond the fields we read is ignored.

use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::future::Future;
use std::time::Duration;
use thiserror::Error;

/// A provider call that did not produce a usable reading.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("provider returned status {0}")]
    Status(u16),
    #[error("unusable payload: {0}")]
    Payload(String),
}

/// Air-quality reading parsed from the WAQI feed. Pollutants the station
/// does not report stay `None`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AirQualityReading {
    pub aqi: u16,
    pub pm25: Option<f64>,
    pub pm10: Option<f64>,
    pub no2: Option<f64>,
    pub o3: Option<f64>,
    pub so2: Option<f64>,
    pub co: Option<f64>,
}

/// Congestion reading parsed from a TomTom flow segment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrafficReading {
    /// 0.0 (free flow) to 1.0 (standstill), floored at 0.1
    pub traffic_level: f64,
    pub current_speed: f64,
    pub free_flow_speed: f64,
}

/// The two independent upstream calls the fetcher makes. Behind a trait so
/// tests can substitute counting or failing providers.
pub trait EnvProviders: Send + Sync {
    fn fetch_air_quality(
        &self,
        lat: f64,
        lon: f64,
    ) -> impl Future<Output = Result<AirQualityReading, FetchError>> + Send;

    fn fetch_traffic(
        &self,
        lat: f64,
        lon: f64,
    ) -> impl Future<Output = Result<TrafficReading, FetchError>> + Send;
}

/// Live HTTP client for both providers.
pub struct EnvClient {
    client: Client,
    aqi_base_url: String,
    aqi_token: String,
    traffic_base_url: String,
    traffic_key: String,
}

impl EnvClient {
    /// Build a client with a bounded per-request timeout so a slow
    /// provider cannot stall a worker.
    pub fn new(
        aqi_base_url: impl Into<String>,
        aqi_token: impl Into<String>,
        traffic_base_url: impl Into<String>,
        traffic_key: impl Into<String>,
        timeout: Duration,
    ) -> Self {
        Self {
            client: Client::builder()
                .timeout(timeout)
                .build()
                .expect("Failed to create HTTP client"),
            aqi_base_url: aqi_base_url.into(),
            aqi_token: aqi_token.into(),
            traffic_base_url: traffic_base_url.into(),
            traffic_key: traffic_key.into(),
        }
    }

    async fn get_json(&self, url: &str) -> Result<Value, FetchError> {
        let response = self.client.get(url).send().await?;
        if !response.status().is_success() {
            return Err(FetchError::Status(response.status().as_u16()));
        }
        Ok(response.json::<Value>().await?)
    }
}

impl EnvProviders for EnvClient {
    async fn fetch_air_quality(&self, lat: f64, lon: f64) -> Result<AirQualityReading, FetchError> {
        let url = format!(
            "{}/feed/geo:{};{}/?token={}",
            self.aqi_base_url, lat, lon, self.aqi_token
        );
        let payload = self.get_json(&url).await?;
        parse_waqi(&payload)
    }

    async fn fetch_traffic(&self, lat: f64, lon: f64) -> Result<TrafficReading, FetchError> {
        let url = format!(
            "{}?point={},{}&key={}",
            self.traffic_base_url, lat, lon, self.traffic_key
        );
        let payload = self.get_json(&url).await?;
        parse_tomtom(&payload)
    }
}

/// Parse a WAQI feed response: `status` must be "ok", `data.aqi` is the
/// index, `data.iaqi.<pollutant>.v` the per-pollutant readings.
pub(crate) fn parse_waqi(payload: &Value) -> Result<AirQualityReading, FetchError> {
    let status = payload.get("status").and_then(Value::as_str);
    if status != Some("ok") {
        return Err(FetchError::Payload(format!(
            "waqi status {:?}",
            status.unwrap_or("missing")
        )));
    }

    let data = payload
        .get("data")
        .ok_or_else(|| FetchError::Payload("missing data".into()))?;
    let aqi = data
        .get("aqi")
        .and_then(Value::as_i64)
        .ok_or_else(|| FetchError::Payload("missing aqi".into()))?;

    let pollutant = |name: &str| -> Option<f64> {
        data.get("iaqi")
            .and_then(|iaqi| iaqi.get(name))
            .and_then(|entry| entry.get("v"))
            .and_then(Value::as_f64)
    };

    Ok(AirQualityReading {
        aqi: aqi.clamp(0, 500) as u16,
        pm25: pollutant("pm25"),
        pm10: pollutant("pm10"),
        no2: pollutant("no2"),
        o3: pollutant("o3"),
        so2: pollutant("so2"),
        co: pollutant("co"),
    })
}

/// Parse a TomTom flow segment response into a 0-1 congestion level.
pub(crate) fn parse_tomtom(payload: &Value) -> Result<TrafficReading, FetchError> {
    let segment = payload
        .get("flowSegmentData")
        .ok_or_else(|| FetchError::Payload("missing flowSegmentData".into()))?;

    let current_speed = segment
        .get("currentSpeed")
        .and_then(Value::as_f64)
        .ok_or_else(|| FetchError::Payload("missing currentSpeed".into()))?;
    let free_flow_speed = segment
        .get("freeFlowSpeed")
        .and_then(Value::as_f64)
        .filter(|speed| *speed > 0.0)
        .ok_or_else(|| FetchError::Payload("missing freeFlowSpeed".into()))?;

    let traffic_level = (1.0 - current_speed / free_flow_speed).clamp(0.1, 1.0);

    Ok(TrafficReading {
        traffic_level,
        current_speed,
        free_flow_speed,
    })
}
