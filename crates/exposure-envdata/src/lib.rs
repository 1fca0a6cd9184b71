pub mod cache;
pub mod client;
pub mod fetcher;

pub use cache::{EnvDataCache, GeoKey};
pub use client::{AirQualityReading, EnvClient, EnvProviders, FetchError, TrafficReading};
pub use fetcher::{fallback_snapshot, EnvDataFetcher};
