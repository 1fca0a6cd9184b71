//! TTL cache for environmental snapshots, keyed by rounded coordinates.

use dashmap::DashMap;
use std::time::{Duration, Instant};

use exposure_core::EnvSnapshot;

/// Coordinate pair rounded to 4 decimal degrees (~11 m grid cell).
///
/// Rounding bounds cache cardinality and absorbs GPS jitter: nearby
/// requests share an entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GeoKey {
    lat_e4: i32,
    lon_e4: i32,
}

impl GeoKey {
    pub fn new(lat: f64, lon: f64) -> Self {
        Self {
            lat_e4: (lat * 10_000.0).round() as i32,
            lon_e4: (lon * 10_000.0).round() as i32,
        }
    }
}

struct CacheEntry {
    snapshot: EnvSnapshot,
    expires_at: Instant,
}

/// Thread-safe snapshot cache with passive expiry.
///
/// Expiry is checked on read; there is no background sweeper. Concurrent
/// writers for the same key are fine, last writer wins.
pub struct EnvDataCache {
    entries: DashMap<GeoKey, CacheEntry>,
    ttl: Duration,
}

impl EnvDataCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: DashMap::new(),
            ttl,
        }
    }

    /// Fetch a copy of the cached snapshot, dropping the entry if it has
    /// expired.
    pub fn get(&self, key: GeoKey) -> Option<EnvSnapshot> {
        let expired = match self.entries.get(&key) {
            Some(entry) if Instant::now() < entry.expires_at => {
                return Some(entry.snapshot.clone());
            }
            Some(_) => true,
            None => false,
        };
        if expired {
            self.entries.remove(&key);
        }
        None
    }

    /// Store a snapshot, replacing any previous entry for the key.
    pub fn insert(&self, key: GeoKey, snapshot: EnvSnapshot) {
        self.entries.insert(
            key,
            CacheEntry {
                snapshot,
                expires_at: Instant::now() + self.ttl,
            },
        );
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
