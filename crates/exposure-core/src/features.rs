//! Feature assembly: merge route, profile, and environment into one
//! complete record.
//!
//! The scoring and advice engines only ever see a [`FeatureRecord`], which
//! is guaranteed to have every field populated. Missing inputs get the
//! defaults below; absence of a field downstream is a programming error,
//! not a runtime possibility.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::models::{ConditionId, EnvSnapshot, HealthProfile, RouteInfo};

/// Canonical defaults for every assembled field. Single source of truth so
/// scoring and advice never diverge on what "missing" means.
pub mod defaults {
    pub const AQI: f64 = 50.0;
    pub const PM25: f64 = 15.0;
    pub const PM10: f64 = 20.0;
    pub const TRAFFIC_LEVEL: f64 = 0.5;
    pub const DISTANCE_KM: f64 = 5.0;
    pub const DURATION_MIN: f64 = 30.0;
    pub const GREEN_SCORE: f64 = 0.5;
    pub const AGE: u32 = 30;
    pub const SENSITIVITY_LEVEL: u8 = 2;
    pub const HAS_RESPIRATORY_ISSUES: bool = false;
    pub const PREFER_GREEN_ROUTES: bool = true;
}

/// Flattened, fully-populated input to the scoring and advice engines.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureRecord {
    // Environment
    pub aqi: f64,
    pub pm25: f64,
    pub pm10: f64,
    pub no2: f64,
    pub o3: f64,
    pub so2: f64,
    pub co: f64,
    pub traffic_level: f64,

    // Route
    pub distance_km: f64,
    pub duration_min: f64,
    pub green_score: f64,

    // Profile
    pub age: u32,
    pub conditions: BTreeSet<ConditionId>,
    pub sensitivity_level: u8,
    pub has_respiratory_issues: bool,
    pub prefer_green_routes: bool,

    // Time context
    pub hour_of_day: u32,
    pub is_weekend: bool,

    // Derived
    pub is_rush_hour: bool,
    pub is_night: bool,
    pub distance_per_minute: f64,
}

/// Rush hour: morning 07-09 and evening 16-19, inclusive.
pub fn is_rush_hour(hour: u32) -> bool {
    (7..=9).contains(&hour) || (16..=19).contains(&hour)
}

/// Night hours: before 06:00 or after 22:00.
pub fn is_night(hour: u32) -> bool {
    hour < 6 || hour > 22
}

/// Assemble a complete feature record.
///
/// Pure and total: any missing piece gets its default, so this never fails
/// and identical inputs always produce identical records.
pub fn assemble(
    route: Option<&RouteInfo>,
    profile: Option<&HealthProfile>,
    snapshot: Option<&EnvSnapshot>,
    hour_of_day: u32,
    is_weekend: bool,
) -> FeatureRecord {
    let distance_km = route.map(|r| r.distance_km).unwrap_or(defaults::DISTANCE_KM);
    let duration_min = route.map(|r| r.duration_min).unwrap_or(defaults::DURATION_MIN);
    let green_score = route
        .and_then(|r| r.green_score)
        .unwrap_or(defaults::GREEN_SCORE);

    FeatureRecord {
        aqi: snapshot.map(|s| f64::from(s.aqi)).unwrap_or(defaults::AQI),
        pm25: snapshot.map(|s| s.pm25).unwrap_or(defaults::PM25),
        pm10: snapshot.map(|s| s.pm10).unwrap_or(defaults::PM10),
        no2: snapshot.map(|s| s.no2).unwrap_or(0.0),
        o3: snapshot.map(|s| s.o3).unwrap_or(0.0),
        so2: snapshot.map(|s| s.so2).unwrap_or(0.0),
        co: snapshot.map(|s| s.co).unwrap_or(0.0),
        traffic_level: snapshot
            .map(|s| s.traffic_level)
            .unwrap_or(defaults::TRAFFIC_LEVEL),

        distance_km,
        duration_min,
        green_score,

        age: profile.map(|p| p.age).unwrap_or(defaults::AGE),
        conditions: profile.map(|p| p.conditions.clone()).unwrap_or_default(),
        sensitivity_level: profile
            .map(|p| p.sensitivity_level)
            .unwrap_or(defaults::SENSITIVITY_LEVEL),
        has_respiratory_issues: profile
            .map(|p| p.has_respiratory_issues)
            .unwrap_or(defaults::HAS_RESPIRATORY_ISSUES),
        prefer_green_routes: profile
            .map(|p| p.prefer_green_routes)
            .unwrap_or(defaults::PREFER_GREEN_ROUTES),

        hour_of_day,
        is_weekend,

        is_rush_hour: is_rush_hour(hour_of_day),
        is_night: is_night(hour_of_day),
        distance_per_minute: distance_km / (duration_min / 60.0).max(1.0),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::SnapshotSource;
    use chrono::Utc;

    fn snapshot(aqi: u16, traffic: f64) -> EnvSnapshot {
        EnvSnapshot {
            aqi,
            pm25: 12.0,
            pm10: 18.0,
            no2: 5.0,
            o3: 3.0,
            so2: 1.0,
            co: 0.4,
            traffic_level: traffic,
            source: SnapshotSource::Live,
            fetched_at: Utc::now(),
        }
    }

    #[test]
    fn all_defaults_when_nothing_supplied() {
        let record = assemble(None, None, None, 12, false);
        assert_eq!(record.aqi, defaults::AQI);
        assert_eq!(record.pm25, defaults::PM25);
        assert_eq!(record.traffic_level, defaults::TRAFFIC_LEVEL);
        assert_eq!(record.distance_km, defaults::DISTANCE_KM);
        assert_eq!(record.duration_min, defaults::DURATION_MIN);
        assert_eq!(record.age, defaults::AGE);
        assert_eq!(record.sensitivity_level, defaults::SENSITIVITY_LEVEL);
        assert!(!record.has_respiratory_issues);
        assert!(record.prefer_green_routes);
        assert!(record.conditions.is_empty());
    }

    #[test]
    fn snapshot_fields_flow_through() {
        let snap = snapshot(120, 0.8);
        let record = assemble(None, None, Some(&snap), 12, false);
        assert_eq!(record.aqi, 120.0);
        assert_eq!(record.pm25, 12.0);
        assert_eq!(record.traffic_level, 0.8);
    }

    #[test]
    fn derived_time_fields() {
        let morning = assemble(None, None, None, 8, false);
        assert!(morning.is_rush_hour);
        assert!(!morning.is_night);

        let evening = assemble(None, None, None, 19, false);
        assert!(evening.is_rush_hour);

        let midday = assemble(None, None, None, 12, false);
        assert!(!midday.is_rush_hour);

        let night = assemble(None, None, None, 23, false);
        assert!(night.is_night);
        assert!(!night.is_rush_hour);
    }

    #[test]
    fn distance_per_minute_floors_duration() {
        let route = RouteInfo {
            distance_km: 10.0,
            duration_min: 30.0,
            green_score: None,
        };
        let record = assemble(Some(&route), None, None, 12, false);
        // 30 min = 0.5 h, floored to 1.0
        assert_eq!(record.distance_per_minute, 10.0);

        let long = RouteInfo {
            distance_km: 10.0,
            duration_min: 120.0,
            green_score: None,
        };
        let record = assemble(Some(&long), None, None, 12, false);
        assert_eq!(record.distance_per_minute, 5.0);
    }

    #[test]
    fn assemble_is_idempotent() {
        let route = RouteInfo {
            distance_km: 3.5,
            duration_min: 25.0,
            green_score: Some(0.7),
        };
        let profile = HealthProfile {
            age: 35,
            conditions: [ConditionId::Asthma].into_iter().collect(),
            sensitivity_level: 3,
            has_respiratory_issues: true,
            prefer_green_routes: false,
        };
        let snap = snapshot(88, 0.3);

        let first = assemble(Some(&route), Some(&profile), Some(&snap), 17, true);
        let second = assemble(Some(&route), Some(&profile), Some(&snap), 17, true);
        assert_eq!(first, second);
    }
}
