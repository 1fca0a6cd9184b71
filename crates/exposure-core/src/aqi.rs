//! AQI severity banding on the standard 0-500 breakpoints.

use serde::{Deserialize, Serialize};

/// Named AQI severity band.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AqiBand {
    Good,
    Moderate,
    UnhealthySensitive,
    Unhealthy,
    VeryUnhealthy,
    Hazardous,
}

impl AqiBand {
    /// Classify an AQI value. Breakpoints are inclusive on the upper edge.
    pub fn from_aqi(aqi: f64) -> Self {
        if aqi <= 50.0 {
            AqiBand::Good
        } else if aqi <= 100.0 {
            AqiBand::Moderate
        } else if aqi <= 150.0 {
            AqiBand::UnhealthySensitive
        } else if aqi <= 200.0 {
            AqiBand::Unhealthy
        } else if aqi <= 300.0 {
            AqiBand::VeryUnhealthy
        } else {
            AqiBand::Hazardous
        }
    }

    /// Label used in advisory messages.
    pub fn label(&self) -> &'static str {
        match self {
            AqiBand::Good => "good",
            AqiBand::Moderate => "moderate",
            AqiBand::UnhealthySensitive => "unhealthy_sensitive",
            AqiBand::Unhealthy => "unhealthy",
            AqiBand::VeryUnhealthy => "very_unhealthy",
            AqiBand::Hazardous => "hazardous",
        }
    }

    /// Whether this band warrants a high-priority warning.
    pub fn is_warning_level(&self) -> bool {
        matches!(
            self,
            AqiBand::Unhealthy | AqiBand::VeryUnhealthy | AqiBand::Hazardous
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn band_breakpoints_are_inclusive() {
        assert_eq!(AqiBand::from_aqi(50.0), AqiBand::Good);
        assert_eq!(AqiBand::from_aqi(51.0), AqiBand::Moderate);
        assert_eq!(AqiBand::from_aqi(100.0), AqiBand::Moderate);
        assert_eq!(AqiBand::from_aqi(150.0), AqiBand::UnhealthySensitive);
        assert_eq!(AqiBand::from_aqi(200.0), AqiBand::Unhealthy);
        assert_eq!(AqiBand::from_aqi(300.0), AqiBand::VeryUnhealthy);
        assert_eq!(AqiBand::from_aqi(301.0), AqiBand::Hazardous);
    }

    #[test]
    fn warning_level_starts_above_150() {
        assert!(!AqiBand::from_aqi(150.0).is_warning_level());
        assert!(AqiBand::from_aqi(151.0).is_warning_level());
        assert!(AqiBand::from_aqi(400.0).is_warning_level());
    }
}
