use crate::core::errors::{Result, RouteError};
use serde::{Deserialize, Serialize};

pub const ROUTE_SAVE_TOLERANCE_KM: f64 = 0.00005;
pub const FEED_PREVIEW_TOLERANCE_KM: f64 = 0.0002;
pub const MAX_SIMPLIFIED_POINTS: usize = 500;

/// Google Directions accepts at most 25 intermediate waypoints.
pub const MAX_LOOP_WAYPOINTS: usize = 25;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoopOptions {
    /// Ratio of real path length to the idealised circle circumference.
    #[serde(default = "default_road_efficiency_factor")]
    pub road_efficiency_factor: f64,
    #[serde(default = "default_waypoint_count")]
    pub waypoint_count: usize,
    #[serde(default = "default_jitter_fraction")]
    pub jitter_fraction: f64,
    /// Accepted relative distance error.
    #[serde(default = "default_tolerance")]
    pub tolerance: f64,
    #[serde(default = "default_max_attempts")]
    pub max_attempts: usize,
    /// Fixed seed for reproducible shapes; drawn at random when absent.
    #[serde(default)]
    pub seed: Option<u64>,
}

fn default_road_efficiency_factor() -> f64 {
    1.3
}

fn default_waypoint_count() -> usize {
    6
}

fn default_jitter_fraction() -> f64 {
    0.2
}

fn default_tolerance() -> f64 {
    0.1
}

fn default_max_attempts() -> usize {
    4
}

impl Default for LoopOptions {
    fn default() -> Self {
        LoopOptions {
            road_efficiency_factor: default_road_efficiency_factor(),
            waypoint_count: default_waypoint_count(),
            jitter_fraction: default_jitter_fraction(),
            tolerance: default_tolerance(),
            max_attempts: default_max_attempts(),
            seed: None,
        }
    }
}

impl LoopOptions {
    pub fn from_json(json: &str) -> Result<Self> {
        let options: LoopOptions = serde_json::from_str(json)?;
        options.validate()?;
        Ok(options)
    }

    pub fn validate(&self) -> Result<()> {
        if !self.road_efficiency_factor.is_finite() || self.road_efficiency_factor <= 0.0 {
            return Err(RouteError::InvalidInput(format!(
                "road efficiency factor must be positive, got {}",
                self.road_efficiency_factor
            )));
        }
        if self.waypoint_count == 0 || self.waypoint_count > MAX_LOOP_WAYPOINTS {
            return Err(RouteError::InvalidInput(format!(
                "waypoint count must be between 1 and {}, got {}",
                MAX_LOOP_WAYPOINTS, self.waypoint_count
            )));
        }
        if !(0.0..1.0).contains(&self.jitter_fraction) {
            return Err(RouteError::InvalidInput(format!(
                "jitter fraction must be in [0, 1), got {}",
                self.jitter_fraction
            )));
        }
        if !(self.tolerance > 0.0 && self.tolerance < 1.0) {
            return Err(RouteError::InvalidInput(format!(
                "tolerance must be in (0, 1), got {}",
                self.tolerance
            )));
        }
        if self.max_attempts == 0 {
            return Err(RouteError::invalid("max attempts must be at least 1"));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SimplifyOptions {
    #[serde(default = "default_simplify_tolerance_km")]
    pub tolerance_km: f64,
    #[serde(default = "default_max_points")]
    pub max_points: usize,
}

fn default_simplify_tolerance_km() -> f64 {
    ROUTE_SAVE_TOLERANCE_KM
}

fn default_max_points() -> usize {
    MAX_SIMPLIFIED_POINTS
}

impl Default for SimplifyOptions {
    fn default() -> Self {
        SimplifyOptions::route_save()
    }
}

impl SimplifyOptions {
    pub fn route_save() -> Self {
        SimplifyOptions {
            tolerance_km: ROUTE_SAVE_TOLERANCE_KM,
            max_points: MAX_SIMPLIFIED_POINTS,
        }
    }

    pub fn feed_preview() -> Self {
        SimplifyOptions {
            tolerance_km: FEED_PREVIEW_TOLERANCE_KM,
            max_points: MAX_SIMPLIFIED_POINTS,
        }
    }

    pub fn with_tolerance(tolerance_km: f64) -> Self {
        SimplifyOptions {
            tolerance_km,
            ..SimplifyOptions::route_save()
        }
    }

    pub fn from_json(json: &str) -> Result<Self> {
        let options: SimplifyOptions = serde_json::from_str(json)?;
        options.validate()?;
        Ok(options)
    }

    pub fn validate(&self) -> Result<()> {
        if !self.tolerance_km.is_finite() || self.tolerance_km <= 0.0 {
            return Err(RouteError::InvalidInput(format!(
                "simplification tolerance must be positive, got {}",
                self.tolerance_km
            )));
        }
        if self.max_points < 2 {
            return Err(RouteError::InvalidInput(format!(
                "max points must be at least 2, got {}",
                self.max_points
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DirectionsOptions {
    #[serde(default = "default_server")]
    pub server: String,
    #[serde(default)]
    pub api_key: String,
    #[serde(default = "default_mode")]
    pub mode: String,
    #[serde(default = "default_retries")]
    pub retries: u32,
    /// Milliseconds between retries.
    #[serde(default = "default_retry_delay")]
    pub retry_delay: u64,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_server() -> String {
    "https://maps.googleapis.com".to_string()
}

fn default_mode() -> String {
    "walking".to_string()
}

fn default_retries() -> u32 {
    3
}

fn default_retry_delay() -> u64 {
    500
}

fn default_timeout_secs() -> u64 {
    30
}

impl Default for DirectionsOptions {
    fn default() -> Self {
        DirectionsOptions {
            server: default_server(),
            api_key: String::new(),
            mode: default_mode(),
            retries: default_retries(),
            retry_delay: default_retry_delay(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl DirectionsOptions {
    pub fn from_json(json: &str) -> Result<Self> {
        let options: DirectionsOptions = serde_json::from_str(json)?;
        options.validate()?;
        Ok(options)
    }

    pub fn validate(&self) -> Result<()> {
        if self.server.is_empty() {
            return Err(RouteError::invalid("directions server must not be empty"));
        }
        if self.retries == 0 {
            return Err(RouteError::invalid("retries must be at least 1"));
        }
        if self.timeout_secs == 0 {
            return Err(RouteError::invalid("timeout must be at least 1 second"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn loop_defaults_from_empty_json() {
        let options = LoopOptions::from_json("{}").unwrap();
        assert_eq!(options, LoopOptions::default());
        assert_eq!(options.road_efficiency_factor, 1.3);
        assert_eq!(options.waypoint_count, 6);
        assert_eq!(options.max_attempts, 4);
        assert!(options.seed.is_none());
    }

    #[test]
    fn loop_options_camel_case() {
        let options =
            LoopOptions::from_json(r#"{"waypointCount": 8, "maxAttempts": 2, "seed": 42}"#)
                .unwrap();
        assert_eq!(options.waypoint_count, 8);
        assert_eq!(options.max_attempts, 2);
        assert_eq!(options.seed, Some(42));
    }

    #[test]
    fn loop_options_reject_bad_values() {
        assert!(LoopOptions::from_json(r#"{"tolerance": 0}"#).is_err());
        assert!(LoopOptions::from_json(r#"{"jitterFraction": 1.5}"#).is_err());
        assert!(LoopOptions::from_json(r#"{"waypointCount": 0}"#).is_err());
        assert!(LoopOptions::from_json(r#"{"maxAttempts": 0}"#).is_err());
        assert!(LoopOptions::from_json(r#"{"roadEfficiencyFactor": -1}"#).is_err());
        assert!(matches!(
            LoopOptions::from_json("not json"),
            Err(RouteError::JsonError(_))
        ));
    }

    #[test]
    fn simplify_presets() {
        assert_eq!(SimplifyOptions::route_save().tolerance_km, 0.00005);
        assert_eq!(SimplifyOptions::feed_preview().tolerance_km, 0.0002);
        assert_eq!(SimplifyOptions::default().max_points, 500);
        assert!(SimplifyOptions::with_tolerance(0.0).validate().is_err());
        assert!(SimplifyOptions::with_tolerance(f64::NAN).validate().is_err());
    }

    #[test]
    fn directions_defaults() {
        let options = DirectionsOptions::from_json(r#"{"apiKey": "k"}"#).unwrap();
        assert_eq!(options.api_key, "k");
        assert_eq!(options.mode, "walking");
        assert_eq!(options.retries, 3);
        assert!(DirectionsOptions::from_json(r#"{"retries": 0}"#).is_err());
    }
}
