use crate::core::errors::{Result, RouteError};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Kilometres in one statute mile.
pub const KM_PER_MILE: f64 = 1.60934;

/// A WGS84 position in decimal degrees. Tracked points also carry the
/// sensor readings recorded with them.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeoPoint {
    pub latitude: f64,
    pub longitude: f64,
    /// Metres above sea level.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub altitude: Option<f64>,
    /// Horizontal accuracy in metres.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub accuracy: Option<f64>,
    /// Metres per second.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub speed: Option<f64>,
    /// Epoch milliseconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<i64>,
}

impl GeoPoint {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        GeoPoint {
            latitude,
            longitude,
            altitude: None,
            accuracy: None,
            speed: None,
            timestamp: None,
        }
    }

    pub fn tracked(latitude: f64, longitude: f64, timestamp: i64) -> Self {
        GeoPoint {
            timestamp: Some(timestamp),
            ..GeoPoint::new(latitude, longitude)
        }
    }

    pub fn with_altitude(self, altitude: f64) -> Self {
        GeoPoint {
            altitude: Some(altitude),
            ..self
        }
    }

    pub fn validate(&self) -> Result<()> {
        if !self.latitude.is_finite() || !self.longitude.is_finite() {
            return Err(RouteError::InvalidInput(format!(
                "non-finite coordinate ({}, {})",
                self.latitude, self.longitude
            )));
        }
        if self.latitude.abs() > 90.0 {
            return Err(RouteError::InvalidInput(format!(
                "latitude {} out of range",
                self.latitude
            )));
        }
        if self.longitude.abs() > 180.0 {
            return Err(RouteError::InvalidInput(format!(
                "longitude {} out of range",
                self.longitude
            )));
        }
        Ok(())
    }

    /// Coordinate equality, ignoring the sensor fields.
    pub fn same_position(&self, other: &GeoPoint) -> bool {
        self.latitude == other.latitude && self.longitude == other.longitude
    }
}

pub fn validate_points(points: &[GeoPoint]) -> Result<()> {
    points.iter().try_for_each(GeoPoint::validate)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Waypoint {
    pub id: String,
    #[serde(flatten)]
    pub point: GeoPoint,
    /// Zero-based traversal position.
    pub order: usize,
}

impl Waypoint {
    pub fn new(point: GeoPoint, order: usize) -> Self {
        Waypoint {
            id: Uuid::new_v4().to_string(),
            point,
            order,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Route {
    pub id: String,
    pub start: GeoPoint,
    pub end: GeoPoint,
    pub waypoints: Vec<Waypoint>,
    pub polyline: Vec<GeoPoint>,
    pub distance_km: f64,
    pub estimated_duration_sec: u64,
    pub is_loop: bool,
    #[serde(default)]
    pub target_distance_km: Option<f64>,
    #[serde(default)]
    pub name: Option<String>,
}

impl Route {
    /// Checks the invariants a route must satisfy before it is handed to
    /// the UI or persisted.
    pub fn validate(&self) -> Result<()> {
        self.start.validate()?;
        self.end.validate()?;
        if self.polyline.len() < 2 {
            return Err(RouteError::InvalidInput(format!(
                "route {} has {} polyline points, need at least 2",
                self.id,
                self.polyline.len()
            )));
        }
        if self.is_loop && !self.start.same_position(&self.end) {
            return Err(RouteError::InvalidInput(format!(
                "loop route {} does not end at its start",
                self.id
            )));
        }
        crate::routing::waypoints::validate_orders(&self.waypoints)
    }
}

/// Pace over one split of a completed run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaceInterval {
    pub distance_km: f64,
    pub pace_sec_per_km: f64,
    pub duration_sec: u64,
    #[serde(default)]
    pub elevation_gain_meters: Option<f64>,
}

/// Transient output of the loop search. Every field comes from the same
/// directions call.
#[derive(Debug, Clone, PartialEq)]
pub struct GeneratedLoopCore {
    pub waypoints: Vec<Waypoint>,
    pub polyline: Vec<GeoPoint>,
    pub distance_km: f64,
    pub duration_sec: u64,
    pub seed: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnitSystem {
    #[default]
    Metric,
    Imperial,
}

impl UnitSystem {
    /// Length of one displayed split: a kilometre or a mile.
    pub fn interval_km(self) -> f64 {
        match self {
            UnitSystem::Metric => 1.0,
            UnitSystem::Imperial => KM_PER_MILE,
        }
    }
}
