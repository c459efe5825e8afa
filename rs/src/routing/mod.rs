pub mod algorithm;
pub mod assembler;
pub mod directions;
pub mod waypoints;

pub use algorithm::{LoopGeneration, LoopRouteGenerator, MIN_TARGET_DISTANCE_KM};
pub use assembler::{assemble_route, insertion_order, reroute};
pub use directions::GoogleDirectionsProvider;
pub use waypoints::WaypointList;

use crate::core::errors::Result;
use crate::core::types::GeoPoint;
use serde::{Deserialize, Serialize};
use std::future::Future;

/// One leg of a provider path, between consecutive requested points.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PathSegment {
    pub distance_km: f64,
    pub duration_sec: u64,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct DirectionsPath {
    pub polyline: Vec<GeoPoint>,
    pub segments: Vec<PathSegment>,
}

impl DirectionsPath {
    pub fn distance_km(&self) -> f64 {
        self.segments.iter().map(|s| s.distance_km).sum()
    }

    pub fn duration_sec(&self) -> u64 {
        self.segments.iter().map(|s| s.duration_sec).sum()
    }

    /// A path the core can build a route from.
    pub fn is_usable(&self) -> bool {
        self.polyline.len() >= 2 && !self.segments.is_empty()
    }
}

/// Turn-by-turn routing service that connects an ordered list of points.
///
/// Waypoints are visited in slice order; implementations must not reorder
/// them. An empty result may be reported either as an error or as a path
/// that is not `is_usable`.
pub trait DirectionsProvider {
    fn get_path(
        &self,
        origin: &GeoPoint,
        destination: &GeoPoint,
        waypoints: &[GeoPoint],
    ) -> impl Future<Output = Result<DirectionsPath>> + Send;
}

impl<P: DirectionsProvider + Sync> DirectionsProvider for &P {
    fn get_path(
        &self,
        origin: &GeoPoint,
        destination: &GeoPoint,
        waypoints: &[GeoPoint],
    ) -> impl Future<Output = Result<DirectionsPath>> + Send {
        (**self).get_path(origin, destination, waypoints)
    }
}
