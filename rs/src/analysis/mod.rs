//! Post-run processing of a completed GPS trail. Everything here is pure
//! and synchronous.

pub mod duplicates;
pub mod intervals;

pub use duplicates::{find_duplicate, polylines_equal, DEFAULT_DUPLICATE_TOLERANCE_KM};
pub use intervals::{compute_intervals, MIN_PARTIAL_INTERVAL_KM};

use crate::core::errors::{Result, RouteError};
use crate::core::options::SimplifyOptions;
use crate::core::types::{validate_points, GeoPoint, PaceInterval, UnitSystem};
use crate::spatial::geometry::{haversine_distance_km, path_length_km};
use crate::spatial::simplify::simplify_with_options;
use serde::Serialize;

pub const DEFAULT_LOOP_THRESHOLD_KM: f64 = 0.1;

/// True when the trail ends within `threshold_km` of where it started.
pub fn is_loop(trail: &[GeoPoint], threshold_km: f64) -> bool {
    match (trail.first(), trail.last()) {
        (Some(first), Some(last)) if trail.len() >= 2 => {
            haversine_distance_km(first, last) < threshold_km
        }
        _ => false,
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TrailSummary {
    pub distance_km: f64,
    pub elapsed_sec: u64,
    pub average_pace_sec_per_km: Option<f64>,
    pub elevation_gain_meters: f64,
    pub is_loop: bool,
}

pub fn summarize_trail(trail: &[GeoPoint]) -> Result<TrailSummary> {
    if trail.len() < 2 {
        return Err(RouteError::InvalidInput(format!(
            "trail summary needs at least 2 points, got {}",
            trail.len()
        )));
    }
    validate_points(trail)?;

    let distance_km = path_length_km(trail);
    let elapsed_sec = match (trail[0].timestamp, trail[trail.len() - 1].timestamp) {
        (Some(first), Some(last)) if last >= first => {
            ((last - first) as f64 / 1000.0).round() as u64
        }
        (Some(_), Some(_)) => {
            return Err(RouteError::invalid("trail ends before it starts"));
        }
        _ => 0,
    };

    let elevation_gain_meters = trail
        .windows(2)
        .filter_map(|w| match (w[0].altitude, w[1].altitude) {
            (Some(from), Some(to)) if to > from => Some(to - from),
            _ => None,
        })
        .sum();

    let average_pace_sec_per_km =
        (distance_km > 0.0 && elapsed_sec > 0).then(|| elapsed_sec as f64 / distance_km);

    Ok(TrailSummary {
        distance_km,
        elapsed_sec,
        average_pace_sec_per_km,
        elevation_gain_meters,
        is_loop: is_loop(trail, DEFAULT_LOOP_THRESHOLD_KM),
    })
}

/// Everything the app stores about a finished run.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RunAnalysis {
    pub polyline: Vec<GeoPoint>,
    pub summary: TrailSummary,
    pub intervals: Vec<PaceInterval>,
}

pub fn analyze_run(
    trail: &[GeoPoint],
    units: UnitSystem,
    simplify: &SimplifyOptions,
) -> Result<RunAnalysis> {
    let summary = summarize_trail(trail)?;
    let intervals = compute_intervals(trail, units.interval_km())?;
    let polyline = simplify_with_options(trail, simplify)?;

    log::debug!(
        "analyzed run: {:.3} km, {} s, {} splits, {} -> {} points",
        summary.distance_km,
        summary.elapsed_sec,
        intervals.len(),
        trail.len(),
        polyline.len()
    );

    Ok(RunAnalysis {
        polyline,
        summary,
        intervals,
    })
}
