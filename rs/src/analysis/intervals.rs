use crate::core::errors::{Result, RouteError};
use crate::core::types::{validate_points, GeoPoint, PaceInterval};
use crate::spatial::geometry::haversine_distance_km;

/// Shortest trailing remainder reported as its own split.
pub const MIN_PARTIAL_INTERVAL_KM: f64 = 0.1;

#[derive(Debug, Default)]
struct OpenInterval {
    distance_km: f64,
    start_elapsed_sec: f64,
    elevation_gain_meters: f64,
    has_altitude: bool,
}

impl OpenInterval {
    fn starting_at(elapsed_sec: f64) -> Self {
        OpenInterval {
            start_elapsed_sec: elapsed_sec,
            ..OpenInterval::default()
        }
    }

    fn add_climb(&mut self, climb: Option<f64>, fraction: f64) {
        if let Some(meters) = climb {
            self.elevation_gain_meters += meters * fraction;
            self.has_altitude = true;
        }
    }

    /// Durations are differences of rounded boundary times, so the splits
    /// of a run add up to its rounded elapsed time.
    fn close(self, distance_km: f64, end_elapsed_sec: f64) -> PaceInterval {
        let elapsed = end_elapsed_sec - self.start_elapsed_sec;
        PaceInterval {
            distance_km,
            pace_sec_per_km: elapsed / distance_km,
            duration_sec: (end_elapsed_sec.round() - self.start_elapsed_sec.round()) as u64,
            elevation_gain_meters: self.has_altitude.then_some(self.elevation_gain_meters),
        }
    }
}

/// Splits a timestamped trail into consecutive intervals of
/// `interval_km`.
///
/// Boundaries fall inside segments; time and climb are interpolated
/// linearly across them. A remainder of at least 0.1 km after the last
/// full interval becomes a final partial interval with its own distance;
/// a shorter remainder is dropped.
pub fn compute_intervals(trail: &[GeoPoint], interval_km: f64) -> Result<Vec<PaceInterval>> {
    if !interval_km.is_finite() || interval_km <= 0.0 {
        return Err(RouteError::InvalidInput(format!(
            "interval distance must be positive, got {}",
            interval_km
        )));
    }
    if trail.len() < 2 {
        return Err(RouteError::InvalidInput(format!(
            "interval computation needs at least 2 points, got {}",
            trail.len()
        )));
    }
    validate_points(trail)?;

    let start_ms = timestamp(&trail[0], 0)?;
    let mut intervals = Vec::new();
    let mut current = OpenInterval::starting_at(0.0);
    let mut end_elapsed_sec = 0.0;

    for (i, pair) in trail.windows(2).enumerate() {
        let (a, b) = (&pair[0], &pair[1]);
        let t_a = elapsed_sec(timestamp(a, i)?, start_ms);
        let t_b = elapsed_sec(timestamp(b, i + 1)?, start_ms);
        if t_b < t_a {
            return Err(RouteError::InvalidInput(format!(
                "trail timestamps go backwards at point {}",
                i + 1
            )));
        }

        let segment_km = haversine_distance_km(a, b);
        let climb = match (a.altitude, b.altitude) {
            (Some(from), Some(to)) => Some((to - from).max(0.0)),
            _ => None,
        };

        let mut consumed = 0.0;
        while segment_km > 0.0
            && current.distance_km + segment_km * (1.0 - consumed) >= interval_km
        {
            let fraction = consumed + (interval_km - current.distance_km) / segment_km;
            let boundary_sec = t_a + fraction * (t_b - t_a);

            current.add_climb(climb, fraction - consumed);
            let closed = std::mem::replace(&mut current, OpenInterval::starting_at(boundary_sec));
            intervals.push(closed.close(interval_km, boundary_sec));
            consumed = fraction;
        }

        current.distance_km += segment_km * (1.0 - consumed);
        current.add_climb(climb, 1.0 - consumed);
        end_elapsed_sec = t_b;
    }

    if current.distance_km >= MIN_PARTIAL_INTERVAL_KM {
        let distance_km = current.distance_km;
        intervals.push(current.close(distance_km, end_elapsed_sec));
    }

    Ok(intervals)
}

fn timestamp(point: &GeoPoint, index: usize) -> Result<i64> {
    point.timestamp.ok_or_else(|| {
        RouteError::InvalidInput(format!("trail point {} has no timestamp", index))
    })
}

fn elapsed_sec(timestamp_ms: i64, start_ms: i64) -> f64 {
    (timestamp_ms - start_ms) as f64 / 1000.0
}
