use crate::core::errors::Result;
use crate::core::options::SimplifyOptions;
use crate::core::types::{validate_points, GeoPoint, Route};
use crate::spatial::geometry::perpendicular_distance_km;

/// Douglas-Peucker simplification with the default 500 point cap.
pub fn simplify_polyline(points: &[GeoPoint], tolerance_km: f64) -> Result<Vec<GeoPoint>> {
    simplify_with_options(points, &SimplifyOptions::with_tolerance(tolerance_km))
}

/// Simplifies `points`, doubling the tolerance and starting over from the
/// original input until the result fits in `options.max_points`. Past the
/// cap, shape fidelity is traded for a bounded point count.
pub fn simplify_with_options(
    points: &[GeoPoint],
    options: &SimplifyOptions,
) -> Result<Vec<GeoPoint>> {
    options.validate()?;
    validate_points(points)?;

    if points.len() <= 2 {
        return Ok(points.to_vec());
    }

    let mut tolerance_km = options.tolerance_km;
    let mut simplified = rdp_simplify(points, tolerance_km);

    while simplified.len() > options.max_points {
        tolerance_km *= 2.0;
        log::debug!(
            "simplified polyline has {} points (cap {}), retrying with tolerance {} km",
            simplified.len(),
            options.max_points,
            tolerance_km
        );
        simplified = rdp_simplify(points, tolerance_km);
    }

    Ok(simplified)
}

impl Route {
    /// Copy of the route with its polyline simplified.
    pub fn simplified(&self, options: &SimplifyOptions) -> Result<Route> {
        Ok(Route {
            polyline: simplify_with_options(&self.polyline, options)?,
            ..self.clone()
        })
    }
}

fn rdp_simplify(points: &[GeoPoint], epsilon: f64) -> Vec<GeoPoint> {
    let len = points.len();

    if len <= 2 {
        return points.to_vec();
    }

    let (index, distance) = find_furthest_point(points);

    if distance > epsilon {
        let mut simplified_first = rdp_simplify(&points[0..=index], epsilon);
        let simplified_second = rdp_simplify(&points[index..], epsilon);

        simplified_first.pop();

        simplified_first.reserve(simplified_second.len());
        simplified_first.extend_from_slice(&simplified_second);
        simplified_first
    } else {
        vec![points[0], points[len - 1]]
    }
}

fn find_furthest_point(points: &[GeoPoint]) -> (usize, f64) {
    let start = &points[0];
    let end = &points[points.len() - 1];

    let mut max_distance = 0.0;
    let mut max_index = 0;

    for (i, point) in points.iter().enumerate().skip(1).take(points.len() - 2) {
        let distance = perpendicular_distance_km(point, start, end);

        if distance > max_distance {
            max_distance = distance;
            max_index = i;
        }
    }

    (max_index, max_distance)
}
