use crate::core::types::{GeoPoint, Route};
use crate::spatial::geometry::haversine_distance_km;
use rayon::prelude::*;

pub const DEFAULT_DUPLICATE_TOLERANCE_KM: f64 = 0.05;

/// Points compared at each end of the two polylines.
pub const DUPLICATE_SAMPLE_POINTS: usize = 10;

/// Approximate "same route" check for the save flow.
///
/// Only the first and last ten points are compared pairwise; the middle of
/// the route is never looked at. Two routes that share both end
/// neighbourhoods but diverge in between are reported equal. Polylines
/// shorter than ten points are never equal.
pub fn polylines_equal(a: &[GeoPoint], b: &[GeoPoint], tolerance_km: f64) -> bool {
    let n = DUPLICATE_SAMPLE_POINTS;
    if a.len() < n || b.len() < n {
        return false;
    }

    let heads = a[..n].iter().zip(&b[..n]);
    let tails = a[a.len() - n..].iter().zip(&b[b.len() - n..]);

    heads
        .chain(tails)
        .all(|(p, q)| haversine_distance_km(p, q) <= tolerance_km)
}

/// First saved route whose polyline matches `candidate`, scanning the
/// saved set in parallel.
pub fn find_duplicate<'a>(
    candidate: &[GeoPoint],
    saved: &'a [Route],
    tolerance_km: f64,
) -> Option<&'a Route> {
    saved
        .par_iter()
        .find_first(|route| polylines_equal(candidate, &route.polyline, tolerance_km))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(n: usize, lat: f64) -> Vec<GeoPoint> {
        (0..n).map(|i| GeoPoint::new(lat, 4.0 + i as f64 * 0.001)).collect()
    }

    fn route(id: &str, polyline: Vec<GeoPoint>) -> Route {
        Route {
            id: id.to_string(),
            start: polyline[0],
            end: polyline[polyline.len() - 1],
            waypoints: Vec::new(),
            polyline,
            distance_km: 0.0,
            estimated_duration_sec: 0,
            is_loop: false,
            target_distance_km: None,
            name: None,
        }
    }

    #[test]
    fn fewer_than_ten_points_never_equal() {
        let short = line(9, 52.0);
        assert!(!polylines_equal(&short, &short, DEFAULT_DUPLICATE_TOLERANCE_KM));
        assert!(!polylines_equal(&short, &line(30, 52.0), 1000.0));
        assert!(!polylines_equal(&[], &[], 1000.0));
    }

    #[test]
    fn identical_polylines_are_equal() {
        let a = line(25, 52.0);
        assert!(polylines_equal(&a, &a, DEFAULT_DUPLICATE_TOLERANCE_KM));
        assert!(polylines_equal(&a, &a, 0.0));
    }

    #[test]
    fn small_offset_within_tolerance() {
        // 0.0003 degrees of latitude is about 33 m.
        assert!(polylines_equal(&line(20, 52.0), &line(20, 52.0003), 0.05));
        assert!(!polylines_equal(&line(20, 52.0), &line(20, 52.001), 0.05));
    }

    #[test]
    fn known_limitation_middle_is_ignored() {
        // Same first and last ten points, completely different middle.
        let a = line(40, 52.0);
        let mut b = a.clone();
        for p in &mut b[10..30] {
            p.latitude += 0.05;
        }
        assert!(polylines_equal(&a, &b, DEFAULT_DUPLICATE_TOLERANCE_KM));
    }

    #[test]
    fn different_lengths_compare_ends() {
        let a = line(20, 52.0);
        let mut b = a[..10].to_vec();
        b.extend_from_slice(&a[5..15]);
        b.extend_from_slice(&a[10..]);
        assert!(polylines_equal(&a, &b, DEFAULT_DUPLICATE_TOLERANCE_KM));
    }

    #[test]
    fn find_duplicate_returns_first_match() {
        let candidate = line(20, 52.0);
        let saved = vec![
            route("other", line(20, 48.0)),
            route("match-1", line(20, 52.0001)),
            route("match-2", line(20, 52.0)),
        ];
        let found = find_duplicate(&candidate, &saved, DEFAULT_DUPLICATE_TOLERANCE_KM).unwrap();
        assert_eq!(found.id, "match-1");
        assert!(find_duplicate(&candidate, &saved[..1], DEFAULT_DUPLICATE_TOLERANCE_KM).is_none());
    }
}
