use crate::core::types::GeoPoint;

pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Planar scale used by `perpendicular_distance_km` on both axes.
pub const FLAT_KM_PER_DEGREE: f64 = 111.32;

/// Scale used when offsetting points by a distance.
pub const KM_PER_DEGREE_LAT: f64 = 111.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DegreesPerKm {
    pub lat_deg_per_km: f64,
    pub lng_deg_per_km: f64,
}

pub fn haversine_distance_km(a: &GeoPoint, b: &GeoPoint) -> f64 {
    let lat1_rad = a.latitude.to_radians();
    let lat2_rad = b.latitude.to_radians();

    let dlat = lat2_rad - lat1_rad;
    let dlon = (b.longitude - a.longitude).to_radians();

    let h =
        (dlat / 2.0).sin().powi(2) + lat1_rad.cos() * lat2_rad.cos() * (dlon / 2.0).sin().powi(2);
    let c = 2.0 * h.sqrt().atan2((1.0 - h).sqrt());

    EARTH_RADIUS_KM * c
}

/// Distance from `point` to the nearest point of the segment
/// `[line_start, line_end]`.
///
/// Degrees are treated as planar coordinates with a fixed 111.32 km/degree
/// on both axes, independent of latitude. Longitude distances are therefore
/// overstated away from the equator; simplification output depends on this
/// scale, so keep it unless pruning behaviour is meant to change.
pub fn perpendicular_distance_km(point: &GeoPoint, line_start: &GeoPoint, line_end: &GeoPoint) -> f64 {
    let p = planar(point);
    let a = planar(line_start);
    let b = planar(line_end);

    let ab_x = b[0] - a[0];
    let ab_y = b[1] - a[1];
    let length_sq = ab_x * ab_x + ab_y * ab_y;

    if length_sq == 0.0 {
        return (p[0] - a[0]).hypot(p[1] - a[1]);
    }

    let t = (((p[0] - a[0]) * ab_x + (p[1] - a[1]) * ab_y) / length_sq).clamp(0.0, 1.0);

    let closest_x = a[0] + t * ab_x;
    let closest_y = a[1] + t * ab_y;

    (p[0] - closest_x).hypot(p[1] - closest_y)
}

fn planar(point: &GeoPoint) -> [f64; 2] {
    [
        point.longitude * FLAT_KM_PER_DEGREE,
        point.latitude * FLAT_KM_PER_DEGREE,
    ]
}

/// Degree deltas covering one kilometre at `at_latitude`. Blows up near
/// the poles, which are outside the supported domain.
pub fn degrees_per_km(at_latitude: f64) -> DegreesPerKm {
    let lat_deg_per_km = 1.0 / KM_PER_DEGREE_LAT;
    DegreesPerKm {
        lat_deg_per_km,
        lng_deg_per_km: lat_deg_per_km / at_latitude.to_radians().cos(),
    }
}

/// Moves `origin` by the given kilometres north and east. Longitude wraps
/// across the antimeridian.
pub fn offset_point(origin: &GeoPoint, north_km: f64, east_km: f64) -> GeoPoint {
    let scale = degrees_per_km(origin.latitude);
    let latitude = origin.latitude + north_km * scale.lat_deg_per_km;
    let mut longitude = origin.longitude + east_km * scale.lng_deg_per_km;

    if longitude > 180.0 {
        longitude -= 360.0;
    } else if longitude < -180.0 {
        longitude += 360.0;
    }

    GeoPoint::new(latitude, longitude)
}

/// Haversine length of a path.
pub fn path_length_km(points: &[GeoPoint]) -> f64 {
    points
        .windows(2)
        .map(|w| haversine_distance_km(&w[0], &w[1]))
        .sum()
}
