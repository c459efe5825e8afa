use crate::core::errors::{Result, RouteError};
use crate::core::types::{GeoPoint, Route};
use geo_types::Coord;

/// Precision of the encoded polyline format used by Google and Strava.
pub const POLYLINE_PRECISION: u32 = 5;

pub fn decode_polyline(encoded: &str) -> Result<Vec<GeoPoint>> {
    let line = polyline::decode_polyline(encoded, POLYLINE_PRECISION)
        .map_err(|e| RouteError::PolylineDecode(e.to_string()))?;

    Ok(line
        .coords()
        .map(|coord| GeoPoint::new(coord.y, coord.x))
        .collect())
}

pub fn encode_polyline(points: &[GeoPoint]) -> Result<String> {
    let coords = points.iter().map(|p| Coord {
        x: p.longitude,
        y: p.latitude,
    });

    polyline::encode_coordinates(coords, POLYLINE_PRECISION)
        .map_err(|e| RouteError::PolylineDecode(e.to_string()))
}

impl Route {
    pub fn encoded_polyline(&self) -> Result<String> {
        encode_polyline(&self.polyline)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_reference_polyline() {
        // Example from Google's encoded polyline documentation.
        let points = decode_polyline("_p~iF~ps|U_ulLnnqC_mqNvxq`@").unwrap();
        assert_eq!(points.len(), 3);
        assert!((points[0].latitude - 38.5).abs() < 1e-6);
        assert!((points[0].longitude + 120.2).abs() < 1e-6);
        assert!((points[2].latitude - 43.252).abs() < 1e-6);
        assert!((points[2].longitude + 126.453).abs() < 1e-6);
    }

    #[test]
    fn encodes_reference_polyline() {
        let points = vec![
            GeoPoint::new(38.5, -120.2),
            GeoPoint::new(40.7, -120.95),
            GeoPoint::new(43.252, -126.453),
        ];
        assert_eq!(encode_polyline(&points).unwrap(), "_p~iF~ps|U_ulLnnqC_mqNvxq`@");
    }
}
