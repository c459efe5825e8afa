use crate::core::errors::{Result, RouteError, NO_ROUTE_FOUND};
use crate::core::types::{validate_points, GeoPoint, Route, Waypoint};
use crate::routing::waypoints::{validate_orders, WaypointList};
use crate::routing::{DirectionsPath, DirectionsProvider};
use crate::spatial::index::PolylineIndex;
use uuid::Uuid;

/// Builds a non-loop route from start through the waypoints, in their
/// `order`, to end. One provider call; waypoints are never invented.
pub async fn assemble_route<P: DirectionsProvider>(
    provider: &P,
    start: &GeoPoint,
    end: &GeoPoint,
    waypoints: &[Waypoint],
) -> Result<Route> {
    let waypoints = WaypointList::from_waypoints(waypoints.to_vec())?;
    let path = request_path(provider, start, end, &waypoints).await?;

    Ok(Route {
        id: Uuid::new_v4().to_string(),
        start: *start,
        end: *end,
        waypoints: waypoints.into_vec(),
        distance_km: path.distance_km(),
        estimated_duration_sec: path.duration_sec(),
        polyline: path.polyline,
        is_loop: false,
        target_distance_km: None,
        name: None,
    })
}

/// Re-requests the path of an existing route after its waypoints were
/// edited. Identity, name and target carry over; a loop stays a loop.
pub async fn reroute<P: DirectionsProvider>(
    provider: &P,
    route: &Route,
    waypoints: WaypointList,
) -> Result<Route> {
    let path = request_path(provider, &route.start, &route.end, &waypoints).await?;

    log::debug!(
        "rerouted {} through {} waypoints: {:.3} km -> {:.3} km",
        route.id,
        waypoints.len(),
        route.distance_km,
        path.distance_km()
    );

    Ok(Route {
        id: route.id.clone(),
        start: route.start,
        end: route.end,
        waypoints: waypoints.into_vec(),
        distance_km: path.distance_km(),
        estimated_duration_sec: path.duration_sec(),
        polyline: path.polyline,
        is_loop: route.is_loop && route.start.same_position(&route.end),
        target_distance_km: route.target_distance_km,
        name: route.name.clone(),
    })
}

async fn request_path<P: DirectionsProvider>(
    provider: &P,
    start: &GeoPoint,
    end: &GeoPoint,
    waypoints: &WaypointList,
) -> Result<DirectionsPath> {
    start.validate()?;
    end.validate()?;

    let points = waypoints.points();
    let path = provider
        .get_path(start, end, &points)
        .await
        .map_err(|e| match e {
            RouteError::InvalidInput(_) => e,
            other => RouteError::RoutingUnavailable(other.provider_message()),
        })?;

    if !path.is_usable() {
        log::warn!(
            "directions provider returned an unusable path ({} points, {} segments)",
            path.polyline.len(),
            path.segments.len()
        );
        return Err(RouteError::RoutingUnavailable(NO_ROUTE_FOUND.to_string()));
    }

    Ok(path)
}

/// Sequence position for a waypoint added at `point` near `polyline`.
///
/// Each existing waypoint and the new point are matched to their closest
/// polyline vertex; the new waypoint goes after every existing waypoint
/// whose vertex comes earlier along the path. Click order plays no part.
pub fn insertion_order(
    polyline: &[GeoPoint],
    existing: &[Waypoint],
    point: &GeoPoint,
) -> Result<usize> {
    if polyline.len() < 2 {
        return Err(RouteError::InvalidInput(format!(
            "cannot place a waypoint along a polyline of {} points",
            polyline.len()
        )));
    }
    point.validate()?;
    validate_points(polyline)?;
    validate_orders(existing)?;

    let index = PolylineIndex::build(polyline);
    let Some(new_index) = index.nearest_index(point) else {
        return Ok(existing.len());
    };

    let mut earlier = 0;
    for waypoint in existing {
        if let Some(existing_index) = index.nearest_index(&waypoint.point) {
            if existing_index < new_index {
                earlier += 1;
            }
        }
    }

    Ok(earlier)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pt(lat: f64, lng: f64) -> GeoPoint {
        GeoPoint::new(lat, lng)
    }

    fn straight_line() -> Vec<GeoPoint> {
        (0..=20).map(|i| pt(10.0, 20.0 + i as f64 * 0.001)).collect()
    }

    #[test]
    fn insertion_order_follows_path_not_click_order() {
        let polyline = straight_line();
        // Existing waypoints were added out of path order.
        let existing = vec![
            Waypoint::new(pt(10.0001, 20.015), 0),
            Waypoint::new(pt(10.0001, 20.004), 1),
        ];

        assert_eq!(insertion_order(&polyline, &existing, &pt(10.0, 20.001)).unwrap(), 0);
        assert_eq!(insertion_order(&polyline, &existing, &pt(10.0, 20.010)).unwrap(), 1);
        assert_eq!(insertion_order(&polyline, &existing, &pt(10.0, 20.019)).unwrap(), 2);
    }

    #[test]
    fn insertion_order_with_no_waypoints_is_zero() {
        assert_eq!(insertion_order(&straight_line(), &[], &pt(10.0, 20.01)).unwrap(), 0);
    }

    #[test]
    fn insertion_order_needs_a_polyline() {
        let err = insertion_order(&[pt(10.0, 20.0)], &[], &pt(10.0, 20.0)).unwrap_err();
        assert!(matches!(err, RouteError::InvalidInput(_)));
    }

    #[test]
    fn insertion_order_rejects_bad_point() {
        assert!(insertion_order(&straight_line(), &[], &pt(f64::NAN, 0.0)).is_err());
    }
}
