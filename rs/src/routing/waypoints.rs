use crate::core::errors::{Result, RouteError};
use crate::core::types::{GeoPoint, Waypoint};
use crate::routing::assembler::insertion_order;
use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};

/// Orders must be unique and cover `0..len` exactly.
pub fn validate_orders(waypoints: &[Waypoint]) -> Result<()> {
    let mut seen = FxHashSet::default();
    for waypoint in waypoints {
        if waypoint.order >= waypoints.len() || !seen.insert(waypoint.order) {
            return Err(RouteError::InvalidInput(format!(
                "waypoint {} has order {} in a set of {}",
                waypoint.id,
                waypoint.order,
                waypoints.len()
            )));
        }
    }
    Ok(())
}

/// Ordered waypoints of a route being edited. Every mutation renumbers the
/// list so orders stay zero-based and contiguous. Stored as a plain array;
/// deserializing goes through `from_waypoints`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Waypoint>", into = "Vec<Waypoint>")]
pub struct WaypointList {
    waypoints: Vec<Waypoint>,
}

impl WaypointList {
    pub fn new() -> Self {
        WaypointList::default()
    }

    pub fn from_points(points: &[GeoPoint]) -> Result<Self> {
        let mut list = WaypointList::new();
        for point in points {
            list.push(*point)?;
        }
        Ok(list)
    }

    /// Accepts waypoints in any sequence and sorts them by `order`.
    pub fn from_waypoints(mut waypoints: Vec<Waypoint>) -> Result<Self> {
        validate_orders(&waypoints)?;
        for waypoint in &waypoints {
            waypoint.point.validate()?;
        }
        waypoints.sort_by_key(|w| w.order);
        Ok(WaypointList { waypoints })
    }

    pub fn len(&self) -> usize {
        self.waypoints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.waypoints.is_empty()
    }

    pub fn as_slice(&self) -> &[Waypoint] {
        &self.waypoints
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Waypoint> {
        self.waypoints.iter()
    }

    pub fn get(&self, id: &str) -> Option<&Waypoint> {
        self.waypoints.iter().find(|w| w.id == id)
    }

    pub fn points(&self) -> Vec<GeoPoint> {
        self.waypoints.iter().map(|w| w.point).collect()
    }

    pub fn into_vec(self) -> Vec<Waypoint> {
        self.waypoints
    }

    pub fn push(&mut self, point: GeoPoint) -> Result<&Waypoint> {
        self.insert(self.waypoints.len(), point)
    }

    pub fn insert(&mut self, order: usize, point: GeoPoint) -> Result<&Waypoint> {
        point.validate()?;
        if order > self.waypoints.len() {
            return Err(RouteError::InvalidInput(format!(
                "cannot insert waypoint at {} into a list of {}",
                order,
                self.waypoints.len()
            )));
        }

        self.waypoints.insert(order, Waypoint::new(point, order));
        self.renumber();
        Ok(&self.waypoints[order])
    }

    /// Inserts a point the user placed near `polyline`, in the position
    /// its location along the path implies rather than at the end.
    pub fn insert_near_polyline(
        &mut self,
        polyline: &[GeoPoint],
        point: GeoPoint,
    ) -> Result<&Waypoint> {
        let order = insertion_order(polyline, &self.waypoints, &point)?;
        self.insert(order, point)
    }

    pub fn remove(&mut self, id: &str) -> Option<Waypoint> {
        let position = self.waypoints.iter().position(|w| w.id == id)?;
        let removed = self.waypoints.remove(position);
        self.renumber();
        Some(removed)
    }

    /// Relocates a waypoint without changing its place in the sequence.
    pub fn move_to(&mut self, id: &str, point: GeoPoint) -> Result<()> {
        point.validate()?;
        let waypoint = self
            .waypoints
            .iter_mut()
            .find(|w| w.id == id)
            .ok_or_else(|| RouteError::InvalidInput(format!("unknown waypoint {}", id)))?;
        waypoint.point = point;
        Ok(())
    }

    fn renumber(&mut self) {
        for (order, waypoint) in self.waypoints.iter_mut().enumerate() {
            waypoint.order = order;
        }
    }
}

impl TryFrom<Vec<Waypoint>> for WaypointList {
    type Error = RouteError;

    fn try_from(waypoints: Vec<Waypoint>) -> Result<Self> {
        WaypointList::from_waypoints(waypoints)
    }
}

impl From<WaypointList> for Vec<Waypoint> {
    fn from(list: WaypointList) -> Self {
        list.waypoints
    }
}

impl<'a> IntoIterator for &'a WaypointList {
    type Item = &'a Waypoint;
    type IntoIter = std::slice::Iter<'a, Waypoint>;

    fn into_iter(self) -> Self::IntoIter {
        self.waypoints.iter()
    }
}
