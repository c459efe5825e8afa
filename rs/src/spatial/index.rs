use crate::core::types::GeoPoint;
use rstar::{PointDistance, RTree, RTreeObject, AABB};

/// One vertex of an indexed polyline, stored in a local equirectangular
/// projection so nearest-neighbour queries agree with ground distance.
#[derive(Debug, Clone, PartialEq)]
pub struct PolylineSample {
    pub index: usize,
    pub position: [f64; 2],
}

impl RTreeObject for PolylineSample {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        AABB::from_point(self.position)
    }
}

impl PointDistance for PolylineSample {
    fn distance_2(&self, point: &[f64; 2]) -> f64 {
        let dx = self.position[0] - point[0];
        let dy = self.position[1] - point[1];
        dx * dx + dy * dy
    }
}

pub struct PolylineIndex {
    tree: RTree<PolylineSample>,
    lng_scale: f64,
}

impl PolylineIndex {
    pub fn build(polyline: &[GeoPoint]) -> Self {
        let lng_scale = polyline
            .first()
            .map(|p| p.latitude.to_radians().cos())
            .unwrap_or(1.0);

        let samples = polyline
            .iter()
            .enumerate()
            .map(|(index, point)| PolylineSample {
                index,
                position: project(point, lng_scale),
            })
            .collect();

        PolylineIndex {
            tree: RTree::bulk_load(samples),
            lng_scale,
        }
    }

    pub fn len(&self) -> usize {
        self.tree.size()
    }

    pub fn is_empty(&self) -> bool {
        self.tree.size() == 0
    }

    /// Index of the polyline vertex closest to `point`. Equidistant
    /// vertices resolve to the earliest one, so the shared start/end of a
    /// loop maps to index 0.
    pub fn nearest_index(&self, point: &GeoPoint) -> Option<usize> {
        let query = project(point, self.lng_scale);
        let mut candidates = self.tree.nearest_neighbor_iter_with_distance_2(&query);
        let (first, best_distance) = candidates.next()?;

        let mut best_index = first.index;
        for (sample, distance) in candidates {
            if distance > best_distance {
                break;
            }
            best_index = best_index.min(sample.index);
        }

        Some(best_index)
    }
}

fn project(point: &GeoPoint, lng_scale: f64) -> [f64; 2] {
    [point.longitude * lng_scale, point.latitude]
}
