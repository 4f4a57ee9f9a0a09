//! R-tree based spatial index using the rstar crate.
//!
//! Holds the positions of mobile vertices at the moment the index is built
//! and answers which of them lie strictly inside a circle.

use rstar::{PointDistance, RTree, RTreeObject, AABB};

use crate::geometry::Vector2;
use crate::graph::{VertexGraph, VertexId};

/// A point in the spatial index with associated vertex ID.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VertexPoint {
    /// The vertex identifier.
    pub id: VertexId,
    /// Position when indexed.
    pub position: Vector2,
}

impl RTreeObject for VertexPoint {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        AABB::from_point(self.position.into())
    }
}

impl PointDistance for VertexPoint {
    fn distance_2(&self, point: &[f64; 2]) -> f64 {
        self.position.distance_squared(Vector2::new(point[0], point[1]))
    }
}

/// Spatial index over mobile vertex positions.
///
/// Uses an R*-tree bulk loaded from a graph snapshot; it does not follow
/// later position changes.
pub struct SpatialIndex {
    tree: RTree<VertexPoint>,
}

impl SpatialIndex {
    /// Index the current positions of every mobile vertex in `graph`.
    pub fn from_graph(graph: &VertexGraph) -> Self {
        let mut points = Vec::with_capacity(graph.mobile_count());
        points.extend(graph.mobile_vertices().map(|v| VertexPoint {
            id: v.id(),
            position: v.position,
        }));
        Self {
            tree: RTree::bulk_load(points),
        }
    }

    /// Vertices whose squared distance to `center` is strictly below
    /// `radius²`, in no particular order.
    pub fn strictly_within(
        &self,
        center: Vector2,
        radius: f64,
    ) -> impl Iterator<Item = VertexId> + '_ {
        let radius_sq = radius * radius;
        self.tree
            .locate_within_distance(center.into(), radius_sq)
            .filter(move |p| p.position.distance_squared(center) < radius_sq)
            .map(|p| p.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;

    use crate::graph::AnchorSpec;

    fn index(points: &[(f64, f64)], anchor: Option<(f64, f64)>) -> SpatialIndex {
        let positions: Vec<_> = points.iter().map(|&p| Vector2::from(p)).collect();
        let anchor = anchor.map(|p| AnchorSpec {
            position: Vector2::from(p),
            mass: 4.0,
        });
        SpatialIndex::from_graph(&VertexGraph::new(&positions, &[], anchor).unwrap())
    }

    #[test]
    fn test_strictly_within_excludes_boundary() {
        let index = index(&[(0.0, 0.0), (3.0, 0.0), (5.0, 0.0), (10.0, 0.0)], None);
        let inside: BTreeSet<_> = index.strictly_within(Vector2::ZERO, 5.0).collect();
        assert_eq!(inside, BTreeSet::from([VertexId(0), VertexId(1)]));
    }

    #[test]
    fn test_anchor_not_indexed() {
        let index = index(&[(0.0, 0.0)], Some((1.0, 1.0)));
        let inside: Vec<_> = index.strictly_within(Vector2::new(1.0, 1.0), 3.0).collect();
        assert_eq!(inside, vec![VertexId(0)]);
    }

    #[test]
    fn test_empty() {
        let index = index(&[], None);
        assert_eq!(index.strictly_within(Vector2::ZERO, 100.0).count(), 0);
    }
}
