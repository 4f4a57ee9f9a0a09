//! Region queries and independence checking.
//!
//! A region query proposes every mobile vertex strictly inside a circle as a
//! candidate independent set and checks it. The check walks each member's
//! adjacency list and looks its neighbours up in the member set, so it costs
//! O(members × average degree) rather than O(members²).
//!
//! Queries only read the graph.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::error::{Result, SimulationError};
use crate::geometry::Vector2;
use crate::graph::{Edge, VertexGraph, VertexId};
use crate::spatial::SpatialIndex;

/// A circular region in simulation space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegionQuery {
    /// Center X.
    pub center_x: f64,
    /// Center Y.
    pub center_y: f64,
    /// Radius; the boundary itself is outside the region.
    pub radius: f64,
}

impl RegionQuery {
    /// Create a region query.
    pub fn new(center_x: f64, center_y: f64, radius: f64) -> Self {
        Self {
            center_x,
            center_y,
            radius,
        }
    }

    /// The circle's center.
    pub fn center(&self) -> Vector2 {
        Vector2::new(self.center_x, self.center_y)
    }

    /// Check the region is well formed.
    ///
    /// # Errors
    ///
    /// Returns `InvalidParameters` for a non-finite center or a negative or
    /// non-finite radius.
    pub fn validate(&self) -> Result<()> {
        if !self.center().is_finite() {
            return Err(SimulationError::invalid_parameters(format!(
                "region center must be finite, got {}",
                self.center()
            )));
        }
        if !(self.radius.is_finite() && self.radius >= 0.0) {
            return Err(SimulationError::invalid_parameters(format!(
                "region radius must be finite and non-negative, got {}",
                self.radius
            )));
        }
        Ok(())
    }
}

/// Outcome of a region query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryResult {
    /// Mobile vertices strictly inside the region, ascending by id.
    pub members: BTreeSet<VertexId>,
    /// True unless two members share an edge.
    pub is_independent: bool,
    /// First adjacent pair found among the members.
    pub conflict: Option<Edge>,
}

impl QueryResult {
    /// Number of members.
    pub fn size(&self) -> usize {
        self.members.len()
    }

    /// Member names (`V_<id>`) in id order.
    pub fn member_names(&self) -> Vec<String> {
        self.members.iter().map(ToString::to_string).collect()
    }

    /// Member names, one per line.
    pub fn display_list(&self) -> String {
        self.member_names().join("\n")
    }

    /// One-line verdict for display.
    pub fn summary(&self) -> String {
        if self.is_independent {
            format!("Success! An independent set of size {}!", self.size())
        } else {
            "Uh, oh! It appears that this set is not independent.".to_string()
        }
    }
}

/// Collect the mobile vertices inside `region` and check their independence.
pub fn query_region(graph: &VertexGraph, region: &RegionQuery) -> QueryResult {
    let index = SpatialIndex::from_graph(graph);
    let members: BTreeSet<VertexId> = index
        .strictly_within(region.center(), region.radius)
        .collect();

    let conflict = find_conflict(graph, &members);

    QueryResult {
        is_independent: conflict.is_none(),
        members,
        conflict,
    }
}

/// First edge with both endpoints in `members`, scanning members in id order.
fn find_conflict(graph: &VertexGraph, members: &BTreeSet<VertexId>) -> Option<Edge> {
    members.iter().find_map(|&id| {
        graph
            .vertex(id)?
            .adjacent()
            .iter()
            .find(|neighbour| members.contains(neighbour))
            .and_then(|&neighbour| Edge::new(id, neighbour))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::AnchorSpec;

    fn edge(a: u32, b: u32) -> Edge {
        Edge::new(VertexId(a), VertexId(b)).unwrap()
    }

    fn five_vertices(edges: &[Edge]) -> VertexGraph {
        let positions = [
            Vector2::new(50.0, 50.0),
            Vector2::new(55.0, 52.0),
            Vector2::new(45.0, 47.0),
            Vector2::new(80.0, 50.0),
            Vector2::new(50.0, 10.0),
        ];
        VertexGraph::new(&positions, edges, None).unwrap()
    }

    #[test]
    fn test_independent_region() {
        // Edges only touch the two outside vertices.
        let graph = five_vertices(&[edge(0, 3), edge(1, 4), edge(3, 4)]);
        let result = query_region(&graph, &RegionQuery::new(50.0, 50.0, 10.0));

        assert_eq!(result.size(), 3);
        assert!(result.is_independent);
        assert_eq!(result.conflict, None);
        assert_eq!(result.member_names(), vec!["V_0", "V_1", "V_2"]);
        assert_eq!(result.display_list(), "V_0\nV_1\nV_2");
        assert_eq!(result.summary(), "Success! An independent set of size 3!");
    }

    #[test]
    fn test_adjacent_members_detected() {
        let graph = five_vertices(&[edge(2, 1), edge(0, 4)]);
        let result = query_region(&graph, &RegionQuery::new(50.0, 50.0, 10.0));

        assert_eq!(result.size(), 3);
        assert!(!result.is_independent);
        assert_eq!(result.conflict, Some(edge(1, 2)));
        assert_eq!(
            result.summary(),
            "Uh, oh! It appears that this set is not independent."
        );
    }

    #[test]
    fn test_boundary_is_excluded() {
        let positions = [Vector2::new(10.0, 0.0), Vector2::new(0.0, 9.999)];
        let graph = VertexGraph::new(&positions, &[edge(0, 1)], None).unwrap();
        let result = query_region(&graph, &RegionQuery::new(0.0, 0.0, 10.0));

        assert_eq!(result.members.into_iter().collect::<Vec<_>>(), vec![VertexId(1)]);
        assert!(result.is_independent);
    }

    #[test]
    fn test_anchor_never_a_member() {
        let anchor = AnchorSpec {
            position: Vector2::new(50.0, 50.0),
            mass: 4.0,
        };
        let graph = VertexGraph::new(&[Vector2::new(51.0, 50.0)], &[], Some(anchor)).unwrap();
        let result = query_region(&graph, &RegionQuery::new(50.0, 50.0, 10.0));

        assert_eq!(result.size(), 1);
        assert!(result.members.contains(&VertexId(0)));
    }

    #[test]
    fn test_empty_region_is_independent() {
        let graph = five_vertices(&[edge(0, 1)]);
        let result = query_region(&graph, &RegionQuery::new(500.0, 500.0, 1.0));
        assert!(result.members.is_empty());
        assert!(result.is_independent);
        assert_eq!(result.summary(), "Success! An independent set of size 0!");
    }

    #[test]
    fn test_query_does_not_mutate() {
        let graph = five_vertices(&[edge(0, 1)]);
        let before = graph.positions();
        let _ = query_region(&graph, &RegionQuery::new(50.0, 50.0, 10.0));
        assert_eq!(graph.positions(), before);
    }

    #[test]
    fn test_validate() {
        assert!(RegionQuery::new(0.0, 0.0, 0.0).validate().is_ok());
        assert!(RegionQuery::new(0.0, 0.0, -1.0).validate().is_err());
        assert!(RegionQuery::new(f64::NAN, 0.0, 1.0).validate().is_err());
        assert!(RegionQuery::new(0.0, 0.0, f64::INFINITY).validate().is_err());
    }

    #[test]
    fn test_result_serializes_camel_case() {
        let graph = five_vertices(&[edge(0, 1)]);
        let result = query_region(&graph, &RegionQuery::new(50.0, 50.0, 10.0));
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["members"], serde_json::json!([0, 1, 2]));
        assert_eq!(json["isIndependent"], serde_json::json!(false));
        assert_eq!(json["conflict"]["from"], serde_json::json!(0));
    }
}
