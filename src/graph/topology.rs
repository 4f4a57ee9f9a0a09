//! VertexGraph - vertices, edges and derived neighbourhoods.
//!
//! The edge set lives in petgraph's StableGraph (undirected). Vertex ids are
//! dense and vertices are never removed mid-run, so a vertex's `NodeIndex`
//! always equals its id. After the edges are inserted every vertex caches its
//! adjacency list and the complement of it (its non-adjacency list), which is
//! what the force model iterates every tick.

use std::collections::HashSet;

use petgraph::stable_graph::{NodeIndex, StableUnGraph};

use super::edge::Edge;
use super::vertex::{Vertex, VertexId};
use crate::error::{Result, SimulationError};
use crate::geometry::Vector2;

/// Placement and mass of the optional anchor vertex.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnchorSpec {
    /// Where the anchor sits (normally the canvas center).
    pub position: Vector2,
    /// Anchor mass.
    pub mass: f64,
}

/// The simulated graph.
///
/// This struct manages:
/// - Edge topology via petgraph
/// - The vertex collection with kinematic state
/// - Cached adjacency and non-adjacency lists per vertex
#[derive(Debug, Clone)]
pub struct VertexGraph {
    /// Undirected topology; node weights are the stable vertex ids.
    graph: StableUnGraph<VertexId, ()>,

    /// Vertices indexed by id. The anchor, if any, is last.
    vertices: Vec<Vertex>,

    /// Edges in insertion order.
    edges: Vec<Edge>,

    /// Id of the anchor vertex.
    anchor: Option<VertexId>,
}

impl VertexGraph {
    /// Build a graph from free-vertex positions, an edge list and an
    /// optional anchor.
    ///
    /// Free vertex `i` receives id `i`; the anchor is appended after them and
    /// takes part in no edges.
    ///
    /// # Errors
    ///
    /// Returns `InvalidParameters` if a position is not finite, if an edge
    /// references a vertex that does not exist (including the anchor) or if
    /// the same edge is listed twice.
    pub fn new(positions: &[Vector2], edges: &[Edge], anchor: Option<AnchorSpec>) -> Result<Self> {
        let free_count = positions.len();
        let total = free_count + usize::from(anchor.is_some());
        if u32::try_from(total).is_err() {
            return Err(SimulationError::invalid_parameters(format!(
                "{total} vertices exceed the supported maximum"
            )));
        }

        if let Some(i) = positions.iter().position(|p| !p.is_finite()) {
            return Err(SimulationError::invalid_parameters(format!(
                "position of V_{i} is not finite: {}",
                positions[i]
            )));
        }

        let mut graph = StableUnGraph::with_capacity(total, edges.len());
        let mut vertices = Vec::with_capacity(total);

        for (i, &position) in positions.iter().enumerate() {
            let id = VertexId(i as u32);
            graph.add_node(id);
            vertices.push(Vertex::new(id, position));
        }

        let anchor_id = anchor.map(|spec| {
            let id = VertexId(free_count as u32);
            graph.add_node(id);
            vertices.push(Vertex::anchor(id, spec.position, spec.mass));
            id
        });

        let mut seen = HashSet::with_capacity(edges.len());
        for &edge in edges {
            if edge.to().index() >= free_count {
                return Err(SimulationError::invalid_parameters(format!(
                    "edge {edge} references a vertex outside 0..{free_count}"
                )));
            }
            if !seen.insert(edge) {
                return Err(SimulationError::invalid_parameters(format!(
                    "edge {edge} is listed more than once"
                )));
            }
            graph.add_edge(
                NodeIndex::new(edge.from().index()),
                NodeIndex::new(edge.to().index()),
                (),
            );
        }

        let mut this = Self {
            graph,
            vertices,
            edges: edges.to_vec(),
            anchor: anchor_id,
        };
        this.derive_neighbourhoods();
        Ok(this)
    }

    /// Fill every vertex's adjacency list from the topology and its
    /// non-adjacency list as the complement over all other vertices.
    ///
    /// Quadratic in the vertex count.
    fn derive_neighbourhoods(&mut self) {
        let total = self.vertices.len();
        let mut marked = vec![false; total];

        for i in 0..total {
            let mut adjacent: Vec<VertexId> = self
                .graph
                .neighbors(NodeIndex::new(i))
                .filter_map(|n| self.graph.node_weight(n).copied())
                .collect();
            adjacent.sort_unstable();
            adjacent.dedup();

            marked.fill(false);
            marked[i] = true;
            for id in &adjacent {
                marked[id.index()] = true;
            }

            let non_adjacent = marked
                .iter()
                .enumerate()
                .filter(|&(_, &is_marked)| !is_marked)
                .map(|(j, _)| VertexId(j as u32))
                .collect();

            let vertex = &mut self.vertices[i];
            vertex.adjacent = adjacent;
            vertex.non_adjacent = non_adjacent;
        }
    }

    // =========================================================================
    // Vertex Access
    // =========================================================================

    /// Number of vertices, anchor included.
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    /// Number of mobile vertices.
    pub fn mobile_count(&self) -> usize {
        self.vertices.len() - usize::from(self.anchor.is_some())
    }

    /// All vertices, indexed by id.
    pub fn vertices(&self) -> &[Vertex] {
        &self.vertices
    }

    pub(crate) fn vertices_mut(&mut self) -> &mut [Vertex] {
        &mut self.vertices
    }

    /// Look up a vertex by id.
    pub fn vertex(&self, id: VertexId) -> Option<&Vertex> {
        self.vertices.get(id.index())
    }

    /// Mobile vertices in id order.
    pub fn mobile_vertices(&self) -> impl Iterator<Item = &Vertex> {
        self.vertices.iter().filter(|v| v.is_mobile())
    }

    /// The anchor vertex, if one was placed.
    pub fn anchor(&self) -> Option<&Vertex> {
        self.anchor.and_then(|id| self.vertex(id))
    }

    // =========================================================================
    // Edge Access
    // =========================================================================

    /// Number of edges.
    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Edges in insertion order.
    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    /// Edge endpoints flattened as [from0, to0, from1, to1, ...].
    pub fn edge_pairs(&self) -> Vec<u32> {
        self.edges
            .iter()
            .flat_map(|e| [e.from().raw(), e.to().raw()])
            .collect()
    }

    // =========================================================================
    // Buffer Export
    // =========================================================================

    /// Positions flattened as [x0, y0, x1, y1, ...], anchor included.
    pub fn positions(&self) -> Vec<f64> {
        self.vertices
            .iter()
            .flat_map(|v| [v.position.x, v.position.y])
            .collect()
    }

    /// Velocities flattened as [vx0, vy0, vx1, vy1, ...], anchor included.
    pub fn velocities(&self) -> Vec<f64> {
        self.vertices
            .iter()
            .flat_map(|v| [v.velocity.x, v.velocity.y])
            .collect()
    }
}
