//! Random graph generation.
//!
//! Vertices are scattered uniformly over the world and clamped into the
//! placement area. Edges are drawn as two independent uniform vertex ids;
//! a draw is kept only when the first id is strictly smaller than the second
//! and the pair is not already present, otherwise it is redrawn. Both rules
//! together give exactly `edge_count` distinct edges and no self loops.

use std::collections::HashSet;

use rand::Rng;
use tracing::debug;

use super::edge::Edge;
use super::topology::{AnchorSpec, VertexGraph};
use super::vertex::VertexId;
use crate::error::{Result, SimulationError};
use crate::geometry::Vector2;
use crate::physics::params::{PhysicsParams, World, max_edge_count};

/// Random initial position: uniform over the world shifted by one unit, then
/// clamped into the placement area.
pub fn random_position<R: Rng + ?Sized>(world: &World, rng: &mut R) -> Vector2 {
    let raw = Vector2::new(
        rng.r#gen::<f64>() * world.width + 1.0,
        rng.r#gen::<f64>() * world.height + 1.0,
    );
    world.clamp_to_placement(raw)
}

/// Draw `edge_count` distinct edges over `vertex_count` vertices.
///
/// # Errors
///
/// Returns `InvalidParameters` if more edges are requested than there are
/// distinct pairs; the draw loop would never finish otherwise.
pub fn random_edges<R: Rng + ?Sized>(
    vertex_count: usize,
    edge_count: usize,
    rng: &mut R,
) -> Result<Vec<Edge>> {
    let max_edges = max_edge_count(vertex_count);
    if edge_count as u128 > max_edges {
        return Err(SimulationError::invalid_parameters(format!(
            "cannot draw {edge_count} distinct edges from {max_edges} pairs"
        )));
    }

    let mut edges = Vec::with_capacity(edge_count);
    let mut seen = HashSet::with_capacity(edge_count);
    let mut rejected = 0u64;

    while edges.len() < edge_count {
        let from = rng.gen_range(0..vertex_count);
        let to = rng.gen_range(0..vertex_count);
        let candidate = (from < to)
            .then(|| Edge::new(VertexId(from as u32), VertexId(to as u32)))
            .flatten();
        match candidate {
            Some(edge) if seen.insert(edge) => edges.push(edge),
            _ => rejected += 1,
        }
    }

    debug!(vertex_count, edge_count, rejected, "drew random edges");
    Ok(edges)
}

/// Generate the graph for a run: random positions, random edges, and the
/// anchor at the world center when enabled.
///
/// # Errors
///
/// Returns `InvalidParameters` if the edge count cannot be satisfied.
pub fn generate<R: Rng + ?Sized>(physics: &PhysicsParams, rng: &mut R) -> Result<VertexGraph> {
    let world = physics.world;
    let positions: Vec<Vector2> = (0..physics.vertex_count)
        .map(|_| random_position(&world, rng))
        .collect();
    let edges = random_edges(physics.vertex_count, physics.edge_count, rng)?;
    let anchor = physics.use_anchor.then(|| AnchorSpec {
        position: world.center(),
        mass: physics.factors.anchor_mass,
    });

    VertexGraph::new(&positions, &edges, anchor)
}
