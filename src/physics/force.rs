//! Pairwise force law.
//!
//! Adjacent vertices repel and non-adjacent vertices attract, both with
//! magnitude `factor * m1 * m2 / d²` applied along the raw displacement
//! vector. The displacement is not normalized first, so the effective fall
//! off is `1/d` rather than `1/d²`.
//!
//! The net force is used directly as the acceleration: the mass already
//! enters through the product of both masses and is not divided out again.

use crate::geometry::Vector2;
use crate::graph::{Body, Vertex};
use crate::physics::params::ForceFactors;

/// Substituted for a zero squared distance between repelling vertices.
pub const REPULSION_MIN_DISTANCE_SQ: f64 = 1e-3;

/// Floor of the squared distance between attracting vertices.
pub const ATTRACTION_MIN_DISTANCE_SQ: f64 = 0.01;

/// Repulsion exerted on `target` by the adjacent vertex `source`.
///
/// Points from `source` toward `target`.
#[inline]
pub fn repulsion(target: Body, source: Body, factor: f64) -> Vector2 {
    let displacement = target.position - source.position;
    let mut distance_sq = displacement.length_squared();
    if distance_sq == 0.0 {
        distance_sq = REPULSION_MIN_DISTANCE_SQ;
    }
    displacement * (factor * (target.mass * source.mass) / distance_sq)
}

/// Attraction exerted on `target` by the non-adjacent vertex `source`.
///
/// Points from `target` toward `source`.
#[inline]
pub fn attraction(target: Body, source: Body, factor: f64) -> Vector2 {
    let displacement = source.position - target.position;
    let distance_sq = displacement
        .length_squared()
        .max(ATTRACTION_MIN_DISTANCE_SQ);
    displacement * (factor * (target.mass * source.mass) / distance_sq)
}

/// Sum of all forces acting on `vertices[index]`.
///
/// Reads the current positions of every other vertex, so callers updating
/// vertices in place see the positions already written this tick.
pub fn net_force(vertices: &[Vertex], index: usize, factors: &ForceFactors) -> Vector2 {
    let Some(vertex) = vertices.get(index) else {
        return Vector2::ZERO;
    };
    let target = vertex.body();

    let repelled = vertex
        .adjacent()
        .iter()
        .filter_map(|id| vertices.get(id.index()))
        .fold(Vector2::ZERO, |acc, other| {
            acc + repulsion(target, other.body(), factors.repulsion)
        });

    vertex
        .non_adjacent()
        .iter()
        .filter_map(|id| vertices.get(id.index()))
        .fold(repelled, |acc, other| {
            acc + attraction(target, other.body(), factors.attraction)
        })
}
