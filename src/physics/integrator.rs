//! Fixed-step integrator.
//!
//! Advances every mobile vertex by one tick, in id order and in place:
//!
//! 1. acceleration := net force
//! 2. before-move collisions (wall reflection)
//! 3. x += v·dt + ½·a·dt²
//! 4. v += a·dt
//! 5. v /= friction divisor
//! 6. after-move collisions (vertex pairs, anchor push)
//!
//! Because the update is in place, a vertex sees the positions its
//! lower-numbered neighbours already reached during the same tick.

use crate::graph::VertexGraph;
use crate::physics::collision::{CollisionPhase, CollisionSet};
use crate::physics::force::net_force;
use crate::physics::params::PhysicsParams;

/// Iteration count over which friction halves its strength.
pub const FRICTION_HORIZON: f64 = 3000.0;

/// Velocity divisor applied at `iteration`: `max(1, (3000 + iteration) / 3000)`.
#[inline]
pub fn friction_divisor(iteration: u64) -> f64 {
    ((FRICTION_HORIZON + iteration as f64) / FRICTION_HORIZON).max(1.0)
}

/// Advance all mobile vertices by one tick.
///
/// Anchors are skipped: their position, velocity and acceleration never
/// change.
pub fn step(graph: &mut VertexGraph, physics: &PhysicsParams, collisions: &CollisionSet, iteration: u64) {
    let dt = PhysicsParams::TIME_STEP;
    let divisor = friction_divisor(iteration);
    let world = physics.world;
    let vertices = graph.vertices_mut();

    for i in 0..vertices.len() {
        if !vertices[i].is_mobile() {
            continue;
        }

        let acceleration = net_force(vertices, i, &physics.factors);
        vertices[i].acceleration = acceleration;

        collisions.apply(CollisionPhase::BeforeMove, vertices, i, &world);

        let vertex = &mut vertices[i];
        vertex.position += vertex.velocity * dt + acceleration * (0.5 * dt * dt);
        vertex.velocity += acceleration * dt;
        vertex.velocity /= divisor;

        collisions.apply(CollisionPhase::AfterMove, vertices, i, &world);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Vector2;
    use crate::graph::{AnchorSpec, Edge, VertexId};
    use crate::physics::collision::CollisionPolicy;
    use crate::physics::params::SimulationParameters;
    use rstest::rstest;

    fn physics(vertex_count: i64, edge_count: i64) -> PhysicsParams {
        SimulationParameters::new(vertex_count, edge_count)
            .resolve()
            .unwrap()
    }

    #[rstest]
    #[case(0, 1.0)]
    #[case(1500, 1.5)]
    #[case(3000, 2.0)]
    #[case(6000, 3.0)]
    fn test_friction_divisor(#[case] iteration: u64, #[case] expected: f64) {
        assert_eq!(friction_divisor(iteration), expected);
    }

    #[test]
    fn test_friction_divisor_non_decreasing() {
        let mut previous = friction_divisor(0);
        for iteration in (0..20_000).step_by(250) {
            let current = friction_divisor(iteration);
            assert!(current >= previous);
            previous = current;
        }
    }

    #[test]
    fn test_lone_vertex_coasts_with_friction() {
        let mut graph = VertexGraph::new(&[Vector2::new(100.0, 100.0)], &[], None).unwrap();
        graph.vertices_mut()[0].velocity = Vector2::new(4.0, -2.0);

        step(&mut graph, &physics(1, 0), &CollisionSet::default(), 3000);

        let v = &graph.vertices()[0];
        assert_eq!(v.acceleration, Vector2::ZERO);
        assert_eq!(v.position, Vector2::new(104.0, 98.0));
        assert_eq!(v.velocity, Vector2::new(2.0, -1.0));
    }

    #[test]
    fn test_position_uses_half_acceleration() {
        let positions = [Vector2::new(100.0, 100.0), Vector2::new(110.0, 100.0)];
        let mut graph = VertexGraph::new(&positions, &[], None).unwrap();
        let mut physics = physics(2, 0);
        physics.factors.attraction = 10.0;

        step(&mut graph, &physics, &CollisionSet::default(), 0);

        // Attraction on vertex 0: 10 * (10, 0) / 100 = (1, 0)
        let v0 = &graph.vertices()[0];
        assert_eq!(v0.acceleration, Vector2::new(1.0, 0.0));
        assert_eq!(v0.position, Vector2::new(100.5, 100.0));
        assert_eq!(v0.velocity, Vector2::new(1.0, 0.0));
    }

    #[test]
    fn test_coincident_adjacent_vertices_stay_finite() {
        let positions = [Vector2::new(50.0, 50.0), Vector2::new(50.0, 50.0)];
        let edges = [Edge::new(VertexId(0), VertexId(1)).unwrap()];
        let mut graph = VertexGraph::new(&positions, &edges, None).unwrap();
        let physics = physics(2, 1);
        let collisions = CollisionSet::from_params(&physics);

        for iteration in 0..5 {
            step(&mut graph, &physics, &collisions, iteration);
            assert!(graph.vertices().iter().all(|v| v.is_finite()));
        }
    }

    #[test]
    fn test_anchor_never_moves() {
        let center = Vector2::new(400.0, 300.0);
        let positions = [Vector2::new(100.0, 100.0), Vector2::new(700.0, 500.0)];
        let anchor = AnchorSpec {
            position: center,
            mass: 4.0,
        };
        let mut graph = VertexGraph::new(&positions, &[], Some(anchor)).unwrap();
        let mut physics = physics(2, 0);
        physics.use_anchor = true;
        physics.collide_with_anchors = true;
        let collisions = CollisionSet::from_params(&physics);

        for iteration in 0..200 {
            step(&mut graph, &physics, &collisions, iteration);
        }

        let anchor = graph.anchor().unwrap();
        assert_eq!(anchor.position, center);
        assert_eq!(anchor.velocity, Vector2::ZERO);
        assert_eq!(anchor.acceleration, Vector2::ZERO);
    }

    #[test]
    fn test_wall_reflection_before_move() {
        let mut graph = VertexGraph::new(&[Vector2::new(10.0, 300.0)], &[], None).unwrap();
        graph.vertices_mut()[0].velocity = Vector2::new(-2.0, 0.0);
        let collisions = CollisionSet::new(vec![CollisionPolicy::Walls]);

        step(&mut graph, &physics(1, 0), &collisions, 0);

        let v = &graph.vertices()[0];
        assert_eq!(v.position, Vector2::new(12.0, 300.0));
        assert_eq!(v.velocity, Vector2::new(2.0, 0.0));
    }

    #[test]
    fn test_sequential_update_sees_new_positions() {
        // Vertex 1 is attracted toward where vertex 0 already moved to.
        let positions = [Vector2::new(100.0, 100.0), Vector2::new(100.0, 200.0)];
        let mut graph = VertexGraph::new(&positions, &[], None).unwrap();
        graph.vertices_mut()[0].velocity = Vector2::new(0.0, 50.0);

        step(&mut graph, &physics(2, 0), &CollisionSet::default(), 0);

        let v0 = graph.vertices()[0].position;
        let v1 = &graph.vertices()[1];
        let expected = (v0 - Vector2::new(100.0, 200.0)) / v0.distance_squared(Vector2::new(100.0, 200.0));
        assert!((v1.acceleration.y - expected.y).abs() < 1e-12);
    }
}
