//! Collision policies.
//!
//! Each enabled policy inspects one vertex at a fixed point of the tick and
//! may answer with a response. Wall reflection runs before the position
//! update; vertex-pair and anchor collisions run after friction.

use crate::geometry::Vector2;
use crate::graph::Vertex;
use crate::physics::params::{PhysicsParams, World};

/// Box half-width, in vertex radii, inside which two vertices collide.
pub const VERTEX_CONTACT_RADII: f64 = 2.1;

/// Box half-width, in vertex radii, kept clear around an anchor.
pub const ANCHOR_CLEARANCE_RADII: f64 = 2.0;

/// Point of the tick at which a policy is consulted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollisionPhase {
    /// After the acceleration is computed, before the position update.
    BeforeMove,
    /// After the velocity update and friction.
    AfterMove,
}

/// What happens to a colliding vertex.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CollisionResponse {
    /// Negate both velocity components.
    Reflect,
    /// Move the vertex to a new position.
    Relocate(Vector2),
}

impl CollisionResponse {
    fn apply_to(self, vertex: &mut Vertex) {
        match self {
            Self::Reflect => vertex.velocity = -vertex.velocity,
            Self::Relocate(position) => vertex.position = position,
        }
    }
}

/// A collision behaviour selectable by configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollisionPolicy {
    /// Never responds.
    None,
    /// Reflect the velocity of a vertex within 1.25 radii of any wall,
    /// whichever way it is travelling.
    Walls,
    /// Reflect the velocity of a vertex whose center lies inside the
    /// 2.1-radius box of any other vertex.
    VertexPairs,
    /// Push a vertex that enters the 2-radius box of an anchor out
    /// horizontally, to the side it is on.
    AnchorPush,
}

impl CollisionPolicy {
    /// When in the tick this policy runs.
    pub fn phase(self) -> CollisionPhase {
        match self {
            Self::None | Self::Walls => CollisionPhase::BeforeMove,
            Self::VertexPairs | Self::AnchorPush => CollisionPhase::AfterMove,
        }
    }

    /// Response for `vertices[index]`, or None if it does not collide.
    pub fn respond(self, vertices: &[Vertex], index: usize, world: &World) -> Option<CollisionResponse> {
        let vertex = vertices.get(index)?;
        match self {
            Self::None => None,
            Self::Walls => world
                .touches_wall(vertex.position)
                .then_some(CollisionResponse::Reflect),
            Self::VertexPairs => {
                let reach = VERTEX_CONTACT_RADII * world.vertex_radius;
                vertices
                    .iter()
                    .enumerate()
                    .any(|(j, other)| {
                        j != index
                            && (vertex.position.x - other.position.x).abs() <= reach
                            && (vertex.position.y - other.position.y).abs() <= reach
                    })
                    .then_some(CollisionResponse::Reflect)
            }
            Self::AnchorPush => {
                let clearance = ANCHOR_CLEARANCE_RADII * world.vertex_radius;
                let p = vertex.position;
                vertices
                    .iter()
                    .filter(|other| !other.is_mobile())
                    .map(|anchor| anchor.position)
                    .find(|a| {
                        p.x >= a.x - clearance
                            && p.x < a.x + clearance
                            && p.y >= a.y - clearance
                            && p.y < a.y + clearance
                    })
                    .map(|a| {
                        let x = if p.x < a.x { a.x - clearance } else { a.x + clearance };
                        CollisionResponse::Relocate(Vector2::new(x, p.y))
                    })
            }
        }
    }
}

/// The policies enabled for a run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CollisionSet {
    policies: Vec<CollisionPolicy>,
}

impl CollisionSet {
    /// A set running exactly `policies`.
    pub fn new(policies: Vec<CollisionPolicy>) -> Self {
        Self { policies }
    }

    /// Policies selected by the run's flags. Pair and anchor collisions are
    /// off unless asked for.
    pub fn from_params(physics: &PhysicsParams) -> Self {
        let mut policies = Vec::new();
        if physics.use_walls {
            policies.push(CollisionPolicy::Walls);
        }
        if physics.collide_with_vertices {
            policies.push(CollisionPolicy::VertexPairs);
        }
        if physics.collide_with_anchors {
            policies.push(CollisionPolicy::AnchorPush);
        }
        Self { policies }
    }

    /// Enabled policies in the order they run.
    pub fn policies(&self) -> &[CollisionPolicy] {
        &self.policies
    }

    /// Run every policy of `phase` against `vertices[index]`.
    pub fn apply(&self, phase: CollisionPhase, vertices: &mut [Vertex], index: usize, world: &World) {
        for policy in self.policies.iter().filter(|p| p.phase() == phase) {
            if let Some(response) = policy.respond(vertices, index, world) {
                if let Some(vertex) = vertices.get_mut(index) {
                    response.apply_to(vertex);
                }
            }
        }
    }
}
