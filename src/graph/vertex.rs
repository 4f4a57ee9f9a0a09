//! Vertex type and related structures.
//!
//! Vertices are the bodies of the simulation. Each vertex has:
//! - A stable identifier (its index in the vertex collection)
//! - Kinematic state (position, velocity, acceleration)
//! - A mass and a kind (free, or an immobile anchor)
//! - Its adjacency and non-adjacency lists

use std::fmt;

use serde::Serialize;

use crate::geometry::Vector2;

/// Stable vertex identifier.
///
/// Identifiers are dense indices into the vertex collection and never change
/// during a run. They wrap a u32 for WebAssembly interop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct VertexId(pub u32);

impl VertexId {
    /// Create a new VertexId from a raw u32.
    #[inline]
    pub fn new(id: u32) -> Self {
        Self(id)
    }

    /// Get the raw u32 value.
    #[inline]
    pub fn raw(self) -> u32 {
        self.0
    }

    /// Index into the vertex collection.
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for VertexId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "V_{}", self.0)
    }
}

impl From<u32> for VertexId {
    #[inline]
    fn from(id: u32) -> Self {
        Self(id)
    }
}

impl From<VertexId> for u32 {
    #[inline]
    fn from(id: VertexId) -> Self {
        id.0
    }
}

/// Whether a vertex takes part in position updates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub(crate) enum VertexKind {
    /// Ordinary graph vertex, moved every tick.
    #[default]
    Free,
    /// Heavy immobile vertex at the canvas center.
    Anchor,
}

/// Position and mass of a vertex, the inputs of the force law.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Body {
    /// Current position.
    pub position: Vector2,
    /// Mass.
    pub mass: f64,
}

/// A simulated vertex.
#[derive(Debug, Clone, PartialEq)]
pub struct Vertex {
    id: VertexId,
    kind: VertexKind,
    /// Current position.
    pub position: Vector2,
    /// Current velocity.
    pub velocity: Vector2,
    /// Acceleration computed on the last tick.
    pub acceleration: Vector2,
    /// Mass used by the force law.
    pub mass: f64,
    pub(crate) adjacent: Vec<VertexId>,
    pub(crate) non_adjacent: Vec<VertexId>,
}

impl Vertex {
    /// Default mass of a free vertex.
    pub const DEFAULT_MASS: f64 = 1.0;

    /// Create a free vertex at rest.
    pub fn new(id: VertexId, position: Vector2) -> Self {
        Self {
            id,
            kind: VertexKind::Free,
            position,
            velocity: Vector2::ZERO,
            acceleration: Vector2::ZERO,
            mass: Self::DEFAULT_MASS,
            adjacent: Vec::new(),
            non_adjacent: Vec::new(),
        }
    }

    /// Create an immobile anchor.
    pub fn anchor(id: VertexId, position: Vector2, mass: f64) -> Self {
        Self {
            kind: VertexKind::Anchor,
            mass,
            ..Self::new(id, position)
        }
    }

    /// The vertex identifier.
    #[inline]
    pub fn id(&self) -> VertexId {
        self.id
    }

    /// Whether the integrator moves this vertex.
    #[inline]
    pub fn is_mobile(&self) -> bool {
        self.kind == VertexKind::Free
    }

    /// Display name: `V_<id>` for free vertices, `x` for the anchor.
    pub fn name(&self) -> String {
        match self.kind {
            VertexKind::Free => self.id.to_string(),
            VertexKind::Anchor => "x".to_string(),
        }
    }

    /// Position and mass snapshot.
    #[inline]
    pub fn body(&self) -> Body {
        Body {
            position: self.position,
            mass: self.mass,
        }
    }

    /// Vertices sharing an edge with this one, ascending by id.
    #[inline]
    pub fn adjacent(&self) -> &[VertexId] {
        &self.adjacent
    }

    /// All other vertices not sharing an edge with this one, ascending by id.
    #[inline]
    pub fn non_adjacent(&self) -> &[VertexId] {
        &self.non_adjacent
    }

    /// True when every kinematic field is finite.
    pub fn is_finite(&self) -> bool {
        self.position.is_finite() && self.velocity.is_finite() && self.acceleration.is_finite()
    }
}
