//! Edge type.
//!
//! Edges are unordered pairs of distinct vertices. They are created during
//! generation and read-only afterwards.

use std::fmt;

use serde::Serialize;

use super::vertex::VertexId;

/// An undirected edge between two distinct vertices.
///
/// The endpoints are stored in canonical order (`from < to`), so two edges
/// over the same pair compare equal regardless of how they were built.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct Edge {
    from: VertexId,
    to: VertexId,
}

impl Edge {
    /// Create an edge, or None for a self loop.
    pub fn new(a: VertexId, b: VertexId) -> Option<Self> {
        match a.cmp(&b) {
            std::cmp::Ordering::Less => Some(Self { from: a, to: b }),
            std::cmp::Ordering::Greater => Some(Self { from: b, to: a }),
            std::cmp::Ordering::Equal => None,
        }
    }

    /// The lower endpoint.
    #[inline]
    pub fn from(self) -> VertexId {
        self.from
    }

    /// The higher endpoint.
    #[inline]
    pub fn to(self) -> VertexId {
        self.to
    }
}

impl fmt::Display for Edge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{from: {}, to: {}}}", self.from, self.to)
    }
}
