//! Graph data structures and generation.
//!
//! Vertices carry their kinematic state together with cached adjacency and
//! non-adjacency lists; the edge set itself is kept in petgraph's
//! StableGraph. The generator builds a random graph once per run.

mod edge;
pub mod generator;
mod topology;
mod vertex;

pub use edge::Edge;
pub use generator::generate;
pub use topology::{AnchorSpec, VertexGraph};
pub use vertex::{Body, Vertex, VertexId};
