//! Spatial indexing for region queries.
//!
//! This module provides an R-tree based spatial index used to gather the
//! vertices inside a query circle without scanning the whole graph.

mod rtree;

pub use rtree::{SpatialIndex, VertexPoint};
