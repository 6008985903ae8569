//! Shortest-path algorithms over [`crate::graph::SparseGraph`].
//!
//! All of these share a common output shape ([`PathResult`]) and a common node-index convention:
//! paths are sequences of `usize` row indices into the graph, inclusive of both endpoints.

mod fringe;

pub mod astar;
pub mod bmssp;
pub mod dense;
pub mod heap;
pub mod negative;

pub use astar::a_star;
pub use bmssp::bmssp;
pub use dense::dijkstra;
pub use heap::heap_dijkstra;
pub use negative::dijkstra_negative;

use serde::{Deserialize, Serialize};

/// The result of a successful shortest-path query: total edge-weight sum and the node sequence
/// that achieves it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PathResult {
    pub path: Vec<usize>,
    pub length: f64,
}
