//! Shortest-path queries over sparse index-addressed graphs, with geographic (lat/lon) and
//! integer-grid specializations.
//!
//! The core type is [`SparseGraph`]: a plain sequence of adjacency rows with no attached node or
//! edge attributes. [`geo::GeoGraph`] and [`grid::GridGraph`] wrap a `SparseGraph` with
//! domain-specific node data (coordinates, cell positions) and the lookup/injection machinery
//! each domain needs to turn an arbitrary query point into a graph index.

mod error;
pub use error::{Error, ErrorKind};

mod graph;
pub use graph::{Adjacency, SparseGraph};

pub mod algorithms;
pub use algorithms::shortest_path::PathResult;
pub use algorithms::tree::Tree;
pub use algorithms::cache::CacheGraph;

pub mod geo;
pub use geo::GeoGraph;

pub mod grid;
pub use grid::GridGraph;
