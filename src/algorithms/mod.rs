/// Shortest-path algorithms: dense and heap-based Dijkstra, A*, negative-weight Dijkstra, and BMSSP.
pub mod shortest_path;

/// Shortest-path spanning trees built from a single source.
pub mod tree;

/// Memoized shortest-path-tree cache keyed by source node.
pub mod cache;
