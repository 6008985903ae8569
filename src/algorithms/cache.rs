use crate::algorithms::shortest_path::PathResult;
use crate::algorithms::tree::{build_tree, Tree};
use crate::error::Error;
use crate::graph::SparseGraph;

/// Memoizes shortest-path-tree computations by source node, so repeated queries from the same
/// origin against the same graph reuse a single [`Tree`] instead of re-running Dijkstra per call.
///
/// Does not observe graph mutation: if the wrapped graph changes, construct a new `CacheGraph`
/// rather than reusing a stale one.
pub struct CacheGraph<'a> {
    graph: &'a SparseGraph,
    trees: Vec<Option<Tree>>,
}

impl<'a> CacheGraph<'a> {
    pub fn new(graph: &'a SparseGraph) -> CacheGraph<'a> {
        CacheGraph {
            graph,
            trees: (0..graph.len()).map(|_| None).collect(),
        }
    }

    /// Returns the shortest path and length from `origin` to `destination`, building and caching
    /// the tree rooted at `origin` on first use.
    pub fn get_shortest_path(
        &mut self,
        origin: usize,
        destination: usize,
    ) -> Result<PathResult, Error> {
        let tree = self.tree(origin)?;
        match tree.length_to(destination) {
            Some(length) => Ok(PathResult {
                length,
                path: tree.path_to(destination),
            }),
            None => Err(Error::disconnected(format!(
                "no path from {} to {}",
                origin, destination
            ))),
        }
    }

    /// Like [`Self::get_shortest_path`] but skips path reconstruction when only the length is
    /// needed.
    pub fn get_shortest_path_length(
        &mut self,
        origin: usize,
        destination: usize,
    ) -> Result<f64, Error> {
        let tree = self.tree(origin)?;
        tree.length_to(destination).ok_or_else(|| {
            Error::disconnected(format!("no path from {} to {}", origin, destination))
        })
    }

    fn tree(&mut self, origin: usize) -> Result<&Tree, Error> {
        if origin >= self.trees.len() {
            return Err(Error::invalid_endpoint(format!(
                "origin {} is out of range for a graph of size {}",
                origin,
                self.graph.len()
            )));
        }
        if self.trees[origin].is_none() {
            tracing::debug!(origin, "shortest-path-tree cache miss");
            self.trees[origin] = Some(build_tree(self.graph, origin)?);
        } else {
            tracing::debug!(origin, "shortest-path-tree cache hit");
        }
        Ok(self.trees[origin].as_ref().unwrap())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn micro() -> SparseGraph {
        SparseGraph::from_rows(vec![
            vec![(1, 5.0), (2, 1.0)],
            vec![(0, 5.0), (2, 2.0), (3, 1.0)],
            vec![(0, 1.0), (1, 2.0), (3, 4.0), (4, 8.0)],
            vec![(1, 1.0), (2, 4.0), (4, 3.0), (5, 6.0)],
            vec![(2, 8.0), (3, 3.0)],
            vec![(3, 6.0)],
        ])
    }

    #[test]
    fn test_cache_hit_matches_fresh_query() {
        let g = micro();
        let mut cache = CacheGraph::new(&g);
        let first = cache.get_shortest_path(0, 5).unwrap();
        let second = cache.get_shortest_path(0, 5).unwrap();
        assert_eq!(first, second);
        assert_eq!(first.length, 10.0);
    }

    #[test]
    fn test_length_only_matches_full_query() {
        let g = micro();
        let mut cache = CacheGraph::new(&g);
        let length = cache.get_shortest_path_length(0, 5).unwrap();
        assert_eq!(length, 10.0);
    }

    #[test]
    fn test_disconnected() {
        let g = SparseGraph::from_rows(vec![vec![(1, 1.0)], vec![(0, 1.0)], vec![]]);
        let mut cache = CacheGraph::new(&g);
        let err = cache.get_shortest_path(0, 2).unwrap_err();
        assert_eq!(err.kind, crate::ErrorKind::Disconnected);
    }
}
