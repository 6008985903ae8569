use crate::algorithms::shortest_path::heap;
use crate::error::Error;
use crate::graph::SparseGraph;
use serde::{Deserialize, Serialize};

/// A shortest-path spanning tree from a single source: `distance[v]` is the shortest-path length
/// from the source to `v` (`f64::INFINITY` if unreachable), and `predecessor[v]` is the node
/// preceding `v` on that path (`None` for the source itself and for unreachable nodes).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tree {
    pub source: usize,
    pub distance: Vec<f64>,
    pub predecessor: Vec<Option<usize>>,
}

impl Tree {
    /// The shortest-path length from the tree's source to `destination`, or `None` if
    /// unreachable or out of range.
    pub fn length_to(&self, destination: usize) -> Option<f64> {
        self.distance
            .get(destination)
            .copied()
            .filter(|d| d.is_finite())
    }

    /// Reconstructs the node sequence from the tree's source to `destination`. Returns an empty
    /// path if `destination` is unreachable.
    pub fn path_to(&self, destination: usize) -> Vec<usize> {
        if self.length_to(destination).is_none() {
            return Vec::new();
        }
        crate::algorithms::shortest_path::dense::reconstruct(
            self.source,
            destination,
            &self.predecessor,
        )
    }
}

/// Builds the full shortest-path tree rooted at `source`, covering every node reachable from it.
/// This is [`heap::run`] run to completion (no early termination), which is the cheapest way to
/// get every distance at once rather than running a point-to-point query per destination.
///
/// # Examples
///
/// ```
/// use scgraph_rs::SparseGraph;
/// use scgraph_rs::algorithms::tree::build_tree;
///
/// let g = SparseGraph::from_rows(vec![vec![(1, 1.0)], vec![(0, 1.0), (2, 2.0)], vec![(1, 2.0)]]);
/// let tree = build_tree(&g, 0).unwrap();
/// assert_eq!(tree.length_to(2), Some(3.0));
/// ```
pub fn build_tree(graph: &SparseGraph, source: usize) -> Result<Tree, Error> {
    let (distance, predecessor) = heap::run(graph, source, None)?;
    Ok(Tree {
        source,
        distance,
        predecessor,
    })
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
    fn test_build_tree_matches_point_to_point() {
        let g = micro();
        let tree = build_tree(&g, 0).unwrap();
        assert_eq!(tree.length_to(5), Some(10.0));
        assert_eq!(tree.path_to(5), vec![0, 2, 1, 3, 5]);
    }

    #[test]
    fn test_unreachable_node() {
        let g = SparseGraph::from_rows(vec![vec![(1, 1.0)], vec![(0, 1.0)], vec![]]);
        let tree = build_tree(&g, 0).unwrap();
        assert_eq!(tree.length_to(2), None);
        assert!(tree.path_to(2).is_empty());
    }

    #[test]
    fn test_out_of_range_source_fails() {
        let g = micro();
        assert!(build_tree(&g, 99).is_err());
    }
}
