use crate::error::Error;
use nohash::IntMap;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// The adjacency row for a single node: neighbor index -> edge weight.
pub type Adjacency = IntMap<usize, f64>;

/**
A sparse, index-addressed graph.

A `SparseGraph` is a sequence of `N` adjacency rows, `row[u] = { v -> w }`. Nodes are identified
purely by their position (an integer in `[0, N)`); there is no separate name or attribute type,
since every layer built on top of this one (GeoGraph, GridGraph) keeps its own parallel array of
whatever per-node data it needs.

# Examples

```
use scgraph_rs::SparseGraph;
let g = SparseGraph::from_rows(vec![
    vec![(1, 5.0), (2, 1.0)],
    vec![(0, 5.0), (2, 2.0), (3, 1.0)],
    vec![(0, 1.0), (1, 2.0), (3, 4.0), (4, 8.0)],
    vec![(1, 1.0), (2, 4.0), (4, 3.0), (5, 6.0)],
    vec![(2, 8.0), (3, 3.0)],
    vec![(3, 6.0)],
]);
assert_eq!(g.len(), 6);
assert_eq!(g.get(0, 2), Some(1.0));
```
*/
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SparseGraph {
    rows: Vec<Adjacency>,
}

impl SparseGraph {
    /// Builds a graph from already-constructed adjacency rows.
    pub fn new(rows: Vec<Adjacency>) -> SparseGraph {
        SparseGraph { rows }
    }

    /// Builds a graph from plain `(neighbor, weight)` row lists, the shape most test fixtures and
    /// callers reach for first.
    pub fn from_rows(rows: Vec<Vec<(usize, f64)>>) -> SparseGraph {
        let rows = rows
            .into_iter()
            .map(|row| row.into_iter().collect::<Adjacency>())
            .collect();
        SparseGraph { rows }
    }

    /// Number of nodes, `N`.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// The weight of edge `(u, v)`, if it exists.
    pub fn get(&self, u: usize, v: usize) -> Option<f64> {
        self.rows.get(u).and_then(|row| row.get(&v)).copied()
    }

    /// Iterates `(neighbor, weight)` pairs out of `u`. Empty iterator if `u` is out of range.
    pub fn neighbors(&self, u: usize) -> impl Iterator<Item = (usize, f64)> + '_ {
        self.rows
            .get(u)
            .into_iter()
            .flat_map(|row| row.iter().map(|(&v, &w)| (v, w)))
    }

    pub fn row(&self, u: usize) -> Option<&Adjacency> {
        self.rows.get(u)
    }

    /// Sets (or overwrites) the weight of edge `(u, v)`. Panics if `u` is out of range; `v` need
    /// not already be a neighbor.
    pub fn set_edge(&mut self, u: usize, v: usize, w: f64) {
        self.rows[u].insert(v, w);
    }

    /// Removes edge `(u, v)` if present; no-op otherwise.
    pub fn remove_edge(&mut self, u: usize, v: usize) {
        if let Some(row) = self.rows.get_mut(u) {
            row.remove(&v);
        }
    }

    /// Appends a new node with the given outgoing adjacency; returns its index.
    pub fn push_node(&mut self, adjacency: Adjacency) -> usize {
        self.rows.push(adjacency);
        self.rows.len() - 1
    }

    /// Removes the last node and returns its adjacency row. Callers (GeoGraph's temp-node
    /// protocol) are responsible for also removing any mirror edges that point into it.
    pub fn pop_node(&mut self) -> Option<Adjacency> {
        self.rows.pop()
    }

    /// Fails with [`crate::ErrorKind::InvalidGraph`] if any adjacency target is out of range or
    /// non-finite, if `check_symmetry` and some `(u,v,w)` lacks a matching `(v,u,w)`, or if
    /// `check_connected` and undirected BFS from index 0 does not reach every index.
    /// `check_connected` implies `check_symmetry`.
    pub fn validate(&self, check_symmetry: bool, check_connected: bool) -> Result<(), Error> {
        let check_symmetry = check_symmetry || check_connected;
        let n = self.len();
        for (u, row) in self.rows.iter().enumerate() {
            for (&v, &w) in row.iter() {
                if v >= n {
                    return Err(Error::invalid_graph(format!(
                        "node {} has an edge to out-of-range node {}",
                        u, v
                    )));
                }
                if !w.is_finite() {
                    return Err(Error::invalid_graph(format!(
                        "edge ({}, {}) has a non-finite weight",
                        u, v
                    )));
                }
            }
        }
        if check_symmetry {
            for (u, row) in self.rows.iter().enumerate() {
                for (&v, &w) in row.iter() {
                    match self.get(v, u) {
                        Some(w2) if w2 == w => {}
                        _ => {
                            return Err(Error::invalid_graph(format!(
                                "edge ({}, {}) has no matching reverse edge of equal weight",
                                u, v
                            )));
                        }
                    }
                }
            }
        }
        if check_connected && n > 0 && !self.is_connected_from(0) {
            return Err(Error::invalid_graph(
                "graph is not connected: not every node is reachable from node 0",
            ));
        }
        Ok(())
    }

    /// Fails with [`crate::ErrorKind::InvalidEndpoint`] if `origin` or `destination` is out of
    /// `[0, N)`.
    pub fn input_check(&self, origin: usize, destination: usize) -> Result<(), Error> {
        let n = self.len();
        if origin >= n {
            return Err(Error::invalid_endpoint(format!(
                "origin {} is out of range for a graph of size {}",
                origin, n
            )));
        }
        if destination >= n {
            return Err(Error::invalid_endpoint(format!(
                "destination {} is out of range for a graph of size {}",
                destination, n
            )));
        }
        Ok(())
    }

    /// Undirected BFS reachability from `source`, treating adjacency keys as neighbors
    /// regardless of edge direction. O(N + M): a reverse-adjacency index is built once before
    /// the BFS rather than rescanning every row on each pop.
    fn is_connected_from(&self, source: usize) -> bool {
        let n = self.len();
        let mut incoming: Vec<Vec<usize>> = vec![Vec::new(); n];
        for (u, row) in self.rows.iter().enumerate() {
            for &v in row.keys() {
                incoming[v].push(u);
            }
        }

        let mut seen = vec![false; n];
        seen[source] = true;
        let mut queue = VecDeque::from([source]);
        let mut count = 1;
        while let Some(u) = queue.pop_front() {
            for (&v, _) in self.rows[u].iter() {
                if !seen[v] {
                    seen[v] = true;
                    count += 1;
                    queue.push_back(v);
                }
            }
            // undirected: also walk edges that point *into* u from elsewhere.
            for &w in &incoming[u] {
                if !seen[w] {
                    seen[w] = true;
                    count += 1;
                    queue.push_back(w);
                }
            }
        }
        count == n
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
    fn test_validate_ok_symmetric_connected() {
        let g = micro();
        assert!(g.validate(true, true).is_ok());
    }

    #[test]
    fn test_validate_out_of_range() {
        let g = SparseGraph::from_rows(vec![vec![(5, 1.0)]]);
        let e = g.validate(false, false).unwrap_err();
        assert_eq!(e.kind, crate::ErrorKind::InvalidGraph);
    }

    #[test]
    fn test_validate_asymmetric() {
        let g = SparseGraph::from_rows(vec![vec![(1, 1.0)], vec![]]);
        let e = g.validate(true, false).unwrap_err();
        assert_eq!(e.kind, crate::ErrorKind::InvalidGraph);
    }

    #[test]
    fn test_validate_disconnected() {
        let g = SparseGraph::from_rows(vec![
            vec![(1, 1.0)],
            vec![(0, 1.0)],
            vec![(3, 1.0)],
            vec![(2, 1.0)],
        ]);
        let e = g.validate(true, true).unwrap_err();
        assert_eq!(e.kind, crate::ErrorKind::InvalidGraph);
    }

    #[test]
    fn test_input_check() {
        let g = micro();
        assert!(g.input_check(0, 5).is_ok());
        assert_eq!(
            g.input_check(0, 9).unwrap_err().kind,
            crate::ErrorKind::InvalidEndpoint
        );
    }

    #[test]
    fn test_push_pop_node() {
        let mut g = micro();
        let len_before = g.len();
        let idx = g.push_node(Adjacency::default());
        assert_eq!(idx, len_before);
        assert_eq!(g.len(), len_before + 1);
        g.pop_node();
        assert_eq!(g.len(), len_before);
    }
}
