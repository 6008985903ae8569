use crate::algorithms::shortest_path::dense::reconstruct;
use crate::algorithms::shortest_path::fringe::{self, FringeNode};
use crate::algorithms::shortest_path::PathResult;
use crate::error::Error;
use crate::graph::SparseGraph;
use std::collections::{BinaryHeap, HashSet};

/**
Heap Dijkstra that tolerates negative edge weights, at the cost of dropping early termination and
periodically checking for negative cycles.

Unlike [`super::heap::heap_dijkstra`], a node is never permanently closed: with negative edges, a
shorter distance to an already-popped node can still appear later, so the only staleness check is
"does this heap entry's distance still match the best known distance for this node" (the same lazy
deletion discipline, just without an additional closed set). Every `cycle_check_iterations` *valid*
(non-stale) pops — default `N` — the predecessor chain from the just-popped node is walked; if that
walk ever revisits a node it has already passed through, a negative cycle exists and the search
fails with [`crate::ErrorKind::NegativeCycle`]. Otherwise the spanning tree runs to completion and the
destination's path is reconstructed, or [`crate::ErrorKind::Disconnected`] is returned if it was
never reached.

This algorithm's running time is not polynomially bounded in `N + M` for adversarial inputs with
many negative edges close to forming a cycle; that tradeoff is accepted in exchange for supporting
negative weights at all.

# Examples

```
use scgraph_rs::SparseGraph;
use scgraph_rs::algorithms::shortest_path::dijkstra_negative;

// 0 -> 1 (-5) -> 2 (2) -> 0 (2): the walk back to 0 is a negative cycle.
let g = SparseGraph::from_rows(vec![vec![(1, -5.0)], vec![(2, 2.0)], vec![(0, 2.0)]]);
let err = dijkstra_negative(&g, 0, 1, None).unwrap_err();
assert_eq!(err.kind, scgraph_rs::ErrorKind::NegativeCycle);
```
*/
pub fn dijkstra_negative(
    graph: &SparseGraph,
    origin: usize,
    destination: usize,
    cycle_check_iterations: Option<usize>,
) -> Result<PathResult, Error> {
    graph.input_check(origin, destination)?;
    let n = graph.len();
    let cycle_check_iterations = cycle_check_iterations.unwrap_or(n).max(1);

    let mut distance = vec![f64::INFINITY; n];
    let mut predecessor: Vec<Option<usize>> = vec![None; n];
    let mut heap: BinaryHeap<FringeNode> = BinaryHeap::new();
    let mut counter = 0u64;

    distance[origin] = 0.0;
    fringe::push(&mut heap, &mut counter, origin, 0.0);

    let mut cycle_iteration = 0usize;
    while let Some(item) = heap.pop() {
        let u = item.node;
        if item.distance() != distance[u] {
            // stale: a better distance to `u` was already found.
            continue;
        }

        cycle_iteration += 1;
        if cycle_iteration >= cycle_check_iterations {
            cycle_iteration = 0;
            if walks_back_to_start(u, &predecessor) {
                return Err(Error::negative_cycle(format!(
                    "negative cycle detected reachable from node {}",
                    u
                )));
            }
        }

        for (v, w) in graph.neighbors(u) {
            let candidate = distance[u] + w;
            if candidate < distance[v] {
                distance[v] = candidate;
                predecessor[v] = Some(u);
                fringe::push(&mut heap, &mut counter, v, candidate);
            }
        }
    }

    if !distance[destination].is_finite() {
        return Err(Error::disconnected(format!(
            "no path from {} to {}",
            origin, destination
        )));
    }
    Ok(PathResult {
        length: distance[destination],
        path: reconstruct(origin, destination, &predecessor),
    })
}

/// Walks the predecessor chain starting at `start`, tracking every node visited; returns true if
/// the chain ever revisits a node already seen. The node that closes the loop need not be `start`
/// itself — `start` may just be downstream of a cycle it never returns to — so checking only for
/// `p == start` misses cycles elsewhere on the chain and can walk forever. A valid shortest-path
/// tree is acyclic, so any repeat at all means a negative cycle exists somewhere on this chain.
fn walks_back_to_start(start: usize, predecessor: &[Option<usize>]) -> bool {
    let mut seen = HashSet::new();
    let mut current = start;
    loop {
        if !seen.insert(current) {
            return true;
        }
        match predecessor[current] {
            None => return false,
            Some(p) => current = p,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_negative_cycle_detected() {
        let g = SparseGraph::from_rows(vec![vec![(1, -5.0)], vec![(2, 2.0)], vec![(0, 2.0)]]);
        let err = dijkstra_negative(&g, 0, 1, None).unwrap_err();
        assert_eq!(err.kind, crate::ErrorKind::NegativeCycle);
    }

    #[test]
    fn test_same_graph_succeeds_with_smaller_negative_weight() {
        let g = SparseGraph::from_rows(vec![vec![(1, -1.0)], vec![(2, 2.0)], vec![(0, 2.0)]]);
        let result = dijkstra_negative(&g, 0, 1, None).unwrap();
        assert_eq!(result.length, -1.0);
        assert_eq!(result.path, vec![0, 1]);
    }

    #[test]
    fn test_disconnected() {
        let g = SparseGraph::from_rows(vec![vec![(1, 1.0)], vec![(0, 1.0)], vec![]]);
        let e = dijkstra_negative(&g, 0, 2, None).unwrap_err();
        assert_eq!(e.kind, crate::ErrorKind::Disconnected);
    }

    #[test]
    fn test_negative_cycle_detected_from_a_node_downstream_of_it() {
        // cycle among 1, 2, 3 (1 + -5 + 1 = -3); node 4 hangs off the cycle at 3 and is never
        // itself part of it, so the periodic check firing on node 4 must still find the cycle.
        let g = SparseGraph::from_rows(vec![
            vec![(1, 1.0)],
            vec![(2, -5.0)],
            vec![(3, 1.0)],
            vec![(1, 1.0), (4, 1.0)],
            vec![],
        ]);
        let err = dijkstra_negative(&g, 0, 4, Some(1)).unwrap_err();
        assert_eq!(err.kind, crate::ErrorKind::NegativeCycle);
    }

    #[test]
    fn test_walks_back_to_start_finds_a_cycle_not_touching_start() {
        // predecessor chain: 4 -> 3 -> 2 -> 1 -> 3 (the cycle is among 1, 2, 3; node 4 is only
        // ever downstream of it and is never itself revisited).
        let predecessor: Vec<Option<usize>> = vec![None, Some(3), Some(1), Some(2), Some(3)];
        assert!(walks_back_to_start(4, &predecessor));
    }

    #[test]
    fn test_walks_back_to_start_false_on_acyclic_chain() {
        let predecessor: Vec<Option<usize>> = vec![None, Some(0), Some(1), Some(2)];
        assert!(!walks_back_to_start(3, &predecessor));
    }
}
