use crate::algorithms::shortest_path::dense::reconstruct;
use crate::algorithms::shortest_path::fringe::{self, FringeNode};
use crate::algorithms::shortest_path::PathResult;
use crate::error::Error;
use crate::graph::SparseGraph;
use std::collections::BinaryHeap;

/**
Heap-based Dijkstra with early termination.

A binary min-heap (via [`super::fringe`]'s negated-distance trick) replaces the dense algorithm's
linear scan for the next-closest node. Lazy deletion is used instead of decrease-key: a popped
fringe entry is simply skipped if a shorter distance to its node has since been finalized. The
search stops the moment `destination` is popped, which is what makes this the default algorithm —
it never explores further than it has to.

# Examples

```
use scgraph_rs::SparseGraph;
use scgraph_rs::algorithms::shortest_path::heap_dijkstra;

let g = SparseGraph::from_rows(vec![
    vec![(1, 5.0), (2, 1.0)],
    vec![(0, 5.0), (2, 2.0), (3, 1.0)],
    vec![(0, 1.0), (1, 2.0), (3, 4.0), (4, 8.0)],
    vec![(1, 1.0), (2, 4.0), (4, 3.0), (5, 6.0)],
    vec![(2, 8.0), (3, 3.0)],
    vec![(3, 6.0)],
]);
let result = heap_dijkstra(&g, 0, 5).unwrap();
assert_eq!(result.length, 10.0);
```

# References

Makowski, C. -- the "dijkstra_makowski" heap variant this mirrors, used for early-terminated
point-to-point queries rather than whole-graph spanning trees.
*/
pub fn heap_dijkstra(
    graph: &SparseGraph,
    origin: usize,
    destination: usize,
) -> Result<PathResult, Error> {
    let (distance, predecessor) = run(graph, origin, Some(destination))?;
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

/// Shared core used by [`heap_dijkstra`] and [`crate::algorithms::tree::build_tree`]: runs the
/// heap-based relaxation loop, stopping early if `stop_at` is popped (or running to completion if
/// `None`). Returns the full distance/predecessor arrays either way.
pub(crate) fn run(
    graph: &SparseGraph,
    origin: usize,
    stop_at: Option<usize>,
) -> Result<(Vec<f64>, Vec<Option<usize>>), Error> {
    if stop_at.is_some() {
        graph.input_check(origin, stop_at.unwrap())?;
    } else if origin >= graph.len() {
        return Err(Error::invalid_endpoint(format!(
            "origin {} is out of range for a graph of size {}",
            origin,
            graph.len()
        )));
    }
    let n = graph.len();
    let mut distance = vec![f64::INFINITY; n];
    let mut predecessor: Vec<Option<usize>> = vec![None; n];
    let mut finalized = vec![false; n];
    let mut heap: BinaryHeap<FringeNode> = BinaryHeap::new();
    let mut counter = 0u64;

    distance[origin] = 0.0;
    fringe::push(&mut heap, &mut counter, origin, 0.0);

    while let Some(item) = heap.pop() {
        let u = item.node;
        if finalized[u] {
            continue;
        }
        if item.distance() > distance[u] {
            continue;
        }
        finalized[u] = true;
        if Some(u) == stop_at {
            break;
        }
        for (v, w) in graph.neighbors(u) {
            if finalized[v] {
                continue;
            }
            let candidate = distance[u] + w;
            if candidate < distance[v] {
                distance[v] = candidate;
                predecessor[v] = Some(u);
                fringe::push(&mut heap, &mut counter, v, candidate);
            }
        }
    }

    Ok((distance, predecessor))
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
    fn test_matches_dense_dijkstra() {
        let g = micro();
        let heap_result = heap_dijkstra(&g, 0, 5).unwrap();
        let dense_result = crate::algorithms::shortest_path::dijkstra(&g, 0, 5).unwrap();
        assert_eq!(heap_result.length, dense_result.length);
        assert_eq!(heap_result.path, vec![0, 2, 1, 3, 5]);
    }

    #[test]
    fn test_disconnected() {
        let g = SparseGraph::from_rows(vec![vec![(1, 1.0)], vec![(0, 1.0)], vec![]]);
        let e = heap_dijkstra(&g, 0, 2).unwrap_err();
        assert_eq!(e.kind, crate::ErrorKind::Disconnected);
    }
}
