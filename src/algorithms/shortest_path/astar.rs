use crate::algorithms::shortest_path::dense::reconstruct;
use crate::algorithms::shortest_path::fringe::{self, FringeNode};
use crate::algorithms::shortest_path::{heap_dijkstra, PathResult};
use crate::error::Error;
use crate::graph::SparseGraph;
use std::collections::BinaryHeap;

/**
A* search.

Identical to [`crate::algorithms::shortest_path::heap_dijkstra`] except the heap key is `distance[v]
+ h(v, destination)` for a caller-supplied heuristic `h`. `h` must be admissible (never overestimate
the true remaining distance) or the returned path may be suboptimal; this is a caller responsibility,
not something checked here. A visited bitset prevents re-expansion once a node has been popped, which
is only sound given admissibility.

With no heuristic this falls back to plain heap Dijkstra.

# Examples

```
use scgraph_rs::SparseGraph;
use scgraph_rs::algorithms::shortest_path::a_star;

let g = SparseGraph::from_rows(vec![
    vec![(1, 5.0), (2, 1.0)],
    vec![(0, 5.0), (2, 2.0), (3, 1.0)],
    vec![(0, 1.0), (1, 2.0), (3, 4.0), (4, 8.0)],
    vec![(1, 1.0), (2, 4.0), (4, 3.0), (5, 6.0)],
    vec![(2, 8.0), (3, 3.0)],
    vec![(3, 6.0)],
]);
// no heuristic: behaves exactly like heap_dijkstra
let result = a_star(&g, 0, 5, None).unwrap();
assert_eq!(result.length, 10.0);
```
*/
pub fn a_star(
    graph: &SparseGraph,
    origin: usize,
    destination: usize,
    heuristic: Option<&dyn Fn(usize, usize) -> f64>,
) -> Result<PathResult, Error> {
    let heuristic = match heuristic {
        Some(h) => h,
        None => return heap_dijkstra(graph, origin, destination),
    };
    graph.input_check(origin, destination)?;
    let n = graph.len();
    let mut distance = vec![f64::INFINITY; n];
    let mut predecessor: Vec<Option<usize>> = vec![None; n];
    let mut visited = vec![false; n];
    let mut heap: BinaryHeap<FringeNode> = BinaryHeap::new();
    let mut counter = 0u64;

    distance[origin] = 0.0;
    fringe::push(&mut heap, &mut counter, origin, heuristic(origin, destination));

    while let Some(item) = heap.pop() {
        let u = item.node;
        if visited[u] {
            continue;
        }
        visited[u] = true;
        if u == destination {
            break;
        }
        for (v, w) in graph.neighbors(u) {
            if visited[v] {
                continue;
            }
            let candidate = distance[u] + w;
            if candidate < distance[v] {
                distance[v] = candidate;
                predecessor[v] = Some(u);
                fringe::push(
                    &mut heap,
                    &mut counter,
                    v,
                    candidate + heuristic(v, destination),
                );
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
