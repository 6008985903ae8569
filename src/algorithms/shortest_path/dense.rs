use crate::algorithms::shortest_path::PathResult;
use crate::error::Error;
use crate::graph::SparseGraph;

/**
Dense O(N²) Dijkstra.

Scans the whole `branch_tip` array for its minimum at every step rather than using a heap. This is
the textbook reference form of the algorithm, kept mainly so other algorithms' outputs can be
checked against it; [`super::heap::heap_dijkstra`] is the one callers should reach for.

# Examples

```
use scgraph_rs::SparseGraph;
use scgraph_rs::algorithms::shortest_path::dijkstra;

let g = SparseGraph::from_rows(vec![
    vec![(1, 5.0), (2, 1.0)],
    vec![(0, 5.0), (2, 2.0), (3, 1.0)],
    vec![(0, 1.0), (1, 2.0), (3, 4.0), (4, 8.0)],
    vec![(1, 1.0), (2, 4.0), (4, 3.0), (5, 6.0)],
    vec![(2, 8.0), (3, 3.0)],
    vec![(3, 6.0)],
]);
let result = dijkstra(&g, 0, 5).unwrap();
assert_eq!(result.length, 10.0);
assert_eq!(result.path, vec![0, 2, 1, 3, 5]);
```

# References

Dijkstra, E. W. (1959). "A note on two problems in connexion with graphs". Numerische Mathematik.
*/
pub fn dijkstra(graph: &SparseGraph, origin: usize, destination: usize) -> Result<PathResult, Error> {
    graph.input_check(origin, destination)?;
    let n = graph.len();
    let mut distance = vec![f64::INFINITY; n];
    let mut predecessor: Vec<Option<usize>> = vec![None; n];
    let mut branch_tip = vec![f64::INFINITY; n];
    distance[origin] = 0.0;
    branch_tip[origin] = 0.0;

    loop {
        let (u, &min_tip) = branch_tip
            .iter()
            .enumerate()
            .min_by(|a, b| a.1.partial_cmp(b.1).unwrap())
            .unwrap();
        if !min_tip.is_finite() {
            return Err(Error::disconnected(format!(
                "no path from {} to {}",
                origin, destination
            )));
        }
        branch_tip[u] = f64::INFINITY;
        if u == destination {
            break;
        }
        for (v, w) in graph.neighbors(u) {
            let candidate = distance[u] + w;
            if candidate < distance[v] {
                distance[v] = candidate;
                branch_tip[v] = candidate;
                predecessor[v] = Some(u);
            }
        }
    }

    Ok(PathResult {
        length: distance[destination],
        path: reconstruct(origin, destination, &predecessor),
    })
}

pub(crate) fn reconstruct(origin: usize, destination: usize, predecessor: &[Option<usize>]) -> Vec<usize> {
    let mut path = vec![destination];
    let mut current = destination;
    while current != origin {
        current = predecessor[current].expect("reachable node must have a predecessor");
        path.push(current);
    }
    path.reverse();
    path
}
