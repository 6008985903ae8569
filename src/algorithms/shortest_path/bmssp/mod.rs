mod bucket;

use crate::algorithms::shortest_path::dense::reconstruct;
use crate::algorithms::shortest_path::fringe::{self, FringeNode};
use crate::algorithms::shortest_path::PathResult;
use crate::error::Error;
use crate::graph::SparseGraph;
use bucket::Bucket;
use std::collections::{BinaryHeap, HashMap, HashSet};

/**
Bounded Multi-Source Shortest Path (BMSSP).

A recursive, pivot-based shortest-path algorithm approximating the approach of Duan, Mao, Mao, Shu
& Yin (2024), "Breaking the sorting barrier for the single-source shortest path problem". Rather
than maintaining one global frontier like Dijkstra, BMSSP recursively narrows a distance bound `B`
and a source set `S`, using a small number of *pivot* nodes per level to keep the amount of work at
each recursive level sublinear in the frontier size.

This function constructs the single-source instance internally (`S = {origin}`, `B = +infinity`)
and runs the recursion to completion, which for a finite connected component is equivalent to
building the whole shortest-path tree from `origin` — the path and length for `destination` are
then read off the resulting distance/predecessor arrays exactly as in [`super::heap::heap_dijkstra`].

# Examples

```
use scgraph_rs::SparseGraph;
use scgraph_rs::algorithms::shortest_path::bmssp;

let g = SparseGraph::from_rows(vec![
    vec![(1, 5.0), (2, 1.0)],
    vec![(0, 5.0), (2, 2.0), (3, 1.0)],
    vec![(0, 1.0), (1, 2.0), (3, 4.0), (4, 8.0)],
    vec![(1, 1.0), (2, 4.0), (4, 3.0), (5, 6.0)],
    vec![(2, 8.0), (3, 3.0)],
    vec![(3, 6.0)],
]);
let result = bmssp(&g, 0, 5).unwrap();
assert_eq!(result.length, 10.0);
```

# References

Duan, R., Mao, J., Mao, X., Shu, X., Yin, L. (2024). "Breaking the sorting barrier for directed
single-source shortest paths." arXiv:2504.17033 (and its earlier STOC 2025 form).
*/
pub fn bmssp(graph: &SparseGraph, origin: usize, destination: usize) -> Result<PathResult, Error> {
    graph.input_check(origin, destination)?;
    let n = graph.len();

    let ln = (n.max(2) as f64).log2();
    let k = ((ln.cbrt().floor()) as usize).max(2);
    let t = ((ln.powf(2.0 / 3.0).ceil()) as usize).max(2);
    let level = ((ln / t as f64).ceil() as usize).max(1);

    let mut distance = vec![f64::INFINITY; n];
    let mut predecessor: Vec<Option<usize>> = vec![None; n];
    distance[origin] = 0.0;

    let mut solver = Solver {
        graph,
        k,
        t,
        distance: &mut distance,
        predecessor: &mut predecessor,
    };
    solver.recursive_bmssp(level, f64::INFINITY, vec![origin]);

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

struct Solver<'a> {
    graph: &'a SparseGraph,
    k: usize,
    t: usize,
    distance: &'a mut Vec<f64>,
    predecessor: &'a mut Vec<Option<usize>>,
}

impl<'a> Solver<'a> {
    /// `recursive_bmssp(level, B, S)`: returns `(B', U)` where `U` is the set of nodes finalized
    /// at distance `< B'`.
    fn recursive_bmssp(&mut self, level: usize, b: f64, s: Vec<usize>) -> (f64, HashSet<usize>) {
        if level == 0 {
            return self.base_case(b, s[0]);
        }

        let (pivots, reached) = self.find_pivots(b, &s);

        let m = 1usize << ((level - 1) * self.t).min(40);
        let mut bucket = Bucket::new(m);
        for &p in &pivots {
            bucket.insert(p, self.distance[p]);
        }

        let mut new_frontier: HashSet<usize> = HashSet::new();
        let limit = frontier_limit(self.k, level, self.t);
        let mut last_bprime = b;

        while new_frontier.len() < limit && !bucket.is_empty() {
            let (b_i, s_i) = bucket.pull(b);
            if s_i.is_empty() {
                break;
            }
            let (bprime_i, u_i) = self.recursive_bmssp(level - 1, b_i, s_i.clone());
            new_frontier.extend(u_i.iter().copied());
            last_bprime = bprime_i;

            let mut staged = Vec::new();
            for &u in &u_i {
                let neighbors: Vec<(usize, f64)> = self.graph.neighbors(u).collect();
                for (v, w) in neighbors {
                    let candidate = self.distance[u] + w;
                    if candidate < self.distance[v] {
                        self.distance[v] = candidate;
                        self.predecessor[v] = Some(u);
                        if b_i <= candidate && candidate < b {
                            bucket.insert(v, candidate);
                        } else if bprime_i <= candidate && candidate < b_i {
                            staged.push((v, candidate));
                        }
                    }
                }
            }
            for &s_node in &s_i {
                let d = self.distance[s_node];
                if bprime_i <= d && d < b_i {
                    staged.push((s_node, d));
                }
            }
            bucket.batch_prepend(staged);
        }

        let result_b = last_bprime.min(b);
        let mut result_u = new_frontier;
        for &v in &reached {
            if self.distance[v] < last_bprime {
                result_u.insert(v);
            }
        }
        (result_b, result_u)
    }

    /// Restricted single-source Dijkstra from `source`, relaxing only within `distance < b`,
    /// stopping as soon as `k+1` distinct nodes have been finalized.
    fn base_case(&mut self, b: f64, source: usize) -> (f64, HashSet<usize>) {
        let mut finalized_order: Vec<usize> = Vec::new();
        let mut finalized: HashSet<usize> = HashSet::new();
        let mut heap: BinaryHeap<FringeNode> = BinaryHeap::new();
        let mut counter = 0u64;
        fringe::push(&mut heap, &mut counter, source, self.distance[source]);

        while let Some(item) = heap.pop() {
            let u = item.node;
            if finalized.contains(&u) {
                continue;
            }
            if item.distance() > self.distance[u] || self.distance[u] >= b {
                continue;
            }
            finalized.insert(u);
            finalized_order.push(u);
            if finalized_order.len() == self.k + 2 {
                break;
            }
            for (v, w) in self.graph.neighbors(u) {
                let candidate = self.distance[u] + w;
                if candidate < b && candidate < self.distance[v] {
                    self.distance[v] = candidate;
                    self.predecessor[v] = Some(u);
                    fringe::push(&mut heap, &mut counter, v, candidate);
                }
            }
        }

        if finalized_order.len() > self.k + 1 {
            let last = finalized_order[self.k + 1];
            let bprime = self.distance[last];
            let set: HashSet<usize> = finalized_order[..self.k + 1]
                .iter()
                .filter(|&&v| self.distance[v] < bprime)
                .copied()
                .collect();
            (bprime, set)
        } else {
            (b, finalized_order.into_iter().collect())
        }
    }

    /// `find_pivots(B, S)`: up to `k` rounds of bounded relaxation from `S`; returns `(pivots,
    /// reached)`. Short-circuits to `(S, reached)` if the reached set grows past `k * |S|`.
    fn find_pivots(&mut self, b: f64, s: &[usize]) -> (Vec<usize>, HashSet<usize>) {
        let mut reached: HashSet<usize> = s.iter().copied().collect();
        let mut frontier: HashSet<usize> = s.iter().copied().collect();

        for _ in 0..self.k {
            if frontier.is_empty() {
                break;
            }
            let mut next_frontier: HashSet<usize> = HashSet::new();
            for &u in &frontier {
                let neighbors: Vec<(usize, f64)> = self.graph.neighbors(u).collect();
                for (v, w) in neighbors {
                    let candidate = self.distance[u] + w;
                    if candidate < b && candidate <= self.distance[v] {
                        if candidate < self.distance[v] {
                            self.distance[v] = candidate;
                            self.predecessor[v] = Some(u);
                        }
                        if !reached.contains(&v) {
                            next_frontier.insert(v);
                        }
                    }
                }
            }
            reached.extend(next_frontier.iter().copied());
            if reached.len() > self.k * s.len().max(1) {
                return (s.to_vec(), reached);
            }
            frontier = next_frontier;
        }

        // Build the tight-edge forest within `reached`, rooted at `S`; a pivot is a root whose
        // subtree (within `reached`) has at least `k` nodes.
        let mut children: HashMap<usize, Vec<usize>> = HashMap::new();
        for &v in &reached {
            if let Some(p) = self.predecessor[v] {
                if reached.contains(&p) && !s.contains(&v) {
                    children.entry(p).or_default().push(v);
                }
            }
        }
        let mut pivots = Vec::new();
        for &root in s {
            if subtree_size(root, &children) >= self.k {
                pivots.push(root);
            }
        }
        (pivots, reached)
    }
}

fn subtree_size(root: usize, children: &HashMap<usize, Vec<usize>>) -> usize {
    let mut stack = vec![root];
    let mut count = 0;
    while let Some(node) = stack.pop() {
        count += 1;
        if let Some(kids) = children.get(&node) {
            stack.extend(kids.iter().copied());
        }
    }
    count
}

fn frontier_limit(k: usize, level: usize, t: usize) -> usize {
    let exponent = (2 * level * t).min(40) as u32;
    (k as u64).checked_pow(exponent).unwrap_or(u64::MAX) as usize
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
    fn test_micro_graph_matches_heap_dijkstra() {
        let g = micro();
        let bmssp_result = bmssp(&g, 0, 5).unwrap();
        let heap_result = crate::algorithms::shortest_path::heap_dijkstra(&g, 0, 5).unwrap();
        assert_eq!(bmssp_result.length, heap_result.length);
    }

    #[test]
    fn test_disconnected() {
        let g = SparseGraph::from_rows(vec![vec![(1, 1.0)], vec![(0, 1.0)], vec![]]);
        let e = bmssp(&g, 0, 2).unwrap_err();
        assert_eq!(e.kind, crate::ErrorKind::Disconnected);
    }

    #[test]
    fn test_origin_equals_destination() {
        let result = bmssp(&micro(), 3, 3).unwrap();
        assert_eq!(result.length, 0.0);
    }
}
