use scgraph_rs::algorithms::shortest_path::dijkstra_negative;
use scgraph_rs::{ErrorKind, SparseGraph};

#[test]
fn negative_cycle_is_detected_and_reported() {
    let g = SparseGraph::from_rows(vec![vec![(1, -5.0)], vec![(2, 2.0)], vec![(0, 2.0)]]);
    let err = dijkstra_negative(&g, 0, 1, None).unwrap_err();
    assert_eq!(err.kind, ErrorKind::NegativeCycle);
}

#[test]
fn same_shape_without_a_cycle_succeeds() {
    let g = SparseGraph::from_rows(vec![vec![(1, -1.0)], vec![(2, 2.0)], vec![(0, 2.0)]]);
    let result = dijkstra_negative(&g, 0, 1, None).unwrap();
    assert_eq!(result.length, -1.0);
    assert_eq!(result.path, vec![0, 1]);
}
