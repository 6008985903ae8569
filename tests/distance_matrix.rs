use scgraph_rs::geo::DistanceMatrixOptions;
use scgraph_rs::{GeoGraph, SparseGraph};

/// Four points on a line graph, standing in for the real US-freeway dataset this scenario is
/// reproduced from: exercises the same cached-tree-per-distinct-node contract as the real
/// dataset without shipping it.
fn line_of_four() -> GeoGraph {
    let graph = SparseGraph::from_rows(vec![
        vec![(1, 100.0)],
        vec![(0, 100.0), (2, 100.0)],
        vec![(1, 100.0), (3, 100.0)],
        vec![(2, 100.0)],
    ]);
    let nodes = vec![(0.0, 0.0), (0.0, 1.0), (0.0, 2.0), (0.0, 3.0)];
    GeoGraph::new(graph, nodes).unwrap()
}

#[test]
fn distance_matrix_is_symmetric_and_zero_on_the_diagonal() {
    let mut geograph = line_of_four();
    let points = vec![(0.0, 0.0), (0.0, 1.0), (0.0, 2.0), (0.0, 3.0)];
    let matrix = geograph
        .distance_matrix(&points, &DistanceMatrixOptions::default())
        .unwrap();

    for i in 0..points.len() {
        assert_eq!(matrix[i][i], 0.0);
    }
    for i in 0..points.len() {
        for j in 0..points.len() {
            assert!((matrix[i][j] - matrix[j][i]).abs() < 1e-6);
        }
    }
    assert!((matrix[0][3] - 300.0).abs() < 1.0);
}
