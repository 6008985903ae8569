use scgraph_rs::algorithms::tree::build_tree;
use scgraph_rs::SparseGraph;

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
fn reconstructed_path_weight_matches_tree_distance() {
    let g = micro();
    let tree = build_tree(&g, 0).unwrap();
    for destination in 0..g.len() {
        let expected = match tree.length_to(destination) {
            Some(length) => length,
            None => continue,
        };
        let path = tree.path_to(destination);
        assert_eq!(*path.first().unwrap(), 0);
        assert_eq!(*path.last().unwrap(), destination);
        let summed: f64 = path
            .windows(2)
            .map(|pair| g.get(pair[0], pair[1]).unwrap())
            .sum();
        assert!((summed - expected).abs() < 1e-9);
    }
}

#[test]
fn unreachable_node_has_empty_path_and_no_length() {
    let g = SparseGraph::from_rows(vec![vec![(1, 1.0)], vec![(0, 1.0)], vec![]]);
    let tree = build_tree(&g, 0).unwrap();
    assert_eq!(tree.length_to(2), None);
    assert!(tree.path_to(2).is_empty());
}
