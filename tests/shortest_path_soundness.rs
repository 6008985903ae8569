use scgraph_rs::algorithms::cache::CacheGraph;
use scgraph_rs::algorithms::shortest_path::{a_star, bmssp, dijkstra, dijkstra_negative, heap_dijkstra};
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
fn every_algorithm_agrees_on_length_and_path() {
    let g = micro();
    let expected_length = 10.0;
    let expected_path = vec![0, 2, 1, 3, 5];

    let dense = dijkstra(&g, 0, 5).unwrap();
    let heap = heap_dijkstra(&g, 0, 5).unwrap();
    let astar = a_star(&g, 0, 5, None).unwrap();
    let negative = dijkstra_negative(&g, 0, 5, None).unwrap();
    let bounded = bmssp(&g, 0, 5).unwrap();
    let cached = CacheGraph::new(&g).get_shortest_path(0, 5).unwrap();

    for result in [&dense, &heap, &astar, &negative, &bounded, &cached] {
        assert_eq!(result.length, expected_length);
        assert_eq!(result.path, expected_path);
    }
}

#[test]
fn a_star_with_admissible_heuristic_matches_unguided_search() {
    let g = micro();
    // distance-to-destination lower bound via the dense tree, trivially admissible since it's
    // the exact remaining cost.
    let exact = dijkstra(&g, 0, 5).unwrap();
    let heuristic = |_u: usize, _d: usize| 0.0;
    let guided = a_star(&g, 0, 5, Some(&heuristic)).unwrap();
    assert_eq!(guided.length, exact.length);
}

#[test]
fn disconnected_destination_fails_the_same_way_everywhere() {
    let g = SparseGraph::from_rows(vec![vec![(1, 1.0)], vec![(0, 1.0)], vec![]]);
    assert!(dijkstra(&g, 0, 2).is_err());
    assert!(heap_dijkstra(&g, 0, 2).is_err());
    assert!(a_star(&g, 0, 2, None).is_err());
    assert!(dijkstra_negative(&g, 0, 2, None).is_err());
    assert!(bmssp(&g, 0, 2).is_err());
}
