use scgraph_rs::grid::{GridGraph, GridPathOptions};

#[test]
fn wall_forces_a_detour_around_its_open_end() {
    let x_size = 20;
    let y_size = 20;
    let blocks: Vec<(i64, i64)> = (5..y_size as i64).map(|y| (10, y)).collect();

    let mut grid = GridGraph::new(x_size, y_size, blocks, None, true, None).unwrap();
    let result = grid
        .get_shortest_path((2.0, 10.0), (18.0, 10.0), &GridPathOptions::default())
        .unwrap();
    assert!((result.length - 20.9704).abs() < 1e-3);
}

#[test]
fn without_the_wall_the_same_query_is_a_straight_line() {
    let mut grid = GridGraph::new(20, 20, vec![], None, true, None).unwrap();
    let result = grid
        .get_shortest_path((2.0, 10.0), (18.0, 10.0), &GridPathOptions::default())
        .unwrap();
    assert!((result.length - 16.0).abs() < 1e-9);
}
