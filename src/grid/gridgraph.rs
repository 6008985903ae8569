use crate::algorithms::shortest_path::astar::a_star;
use crate::algorithms::tree::{build_tree, Tree};
use crate::error::Error;
use crate::graph::{Adjacency, SparseGraph};
use crate::grid::shape_sweep;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// An (x, y) point in grid space. Need not be integer: [`GridGraph::get_shortest_path`] snaps a
/// fractional endpoint to the nearest connected integer cell.
pub type GridPoint = (f64, f64);

fn default_shape() -> Vec<(f64, f64)> {
    vec![(0.0, 0.0), (0.0, 1.0), (1.0, 0.0), (1.0, 1.0)]
}

fn default_conn_data() -> Vec<(i64, i64, f64)> {
    let diagonal = 1.4142;
    vec![
        (-1, -1, diagonal),
        (-1, 0, 1.0),
        (-1, 1, diagonal),
        (0, -1, 1.0),
        (0, 1, 1.0),
        (1, -1, diagonal),
        (1, 0, 1.0),
        (1, 1, diagonal),
    ]
}

fn cell_index(x: usize, y: usize, x_size: usize) -> usize {
    x + y * x_size
}

fn compile_graph(
    x_size: usize,
    y_size: usize,
    blocks: &HashSet<(i64, i64)>,
    shape: &[(f64, f64)],
    conn_data: &[(i64, i64, f64)],
) -> SparseGraph {
    let n = x_size * y_size;
    let mut rows: Vec<Adjacency> = vec![Adjacency::default(); n];
    for y in 0..y_size {
        for x in 0..x_size {
            for &(dx, dy, dist) in conn_data {
                let nx = x as i64 + dx;
                let ny = y as i64 + dy;
                if nx >= 0 && nx < x_size as i64 && ny >= 0 && ny < y_size as i64 {
                    rows[cell_index(x, y, x_size)]
                        .insert(cell_index(nx as usize, ny as usize, x_size), dist);
                }
            }
        }
    }

    let delta_offsets: Vec<((i64, i64), Vec<(i64, i64)>)> = conn_data
        .iter()
        .map(|&(dx, dy, _)| ((dx, dy), shape_sweep::swept_offsets(shape, dx as f64, dy as f64)))
        .collect();

    for &(bx, by) in blocks {
        if bx >= 0 && bx < x_size as i64 && by >= 0 && by < y_size as i64 {
            rows[cell_index(bx as usize, by as usize, x_size)] = Adjacency::default();
        }
        for (&(dx, dy), offsets) in delta_offsets.iter() {
            for &(ox, oy) in offsets {
                let x_cell = bx - ox;
                let y_cell = by - oy;
                if x_cell < 0 || x_cell >= x_size as i64 || y_cell < 0 || y_cell >= y_size as i64 {
                    continue;
                }
                let x_move_to = x_cell + dx;
                let y_move_to = y_cell + dy;
                if x_move_to < 0
                    || x_move_to >= x_size as i64
                    || y_move_to < 0
                    || y_move_to >= y_size as i64
                {
                    continue;
                }
                let from = cell_index(x_cell as usize, y_cell as usize, x_size);
                let to = cell_index(x_move_to as usize, y_move_to as usize, x_size);
                rows[from].remove(&to);
            }
        }
    }

    SparseGraph::new(rows)
}

/// How a query's output coordinate path is shaped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CoordinateFormat {
    ListOfTuples,
    ListOfLists,
    ListOfDicts,
}

/// An `{x, y}` pair, used by [`CoordinateFormat::ListOfDicts`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct XY {
    pub x: f64,
    pub y: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum CoordinatePath {
    ListOfTuples(Vec<(f64, f64)>),
    ListOfLists(Vec<[f64; 2]>),
    ListOfDicts(Vec<XY>),
}

fn format_coordinates(points: &[GridPoint], format: CoordinateFormat) -> CoordinatePath {
    match format {
        CoordinateFormat::ListOfTuples => CoordinatePath::ListOfTuples(points.to_vec()),
        CoordinateFormat::ListOfLists => {
            CoordinatePath::ListOfLists(points.iter().map(|&(x, y)| [x, y]).collect())
        }
        CoordinateFormat::ListOfDicts => {
            CoordinatePath::ListOfDicts(points.iter().map(|&(x, y)| XY { x, y }).collect())
        }
    }
}

/// Which endpoint's shortest-path-tree is cached when `cache` is set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CacheFor {
    Origin,
    Destination,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GridPathOptions {
    pub output_coordinate_path: CoordinateFormat,
    pub output_path: bool,
    pub cache: bool,
    pub cache_for: CacheFor,
    pub length_only: bool,
}

impl Default for GridPathOptions {
    fn default() -> GridPathOptions {
        GridPathOptions {
            output_coordinate_path: CoordinateFormat::ListOfDicts,
            output_path: false,
            cache: false,
            cache_for: CacheFor::Origin,
            length_only: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GridPathResult {
    pub length: f64,
    pub coordinate_path: Option<CoordinatePath>,
    pub path: Option<Vec<usize>>,
}

/// A grid of unit cells compiled into a sparse graph: a moving shape sweeps between adjacent
/// cells along `conn_data`'s offsets, and any blocked cell vetoes every move whose swept volume
/// would pass through it.
#[derive(Debug, Clone)]
pub struct GridGraph {
    pub(crate) x_size: usize,
    pub(crate) y_size: usize,
    pub(crate) blocks: HashSet<(i64, i64)>,
    pub(crate) shape: Vec<(f64, f64)>,
    pub(crate) conn_data: Vec<(i64, i64, f64)>,
    pub(crate) add_exterior_walls: bool,
    pub(crate) graph: SparseGraph,
    pub(crate) cache: Vec<Option<Tree>>,
}

impl GridGraph {
    pub fn new(
        x_size: usize,
        y_size: usize,
        blocks: Vec<(i64, i64)>,
        shape: Option<Vec<(f64, f64)>>,
        add_exterior_walls: bool,
        conn_data: Option<Vec<(i64, i64, f64)>>,
    ) -> Result<GridGraph, Error> {
        if x_size == 0 || y_size == 0 {
            return Err(Error::invalid_argument(
                "x_size and y_size must be greater than 0",
            ));
        }
        let shape = shape.unwrap_or_else(default_shape);
        let conn_data = conn_data.unwrap_or_else(default_conn_data);

        let mut block_set: HashSet<(i64, i64)> = blocks.into_iter().collect();
        if add_exterior_walls {
            for x in 0..x_size as i64 {
                block_set.insert((x, 0));
                block_set.insert((x, y_size as i64 - 1));
            }
            for y in 0..y_size as i64 {
                block_set.insert((0, y));
                block_set.insert((x_size as i64 - 1, y));
            }
        }
        for &(x, y) in &block_set {
            if x < 0 || x >= x_size as i64 || y < 0 || y >= y_size as i64 {
                return Err(Error::invalid_argument(format!(
                    "blocked cell ({}, {}) is out of grid bounds",
                    x, y
                )));
            }
        }

        let graph = compile_graph(x_size, y_size, &block_set, &shape, &conn_data);
        let n = graph.len();
        Ok(GridGraph {
            x_size,
            y_size,
            blocks: block_set,
            shape,
            conn_data,
            add_exterior_walls,
            graph,
            cache: (0..n).map(|_| None).collect(),
        })
    }

    pub(crate) fn from_parts(
        x_size: usize,
        y_size: usize,
        blocks: HashSet<(i64, i64)>,
        shape: Vec<(f64, f64)>,
        conn_data: Vec<(i64, i64, f64)>,
        add_exterior_walls: bool,
        graph: SparseGraph,
        cache: Vec<Option<Tree>>,
    ) -> GridGraph {
        GridGraph {
            x_size,
            y_size,
            blocks,
            shape,
            conn_data,
            add_exterior_walls,
            graph,
            cache,
        }
    }

    pub fn graph(&self) -> &SparseGraph {
        &self.graph
    }

    pub fn x_size(&self) -> usize {
        self.x_size
    }

    pub fn y_size(&self) -> usize {
        self.y_size
    }

    /// Index of cell `(x, y)`. Fails with [`crate::ErrorKind::InvalidEndpoint`] if out of bounds.
    pub fn get_idx(&self, x: usize, y: usize) -> Result<usize, Error> {
        if x >= self.x_size || y >= self.y_size {
            return Err(Error::invalid_endpoint(format!(
                "({}, {}) is out of grid bounds",
                x, y
            )));
        }
        Ok(cell_index(x, y, self.x_size))
    }

    /// Reverses [`Self::get_idx`].
    pub fn get_x_y(&self, idx: usize) -> Result<(usize, usize), Error> {
        if idx >= self.graph.len() {
            return Err(Error::invalid_endpoint(format!(
                "index {} is out of range",
                idx
            )));
        }
        Ok((idx % self.x_size, idx / self.x_size))
    }

    fn is_connected(&self, idx: usize) -> bool {
        self.graph.row(idx).map_or(false, |row| !row.is_empty())
    }

    /// Resolves a possibly-fractional endpoint to a connected integer cell index plus the
    /// straight-line off-grid distance from `pt` to that cell.
    fn resolve_endpoint(&self, pt: GridPoint) -> Result<(usize, f64), Error> {
        let (x, y) = pt;
        if x >= 0.0 && y >= 0.0 && x.fract() == 0.0 && y.fract() == 0.0 {
            let (xi, yi) = (x as usize, y as usize);
            if xi < self.x_size && yi < self.y_size {
                let idx = cell_index(xi, yi, self.x_size);
                if self.is_connected(idx) {
                    return Ok((idx, 0.0));
                }
            }
        }

        let floor_x = x.floor();
        let floor_y = y.floor();
        let mut best: Option<(usize, f64)> = None;
        for dx in 0..2i64 {
            for dy in 0..2i64 {
                let cx = floor_x + dx as f64;
                let cy = floor_y + dy as f64;
                if cx < 0.0 || cy < 0.0 {
                    continue;
                }
                let (cxu, cyu) = (cx as usize, cy as usize);
                if cxu >= self.x_size || cyu >= self.y_size {
                    continue;
                }
                let idx = cell_index(cxu, cyu, self.x_size);
                if !self.is_connected(idx) {
                    continue;
                }
                let d = ((cx - x).powi(2) + (cy - y).powi(2)).sqrt();
                if best.map_or(true, |(_, best_d)| d < best_d) {
                    best = Some((idx, d));
                }
            }
        }
        best.ok_or_else(|| {
            Error::invalid_endpoint(format!("no connected grid cell near ({}, {})", x, y))
        })
    }

    fn tree(&mut self, source: usize) -> Result<&Tree, Error> {
        if source >= self.graph.len() {
            return Err(Error::invalid_endpoint(format!(
                "source {} is out of range",
                source
            )));
        }
        if self.cache[source].is_none() {
            tracing::debug!(source, "gridgraph shortest-path-tree cache miss");
            self.cache[source] = Some(build_tree(&self.graph, source)?);
        } else {
            tracing::debug!(source, "gridgraph shortest-path-tree cache hit");
        }
        Ok(self.cache[source].as_ref().unwrap())
    }

    /// Shortest path between two grid points, which may be non-integer (snapped to the nearest
    /// connected integer cell) or integer (used directly, provided the cell is connected).
    pub fn get_shortest_path(
        &mut self,
        origin: GridPoint,
        destination: GridPoint,
        options: &GridPathOptions,
    ) -> Result<GridPathResult, Error> {
        let (origin_idx, origin_leg) = self.resolve_endpoint(origin)?;
        let (destination_idx, destination_leg) = self.resolve_endpoint(destination)?;

        let (graph_length, inner_path) = if options.cache {
            let (source, target, reversed) = match options.cache_for {
                CacheFor::Origin => (origin_idx, destination_idx, false),
                CacheFor::Destination => (destination_idx, origin_idx, true),
            };
            let tree = self.tree(source)?;
            let length = tree
                .length_to(target)
                .ok_or_else(|| Error::disconnected("no path between endpoints"))?;
            let mut path = tree.path_to(target);
            if reversed {
                path.reverse();
            }
            (length, path)
        } else {
            let x_size = self.x_size;
            let heuristic = move |u: usize, d: usize| {
                let (ux, uy) = (u % x_size, u / x_size);
                let (dx, dy) = (d % x_size, d / x_size);
                (((ux as f64 - dx as f64).powi(2) + (uy as f64 - dy as f64).powi(2))).sqrt()
            };
            let result = a_star(&self.graph, origin_idx, destination_idx, Some(&heuristic))?;
            (result.length, result.path)
        };

        let length = origin_leg + graph_length + destination_leg;

        let mut coordinates: Vec<GridPoint> = Vec::with_capacity(inner_path.len() + 2);
        coordinates.push(origin);
        for &idx in &inner_path {
            let x = (idx % self.x_size) as f64;
            let y = (idx / self.x_size) as f64;
            coordinates.push((x, y));
        }
        coordinates.push(destination);

        Ok(GridPathResult {
            length,
            coordinate_path: if options.length_only {
                None
            } else {
                Some(format_coordinates(&coordinates, options.output_coordinate_path))
            },
            path: if options.output_path {
                Some(inner_path)
            } else {
                None
            },
        })
    }

    /// Marks a previously-open cell blocked and recompiles the graph.
    pub fn mod_add_block(&mut self, x: i64, y: i64) -> Result<(), Error> {
        self.check_in_bounds(x, y)?;
        self.blocks.insert((x, y));
        self.recompile();
        Ok(())
    }

    /// Marks a blocked cell open again and recompiles the graph.
    pub fn mod_remove_block(&mut self, x: i64, y: i64) -> Result<(), Error> {
        self.check_in_bounds(x, y)?;
        self.blocks.remove(&(x, y));
        self.recompile();
        Ok(())
    }

    fn check_in_bounds(&self, x: i64, y: i64) -> Result<(), Error> {
        if x < 0 || x >= self.x_size as i64 || y < 0 || y >= self.y_size as i64 {
            return Err(Error::invalid_argument(format!(
                "({}, {}) is out of grid bounds",
                x, y
            )));
        }
        Ok(())
    }

    fn recompile(&mut self) {
        self.graph = compile_graph(self.x_size, self.y_size, &self.blocks, &self.shape, &self.conn_data);
        self.cache = (0..self.graph.len()).map(|_| None).collect();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_corner_squeeze_blocks_diagonal_move() {
        let g = GridGraph::new(2, 2, vec![(0, 1)], None, false, None).unwrap();
        let a = g.get_idx(0, 0).unwrap();
        let b = g.get_idx(1, 1).unwrap();
        assert!(g.graph().get(a, b).is_none());
        assert!(g.graph().get(b, a).is_none());
    }

    #[test]
    fn test_shortest_path_simple() {
        let mut g = GridGraph::new(5, 5, vec![], None, false, None).unwrap();
        let result = g
            .get_shortest_path((0.0, 0.0), (4.0, 4.0), &GridPathOptions::default())
            .unwrap();
        assert!(result.length > 0.0);
    }

    #[test]
    fn test_shortest_path_cached_destination_direction() {
        let mut g = GridGraph::new(5, 5, vec![], None, false, None).unwrap();
        let mut options = GridPathOptions::default();
        options.cache = true;
        options.cache_for = CacheFor::Destination;
        options.output_path = true;
        let result = g
            .get_shortest_path((0.0, 0.0), (4.0, 4.0), &options)
            .unwrap();
        let path = result.path.unwrap();
        assert_eq!(*path.first().unwrap(), g.get_idx(0, 0).unwrap());
        assert_eq!(*path.last().unwrap(), g.get_idx(4, 4).unwrap());
    }

    #[test]
    fn test_non_integer_endpoint_snaps_to_connected_cell() {
        let mut g = GridGraph::new(5, 5, vec![], None, false, None).unwrap();
        let result = g
            .get_shortest_path((0.4, 0.4), (4.0, 4.0), &GridPathOptions::default())
            .unwrap();
        assert!(result.length > 0.0);
    }

    #[test]
    fn test_disconnected_endpoint_when_every_candidate_cell_is_blocked() {
        // a 2x2 grid with exterior walls has its entire surface on the rim, so no cell is
        // ever connected.
        let mut g = GridGraph::new(2, 2, vec![], None, true, None).unwrap();
        let err = g
            .get_shortest_path((0.0, 0.0), (1.0, 1.0), &GridPathOptions::default())
            .unwrap_err();
        assert_eq!(err.kind, crate::ErrorKind::InvalidEndpoint);
    }

    #[test]
    fn test_mod_add_remove_block_round_trips() {
        let mut g = GridGraph::new(5, 5, vec![], None, false, None).unwrap();
        let a = g.get_idx(2, 2).unwrap();
        let b = g.get_idx(3, 2).unwrap();
        assert!(g.graph().get(a, b).is_some());
        g.mod_add_block(3, 2).unwrap();
        assert!(g.graph().get(a, b).is_none());
        g.mod_remove_block(3, 2).unwrap();
        assert!(g.graph().get(a, b).is_some());
    }

    #[test]
    fn test_zero_size_rejected() {
        assert!(GridGraph::new(0, 5, vec![], None, false, None).is_err());
    }
}
