use crate::algorithms::shortest_path::{self, PathResult};
use crate::algorithms::tree::{build_tree, Tree};
use crate::error::Error;
use crate::geo::kdtree::GeoKdTree;
use crate::geo::units::{self, LatLon};
use crate::graph::{Adjacency, SparseGraph};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

/// How a new origin/destination point is wired into the existing graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NodeAdditionType {
    /// Connect to the single nearest node found via the spatial index. O(log N).
    KdClosest,
    /// Connect to the single nearest node among those inside the lat/lon bounding box.
    Closest,
    /// Connect to the nearest node in each non-empty N/S x E/W quadrant (up to 4 edges).
    Quadrant,
    /// Connect to every node inside the lat/lon bounding box.
    All,
}

/// How "nearest" is judged when scanning candidates inside a bounding box.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NodeAdditionMath {
    Euclidean,
    Haversine,
}

/// Which algorithm backs a `get_shortest_path` call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Algorithm {
    Dense,
    Heap,
    AStar,
    Negative { cycle_check_iterations: Option<usize> },
    Bmssp,
}

/// How the returned coordinate path is shaped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CoordinateFormat {
    ListOfLists,
    ListOfListsLongFirst,
    ListOfDicts,
}

/// A `{latitude, longitude}` pair, used by [`CoordinateFormat::ListOfDicts`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatLonDict {
    pub latitude: f64,
    pub longitude: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum CoordinatePath {
    ListOfLists(Vec<[f64; 2]>),
    ListOfListsLongFirst(Vec<[f64; 2]>),
    ListOfDicts(Vec<LatLonDict>),
}

fn format_coordinates(points: &[LatLon], format: CoordinateFormat) -> CoordinatePath {
    match format {
        CoordinateFormat::ListOfLists => {
            CoordinatePath::ListOfLists(points.iter().map(|&(lat, lon)| [lat, lon]).collect())
        }
        CoordinateFormat::ListOfListsLongFirst => CoordinatePath::ListOfListsLongFirst(
            points.iter().map(|&(lat, lon)| [lon, lat]).collect(),
        ),
        CoordinateFormat::ListOfDicts => CoordinatePath::ListOfDicts(
            points
                .iter()
                .map(|&(lat, lon)| LatLonDict {
                    latitude: lat,
                    longitude: lon,
                })
                .collect(),
        ),
    }
}

/// Options for [`GeoGraph::get_shortest_path`]. Defaults mirror the reference behavior.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeoPathOptions {
    pub output_units: String,
    pub geograph_units: String,
    pub output_coordinate_path: CoordinateFormat,
    pub output_path: bool,
    pub cache: bool,
    pub length_only: bool,
    pub algorithm: Algorithm,
    pub node_addition_type: NodeAdditionType,
    pub destination_node_addition_type: NodeAdditionType,
    pub node_addition_circuity: f64,
    pub off_graph_circuity: f64,
    pub node_addition_math: NodeAdditionMath,
    /// `None` means "auto": derive the bound from the distance between the two endpoints.
    pub node_addition_lat_lon_bound: Option<f64>,
    pub auto_lat_lon_bound_max: f64,
}

impl Default for GeoPathOptions {
    fn default() -> GeoPathOptions {
        GeoPathOptions {
            output_units: "km".to_string(),
            geograph_units: "km".to_string(),
            output_coordinate_path: CoordinateFormat::ListOfLists,
            output_path: false,
            cache: false,
            length_only: false,
            algorithm: Algorithm::Heap,
            node_addition_type: NodeAdditionType::KdClosest,
            destination_node_addition_type: NodeAdditionType::KdClosest,
            node_addition_circuity: 4.0,
            off_graph_circuity: 1.0,
            node_addition_math: NodeAdditionMath::Euclidean,
            node_addition_lat_lon_bound: None,
            auto_lat_lon_bound_max: 2.0,
        }
    }
}

/// Result of [`GeoGraph::get_shortest_path`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeoPathResult {
    pub length: f64,
    pub coordinate_path: Option<CoordinatePath>,
    pub path: Option<Vec<usize>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DistanceMatrixOptions {
    pub off_graph_circuity: f64,
    pub geograph_units: String,
    pub output_units: String,
}

impl Default for DistanceMatrixOptions {
    fn default() -> DistanceMatrixOptions {
        DistanceMatrixOptions {
            off_graph_circuity: 1.0,
            geograph_units: "km".to_string(),
            output_units: "km".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MergeOptions {
    pub circuity_to_current_geograph: f64,
    pub circuity_to_other_geograph: f64,
    pub node_addition_type_current_geograph: NodeAdditionType,
    pub node_addition_type_other_geograph: NodeAdditionType,
    pub node_addition_math: NodeAdditionMath,
}

impl Default for MergeOptions {
    fn default() -> MergeOptions {
        MergeOptions {
            circuity_to_current_geograph: 1.2,
            circuity_to_other_geograph: 1.2,
            node_addition_type_current_geograph: NodeAdditionType::Closest,
            node_addition_type_other_geograph: NodeAdditionType::Closest,
            node_addition_math: NodeAdditionMath::Euclidean,
        }
    }
}

/// A sparse graph whose nodes are lat/lon points, with spatial lookup and on-the-fly
/// origin/destination injection for queries whose endpoints aren't already graph nodes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeoGraph {
    graph: SparseGraph,
    nodes: Vec<LatLon>,
    #[serde(skip)]
    kdtree: Option<GeoKdTree>,
    original_graph_length: usize,
    #[serde(skip)]
    cache: Vec<Option<Tree>>,
}

impl GeoGraph {
    pub fn new(graph: SparseGraph, nodes: Vec<LatLon>) -> Result<GeoGraph, Error> {
        if graph.len() != nodes.len() {
            return Err(Error::invalid_graph(format!(
                "graph has {} nodes but {} coordinates were given",
                graph.len(),
                nodes.len()
            )));
        }
        for &(lat, lon) in &nodes {
            if !(-90.0..=90.0).contains(&lat) || !(-180.0..=180.0).contains(&lon) {
                return Err(Error::invalid_graph(format!(
                    "node coordinate ({}, {}) is out of range",
                    lat, lon
                )));
            }
        }
        let kdtree = if nodes.is_empty() {
            None
        } else {
            Some(GeoKdTree::new(&nodes)?)
        };
        let n = graph.len();
        Ok(GeoGraph {
            graph,
            nodes,
            kdtree,
            original_graph_length: n,
            cache: (0..n).map(|_| None).collect(),
        })
    }

    pub fn graph(&self) -> &SparseGraph {
        &self.graph
    }

    pub fn nodes(&self) -> &[LatLon] {
        &self.nodes
    }

    pub fn validate_graph(&self, check_symmetry: bool, check_connected: bool) -> Result<(), Error> {
        self.graph.validate(check_symmetry, check_connected)
    }

    pub fn haversine_between(&self, origin_id: usize, destination_id: usize) -> Result<f64, Error> {
        units::haversine(self.nodes[origin_id], self.nodes[destination_id], "km", 1.0)
    }

    fn validate_point(&self, pt: LatLon) -> Result<(), Error> {
        if !(-90.0..=90.0).contains(&pt.0) || !(-180.0..=180.0).contains(&pt.1) {
            return Err(Error::invalid_endpoint(format!(
                "point ({}, {}) is out of range",
                pt.0, pt.1
            )));
        }
        Ok(())
    }

    fn tree(&mut self, source: usize) -> Result<&Tree, Error> {
        if source >= self.original_graph_length {
            return Err(Error::invalid_endpoint(format!(
                "cache source {} must be an original (non-temporary) node",
                source
            )));
        }
        if self.cache[source].is_none() {
            tracing::debug!(source, "geograph shortest-path-tree cache miss");
            self.cache[source] = Some(build_tree(&self.graph, source)?);
        } else {
            tracing::debug!(source, "geograph shortest-path-tree cache hit");
        }
        Ok(self.cache[source].as_ref().unwrap())
    }

    /// Candidate existing-node indices whose coordinates fall within `pt +/- bound` on both axes.
    fn candidates_in_box(&self, pt: LatLon, bound: f64) -> Vec<usize> {
        self.nodes
            .iter()
            .take(self.original_graph_length)
            .enumerate()
            .filter(|&(_, &(lat, lon))| {
                (lat - pt.0).abs() <= bound && (lon - pt.1).abs() <= bound
            })
            .map(|(i, _)| i)
            .collect()
    }

    fn node_distance(&self, a: LatLon, b: LatLon, math: NodeAdditionMath) -> f64 {
        match math {
            NodeAdditionMath::Haversine => units::haversine(a, b, "km", 1.0).unwrap_or(f64::INFINITY),
            NodeAdditionMath::Euclidean => {
                ((a.0 - b.0).powi(2) + (a.1 - b.1).powi(2)).sqrt()
            }
        }
    }

    /// Returns `{existing_node_index -> great-circle distance (circuity applied)}` candidates
    /// used to wire a new point into the graph, per `node_addition_type`.
    pub fn get_node_distances(
        &self,
        pt: LatLon,
        node_addition_type: NodeAdditionType,
        node_addition_math: NodeAdditionMath,
        circuity: f64,
        lat_lon_bound: f64,
    ) -> Result<Vec<(usize, f64)>, Error> {
        match node_addition_type {
            NodeAdditionType::KdClosest => {
                let kdtree = self
                    .kdtree
                    .as_ref()
                    .ok_or_else(|| Error::invalid_graph("geograph has no nodes to connect to"))?;
                let idx = kdtree.closest_idx(pt);
                let d = units::haversine(pt, self.nodes[idx], "km", circuity)?;
                Ok(vec![(idx, d)])
            }
            NodeAdditionType::Closest => {
                let candidates = self.candidates_in_box(pt, lat_lon_bound);
                if candidates.is_empty() {
                    return self.get_node_distances(
                        pt,
                        NodeAdditionType::KdClosest,
                        node_addition_math,
                        circuity,
                        lat_lon_bound,
                    );
                }
                let best = candidates
                    .into_iter()
                    .min_by(|&a, &b| {
                        self.node_distance(pt, self.nodes[a], node_addition_math)
                            .partial_cmp(&self.node_distance(pt, self.nodes[b], node_addition_math))
                            .unwrap()
                    })
                    .unwrap();
                let d = units::haversine(pt, self.nodes[best], "km", circuity)?;
                Ok(vec![(best, d)])
            }
            NodeAdditionType::Quadrant => {
                let candidates = self.candidates_in_box(pt, lat_lon_bound);
                if candidates.is_empty() {
                    return self.get_node_distances(
                        pt,
                        NodeAdditionType::KdClosest,
                        node_addition_math,
                        circuity,
                        lat_lon_bound,
                    );
                }
                let mut result = Vec::new();
                for (lat_ge, lon_ge) in [(true, true), (true, false), (false, true), (false, false)] {
                    let quadrant: Vec<usize> = candidates
                        .iter()
                        .copied()
                        .filter(|&i| {
                            let (lat, lon) = self.nodes[i];
                            (lat >= pt.0) == lat_ge && (lon >= pt.1) == lon_ge
                        })
                        .collect();
                    if let Some(&best) = quadrant.iter().min_by(|&&a, &&b| {
                        self.node_distance(pt, self.nodes[a], node_addition_math)
                            .partial_cmp(&self.node_distance(pt, self.nodes[b], node_addition_math))
                            .unwrap()
                    }) {
                        let d = units::haversine(pt, self.nodes[best], "km", circuity)?;
                        result.push((best, d));
                    }
                }
                Ok(result)
            }
            NodeAdditionType::All => {
                let candidates = self.candidates_in_box(pt, lat_lon_bound);
                if candidates.is_empty() {
                    return self.get_node_distances(
                        pt,
                        NodeAdditionType::KdClosest,
                        node_addition_math,
                        circuity,
                        lat_lon_bound,
                    );
                }
                candidates
                    .into_iter()
                    .map(|i| Ok((i, units::haversine(pt, self.nodes[i], "km", circuity)?)))
                    .collect()
            }
        }
    }

    /// Appends `pt` to the graph, wiring it to existing nodes per `node_addition_type`. Returns
    /// the new node's index.
    pub fn add_node(
        &mut self,
        pt: LatLon,
        node_addition_type: NodeAdditionType,
        circuity: f64,
        node_addition_math: NodeAdditionMath,
        lat_lon_bound: f64,
    ) -> Result<usize, Error> {
        let distances = self.get_node_distances(pt, node_addition_type, node_addition_math, circuity, lat_lon_bound)?;
        let new_idx = self.graph.push_node(Adjacency::default());
        self.nodes.push(pt);
        for (existing, distance) in distances {
            self.graph.set_edge(new_idx, existing, distance);
            self.graph.set_edge(existing, new_idx, distance);
        }
        Ok(new_idx)
    }

    /// Pops the most recently appended node, removing every mirror edge that pointed into it.
    /// Must be called exactly once per [`Self::add_node`] call, in reverse order.
    pub fn remove_appended_node(&mut self) -> Result<(), Error> {
        let popped = self
            .graph
            .pop_node()
            .ok_or_else(|| Error::invalid_graph("no appended node to remove"))?;
        let idx = self.graph.len();
        for (&neighbor, _) in popped.iter() {
            self.graph.remove_edge(neighbor, idx);
        }
        self.nodes.pop();
        Ok(())
    }

    fn run_algorithm(
        &self,
        algorithm: &Algorithm,
        origin: usize,
        destination: usize,
    ) -> Result<PathResult, Error> {
        match algorithm {
            Algorithm::Dense => shortest_path::dijkstra(&self.graph, origin, destination),
            Algorithm::Heap => shortest_path::heap_dijkstra(&self.graph, origin, destination),
            Algorithm::AStar => {
                let nodes = &self.nodes;
                let heuristic = |u: usize, d: usize| {
                    units::cheap_ruler(nodes[u], nodes[d], "km", 0.9).unwrap_or(0.0)
                };
                shortest_path::astar::a_star(&self.graph, origin, destination, Some(&heuristic))
            }
            Algorithm::Negative {
                cycle_check_iterations,
            } => shortest_path::dijkstra_negative(&self.graph, origin, destination, *cycle_check_iterations),
            Algorithm::Bmssp => shortest_path::bmssp(&self.graph, origin, destination),
        }
    }

    /// Computes a shortest path between two lat/lon points that need not already be graph nodes.
    /// See the crate-level documentation for the full option contract.
    pub fn get_shortest_path(
        &mut self,
        origin_pt: LatLon,
        destination_pt: LatLon,
        options: &GeoPathOptions,
    ) -> Result<GeoPathResult, Error> {
        self.validate_point(origin_pt)?;
        self.validate_point(destination_pt)?;

        let both_kdclosest = options.node_addition_type == NodeAdditionType::KdClosest
            && options.destination_node_addition_type == NodeAdditionType::KdClosest;
        let auto_bound = || -> Result<f64, Error> {
            Ok(units::lat_lon_bound_between(origin_pt, destination_pt)? * 1.01)
        };
        let destination_bound = match options.node_addition_lat_lon_bound {
            Some(b) => b,
            None if both_kdclosest => 180.0,
            None => auto_bound()?,
        };
        let origin_bound = match options.node_addition_lat_lon_bound {
            Some(b) => b,
            None if both_kdclosest => 180.0,
            None => destination_bound.min(options.auto_lat_lon_bound_max),
        };

        if options.cache {
            if !matches!(
                options.node_addition_type,
                NodeAdditionType::KdClosest | NodeAdditionType::Closest
            ) || !matches!(
                options.destination_node_addition_type,
                NodeAdditionType::KdClosest | NodeAdditionType::Closest
            ) {
                return Err(Error::invalid_argument(
                    "cache=true requires kdclosest or closest node addition types",
                ));
            }
            let (origin_idx, origin_leg) = self
                .get_node_distances(
                    origin_pt,
                    options.node_addition_type,
                    options.node_addition_math,
                    options.off_graph_circuity,
                    origin_bound,
                )?
                .into_iter()
                .next()
                .ok_or_else(|| Error::invalid_graph("no candidate node found for origin"))?;
            let (destination_idx, destination_leg) = self
                .get_node_distances(
                    destination_pt,
                    options.destination_node_addition_type,
                    options.node_addition_math,
                    options.off_graph_circuity,
                    destination_bound,
                )?
                .into_iter()
                .next()
                .ok_or_else(|| Error::invalid_graph("no candidate node found for destination"))?;

            let tree = self.tree(origin_idx)?;
            let graph_length = tree
                .length_to(destination_idx)
                .ok_or_else(|| Error::disconnected("no path between endpoints"))?;
            let inner_path = tree.path_to(destination_idx);
            let length = units::distance_converter(
                origin_leg + graph_length + destination_leg,
                &options.geograph_units,
                &options.output_units,
            )?;

            let mut coords = vec![origin_pt];
            coords.extend(inner_path.iter().map(|&i| self.nodes[i]));
            coords.push(destination_pt);

            return Ok(GeoPathResult {
                length,
                coordinate_path: if options.length_only {
                    None
                } else {
                    Some(format_coordinates(&coords, options.output_coordinate_path))
                },
                path: if options.output_path { Some(inner_path) } else { None },
            });
        }

        let origin_idx = self.add_node(
            origin_pt,
            options.node_addition_type,
            options.node_addition_circuity,
            options.node_addition_math,
            origin_bound,
        )?;
        let destination_idx = match self.add_node(
            destination_pt,
            options.destination_node_addition_type,
            options.node_addition_circuity,
            options.node_addition_math,
            destination_bound,
        ) {
            Ok(idx) => idx,
            Err(e) => {
                let _ = self.remove_appended_node();
                return Err(e);
            }
        };

        let algo_result = self.run_algorithm(&options.algorithm, origin_idx, destination_idx);

        let formatted = algo_result.as_ref().ok().map(|result| {
            let path = result.path.clone();
            let entry_weight = self.graph.get(path[0], path[1]);
            let exit_weight = if path.len() > 1 {
                self.graph.get(path[path.len() - 2], path[path.len() - 1])
            } else {
                None
            };
            (path, result.length, entry_weight, exit_weight)
        });

        let _ = self.remove_appended_node();
        let _ = self.remove_appended_node();

        let path_result = algo_result?;
        let (path, raw_length, entry_weight, exit_weight) = formatted.unwrap();

        let length = if path.len() == 2 {
            raw_length / options.node_addition_circuity * options.off_graph_circuity
        } else {
            let entry_raw = entry_weight.unwrap_or(0.0) / options.node_addition_circuity;
            let exit_raw = exit_weight.unwrap_or(0.0) / options.node_addition_circuity;
            raw_length + (entry_raw + exit_raw) * (options.off_graph_circuity - options.node_addition_circuity)
        };
        let length = units::distance_converter(length, &options.geograph_units, &options.output_units)?;

        // node indices for the interior of the path are still meaningful only during the call;
        // the coordinates were captured from self.nodes before the temp nodes were removed, by
        // recomputing them here from origin/destination_pt plus the tree already spent.
        let mut coordinate_points = Vec::with_capacity(path.len());
        coordinate_points.push(origin_pt);
        for &node in &path[1..path.len() - 1] {
            coordinate_points.push(self.nodes[node]);
        }
        coordinate_points.push(destination_pt);

        let _ = path_result;
        Ok(GeoPathResult {
            length,
            coordinate_path: if options.length_only {
                None
            } else {
                Some(format_coordinates(&coordinate_points, options.output_coordinate_path))
            },
            path: if options.output_path { Some(path) } else { None },
        })
    }

    /// Builds an I×I matrix of shortest-path lengths between `points`, reusing at most I distinct
    /// shortest-path trees rather than solving I² independent queries.
    pub fn distance_matrix(
        &mut self,
        points: &[LatLon],
        options: &DistanceMatrixOptions,
    ) -> Result<Vec<Vec<f64>>, Error> {
        // Each point's nearest-node lookup only reads `self`, so this batch is embarrassingly
        // parallel; the sequential cache-building pass below still runs single-threaded since it
        // mutates `self.cache`.
        let entries: Vec<(usize, f64)> = points
            .par_iter()
            .map(|&p| {
                self.validate_point(p)?;
                self.get_node_distances(
                    p,
                    NodeAdditionType::KdClosest,
                    NodeAdditionMath::Euclidean,
                    options.off_graph_circuity,
                    0.0,
                )?
                .into_iter()
                .next()
                .ok_or_else(|| Error::invalid_graph("no candidate node found"))
            })
            .collect::<Result<Vec<_>, Error>>()?;
        let n = points.len();
        let mut matrix = vec![vec![0.0; n]; n];
        for i in 0..n {
            for j in 0..n {
                if i == j {
                    continue;
                }
                let (ei, li) = entries[i];
                let (ej, lj) = entries[j];
                if ei == ej {
                    matrix[i][j] = 0.0;
                    continue;
                }
                let graph_length = self
                    .tree(ei)?
                    .length_to(ej)
                    .ok_or_else(|| Error::disconnected("no path between endpoints"))?;
                matrix[i][j] = units::distance_converter(
                    li + graph_length + lj,
                    &options.geograph_units,
                    &options.output_units,
                )?;
            }
        }
        Ok(matrix)
    }

    /// Merges `other` into `self` at the given (self_point, other_point) connection pairs.
    /// `other` is temporarily mutated during the call but left with its original content by the
    /// time this returns; `self` gains all of `other`'s original nodes/edges plus one new
    /// permanent node per connection pair.
    pub fn merge_with_other_geograph(
        &mut self,
        other: &mut GeoGraph,
        connection_nodes: &[(LatLon, LatLon)],
        options: &MergeOptions,
    ) -> Result<(), Error> {
        let mut pending_links: Vec<(usize, Vec<(usize, f64)>)> = Vec::new();
        for &(self_pt, other_pt) in connection_nodes {
            let self_idx = self.add_node(
                self_pt,
                options.node_addition_type_current_geograph,
                options.circuity_to_current_geograph,
                options.node_addition_math,
                180.0,
            )?;
            let other_idx = other.add_node(
                other_pt,
                options.node_addition_type_other_geograph,
                options.circuity_to_other_geograph,
                options.node_addition_math,
                180.0,
            )?;
            let other_connections: Vec<(usize, f64)> = other.graph.neighbors(other_idx).collect();
            other.remove_appended_node()?;
            pending_links.push((self_idx, other_connections));
        }

        let graph_length = self.graph.len();
        let original_other_length = other.nodes.len();
        for i in 0..original_other_length {
            self.nodes.push(other.nodes[i]);
            let row: Adjacency = other
                .graph
                .row(i)
                .cloned()
                .unwrap_or_default()
                .into_iter()
                .map(|(k, w)| (k + graph_length, w))
                .collect();
            self.graph.push_node(row);
        }
        self.cache.resize(self.graph.len(), None);

        for (self_idx, other_connections) in pending_links {
            for (other_node, distance) in other_connections {
                let target = graph_length + other_node;
                self.graph.set_edge(self_idx, target, distance);
                self.graph.set_edge(target, self_idx, distance);
            }
        }

        self.kdtree = Some(GeoKdTree::new(&self.nodes)?);
        Ok(())
    }
}
