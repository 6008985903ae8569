use crate::error::Error;
use crate::geo::geograph::GeoGraph;
use crate::geo::units;
use crate::graph::SparseGraph;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::collections::HashMap;
use std::fs;
use std::path::Path;

#[derive(Serialize, Deserialize)]
struct GraphJsonFile {
    #[serde(rename = "type")]
    kind: String,
    graph: Vec<HashMap<usize, f64>>,
    nodes: Vec<[f64; 2]>,
}

fn require_extension(path: &Path, extension: &str) -> Result<(), Error> {
    match path.extension().and_then(|e| e.to_str()) {
        Some(ext) if ext.eq_ignore_ascii_case(extension) => Ok(()),
        _ => Err(Error::io_error(format!(
            "{} must have a .{} extension",
            path.display(),
            extension
        ))),
    }
}

impl GeoGraph {
    /// Writes `{"type": "GeoGraph", "graph": [...], "nodes": [...]}` to `filename`, which must
    /// end in `.graphjson`.
    pub fn save_as_graphjson(&self, filename: &str) -> Result<(), Error> {
        let path = Path::new(filename);
        require_extension(path, "graphjson")?;
        let graph: Vec<HashMap<usize, f64>> = (0..self.graph().len())
            .map(|i| self.graph().row(i).map(|a| a.iter().map(|(&k, &v)| (k, v)).collect()).unwrap_or_default())
            .collect();
        let nodes: Vec<[f64; 2]> = self.nodes().iter().map(|&(lat, lon)| [lat, lon]).collect();
        let file = GraphJsonFile {
            kind: "GeoGraph".to_string(),
            graph,
            nodes,
        };
        let text = serde_json::to_string(&file)?;
        fs::write(path, text)?;
        Ok(())
    }

    /// Reverses [`Self::save_as_graphjson`].
    pub fn load_from_graphjson(filename: &str) -> Result<GeoGraph, Error> {
        let path = Path::new(filename);
        require_extension(path, "graphjson")?;
        let text = fs::read_to_string(path)?;
        let file: GraphJsonFile = serde_json::from_str(&text)?;
        if file.kind != "GeoGraph" {
            return Err(Error::invalid_graph(format!(
                "expected a GeoGraph file, found type {:?}",
                file.kind
            )));
        }
        let rows: Vec<Vec<(usize, f64)>> = file
            .graph
            .into_iter()
            .map(|row| row.into_iter().collect())
            .collect();
        let nodes: Vec<(f64, f64)> = file.nodes.into_iter().map(|p| (p[0], p[1])).collect();
        GeoGraph::new(SparseGraph::from_rows(rows), nodes)
    }

    /// Emits a GeoJSON `FeatureCollection` of one `LineString` per undirected edge (non-compact),
    /// or a single `GeometryCollection` containing one `MultiLineString` (compact).
    pub fn save_as_geojson(&self, filename: &str, compact: bool) -> Result<(), Error> {
        let value = if compact {
            let mut coordinates = Vec::new();
            for u in 0..self.graph().len() {
                for (v, _) in self.graph().neighbors(u) {
                    let (lat_u, lon_u) = self.nodes()[u];
                    let (lat_v, lon_v) = self.nodes()[v];
                    coordinates.push(vec![vec![lon_u, lat_u], vec![lon_v, lat_v]]);
                }
            }
            json!({
                "type": "GeometryCollection",
                "geometries": [{
                    "type": "MultiLineString",
                    "coordinates": coordinates,
                }]
            })
        } else {
            let mut features = Vec::new();
            for u in 0..self.graph().len() {
                for (v, weight) in self.graph().neighbors(u) {
                    if u < v {
                        let (lat_u, lon_u) = self.nodes()[u];
                        let (lat_v, lon_v) = self.nodes()[v];
                        features.push(json!({
                            "type": "Feature",
                            "geometry": {
                                "type": "LineString",
                                "coordinates": [[lon_u, lat_u], [lon_v, lat_v]],
                            },
                            "properties": {
                                "origin_idx": u,
                                "destination_idx": v,
                                "distance": weight,
                            },
                        }));
                    }
                }
            }
            json!({
                "type": "FeatureCollection",
                "features": features,
            })
        };
        fs::write(filename, serde_json::to_string(&value)?)?;
        Ok(())
    }

    /// Builds a GeoGraph from an already-simplified GeoJSON `FeatureCollection` or
    /// `GeometryCollection` of `LineString`/`MultiLineString` geometries: coordinates are rounded
    /// to `precision` decimal places, each unique rounded point becomes a node, and each
    /// consecutive pair within a line becomes an undirected haversine-weighted edge.
    ///
    /// Upstream line simplification (Visvalingam-Whyatt reduction of dense GPS traces) is not
    /// performed here; this expects input that has already been simplified.
    pub fn load_from_geojson(filename: &str, precision: i32) -> Result<GeoGraph, Error> {
        let text = fs::read_to_string(filename)?;
        let value: serde_json::Value = serde_json::from_str(&text)?;
        let mut lines: Vec<Vec<[f64; 2]>> = Vec::new();
        collect_lines(&value, &mut lines);

        let scale = 10f64.powi(precision);
        let round = |v: f64| (v * scale).round() / scale;

        let mut node_index: HashMap<(i64, i64), usize> = HashMap::new();
        let mut nodes: Vec<(f64, f64)> = Vec::new();
        let mut rows: Vec<Vec<(usize, f64)>> = Vec::new();

        let mut node_for = |lat: f64, lon: f64, node_index: &mut HashMap<(i64, i64), usize>, nodes: &mut Vec<(f64, f64)>, rows: &mut Vec<Vec<(usize, f64)>>| -> usize {
            let lat = round(lat);
            let lon = round(lon);
            let key = ((lat * scale) as i64, (lon * scale) as i64);
            *node_index.entry(key).or_insert_with(|| {
                nodes.push((lat, lon));
                rows.push(Vec::new());
                nodes.len() - 1
            })
        };

        for line in &lines {
            for pair in line.windows(2) {
                let [lon1, lat1] = pair[0];
                let [lon2, lat2] = pair[1];
                let a = node_for(lat1, lon1, &mut node_index, &mut nodes, &mut rows);
                let b = node_for(lat2, lon2, &mut node_index, &mut nodes, &mut rows);
                if a == b {
                    continue;
                }
                let distance = units::haversine((lat1, lon1), (lat2, lon2), "km", 1.0)?;
                rows[a].push((b, distance));
                rows[b].push((a, distance));
            }
        }

        GeoGraph::new(SparseGraph::from_rows(rows), nodes)
    }
}

fn collect_lines(value: &serde_json::Value, out: &mut Vec<Vec<[f64; 2]>>) {
    match value.get("type").and_then(|t| t.as_str()) {
        Some("FeatureCollection") => {
            if let Some(features) = value.get("features").and_then(|f| f.as_array()) {
                for feature in features {
                    if let Some(geometry) = feature.get("geometry") {
                        collect_lines(geometry, out);
                    }
                }
            }
        }
        Some("GeometryCollection") => {
            if let Some(geometries) = value.get("geometries").and_then(|g| g.as_array()) {
                for geometry in geometries {
                    collect_lines(geometry, out);
                }
            }
        }
        Some("LineString") => {
            if let Some(line) = parse_coordinate_list(value.get("coordinates")) {
                out.push(line);
            }
        }
        Some("MultiLineString") => {
            if let Some(lines) = value.get("coordinates").and_then(|c| c.as_array()) {
                for line in lines {
                    if let Some(parsed) = parse_coordinate_list(Some(line)) {
                        out.push(parsed);
                    }
                }
            }
        }
        _ => {}
    }
}

fn parse_coordinate_list(value: Option<&serde_json::Value>) -> Option<Vec<[f64; 2]>> {
    let array = value?.as_array()?;
    let mut points = Vec::with_capacity(array.len());
    for point in array {
        let pair = point.as_array()?;
        let lon = pair.first()?.as_f64()?;
        let lat = pair.get(1)?.as_f64()?;
        points.push([lon, lat]);
    }
    Some(points)
}
