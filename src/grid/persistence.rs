use crate::algorithms::tree::Tree;
use crate::error::Error;
use crate::graph::SparseGraph;
use crate::grid::gridgraph::GridGraph;
use flate2::read::ZlibDecoder;
use flate2::write::ZlibEncoder;
use flate2::Compression;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::io::{Read, Write};

const EXPORT_VERSION: u32 = 1;

#[derive(Serialize, Deserialize)]
struct ExportedGrid {
    export_version: u32,
    x_size: usize,
    y_size: usize,
    blocks: Vec<(i64, i64)>,
    shape: Vec<(f64, f64)>,
    conn_data: Vec<(i64, i64, f64)>,
    add_exterior_walls: bool,
    graph: SparseGraph,
    cache: Vec<Option<Tree>>,
}

impl GridGraph {
    /// Serializes the grid's attributes and its currently-populated cache via `bincode`,
    /// zlib-compressed, to `filename`.
    pub fn export_object(&self, filename: &str) -> Result<(), Error> {
        let exported = ExportedGrid {
            export_version: EXPORT_VERSION,
            x_size: self.x_size,
            y_size: self.y_size,
            blocks: self.blocks.iter().copied().collect(),
            shape: self.shape.clone(),
            conn_data: self.conn_data.clone(),
            add_exterior_walls: self.add_exterior_walls,
            graph: self.graph.clone(),
            cache: self.cache.clone(),
        };
        let bytes = bincode::serialize(&exported)?;
        let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(&bytes)?;
        let compressed = encoder.finish()?;
        fs::write(filename, compressed)?;
        Ok(())
    }

    /// Reverses [`Self::export_object`]. Fails with [`crate::ErrorKind::InvalidArgument`] if the
    /// file's `export_version` does not match this build's.
    pub fn import_object(filename: &str) -> Result<GridGraph, Error> {
        let compressed = fs::read(filename)?;
        let mut decoder = ZlibDecoder::new(&compressed[..]);
        let mut bytes = Vec::new();
        decoder.read_to_end(&mut bytes)?;
        let exported: ExportedGrid = bincode::deserialize(&bytes)?;
        if exported.export_version != EXPORT_VERSION {
            return Err(Error::invalid_argument(format!(
                "unsupported export_version {} (expected {})",
                exported.export_version, EXPORT_VERSION
            )));
        }
        let blocks: HashSet<(i64, i64)> = exported.blocks.into_iter().collect();
        Ok(GridGraph::from_parts(
            exported.x_size,
            exported.y_size,
            blocks,
            exported.shape,
            exported.conn_data,
            exported.add_exterior_walls,
            exported.graph,
            exported.cache,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::gridgraph::GridPathOptions;

    #[test]
    fn test_export_import_round_trip() {
        let mut g = GridGraph::new(4, 4, vec![], None, false, None).unwrap();
        g.get_shortest_path((0.0, 0.0), (3.0, 3.0), &GridPathOptions::default())
            .unwrap();
        let path = std::env::temp_dir().join("scgraph_rs_test_grid.bin");
        let path_str = path.to_str().unwrap();
        g.export_object(path_str).unwrap();
        let loaded = GridGraph::import_object(path_str).unwrap();
        assert_eq!(loaded.x_size(), g.x_size());
        assert_eq!(loaded.y_size(), g.y_size());
        assert_eq!(loaded.graph().len(), g.graph().len());
        let _ = std::fs::remove_file(path);
    }

    #[test]
    fn test_import_rejects_wrong_version() {
        let exported = ExportedGrid {
            export_version: 99,
            x_size: 2,
            y_size: 2,
            blocks: vec![],
            shape: vec![(0.0, 0.0), (0.0, 1.0), (1.0, 0.0), (1.0, 1.0)],
            conn_data: vec![(1, 0, 1.0)],
            add_exterior_walls: false,
            graph: SparseGraph::from_rows(vec![vec![], vec![], vec![], vec![]]),
            cache: vec![None, None, None, None],
        };
        let bytes = bincode::serialize(&exported).unwrap();
        let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(&bytes).unwrap();
        let compressed = encoder.finish().unwrap();
        let path = std::env::temp_dir().join("scgraph_rs_test_grid_bad_version.bin");
        fs::write(&path, compressed).unwrap();
        let err = GridGraph::import_object(path.to_str().unwrap()).unwrap_err();
        assert_eq!(err.kind, crate::ErrorKind::InvalidArgument);
        let _ = std::fs::remove_file(path);
    }
}
