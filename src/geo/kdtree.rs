use crate::error::Error;
use crate::geo::units::LatLon;

/// A node in the flat arena: an (x,y,z) unit-sphere embedding of a lat/lon point, its original
/// node index, the axis this node splits on, and arena indices of its children.
struct KdNode {
    point: [f64; 3],
    original_index: usize,
    axis: usize,
    left: Option<usize>,
    right: Option<usize>,
}

/// A k-d tree over the unit-sphere (x,y,z) embedding of lat/lon points, answering nearest-node
/// queries. Stored as a flat arena (`Vec<KdNode>`) rather than a recursive boxed structure, with
/// an explicit-stack nearest-neighbor search rather than recursive descent.
///
/// Euclidean distance in this embedding is a monotone function of great-circle distance, so
/// nearest-neighbor-by-Euclidean-distance-in-3D is equivalent to nearest-neighbor-by-haversine.
pub struct GeoKdTree {
    nodes: Vec<KdNode>,
    root: usize,
}

fn lat_lon_to_xyz(lat: f64, lon: f64) -> [f64; 3] {
    let lat_rad = lat.to_radians();
    let lon_rad = lon.to_radians();
    [
        lat_rad.cos() * lon_rad.cos(),
        lat_rad.cos() * lon_rad.sin(),
        lat_rad.sin(),
    ]
}

fn squared_distance(a: [f64; 3], b: [f64; 3]) -> f64 {
    (0..3).map(|i| (a[i] - b[i]).powi(2)).sum()
}

impl GeoKdTree {
    pub fn new(points: &[LatLon]) -> Result<GeoKdTree, Error> {
        if points.is_empty() {
            return Err(Error::invalid_argument(
                "cannot build a spatial index over zero points",
            ));
        }
        let mut entries: Vec<([f64; 3], usize)> = points
            .iter()
            .enumerate()
            .map(|(idx, &(lat, lon))| (lat_lon_to_xyz(lat, lon), idx))
            .collect();
        let mut nodes = Vec::with_capacity(points.len());
        let root = build(&mut entries, 0, &mut nodes);
        Ok(GeoKdTree { nodes, root })
    }

    /// Returns the original index of the stored point nearest to `query` by great-circle
    /// distance. Ties are broken by whichever candidate the traversal happens to visit last,
    /// which for a fixed tree and query is deterministic.
    pub fn closest_idx(&self, query: LatLon) -> usize {
        let target = lat_lon_to_xyz(query.0, query.1);
        let mut best_idx = self.nodes[self.root].original_index;
        let mut best_dist = squared_distance(target, self.nodes[self.root].point);

        enum Frame {
            Visit(usize),
            Resume { diff: f64, far: Option<usize> },
        }
        let mut stack = vec![Frame::Visit(self.root)];
        while let Some(frame) = stack.pop() {
            match frame {
                Frame::Visit(idx) => {
                    let node = &self.nodes[idx];
                    let d = squared_distance(target, node.point);
                    if d < best_dist {
                        best_dist = d;
                        best_idx = node.original_index;
                    }
                    let diff = target[node.axis] - node.point[node.axis];
                    let (near, far) = if diff < 0.0 {
                        (node.left, node.right)
                    } else {
                        (node.right, node.left)
                    };
                    stack.push(Frame::Resume { diff, far });
                    if let Some(n) = near {
                        stack.push(Frame::Visit(n));
                    }
                }
                Frame::Resume { diff, far } => {
                    if diff * diff < best_dist {
                        if let Some(f) = far {
                            stack.push(Frame::Visit(f));
                        }
                    }
                }
            }
        }
        best_idx
    }
}

fn build(entries: &mut [([f64; 3], usize)], depth: usize, nodes: &mut Vec<KdNode>) -> usize {
    let axis = depth % 3;
    entries.sort_by(|a, b| a.0[axis].partial_cmp(&b.0[axis]).unwrap());
    let median = entries.len() / 2;
    let (point, original_index) = entries[median];

    let left = if median > 0 {
        Some(build(&mut entries[..median], depth + 1, nodes))
    } else {
        None
    };
    let right = if median + 1 < entries.len() {
        Some(build(&mut entries[median + 1..], depth + 1, nodes))
    } else {
        None
    };

    nodes.push(KdNode {
        point,
        original_index,
        axis,
        left,
        right,
    });
    nodes.len() - 1
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_closest_idx_finds_nearest() {
        let points = vec![(0.0, 0.0), (10.0, 10.0), (-10.0, -10.0), (45.0, 45.0)];
        let tree = GeoKdTree::new(&points).unwrap();
        assert_eq!(tree.closest_idx((1.0, 1.0)), 0);
        assert_eq!(tree.closest_idx((44.0, 44.0)), 3);
        assert_eq!(tree.closest_idx((-9.0, -9.5)), 2);
    }

    #[test]
    fn test_single_point() {
        let points = vec![(5.0, 5.0)];
        let tree = GeoKdTree::new(&points).unwrap();
        assert_eq!(tree.closest_idx((50.0, -50.0)), 0);
    }

    #[test]
    fn test_empty_points_rejected() {
        assert!(GeoKdTree::new(&[]).is_err());
    }
}
