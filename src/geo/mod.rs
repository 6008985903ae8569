//! Geographic graph specialization: lat/lon nodes, spatial lookup, off-graph endpoint injection.

pub mod geograph;
pub mod kdtree;
mod persistence;
pub mod units;

pub use geograph::{
    Algorithm, CoordinateFormat, CoordinatePath, DistanceMatrixOptions, GeoGraph, GeoPathOptions,
    GeoPathResult, LatLonDict, MergeOptions, NodeAdditionMath, NodeAdditionType,
};
pub use kdtree::GeoKdTree;
