//! Grid graph specialization: integer cells, blocked-cell carving for a moving shape, and
//! non-integer endpoint snapping.

pub mod gridgraph;
mod persistence;
mod shape_sweep;

pub use gridgraph::{
    CacheFor, CoordinateFormat, CoordinatePath, GridGraph, GridPathOptions, GridPathResult,
    GridPoint, XY,
};
