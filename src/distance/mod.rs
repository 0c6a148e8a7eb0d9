//! Distances between delivery locations.
//!
//! Provides a packed symmetric matrix and a location-keyed graph on top of it.

mod graph;
mod matrix;

pub use graph::DistanceGraph;
pub use matrix::DistanceMatrix;
