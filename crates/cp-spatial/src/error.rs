//! Spatial-subsystem error type.

use thiserror::Error;

use cp_core::NodeId;

/// Errors produced by `cp-spatial`.
#[derive(Debug, Error)]
pub enum SpatialError {
    #[error("no route from {from} to {to}")]
    NoRoute { from: NodeId, to: NodeId },

    #[error("node {0} not found in network")]
    NodeNotFound(NodeId),

    /// A network file was readable but its contents were not.
    #[error("network parse error: {0}")]
    Parse(String),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[cfg(feature = "osm")]
    #[error("OSM parse error: {0}")]
    Osm(String),

    /// A network provider failed for a reason of its own.
    #[error("network provider failed: {0}")]
    Provider(String),
}

pub type SpatialResult<T> = Result<T, SpatialError>;
