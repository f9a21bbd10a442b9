//! Core error type.
//!
//! Sub-crates define their own error enums and wrap `CoreError` as one
//! variant via `#[from]`.

use thiserror::Error;

use crate::Waypoint;

/// Errors raised while validating scenarios and configuration.
#[derive(Debug, Error, PartialEq)]
pub enum CoreError {
    /// Two consecutive waypoints coincide, so the leg between them would be
    /// a route of fewer than two nodes.
    #[error("degenerate geometry: {from} and {to} coincide")]
    DegenerateGeometry { from: Waypoint, to: Waypoint },

    #[error("unknown scenario {0:?}")]
    UnknownScenario(String),

    #[error("configuration error: {0}")]
    Config(String),
}

/// Shorthand result type for `cp-core`.
pub type CoreResult<T> = Result<T, CoreError>;
