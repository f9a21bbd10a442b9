use thiserror::Error;

use cp_core::{CoreError, NodeId, Waypoint};
use cp_spatial::SpatialError;

#[derive(Debug, Error)]
pub enum AnalysisError {
    /// The road network for a scenario could not be obtained.  Not retried
    /// automatically; the next call for the same scenario fetches again.
    #[error("road network unavailable for scenario {scenario:?}: {source}")]
    GraphUnavailable {
        scenario: String,
        #[source]
        source:   SpatialError,
    },

    /// No path connects two consecutive waypoints.
    #[error("no path from {from} ({from_node}) to {to} ({to_node})")]
    PathNotFound {
        from:      Waypoint,
        to:        Waypoint,
        from_node: NodeId,
        to_node:   NodeId,
    },

    /// Two consecutive waypoints coincide, either as coordinates or after
    /// snapping to the same road node (`node` is set in the latter case).
    #[error("degenerate geometry: {from} and {to} coincide")]
    DegenerateGeometry {
        from: Waypoint,
        to:   Waypoint,
        node: Option<NodeId>,
    },

    /// Any other routing failure (e.g. a waypoint node missing from the
    /// network it was snapped against).
    #[error("routing failed: {0}")]
    Spatial(SpatialError),

    #[error(transparent)]
    Core(CoreError),
}

/// Degenerate scenarios map onto [`AnalysisError::DegenerateGeometry`] so
/// callers match a single variant regardless of where it was detected.
impl From<CoreError> for AnalysisError {
    fn from(e: CoreError) -> Self {
        match e {
            CoreError::DegenerateGeometry { from, to } => {
                AnalysisError::DegenerateGeometry { from, to, node: None }
            }
            other => AnalysisError::Core(other),
        }
    }
}

pub type AnalysisResult<T> = Result<T, AnalysisError>;
