//! `cp-analysis`: route planning and the security annotation layer.
//!
//! # Pipeline
//!
//! ```text
//! Scenario ──▶ snap waypoints ──▶ ① RoutePlanner      (3 objective routes)
//!                                 ② extract_chokepoints (count, score, merge)
//!                                 ③ generate_pois      (ambush, firing, observation, surveillance)
//!                                 ④ place_teams        (6 × SDT, 3 × CS)
//!                                 ──▶ AnalysisReport
//! ```
//!
//! Each stage consumes only the previous stages' output plus the read-only
//! network.  [`AnalysisService`] adds the scenario registry and a
//! process-wide, single-flight network cache in front of [`analyze`].
//!
//! # Cargo features
//!
//! | Feature    | Effect                                                    |
//! |------------|-----------------------------------------------------------|
//! | `parallel` | Runs the three objective searches on Rayon's thread pool. |
//! | `fx-hash`  | FxHash for the per-node route-usage map.                  |
//! | `serde`    | `Serialize`/`Deserialize` on the report types.            |

pub mod chokepoint;
pub mod error;
pub mod planner;
pub mod poi;
pub mod report;
pub mod service;
pub mod teams;

#[cfg(test)]
mod tests;

pub use chokepoint::{extract_chokepoints, Chokepoint, ChokepointMap, RouteSet, ScoreFactor};
pub use error::{AnalysisError, AnalysisResult};
pub use planner::{Route, RouteMap, RoutePlanner, SnappedWaypoints};
pub use poi::{generate_pois, PoiKind, PoiMap, PointOfInterest};
pub use report::{analyze, analyze_with, snap_waypoints, AnalysisReport};
pub use service::AnalysisService;
pub use teams::{place_teams, Assignment, SecurityTeam, TeamKind, TeamMap};
