//! `cp-core`: foundational types for the chokepoint analysis engine.
//!
//! This crate is a dependency of every other `cp-*` crate.  It intentionally
//! has no `cp-*` dependencies and minimal external ones (only `thiserror`,
//! plus optional `serde`).
//!
//! # What lives here
//!
//! | Module          | Contents                                              |
//! |-----------------|-------------------------------------------------------|
//! | [`ids`]         | `NodeId`, `EdgeId`, `ChokepointId`, `PoiId`           |
//! | [`geo`]         | `GeoPoint`, `GeoBounds`, haversine, bearings          |
//! | [`objective`]   | `Objective` (shortest / logical / safest)             |
//! | [`road`]        | `RoadClass`, `RoadTags`                               |
//! | [`scenario`]    | `Scenario`, `ScenarioKey`, `Waypoint`                 |
//! | [`config`]      | `AnalysisConfig` and its heuristic constants          |
//! | [`error`]       | `CoreError`, `CoreResult`                             |
//!
//! # Feature flags
//!
//! | Flag    | Effect                                                     |
//! |---------|------------------------------------------------------------|
//! | `serde` | Adds `Serialize`/`Deserialize` to all public types.        |

pub mod config;
pub mod error;
pub mod geo;
pub mod ids;
pub mod objective;
pub mod road;
pub mod scenario;


// ── Re-exports ────────────────────────────────────────────────────────────────

pub use config::{AnalysisConfig, ChokepointRules, PoiRules, RoutingWeights};
pub use error::{CoreError, CoreResult};
pub use geo::{GeoBounds, GeoPoint};
pub use ids::{ChokepointId, EdgeId, NodeId, PoiId};
pub use objective::Objective;
pub use road::{RoadClass, RoadTags};
pub use scenario::{Scenario, ScenarioKey, Waypoint};
