//! `cp-spatial`: road network, spatial indexing, objective routing, and
//! network providers.
//!
//! # Crate layout
//!
//! | Module        | Contents                                                  |
//! |---------------|-----------------------------------------------------------|
//! | [`network`]   | `RoadNetwork` (CSR + R-tree), `RoadNetworkBuilder`        |
//! | [`proximity`] | `ProximityIndex`: metric radius queries                  |
//! | [`router`]    | `Router`, `EdgeCost`, `ObjectiveCost`, `DijkstraRouter`   |
//! | [`loader`]    | `load_network_csv` / `load_network_reader`                |
//! | [`provider`]  | `NetworkProvider`, `CsvDirProvider`, `NetworkCache`       |
//! | [`osm`]       | `load_from_pbf` (feature = `"osm"` only)                  |
//! | [`error`]     | `SpatialError`, `SpatialResult<T>`                        |
//!
//! # Feature flags
//!
//! | Flag    | Effect                                                       |
//! |---------|--------------------------------------------------------------|
//! | `osm`   | Enables OSM PBF loading via the `osmpbf` crate.             |
//! | `serde` | Derives `Serialize`/`Deserialize` on `cp-core` types.        |

pub mod error;
pub mod loader;
pub mod network;
pub mod provider;
pub mod proximity;
pub mod router;

#[cfg(feature = "osm")]
pub mod osm;


pub use error::{SpatialError, SpatialResult};
pub use loader::{load_network_csv, load_network_reader};
pub use network::{RoadAttrs, RoadNetwork, RoadNetworkBuilder};
pub use provider::{CsvDirProvider, NetworkCache, NetworkProvider};
#[cfg(feature = "osm")]
pub use provider::PbfProvider;
pub use proximity::{Hit, ProximityIndex};
pub use router::{DijkstraRouter, EdgeCost, EdgeWeight, ObjectiveCost, Path, Router};
