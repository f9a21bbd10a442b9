//! Network providers and the per-scenario network cache.
//!
//! A [`NetworkProvider`] turns a [`Scenario`] into a [`RoadNetwork`]:
//! reading CSV files, an OSM extract, or building one in memory.  The
//! [`NetworkCache`] wraps a provider so each scenario's network is fetched
//! at most once per process, no matter how many callers ask concurrently.
//!
//! # Single flight
//!
//! Each scenario owns a slot guarded by its own mutex.  Scenarios are keyed
//! by name and fetch region, so an ad-hoc scenario that reuses a registered
//! name over a different area gets its own network.  The first
//! caller holds the slot lock for the duration of the fetch; concurrent
//! callers for the same scenario block on the lock and then find the
//! network already stored.  Callers for different scenarios never wait on
//! each other.  A failed fetch leaves the slot empty, so the next caller
//! retries.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Arc, Mutex, PoisonError, TryLockError};

use cp_core::Scenario;

use crate::loader::load_network_csv;
use crate::network::RoadNetwork;
use crate::SpatialResult;

// ── NetworkProvider ───────────────────────────────────────────────────────────

/// Source of road networks for scenarios.
///
/// Closures `Fn(&Scenario) -> SpatialResult<RoadNetwork>` implement this
/// trait, which keeps test doubles short.
pub trait NetworkProvider: Send + Sync {
    fn fetch(&self, scenario: &Scenario) -> SpatialResult<RoadNetwork>;
}

impl<F> NetworkProvider for F
where
    F: Fn(&Scenario) -> SpatialResult<RoadNetwork> + Send + Sync,
{
    fn fetch(&self, scenario: &Scenario) -> SpatialResult<RoadNetwork> {
        self(scenario)
    }
}

/// Reads `<dir>/<scenario>_nodes.csv` and `<dir>/<scenario>_edges.csv`.
pub struct CsvDirProvider {
    dir: PathBuf,
}

impl CsvDirProvider {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

impl NetworkProvider for CsvDirProvider {
    fn fetch(&self, scenario: &Scenario) -> SpatialResult<RoadNetwork> {
        let nodes = self.dir.join(format!("{}_nodes.csv", scenario.name));
        let edges = self.dir.join(format!("{}_edges.csv", scenario.name));
        load_network_csv(&nodes, &edges)
    }
}

/// Reads one OSM extract and clips it to each scenario's region.  Edges
/// inside the scenario's dense-urban regions are tagged accordingly.
#[cfg(feature = "osm")]
pub struct PbfProvider {
    path: PathBuf,
}

#[cfg(feature = "osm")]
impl PbfProvider {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[cfg(feature = "osm")]
impl NetworkProvider for PbfProvider {
    fn fetch(&self, scenario: &Scenario) -> SpatialResult<RoadNetwork> {
        crate::osm::load_from_pbf_with(&self.path, Some(scenario.region), &scenario.dense_urban)
    }
}

// ── NetworkCache ──────────────────────────────────────────────────────────────

type Slot = Arc<Mutex<Option<Arc<RoadNetwork>>>>;

/// Name plus the bit patterns of the region corners.
#[derive(Clone, PartialEq, Eq, Hash, Debug)]
struct CacheKey {
    name:   String,
    region: [u32; 4],
}

impl CacheKey {
    fn of(scenario: &Scenario) -> Self {
        let r = scenario.region;
        Self {
            name:   scenario.name.clone(),
            region: [r.min.lat.to_bits(), r.min.lon.to_bits(), r.max.lat.to_bits(), r.max.lon.to_bits()],
        }
    }
}

/// Process-wide, single-flight cache of road networks keyed by scenario
/// name and region.
pub struct NetworkCache<P> {
    provider: P,
    slots:    Mutex<HashMap<CacheKey, Slot>>,
}

impl<P: NetworkProvider> NetworkCache<P> {
    pub fn new(provider: P) -> Self {
        Self { provider, slots: Mutex::new(HashMap::new()) }
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    /// Return the cached network for `scenario`, fetching it on first use.
    ///
    /// At most one fetch per scenario is in flight at a time; a failed fetch
    /// is returned to its caller and not cached.
    pub fn get(&self, scenario: &Scenario) -> SpatialResult<Arc<RoadNetwork>> {
        let slot = self.slot(CacheKey::of(scenario));
        let mut guard = slot.lock().unwrap_or_else(PoisonError::into_inner);

        if let Some(network) = guard.as_ref() {
            tracing::debug!(scenario = %scenario.name, "network cache hit");
            return Ok(Arc::clone(network));
        }

        tracing::info!(scenario = %scenario.name, "fetching road network");
        match self.provider.fetch(scenario) {
            Ok(network) => {
                tracing::info!(
                    scenario = %scenario.name,
                    nodes = network.node_count(),
                    edges = network.edge_count(),
                    "road network ready"
                );
                let network = Arc::new(network);
                *guard = Some(Arc::clone(&network));
                Ok(network)
            }
            Err(e) => {
                tracing::warn!(scenario = %scenario.name, error = %e, "road network fetch failed");
                Err(e)
            }
        }
    }

    /// `true` if a network for `scenario` is stored.  Never waits: a fetch
    /// still in flight reads as not stored.
    pub fn contains(&self, scenario: &Scenario) -> bool {
        let slot = {
            let slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
            match slots.get(&CacheKey::of(scenario)) {
                Some(slot) => Arc::clone(slot),
                None => return false,
            }
        };
        match slot.try_lock() {
            Ok(stored) => stored.is_some(),
            Err(TryLockError::Poisoned(e)) => e.into_inner().is_some(),
            Err(TryLockError::WouldBlock) => false,
        }
    }

    /// Drop every stored network.  In-flight fetches finish into their old
    /// slots and are not visible to later callers.
    pub fn clear(&self) {
        self.slots.lock().unwrap_or_else(PoisonError::into_inner).clear();
    }

    fn slot(&self, key: CacheKey) -> Slot {
        let mut slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(slots.entry(key).or_default())
    }
}
