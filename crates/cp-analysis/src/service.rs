//! Scenario-keyed analysis over a shared network cache.

use std::sync::Arc;

use cp_core::{AnalysisConfig, Scenario, ScenarioKey};
use cp_spatial::{NetworkCache, NetworkProvider, RoadNetwork};

use crate::report::{analyze, AnalysisReport};
use crate::{AnalysisError, AnalysisResult};

/// Runs the pipeline for registered scenarios, fetching each scenario's
/// road network once per process.
///
/// `Send + Sync` whenever the provider is; concurrent runs for the same
/// scenario share one network and at most one fetch.
///
/// ```rust,ignore
/// let service = AnalysisService::new(CsvDirProvider::new("data"));
/// let report = service.run("schiphol")?;
/// ```
pub struct AnalysisService<P> {
    cache:  NetworkCache<P>,
    config: AnalysisConfig,
}

impl<P: NetworkProvider> AnalysisService<P> {
    pub fn new(provider: P) -> Self {
        Self::with_config(provider, AnalysisConfig::default())
    }

    pub fn with_config(provider: P, config: AnalysisConfig) -> Self {
        Self { cache: NetworkCache::new(provider), config }
    }

    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    pub fn cache(&self) -> &NetworkCache<P> {
        &self.cache
    }

    /// Analyse a registered scenario by name, e.g. `"schiphol"`.
    pub fn run(&self, key: &str) -> AnalysisResult<AnalysisReport> {
        let key: ScenarioKey = key.parse()?;
        self.run_scenario(&key.scenario())
    }

    /// Analyse any scenario; its name and fetch region are the cache key.
    pub fn run_scenario(&self, scenario: &Scenario) -> AnalysisResult<AnalysisReport> {
        let network = self.network(scenario)?;
        analyze(&network, scenario, &self.config)
    }

    /// The cached network for `scenario`, fetching it on first use.
    pub fn network(&self, scenario: &Scenario) -> AnalysisResult<Arc<RoadNetwork>> {
        self.cache.get(scenario).map_err(|source| AnalysisError::GraphUnavailable {
            scenario: scenario.name.clone(),
            source,
        })
    }
}
