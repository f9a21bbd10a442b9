//! Map styling for exported features.
//!
//! Every feature carries a `layer` and a `color` property so a map tool can
//! style the four layers without extra configuration.

use cp_analysis::{PoiKind, TeamKind};
use cp_core::Objective;

/// What an exported feature depicts.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum FeatureKind {
    Route(Objective),
    Chokepoint,
    Poi(PoiKind),
    Team(TeamKind),
    /// A layer name this crate does not recognise.
    Unknown,
}

impl FeatureKind {
    /// Hex colour used on the map.
    pub fn color(self) -> &'static str {
        match self {
            FeatureKind::Route(Objective::Shortest)             => "#1f77b4",
            FeatureKind::Route(Objective::Logical)              => "#2ca02c",
            FeatureKind::Route(Objective::Safest)               => "#9467bd",
            FeatureKind::Chokepoint                             => "#d62728",
            FeatureKind::Poi(PoiKind::AmbushLocation)           => "#ff7f0e",
            FeatureKind::Poi(PoiKind::EnemyFiringPoint)         => "#8b0000",
            FeatureKind::Poi(PoiKind::EnemyObservationPoint)    => "#bcbd22",
            FeatureKind::Poi(PoiKind::SurveillancePoint)        => "#e377c2",
            FeatureKind::Team(TeamKind::Sdt)                    => "#17becf",
            FeatureKind::Team(TeamKind::Cs)                     => "#8c564b",
            FeatureKind::Unknown                                => "#7f7f7f",
        }
    }

    /// Layer name written to the `layer` property.
    pub fn layer(self) -> &'static str {
        match self {
            FeatureKind::Route(o)   => o.route_id(),
            FeatureKind::Chokepoint => "chokepoint",
            FeatureKind::Poi(k)     => k.as_str(),
            FeatureKind::Team(k)    => k.as_str(),
            FeatureKind::Unknown    => "unknown",
        }
    }

    /// Inverse of [`layer`](Self::layer); anything unrecognised is
    /// [`FeatureKind::Unknown`].
    pub fn from_layer(s: &str) -> FeatureKind {
        if s == "chokepoint" {
            return FeatureKind::Chokepoint;
        }
        if let Some(o) = Objective::ALL.into_iter().find(|o| o.route_id() == s) {
            return FeatureKind::Route(o);
        }
        if let Some(k) = PoiKind::ALL.into_iter().find(|k| k.as_str() == s) {
            return FeatureKind::Poi(k);
        }
        match s {
            "SDT" => FeatureKind::Team(TeamKind::Sdt),
            "CS"  => FeatureKind::Team(TeamKind::Cs),
            _     => FeatureKind::Unknown,
        }
    }
}
