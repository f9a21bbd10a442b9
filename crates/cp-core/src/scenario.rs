//! Named origin → via → destination scenarios.
//!
//! A [`Scenario`] is an immutable record read by every pipeline stage.  The
//! registered set is fixed at compile time and selected by [`ScenarioKey`];
//! tests and applications may also build ad-hoc scenarios with
//! [`Scenario::new`].
//!
//! Coordinates are approximate and refined during reconnaissance.

use std::str::FromStr;

use crate::{CoreError, CoreResult, GeoBounds, GeoPoint};

/// Padding added around the waypoints' bounding box to form the region the
/// road network is fetched for.
pub const FETCH_BUFFER_M: f32 = 8_000.0;

const SCHIPHOL_AIRPORT:  GeoPoint = GeoPoint::new(52.3105, 4.7683);
const ROTTERDAM_AIRPORT: GeoPoint = GeoPoint::new(51.9569, 4.4372);
const WORLD_FORUM:       GeoPoint = GeoPoint::new(52.0930, 4.2867);
const MAURITSHUIS:       GeoPoint = GeoPoint::new(52.0809, 4.3146);

// ── Waypoint ──────────────────────────────────────────────────────────────────

/// The role a point plays in a scenario, used to name unreachable pairs.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum Waypoint {
    Origin,
    Via,
    Destination,
}

impl Waypoint {
    pub fn as_str(self) -> &'static str {
        match self {
            Waypoint::Origin      => "origin",
            Waypoint::Via         => "via",
            Waypoint::Destination => "destination",
        }
    }
}

impl std::fmt::Display for Waypoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ── Scenario ──────────────────────────────────────────────────────────────────

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Scenario {
    /// Cache key and file-name stem, e.g. `"schiphol"`.
    pub name:         String,
    pub origin:       GeoPoint,
    pub via:          GeoPoint,
    pub destination:  GeoPoint,
    /// Display names for the three waypoints.
    pub labels:       [String; 3],
    /// Region the road network must cover.
    pub region:       GeoBounds,
    /// Regions whose chokepoints receive the dense-urban score bonus.
    pub dense_urban:  Vec<GeoBounds>,
}

impl Scenario {
    /// Build an ad-hoc scenario.  The fetch region is the waypoints' bounding
    /// box padded by [`FETCH_BUFFER_M`]; there are no dense-urban regions.
    pub fn new(name: impl Into<String>, origin: GeoPoint, via: GeoPoint, destination: GeoPoint) -> Self {
        let region = GeoBounds::new(origin, origin)
            .union_point(via)
            .union_point(destination)
            .padded(FETCH_BUFFER_M);
        Self {
            name: name.into(),
            origin,
            via,
            destination,
            labels: ["Origin".into(), "Via".into(), "Destination".into()],
            region,
            dense_urban: Vec::new(),
        }
    }

    pub fn with_labels(mut self, origin: &str, via: &str, destination: &str) -> Self {
        self.labels = [origin.into(), via.into(), destination.into()];
        self
    }

    pub fn with_dense_urban(mut self, region: GeoBounds) -> Self {
        self.dense_urban.push(region);
        self
    }

    pub fn with_region(mut self, region: GeoBounds) -> Self {
        self.region = region;
        self
    }

    /// Position of one waypoint.
    pub fn waypoint(&self, which: Waypoint) -> GeoPoint {
        match which {
            Waypoint::Origin      => self.origin,
            Waypoint::Via         => self.via,
            Waypoint::Destination => self.destination,
        }
    }

    pub fn label(&self, which: Waypoint) -> &str {
        &self.labels[which as usize]
    }

    /// `true` if `p` lies in any configured dense-urban region.
    pub fn is_dense_urban(&self, p: GeoPoint) -> bool {
        self.dense_urban.iter().any(|b| b.contains(p))
    }

    /// Reject scenarios whose legs would collapse to a single point, and
    /// coordinates outside the WGS-84 range.
    pub fn validate(&self) -> CoreResult<()> {
        for (which, p) in [
            (Waypoint::Origin, self.origin),
            (Waypoint::Via, self.via),
            (Waypoint::Destination, self.destination),
        ] {
            if !p.is_valid() {
                return Err(CoreError::Config(format!(
                    "scenario {:?}: {which} coordinate {p} is not a valid WGS-84 pair",
                    self.name
                )));
            }
        }
        if self.origin == self.via {
            return Err(CoreError::DegenerateGeometry { from: Waypoint::Origin, to: Waypoint::Via });
        }
        if self.via == self.destination {
            return Err(CoreError::DegenerateGeometry { from: Waypoint::Via, to: Waypoint::Destination });
        }
        Ok(())
    }
}

// ── Registry ──────────────────────────────────────────────────────────────────

/// The pre-registered scenarios.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum ScenarioKey {
    /// Schiphol airport → World Forum → Mauritshuis.
    Schiphol,
    /// Rotterdam/The Hague airport → World Forum → Mauritshuis.
    RotterdamTheHague,
}

impl ScenarioKey {
    pub const ALL: [ScenarioKey; 2] = [ScenarioKey::Schiphol, ScenarioKey::RotterdamTheHague];

    pub fn name(self) -> &'static str {
        match self {
            ScenarioKey::Schiphol          => "schiphol",
            ScenarioKey::RotterdamTheHague => "rotterdam_the_hague",
        }
    }

    /// Build the full scenario record for this key.
    pub fn scenario(self) -> Scenario {
        let hague_centre = GeoBounds::new(GeoPoint::new(52.070, 4.280), GeoPoint::new(52.095, 4.330));
        match self {
            ScenarioKey::Schiphol => Scenario::new(self.name(), SCHIPHOL_AIRPORT, WORLD_FORUM, MAURITSHUIS)
                .with_labels("Schiphol Airport", "World Forum", "Mauritshuis")
                .with_dense_urban(hague_centre),
            ScenarioKey::RotterdamTheHague => {
                Scenario::new(self.name(), ROTTERDAM_AIRPORT, WORLD_FORUM, MAURITSHUIS)
                    .with_labels("Rotterdam The Hague Airport", "World Forum", "Mauritshuis")
                    .with_dense_urban(hague_centre)
            }
        }
    }
}

impl FromStr for ScenarioKey {
    type Err = CoreError;

    fn from_str(s: &str) -> CoreResult<Self> {
        ScenarioKey::ALL
            .into_iter()
            .find(|k| k.name() == s.trim())
            .ok_or_else(|| CoreError::UnknownScenario(s.to_owned()))
    }
}

impl std::fmt::Display for ScenarioKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}
