//! Team Placement Planner: six security detail teams and three
//! counter-sniper teams per scenario.
//!
//! SDT team `i` covers the `i`-th ranked chokepoint with role template `i`.
//! CS teams cover the three highest-scoring firing / observation POIs.
//! Teams without a target keep their role under a general-coverage
//! assignment and are stationed at the top chokepoint (or the via point).

use std::collections::BTreeMap;

use cp_core::{ChokepointId, GeoPoint, PoiId};

use crate::chokepoint::{ranked, ChokepointMap};
use crate::poi::{PoiMap, PointOfInterest};

pub const SDT_TEAMS: usize = 6;
pub const CS_TEAMS: usize = 3;

/// Advance recon, static protection, rear security, escort, reserve,
/// quick reaction.
pub const SDT_ROLES: [&str; SDT_TEAMS] = [
    "Advance team: reconnaissance and early road closure at the highest-risk chokepoint.",
    "Static protection team securing approaches to a high-risk chokepoint.",
    "Rear security team covering potential follow-up attacks near a critical chokepoint.",
    "Escort team integrated in the motorcade to respond at chokepoints.",
    "Reserve team positioned to reinforce any chokepoint if threatened.",
    "Quick reaction force covering alternative evacuation routes.",
];

pub const CS_ROLES: [&str; CS_TEAMS] = [
    "Counter-sniper overwatch on the single most vulnerable chokepoint.",
    "Counter-sniper team covering the primary conference venue approach.",
    "Counter-sniper team covering the reception venue and surrounding access routes.",
];

#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TeamKind {
    /// Security detail team.
    Sdt,
    /// Counter-sniper team.
    Cs,
}

impl TeamKind {
    pub fn as_str(self) -> &'static str {
        match self {
            TeamKind::Sdt => "SDT",
            TeamKind::Cs  => "CS",
        }
    }
}

impl std::fmt::Display for TeamKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What a team is assigned to cover.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Assignment {
    Chokepoint(ChokepointId),
    Poi(PoiId),
}

impl std::fmt::Display for Assignment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Assignment::Chokepoint(id) => write!(f, "cp_{}", id.0),
            Assignment::Poi(id)        => write!(f, "poi_{}", id.0),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SecurityTeam {
    /// `SDT1`..`SDT6`, `CS1`..`CS3`.
    pub id:          String,
    pub kind:        TeamKind,
    pub location:    GeoPoint,
    /// `None` for general coverage.
    pub assigned_to: Option<Assignment>,
    pub role:        String,
}

pub type TeamMap = BTreeMap<String, SecurityTeam>;

/// Assign the fixed roster.  Never fails: missing targets become
/// general-coverage assignments stationed at `fallback` when there is no
/// chokepoint at all.
pub fn place_teams(chokepoints: &ChokepointMap, pois: &PoiMap, fallback: GeoPoint) -> TeamMap {
    let ranked_cps = ranked(chokepoints);
    let station = ranked_cps.first().map(|c| c.location).unwrap_or(fallback);

    let mut teams = TeamMap::new();

    for (i, role) in SDT_ROLES.iter().enumerate() {
        let (location, assigned_to, role) = match ranked_cps.get(i) {
            Some(cp) => (cp.location, Some(Assignment::Chokepoint(cp.id)), role.to_string()),
            None => (station, None, general(role)),
        };
        insert(&mut teams, TeamKind::Sdt, i, location, assigned_to, role);
    }

    let mut overwatch: Vec<&PointOfInterest> = pois.values().filter(|p| p.kind.is_overwatch()).collect();
    overwatch.sort_by(|a, b| b.source_score.cmp(&a.source_score).then(a.id.cmp(&b.id)));

    for (i, role) in CS_ROLES.iter().enumerate() {
        let (location, assigned_to, role) = match overwatch.get(i) {
            Some(poi) => (poi.location, Some(Assignment::Poi(poi.id)), role.to_string()),
            None => (station, None, general(role)),
        };
        insert(&mut teams, TeamKind::Cs, i, location, assigned_to, role);
    }

    teams
}

fn general(role: &str) -> String {
    format!("General coverage: {role}")
}

fn insert(
    teams:       &mut TeamMap,
    kind:        TeamKind,
    i:           usize,
    location:    GeoPoint,
    assigned_to: Option<Assignment>,
    role:        String,
) {
    let id = format!("{}{}", kind.as_str(), i + 1);
    teams.insert(id.clone(), SecurityTeam { id, kind, location, assigned_to, role });
}
