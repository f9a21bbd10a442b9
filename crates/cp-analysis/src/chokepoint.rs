//! Chokepoint Extractor.
//!
//! # Qualification
//!
//! A route node is a candidate when it is used by at least two routes, or by
//! one route and it is either a major intersection or touches a bridge or
//! tunnel edge.
//!
//! # Score
//!
//! | Contribution                         | Points                   |
//! |--------------------------------------|--------------------------|
//! | base, `n` routes use the node        | `2 + 2 × (n − 1)`        |
//! | incident bridge / tunnel edge        | `structural_bonus` (2)   |
//! | degree above the intersection limit  | `intersection_bonus` (1) |
//! | inside a dense-urban region          | `dense_urban_bonus` (1)  |
//!
//! The sum is clamped to `[1, 10]`.
//!
//! # Merging
//!
//! Candidates are visited by descending score, then ascending `NodeId`.  Each
//! unassigned candidate becomes a representative and absorbs every other
//! unassigned candidate within `merge_radius_m`, found through a
//! [`ProximityIndex`].  The merged chokepoint keeps the representative's
//! node and location, the highest member score, and the union of member
//! routes and factors.  Ids are assigned from 1 in visiting order.

use std::collections::BTreeMap;
#[cfg(not(feature = "fx-hash"))]
use std::collections::HashMap;

use cp_core::{ChokepointId, ChokepointRules, GeoPoint, NodeId, Objective, Scenario};
use cp_spatial::{ProximityIndex, RoadNetwork};

use crate::planner::RouteMap;

#[cfg(feature = "fx-hash")]
type UsageMap = rustc_hash::FxHashMap<NodeId, RouteSet>;
#[cfg(not(feature = "fx-hash"))]
type UsageMap = HashMap<NodeId, RouteSet>;

// ── RouteSet ──────────────────────────────────────────────────────────────────

/// Small set of objectives, stored as a bitmask.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RouteSet(u8);

impl RouteSet {
    pub fn insert(&mut self, objective: Objective) {
        self.0 |= 1 << objective.ordinal();
    }

    pub fn contains(self, objective: Objective) -> bool {
        self.0 & (1 << objective.ordinal()) != 0
    }

    pub fn union(self, other: RouteSet) -> RouteSet {
        RouteSet(self.0 | other.0)
    }

    pub fn len(self) -> usize {
        self.0.count_ones() as usize
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Members in canonical objective order.
    pub fn iter(self) -> impl Iterator<Item = Objective> {
        Objective::ALL.into_iter().filter(move |o| self.contains(*o))
    }
}

impl FromIterator<Objective> for RouteSet {
    fn from_iter<I: IntoIterator<Item = Objective>>(iter: I) -> Self {
        let mut set = RouteSet::default();
        for o in iter {
            set.insert(o);
        }
        set
    }
}

// ── ScoreFactor ───────────────────────────────────────────────────────────────

/// A reason a chokepoint scored what it did.  Variant order is the order
/// factors appear in descriptions.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum ScoreFactor {
    SharedByAllRoutes,
    SharedByMultipleRoutes,
    BridgeOrTunnel,
    MajorIntersection,
    DenseUrbanArea,
}

impl ScoreFactor {
    pub fn as_str(self) -> &'static str {
        match self {
            ScoreFactor::SharedByAllRoutes      => "shared_by_all_routes",
            ScoreFactor::SharedByMultipleRoutes => "shared_by_multiple_routes",
            ScoreFactor::BridgeOrTunnel         => "bridge_or_tunnel",
            ScoreFactor::MajorIntersection      => "major_intersection",
            ScoreFactor::DenseUrbanArea         => "dense_urban_area",
        }
    }
}

impl std::fmt::Display for ScoreFactor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ── Chokepoint ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Chokepoint {
    pub id:          ChokepointId,
    /// Representative node; always on at least one route.
    pub node:        NodeId,
    pub location:    GeoPoint,
    /// Vulnerability score in `[1, 10]`.
    pub score:       u8,
    /// Sorted, without duplicates.
    pub factors:     Vec<ScoreFactor>,
    pub description: String,
    pub routes:      RouteSet,
    /// Every candidate node merged into this chokepoint, representative first.
    pub members:     Vec<NodeId>,
    /// Undirected degree of the representative node.
    pub degree:      u16,
}

pub type ChokepointMap = BTreeMap<ChokepointId, Chokepoint>;

/// Chokepoints sorted by descending score, then ascending id.
pub fn ranked(chokepoints: &ChokepointMap) -> Vec<&Chokepoint> {
    let mut v: Vec<&Chokepoint> = chokepoints.values().collect();
    v.sort_by(|a, b| b.score.cmp(&a.score).then(a.id.cmp(&b.id)));
    v
}

// ── Extraction ────────────────────────────────────────────────────────────────

struct Candidate {
    node:     NodeId,
    location: GeoPoint,
    routes:   RouteSet,
    score:    u8,
    factors:  Vec<ScoreFactor>,
}

/// Extract and merge chokepoints from the planned routes.
pub fn extract_chokepoints(
    network:  &RoadNetwork,
    routes:   &RouteMap,
    scenario: &Scenario,
    rules:    &ChokepointRules,
) -> ChokepointMap {
    let total_routes = routes.len();

    let mut usage = UsageMap::default();
    for (objective, route) in routes {
        for &node in &route.nodes {
            usage.entry(node).or_default().insert(*objective);
        }
    }
    let mut used: Vec<(NodeId, RouteSet)> = usage.into_iter().collect();
    used.sort_unstable_by_key(|(n, _)| *n);

    let mut candidates: Vec<Candidate> = used
        .into_iter()
        .filter_map(|(node, set)| candidate(network, scenario, rules, node, set, total_routes))
        .collect();
    candidates.sort_by(|a, b| b.score.cmp(&a.score).then(a.node.cmp(&b.node)));

    let merged = merge(candidates, rules.merge_radius_m);

    let mut out = ChokepointMap::new();
    for (i, group) in merged.into_iter().enumerate() {
        let id = ChokepointId(i as u32 + 1);
        let rep = &group[0];

        let mut routes = RouteSet::default();
        let mut factors: Vec<ScoreFactor> = Vec::new();
        let mut score = 0u8;
        for c in &group {
            routes = routes.union(c.routes);
            factors.extend_from_slice(&c.factors);
            score = score.max(c.score);
        }
        factors.sort_unstable();
        factors.dedup();

        let members: Vec<NodeId> = group.iter().map(|c| c.node).collect();
        let description = describe(routes.len(), total_routes, &factors, members.len(), rules.merge_radius_m);

        if members.len() > 1 {
            tracing::debug!(%id, node = %rep.node, merged = members.len(), "merged chokepoint candidates");
        }

        out.insert(
            id,
            Chokepoint {
                id,
                node: rep.node,
                location: rep.location,
                score,
                factors,
                description,
                routes,
                members,
                degree: network.degree(rep.node),
            },
        );
    }
    out
}

fn candidate(
    network:      &RoadNetwork,
    scenario:     &Scenario,
    rules:        &ChokepointRules,
    node:         NodeId,
    routes:       RouteSet,
    total_routes: usize,
) -> Option<Candidate> {
    let shared = routes.len();
    let structural = network.is_structural(node);
    let major = network.degree(node) > rules.major_intersection_degree;
    if !(shared >= 2 || (shared >= 1 && (major || structural))) {
        return None;
    }

    let location = network.position(node);
    let dense = scenario.is_dense_urban(location);

    let mut factors = Vec::new();
    if shared >= 2 && shared == total_routes {
        factors.push(ScoreFactor::SharedByAllRoutes);
    } else if shared >= 2 {
        factors.push(ScoreFactor::SharedByMultipleRoutes);
    }

    let mut score = 2 + 2 * (shared as u32 - 1);
    if structural {
        score += rules.structural_bonus as u32;
        factors.push(ScoreFactor::BridgeOrTunnel);
    }
    if major {
        score += rules.intersection_bonus as u32;
        factors.push(ScoreFactor::MajorIntersection);
    }
    if dense {
        score += rules.dense_urban_bonus as u32;
        factors.push(ScoreFactor::DenseUrbanArea);
    }

    Some(Candidate {
        node,
        location,
        routes,
        score: score.clamp(1, 10) as u8,
        factors,
    })
}

/// Group pre-sorted candidates into merge clusters, representative first.
fn merge(candidates: Vec<Candidate>, radius_m: f32) -> Vec<Vec<Candidate>> {
    let index = ProximityIndex::new(
        candidates.iter().enumerate().map(|(i, c)| (c.location, i)).collect(),
    );

    let mut group_of: Vec<Option<usize>> = vec![None; candidates.len()];
    let mut groups: Vec<Vec<usize>> = Vec::new();
    for i in 0..candidates.len() {
        if group_of[i].is_some() {
            continue;
        }
        let g = groups.len();
        group_of[i] = Some(g);
        let mut members = vec![i];
        for hit in index.within(candidates[i].location, radius_m) {
            if group_of[hit.item].is_none() {
                group_of[hit.item] = Some(g);
                members.push(hit.item);
            }
        }
        groups.push(members);
    }

    let mut slots: Vec<Option<Candidate>> = candidates.into_iter().map(Some).collect();
    groups
        .into_iter()
        .map(|members| members.into_iter().filter_map(|i| slots[i].take()).collect())
        .collect()
}

fn describe(shared: usize, total: usize, factors: &[ScoreFactor], members: usize, radius_m: f32) -> String {
    let mut text = format!("Node used by {shared} of {total} routes.");
    if !factors.is_empty() {
        let names: Vec<&str> = factors.iter().map(|f| f.as_str()).collect();
        text.push_str(&format!(" Factors: {}.", names.join(", ")));
    }
    if members > 1 {
        text.push_str(&format!(" Merged cluster of {members} nearby candidates within {radius_m} m."));
    }
    text
}
