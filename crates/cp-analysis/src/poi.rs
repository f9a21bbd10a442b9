//! POI Generator.
//!
//! Four placement rules, run in a fixed order so ids are reproducible:
//!
//! | Kind                       | Rule                                                        |
//! |----------------------------|-------------------------------------------------------------|
//! | `ambush_location`          | two consecutive slow edges within a window of a chokepoint  |
//! | `enemy_firing_point`       | stand-off in the sight cone of a high-scoring chokepoint    |
//! | `enemy_observation_point`  | longer stand-off from each of the top-N chokepoints         |
//! | `surveillance_point`       | at chokepoints flagged as major intersections               |
//!
//! The sight cone is centred on the perpendicular to the route at the
//! chokepoint, on either side.  Vantage points from the network are
//! preferred; without one, the point is offset deterministically to the
//! right of the route (firing) or to the left (observation).
//!
//! # Clustering
//!
//! Same-kind POIs within `merge_radius_m` of each other collapse into the
//! first one generated, which notes how many locations it stands for.  Ids
//! are assigned from 1 after clustering, in generation order.

use std::collections::{BTreeMap, HashSet};

use cp_core::geo::{bearing_difference, normalize_bearing};
use cp_core::{AnalysisConfig, ChokepointId, EdgeId, GeoPoint, NodeId, Objective, PoiId, PoiRules};
use cp_spatial::{ProximityIndex, RoadNetwork};

use crate::chokepoint::{ranked, Chokepoint, ChokepointMap, ScoreFactor};
use crate::planner::{Route, RouteMap};

// ── PoiKind ───────────────────────────────────────────────────────────────────

#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum PoiKind {
    AmbushLocation,
    EnemyFiringPoint,
    EnemyObservationPoint,
    SurveillancePoint,
}

impl PoiKind {
    pub const ALL: [PoiKind; 4] = [
        PoiKind::AmbushLocation,
        PoiKind::EnemyFiringPoint,
        PoiKind::EnemyObservationPoint,
        PoiKind::SurveillancePoint,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            PoiKind::AmbushLocation        => "ambush_location",
            PoiKind::EnemyFiringPoint      => "enemy_firing_point",
            PoiKind::EnemyObservationPoint => "enemy_observation_point",
            PoiKind::SurveillancePoint     => "surveillance_point",
        }
    }

    /// Firing and observation points are the candidates for counter-sniper
    /// coverage.
    pub fn is_overwatch(self) -> bool {
        matches!(self, PoiKind::EnemyFiringPoint | PoiKind::EnemyObservationPoint)
    }
}

impl std::fmt::Display for PoiKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ── PointOfInterest ───────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PointOfInterest {
    pub id:                 PoiId,
    pub kind:               PoiKind,
    pub location:           GeoPoint,
    pub description:        String,
    pub related_route:      Option<Objective>,
    pub related_chokepoint: Option<ChokepointId>,
    /// Score of the chokepoint this POI was derived from.
    pub source_score:       u8,
}

pub type PoiMap = BTreeMap<PoiId, PointOfInterest>;

// ── Generation ────────────────────────────────────────────────────────────────

/// Derive every POI from the routes and chokepoints.
///
/// A pure function of its inputs: the same chokepoint set always yields the
/// same POI map.
pub fn generate_pois(
    network:     &RoadNetwork,
    routes:      &RouteMap,
    chokepoints: &ChokepointMap,
    config:      &AnalysisConfig,
) -> PoiMap {
    let mut out = PoiGen::default();
    let rules = &config.pois;

    // ── Ambush ────────────────────────────────────────────────────────────
    let mut ambush_nodes: HashSet<NodeId> = HashSet::new();
    for cp in chokepoints.values() {
        for objective in cp.routes.iter() {
            let Some(route) = routes.get(&objective) else { continue };
            let Some(node) = ambush_node(network, route, cp, rules.ambush_window_edges, config.routing.turn_threshold_deg)
            else {
                continue;
            };
            if ambush_nodes.insert(node) {
                out.push(PointOfInterest {
                    id: PoiId::INVALID,
                    kind: PoiKind::AmbushLocation,
                    location: network.position(node),
                    description: format!(
                        "Likely ambush location where the motorcade must slow down on consecutive \
                         constrained segments near chokepoint {}.",
                        cp.id.0
                    ),
                    related_route: Some(objective),
                    related_chokepoint: Some(cp.id),
                    source_score: cp.score,
                });
            }
        }
    }

    // ── Enemy firing points ───────────────────────────────────────────────
    for cp in chokepoints.values().filter(|c| c.score >= rules.firing_score_threshold) {
        let bearing = route_bearing(network, routes, cp);
        let (location, elevated) = standoff(network, cp, bearing, 90.0, 0.0, rules.firing_standoff_m, rules);
        let source = if elevated { "an elevated structure" } else { "cover beside the route" };
        out.push(PointOfInterest {
            id: PoiId::INVALID,
            kind: PoiKind::EnemyFiringPoint,
            location,
            description: format!(
                "Potential firing position from {source} with line-of-sight to chokepoint {} \
                 (score {}).",
                cp.id.0, cp.score
            ),
            related_route: None,
            related_chokepoint: Some(cp.id),
            source_score: cp.score,
        });
    }

    // ── Enemy observation points ──────────────────────────────────────────
    for cp in ranked(chokepoints).into_iter().take(rules.observation_top_n) {
        let bearing = route_bearing(network, routes, cp);
        let (location, elevated) = standoff(
            network,
            cp,
            bearing,
            -90.0,
            rules.firing_standoff_m,
            rules.observation_standoff_m,
            rules,
        );
        let source = if elevated { "an elevated structure" } else { "open ground" };
        out.push(PointOfInterest {
            id: PoiId::INVALID,
            kind: PoiKind::EnemyObservationPoint,
            location,
            description: format!(
                "Dominant observation point from {source} overlooking chokepoint {}, suitable \
                 for pre-attack surveillance.",
                cp.id.0
            ),
            related_route: None,
            related_chokepoint: Some(cp.id),
            source_score: cp.score,
        });
    }

    // ── Surveillance points ───────────────────────────────────────────────
    for cp in chokepoints.values().filter(|c| c.factors.contains(&ScoreFactor::MajorIntersection)) {
        // The busiest member, which need not be the representative.
        let roads = cp.members.iter().map(|&m| network.degree(m)).max().unwrap_or(cp.degree);
        out.push(PointOfInterest {
            id: PoiId::INVALID,
            kind: PoiKind::SurveillancePoint,
            location: cp.location,
            description: format!(
                "Intersection with {} access roads at chokepoint {}, suitable for hostile or \
                 friendly surveillance of the motorcade.",
                roads, cp.id.0
            ),
            related_route: None,
            related_chokepoint: Some(cp.id),
            source_score: cp.score,
        });
    }

    out.finish(rules.merge_radius_m)
}

/// POIs in generation order, numbered once clustering is done.
#[derive(Default)]
struct PoiGen {
    pending: Vec<PointOfInterest>,
}

impl PoiGen {
    fn push(&mut self, poi: PointOfInterest) {
        self.pending.push(poi);
    }

    fn finish(self, radius_m: f32) -> PoiMap {
        let mut map = PoiMap::new();
        let mut next = 1;
        for mut poi in cluster(self.pending, radius_m) {
            poi.id = PoiId(next);
            next += 1;
            map.insert(poi.id, poi);
        }
        map
    }
}

/// Collapse same-kind POIs within `radius_m` onto the earliest of them.
/// Output keeps the order of the surviving representatives.
fn cluster(pois: Vec<PointOfInterest>, radius_m: f32) -> Vec<PointOfInterest> {
    let index = ProximityIndex::new(pois.iter().enumerate().map(|(i, p)| (p.location, i)).collect());

    let mut absorbed = vec![false; pois.len()];
    let mut sizes = vec![1usize; pois.len()];
    for i in 0..pois.len() {
        if absorbed[i] {
            continue;
        }
        for hit in index.within(pois[i].location, radius_m) {
            let j = hit.item;
            if j > i && !absorbed[j] && pois[j].kind == pois[i].kind {
                absorbed[j] = true;
                sizes[i] += 1;
            }
        }
    }

    pois.into_iter()
        .zip(absorbed.into_iter().zip(sizes))
        .filter(|(_, (gone, _))| !gone)
        .map(|(mut poi, (_, size))| {
            if size > 1 {
                poi.description.push_str(&format!(" Represents cluster of {size} nearby locations."));
            }
            poi
        })
        .collect()
}

// ── Ambush helpers ────────────────────────────────────────────────────────────

/// Shared node of the consecutive slow-edge pair closest to the chokepoint
/// on `route`, searching `window` edges either side.
fn ambush_node(
    network:       &RoadNetwork,
    route:         &Route,
    cp:            &Chokepoint,
    window:        usize,
    turn_threshold: f32,
) -> Option<NodeId> {
    let pos = cp.members.iter().filter_map(|&m| route.position_of(m)).min()?;
    let edges = &route.edges;
    if edges.len() < 2 {
        return None;
    }
    let lo = pos.saturating_sub(window);
    let hi = (pos + window).min(edges.len());

    (lo..hi.saturating_sub(1))
        .filter(|&k| {
            is_slow(network, edges, k, turn_threshold) && is_slow(network, edges, k + 1, turn_threshold)
        })
        .min_by_key(|&k| (k + 1).abs_diff(pos))
        .map(|k| route.nodes[k + 1])
}

/// Residential or narrow by class or tag, or entered through a sharp turn.
fn is_slow(network: &RoadNetwork, edges: &[EdgeId], k: usize, turn_threshold: f32) -> bool {
    let e = edges[k];
    let class = network.edge_class[e.index()];
    let tags = network.edge_tags[e.index()];
    let constrained = class.is_residential() || class.is_narrow() || tags.is_residential || tags.is_narrow;
    let sharp = k > 0 && network.turn_angle_deg(edges[k - 1], e) > turn_threshold;
    constrained || sharp
}

// ── Stand-off helpers ─────────────────────────────────────────────────────────

/// Direction of travel at the chokepoint on the first route through it.
fn route_bearing(network: &RoadNetwork, routes: &RouteMap, cp: &Chokepoint) -> f32 {
    for objective in cp.routes.iter() {
        let Some(route) = routes.get(&objective) else { continue };
        let Some(pos) = route.position_of(cp.node) else { continue };
        if let Some(&e) = route.edges.get(pos) {
            return network.edge_bearing_deg(e);
        }
        if let Some(&e) = pos.checked_sub(1).and_then(|p| route.edges.get(p)) {
            return network.edge_bearing_deg(e);
        }
    }
    0.0
}

/// Place a point in the band `(min_m, max_m]` from the chokepoint inside
/// the sight cone.  Returns the location and whether a vantage point was
/// used.
fn standoff(
    network:       &RoadNetwork,
    cp:            &Chokepoint,
    route_bearing: f32,
    fallback_side: f32,
    min_m:         f32,
    max_m:         f32,
    rules:         &PoiRules,
) -> (GeoPoint, bool) {
    let left = normalize_bearing(route_bearing - 90.0);
    let right = normalize_bearing(route_bearing + 90.0);

    let vantage = network
        .vantage_points_within(cp.location, max_m)
        .into_iter()
        .filter(|&(_, _, d)| d > min_m)
        .find(|&(_, p, _)| {
            let b = cp.location.bearing_deg(p);
            bearing_difference(b, left) <= rules.sight_cone_half_deg
                || bearing_difference(b, right) <= rules.sight_cone_half_deg
        });

    match vantage {
        Some((_, p, _)) => (p, true),
        None => (cp.location.destination(normalize_bearing(route_bearing + fallback_side), max_m), false),
    }
}
