//! Routing trait, objective cost models, and the default edge-based Dijkstra.
//!
//! # Pluggability
//!
//! `cp-analysis` calls routing through the [`Router`] trait and prices edges
//! through the [`EdgeCost`] trait, so applications can swap either half
//! (A*, contraction hierarchies, a different risk model) without touching
//! the planner.
//!
//! # Edge-based search
//!
//! The logical objective charges for the turn *into* an edge, which depends
//! on the edge used to arrive.  The search state is therefore the last edge
//! traversed rather than the last node; a plain node-based Dijkstra would
//! price turns inconsistently.  Immediate U-turns (leaving a node along the
//! reverse of the arriving edge) are never expanded.
//!
//! # Cost units
//!
//! Costs are fixed-point `u64` in thousandths of a weighted metre, so sums
//! are exact and ties are reproducible on every platform.  The secondary
//! `tie` key breaks equal-cost ties before the `EdgeId` does.

use std::cmp::Reverse;
use std::collections::BinaryHeap;
use std::collections::HashMap;

use cp_core::{EdgeId, NodeId, Objective, RoadClass, RoadTags, RoutingWeights};

use crate::network::RoadNetwork;
use crate::SpatialError;

/// Fixed-point scale: cost units per weighted metre.
pub const COST_SCALE: f32 = 1_000.0;

// ── Path ──────────────────────────────────────────────────────────────────────

/// The result of a routing query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Path {
    /// Visited nodes in order, `from` first and `to` last.
    pub nodes: Vec<NodeId>,
    /// Edges to traverse in order; `edges.len() == nodes.len() - 1`.
    pub edges: Vec<EdgeId>,
    /// Search cost of the path in fixed-point units.
    pub cost:  u64,
}

impl Path {
    /// `true` if the source and destination are the same node.
    pub fn is_trivial(&self) -> bool {
        self.edges.is_empty()
    }

    /// Sum of edge lengths in metres.
    pub fn length_m(&self, network: &RoadNetwork) -> f32 {
        path_length_m(network, &self.edges)
    }
}

// ── Edge costs ────────────────────────────────────────────────────────────────

/// Cost of traversing one edge, compared lexicographically.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord)]
pub struct EdgeWeight {
    pub cost: u64,
    pub tie:  u64,
}

/// Prices one edge given the edge used to arrive at its source node.
///
/// `prev` is `None` for the first edge of a leg.  Implementations must
/// return non-negative costs (guaranteed by `u64`) for Dijkstra to be exact.
pub trait EdgeCost: Send + Sync {
    fn weight(&self, network: &RoadNetwork, prev: Option<EdgeId>, edge: EdgeId) -> EdgeWeight;
}

/// The three built-in objectives over a set of [`RoutingWeights`].
pub struct ObjectiveCost<'a> {
    pub objective: Objective,
    pub weights:   &'a RoutingWeights,
}

impl<'a> ObjectiveCost<'a> {
    pub fn new(objective: Objective, weights: &'a RoutingWeights) -> Self {
        Self { objective, weights }
    }
}

impl EdgeCost for ObjectiveCost<'_> {
    fn weight(&self, network: &RoadNetwork, prev: Option<EdgeId>, edge: EdgeId) -> EdgeWeight {
        let i = edge.index();
        let len = network.edge_length_m[i];
        let w = self.weights;

        match self.objective {
            Objective::Shortest => EdgeWeight { cost: to_units(len), tie: 0 },

            Objective::Logical => {
                let class = network.edge_class[i];
                let mut factor = w.class_factor(class);
                if let Some(p) = prev {
                    let gap = class.rank().abs_diff(network.edge_class[p.index()].rank());
                    factor *= 1.0 + w.class_mismatch_penalty * gap as f32;

                    let angle = network.turn_angle_deg(p, edge);
                    if angle > w.turn_threshold_deg {
                        let excess = (angle - w.turn_threshold_deg) / (180.0 - w.turn_threshold_deg);
                        factor *= 1.0 + w.turn_penalty * excess;
                    }
                }
                EdgeWeight { cost: to_units(len * factor), tie: 0 }
            }

            Objective::Safest => {
                let risk = risk_multiplier(network.edge_tags[i], network.edge_class[i], w);
                EdgeWeight { cost: to_units(len * risk), tie: to_units(risk) }
            }
        }
    }
}

/// Product of the safest-objective risk multipliers that apply to an edge.
///
/// An edge is narrow-residential when it is residential (by tag or class)
/// and narrow (by tag or class).
pub fn risk_multiplier(tags: RoadTags, class: RoadClass, w: &RoutingWeights) -> f32 {
    let mut m = 1.0;
    if tags.is_tunnel {
        m *= w.tunnel_risk;
    }
    if tags.is_dense_urban {
        m *= w.dense_urban_risk;
    }
    let effective = RoadTags {
        is_residential: tags.is_residential || class.is_residential(),
        is_narrow: tags.is_narrow || class.is_narrow(),
        ..tags
    };
    if effective.is_narrow_residential() {
        m *= w.narrow_residential_risk;
    }
    if tags.is_bridge {
        m *= w.bridge_risk;
    }
    m
}

#[inline]
fn to_units(weighted_m: f32) -> u64 {
    (weighted_m.max(0.0) * COST_SCALE).round() as u64
}

// ── Router trait ──────────────────────────────────────────────────────────────

/// Pluggable routing engine.
///
/// # Thread safety
///
/// Implementations must be `Send + Sync` so the three objective searches can
/// run on Rayon worker threads.
pub trait Router: Send + Sync {
    /// Compute the cheapest path from `from` to `to` under `cost`.
    ///
    /// `from == to` yields a trivial single-node path rather than an error.
    fn route(
        &self,
        network: &RoadNetwork,
        from: NodeId,
        to: NodeId,
        cost: &dyn EdgeCost,
    ) -> Result<Path, SpatialError>;
}

// ── DijkstraRouter ────────────────────────────────────────────────────────────

/// Edge-based Dijkstra over the CSR road graph, followed by loop erasure.
///
/// Equal costs are broken by [`EdgeWeight::tie`], then by the lower
/// `EdgeId`, so repeated runs over the same network return the same path.
pub struct DijkstraRouter;

impl Router for DijkstraRouter {
    fn route(
        &self,
        network: &RoadNetwork,
        from: NodeId,
        to: NodeId,
        cost: &dyn EdgeCost,
    ) -> Result<Path, SpatialError> {
        for n in [from, to] {
            if n.index() >= network.node_count() {
                return Err(SpatialError::NodeNotFound(n));
            }
        }
        let path = dijkstra(network, from, to, cost)?;
        let (nodes, edges) = erase_loops(&path.nodes, &path.edges);
        Ok(Path { nodes, edges, cost: path.cost })
    }
}

// ── Dijkstra internals ────────────────────────────────────────────────────────

type Key = (u64, u64);

fn dijkstra(
    network: &RoadNetwork,
    from: NodeId,
    to: NodeId,
    cost: &dyn EdgeCost,
) -> Result<Path, SpatialError> {
    if from == to {
        return Ok(Path { nodes: vec![from], edges: vec![], cost: 0 });
    }

    let m = network.edge_count();
    // dist[e] = best known key for arriving through edge e.
    let mut dist      = vec![(u64::MAX, u64::MAX); m];
    // prev_edge[e] = edge used before e; EdgeId::INVALID for first edges.
    let mut prev_edge = vec![EdgeId::INVALID; m];

    // Min-heap on (cost, tie, edge).  EdgeId is the final tie-break.
    let mut heap: BinaryHeap<Reverse<(u64, u64, EdgeId)>> = BinaryHeap::new();

    for edge in network.out_edges(from) {
        let w = cost.weight(network, None, edge);
        let key = (w.cost, w.tie);
        if key < dist[edge.index()] {
            dist[edge.index()] = key;
            heap.push(Reverse((key.0, key.1, edge)));
        }
    }

    while let Some(Reverse((c, t, edge))) = heap.pop() {
        // Skip stale heap entries.
        if (c, t) > dist[edge.index()] {
            continue;
        }

        let node = network.edge_to[edge.index()];
        if node == to {
            return Ok(Path { cost: c, ..reconstruct(network, &prev_edge, from, edge) });
        }

        let back = network.edge_from[edge.index()];
        for next in network.out_edges(node) {
            if network.edge_to[next.index()] == back {
                continue; // no immediate U-turn
            }
            let w = cost.weight(network, Some(edge), next);
            let key: Key = (c.saturating_add(w.cost), t.saturating_add(w.tie));
            if key < dist[next.index()] {
                dist[next.index()] = key;
                prev_edge[next.index()] = edge;
                heap.push(Reverse((key.0, key.1, next)));
            }
        }
    }

    Err(SpatialError::NoRoute { from, to })
}

fn reconstruct(network: &RoadNetwork, prev_edge: &[EdgeId], from: NodeId, last: EdgeId) -> Path {
    let mut edges = Vec::new();
    let mut cur = last;
    while cur != EdgeId::INVALID {
        edges.push(cur);
        cur = prev_edge[cur.index()];
    }
    edges.reverse();

    let mut nodes = Vec::with_capacity(edges.len() + 1);
    nodes.push(from);
    nodes.extend(edges.iter().map(|e| network.edge_to[e.index()]));
    Path { nodes, edges, cost: 0 }
}

// ── Path utilities ────────────────────────────────────────────────────────────

/// Remove cycles from a node/edge sequence: whenever a node reappears, the
/// loop between its two visits is cut out.  The first and last nodes are
/// always kept.
pub fn erase_loops(nodes: &[NodeId], edges: &[EdgeId]) -> (Vec<NodeId>, Vec<EdgeId>) {
    let mut out_nodes: Vec<NodeId> = Vec::with_capacity(nodes.len());
    let mut out_edges: Vec<EdgeId> = Vec::with_capacity(edges.len());
    let mut seen: HashMap<NodeId, usize> = HashMap::with_capacity(nodes.len());

    for (i, &n) in nodes.iter().enumerate() {
        if let Some(&p) = seen.get(&n) {
            for dropped in out_nodes.drain(p + 1..) {
                seen.remove(&dropped);
            }
            out_edges.truncate(p);
            continue;
        }
        if i > 0 {
            out_edges.push(edges[i - 1]);
        }
        seen.insert(n, out_nodes.len());
        out_nodes.push(n);
    }
    (out_nodes, out_edges)
}

/// Sum of edge lengths in metres.
pub fn path_length_m(network: &RoadNetwork, edges: &[EdgeId]) -> f32 {
    edges.iter().map(|e| network.edge_length_m[e.index()]).sum()
}

/// Number of consecutive edge pairs whose direction changes by more than
/// `threshold_deg`.
pub fn turn_count(network: &RoadNetwork, edges: &[EdgeId], threshold_deg: f32) -> u32 {
    edges
        .windows(2)
        .filter(|w| network.turn_angle_deg(w[0], w[1]) > threshold_deg)
        .count() as u32
}
