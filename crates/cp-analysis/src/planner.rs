//! Route Planner: three objective routes through origin → via → destination.
//!
//! Each route is two independent searches under the same cost model,
//! stitched at the via node.  Nothing is re-optimised across the join, and
//! loop erasure inside each leg never reaches across it, so the via node is
//! always on the route.

use std::collections::BTreeMap;

use cp_core::{EdgeId, GeoPoint, NodeId, Objective, RoutingWeights, Waypoint};
use cp_spatial::router::{path_length_m, turn_count};
use cp_spatial::{ObjectiveCost, Path, RoadNetwork, Router, SpatialError};

use crate::{AnalysisError, AnalysisResult};

// ── Route ─────────────────────────────────────────────────────────────────────

/// One planned route.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Route {
    pub objective:  Objective,
    /// Node sequence, origin first and destination last.
    pub nodes:      Vec<NodeId>,
    /// `edges[i]` connects `nodes[i]` to `nodes[i + 1]`.
    pub edges:      Vec<EdgeId>,
    /// Coordinates of `nodes`, in the same order.
    pub path:       Vec<GeoPoint>,
    pub length_m:   f32,
    pub turn_count: u32,
}

impl Route {
    pub fn id(&self) -> &'static str {
        self.objective.route_id()
    }

    pub fn label(&self) -> &'static str {
        self.objective.label()
    }

    /// Index of the first occurrence of `node`, if the route visits it.
    pub fn position_of(&self, node: NodeId) -> Option<usize> {
        self.nodes.iter().position(|&n| n == node)
    }

    pub fn contains(&self, node: NodeId) -> bool {
        self.nodes.contains(&node)
    }
}

/// Routes keyed by objective, iterated in canonical order.
pub type RouteMap = BTreeMap<Objective, Route>;

// ── Waypoints ─────────────────────────────────────────────────────────────────

/// Scenario waypoints after snapping to road nodes.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SnappedWaypoints {
    pub origin:      NodeId,
    pub via:         NodeId,
    pub destination: NodeId,
}

impl SnappedWaypoints {
    pub fn node(&self, which: Waypoint) -> NodeId {
        match which {
            Waypoint::Origin      => self.origin,
            Waypoint::Via         => self.via,
            Waypoint::Destination => self.destination,
        }
    }

    /// The two legs in travel order.
    pub fn legs(&self) -> [(Waypoint, Waypoint); 2] {
        [(Waypoint::Origin, Waypoint::Via), (Waypoint::Via, Waypoint::Destination)]
    }
}

// ── RoutePlanner ──────────────────────────────────────────────────────────────

/// Plans the three objective routes over a shared, read-only network.
///
/// # Example
///
/// ```rust,ignore
/// let planner = RoutePlanner::new(&network, DijkstraRouter, &config.routing);
/// let routes = planner.plan(&waypoints)?;
/// assert_eq!(routes.len(), 3);
/// ```
pub struct RoutePlanner<'a, R: Router> {
    network: &'a RoadNetwork,
    router:  R,
    weights: &'a RoutingWeights,
}

impl<'a, R: Router> RoutePlanner<'a, R> {
    pub fn new(network: &'a RoadNetwork, router: R, weights: &'a RoutingWeights) -> Self {
        Self { network, router, weights }
    }

    /// Plan all three objectives.
    ///
    /// Either every route is returned or none is: the first failure in
    /// objective order is reported.
    pub fn plan(&self, waypoints: &SnappedWaypoints) -> AnalysisResult<RouteMap> {
        #[cfg(not(feature = "parallel"))]
        let results: Vec<AnalysisResult<Route>> = Objective::ALL
            .iter()
            .map(|&objective| self.plan_route(objective, waypoints))
            .collect();

        #[cfg(feature = "parallel")]
        let results: Vec<AnalysisResult<Route>> = {
            use rayon::prelude::*;

            Objective::ALL
                .par_iter()
                .map(|&objective| self.plan_route(objective, waypoints))
                .collect()
        };

        let mut routes = RouteMap::new();
        for result in results {
            let route = result?;
            routes.insert(route.objective, route);
        }
        Ok(routes)
    }

    /// Plan a single objective route through all three waypoints.
    pub fn plan_route(&self, objective: Objective, waypoints: &SnappedWaypoints) -> AnalysisResult<Route> {
        let cost = ObjectiveCost::new(objective, self.weights);

        let mut nodes: Vec<NodeId> = vec![waypoints.origin];
        let mut edges: Vec<EdgeId> = Vec::new();
        for (from, to) in waypoints.legs() {
            let leg = self.leg(&cost, waypoints, from, to)?;
            nodes.extend_from_slice(&leg.nodes[1..]);
            edges.extend_from_slice(&leg.edges);
        }

        let route = Route {
            objective,
            path: nodes.iter().map(|&n| self.network.position(n)).collect(),
            length_m: path_length_m(self.network, &edges),
            turn_count: turn_count(self.network, &edges, self.weights.turn_threshold_deg),
            nodes,
            edges,
        };
        tracing::debug!(
            objective = %objective,
            nodes = route.nodes.len(),
            length_m = route.length_m,
            turns = route.turn_count,
            "route planned"
        );
        Ok(route)
    }

    fn leg(
        &self,
        cost: &ObjectiveCost<'_>,
        waypoints: &SnappedWaypoints,
        from: Waypoint,
        to: Waypoint,
    ) -> AnalysisResult<Path> {
        let (a, b) = (waypoints.node(from), waypoints.node(to));
        self.router.route(self.network, a, b, cost).map_err(|e| match e {
            SpatialError::NoRoute { .. } => AnalysisError::PathNotFound {
                from,
                to,
                from_node: a,
                to_node: b,
            },
            other => AnalysisError::Spatial(other),
        })
    }
}
