//! The full analysis pipeline and its output record.

use cp_core::{AnalysisConfig, GeoPoint, Scenario, Waypoint};
use cp_spatial::{DijkstraRouter, RoadNetwork, Router, SpatialError};

use crate::chokepoint::{extract_chokepoints, ChokepointMap};
use crate::planner::{RouteMap, RoutePlanner, SnappedWaypoints};
use crate::poi::{generate_pois, PoiMap};
use crate::teams::{place_teams, TeamMap};
use crate::{AnalysisError, AnalysisResult};

/// Everything one analysis run produces.  This is the whole contract with
/// the export layer.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AnalysisReport {
    pub scenario:    Scenario,
    pub waypoints:   SnappedWaypoints,
    pub routes:      RouteMap,
    pub chokepoints: ChokepointMap,
    pub pois:        PoiMap,
    pub teams:       TeamMap,
}

/// Run the pipeline with the default [`DijkstraRouter`].
pub fn analyze(network: &RoadNetwork, scenario: &Scenario, config: &AnalysisConfig) -> AnalysisResult<AnalysisReport> {
    analyze_with(network, scenario, config, DijkstraRouter)
}

/// Validate, snap, plan, extract, generate, place, strictly in sequence.
///
/// Any failure aborts the run; no partial report is returned.
pub fn analyze_with<R: Router>(
    network:  &RoadNetwork,
    scenario: &Scenario,
    config:   &AnalysisConfig,
    router:   R,
) -> AnalysisResult<AnalysisReport> {
    config.validate()?;
    scenario.validate()?;
    let waypoints = snap_waypoints(network, scenario)?;

    let routes = RoutePlanner::new(network, router, &config.routing).plan(&waypoints)?;
    let chokepoints = extract_chokepoints(network, &routes, scenario, &config.chokepoints);
    let pois = generate_pois(network, &routes, &chokepoints, config);
    let teams = place_teams(&chokepoints, &pois, scenario.via);

    tracing::info!(
        scenario = %scenario.name,
        routes = routes.len(),
        chokepoints = chokepoints.len(),
        pois = pois.len(),
        teams = teams.len(),
        "analysis complete"
    );

    Ok(AnalysisReport {
        scenario: scenario.clone(),
        waypoints,
        routes,
        chokepoints,
        pois,
        teams,
    })
}

/// Snap each waypoint to its nearest road node.
///
/// Consecutive waypoints that land on the same node are rejected, since the
/// leg between them would have fewer than two nodes.
pub fn snap_waypoints(network: &RoadNetwork, scenario: &Scenario) -> AnalysisResult<SnappedWaypoints> {
    let snap = |which: Waypoint| -> AnalysisResult<_> {
        let p: GeoPoint = scenario.waypoint(which);
        network.snap_to_node(p).ok_or_else(|| AnalysisError::GraphUnavailable {
            scenario: scenario.name.clone(),
            source:   SpatialError::Provider("road network has no nodes".into()),
        })
    };
    let waypoints = SnappedWaypoints {
        origin:      snap(Waypoint::Origin)?,
        via:         snap(Waypoint::Via)?,
        destination: snap(Waypoint::Destination)?,
    };

    for (from, to) in waypoints.legs() {
        let node = waypoints.node(from);
        if node == waypoints.node(to) {
            return Err(AnalysisError::DegenerateGeometry { from, to, node: Some(node) });
        }
    }
    tracing::debug!(
        origin = %waypoints.origin,
        via = %waypoints.via,
        destination = %waypoints.destination,
        "waypoints snapped"
    );
    Ok(waypoints)
}
