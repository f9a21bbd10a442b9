//! Unit tests for cp-analysis.
//!
//! Networks are hand-built around 52°N so that distances and bearings are
//! realistic; no OSM file is needed.

#[cfg(test)]
mod helpers {
    use cp_core::{GeoPoint, NodeId, RoadClass, Scenario};
    use cp_spatial::{RoadAttrs, RoadNetwork, RoadNetworkBuilder};

    /// Six nodes, two parallel paths either side of a shared middle node.
    ///
    /// ```text
    ///        a           c
    ///      /   \       /   \
    ///     o     m ─────────  z
    ///      \   /
    ///        b
    /// ```
    ///
    /// Origin `o`, via `m`, destination `z`.
    pub fn toy() -> (RoadNetwork, Scenario, [NodeId; 6]) {
        let mut b = RoadNetworkBuilder::new();
        let o = b.add_node(GeoPoint::new(52.000, 4.300));
        let a = b.add_node(GeoPoint::new(52.001, 4.302));
        let lo = b.add_node(GeoPoint::new(51.999, 4.302));
        let m = b.add_node(GeoPoint::new(52.000, 4.304));
        let c = b.add_node(GeoPoint::new(52.001, 4.306));
        let z = b.add_node(GeoPoint::new(52.000, 4.308));
        for (x, y) in [(o, a), (a, m), (o, lo), (lo, m), (m, c), (c, z), (m, z)] {
            b.add_measured_road(x, y, RoadClass::Secondary);
        }
        let scenario = scenario("toy", b.node_pos(o), b.node_pos(m), b.node_pos(z));
        (b.build(), scenario, [o, a, lo, m, c, z])
    }

    /// A straight residential street of five nodes about 205 m apart; the
    /// middle one is the via point.
    pub fn street() -> (RoadNetwork, Scenario, Vec<NodeId>) {
        let mut b = RoadNetworkBuilder::new();
        let nodes: Vec<NodeId> = (0..5)
            .map(|i| b.add_node(GeoPoint::new(52.000, 4.300 + 0.003 * i as f32)))
            .collect();
        for w in nodes.windows(2) {
            b.add_measured_road(w[0], w[1], RoadClass::Residential);
        }
        let scenario = scenario("street", b.node_pos(nodes[0]), b.node_pos(nodes[2]), b.node_pos(nodes[4]));
        (b.build(), scenario, nodes)
    }

    /// `o ─ v` then either a straight all-tunnel pair `v ─ t ─ z` or a
    /// longer open-air detour `v ─ d1 ─ d2 ─ z`.
    pub fn tunnel() -> (RoadNetwork, Scenario) {
        let mut b = RoadNetworkBuilder::new();
        let o = b.add_node(GeoPoint::new(52.000, 4.296));
        let v = b.add_node(GeoPoint::new(52.000, 4.300));
        let t = b.add_node(GeoPoint::new(52.000, 4.302));
        let z = b.add_node(GeoPoint::new(52.000, 4.304));
        let d1 = b.add_node(GeoPoint::new(52.002, 4.301));
        let d2 = b.add_node(GeoPoint::new(52.002, 4.303));
        b.add_measured_road(o, v, RoadClass::Primary);
        for (x, y) in [(v, t), (t, z)] {
            let len = b.distance_m(x, y);
            b.add_road(x, y, RoadAttrs::new(len, RoadClass::Primary).tunnel());
        }
        for (x, y) in [(v, d1), (d1, d2), (d2, z)] {
            b.add_measured_road(x, y, RoadClass::Primary);
        }
        let scenario = scenario("tunnel", b.node_pos(o), b.node_pos(v), b.node_pos(z));
        (b.build(), scenario)
    }

    /// Straight east-west primary road `o ─ v ─ z` with a tall building
    /// 80 m north of `v` and another 80 m east of it, along the road.
    pub fn straight() -> (RoadNetwork, Scenario, [NodeId; 3], GeoPoint) {
        let mut b = RoadNetworkBuilder::new();
        let o = b.add_node(GeoPoint::new(52.0, 4.300));
        let v = b.add_node(GeoPoint::new(52.0, 4.304));
        let z = b.add_node(GeoPoint::new(52.0, 4.308));
        let north = b.node_pos(v).destination(0.0, 80.0);
        let east = b.node_pos(v).destination(90.0, 80.0);
        b.add_vantage_point(east);
        b.add_vantage_point(north);
        b.add_measured_road(o, v, RoadClass::Primary);
        b.add_measured_road(v, z, RoadClass::Primary);
        let scenario = scenario("straight", b.node_pos(o), b.node_pos(v), b.node_pos(z));
        (b.build(), scenario, [o, v, z], north)
    }

    pub fn scenario(name: &str, o: GeoPoint, v: GeoPoint, d: GeoPoint) -> Scenario {
        Scenario::new(name, o, v, d)
    }
}

// ── Route planner ─────────────────────────────────────────────────────────────

#[cfg(test)]
mod planner {
    use std::collections::HashSet;

    use cp_core::{AnalysisConfig, Objective, Waypoint};
    use cp_spatial::{DijkstraRouter, RoadNetworkBuilder};

    use crate::{analyze, snap_waypoints, AnalysisError, RoutePlanner};

    #[test]
    fn three_simple_routes_through_via() {
        let (net, scenario, [o, _, _, m, _, z]) = super::helpers::toy();
        let config = AnalysisConfig::default();
        let wps = snap_waypoints(&net, &scenario).unwrap();
        assert_eq!((wps.origin, wps.via, wps.destination), (o, m, z));

        let routes = RoutePlanner::new(&net, DijkstraRouter, &config.routing).plan(&wps).unwrap();
        assert_eq!(routes.len(), 3);
        for (objective, route) in &routes {
            assert_eq!(route.objective, *objective);
            assert_eq!(route.nodes.first(), Some(&o));
            assert_eq!(route.nodes.last(), Some(&z));
            assert!(route.contains(m));

            let unique: HashSet<_> = route.nodes.iter().collect();
            assert_eq!(unique.len(), route.nodes.len(), "{} repeats a node", route.id());

            assert_eq!(route.edges.len() + 1, route.nodes.len());
            assert_eq!(route.path.len(), route.nodes.len());
            for (i, e) in route.edges.iter().enumerate() {
                assert_eq!(net.edge_from[e.index()], route.nodes[i]);
                assert_eq!(net.edge_to[e.index()], route.nodes[i + 1]);
            }
            let sum: f32 = route.edges.iter().map(|e| net.edge_length_m[e.index()]).sum();
            assert_eq!(route.length_m, sum);
        }
        assert_eq!(routes[&Objective::Logical].label(), "Most logical route");
    }

    #[test]
    fn shortest_takes_direct_second_leg() {
        let (net, scenario, [_, _, _, m, c, z]) = super::helpers::toy();
        let report = analyze(&net, &scenario, &AnalysisConfig::default()).unwrap();
        let shortest = &report.routes[&Objective::Shortest];
        assert!(!shortest.contains(c));
        assert_eq!(&shortest.nodes[shortest.nodes.len() - 2..], &[m, z]);
    }

    #[test]
    fn via_on_spur_revisits_junction() {
        // o ─ j ─ z with the via at the end of a dead-end spur off j.
        let mut b = RoadNetworkBuilder::new();
        let o = b.add_node(cp_core::GeoPoint::new(52.000, 4.300));
        let j = b.add_node(cp_core::GeoPoint::new(52.000, 4.304));
        let z = b.add_node(cp_core::GeoPoint::new(52.000, 4.308));
        let v = b.add_node(cp_core::GeoPoint::new(52.003, 4.304));
        for (x, y) in [(o, j), (j, z), (j, v)] {
            b.add_measured_road(x, y, cp_core::RoadClass::Primary);
        }
        let scenario = super::helpers::scenario("spur", b.node_pos(o), b.node_pos(v), b.node_pos(z));
        let net = b.build();

        let report = analyze(&net, &scenario, &AnalysisConfig::default()).unwrap();
        for route in report.routes.values() {
            // Loops are only erased within a leg, so the junction appears twice.
            assert_eq!(route.nodes, vec![o, j, v, j, z]);
            assert_eq!(route.edges.len(), 4);
            assert_eq!(route.position_of(j), Some(1));
        }
    }

    #[test]
    fn disconnected_via_destination_is_path_not_found() {
        let mut b = RoadNetworkBuilder::new();
        let o = b.add_node(cp_core::GeoPoint::new(52.000, 4.300));
        let v = b.add_node(cp_core::GeoPoint::new(52.000, 4.304));
        let z = b.add_node(cp_core::GeoPoint::new(52.000, 4.310));
        let w = b.add_node(cp_core::GeoPoint::new(52.002, 4.310));
        b.add_measured_road(o, v, cp_core::RoadClass::Primary);
        b.add_measured_road(z, w, cp_core::RoadClass::Primary); // island
        let scenario = super::helpers::scenario("split", b.node_pos(o), b.node_pos(v), b.node_pos(z));
        let net = b.build();

        let err = analyze(&net, &scenario, &AnalysisConfig::default()).unwrap_err();
        match err {
            AnalysisError::PathNotFound { from, to, from_node, to_node } => {
                assert_eq!((from, to), (Waypoint::Via, Waypoint::Destination));
                assert_eq!((from_node, to_node), (v, z));
            }
            other => panic!("expected PathNotFound, got {other:?}"),
        }
    }

    #[test]
    fn safest_avoids_all_tunnel_path() {
        let (net, scenario) = super::helpers::tunnel();
        let report = analyze(&net, &scenario, &AnalysisConfig::default()).unwrap();
        let uses_tunnel = |o: Objective| {
            report.routes[&o].edges.iter().any(|e| net.edge_tags[e.index()].is_tunnel)
        };
        assert!(uses_tunnel(Objective::Shortest));
        assert!(!uses_tunnel(Objective::Safest));
        assert!(
            report.routes[&Objective::Safest].length_m > report.routes[&Objective::Shortest].length_m
        );
    }

    #[test]
    fn turn_count_is_post_hoc() {
        let (net, scenario, _) = super::helpers::street();
        let report = analyze(&net, &scenario, &AnalysisConfig::default()).unwrap();
        for route in report.routes.values() {
            assert_eq!(route.turn_count, 0);
        }
        let (net, scenario, _) = super::helpers::toy();
        let report = analyze(&net, &scenario, &AnalysisConfig::default()).unwrap();
        // o → a/b → m bends by ~100° at a/b.
        assert!(report.routes[&Objective::Shortest].turn_count >= 1);
    }
}

// ── Waypoint validation ───────────────────────────────────────────────────────

#[cfg(test)]
mod waypoints {
    use cp_core::{AnalysisConfig, CoreError, GeoPoint, Waypoint};
    use cp_spatial::RoadNetwork;

    use crate::{analyze, snap_waypoints, AnalysisError};

    #[test]
    fn identical_coordinates_are_degenerate() {
        let (net, mut scenario, _) = super::helpers::toy();
        scenario.via = scenario.origin;
        let err = analyze(&net, &scenario, &AnalysisConfig::default()).unwrap_err();
        assert!(matches!(
            err,
            AnalysisError::DegenerateGeometry { from: Waypoint::Origin, to: Waypoint::Via, node: None }
        ));
    }

    #[test]
    fn same_snapped_node_is_degenerate() {
        let (net, mut scenario, [_, _, _, m, _, _]) = super::helpers::toy();
        // 10 m from the via: distinct coordinates, same road node.
        scenario.destination = GeoPoint::new(scenario.via.lat + 0.0001, scenario.via.lon);
        let err = snap_waypoints(&net, &scenario).unwrap_err();
        assert!(matches!(
            err,
            AnalysisError::DegenerateGeometry { from: Waypoint::Via, to: Waypoint::Destination, node: Some(n) }
                if n == m
        ));
    }

    #[test]
    fn empty_network_is_graph_unavailable() {
        let (_, scenario, _) = super::helpers::toy();
        let err = analyze(&RoadNetwork::empty(), &scenario, &AnalysisConfig::default()).unwrap_err();
        assert!(matches!(err, AnalysisError::GraphUnavailable { .. }));
    }

    #[test]
    fn invalid_config_rejected() {
        let (net, scenario, _) = super::helpers::toy();
        let mut config = AnalysisConfig::default();
        config.routing.tunnel_risk = -1.0;
        let err = analyze(&net, &scenario, &config).unwrap_err();
        assert!(matches!(err, AnalysisError::Core(CoreError::Config(_))));
    }
}

// ── Chokepoints ───────────────────────────────────────────────────────────────

#[cfg(test)]
mod chokepoints {
    use cp_core::{AnalysisConfig, ChokepointId, ChokepointRules, GeoPoint, Objective, Scenario};
    use cp_spatial::RoadNetworkBuilder;

    use crate::{analyze, extract_chokepoints, Route, RouteMap, RouteSet, ScoreFactor};

    fn bare_route(objective: Objective, nodes: Vec<cp_core::NodeId>) -> Route {
        Route {
            objective,
            nodes,
            edges: vec![],
            path: vec![],
            length_m: 0.0,
            turn_count: 0,
        }
    }

    #[test]
    fn shared_middle_node_scores_high() {
        let (net, scenario, [_, _, _, m, _, _]) = super::helpers::toy();
        let report = analyze(&net, &scenario, &AnalysisConfig::default()).unwrap();
        let cp = report
            .chokepoints
            .values()
            .find(|c| c.members.contains(&m))
            .expect("middle node must be a chokepoint");
        assert_eq!(cp.routes.len(), 3);
        assert!(cp.score >= 6, "score {}", cp.score);
        assert!(cp.factors.contains(&ScoreFactor::SharedByAllRoutes));
        // m has four neighbours.
        assert!(cp.factors.contains(&ScoreFactor::MajorIntersection));
        assert!(cp.description.starts_with("Node used by 3 of 3 routes."));
    }

    #[test]
    fn scores_bounded_and_sound() {
        for (net, scenario) in [
            { let (n, s, _) = super::helpers::toy(); (n, s) },
            { let (n, s, _) = super::helpers::street(); (n, s) },
            super::helpers::tunnel(),
        ] {
            let report = analyze(&net, &scenario, &AnalysisConfig::default()).unwrap();
            assert!(!report.chokepoints.is_empty());
            for cp in report.chokepoints.values() {
                assert!((1..=10).contains(&cp.score));
                assert!(report.routes.values().any(|r| r.contains(cp.node)));
                assert_eq!(cp.location, net.position(cp.node));
                assert!(!cp.routes.is_empty());
            }
        }
    }

    #[test]
    fn nearby_candidates_merge() {
        let mut b = RoadNetworkBuilder::new();
        let n0 = b.add_node(GeoPoint::new(52.0, 4.3));
        let n1 = b.add_node(GeoPoint::new(52.0, 4.3).destination(90.0, 50.0));
        let n2 = b.add_node(GeoPoint::new(52.0, 4.3).destination(90.0, 500.0));
        let net = b.build();

        let mut routes = RouteMap::new();
        routes.insert(Objective::Shortest, bare_route(Objective::Shortest, vec![n0, n1, n2]));
        routes.insert(Objective::Logical, bare_route(Objective::Logical, vec![n0, n1, n2]));
        let scenario = Scenario::new("merge", net.position(n0), net.position(n1), net.position(n2));

        let cps = extract_chokepoints(&net, &routes, &scenario, &ChokepointRules::default());
        assert_eq!(cps.len(), 2);
        let first = &cps[&ChokepointId(1)];
        assert_eq!(first.node, n0);
        assert_eq!(first.members, vec![n0, n1]);
        assert_eq!(first.score, 4);
        assert!(first.description.contains("Merged cluster of 2"));
        assert_eq!(cps[&ChokepointId(2)].members, vec![n2]);
    }

    #[test]
    fn single_route_node_needs_structure_or_degree() {
        let mut b = RoadNetworkBuilder::new();
        let n0 = b.add_node(GeoPoint::new(52.0, 4.300));
        let n1 = b.add_node(GeoPoint::new(52.0, 4.305));
        let n2 = b.add_node(GeoPoint::new(52.0, 4.310));
        let n3 = b.add_node(GeoPoint::new(52.0, 4.315));
        b.add_measured_road(n0, n1, cp_core::RoadClass::Primary);
        let len = b.distance_m(n1, n2);
        b.add_road(n1, n2, cp_spatial::RoadAttrs::new(len, cp_core::RoadClass::Primary).bridge());
        b.add_measured_road(n2, n3, cp_core::RoadClass::Primary);
        let net = b.build();

        let mut routes = RouteMap::new();
        routes.insert(Objective::Safest, bare_route(Objective::Safest, vec![n0, n1, n2, n3]));
        let scenario = Scenario::new("bridge", net.position(n0), net.position(n1), net.position(n3));
        let cps = extract_chokepoints(&net, &routes, &scenario, &ChokepointRules::default());

        let nodes: Vec<_> = cps.values().map(|c| c.node).collect();
        assert_eq!(nodes, vec![n1, n2]);
        for cp in cps.values() {
            assert_eq!(cp.score, 4);
            assert_eq!(cp.factors, vec![ScoreFactor::BridgeOrTunnel]);
        }
    }

    #[test]
    fn score_clamped_to_ten() {
        let (net, scenario, _) = super::helpers::toy();
        let mut config = AnalysisConfig::default();
        config.chokepoints.intersection_bonus = 9;
        let report = analyze(&net, &scenario, &config).unwrap();
        assert!(report.chokepoints.values().any(|c| c.score == 10));
        assert!(report.chokepoints.values().all(|c| c.score <= 10));
    }

    #[test]
    fn dense_urban_bonus() {
        let (net, scenario, [_, _, _, m, _, _]) = super::helpers::toy();
        let around_m = cp_core::GeoBounds::new(
            GeoPoint::new(51.9995, 4.3035),
            GeoPoint::new(52.0005, 4.3045),
        );
        let plain = analyze(&net, &scenario, &AnalysisConfig::default()).unwrap();
        let dense = analyze(&net, &scenario.clone().with_dense_urban(around_m), &AnalysisConfig::default())
            .unwrap();
        let score = |r: &crate::AnalysisReport| r.chokepoints.values().find(|c| c.node == m).unwrap().score;
        assert_eq!(score(&dense), score(&plain) + 1);
    }

    #[test]
    fn route_set_ops() {
        let set: RouteSet = [Objective::Safest, Objective::Shortest].into_iter().collect();
        assert_eq!(set.len(), 2);
        assert!(set.contains(Objective::Safest));
        assert!(!set.contains(Objective::Logical));
        assert_eq!(set.iter().collect::<Vec<_>>(), vec![Objective::Shortest, Objective::Safest]);
    }
}

// ── POIs ──────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod pois {
    use cp_core::{AnalysisConfig, Objective};

    use crate::{analyze, generate_pois, PoiKind, ScoreFactor};

    #[test]
    fn regeneration_is_idempotent() {
        let (net, scenario, _) = super::helpers::toy();
        let config = AnalysisConfig::default();
        let report = analyze(&net, &scenario, &config).unwrap();
        let again = generate_pois(&net, &report.routes, &report.chokepoints, &config);
        assert_eq!(again, report.pois);
        let third = generate_pois(&net, &report.routes, &report.chokepoints, &config);
        assert_eq!(third.len(), report.pois.len());
    }

    #[test]
    fn ambush_on_consecutive_residential_edges() {
        let (net, scenario, nodes) = super::helpers::street();
        let report = analyze(&net, &scenario, &AnalysisConfig::default()).unwrap();
        let ambush: Vec<_> = report.pois.values().filter(|p| p.kind == PoiKind::AmbushLocation).collect();
        assert!(!ambush.is_empty());
        for p in &ambush {
            assert!(nodes.iter().any(|&n| net.position(n) == p.location));
            assert!(p.related_route.is_some());
            assert!(p.related_chokepoint.is_some());
        }
        // One ambush POI per node at most.
        let mut locs: Vec<_> = ambush.iter().map(|p| (p.location.lat.to_bits(), p.location.lon.to_bits())).collect();
        locs.sort_unstable();
        locs.dedup();
        assert_eq!(locs.len(), ambush.len());
    }

    #[test]
    fn no_ambush_on_open_major_road() {
        let (net, scenario, _, _) = super::helpers::straight();
        let report = analyze(&net, &scenario, &AnalysisConfig::default()).unwrap();
        assert!(!report.chokepoints.is_empty());
        assert!(report.pois.values().all(|p| p.kind != PoiKind::AmbushLocation));
    }

    #[test]
    fn surveillance_at_major_intersection() {
        let (net, scenario, [_, _, _, m, _, _]) = super::helpers::toy();
        let report = analyze(&net, &scenario, &AnalysisConfig::default()).unwrap();
        let surv: Vec<_> = report.pois.values().filter(|p| p.kind == PoiKind::SurveillancePoint).collect();
        assert_eq!(surv.len(), 1);
        assert_eq!(surv[0].location, net.position(m));
    }

    #[test]
    fn surveillance_follows_merged_intersection_factor() {
        let (net, scenario, [_, v, _], _) = super::helpers::straight();
        let config = AnalysisConfig::default();
        let report = analyze(&net, &scenario, &config).unwrap();
        assert!(report.pois.values().all(|p| p.kind != PoiKind::SurveillancePoint));

        // As if v had absorbed a busier junction: the factor comes from a
        // member, the representative itself only has two roads.
        let mut chokepoints = report.chokepoints.clone();
        let cp = chokepoints.values_mut().find(|c| c.node == v).unwrap();
        assert_eq!(cp.degree, 2);
        cp.factors.push(ScoreFactor::MajorIntersection);
        let id = cp.id;

        let pois = generate_pois(&net, &report.routes, &chokepoints, &config);
        let surv: Vec<_> = pois.values().filter(|p| p.kind == PoiKind::SurveillancePoint).collect();
        assert_eq!(surv.len(), 1);
        assert_eq!(surv[0].related_chokepoint, Some(id));
        assert_eq!(surv[0].location, net.position(v));
    }

    #[test]
    fn nearby_same_kind_pois_collapse() {
        let (net, scenario, _) = super::helpers::street();
        let mut config = AnalysisConfig::default();
        config.pois.merge_radius_m = 0.0;
        let report = analyze(&net, &scenario, &config).unwrap();
        let loose = &report.pois;

        config.pois.merge_radius_m = 250.0;
        let merged = generate_pois(&net, &report.routes, &report.chokepoints, &config);
        assert!(merged.len() < loose.len());
        let ids: Vec<u32> = merged.keys().map(|id| id.0).collect();
        assert_eq!(ids, (1..=merged.len() as u32).collect::<Vec<_>>());

        let cluster_size = |description: &str| -> usize {
            description
                .split("Represents cluster of ")
                .nth(1)
                .and_then(|rest| rest.split(' ').next())
                .map_or(1, |n| n.parse().unwrap())
        };
        for kind in PoiKind::ALL {
            let before: Vec<_> = loose.values().filter(|p| p.kind == kind).collect();
            let after: Vec<_> = merged.values().filter(|p| p.kind == kind).collect();
            let represented: usize = after.iter().map(|p| cluster_size(&p.description)).sum();
            assert_eq!(represented, before.len(), "{kind}");
            if let Some(first) = before.first() {
                assert_eq!(after[0].location, first.location, "{kind}");
            }
            for (i, a) in after.iter().enumerate() {
                for b in &after[i + 1..] {
                    assert!(a.location.distance_m(b.location) > 250.0, "{kind}");
                }
            }
        }
        assert!(merged.values().any(|p| p.description.contains("Represents cluster of")));
    }

    #[test]
    fn firing_point_fallback_offset() {
        let (net, scenario, [_, _, _, m, _, _]) = super::helpers::toy();
        let config = AnalysisConfig::default();
        let report = analyze(&net, &scenario, &config).unwrap();
        let firing: Vec<_> = report.pois.values().filter(|p| p.kind == PoiKind::EnemyFiringPoint).collect();
        // Only the middle node (3 routes + intersection = 7) reaches the threshold.
        assert_eq!(firing.len(), 1);
        let d = net.position(m).distance_m(firing[0].location);
        assert!((d - config.pois.firing_standoff_m).abs() < 3.0, "distance {d}");
        assert!(firing[0].source_score >= config.pois.firing_score_threshold);
    }

    #[test]
    fn firing_point_prefers_vantage_in_cone() {
        let (net, scenario, [_, v, _], north) = super::helpers::straight();

        let mut config = AnalysisConfig::default();
        config.pois.firing_score_threshold = 6;
        let report = analyze(&net, &scenario, &config).unwrap();
        let at_v = report
            .pois
            .values()
            .find(|p| {
                p.kind == PoiKind::EnemyFiringPoint
                    && report.chokepoints[&p.related_chokepoint.unwrap()].node == v
            })
            .unwrap();
        assert_eq!(at_v.location, north);
        assert!(at_v.description.contains("elevated"));
    }

    #[test]
    fn observation_points_for_top_n() {
        let (net, scenario, _) = super::helpers::street();
        let mut config = AnalysisConfig::default();
        config.pois.observation_top_n = 2;
        let report = analyze(&net, &scenario, &config).unwrap();
        let obs: Vec<_> = report.pois.values().filter(|p| p.kind == PoiKind::EnemyObservationPoint).collect();
        assert_eq!(obs.len(), 2);
        for p in obs {
            let cp = &report.chokepoints[&p.related_chokepoint.unwrap()];
            let d = cp.location.distance_m(p.location);
            assert!(d > config.pois.firing_standoff_m && d <= config.pois.observation_standoff_m + 3.0);
            assert_eq!(p.related_route, None::<Objective>);
        }
    }
}

// ── Teams ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod teams {
    use cp_core::{AnalysisConfig, GeoPoint};

    use crate::chokepoint::ranked;
    use crate::teams::{CS_ROLES, SDT_ROLES};
    use crate::{analyze, place_teams, Assignment, ChokepointMap, PoiMap, TeamKind, TeamMap};

    fn count(teams: &TeamMap, kind: TeamKind) -> usize {
        teams.values().filter(|t| t.kind == kind).count()
    }

    #[test]
    fn always_six_sdt_and_three_cs() {
        for (net, scenario) in [
            { let (n, s, _) = super::helpers::toy(); (n, s) },
            { let (n, s, _) = super::helpers::street(); (n, s) },
            super::helpers::tunnel(),
        ] {
            let report = analyze(&net, &scenario, &AnalysisConfig::default()).unwrap();
            assert_eq!(count(&report.teams, TeamKind::Sdt), 6);
            assert_eq!(count(&report.teams, TeamKind::Cs), 3);
        }
    }

    #[test]
    fn empty_inputs_fall_back_to_general_coverage() {
        let via = GeoPoint::new(52.093, 4.2867);
        let teams = place_teams(&ChokepointMap::new(), &PoiMap::new(), via);
        assert_eq!(teams.len(), 9);
        for t in teams.values() {
            assert_eq!(t.assigned_to, None);
            assert_eq!(t.location, via);
            assert!(t.role.starts_with("General coverage: "));
        }
        assert!(teams["SDT1"].role.ends_with(SDT_ROLES[0]));
        assert!(teams["CS3"].role.ends_with(CS_ROLES[2]));
    }

    #[test]
    fn sdt_follow_chokepoint_ranking() {
        let (net, scenario, _) = super::helpers::street();
        let report = analyze(&net, &scenario, &AnalysisConfig::default()).unwrap();
        let ranked = ranked(&report.chokepoints);
        assert_eq!(ranked.len(), 5);
        for (i, cp) in ranked.iter().enumerate() {
            let team = &report.teams[&format!("SDT{}", i + 1)];
            assert_eq!(team.assigned_to, Some(Assignment::Chokepoint(cp.id)));
            assert_eq!(team.role, SDT_ROLES[i]);
            assert_eq!(team.location, cp.location);
        }
        // Five chokepoints: the sixth team is general coverage at the top one.
        let sdt6 = &report.teams["SDT6"];
        assert_eq!(sdt6.assigned_to, None);
        assert_eq!(sdt6.location, ranked[0].location);
    }

    #[test]
    fn cs_cover_top_overwatch_pois() {
        let (net, scenario, _) = super::helpers::street();
        let report = analyze(&net, &scenario, &AnalysisConfig::default()).unwrap();
        for (i, role) in CS_ROLES.iter().enumerate() {
            let team = &report.teams[&format!("CS{}", i + 1)];
            let Some(Assignment::Poi(id)) = team.assigned_to else {
                panic!("CS{} unassigned", i + 1);
            };
            let poi = &report.pois[&id];
            assert!(poi.kind.is_overwatch());
            assert_eq!(team.location, poi.location);
            assert_eq!(team.role, *role);
        }
    }
}

// ── Determinism & service ─────────────────────────────────────────────────────

#[cfg(test)]
mod service {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use cp_core::{AnalysisConfig, CoreError, Scenario};
    use cp_spatial::{RoadNetwork, SpatialError, SpatialResult};

    use crate::{analyze, AnalysisError, AnalysisService};

    #[test]
    fn pipeline_is_deterministic() {
        let (net, scenario, _) = super::helpers::toy();
        let config = AnalysisConfig::default();
        let a = analyze(&net, &scenario, &config).unwrap();
        let b = analyze(&net, &scenario, &config).unwrap();
        assert_eq!(a, b);
        // A rebuilt, identical network gives the same result too.
        let (net2, _, _) = super::helpers::toy();
        assert_eq!(analyze(&net2, &scenario, &config).unwrap(), a);
    }

    #[test]
    fn service_reuses_network() {
        let calls = AtomicUsize::new(0);
        let service = AnalysisService::new(|_: &Scenario| -> SpatialResult<RoadNetwork> {
            calls.fetch_add(1, Ordering::SeqCst);
            Ok(super::helpers::toy().0)
        });
        let (_, scenario, _) = super::helpers::toy();
        let first = service.run_scenario(&scenario).unwrap();
        let second = service.run_scenario(&scenario).unwrap();
        assert_eq!(first, second);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn fetch_failure_is_graph_unavailable_and_retried() {
        let calls = AtomicUsize::new(0);
        let service = AnalysisService::new(|_: &Scenario| -> SpatialResult<RoadNetwork> {
            if calls.fetch_add(1, Ordering::SeqCst) == 0 {
                Err(SpatialError::Provider("overpass timeout".into()))
            } else {
                Ok(super::helpers::toy().0)
            }
        });
        let (_, scenario, _) = super::helpers::toy();
        match service.run_scenario(&scenario) {
            Err(AnalysisError::GraphUnavailable { scenario: name, .. }) => assert_eq!(name, "toy"),
            other => panic!("expected GraphUnavailable, got {other:?}"),
        }
        assert!(service.run_scenario(&scenario).is_ok());
    }

    #[test]
    fn unknown_scenario_key() {
        let service = AnalysisService::new(|_: &Scenario| -> SpatialResult<RoadNetwork> {
            Ok(RoadNetwork::empty())
        });
        let err = service.run("eindhoven").unwrap_err();
        assert!(matches!(err, AnalysisError::Core(CoreError::UnknownScenario(_))));
    }

    #[test]
    fn registered_scenario_reaches_provider() {
        let service = AnalysisService::new(|s: &Scenario| -> SpatialResult<RoadNetwork> {
            Err(SpatialError::Provider(format!("no data for {}", s.name)))
        });
        let err = service.run("schiphol").unwrap_err();
        assert!(matches!(err, AnalysisError::GraphUnavailable { ref scenario, .. } if scenario == "schiphol"));
    }
}
