//! OSM PBF loader, enabled with the `osm` Cargo feature.
//!
//! # Usage
//!
//! ```ignore
//! use std::path::Path;
//! use cp_core::ScenarioKey;
//! use cp_spatial::osm::load_from_pbf;
//!
//! let scenario = ScenarioKey::Schiphol.scenario();
//! let network = load_from_pbf(Path::new("zuid-holland.osm.pbf"), Some(scenario.region))?;
//! ```
//!
//! # What is loaded
//!
//! Only `highway=*` ways a motorcade can use are included (see
//! [`RoadClass::from_osm`]).  Each way contributes its road class plus the
//! tunnel, bridge and narrow tags; one-way roads add a single directed edge.
//! Nodes tagged as towers, masts or other tall structures become vantage
//! points.
//!
//! When a region is given, nodes outside it are dropped and ways are cut
//! where they leave it.
//!
//! # Memory note
//!
//! The loader buffers all OSM nodes in a `HashMap<i64, GeoPoint>` for the
//! first pass (needed because ways reference node IDs by OSM integer ID).
//! The map is freed before the R-tree is built.

use std::collections::{HashMap, HashSet};
use std::path::Path;

use osmpbf::{Element, ElementReader};

use cp_core::{GeoBounds, GeoPoint, NodeId, RoadClass};

use crate::network::{RoadAttrs, RoadNetwork, RoadNetworkBuilder};
use crate::SpatialError;

// ── Public entry point ────────────────────────────────────────────────────────

/// Load a road network from an OSM PBF file, optionally clipped to `region`.
///
/// # Errors
///
/// Returns [`SpatialError::Osm`] on parse errors,
/// [`SpatialError::Io`] on file errors.
pub fn load_from_pbf(path: &Path, region: Option<GeoBounds>) -> Result<RoadNetwork, SpatialError> {
    load_from_pbf_with(path, region, &[])
}

/// [`load_from_pbf`] that also tags edges inside `dense_urban` regions.
pub fn load_from_pbf_with(
    path: &Path,
    region: Option<GeoBounds>,
    dense_urban: &[GeoBounds],
) -> Result<RoadNetwork, SpatialError> {
    let inside = |p: GeoPoint| region.is_none_or(|r| r.contains(p));

    // ── Phase 1: collect nodes, vantage features and road ways ────────────
    let reader = ElementReader::from_path(path).map_err(|e| SpatialError::Osm(e.to_string()))?;

    let mut all_nodes: HashMap<i64, GeoPoint> = HashMap::new();
    let mut vantage: Vec<GeoPoint> = Vec::new();
    let mut road_ways: Vec<OsmWay> = Vec::new();

    reader
        .for_each(|elem| match elem {
            Element::Node(n) => {
                let pos = GeoPoint::new(n.lat() as f32, n.lon() as f32);
                if inside(pos) {
                    all_nodes.insert(n.id(), pos);
                    if is_vantage(n.tags()) {
                        vantage.push(pos);
                    }
                }
            }
            Element::DenseNode(n) => {
                let pos = GeoPoint::new(n.lat() as f32, n.lon() as f32);
                if inside(pos) {
                    all_nodes.insert(n.id(), pos);
                    if is_vantage(n.tags()) {
                        vantage.push(pos);
                    }
                }
            }
            Element::Way(w) => {
                // Collect tags eagerly so &str lifetimes don't escape the closure.
                let tags: Vec<(&str, &str)> = w.tags().collect();
                let class = tag(&tags, "highway").and_then(RoadClass::from_osm);
                if let Some(class) = class {
                    road_ways.push(OsmWay {
                        refs:   w.refs().collect(),
                        attrs:  way_attrs(class, &tags),
                        oneway: is_oneway(class, &tags),
                    });
                }
            }
            _ => {}
        })
        .map_err(|e| SpatialError::Osm(e.to_string()))?;

    // ── Phase 2: identify road-referenced node IDs ────────────────────────
    let road_node_ids: HashSet<i64> = road_ways
        .iter()
        .flat_map(|w| w.refs.iter().copied())
        .filter(|id| all_nodes.contains_key(id))
        .collect();

    // ── Phase 3: build network ────────────────────────────────────────────
    let mut builder = RoadNetworkBuilder::with_capacity(
        road_node_ids.len(),
        road_node_ids.len() * 2,
    );

    // Sorted so NodeIds are identical across loads of the same file.
    let mut sorted_ids: Vec<i64> = road_node_ids.into_iter().collect();
    sorted_ids.sort_unstable();

    let mut osm_to_cp: HashMap<i64, NodeId> = HashMap::with_capacity(sorted_ids.len());
    for osm_id in &sorted_ids {
        if let Some(&pos) = all_nodes.get(osm_id) {
            osm_to_cp.insert(*osm_id, builder.add_node(pos));
        }
    }
    drop(all_nodes);

    for p in vantage {
        builder.add_vantage_point(p);
    }
    builder.dense_urban_regions(dense_urban);

    // Consecutive way nodes that both survived clipping become edges.
    for way in &road_ways {
        for window in way.refs.windows(2) {
            if let (Some(&from), Some(&to)) = (osm_to_cp.get(&window[0]), osm_to_cp.get(&window[1])) {
                let attrs = RoadAttrs { length_m: builder.distance_m(from, to), ..way.attrs };
                if way.oneway {
                    builder.add_directed_edge(from, to, attrs);
                } else {
                    builder.add_road(from, to, attrs);
                }
            }
        }
    }

    tracing::debug!(
        nodes = builder.node_count(),
        edges = builder.edge_count(),
        ways = road_ways.len(),
        "loaded OSM network"
    );
    Ok(builder.build())
}

// ── Internal types ────────────────────────────────────────────────────────────

struct OsmWay {
    refs:   Vec<i64>,
    attrs:  RoadAttrs,
    oneway: bool,
}

// ── Tag helpers ───────────────────────────────────────────────────────────────

pub(crate) fn tag<'a>(tags: &[(&'a str, &'a str)], key: &str) -> Option<&'a str> {
    tags.iter().find(|(k, _)| *k == key).map(|(_, v)| *v)
}

/// Road class plus structural and width tags.  Length is filled per edge.
pub(crate) fn way_attrs(class: RoadClass, tags: &[(&str, &str)]) -> RoadAttrs {
    let mut attrs = RoadAttrs::new(0.0, class);
    if tag(tags, "tunnel").is_some_and(|v| v != "no") {
        attrs = attrs.tunnel();
    }
    if tag(tags, "bridge").is_some_and(|v| v != "no") {
        attrs = attrs.bridge();
    }
    let single_lane = tag(tags, "lanes").is_some_and(|v| v.trim() == "1");
    let slim = tag(tags, "width")
        .and_then(|v| v.trim_end_matches('m').trim().parse::<f32>().ok())
        .is_some_and(|w| w < 5.0);
    if single_lane || slim {
        attrs = attrs.narrow();
    }
    attrs
}

/// Determine whether a way should be treated as one-way.
///
/// Motorways are implicitly one-way in OSM convention.
pub(crate) fn is_oneway(class: RoadClass, tags: &[(&str, &str)]) -> bool {
    let explicit = tag(tags, "oneway").is_some_and(|v| matches!(v, "yes" | "1" | "true"));
    explicit || class == RoadClass::Motorway
}

/// Towers, masts and similar tall structures give elevated sight lines.
pub(crate) fn is_vantage<'a>(tags: impl Iterator<Item = (&'a str, &'a str)>) -> bool {
    let mut hit = false;
    for (k, v) in tags {
        hit |= match k {
            "man_made" => matches!(v, "tower" | "water_tower" | "mast" | "chimney"),
            "building" => matches!(v, "tower" | "church" | "cathedral"),
            "tower:type" => true,
            _ => false,
        };
    }
    hit
}
