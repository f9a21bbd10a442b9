//! CSV network loader.
//!
//! # File formats
//!
//! **nodes.csv**
//!
//! ```text
//! id,lat,lon,kind
//! 1,52.0809,4.3146,road
//! 2,52.0815,4.3150,vantage
//! ```
//!
//! `kind` is optional and defaults to `road`.  `vantage` rows are elevated
//! features (towers, rooftops) that are not part of the road graph.
//!
//! **edges.csv**
//!
//! ```text
//! from,to,length_m,highway,tunnel,bridge,residential,dense_urban,narrow,oneway
//! 1,3,120.5,primary,0,1,0,0,0,0
//! 3,4,,residential,,,,,1,
//! ```
//!
//! An empty `length_m` is replaced by the haversine distance between the
//! endpoints.  Flags accept `1`/`0`, `true`/`false`, `yes`/`no`; empty means
//! false.  Residential and narrow tags are also implied by the road class.
//! Ways a motorcade cannot use (`footway`, `steps`, …) are skipped.

use std::collections::HashMap;
use std::io::Read;
use std::path::Path;

use serde::Deserialize;

use cp_core::{GeoPoint, NodeId, RoadClass};

use crate::network::{RoadAttrs, RoadNetwork, RoadNetworkBuilder};
use crate::{SpatialError, SpatialResult};

// ── CSV record types ──────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct NodeRecord {
    id:   u64,
    lat:  f32,
    lon:  f32,
    #[serde(default)]
    kind: String,
}

#[derive(Debug, Deserialize)]
struct EdgeRecord {
    from:        u64,
    to:          u64,
    #[serde(default)]
    length_m:    Option<f32>,
    highway:     String,
    #[serde(default)]
    tunnel:      String,
    #[serde(default)]
    bridge:      String,
    #[serde(default)]
    residential: String,
    #[serde(default)]
    dense_urban: String,
    #[serde(default)]
    narrow:      String,
    #[serde(default)]
    oneway:      String,
}

// ── Public API ────────────────────────────────────────────────────────────────

/// Load a network from a nodes file and an edges file.
pub fn load_network_csv(nodes: &Path, edges: &Path) -> SpatialResult<RoadNetwork> {
    let n = std::fs::File::open(nodes)?;
    let e = std::fs::File::open(edges)?;
    load_network_reader(n, e)
}

/// Like [`load_network_csv`] but accepts any `Read` sources (useful for
/// tests and embedded data).
pub fn load_network_reader<N: Read, E: Read>(nodes: N, edges: E) -> SpatialResult<RoadNetwork> {
    let mut builder = RoadNetworkBuilder::new();
    let mut ids: HashMap<u64, NodeId> = HashMap::new();
    let mut vantage = 0usize;

    let mut rdr = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(nodes);
    for result in rdr.deserialize::<NodeRecord>() {
        let row = result?;
        let pos = GeoPoint::new(row.lat, row.lon);
        if !pos.is_valid() {
            return Err(SpatialError::Parse(format!("node {}: invalid coordinate {pos}", row.id)));
        }
        match row.kind.as_str() {
            "" | "road" => {
                if ids.insert(row.id, builder.add_node(pos)).is_some() {
                    return Err(SpatialError::Parse(format!("duplicate node id {}", row.id)));
                }
            }
            "vantage" => {
                builder.add_vantage_point(pos);
                vantage += 1;
            }
            other => {
                return Err(SpatialError::Parse(format!("node {}: unknown kind {other:?}", row.id)));
            }
        }
    }

    let mut skipped = 0usize;
    let mut rdr = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(edges);
    for result in rdr.deserialize::<EdgeRecord>() {
        let row = result?;
        let Some(class) = RoadClass::from_osm(&row.highway) else {
            skipped += 1;
            continue;
        };
        let from = lookup(&ids, row.from)?;
        let to = lookup(&ids, row.to)?;

        let length_m = match row.length_m {
            Some(l) if l.is_finite() && l >= 0.0 => l,
            Some(l) => {
                return Err(SpatialError::Parse(format!(
                    "edge {}->{}: invalid length {l}",
                    row.from, row.to
                )));
            }
            None => builder.distance_m(from, to),
        };

        let mut attrs = RoadAttrs::new(length_m, class);
        attrs.tags.is_tunnel = parse_flag(&row.tunnel)?;
        attrs.tags.is_bridge = parse_flag(&row.bridge)?;
        attrs.tags.is_residential |= parse_flag(&row.residential)?;
        attrs.tags.is_dense_urban = parse_flag(&row.dense_urban)?;
        attrs.tags.is_narrow |= parse_flag(&row.narrow)?;

        if parse_flag(&row.oneway)? {
            builder.add_directed_edge(from, to, attrs);
        } else {
            builder.add_road(from, to, attrs);
        }
    }

    tracing::debug!(
        nodes = builder.node_count(),
        edges = builder.edge_count(),
        vantage,
        skipped,
        "loaded CSV network"
    );
    Ok(builder.build())
}

fn lookup(ids: &HashMap<u64, NodeId>, raw: u64) -> SpatialResult<NodeId> {
    ids.get(&raw)
        .copied()
        .ok_or_else(|| SpatialError::Parse(format!("edge references unknown node {raw}")))
}

fn parse_flag(s: &str) -> SpatialResult<bool> {
    match s.to_ascii_lowercase().as_str() {
        "" | "0" | "false" | "no" => Ok(false),
        "1" | "true" | "yes" => Ok(true),
        other => Err(SpatialError::Parse(format!("invalid flag value {other:?}"))),
    }
}
