//! Road network representation and builder.
//!
//! # Data layout
//!
//! The graph uses **Compressed Sparse Row (CSR)** format for outgoing edges.
//! Given a `NodeId n`, its outgoing edges occupy the slice:
//!
//! ```text
//! edge_from[ node_out_start[n] .. node_out_start[n+1] ]
//! ```
//!
//! All edge arrays (`edge_from`, `edge_to`, `edge_length_m`, `edge_class`,
//! `edge_tags`) are sorted by source node and indexed by `EdgeId`.
//! Iteration over a node's outgoing edges is therefore a contiguous memory
//! scan, ideal for Dijkstra's inner loop.
//!
//! Per-node metadata used by chokepoint scoring (`node_degree`,
//! `node_structural`) is derived once in [`RoadNetworkBuilder::build`]; the
//! network is immutable afterwards and safe to share across threads.
//!
//! # Spatial indexes
//!
//! An R-tree (via `rstar`) maps `(lat, lon)` to the nearest `NodeId`, used to
//! snap scenario waypoints to road nodes.  A second, metric index holds
//! vantage points (elevated or rooftop features) for stand-off placement.

use rstar::{PointDistance, RTree, RTreeObject, AABB};

use cp_core::geo::bearing_difference;
use cp_core::{EdgeId, GeoBounds, GeoPoint, NodeId, RoadClass, RoadTags};

use crate::proximity::ProximityIndex;

// ── R-tree node entry ─────────────────────────────────────────────────────────

/// Entry stored in the R-tree spatial index: a 2-D `[lat, lon]` point with
/// the associated `NodeId`.
#[derive(Clone)]
struct NodeEntry {
    point: [f32; 2], // [lat, lon]
    id: NodeId,
}

impl RTreeObject for NodeEntry {
    type Envelope = AABB<[f32; 2]>;
    fn envelope(&self) -> Self::Envelope {
        AABB::from_point(self.point)
    }
}

impl PointDistance for NodeEntry {
    /// Squared Euclidean distance in lat/lon space.  Sufficient for
    /// nearest-node queries within a city (error < 0.1 % at ≤ 60° lat).
    fn distance_2(&self, point: &[f32; 2]) -> f32 {
        let dlat = self.point[0] - point[0];
        let dlon = self.point[1] - point[1];
        dlat * dlat + dlon * dlon
    }
}

// ── RoadAttrs ─────────────────────────────────────────────────────────────────

/// Attributes of one road segment as supplied to the builder.
///
/// ```
/// use cp_core::RoadClass;
/// use cp_spatial::RoadAttrs;
///
/// let a = RoadAttrs::new(250.0, RoadClass::Primary).tunnel();
/// assert!(a.tags.is_tunnel);
/// ```
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct RoadAttrs {
    pub length_m: f32,
    pub class:    RoadClass,
    pub tags:     RoadTags,
}

impl RoadAttrs {
    /// Plain segment.  Residential and narrow tags are preset from the class.
    pub fn new(length_m: f32, class: RoadClass) -> Self {
        let tags = RoadTags {
            is_residential: class.is_residential(),
            is_narrow: class.is_narrow(),
            ..RoadTags::default()
        };
        Self { length_m, class, tags }
    }

    pub fn tunnel(mut self) -> Self {
        self.tags.is_tunnel = true;
        self
    }

    pub fn bridge(mut self) -> Self {
        self.tags.is_bridge = true;
        self
    }

    pub fn residential(mut self) -> Self {
        self.tags.is_residential = true;
        self
    }

    pub fn dense_urban(mut self) -> Self {
        self.tags.is_dense_urban = true;
        self
    }

    pub fn narrow(mut self) -> Self {
        self.tags.is_narrow = true;
        self
    }
}

// ── RoadNetwork ───────────────────────────────────────────────────────────────

/// Directed road graph in CSR format plus spatial indexes.
///
/// All fields are `pub` for direct indexed access on hot paths.  Do not
/// construct directly; use [`RoadNetworkBuilder`].
pub struct RoadNetwork {
    // ── Node data ─────────────────────────────────────────────────────────
    /// Geographic position of each node.  Indexed by `NodeId`.
    pub node_pos: Vec<GeoPoint>,

    /// Number of distinct neighbouring nodes, ignoring edge direction.
    pub node_degree: Vec<u16>,

    /// `true` if any incident edge (either direction) is a bridge or tunnel.
    pub node_structural: Vec<bool>,

    // ── CSR edge adjacency ────────────────────────────────────────────────
    /// CSR row pointer.  Outgoing edges of node `n` are at EdgeIds
    /// `node_out_start[n] .. node_out_start[n+1]`.
    /// Length = `node_count + 1`.
    pub node_out_start: Vec<u32>,

    // ── Edge data (indexed by EdgeId = position in sorted order) ──────────
    /// Source node of each edge.  Redundant with CSR but required for
    /// efficient route reconstruction and bearing computation.
    pub edge_from: Vec<NodeId>,

    /// Destination node of each edge.
    pub edge_to: Vec<NodeId>,

    /// Length of each edge in metres.
    pub edge_length_m: Vec<f32>,

    pub edge_class: Vec<RoadClass>,

    pub edge_tags: Vec<RoadTags>,

    // ── Vantage points ────────────────────────────────────────────────────
    /// Elevated / rooftop features that are not part of the road graph.
    pub vantage_points: Vec<GeoPoint>,

    // ── Spatial indexes ───────────────────────────────────────────────────
    spatial_idx: RTree<NodeEntry>,
    vantage_idx: ProximityIndex<u32>,
}

impl std::fmt::Debug for RoadNetwork {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RoadNetwork")
            .field("nodes", &self.node_count())
            .field("edges", &self.edge_count())
            .field("vantage_points", &self.vantage_points.len())
            .finish_non_exhaustive()
    }
}

impl RoadNetwork {
    /// Construct an empty network with no nodes or edges.
    ///
    /// Any routing request against an empty network returns
    /// [`SpatialError::NoRoute`](crate::SpatialError::NoRoute).
    pub fn empty() -> Self {
        RoadNetworkBuilder::new().build()
    }

    // ── Graph dimensions ──────────────────────────────────────────────────

    pub fn node_count(&self) -> usize {
        self.node_pos.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edge_to.len()
    }

    pub fn is_empty(&self) -> bool {
        self.node_pos.is_empty()
    }

    // ── Graph traversal ───────────────────────────────────────────────────

    /// Iterator over the `EdgeId`s of all outgoing edges from `node`.
    ///
    /// This is a contiguous index range; no heap allocation.
    #[inline]
    pub fn out_edges(&self, node: NodeId) -> impl Iterator<Item = EdgeId> + '_ {
        let start = self.node_out_start[node.index()] as usize;
        let end   = self.node_out_start[node.index() + 1] as usize;
        (start..end).map(|i| EdgeId(i as u32))
    }

    /// Undirected degree: number of distinct neighbouring nodes.
    #[inline]
    pub fn degree(&self, node: NodeId) -> u16 {
        self.node_degree[node.index()]
    }

    #[inline]
    pub fn is_structural(&self, node: NodeId) -> bool {
        self.node_structural[node.index()]
    }

    #[inline]
    pub fn position(&self, node: NodeId) -> GeoPoint {
        self.node_pos[node.index()]
    }

    /// The shortest edge from `from` to `to`, if any.  Parallel edges are
    /// resolved by length, then by `EdgeId`.
    pub fn find_edge(&self, from: NodeId, to: NodeId) -> Option<EdgeId> {
        self.out_edges(from)
            .filter(|e| self.edge_to[e.index()] == to)
            .min_by(|a, b| {
                self.edge_length_m[a.index()]
                    .total_cmp(&self.edge_length_m[b.index()])
                    .then(a.cmp(b))
            })
    }

    // ── Geometry ──────────────────────────────────────────────────────────

    /// Bearing of `edge` from its source to its destination, in degrees.
    #[inline]
    pub fn edge_bearing_deg(&self, edge: EdgeId) -> f32 {
        let from = self.node_pos[self.edge_from[edge.index()].index()];
        let to   = self.node_pos[self.edge_to[edge.index()].index()];
        from.bearing_deg(to)
    }

    /// Direction change, in `[0, 180]` degrees, when leaving `incoming`
    /// through `outgoing` at their shared node.
    #[inline]
    pub fn turn_angle_deg(&self, incoming: EdgeId, outgoing: EdgeId) -> f32 {
        bearing_difference(self.edge_bearing_deg(incoming), self.edge_bearing_deg(outgoing))
    }

    // ── Spatial queries ───────────────────────────────────────────────────

    /// Return the `NodeId` of the nearest road node to `pos`.
    ///
    /// Returns `None` only if the network has no nodes.
    pub fn snap_to_node(&self, pos: GeoPoint) -> Option<NodeId> {
        self.spatial_idx
            .nearest_neighbor(&[pos.lat, pos.lon])
            .map(|e| e.id)
    }

    /// Vantage points within `radius_m` of `pos` as `(index, position,
    /// distance_m)`, sorted by ascending distance then index.
    pub fn vantage_points_within(&self, pos: GeoPoint, radius_m: f32) -> Vec<(u32, GeoPoint, f32)> {
        self.vantage_idx
            .within(pos, radius_m)
            .into_iter()
            .map(|hit| (hit.item, hit.pos, hit.distance_m))
            .collect()
    }
}

// ── RoadNetworkBuilder ────────────────────────────────────────────────────────

/// Construct a [`RoadNetwork`] incrementally, then call [`build`](Self::build).
///
/// The builder accepts nodes and directed edges in any order.  `build()`
/// sorts edges by source node, constructs the CSR arrays, derives node
/// degree and structural flags, and bulk-loads the spatial indexes.
///
/// # Example
///
/// ```
/// use cp_core::{GeoPoint, RoadClass};
/// use cp_spatial::{RoadAttrs, RoadNetworkBuilder};
///
/// let mut b = RoadNetworkBuilder::new();
/// let a = b.add_node(GeoPoint::new(52.080, 4.310));
/// let c = b.add_node(GeoPoint::new(52.085, 4.315));
/// b.add_road(a, c, RoadAttrs::new(650.0, RoadClass::Secondary).bridge());
/// let net = b.build();
/// assert_eq!(net.node_count(), 2);
/// assert_eq!(net.edge_count(), 2); // bidirectional
/// assert!(net.is_structural(a));
/// ```
pub struct RoadNetworkBuilder {
    nodes:       Vec<GeoPoint>,
    raw_edges:   Vec<RawEdge>,
    vantage:     Vec<GeoPoint>,
    dense_urban: Vec<GeoBounds>,
}

struct RawEdge {
    from:  NodeId,
    to:    NodeId,
    attrs: RoadAttrs,
}

impl RoadNetworkBuilder {
    pub fn new() -> Self {
        Self {
            nodes:       Vec::new(),
            raw_edges:   Vec::new(),
            vantage:     Vec::new(),
            dense_urban: Vec::new(),
        }
    }

    /// Pre-allocate for the expected number of nodes and edges to reduce
    /// reallocations when bulk-loading from OSM or CSV.
    pub fn with_capacity(nodes: usize, edges: usize) -> Self {
        Self {
            nodes:       Vec::with_capacity(nodes),
            raw_edges:   Vec::with_capacity(edges),
            vantage:     Vec::new(),
            dense_urban: Vec::new(),
        }
    }

    /// Add a road node and return its `NodeId` (sequential from 0).
    pub fn add_node(&mut self, pos: GeoPoint) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(pos);
        id
    }

    /// Add a **directed** edge from `from` to `to`.
    pub fn add_directed_edge(&mut self, from: NodeId, to: NodeId, attrs: RoadAttrs) {
        self.raw_edges.push(RawEdge { from, to, attrs });
    }

    /// Convenience: add edges in **both directions** for an undirected road
    /// segment (the common case for most OSM road types).
    pub fn add_road(&mut self, a: NodeId, b: NodeId, attrs: RoadAttrs) {
        self.add_directed_edge(a, b, attrs);
        self.add_directed_edge(b, a, attrs);
    }

    /// Add an undirected road whose length is the haversine distance between
    /// its endpoints.
    pub fn add_measured_road(&mut self, a: NodeId, b: NodeId, class: RoadClass) -> RoadAttrs {
        let attrs = RoadAttrs::new(self.distance_m(a, b), class);
        self.add_road(a, b, attrs);
        attrs
    }

    /// Register an elevated or rooftop feature usable as a stand-off vantage
    /// point.  Returns its index in [`RoadNetwork::vantage_points`].
    pub fn add_vantage_point(&mut self, pos: GeoPoint) -> u32 {
        self.vantage.push(pos);
        (self.vantage.len() - 1) as u32
    }

    /// Tag every edge whose midpoint lies in one of `regions` as dense urban
    /// when the network is built.
    pub fn dense_urban_regions(&mut self, regions: &[GeoBounds]) {
        self.dense_urban.extend_from_slice(regions);
    }

    /// Look up the position of a node added earlier (used by the loaders to
    /// compute edge lengths between adjacent way nodes).
    pub fn node_pos(&self, id: NodeId) -> GeoPoint {
        self.nodes[id.index()]
    }

    /// Haversine distance between two nodes added earlier.
    pub fn distance_m(&self, a: NodeId, b: NodeId) -> f32 {
        self.node_pos(a).distance_m(self.node_pos(b))
    }

    pub fn node_count(&self) -> usize { self.nodes.len() }
    pub fn edge_count(&self) -> usize { self.raw_edges.len() }

    /// Consume the builder and produce a [`RoadNetwork`].
    ///
    /// Time complexity: O(E log E) for edge sort + O(N log N) for R-tree bulk
    /// load, where N = nodes, E = edges.
    pub fn build(self) -> RoadNetwork {
        let node_count = self.nodes.len();
        let edge_count = self.raw_edges.len();

        // Sort edges by source node for CSR construction.  Stable sort on
        // (from, to) keeps EdgeIds identical across builds of the same input.
        let mut raw = self.raw_edges;
        raw.sort_by_key(|e| (e.from.0, e.to.0));

        if !self.dense_urban.is_empty() {
            for e in &mut raw {
                let a = self.nodes[e.from.index()];
                let b = self.nodes[e.to.index()];
                let mid = GeoPoint::new((a.lat + b.lat) * 0.5, (a.lon + b.lon) * 0.5);
                if self.dense_urban.iter().any(|r| r.contains(mid)) {
                    e.attrs.tags.is_dense_urban = true;
                }
            }
        }

        // Build edge arrays from sorted raw edges.
        let edge_from:     Vec<NodeId>    = raw.iter().map(|e| e.from).collect();
        let edge_to:       Vec<NodeId>    = raw.iter().map(|e| e.to).collect();
        let edge_length_m: Vec<f32>       = raw.iter().map(|e| e.attrs.length_m.max(0.0)).collect();
        let edge_class:    Vec<RoadClass> = raw.iter().map(|e| e.attrs.class).collect();
        let edge_tags:     Vec<RoadTags>  = raw.iter().map(|e| e.attrs.tags).collect();

        // Build CSR row pointer (node_out_start).
        let mut node_out_start = vec![0u32; node_count + 1];
        for e in &raw {
            node_out_start[e.from.index() + 1] += 1;
        }
        for i in 1..=node_count {
            node_out_start[i] += node_out_start[i - 1];
        }
        debug_assert_eq!(node_out_start[node_count] as usize, edge_count);

        // Undirected degree and structural flag per node.
        let mut neighbours: Vec<Vec<u32>> = vec![Vec::new(); node_count];
        let mut node_structural = vec![false; node_count];
        for e in &raw {
            if e.from != e.to {
                neighbours[e.from.index()].push(e.to.0);
                neighbours[e.to.index()].push(e.from.0);
            }
            if e.attrs.tags.is_structural() {
                node_structural[e.from.index()] = true;
                node_structural[e.to.index()] = true;
            }
        }
        let node_degree: Vec<u16> = neighbours
            .into_iter()
            .map(|mut n| {
                n.sort_unstable();
                n.dedup();
                n.len().min(u16::MAX as usize) as u16
            })
            .collect();

        // Bulk-load R-tree for O(N log N) construction (faster than N inserts).
        let entries: Vec<NodeEntry> = self
            .nodes
            .iter()
            .enumerate()
            .map(|(i, &pos)| NodeEntry {
                point: [pos.lat, pos.lon],
                id: NodeId(i as u32),
            })
            .collect();
        let spatial_idx = RTree::bulk_load(entries);

        let vantage_idx = ProximityIndex::new(
            self.vantage.iter().enumerate().map(|(i, &p)| (p, i as u32)).collect(),
        );

        RoadNetwork {
            node_pos: self.nodes,
            node_degree,
            node_structural,
            node_out_start,
            edge_from,
            edge_to,
            edge_length_m,
            edge_class,
            edge_tags,
            vantage_points: self.vantage,
            spatial_idx,
            vantage_idx,
        }
    }
}

impl Default for RoadNetworkBuilder {
    fn default() -> Self {
        Self::new()
    }
}
