//! Metric radius queries over arbitrary geographic items.
//!
//! Points are projected onto a local equirectangular plane (metres east and
//! north of a fixed origin) and stored in an R-tree.  Queries over-fetch by a
//! small margin in the plane and then filter by exact haversine distance, so
//! results are correct to the precision of [`GeoPoint::distance_m`].
//!
//! The projection error grows with distance from the origin; within the
//! ±100 km extent of a single corridor it stays below 2 %, well inside the
//! over-fetch margin.

use rstar::{PointDistance, RTree, RTreeObject, AABB};

use cp_core::GeoPoint;

const EARTH_RADIUS_M: f32 = 6_371_000.0;
/// Relative over-fetch applied to the planar query radius.
const QUERY_MARGIN: f32 = 0.05;

struct Entry<T> {
    xy:   [f32; 2],
    pos:  GeoPoint,
    seq:  u32,
    item: T,
}

impl<T> RTreeObject for Entry<T> {
    type Envelope = AABB<[f32; 2]>;
    fn envelope(&self) -> Self::Envelope {
        AABB::from_point(self.xy)
    }
}

impl<T> PointDistance for Entry<T> {
    fn distance_2(&self, point: &[f32; 2]) -> f32 {
        let dx = self.xy[0] - point[0];
        let dy = self.xy[1] - point[1];
        dx * dx + dy * dy
    }
}

/// One result of [`ProximityIndex::within`].
#[derive(Clone, Debug, PartialEq)]
pub struct Hit<T> {
    pub item:       T,
    pub pos:        GeoPoint,
    pub distance_m: f32,
}

/// Immutable radius-query index over `(GeoPoint, T)` pairs.
pub struct ProximityIndex<T> {
    origin:  GeoPoint,
    cos_lat: f32,
    tree:    RTree<Entry<T>>,
}

impl<T: Clone> ProximityIndex<T> {
    /// Bulk-load an index.  The projection origin is the first item's
    /// position (any point inside the corridor works equally well).
    pub fn new(items: Vec<(GeoPoint, T)>) -> Self {
        let origin = items.first().map(|(p, _)| *p).unwrap_or(GeoPoint::new(0.0, 0.0));
        let cos_lat = origin.lat.to_radians().cos().max(1e-6);
        let entries: Vec<Entry<T>> = items
            .into_iter()
            .enumerate()
            .map(|(i, (pos, item))| Entry {
                xy: project(origin, cos_lat, pos),
                pos,
                seq: i as u32,
                item,
            })
            .collect();
        Self { origin, cos_lat, tree: RTree::bulk_load(entries) }
    }

    pub fn len(&self) -> usize {
        self.tree.size()
    }

    pub fn is_empty(&self) -> bool {
        self.tree.size() == 0
    }

    /// All items within `radius_m` (inclusive) of `pos`, nearest first.
    /// Equal distances keep insertion order.
    pub fn within(&self, pos: GeoPoint, radius_m: f32) -> Vec<Hit<T>> {
        if self.is_empty() || !(radius_m >= 0.0) {
            return Vec::new();
        }
        let query = project(self.origin, self.cos_lat, pos);
        let planar = radius_m * (1.0 + QUERY_MARGIN) + 1.0;

        let mut hits: Vec<(f32, u32, &Entry<T>)> = self
            .tree
            .locate_within_distance(query, planar * planar)
            .filter_map(|e| {
                let d = pos.distance_m(e.pos);
                (d <= radius_m).then_some((d, e.seq, e))
            })
            .collect();
        hits.sort_by(|a, b| a.0.total_cmp(&b.0).then(a.1.cmp(&b.1)));

        hits.into_iter()
            .map(|(d, _, e)| Hit { item: e.item.clone(), pos: e.pos, distance_m: d })
            .collect()
    }
}

/// Local equirectangular projection in metres relative to `origin`.
#[inline]
fn project(origin: GeoPoint, cos_lat: f32, p: GeoPoint) -> [f32; 2] {
    let x = (p.lon - origin.lon).to_radians() * EARTH_RADIUS_M * cos_lat;
    let y = (p.lat - origin.lat).to_radians() * EARTH_RADIUS_M;
    [x, y]
}
