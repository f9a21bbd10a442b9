//! Geographic coordinate types and spatial utilities.
//!
//! `GeoPoint` uses `f32` (single-precision) latitude/longitude.  At the
//! equator this gives ~1 m precision, more than sufficient for a road
//! network covering one metropolitan corridor.

const EARTH_RADIUS_M: f32 = 6_371_000.0;

/// A WGS-84 geographic coordinate stored as single-precision floats.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GeoPoint {
    pub lat: f32,
    pub lon: f32,
}

impl GeoPoint {
    #[inline]
    pub const fn new(lat: f32, lon: f32) -> Self {
        Self { lat, lon }
    }

    /// `true` if both components are finite and inside the WGS-84 range.
    pub fn is_valid(self) -> bool {
        self.lat.is_finite()
            && self.lon.is_finite()
            && (-90.0..=90.0).contains(&self.lat)
            && (-180.0..=180.0).contains(&self.lon)
    }

    /// Haversine great-circle distance in metres.
    ///
    /// Accuracy: ±0.5 % (f32 rounding); suitable for routing and stand-off
    /// placement at city scale.
    pub fn distance_m(self, other: GeoPoint) -> f32 {
        let d_lat = (other.lat - self.lat).to_radians();
        let d_lon = (other.lon - self.lon).to_radians();

        let lat1 = self.lat.to_radians();
        let lat2 = other.lat.to_radians();

        let a = (d_lat * 0.5).sin().powi(2)
            + lat1.cos() * lat2.cos() * (d_lon * 0.5).sin().powi(2);

        let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());
        EARTH_RADIUS_M * c
    }

    /// Initial great-circle bearing from `self` towards `other`, in degrees
    /// clockwise from north, normalised to `[0, 360)`.
    pub fn bearing_deg(self, other: GeoPoint) -> f32 {
        let lat1 = self.lat.to_radians();
        let lat2 = other.lat.to_radians();
        let d_lon = (other.lon - self.lon).to_radians();

        let y = d_lon.sin() * lat2.cos();
        let x = lat1.cos() * lat2.sin() - lat1.sin() * lat2.cos() * d_lon.cos();
        normalize_bearing(y.atan2(x).to_degrees())
    }

    /// The point reached by travelling `distance_m` metres from `self` along
    /// `bearing_deg`.
    pub fn destination(self, bearing_deg: f32, distance_m: f32) -> GeoPoint {
        let delta = distance_m / EARTH_RADIUS_M;
        let theta = bearing_deg.to_radians();
        let lat1 = self.lat.to_radians();
        let lon1 = self.lon.to_radians();

        let lat2 = (lat1.sin() * delta.cos() + lat1.cos() * delta.sin() * theta.cos()).asin();
        let lon2 = lon1
            + (theta.sin() * delta.sin() * lat1.cos())
                .atan2(delta.cos() - lat1.sin() * lat2.sin());

        GeoPoint::new(lat2.to_degrees(), lon2.to_degrees())
    }
}

impl std::fmt::Display for GeoPoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({:.6}, {:.6})", self.lat, self.lon)
    }
}

/// Normalise any angle in degrees to `[0, 360)`.
#[inline]
pub fn normalize_bearing(deg: f32) -> f32 {
    let b = deg.rem_euclid(360.0);
    if b >= 360.0 { 0.0 } else { b }
}

/// Absolute difference between two bearings, in `[0, 180]`.
///
/// Used as the turn angle at a node: 0° means straight on, 180° a U-turn.
#[inline]
pub fn bearing_difference(a: f32, b: f32) -> f32 {
    let d = (a - b).rem_euclid(360.0);
    if d > 180.0 { 360.0 - d } else { d }
}

// ── GeoBounds ─────────────────────────────────────────────────────────────────

/// An axis-aligned lat/lon rectangle.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GeoBounds {
    pub min: GeoPoint,
    pub max: GeoPoint,
}

impl GeoBounds {
    /// Build from two corners given in any order.
    pub fn new(a: GeoPoint, b: GeoPoint) -> Self {
        Self {
            min: GeoPoint::new(a.lat.min(b.lat), a.lon.min(b.lon)),
            max: GeoPoint::new(a.lat.max(b.lat), a.lon.max(b.lon)),
        }
    }

    /// Smallest rectangle containing every point.  `None` for an empty slice.
    pub fn enclosing(points: &[GeoPoint]) -> Option<Self> {
        let (first, rest) = points.split_first()?;
        let start = GeoBounds { min: *first, max: *first };
        Some(rest.iter().fold(start, |b, &p| b.union_point(p)))
    }

    /// Grow to include `p`.
    pub fn union_point(self, p: GeoPoint) -> GeoBounds {
        GeoBounds {
            min: GeoPoint::new(self.min.lat.min(p.lat), self.min.lon.min(p.lon)),
            max: GeoPoint::new(self.max.lat.max(p.lat), self.max.lon.max(p.lon)),
        }
    }

    /// Grow the rectangle by `margin_m` metres on every side.
    pub fn padded(self, margin_m: f32) -> Self {
        let d_lat = (margin_m / EARTH_RADIUS_M).to_degrees();
        let mid_lat = ((self.min.lat + self.max.lat) * 0.5).to_radians();
        let d_lon = d_lat / mid_lat.cos().max(1e-6);
        Self {
            min: GeoPoint::new(self.min.lat - d_lat, self.min.lon - d_lon),
            max: GeoPoint::new(self.max.lat + d_lat, self.max.lon + d_lon),
        }
    }

    #[inline]
    pub fn contains(&self, p: GeoPoint) -> bool {
        p.lat >= self.min.lat && p.lat <= self.max.lat && p.lon >= self.min.lon && p.lon <= self.max.lon
    }
}
