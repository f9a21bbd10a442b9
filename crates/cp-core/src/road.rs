//! Road classification and boolean edge attributes.

/// Functional road class, ordered from most to least important.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum RoadClass {
    Motorway,
    Trunk,
    Primary,
    Secondary,
    Tertiary,
    #[default]
    Unclassified,
    Residential,
    LivingStreet,
    Service,
}

impl RoadClass {
    /// Map an OSM `highway=*` value to a class.
    ///
    /// Returns `None` for ways a motorcade cannot use (footways, cycleways,
    /// steps, tracks…).  `_link` variants collapse onto their parent class.
    /// Unknown values get [`RoadClass::Unclassified`] rather than being
    /// dropped.
    pub fn from_osm(highway: &str) -> Option<RoadClass> {
        match highway {
            "motorway"  | "motorway_link"     => Some(RoadClass::Motorway),
            "trunk"     | "trunk_link"        => Some(RoadClass::Trunk),
            "primary"   | "primary_link"      => Some(RoadClass::Primary),
            "secondary" | "secondary_link"    => Some(RoadClass::Secondary),
            "tertiary"  | "tertiary_link"     => Some(RoadClass::Tertiary),
            "residential"                     => Some(RoadClass::Residential),
            "living_street"                   => Some(RoadClass::LivingStreet),
            "service"                         => Some(RoadClass::Service),
            "footway" | "path" | "cycleway"
            | "pedestrian" | "steps" | "track"
            | "bridleway" | "corridor"        => None,
            _                                 => Some(RoadClass::Unclassified),
        }
    }

    /// Numeric rank: 0 for motorways, increasing for lesser roads.  The
    /// logical objective penalises the absolute rank gap between consecutive
    /// edges.
    #[inline]
    pub fn rank(self) -> u8 {
        self as u8
    }

    /// `true` for classes that are residential in character.
    pub fn is_residential(self) -> bool {
        matches!(self, RoadClass::Residential | RoadClass::LivingStreet)
    }

    /// `true` for classes that are typically single-lane or alley-like.
    pub fn is_narrow(self) -> bool {
        matches!(self, RoadClass::LivingStreet | RoadClass::Service)
    }

    /// OSM-style tag value, useful for CSV column values.
    pub fn as_str(self) -> &'static str {
        match self {
            RoadClass::Motorway     => "motorway",
            RoadClass::Trunk        => "trunk",
            RoadClass::Primary      => "primary",
            RoadClass::Secondary    => "secondary",
            RoadClass::Tertiary     => "tertiary",
            RoadClass::Unclassified => "unclassified",
            RoadClass::Residential  => "residential",
            RoadClass::LivingStreet => "living_street",
            RoadClass::Service      => "service",
        }
    }
}

impl std::fmt::Display for RoadClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Boolean attributes of one road edge.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RoadTags {
    pub is_tunnel:      bool,
    pub is_bridge:      bool,
    pub is_residential: bool,
    pub is_dense_urban: bool,
    /// Single lane, narrow carriageway or width below a motorcade's needs.
    pub is_narrow:      bool,
}

impl RoadTags {
    /// Tunnel or bridge: the structural features that raise chokepoint scores.
    #[inline]
    pub fn is_structural(self) -> bool {
        self.is_tunnel || self.is_bridge
    }

    /// Residential street that is also narrow.
    #[inline]
    pub fn is_narrow_residential(self) -> bool {
        self.is_residential && self.is_narrow
    }
}
