//! Route objective enum shared by the planner, analysis, and export crates.

/// The edge-cost function a route is optimised under.
///
/// Variant order is the canonical route order everywhere (planning, output
/// maps, tie-breaks): shortest, logical, safest.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum Objective {
    /// Minimise raw distance.
    Shortest,
    /// Prefer higher road classes, consistent classes and few sharp turns.
    Logical,
    /// Avoid tunnels, dense urban blocks and narrow residential streets.
    Safest,
}

impl Objective {
    /// All objectives in canonical order.
    pub const ALL: [Objective; 3] = [Objective::Shortest, Objective::Logical, Objective::Safest];

    /// Stable route identifier used as the key of the output `routes` map.
    pub fn route_id(self) -> &'static str {
        match self {
            Objective::Shortest => "r_shortest",
            Objective::Logical  => "r_logical",
            Objective::Safest   => "r_safest",
        }
    }

    /// Human label shown next to the route.
    pub fn label(self) -> &'static str {
        match self {
            Objective::Shortest => "Shortest route",
            Objective::Logical  => "Most logical route",
            Objective::Safest   => "Safest route",
        }
    }

    /// Short machine name, useful for CSV column values.
    pub fn as_str(self) -> &'static str {
        match self {
            Objective::Shortest => "shortest",
            Objective::Logical  => "logical",
            Objective::Safest   => "safest",
        }
    }

    /// Position in [`Objective::ALL`]; used as a bit index by route sets.
    #[inline]
    pub fn ordinal(self) -> usize {
        self as usize
    }
}

impl std::fmt::Display for Objective {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
