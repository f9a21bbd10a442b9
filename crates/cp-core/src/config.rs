//! Heuristic configuration for one analysis run.
//!
//! Every weight, threshold and multiplier used by the planner, the
//! chokepoint extractor and the POI generator is a named field here, with
//! its default taken from a `pub const` of the same name.  None of these
//! values has a derivation beyond operational judgement; callers tune them
//! rather than the code.

use crate::{CoreError, CoreResult, RoadClass};

// ── Routing defaults ──────────────────────────────────────────────────────────

/// Turn angle (degrees) above which a direction change counts as a turn.
pub const TURN_THRESHOLD_DEG: f32 = 45.0;
/// Logical objective: extra cost fraction for a 180° turn, scaled linearly
/// from zero at the threshold.
pub const TURN_PENALTY: f32 = 1.0;
/// Logical objective: extra cost fraction per rank of road-class change.
pub const CLASS_MISMATCH_PENALTY: f32 = 0.15;
/// Safest objective: multiplier for tunnel edges.
///
/// This is a cost factor, not a ban.  The safest route only avoids a tunnel
/// when the open alternative is shorter than `TUNNEL_RISK` times the tunnel
/// length (times any other multipliers on the tunnel edge).
pub const TUNNEL_RISK: f32 = 5.0;
/// Safest objective: multiplier for dense-urban edges.
pub const DENSE_URBAN_RISK: f32 = 2.0;
/// Safest objective: multiplier for narrow residential edges.
pub const NARROW_RESIDENTIAL_RISK: f32 = 2.0;
/// Safest objective: multiplier for bridge edges.
pub const BRIDGE_RISK: f32 = 1.0;

// ── Chokepoint defaults ───────────────────────────────────────────────────────

/// Undirected degree above which a node is a major intersection.
pub const MAJOR_INTERSECTION_DEGREE: u16 = 3;
/// Candidates closer than this are merged into one chokepoint.
pub const MERGE_RADIUS_M: f32 = 100.0;
pub const STRUCTURAL_BONUS: u8 = 2;
pub const INTERSECTION_BONUS: u8 = 1;
pub const DENSE_URBAN_BONUS: u8 = 1;

// ── POI defaults ──────────────────────────────────────────────────────────────

/// Edges searched on either side of a chokepoint for ambush segments.
pub const AMBUSH_WINDOW_EDGES: usize = 4;
/// Minimum chokepoint score that gets an enemy firing point.
pub const FIRING_SCORE_THRESHOLD: u8 = 7;
pub const FIRING_STANDOFF_M: f32 = 120.0;
pub const OBSERVATION_STANDOFF_M: f32 = 400.0;
/// Half angle of the line-of-sight cone around the route's perpendicular.
pub const SIGHT_CONE_HALF_DEG: f32 = 45.0;
/// Number of top-ranked chokepoints that get an observation point.
pub const OBSERVATION_TOP_N: usize = 5;
/// Same-kind POIs within this distance collapse into one.
pub const POI_MERGE_RADIUS_M: f32 = 150.0;

// ── RoutingWeights ────────────────────────────────────────────────────────────

/// Edge-cost parameters for the logical and safest objectives.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct RoutingWeights {
    pub turn_threshold_deg:      f32,
    pub turn_penalty:            f32,
    pub class_mismatch_penalty:  f32,
    /// Preference factor per road class for the logical objective, indexed
    /// by [`RoadClass::rank`].  Below 1 favours the class.
    pub class_factors:           [f32; 9],
    pub tunnel_risk:             f32,
    pub dense_urban_risk:        f32,
    pub narrow_residential_risk: f32,
    pub bridge_risk:             f32,
}

impl RoutingWeights {
    #[inline]
    pub fn class_factor(&self, class: RoadClass) -> f32 {
        self.class_factors[class.rank() as usize]
    }
}

impl Default for RoutingWeights {
    fn default() -> Self {
        Self {
            turn_threshold_deg:      TURN_THRESHOLD_DEG,
            turn_penalty:            TURN_PENALTY,
            class_mismatch_penalty:  CLASS_MISMATCH_PENALTY,
            //               mway  trunk prim  sec   tert  uncl  res   live  serv
            class_factors:  [0.60, 0.60, 0.75, 0.85, 0.95, 1.10, 1.30, 1.30, 1.50],
            tunnel_risk:             TUNNEL_RISK,
            dense_urban_risk:        DENSE_URBAN_RISK,
            narrow_residential_risk: NARROW_RESIDENTIAL_RISK,
            bridge_risk:             BRIDGE_RISK,
        }
    }
}

// ── ChokepointRules ───────────────────────────────────────────────────────────

/// Qualification, scoring and merge parameters for chokepoint extraction.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ChokepointRules {
    pub major_intersection_degree: u16,
    pub merge_radius_m:            f32,
    pub structural_bonus:          u8,
    pub intersection_bonus:        u8,
    pub dense_urban_bonus:         u8,
}

impl Default for ChokepointRules {
    fn default() -> Self {
        Self {
            major_intersection_degree: MAJOR_INTERSECTION_DEGREE,
            merge_radius_m:            MERGE_RADIUS_M,
            structural_bonus:          STRUCTURAL_BONUS,
            intersection_bonus:        INTERSECTION_BONUS,
            dense_urban_bonus:         DENSE_URBAN_BONUS,
        }
    }
}

// ── PoiRules ──────────────────────────────────────────────────────────────────

/// Placement parameters for the POI generator.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct PoiRules {
    pub ambush_window_edges:    usize,
    pub firing_score_threshold: u8,
    pub firing_standoff_m:      f32,
    pub observation_standoff_m: f32,
    pub sight_cone_half_deg:    f32,
    pub observation_top_n:      usize,
    pub merge_radius_m:         f32,
}

impl Default for PoiRules {
    fn default() -> Self {
        Self {
            ambush_window_edges:    AMBUSH_WINDOW_EDGES,
            firing_score_threshold: FIRING_SCORE_THRESHOLD,
            firing_standoff_m:      FIRING_STANDOFF_M,
            observation_standoff_m: OBSERVATION_STANDOFF_M,
            sight_cone_half_deg:    SIGHT_CONE_HALF_DEG,
            observation_top_n:      OBSERVATION_TOP_N,
            merge_radius_m:         POI_MERGE_RADIUS_M,
        }
    }
}

// ── AnalysisConfig ────────────────────────────────────────────────────────────

/// All heuristic parameters of one analysis run.
///
/// # Example
///
/// ```
/// use cp_core::AnalysisConfig;
///
/// let mut config = AnalysisConfig::default();
/// config.chokepoints.merge_radius_m = 50.0;
/// assert!(config.validate().is_ok());
/// ```
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct AnalysisConfig {
    pub routing:     RoutingWeights,
    pub chokepoints: ChokepointRules,
    pub pois:        PoiRules,
}

impl AnalysisConfig {
    /// Reject values that would make the search or the placement rules
    /// meaningless (negative costs, NaN, inverted stand-off bands).
    pub fn validate(&self) -> CoreResult<()> {
        let r = &self.routing;
        if !(0.0..180.0).contains(&r.turn_threshold_deg) {
            return Err(config_err(format!(
                "turn_threshold_deg must be in [0, 180), got {}",
                r.turn_threshold_deg
            )));
        }
        for (name, v) in [
            ("turn_penalty", r.turn_penalty),
            ("class_mismatch_penalty", r.class_mismatch_penalty),
        ] {
            if !v.is_finite() || v < 0.0 {
                return Err(config_err(format!("{name} must be finite and >= 0, got {v}")));
            }
        }
        if let Some(f) = r.class_factors.iter().find(|f| !f.is_finite() || **f <= 0.0) {
            return Err(config_err(format!("class factors must be finite and > 0, got {f}")));
        }
        for (name, v) in [
            ("tunnel_risk", r.tunnel_risk),
            ("dense_urban_risk", r.dense_urban_risk),
            ("narrow_residential_risk", r.narrow_residential_risk),
            ("bridge_risk", r.bridge_risk),
        ] {
            if !v.is_finite() || v < 1.0 {
                return Err(config_err(format!("{name} must be finite and >= 1, got {v}")));
            }
        }

        let c = &self.chokepoints;
        if !c.merge_radius_m.is_finite() || c.merge_radius_m < 0.0 {
            return Err(config_err(format!(
                "merge_radius_m must be finite and >= 0, got {}",
                c.merge_radius_m
            )));
        }

        let p = &self.pois;
        if !(p.firing_standoff_m.is_finite() && p.firing_standoff_m > 0.0) {
            return Err(config_err(format!(
                "firing_standoff_m must be > 0, got {}",
                p.firing_standoff_m
            )));
        }
        if !(p.observation_standoff_m.is_finite() && p.observation_standoff_m > p.firing_standoff_m) {
            return Err(config_err(format!(
                "observation_standoff_m ({}) must exceed firing_standoff_m ({})",
                p.observation_standoff_m, p.firing_standoff_m
            )));
        }
        if !(0.0..=90.0).contains(&p.sight_cone_half_deg) {
            return Err(config_err(format!(
                "sight_cone_half_deg must be in [0, 90], got {}",
                p.sight_cone_half_deg
            )));
        }
        if !p.merge_radius_m.is_finite() || p.merge_radius_m < 0.0 {
            return Err(config_err(format!(
                "POI merge_radius_m must be finite and >= 0, got {}",
                p.merge_radius_m
            )));
        }
        if p.firing_score_threshold > 10 {
            return Err(config_err(format!(
                "firing_score_threshold must be <= 10, got {}",
                p.firing_score_threshold
            )));
        }
        Ok(())
    }
}

fn config_err(msg: String) -> CoreError {
    CoreError::Config(msg)
}
