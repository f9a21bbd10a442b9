//! Flat row types shared by the export backends.
//!
//! One row per route, chokepoint, POI and team.  Ids use the external
//! forms (`r_safest`, `cp_3`, `poi_12`, `SDT1`) so rows written for
//! different layers can be joined on them.

use cp_analysis::{AnalysisReport, Chokepoint, PointOfInterest, Route, SecurityTeam};

#[derive(Debug, Clone, PartialEq)]
pub struct RouteRow {
    pub id:         String,
    pub label:      String,
    pub kind:       String,
    pub length_m:   f32,
    pub turn_count: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChokepointRow {
    pub id:          String,
    pub lat:         f32,
    pub lon:         f32,
    pub score:       u8,
    /// Contributing route ids joined with `;`.
    pub routes:      String,
    /// Factor names joined with `;`.
    pub factors:     String,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PoiRow {
    pub id:                 String,
    pub kind:               String,
    pub lat:                f32,
    pub lon:                f32,
    /// Empty when the POI is not tied to one route.
    pub related_route:      String,
    pub related_chokepoint: String,
    pub source_score:       u8,
    pub description:        String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TeamRow {
    pub id:          String,
    pub kind:        String,
    pub lat:         f32,
    pub lon:         f32,
    /// Empty for general-coverage teams.
    pub assigned_to: String,
    pub role:        String,
}

pub(crate) fn chokepoint_id(id: cp_core::ChokepointId) -> String {
    format!("cp_{}", id.0)
}

pub(crate) fn poi_id(id: cp_core::PoiId) -> String {
    format!("poi_{}", id.0)
}

impl From<&Route> for RouteRow {
    fn from(r: &Route) -> Self {
        Self {
            id:         r.id().to_owned(),
            label:      r.label().to_owned(),
            kind:       r.objective.as_str().to_owned(),
            length_m:   r.length_m,
            turn_count: r.turn_count,
        }
    }
}

impl From<&Chokepoint> for ChokepointRow {
    fn from(c: &Chokepoint) -> Self {
        let routes: Vec<&str> = c.routes.iter().map(|o| o.route_id()).collect();
        let factors: Vec<&str> = c.factors.iter().map(|f| f.as_str()).collect();
        Self {
            id:          chokepoint_id(c.id),
            lat:         c.location.lat,
            lon:         c.location.lon,
            score:       c.score,
            routes:      routes.join(";"),
            factors:     factors.join(";"),
            description: c.description.clone(),
        }
    }
}

impl From<&PointOfInterest> for PoiRow {
    fn from(p: &PointOfInterest) -> Self {
        Self {
            id:                 poi_id(p.id),
            kind:               p.kind.as_str().to_owned(),
            lat:                p.location.lat,
            lon:                p.location.lon,
            related_route:      p.related_route.map(|o| o.route_id().to_owned()).unwrap_or_default(),
            related_chokepoint: p.related_chokepoint.map(chokepoint_id).unwrap_or_default(),
            source_score:       p.source_score,
            description:        p.description.clone(),
        }
    }
}

impl From<&SecurityTeam> for TeamRow {
    fn from(t: &SecurityTeam) -> Self {
        Self {
            id:          t.id.clone(),
            kind:        t.kind.as_str().to_owned(),
            lat:         t.location.lat,
            lon:         t.location.lon,
            assigned_to: t.assigned_to.map(|a| a.to_string()).unwrap_or_default(),
            role:        t.role.clone(),
        }
    }
}

/// Rows of all four layers, in the report's map order.
pub struct ReportRows {
    pub routes:      Vec<RouteRow>,
    pub chokepoints: Vec<ChokepointRow>,
    pub pois:        Vec<PoiRow>,
    pub teams:       Vec<TeamRow>,
}

impl From<&AnalysisReport> for ReportRows {
    fn from(report: &AnalysisReport) -> Self {
        Self {
            routes:      report.routes.values().map(RouteRow::from).collect(),
            chokepoints: report.chokepoints.values().map(ChokepointRow::from).collect(),
            pois:        report.pois.values().map(PoiRow::from).collect(),
            teams:       report.teams.values().map(TeamRow::from).collect(),
        }
    }
}
