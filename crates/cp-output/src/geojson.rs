//! GeoJSON output backend.
//!
//! One `FeatureCollection` per layer.  Routes are `LineString`s, everything
//! else is a `Point`; coordinates are `[lon, lat]` as GeoJSON requires.

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use serde_json::{json, Value};

use cp_analysis::AnalysisReport;
use cp_core::GeoPoint;

use crate::row::{chokepoint_id, poi_id};
use crate::style::FeatureKind;
use crate::writer::ReportWriter;
use crate::OutputResult;

/// Writes each report as four `.geojson` files.
pub struct GeoJsonWriter {
    dir:      PathBuf,
    written:  Vec<PathBuf>,
    finished: bool,
}

impl GeoJsonWriter {
    pub fn new(dir: &Path) -> OutputResult<Self> {
        fs::create_dir_all(dir)?;
        Ok(Self { dir: dir.to_path_buf(), written: Vec::new(), finished: false })
    }

    fn write_collection(&mut self, stem: &str, scenario: &str, features: Vec<Value>) -> OutputResult<()> {
        let path = self.dir.join(format!("{stem}_{scenario}.geojson"));
        let doc = json!({ "type": "FeatureCollection", "features": features });
        let mut w = BufWriter::new(File::create(&path)?);
        serde_json::to_writer_pretty(&mut w, &doc)?;
        w.flush()?;
        self.written.push(path);
        Ok(())
    }
}

#[inline]
fn lon_lat(p: GeoPoint) -> [f32; 2] {
    [p.lon, p.lat]
}

fn point(p: GeoPoint, mut props: Value, kind: FeatureKind) -> Value {
    props["layer"] = json!(kind.layer());
    props["color"] = json!(kind.color());
    json!({
        "type": "Feature",
        "geometry": { "type": "Point", "coordinates": lon_lat(p) },
        "properties": props,
    })
}

impl ReportWriter for GeoJsonWriter {
    fn write_report(&mut self, report: &AnalysisReport) -> OutputResult<()> {
        let name = report.scenario.name.as_str();

        let routes = report
            .routes
            .values()
            .map(|r| {
                let kind = FeatureKind::Route(r.objective);
                let coords: Vec<[f32; 2]> = r.path.iter().copied().map(lon_lat).collect();
                json!({
                    "type": "Feature",
                    "geometry": { "type": "LineString", "coordinates": coords },
                    "properties": {
                        "id": r.id(),
                        "label": r.label(),
                        "kind": r.objective.as_str(),
                        "length_m": r.length_m,
                        "turn_count": r.turn_count,
                        "layer": kind.layer(),
                        "color": kind.color(),
                    },
                })
            })
            .collect();
        self.write_collection("routes", name, routes)?;

        let chokepoints = report
            .chokepoints
            .values()
            .map(|c| {
                let routes: Vec<&str> = c.routes.iter().map(|o| o.route_id()).collect();
                let factors: Vec<&str> = c.factors.iter().map(|f| f.as_str()).collect();
                point(
                    c.location,
                    json!({
                        "id": chokepoint_id(c.id),
                        "vulnerability_score": c.score,
                        "description": c.description,
                        "routes": routes,
                        "factors": factors,
                    }),
                    FeatureKind::Chokepoint,
                )
            })
            .collect();
        self.write_collection("chokepoints", name, chokepoints)?;

        let pois = report
            .pois
            .values()
            .map(|p| {
                point(
                    p.location,
                    json!({
                        "id": poi_id(p.id),
                        "type": p.kind.as_str(),
                        "description": p.description,
                        "related_route": p.related_route.map(|o| o.route_id()),
                        "related_chokepoint": p.related_chokepoint.map(chokepoint_id),
                        "source_score": p.source_score,
                    }),
                    FeatureKind::Poi(p.kind),
                )
            })
            .collect();
        self.write_collection("pois", name, pois)?;

        let teams = report
            .teams
            .values()
            .map(|t| {
                point(
                    t.location,
                    json!({
                        "id": t.id,
                        "type": t.kind.as_str(),
                        "assigned_to": t.assigned_to.map(|a| a.to_string()),
                        "role": t.role,
                    }),
                    FeatureKind::Team(t.kind),
                )
            })
            .collect();
        self.write_collection("teams", name, teams)?;

        tracing::debug!(scenario = name, dir = %self.dir.display(), "wrote GeoJSON export");
        Ok(())
    }

    fn written(&self) -> &[PathBuf] {
        &self.written
    }

    fn finish(&mut self) -> OutputResult<()> {
        if self.finished {
            return Ok(());
        }
        self.finished = true;
        tracing::info!(files = self.written.len(), "GeoJSON export finished");
        Ok(())
    }
}
