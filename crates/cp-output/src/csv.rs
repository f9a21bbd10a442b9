//! CSV output backend.
//!
//! Creates four files per scenario in the configured output directory:
//! - `routes_<scenario>.csv`
//! - `chokepoints_<scenario>.csv`
//! - `pois_<scenario>.csv`
//! - `teams_<scenario>.csv`

use std::fs::{self, File};
use std::path::{Path, PathBuf};

use csv::Writer;

use cp_analysis::AnalysisReport;

use crate::row::ReportRows;
use crate::writer::ReportWriter;
use crate::OutputResult;

pub const ROUTE_HEADER:      [&str; 5] = ["id", "label", "kind", "length_m", "turn_count"];
pub const CHOKEPOINT_HEADER: [&str; 7] = ["id", "lat", "lon", "score", "routes", "factors", "description"];
pub const POI_HEADER:        [&str; 8] = [
    "id", "kind", "lat", "lon", "related_route", "related_chokepoint", "source_score", "description",
];
pub const TEAM_HEADER:       [&str; 6] = ["id", "kind", "lat", "lon", "assigned_to", "role"];

/// Writes each report as four CSV tables.
pub struct CsvWriter {
    dir:      PathBuf,
    written:  Vec<PathBuf>,
    finished: bool,
}

impl CsvWriter {
    /// Create `dir` if needed.  Files are opened per report.
    pub fn new(dir: &Path) -> OutputResult<Self> {
        fs::create_dir_all(dir)?;
        Ok(Self { dir: dir.to_path_buf(), written: Vec::new(), finished: false })
    }

    fn open(&mut self, stem: &str, scenario: &str, header: &[&str]) -> OutputResult<Writer<File>> {
        let path = self.dir.join(format!("{stem}_{scenario}.csv"));
        let mut w = Writer::from_path(&path)?;
        w.write_record(header)?;
        self.written.push(path);
        Ok(w)
    }
}

impl ReportWriter for CsvWriter {
    fn write_report(&mut self, report: &AnalysisReport) -> OutputResult<()> {
        let name = report.scenario.name.as_str();
        let rows = ReportRows::from(report);

        let mut w = self.open("routes", name, &ROUTE_HEADER)?;
        for r in &rows.routes {
            w.write_record(&[
                r.id.clone(),
                r.label.clone(),
                r.kind.clone(),
                format!("{:.1}", r.length_m),
                r.turn_count.to_string(),
            ])?;
        }
        w.flush()?;

        let mut w = self.open("chokepoints", name, &CHOKEPOINT_HEADER)?;
        for c in &rows.chokepoints {
            w.write_record(&[
                c.id.clone(),
                c.lat.to_string(),
                c.lon.to_string(),
                c.score.to_string(),
                c.routes.clone(),
                c.factors.clone(),
                c.description.clone(),
            ])?;
        }
        w.flush()?;

        let mut w = self.open("pois", name, &POI_HEADER)?;
        for p in &rows.pois {
            w.write_record(&[
                p.id.clone(),
                p.kind.clone(),
                p.lat.to_string(),
                p.lon.to_string(),
                p.related_route.clone(),
                p.related_chokepoint.clone(),
                p.source_score.to_string(),
                p.description.clone(),
            ])?;
        }
        w.flush()?;

        let mut w = self.open("teams", name, &TEAM_HEADER)?;
        for t in &rows.teams {
            w.write_record(&[
                t.id.clone(),
                t.kind.clone(),
                t.lat.to_string(),
                t.lon.to_string(),
                t.assigned_to.clone(),
                t.role.clone(),
            ])?;
        }
        w.flush()?;

        tracing::debug!(scenario = name, dir = %self.dir.display(), "wrote CSV export");
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
        tracing::info!(files = self.written.len(), "CSV export finished");
        Ok(())
    }
}
