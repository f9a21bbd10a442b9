//! hague: motorcade route and chokepoint analysis for the Hague corridor.
//!
//! Runs both registered scenarios (Schiphol and Rotterdam The Hague airport,
//! each via the World Forum to the Mauritshuis) and exports the results to
//! `output/hague/` as CSV and GeoJSON.
//!
//! With no arguments the synthetic corridor network in `network.rs` is used.
//! Pass a directory to read `<scenario>_nodes.csv` / `<scenario>_edges.csv`
//! from it instead:
//!
//! ```text
//! cargo run -p hague --release -- data/networks
//! ```
//!
//! Built with `--features osm`, a `.pbf` argument loads each scenario's
//! region from an OSM extract:
//!
//! ```text
//! cargo run -p hague --release --features osm -- zuid-holland-latest.osm.pbf
//! ```

mod network;

use std::path::{Path, PathBuf};
use std::thread;
use std::time::Instant;

use anyhow::Result;

use cp_analysis::chokepoint::ranked;
use cp_analysis::{AnalysisReport, AnalysisService};
use cp_core::{Scenario, ScenarioKey};
use cp_output::{CsvWriter, GeoJsonWriter, ReportWriter};
use cp_spatial::{CsvDirProvider, NetworkProvider, RoadNetwork, SpatialResult};

use network::build_network;

const OUTPUT_DIR: &str = "output/hague";

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .with_target(false)
        .init();

    println!("=== hague: motorcade chokepoint analysis ===");

    match std::env::args_os().nth(1).map(PathBuf::from) {
        #[cfg(feature = "osm")]
        Some(pbf) if pbf.extension().is_some_and(|e| e == "pbf") => {
            println!("Road networks: OSM extract {}", pbf.display());
            run(AnalysisService::new(cp_spatial::PbfProvider::new(pbf)))
        }
        Some(dir) => {
            println!("Road networks: CSV files in {}", dir.display());
            run(AnalysisService::new(CsvDirProvider::new(dir)))
        }
        None => {
            println!("Road network: synthetic Hague corridor");
            let synthetic = |_: &Scenario| -> SpatialResult<RoadNetwork> { Ok(build_network()) };
            run(AnalysisService::new(synthetic))
        }
    }
}

fn run<P: NetworkProvider>(service: AnalysisService<P>) -> Result<()> {
    let t0 = Instant::now();

    // Scenarios are independent; run them side by side on the shared service.
    let reports: Vec<AnalysisReport> = thread::scope(|s| {
        let handles: Vec<_> = ScenarioKey::ALL
            .into_iter()
            .map(|key| {
                let service = &service;
                s.spawn(move || service.run(key.name()))
            })
            .collect();
        handles
            .into_iter()
            .map(|h| match h.join() {
                Ok(result) => result.map_err(anyhow::Error::from),
                Err(_) => Err(anyhow::anyhow!("analysis thread panicked")),
            })
            .collect::<Result<Vec<_>>>()
    })?;

    println!("Analysis complete in {:.3} s", t0.elapsed().as_secs_f64());
    println!();

    let out = Path::new(OUTPUT_DIR);
    let mut csv = CsvWriter::new(out)?;
    let mut geojson = GeoJsonWriter::new(out)?;
    for report in &reports {
        print_report(report);
        csv.write_report(report)?;
        geojson.write_report(report)?;
    }
    csv.finish()?;
    geojson.finish()?;

    println!("Wrote {} files to {OUTPUT_DIR}/", csv.written().len() + geojson.written().len());
    Ok(())
}

fn print_report(report: &AnalysisReport) {
    let s = &report.scenario;
    println!(
        "── {}: {} → {} → {}",
        s.name, s.labels[0], s.labels[1], s.labels[2]
    );

    println!("{:<12} {:<20} {:>10} {:>6}", "Route", "Label", "Length km", "Turns");
    println!("{}", "-".repeat(51));
    for route in report.routes.values() {
        println!(
            "{:<12} {:<20} {:>10.2} {:>6}",
            route.id(),
            route.label(),
            route.length_m / 1_000.0,
            route.turn_count,
        );
    }
    println!();

    println!("{:<6} {:>5}  {}", "CP", "Score", "Factors");
    println!("{}", "-".repeat(51));
    for cp in ranked(&report.chokepoints).into_iter().take(8) {
        let factors: Vec<&str> = cp.factors.iter().map(|f| f.as_str()).collect();
        println!("{:<6} {:>5}  {}", format!("cp_{}", cp.id.0), cp.score, factors.join(", "));
    }
    println!();

    println!("{:<6} {:<12} {}", "Team", "Assigned", "Role");
    println!("{}", "-".repeat(51));
    for team in report.teams.values() {
        let assigned = team.assigned_to.map(|a| a.to_string()).unwrap_or_else(|| "-".into());
        println!("{:<6} {:<12} {}", team.id, assigned, team.role);
    }
    println!("POIs: {}", report.pois.len());
    println!();
}
