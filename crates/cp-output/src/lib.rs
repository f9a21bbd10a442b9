//! `cp-output`: export writers for a finished chokepoint analysis.
//!
//! Two backends, both writing four files per scenario into one directory:
//!
//! | Backend          | Files created                                                              |
//! |------------------|----------------------------------------------------------------------------|
//! | [`CsvWriter`]    | `routes_<s>.csv`, `chokepoints_<s>.csv`, `pois_<s>.csv`, `teams_<s>.csv`   |
//! | [`GeoJsonWriter`]| the same stems with `.geojson`, one `FeatureCollection` each              |
//!
//! Both implement [`ReportWriter`].  Neither reads anything but the
//! [`AnalysisReport`](cp_analysis::AnalysisReport) it is handed.
//!
//! # Usage
//!
//! ```rust,ignore
//! use cp_output::{CsvWriter, GeoJsonWriter, ReportWriter};
//!
//! let report = service.run("schiphol")?;
//! let mut csv = CsvWriter::new(Path::new("./output"))?;
//! csv.write_report(&report)?;
//! csv.finish()?;
//! ```

pub mod csv;
pub mod error;
pub mod geojson;
pub mod row;
pub mod style;
pub mod writer;


pub use csv::CsvWriter;
pub use error::{OutputError, OutputResult};
pub use geojson::GeoJsonWriter;
pub use row::{ChokepointRow, PoiRow, RouteRow, TeamRow};
pub use style::FeatureKind;
pub use writer::ReportWriter;
