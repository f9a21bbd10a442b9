//! The `ReportWriter` trait implemented by all backend writers.

use std::path::PathBuf;

use cp_analysis::AnalysisReport;

use crate::OutputResult;

/// Trait implemented by the CSV and GeoJSON writers.
pub trait ReportWriter {
    /// Write the four layers of one report.  A second report for the same
    /// scenario overwrites the first.
    fn write_report(&mut self, report: &AnalysisReport) -> OutputResult<()>;

    /// Paths written so far, in write order.
    fn written(&self) -> &[PathBuf];

    /// Flush anything still buffered.
    ///
    /// Idempotent; safe to call more than once.
    fn finish(&mut self) -> OutputResult<()>;
}
