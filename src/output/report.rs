//! Run report and console summary

use crate::state::HarvestState;
use chrono::{DateTime, Utc};
use std::path::PathBuf;

/// What a finished run did
#[derive(Debug, Clone, PartialEq)]
pub struct HarvestReport {
    /// Terminal state the run ended in (`Done` or `Aborted`)
    pub outcome: HarvestState,

    /// Pages requested, including the one that ended the run
    pub pages_visited: u32,

    /// Records written to the sink
    pub records_written: usize,

    /// Cards skipped because they could not be mapped
    pub cards_skipped: usize,

    /// Where the records were written
    pub output_path: PathBuf,

    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

impl HarvestReport {
    /// Returns true if the run was cut short by a failure
    pub fn is_aborted(&self) -> bool {
        self.outcome.is_aborted()
    }

    /// Wall-clock duration of the run in seconds
    pub fn duration_seconds(&self) -> i64 {
        (self.finished_at - self.started_at).num_seconds()
    }
}

/// Formats a report for the console
pub fn format_report(report: &HarvestReport) -> String {
    let mut out = String::new();

    out.push_str("=== Harvest Summary ===\n\n");
    out.push_str(&format!("  Outcome: {}\n", report.outcome));
    out.push_str(&format!("  Pages visited: {}\n", report.pages_visited));
    out.push_str(&format!("  Records written: {}\n", report.records_written));
    if report.cards_skipped > 0 {
        out.push_str(&format!("  Cards skipped: {}\n", report.cards_skipped));
    }
    out.push_str(&format!("  Output: {}\n", report.output_path.display()));
    out.push_str(&format!(
        "  Started: {}\n",
        report.started_at.format("%Y-%m-%d %H:%M:%S UTC")
    ));
    out.push_str(&format!("  Duration: {}s\n", report.duration_seconds()));

    out
}

/// Prints a report to stdout
pub fn print_report(report: &HarvestReport) {
    println!("{}", format_report(report));
}
