//! Report rendering.

pub mod json;
pub mod pretty;

use clap::ValueEnum;
use copydata_core::replication::ReplicationReport;

/// Output format options.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Raw JSON output.
    Json,
    /// Human-readable summary table.
    #[default]
    Pretty,
}

/// Format a replication report for output.
pub fn format_report(report: &ReplicationReport, format: OutputFormat) -> String {
    match format {
        OutputFormat::Json => json::format_json(report),
        OutputFormat::Pretty => pretty::format_report(report),
    }
}
