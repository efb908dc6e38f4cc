//! Pretty output formatting.

use copydata_core::replication::{ReplicationReport, ReplicationResult, TableStatus};

/// Format one table's result as a summary line plus its failures.
pub fn format_result(result: &ReplicationResult) -> String {
    let status = match &result.status {
        TableStatus::Done if result.failures.is_empty() => "OK".to_string(),
        TableStatus::Done => "PARTIAL".to_string(),
        TableStatus::Failed { phase, .. } => format!("FAILED ({phase})"),
    };
    let mut output = format!(
        "{} -> {} [{}]\n  read: {}  deleted: {}  skipped: {}  written: {}  ({} ms)",
        result.source_table,
        result.target_table,
        status,
        result.read,
        result.deleted,
        result.skipped,
        result.written,
        result.elapsed_ms
    );
    if let TableStatus::Failed { error, .. } = &result.status {
        output.push_str(&format!("\n  error: {}", error));
    }
    for failure in &result.failures {
        output.push_str(&format!(
            "\n  {} failed for {}: {}",
            failure.kind, failure.key, failure.error
        ));
    }
    output
}

/// Format a whole report for display.
pub fn format_report(report: &ReplicationReport) -> String {
    if report.results.is_empty() {
        return "No tables replicated.".to_string();
    }
    let totals = report.totals();
    let mut output = format!(
        "REPLICATION ({} tables, started {})\n",
        totals.tables,
        report.started_at.to_rfc3339()
    );
    output.push_str(&"-".repeat(40));
    for result in &report.results {
        output.push_str(&format!("\n{}", format_result(result)));
        output.push('\n');
    }
    output.push_str(&"-".repeat(40));
    output.push_str(&format!(
        "\nFailed tables: {}, item failures: {}, items written: {}",
        totals.failed_tables, totals.item_failures, totals.written
    ));
    output
}
