use std::fmt;

use chrono::{DateTime, Utc};
use serde::Serialize;

/// Phases of a single table's replication, in pipeline order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    Clearing,
    Reading,
    Sanitizing,
    Writing,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Clearing => "clearing",
            Self::Reading => "reading",
            Self::Sanitizing => "sanitizing",
            Self::Writing => "writing",
        };
        f.write_str(name)
    }
}

/// Terminal state of a table's replication.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "lowercase")]
pub enum TableStatus {
    /// All phases ran; item-level failures, if any, are listed separately.
    Done,
    /// An all-or-nothing phase failed and the pipeline stopped.
    Failed { phase: Phase, error: String },
}

/// The operation a single item failed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FailureKind {
    Delete,
    Transform,
    Write,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Delete => "delete",
            Self::Transform => "transform",
            Self::Write => "write",
        };
        f.write_str(name)
    }
}

/// A single item that could not be deleted, transformed or written.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ItemFailure {
    pub kind: FailureKind,
    /// Identification of the item, usually its rendered key.
    pub key: String,
    pub error: String,
}

impl ItemFailure {
    pub fn new(kind: FailureKind, key: impl Into<String>, error: impl fmt::Display) -> Self {
        Self {
            kind,
            key: key.into(),
            error: error.to_string(),
        }
    }
}

/// Outcome of replicating one table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReplicationResult {
    pub source_table: String,
    pub target_table: String,
    pub status: TableStatus,
    /// Items read from the source.
    pub read: usize,
    /// Items deleted from the target while clearing it.
    pub deleted: usize,
    /// Items written to the target.
    pub written: usize,
    /// Items excluded by the table's transform.
    pub skipped: usize,
    pub failures: Vec<ItemFailure>,
    pub elapsed_ms: u64,
}

impl ReplicationResult {
    /// A fresh result with zero counts.
    pub fn new(source_table: impl Into<String>, target_table: impl Into<String>) -> Self {
        Self {
            source_table: source_table.into(),
            target_table: target_table.into(),
            status: TableStatus::Done,
            read: 0,
            deleted: 0,
            written: 0,
            skipped: 0,
            failures: Vec::new(),
            elapsed_ms: 0,
        }
    }

    /// Marks the table failed in `phase`.
    pub fn fail(mut self, phase: Phase, error: impl fmt::Display) -> Self {
        self.status = TableStatus::Failed {
            phase,
            error: error.to_string(),
        };
        self
    }

    pub fn is_failed(&self) -> bool {
        matches!(self.status, TableStatus::Failed { .. })
    }

    /// Done with no item failures.
    pub fn is_clean(&self) -> bool {
        !self.is_failed() && self.failures.is_empty()
    }

    pub fn failures_of(&self, kind: FailureKind) -> impl Iterator<Item = &ItemFailure> {
        self.failures.iter().filter(move |f| f.kind == kind)
    }
}

/// Aggregate counts across a report.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Totals {
    pub tables: usize,
    pub failed_tables: usize,
    pub read: usize,
    pub deleted: usize,
    pub written: usize,
    pub skipped: usize,
    pub item_failures: usize,
}

/// The per-table results of one replication run, in plan order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReplicationReport {
    pub started_at: DateTime<Utc>,
    pub results: Vec<ReplicationResult>,
}

impl ReplicationReport {
    pub fn new(started_at: DateTime<Utc>, results: Vec<ReplicationResult>) -> Self {
        Self {
            started_at,
            results,
        }
    }

    /// The result for the given target table.
    pub fn get(&self, target_table: &str) -> Option<&ReplicationResult> {
        self.results.iter().find(|r| r.target_table == target_table)
    }

    pub fn totals(&self) -> Totals {
        self.results.iter().fold(Totals::default(), |mut t, r| {
            t.tables += 1;
            t.failed_tables += usize::from(r.is_failed());
            t.read += r.read;
            t.deleted += r.deleted;
            t.written += r.written;
            t.skipped += r.skipped;
            t.item_failures += r.failures.len();
            t
        })
    }

    /// Every table done and no item failed.
    pub fn is_success(&self) -> bool {
        self.results.iter().all(ReplicationResult::is_clean)
    }
}
