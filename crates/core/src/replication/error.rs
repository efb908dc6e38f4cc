use thiserror::Error;

use crate::storage::StoreError;

/// Errors detected while validating a replication plan.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PlanError {
    #[error("Replication plan has no tables")]
    Empty,
    #[error("Table spec #{index} has an empty {field}")]
    EmptyField { index: usize, field: &'static str },
    #[error("Target table '{0}' appears more than once")]
    DuplicateTarget(String),
}

/// A scan page could not be fetched; fatal to the table's current phase.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("Failed to fetch page {page} of '{table}': {source}")]
pub struct PageFetchError {
    pub table: String,
    /// 1-based number of the page that failed.
    pub page: usize,
    #[source]
    pub source: StoreError,
}
