//! Replication orchestrator: runs every table of a plan through
//! clear, read, sanitize and write.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Instant;

use chrono::Utc;
use futures_util::stream::{self, StreamExt};
use thiserror::Error;
use tracing::Instrument;

use copydata_core::item::Item;
use copydata_core::replication::{
    FailureKind, ItemFailure, PageFetchError, Phase, ReplicationPlan, ReplicationReport,
    ReplicationResult, TableSpec,
};
use copydata_core::retry::RetryPolicy;
use copydata_core::sanitize::SanitizerRegistry;
use copydata_core::storage::TableStore;

use super::{clearer, reader, writer};

/// Order of the two all-or-nothing phases of a table.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PhaseOrder {
    /// Clear the target, then read the source.
    #[default]
    ClearFirst,
    /// Read the source, then clear the target. A failed read leaves the
    /// target untouched.
    ReadFirst,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("Invalid phase order '{0}', expected 'clear-first' or 'read-first'")]
pub struct ParsePhaseOrderError(String);

impl FromStr for PhaseOrder {
    type Err = ParsePhaseOrderError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "clear-first" => Ok(Self::ClearFirst),
            "read-first" => Ok(Self::ReadFirst),
            other => Err(ParsePhaseOrderError(other.to_string())),
        }
    }
}

impl fmt::Display for PhaseOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ClearFirst => f.write_str("clear-first"),
            Self::ReadFirst => f.write_str("read-first"),
        }
    }
}

/// Engine tuning.
#[derive(Debug, Clone, PartialEq)]
pub struct ReplicationOptions {
    /// Tables replicated at the same time. 1 runs them sequentially.
    pub concurrency: usize,
    pub order: PhaseOrder,
    /// Applied to each page fetch and each item write or delete.
    pub retry: RetryPolicy,
}

impl Default for ReplicationOptions {
    fn default() -> Self {
        Self {
            concurrency: 4,
            order: PhaseOrder::default(),
            retry: RetryPolicy::default(),
        }
    }
}

/// Copies tables from a source store into a target store.
pub struct Replicator {
    source: Arc<dyn TableStore>,
    target: Arc<dyn TableStore>,
    registry: SanitizerRegistry,
    options: ReplicationOptions,
}

impl Replicator {
    pub fn new(
        source: Arc<dyn TableStore>,
        target: Arc<dyn TableStore>,
        registry: SanitizerRegistry,
        options: ReplicationOptions,
    ) -> Self {
        Self {
            source,
            target,
            registry,
            options,
        }
    }

    /// Replicates every table of `plan`.
    ///
    /// Tables run as independent pipelines, at most `concurrency` at a time.
    /// The report lists every table in plan order, failed ones included.
    pub async fn replicate(&self, plan: &ReplicationPlan) -> ReplicationReport {
        let started_at = Utc::now();
        tracing::info!(
            tables = plan.len(),
            concurrency = self.options.concurrency,
            order = %self.options.order,
            "Starting replication"
        );

        let results: Vec<ReplicationResult> = stream::iter(plan.specs())
            .map(|spec| self.replicate_table(spec))
            .buffered(self.options.concurrency.max(1))
            .collect()
            .await;

        let report = ReplicationReport::new(started_at, results);
        let totals = report.totals();
        tracing::info!(
            tables = totals.tables,
            failed_tables = totals.failed_tables,
            written = totals.written,
            item_failures = totals.item_failures,
            "Replication finished"
        );
        report
    }

    async fn replicate_table(&self, spec: &TableSpec) -> ReplicationResult {
        let span = tracing::info_span!(
            "table",
            source = spec.source_name(),
            target = spec.target_name()
        );
        let started = Instant::now();

        let mut result = self.run_pipeline(spec).instrument(span).await;
        result.elapsed_ms = started.elapsed().as_millis() as u64;
        result
    }

    async fn run_pipeline(&self, spec: &TableSpec) -> ReplicationResult {
        let mut result = ReplicationResult::new(spec.source_name(), spec.target_name());

        let items = match self.options.order {
            PhaseOrder::ClearFirst => {
                if let Err(err) = self.clear(spec, &mut result).await {
                    return failed(result, Phase::Clearing, err);
                }
                match self.read(spec).await {
                    Ok(items) => items,
                    Err(err) => return failed(result, Phase::Reading, err),
                }
            }
            PhaseOrder::ReadFirst => {
                let items = match self.read(spec).await {
                    Ok(items) => items,
                    Err(err) => return failed(result, Phase::Reading, err),
                };
                if let Err(err) = self.clear(spec, &mut result).await {
                    return failed(result, Phase::Clearing, err);
                }
                items
            }
        };
        result.read = items.len();

        let sanitized = self.sanitize(spec, &items, &mut result);

        let outcome = writer::write_all(
            self.target.as_ref(),
            spec.target_name(),
            spec.key(),
            &sanitized,
            &self.options.retry,
        )
        .await;
        result.written = outcome.written;
        result.failures.extend(outcome.failures);

        tracing::info!(
            read = result.read,
            deleted = result.deleted,
            skipped = result.skipped,
            written = result.written,
            failures = result.failures.len(),
            "Replicated table"
        );
        result
    }

    async fn clear(
        &self,
        spec: &TableSpec,
        result: &mut ReplicationResult,
    ) -> Result<(), PageFetchError> {
        let outcome = clearer::clear_all(
            self.target.as_ref(),
            spec.target_name(),
            spec.key(),
            &self.options.retry,
        )
        .await;
        result.deleted = outcome.deleted;
        result.failures.extend(outcome.failures);
        match outcome.aborted {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    async fn read(&self, spec: &TableSpec) -> Result<Vec<Item>, PageFetchError> {
        reader::read_all(self.source.as_ref(), spec.source_name(), &self.options.retry).await
    }

    /// Applies the table's transform to every item read.
    ///
    /// A dedicated sanitizer on the spec wins over the registry entry for the
    /// source table.
    fn sanitize(&self, spec: &TableSpec, items: &[Item], result: &mut ReplicationResult) -> Vec<Item> {
        let transform = spec
            .sanitizer()
            .cloned()
            .unwrap_or_else(|| self.registry.transform_for(spec.source_name()));

        let mut sanitized = Vec::with_capacity(items.len());
        for item in items {
            match transform.apply(item) {
                Ok(Some(item)) => sanitized.push(item),
                Ok(None) => result.skipped += 1,
                Err(err) => {
                    let key = spec.key().describe(item);
                    tracing::warn!(key = %key, error = %err, "Failed to sanitize item");
                    result
                        .failures
                        .push(ItemFailure::new(FailureKind::Transform, key, err));
                }
            }
        }

        tracing::info!(
            transform = transform.description(),
            kept = sanitized.len(),
            skipped = result.skipped,
            "Sanitized items"
        );
        sanitized
    }
}

fn failed(result: ReplicationResult, phase: Phase, err: PageFetchError) -> ReplicationResult {
    tracing::error!(%phase, error = %err, "Table replication failed");
    result.fail(phase, err)
}
