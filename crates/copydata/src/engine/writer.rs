//! Writer: best-effort insert of sanitized items.

use copydata_core::item::{Item, KeySchema};
use copydata_core::replication::{FailureKind, ItemFailure};
use copydata_core::retry::RetryPolicy;
use copydata_core::storage::TableStore;

use super::retry::with_retry;

/// What a write pass did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WriteOutcome {
    pub written: usize,
    pub failures: Vec<ItemFailure>,
}

/// Inserts `items` into `table` one at a time.
///
/// Each failure is recorded with the item's key and the next item is tried.
/// Inserts never overwrite: an item left behind by an incomplete clear makes
/// the matching insert fail.
pub async fn write_all(
    store: &dyn TableStore,
    table: &str,
    key: &KeySchema,
    items: &[Item],
    retry: &RetryPolicy,
) -> WriteOutcome {
    let mut outcome = WriteOutcome::default();

    for item in items {
        let label = match key.extract(item) {
            Ok(item_key) => item_key.to_string(),
            Err(err) => {
                tracing::warn!(table, error = %err, "Cannot write item without its key");
                outcome
                    .failures
                    .push(ItemFailure::new(FailureKind::Write, key.describe(item), err));
                continue;
            }
        };

        match with_retry(retry, "put_item", || store.put_item(table, key, item)).await {
            Ok(()) => outcome.written += 1,
            Err(err) => {
                tracing::warn!(table, key = %label, error = %err, "Failed to write item");
                outcome
                    .failures
                    .push(ItemFailure::new(FailureKind::Write, label, err));
            }
        }
    }

    tracing::info!(
        table,
        written = outcome.written,
        failures = outcome.failures.len(),
        "Wrote table"
    );
    outcome
}
