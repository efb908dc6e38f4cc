//! Table clearer: deletes every item of a target table.

use copydata_core::item::KeySchema;
use copydata_core::replication::{FailureKind, ItemFailure, PageFetchError};
use copydata_core::retry::RetryPolicy;
use copydata_core::storage::TableStore;

use super::retry::with_retry;
use super::scan::PageScanner;

/// What a clearing pass did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClearOutcome {
    /// Items found by the scan.
    pub found: usize,
    pub deleted: usize,
    pub failures: Vec<ItemFailure>,
    /// The page fetch that stopped the pass early, if any.
    pub aborted: Option<PageFetchError>,
}

/// Deletes every item of `table`, page by page.
///
/// Failed deletes are recorded and clearing carries on with the next item.
/// Only a page that cannot be fetched aborts the pass; the outcome then
/// still counts the deletes done before it.
pub async fn clear_all(
    store: &dyn TableStore,
    table: &str,
    key: &KeySchema,
    retry: &RetryPolicy,
) -> ClearOutcome {
    let mut scanner = PageScanner::new(store, table, retry);
    let mut outcome = ClearOutcome::default();

    loop {
        let page = match scanner.next_page().await {
            Ok(Some(page)) => page,
            Ok(None) => break,
            Err(err) => {
                tracing::warn!(
                    table,
                    deleted = outcome.deleted,
                    error = %err,
                    "Clearing aborted"
                );
                outcome.aborted = Some(err);
                break;
            }
        };
        for item in &page {
            outcome.found += 1;

            let item_key = match key.extract(item) {
                Ok(item_key) => item_key,
                Err(err) => {
                    tracing::warn!(table, error = %err, "Cannot delete item without its key");
                    outcome
                        .failures
                        .push(ItemFailure::new(FailureKind::Delete, key.describe(item), err));
                    continue;
                }
            };

            match with_retry(retry, "delete_item", || store.delete_item(table, &item_key)).await {
                Ok(()) => outcome.deleted += 1,
                Err(err) => {
                    tracing::warn!(table, key = %item_key, error = %err, "Failed to delete item");
                    outcome.failures.push(ItemFailure::new(
                        FailureKind::Delete,
                        item_key.to_string(),
                        err,
                    ));
                }
            }
        }
    }

    tracing::info!(
        table,
        found = outcome.found,
        deleted = outcome.deleted,
        failures = outcome.failures.len(),
        "Cleared table"
    );
    outcome
}
