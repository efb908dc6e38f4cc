//! Paginated reader: drains a whole table into memory.

use copydata_core::item::Item;
use copydata_core::replication::PageFetchError;
use copydata_core::retry::RetryPolicy;
use copydata_core::storage::TableStore;

use super::scan::PageScanner;

/// Reads every item of `table`, following the scan cursor until exhausted.
///
/// Read all or fail: a page that cannot be fetched discards everything read so far.
pub async fn read_all(
    store: &dyn TableStore,
    table: &str,
    retry: &RetryPolicy,
) -> Result<Vec<Item>, PageFetchError> {
    let mut scanner = PageScanner::new(store, table, retry);
    let mut items = Vec::new();

    while let Some(page) = scanner.next_page().await? {
        items.extend(page);
    }

    tracing::info!(table, items = items.len(), pages = scanner.pages(), "Read table");
    Ok(items)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::inmemory::{Fault, InMemoryStore};
    use copydata_core::item::{KeySchema, Value};
    use copydata_core::storage::StoreError;

    fn receipt(i: usize) -> Item {
        [
            ("receiptId".to_string(), Value::s(format!("r-{i:04}"))),
            ("amount".to_string(), Value::n(i)),
        ]
        .into_iter()
        .collect()
    }

    async fn store(page_size: usize, count: usize) -> InMemoryStore {
        let store = InMemoryStore::new().with_page_size(page_size);
        store
            .create_table("prod-receipts", KeySchema::partition("receiptId"))
            .await;
        store
            .seed("prod-receipts", (0..count).map(receipt))
            .await
            .unwrap();
        store
    }

    #[tokio::test]
    async fn test_reads_every_item_regardless_of_page_size() {
        const P: usize = 4;
        for n in [0, P, P + 1, 3 * P - 1] {
            let store = store(P, n).await;

            let items = read_all(&store, "prod-receipts", &RetryPolicy::testing())
                .await
                .unwrap();

            assert_eq!(items.len(), n, "N={n}, P={P}");
        }
    }

    #[tokio::test]
    async fn test_reads_items_unchanged() {
        let store = store(2, 3).await;

        let mut items = read_all(&store, "prod-receipts", &RetryPolicy::testing())
            .await
            .unwrap();
        items.sort_by_key(|i| i["receiptId"].to_string());

        assert_eq!(items, (0..3).map(receipt).collect::<Vec<_>>());
    }

    #[tokio::test]
    async fn test_page_failure_fails_the_read() {
        let store = store(2, 6).await;
        store
            .inject(
                Fault::scan("prod-receipts", StoreError::RequestFailed("boom".to_string()))
                    .after(2),
            )
            .await;

        let err = read_all(&store, "prod-receipts", &RetryPolicy::testing())
            .await
            .unwrap_err();

        assert_eq!(err.page, 3);
    }

    #[tokio::test]
    async fn test_transient_page_failure_is_retried() {
        let store = store(2, 5).await;
        store
            .inject(
                Fault::scan("prod-receipts", StoreError::Throttled("busy".to_string()))
                    .after(1)
                    .times(2),
            )
            .await;

        let items = read_all(&store, "prod-receipts", &RetryPolicy::testing())
            .await
            .unwrap();

        assert_eq!(items.len(), 5);
    }

    #[tokio::test]
    async fn test_missing_table_fails_on_first_page() {
        let store = InMemoryStore::new();

        let err = read_all(&store, "prod-nope", &RetryPolicy::testing())
            .await
            .unwrap_err();

        assert_eq!(err.page, 1);
        assert_eq!(err.source, StoreError::TableNotFound("prod-nope".to_string()));
    }
}
