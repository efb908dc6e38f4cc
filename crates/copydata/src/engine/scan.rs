//! Cursor-following scan shared by the reader and the clearer.

use copydata_core::item::Item;
use copydata_core::replication::PageFetchError;
use copydata_core::retry::RetryPolicy;
use copydata_core::storage::{Cursor, TableStore};

use super::retry::with_retry;

/// Walks every page of one table's scan.
///
/// Each page is fetched only after the previous one was handed out, and its
/// cursor is only fed back into this scan.
pub struct PageScanner<'a> {
    store: &'a dyn TableStore,
    table: &'a str,
    retry: &'a RetryPolicy,
    cursor: Option<Cursor>,
    pages: usize,
    done: bool,
}

impl<'a> PageScanner<'a> {
    pub fn new(store: &'a dyn TableStore, table: &'a str, retry: &'a RetryPolicy) -> Self {
        Self {
            store,
            table,
            retry,
            cursor: None,
            pages: 0,
            done: false,
        }
    }

    /// Fetches the next page, or `None` once the scan is exhausted.
    pub async fn next_page(&mut self) -> Result<Option<Vec<Item>>, PageFetchError> {
        if self.done {
            return Ok(None);
        }

        self.pages += 1;
        let (store, table, cursor) = (self.store, self.table, self.cursor.as_ref());
        let page = with_retry(self.retry, "scan", || store.scan_page(table, cursor))
            .await
            .map_err(|source| PageFetchError {
                table: self.table.to_string(),
                page: self.pages,
                source,
            })?;

        tracing::debug!(
            table = self.table,
            page = self.pages,
            items = page.items.len(),
            more = page.next.is_some(),
            "Fetched page"
        );

        self.done = page.next.is_none();
        self.cursor = page.next;
        Ok(Some(page.items))
    }

    /// Number of pages fetched so far.
    pub fn pages(&self) -> usize {
        self.pages
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::inmemory::{Fault, InMemoryStore};
    use copydata_core::item::{KeySchema, Value};
    use copydata_core::storage::StoreError;

    fn item(id: usize) -> Item {
        [("id".to_string(), Value::s(format!("item-{id:03}")))]
            .into_iter()
            .collect()
    }

    #[tokio::test]
    async fn test_walks_all_pages_then_stops() {
        let store = InMemoryStore::new().with_page_size(2);
        store.create_table("t", KeySchema::partition("id")).await;
        store.seed("t", (0..5).map(item)).await.unwrap();
        let retry = RetryPolicy::testing();
        let mut scanner = PageScanner::new(&store, "t", &retry);

        let mut sizes = Vec::new();
        while let Some(items) = scanner.next_page().await.unwrap() {
            sizes.push(items.len());
        }

        assert_eq!(sizes, vec![2, 2, 1]);
        assert_eq!(scanner.pages(), 3);
        assert_eq!(scanner.next_page().await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_page_failure_reports_page_number() {
        let store = InMemoryStore::new().with_page_size(2);
        store.create_table("t", KeySchema::partition("id")).await;
        store.seed("t", (0..5).map(item)).await.unwrap();
        store
            .inject(Fault::scan("t", StoreError::RequestFailed("boom".to_string())).after(1))
            .await;
        let retry = RetryPolicy::testing();
        let mut scanner = PageScanner::new(&store, "t", &retry);

        assert!(scanner.next_page().await.unwrap().is_some());
        let err = scanner.next_page().await.unwrap_err();

        assert_eq!(err.table, "t");
        assert_eq!(err.page, 2);
        assert_eq!(err.source, StoreError::RequestFailed("boom".to_string()));
    }
}
