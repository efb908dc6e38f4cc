use async_trait::async_trait;

use crate::item::{Item, ItemKey, KeySchema};

use super::{Cursor, Page, Result};

/// A key-value store holding named tables of items.
#[async_trait]
pub trait TableStore: Send + Sync {
    /// Scans one page of `table`, continuing after `cursor` when given.
    ///
    /// A page with no `next` cursor is the last one.
    async fn scan_page(&self, table: &str, cursor: Option<&Cursor>) -> Result<Page>;

    /// Inserts `item` into `table`.
    ///
    /// Fails with `StoreError::AlreadyExists` when an item with the same key is present.
    async fn put_item(&self, table: &str, key: &KeySchema, item: &Item) -> Result<()>;

    /// Deletes the item with `key` from `table`. Deleting a missing item succeeds.
    async fn delete_item(&self, table: &str, key: &ItemKey) -> Result<()>;
}
