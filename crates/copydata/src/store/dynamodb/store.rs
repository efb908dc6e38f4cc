//! DynamoDB table store implementation.

use async_trait::async_trait;
use aws_sdk_dynamodb::Client;

use copydata_core::item::{Item, ItemKey, KeySchema};
use copydata_core::storage::{Cursor, Page, Result, StoreError, TableStore};

use super::conversions::{attributes_to_item, item_to_attributes, key_to_attributes};
use super::error::{map_delete_item_error, map_put_item_error, map_scan_error};

/// DynamoDB-backed [`TableStore`], one per environment.
///
/// Table names are physical: the store never adds a stage prefix itself.
#[derive(Debug, Clone)]
pub struct DynamoDbStore {
    client: Client,
    page_size: Option<i32>,
}

impl DynamoDbStore {
    pub fn new(client: Client) -> Self {
        Self {
            client,
            page_size: None,
        }
    }

    /// Caps the number of items per scan page. `None` lets DynamoDB page by size.
    pub fn with_page_size(mut self, page_size: Option<usize>) -> Self {
        self.page_size = page_size.map(|size| i32::try_from(size).unwrap_or(i32::MAX).max(1));
        self
    }
}

#[async_trait]
impl TableStore for DynamoDbStore {
    async fn scan_page(&self, table: &str, cursor: Option<&Cursor>) -> Result<Page> {
        let result = self
            .client
            .scan()
            .table_name(table)
            .consistent_read(true)
            .set_limit(self.page_size)
            .set_exclusive_start_key(cursor.map(|c| item_to_attributes(c.payload())))
            .send()
            .await
            .map_err(|e| map_scan_error(e, table))?;

        let items = result
            .items
            .unwrap_or_default()
            .iter()
            .map(attributes_to_item)
            .collect::<Result<Vec<_>>>()?;

        match result.last_evaluated_key {
            Some(key) if !key.is_empty() => {
                Ok(Page::with_next(items, Cursor::new(attributes_to_item(&key)?)))
            }
            _ => Ok(Page::last(items)),
        }
    }

    async fn put_item(&self, table: &str, key: &KeySchema, item: &Item) -> Result<()> {
        let rendered = key
            .extract(item)
            .map_err(|e| StoreError::InvalidData(e.to_string()))?
            .to_string();

        self.client
            .put_item()
            .table_name(table)
            .set_item(Some(item_to_attributes(item)))
            .condition_expression("attribute_not_exists(#pk)")
            .expression_attribute_names("#pk", &key.partition)
            .send()
            .await
            .map_err(|e| map_put_item_error(e, table, rendered))?;

        Ok(())
    }

    async fn delete_item(&self, table: &str, key: &ItemKey) -> Result<()> {
        self.client
            .delete_item()
            .table_name(table)
            .set_key(Some(key_to_attributes(key)))
            .send()
            .await
            .map_err(|e| map_delete_item_error(e, table))?;

        Ok(())
    }
}
