//! In-memory store implementation.

use std::collections::{BTreeMap, HashMap};
use std::ops::Bound;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use copydata_core::item::{Item, ItemKey, KeySchema};
use copydata_core::storage::{Cursor, Page, Result, StoreError, TableStore};

const DEFAULT_PAGE_SIZE: usize = 100;

/// Store operation a [`Fault`] applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Operation {
    Scan,
    Put,
    Delete,
}

/// A scripted failure, matched by operation, table and optionally item key.
#[derive(Debug, Clone)]
pub struct Fault {
    operation: Operation,
    table: String,
    key: Option<String>,
    error: StoreError,
    /// Matching calls to let through before failing.
    skip: usize,
    /// Failures left; `None` fails forever.
    remaining: Option<usize>,
}

impl Fault {
    fn new(operation: Operation, table: &str, key: Option<String>, error: StoreError) -> Self {
        Self {
            operation,
            table: table.to_string(),
            key,
            error,
            skip: 0,
            remaining: None,
        }
    }

    /// Fails every scan page request on `table`.
    pub fn scan(table: &str, error: StoreError) -> Self {
        Self::new(Operation::Scan, table, None, error)
    }

    /// Fails puts of the item whose rendered key is `key` (e.g. `"id=item-3"`).
    pub fn put(table: &str, key: &str, error: StoreError) -> Self {
        Self::new(Operation::Put, table, Some(key.to_string()), error)
    }

    /// Fails deletes of the item whose rendered key is `key`.
    pub fn delete(table: &str, key: &str, error: StoreError) -> Self {
        Self::new(Operation::Delete, table, Some(key.to_string()), error)
    }

    /// Lets the first `calls` matching calls succeed.
    pub fn after(mut self, calls: usize) -> Self {
        self.skip = calls;
        self
    }

    /// Fails only `times` matching calls, then lets calls through.
    pub fn times(mut self, times: usize) -> Self {
        self.remaining = Some(times);
        self
    }

    fn matches(&self, operation: Operation, table: &str, key: Option<&str>) -> bool {
        self.operation == operation
            && self.table == table
            && (self.key.is_none() || self.key.as_deref() == key)
            && self.remaining != Some(0)
    }
}

#[derive(Debug)]
struct Table {
    schema: KeySchema,
    /// Rows ordered by rendered key, which is also the scan order.
    rows: BTreeMap<String, Item>,
}

#[derive(Debug, Default)]
struct State {
    tables: HashMap<String, Table>,
    faults: Vec<Fault>,
}

impl State {
    fn table(&self, name: &str) -> Result<&Table> {
        self.tables
            .get(name)
            .ok_or_else(|| StoreError::TableNotFound(name.to_string()))
    }

    fn table_mut(&mut self, name: &str) -> Result<&mut Table> {
        self.tables
            .get_mut(name)
            .ok_or_else(|| StoreError::TableNotFound(name.to_string()))
    }

    /// Consumes the first matching fault, if any.
    fn trip(&mut self, operation: Operation, table: &str, key: Option<&str>) -> Result<()> {
        let Some(fault) = self
            .faults
            .iter_mut()
            .find(|f| f.matches(operation, table, key))
        else {
            return Ok(());
        };

        if fault.skip > 0 {
            fault.skip -= 1;
            return Ok(());
        }
        if let Some(remaining) = fault.remaining.as_mut() {
            *remaining -= 1;
        }
        Err(fault.error.clone())
    }
}

/// In-memory storage backend for testing.
///
/// Tables must be created with their key schema before use. Scans are
/// paginated with a configurable page size and, like DynamoDB, hand out a
/// cursor whenever a page is full, so the last page may be empty. Failures
/// can be scripted per operation with [`Fault`].
#[derive(Debug, Clone)]
pub struct InMemoryStore {
    state: Arc<RwLock<State>>,
    page_size: usize,
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self {
            state: Arc::new(RwLock::new(State::default())),
            page_size: DEFAULT_PAGE_SIZE,
        }
    }

    /// Sets the maximum number of items per scan page.
    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    /// Creates (or empties) a table.
    pub async fn create_table(&self, name: &str, schema: KeySchema) {
        self.state.write().await.tables.insert(
            name.to_string(),
            Table {
                schema,
                rows: BTreeMap::new(),
            },
        );
    }

    /// Inserts or replaces items directly, bypassing faults.
    pub async fn seed(&self, name: &str, items: impl IntoIterator<Item = Item>) -> Result<()> {
        let mut state = self.state.write().await;
        let table = state.table_mut(name)?;
        for item in items {
            let key = encode(&table.schema, &item)?;
            table.rows.insert(key, item);
        }
        Ok(())
    }

    /// Snapshot of a table's items in scan order. Empty for unknown tables.
    pub async fn items(&self, name: &str) -> Vec<Item> {
        self.state
            .read()
            .await
            .tables
            .get(name)
            .map(|t| t.rows.values().cloned().collect())
            .unwrap_or_default()
    }

    /// Number of items in a table.
    pub async fn len(&self, name: &str) -> usize {
        self.state
            .read()
            .await
            .tables
            .get(name)
            .map_or(0, |t| t.rows.len())
    }

    /// Adds a scripted failure.
    pub async fn inject(&self, fault: Fault) {
        self.state.write().await.faults.push(fault);
    }
}

fn encode(schema: &KeySchema, item: &Item) -> Result<String> {
    schema
        .extract(item)
        .map(|key| key.to_string())
        .map_err(|e| StoreError::InvalidData(e.to_string()))
}

#[async_trait]
impl TableStore for InMemoryStore {
    async fn scan_page(&self, table: &str, cursor: Option<&Cursor>) -> Result<Page> {
        let mut state = self.state.write().await;
        state.table(table)?;
        state.trip(Operation::Scan, table, None)?;

        let t = state.table(table)?;
        let start = match cursor {
            Some(cursor) => Bound::Excluded(encode(&t.schema, cursor.payload())?),
            None => Bound::Unbounded,
        };
        let items: Vec<Item> = t
            .rows
            .range((start, Bound::Unbounded))
            .take(self.page_size)
            .map(|(_, item)| item.clone())
            .collect();

        if items.len() < self.page_size {
            return Ok(Page::last(items));
        }
        let last = items
            .last()
            .map(|item| t.schema.extract(item))
            .transpose()
            .map_err(|e| StoreError::InvalidData(e.to_string()))?;
        Ok(match last {
            Some(key) => Page::with_next(items, Cursor::new(key.to_item())),
            None => Page::last(items),
        })
    }

    async fn put_item(&self, table: &str, key: &KeySchema, item: &Item) -> Result<()> {
        let mut state = self.state.write().await;
        state.table(table)?;
        let rendered = encode(key, item)?;
        state.trip(Operation::Put, table, Some(&rendered))?;

        let t = state.table_mut(table)?;
        if t.rows.contains_key(&rendered) {
            return Err(StoreError::AlreadyExists(rendered));
        }
        t.rows.insert(rendered, item.clone());
        Ok(())
    }

    async fn delete_item(&self, table: &str, key: &ItemKey) -> Result<()> {
        let mut state = self.state.write().await;
        state.table(table)?;
        let rendered = key.to_string();
        state.trip(Operation::Delete, table, Some(&rendered))?;

        state.table_mut(table)?.rows.remove(&rendered);
        Ok(())
    }
}
