use std::fmt;

use serde::Serialize;

use super::{Item, KeyError, Value};

/// Key schema of a table: a partition attribute plus an optional sort attribute.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct KeySchema {
    pub partition: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sort: Option<String>,
}

impl KeySchema {
    /// Creates a schema keyed by a single partition attribute.
    pub fn partition(name: impl Into<String>) -> Self {
        Self {
            partition: name.into(),
            sort: None,
        }
    }

    /// Adds a sort key attribute.
    pub fn with_sort(mut self, name: impl Into<String>) -> Self {
        self.sort = Some(name.into());
        self
    }

    /// Key attribute names, partition first.
    pub fn attributes(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.partition.as_str()).chain(self.sort.as_deref())
    }

    /// Extracts the key attributes of `item`.
    pub fn extract(&self, item: &Item) -> Result<ItemKey, KeyError> {
        self.attributes()
            .map(|name| {
                item.get(name)
                    .map(|value| (name.to_string(), value.clone()))
                    .ok_or_else(|| KeyError::MissingAttribute(name.to_string()))
            })
            .collect::<Result<Vec<_>, _>>()
            .map(ItemKey)
    }

    /// Human-readable identification of `item`, even when its key is incomplete.
    pub fn describe(&self, item: &Item) -> String {
        match self.extract(item) {
            Ok(key) => key.to_string(),
            Err(err) => format!("<{err}>"),
        }
    }
}

/// Key attributes of one item, in schema order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemKey(Vec<(String, Value)>);

impl ItemKey {
    /// The key's `(attribute, value)` pairs.
    pub fn attributes(&self) -> &[(String, Value)] {
        &self.0
    }

    /// The key as a standalone item, as stores expect it in delete and cursor payloads.
    pub fn to_item(&self) -> Item {
        self.0.iter().cloned().collect()
    }
}

impl fmt::Display for ItemKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (name, value)) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, ",")?;
            }
            write!(f, "{name}={value}")?;
        }
        Ok(())
    }
}
