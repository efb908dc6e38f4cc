use crate::item::Item;

/// Opaque continuation token returned by a scan.
///
/// Only valid for the scan of the table that produced it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cursor(Item);

impl Cursor {
    /// Wraps the store's continuation payload.
    pub fn new(payload: Item) -> Self {
        Self(payload)
    }

    /// The store's continuation payload.
    pub fn payload(&self) -> &Item {
        &self.0
    }
}

/// One page of a scan.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Page {
    pub items: Vec<Item>,
    pub next: Option<Cursor>,
}

impl Page {
    /// The final page of a scan.
    pub fn last(items: Vec<Item>) -> Self {
        Self { items, next: None }
    }

    /// A page followed by more pages.
    pub fn with_next(items: Vec<Item>, next: Cursor) -> Self {
        Self {
            items,
            next: Some(next),
        }
    }
}
