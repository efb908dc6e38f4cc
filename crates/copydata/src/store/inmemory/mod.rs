//! In-memory storage backend for testing.
//!
//! Tables live in `BTreeMap`s behind an `Arc<RwLock<_>>`, so clones share
//! state. Scan page size and scripted failures make pagination and
//! partial-failure behavior reproducible without a real store.
//!
//! # Example
//!
//! ```rust,ignore
//! use copydata::store::inmemory::{Fault, InMemoryStore};
//!
//! let store = InMemoryStore::new().with_page_size(25);
//! store.create_table("dev-users", KeySchema::partition("userId")).await;
//! store.inject(Fault::scan("dev-users", StoreError::Throttled("x".into())).times(2)).await;
//! ```

mod store;

pub use store::{Fault, InMemoryStore};
