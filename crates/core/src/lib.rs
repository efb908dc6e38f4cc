//! Functional core of the copy-data replication engine.
//!
//! Pure data and functions only: the item model, the store interface,
//! sanitizers, table specs, run reports, retry arithmetic and the table
//! catalog. All I/O lives in the `copydata` crate.

pub mod catalog;
pub mod item;
pub mod replication;
pub mod retry;
pub mod sanitize;
pub mod storage;
