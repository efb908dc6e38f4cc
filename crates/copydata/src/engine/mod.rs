//! Replication engine (Imperative Shell).
//!
//! Every phase talks to stores only through `TableStore`, so the whole
//! engine runs unchanged against DynamoDB or the in-memory store.

mod clearer;
mod orchestrator;
mod reader;
mod retry;
mod scan;
mod writer;

pub use clearer::{clear_all, ClearOutcome};
pub use orchestrator::{ParsePhaseOrderError, PhaseOrder, ReplicationOptions, Replicator};
pub use reader::read_all;
pub use retry::with_retry;
pub use writer::{write_all, WriteOutcome};
