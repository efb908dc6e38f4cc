mod error;
mod result;
mod spec;

pub use error::{PageFetchError, PlanError};
pub use result::{
    FailureKind, ItemFailure, Phase, ReplicationReport, ReplicationResult, TableStatus, Totals,
};
pub use spec::{ReplicationPlan, TableSpec};
