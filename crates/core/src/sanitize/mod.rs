mod error;
mod registry;
mod transform;

pub use error::TransformError;
pub use registry::SanitizerRegistry;
pub use transform::{Exclusion, Transform, TransformResult};
