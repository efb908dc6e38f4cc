mod error;
mod key;
mod types;

pub use error::KeyError;
pub use key::{ItemKey, KeySchema};
pub use types::{Item, Value};
