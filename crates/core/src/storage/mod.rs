mod error;
mod traits;
mod types;

pub use error::{Result, StoreError};
pub use traits::TableStore;
pub use types::{Cursor, Page};
