use thiserror::Error;

/// Errors raised while resolving an item's key.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum KeyError {
    #[error("Missing key attribute '{0}'")]
    MissingAttribute(String),
}
