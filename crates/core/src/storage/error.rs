use thiserror::Error;

/// Errors that can occur during store operations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("Table not found: {0}")]
    TableNotFound(String),
    #[error("Item already exists: {0}")]
    AlreadyExists(String),
    #[error("Throttled: {0}")]
    Throttled(String),
    #[error("Operation timed out after {0}ms")]
    Timeout(u64),
    #[error("Transient failure: {0}")]
    Transient(String),
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),
    #[error("Request failed: {0}")]
    RequestFailed(String),
    #[error("Invalid data: {0}")]
    InvalidData(String),
}

impl StoreError {
    /// Whether repeating the same request may succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::Throttled(_) | Self::Timeout(_) | Self::Transient(_) | Self::ConnectionFailed(_)
        )
    }
}

/// Result type for store operations.
pub type Result<T> = std::result::Result<T, StoreError>;
