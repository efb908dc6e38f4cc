//! Store backends implementing `copydata_core::storage::TableStore`.
//!
//! # Feature Flags
//!
//! - `dynamodb` (default): AWS DynamoDB backend using `aws-sdk-dynamodb`
//!
//! The in-memory backend is always available and backs the test suite.

#[cfg(feature = "dynamodb")]
pub mod dynamodb;
pub mod inmemory;
