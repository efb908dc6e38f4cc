//! DynamoDB storage backend implementation.
//!
//! Provides a DynamoDB-based implementation of the `TableStore` trait using
//! `aws-sdk-dynamodb`, plus client construction per environment.

mod client;
mod conversions;
mod error;
mod store;

pub use client::{create_client, check_connection};
pub use store::DynamoDbStore;
