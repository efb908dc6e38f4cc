//! copy-data: replicates the expense application's tables from one
//! environment into another, sanitizing sensitive records on the way.

pub mod config;
pub mod engine;
pub mod output;
pub mod store;
