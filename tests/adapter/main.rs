//! Adapter Tests
//!
//! End-to-end command flows through the public `cosmosql` API:
//! - Record lifecycle (insert, read, update, delete)
//! - Shared collections (type discrimination with integer sequences)
//! - Page-number paging over cursor feeds
//! - Configuration files and connection strings

mod common;

mod configuration;
mod lifecycle;
mod paging;
mod shared_collection;
