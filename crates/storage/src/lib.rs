//! Storage layer for cosmosql
//!
//! This crate implements an in-memory document store with:
//! - MemoryStore: ordered documents per collection behind a RwLock
//! - Query evaluation over the structured SELECT model
//! - MemoryFeed: paged results with offset continuation tokens
//! - Request counters and failure injection for tests

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod eval;
pub mod feed;
pub mod memory;

pub use feed::{MemoryFeed, DEFAULT_MAX_ITEM_COUNT};
pub use memory::{MemoryStore, StoreStats};
