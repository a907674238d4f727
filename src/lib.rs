//! CosmoSQL - relational-style commands over a document database
//!
//! CosmoSQL lets code written against a relational command model
//! (`INSERT`, `UPDATE`, `DELETE`, `SELECT` with named parameters) run
//! against a document store. Parameters become document fields, business
//! identifiers map onto the store's `id`, integer identifiers come from
//! counter documents, and page-number paging is translated onto the
//! store's cursor feeds.
//!
//! # Quick Start
//!
//! ```ignore
//! use std::sync::Arc;
//! use cosmosql::{Connection, ConnectionConfig, MemoryStore};
//!
//! let store = Arc::new(MemoryStore::new());
//! let connection = Connection::open(store, ConnectionConfig::for_database("app"))?;
//!
//! connection
//!     .create_command()
//!     .with_collection("Users")
//!     .with_id_field("Email")
//!     .with_text("INSERT Users (Users.Name, Users.Email) VALUES (@Name, @Email)")
//!     .with_parameter("Users.Name", "Ann")
//!     .with_parameter("Users.Email", "a@b.com")
//!     .execute_non_query()?;
//! ```
//!
//! # Architecture
//!
//! Commands run through the executor, which talks to any
//! [`DocumentStore`]. [`MemoryStore`] is an in-process store with the same
//! contract, used for tests and embedding.

// Re-export the public API from cosmosql-executor
pub use cosmosql_executor::*;

// In-process store
pub use cosmosql_storage::{MemoryStore, StoreStats};
