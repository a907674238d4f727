//! # CosmoSQL Executor
//!
//! Runs SQL-like commands against a document store.
//!
//! This is the crate users import. It provides:
//! - [`Connection`] - a store handle plus its configuration
//! - [`Command`] - text, parameters and the collection they address
//! - [`DataReader`] - forward-only access to query rows
//!
//! ## Quick Start
//!
//! ```text
//! use cosmosql_executor::{Connection, ConnectionConfig};
//!
//! let connection = Connection::open(store, ConnectionConfig::for_database("app"))?;
//! let insert = connection
//!     .create_command()
//!     .with_collection("Users")
//!     .with_text("INSERT Users (Users.Name) VALUES (@Name)")
//!     .with_parameter("Users.Name", "Ann")
//!     .with_parameter("Users.id", "ann");
//! insert.execute_non_query()?;
//! ```
//!
//! ## Statements
//!
//! | Text starts with | Effect |
//! |------------------|--------|
//! | `INSERT` | create one document from the parameters |
//! | `UPDATE` | replace one document, found by `id` or the identifier field |
//! | `DELETE` | remove one document, found the same way |
//! | anything else | parsed as a SELECT and forwarded as a query |
//!
//! ## Paging
//!
//! Binding `@Page` (and optionally `@PerPage`) to a SELECT reads the
//! requested window in two passes: one for ids, one for the documents.

#![warn(missing_docs)]
#![warn(clippy::all)]

mod builder;
mod cancel;
mod command;
mod config;
mod connection;
mod connection_string;
mod context;
mod convert;
mod discriminator;
mod error;
mod executor;
mod paging;
mod reader;
mod sequence;
mod statement;
mod surrogate;
mod types;

// Test modules
#[cfg(test)]
mod tests;

// =============================================================================
// Public API - Everything users need is re-exported here
// =============================================================================

pub use builder::{BuiltDocument, DocumentBuilder};
pub use cancel::CancelToken;
pub use command::Command;
pub use config::{ConnectionConfig, SequenceStrategy, CONFIG_FILE_NAME};
pub use connection::{Connection, DbConnection};
pub use connection_string::ConnectionString;
pub use context::ExecutionContext;
pub use discriminator::{RecordType, TypeDiscriminator};
pub use error::{Error, Result};
pub use executor::CommandExecutor;
pub use paging::{is_paging_parameter, PageWindow, PagingTranslator, PAGE_PARAM, PER_PAGE_PARAM};
pub use reader::{DataReader, SCALAR_COLUMN};
pub use sequence::{reserved_id, SequenceAllocator};
pub use statement::StatementKind;
pub use surrogate::resolve_id;
pub use types::Affected;

// Re-export the store contract so users don't need cosmosql-core directly
pub use cosmosql_core::{
    CollectionRef, Document, DocumentRef, DocumentStore, FeedCursor, FeedOptions, FeedPage,
    ParamValue, Parameter, ParameterSet, QueryParameter, QuerySpec, Response, StatusCode,
    StoreError, StoreResult, ID_KEY,
};
