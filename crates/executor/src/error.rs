//! Error types for command execution.
//!
//! All errors from command execution are represented by the [`Error`] enum.
//! These errors are:
//! - **Structured**: Each variant has typed fields for error details
//! - **Serializable**: Can be converted to/from JSON
//! - **Lossless**: Store errors are carried unmodified

use cosmosql_core::StoreError;
use serde::{Deserialize, Serialize};

/// Result type for command execution
pub type Result<T> = std::result::Result<T, Error>;

/// Command execution errors.
///
/// # Categories
///
/// | Category | Variants | Description |
/// |----------|----------|-------------|
/// | Configuration | `Configuration` | Wrong connection kind, missing collection or record type, bad config |
/// | Data | `MissingIdentifier`, `InvalidInput`, `UnsupportedStatement` | Bad command or parameters |
/// | Store | `Store` | Failure reported by the document store |
/// | Control | `Cancelled` | The command was cancelled |
///
/// # Example
///
/// ```ignore
/// use cosmosql::{Command, Error};
///
/// match command.execute_non_query() {
///     Ok(affected) => println!("{} row(s)", affected.rows),
///     Err(Error::MissingIdentifier { field }) => {
///         println!("no document matches '{}'", field);
///     }
///     Err(e) => println!("Error: {}", e),
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, thiserror::Error)]
pub enum Error {
    // ==================== Configuration ====================
    /// Connection, command or configuration file is not usable
    #[error("configuration error: {reason}")]
    Configuration {
        /// What is wrong with the setup
        reason: String,
    },

    // ==================== Data Errors ====================
    /// An update could not resolve the document id from its identifier field
    #[error("missing identifier: no document id could be resolved from '{field}'")]
    MissingIdentifier {
        /// Identifier field that was unbound or matched nothing
        field: String,
    },

    /// Invalid parameter or query text
    #[error("invalid input: {reason}")]
    InvalidInput {
        /// Why the input was rejected
        reason: String,
    },

    /// The statement cannot be executed through the requested entry point
    #[error("unsupported statement: {reason}")]
    UnsupportedStatement {
        /// Entry point and statement kind involved
        reason: String,
    },

    // ==================== Store Errors ====================
    /// The document store rejected or failed the request
    #[error("store error: {source}")]
    Store {
        /// Error reported by the store, unmodified
        #[from]
        source: StoreError,
    },

    // ==================== Control ====================
    /// The command was cancelled before completion
    #[error("command cancelled")]
    Cancelled,
}

impl Error {
    /// Configuration error from any message.
    pub fn configuration(reason: impl Into<String>) -> Self {
        Error::Configuration {
            reason: reason.into(),
        }
    }

    /// Invalid input error from any message.
    pub fn invalid_input(reason: impl Into<String>) -> Self {
        Error::InvalidInput {
            reason: reason.into(),
        }
    }

    /// The store error behind this error, if any.
    pub fn store_error(&self) -> Option<&StoreError> {
        match self {
            Error::Store { source } => Some(source),
            _ => None,
        }
    }
}
