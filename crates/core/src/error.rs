//! Error types shared by store implementations
//!
//! This module defines the errors a document store reports and the errors
//! raised while parsing query text. We use `thiserror` for automatic
//! `Display` and `Error` trait implementations.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type alias for store operations
pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// Errors reported by a document store
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Error)]
pub enum StoreError {
    /// A document with the same id already exists
    #[error("Conflict: document '{id}' already exists in '{collection}'")]
    Conflict {
        /// Target collection
        collection: String,
        /// Conflicting id
        id: String,
    },

    /// Collection or document does not exist
    #[error("Not found: {0}")]
    NotFound(String),

    /// The request was rejected as malformed
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// The store asked the caller to back off
    #[error("Request rate too large, retry after {retry_after_ms} ms")]
    Throttled {
        /// Suggested back-off
        retry_after_ms: u64,
    },

    /// Connectivity failure between client and store
    #[error("Transport error: {0}")]
    Transport(String),

    /// A document or result could not be (de)serialized
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl StoreError {
    /// Whether this error is a create conflict.
    pub fn is_conflict(&self) -> bool {
        matches!(self, StoreError::Conflict { .. })
    }

    /// Whether retrying the same request may succeed.
    pub fn is_transient(&self) -> bool {
        matches!(self, StoreError::Throttled { .. } | StoreError::Transport(_))
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(e: serde_json::Error) -> Self {
        StoreError::Serialization(e.to_string())
    }
}

impl From<QueryError> for StoreError {
    fn from(e: QueryError) -> Self {
        StoreError::BadRequest(e.to_string())
    }
}

/// Errors raised while parsing query text
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Error)]
pub enum QueryError {
    /// The text is not a SELECT of the accepted shape
    #[error("Syntax error: {reason}")]
    Syntax {
        /// What was wrong
        reason: String,
    },
}

impl QueryError {
    /// Build a syntax error.
    pub fn syntax(reason: impl Into<String>) -> Self {
        QueryError::Syntax {
            reason: reason.into(),
        }
    }
}
