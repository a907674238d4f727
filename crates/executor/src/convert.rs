//! Error conversion from internal error types.
//!
//! This module provides conversions from parse and serialization errors to
//! the executor's [`Error`] type. Store errors convert through `#[from]`
//! on [`Error::Store`].

use cosmosql_core::QueryError;

use crate::Error;

/// Query text that fails to parse is caller input, not a store failure.
impl From<QueryError> for Error {
    fn from(err: QueryError) -> Self {
        match err {
            QueryError::Syntax { reason } => Error::InvalidInput {
                reason: format!("query syntax: {}", reason),
            },
        }
    }
}

/// Row deserialization failures surface as invalid input.
impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::InvalidInput {
            reason: format!("row does not match the requested shape: {}", err),
        }
    }
}
