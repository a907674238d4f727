//! Core types and traits for cosmosql
//!
//! This crate defines the foundational types used throughout the system:
//! - ParamValue / ValueKind: bind values classified at bind time
//! - Parameter / ParameterSet: ordered named parameters
//! - Document: ordered JSON object plus reserved field names
//! - SelectQuery: structured SELECT model (parse, rewrite, render)
//! - DocumentStore / FeedCursor: store capability traits
//! - StoreError: errors reported by stores

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod document;
pub mod error;
pub mod parameter;
pub mod query;
pub mod store;
pub mod value;

pub use document::{
    document_id, get_path, Document, DOCUMENT_TYPE_KEY, ID_KEY, SEQUENCE_CURRENT_KEY,
    SEQUENCE_DOCUMENT_TYPE, SEQUENCE_TYPE_KEY,
};
pub use error::{QueryError, StoreError, StoreResult};
pub use parameter::{bind_name, Parameter, ParameterSet};
pub use query::{
    quote, CompareOp, Operand, OrderItem, Predicate, Projection, SelectQuery, PROJECTION_MARKER,
};
pub use store::{
    CollectionRef, DocumentRef, DocumentStore, FeedCursor, FeedOptions, FeedPage, QueryParameter,
    QuerySpec, Response, StatusCode,
};
pub use value::{ParamValue, ValueKind};
