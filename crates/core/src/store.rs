//! Document store capability surface
//!
//! The adapter never talks to a concrete client. It consumes a
//! [`DocumentStore`] for single-document writes and a [`FeedCursor`] for
//! paged query results. Implementations must be safe to share across
//! threads (`Send + Sync`); a cursor is owned by one command at a time.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::document::Document;
use crate::error::StoreResult;

/// Address of a collection inside a database.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CollectionRef {
    /// Database name
    pub database: String,
    /// Collection name
    pub collection: String,
}

impl CollectionRef {
    /// Create a collection address.
    pub fn new(database: impl Into<String>, collection: impl Into<String>) -> Self {
        Self {
            database: database.into(),
            collection: collection.into(),
        }
    }

    /// Address of a document in this collection.
    pub fn document(&self, id: impl Into<String>) -> DocumentRef {
        DocumentRef {
            collection: self.clone(),
            id: id.into(),
        }
    }
}

impl fmt::Display for CollectionRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "dbs/{}/colls/{}", self.database, self.collection)
    }
}

/// Address of a single document.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DocumentRef {
    /// Owning collection
    pub collection: CollectionRef,
    /// Document id
    pub id: String,
}

impl fmt::Display for DocumentRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/docs/{}", self.collection, self.id)
    }
}

/// Status reported by a document operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StatusCode {
    /// 200
    Ok,
    /// 201
    Created,
    /// 204
    NoContent,
    /// 404
    NotFound,
    /// 409
    Conflict,
    /// Any other status
    Other(u16),
}

impl StatusCode {
    /// Numeric HTTP-style code.
    pub fn code(self) -> u16 {
        match self {
            StatusCode::Ok => 200,
            StatusCode::Created => 201,
            StatusCode::NoContent => 204,
            StatusCode::NotFound => 404,
            StatusCode::Conflict => 409,
            StatusCode::Other(code) => code,
        }
    }

    /// Map a numeric code onto a status.
    pub fn from_code(code: u16) -> Self {
        match code {
            200 => StatusCode::Ok,
            201 => StatusCode::Created,
            204 => StatusCode::NoContent,
            404 => StatusCode::NotFound,
            409 => StatusCode::Conflict,
            other => StatusCode::Other(other),
        }
    }

    /// `Ok`, `Created` and `NoContent` count as success.
    pub fn is_success(self) -> bool {
        matches!(
            self,
            StatusCode::Ok | StatusCode::Created | StatusCode::NoContent
        )
    }
}

/// Result of a single-document operation.
#[derive(Debug, Clone, PartialEq)]
pub struct Response {
    /// Operation status
    pub status: StatusCode,
    /// The document as persisted, when the store returns it
    pub resource: Option<Document>,
}

impl Response {
    /// Response carrying a document.
    pub fn with_resource(status: StatusCode, resource: Document) -> Self {
        Self {
            status,
            resource: Some(resource),
        }
    }

    /// Response without a body.
    pub fn empty(status: StatusCode) -> Self {
        Self {
            status,
            resource: None,
        }
    }
}

/// A named query parameter as sent to the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryParameter {
    /// `@`-prefixed name
    pub name: String,
    /// JSON value
    pub value: serde_json::Value,
}

/// Query text plus its parameters.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QuerySpec {
    /// Query text
    pub text: String,
    /// Parameters in binding order
    pub parameters: Vec<QueryParameter>,
}

impl QuerySpec {
    /// Query without parameters.
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            parameters: Vec::new(),
        }
    }

    /// Append a parameter. The name is normalized to its `@` form.
    pub fn with_parameter(mut self, name: &str, value: serde_json::Value) -> Self {
        self.push(name, value);
        self
    }

    /// Append a parameter in place, replacing an existing one of the same name.
    pub fn push(&mut self, name: &str, value: serde_json::Value) {
        let name = crate::parameter::bind_name(name);
        match self.parameters.iter_mut().find(|p| p.name == name) {
            Some(existing) => existing.value = value,
            None => self.parameters.push(QueryParameter { name, value }),
        }
    }

    /// Look up a parameter value by name, with or without `@`.
    pub fn parameter(&self, name: &str) -> Option<&serde_json::Value> {
        let name = crate::parameter::bind_name(name);
        self.parameters
            .iter()
            .find(|p| p.name == name)
            .map(|p| &p.value)
    }
}

/// Options controlling a query feed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedOptions {
    /// Maximum items per page; `None` lets the store decide
    pub max_item_count: Option<usize>,
    /// Resume from this continuation token
    pub continuation: Option<String>,
}

impl FeedOptions {
    /// Options with a page size.
    pub fn with_max_item_count(max_item_count: usize) -> Self {
        Self {
            max_item_count: Some(max_item_count),
            continuation: None,
        }
    }
}

/// One page of a query feed.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FeedPage {
    /// Result items in feed order
    pub items: Vec<serde_json::Value>,
    /// Token for the next page, `None` on the last page
    pub continuation: Option<String>,
}

/// Forward-only cursor over a paged query result.
pub trait FeedCursor: Send {
    /// Whether another page may be fetched.
    fn has_more(&self) -> bool;

    /// Fetch the next page.
    ///
    /// # Errors
    ///
    /// Returns an error if the store fails to produce the page.
    fn fetch_next(&mut self) -> StoreResult<FeedPage>;
}

/// Document store abstraction
///
/// Thread safety: all methods must be safe to call concurrently from
/// multiple threads (requires Send + Sync).
pub trait DocumentStore: Send + Sync {
    /// Create a document.
    ///
    /// With `disable_id_generation` unset the store assigns an id to a
    /// document that has none.
    ///
    /// # Errors
    ///
    /// [`StoreError::Conflict`](crate::StoreError::Conflict) when the id
    /// is already taken.
    fn create_document(
        &self,
        collection: &CollectionRef,
        document: Document,
        disable_id_generation: bool,
    ) -> StoreResult<Response>;

    /// Insert or replace a document by id.
    ///
    /// # Errors
    ///
    /// Returns an error if the store rejects the write.
    fn upsert_document(
        &self,
        collection: &CollectionRef,
        document: Document,
        disable_id_generation: bool,
    ) -> StoreResult<Response>;

    /// Delete a document. A missing document is reported through the
    /// response status, not as an error.
    ///
    /// # Errors
    ///
    /// Returns an error if the store fails to process the request.
    fn delete_document(&self, document: &DocumentRef) -> StoreResult<Response>;

    /// Open a feed over the results of a query.
    ///
    /// # Errors
    ///
    /// Returns an error if the query is rejected.
    fn query_documents(
        &self,
        collection: &CollectionRef,
        query: QuerySpec,
        options: FeedOptions,
    ) -> StoreResult<Box<dyn FeedCursor>>;
}
