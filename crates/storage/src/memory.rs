//! MemoryStore: in-memory document store
//!
//! This module implements the DocumentStore trait using:
//! - `BTreeMap<String, Vec<Document>>` keyed by collection link
//! - `parking_lot::RwLock` for thread-safe access
//! - `AtomicU64` request counters
//!
//! # Design Notes
//!
//! - **Insertion order**: documents of a collection are kept in the order
//!   they were created; upsert replaces in place
//! - **Implicit collections**: a collection exists once written to;
//!   querying an unknown collection yields an empty feed
//! - **Materialized feeds**: a query snapshot is taken when the feed is
//!   opened, so later writes do not shift an open feed's pages

use std::collections::{BTreeMap, VecDeque};
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::{Mutex, RwLock};
use tracing::debug;
use uuid::Uuid;

use cosmosql_core::{
    document_id, CollectionRef, Document, DocumentRef, DocumentStore, FeedCursor, FeedOptions,
    QuerySpec, Response, SelectQuery, StatusCode, StoreError, StoreResult, ID_KEY,
};

use crate::eval::evaluate;
use crate::feed::MemoryFeed;

/// Snapshot of request counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StoreStats {
    /// `create_document` calls
    pub creates: u64,
    /// `upsert_document` calls
    pub upserts: u64,
    /// `delete_document` calls
    pub deletes: u64,
    /// `query_documents` calls
    pub queries: u64,
}

impl StoreStats {
    /// Total requests of any kind.
    pub fn total(&self) -> u64 {
        self.creates + self.upserts + self.deletes + self.queries
    }
}

#[derive(Debug, Default)]
struct Counters {
    creates: AtomicU64,
    upserts: AtomicU64,
    deletes: AtomicU64,
    queries: AtomicU64,
}

/// In-memory document store
///
/// Thread-safe through `parking_lot::RwLock`. Cheap to share behind an
/// `Arc`.
#[derive(Debug, Default)]
pub struct MemoryStore {
    /// Collection link → documents in insertion order
    collections: RwLock<BTreeMap<String, Vec<Document>>>,
    /// Request counters
    counters: Counters,
    /// Errors to return from the next requests, in order
    failures: Mutex<VecDeque<StoreError>>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the next request fail with `error`. Queued errors are consumed
    /// one per request.
    pub fn fail_next(&self, error: StoreError) {
        self.failures.lock().push_back(error);
    }

    /// Current request counters.
    pub fn stats(&self) -> StoreStats {
        StoreStats {
            creates: self.counters.creates.load(Ordering::Relaxed),
            upserts: self.counters.upserts.load(Ordering::Relaxed),
            deletes: self.counters.deletes.load(Ordering::Relaxed),
            queries: self.counters.queries.load(Ordering::Relaxed),
        }
    }

    /// All documents of a collection in insertion order.
    pub fn documents(&self, collection: &CollectionRef) -> Vec<Document> {
        self.collections
            .read()
            .get(&collection.to_string())
            .cloned()
            .unwrap_or_default()
    }

    /// A single document by id.
    pub fn get(&self, collection: &CollectionRef, id: &str) -> Option<Document> {
        self.collections
            .read()
            .get(&collection.to_string())
            .and_then(|docs| {
                docs.iter()
                    .find(|d| document_id(d).as_deref() == Some(id))
                    .cloned()
            })
    }

    /// Number of documents in a collection.
    pub fn len(&self, collection: &CollectionRef) -> usize {
        self.collections
            .read()
            .get(&collection.to_string())
            .map_or(0, Vec::len)
    }

    /// Whether a collection holds no documents.
    pub fn is_empty(&self, collection: &CollectionRef) -> bool {
        self.len(collection) == 0
    }

    fn take_failure(&self) -> StoreResult<()> {
        match self.failures.lock().pop_front() {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }

    /// Resolve the id of an incoming document, generating one if allowed.
    fn assign_id(document: &mut Document, disable_id_generation: bool) -> StoreResult<String> {
        if let Some(id) = document_id(document) {
            return Ok(id);
        }
        if disable_id_generation {
            return Err(StoreError::BadRequest(
                "document has no id and id generation is disabled".to_string(),
            ));
        }
        let id = Uuid::new_v4().hyphenated().to_string();
        document.insert(ID_KEY.to_string(), serde_json::Value::String(id.clone()));
        Ok(id)
    }
}

impl DocumentStore for MemoryStore {
    fn create_document(
        &self,
        collection: &CollectionRef,
        mut document: Document,
        disable_id_generation: bool,
    ) -> StoreResult<Response> {
        self.counters.creates.fetch_add(1, Ordering::Relaxed);
        self.take_failure()?;
        let id = Self::assign_id(&mut document, disable_id_generation)?;

        let mut collections = self.collections.write();
        let docs = collections.entry(collection.to_string()).or_default();
        if docs.iter().any(|d| document_id(d).as_deref() == Some(id.as_str())) {
            debug!(target: "cosmosql::store", %collection, %id, "create conflict");
            return Err(StoreError::Conflict {
                collection: collection.collection.clone(),
                id,
            });
        }
        docs.push(document.clone());
        debug!(target: "cosmosql::store", %collection, %id, "document created");
        Ok(Response::with_resource(StatusCode::Created, document))
    }

    fn upsert_document(
        &self,
        collection: &CollectionRef,
        mut document: Document,
        disable_id_generation: bool,
    ) -> StoreResult<Response> {
        self.counters.upserts.fetch_add(1, Ordering::Relaxed);
        self.take_failure()?;
        let id = Self::assign_id(&mut document, disable_id_generation)?;

        let mut collections = self.collections.write();
        let docs = collections.entry(collection.to_string()).or_default();
        let status = match docs
            .iter_mut()
            .find(|d| document_id(d).as_deref() == Some(id.as_str()))
        {
            Some(existing) => {
                *existing = document.clone();
                StatusCode::Ok
            }
            None => {
                docs.push(document.clone());
                StatusCode::Created
            }
        };
        debug!(target: "cosmosql::store", %collection, %id, status = status.code(), "document upserted");
        Ok(Response::with_resource(status, document))
    }

    fn delete_document(&self, document: &DocumentRef) -> StoreResult<Response> {
        self.counters.deletes.fetch_add(1, Ordering::Relaxed);
        self.take_failure()?;

        let mut collections = self.collections.write();
        let removed = collections
            .get_mut(&document.collection.to_string())
            .and_then(|docs| {
                docs.iter()
                    .position(|d| document_id(d).as_deref() == Some(document.id.as_str()))
                    .map(|index| docs.remove(index))
            });
        let status = if removed.is_some() {
            StatusCode::NoContent
        } else {
            StatusCode::NotFound
        };
        debug!(target: "cosmosql::store", %document, status = status.code(), "document delete");
        Ok(Response::empty(status))
    }

    fn query_documents(
        &self,
        collection: &CollectionRef,
        query: QuerySpec,
        options: FeedOptions,
    ) -> StoreResult<Box<dyn FeedCursor>> {
        self.counters.queries.fetch_add(1, Ordering::Relaxed);
        self.take_failure()?;

        let select = SelectQuery::parse(&query.text)?;
        let snapshot = self.documents(collection);
        let items = evaluate(&select, &query, &snapshot)?;
        debug!(
            target: "cosmosql::store",
            %collection,
            query = %query.text,
            results = items.len(),
            "query opened"
        );
        let feed = MemoryFeed::new(
            items,
            options.max_item_count,
            options.continuation.as_deref(),
        )?;
        Ok(Box::new(feed))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn users() -> CollectionRef {
        CollectionRef::new("app", "Users")
    }

    fn doc(value: serde_json::Value) -> Document {
        value.as_object().cloned().unwrap()
    }

    fn drain(mut cursor: Box<dyn FeedCursor>) -> Vec<serde_json::Value> {
        let mut out = Vec::new();
        while cursor.has_more() {
            out.extend(cursor.fetch_next().unwrap().items);
        }
        out
    }

    #[test]
    fn create_generates_ids_when_allowed() {
        let store = MemoryStore::new();
        let response = store
            .create_document(&users(), doc(json!({"Name": "a"})), false)
            .unwrap();
        assert_eq!(response.status, StatusCode::Created);
        let id = document_id(response.resource.as_ref().unwrap()).unwrap();
        assert!(Uuid::parse_str(&id).is_ok());
        assert!(store.get(&users(), &id).is_some());
    }

    #[test]
    fn create_without_id_and_generation_disabled_fails() {
        let store = MemoryStore::new();
        let err = store
            .create_document(&users(), doc(json!({"Name": "a"})), true)
            .unwrap_err();
        assert!(matches!(err, StoreError::BadRequest(_)));
        assert!(store.is_empty(&users()));
    }

    #[test]
    fn create_duplicate_conflicts() {
        let store = MemoryStore::new();
        store
            .create_document(&users(), doc(json!({"id": "1"})), true)
            .unwrap();
        let err = store
            .create_document(&users(), doc(json!({"id": "1"})), true)
            .unwrap_err();
        assert!(err.is_conflict());
        assert_eq!(store.len(&users()), 1);
    }

    #[test]
    fn upsert_replaces_in_place() {
        let store = MemoryStore::new();
        store
            .create_document(&users(), doc(json!({"id": "1", "v": 1})), true)
            .unwrap();
        store
            .create_document(&users(), doc(json!({"id": "2", "v": 2})), true)
            .unwrap();
        let r = store
            .upsert_document(&users(), doc(json!({"id": "1", "v": 10})), true)
            .unwrap();
        assert_eq!(r.status, StatusCode::Ok);
        let r = store
            .upsert_document(&users(), doc(json!({"id": "3", "v": 3})), true)
            .unwrap();
        assert_eq!(r.status, StatusCode::Created);

        let ids: Vec<_> = store
            .documents(&users())
            .iter()
            .map(|d| document_id(d).unwrap())
            .collect();
        assert_eq!(ids, vec!["1", "2", "3"]);
        assert_eq!(store.get(&users(), "1").unwrap()["v"], json!(10));
    }

    #[test]
    fn delete_reports_status() {
        let store = MemoryStore::new();
        store
            .create_document(&users(), doc(json!({"id": "1"})), true)
            .unwrap();
        let r = store.delete_document(&users().document("1")).unwrap();
        assert_eq!(r.status, StatusCode::NoContent);
        let r = store.delete_document(&users().document("1")).unwrap();
        assert_eq!(r.status, StatusCode::NotFound);
    }

    #[test]
    fn query_pages_through_results() {
        let store = MemoryStore::new();
        for i in 0..5 {
            store
                .create_document(&users(), doc(json!({"id": i.to_string(), "n": i})), true)
                .unwrap();
        }
        let spec = QuerySpec::new("SELECT VALUE r.n FROM Users r WHERE r.n >= @min")
            .with_parameter("min", json!(1));
        let cursor = store
            .query_documents(&users(), spec, FeedOptions::with_max_item_count(2))
            .unwrap();
        assert_eq!(drain(cursor), vec![json!(1), json!(2), json!(3), json!(4)]);
    }

    #[test]
    fn unknown_collection_is_empty_feed() {
        let store = MemoryStore::new();
        let cursor = store
            .query_documents(
                &CollectionRef::new("app", "Nope"),
                QuerySpec::new("SELECT * FROM c"),
                FeedOptions::default(),
            )
            .unwrap();
        assert!(drain(cursor).is_empty());
    }

    #[test]
    fn malformed_query_is_bad_request() {
        let store = MemoryStore::new();
        let err = store
            .query_documents(&users(), QuerySpec::new("DROP c"), FeedOptions::default())
            .err()
            .unwrap();
        assert!(matches!(err, StoreError::BadRequest(_)));
    }

    #[test]
    fn injected_failures_are_consumed_in_order() {
        let store = MemoryStore::new();
        store.fail_next(StoreError::Throttled { retry_after_ms: 5 });
        let err = store
            .create_document(&users(), doc(json!({"id": "1"})), true)
            .unwrap_err();
        assert!(err.is_transient());
        store
            .create_document(&users(), doc(json!({"id": "1"})), true)
            .unwrap();
        assert_eq!(store.stats().creates, 2);
        assert_eq!(store.stats().total(), 2);
    }
}
