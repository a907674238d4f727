//! Per-execution store access
//!
//! An [`ExecutionContext`] bundles what one command execution needs to
//! talk to the store: the store itself, the target collection, the
//! connection config, the type discriminator and the cancel token. Every
//! store call and every feed page goes through it, so cancellation and
//! discrimination are applied in one place.

use cosmosql_core::{
    CollectionRef, Document, DocumentStore, FeedCursor, FeedOptions, QueryParameter, QuerySpec,
    Response, SelectQuery,
};
use serde_json::Value;
use tracing::debug;

use crate::cancel::CancelToken;
use crate::config::ConnectionConfig;
use crate::discriminator::TypeDiscriminator;
use crate::Result;

/// Store access for one command execution.
pub struct ExecutionContext<'a> {
    store: &'a dyn DocumentStore,
    collection: CollectionRef,
    config: &'a ConnectionConfig,
    discriminator: TypeDiscriminator,
    cancel: &'a CancelToken,
}

impl<'a> ExecutionContext<'a> {
    /// Create a context.
    pub fn new(
        store: &'a dyn DocumentStore,
        collection: CollectionRef,
        config: &'a ConnectionConfig,
        discriminator: TypeDiscriminator,
        cancel: &'a CancelToken,
    ) -> Self {
        Self {
            store,
            collection,
            config,
            discriminator,
            cancel,
        }
    }

    /// Target collection.
    pub fn collection(&self) -> &CollectionRef {
        &self.collection
    }

    /// Connection config.
    pub fn config(&self) -> &ConnectionConfig {
        self.config
    }

    /// Type discriminator for this command.
    pub fn discriminator(&self) -> &TypeDiscriminator {
        &self.discriminator
    }

    /// Feed options for a full, non-paged read.
    pub fn default_feed_options(&self) -> FeedOptions {
        FeedOptions {
            max_item_count: self.config.max_item_count,
            continuation: None,
        }
    }

    /// Narrow, render and bind a query.
    pub fn prepare(&self, mut query: SelectQuery, parameters: &[QueryParameter]) -> QuerySpec {
        self.discriminator.narrow(&mut query);
        let mut spec = QuerySpec::new(query.render());
        for parameter in parameters {
            spec.push(&parameter.name, parameter.value.clone());
        }
        self.discriminator.bind(&mut spec);
        spec
    }

    /// Create a document.
    pub fn create(&self, document: Document, disable_id_generation: bool) -> Result<Response> {
        self.cancel.check()?;
        Ok(self
            .store
            .create_document(&self.collection, document, disable_id_generation)?)
    }

    /// Upsert a document.
    pub fn upsert(&self, document: Document, disable_id_generation: bool) -> Result<Response> {
        self.cancel.check()?;
        Ok(self
            .store
            .upsert_document(&self.collection, document, disable_id_generation)?)
    }

    /// Delete a document by id.
    pub fn delete(&self, id: &str) -> Result<Response> {
        self.cancel.check()?;
        Ok(self.store.delete_document(&self.collection.document(id))?)
    }

    /// Open a feed.
    pub fn open(&self, spec: QuerySpec, options: FeedOptions) -> Result<Box<dyn FeedCursor>> {
        self.cancel.check()?;
        debug!(target: "cosmosql::command", collection = %self.collection, query = %spec.text, "query");
        Ok(self.store.query_documents(&self.collection, spec, options)?)
    }

    /// Read only the first page of a feed.
    pub fn first_page(&self, spec: QuerySpec, options: FeedOptions) -> Result<Vec<Value>> {
        let mut cursor = self.open(spec, options)?;
        if !cursor.has_more() {
            return Ok(Vec::new());
        }
        self.cancel.check()?;
        Ok(cursor.fetch_next()?.items)
    }

    /// Drain a feed in order, stopping early once `limit` items are held.
    pub fn drain(
        &self,
        spec: QuerySpec,
        options: FeedOptions,
        limit: Option<usize>,
    ) -> Result<Vec<Value>> {
        let mut cursor = self.open(spec, options)?;
        let mut items = Vec::new();
        while cursor.has_more() {
            if limit.map_or(false, |limit| items.len() >= limit) {
                break;
            }
            self.cancel.check()?;
            items.extend(cursor.fetch_next()?.items);
        }
        if let Some(limit) = limit {
            items.truncate(limit);
        }
        Ok(items)
    }
}
