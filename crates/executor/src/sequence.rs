//! Sequential integer identifiers
//!
//! A logical type's sequence is the set of counter documents
//! `{DocumentType: "Sequence", SequenceType: <type>, Current: n}` in the
//! command's collection. The next value is the number of counters plus one.
//!
//! ## Strategies
//!
//! - `count`: the new counter gets a store-generated id. Two allocators
//!   that count concurrently both produce the same value.
//! - `reserve`: the counter is created under `Sequence.<type>.<n>` with id
//!   generation disabled. A conflict means `n` was taken; the count is
//!   re-read and the create retried, up to `sequence_max_attempts`.

use cosmosql_core::{
    CompareOp, Document, FeedOptions, Operand, Predicate, Projection, QuerySpec, SelectQuery,
    DOCUMENT_TYPE_KEY, ID_KEY, SEQUENCE_CURRENT_KEY, SEQUENCE_DOCUMENT_TYPE, SEQUENCE_TYPE_KEY,
};
use serde_json::Value;
use tracing::{info, warn};

use crate::config::SequenceStrategy;
use crate::context::ExecutionContext;
use crate::{Error, Result};

/// Allocates the next identifier for a logical type.
pub struct SequenceAllocator<'c, 'a> {
    ctx: &'c ExecutionContext<'a>,
}

impl<'c, 'a> SequenceAllocator<'c, 'a> {
    /// Create an allocator over a context.
    pub fn new(ctx: &'c ExecutionContext<'a>) -> Self {
        Self { ctx }
    }

    /// Allocate and persist the next value.
    ///
    /// # Errors
    ///
    /// Store failures propagate. Under the reserve strategy a conflict on
    /// the last allowed attempt is returned as the store's conflict error.
    pub fn allocate(&self, logical_type: &str) -> Result<i64> {
        match self.ctx.config().sequence_strategy {
            SequenceStrategy::Count => self.allocate_counted(logical_type),
            SequenceStrategy::Reserve => self.allocate_reserved(logical_type),
        }
    }

    /// Number of counters already persisted for a logical type.
    pub fn current(&self, logical_type: &str) -> Result<i64> {
        // Counters are not record documents: no discrimination here
        let spec = QuerySpec::new(counter_query().render())
            .with_parameter(
                DOCUMENT_TYPE_KEY,
                Value::String(SEQUENCE_DOCUMENT_TYPE.to_string()),
            )
            .with_parameter(SEQUENCE_TYPE_KEY, Value::String(logical_type.to_string()));
        let page = self
            .ctx
            .first_page(spec, FeedOptions::with_max_item_count(1))?;
        Ok(page.first().and_then(Value::as_i64).unwrap_or(0))
    }

    fn allocate_counted(&self, logical_type: &str) -> Result<i64> {
        let next = self.next_value(logical_type)?;
        let response = self.ctx.create(counter_document(logical_type, next, None), false)?;

        let persisted = response
            .resource
            .as_ref()
            .and_then(|doc| doc.get(SEQUENCE_CURRENT_KEY))
            .and_then(Value::as_i64);
        if persisted != Some(next) {
            warn!(
                target: "cosmosql::sequence",
                logical_type,
                expected = next,
                persisted = ?persisted,
                "sequence counter does not hold the allocated value"
            );
        }
        info!(target: "cosmosql::sequence", logical_type, value = next, "sequence allocated");
        Ok(next)
    }

    fn allocate_reserved(&self, logical_type: &str) -> Result<i64> {
        let max_attempts = self.ctx.config().sequence_max_attempts.max(1);
        let mut attempt = 1;
        loop {
            let next = self.next_value(logical_type)?;
            let id = reserved_id(logical_type, next);
            match self
                .ctx
                .create(counter_document(logical_type, next, Some(id)), true)
            {
                Ok(_) => {
                    info!(
                        target: "cosmosql::sequence",
                        logical_type,
                        value = next,
                        attempt,
                        "sequence reserved"
                    );
                    return Ok(next);
                }
                Err(Error::Store { source }) if source.is_conflict() && attempt < max_attempts => {
                    warn!(
                        target: "cosmosql::sequence",
                        logical_type,
                        value = next,
                        attempt,
                        "sequence value already reserved, retrying"
                    );
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }

    fn next_value(&self, logical_type: &str) -> Result<i64> {
        let current = self.current(logical_type)?;
        current
            .checked_add(1)
            .ok_or_else(|| Error::invalid_input(format!("sequence '{}' overflowed", logical_type)))
    }
}

/// `SELECT VALUE COUNT(1) FROM Sequence r WHERE r.DocumentType = @DocumentType AND r.SequenceType = @SequenceType`
fn counter_query() -> SelectQuery {
    let mut query =
        SelectQuery::from_source(SEQUENCE_DOCUMENT_TYPE, Some("r")).with_projection(Projection::Count);
    query.and(Predicate::eq_param(query.qualify(DOCUMENT_TYPE_KEY), DOCUMENT_TYPE_KEY));
    query.and(Predicate::Compare {
        path: query.qualify(SEQUENCE_TYPE_KEY),
        op: CompareOp::Eq,
        operand: Operand::param(SEQUENCE_TYPE_KEY),
    });
    query
}

/// Deterministic counter id used by the reserve strategy.
pub fn reserved_id(logical_type: &str, value: i64) -> String {
    format!("{}.{}.{}", SEQUENCE_DOCUMENT_TYPE, logical_type, value)
}

fn counter_document(logical_type: &str, value: i64, id: Option<String>) -> Document {
    let mut document = Document::new();
    document.insert(
        DOCUMENT_TYPE_KEY.to_string(),
        Value::String(SEQUENCE_DOCUMENT_TYPE.to_string()),
    );
    document.insert(
        SEQUENCE_TYPE_KEY.to_string(),
        Value::String(logical_type.to_string()),
    );
    document.insert(SEQUENCE_CURRENT_KEY.to_string(), Value::from(value));
    if let Some(id) = id {
        document.insert(ID_KEY.to_string(), Value::String(id));
    }
    document
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counter_query_text() {
        assert_eq!(
            counter_query().render(),
            "SELECT VALUE COUNT(1) FROM Sequence r WHERE r.DocumentType = @DocumentType AND r.SequenceType = @SequenceType"
        );
    }

    #[test]
    fn counter_document_shape() {
        let doc = counter_document("User", 3, None);
        let keys: Vec<_> = doc.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["DocumentType", "SequenceType", "Current"]);
        let doc = counter_document("User", 3, Some(reserved_id("User", 3)));
        assert_eq!(doc["id"], Value::String("Sequence.User.3".into()));
    }
}
