//! Surrogate key resolution
//!
//! Update and delete address documents by `id`. When the command binds only
//! a business identifier field, the store id is looked up with
//! `SELECT VALUE r.id FROM <collection> r WHERE r.<IdField> = @<IdField>`,
//! narrowed by `DocumentType` when discrimination is active.

use cosmosql_core::{bind_name, ParamValue, Predicate, Projection, QueryParameter, SelectQuery, ID_KEY};
use serde_json::Value;
use tracing::debug;

use crate::context::ExecutionContext;
use crate::Result;

/// Resolve the store id of the first document whose `id_field` equals `value`.
///
/// Returns `None` when nothing matches.
pub fn resolve_id(
    ctx: &ExecutionContext<'_>,
    id_field: &str,
    value: &ParamValue,
) -> Result<Option<String>> {
    let query = lookup_query(&ctx.collection().collection, id_field);
    let parameters = [QueryParameter {
        name: bind_name(id_field),
        value: value.to_json(),
    }];
    let spec = ctx.prepare(query, &parameters);
    let ids = ctx.drain(spec, ctx.default_feed_options(), Some(1))?;
    let id = ids.into_iter().find_map(|v| match v {
        Value::String(s) => Some(s),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    });
    debug!(target: "cosmosql::command", id_field, resolved = ?id, "surrogate lookup");
    Ok(id)
}

fn lookup_query(collection: &str, id_field: &str) -> SelectQuery {
    let mut query = SelectQuery::from_source(collection, Some("r"));
    query.projection = Projection::Value(query.qualify(ID_KEY));
    query.and(Predicate::eq_param(query.qualify(id_field), id_field));
    query
}
