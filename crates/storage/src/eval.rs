//! Query evaluation over in-memory documents
//!
//! Evaluates a parsed [`SelectQuery`] against a snapshot of a collection:
//! filter, then order, then `TOP`, then projection. Paths are resolved
//! relative to the query root (`r.Name` with root `r` reads `Name`).
//!
//! Comparison follows document-database rules: values of different JSON
//! types never compare, and an undefined path makes the predicate false.
//! Raw predicates are not evaluated.

use std::cmp::Ordering;

use cosmosql_core::{
    get_path, CompareOp, Document, Operand, Predicate, Projection, QuerySpec, SelectQuery,
    StoreError, StoreResult,
};
use serde_json::Value;

/// Run a query over documents in collection order.
pub fn evaluate(
    query: &SelectQuery,
    spec: &QuerySpec,
    documents: &[Document],
) -> StoreResult<Vec<Value>> {
    let mut matched = Vec::new();
    for document in documents {
        if matches(query, spec, document)? {
            matched.push(document);
        }
    }

    if !query.order_by.is_empty() {
        // Stable sort keeps collection order among equal keys
        matched.sort_by(|a, b| {
            for item in &query.order_by {
                let left = resolve(query, a, &item.path);
                let right = resolve(query, b, &item.path);
                let ordering = order_values(left.as_ref(), right.as_ref());
                let ordering = if item.descending {
                    ordering.reverse()
                } else {
                    ordering
                };
                if ordering != Ordering::Equal {
                    return ordering;
                }
            }
            Ordering::Equal
        });
    }

    if let Projection::Count = query.projection {
        return Ok(vec![Value::from(matched.len() as u64)]);
    }

    if let Some(top) = query.top {
        matched.truncate(usize::try_from(top).unwrap_or(usize::MAX));
    }

    let mut out = Vec::with_capacity(matched.len());
    for document in matched {
        if let Some(value) = project(query, document)? {
            out.push(value);
        }
    }
    Ok(out)
}

fn matches(query: &SelectQuery, spec: &QuerySpec, document: &Document) -> StoreResult<bool> {
    for predicate in &query.filter {
        let hit = match predicate {
            Predicate::Compare { path, op, operand } => {
                let left = resolve(query, document, path);
                let right = operand_value(spec, operand);
                match (left, right) {
                    (Some(l), Some(r)) => compare(&l, *op, &r),
                    _ => false,
                }
            }
            Predicate::In { path, values } => match resolve(query, document, path) {
                Some(left) => values
                    .iter()
                    .filter_map(|v| operand_value(spec, v))
                    .any(|right| compare(&left, CompareOp::Eq, &right)),
                None => false,
            },
            Predicate::Raw(text) => {
                return Err(StoreError::BadRequest(format!(
                    "unsupported condition '{}'",
                    text
                )))
            }
        };
        if !hit {
            return Ok(false);
        }
    }
    Ok(true)
}

fn project(query: &SelectQuery, document: &Document) -> StoreResult<Option<Value>> {
    match &query.projection {
        Projection::All => Ok(Some(Value::Object(document.clone()))),
        Projection::Value(expr) => {
            ensure_path(query, expr)?;
            // Undefined values are left out of a VALUE feed
            Ok(resolve(query, document, expr))
        }
        Projection::Fields(fields) => {
            let mut row = Document::new();
            for field in fields {
                let (path, name) = split_alias(field);
                ensure_path(query, path)?;
                if let Some(value) = resolve(query, document, path) {
                    row.insert(name.to_string(), value);
                }
            }
            Ok(Some(Value::Object(row)))
        }
        Projection::Count => Ok(None),
    }
}

/// `r.Email AS mail` yields (`r.Email`, `mail`); `r.Email` yields (`r.Email`, `Email`).
fn split_alias(field: &str) -> (&str, &str) {
    let words: Vec<&str> = field.split_whitespace().collect();
    match words.as_slice() {
        [path, kw, alias] if kw.eq_ignore_ascii_case("AS") => (path, alias),
        _ => {
            let path = field.trim();
            let name = path.rsplit('.').next().unwrap_or(path);
            (path, name)
        }
    }
}

fn ensure_path(query: &SelectQuery, expr: &str) -> StoreResult<()> {
    if expr == query.root() || query.relative(expr).is_some() {
        Ok(())
    } else {
        Err(StoreError::BadRequest(format!(
            "unsupported projection '{}'",
            expr
        )))
    }
}

fn resolve(query: &SelectQuery, document: &Document, path: &str) -> Option<Value> {
    if path == query.root() {
        return Some(Value::Object(document.clone()));
    }
    let relative = query.relative(path)?;
    get_path(document, relative).cloned()
}

fn operand_value(spec: &QuerySpec, operand: &Operand) -> Option<Value> {
    match operand {
        Operand::Param(name) => spec.parameter(name).cloned(),
        Operand::Literal(value) => Some(value.clone()),
    }
}

fn compare(left: &Value, op: CompareOp, right: &Value) -> bool {
    let ordering = match (left, right) {
        (Value::Number(l), Value::Number(r)) => match (l.as_i64(), r.as_i64()) {
            (Some(l), Some(r)) => Some(l.cmp(&r)),
            _ => l
                .as_f64()
                .zip(r.as_f64())
                .and_then(|(l, r)| l.partial_cmp(&r)),
        },
        (Value::String(l), Value::String(r)) => Some(l.cmp(r)),
        (Value::Bool(l), Value::Bool(r)) => Some(l.cmp(r)),
        (Value::Null, Value::Null) => Some(Ordering::Equal),
        (l, r) if l == r => Some(Ordering::Equal),
        _ => None,
    };
    let Some(ordering) = ordering else {
        return false;
    };
    match op {
        CompareOp::Eq => ordering == Ordering::Equal,
        CompareOp::Ne => ordering != Ordering::Equal,
        CompareOp::Lt => ordering == Ordering::Less,
        CompareOp::Le => ordering != Ordering::Greater,
        CompareOp::Gt => ordering == Ordering::Greater,
        CompareOp::Ge => ordering != Ordering::Less,
    }
}

fn type_rank(value: Option<&Value>) -> u8 {
    match value {
        None => 0,
        Some(Value::Null) => 1,
        Some(Value::Bool(_)) => 2,
        Some(Value::Number(_)) => 3,
        Some(Value::String(_)) => 4,
        Some(Value::Array(_)) => 5,
        Some(Value::Object(_)) => 6,
    }
}

/// Total order used by ORDER BY: undefined < null < bool < number < string.
fn order_values(left: Option<&Value>, right: Option<&Value>) -> Ordering {
    let rank = type_rank(left).cmp(&type_rank(right));
    if rank != Ordering::Equal {
        return rank;
    }
    match (left, right) {
        (Some(Value::Bool(l)), Some(Value::Bool(r))) => l.cmp(r),
        (Some(Value::Number(l)), Some(Value::Number(r))) => {
            let l = l.as_f64().unwrap_or(0.0);
            let r = r.as_f64().unwrap_or(0.0);
            l.partial_cmp(&r).unwrap_or(Ordering::Equal)
        }
        (Some(Value::String(l)), Some(Value::String(r))) => l.cmp(r),
        _ => Ordering::Equal,
    }
}
