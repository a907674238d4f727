//! Type discrimination
//!
//! Several logical record types may share one physical collection. When a
//! command declares a record type whose name differs from the collection,
//! documents carry a `DocumentType` field and every query is narrowed by
//! `<root>.DocumentType = @DocumentType`.

use cosmosql_core::{
    CompareOp, Document, Operand, Predicate, QuerySpec, SelectQuery, DOCUMENT_TYPE_KEY,
};
use serde::{Deserialize, Serialize};

/// A declared record type.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RecordType {
    name: String,
    document_type: String,
}

impl RecordType {
    /// Record type of a Rust type, named by [`std::any::type_name`].
    pub fn of<T: ?Sized>() -> Self {
        Self::named(std::any::type_name::<T>())
    }

    /// Record type from a type name.
    pub fn named(name: impl Into<String>) -> Self {
        let name = name.into();
        let document_type = simple_name(&name).to_string();
        Self {
            name,
            document_type,
        }
    }

    /// The name as declared.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The derived `DocumentType` value.
    pub fn document_type(&self) -> &str {
        &self.document_type
    }
}

/// Strip module path, generic arguments and a backtick arity suffix.
///
/// `app::model::Page<app::User>` -> `Page`, ``List`1`` -> `List`.
fn simple_name(name: &str) -> &str {
    let name = name.split('<').next().unwrap_or(name);
    let name = name.rsplit("::").next().unwrap_or(name);
    let name = name.split('`').next().unwrap_or(name);
    name.trim()
}

/// Decides and applies `DocumentType` narrowing for one command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeDiscriminator {
    document_type: Option<String>,
}

impl TypeDiscriminator {
    /// Active iff a record type is declared and its document type differs
    /// from the collection name.
    pub fn new(record_type: Option<&RecordType>, collection: &str) -> Self {
        let document_type = record_type
            .map(RecordType::document_type)
            .filter(|name| *name != collection)
            .map(str::to_string);
        Self { document_type }
    }

    /// A discriminator that never narrows.
    pub fn inactive() -> Self {
        Self {
            document_type: None,
        }
    }

    /// Whether narrowing applies.
    pub fn is_active(&self) -> bool {
        self.document_type.is_some()
    }

    /// The bound `DocumentType`, when active.
    pub fn document_type(&self) -> Option<&str> {
        self.document_type.as_deref()
    }

    /// Start a document, with `DocumentType` as its first entry when active.
    pub fn start_document(&self) -> Document {
        let mut document = Document::new();
        if let Some(name) = &self.document_type {
            document.insert(
                DOCUMENT_TYPE_KEY.to_string(),
                serde_json::Value::String(name.clone()),
            );
        }
        document
    }

    /// AND the `DocumentType` predicate into a query.
    pub fn narrow(&self, query: &mut SelectQuery) {
        if self.document_type.is_none() {
            return;
        }
        let predicate = Predicate::Compare {
            path: query.qualify(DOCUMENT_TYPE_KEY),
            op: CompareOp::Eq,
            operand: Operand::param(DOCUMENT_TYPE_KEY),
        };
        if !query.filter.contains(&predicate) {
            query.and(predicate);
        }
    }

    /// Bind `@DocumentType`, replacing any caller value.
    pub fn bind(&self, spec: &mut QuerySpec) {
        if let Some(name) = &self.document_type {
            spec.push(DOCUMENT_TYPE_KEY, serde_json::Value::String(name.clone()));
        }
    }
}
