//! Parameters to document mapping
//!
//! ## Rules
//!
//! - Insert: a `<Collection>.` qualifier is stripped from parameter names
//! - Update / Delete: names are used as bound, minus a leading `@`
//! - A Text or Guid value bound to the identifier field is also written
//!   under `id`
//! - On insert, an integer value bound to the identifier field is a
//!   placeholder: the document is returned with a pending sequence, and
//!   [`BuiltDocument::apply_sequence`] writes the allocated value
//! - `DocumentType` comes first when discrimination is active

use cosmosql_core::{Document, ParameterSet, ID_KEY};

use crate::discriminator::TypeDiscriminator;
use crate::statement::StatementKind;

/// A document built from bound parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct BuiltDocument {
    /// The document
    pub document: Document,
    /// Identifier field waiting for a sequence value
    pub pending_sequence: Option<String>,
}

impl BuiltDocument {
    /// Whether the document carries an `id`.
    pub fn has_id(&self) -> bool {
        self.document.contains_key(ID_KEY)
    }

    /// Write an allocated sequence value to the pending field and to `id`.
    ///
    /// The field keeps the integer; `id` holds its decimal string.
    pub fn apply_sequence(&mut self, value: i64) {
        if let Some(field) = self.pending_sequence.take() {
            self.document
                .insert(field, serde_json::Value::from(value));
            self.document
                .insert(ID_KEY.to_string(), serde_json::Value::String(value.to_string()));
        }
    }
}

/// Maps a parameter set onto a document.
#[derive(Debug, Clone, Copy)]
pub struct DocumentBuilder<'a> {
    discriminator: &'a TypeDiscriminator,
    id_field: Option<&'a str>,
}

impl<'a> DocumentBuilder<'a> {
    /// Create a builder.
    pub fn new(discriminator: &'a TypeDiscriminator, id_field: Option<&'a str>) -> Self {
        Self {
            discriminator,
            id_field,
        }
    }

    /// Build the document for a mutation.
    ///
    /// `qualifier` is the insert target collection, if any.
    pub fn build(
        &self,
        kind: StatementKind,
        qualifier: Option<&str>,
        parameters: &ParameterSet,
    ) -> BuiltDocument {
        let mut document = self.discriminator.start_document();
        let mut pending_sequence = None;

        for parameter in parameters {
            let field = match (kind, qualifier) {
                (StatementKind::Insert, Some(q)) => parameter
                    .field()
                    .strip_prefix(q)
                    .and_then(|rest| rest.strip_prefix('.'))
                    .unwrap_or(parameter.field()),
                _ => parameter.field(),
            };
            let value = parameter.value();
            document.insert(field.to_string(), value.to_json());

            if self.id_field != Some(field) {
                continue;
            }
            let value_kind = value.kind();
            if value_kind.is_id_kind() {
                if let Some(id) = value.to_id_string() {
                    document.insert(ID_KEY.to_string(), serde_json::Value::String(id));
                }
            } else if value_kind.is_sequence_kind() && kind == StatementKind::Insert {
                pending_sequence = Some(field.to_string());
            }
        }

        BuiltDocument {
            document,
            pending_sequence,
        }
    }
}
