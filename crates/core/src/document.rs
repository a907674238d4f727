//! Documents and reserved field names
//!
//! A [`Document`] is an ordered JSON object. Field order is the order in
//! which fields were added, so `DocumentType` stays the first entry of a
//! discriminated document.

/// Ordered JSON object sent to and returned by the store.
pub type Document = serde_json::Map<String, serde_json::Value>;

/// Store-level primary key field.
pub const ID_KEY: &str = "id";

/// Discriminator field naming the logical record type.
pub const DOCUMENT_TYPE_KEY: &str = "DocumentType";

/// `DocumentType` value carried by sequence counter documents.
pub const SEQUENCE_DOCUMENT_TYPE: &str = "Sequence";

/// Counter field naming the logical type a sequence belongs to.
pub const SEQUENCE_TYPE_KEY: &str = "SequenceType";

/// Counter field holding the allocated value.
pub const SEQUENCE_CURRENT_KEY: &str = "Current";

/// Read the `id` of a document as a string.
///
/// Numeric ids are rendered in decimal; any other shape yields `None`.
pub fn document_id(document: &Document) -> Option<String> {
    match document.get(ID_KEY)? {
        serde_json::Value::String(s) => Some(s.clone()),
        serde_json::Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Resolve a dotted path (`a.b.c`) inside a document.
pub fn get_path<'a>(document: &'a Document, path: &str) -> Option<&'a serde_json::Value> {
    let mut segments = path.split('.');
    let mut current = document.get(segments.next()?)?;
    for segment in segments {
        current = current.as_object()?.get(segment)?;
    }
    Some(current)
}
