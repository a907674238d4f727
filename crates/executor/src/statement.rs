//! Statement classification
//!
//! The kind of a command is decided by a case-sensitive prefix match on the
//! trimmed text. Anything that is not `INSERT`, `UPDATE` or `DELETE` takes
//! the query path.

use std::fmt;

use serde::{Deserialize, Serialize};

/// `INSERT` prefix.
pub const INSERT: &str = "INSERT";
/// `UPDATE` prefix.
pub const UPDATE: &str = "UPDATE";
/// `DELETE` prefix.
pub const DELETE: &str = "DELETE";

/// What a command does.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StatementKind {
    /// Create a document
    Insert,
    /// Upsert a document
    Update,
    /// Delete a document
    Delete,
    /// Query documents
    Select,
}

impl StatementKind {
    /// Classify command text.
    pub fn classify(text: &str) -> Self {
        let text = text.trim_start();
        if text.starts_with(INSERT) {
            StatementKind::Insert
        } else if text.starts_with(UPDATE) {
            StatementKind::Update
        } else if text.starts_with(DELETE) {
            StatementKind::Delete
        } else {
            StatementKind::Select
        }
    }

    /// Whether this kind writes a document.
    pub fn is_mutation(self) -> bool {
        !matches!(self, StatementKind::Select)
    }
}

impl fmt::Display for StatementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            StatementKind::Insert => INSERT,
            StatementKind::Update => UPDATE,
            StatementKind::Delete => DELETE,
            StatementKind::Select => "SELECT",
        };
        f.write_str(name)
    }
}

/// Collection named by an INSERT: the first token after `INSERT`, skipping
/// an optional `INTO`.
///
/// ```text
/// INSERT Users (Users.Name) VALUES (@Name)        -> Users
/// INSERT INTO Users (Users.Name) VALUES (@Name)   -> Users
/// ```
pub fn insert_target(text: &str) -> Option<&str> {
    let rest = text.trim_start().strip_prefix(INSERT)?;
    let mut tokens = rest
        .split(|c: char| c.is_whitespace() || c == '(')
        .filter(|t| !t.is_empty());
    let first = tokens.next()?;
    if first.eq_ignore_ascii_case("INTO") {
        tokens.next()
    } else {
        Some(first)
    }
}
