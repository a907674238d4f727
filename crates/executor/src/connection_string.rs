//! `Key=Value;` connection strings
//!
//! ```text
//! AccountEndpoint=https://acct.documents.azure.com:443/;AccountKey=abc==;Database=app
//! ```
//!
//! Keys are case-insensitive, pairs may appear in any order, and values
//! may contain `=` (account keys are base64). Unknown keys are ignored.

use std::fmt;

use crate::{Error, Result};

/// Parsed connection string.
#[derive(Clone, PartialEq, Eq)]
pub struct ConnectionString {
    /// Account endpoint URI
    pub account_endpoint: String,
    /// Account key
    pub account_key: String,
    /// Database, when given
    pub database: Option<String>,
}

impl ConnectionString {
    /// Parse a connection string.
    ///
    /// # Errors
    ///
    /// Returns a configuration error for malformed pairs or a missing
    /// endpoint or key.
    pub fn parse(text: &str) -> Result<Self> {
        let mut endpoint = None;
        let mut key = None;
        let mut database = None;

        for pair in text.split(';').map(str::trim).filter(|p| !p.is_empty()) {
            let (name, value) = pair.split_once('=').ok_or_else(|| {
                Error::configuration(format!("connection string segment '{}' has no '='", pair))
            })?;
            let value = value.trim().to_string();
            match name.trim().to_ascii_lowercase().as_str() {
                "accountendpoint" => endpoint = Some(value),
                "accountkey" => key = Some(value),
                "database" => database = Some(value).filter(|v| !v.is_empty()),
                _ => {}
            }
        }

        Ok(Self {
            account_endpoint: endpoint
                .filter(|v| !v.is_empty())
                .ok_or_else(|| Error::configuration("connection string has no AccountEndpoint"))?,
            account_key: key
                .filter(|v| !v.is_empty())
                .ok_or_else(|| Error::configuration("connection string has no AccountKey"))?,
            database,
        })
    }
}

// The key never appears in debug output
impl fmt::Debug for ConnectionString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionString")
            .field("account_endpoint", &self.account_endpoint)
            .field("account_key", &"***")
            .field("database", &self.database)
            .finish()
    }
}

impl std::str::FromStr for ConnectionString {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}
