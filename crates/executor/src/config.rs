//! Connection configuration via `cosmosql.toml`
//!
//! A connection is opened against a store with a [`ConnectionConfig`]. The
//! config can be built in code or read from a TOML file; a commented
//! default file can be written on first use.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Config file name looked up by [`ConnectionConfig::from_file`] callers.
pub const CONFIG_FILE_NAME: &str = "cosmosql.toml";

/// How integer identifiers are allocated on insert.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SequenceStrategy {
    /// Count existing counters and create a new one with a store-generated
    /// id. Concurrent allocators may hand out the same value.
    #[default]
    Count,
    /// Create the counter under a deterministic id and retry on conflict.
    Reserve,
}

/// Connection configuration loaded from `cosmosql.toml`.
///
/// # Example
///
/// ```toml
/// database = "app"
///
/// # Sequence strategy: "count" (default) or "reserve"
/// sequence_strategy = "count"
///
/// # Attempts before a reserve conflict is surfaced
/// sequence_max_attempts = 5
///
/// # Page size for non-paged feeds; omitted = store default
/// # max_item_count = 100
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionConfig {
    /// Database that commands address.
    #[serde(default)]
    pub database: String,
    /// Integer identifier allocation strategy.
    #[serde(default)]
    pub sequence_strategy: SequenceStrategy,
    /// Maximum create attempts under [`SequenceStrategy::Reserve`].
    #[serde(default = "default_sequence_max_attempts")]
    pub sequence_max_attempts: u32,
    /// Page size requested for non-paged feeds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_item_count: Option<usize>,
}

fn default_sequence_max_attempts() -> u32 {
    5
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            database: String::new(),
            sequence_strategy: SequenceStrategy::default(),
            sequence_max_attempts: default_sequence_max_attempts(),
            max_item_count: None,
        }
    }
}

impl ConnectionConfig {
    /// Config for a database with every other setting at its default.
    pub fn for_database(database: impl Into<String>) -> Self {
        Self {
            database: database.into(),
            ..Self::default()
        }
    }

    /// Check values that serde cannot.
    ///
    /// # Errors
    ///
    /// Returns a configuration error for an empty database name or a zero
    /// attempt budget.
    pub fn validate(&self) -> Result<()> {
        if self.database.trim().is_empty() {
            return Err(Error::configuration("database name is empty"));
        }
        if self.sequence_max_attempts == 0 {
            return Err(Error::configuration(
                "sequence_max_attempts must be at least 1",
            ));
        }
        if self.max_item_count == Some(0) {
            return Err(Error::configuration("max_item_count must be at least 1"));
        }
        Ok(())
    }

    /// Returns the default config file content with comments.
    pub fn default_toml() -> &'static str {
        r#"# cosmosql connection configuration
#
# Database that commands address
database = "default"

# Sequence strategy for integer identifiers: "count" (default) or "reserve"
#   "count"   = count counters, create a new one; concurrent inserts may collide
#   "reserve" = create the counter under a deterministic id, retry on conflict
sequence_strategy = "count"

# Attempts before a reserve conflict is surfaced (default: 5)
sequence_max_attempts = 5

# Page size for non-paged feeds. Omit to let the store decide.
# max_item_count = 100
"#
    }

    /// Read and parse config from a file path.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, parsed or validated.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::configuration(format!(
                "Failed to read config file '{}': {}",
                path.display(),
                e
            ))
        })?;
        let config: ConnectionConfig = toml::from_str(&content).map_err(|e| {
            Error::configuration(format!(
                "Failed to parse config file '{}': {}",
                path.display(),
                e
            ))
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Write the default config file if it does not already exist.
    ///
    /// Returns `Ok(())` whether the file was created or already existed.
    pub fn write_default_if_missing(path: &Path) -> Result<()> {
        if !path.exists() {
            std::fs::write(path, Self::default_toml()).map_err(|e| {
                Error::configuration(format!(
                    "Failed to write default config file '{}': {}",
                    path.display(),
                    e
                ))
            })?;
        }
        Ok(())
    }

    /// Serialize this config to TOML and write it to the given path.
    pub fn write_to_file(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| Error::configuration(format!("Failed to serialize config: {}", e)))?;
        std::fs::write(path, content).map_err(|e| {
            Error::configuration(format!(
                "Failed to write config file '{}': {}",
                path.display(),
                e
            ))
        })
    }
}
