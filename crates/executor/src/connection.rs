//! Connections to a document store
//!
//! A [`Connection`] pairs a shared store handle with its configuration. It
//! is cheap to clone; commands hold their own clone.

use std::any::Any;
use std::fmt;
use std::path::Path;
use std::sync::Arc;

use cosmosql_core::{CollectionRef, DocumentStore};
use tracing::debug;

use crate::command::Command;
use crate::config::ConnectionConfig;
use crate::connection_string::ConnectionString;
use crate::{Error, Result};

/// Any connection a command might be attached to.
///
/// Only [`Connection`] can run commands; attaching anything else is a
/// configuration error.
pub trait DbConnection: Send + Sync {
    /// Database the connection addresses.
    fn database(&self) -> &str;

    /// Downcast support.
    fn as_any(&self) -> &dyn Any;
}

struct Inner {
    store: Arc<dyn DocumentStore>,
    config: ConnectionConfig,
    endpoint: Option<String>,
}

/// An open connection to a document store.
#[derive(Clone)]
pub struct Connection {
    inner: Arc<Inner>,
}

impl Connection {
    /// Open a connection with a validated config.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the config does not validate.
    pub fn open(store: Arc<dyn DocumentStore>, config: ConnectionConfig) -> Result<Self> {
        config.validate()?;
        debug!(target: "cosmosql::command", database = %config.database, "connection opened");
        Ok(Self {
            inner: Arc::new(Inner {
                store,
                config,
                endpoint: None,
            }),
        })
    }

    /// Open a connection from a `Key=Value;` connection string.
    ///
    /// The string must name a `Database`. Other settings take their
    /// defaults.
    pub fn from_connection_string(store: Arc<dyn DocumentStore>, text: &str) -> Result<Self> {
        let parsed = ConnectionString::parse(text)?;
        let database = parsed
            .database
            .clone()
            .ok_or_else(|| Error::configuration("connection string has no Database"))?;
        let config = ConnectionConfig::for_database(database);
        config.validate()?;
        Ok(Self {
            inner: Arc::new(Inner {
                store,
                config,
                endpoint: Some(parsed.account_endpoint),
            }),
        })
    }

    /// Open a connection configured from a TOML file.
    pub fn from_config_file(store: Arc<dyn DocumentStore>, path: &Path) -> Result<Self> {
        let config = ConnectionConfig::from_file(path)?;
        Self::open(store, config)
    }

    /// Connection configuration.
    pub fn config(&self) -> &ConnectionConfig {
        &self.inner.config
    }

    /// Account endpoint, when opened from a connection string.
    pub fn endpoint(&self) -> Option<&str> {
        self.inner.endpoint.as_deref()
    }

    /// The underlying store.
    pub fn store(&self) -> &dyn DocumentStore {
        self.inner.store.as_ref()
    }

    /// Address a collection in this connection's database.
    pub fn collection(&self, name: &str) -> CollectionRef {
        CollectionRef::new(self.inner.config.database.clone(), name)
    }

    /// Create a command bound to this connection.
    pub fn create_command(&self) -> Command {
        Command::new(self)
    }
}

impl DbConnection for Connection {
    fn database(&self) -> &str {
        &self.inner.config.database
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

impl fmt::Debug for Connection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Connection")
            .field("config", &self.inner.config)
            .field("endpoint", &self.inner.endpoint)
            .finish_non_exhaustive()
    }
}
