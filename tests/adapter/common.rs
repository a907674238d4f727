//! Shared helpers for the adapter suite.

#![allow(dead_code)]

use std::sync::Arc;

use cosmosql::{CollectionRef, Command, Connection, ConnectionConfig, MemoryStore};
use serde::{Deserialize, Serialize};

pub const DATABASE: &str = "adapter";

/// Record type stored in the shared `Entities` collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Customer {
    #[serde(rename = "CustomerId")]
    pub customer_id: i64,
    #[serde(rename = "Name")]
    pub name: String,
}

/// Second record type stored in `Entities`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Invoice {
    #[serde(rename = "InvoiceNo")]
    pub invoice_no: String,
    #[serde(rename = "Amount")]
    pub amount: f64,
}

pub struct TestDb {
    pub store: Arc<MemoryStore>,
    pub connection: Connection,
}

impl TestDb {
    pub fn new() -> Self {
        Self::with_config(ConnectionConfig::for_database(DATABASE))
    }

    pub fn with_config(config: ConnectionConfig) -> Self {
        let store = Arc::new(MemoryStore::new());
        let connection = Connection::open(store.clone(), config).unwrap();
        Self { store, connection }
    }

    pub fn command(&self, collection: &str, text: &str) -> Command {
        self.connection
            .create_command()
            .with_collection(collection)
            .with_text(text)
    }

    pub fn collection(&self, name: &str) -> CollectionRef {
        self.connection.collection(name)
    }
}
