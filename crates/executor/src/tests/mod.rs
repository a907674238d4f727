//! Test modules for the executor crate.

pub mod cancellation;
pub mod connection;

use std::sync::Arc;

use cosmosql_core::{CollectionRef, Document};
use cosmosql_storage::MemoryStore;

use crate::{Command, Connection, ConnectionConfig};

/// Database every fixture connects to.
pub const DATABASE: &str = "testdb";

/// A memory store and a connection over it.
pub struct Fixture {
    pub store: Arc<MemoryStore>,
    pub connection: Connection,
}

impl Fixture {
    pub fn new() -> Self {
        Self::with_config(ConnectionConfig::for_database(DATABASE))
    }

    pub fn with_config(config: ConnectionConfig) -> Self {
        let store = Arc::new(MemoryStore::new());
        let connection = Connection::open(store.clone(), config).unwrap();
        Self { store, connection }
    }

    /// A command against `collection`.
    pub fn command(&self, collection: &str, text: &str) -> Command {
        self.connection
            .create_command()
            .with_collection(collection)
            .with_text(text)
    }

    pub fn collection(&self, name: &str) -> CollectionRef {
        CollectionRef::new(DATABASE, name)
    }

    pub fn documents(&self, collection: &str) -> Vec<Document> {
        self.store.documents(&self.collection(collection))
    }

    /// Documents of `collection` that are not sequence counters.
    pub fn records(&self, collection: &str) -> Vec<Document> {
        self.documents(collection)
            .into_iter()
            .filter(|d| d.get("DocumentType").and_then(|v| v.as_str()) != Some("Sequence"))
            .collect()
    }
}

/// Insert `Users` rows keyed by `Email`.
pub fn insert_user(fx: &Fixture, name: &str, email: &str, age: i64) {
    fx.command("Users", "INSERT Users (Users.Name, Users.Email, Users.Age) VALUES (@Name, @Email, @Age)")
        .with_id_field("Email")
        .with_parameter("Users.Name", name)
        .with_parameter("Users.Email", email)
        .with_parameter("Users.Age", age)
        .execute_non_query()
        .unwrap();
}
