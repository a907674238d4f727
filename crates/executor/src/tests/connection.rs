//! Connection and command wiring tests.

use std::any::Any;
use std::sync::Arc;

use cosmosql_storage::MemoryStore;

use super::Fixture;
use crate::{Command, Connection, ConnectionConfig, DbConnection, Error, SequenceStrategy};

/// A connection to something other than a document store.
struct OtherConnection;

impl DbConnection for OtherConnection {
    fn database(&self) -> &str {
        "other"
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

#[test]
fn test_foreign_connection_is_rejected() {
    let mut command = Command::detached();
    let err = command.set_connection(&OtherConnection).unwrap_err();
    assert!(matches!(err, Error::Configuration { .. }));
    assert!(command.connection().is_none());
}

#[test]
fn test_document_connection_is_accepted() {
    let fx = Fixture::new();
    let mut command = Command::detached()
        .with_collection("Users")
        .with_text("SELECT VALUE COUNT(1) FROM Users r");
    command.set_connection(&fx.connection).unwrap();
    assert_eq!(command.connection().map(|c| c.database()), Some("testdb"));
    assert!(command.execute_scalar().is_ok());
}

#[test]
fn test_incomplete_commands_are_rejected() {
    let fx = Fixture::new();
    let no_connection = Command::detached()
        .with_collection("Users")
        .with_text("SELECT * FROM Users r");
    assert!(matches!(
        no_connection.execute_scalar(),
        Err(Error::Configuration { .. })
    ));

    let no_collection = fx.connection.create_command().with_text("SELECT * FROM Users r");
    assert!(matches!(
        no_collection.execute_scalar(),
        Err(Error::Configuration { .. })
    ));

    let no_text = fx.connection.create_command().with_collection("Users");
    assert!(matches!(
        no_text.execute_non_query(),
        Err(Error::InvalidInput { .. })
    ));
}

#[test]
fn test_open_validates_config() {
    let store = Arc::new(MemoryStore::new());
    let err = Connection::open(store, ConnectionConfig::default()).unwrap_err();
    assert!(matches!(err, Error::Configuration { .. }));
}

#[test]
fn test_connection_string() {
    let store = Arc::new(MemoryStore::new());
    let connection = Connection::from_connection_string(
        store.clone(),
        "AccountEndpoint=https://localhost:8081/;AccountKey=secret;Database=app",
    )
    .unwrap();
    assert_eq!(connection.database(), "app");
    assert_eq!(connection.endpoint(), Some("https://localhost:8081/"));
    assert!(!format!("{:?}", connection).contains("secret"));

    let err = Connection::from_connection_string(
        store,
        "AccountEndpoint=https://localhost:8081/;AccountKey=secret",
    )
    .unwrap_err();
    assert!(matches!(err, Error::Configuration { .. }));
}

#[test]
fn test_config_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join(crate::CONFIG_FILE_NAME);
    std::fs::write(
        &path,
        "database = \"app\"\nsequence_strategy = \"reserve\"\nsequence_max_attempts = 8\n",
    )
    .unwrap();

    let connection =
        Connection::from_config_file(Arc::new(MemoryStore::new()), &path).unwrap();
    assert_eq!(connection.config().sequence_strategy, SequenceStrategy::Reserve);
    assert_eq!(connection.config().sequence_max_attempts, 8);
    assert_eq!(connection.collection("Users").to_string(), "dbs/app/colls/Users");
}
