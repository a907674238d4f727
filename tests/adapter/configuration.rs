//! Configuration files and connection strings.

use std::sync::Arc;

use cosmosql::{
    Connection, ConnectionConfig, ConnectionString, Error, MemoryStore, SequenceStrategy,
    CONFIG_FILE_NAME,
};

#[test]
fn default_config_file_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join(CONFIG_FILE_NAME);

    ConnectionConfig::write_default_if_missing(&path).unwrap();
    let config = ConnectionConfig::from_file(&path).unwrap();
    assert_eq!(config.database, "default");
    assert_eq!(config.sequence_strategy, SequenceStrategy::Count);

    let mut changed = config.clone();
    changed.database = "orders".into();
    changed.max_item_count = Some(25);
    changed.write_to_file(&path).unwrap();

    // Existing files are left alone
    ConnectionConfig::write_default_if_missing(&path).unwrap();
    let connection = Connection::from_config_file(Arc::new(MemoryStore::new()), &path).unwrap();
    assert_eq!(connection.config(), &changed);
}

#[test]
fn invalid_config_file_is_a_configuration_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join(CONFIG_FILE_NAME);
    std::fs::write(&path, "database = \"x\"\nsequence_max_attempts = 0\n").unwrap();

    let err = Connection::from_config_file(Arc::new(MemoryStore::new()), &path).unwrap_err();
    assert!(matches!(err, Error::Configuration { .. }));
}

#[test]
fn connection_string_keys_are_case_insensitive() {
    let parsed: ConnectionString =
        "accountendpoint=https://acct:443/;ACCOUNTKEY=a2V5==;database=app"
            .parse()
            .unwrap();
    assert_eq!(parsed.account_endpoint, "https://acct:443/");
    assert_eq!(parsed.account_key, "a2V5==");
    assert_eq!(parsed.database.as_deref(), Some("app"));
    assert!(!format!("{:?}", parsed).contains("a2V5"));
}
