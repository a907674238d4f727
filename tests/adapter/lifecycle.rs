//! Record lifecycle through one collection.

use cosmosql::{Error, RecordType};
use serde::Deserialize;
use serde_json::json;

use crate::common::TestDb;

#[derive(Debug, Deserialize, PartialEq)]
struct Users {
    #[serde(rename = "Name")]
    name: String,
    #[serde(rename = "Email")]
    email: String,
}

const INSERT: &str = "INSERT Users (Users.Name, Users.Email) VALUES (@Name, @Email)";

fn insert(db: &TestDb, name: &str, email: &str) {
    let affected = db
        .command("Users", INSERT)
        .with_record::<Users>()
        .with_id_field("Email")
        .with_parameter("Users.Name", name)
        .with_parameter("Users.Email", email)
        .execute_non_query()
        .unwrap();
    assert_eq!(affected.rows, 1);
}

fn all(db: &TestDb) -> Vec<Users> {
    db.command("Users", "SELECT * FROM Users u ORDER BY u.Name")
        .with_record::<Users>()
        .execute_reader()
        .unwrap()
        .into_records()
        .unwrap()
}

#[test]
fn insert_read_update_delete() {
    let db = TestDb::new();
    insert(&db, "Ann", "a@b.com");
    insert(&db, "Bob", "bob@b.com");

    // Stored shape: bound fields in order, then the promoted id
    let stored = db.store.get(&db.collection("Users"), "a@b.com").unwrap();
    assert_eq!(
        serde_json::Value::Object(stored),
        json!({"Name": "Ann", "Email": "a@b.com", "id": "a@b.com"})
    );

    let users = all(&db);
    assert_eq!(users.len(), 2);
    assert_eq!(users[0].name, "Ann");

    let updated = db
        .command("Users", "UPDATE Users SET Name = @Name WHERE Email = @Email")
        .with_record::<Users>()
        .with_id_field("Email")
        .with_parameter("@Name", "Zed")
        .with_parameter("@Email", "a@b.com")
        .execute_non_query()
        .unwrap();
    assert_eq!(updated.rows, 1);
    assert_eq!(
        all(&db),
        vec![
            Users {
                name: "Bob".into(),
                email: "bob@b.com".into()
            },
            Users {
                name: "Zed".into(),
                email: "a@b.com".into()
            },
        ]
    );

    let deleted = db
        .command("Users", "DELETE FROM Users WHERE Email = @Email")
        .with_id_field("Email")
        .with_parameter("@Email", "bob@b.com")
        .execute_non_query()
        .unwrap();
    assert_eq!(deleted.rows, 1);

    let count = db
        .command("Users", "SELECT VALUE COUNT(1) FROM Users u")
        .execute_scalar()
        .unwrap();
    assert_eq!(count, Some(json!(1)));
}

#[test]
fn duplicate_key_surfaces_store_conflict() {
    let db = TestDb::new();
    insert(&db, "Ann", "a@b.com");
    let err = db
        .command("Users", INSERT)
        .with_id_field("Email")
        .with_parameter("Users.Name", "Ann again")
        .with_parameter("Users.Email", "a@b.com")
        .execute_non_query()
        .unwrap_err();
    assert!(err.store_error().is_some_and(|e| e.is_conflict()));
    assert!(err.to_string().contains("a@b.com"));
}

#[test]
fn reader_walks_columns() {
    let db = TestDb::new();
    insert(&db, "Ann", "a@b.com");
    let mut reader = db
        .command("Users", "SELECT u.Email AS mail, u.Name FROM Users u")
        .with_record_type(RecordType::named("Users"))
        .execute_reader()
        .unwrap();
    assert!(reader.read());
    assert_eq!(reader.field_count(), 2);
    assert_eq!(reader.get_name(0).unwrap(), "mail");
    assert_eq!(reader.get_ordinal("Name").unwrap(), 1);
    assert!(!reader.is_null(1).unwrap());
    assert!(!reader.read());
}

#[test]
fn mutations_are_not_queries() {
    let db = TestDb::new();
    let err = db
        .command("Users", INSERT)
        .with_record::<Users>()
        .execute_reader()
        .unwrap_err();
    assert!(matches!(err, Error::UnsupportedStatement { .. }));
}
