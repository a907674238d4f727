//! Two record types sharing the `Entities` collection.

use cosmosql::{ConnectionConfig, RecordType, SequenceStrategy};
use serde_json::json;

use crate::common::{Customer, Invoice, TestDb, DATABASE};

fn add_customer(db: &TestDb, name: &str) -> i64 {
    db.command(
        "Entities",
        "INSERT Entities (Entities.CustomerId, Entities.Name) VALUES (@CustomerId, @Name)",
    )
    .with_record::<Customer>()
    .with_id_field("CustomerId")
    .with_parameter("Entities.CustomerId", 0i64)
    .with_parameter("Entities.Name", name)
    .execute_non_query()
    .unwrap()
    .generated_id
    .unwrap()
}

fn add_invoice(db: &TestDb, number: &str, amount: f64) {
    db.command(
        "Entities",
        "INSERT Entities (Entities.InvoiceNo, Entities.Amount) VALUES (@InvoiceNo, @Amount)",
    )
    .with_record::<Invoice>()
    .with_id_field("InvoiceNo")
    .with_parameter("Entities.InvoiceNo", number)
    .with_parameter("Entities.Amount", amount)
    .execute_non_query()
    .unwrap();
}

fn customers(db: &TestDb) -> Vec<Customer> {
    db.command("Entities", "SELECT * FROM Entities e ORDER BY e.CustomerId")
        .with_record::<Customer>()
        .execute_reader()
        .unwrap()
        .into_records()
        .unwrap()
}

#[test]
fn record_types_stay_apart() {
    let db = TestDb::new();
    assert_eq!(add_customer(&db, "Acme"), 1);
    add_invoice(&db, "INV-1", 99.5);
    assert_eq!(add_customer(&db, "Globex"), 2);

    assert_eq!(
        customers(&db),
        vec![
            Customer {
                customer_id: 1,
                name: "Acme".into()
            },
            Customer {
                customer_id: 2,
                name: "Globex".into()
            },
        ]
    );

    let invoices: Vec<Invoice> = db
        .command("Entities", "SELECT * FROM Entities e")
        .with_record::<Invoice>()
        .execute_reader()
        .unwrap()
        .into_records()
        .unwrap();
    assert_eq!(invoices.len(), 1);
    assert_eq!(invoices[0].invoice_no, "INV-1");

    let stored = db.store.get(&db.collection("Entities"), "INV-1").unwrap();
    assert_eq!(stored["DocumentType"], json!("Invoice"));
}

#[test]
fn integer_keys_resolve_for_update_and_delete() {
    let db = TestDb::new();
    add_customer(&db, "Acme");
    let globex = add_customer(&db, "Globex");

    db.command(
        "Entities",
        "UPDATE Entities SET Name = @Name WHERE CustomerId = @CustomerId",
    )
    .with_record::<Customer>()
    .with_id_field("CustomerId")
    .with_parameter("@CustomerId", globex)
    .with_parameter("@Name", "Globex Corp")
    .execute_non_query()
    .unwrap();
    assert_eq!(customers(&db)[1].name, "Globex Corp");

    let removed = db
        .command("Entities", "DELETE FROM Entities WHERE CustomerId = @CustomerId")
        .with_record::<Customer>()
        .with_id_field("CustomerId")
        .with_parameter("@CustomerId", 1i64)
        .execute_non_query()
        .unwrap();
    assert_eq!(removed.rows, 1);
    assert_eq!(customers(&db).len(), 1);

    let missing = db
        .command("Entities", "DELETE FROM Entities WHERE CustomerId = @CustomerId")
        .with_record::<Customer>()
        .with_id_field("CustomerId")
        .with_parameter("@CustomerId", 1i64)
        .execute_non_query()
        .unwrap();
    assert_eq!(missing.rows, 0);
}

#[test]
fn sequence_counters_live_beside_records() {
    let db = TestDb::new();
    add_customer(&db, "Acme");
    add_customer(&db, "Globex");

    let counters = db
        .command(
            "Entities",
            "SELECT VALUE COUNT(1) FROM Entities e WHERE e.SequenceType = @SequenceType",
        )
        .with_parameter("@SequenceType", "Customer")
        .execute_scalar()
        .unwrap();
    assert_eq!(counters, Some(json!(2)));

    // Narrowed reads never see them
    let narrowed = db
        .command("Entities", "SELECT VALUE COUNT(1) FROM Entities e")
        .with_record_type(RecordType::named("Customer"))
        .execute_scalar()
        .unwrap();
    assert_eq!(narrowed, Some(json!(2)));
}

#[test]
fn reserve_strategy_allocates_the_same_sequence() {
    let mut config = ConnectionConfig::for_database(DATABASE);
    config.sequence_strategy = SequenceStrategy::Reserve;
    let db = TestDb::with_config(config);

    assert_eq!(add_customer(&db, "Acme"), 1);
    assert_eq!(add_customer(&db, "Globex"), 2);
    assert!(db
        .store
        .get(&db.collection("Entities"), "Sequence.Customer.2")
        .is_some());
}
