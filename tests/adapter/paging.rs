//! Page-number paging over a seeded collection.

use cosmosql::RecordType;
use serde_json::{json, Value};

use crate::common::TestDb;

fn seeded(count: usize) -> TestDb {
    let db = TestDb::new();
    for n in 0..count {
        db.command("Items", "INSERT Items (Items.Sku, Items.Rank) VALUES (@Sku, @Rank)")
            .with_id_field("Sku")
            .with_parameter("Items.Sku", format!("sku-{:02}", n))
            .with_parameter("Items.Rank", (count - n) as i64)
            .execute_non_query()
            .unwrap();
    }
    db
}

fn skus(db: &TestDb, page: i64, per_page: i64) -> Vec<Value> {
    let mut reader = db
        .command("Items", "SELECT VALUE i.Sku FROM Items i ORDER BY i.Rank")
        .with_record_type(RecordType::named("Items"))
        .with_parameter("@Page", page)
        .with_parameter("@PerPage", per_page)
        .execute_reader()
        .unwrap();
    let mut out = Vec::new();
    while reader.read() {
        out.push(reader.get_value(0).unwrap().clone());
    }
    out
}

#[test]
fn pages_cover_the_result_exactly_once() {
    let db = seeded(10);
    let mut seen = Vec::new();
    for page in 1..=4 {
        seen.extend(skus(&db, page, 3));
    }
    assert_eq!(seen.len(), 10);
    // Ascending rank is descending insertion order
    assert_eq!(seen[0], json!("sku-09"));
    assert_eq!(seen[9], json!("sku-00"));
}

#[test]
fn empty_page_costs_one_round_trip() {
    let db = seeded(4);
    let before = db.store.stats();
    assert!(skus(&db, 3, 2).is_empty());
    assert_eq!(db.store.stats().queries - before.queries, 1);
}

#[test]
fn paging_an_empty_collection() {
    let db = TestDb::new();
    assert!(skus(&db, 1, 5).is_empty());
}
