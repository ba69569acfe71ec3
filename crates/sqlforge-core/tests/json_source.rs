//! Tests for loading batch configuration from a JSON document on disk.

mod common;
use common::*;

use sqlforge_core::{GenerationContext, JsonSource, Operation, RowSource, SourceError};

const CONFIG: &str = r#"{
    "select": [["users", "id, name"], ["orders", "id"]],
    "insert": [["users", "id", 1], ["users", "id, name", "2, 'bo'"]],
    "truncate": [["scratch", null, null]],
    "notes": [["ignored"]]
}"#;

#[test]
fn loads_sheets_from_disk() {
    let (_dir, path) = write_config(CONFIG);
    let source = JsonSource::from_path(&path).unwrap();
    let records = source.records(Operation::Select).unwrap();
    assert_eq!(records.len(), 2);
    assert_eq!(records[0], ["users", "id, name"]);
}

#[test]
fn null_cells_make_a_simple_truncate() {
    let (_dir, path) = write_config(CONFIG);
    let ctx = GenerationContext::new()
        .with_options(without_banners())
        .with_source(JsonSource::from_path(&path).unwrap());
    let batch = ctx.bulk_truncate(None).unwrap();
    assert_eq!(batch.to_sql(), "TRUNCATE TABLE scratch;");
}

#[test]
fn select_batch_from_json() {
    let (_dir, path) = write_config(CONFIG);
    let ctx = GenerationContext::new().with_source(JsonSource::from_path(&path).unwrap());
    assert_eq!(
        ctx.bulk_select(None).unwrap().to_sql(),
        "SELECT id, name FROM users;\nSELECT id FROM orders;"
    );
}

#[test]
fn missing_sheet_and_bad_documents() {
    let (_dir, path) = write_config(CONFIG);
    let source = JsonSource::from_path(&path).unwrap();
    assert!(matches!(
        source.records(Operation::Merge),
        Err(SourceError::MissingSheet(Operation::Merge))
    ));

    let (_dir, path) = write_config("[1, 2, 3]");
    assert!(matches!(JsonSource::from_path(&path), Err(SourceError::Json(_))));

    let missing = std::env::temp_dir().join("sqlforge-does-not-exist.json");
    assert!(matches!(JsonSource::from_path(missing), Err(SourceError::Io(_))));
}
