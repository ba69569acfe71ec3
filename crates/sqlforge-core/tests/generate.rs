//! Tests for batch and single-target statement generation: every operation,
//! row skipping, banners, and strict identifier checks.

mod common;
use common::*;

use sqlforge_core::builder::{CreateParams, DeleteParams, SelectParams, TruncateParams};
use sqlforge_core::row::InsertRow;
use sqlforge_core::{ConfigurationError, GenerateError, GenerationContext, Operation, RowIssue};

#[test]
fn single_select_is_exact() {
    let batch = GenerationContext::new()
        .bulk_select(Some(&SelectParams::new("t", ["a", "b"])))
        .unwrap();
    assert_eq!(batch.to_sql(), "SELECT a, b FROM t;");
    assert!(batch.errors().is_empty());
}

#[test]
fn batch_select_keeps_row_order() {
    let ctx = context(
        Operation::Select,
        &[&["users", "id, name"], &["orders", "*"], &["audit", "ts"]],
    );
    let batch = ctx.bulk_select(None).unwrap();
    assert_eq!(
        statements(&batch),
        [
            "SELECT id, name FROM users;",
            "SELECT * FROM orders;",
            "SELECT ts FROM audit;",
        ]
    );
}

#[test]
fn insert_mismatch_skips_only_that_row() {
    let ctx = context(
        Operation::Insert,
        &[
            &["t", "a, b", "1, 2"],
            &["t", "a, b, c", "1, 2"],
            &["u", "x", "'y'"],
        ],
    );
    let batch = ctx.bulk_insert(None).unwrap();
    assert_eq!(
        statements(&batch),
        [
            "INSERT INTO t (a, b) VALUES (1, 2);",
            "INSERT INTO u (x) VALUES ('y');",
        ]
    );
    assert_eq!(batch.errors().len(), 1);
    assert_eq!(batch.errors()[0].row, 2);
    assert_eq!(
        batch.errors()[0].issue,
        RowIssue::ShapeMismatch {
            left: "column_list",
            left_len: 3,
            right: "value_list",
            right_len: 2,
        }
    );
}

#[test]
fn missing_field_is_reported_by_name() {
    let ctx = context(Operation::Insert, &[&["t", "a"]]);
    let batch = ctx.bulk_insert(None).unwrap();
    assert!(batch.is_empty());
    assert_eq!(batch.errors()[0].issue, RowIssue::MissingField("value_list"));
}

#[test]
fn single_insert() {
    let row = InsertRow {
        table: String::from("people"),
        column_list: String::from("id, name"),
        value_list: String::from("7, 'Ada'"),
    };
    let batch = GenerationContext::new().bulk_insert(Some(&row)).unwrap();
    assert_eq!(batch.to_sql(), "INSERT INTO people (id, name) VALUES (7, 'Ada');");
}

#[test]
fn merge_set_clause_follows_column_order() {
    let ctx = context(
        Operation::Merge,
        &[&["dw.orders", "id, total, status", "id", "stage.orders", "order_id, amount, state"]],
    );
    let batch = ctx.bulk_merge(None).unwrap();
    assert_eq!(
        batch.to_sql(),
        "--------- dw.orders ---------\n\
         MERGE INTO dw.orders\n\
         USING stage.orders AS SOURCE\n\
         ON orders.id = SOURCE.id\n\
         WHEN MATCHED THEN\n    \
         UPDATE SET\n        \
         id = SOURCE.order_id,\n        \
         total = SOURCE.amount,\n        \
         status = SOURCE.state\n\
         WHEN NOT MATCHED THEN\n    \
         INSERT (\n        \
         id,\n        \
         total,\n        \
         status\n    \
         )\n    \
         VALUES (\n        \
         SOURCE.order_id,\n        \
         SOURCE.amount,\n        \
         SOURCE.state\n    \
         );"
    );
}

#[test]
fn merge_list_mismatch_is_skipped() {
    let ctx = context(Operation::Merge, &[&["t", "a, b", "id", "s", "a"]]);
    let batch = ctx.bulk_merge(None).unwrap();
    assert!(batch.is_empty());
    assert!(matches!(batch.errors()[0].issue, RowIssue::ShapeMismatch { .. }));
}

#[test]
fn create_groups_columns_by_table() {
    let ctx = context(
        Operation::Create,
        &[
            &["app", "users", "id", "INT"],
            &["app", "users", "email", "TEXT"],
            &["app", "roles", "id", "INT"],
        ],
    );
    let batch = ctx.bulk_create(None).unwrap();
    assert_eq!(
        batch.to_sql(),
        "CREATE TABLE app.users (\n    id INT,\n    email TEXT\n);\n\
         CREATE TABLE app.roles (\n    id INT\n);"
    );
}

#[test]
fn single_create() {
    let params = CreateParams::new("t").column("a", "INT");
    let batch = GenerationContext::new().bulk_create(Some(&params)).unwrap();
    assert_eq!(batch.to_sql(), "CREATE TABLE t (\n    a INT\n);");
}

#[test]
fn delete_batch_emits_banner_and_pair() {
    let ctx = context(Operation::Delete, &[&["", "orders", "id, total", "id", "orders_stage"]]);
    let batch = ctx.bulk_delete(None).unwrap();
    assert_eq!(batch.statement_count(), 2);
    assert!(batch.to_sql().starts_with(
        "--------- orders ---------\nDELETE FROM orders\nWHERE id IN (\n    SELECT id FROM orders_stage\n);\n"
    ));
}

#[test]
fn delete_batch_without_banners() {
    let ctx = context(Operation::Delete, &[&["dw", "orders", "id", "id", "stage"]])
        .with_options(without_banners());
    let batch = ctx.bulk_delete(None).unwrap();
    assert!(batch.to_sql().starts_with("DELETE FROM dw.orders\n"));
    assert!(!batch.to_sql().contains("---------"));
}

#[test]
fn single_delete() {
    let params = DeleteParams {
        target_table: String::from("t"),
        columns: vec![String::from("a")],
        increment_field: String::from("id"),
        source_table: String::from("s"),
    };
    let batch = GenerationContext::new().bulk_delete(Some(&params)).unwrap();
    assert_eq!(
        batch.to_sql(),
        "DELETE FROM t\nWHERE id IN (\n    SELECT id FROM s\n);\nINSERT INTO t (a)\nSELECT a\nFROM s;"
    );
}

#[test]
fn truncate_simple_and_reload_rows() {
    let ctx = context(
        Operation::Truncate,
        &[&["scratch"], &["facts", "id, value", "facts_stage"]],
    )
    .with_options(without_banners());
    let batch = ctx.bulk_truncate(None).unwrap();
    assert_eq!(
        statements(&batch),
        [
            "TRUNCATE TABLE scratch;",
            "TRUNCATE TABLE facts;",
            "INSERT INTO facts (\n    id,\n    value\n)\nSELECT\n    id,\n    value\nFROM facts_stage;",
        ]
    );
}

#[test]
fn single_truncate_rejects_unsafe_table() {
    let ctx = GenerationContext::new();
    assert_eq!(
        ctx.bulk_truncate(Some(&TruncateParams::new("logs")))
            .unwrap()
            .to_sql(),
        "TRUNCATE TABLE logs;"
    );
    let err = ctx
        .bulk_truncate(Some(&TruncateParams::new("logs; DROP TABLE x")))
        .unwrap_err();
    assert!(matches!(err, GenerateError::Row(RowIssue::UnsafeIdentifier(_))));
}

#[test]
fn no_source_and_no_params_is_an_error() {
    let err = GenerationContext::new().bulk_create(None).unwrap_err();
    assert!(matches!(
        err,
        GenerateError::Configuration(ConfigurationError::NothingToGenerate {
            operation: Operation::Create
        })
    ));
    assert_eq!(err.to_string(), "create: provide single-target parameters or a row source");
}

#[test]
fn strict_mode_filters_batch_rows() {
    let ctx = context(
        Operation::Select,
        &[&["users", "id"], &["users; --", "id"]],
    )
    .with_options(strict());
    let batch = ctx.bulk_select(None).unwrap();
    assert_eq!(batch.to_sql(), "SELECT id FROM users;");
    assert_eq!(batch.errors()[0].row, 2);
}
