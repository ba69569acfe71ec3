//! Tests for advisory validation: statement classification, warnings, and
//! structural errors, including the JSON shape of the result.

use sqlforge_core::{validate_sql, StatementKind};

#[test]
fn select_star_with_where_warns_once() {
    let result = validate_sql("SELECT * FROM users WHERE id=1");
    assert!(result.is_valid);
    assert_eq!(result.statement_count, 1);
    assert_eq!(result.statements[0].kind, StatementKind::Select);
    assert_eq!(
        result.warnings,
        ["SELECT * used; list the columns you need explicitly"]
    );
    assert!(result.errors.is_empty());
}

#[test]
fn select_directly_followed_by_from_is_invalid() {
    let result = validate_sql("SELECT FROM users");
    assert!(!result.is_valid);
    assert!(result
        .errors
        .iter()
        .any(|e| e.starts_with("SELECT is directly followed by FROM")));
}

#[test]
fn unbalanced_bracket_is_invalid() {
    let result = validate_sql("SELECT * FROM t WHERE (a=1");
    assert!(!result.is_valid);
    assert_eq!(
        result.errors,
        ["unbalanced parentheses: '(' and ')' counts differ"]
    );
}

#[test]
fn empty_input_is_invalid() {
    let result = validate_sql("  \n ");
    assert!(!result.is_valid);
    assert_eq!(result.statement_count, 0);
    assert_eq!(result.errors, ["SQL text is empty"]);
}

#[test]
fn several_statements_are_classified_in_order() {
    let result = validate_sql(
        "UPDATE t SET a = 1; DELETE FROM t WHERE a = 2; \
         WITH x AS (SELECT 1) SELECT * FROM x WHERE 1 = 1",
    );
    let kinds: Vec<String> = result
        .statements
        .iter()
        .map(|s| s.kind.to_string())
        .collect();
    assert_eq!(kinds, ["UPDATE", "DELETE", "WITH SELECT"]);
    assert!(result
        .warnings
        .contains(&String::from("UPDATE without WHERE will affect the entire table")));
    assert!(result.is_valid);
}

#[test]
fn join_without_condition_is_invalid() {
    let result = validate_sql("SELECT a.x FROM a JOIN b WHERE a.id = 1");
    assert!(result
        .errors
        .contains(&String::from("JOIN is missing an ON or USING clause")));

    let ok = validate_sql("SELECT a.x FROM a CROSS JOIN b WHERE a.id = 1");
    assert!(ok.is_valid);
}

#[test]
fn joins_against_type_and_function_named_tables() {
    for sql in [
        "SELECT a FROM t JOIN text x ON t.id = x.id WHERE t.a = 1 LIMIT 5;",
        "SELECT a FROM t JOIN dim.date d ON t.day = d.day WHERE t.a = 1",
        "SELECT a FROM t JOIN t AS row ON row.id = t.id WHERE t.a = 1",
        "SELECT a FROM t LEFT JOIN count c USING (id) WHERE t.a = 1",
    ] {
        let result = validate_sql(sql);
        assert!(result.is_valid, "{sql}: {:?}", result.errors);
    }
}

#[test]
fn insert_into_keyword_named_table_has_column_list() {
    let result = validate_sql("INSERT INTO date (a) VALUES (1);");
    assert!(result.is_valid);
    assert!(result.warnings.is_empty(), "{:?}", result.warnings);
}

#[test]
fn escaped_quotes_are_balanced() {
    let result = validate_sql("SELECT 'it''s' FROM t WHERE a = 1");
    assert!(result.is_valid);
}

#[test]
fn result_serializes_with_type_labels() {
    let json = serde_json::to_value(validate_sql("INSERT INTO t VALUES (1)")).unwrap();
    assert_eq!(json["is_valid"], true);
    assert_eq!(json["statement_count"], 1);
    assert_eq!(json["statements"][0]["type"], "INSERT");
    assert_eq!(json["warnings"][0], "INSERT does not name its target columns");
}
