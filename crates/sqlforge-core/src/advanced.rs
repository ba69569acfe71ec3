//! One-off DDL generators: views, indexes, constraints, triggers, stored
//! procedures, and functions.
//!
//! Each generator returns a single statement. Empty required inputs are
//! rejected with [`RowIssue::MissingField`].

use std::fmt;

use crate::error::RowIssue;
use crate::ident::Identifier;
use crate::security::is_safe_table_name;

type Result<T> = std::result::Result<T, RowIssue>;

pub(crate) fn required<'a>(value: &'a str, field: &'static str) -> Result<&'a str> {
    let value = value.trim();
    if value.is_empty() {
        return Err(RowIssue::MissingField(field));
    }
    Ok(value)
}

pub(crate) fn required_list<'a, S: AsRef<str>>(values: &'a [S], field: &'static str) -> Result<Vec<&'a str>> {
    let values: Vec<&str> = values
        .iter()
        .map(|v| v.as_ref().trim())
        .filter(|v| !v.is_empty())
        .collect();
    if values.is_empty() {
        return Err(RowIssue::MissingField(field));
    }
    Ok(values)
}

fn block_body(body: &str) -> String {
    body.trim()
        .lines()
        .map(|line| {
            if line.trim().is_empty() {
                String::new()
            } else {
                format!("    {}", line.trim_end())
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// `CREATE OR REPLACE VIEW {schema.name} AS\n{query};`
///
/// # Errors
///
/// Returns an error if the name or query is blank, or the name is not a safe
/// table identifier.
pub fn create_view(name: &str, query: &str, schema: Option<&str>) -> Result<String> {
    let name = required(name, "view_name")?;
    let query = required(query, "query")?;
    if !is_safe_table_name(name) {
        return Err(RowIssue::UnsafeIdentifier(String::from(name)));
    }
    let query = query.trim_end_matches(';').trim_end();
    let view = Identifier::qualified(schema, name);
    Ok(format!("CREATE OR REPLACE VIEW {view} AS\n{query};"))
}

/// `CREATE [UNIQUE ]INDEX {name} ON {table} ({columns})[ USING {type}];`
///
/// Without a name the index is called `idx_{table}_{columns}`, with dots in
/// the table name replaced by underscores.
///
/// # Errors
///
/// Returns an error if the table is blank or there are no columns.
pub fn create_index<S: AsRef<str>>(
    table: &str,
    columns: &[S],
    name: Option<&str>,
    unique: bool,
    index_type: Option<&str>,
) -> Result<String> {
    let table = required(table, "table")?;
    let columns = required_list(columns, "columns")?;

    let name = match name.map(str::trim).filter(|n| !n.is_empty()) {
        Some(name) => String::from(name),
        None => format!("idx_{}_{}", table.replace('.', "_"), columns.join("_")),
    };

    let mut sql = String::from("CREATE ");
    if unique {
        sql.push_str("UNIQUE ");
    }
    sql.push_str("INDEX ");
    sql.push_str(&name);
    sql.push_str(" ON ");
    sql.push_str(table);
    sql.push_str(" (");
    sql.push_str(&columns.join(", "));
    sql.push(')');
    if let Some(kind) = index_type.map(str::trim).filter(|k| !k.is_empty()) {
        sql.push_str(" USING ");
        sql.push_str(kind);
    }
    sql.push(';');
    Ok(sql)
}

/// A table constraint added with `ALTER TABLE ... ADD CONSTRAINT`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Constraint {
    /// `PRIMARY KEY (cols)`
    PrimaryKey(Vec<String>),
    /// `FOREIGN KEY (cols) REFERENCES ref_table (ref_cols)`
    ForeignKey {
        /// Referencing columns.
        columns: Vec<String>,
        /// Referenced table.
        ref_table: String,
        /// Referenced columns.
        ref_columns: Vec<String>,
    },
    /// `UNIQUE (cols)`
    Unique(Vec<String>),
    /// `CHECK (condition)`
    Check(String),
}

/// `ALTER TABLE {table}\nADD CONSTRAINT {name}\n{definition};`
///
/// # Errors
///
/// Returns an error if the table, name, or any part of the constraint is
/// blank, or a foreign key's column lists differ in length.
pub fn add_constraint(table: &str, name: &str, constraint: &Constraint) -> Result<String> {
    let table = required(table, "table")?;
    let name = required(name, "constraint_name")?;

    let definition = match constraint {
        Constraint::PrimaryKey(columns) => {
            format!("PRIMARY KEY ({})", required_list(columns, "columns")?.join(", "))
        }
        Constraint::Unique(columns) => {
            format!("UNIQUE ({})", required_list(columns, "columns")?.join(", "))
        }
        Constraint::Check(condition) => format!("CHECK ({})", required(condition, "condition")?),
        Constraint::ForeignKey {
            columns,
            ref_table,
            ref_columns,
        } => {
            let columns = required_list(columns, "columns")?;
            let ref_table = required(ref_table, "ref_table")?;
            let ref_columns = required_list(ref_columns, "ref_columns")?;
            if columns.len() != ref_columns.len() {
                return Err(RowIssue::ShapeMismatch {
                    left: "columns",
                    left_len: columns.len(),
                    right: "ref_columns",
                    right_len: ref_columns.len(),
                });
            }
            format!(
                "FOREIGN KEY ({})\nREFERENCES {ref_table} ({})",
                columns.join(", "),
                ref_columns.join(", ")
            )
        }
    };

    Ok(format!("ALTER TABLE {table}\nADD CONSTRAINT {name}\n{definition};"))
}

/// When a trigger fires relative to its event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TriggerTiming {
    /// `BEFORE`
    Before,
    /// `AFTER`
    After,
}

impl fmt::Display for TriggerTiming {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Before => "BEFORE",
            Self::After => "AFTER",
        })
    }
}

/// The row event a trigger fires on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TriggerEvent {
    /// `INSERT`
    Insert,
    /// `UPDATE`
    Update,
    /// `DELETE`
    Delete,
}

impl fmt::Display for TriggerEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Insert => "INSERT",
            Self::Update => "UPDATE",
            Self::Delete => "DELETE",
        })
    }
}

/// A row-level trigger.
///
/// # Errors
///
/// Returns an error if the name, table, or body is blank.
pub fn create_trigger(
    name: &str,
    table: &str,
    timing: TriggerTiming,
    event: TriggerEvent,
    body: &str,
) -> Result<String> {
    let name = required(name, "trigger_name")?;
    let table = required(table, "table")?;
    let body = block_body(required(body, "body")?);
    Ok(format!(
        "CREATE TRIGGER {name}\n{timing} {event} ON {table}\nFOR EACH ROW\nBEGIN\n{body}\nEND;"
    ))
}

/// Direction of a stored procedure parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ParamDirection {
    /// `IN`
    #[default]
    In,
    /// `OUT`
    Out,
    /// `INOUT`
    InOut,
}

impl fmt::Display for ParamDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::In => "IN",
            Self::Out => "OUT",
            Self::InOut => "INOUT",
        })
    }
}

/// A routine parameter. Functions ignore the direction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoutineParam {
    /// Parameter name.
    pub name: String,
    /// Parameter type, emitted verbatim.
    pub data_type: String,
    /// Direction (procedures only).
    pub direction: ParamDirection,
}

impl RoutineParam {
    /// Creates an `IN` parameter.
    #[must_use]
    pub fn new(name: &str, data_type: &str) -> Self {
        Self {
            name: String::from(name),
            data_type: String::from(data_type),
            direction: ParamDirection::In,
        }
    }

    /// Sets the direction.
    #[must_use]
    pub const fn direction(mut self, direction: ParamDirection) -> Self {
        self.direction = direction;
        self
    }
}

/// A stored procedure with directed parameters, one per line.
///
/// # Errors
///
/// Returns an error if the name or body is blank.
pub fn create_procedure(
    name: &str,
    params: &[RoutineParam],
    body: &str,
    schema: Option<&str>,
) -> Result<String> {
    let name = Identifier::qualified(schema, required(name, "procedure_name")?);
    let body = block_body(required(body, "body")?);
    let params = if params.is_empty() {
        String::new()
    } else {
        let lines: Vec<String> = params
            .iter()
            .map(|p| format!("    {} {} {}", p.direction, p.name.trim(), p.data_type.trim()))
            .collect();
        format!("\n{}\n", lines.join(",\n"))
    };
    Ok(format!("CREATE PROCEDURE {name}({params})\nBEGIN\n{body}\nEND;"))
}

/// A scalar function.
///
/// # Errors
///
/// Returns an error if the name, return type, or body is blank.
pub fn create_function(
    name: &str,
    params: &[RoutineParam],
    returns: &str,
    body: &str,
    deterministic: bool,
    schema: Option<&str>,
) -> Result<String> {
    let name = Identifier::qualified(schema, required(name, "function_name")?);
    let returns = required(returns, "returns")?;
    let body = block_body(required(body, "body")?);
    let params = params
        .iter()
        .map(|p| format!("{} {}", p.name.trim(), p.data_type.trim()))
        .collect::<Vec<_>>()
        .join(", ");
    let determinism = if deterministic {
        "DETERMINISTIC"
    } else {
        "NOT DETERMINISTIC"
    };
    Ok(format!(
        "CREATE FUNCTION {name}({params})\nRETURNS {returns}\n{determinism}\nBEGIN\n{body}\nEND;"
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_view() {
        assert_eq!(
            create_view("active_users", "SELECT * FROM users WHERE active = 1;", Some("rpt"))
                .unwrap(),
            "CREATE OR REPLACE VIEW rpt.active_users AS\nSELECT * FROM users WHERE active = 1;"
        );
        assert_eq!(
            create_view(" ", "SELECT 1", None),
            Err(RowIssue::MissingField("view_name"))
        );
        assert!(matches!(
            create_view("v;x", "SELECT 1", None),
            Err(RowIssue::UnsafeIdentifier(_))
        ));
    }

    #[test]
    fn test_create_index_default_name() {
        assert_eq!(
            create_index("sales.orders", &["customer_id", "placed_at"], None, false, None).unwrap(),
            "CREATE INDEX idx_sales_orders_customer_id_placed_at ON sales.orders (customer_id, placed_at);"
        );
    }

    #[test]
    fn test_create_unique_index_with_type() {
        assert_eq!(
            create_index("users", &["email"], Some("ux_email"), true, Some("BTREE")).unwrap(),
            "CREATE UNIQUE INDEX ux_email ON users (email) USING BTREE;"
        );
        assert_eq!(
            create_index::<&str>("users", &[], None, false, None),
            Err(RowIssue::MissingField("columns"))
        );
    }

    #[test]
    fn test_constraints() {
        assert_eq!(
            add_constraint("orders", "pk_orders", &Constraint::PrimaryKey(vec![String::from("id")]))
                .unwrap(),
            "ALTER TABLE orders\nADD CONSTRAINT pk_orders\nPRIMARY KEY (id);"
        );
        let fk = Constraint::ForeignKey {
            columns: vec![String::from("customer_id")],
            ref_table: String::from("customers"),
            ref_columns: vec![String::from("id")],
        };
        assert_eq!(
            add_constraint("orders", "fk_customer", &fk).unwrap(),
            "ALTER TABLE orders\nADD CONSTRAINT fk_customer\nFOREIGN KEY (customer_id)\nREFERENCES customers (id);"
        );
        assert_eq!(
            add_constraint("orders", "ck_total", &Constraint::Check(String::from("total >= 0")))
                .unwrap(),
            "ALTER TABLE orders\nADD CONSTRAINT ck_total\nCHECK (total >= 0);"
        );
        assert!(add_constraint("orders", "u", &Constraint::Unique(vec![])).is_err());
    }

    #[test]
    fn test_trigger() {
        assert_eq!(
            create_trigger(
                "trg_audit",
                "orders",
                TriggerTiming::After,
                TriggerEvent::Update,
                "INSERT INTO audit (id) VALUES (NEW.id);"
            )
            .unwrap(),
            "CREATE TRIGGER trg_audit\nAFTER UPDATE ON orders\nFOR EACH ROW\nBEGIN\n    INSERT INTO audit (id) VALUES (NEW.id);\nEND;"
        );
    }

    #[test]
    fn test_procedure() {
        let params = [
            RoutineParam::new("p_id", "INT"),
            RoutineParam::new("p_total", "DECIMAL(10,2)").direction(ParamDirection::Out),
        ];
        assert_eq!(
            create_procedure("get_total", &params, "SELECT total INTO p_total FROM orders WHERE id = p_id;", Some("app"))
                .unwrap(),
            "CREATE PROCEDURE app.get_total(\n    IN p_id INT,\n    OUT p_total DECIMAL(10,2)\n)\nBEGIN\n    SELECT total INTO p_total FROM orders WHERE id = p_id;\nEND;"
        );
        assert_eq!(
            create_procedure("noop", &[], "SELECT 1;", None).unwrap(),
            "CREATE PROCEDURE noop()\nBEGIN\n    SELECT 1;\nEND;"
        );
    }

    #[test]
    fn test_function() {
        let params = [RoutineParam::new("a", "INT"), RoutineParam::new("b", "INT")];
        assert_eq!(
            create_function("add_ints", &params, "INT", "RETURN a + b;", true, None).unwrap(),
            "CREATE FUNCTION add_ints(a INT, b INT)\nRETURNS INT\nDETERMINISTIC\nBEGIN\n    RETURN a + b;\nEND;"
        );
        assert!(create_function("f", &[], " ", "RETURN 1;", false, None).is_err());
    }
}
