//! `CREATE TABLE` statements assembled from one row per column.

use super::{require, GenerateOptions, GeneratedStatement, StatementBuilder};
use crate::error::{ConfigurationError, Result, RowError, RowIssue};
use crate::ident::Identifier;
use crate::row::{CreateRow, Identifiers, Operation};

/// Single-target parameters: one table and its column definitions.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CreateParams {
    /// Optional schema qualifier.
    pub domain: Option<String>,
    /// Table name.
    pub table: String,
    /// `(column, data_type)` pairs, in output order.
    pub columns: Vec<(String, String)>,
}

impl CreateParams {
    /// Starts a table definition.
    #[must_use]
    pub fn new(table: &str) -> Self {
        Self {
            table: String::from(table),
            ..Self::default()
        }
    }

    /// Sets the schema qualifier.
    #[must_use]
    pub fn domain(mut self, domain: &str) -> Self {
        self.domain = Some(String::from(domain));
        self
    }

    /// Appends a column definition.
    #[must_use]
    pub fn column(mut self, name: &str, data_type: &str) -> Self {
        self.columns
            .push((String::from(name), String::from(data_type)));
        self
    }
}

impl Identifiers for CreateParams {
    fn tables(&self) -> Vec<String> {
        vec![self.table.clone()]
    }

    fn columns(&self) -> Vec<String> {
        self.columns.iter().map(|(name, _)| name.clone()).collect()
    }
}

/// Builds `CREATE TABLE` statements.
#[derive(Debug, Clone, Copy, Default)]
pub struct CreateBuilder;

impl CreateBuilder {
    fn statement(table: &Identifier, definitions: &[String]) -> String {
        let body = definitions
            .iter()
            .map(|d| format!("    {d}"))
            .collect::<Vec<_>>()
            .join(",\n");
        format!("CREATE TABLE {table} (\n{body}\n);")
    }
}

struct TableGroup {
    name: String,
    domain: Option<String>,
    definitions: Vec<String>,
}

impl StatementBuilder for CreateBuilder {
    const OPERATION: Operation = Operation::Create;
    type Row = CreateRow;
    type Params = CreateParams;

    fn single(params: &CreateParams, _options: &GenerateOptions) -> Result<GeneratedStatement> {
        let table = require(Self::OPERATION, "table", &params.table)?;
        if params.columns.is_empty() {
            return Err(ConfigurationError::MissingParameter {
                operation: Self::OPERATION,
                parameter: "columns",
            }
            .into());
        }
        let mut definitions = Vec::with_capacity(params.columns.len());
        for (name, data_type) in &params.columns {
            let name = require(Self::OPERATION, "column", name)?;
            let data_type = require(Self::OPERATION, "data_type", data_type)?;
            definitions.push(format!("{name} {data_type}"));
        }
        let table = Identifier::qualified(params.domain.as_deref(), table);
        Ok(GeneratedStatement::single(Self::statement(&table, &definitions)))
    }

    fn build_row(
        row: &CreateRow,
        _options: &GenerateOptions,
    ) -> std::result::Result<GeneratedStatement, RowIssue> {
        let table = Identifier::qualified(row.domain.as_deref(), &row.table);
        let definition = format!("{} {}", row.column, row.data_type);
        Ok(GeneratedStatement::single(Self::statement(&table, &[definition])))
    }

    /// Rows are grouped by table in first-seen order. The first row of a
    /// table decides its domain; column order follows row order.
    fn build_rows(
        rows: Vec<(usize, CreateRow)>,
        _options: &GenerateOptions,
    ) -> (Vec<GeneratedStatement>, Vec<RowError>) {
        let mut groups: Vec<TableGroup> = vec![];
        for (_, row) in rows {
            let definition = format!("{} {}", row.column, row.data_type);
            if let Some(group) = groups.iter_mut().find(|g| g.name == row.table) {
                group.definitions.push(definition);
            } else {
                groups.push(TableGroup {
                    name: row.table,
                    domain: row.domain,
                    definitions: vec![definition],
                });
            }
        }

        let statements = groups
            .into_iter()
            .map(|group| {
                let table = Identifier::qualified(group.domain.as_deref(), &group.name);
                GeneratedStatement::single(Self::statement(&table, &group.definitions))
            })
            .collect();
        (statements, vec![])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(domain: &str, table: &str, column: &str, data_type: &str) -> (usize, CreateRow) {
        (
            0,
            CreateRow {
                domain: (!domain.is_empty()).then(|| String::from(domain)),
                table: String::from(table),
                column: String::from(column),
                data_type: String::from(data_type),
            },
        )
    }

    #[test]
    fn test_groups_in_first_seen_order() {
        let rows = vec![
            row("dw", "users", "id", "INT"),
            row("dw", "orders", "id", "INT"),
            row("dw", "users", "name", "VARCHAR(100)"),
            row("dw", "orders", "total", "DECIMAL(10,2)"),
        ];
        let (groups, errors) = CreateBuilder::build_rows(rows, &GenerateOptions::default());
        assert!(errors.is_empty());
        assert_eq!(groups.len(), 2);
        assert_eq!(
            groups[0].statements(),
            ["CREATE TABLE dw.users (\n    id INT,\n    name VARCHAR(100)\n);"]
        );
        assert_eq!(
            groups[1].statements(),
            ["CREATE TABLE dw.orders (\n    id INT,\n    total DECIMAL(10,2)\n);"]
        );
    }

    #[test]
    fn test_without_domain_is_unqualified() {
        let (groups, _) =
            CreateBuilder::build_rows(vec![row("", "t", "a", "TEXT")], &GenerateOptions::default());
        assert_eq!(groups[0].statements(), ["CREATE TABLE t (\n    a TEXT\n);"]);
    }

    #[test]
    fn test_single_target() {
        let params = CreateParams::new("users")
            .domain("app")
            .column("id", "BIGINT")
            .column("email", "TEXT");
        let group = CreateBuilder::single(&params, &GenerateOptions::default()).unwrap();
        assert_eq!(
            group.statements(),
            ["CREATE TABLE app.users (\n    id BIGINT,\n    email TEXT\n);"]
        );
    }

    #[test]
    fn test_single_target_without_columns() {
        assert!(CreateBuilder::single(&CreateParams::new("t"), &GenerateOptions::default()).is_err());
    }
}
