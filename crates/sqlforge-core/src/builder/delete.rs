//! Delete-then-reload pairs.
//!
//! The `DELETE` removes every target row whose key appears in the source, and
//! the following `INSERT ... SELECT` copies the fresh rows back in.

use super::{
    non_empty, reload_insert, require, require_list, GenerateOptions, GeneratedStatement,
    StatementBuilder,
};
use crate::error::{Result, RowIssue};
use crate::ident::Identifier;
use crate::row::{split_list, DeleteRow, Identifiers, Operation};

/// Single-target parameters for a delete + reload pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeleteParams {
    /// Table to delete from and reload.
    pub target_table: String,
    /// Columns copied by the reload.
    pub columns: Vec<String>,
    /// Key column that selects the rows to replace.
    pub increment_field: String,
    /// Table holding the fresh rows.
    pub source_table: String,
}

impl Identifiers for DeleteParams {
    fn tables(&self) -> Vec<String> {
        vec![self.target_table.clone(), self.source_table.clone()]
    }

    fn columns(&self) -> Vec<String> {
        let mut columns = self.columns.clone();
        columns.push(self.increment_field.clone());
        columns
    }
}

/// Builds `DELETE` + reload `INSERT` pairs.
#[derive(Debug, Clone, Copy, Default)]
pub struct DeleteBuilder;

impl DeleteBuilder {
    fn delete(target: &Identifier, key: &str, source: &Identifier) -> String {
        format!("DELETE FROM {target}\nWHERE {key} IN (\n    SELECT {key} FROM {source}\n);")
    }
}

impl StatementBuilder for DeleteBuilder {
    const OPERATION: Operation = Operation::Delete;
    type Row = DeleteRow;
    type Params = DeleteParams;

    fn single(params: &DeleteParams, _options: &GenerateOptions) -> Result<GeneratedStatement> {
        let target = Identifier::parse(require(Self::OPERATION, "target_table", &params.target_table)?);
        let columns = require_list(Self::OPERATION, "columns", &params.columns)?;
        let key = require(Self::OPERATION, "increment_field", &params.increment_field)?;
        let source = Identifier::parse(require(Self::OPERATION, "source_table", &params.source_table)?);

        let columns = columns.join(", ");
        let reload = format!("INSERT INTO {target} ({columns})\nSELECT {columns}\nFROM {source};");
        Ok(GeneratedStatement::group(vec![
            Self::delete(&target, key, &source),
            reload,
        ]))
    }

    /// Both tables are qualified with the row's domain unless they already
    /// carry a schema of their own.
    fn build_row(
        row: &DeleteRow,
        options: &GenerateOptions,
    ) -> std::result::Result<GeneratedStatement, RowIssue> {
        let columns = non_empty("column_list", split_list(&row.column_list))?;
        let domain = row.domain.as_deref();
        let target = Identifier::qualified(domain, &row.target_table);
        let source = Identifier::qualified(domain, &row.source_table);

        Ok(GeneratedStatement::group(vec![
            Self::delete(&target, row.increment_field.trim(), &source),
            reload_insert(&target, &columns, &source),
        ])
        .with_banner(row.target_table.trim(), options.banners))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(domain: Option<&str>) -> DeleteRow {
        DeleteRow {
            domain: domain.map(String::from),
            target_table: String::from("orders"),
            column_list: String::from("id, total"),
            increment_field: String::from("id"),
            source_table: String::from("orders_stage"),
        }
    }

    #[test]
    fn test_single_target_pair() {
        let params = DeleteParams {
            target_table: String::from("t"),
            columns: vec![String::from("a"), String::from("b")],
            increment_field: String::from("id"),
            source_table: String::from("s"),
        };
        let group = DeleteBuilder::single(&params, &GenerateOptions::default()).unwrap();
        assert_eq!(group.banner(), None);
        assert_eq!(
            group.statements(),
            [
                "DELETE FROM t\nWHERE id IN (\n    SELECT id FROM s\n);",
                "INSERT INTO t (a, b)\nSELECT a, b\nFROM s;",
            ]
        );
    }

    #[test]
    fn test_single_target_missing_key() {
        let params = DeleteParams {
            target_table: String::from("t"),
            columns: vec![String::from("a")],
            increment_field: String::new(),
            source_table: String::from("s"),
        };
        assert!(DeleteBuilder::single(&params, &GenerateOptions::default()).is_err());
    }

    #[test]
    fn test_batch_row_with_domain() {
        let group = DeleteBuilder::build_row(&row(Some("dw")), &GenerateOptions::default()).unwrap();
        assert_eq!(group.banner(), Some("--------- orders ---------"));
        assert_eq!(
            group.statements()[0],
            "DELETE FROM dw.orders\nWHERE id IN (\n    SELECT id FROM dw.orders_stage\n);"
        );
        assert_eq!(
            group.statements()[1],
            "INSERT INTO dw.orders (\n    id,\n    total\n)\nSELECT\n    id,\n    total\nFROM dw.orders_stage;"
        );
    }

    #[test]
    fn test_batch_row_without_domain_or_banner() {
        let options = GenerateOptions {
            banners: false,
            ..GenerateOptions::default()
        };
        let group = DeleteBuilder::build_row(&row(None), &options).unwrap();
        assert_eq!(group.banner(), None);
        assert!(group.statements()[0].starts_with("DELETE FROM orders\n"));
    }
}
