//! `TRUNCATE TABLE`, with an optional reload from a source table.

use super::{non_empty, reload_insert, require, GenerateOptions, GeneratedStatement, StatementBuilder};
use crate::error::{Result, RowIssue};
use crate::ident::Identifier;
use crate::row::{split_list, Identifiers, Operation, TruncateRow};
use crate::security::is_safe_table_name;

/// Single-target parameters: the table to truncate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TruncateParams {
    /// Table to truncate.
    pub table: String,
}

impl TruncateParams {
    /// Creates truncate parameters.
    #[must_use]
    pub fn new(table: &str) -> Self {
        Self {
            table: String::from(table),
        }
    }
}

impl Identifiers for TruncateParams {
    fn tables(&self) -> Vec<String> {
        vec![self.table.clone()]
    }

    fn columns(&self) -> Vec<String> {
        vec![]
    }
}

/// Builds `TRUNCATE TABLE` statements.
#[derive(Debug, Clone, Copy, Default)]
pub struct TruncateBuilder;

fn truncate(table: &Identifier) -> String {
    format!("TRUNCATE TABLE {table};")
}

impl StatementBuilder for TruncateBuilder {
    const OPERATION: Operation = Operation::Truncate;
    type Row = TruncateRow;
    type Params = TruncateParams;

    /// The table name is always checked here, strict mode or not, since a
    /// single-target truncate usually comes straight from user input.
    fn single(params: &TruncateParams, _options: &GenerateOptions) -> Result<GeneratedStatement> {
        let table = require(Self::OPERATION, "table", &params.table)?;
        if !is_safe_table_name(table) {
            return Err(RowIssue::UnsafeIdentifier(String::from(table)).into());
        }
        Ok(GeneratedStatement::single(truncate(&Identifier::parse(table))))
    }

    fn build_row(
        row: &TruncateRow,
        options: &GenerateOptions,
    ) -> std::result::Result<GeneratedStatement, RowIssue> {
        match row {
            TruncateRow::Simple { table } => {
                Ok(GeneratedStatement::single(truncate(&Identifier::parse(table))))
            }
            TruncateRow::Reload {
                target_table,
                target_column_list,
                source_table,
            } => {
                let columns = non_empty("target_column_list", split_list(target_column_list))?;
                let target = Identifier::parse(target_table);
                let source = Identifier::parse(source_table);
                Ok(GeneratedStatement::group(vec![
                    truncate(&target),
                    reload_insert(&target, &columns, &source),
                ])
                .with_banner(&target.render(), options.banners))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::GenerateError;

    #[test]
    fn test_simple_row() {
        let row = TruncateRow::Simple {
            table: String::from("dw.orders"),
        };
        let group = TruncateBuilder::build_row(&row, &GenerateOptions::default()).unwrap();
        assert_eq!(group.banner(), None);
        assert_eq!(group.statements(), ["TRUNCATE TABLE dw.orders;"]);
    }

    #[test]
    fn test_reload_row() {
        let row = TruncateRow::Reload {
            target_table: String::from("t"),
            target_column_list: String::from("a, b"),
            source_table: String::from("s"),
        };
        let group = TruncateBuilder::build_row(&row, &GenerateOptions::default()).unwrap();
        assert_eq!(
            group.render(),
            "--------- t ---------\n\
             TRUNCATE TABLE t;\n\
             INSERT INTO t (\n    a,\n    b\n)\nSELECT\n    a,\n    b\nFROM s;"
        );
    }

    #[test]
    fn test_single_target_validates_name() {
        let options = GenerateOptions::default();
        let group = TruncateBuilder::single(&TruncateParams::new("sales.orders"), &options).unwrap();
        assert_eq!(group.statements(), ["TRUNCATE TABLE sales.orders;"]);

        let err = TruncateBuilder::single(&TruncateParams::new("t; DROP TABLE x"), &options)
            .unwrap_err();
        assert!(matches!(err, GenerateError::Row(RowIssue::UnsafeIdentifier(_))));
    }
}
