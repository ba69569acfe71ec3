//! `INSERT INTO {table} ({columns}) VALUES ({values});`

use super::{GenerateOptions, GeneratedStatement, StatementBuilder};
use crate::error::{Result, RowIssue};
use crate::row::{split_list, InsertRow, Operation};

/// Builds `INSERT ... VALUES` statements.
///
/// Columns and values are split on commas and zipped positionally. Values are
/// emitted as written, so string literals must carry their own quotes.
#[derive(Debug, Clone, Copy, Default)]
pub struct InsertBuilder;

impl StatementBuilder for InsertBuilder {
    const OPERATION: Operation = Operation::Insert;
    type Row = InsertRow;
    type Params = InsertRow;

    fn single(params: &InsertRow, options: &GenerateOptions) -> Result<GeneratedStatement> {
        super::require(Self::OPERATION, "table", &params.table)?;
        super::require(Self::OPERATION, "column_list", &params.column_list)?;
        super::require(Self::OPERATION, "value_list", &params.value_list)?;
        Ok(Self::build_row(params, options)?)
    }

    fn build_row(
        row: &InsertRow,
        _options: &GenerateOptions,
    ) -> std::result::Result<GeneratedStatement, RowIssue> {
        let columns = split_list(&row.column_list);
        let values = split_list(&row.value_list);
        if columns.len() != values.len() {
            return Err(RowIssue::ShapeMismatch {
                left: "column_list",
                left_len: columns.len(),
                right: "value_list",
                right_len: values.len(),
            });
        }
        let columns = super::non_empty("column_list", columns)?;

        let mut sql = String::from("INSERT INTO ");
        sql.push_str(row.table.trim());
        sql.push_str(" (");
        sql.push_str(&columns.join(", "));
        sql.push_str(") VALUES (");
        sql.push_str(&values.join(", "));
        sql.push_str(");");
        Ok(GeneratedStatement::single(sql))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(table: &str, columns: &str, values: &str) -> InsertRow {
        InsertRow {
            table: String::from(table),
            column_list: String::from(columns),
            value_list: String::from(values),
        }
    }

    #[test]
    fn test_zips_columns_and_values() {
        let group = InsertBuilder::build_row(&row("t", "a,b", "1,2"), &GenerateOptions::default())
            .unwrap();
        assert_eq!(group.statements(), ["INSERT INTO t (a, b) VALUES (1, 2);"]);
    }

    #[test]
    fn test_values_are_trimmed_but_not_quoted() {
        let group = InsertBuilder::build_row(
            &row("dw.t", " a , b ", " 'x' ,  NULL "),
            &GenerateOptions::default(),
        )
        .unwrap();
        assert_eq!(group.statements(), ["INSERT INTO dw.t (a, b) VALUES ('x', NULL);"]);
    }

    #[test]
    fn test_length_mismatch_is_a_row_issue() {
        let err = InsertBuilder::build_row(&row("t", "a,b", "1,2,3"), &GenerateOptions::default())
            .unwrap_err();
        assert_eq!(
            err,
            RowIssue::ShapeMismatch {
                left: "column_list",
                left_len: 2,
                right: "value_list",
                right_len: 3,
            }
        );
    }

    #[test]
    fn test_single_target_reports_mismatch_as_error() {
        let result = InsertBuilder::single(&row("t", "a", "1,2"), &GenerateOptions::default());
        assert!(matches!(
            result,
            Err(crate::error::GenerateError::Row(RowIssue::ShapeMismatch { .. }))
        ));
    }
}
