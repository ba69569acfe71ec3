//! `SELECT {fields} FROM {table};`

use super::{require, require_list, GenerateOptions, GeneratedStatement, StatementBuilder};
use crate::error::{Result, RowIssue};
use crate::row::{Identifiers, Operation, SelectRow};

/// Single-target parameters: a table and the columns to read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectParams {
    /// Table to select from.
    pub table: String,
    /// Columns, joined with `, ` in the output.
    pub columns: Vec<String>,
}

impl SelectParams {
    /// Creates select parameters.
    #[must_use]
    pub fn new<I, S>(table: &str, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            table: String::from(table),
            columns: columns.into_iter().map(Into::into).collect(),
        }
    }
}

impl Identifiers for SelectParams {
    fn tables(&self) -> Vec<String> {
        vec![self.table.clone()]
    }

    fn columns(&self) -> Vec<String> {
        self.columns.clone()
    }
}

/// Builds `SELECT` statements.
#[derive(Debug, Clone, Copy, Default)]
pub struct SelectBuilder;

impl SelectBuilder {
    fn statement(fields: &str, table: &str) -> String {
        format!("SELECT {fields} FROM {table};")
    }
}

impl StatementBuilder for SelectBuilder {
    const OPERATION: Operation = Operation::Select;
    type Row = SelectRow;
    type Params = SelectParams;

    fn single(params: &SelectParams, _options: &GenerateOptions) -> Result<GeneratedStatement> {
        let table = require(Self::OPERATION, "table", &params.table)?;
        let columns = require_list(Self::OPERATION, "columns", &params.columns)?;
        Ok(GeneratedStatement::single(Self::statement(&columns.join(", "), table)))
    }

    /// The field list is emitted verbatim, without re-splitting.
    fn build_row(
        row: &SelectRow,
        _options: &GenerateOptions,
    ) -> std::result::Result<GeneratedStatement, RowIssue> {
        Ok(GeneratedStatement::single(Self::statement(&row.field_list, &row.table)))
    }
}
