//! Typed configuration rows, one shape per operation.
//!
//! A row source hands out positional string records. Each operation parses
//! its records into a closed row type here, so a missing field is caught once
//! at the boundary instead of by optional-key lookups in every builder.

use std::fmt;

use crate::error::RowIssue;

/// The statement families the generator supports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    /// `CREATE TABLE`, grouped by table.
    Create,
    /// `SELECT ... FROM ...`.
    Select,
    /// `INSERT INTO ... VALUES ...`.
    Insert,
    /// `DELETE` keyed on a source table, then a reload `INSERT`.
    Delete,
    /// `MERGE INTO ... USING ...` upsert.
    Merge,
    /// `TRUNCATE TABLE`, optionally followed by a reload `INSERT`.
    Truncate,
}

impl Operation {
    /// All operations, in the order the generator documents them.
    pub const ALL: [Self; 6] = [
        Self::Create,
        Self::Select,
        Self::Insert,
        Self::Delete,
        Self::Merge,
        Self::Truncate,
    ];

    /// Name of the sheet that holds this operation's rows.
    #[must_use]
    pub const fn sheet_name(&self) -> &'static str {
        match self {
            Self::Create => "create",
            Self::Select => "select",
            Self::Insert => "insert",
            Self::Delete => "delete",
            Self::Merge => "merge",
            Self::Truncate => "truncate",
        }
    }

    /// Looks an operation up by sheet name (case-insensitive).
    #[must_use]
    pub fn from_sheet_name(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|op| op.sheet_name().eq_ignore_ascii_case(name.trim()))
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.sheet_name())
    }
}

/// Splits a comma-joined list, trimming entries and dropping blank ones.
#[must_use]
pub fn split_list(list: &str) -> Vec<String> {
    list.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

fn cell(record: &[String], index: usize) -> Option<&str> {
    record
        .get(index)
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
}

fn required(record: &[String], index: usize, name: &'static str) -> Result<String, RowIssue> {
    cell(record, index)
        .map(String::from)
        .ok_or(RowIssue::MissingField(name))
}

fn optional(record: &[String], index: usize) -> Option<String> {
    cell(record, index).map(String::from)
}

/// Identifiers a row or parameter set splices into generated SQL.
pub trait Identifiers {
    /// Table identifiers (checked in strict mode).
    fn tables(&self) -> Vec<String>;

    /// Column identifiers (checked in strict mode).
    fn columns(&self) -> Vec<String>;
}

/// A row type that can be parsed from a positional record.
pub trait ConfigRow: Identifiers + Sized {
    /// Parses the positional record.
    fn from_record(record: &[String]) -> Result<Self, RowIssue>;
}

/// `{domain?, table, column, data_type}`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateRow {
    /// Optional schema qualifier.
    pub domain: Option<String>,
    /// Table the column belongs to.
    pub table: String,
    /// Column name.
    pub column: String,
    /// Column type, emitted verbatim.
    pub data_type: String,
}

impl ConfigRow for CreateRow {
    fn from_record(record: &[String]) -> Result<Self, RowIssue> {
        Ok(Self {
            domain: optional(record, 0),
            table: required(record, 1, "table")?,
            column: required(record, 2, "column")?,
            data_type: required(record, 3, "data_type")?,
        })
    }
}

impl Identifiers for CreateRow {
    fn tables(&self) -> Vec<String> {
        vec![self.table.clone()]
    }

    fn columns(&self) -> Vec<String> {
        vec![self.column.clone()]
    }
}

/// `{table, field_list}`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectRow {
    /// Table to select from.
    pub table: String,
    /// Raw select list, emitted verbatim.
    pub field_list: String,
}

impl ConfigRow for SelectRow {
    fn from_record(record: &[String]) -> Result<Self, RowIssue> {
        Ok(Self {
            table: required(record, 0, "table")?,
            field_list: required(record, 1, "field_list")?,
        })
    }
}

impl Identifiers for SelectRow {
    fn tables(&self) -> Vec<String> {
        vec![self.table.clone()]
    }

    // The field list is a free-form select list and is not checked.
    fn columns(&self) -> Vec<String> {
        Vec::new()
    }
}

/// `{table, column_list, value_list}`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InsertRow {
    /// Target table.
    pub table: String,
    /// Comma-joined column names.
    pub column_list: String,
    /// Comma-joined values, emitted verbatim.
    pub value_list: String,
}

impl ConfigRow for InsertRow {
    fn from_record(record: &[String]) -> Result<Self, RowIssue> {
        Ok(Self {
            table: required(record, 0, "table")?,
            column_list: required(record, 1, "column_list")?,
            value_list: required(record, 2, "value_list")?,
        })
    }
}

impl Identifiers for InsertRow {
    fn tables(&self) -> Vec<String> {
        vec![self.table.clone()]
    }

    fn columns(&self) -> Vec<String> {
        split_list(&self.column_list)
    }
}

/// `{domain, target_table, column_list, increment_field, source_table}`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeleteRow {
    /// Schema qualifier applied to both tables; blank leaves them unqualified.
    pub domain: Option<String>,
    /// Table rows are deleted from and reloaded into.
    pub target_table: String,
    /// Comma-joined columns copied by the reload.
    pub column_list: String,
    /// Key column that selects the rows to replace.
    pub increment_field: String,
    /// Table holding the fresh rows.
    pub source_table: String,
}

impl ConfigRow for DeleteRow {
    fn from_record(record: &[String]) -> Result<Self, RowIssue> {
        Ok(Self {
            domain: optional(record, 0),
            target_table: required(record, 1, "target_table")?,
            column_list: required(record, 2, "column_list")?,
            increment_field: required(record, 3, "increment_field")?,
            source_table: required(record, 4, "source_table")?,
        })
    }
}

impl Identifiers for DeleteRow {
    fn tables(&self) -> Vec<String> {
        vec![self.target_table.clone(), self.source_table.clone()]
    }

    fn columns(&self) -> Vec<String> {
        let mut columns = split_list(&self.column_list);
        columns.push(self.increment_field.clone());
        columns
    }
}

/// `{target_table, target_column_list, unique_id, source_table, source_column_list}`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergeRow {
    /// Table being upserted into.
    pub target_table: String,
    /// Comma-joined target columns.
    pub target_column_list: String,
    /// Key column used in the `ON` clause.
    pub unique_id: String,
    /// Table aliased as `SOURCE`.
    pub source_table: String,
    /// Comma-joined source columns, positionally aligned with the targets.
    pub source_column_list: String,
}

impl ConfigRow for MergeRow {
    fn from_record(record: &[String]) -> Result<Self, RowIssue> {
        Ok(Self {
            target_table: required(record, 0, "target_table")?,
            target_column_list: required(record, 1, "target_column_list")?,
            unique_id: required(record, 2, "unique_id")?,
            source_table: required(record, 3, "source_table")?,
            source_column_list: required(record, 4, "source_column_list")?,
        })
    }
}

impl Identifiers for MergeRow {
    fn tables(&self) -> Vec<String> {
        vec![self.target_table.clone(), self.source_table.clone()]
    }

    fn columns(&self) -> Vec<String> {
        let mut columns = split_list(&self.target_column_list);
        columns.extend(split_list(&self.source_column_list));
        columns.push(self.unique_id.clone());
        columns
    }
}

/// `{table}` for a plain truncate, or
/// `{target_table, target_column_list, source_table}` for truncate + reload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TruncateRow {
    /// `TRUNCATE TABLE {table};`
    Simple {
        /// Table to truncate.
        table: String,
    },
    /// Truncate, then refill from a source table.
    Reload {
        /// Table to truncate and refill.
        target_table: String,
        /// Comma-joined columns copied by the reload.
        target_column_list: String,
        /// Table holding the fresh rows.
        source_table: String,
    },
}

impl ConfigRow for TruncateRow {
    /// The shape is picked from the record: one filled cell is a simple
    /// truncate, anything wider must carry all three reload fields.
    fn from_record(record: &[String]) -> Result<Self, RowIssue> {
        let filled = record
            .iter()
            .rposition(|c| !c.trim().is_empty())
            .map_or(0, |i| i + 1);

        if filled <= 1 {
            return Ok(Self::Simple {
                table: required(record, 0, "table")?,
            });
        }

        Ok(Self::Reload {
            target_table: required(record, 0, "target_table")?,
            target_column_list: required(record, 1, "target_column_list")?,
            source_table: required(record, 2, "source_table")?,
        })
    }
}

impl Identifiers for TruncateRow {
    fn tables(&self) -> Vec<String> {
        match self {
            Self::Simple { table } => vec![table.clone()],
            Self::Reload {
                target_table,
                source_table,
                ..
            } => vec![target_table.clone(), source_table.clone()],
        }
    }

    fn columns(&self) -> Vec<String> {
        match self {
            Self::Simple { .. } => Vec::new(),
            Self::Reload {
                target_column_list, ..
            } => split_list(target_column_list),
        }
    }
}

/// One configuration record, tagged by operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OperationRow {
    /// A column of a table to create.
    Create(CreateRow),
    /// A select statement.
    Select(SelectRow),
    /// An insert statement.
    Insert(InsertRow),
    /// A delete + reload pair.
    Delete(DeleteRow),
    /// A merge upsert.
    Merge(MergeRow),
    /// A truncate, optionally with reload.
    Truncate(TruncateRow),
}

impl OperationRow {
    /// Parses a positional record for the given operation.
    pub fn parse(operation: Operation, record: &[String]) -> Result<Self, RowIssue> {
        Ok(match operation {
            Operation::Create => Self::Create(CreateRow::from_record(record)?),
            Operation::Select => Self::Select(SelectRow::from_record(record)?),
            Operation::Insert => Self::Insert(InsertRow::from_record(record)?),
            Operation::Delete => Self::Delete(DeleteRow::from_record(record)?),
            Operation::Merge => Self::Merge(MergeRow::from_record(record)?),
            Operation::Truncate => Self::Truncate(TruncateRow::from_record(record)?),
        })
    }

    /// Returns the operation this row belongs to.
    #[must_use]
    pub const fn operation(&self) -> Operation {
        match self {
            Self::Create(_) => Operation::Create,
            Self::Select(_) => Operation::Select,
            Self::Insert(_) => Operation::Insert,
            Self::Delete(_) => Operation::Delete,
            Self::Merge(_) => Operation::Merge,
            Self::Truncate(_) => Operation::Truncate,
        }
    }
}
