//! Statement builders, one per operation.
//!
//! Every builder runs in two modes:
//!
//! - **single-target**: explicit parameters describe one statement (or one
//!   statement pair). A bad parameter set is an error.
//! - **batch**: rows come from a [`RowSource`](crate::source::RowSource). A
//!   bad row is recorded in [`Batch::errors`] and skipped, and the rest of the
//!   batch is still generated.
//!
//! Entry points live on [`GenerationContext`].
//!
//! # Example
//!
//! ```rust
//! use sqlforge_core::builder::{GenerationContext, SelectParams};
//!
//! let ctx = GenerationContext::new();
//! let batch = ctx.bulk_select(Some(&SelectParams::new("t", ["a", "b"]))).unwrap();
//!
//! assert_eq!(batch.to_sql(), "SELECT a, b FROM t;");
//! ```

mod context;
mod create;
mod delete;
mod insert;
mod merge;
mod select;
mod truncate;

pub use context::{GenerateOptions, GenerationContext};
pub use create::{CreateBuilder, CreateParams};
pub use delete::{DeleteBuilder, DeleteParams};
pub use insert::InsertBuilder;
pub use merge::MergeBuilder;
pub use select::{SelectBuilder, SelectParams};
pub use truncate::{TruncateBuilder, TruncateParams};

use crate::assemble::TextAssembler;
use crate::error::{ConfigurationError, Result, RowError, RowIssue};
use crate::ident::Identifier;
use crate::row::{ConfigRow, Identifiers, Operation};

/// Builds the `--------- {table} ---------` line that precedes a group.
#[must_use]
pub fn banner(table: &str) -> String {
    format!("--------- {table} ---------")
}

/// One or more complete statements generated for a single target, with an
/// optional banner naming the table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedStatement {
    banner: Option<String>,
    statements: Vec<String>,
}

impl GeneratedStatement {
    /// Wraps a single statement.
    #[must_use]
    pub fn single(statement: String) -> Self {
        Self {
            banner: None,
            statements: vec![statement],
        }
    }

    /// Wraps a group of statements that belong together.
    #[must_use]
    pub fn group(statements: Vec<String>) -> Self {
        Self {
            banner: None,
            statements,
        }
    }

    /// Adds a banner for `table` when `enabled` is set.
    #[must_use]
    pub fn with_banner(mut self, table: &str, enabled: bool) -> Self {
        self.banner = enabled.then(|| banner(table));
        self
    }

    /// Returns the banner line, if any.
    #[must_use]
    pub fn banner(&self) -> Option<&str> {
        self.banner.as_deref()
    }

    /// Returns the statements, each terminated by `;`.
    #[must_use]
    pub fn statements(&self) -> &[String] {
        &self.statements
    }

    /// Renders the banner and statements as one block of text.
    #[must_use]
    pub fn render(&self) -> String {
        let mut assembler = TextAssembler::new();
        self.push_into(&mut assembler);
        assembler.finish()
    }

    fn push_into(&self, assembler: &mut TextAssembler) {
        if let Some(banner) = &self.banner {
            assembler.push(banner);
        }
        assembler.extend(&self.statements);
    }
}

/// The result of a builder call: generated groups in input order plus the
/// rows that were skipped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Batch {
    operation: Operation,
    groups: Vec<GeneratedStatement>,
    errors: Vec<RowError>,
}

impl Batch {
    pub(crate) const fn new(
        operation: Operation,
        groups: Vec<GeneratedStatement>,
        errors: Vec<RowError>,
    ) -> Self {
        Self {
            operation,
            groups,
            errors,
        }
    }

    /// Returns the operation that produced this batch.
    #[must_use]
    pub const fn operation(&self) -> Operation {
        self.operation
    }

    /// Returns the generated groups, in input order.
    #[must_use]
    pub fn groups(&self) -> &[GeneratedStatement] {
        &self.groups
    }

    /// Returns every generated statement, flattened, without banners.
    pub fn statements(&self) -> impl Iterator<Item = &str> {
        self.groups
            .iter()
            .flat_map(|g| g.statements.iter().map(String::as_str))
    }

    /// Returns the number of generated statements.
    #[must_use]
    pub fn statement_count(&self) -> usize {
        self.groups.iter().map(|g| g.statements.len()).sum()
    }

    /// Returns the rows that were skipped, with the reason.
    #[must_use]
    pub fn errors(&self) -> &[RowError] {
        &self.errors
    }

    /// Returns true when nothing was generated.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.statement_count() == 0
    }

    /// Assembles every group into the final newline-joined text.
    #[must_use]
    pub fn to_sql(&self) -> String {
        let mut assembler = TextAssembler::new();
        for group in &self.groups {
            group.push_into(&mut assembler);
        }
        assembler.finish()
    }

    /// Splits the batch into its groups and errors.
    #[must_use]
    pub fn into_parts(self) -> (Vec<GeneratedStatement>, Vec<RowError>) {
        (self.groups, self.errors)
    }
}

/// Turns parameters or rows of one operation into statements.
pub trait StatementBuilder {
    /// The operation this builder implements.
    const OPERATION: Operation;

    /// Batch row type.
    type Row: ConfigRow;

    /// Single-target parameter type.
    type Params: Identifiers;

    /// Builds the statements for one explicit target.
    ///
    /// # Errors
    ///
    /// Returns an error if a required parameter is empty or the parameters
    /// are inconsistent.
    fn single(params: &Self::Params, options: &GenerateOptions) -> Result<GeneratedStatement>;

    /// Builds the statements for one batch row.
    ///
    /// # Errors
    ///
    /// Returns the issue that makes the row unusable.
    fn build_row(
        row: &Self::Row,
        options: &GenerateOptions,
    ) -> std::result::Result<GeneratedStatement, RowIssue>;

    /// Builds a whole batch. Rows arrive with their 1-based sheet position.
    ///
    /// The default builds each row independently and records failures.
    fn build_rows(
        rows: Vec<(usize, Self::Row)>,
        options: &GenerateOptions,
    ) -> (Vec<GeneratedStatement>, Vec<RowError>) {
        let mut groups = Vec::with_capacity(rows.len());
        let mut errors = vec![];
        for (position, row) in rows {
            match Self::build_row(&row, options) {
                Ok(group) => groups.push(group),
                Err(issue) => {
                    tracing::warn!(
                        operation = %Self::OPERATION,
                        row = position,
                        %issue,
                        "skipping row"
                    );
                    errors.push(RowError::new(position, issue));
                }
            }
        }
        (groups, errors)
    }
}

/// Returns the trimmed parameter, or a `MissingParameter` error when blank.
pub(crate) fn require<'a>(
    operation: Operation,
    parameter: &'static str,
    value: &'a str,
) -> Result<&'a str> {
    let value = value.trim();
    if value.is_empty() {
        return Err(ConfigurationError::MissingParameter {
            operation,
            parameter,
        }
        .into());
    }
    Ok(value)
}

/// Like [`require`] for a list parameter; blank entries are dropped.
pub(crate) fn require_list(
    operation: Operation,
    parameter: &'static str,
    values: &[String],
) -> Result<Vec<String>> {
    let values: Vec<String> = values
        .iter()
        .map(|v| v.trim())
        .filter(|v| !v.is_empty())
        .map(String::from)
        .collect();
    if values.is_empty() {
        return Err(ConfigurationError::MissingParameter {
            operation,
            parameter,
        }
        .into());
    }
    Ok(values)
}

/// Rejects an empty split list with `InvalidValue`.
pub(crate) fn non_empty(
    field: &'static str,
    values: Vec<String>,
) -> std::result::Result<Vec<String>, RowIssue> {
    if values.is_empty() {
        return Err(RowIssue::InvalidValue {
            field,
            message: String::from("list has no entries"),
        });
    }
    Ok(values)
}

/// Joins `items` one per line at `depth` levels of four-space indentation.
pub(crate) fn indented_list(items: &[String], depth: usize) -> String {
    let pad = "    ".repeat(depth);
    items
        .iter()
        .map(|item| format!("{pad}{item}"))
        .collect::<Vec<_>>()
        .join(",\n")
}

/// The multi-line `INSERT ... SELECT` used to reload a table from a source.
pub(crate) fn reload_insert(target: &Identifier, columns: &[String], source: &Identifier) -> String {
    let list = indented_list(columns, 1);
    format!("INSERT INTO {target} (\n{list}\n)\nSELECT\n{list}\nFROM {source};")
}
