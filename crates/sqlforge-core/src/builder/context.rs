//! The explicit context every builder call runs in.

use std::fmt;

use super::{
    Batch, CreateBuilder, CreateParams, DeleteBuilder, DeleteParams, InsertBuilder, MergeBuilder,
    SelectBuilder, SelectParams, StatementBuilder, TruncateBuilder, TruncateParams,
};
use crate::error::{ConfigurationError, Result, RowError, RowIssue};
use crate::row::{ConfigRow, Identifiers, InsertRow, MergeRow};
use crate::security::{is_safe_column_name, is_safe_table_name};
use crate::source::RowSource;

/// Switches that change the generated text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GenerateOptions {
    /// Emit `--------- {table} ---------` before grouped statements.
    pub banners: bool,
    /// Run every identifier through the security scanner and skip rows that
    /// fail.
    pub strict_identifiers: bool,
}

impl Default for GenerateOptions {
    fn default() -> Self {
        Self {
            banners: true,
            strict_identifiers: false,
        }
    }
}

/// Holds the optional row source and the options for a run.
///
/// When a source is present, batch mode wins over any single-target
/// parameters passed to an entry point.
#[derive(Default)]
pub struct GenerationContext {
    source: Option<Box<dyn RowSource>>,
    options: GenerateOptions,
}

impl fmt::Debug for GenerationContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GenerationContext")
            .field("source", &self.source.as_ref().map(|_| "RowSource"))
            .field("options", &self.options)
            .finish()
    }
}

impl GenerationContext {
    /// Creates a context with no source and default options.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Attaches a row source, switching every entry point to batch mode.
    #[must_use]
    pub fn with_source(mut self, source: impl RowSource + 'static) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    /// Replaces the options.
    #[must_use]
    pub const fn with_options(mut self, options: GenerateOptions) -> Self {
        self.options = options;
        self
    }

    /// Returns the active options.
    #[must_use]
    pub const fn options(&self) -> &GenerateOptions {
        &self.options
    }

    /// Returns true when a row source is attached.
    #[must_use]
    pub const fn has_source(&self) -> bool {
        self.source.is_some()
    }

    /// Generates `CREATE TABLE` statements, one per distinct table.
    ///
    /// # Errors
    ///
    /// Returns a configuration error when there is nothing to generate from.
    pub fn bulk_create(&self, params: Option<&CreateParams>) -> Result<Batch> {
        self.run::<CreateBuilder>(params)
    }

    /// Generates `SELECT` statements.
    ///
    /// # Errors
    ///
    /// Returns a configuration error when there is nothing to generate from.
    pub fn bulk_select(&self, params: Option<&SelectParams>) -> Result<Batch> {
        self.run::<SelectBuilder>(params)
    }

    /// Generates `INSERT ... VALUES` statements.
    ///
    /// # Errors
    ///
    /// Returns a configuration error when there is nothing to generate from.
    pub fn bulk_insert(&self, params: Option<&InsertRow>) -> Result<Batch> {
        self.run::<InsertBuilder>(params)
    }

    /// Generates `DELETE` + reload `INSERT` pairs.
    ///
    /// # Errors
    ///
    /// Returns a configuration error when there is nothing to generate from.
    pub fn bulk_delete(&self, params: Option<&DeleteParams>) -> Result<Batch> {
        self.run::<DeleteBuilder>(params)
    }

    /// Generates `MERGE` upserts.
    ///
    /// # Errors
    ///
    /// Returns a configuration error when there is nothing to generate from.
    pub fn bulk_merge(&self, params: Option<&MergeRow>) -> Result<Batch> {
        self.run::<MergeBuilder>(params)
    }

    /// Generates `TRUNCATE TABLE` statements, with reloads where configured.
    ///
    /// # Errors
    ///
    /// Returns a configuration error when there is nothing to generate from.
    pub fn bulk_truncate(&self, params: Option<&TruncateParams>) -> Result<Batch> {
        self.run::<TruncateBuilder>(params)
    }

    fn run<B: StatementBuilder>(&self, params: Option<&B::Params>) -> Result<Batch> {
        let operation = B::OPERATION;

        if let Some(source) = &self.source {
            let records = source
                .records(operation)
                .map_err(|source| ConfigurationError::Source { operation, source })?;

            let mut rows = Vec::with_capacity(records.len());
            let mut errors = vec![];
            for (index, record) in records.iter().enumerate() {
                let position = index + 1;
                if record.iter().all(|cell| cell.trim().is_empty()) {
                    continue;
                }
                let parsed = B::Row::from_record(record).and_then(|row| {
                    self.check_identifiers(&row)?;
                    Ok(row)
                });
                match parsed {
                    Ok(row) => rows.push((position, row)),
                    Err(issue) => {
                        tracing::warn!(%operation, row = position, %issue, "skipping row");
                        errors.push(RowError::new(position, issue));
                    }
                }
            }

            let (groups, build_errors) = B::build_rows(rows, &self.options);
            errors.extend(build_errors);
            errors.sort_by_key(|e| e.row);

            let batch = Batch::new(operation, groups, errors);
            tracing::debug!(
                %operation,
                records = records.len(),
                statements = batch.statement_count(),
                skipped = batch.errors().len(),
                "generated batch"
            );
            return Ok(batch);
        }

        let Some(params) = params else {
            return Err(ConfigurationError::NothingToGenerate { operation }.into());
        };
        self.check_identifiers(params)?;
        let group = B::single(params, &self.options)?;
        tracing::debug!(%operation, statements = group.statements().len(), "generated single target");
        Ok(Batch::new(operation, vec![group], vec![]))
    }

    fn check_identifiers(&self, item: &impl Identifiers) -> std::result::Result<(), RowIssue> {
        if !self.options.strict_identifiers {
            return Ok(());
        }
        if let Some(table) = item.tables().into_iter().find(|t| !is_safe_table_name(t)) {
            return Err(RowIssue::UnsafeIdentifier(table));
        }
        if let Some(column) = item.columns().into_iter().find(|c| !is_safe_column_name(c)) {
            return Err(RowIssue::UnsafeIdentifier(column));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::GenerateError;
    use crate::row::Operation;
    use crate::source::MemorySource;

    #[test]
    fn test_default_options() {
        let options = GenerateOptions::default();
        assert!(options.banners);
        assert!(!options.strict_identifiers);
    }

    #[test]
    fn test_nothing_to_generate() {
        let err = GenerationContext::new().bulk_merge(None).unwrap_err();
        assert!(matches!(
            err,
            GenerateError::Configuration(ConfigurationError::NothingToGenerate {
                operation: Operation::Merge
            })
        ));
    }

    #[test]
    fn test_missing_sheet_is_configuration_error() {
        let ctx = GenerationContext::new().with_source(MemorySource::new());
        let err = ctx.bulk_select(None).unwrap_err();
        assert!(matches!(
            err,
            GenerateError::Configuration(ConfigurationError::Source { .. })
        ));
    }

    #[test]
    fn test_empty_sheet_is_an_empty_batch() {
        let rows: Vec<Vec<String>> = vec![];
        let ctx = GenerationContext::new().with_source(MemorySource::new().with_sheet(Operation::Select, rows));
        let batch = ctx.bulk_select(None).unwrap();
        assert!(batch.is_empty());
        assert!(batch.errors().is_empty());
    }

    #[test]
    fn test_source_wins_over_params() {
        let ctx = GenerationContext::new()
            .with_source(MemorySource::new().with_sheet(Operation::Select, [["u", "x"]]));
        let batch = ctx.bulk_select(Some(&SelectParams::new("t", ["a"]))).unwrap();
        assert_eq!(batch.to_sql(), "SELECT x FROM u;");
    }

    #[test]
    fn test_blank_records_are_ignored() {
        let ctx = GenerationContext::new().with_source(
            MemorySource::new().with_sheet(Operation::Select, [["", ""], ["t", "a"]]),
        );
        let batch = ctx.bulk_select(None).unwrap();
        assert_eq!(batch.statement_count(), 1);
        assert!(batch.errors().is_empty());
    }

    #[test]
    fn test_strict_mode_skips_unsafe_rows() {
        let ctx = GenerationContext::new()
            .with_options(GenerateOptions {
                banners: true,
                strict_identifiers: true,
            })
            .with_source(MemorySource::new().with_sheet(
                Operation::Insert,
                [["t", "a", "1"], ["us;er", "a", "1"], ["t", "drop_me", "1"]],
            ));
        let batch = ctx.bulk_insert(None).unwrap();
        assert_eq!(batch.statement_count(), 1);
        assert_eq!(
            batch.errors()
                .iter()
                .map(|e| (e.row, e.issue.clone()))
                .collect::<Vec<_>>(),
            vec![
                (2, RowIssue::UnsafeIdentifier(String::from("us;er"))),
                (3, RowIssue::UnsafeIdentifier(String::from("drop_me"))),
            ]
        );
    }

    #[test]
    fn test_strict_mode_rejects_single_target() {
        let ctx = GenerationContext::new().with_options(GenerateOptions {
            banners: true,
            strict_identifiers: true,
        });
        let err = ctx
            .bulk_select(Some(&SelectParams::new("t", ["a;b"])))
            .unwrap_err();
        assert!(matches!(err, GenerateError::Row(RowIssue::UnsafeIdentifier(_))));
    }
}
