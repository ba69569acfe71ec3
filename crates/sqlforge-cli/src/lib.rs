//! Command implementations behind the `sqlforge` binary.
//!
//! The binary parses arguments and sets up logging; everything it does with
//! the parsed arguments lives here so it can be tested without a process.
//!
//! # CLI Usage
//!
//! ```bash
//! # Generate MERGE statements for every row of the `merge` sheet
//! sqlforge generate merge --source config.json
//!
//! # One SELECT from flags
//! sqlforge generate select --table users --columns id,name
//!
//! # Check a script, exit non-zero when it is malformed
//! sqlforge validate deploy.sql
//!
//! # Reindent from stdin
//! cat query.sql | sqlforge format --lowercase-identifiers
//!
//! # One-off DDL and maintenance queries
//! sqlforge ddl index orders --columns customer_id,placed_at
//! sqlforge pattern backup orders --suffix 20240131
//! sqlforge template render simple_select -p columns=id -p table=t -p condition="id = 1"
//! ```

pub mod ddl;
pub mod patterns;

use std::io::Read;
use std::path::Path;

use anyhow::{bail, Context};
use clap::Args;
use tracing::{debug, warn};

use sqlforge_core::assemble::assemble;
use sqlforge_core::builder::{CreateParams, DeleteParams, SelectParams, TruncateParams};
use sqlforge_core::format::format_statements;
use sqlforge_core::row::{split_list, InsertRow, MergeRow};
use sqlforge_core::{Batch, GenerateOptions, GenerationContext, JsonSource, Operation};

/// Flags that describe a single target when no row source is given.
#[derive(Debug, Clone, Default, Args)]
pub struct TargetArgs {
    /// Target table.
    #[arg(short, long)]
    pub table: Option<String>,

    /// Comma-separated columns. For `create`, comma-separated
    /// `name TYPE` definitions.
    #[arg(short, long)]
    pub columns: Option<String>,

    /// Comma-separated values (`insert`).
    #[arg(long)]
    pub values: Option<String>,

    /// Key column (`merge`) or increment field (`delete`).
    #[arg(long)]
    pub unique_id: Option<String>,

    /// Table the rows come from (`delete`, `merge`).
    #[arg(long)]
    pub source_table: Option<String>,

    /// Source columns for `merge`; defaults to `--columns`.
    #[arg(long)]
    pub source_columns: Option<String>,

    /// Schema qualifier (`create`).
    #[arg(long)]
    pub domain: Option<String>,
}

fn text(value: Option<&String>) -> String {
    value.cloned().unwrap_or_default()
}

/// Splits `id INT, total DECIMAL(10,2)` on top-level commas.
fn split_definitions(list: &str) -> Vec<&str> {
    let mut parts = vec![];
    let mut depth = 0usize;
    let mut start = 0;
    for (i, c) in list.char_indices() {
        match c {
            '(' => depth += 1,
            ')' => depth = depth.saturating_sub(1),
            ',' if depth == 0 => {
                parts.push(list[start..i].trim());
                start = i + 1;
            }
            _ => {}
        }
    }
    parts.push(list[start..].trim());
    parts.retain(|p| !p.is_empty());
    parts
}

impl TargetArgs {
    fn create(&self) -> anyhow::Result<Option<CreateParams>> {
        let Some(table) = &self.table else {
            return Ok(None);
        };
        let mut params = CreateParams::new(table);
        if let Some(domain) = &self.domain {
            params = params.domain(domain);
        }
        for definition in split_definitions(self.columns.as_deref().unwrap_or_default()) {
            let Some((name, data_type)) = definition.split_once(char::is_whitespace) else {
                bail!("column definition `{definition}` needs a name and a type");
            };
            params = params.column(name, data_type.trim());
        }
        Ok(Some(params))
    }

    fn select(&self) -> Option<SelectParams> {
        let table = self.table.as_deref()?;
        let columns = split_list(self.columns.as_deref().unwrap_or("*"));
        Some(SelectParams::new(table, columns))
    }

    fn insert(&self) -> Option<InsertRow> {
        Some(InsertRow {
            table: self.table.clone()?,
            column_list: text(self.columns.as_ref()),
            value_list: text(self.values.as_ref()),
        })
    }

    fn delete(&self) -> Option<DeleteParams> {
        Some(DeleteParams {
            target_table: self.table.clone()?,
            columns: split_list(self.columns.as_deref().unwrap_or_default()),
            increment_field: text(self.unique_id.as_ref()),
            source_table: text(self.source_table.as_ref()),
        })
    }

    fn merge(&self) -> Option<MergeRow> {
        let columns = text(self.columns.as_ref());
        Some(MergeRow {
            target_table: self.table.clone()?,
            source_column_list: self.source_columns.clone().unwrap_or_else(|| columns.clone()),
            target_column_list: columns,
            unique_id: text(self.unique_id.as_ref()),
            source_table: text(self.source_table.as_ref()),
        })
    }

    fn truncate(&self) -> Option<TruncateParams> {
        self.table.as_deref().map(TruncateParams::new)
    }
}

/// Parses an operation name as written on the command line.
///
/// # Errors
///
/// Returns the list of known operations when the name is not one of them.
pub fn parse_operation(name: &str) -> Result<Operation, String> {
    Operation::from_sheet_name(name).ok_or_else(|| {
        let known: Vec<&str> = Operation::ALL.iter().map(Operation::sheet_name).collect();
        format!("unknown operation `{name}`; expected one of {}", known.join(", "))
    })
}

/// Runs one generator, from the JSON row source when given and from the
/// target flags otherwise.
///
/// # Errors
///
/// Returns an error if the source cannot be loaded or there is nothing to
/// generate from.
pub fn generate(
    operation: Operation,
    source: Option<&Path>,
    target: &TargetArgs,
    options: GenerateOptions,
) -> anyhow::Result<Batch> {
    let mut ctx = GenerationContext::new().with_options(options);
    if let Some(path) = source {
        let source = JsonSource::from_path(path)
            .with_context(|| format!("failed to load row source {}", path.display()))?;
        debug!(path = %path.display(), sheets = ?source.operations(), "loaded row source");
        ctx = ctx.with_source(source);
    }

    let batch = match operation {
        Operation::Create => ctx.bulk_create(target.create()?.as_ref()),
        Operation::Select => ctx.bulk_select(target.select().as_ref()),
        Operation::Insert => ctx.bulk_insert(target.insert().as_ref()),
        Operation::Delete => ctx.bulk_delete(target.delete().as_ref()),
        Operation::Merge => ctx.bulk_merge(target.merge().as_ref()),
        Operation::Truncate => ctx.bulk_truncate(target.truncate().as_ref()),
    }?;

    if !batch.errors().is_empty() {
        warn!(
            %operation,
            skipped = batch.errors().len(),
            generated = batch.statement_count(),
            "some rows were skipped"
        );
    }
    Ok(batch)
}

/// Renders a batch. With `format` set, each statement is reindented on its
/// own and statements are separated by a blank line; banners are kept.
#[must_use]
pub fn render(batch: &Batch, format: bool) -> String {
    if !format {
        return batch.to_sql();
    }
    assemble(batch.groups().iter().flat_map(|group| {
        [
            group.banner().map(String::from).unwrap_or_default(),
            format_statements(group.statements()),
        ]
    }))
}

/// Reads SQL from a file, or from stdin when no path is given.
///
/// # Errors
///
/// Returns an error if the file or stdin cannot be read.
pub fn read_sql(path: Option<&Path>) -> anyhow::Result<String> {
    match path {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display())),
        None => {
            let mut sql = String::new();
            std::io::stdin()
                .read_to_string(&mut sql)
                .context("failed to read SQL from stdin")?;
            Ok(sql)
        }
    }
}

/// Writes generated text to a file, or to stdout when no path is given.
///
/// # Errors
///
/// Returns an error if the file cannot be written.
pub fn write_output(path: Option<&Path>, text: &str) -> anyhow::Result<()> {
    match path {
        Some(path) => {
            std::fs::write(path, format!("{text}\n"))
                .with_context(|| format!("failed to write {}", path.display()))?;
            debug!(path = %path.display(), bytes = text.len(), "wrote output");
        }
        None => println!("{text}"),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn target(table: &str, columns: &str) -> TargetArgs {
        TargetArgs {
            table: Some(String::from(table)),
            columns: Some(String::from(columns)),
            ..TargetArgs::default()
        }
    }

    #[test]
    fn test_parse_operation() {
        assert_eq!(parse_operation("MERGE"), Ok(Operation::Merge));
        assert!(parse_operation("upsert").unwrap_err().contains("create, select"));
    }

    #[test]
    fn test_split_definitions_respects_parens() {
        assert_eq!(
            split_definitions("id INT, total DECIMAL(10,2), "),
            ["id INT", "total DECIMAL(10,2)"]
        );
    }

    #[test]
    fn test_generate_single_select() {
        let batch = generate(
            Operation::Select,
            None,
            &target("t", "a,b"),
            GenerateOptions::default(),
        )
        .unwrap();
        assert_eq!(render(&batch, false), "SELECT a, b FROM t;");
    }

    #[test]
    fn test_generate_single_create() {
        let args = TargetArgs {
            domain: Some(String::from("app")),
            ..target("t", "id INT, amount DECIMAL(10,2)")
        };
        let batch = generate(Operation::Create, None, &args, GenerateOptions::default()).unwrap();
        assert_eq!(
            batch.to_sql(),
            "CREATE TABLE app.t (\n    id INT,\n    amount DECIMAL(10,2)\n);"
        );
    }

    #[test]
    fn test_generate_create_rejects_untyped_column() {
        assert!(generate(Operation::Create, None, &target("t", "id"), GenerateOptions::default())
            .is_err());
    }

    #[test]
    fn test_generate_merge_defaults_source_columns() {
        let args = TargetArgs {
            unique_id: Some(String::from("id")),
            source_table: Some(String::from("s")),
            ..target("t", "id, v")
        };
        let batch = generate(Operation::Merge, None, &args, GenerateOptions::default()).unwrap();
        assert!(batch.to_sql().contains("v = SOURCE.v"));
    }

    #[test]
    fn test_generate_without_target_fails() {
        assert!(generate(
            Operation::Truncate,
            None,
            &TargetArgs::default(),
            GenerateOptions::default()
        )
        .is_err());
    }

    #[test]
    fn test_generate_from_source_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rows.json");
        std::fs::write(&path, r#"{"insert": [["t", "a", "1"], ["t", "a, b", "1"]]}"#).unwrap();

        let batch = generate(
            Operation::Insert,
            Some(&path),
            &TargetArgs::default(),
            GenerateOptions::default(),
        )
        .unwrap();
        assert_eq!(batch.to_sql(), "INSERT INTO t (a) VALUES (1);");
        assert_eq!(batch.errors().len(), 1);
    }

    #[test]
    fn test_missing_source_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = generate(
            Operation::Select,
            Some(&dir.path().join("missing.json")),
            &TargetArgs::default(),
            GenerateOptions::default(),
        )
        .unwrap_err();
        assert!(err.to_string().starts_with("failed to load row source"));
    }

    #[test]
    fn test_render_formats_each_statement() {
        let args = TargetArgs {
            unique_id: Some(String::from("id")),
            source_table: Some(String::from("s")),
            ..target("t", "a")
        };
        let batch = generate(
            Operation::Delete,
            None,
            &args,
            GenerateOptions::default(),
        )
        .unwrap();
        let pretty = render(&batch, true);
        assert!(pretty.starts_with("DELETE\nFROM t\nWHERE id IN ("));
        assert!(pretty.contains(");\n\nINSERT INTO t (a)\nSELECT"));
    }

    #[test]
    fn test_read_and_write_files() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.sql");
        write_output(Some(&path), "SELECT 1;").unwrap();
        assert_eq!(read_sql(Some(&path)).unwrap(), "SELECT 1;\n");
    }
}
