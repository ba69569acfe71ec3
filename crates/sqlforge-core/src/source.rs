//! Row sources: where batch configuration comes from.
//!
//! The generator never reads files on its own initiative. A caller hands a
//! [`RowSource`] to the [`GenerationContext`](crate::builder::GenerationContext)
//! and the builders pull one sheet of positional records per operation.

use std::collections::HashMap;
use std::path::Path;

use serde_json::Value;

use crate::row::Operation;

/// A positional record: one string per cell, in sheet column order.
pub type Record = Vec<String>;

/// Errors raised while reading a row source.
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    /// The backing file could not be read.
    #[error("failed to read row source: {0}")]
    Io(#[from] std::io::Error),

    /// The backing document is not valid JSON, or has the wrong shape.
    #[error("invalid row source document: {0}")]
    Json(#[from] serde_json::Error),

    /// The document has no sheet for the operation.
    #[error("row source has no `{0}` sheet")]
    MissingSheet(Operation),
}

/// Supplies the ordered records for an operation.
pub trait RowSource: Send + Sync {
    /// Returns every record of the operation's sheet, in order.
    ///
    /// # Errors
    ///
    /// Returns an error if the sheet does not exist or cannot be read.
    fn records(&self, operation: Operation) -> Result<Vec<Record>, SourceError>;
}

/// An in-memory row source, mostly useful for tests and embedding.
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    sheets: HashMap<Operation, Vec<Record>>,
}

impl MemorySource {
    /// Creates an empty source with no sheets.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds (or replaces) the sheet for an operation.
    #[must_use]
    pub fn with_sheet<R, C>(mut self, operation: Operation, rows: R) -> Self
    where
        R: IntoIterator<Item = C>,
        C: IntoIterator,
        C::Item: Into<String>,
    {
        let rows = rows
            .into_iter()
            .map(|row| row.into_iter().map(Into::into).collect())
            .collect();
        self.sheets.insert(operation, rows);
        self
    }
}

impl RowSource for MemorySource {
    fn records(&self, operation: Operation) -> Result<Vec<Record>, SourceError> {
        self.sheets
            .get(&operation)
            .cloned()
            .ok_or(SourceError::MissingSheet(operation))
    }
}

/// A row source backed by a JSON document of the form
/// `{"select": [["t", "a, b"], ...], "merge": [...]}`.
///
/// Cells may be strings, numbers, booleans, or null. Null becomes an empty
/// cell; numbers and booleans are stringified.
#[derive(Debug, Clone, Default)]
pub struct JsonSource {
    inner: MemorySource,
}

impl JsonSource {
    /// Loads a document from disk.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or is not a valid document.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, SourceError> {
        let text = std::fs::read_to_string(path)?;
        Self::parse(&text)
    }

    /// Parses a document from text.
    ///
    /// Sheets whose names are not operations are ignored.
    ///
    /// # Errors
    ///
    /// Returns an error if the text is not a JSON object of arrays of arrays.
    pub fn parse(text: &str) -> Result<Self, SourceError> {
        let document: HashMap<String, Vec<Vec<Value>>> = serde_json::from_str(text)?;
        let mut sheets = HashMap::new();
        for (name, rows) in document {
            let Some(operation) = Operation::from_sheet_name(&name) else {
                tracing::debug!(sheet = %name, "ignoring unknown sheet");
                continue;
            };
            let rows = rows
                .into_iter()
                .map(|row| row.iter().map(cell_text).collect())
                .collect();
            sheets.insert(operation, rows);
        }
        Ok(Self {
            inner: MemorySource { sheets },
        })
    }

    /// Returns the operations this document has sheets for.
    #[must_use]
    pub fn operations(&self) -> Vec<Operation> {
        Operation::ALL
            .into_iter()
            .filter(|op| self.inner.sheets.contains_key(op))
            .collect()
    }
}

impl RowSource for JsonSource {
    fn records(&self, operation: Operation) -> Result<Vec<Record>, SourceError> {
        self.inner.records(operation)
    }
}

fn cell_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
