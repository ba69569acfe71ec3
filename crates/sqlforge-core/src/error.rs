//! Error types for statement generation.
//!
//! Only configuration problems surface as `Err`. A bad row in a batch is
//! recorded as a [`RowError`] and skipped; validator and scanner findings are
//! returned inside their reports and never as errors.

use std::fmt;

use crate::row::Operation;
use crate::source::SourceError;

/// The caller did not supply what a builder needs to run at all.
#[derive(Debug, thiserror::Error)]
pub enum ConfigurationError {
    /// Neither a row source nor single-target parameters were provided.
    #[error("{operation}: provide single-target parameters or a row source")]
    NothingToGenerate {
        /// The operation that was requested.
        operation: Operation,
    },

    /// A required single-target parameter was empty.
    #[error("{operation}: missing required parameter `{parameter}`")]
    MissingParameter {
        /// The operation that was requested.
        operation: Operation,
        /// Name of the missing parameter.
        parameter: &'static str,
    },

    /// The row source could not provide rows for the operation.
    #[error("{operation}: row source unavailable: {source}")]
    Source {
        /// The operation that was requested.
        operation: Operation,
        /// Why the source failed.
        #[source]
        source: SourceError,
    },
}

/// What is wrong with a single configuration row (or a single-target request).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RowIssue {
    /// A required positional field is absent or blank.
    #[error("missing required field `{0}`")]
    MissingField(&'static str),

    /// Two comma-separated lists that must align have different lengths.
    #[error("{left} has {left_len} entries but {right} has {right_len}")]
    ShapeMismatch {
        /// Name of the first list.
        left: &'static str,
        /// Number of entries in the first list.
        left_len: usize,
        /// Name of the second list.
        right: &'static str,
        /// Number of entries in the second list.
        right_len: usize,
    },

    /// An identifier failed the security scanner.
    #[error("unsafe identifier `{0}`")]
    UnsafeIdentifier(String),

    /// A field has a value the generator cannot use.
    #[error("invalid value for `{field}`: {message}")]
    InvalidValue {
        /// Name of the field.
        field: &'static str,
        /// What is wrong with it.
        message: String,
    },
}

/// A row-level failure recorded while a batch keeps going.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowError {
    /// 1-based position of the row in its sheet.
    pub row: usize,
    /// What went wrong.
    pub issue: RowIssue,
}

impl RowError {
    /// Creates a row error.
    #[must_use]
    pub const fn new(row: usize, issue: RowIssue) -> Self {
        Self { row, issue }
    }
}

impl fmt::Display for RowError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "row {}: {}", self.row, self.issue)
    }
}

impl std::error::Error for RowError {}

/// Errors returned by the builder entry points.
#[derive(Debug, thiserror::Error)]
pub enum GenerateError {
    /// The request itself is incomplete or the source is unreadable.
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),

    /// The single-target parameters describe an invalid statement.
    #[error("invalid parameters: {0}")]
    Row(#[from] RowIssue),
}

/// Result type for builder entry points.
pub type Result<T> = std::result::Result<T, GenerateError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_row_error_display() {
        let err = RowError::new(
            3,
            RowIssue::ShapeMismatch {
                left: "column_list",
                left_len: 2,
                right: "value_list",
                right_len: 3,
            },
        );
        assert_eq!(
            err.to_string(),
            "row 3: column_list has 2 entries but value_list has 3"
        );
    }

    #[test]
    fn test_configuration_error_display() {
        let err = GenerateError::from(ConfigurationError::MissingParameter {
            operation: Operation::Select,
            parameter: "table",
        });
        assert_eq!(err.to_string(), "select: missing required parameter `table`");
    }
}
