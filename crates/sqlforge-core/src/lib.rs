//! # sqlforge-core
//!
//! Generates SQL statements from row-oriented configuration and checks SQL
//! text for common mistakes.
//!
//! This crate provides:
//! - Statement builders for `CREATE TABLE`, `SELECT`, `INSERT`, delete-reload,
//!   `MERGE`, and `TRUNCATE`, driven either by explicit parameters or by a
//!   [`RowSource`] of configuration rows
//! - Advisory validation, complexity scoring, and formatting of SQL text
//! - Identifier allow-listing and injection pattern detection
//! - One-off DDL generators for views, indexes, constraints, and routines
//! - A template catalog and maintenance patterns (paging, backups, data
//!   moves, duplicate and completeness checks, trend rollups)
//!
//! ## Generating statements
//!
//! A bad row never aborts a batch. It is recorded and skipped:
//!
//! ```rust
//! use sqlforge_core::{GenerationContext, MemorySource, Operation};
//!
//! let source = MemorySource::new().with_sheet(
//!     Operation::Insert,
//!     [
//!         ["users", "id, name", "1, 'ann'"],
//!         ["users", "id, name", "2"],
//!     ],
//! );
//! let ctx = GenerationContext::new().with_source(source);
//! let batch = ctx.bulk_insert(None).unwrap();
//!
//! assert_eq!(batch.to_sql(), "INSERT INTO users (id, name) VALUES (1, 'ann');");
//! assert_eq!(batch.errors().len(), 1);
//! assert_eq!(batch.errors()[0].row, 2);
//! ```
//!
//! ## Validating SQL
//!
//! ```rust
//! use sqlforge_core::validate_sql;
//!
//! let result = validate_sql("SELECT * FROM users");
//! assert!(result.is_valid);
//! assert_eq!(result.warnings.len(), 2);
//!
//! let result = validate_sql("SELECT a FROM t WHERE (a = 1");
//! assert!(!result.is_valid);
//! ```

pub mod advanced;
pub mod assemble;
pub mod builder;
pub mod complexity;
pub mod error;
pub mod format;
pub mod ident;
pub mod lexer;
pub mod patterns;
pub mod row;
pub mod security;
pub mod source;
pub mod validate;

pub use builder::{Batch, GenerateOptions, GeneratedStatement, GenerationContext};
pub use complexity::{analyze_complexity, ComplexityLevel, ComplexityReport};
pub use error::{ConfigurationError, GenerateError, RowError, RowIssue};
pub use format::{format_sql, FormatOptions};
pub use ident::Identifier;
pub use lexer::{Lexer, Token, TokenKind};
pub use row::{Operation, OperationRow};
pub use security::{detect_injection, sanitize_input, scan_inputs, ScanReport};
pub use source::{JsonSource, MemorySource, RowSource, SourceError};
pub use validate::{validate_sql, StatementKind, ValidationResult};
