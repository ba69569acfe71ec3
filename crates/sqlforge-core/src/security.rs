//! Identifier validation and injection pattern detection.
//!
//! These checks are advisory. They catch the usual suspects in configuration
//! and form input, but generated SQL is still meant to be reviewed before it
//! runs anywhere.

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

/// Substrings that disqualify an identifier, matched case-insensitively.
///
/// The match is by substring, so names such as `created_at` are rejected too.
pub const DANGEROUS_KEYWORDS: &[&str] = &[
    "drop", "delete", "truncate", "alter", "create", "grant", "revoke", "exec", "execute", "sp_",
    "xp_", "union", "script", "declare", "cursor", "shutdown", "backup", "restore",
];

/// Longest string [`sanitize_input`] returns.
pub const SANITIZED_MAX_LEN: usize = 100;

static TABLE_NAME_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*(\.[A-Za-z_][A-Za-z0-9_]*)?$").unwrap()
});

static COLUMN_NAME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").unwrap());

/// Known injection techniques, in the order they are tested.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum InjectionKind {
    /// `OR 1=1`
    Tautology,
    /// `OR 'a'='a'`
    QuotedTautology,
    /// `; DROP TABLE ...`
    StackedStatement,
    /// `UNION SELECT`
    UnionSelect,
    /// `<script` or `script>`
    ScriptTag,
    /// `javascript:`
    JavascriptUri,
}

impl fmt::Display for InjectionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Tautology => "numeric tautology",
            Self::QuotedTautology => "quoted tautology",
            Self::StackedStatement => "stacked statement",
            Self::UnionSelect => "UNION SELECT",
            Self::ScriptTag => "script tag",
            Self::JavascriptUri => "javascript: URI",
        })
    }
}

static INJECTION_PATTERNS: LazyLock<Vec<(InjectionKind, Regex)>> = LazyLock::new(|| {
    [
        (InjectionKind::Tautology, r"(?i)\b(or|and)\b\s+\d+\s*=\s*\d+"),
        (
            InjectionKind::QuotedTautology,
            r#"(?i)\b(or|and)\b\s+['"]\w+['"]\s*=\s*['"]\w+['"]"#,
        ),
        (
            InjectionKind::StackedStatement,
            r"(?i);\s*(drop|delete|truncate|alter|create|grant|revoke)",
        ),
        (InjectionKind::UnionSelect, r"(?i)union\s+select"),
        (InjectionKind::ScriptTag, r"(?i)script\s*>"),
        (InjectionKind::JavascriptUri, r"(?i)javascript\s*:"),
        (InjectionKind::ScriptTag, r"(?i)<\s*script"),
    ]
    .into_iter()
    .map(|(kind, pattern)| (kind, Regex::new(pattern).unwrap()))
    .collect()
});

fn contains_dangerous_keyword(text: &str) -> bool {
    let lower = text.to_ascii_lowercase();
    DANGEROUS_KEYWORDS.iter().any(|kw| lower.contains(kw))
}

/// Returns true if `name` is a plain or one-dot schema-qualified table name
/// free of blacklisted keywords.
#[must_use]
pub fn is_safe_table_name(name: &str) -> bool {
    let name = name.trim();
    TABLE_NAME_RE.is_match(name) && !contains_dangerous_keyword(name)
}

/// Returns true if `name` is a bare column name free of blacklisted keywords.
#[must_use]
pub fn is_safe_column_name(name: &str) -> bool {
    let name = name.trim();
    COLUMN_NAME_RE.is_match(name) && !contains_dangerous_keyword(name)
}

/// Checks a comma-separated column list. Blank entries are skipped, but a
/// list with no entries at all is rejected.
#[must_use]
pub fn is_safe_column_list(list: &str) -> bool {
    let mut seen = false;
    for column in list.split(',').map(str::trim).filter(|c| !c.is_empty()) {
        if !is_safe_column_name(column) {
            return false;
        }
        seen = true;
    }
    seen
}

/// Returns the first injection technique found in `text`, if any.
#[must_use]
pub fn scan_injection(text: &str) -> Option<InjectionKind> {
    if text.is_empty() {
        return None;
    }
    INJECTION_PATTERNS
        .iter()
        .find(|(_, re)| re.is_match(text))
        .map(|(kind, _)| *kind)
}

/// Returns true if `text` matches any injection pattern.
#[must_use]
pub fn detect_injection(text: &str) -> bool {
    scan_injection(text).is_some()
}

/// Strips `<>"';\`, caps the length, and trims.
///
/// For display only. Sanitized text is not safe to splice into SQL.
#[must_use]
pub fn sanitize_input(text: &str) -> String {
    let stripped: String = text
        .chars()
        .filter(|c| !matches!(c, '<' | '>' | '"' | '\'' | ';' | '\\'))
        .take(SANITIZED_MAX_LEN)
        .collect();
    String::from(stripped.trim())
}

/// Outcome of [`scan_inputs`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ScanReport {
    /// True when no issue was found.
    pub is_safe: bool,
    /// One line per finding.
    pub issues: Vec<String>,
}

/// Runs every check that applies to single-target form input.
///
/// Absent or blank inputs are not checked.
#[must_use]
pub fn scan_inputs(
    table: Option<&str>,
    columns: Option<&str>,
    where_clause: Option<&str>,
) -> ScanReport {
    fn present(s: Option<&str>) -> Option<&str> {
        s.filter(|s| !s.trim().is_empty())
    }
    let mut issues = Vec::new();

    if let Some(table) = present(table) {
        if !is_safe_table_name(table) {
            issues.push(format!(
                "table name `{}` is malformed or contains a dangerous keyword",
                sanitize_input(table)
            ));
        }
        if let Some(kind) = scan_injection(table) {
            issues.push(format!("table name looks like an injection attempt ({kind})"));
        }
    }

    if let Some(columns) = present(columns) {
        if !is_safe_column_list(columns) {
            issues.push(format!(
                "column list `{}` is malformed or contains a dangerous keyword",
                sanitize_input(columns)
            ));
        }
        if let Some(kind) = scan_injection(columns) {
            issues.push(format!("column list looks like an injection attempt ({kind})"));
        }
    }

    if let Some(clause) = present(where_clause) {
        if let Some(kind) = scan_injection(clause) {
            issues.push(format!("WHERE clause looks like an injection attempt ({kind})"));
        }
    }

    ScanReport {
        is_safe: issues.is_empty(),
        issues,
    }
}
