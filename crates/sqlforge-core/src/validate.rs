//! Structural sanity checks over arbitrary SQL text.
//!
//! The validator is advisory. It classifies each statement by its leading
//! verb, reports heuristic warnings (missing `WHERE`, `SELECT *`, ...) and
//! flags a small set of structural errors (unbalanced brackets or quotes,
//! clauses with nothing between them, joins without a condition). It does not
//! parse SQL and never returns an `Err`: every finding lands in the
//! [`ValidationResult`].

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Serialize, Serializer};

use crate::lexer::{split_statements, Keyword, Lexer, Token, TokenKind};

/// A `SELECT` with `LIMIT n` below this is not reported as a full scan.
pub const SMALL_LIMIT: i64 = 1000;

static FROM_WHERE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\bFROM\s+WHERE\b").unwrap());
static WHERE_ORDER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\bWHERE\s+ORDER\b").unwrap());
static SELECT_FROM_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\bSELECT\s+FROM\b").unwrap());

/// The data-manipulation verb a `WITH` clause leads into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DmlVerb {
    /// `SELECT`
    Select,
    /// `INSERT`
    Insert,
    /// `UPDATE`
    Update,
    /// `DELETE`
    Delete,
}

impl DmlVerb {
    const fn from_keyword(keyword: Keyword) -> Option<Self> {
        match keyword {
            Keyword::Select => Some(Self::Select),
            Keyword::Insert => Some(Self::Insert),
            Keyword::Update => Some(Self::Update),
            Keyword::Delete => Some(Self::Delete),
            _ => None,
        }
    }

    const fn as_str(self) -> &'static str {
        match self {
            Self::Select => "SELECT",
            Self::Insert => "INSERT",
            Self::Update => "UPDATE",
            Self::Delete => "DELETE",
        }
    }
}

/// Statement classification by leading keyword.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatementKind {
    /// `SELECT`
    Select,
    /// `INSERT`
    Insert,
    /// `UPDATE`
    Update,
    /// `DELETE`
    Delete,
    /// `CREATE`
    Create,
    /// `ALTER`
    Alter,
    /// `DROP`
    Drop,
    /// `TRUNCATE`
    Truncate,
    /// `MERGE`
    Merge,
    /// `WITH`, labelled by the first top-level verb that follows it.
    With(Option<DmlVerb>),
    /// Anything else.
    Unknown,
}

impl StatementKind {
    /// Classifies a single statement.
    #[must_use]
    pub fn of(statement: &str) -> Self {
        let tokens = Lexer::new(statement).tokenize();
        Self::from_tokens(&tokens)
    }

    fn from_tokens(tokens: &[Token]) -> Self {
        let Some(first) = tokens.first().and_then(Token::as_keyword) else {
            return Self::Unknown;
        };
        match first {
            Keyword::Select => Self::Select,
            Keyword::Insert => Self::Insert,
            Keyword::Update => Self::Update,
            Keyword::Delete => Self::Delete,
            Keyword::Create => Self::Create,
            Keyword::Alter => Self::Alter,
            Keyword::Drop => Self::Drop,
            Keyword::Truncate => Self::Truncate,
            Keyword::Merge => Self::Merge,
            Keyword::With => Self::With(top_level_verb(&tokens[1..])),
            _ => Self::Unknown,
        }
    }
}

impl fmt::Display for StatementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Select => f.write_str("SELECT"),
            Self::Insert => f.write_str("INSERT"),
            Self::Update => f.write_str("UPDATE"),
            Self::Delete => f.write_str("DELETE"),
            Self::Create => f.write_str("CREATE"),
            Self::Alter => f.write_str("ALTER"),
            Self::Drop => f.write_str("DROP"),
            Self::Truncate => f.write_str("TRUNCATE"),
            Self::Merge => f.write_str("MERGE"),
            Self::With(Some(verb)) => write!(f, "WITH {}", verb.as_str()),
            Self::With(None) => f.write_str("WITH"),
            Self::Unknown => f.write_str("UNKNOWN"),
        }
    }
}

impl Serialize for StatementKind {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

fn top_level_verb(tokens: &[Token]) -> Option<DmlVerb> {
    let mut depth = 0usize;
    for token in tokens {
        match &token.kind {
            TokenKind::LeftParen => depth += 1,
            TokenKind::RightParen => depth = depth.saturating_sub(1),
            TokenKind::Keyword(kw) if depth == 0 => {
                if let Some(verb) = DmlVerb::from_keyword(*kw) {
                    return Some(verb);
                }
            }
            _ => {}
        }
    }
    None
}

/// One statement found in the input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatementInfo {
    /// Verb classification, serialized as its label (`WITH SELECT`, ...).
    #[serde(rename = "type")]
    pub kind: StatementKind,
    /// The statement text, trimmed, with its terminating `;` if it had one.
    pub text: String,
}

/// Outcome of [`validate_sql`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationResult {
    /// True iff `errors` is empty.
    pub is_valid: bool,
    /// Number of statements found.
    pub statement_count: usize,
    /// The statements, in input order.
    pub statements: Vec<StatementInfo>,
    /// Heuristic findings; these never invalidate.
    pub warnings: Vec<String>,
    /// Structural findings.
    pub errors: Vec<String>,
}

/// Validates SQL text that may hold several `;`-separated statements.
#[must_use]
pub fn validate_sql(sql: &str) -> ValidationResult {
    let sql = sql.trim();
    if sql.is_empty() {
        return ValidationResult {
            is_valid: false,
            statement_count: 0,
            statements: vec![],
            warnings: vec![],
            errors: vec![String::from("SQL text is empty")],
        };
    }

    let mut statements = vec![];
    let mut warnings = vec![];
    for text in split_statements(sql) {
        let tokens: Vec<Token> = Lexer::new(text).tokenize();
        let kind = StatementKind::from_tokens(&tokens);
        warnings.extend(statement_warnings(kind, &tokens));
        statements.push(StatementInfo {
            kind,
            text: String::from(text),
        });
    }

    let errors = structural_errors(sql, statements.len());
    tracing::debug!(
        statements = statements.len(),
        warnings = warnings.len(),
        errors = errors.len(),
        "validated SQL"
    );

    ValidationResult {
        is_valid: errors.is_empty(),
        statement_count: statements.len(),
        statements,
        warnings,
        errors,
    }
}

fn has_keyword(tokens: &[Token], keyword: Keyword) -> bool {
    tokens.iter().any(|t| t.is(keyword))
}

fn has_small_limit(tokens: &[Token]) -> bool {
    tokens.windows(2).any(|pair| {
        pair[0].is(Keyword::Limit)
            && matches!(pair[1].kind, TokenKind::Integer(n) if n < SMALL_LIMIT)
    })
}

fn selects_star(tokens: &[Token]) -> bool {
    tokens
        .windows(2)
        .any(|pair| pair[0].is(Keyword::Select) && pair[1].kind == TokenKind::Star)
}

/// True when `INSERT INTO name` is followed by anything but `(`.
fn insert_lacks_column_list(tokens: &[Token]) -> bool {
    let mut rest = tokens.iter().skip_while(|t| !t.is(Keyword::Into)).skip(1);
    // table name, possibly qualified
    let mut next = rest.next();
    while let Some(token) = next {
        if token.is_name() || token.kind == TokenKind::Dot {
            next = rest.next();
            continue;
        }
        return token.kind != TokenKind::LeftParen;
    }
    true
}

fn statement_warnings(kind: StatementKind, tokens: &[Token]) -> Vec<String> {
    let mut warnings = vec![];
    match kind {
        StatementKind::Select => {
            if !has_keyword(tokens, Keyword::Where) && !has_small_limit(tokens) {
                warnings.push(String::from(
                    "SELECT without WHERE may cause a full table scan",
                ));
            }
            if selects_star(tokens) {
                warnings.push(String::from(
                    "SELECT * used; list the columns you need explicitly",
                ));
            }
        }
        StatementKind::Insert => {
            if has_keyword(tokens, Keyword::Into) && insert_lacks_column_list(tokens) {
                warnings.push(String::from("INSERT does not name its target columns"));
            }
        }
        StatementKind::Update => {
            if !has_keyword(tokens, Keyword::Where) {
                warnings.push(String::from(
                    "UPDATE without WHERE will affect the entire table",
                ));
            }
        }
        StatementKind::Delete => {
            if !has_keyword(tokens, Keyword::Where) {
                warnings.push(String::from(
                    "DELETE without WHERE will affect the entire table",
                ));
            }
        }
        _ => {}
    }
    warnings
}

/// Quote characters left unpaired after removing doubled (escaped) ones.
fn has_unpaired(sql: &str, quote: char) -> bool {
    let doubled: String = [quote, quote].iter().collect();
    sql.replace(&doubled, "").matches(quote).count() % 2 != 0
}

const fn is_join_modifier(keyword: Keyword) -> bool {
    matches!(
        keyword,
        Keyword::Inner
            | Keyword::Left
            | Keyword::Right
            | Keyword::Full
            | Keyword::Outer
            | Keyword::Cross
            | Keyword::Natural
    )
}

/// Finds a `JOIN` whose table reference is not followed by `ON` or `USING`.
///
/// `CROSS JOIN`, `NATURAL JOIN`, and joins against a parenthesized subquery
/// are not checked.
fn has_join_without_condition(tokens: &[Token]) -> bool {
    for (i, token) in tokens.iter().enumerate() {
        if !token.is(Keyword::Join) {
            continue;
        }
        let exempt = tokens[..i]
            .iter()
            .rev()
            .take_while(|t| t.as_keyword().is_some_and(is_join_modifier))
            .any(|t| t.is(Keyword::Cross) || t.is(Keyword::Natural));
        if exempt {
            continue;
        }

        let mut j = i + 1;
        match tokens.get(j) {
            Some(t) if t.kind == TokenKind::LeftParen => continue,
            Some(t) if t.is_name() => j += 1,
            _ => return true,
        }
        while tokens.get(j).is_some_and(|t| t.kind == TokenKind::Dot)
            && tokens.get(j + 1).is_some_and(Token::is_name)
        {
            j += 2;
        }
        if tokens.get(j).is_some_and(|t| t.is(Keyword::As)) {
            j += 1;
        }
        if tokens.get(j).is_some_and(Token::is_name) {
            j += 1;
        }
        let conditioned = tokens
            .get(j)
            .is_some_and(|t| t.is(Keyword::On) || t.is(Keyword::Using));
        if !conditioned {
            return true;
        }
    }
    false
}

fn structural_errors(sql: &str, statement_count: usize) -> Vec<String> {
    let mut errors = vec![];

    if sql.matches('(').count() != sql.matches(')').count() {
        errors.push(String::from(
            "unbalanced parentheses: '(' and ')' counts differ",
        ));
    }
    if has_unpaired(sql, '\'') {
        errors.push(String::from("unbalanced single quotes"));
    }
    if has_unpaired(sql, '"') {
        errors.push(String::from("unbalanced double quotes"));
    }

    if FROM_WHERE_RE.is_match(sql) {
        errors.push(String::from(
            "FROM is directly followed by WHERE; the table name is missing",
        ));
    }
    if WHERE_ORDER_RE.is_match(sql) {
        errors.push(String::from(
            "WHERE is directly followed by ORDER BY; the condition is missing",
        ));
    }
    if SELECT_FROM_RE.is_match(sql) {
        errors.push(String::from(
            "SELECT is directly followed by FROM; the column list is missing",
        ));
    }

    let tokens = Lexer::new(sql).tokenize();
    if has_join_without_condition(&tokens) {
        errors.push(String::from("JOIN is missing an ON or USING clause"));
    }

    // Only top-level semicolons count; one inside a literal is fine.
    let last = tokens.iter().rposition(|t| !t.is_eof());
    let stray_semicolon = tokens
        .iter()
        .enumerate()
        .any(|(i, t)| t.kind == TokenKind::Semicolon && Some(i) != last);
    if stray_semicolon && statement_count == 1 {
        errors.push(String::from(
            "unexpected semicolon in the middle of the statement",
        ));
    }

    errors
}
