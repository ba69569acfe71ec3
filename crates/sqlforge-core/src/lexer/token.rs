//! Token types for the SQL lexer.

use super::Span;

macro_rules! keywords {
    ($($variant:ident => $text:literal,)+) => {
        /// SQL keywords recognized by the lexer.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum Keyword {
            $(
                #[doc = concat!("`", $text, "`")]
                $variant,
            )+
        }

        impl Keyword {
            /// Every keyword, in declaration order.
            pub const ALL: &'static [Self] = &[$(Self::$variant,)+];

            /// Attempts to parse a keyword from a string (case-insensitive).
            #[must_use]
            #[allow(clippy::should_implement_trait)]
            pub fn from_str(s: &str) -> Option<Self> {
                match s.to_ascii_uppercase().as_str() {
                    $($text => Some(Self::$variant),)+
                    _ => None,
                }
            }

            /// Returns the canonical upper-case spelling.
            #[must_use]
            pub const fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $text,)+
                }
            }
        }
    };
}

keywords! {
    // Queries
    Select => "SELECT",
    From => "FROM",
    Where => "WHERE",
    Order => "ORDER",
    By => "BY",
    Group => "GROUP",
    Having => "HAVING",
    Limit => "LIMIT",
    Offset => "OFFSET",
    Distinct => "DISTINCT",
    All => "ALL",
    As => "AS",

    // Joins
    Join => "JOIN",
    Inner => "INNER",
    Left => "LEFT",
    Right => "RIGHT",
    Full => "FULL",
    Outer => "OUTER",
    Cross => "CROSS",
    Natural => "NATURAL",
    On => "ON",
    Using => "USING",

    // Set operations
    Union => "UNION",
    Intersect => "INTERSECT",
    Except => "EXCEPT",

    // Data manipulation
    Insert => "INSERT",
    Into => "INTO",
    Values => "VALUES",
    Update => "UPDATE",
    Set => "SET",
    Delete => "DELETE",
    Merge => "MERGE",
    Matched => "MATCHED",
    Truncate => "TRUNCATE",

    // Data definition
    Create => "CREATE",
    Drop => "DROP",
    Alter => "ALTER",
    Table => "TABLE",
    Index => "INDEX",
    View => "VIEW",
    Schema => "SCHEMA",
    Trigger => "TRIGGER",
    Procedure => "PROCEDURE",
    Function => "FUNCTION",
    Replace => "REPLACE",
    Constraint => "CONSTRAINT",
    Primary => "PRIMARY",
    Key => "KEY",
    Foreign => "FOREIGN",
    References => "REFERENCES",
    Unique => "UNIQUE",
    Check => "CHECK",
    Default => "DEFAULT",
    Returns => "RETURNS",
    Deterministic => "DETERMINISTIC",

    // Logical operators and predicates
    And => "AND",
    Or => "OR",
    Not => "NOT",
    In => "IN",
    Between => "BETWEEN",
    Like => "LIKE",
    Is => "IS",
    Null => "NULL",
    True => "TRUE",
    False => "FALSE",
    Exists => "EXISTS",

    // Ordering
    Asc => "ASC",
    Desc => "DESC",

    // Aggregates and scalar functions
    Count => "COUNT",
    Sum => "SUM",
    Avg => "AVG",
    Min => "MIN",
    Max => "MAX",
    Cast => "CAST",
    Coalesce => "COALESCE",
    Nullif => "NULLIF",

    // Conditional expressions
    Case => "CASE",
    When => "WHEN",
    Then => "THEN",
    Else => "ELSE",
    End => "END",

    // Data types
    Int => "INT",
    Integer => "INTEGER",
    Smallint => "SMALLINT",
    Bigint => "BIGINT",
    Decimal => "DECIMAL",
    Numeric => "NUMERIC",
    Float => "FLOAT",
    Double => "DOUBLE",
    Real => "REAL",
    Char => "CHAR",
    Varchar => "VARCHAR",
    Text => "TEXT",
    Boolean => "BOOLEAN",
    Date => "DATE",
    Timestamp => "TIMESTAMP",

    // Procedural blocks and misc
    With => "WITH",
    Recursive => "RECURSIVE",
    Over => "OVER",
    Partition => "PARTITION",
    Begin => "BEGIN",
    Commit => "COMMIT",
    For => "FOR",
    Each => "EACH",
    Row => "ROW",
    Before => "BEFORE",
    After => "AFTER",
}

impl Keyword {
    /// Returns true for keywords that are written like function calls,
    /// with the opening parenthesis attached (e.g. `COUNT(`).
    #[must_use]
    pub const fn is_function_like(&self) -> bool {
        matches!(
            self,
            Self::Count
                | Self::Sum
                | Self::Avg
                | Self::Min
                | Self::Max
                | Self::Cast
                | Self::Coalesce
                | Self::Nullif
                | Self::Char
                | Self::Varchar
                | Self::Decimal
                | Self::Numeric
        )
    }

    /// Returns true for non-reserved words: type names, function names, and
    /// object nouns that tables, columns, and aliases may also be called
    /// (`date`, `count`, `key`, `row`).
    #[must_use]
    pub const fn is_soft(&self) -> bool {
        matches!(
            self,
            Self::Int
                | Self::Integer
                | Self::Smallint
                | Self::Bigint
                | Self::Decimal
                | Self::Numeric
                | Self::Float
                | Self::Double
                | Self::Real
                | Self::Char
                | Self::Varchar
                | Self::Text
                | Self::Boolean
                | Self::Date
                | Self::Timestamp
                | Self::Count
                | Self::Sum
                | Self::Avg
                | Self::Min
                | Self::Max
                | Self::Coalesce
                | Self::Nullif
                | Self::Key
                | Self::Index
                | Self::View
                | Self::Schema
                | Self::Trigger
                | Self::Procedure
                | Self::Function
                | Self::Returns
                | Self::Deterministic
                | Self::Matched
                | Self::Row
                | Self::Each
                | Self::Before
                | Self::After
        )
    }
}

/// The kind of token.
#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    // Literals
    /// Integer literal (e.g., 42)
    Integer(i64),
    /// Float literal (e.g., 3.14)
    Float(f64),
    /// String literal with quotes removed and `''` unescaped.
    String(String),

    // Identifiers and keywords
    /// Bare identifier (e.g., column_name)
    Identifier(String),
    /// Identifier written in double quotes or backticks.
    QuotedIdentifier(String),
    /// SQL keyword
    Keyword(Keyword),

    /// `-- ...` or `/* ... */`, only produced by [`super::Lexer::with_comments`].
    Comment(String),

    // Operators
    /// +
    Plus,
    /// -
    Minus,
    /// *
    Star,
    /// /
    Slash,
    /// %
    Percent,
    /// =
    Eq,
    /// != or <>
    NotEq,
    /// <
    Lt,
    /// <=
    LtEq,
    /// >
    Gt,
    /// >=
    GtEq,
    /// ||
    Concat,
    /// &
    BitAnd,
    /// |
    BitOr,
    /// ~
    BitNot,

    // Delimiters
    /// (
    LeftParen,
    /// )
    RightParen,
    /// [
    LeftBracket,
    /// ]
    RightBracket,
    /// ,
    Comma,
    /// ;
    Semicolon,
    /// .
    Dot,
    /// :
    Colon,
    /// ::
    DoubleColon,
    /// ?
    Question,
    /// @
    At,

    // Special
    /// End of input
    Eof,
    /// Invalid/unknown token
    Error(String),
}

/// A token with its span in the source code.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    /// The kind of token.
    pub kind: TokenKind,
    /// The location in the source code.
    pub span: Span,
}

impl Token {
    /// Creates a new token.
    #[must_use]
    pub const fn new(kind: TokenKind, span: Span) -> Self {
        Self { kind, span }
    }

    /// Returns true if this is an EOF token.
    #[must_use]
    pub const fn is_eof(&self) -> bool {
        matches!(self.kind, TokenKind::Eof)
    }

    /// Returns true if this is a keyword.
    #[must_use]
    pub const fn is_keyword(&self) -> bool {
        matches!(self.kind, TokenKind::Keyword(_))
    }

    /// Returns the keyword if this is a keyword token.
    #[must_use]
    pub const fn as_keyword(&self) -> Option<Keyword> {
        match &self.kind {
            TokenKind::Keyword(kw) => Some(*kw),
            _ => None,
        }
    }

    /// Returns true if this token is the given keyword.
    #[must_use]
    pub fn is(&self, keyword: Keyword) -> bool {
        self.as_keyword() == Some(keyword)
    }

    /// Returns true if this token can name a table, column, or alias: an
    /// identifier, quoted or not, or a soft keyword.
    #[must_use]
    pub const fn is_name(&self) -> bool {
        match &self.kind {
            TokenKind::Identifier(_) | TokenKind::QuotedIdentifier(_) => true,
            TokenKind::Keyword(kw) => kw.is_soft(),
            _ => false,
        }
    }

    /// Returns the exact source text this token was scanned from.
    #[must_use]
    pub fn text<'a>(&self, source: &'a str) -> &'a str {
        &source[self.span.as_range()]
    }
}
