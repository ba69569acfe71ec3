//! SQL reindenting and keyword casing.
//!
//! The formatter walks the token stream and puts each major clause on its
//! own line, indenting select-list items, `AND`/`OR` conditions, and nested
//! subqueries. Literals, quoted identifiers, and comments are copied through
//! verbatim. If the input does not tokenize cleanly, it falls back to a
//! keyword-casing pass that leaves the layout alone.

use std::sync::LazyLock;

use regex::{Captures, Regex};

use crate::lexer::{Keyword, Lexer, Token, TokenKind};

static KEYWORD_RE: LazyLock<Regex> = LazyLock::new(|| {
    let words: Vec<&str> = Keyword::ALL
        .iter()
        .filter(|kw| !kw.is_soft())
        .map(Keyword::as_str)
        .collect();
    Regex::new(&format!(r"(?i)\b(?:{})\b", words.join("|"))).unwrap()
});

static LOWER_KEYWORD_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(?:select|from|where|join|and|or|group\s+by|order\s+by)\b").unwrap()
});

static UPPER_KEYWORD_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(?:SELECT|FROM|WHERE|JOIN|AND|OR|GROUP\s+BY|ORDER\s+BY)\b").unwrap()
});

static FROM_TABLE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\bFROM\s+([A-Za-z_][\w.]*)(?:\s+(?:AS\s+)?(\w+))?").unwrap()
});

static SELECT_FROM_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)\bSELECT\b.*\bFROM\b").unwrap());

static INDENTED_ITEM_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)\bSELECT\b.*\n\s+\w+").unwrap());

/// How keywords are written in the output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum KeywordCase {
    /// `SELECT`
    #[default]
    Upper,
    /// `select`
    Lower,
    /// As written in the input.
    Preserve,
}

/// How unquoted identifiers are written in the output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdentifierCase {
    /// `orders`
    Lower,
    /// `ORDERS`
    Upper,
}

/// Formatter settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FormatOptions {
    /// Spaces per indentation level.
    pub indent_width: usize,
    /// Keyword casing.
    pub keyword_case: KeywordCase,
    /// Identifier casing; `None` keeps identifiers as written.
    pub identifier_case: Option<IdentifierCase>,
}

impl Default for FormatOptions {
    fn default() -> Self {
        Self {
            indent_width: 4,
            keyword_case: KeywordCase::Upper,
            identifier_case: None,
        }
    }
}

/// Reindents `sql` and normalizes keyword casing.
#[must_use]
pub fn format_sql(sql: &str, options: &FormatOptions) -> String {
    let tokens = Lexer::with_comments(sql).tokenize();
    let error = tokens.iter().find_map(|t| match &t.kind {
        TokenKind::Error(message) => Some(message),
        _ => None,
    });
    if let Some(message) = error {
        tracing::debug!(%message, "input does not tokenize; only normalizing keyword case");
        return naive_keyword_case(sql, options.keyword_case);
    }
    Formatter::new(sql, options).run(&tokens)
}

/// Changes the casing of every reserved keyword and nothing else.
///
/// This is a plain word substitution, so keyword-shaped words inside string
/// literals are recased too. Soft keywords (`date`, `count`) are left alone
/// since without tokens there is no telling them apart from column names.
#[must_use]
pub fn naive_keyword_case(sql: &str, case: KeywordCase) -> String {
    match case {
        KeywordCase::Preserve => String::from(sql),
        KeywordCase::Upper => KEYWORD_RE
            .replace_all(sql, |caps: &Captures| caps[0].to_ascii_uppercase())
            .into_owned(),
        KeywordCase::Lower => KEYWORD_RE
            .replace_all(sql, |caps: &Captures| caps[0].to_ascii_lowercase())
            .into_owned(),
    }
}

/// Formats each statement with default options and separates them with a
/// blank line. Blank statements are dropped.
#[must_use]
pub fn format_statements<S: AsRef<str>>(statements: &[S]) -> String {
    let options = FormatOptions::default();
    statements
        .iter()
        .map(AsRef::as_ref)
        .filter(|s| !s.trim().is_empty())
        .map(|s| format_sql(s, &options))
        .collect::<Vec<_>>()
        .join("\n\n")
}

const MAJOR_CLAUSES: &[&str] = &[
    "SELECT", "FROM", "WHERE", "GROUP BY", "HAVING", "ORDER BY", "LIMIT",
];

/// Formats with lower-case identifiers, then adds a blank line after each
/// completed major clause.
#[must_use]
pub fn beautify_sql(sql: &str) -> String {
    let options = FormatOptions {
        identifier_case: Some(IdentifierCase::Lower),
        ..FormatOptions::default()
    };
    let formatted = format_sql(sql, &options);

    let mut lines: Vec<&str> = vec![];
    for line in formatted.lines() {
        lines.push(line);
        let upper = line.trim().to_ascii_uppercase();
        let opens_clause = MAJOR_CLAUSES.iter().any(|c| upper.starts_with(c));
        let bare_keyword = MAJOR_CLAUSES.contains(&upper.as_str());
        let continues =
            upper.ends_with(',') || upper.ends_with(" AND") || upper.ends_with(" OR");
        if opens_clause && !bare_keyword && !continues {
            lines.push("");
        }
    }
    while lines.last().is_some_and(|l| l.is_empty()) {
        lines.pop();
    }
    lines.join("\n")
}

/// Advisory layout hints for hand-written SQL.
#[must_use]
pub fn formatting_suggestions(sql: &str) -> Vec<String> {
    let mut suggestions = vec![];

    if sql.matches('\n').count() < 2 {
        suggestions.push(String::from(
            "put each major keyword on its own line for readability",
        ));
    }

    if LOWER_KEYWORD_RE.is_match(sql) && !UPPER_KEYWORD_RE.is_match(sql) {
        suggestions.push(String::from("write SQL keywords in upper case"));
    }

    if !sql.contains("--") && !sql.contains("/*") {
        suggestions.push(String::from(
            "add comments explaining the purpose and logic of complex queries",
        ));
    }

    let mut tables = FROM_TABLE_RE.captures_iter(sql).peekable();
    if tables.peek().is_some() {
        let all_aliased = tables.all(|caps| {
            caps.get(2).is_some_and(|alias| {
                Keyword::from_str(alias.as_str()).is_none_or(|kw| kw.is_soft())
            })
        });
        if !all_aliased {
            suggestions.push(String::from(
                "give tables meaningful aliases, especially in complex queries",
            ));
        }
    }

    if SELECT_FROM_RE.is_match(sql) && !INDENTED_ITEM_RE.is_match(sql) {
        suggestions.push(String::from("indent the selected columns"));
    }

    if suggestions.is_empty() {
        suggestions.push(String::from("the SQL is well formatted"));
    }
    suggestions
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Clause {
    None,
    SelectList,
    Conditions,
    Other,
}

#[derive(Debug, Clone, Copy)]
enum Paren {
    Group,
    Subquery {
        base: usize,
        clause: Clause,
        close_level: usize,
    },
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

/// Keywords after which a parenthesized list belongs to an object name rather
/// than a call, as in `INSERT INTO t (a, b)`.
const fn names_object(keyword: Keyword) -> bool {
    matches!(
        keyword,
        Keyword::Into
            | Keyword::Table
            | Keyword::References
            | Keyword::View
            | Keyword::Index
            | Keyword::On
    )
}

fn next_code(tokens: &[Token], i: usize) -> Option<&Token> {
    tokens[i + 1..]
        .iter()
        .find(|t| !matches!(t.kind, TokenKind::Comment(_)))
        .filter(|t| !t.is_eof())
}

fn prev_code(tokens: &[Token], i: usize) -> Option<usize> {
    tokens[..i]
        .iter()
        .rposition(|t| !matches!(t.kind, TokenKind::Comment(_)))
}

fn is_name_part(token: &Token) -> bool {
    token.is_name() || token.kind == TokenKind::Dot
}

/// True when the soft keyword at `i` is used as a table, column, or alias
/// name rather than as a type or function, judging by its neighbours.
fn soft_keyword_is_name(tokens: &[Token], i: usize) -> bool {
    let Some(kw) = tokens[i].as_keyword().filter(Keyword::is_soft) else {
        return false;
    };
    let prev = prev_code(tokens, i).map(|p| &tokens[p]);
    let next = next_code(tokens, i).map(|t| &t.kind);

    if prev.and_then(Token::as_keyword).is_some_and(|p| {
        matches!(p, Keyword::Into | Keyword::Table | Keyword::References)
    }) {
        return true;
    }
    match next {
        Some(TokenKind::Dot) => return true,
        // DATE '2024-01-01'
        Some(TokenKind::String(_)) => return false,
        Some(TokenKind::LeftParen) if kw.is_function_like() => return false,
        _ => {}
    }

    let Some(prev) = prev else {
        return false;
    };
    match &prev.kind {
        TokenKind::Dot
        | TokenKind::Comma
        | TokenKind::LeftParen
        | TokenKind::Eq
        | TokenKind::NotEq
        | TokenKind::Lt
        | TokenKind::LtEq
        | TokenKind::Gt
        | TokenKind::GtEq => true,
        // CAST(x AS DATE)
        TokenKind::Keyword(Keyword::As) => next != Some(&TokenKind::RightParen),
        TokenKind::Keyword(p) => matches!(
            p,
            Keyword::Select
                | Keyword::Distinct
                | Keyword::From
                | Keyword::Join
                | Keyword::Update
                | Keyword::By
                | Keyword::Where
                | Keyword::Having
                | Keyword::And
                | Keyword::Or
                | Keyword::On
                | Keyword::Set
                | Keyword::Then
                | Keyword::Else
        ),
        _ => false,
    }
}

fn is_operand(token: &Token) -> bool {
    match &token.kind {
        TokenKind::Identifier(_)
        | TokenKind::QuotedIdentifier(_)
        | TokenKind::Integer(_)
        | TokenKind::Float(_)
        | TokenKind::String(_)
        | TokenKind::RightParen => true,
        TokenKind::Keyword(kw) => matches!(
            kw,
            Keyword::Null | Keyword::True | Keyword::False | Keyword::End
        ),
        _ => false,
    }
}

struct Formatter<'a> {
    source: &'a str,
    options: &'a FormatOptions,
    lines: Vec<String>,
    line: String,
    base: usize,
    clause: Clause,
    parens: Vec<Paren>,
    case_depth: usize,
    in_between: bool,
    item_break: bool,
    glue_next: bool,
    after_statement: bool,
}

impl<'a> Formatter<'a> {
    fn new(source: &'a str, options: &'a FormatOptions) -> Self {
        Self {
            source,
            options,
            lines: vec![],
            line: String::new(),
            base: 0,
            clause: Clause::None,
            parens: vec![],
            case_depth: 0,
            in_between: false,
            item_break: false,
            glue_next: false,
            after_statement: false,
        }
    }

    fn run(mut self, tokens: &[Token]) -> String {
        for (i, token) in tokens.iter().enumerate() {
            if token.is_eof() {
                break;
            }
            if self.after_statement {
                self.break_line(0);
                self.lines.push(String::new());
                self.after_statement = false;
            }
            if let TokenKind::Comment(text) = &token.kind {
                self.comment(text);
                continue;
            }
            if self.item_break && !(token.is(Keyword::Distinct) || token.is(Keyword::All)) {
                self.item_break = false;
                self.break_line(self.base + 1);
            }
            self.token(tokens, i);
        }
        self.break_line(0);
        self.lines.join("\n")
    }

    fn token(&mut self, tokens: &[Token], i: usize) {
        let token = &tokens[i];
        match &token.kind {
            TokenKind::Keyword(_) if soft_keyword_is_name(tokens, i) => {
                self.name(token.text(self.source));
            }
            TokenKind::Keyword(kw) => self.keyword(*kw, token, tokens, i),
            TokenKind::LeftParen => self.open_paren(tokens, i),
            TokenKind::RightParen => self.close_paren(),
            TokenKind::Comma => {
                self.push(",", true);
                if self.clause == Clause::SelectList && self.at_clause_level() {
                    self.item_break = true;
                }
            }
            TokenKind::Semicolon => {
                self.push(";", true);
                self.break_line(0);
                self.base = 0;
                self.clause = Clause::None;
                self.parens.clear();
                self.case_depth = 0;
                self.in_between = false;
                self.item_break = false;
                self.after_statement = true;
            }
            TokenKind::Dot | TokenKind::DoubleColon => {
                self.push(token.text(self.source), true);
                self.glue_next = true;
            }
            TokenKind::Minus | TokenKind::Plus => {
                let unary = !prev_code(tokens, i).is_some_and(|p| is_operand(&tokens[p]));
                self.push(token.text(self.source), false);
                self.glue_next = unary;
            }
            TokenKind::Identifier(_) => self.name(token.text(self.source)),
            _ => self.push(token.text(self.source), false),
        }
    }

    fn name(&mut self, written: &str) {
        let text = match self.options.identifier_case {
            Some(IdentifierCase::Lower) => written.to_lowercase(),
            Some(IdentifierCase::Upper) => written.to_uppercase(),
            None => String::from(written),
        };
        self.push(&text, false);
    }

    fn keyword(&mut self, kw: Keyword, token: &Token, tokens: &[Token], i: usize) {
        let text = match self.options.keyword_case {
            KeywordCase::Upper => String::from(kw.as_str()),
            KeywordCase::Lower => kw.as_str().to_ascii_lowercase(),
            KeywordCase::Preserve => String::from(token.text(self.source)),
        };
        let prev = prev_code(tokens, i).and_then(|p| tokens[p].as_keyword());
        let top = self.at_clause_level();

        match kw {
            Keyword::Case => {
                self.case_depth += 1;
                self.push(&text, false);
            }
            Keyword::End => {
                self.case_depth = self.case_depth.saturating_sub(1);
                self.push(&text, false);
            }
            Keyword::Between => {
                self.in_between = true;
                self.push(&text, false);
            }
            Keyword::And if self.in_between => {
                self.in_between = false;
                self.push(&text, false);
            }
            Keyword::And | Keyword::Or if top && self.clause == Clause::Conditions => {
                self.break_line(self.base + 1);
                self.push(&text, false);
            }
            _ if top && self.starts_clause(kw, prev) => {
                self.break_line(self.base);
                self.push(&text, false);
                self.clause = match kw {
                    Keyword::Select => Clause::SelectList,
                    Keyword::Where | Keyword::Having | Keyword::On => Clause::Conditions,
                    _ => Clause::Other,
                };
                if kw == Keyword::Select {
                    self.item_break = true;
                }
            }
            _ => self.push(&text, false),
        }
    }

    fn starts_clause(&self, kw: Keyword, prev: Option<Keyword>) -> bool {
        match kw {
            Keyword::Select
            | Keyword::From
            | Keyword::Where
            | Keyword::Group
            | Keyword::Order
            | Keyword::Having
            | Keyword::Limit
            | Keyword::Offset
            | Keyword::Union
            | Keyword::Intersect
            | Keyword::Except
            | Keyword::Values
            | Keyword::Set
            | Keyword::On
            | Keyword::Using
            | Keyword::Insert
            | Keyword::Update
            | Keyword::Delete
            | Keyword::Merge => true,
            Keyword::When => self.case_depth == 0,
            Keyword::Join
            | Keyword::Inner
            | Keyword::Left
            | Keyword::Right
            | Keyword::Full
            | Keyword::Cross
            | Keyword::Natural => !prev.is_some_and(is_join_modifier),
            _ => false,
        }
    }

    fn open_paren(&mut self, tokens: &[Token], i: usize) {
        let glue = prev_code(tokens, i).is_some_and(|p| self.is_call(tokens, p));
        self.push("(", glue);
        self.glue_next = true;

        let subquery =
            next_code(tokens, i).is_some_and(|t| t.is(Keyword::Select) || t.is(Keyword::With));
        if subquery {
            let close_level = self.line_level();
            self.parens.push(Paren::Subquery {
                base: self.base,
                clause: self.clause,
                close_level,
            });
            self.base = close_level + 1;
            self.clause = Clause::None;
        } else {
            self.parens.push(Paren::Group);
        }
    }

    fn close_paren(&mut self) {
        if let Some(Paren::Subquery {
            base,
            clause,
            close_level,
        }) = self.parens.pop()
        {
            self.base = base;
            self.clause = clause;
            self.item_break = false;
            self.break_line(close_level);
        }
        self.push(")", true);
    }

    /// True when the token at `p` names something being called, so the `(`
    /// that follows it attaches without a space.
    fn is_call(&self, tokens: &[Token], p: usize) -> bool {
        match &tokens[p].kind {
            TokenKind::Keyword(kw) if !soft_keyword_is_name(tokens, p) => kw.is_function_like(),
            _ if tokens[p].is_name() => {
                let start = tokens[..=p]
                    .iter()
                    .rposition(|t| {
                        !is_name_part(t) || t.as_keyword().is_some_and(names_object)
                    })
                    .and_then(|q| tokens[q].as_keyword());
                !start.is_some_and(names_object)
            }
            _ => false,
        }
    }

    fn comment(&mut self, text: &str) {
        if !self.line.trim().is_empty() {
            self.break_line(self.base);
        }
        self.push(text, false);
        self.break_line(self.base);
    }

    fn at_clause_level(&self) -> bool {
        !matches!(self.parens.last(), Some(Paren::Group))
    }

    fn line_level(&self) -> usize {
        let indent = self.line.len() - self.line.trim_start().len();
        indent.checked_div(self.options.indent_width).unwrap_or(0)
    }

    fn break_line(&mut self, level: usize) {
        let pad = " ".repeat(level * self.options.indent_width);
        let done = std::mem::replace(&mut self.line, pad);
        if !done.trim().is_empty() {
            self.lines.push(String::from(done.trim_end()));
        }
    }

    fn push(&mut self, text: &str, glue: bool) {
        let fresh = self.line.trim().is_empty();
        if !fresh && !glue && !self.glue_next {
            self.line.push(' ');
        }
        self.line.push_str(text);
        self.glue_next = false;
    }
}
