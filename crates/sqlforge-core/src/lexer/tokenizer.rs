//! SQL Tokenizer implementation.

use super::{Keyword, Span, Token, TokenKind};

/// A lexer that tokenizes SQL input.
pub struct Lexer<'a> {
    /// The input source code.
    input: &'a str,
    /// The current byte position.
    pos: usize,
    /// The byte position of the start of the current token.
    start: usize,
    /// Emit comments as tokens instead of skipping them.
    keep_comments: bool,
}

impl<'a> Lexer<'a> {
    /// Creates a new lexer for the given input. Comments are skipped.
    #[must_use]
    pub const fn new(input: &'a str) -> Self {
        Self {
            input,
            pos: 0,
            start: 0,
            keep_comments: false,
        }
    }

    /// Creates a lexer that yields comments as [`TokenKind::Comment`].
    #[must_use]
    pub const fn with_comments(input: &'a str) -> Self {
        Self {
            input,
            pos: 0,
            start: 0,
            keep_comments: true,
        }
    }

    /// Returns the current character without advancing.
    fn peek(&self) -> Option<char> {
        self.input[self.pos..].chars().next()
    }

    /// Returns the next character without advancing.
    fn peek_next(&self) -> Option<char> {
        let mut chars = self.input[self.pos..].chars();
        chars.next();
        chars.next()
    }

    /// Advances to the next character and returns it.
    fn advance(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        Some(c)
    }

    fn at_line_comment(&self) -> bool {
        self.peek() == Some('-') && self.peek_next() == Some('-')
    }

    fn at_block_comment(&self) -> bool {
        self.peek() == Some('/') && self.peek_next() == Some('*')
    }

    fn skip_whitespace(&mut self) {
        while self.peek().is_some_and(char::is_whitespace) {
            self.advance();
        }
    }

    /// Consumes a comment starting at the current position.
    fn consume_comment(&mut self) {
        if self.at_line_comment() {
            while self.peek().is_some_and(|c| c != '\n') {
                self.advance();
            }
            return;
        }

        self.advance(); // /
        self.advance(); // *
        loop {
            match self.advance() {
                Some('*') if self.peek() == Some('/') => {
                    self.advance();
                    break;
                }
                None => break,
                _ => {}
            }
        }
    }

    /// Skips whitespace and, unless comments are kept, comments too.
    fn skip_trivia(&mut self) {
        loop {
            self.skip_whitespace();
            if !self.keep_comments && (self.at_line_comment() || self.at_block_comment()) {
                self.consume_comment();
                continue;
            }
            break;
        }
    }

    /// Creates a span from start to current position.
    fn make_span(&self) -> Span {
        Span::new(self.start, self.pos)
    }

    /// Creates a token with the current span.
    fn make_token(&self, kind: TokenKind) -> Token {
        Token::new(kind, self.make_span())
    }

    /// Scans an identifier or keyword.
    fn scan_identifier(&mut self) -> Token {
        while self.peek().is_some_and(|c| c.is_alphanumeric() || c == '_') {
            self.advance();
        }

        let text = &self.input[self.start..self.pos];

        if let Some(keyword) = Keyword::from_str(text) {
            self.make_token(TokenKind::Keyword(keyword))
        } else {
            self.make_token(TokenKind::Identifier(String::from(text)))
        }
    }

    /// Scans a quoted literal body up to the closing `quote`, unescaping
    /// doubled quotes. Returns `None` when the input ends first.
    fn scan_quoted(&mut self, quote: char) -> Option<String> {
        self.advance(); // consume opening quote
        let mut value = String::new();

        loop {
            match self.peek() {
                Some(c) if c == quote => {
                    if self.peek_next() == Some(quote) {
                        value.push(quote);
                        self.advance();
                        self.advance();
                    } else {
                        break;
                    }
                }
                Some(c) => {
                    value.push(c);
                    self.advance();
                }
                None => return None,
            }
        }

        self.advance(); // consume closing quote
        Some(value)
    }

    /// Scans a string literal.
    fn scan_string(&mut self) -> Token {
        match self.scan_quoted('\'') {
            Some(value) => self.make_token(TokenKind::String(value)),
            None => self.make_token(TokenKind::Error(String::from(
                "Unterminated string literal",
            ))),
        }
    }

    /// Scans a quoted identifier (e.g., "column name" or `column name`).
    fn scan_quoted_identifier(&mut self, quote: char) -> Token {
        match self.scan_quoted(quote) {
            Some(value) => self.make_token(TokenKind::QuotedIdentifier(value)),
            None => self.make_token(TokenKind::Error(String::from(
                "Unterminated quoted identifier",
            ))),
        }
    }

    /// Scans a number (integer or float).
    fn scan_number(&mut self) -> Token {
        let mut is_float = false;

        while self.peek().is_some_and(|c| c.is_ascii_digit()) {
            self.advance();
        }

        if self.peek() == Some('.') && self.peek_next().is_some_and(|c| c.is_ascii_digit()) {
            is_float = true;
            self.advance(); // consume .
            while self.peek().is_some_and(|c| c.is_ascii_digit()) {
                self.advance();
            }
        }

        if self.peek().is_some_and(|c| c == 'e' || c == 'E')
            && self
                .peek_next()
                .is_some_and(|c| c.is_ascii_digit() || c == '+' || c == '-')
        {
            is_float = true;
            self.advance(); // consume e/E
            if self.peek().is_some_and(|c| c == '+' || c == '-') {
                self.advance();
            }
            while self.peek().is_some_and(|c| c.is_ascii_digit()) {
                self.advance();
            }
        }

        let text = &self.input[self.start..self.pos];

        if is_float {
            match text.parse::<f64>() {
                Ok(f) => self.make_token(TokenKind::Float(f)),
                Err(e) => self.make_token(TokenKind::Error(format!("Invalid float: {e}"))),
            }
        } else {
            match text.parse::<i64>() {
                Ok(i) => self.make_token(TokenKind::Integer(i)),
                Err(e) => self.make_token(TokenKind::Error(format!("Invalid integer: {e}"))),
            }
        }
    }

    /// Scans the next token.
    #[must_use]
    pub fn next_token(&mut self) -> Token {
        self.skip_trivia();
        self.start = self.pos;

        if self.keep_comments && (self.at_line_comment() || self.at_block_comment()) {
            self.consume_comment();
            let text = self.input[self.start..self.pos].trim_end();
            return self.make_token(TokenKind::Comment(String::from(text)));
        }

        let Some(c) = self.advance() else {
            return self.make_token(TokenKind::Eof);
        };

        match c {
            // Single-character tokens
            '(' => self.make_token(TokenKind::LeftParen),
            ')' => self.make_token(TokenKind::RightParen),
            '[' => self.make_token(TokenKind::LeftBracket),
            ']' => self.make_token(TokenKind::RightBracket),
            ',' => self.make_token(TokenKind::Comma),
            ';' => self.make_token(TokenKind::Semicolon),
            '+' => self.make_token(TokenKind::Plus),
            '-' => self.make_token(TokenKind::Minus),
            '*' => self.make_token(TokenKind::Star),
            '/' => self.make_token(TokenKind::Slash),
            '%' => self.make_token(TokenKind::Percent),
            '~' => self.make_token(TokenKind::BitNot),
            '?' => self.make_token(TokenKind::Question),
            '@' => self.make_token(TokenKind::At),
            '.' => self.make_token(TokenKind::Dot),
            '=' => self.make_token(TokenKind::Eq),
            '&' => self.make_token(TokenKind::BitAnd),

            // Potentially multi-character tokens
            ':' => {
                if self.peek() == Some(':') {
                    self.advance();
                    self.make_token(TokenKind::DoubleColon)
                } else {
                    self.make_token(TokenKind::Colon)
                }
            }
            '<' => match self.peek() {
                Some('=') => {
                    self.advance();
                    self.make_token(TokenKind::LtEq)
                }
                Some('>') => {
                    self.advance();
                    self.make_token(TokenKind::NotEq)
                }
                _ => self.make_token(TokenKind::Lt),
            },
            '>' => {
                if self.peek() == Some('=') {
                    self.advance();
                    self.make_token(TokenKind::GtEq)
                } else {
                    self.make_token(TokenKind::Gt)
                }
            }
            '!' => {
                if self.peek() == Some('=') {
                    self.advance();
                    self.make_token(TokenKind::NotEq)
                } else {
                    self.make_token(TokenKind::Error(String::from("Unexpected character: !")))
                }
            }
            '|' => {
                if self.peek() == Some('|') {
                    self.advance();
                    self.make_token(TokenKind::Concat)
                } else {
                    self.make_token(TokenKind::BitOr)
                }
            }

            // Quoted forms rescan from the opening quote
            '\'' => {
                self.pos = self.start;
                self.scan_string()
            }
            '"' | '`' => {
                self.pos = self.start;
                self.scan_quoted_identifier(c)
            }

            c if c.is_ascii_digit() => {
                self.pos = self.start;
                self.scan_number()
            }

            c if c.is_alphabetic() || c == '_' => {
                self.pos = self.start;
                self.scan_identifier()
            }

            _ => self.make_token(TokenKind::Error(format!("Unexpected character: {c}"))),
        }
    }

    /// Tokenizes the entire input and returns all tokens, ending with `Eof`.
    #[must_use]
    pub fn tokenize(&mut self) -> Vec<Token> {
        let mut tokens = Vec::new();
        loop {
            let token = self.next_token();
            let is_eof = token.is_eof();
            tokens.push(token);
            if is_eof {
                break;
            }
        }
        tokens
    }
}

/// Splits SQL text into statements on top-level `;` tokens.
///
/// Semicolons inside string literals, quoted identifiers and comments do not
/// split. Each returned slice is trimmed and keeps its terminating `;` (if
/// any) and any comment lines that precede it. Segments holding nothing but
/// whitespace or comments are dropped.
#[must_use]
pub fn split_statements(input: &str) -> Vec<&str> {
    let mut lexer = Lexer::new(input);
    let mut statements = Vec::new();
    let mut segment_start = 0;
    let mut has_tokens = false;

    loop {
        let token = lexer.next_token();
        match token.kind {
            TokenKind::Eof => {
                if has_tokens {
                    statements.push(input[segment_start..].trim());
                }
                break;
            }
            TokenKind::Semicolon => {
                if has_tokens {
                    statements.push(input[segment_start..token.span.end].trim());
                }
                segment_start = token.span.end;
                has_tokens = false;
            }
            _ => has_tokens = true,
        }
    }

    statements
}
