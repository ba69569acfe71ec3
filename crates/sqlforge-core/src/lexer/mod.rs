//! SQL Lexer/Tokenizer
//!
//! A hand-written lexer that turns SQL text into a stream of spanned tokens.
//! It is the tokenizer behind statement splitting, the syntax validator and
//! the formatter.

mod span;
mod token;
mod tokenizer;

pub use span::Span;
pub use token::{Keyword, Token, TokenKind};
pub use tokenizer::{split_statements, Lexer};
