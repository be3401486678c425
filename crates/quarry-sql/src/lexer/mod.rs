//! SQL Lexer/Tokenizer
//!
//! Turns SQL text into the EOF-terminated token stream the parser consumes.

mod span;
mod token;
mod tokenizer;

pub use span::Span;
pub use token::{Keyword, Token, TokenCategory, TokenKind};
pub use tokenizer::Lexer;
