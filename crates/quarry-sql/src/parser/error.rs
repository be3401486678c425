//! Parser error types.

use core::fmt;

use thiserror::Error;

use crate::ast::TreeError;
use crate::lexer::{Span, Token};

/// Longest excerpt, in characters, before it is cut around the error column.
const MAX_EXCERPT_CHARS: usize = 60;

/// Category of a parse failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParseErrorKind {
    /// The input holds no tokens besides whitespace and comments.
    EmptyInput,
    /// A required token or production is missing.
    Syntax,
    /// Nesting exceeded the configured maximum depth.
    DepthExceeded,
    /// `(` and `)` tokens do not pair up.
    UnbalancedParenthesis,
    /// A strict-mode structural rule was violated.
    Validation,
    /// An operator from another language (`==`, `===`, `!==`) in strict mode.
    InvalidOperator,
    /// The parser reached a state it should never reach.
    Internal,
}

impl ParseErrorKind {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::EmptyInput => "empty input",
            Self::Syntax => "syntax error",
            Self::DepthExceeded => "depth exceeded",
            Self::UnbalancedParenthesis => "unbalanced parenthesis",
            Self::Validation => "validation error",
            Self::InvalidOperator => "invalid operator",
            Self::Internal => "internal error",
        }
    }
}

impl fmt::Display for ParseErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A parse error.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{kind}: {message} at line {line}, column {column}")]
pub struct ParseError {
    pub kind: ParseErrorKind,
    /// The error message.
    pub message: String,
    /// The location of the error.
    pub span: Span,
    /// 1-based line of `span.start`.
    pub line: u32,
    /// 1-based column (in characters) of `span.start`.
    pub column: u32,
    /// The source line around the error.
    pub excerpt: String,
    /// Expected tokens (if applicable).
    pub expected: Option<String>,
    /// The actual token found.
    pub found: Option<String>,
}

impl ParseError {
    /// Creates an error without source location details; see
    /// [`ParseError::with_source`].
    #[must_use]
    pub fn new(kind: ParseErrorKind, message: impl Into<String>, span: Span) -> Self {
        Self {
            kind,
            message: message.into(),
            span,
            line: 0,
            column: 0,
            excerpt: String::new(),
            expected: None,
            found: None,
        }
    }

    #[must_use]
    pub fn syntax(message: impl Into<String>, span: Span) -> Self {
        Self::new(ParseErrorKind::Syntax, message, span)
    }

    /// Creates an "unexpected token" error.
    #[must_use]
    pub fn unexpected(expected: impl Into<String>, token: &Token) -> Self {
        let expected: String = expected.into();
        let found = token.kind.describe();
        let message = if token.is_eof() {
            format!("unexpected end of input: expected {expected}")
        } else {
            format!("unexpected token: expected {expected}, found {found}")
        };
        Self {
            expected: Some(expected),
            found: Some(found),
            ..Self::syntax(message, token.span)
        }
    }

    #[must_use]
    pub fn depth_exceeded(max_depth: u32, span: Span) -> Self {
        Self::new(
            ParseErrorKind::DepthExceeded,
            format!("maximum nesting depth of {max_depth} exceeded"),
            span,
        )
    }

    /// Byte offset of the error in the source.
    #[must_use]
    pub const fn offset(&self) -> usize {
        self.span.start
    }

    /// Fills in line, column and excerpt from the parsed source.
    #[must_use]
    pub fn with_source(mut self, source: &str) -> Self {
        let offset = floor_char_boundary(source, self.span.start);
        let line_start = source[..offset].rfind('\n').map_or(0, |i| i + 1);
        let line_end = source[offset..]
            .find('\n')
            .map_or(source.len(), |i| offset + i);
        let line = source[..offset].matches('\n').count() + 1;
        let column = source[line_start..offset].chars().count() + 1;

        self.line = u32::try_from(line).unwrap_or(u32::MAX);
        self.column = u32::try_from(column).unwrap_or(u32::MAX);
        self.excerpt = excerpt(&source[line_start..line_end], column - 1);
        self
    }
}

impl From<TreeError> for ParseError {
    fn from(err: TreeError) -> Self {
        Self::new(ParseErrorKind::Internal, err.to_string(), Span::default())
    }
}

fn floor_char_boundary(source: &str, offset: usize) -> usize {
    let mut offset = offset.min(source.len());
    while !source.is_char_boundary(offset) {
        offset -= 1;
    }
    offset
}

fn excerpt(line: &str, column: usize) -> String {
    let line = line.trim_end_matches('\r');
    let total = line.chars().count();
    if total <= MAX_EXCERPT_CHARS {
        return line.to_string();
    }
    let half = MAX_EXCERPT_CHARS / 2;
    let start = column.saturating_sub(half).min(total - MAX_EXCERPT_CHARS);
    let window: String = line.chars().skip(start).take(MAX_EXCERPT_CHARS).collect();
    let prefix = if start > 0 { "..." } else { "" };
    let suffix = if start + MAX_EXCERPT_CHARS < total {
        "..."
    } else {
        ""
    };
    format!("{prefix}{window}{suffix}")
}
