//! Token cursor with one-token lookahead and checkpoints.

use crate::lexer::{Keyword, Span, Token, TokenKind};

/// Saved cursor position, restored with [`TokenCursor::reset_to`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Mark {
    pos: usize,
    paren_depth: i32,
}

/// Walks an EOF-terminated token vector.
///
/// The cursor never moves past the final `Eof` token, so `current()` and
/// `peek()` are always defined. It also tracks the parenthesis depth of the
/// tokens consumed so far.
#[derive(Debug, Default)]
pub struct TokenCursor {
    tokens: Vec<Token>,
    pos: usize,
    paren_depth: i32,
}

impl TokenCursor {
    /// Wraps `tokens`, appending an `Eof` token if the stream lacks one.
    #[must_use]
    pub fn new(mut tokens: Vec<Token>) -> Self {
        if !tokens.last().is_some_and(Token::is_eof) {
            let end = tokens.last().map_or(0, |t| t.span.end);
            let (line, column) = tokens.last().map_or((1, 1), |t| (t.line, t.column));
            tokens.push(Token::new(TokenKind::Eof, Span::new(end, end), line, column));
        }
        Self {
            tokens,
            pos: 0,
            paren_depth: 0,
        }
    }

    fn last_index(&self) -> usize {
        self.tokens.len() - 1
    }

    /// The token under the cursor.
    #[must_use]
    pub fn current(&self) -> &Token {
        &self.tokens[self.pos]
    }

    /// The token after the current one (`Eof` at the end of input).
    #[must_use]
    pub fn peek(&self) -> &Token {
        &self.tokens[(self.pos + 1).min(self.last_index())]
    }

    /// The token `n` positions ahead of the current one.
    #[must_use]
    pub fn peek_nth(&self, n: usize) -> &Token {
        &self.tokens[(self.pos + n).min(self.last_index())]
    }

    /// The most recently consumed token, or the current one at the start.
    #[must_use]
    pub fn previous(&self) -> &Token {
        &self.tokens[self.pos.saturating_sub(1)]
    }

    /// Consumes the current token and returns it.
    pub fn advance(&mut self) -> &Token {
        let index = self.pos;
        match self.tokens[index].kind {
            TokenKind::LeftParen => self.paren_depth += 1,
            TokenKind::RightParen => self.paren_depth -= 1,
            _ => {}
        }
        if index < self.last_index() {
            self.pos += 1;
        }
        &self.tokens[index]
    }

    /// Returns true at the final `Eof` token.
    #[must_use]
    pub fn at_end(&self) -> bool {
        self.current().is_eof()
    }

    #[must_use]
    pub fn check(&self, kind: &TokenKind) -> bool {
        core::mem::discriminant(&self.current().kind) == core::mem::discriminant(kind)
    }

    #[must_use]
    pub fn check_keyword(&self, keyword: Keyword) -> bool {
        self.current().as_keyword() == Some(keyword)
    }

    /// Consumes the current token if it has the kind of `kind`.
    pub fn eat(&mut self, kind: &TokenKind) -> bool {
        if self.check(kind) {
            self.advance();
            true
        } else {
            false
        }
    }

    /// Consumes the current token if it is `keyword`.
    pub fn eat_keyword(&mut self, keyword: Keyword) -> bool {
        if self.check_keyword(keyword) {
            self.advance();
            true
        } else {
            false
        }
    }

    #[must_use]
    pub const fn mark(&self) -> Mark {
        Mark {
            pos: self.pos,
            paren_depth: self.paren_depth,
        }
    }

    /// Rewinds to a checkpoint taken with [`TokenCursor::mark`].
    pub fn reset_to(&mut self, mark: Mark) {
        self.pos = mark.pos.min(self.last_index());
        self.paren_depth = mark.paren_depth;
    }

    /// Net number of `(` minus `)` consumed so far.
    #[must_use]
    pub const fn paren_depth(&self) -> i32 {
        self.paren_depth
    }

    /// Starts a new statement's parenthesis count.
    pub fn reset_paren_depth(&mut self) {
        self.paren_depth = 0;
    }

    /// Index of the current token.
    #[must_use]
    pub const fn position(&self) -> usize {
        self.pos
    }

    #[must_use]
    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    /// Drops every token and rewinds.
    pub fn clear(&mut self) {
        *self = Self::new(Vec::new());
    }
}
