//! Shared state and token helpers for the recursive-descent routines.
//!
//! The grammar itself is split across `expr`, `select`, `dml`, `ddl` and
//! `statement`, each adding methods to [`Engine`].

use super::context::ContextStack;
use super::cursor::TokenCursor;
use super::depth::{DepthGuard, DepthTracker};
use super::error::ParseError;
use crate::ast::{NodeFlags, NodeId, NodeKind, ParseContext, Tree};
use crate::lexer::{Keyword, Span, Token, TokenKind};

/// One parse in progress: the token cursor, the tree being built, the depth
/// tracker and the clause stack.
pub(crate) struct Engine<'a> {
    pub(super) source: &'a str,
    pub(super) cursor: &'a mut TokenCursor,
    pub(super) tree: &'a mut Tree,
    pub(super) depth: DepthTracker,
    pub(super) contexts: ContextStack,
    pub(super) strict: bool,
}

impl<'a> Engine<'a> {
    pub(crate) fn new(
        source: &'a str,
        cursor: &'a mut TokenCursor,
        tree: &'a mut Tree,
        depth: DepthTracker,
        strict: bool,
    ) -> Self {
        Self {
            source,
            cursor,
            tree,
            depth,
            contexts: ContextStack::new(),
            strict,
        }
    }

    // Token helpers

    pub(super) fn current(&self) -> &Token {
        self.cursor.current()
    }

    pub(super) fn current_kind(&self) -> &TokenKind {
        &self.cursor.current().kind
    }

    pub(super) fn current_span(&self) -> Span {
        self.cursor.current().span
    }

    pub(super) fn peek_kind(&self) -> &TokenKind {
        &self.cursor.peek().kind
    }

    pub(super) fn advance(&mut self) -> Span {
        self.cursor.advance().span
    }

    pub(super) fn check(&self, kind: &TokenKind) -> bool {
        self.cursor.check(kind)
    }

    pub(super) fn check_keyword(&self, keyword: Keyword) -> bool {
        self.cursor.check_keyword(keyword)
    }

    pub(super) fn eat(&mut self, kind: &TokenKind) -> bool {
        self.cursor.eat(kind)
    }

    pub(super) fn eat_keyword(&mut self, keyword: Keyword) -> bool {
        self.cursor.eat_keyword(keyword)
    }

    /// Returns true if the current token is an identifier spelled `word`
    /// (ASCII case-insensitive). Used for words outside the keyword table.
    pub(super) fn check_word(&self, word: &str) -> bool {
        is_word(self.current(), word)
    }

    pub(super) fn peek_is_word(&self, word: &str) -> bool {
        is_word(self.cursor.peek(), word)
    }

    pub(super) fn eat_word(&mut self, word: &str) -> bool {
        if self.check_word(word) {
            self.advance();
            true
        } else {
            false
        }
    }

    pub(super) fn expect(&mut self, kind: &TokenKind) -> Result<Span, ParseError> {
        if self.check(kind) {
            Ok(self.advance())
        } else {
            Err(self.unexpected(format!("'{}'", kind.symbol())))
        }
    }

    pub(super) fn expect_keyword(&mut self, keyword: Keyword) -> Result<Span, ParseError> {
        if self.check_keyword(keyword) {
            Ok(self.advance())
        } else {
            Err(self.unexpected(keyword.as_str()))
        }
    }

    pub(super) fn expect_word(&mut self, word: &str) -> Result<Span, ParseError> {
        if self.check_word(word) {
            Ok(self.advance())
        } else {
            Err(self.unexpected(word))
        }
    }

    /// Builds an "unexpected token" error at the current token.
    pub(super) fn unexpected(&self, expected: impl Into<String>) -> ParseError {
        ParseError::unexpected(expected, self.current())
    }

    /// Source spelling of a token.
    pub(super) fn token_text(&self, token: &Token) -> &'a str {
        token.span.slice(self.source)
    }

    /// Returns true if `token` can be used as a name: an identifier or a
    /// non-reserved keyword.
    pub(super) fn is_name(token: &Token) -> bool {
        match &token.kind {
            TokenKind::Identifier(_) => true,
            TokenKind::Keyword(kw) => kw.is_non_reserved(),
            _ => false,
        }
    }

    pub(super) fn at_name(&self) -> bool {
        Self::is_name(self.current())
    }

    /// Consumes a name. Quoted identifiers lose their quotes; keywords keep
    /// their source spelling.
    pub(super) fn expect_name(&mut self, what: &str) -> Result<(String, Span), ParseError> {
        let token = self.current();
        let name = match &token.kind {
            TokenKind::Identifier(name) => name.clone(),
            TokenKind::Keyword(kw) if kw.is_non_reserved() => self.token_text(token).to_string(),
            _ => return Err(self.unexpected(what)),
        };
        let span = self.advance();
        Ok((name, span))
    }

    /// Consumes `name` or `schema.name`.
    pub(super) fn expect_qualified_name(
        &mut self,
        what: &str,
    ) -> Result<(Option<String>, String, Span), ParseError> {
        let (first, start) = self.expect_name(what)?;
        if self.check(&TokenKind::Dot) && Self::is_name(self.cursor.peek()) {
            self.advance();
            let (second, end) = self.expect_name(what)?;
            Ok((Some(first), second, start.merge(end)))
        } else {
            Ok((None, first, start))
        }
    }

    /// Span from `start` through the most recently consumed token.
    pub(super) fn span_from(&self, start: Span) -> Span {
        start.merge(self.cursor.previous().span)
    }

    // Recursion and clause bookkeeping

    /// Enters one level of recursion. Fails once the depth limit is crossed.
    pub(super) fn guard(&self) -> Result<DepthGuard, ParseError> {
        self.depth
            .enter()
            .ok_or_else(|| ParseError::depth_exceeded(self.depth.max_depth(), self.current_span()))
    }

    /// Runs `f` with `context` pushed on the clause stack.
    pub(super) fn with_context<T>(
        &mut self,
        context: ParseContext,
        f: impl FnOnce(&mut Self) -> Result<T, ParseError>,
    ) -> Result<T, ParseError> {
        self.contexts.push(context);
        let result = f(self);
        self.contexts.pop();
        result
    }

    // Node construction

    pub(super) fn node(&mut self, kind: NodeKind, span: Span) -> NodeId {
        self.tree.alloc(kind, span)
    }

    pub(super) fn node_with_text(
        &mut self,
        kind: NodeKind,
        span: Span,
        text: &str,
    ) -> Result<NodeId, ParseError> {
        Ok(self.tree.alloc_with_text(kind, span, text)?)
    }

    pub(super) fn append(&mut self, parent: NodeId, child: NodeId) -> Result<(), ParseError> {
        Ok(self.tree.append_child(parent, child)?)
    }

    pub(super) fn wrap(
        &mut self,
        kind: NodeKind,
        span: Span,
        children: &[NodeId],
    ) -> Result<NodeId, ParseError> {
        Ok(self.tree.wrap(kind, span, children)?)
    }

    pub(super) fn set_secondary(&mut self, id: NodeId, text: &str) -> Result<(), ParseError> {
        Ok(self.tree.set_secondary(id, text)?)
    }

    pub(super) fn flag(&mut self, id: NodeId, flags: NodeFlags) -> Result<(), ParseError> {
        Ok(self.tree.add_flags(id, flags)?)
    }

    /// Extends a node's span through the most recently consumed token.
    pub(super) fn finish(&mut self, id: NodeId) -> Result<NodeId, ParseError> {
        let end = self.cursor.previous().span;
        self.tree.extend_span(id, end)?;
        Ok(id)
    }

    /// Materializes a bare name. Inside a column context it becomes a
    /// `ColumnRef`, elsewhere an `Identifier`; either way the enclosing
    /// clause is recorded as its context hint.
    pub(super) fn bare_name(&mut self, name: &str, span: Span) -> Result<NodeId, ParseError> {
        let context = self.contexts.current();
        let kind = if context.is_column_context() {
            NodeKind::ColumnRef
        } else {
            NodeKind::Identifier
        };
        let id = self.node_with_text(kind, span, name)?;
        self.tree.set_context_hint(id, context)?;
        Ok(id)
    }

    /// A plain `Identifier` for names that are never columns (constraint,
    /// savepoint and similar names).
    pub(super) fn identifier(&mut self, name: &str, span: Span) -> Result<NodeId, ParseError> {
        self.node_with_text(NodeKind::Identifier, span, name)
    }

    /// Attaches an alias. Nodes whose secondary text already holds a
    /// qualifier are wrapped in an `AliasExpr` carrying the alias instead.
    pub(super) fn apply_alias(
        &mut self,
        id: NodeId,
        alias: &str,
        span: Span,
    ) -> Result<NodeId, ParseError> {
        let occupied = self
            .tree
            .get(id)
            .is_some_and(|node| node.secondary().is_some());
        let target = if occupied {
            let start = self.tree.get(id).map_or(span, |node| node.span());
            self.wrap(NodeKind::AliasExpr, start.merge(span), &[id])?
        } else {
            self.tree.extend_span(id, span)?;
            id
        };
        self.set_secondary(target, alias)?;
        self.flag(target, NodeFlags::HAS_ALIAS)?;
        Ok(target)
    }

    /// Parses `[AS] alias`. Without `AS` only a plain identifier is taken, so
    /// clause keywords are never swallowed.
    pub(super) fn parse_optional_alias(&mut self) -> Result<Option<(String, Span)>, ParseError> {
        if self.eat_keyword(Keyword::As) {
            if let TokenKind::String(s) = self.current_kind() {
                let alias = s.clone();
                let span = self.advance();
                return Ok(Some((alias, span)));
            }
            return self.expect_name("alias").map(Some);
        }
        match self.current_kind() {
            TokenKind::Identifier(name) if !is_soft_clause_word(name) => {
                let alias = name.clone();
                let span = self.advance();
                Ok(Some((alias, span)))
            }
            _ => Ok(None),
        }
    }

    /// Parses an optional alias and applies it to `id`.
    pub(super) fn aliased(&mut self, id: NodeId) -> Result<NodeId, ParseError> {
        match self.parse_optional_alias()? {
            Some((alias, span)) => self.apply_alias(id, &alias, span),
            None => Ok(id),
        }
    }

    /// Parses `(name, ...)` into a `ColumnList` of `Identifier` nodes.
    pub(super) fn parse_column_list(&mut self) -> Result<NodeId, ParseError> {
        let start = self.expect(&TokenKind::LeftParen)?;
        let list = self.node(NodeKind::ColumnList, start);
        loop {
            let (name, span) = self.expect_name("column name")?;
            let column = self.identifier(&name, span)?;
            self.append(list, column)?;
            if !self.eat(&TokenKind::Comma) {
                break;
            }
        }
        self.expect(&TokenKind::RightParen)?;
        self.finish(list)
    }

    /// Parses `IF NOT EXISTS`, returning whether it was present.
    pub(super) fn parse_if_not_exists(&mut self) -> Result<bool, ParseError> {
        if self.check_keyword(Keyword::If)
            && matches!(self.peek_kind(), TokenKind::Keyword(Keyword::Not))
        {
            self.advance();
            self.advance();
            self.expect_keyword(Keyword::Exists)?;
            Ok(true)
        } else {
            Ok(false)
        }
    }

    /// Parses `IF EXISTS`, returning whether it was present.
    pub(super) fn parse_if_exists(&mut self) -> Result<bool, ParseError> {
        if self.check_keyword(Keyword::If)
            && matches!(self.peek_kind(), TokenKind::Keyword(Keyword::Exists))
        {
            self.advance();
            self.advance();
            Ok(true)
        } else {
            Ok(false)
        }
    }
}

fn is_word(token: &Token, word: &str) -> bool {
    matches!(&token.kind, TokenKind::Identifier(name) if name.eq_ignore_ascii_case(word))
}

/// Soft keywords that may follow a table or expression and must not be read
/// as a bare alias.
fn is_soft_clause_word(name: &str) -> bool {
    ["ESCAPE", "FILTER", "WITHIN", "NOTNULL", "ISNULL"]
        .iter()
        .any(|w| name.eq_ignore_ascii_case(w))
}
