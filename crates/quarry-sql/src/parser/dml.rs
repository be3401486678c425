//! INSERT, UPDATE and DELETE.

use super::engine::Engine;
use super::error::ParseError;
use crate::ast::{NodeId, NodeKind, ParseContext};
use crate::lexer::{Keyword, Span, TokenKind};

impl Engine<'_> {
    /// `INSERT [OR action] INTO table [AS alias] [(cols)] source
    /// [ON CONFLICT ...] [RETURNING ...]`, also `REPLACE INTO ...`.
    ///
    /// The source is `VALUES ...`, a query, or `DEFAULT VALUES`.
    pub(super) fn parse_insert(&mut self) -> Result<NodeId, ParseError> {
        let start = self.current_span();
        let resolution = if self.eat_keyword(Keyword::Replace) {
            Some("REPLACE")
        } else {
            self.expect_keyword(Keyword::Insert)?;
            self.parse_or_resolution()?
        };
        self.expect_keyword(Keyword::Into)?;

        let (schema, table, _) = self.expect_qualified_name("table name")?;
        let insert = self.node_with_text(NodeKind::InsertStmt, start, &table)?;
        if let Some(schema) = schema {
            self.set_secondary(insert, &schema)?;
        }
        if let Some(resolution) = resolution {
            let clause = self.node_with_text(NodeKind::OnConflictClause, start, resolution)?;
            self.append(insert, clause)?;
        }
        if self.eat_keyword(Keyword::As) {
            let (alias, span) = self.expect_name("alias")?;
            let alias = self.identifier(&alias, span)?;
            self.append(insert, alias)?;
        }

        if self.check(&TokenKind::LeftParen) {
            // `(` opens either the column list or a parenthesized query.
            let mark = self.cursor.mark();
            self.advance();
            let query_follows = self.at_query_start();
            self.cursor.reset_to(mark);
            if !query_follows {
                let columns = self.parse_column_list()?;
                self.append(insert, columns)?;
            }
        }

        let source = match self.current_kind() {
            TokenKind::Keyword(Keyword::Default) => {
                let default_start = self.advance();
                self.expect_keyword(Keyword::Values)?;
                let span = self.span_from(default_start);
                self.node_with_text(NodeKind::DefaultValue, span, "DEFAULT VALUES")?
            }
            TokenKind::Keyword(Keyword::Values | Keyword::Select) | TokenKind::LeftParen => {
                self.parse_set_expr()?
            }
            TokenKind::Keyword(Keyword::With) => self.parse_with(false)?,
            _ => return Err(self.unexpected("VALUES, SELECT or DEFAULT VALUES")),
        };
        self.append(insert, source)?;

        if self.check_keyword(Keyword::On) {
            let clause = self.parse_on_conflict()?;
            self.append(insert, clause)?;
        }
        if let Some(returning) = self.parse_returning()? {
            self.append(insert, returning)?;
        }
        self.finish(insert)
    }

    /// `OR {REPLACE | IGNORE | ABORT | FAIL | ROLLBACK}` after INSERT/UPDATE.
    fn parse_or_resolution(&mut self) -> Result<Option<&'static str>, ParseError> {
        if !self.eat_keyword(Keyword::Or) {
            return Ok(None);
        }
        let resolution = match self.current().as_keyword() {
            Some(Keyword::Replace) => "REPLACE",
            Some(Keyword::Ignore) => "IGNORE",
            Some(Keyword::Abort) => "ABORT",
            Some(Keyword::Fail) => "FAIL",
            Some(Keyword::Rollback) => "ROLLBACK",
            _ => return Err(self.unexpected("REPLACE, IGNORE, ABORT, FAIL or ROLLBACK")),
        };
        self.advance();
        Ok(Some(resolution))
    }

    /// `ON CONFLICT [(cols)] DO NOTHING | DO UPDATE SET ... [WHERE ...]`.
    fn parse_on_conflict(&mut self) -> Result<NodeId, ParseError> {
        let start = self.expect_keyword(Keyword::On)?;
        self.expect_keyword(Keyword::Conflict)?;
        let target = if self.check(&TokenKind::LeftParen) {
            Some(self.parse_column_list()?)
        } else {
            None
        };
        self.expect_keyword(Keyword::Do)?;

        let clause = if self.eat_keyword(Keyword::Nothing) {
            self.node_with_text(NodeKind::OnConflictClause, start, "NOTHING")?
        } else {
            self.expect_keyword(Keyword::Update)?;
            self.node_with_text(NodeKind::OnConflictClause, start, "UPDATE")?
        };
        if let Some(target) = target {
            self.append(clause, target)?;
        }
        if self.check_keyword(Keyword::Set) {
            let set = self.parse_set_clause()?;
            self.append(clause, set)?;
            if let Some(filter) = self.parse_where()? {
                self.append(clause, filter)?;
            }
        }
        self.finish(clause)
    }

    /// `UPDATE [OR action] table [AS alias] SET ... [FROM ...] [WHERE ...]
    /// [RETURNING ...]`.
    pub(super) fn parse_update(&mut self) -> Result<NodeId, ParseError> {
        let start = self.expect_keyword(Keyword::Update)?;
        let update = self.node(NodeKind::UpdateStmt, start);
        if let Some(resolution) = self.parse_or_resolution()? {
            let clause = self.node_with_text(NodeKind::OnConflictClause, start, resolution)?;
            self.append(update, clause)?;
        }

        let table = self.with_context(ParseContext::FromClause, Self::parse_table_factor)?;
        self.append(update, table)?;

        let set = self.parse_set_clause()?;
        self.append(update, set)?;

        if self.check_keyword(Keyword::From) {
            self.advance();
            let from = self.parse_from_clause()?;
            self.append(update, from)?;
        }
        if let Some(filter) = self.parse_where()? {
            self.append(update, filter)?;
        }
        if let Some(returning) = self.parse_returning()? {
            self.append(update, returning)?;
        }
        self.finish(update)
    }

    /// `SET col = expr, (a, b) = (...), ...`.
    fn parse_set_clause(&mut self) -> Result<NodeId, ParseError> {
        let start = self.expect_keyword(Keyword::Set)?;
        let set = self.node(NodeKind::SetClause, start);
        loop {
            let assignment = if self.check(&TokenKind::LeftParen) {
                let columns = self.parse_column_list()?;
                let assignment = self.node(NodeKind::Assignment, self.node_span(columns));
                self.append(assignment, columns)?;
                assignment
            } else {
                let (column, span) = self.expect_qualified_column()?;
                self.node_with_text(NodeKind::Assignment, span, &column)?
            };
            self.expect(&TokenKind::Eq)?;
            let value = self.parse_expr()?;
            self.append(assignment, value)?;
            self.finish(assignment)?;
            self.append(set, assignment)?;
            if !self.eat(&TokenKind::Comma) {
                break;
            }
        }
        self.finish(set)
    }

    /// Assignment target: `col` or `t.col` (the qualifier is dropped).
    fn expect_qualified_column(&mut self) -> Result<(String, Span), ParseError> {
        let (mut column, start) = self.expect_name("column name")?;
        while self.eat(&TokenKind::Dot) {
            let (part, _) = self.expect_name("column name")?;
            column = part;
        }
        Ok((column, self.span_from(start)))
    }

    /// `DELETE FROM table [AS alias] [USING ...] [WHERE ...] [RETURNING ...]`.
    pub(super) fn parse_delete(&mut self) -> Result<NodeId, ParseError> {
        let start = self.expect_keyword(Keyword::Delete)?;
        self.expect_keyword(Keyword::From)?;
        let delete = self.node(NodeKind::DeleteStmt, start);

        let table = self.with_context(ParseContext::FromClause, Self::parse_table_factor)?;
        self.append(delete, table)?;

        if self.check_keyword(Keyword::Using) {
            let using_start = self.advance();
            let using = self.node(NodeKind::UsingClause, using_start);
            self.with_context(ParseContext::FromClause, |p| loop {
                let item = p.parse_table_factor()?;
                p.append(using, item)?;
                if !p.eat(&TokenKind::Comma) {
                    return Ok(());
                }
            })?;
            self.finish(using)?;
            self.append(delete, using)?;
        }
        if let Some(filter) = self.parse_where()? {
            self.append(delete, filter)?;
        }
        if let Some(returning) = self.parse_returning()? {
            self.append(delete, returning)?;
        }
        self.finish(delete)
    }

    /// `RETURNING item, ...`, with items parsed like a SELECT list.
    fn parse_returning(&mut self) -> Result<Option<NodeId>, ParseError> {
        if !self.check_keyword(Keyword::Returning) {
            return Ok(None);
        }
        let start = self.advance();
        let returning = self.node(NodeKind::ReturningClause, start);
        self.with_context(ParseContext::SelectList, |p| loop {
            let item = if p.check(&TokenKind::Star) {
                let span = p.advance();
                p.node(NodeKind::Star, span)
            } else {
                let expr = p.parse_expr()?;
                p.aliased(expr)?
            };
            p.append(returning, item)?;
            if !p.eat(&TokenKind::Comma) {
                return Ok(());
            }
        })?;
        self.finish(returning).map(Some)
    }
}
