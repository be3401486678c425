//! SELECT, set operations, CTEs and VALUES.

use super::engine::Engine;
use super::error::ParseError;
use crate::ast::{NodeFlags, NodeId, NodeKind, ParseContext};
use crate::lexer::{Keyword, Span, TokenKind};

impl Engine<'_> {
    /// Parses the body of a parenthesized query, recording `Subquery` as the
    /// enclosing clause.
    pub(super) fn parse_subquery_body(&mut self) -> Result<NodeId, ParseError> {
        let _guard = self.guard()?;
        self.with_context(ParseContext::Subquery, Self::parse_query)
    }

    /// A query expression: `WITH ... SELECT` or a set expression.
    pub(super) fn parse_query(&mut self) -> Result<NodeId, ParseError> {
        if self.check_keyword(Keyword::With) {
            self.parse_with(false)
        } else {
            self.parse_set_expr()
        }
    }

    /// `WITH [RECURSIVE] cte, ... main-statement`. The CTE clause becomes the
    /// first child of the main statement.
    pub(super) fn parse_with(&mut self, allow_dml: bool) -> Result<NodeId, ParseError> {
        let _guard = self.guard()?;
        let start = self.expect_keyword(Keyword::With)?;
        let clause = self.node(NodeKind::CteClause, start);
        if self.eat_keyword(Keyword::Recursive) {
            self.flag(clause, NodeFlags::RECURSIVE)?;
        }
        loop {
            let definition = self.parse_cte_definition()?;
            self.append(clause, definition)?;
            if !self.eat(&TokenKind::Comma) {
                break;
            }
        }
        self.finish(clause)?;

        let main = match self.current_kind() {
            TokenKind::Keyword(Keyword::Select | Keyword::Values) | TokenKind::LeftParen => {
                self.parse_set_expr()?
            }
            TokenKind::Keyword(Keyword::Insert | Keyword::Replace) if allow_dml => {
                self.parse_insert()?
            }
            TokenKind::Keyword(Keyword::Update) if allow_dml => self.parse_update()?,
            TokenKind::Keyword(Keyword::Delete) if allow_dml => self.parse_delete()?,
            _ => return Err(self.unexpected("SELECT after WITH")),
        };
        self.tree.prepend_child(main, clause)?;
        Ok(main)
    }

    /// `name [(col, ...)] AS ( query )`.
    fn parse_cte_definition(&mut self) -> Result<NodeId, ParseError> {
        let _guard = self.guard()?;
        let (name, start) = self.expect_name("CTE name")?;
        let definition = self.node_with_text(NodeKind::CteDefinition, start, &name)?;

        if self.check(&TokenKind::LeftParen) {
            // Either a column list or, without AS, the query body itself.
            let mark = self.cursor.mark();
            self.advance();
            let body_follows = self.at_query_start();
            self.cursor.reset_to(mark);
            if body_follows {
                let body = self.parse_cte_body()?;
                self.append(definition, body)?;
                return self.finish(definition);
            }
            let columns = self.parse_column_list()?;
            self.append(definition, columns)?;
        }

        self.expect_keyword(Keyword::As)?;
        if self.check_keyword(Keyword::Not) && self.peek_is_word("MATERIALIZED") {
            self.advance();
        }
        self.eat_word("MATERIALIZED");
        let body = self.parse_cte_body()?;
        self.append(definition, body)?;
        self.finish(definition)
    }

    fn parse_cte_body(&mut self) -> Result<NodeId, ParseError> {
        self.expect(&TokenKind::LeftParen)?;
        let body = self.parse_subquery_body()?;
        self.expect(&TokenKind::RightParen)?;
        Ok(body)
    }

    /// A query term optionally followed by `UNION | INTERSECT | EXCEPT [ALL]`
    /// and the (recursively parsed) right-hand side.
    pub(super) fn parse_set_expr(&mut self) -> Result<NodeId, ParseError> {
        let _guard = self.guard()?;
        let left = self.parse_query_term()?;

        let kind = match self.current_kind() {
            TokenKind::Keyword(Keyword::Union) => NodeKind::Union,
            TokenKind::Keyword(Keyword::Intersect) => NodeKind::Intersect,
            TokenKind::Keyword(Keyword::Except) => NodeKind::Except,
            _ => return Ok(left),
        };
        let start = self.node_span(left);
        self.advance();
        let all = self.eat_keyword(Keyword::All);
        if !all {
            self.eat_keyword(Keyword::Distinct);
        }
        let right = self.parse_set_expr()?;
        let op = self.wrap(kind, start, &[left, right])?;
        if all {
            self.flag(op, NodeFlags::ALL)?;
        }
        Ok(op)
    }

    fn parse_query_term(&mut self) -> Result<NodeId, ParseError> {
        let _guard = self.guard()?;
        match self.current_kind() {
            TokenKind::Keyword(Keyword::Select) => self.parse_select(),
            TokenKind::Keyword(Keyword::Values) => self.parse_values(),
            TokenKind::LeftParen => {
                self.advance();
                let inner = self.parse_subquery_body()?;
                self.expect(&TokenKind::RightParen)?;
                Ok(inner)
            }
            _ => Err(self.unexpected("SELECT")),
        }
    }

    /// One SELECT block. Clauses are accepted in their fixed order.
    pub(super) fn parse_select(&mut self) -> Result<NodeId, ParseError> {
        let _guard = self.guard()?;
        let start = self.expect_keyword(Keyword::Select)?;
        let select = self.node(NodeKind::SelectStmt, start);

        if self.eat_keyword(Keyword::Distinct) {
            self.flag(select, NodeFlags::DISTINCT)?;
        } else if self.eat_keyword(Keyword::All) {
            self.flag(select, NodeFlags::ALL)?;
        }

        let list = self.parse_select_list()?;
        self.append(select, list)?;

        if self.check_keyword(Keyword::From) {
            self.advance();
            let from = self.parse_from_clause()?;
            self.append(select, from)?;
        }
        if let Some(clause) = self.parse_where()? {
            self.append(select, clause)?;
        }
        if let Some(clause) = self.parse_group_by()? {
            self.append(select, clause)?;
        }
        if self.check_keyword(Keyword::Having) {
            let having_start = self.advance();
            let condition = self.with_context(ParseContext::HavingClause, Self::parse_expr)?;
            let having = self.wrap(NodeKind::HavingClause, having_start, &[condition])?;
            self.append(select, having)?;
        }
        if let Some(clause) = self.parse_order_by()? {
            self.append(select, clause)?;
        }
        self.parse_limit(select)?;
        self.finish(select)
    }

    fn parse_select_list(&mut self) -> Result<NodeId, ParseError> {
        let list = self.node(NodeKind::SelectList, self.current_span());
        self.with_context(ParseContext::SelectList, |p| {
            loop {
                let item = if p.check(&TokenKind::Star) {
                    let span = p.advance();
                    p.node(NodeKind::Star, span)
                } else {
                    let expr = p.parse_expr()?;
                    p.aliased(expr)?
                };
                p.append(list, item)?;
                if !p.eat(&TokenKind::Comma) {
                    return Ok(());
                }
            }
        })?;
        self.finish(list)
    }

    /// Items after `FROM`: comma-separated table factors and JOIN chains.
    pub(super) fn parse_from_clause(&mut self) -> Result<NodeId, ParseError> {
        let from = self.node(NodeKind::FromClause, self.cursor.previous().span);
        self.with_context(ParseContext::FromClause, |p| {
            let first = p.parse_table_factor()?;
            p.append(from, first)?;
            loop {
                if p.eat(&TokenKind::Comma) {
                    let item = p.parse_table_factor()?;
                    p.append(from, item)?;
                } else if p.at_join() {
                    let join = p.parse_join()?;
                    p.append(from, join)?;
                } else {
                    return Ok(());
                }
            }
        })?;
        self.finish(from)
    }

    fn at_table_factor(&self) -> bool {
        self.at_name() || self.check(&TokenKind::LeftParen)
    }

    /// A table name, table-valued function or parenthesized subquery, with an
    /// optional alias.
    pub(super) fn parse_table_factor(&mut self) -> Result<NodeId, ParseError> {
        let _guard = self.guard()?;
        if self.check(&TokenKind::LeftParen) {
            if !matches!(
                self.peek_kind(),
                TokenKind::Keyword(Keyword::Select | Keyword::With | Keyword::Values)
            ) {
                return Err(self.unexpected("subquery"));
            }
            let subquery = self.parse_parenthesized_subquery()?;
            return self.aliased(subquery);
        }

        let (schema, name, span) = self.expect_qualified_name("table name")?;
        if schema.is_none() && self.check(&TokenKind::LeftParen) {
            let call = self.node_with_text(NodeKind::FunctionCall, span, &name)?;
            self.advance();
            if !self.check(&TokenKind::RightParen) {
                self.with_context(ParseContext::FunctionArg, |p| p.parse_expr_list_into(call))?;
            }
            self.expect(&TokenKind::RightParen)?;
            self.finish(call)?;
            return self.aliased(call);
        }
        let table = self.table_ref(schema.as_deref(), &name, span)?;
        self.aliased(table)
    }

    /// A `TableRef` node: `text` is the table, `secondary` the schema.
    pub(super) fn table_ref(
        &mut self,
        schema: Option<&str>,
        name: &str,
        span: Span,
    ) -> Result<NodeId, ParseError> {
        let table = self.node_with_text(NodeKind::TableRef, span, name)?;
        if let Some(schema) = schema {
            self.set_secondary(table, schema)?;
        }
        Ok(table)
    }

    fn at_join(&self) -> bool {
        matches!(
            self.current_kind(),
            TokenKind::Keyword(
                Keyword::Join
                    | Keyword::Inner
                    | Keyword::Left
                    | Keyword::Right
                    | Keyword::Full
                    | Keyword::Cross
                    | Keyword::Natural
            )
        )
    }

    /// `[NATURAL] [INNER | LEFT [OUTER] | RIGHT [OUTER] | FULL [OUTER] |
    /// CROSS] JOIN factor [ON expr | USING (cols)]`.
    ///
    /// The operand and the condition are both optional here; a missing
    /// operand is rejected by validation, a missing condition is tolerated.
    fn parse_join(&mut self) -> Result<NodeId, ParseError> {
        let _guard = self.guard()?;
        let start = self.current_span();
        let natural = self.eat_keyword(Keyword::Natural);
        let text = match self.current().as_keyword() {
            Some(Keyword::Inner) => {
                self.advance();
                "INNER JOIN"
            }
            Some(Keyword::Left) => {
                self.advance();
                self.eat_keyword(Keyword::Outer);
                "LEFT JOIN"
            }
            Some(Keyword::Right) => {
                self.advance();
                self.eat_keyword(Keyword::Outer);
                "RIGHT JOIN"
            }
            Some(Keyword::Full) => {
                self.advance();
                self.eat_keyword(Keyword::Outer);
                "FULL JOIN"
            }
            Some(Keyword::Cross) => {
                self.advance();
                "CROSS JOIN"
            }
            _ => "INNER JOIN",
        };
        self.expect_keyword(Keyword::Join)?;

        let join = self.node_with_text(NodeKind::JoinClause, start, text)?;
        if natural {
            self.flag(join, NodeFlags::NATURAL)?;
        }
        if self.at_table_factor() {
            let operand = self.parse_table_factor()?;
            self.append(join, operand)?;
        }

        if self.check_keyword(Keyword::On) {
            let on_start = self.advance();
            let condition = self.with_context(ParseContext::JoinCondition, Self::parse_expr)?;
            let clause = self.wrap(NodeKind::JoinCondition, on_start, &[condition])?;
            self.append(join, clause)?;
        } else if self.check_keyword(Keyword::Using) {
            let using_start = self.advance();
            let using = self.node(NodeKind::UsingClause, using_start);
            self.expect(&TokenKind::LeftParen)?;
            self.with_context(ParseContext::JoinCondition, |p| loop {
                let (name, span) = p.expect_name("column name")?;
                let column = p.bare_name(&name, span)?;
                p.append(using, column)?;
                if !p.eat(&TokenKind::Comma) {
                    return Ok(());
                }
            })?;
            self.expect(&TokenKind::RightParen)?;
            self.finish(using)?;
            self.append(join, using)?;
        }
        self.finish(join)
    }

    /// `WHERE expr`, or `None` when there is no WHERE.
    pub(super) fn parse_where(&mut self) -> Result<Option<NodeId>, ParseError> {
        if !self.check_keyword(Keyword::Where) {
            return Ok(None);
        }
        let start = self.advance();
        let condition = self.with_context(ParseContext::WhereClause, Self::parse_expr)?;
        let clause = self.wrap(NodeKind::WhereClause, start, &[condition])?;
        Ok(Some(clause))
    }

    /// `GROUP BY item, ...` where an item is an expression, `GROUPING SETS
    /// (...)`, `CUBE (...)` or `ROLLUP (...)`.
    fn parse_group_by(&mut self) -> Result<Option<NodeId>, ParseError> {
        if !self.check_keyword(Keyword::Group) {
            return Ok(None);
        }
        let start = self.advance();
        self.expect_keyword(Keyword::By)?;
        let clause = self.node(NodeKind::GroupByClause, start);
        self.with_context(ParseContext::GroupByClause, |p| loop {
            let item = p.parse_grouping_item()?;
            p.append(clause, item)?;
            if !p.eat(&TokenKind::Comma) {
                return Ok(());
            }
        })?;
        self.finish(clause).map(Some)
    }

    fn parse_grouping_item(&mut self) -> Result<NodeId, ParseError> {
        let start = self.current_span();
        let text = match self.current().as_keyword() {
            Some(Keyword::Grouping) if self.peek_keyword_is(Keyword::Sets) => {
                self.advance();
                self.advance();
                "GROUPING SETS"
            }
            Some(Keyword::Cube) if self.check_peek_paren() => {
                self.advance();
                "CUBE"
            }
            Some(Keyword::Rollup) if self.check_peek_paren() => {
                self.advance();
                "ROLLUP"
            }
            _ => return self.parse_expr(),
        };

        let element = self.node_with_text(NodeKind::GroupingElement, start, text)?;
        self.expect(&TokenKind::LeftParen)?;
        loop {
            let set = if self.check(&TokenKind::LeftParen)
                && matches!(self.peek_kind(), TokenKind::RightParen)
            {
                // The empty grouping set `()`.
                let open = self.advance();
                self.advance();
                self.node(NodeKind::RowExpr, self.span_from(open))
            } else {
                self.parse_expr()?
            };
            self.append(element, set)?;
            if !self.eat(&TokenKind::Comma) {
                break;
            }
        }
        self.expect(&TokenKind::RightParen)?;
        self.finish(element)
    }

    fn peek_keyword_is(&self, keyword: Keyword) -> bool {
        self.cursor.peek().as_keyword() == Some(keyword)
    }

    fn check_peek_paren(&self) -> bool {
        matches!(self.peek_kind(), TokenKind::LeftParen)
    }

    /// `ORDER BY expr [ASC|DESC] [NULLS FIRST|LAST], ...`, or `None` when
    /// there is no ORDER BY.
    pub(super) fn parse_order_by(&mut self) -> Result<Option<NodeId>, ParseError> {
        if !self.check_keyword(Keyword::Order) {
            return Ok(None);
        }
        let start = self.advance();
        self.expect_keyword(Keyword::By)?;
        let clause = self.node(NodeKind::OrderByClause, start);
        self.with_context(ParseContext::OrderByClause, |p| loop {
            let expr = p.parse_expr()?;
            let item = p.wrap(NodeKind::OrderByItem, p.node_span(expr), &[expr])?;
            if p.eat_keyword(Keyword::Desc) {
                p.flag(item, NodeFlags::DESC)?;
            } else {
                p.eat_keyword(Keyword::Asc);
            }
            if p.eat_keyword(Keyword::Nulls) {
                if p.eat_keyword(Keyword::First) {
                    p.flag(item, NodeFlags::NULLS_FIRST)?;
                } else {
                    p.expect_keyword(Keyword::Last)?;
                    p.flag(item, NodeFlags::NULLS_LAST)?;
                }
            }
            p.finish(item)?;
            p.append(clause, item)?;
            if !p.eat(&TokenKind::Comma) {
                return Ok(());
            }
        })?;
        self.finish(clause).map(Some)
    }

    /// `LIMIT n [OFFSET m]`, `LIMIT m, n` or `OFFSET m` alone, appended to
    /// `parent`.
    pub(super) fn parse_limit(&mut self, parent: NodeId) -> Result<(), ParseError> {
        if self.check_keyword(Keyword::Limit) {
            let start = self.advance();
            let first = self.parse_expr()?;
            if self.eat(&TokenKind::Comma) {
                // MySQL form: LIMIT offset, count
                let count = self.parse_expr()?;
                let limit = self.wrap(NodeKind::LimitClause, start, &[count])?;
                self.append(parent, limit)?;
                let offset = self.wrap(NodeKind::OffsetClause, start, &[first])?;
                self.append(parent, offset)?;
                return Ok(());
            }
            let limit = self.wrap(NodeKind::LimitClause, start, &[first])?;
            self.append(parent, limit)?;
        }
        if self.check_keyword(Keyword::Offset) {
            let start = self.advance();
            let value = self.parse_expr()?;
            if !self.eat_keyword(Keyword::Rows) {
                self.eat_keyword(Keyword::Row);
            }
            let offset = self.wrap(NodeKind::OffsetClause, start, &[value])?;
            self.append(parent, offset)?;
        }
        Ok(())
    }

    /// `VALUES (expr, ...), ...`.
    pub(super) fn parse_values(&mut self) -> Result<NodeId, ParseError> {
        let start = self.expect_keyword(Keyword::Values)?;
        let values = self.node(NodeKind::ValuesStmt, start);
        loop {
            let row_start = self.expect(&TokenKind::LeftParen)?;
            let row = self.node(NodeKind::ValuesRow, row_start);
            if !self.check(&TokenKind::RightParen) {
                self.parse_expr_list_into(row)?;
            }
            self.expect(&TokenKind::RightParen)?;
            self.finish(row)?;
            self.append(values, row)?;
            if !self.eat(&TokenKind::Comma) {
                break;
            }
        }
        self.finish(values)
    }
}
