//! Pratt expression parsing.

use super::engine::Engine;
use super::error::{ParseError, ParseErrorKind};
use super::pratt::{
    infix_precedence, is_comparison, operator_text, INVALID_PRECEDENCE, PREC_COMPARISON,
    PREC_PREDICATE, PREC_UNARY,
};
use crate::ast::{NodeFlags, NodeId, NodeKind, ParseContext};
use crate::lexer::{Keyword, Span, TokenKind};

/// Type-name words that may follow the first word of a data type.
const TYPE_SUFFIX_WORDS: [&str; 4] = ["PRECISION", "VARYING", "UNSIGNED", "SIGNED"];

impl Engine<'_> {
    /// Parses a full expression.
    pub(super) fn parse_expr(&mut self) -> Result<NodeId, ParseError> {
        self.parse_expr_prec(0)
    }

    /// Parses `expr, expr, ...` and appends each expression to `parent`.
    pub(super) fn parse_expr_list_into(&mut self, parent: NodeId) -> Result<(), ParseError> {
        loop {
            let expr = self.parse_expr()?;
            self.append(parent, expr)?;
            if !self.eat(&TokenKind::Comma) {
                return Ok(());
            }
        }
    }

    /// Precedence climbing: parse a prefix term, then fold in every infix
    /// operator binding at least as tightly as `min_prec`.
    pub(super) fn parse_expr_prec(&mut self, min_prec: u8) -> Result<NodeId, ParseError> {
        let _guard = self.guard()?;
        let mut lhs = self.parse_prefix()?;

        loop {
            let Some(prec) = infix_precedence(self.current_kind(), self.peek_kind()) else {
                break;
            };
            if prec == INVALID_PRECEDENCE {
                if self.strict {
                    let token = self.current();
                    let err = ParseError::new(
                        ParseErrorKind::InvalidOperator,
                        format!("operator '{}' is not valid SQL", self.token_text(token)),
                        token.span,
                    );
                    return Err(err);
                }
                break;
            }
            if prec < min_prec {
                break;
            }
            lhs = self.parse_infix(lhs, prec)?;
        }

        Ok(lhs)
    }

    fn parse_infix(&mut self, lhs: NodeId, prec: u8) -> Result<NodeId, ParseError> {
        let _guard = self.guard()?;
        let start = self.node_span(lhs);
        match self.current_kind().clone() {
            TokenKind::DoubleColon => {
                self.advance();
                let data_type = self.parse_data_type()?;
                let cast = self.wrap(NodeKind::CastExpr, start, &[lhs, data_type])?;
                self.finish(cast)
            }
            TokenKind::Keyword(Keyword::Is) => self.parse_is(lhs, start),
            TokenKind::Keyword(Keyword::Not) => {
                self.advance();
                self.parse_predicate(lhs, start, true)
            }
            TokenKind::Keyword(Keyword::Between | Keyword::In | Keyword::Like) => {
                self.parse_predicate(lhs, start, false)
            }
            kind => {
                self.advance();
                let rhs = if is_comparison(&kind) && self.at_quantifier() {
                    self.parse_quantified()?
                } else {
                    self.parse_expr_prec(prec + 1)?
                };
                let text = operator_text(&kind);
                let binary = self.node_with_text(NodeKind::BinaryExpr, start, text)?;
                self.append(binary, lhs)?;
                self.append(binary, rhs)?;
                Ok(binary)
            }
        }
    }

    fn parse_is(&mut self, lhs: NodeId, start: Span) -> Result<NodeId, ParseError> {
        self.advance();
        let negated = self.eat_keyword(Keyword::Not);
        if self.eat_keyword(Keyword::Null) {
            let node = self.wrap(NodeKind::IsNullExpr, start, &[lhs])?;
            if negated {
                self.flag(node, NodeFlags::NOT)?;
            }
            return self.finish(node);
        }
        let distinct = self.eat_keyword(Keyword::Distinct);
        if distinct {
            self.expect_keyword(Keyword::From)?;
        }
        let text = match (negated, distinct) {
            (false, false) => "IS",
            (true, false) => "IS NOT",
            (false, true) => "IS DISTINCT FROM",
            (true, true) => "IS NOT DISTINCT FROM",
        };
        let rhs = self.parse_expr_prec(PREC_COMPARISON)?;
        let node = self.node_with_text(NodeKind::BinaryExpr, start, text)?;
        self.append(node, lhs)?;
        self.append(node, rhs)?;
        if negated {
            self.flag(node, NodeFlags::NOT)?;
        }
        Ok(node)
    }

    /// BETWEEN, IN and LIKE, with the `NOT` (if any) already consumed.
    fn parse_predicate(
        &mut self,
        lhs: NodeId,
        start: Span,
        negated: bool,
    ) -> Result<NodeId, ParseError> {
        let keyword = self.current().as_keyword();
        let (kind, name) = match keyword {
            Some(Keyword::Between) => (NodeKind::BetweenExpr, "BETWEEN"),
            Some(Keyword::In) => (NodeKind::InExpr, "IN"),
            Some(Keyword::Like) => (NodeKind::LikeExpr, "LIKE"),
            _ => return Err(self.unexpected("LIKE, IN or BETWEEN")),
        };
        self.advance();
        let text = if negated {
            format!("NOT {name}")
        } else {
            name.to_string()
        };
        let node = self.node_with_text(kind, start, &text)?;
        if negated {
            self.flag(node, NodeFlags::NOT)?;
        }
        self.append(node, lhs)?;

        match kind {
            NodeKind::BetweenExpr => {
                let low = self.parse_expr_prec(PREC_COMPARISON)?;
                self.append(node, low)?;
                self.expect_keyword(Keyword::And)?;
                let high = self.parse_expr_prec(PREC_COMPARISON)?;
                self.append(node, high)?;
            }
            NodeKind::InExpr => {
                self.expect(&TokenKind::LeftParen)?;
                if self.at_query_start() {
                    let query = self.parse_subquery_body()?;
                    self.append(node, query)?;
                } else if !self.check(&TokenKind::RightParen) {
                    self.parse_expr_list_into(node)?;
                }
                self.expect(&TokenKind::RightParen)?;
            }
            _ => {
                let pattern = self.parse_expr_prec(PREC_COMPARISON)?;
                self.append(node, pattern)?;
                if self.eat_word("ESCAPE") {
                    let escape = self.parse_expr_prec(PREC_COMPARISON)?;
                    self.append(node, escape)?;
                }
            }
        }
        self.finish(node)
    }

    fn at_quantifier(&self) -> bool {
        matches!(
            self.current_kind(),
            TokenKind::Keyword(Keyword::Any | Keyword::All | Keyword::Some)
        ) && matches!(self.peek_kind(), TokenKind::LeftParen)
    }

    /// `ANY (...)`, `ALL (...)` or `SOME (...)` on the right of a comparison.
    fn parse_quantified(&mut self) -> Result<NodeId, ParseError> {
        let _guard = self.guard()?;
        let token = self.current().clone();
        let start = self.advance();
        let text = self.token_text(&token).to_ascii_uppercase();
        let node = self.node_with_text(NodeKind::QuantifiedExpr, start, &text)?;
        self.expect(&TokenKind::LeftParen)?;
        if self.at_query_start() {
            let query = self.parse_subquery_body()?;
            self.append(node, query)?;
        } else {
            self.parse_expr_list_into(node)?;
        }
        self.expect(&TokenKind::RightParen)?;
        self.finish(node)
    }

    fn parse_prefix(&mut self) -> Result<NodeId, ParseError> {
        let _guard = self.guard()?;
        let start = self.current_span();
        match self.current_kind().clone() {
            TokenKind::Minus
                if matches!(self.peek_kind(), TokenKind::Integer(_) | TokenKind::Float(_)) =>
            {
                self.advance();
                let number = self.cursor.current().clone();
                let end = self.advance();
                let text = format!("-{}", self.token_text(&number));
                self.node_with_text(NodeKind::NumberLiteral, start.merge(end), &text)
            }
            kind @ (TokenKind::Minus | TokenKind::Plus | TokenKind::BitNot) => {
                self.advance();
                let operand = self.parse_expr_prec(PREC_UNARY)?;
                let unary = self.node_with_text(NodeKind::UnaryExpr, start, kind.symbol())?;
                self.append(unary, operand)?;
                Ok(unary)
            }
            TokenKind::Keyword(Keyword::Not) => {
                self.advance();
                if self.check_keyword(Keyword::Exists) {
                    let exists = self.parse_exists()?;
                    self.flag(exists, NodeFlags::NOT)?;
                    self.tree.extend_span(exists, start)?;
                    return Ok(exists);
                }
                let operand = self.parse_expr_prec(PREC_PREDICATE)?;
                let unary = self.node_with_text(NodeKind::UnaryExpr, start, "NOT")?;
                self.flag(unary, NodeFlags::NOT)?;
                self.append(unary, operand)?;
                Ok(unary)
            }
            TokenKind::Keyword(Keyword::Exists) => self.parse_exists(),
            _ => self.parse_primary(),
        }
    }

    fn parse_exists(&mut self) -> Result<NodeId, ParseError> {
        let start = self.expect_keyword(Keyword::Exists)?;
        let exists = self.node(NodeKind::ExistsExpr, start);
        let subquery = self.parse_parenthesized_subquery()?;
        self.append(exists, subquery)?;
        self.finish(exists)
    }

    /// `( query )` as a `Subquery` node.
    pub(super) fn parse_parenthesized_subquery(&mut self) -> Result<NodeId, ParseError> {
        let _guard = self.guard()?;
        let start = self.expect(&TokenKind::LeftParen)?;
        let subquery = self.node(NodeKind::Subquery, start);
        let body = self.parse_subquery_body()?;
        self.append(subquery, body)?;
        self.expect(&TokenKind::RightParen)?;
        self.finish(subquery)
    }

    fn parse_primary(&mut self) -> Result<NodeId, ParseError> {
        let _guard = self.guard()?;
        let token = self.current().clone();
        let start = token.span;

        match &token.kind {
            TokenKind::Integer(_) | TokenKind::Float(_) => {
                self.advance();
                self.node_with_text(NodeKind::NumberLiteral, start, self.token_text(&token))
            }
            TokenKind::String(value) => {
                self.advance();
                self.node_with_text(NodeKind::StringLiteral, start, value)
            }
            TokenKind::Blob(bytes) => {
                self.advance();
                let hex: String = bytes.iter().map(|b| format!("{b:02X}")).collect();
                self.node_with_text(NodeKind::BlobLiteral, start, &hex)
            }
            TokenKind::Keyword(Keyword::True | Keyword::False) => {
                self.advance();
                let text = self.token_text(&token).to_ascii_uppercase();
                self.node_with_text(NodeKind::BooleanLiteral, start, &text)
            }
            TokenKind::Keyword(Keyword::Null) => {
                self.advance();
                self.node_with_text(NodeKind::NullLiteral, start, "NULL")
            }
            TokenKind::Keyword(Keyword::Default) => {
                self.advance();
                self.node_with_text(NodeKind::DefaultValue, start, "DEFAULT")
            }

            // Parameter placeholders
            TokenKind::Question => {
                self.advance();
                self.node_with_text(NodeKind::Parameter, start, "?")
            }
            TokenKind::Colon | TokenKind::At => {
                self.advance();
                let (name, end) = self.expect_name("parameter name")?;
                self.node_with_text(NodeKind::Parameter, start.merge(end), &name)
            }

            TokenKind::Star => {
                self.advance();
                Ok(self.node(NodeKind::Star, start))
            }

            TokenKind::LeftParen => self.parse_parenthesized(),

            TokenKind::Keyword(Keyword::Case) => self.parse_case(),
            TokenKind::Keyword(Keyword::Cast) => self.parse_cast(),
            TokenKind::Keyword(Keyword::Extract) => self.parse_extract(),

            TokenKind::Error(message) => Err(ParseError::syntax(message.clone(), start)),

            _ if Self::is_name(&token) => self.parse_name_or_call(),

            // Reserved words that double as function names, e.g. LEFT(s, 3)
            TokenKind::Keyword(Keyword::Left | Keyword::Right)
                if matches!(self.peek_kind(), TokenKind::LeftParen) =>
            {
                self.advance();
                let name = self.token_text(&token).to_string();
                self.parse_function_call(&name, start)
            }

            _ => Err(self.unexpected("expression")),
        }
    }

    /// `( expr )`, a row value `( a, b )` or a subquery `( SELECT ... )`.
    fn parse_parenthesized(&mut self) -> Result<NodeId, ParseError> {
        let _guard = self.guard()?;
        if matches!(
            self.peek_kind(),
            TokenKind::Keyword(Keyword::Select | Keyword::With | Keyword::Values)
        ) {
            return self.parse_parenthesized_subquery();
        }

        let start = self.expect(&TokenKind::LeftParen)?;
        let first = self.parse_expr()?;
        if self.check(&TokenKind::Comma) {
            let row = self.node(NodeKind::RowExpr, start);
            self.append(row, first)?;
            while self.eat(&TokenKind::Comma) {
                let item = self.parse_expr()?;
                self.append(row, item)?;
            }
            self.expect(&TokenKind::RightParen)?;
            return self.finish(row);
        }
        self.expect(&TokenKind::RightParen)?;
        Ok(first)
    }

    /// A bare name, a qualified name (`t.c`, `s.t.c`, `t.*`) or a function
    /// call.
    fn parse_name_or_call(&mut self) -> Result<NodeId, ParseError> {
        let (first, start) = self.expect_name("name")?;

        if self.check(&TokenKind::LeftParen) {
            return self.parse_function_call(&first, start);
        }

        if !self.check(&TokenKind::Dot) {
            return self.bare_name(&first, start);
        }

        let mut parts = vec![first];
        while self.eat(&TokenKind::Dot) {
            if self.check(&TokenKind::Star) {
                let end = self.advance();
                let star = self.node(NodeKind::Star, start.merge(end));
                self.set_secondary(star, &parts.join("."))?;
                return Ok(star);
            }
            let (part, _) = self.expect_name("column name")?;
            parts.push(part);
        }

        let column = parts.pop().unwrap_or_default();
        let span = self.span_from(start);
        let node = self.node_with_text(NodeKind::ColumnRef, span, &column)?;
        self.set_secondary(node, &parts.join("."))?;
        self.tree.set_context_hint(node, self.contexts.current())?;
        Ok(node)
    }

    /// Parses `name(args) [OVER (...)]` with the name already consumed.
    fn parse_function_call(&mut self, name: &str, start: Span) -> Result<NodeId, ParseError> {
        let _guard = self.guard()?;
        let call = self.node_with_text(NodeKind::FunctionCall, start, name)?;
        self.expect(&TokenKind::LeftParen)?;
        self.with_context(ParseContext::FunctionArg, |p| {
            if p.check(&TokenKind::RightParen) {
                return Ok(());
            }
            if p.check(&TokenKind::Star) && matches!(p.peek_kind(), TokenKind::RightParen) {
                let span = p.advance();
                let star = p.node(NodeKind::Star, span);
                return p.append(call, star);
            }
            if p.eat_keyword(Keyword::Distinct) {
                p.flag(call, NodeFlags::DISTINCT)?;
            } else if p.eat_keyword(Keyword::All) {
                p.flag(call, NodeFlags::ALL)?;
            }
            p.parse_expr_list_into(call)
        })?;
        self.expect(&TokenKind::RightParen)?;

        if self.check_keyword(Keyword::Over) {
            let window = self.parse_over()?;
            self.append(call, window)?;
        }
        self.finish(call)
    }

    /// `OVER name` or `OVER ( [PARTITION BY ...] [ORDER BY ...] [frame] )`.
    fn parse_over(&mut self) -> Result<NodeId, ParseError> {
        let _guard = self.guard()?;
        let start = self.expect_keyword(Keyword::Over)?;
        let spec = self.node(NodeKind::WindowSpec, start);

        if self.at_name() {
            let (name, _) = self.expect_name("window name")?;
            self.tree.set_text(spec, &name)?;
            return self.finish(spec);
        }

        self.expect(&TokenKind::LeftParen)?;
        if self.check_keyword(Keyword::Partition) {
            let partition_start = self.advance();
            self.expect_keyword(Keyword::By)?;
            let partition = self.node(NodeKind::PartitionByClause, partition_start);
            self.parse_expr_list_into(partition)?;
            self.finish(partition)?;
            self.append(spec, partition)?;
        }
        if let Some(order_by) = self.parse_order_by()? {
            self.append(spec, order_by)?;
        }
        if self.check_keyword(Keyword::Rows) || self.check_keyword(Keyword::Range) {
            let frame = self.parse_window_frame()?;
            self.append(spec, frame)?;
        }
        self.expect(&TokenKind::RightParen)?;
        self.finish(spec)
    }

    fn parse_window_frame(&mut self) -> Result<NodeId, ParseError> {
        let token = self.current().clone();
        let start = self.advance();
        let unit = self.token_text(&token).to_ascii_uppercase();
        let frame = self.node_with_text(NodeKind::WindowFrame, start, &unit)?;
        if self.eat_keyword(Keyword::Between) {
            let low = self.parse_frame_bound()?;
            self.append(frame, low)?;
            self.expect_keyword(Keyword::And)?;
            let high = self.parse_frame_bound()?;
            self.append(frame, high)?;
        } else {
            let bound = self.parse_frame_bound()?;
            self.append(frame, bound)?;
        }
        self.finish(frame)
    }

    fn parse_frame_bound(&mut self) -> Result<NodeId, ParseError> {
        let start = self.current_span();
        if self.eat_keyword(Keyword::Unbounded) {
            let text = if self.eat_keyword(Keyword::Preceding) {
                "UNBOUNDED PRECEDING"
            } else {
                self.expect_keyword(Keyword::Following)?;
                "UNBOUNDED FOLLOWING"
            };
            return self.node_with_text(NodeKind::FrameBound, self.span_from(start), text);
        }
        if self.eat_keyword(Keyword::Current) {
            self.expect_keyword(Keyword::Row)?;
            let span = self.span_from(start);
            return self.node_with_text(NodeKind::FrameBound, span, "CURRENT ROW");
        }
        let offset = self.parse_expr_prec(PREC_UNARY)?;
        let text = if self.eat_keyword(Keyword::Preceding) {
            "PRECEDING"
        } else {
            self.expect_keyword(Keyword::Following)?;
            "FOLLOWING"
        };
        let bound = self.node_with_text(NodeKind::FrameBound, start, text)?;
        self.append(bound, offset)?;
        self.finish(bound)
    }

    /// `CASE [operand] WHEN .. THEN .. [ELSE ..] END`.
    fn parse_case(&mut self) -> Result<NodeId, ParseError> {
        let _guard = self.guard()?;
        let start = self.expect_keyword(Keyword::Case)?;
        let case = self.node(NodeKind::CaseExpr, start);

        self.with_context(ParseContext::CaseExpression, |p| {
            if !p.check_keyword(Keyword::When) {
                let operand = p.parse_expr()?;
                p.append(case, operand)?;
            }
            if !p.check_keyword(Keyword::When) {
                return Err(p.unexpected("WHEN"));
            }
            while p.check_keyword(Keyword::When) {
                let when_start = p.advance();
                let condition = p.parse_expr()?;
                p.expect_keyword(Keyword::Then)?;
                let result = p.parse_expr()?;
                let when = p.wrap(NodeKind::WhenClause, when_start, &[condition, result])?;
                p.append(case, when)?;
            }
            if p.check_keyword(Keyword::Else) {
                let else_start = p.advance();
                let result = p.parse_expr()?;
                let otherwise = p.wrap(NodeKind::ElseClause, else_start, &[result])?;
                p.append(case, otherwise)?;
            }
            p.expect_keyword(Keyword::End)?;
            Ok(())
        })?;
        self.finish(case)
    }

    /// `CAST(expr AS type)`.
    fn parse_cast(&mut self) -> Result<NodeId, ParseError> {
        let start = self.expect_keyword(Keyword::Cast)?;
        self.expect(&TokenKind::LeftParen)?;
        let expr = self.parse_expr()?;
        self.expect_keyword(Keyword::As)?;
        let data_type = self.parse_data_type()?;
        self.expect(&TokenKind::RightParen)?;
        let cast = self.wrap(NodeKind::CastExpr, start, &[expr, data_type])?;
        self.finish(cast)
    }

    /// `EXTRACT(field FROM expr)`.
    fn parse_extract(&mut self) -> Result<NodeId, ParseError> {
        let start = self.expect_keyword(Keyword::Extract)?;
        self.expect(&TokenKind::LeftParen)?;
        let field = match self.current_kind() {
            TokenKind::Identifier(name) => name.to_ascii_uppercase(),
            TokenKind::Keyword(kw) => kw.as_str().to_string(),
            _ => return Err(self.unexpected("date/time field")),
        };
        self.advance();
        self.expect_keyword(Keyword::From)?;
        let source = self.parse_expr()?;
        self.expect(&TokenKind::RightParen)?;
        let extract = self.node_with_text(NodeKind::ExtractExpr, start, &field)?;
        self.append(extract, source)?;
        self.finish(extract)
    }

    /// Parses a type name with optional `(length)` or `(precision, scale)`.
    /// The stored text is upper-cased, e.g. `VARCHAR(255)`.
    pub(super) fn parse_data_type(&mut self) -> Result<NodeId, ParseError> {
        let start = self.current_span();
        let mut name = match self.current_kind() {
            TokenKind::Identifier(name) => name.to_ascii_uppercase(),
            TokenKind::Keyword(kw) => kw.as_str().to_string(),
            _ => return Err(self.unexpected("data type")),
        };
        self.advance();
        while let TokenKind::Identifier(word) = self.current_kind() {
            let upper = word.to_ascii_uppercase();
            if !TYPE_SUFFIX_WORDS.contains(&upper.as_str()) {
                break;
            }
            self.advance();
            name.push(' ');
            name.push_str(&upper);
        }
        if self.eat(&TokenKind::LeftParen) {
            let mut args = Vec::new();
            loop {
                let token = self.current().clone();
                match token.kind {
                    TokenKind::Integer(_) | TokenKind::Identifier(_) => {
                        self.advance();
                        args.push(self.token_text(&token).to_string());
                    }
                    _ => return Err(self.unexpected("type length")),
                }
                if !self.eat(&TokenKind::Comma) {
                    break;
                }
            }
            self.expect(&TokenKind::RightParen)?;
            name = format!("{name}({})", args.join(","));
        }
        if self.check(&TokenKind::LeftBracket)
            && matches!(self.peek_kind(), TokenKind::RightBracket)
        {
            self.advance();
            self.advance();
            name.push_str("[]");
        }
        self.node_with_text(NodeKind::DataType, self.span_from(start), &name)
    }

    pub(super) fn node_span(&self, id: NodeId) -> Span {
        self.tree.get(id).map_or_else(|| self.current_span(), |n| n.span())
    }

    /// Returns true if the current token starts a query body.
    pub(super) fn at_query_start(&self) -> bool {
        matches!(
            self.current_kind(),
            TokenKind::Keyword(Keyword::Select | Keyword::With | Keyword::Values)
        )
    }
}

#[cfg(test)]
mod tests {
    use crate::ast::{Node, NodeFlags, NodeKind, ParseContext};
    use crate::parser::{ParseErrorKind, Parser, ParserConfig};

    /// Parses `SELECT <expr>` and returns the kinds/texts of the expression
    /// subtree in pre-order.
    fn shape(expr: &str) -> Vec<String> {
        let mut parser = Parser::new();
        let root = parser.parse(&format!("SELECT {expr}")).unwrap();
        let item = root
            .find_child(NodeKind::SelectList)
            .and_then(|list| list.first_child())
            .unwrap();
        item.descendants().map(|n| describe(&n)).collect()
    }

    fn describe(node: &Node<'_>) -> String {
        match node.text() {
            Some(text) => format!("{}({text})", node.kind()),
            None => node.kind().to_string(),
        }
    }

    #[test]
    fn test_multiplication_binds_tighter() {
        assert_eq!(
            shape("1 + 2 * 3"),
            [
                "BinaryExpr(+)",
                "NumberLiteral(1)",
                "BinaryExpr(*)",
                "NumberLiteral(2)",
                "NumberLiteral(3)"
            ]
        );
    }

    #[test]
    fn test_left_associative() {
        assert_eq!(
            shape("a - b - c"),
            [
                "BinaryExpr(-)",
                "BinaryExpr(-)",
                "ColumnRef(a)",
                "ColumnRef(b)",
                "ColumnRef(c)"
            ]
        );
    }

    #[test]
    fn test_and_binds_tighter_than_or() {
        let s = shape("a OR b AND c");
        assert_eq!(s[0], "BinaryExpr(OR)");
        assert_eq!(s[2], "BinaryExpr(AND)");
    }

    #[test]
    fn test_negative_literal_is_folded() {
        assert_eq!(shape("-5"), ["NumberLiteral(-5)"]);
        assert_eq!(shape("-x"), ["UnaryExpr(-)", "ColumnRef(x)"]);
    }

    #[test]
    fn test_not_folds_into_like() {
        let s = shape("name NOT LIKE 'a%'");
        assert_eq!(s, ["LikeExpr(NOT LIKE)", "ColumnRef(name)", "StringLiteral(a%)"]);
    }

    #[test]
    fn test_between_requires_and() {
        assert_eq!(
            shape("x BETWEEN 1 AND 10"),
            [
                "BetweenExpr(BETWEEN)",
                "ColumnRef(x)",
                "NumberLiteral(1)",
                "NumberLiteral(10)"
            ]
        );
        let mut parser = Parser::new();
        let err = parser.parse("SELECT x BETWEEN 1 OR 10").unwrap_err();
        assert_eq!(err.kind, ParseErrorKind::Syntax);
    }

    #[test]
    fn test_between_and_inside_conjunction() {
        let s = shape("x BETWEEN 1 AND 2 AND y = 3");
        assert_eq!(s[0], "BinaryExpr(AND)");
        assert_eq!(s[1], "BetweenExpr(BETWEEN)");
    }

    #[test]
    fn test_in_list_and_is_null() {
        assert_eq!(
            shape("x IN (1, 2)"),
            ["InExpr(IN)", "ColumnRef(x)", "NumberLiteral(1)", "NumberLiteral(2)"]
        );
        let mut parser = Parser::new();
        let root = parser.parse("SELECT x IS NOT NULL").unwrap();
        let is_null = root.descendants().find(|n| n.kind() == NodeKind::IsNullExpr).unwrap();
        assert!(is_null.has_flag(NodeFlags::NOT));
    }

    #[test]
    fn test_quantified_comparison() {
        let s = shape("x > ALL (SELECT y FROM t)");
        assert_eq!(s[0], "BinaryExpr(>)");
        assert_eq!(s[2], "QuantifiedExpr(ALL)");
    }

    #[test]
    fn test_concat_and_bitwise_tiers() {
        // `||` sits at the predicate tier, below `=`.
        let s = shape("a || b = c");
        assert_eq!(s[0], "BinaryExpr(||)");
        // `|` shares the AND tier, below `+`.
        let s = shape("a | b + c");
        assert_eq!(s[0], "BinaryExpr(|)");
    }

    #[test]
    fn test_postgres_cast() {
        assert_eq!(
            shape("x::varchar(10)"),
            ["CastExpr", "ColumnRef(x)", "DataType(VARCHAR(10))"]
        );
    }

    #[test]
    fn test_case_names_are_identifiers() {
        let mut parser = Parser::new();
        let root = parser
            .parse("SELECT CASE WHEN a > 1 THEN b ELSE c END FROM t")
            .unwrap();
        let names: Vec<_> = root
            .descendants()
            .filter(|n| n.kind() == NodeKind::Identifier)
            .map(|n| n.context_hint())
            .collect();
        assert_eq!(names.len(), 3);
        assert!(names.iter().all(|c| *c == ParseContext::CaseExpression));
    }

    #[test]
    fn test_function_args_and_window() {
        let mut parser = Parser::new();
        let root = parser
            .parse(
                "SELECT count(DISTINCT id), row_number() OVER (PARTITION BY a ORDER BY b DESC) \
                 FROM t",
            )
            .unwrap();
        let calls: Vec<_> = root
            .descendants()
            .filter(|n| n.kind() == NodeKind::FunctionCall)
            .collect();
        assert_eq!(calls.len(), 2);
        assert!(calls[0].has_flag(NodeFlags::DISTINCT));
        let arg = calls[0].first_child().unwrap();
        assert_eq!(arg.kind(), NodeKind::Identifier);
        assert_eq!(arg.context_hint(), ParseContext::FunctionArg);
        let window = calls[1].find_child(NodeKind::WindowSpec).unwrap();
        assert!(window.find_child(NodeKind::PartitionByClause).is_some());
        assert!(window.find_child(NodeKind::OrderByClause).is_some());
    }

    #[test]
    fn test_foreign_operator_strict_and_permissive() {
        let mut strict = Parser::new();
        let err = strict.parse("SELECT a FROM t WHERE a == 1").unwrap_err();
        assert_eq!(err.kind, ParseErrorKind::InvalidOperator);

        let mut permissive = Parser::with_config(ParserConfig::default().with_strict(false));
        // The expression stops at `==`, leaving trailing tokens.
        let err = permissive.parse("SELECT a FROM t WHERE a == 1").unwrap_err();
        assert_eq!(err.kind, ParseErrorKind::Syntax);
    }

    #[test]
    fn test_parameters_and_literals() {
        assert_eq!(shape("?"), ["Parameter(?)"]);
        assert_eq!(shape(":id"), ["Parameter(id)"]);
        assert_eq!(shape("X'0aff'"), ["BlobLiteral(0AFF)"]);
        assert_eq!(shape("NULL"), ["NullLiteral(NULL)"]);
        assert_eq!(shape("true"), ["BooleanLiteral(TRUE)"]);
    }

    #[test]
    fn test_row_value_and_exists() {
        assert_eq!(
            shape("(1, 2)"),
            ["RowExpr", "NumberLiteral(1)", "NumberLiteral(2)"]
        );
        let s = shape("NOT EXISTS (SELECT 1 FROM t)");
        assert_eq!(s[0], "ExistsExpr");
        assert_eq!(s[1], "Subquery");
    }
}
