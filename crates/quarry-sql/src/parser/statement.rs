//! Statement dispatch, transaction control, EXPLAIN, SET and utility
//! commands.

use tracing::trace;

use super::engine::Engine;
use super::error::ParseError;
use crate::ast::{NodeId, NodeKind};
use crate::lexer::{Keyword, TokenKind};

/// Commands parsed as `UtilityStmt`.
const UTILITY_COMMANDS: [&str; 6] = ["PRAGMA", "VACUUM", "ANALYZE", "SHOW", "USE", "REINDEX"];

impl Engine<'_> {
    /// Parses one statement, routing on its leading token.
    pub(crate) fn parse_statement(&mut self) -> Result<NodeId, ParseError> {
        let _guard = self.guard()?;
        trace!(token = %self.current_kind().describe(), "Dispatching statement");
        match self.current_kind() {
            TokenKind::Keyword(Keyword::Select | Keyword::Values) | TokenKind::LeftParen => {
                self.parse_set_expr()
            }
            TokenKind::Keyword(Keyword::With) => self.parse_with(true),
            TokenKind::Keyword(Keyword::Insert | Keyword::Replace) => self.parse_insert(),
            TokenKind::Keyword(Keyword::Update) => self.parse_update(),
            TokenKind::Keyword(Keyword::Delete) => self.parse_delete(),
            TokenKind::Keyword(Keyword::Create) => self.parse_create(),
            TokenKind::Keyword(Keyword::Alter) => self.parse_alter(),
            TokenKind::Keyword(Keyword::Drop) => self.parse_drop(),
            TokenKind::Keyword(
                Keyword::Begin | Keyword::Commit | Keyword::End | Keyword::Rollback,
            ) => self.parse_transaction(),
            TokenKind::Keyword(Keyword::Set) => self.parse_set_statement(),
            TokenKind::Identifier(word) => {
                let word = word.to_ascii_uppercase();
                match word.as_str() {
                    "TRUNCATE" => self.parse_truncate(),
                    "EXPLAIN" => self.parse_explain(),
                    "START" | "SAVEPOINT" | "RELEASE" => self.parse_transaction(),
                    w if UTILITY_COMMANDS.contains(&w) => self.parse_utility(),
                    _ => Err(self.unexpected("statement")),
                }
            }
            _ => Err(self.unexpected("statement")),
        }
    }

    /// Returns true if the current token can begin a statement.
    pub(crate) fn at_statement_start(&self) -> bool {
        match self.current_kind() {
            TokenKind::Keyword(kw) => matches!(
                kw,
                Keyword::Select
                    | Keyword::Values
                    | Keyword::With
                    | Keyword::Insert
                    | Keyword::Update
                    | Keyword::Delete
                    | Keyword::Create
                    | Keyword::Alter
                    | Keyword::Drop
                    | Keyword::Begin
                    | Keyword::Commit
                    | Keyword::Rollback
            ),
            TokenKind::Identifier(word) => ["TRUNCATE", "EXPLAIN", "SAVEPOINT", "RELEASE", "START"]
                .iter()
                .chain(UTILITY_COMMANDS.iter())
                .any(|w| word.eq_ignore_ascii_case(w)),
            _ => false,
        }
    }

    /// Skips to the next statement boundary after an error: past the next
    /// `;`, or up to a token that starts a statement. Always consumes at
    /// least one token unless input is exhausted.
    pub(crate) fn synchronize(&mut self) {
        if self.cursor.at_end() {
            return;
        }
        if self.eat(&TokenKind::Semicolon) {
            return;
        }
        self.advance();
        while !self.cursor.at_end() {
            if self.eat(&TokenKind::Semicolon) || self.at_statement_start() {
                return;
            }
            self.advance();
        }
    }

    /// `BEGIN`, `START TRANSACTION`, `COMMIT`/`END`, `ROLLBACK [TO
    /// [SAVEPOINT] x]`, `SAVEPOINT x` and `RELEASE [SAVEPOINT] x`.
    fn parse_transaction(&mut self) -> Result<NodeId, ParseError> {
        let start = self.advance();
        let leading = self.cursor.previous().clone();
        let (text, savepoint) = match &leading.kind {
            TokenKind::Keyword(Keyword::Begin) => {
                for mode in ["DEFERRED", "IMMEDIATE", "EXCLUSIVE"] {
                    if self.eat_word(mode) {
                        break;
                    }
                }
                self.eat_transaction_word();
                ("BEGIN", None)
            }
            TokenKind::Keyword(Keyword::Commit | Keyword::End) => {
                self.eat_transaction_word();
                ("COMMIT", None)
            }
            TokenKind::Keyword(Keyword::Rollback) => {
                self.eat_transaction_word();
                let savepoint = if self.eat_keyword(Keyword::To) {
                    self.eat_word("SAVEPOINT");
                    Some(self.expect_name("savepoint name")?.0)
                } else {
                    None
                };
                ("ROLLBACK", savepoint)
            }
            TokenKind::Identifier(word) if word.eq_ignore_ascii_case("START") => {
                self.expect_keyword(Keyword::Transaction)?;
                ("BEGIN", None)
            }
            TokenKind::Identifier(word) if word.eq_ignore_ascii_case("SAVEPOINT") => {
                ("SAVEPOINT", Some(self.expect_name("savepoint name")?.0))
            }
            _ => {
                self.eat_word("SAVEPOINT");
                ("RELEASE", Some(self.expect_name("savepoint name")?.0))
            }
        };
        let stmt = self.node_with_text(NodeKind::TransactionStmt, start, text)?;
        if let Some(savepoint) = savepoint {
            self.set_secondary(stmt, &savepoint)?;
        }
        self.finish(stmt)
    }

    fn eat_transaction_word(&mut self) {
        if !self.eat_keyword(Keyword::Transaction) {
            self.eat_word("WORK");
        }
    }

    /// `EXPLAIN [QUERY PLAN | ANALYZE] statement`.
    fn parse_explain(&mut self) -> Result<NodeId, ParseError> {
        let _guard = self.guard()?;
        let start = self.expect_word("EXPLAIN")?;
        let text = if self.eat_word("QUERY") {
            self.expect_word("PLAN")?;
            "EXPLAIN QUERY PLAN"
        } else if self.eat_word("ANALYZE") {
            "EXPLAIN ANALYZE"
        } else {
            "EXPLAIN"
        };
        let stmt = self.node_with_text(NodeKind::ExplainStmt, start, text)?;
        let inner = self.parse_statement()?;
        self.append(stmt, inner)?;
        self.finish(stmt)
    }

    /// `SET [SESSION | LOCAL] name {= | TO} value, ...`.
    fn parse_set_statement(&mut self) -> Result<NodeId, ParseError> {
        let start = self.expect_keyword(Keyword::Set)?;
        if !self.eat_word("SESSION") {
            self.eat_word("LOCAL");
        }
        let name = self.expect_dotted_name("variable name")?;
        let stmt = self.node_with_text(NodeKind::SetStmt, start, &name)?;
        if !self.eat(&TokenKind::Eq) {
            self.expect_keyword(Keyword::To)?;
        }
        self.parse_expr_list_into(stmt)?;
        self.finish(stmt)
    }

    /// `PRAGMA`, `VACUUM`, `ANALYZE`, `SHOW`, `USE` and `REINDEX`. The
    /// optional target name is kept in `secondary`; a PRAGMA argument
    /// (`= value` or `(value)`) becomes the only child.
    fn parse_utility(&mut self) -> Result<NodeId, ParseError> {
        let token = self.current().clone();
        let command = self.token_text(&token).to_ascii_uppercase();
        let start = self.advance();
        let stmt = self.node_with_text(NodeKind::UtilityStmt, start, &command)?;

        if command == "SHOW" && self.eat_keyword(Keyword::All) {
            self.set_secondary(stmt, "ALL")?;
        } else if self.at_name() {
            let target = self.expect_dotted_name("name")?;
            self.set_secondary(stmt, &target)?;
        } else if command == "USE" {
            return Err(self.unexpected("database name"));
        }

        if command == "PRAGMA" {
            if self.eat(&TokenKind::Eq) {
                let value = self.parse_expr()?;
                self.append(stmt, value)?;
            } else if self.eat(&TokenKind::LeftParen) {
                let value = self.parse_expr()?;
                self.expect(&TokenKind::RightParen)?;
                self.append(stmt, value)?;
            }
        }
        self.finish(stmt)
    }

    /// A possibly qualified name joined back with dots.
    fn expect_dotted_name(&mut self, what: &str) -> Result<String, ParseError> {
        let (mut name, _) = self.expect_name(what)?;
        while self.check(&TokenKind::Dot) {
            self.advance();
            let (part, _) = self.expect_name(what)?;
            name.push('.');
            name.push_str(&part);
        }
        Ok(name)
    }
}
