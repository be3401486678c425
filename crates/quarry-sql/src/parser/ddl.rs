//! CREATE, ALTER, DROP and TRUNCATE.

use super::engine::Engine;
use super::error::ParseError;
use super::pratt::PREC_UNARY;
use crate::ast::{NodeFlags, NodeId, NodeKind};
use crate::lexer::{Keyword, Span, TokenKind};

impl Engine<'_> {
    /// `CREATE [OR REPLACE] [TEMP | TEMPORARY] [UNIQUE] {TABLE | INDEX | VIEW |
    /// TRIGGER | SCHEMA} ...`.
    pub(super) fn parse_create(&mut self) -> Result<NodeId, ParseError> {
        let start = self.expect_keyword(Keyword::Create)?;
        let mut flags = NodeFlags::NONE;
        if self.eat_keyword(Keyword::Or) {
            self.expect_keyword(Keyword::Replace)?;
            flags.insert(NodeFlags::OR_REPLACE);
        }
        if self.eat_keyword(Keyword::Temp) || self.eat_keyword(Keyword::Temporary) {
            flags.insert(NodeFlags::TEMPORARY);
        }
        if self.eat_keyword(Keyword::Unique) {
            flags.insert(NodeFlags::UNIQUE);
        }

        let stmt = match self.current().as_keyword() {
            Some(Keyword::Table) => self.parse_create_table(start)?,
            Some(Keyword::Index) => self.parse_create_index(start)?,
            Some(Keyword::View) => self.parse_create_view(start)?,
            Some(Keyword::Trigger) => self.parse_create_trigger(start)?,
            Some(Keyword::Schema | Keyword::Database) => self.parse_create_schema(start)?,
            _ => return Err(self.unexpected("TABLE, INDEX, VIEW, TRIGGER or SCHEMA")),
        };
        self.flag(stmt, flags)?;
        self.finish(stmt)
    }

    /// Allocates a statement node named by `[schema.]name`, applying
    /// `IF NOT EXISTS` if it was present.
    fn named_statement(
        &mut self,
        kind: NodeKind,
        start: Span,
        if_not_exists: bool,
    ) -> Result<NodeId, ParseError> {
        let (schema, name, _) = self.expect_qualified_name("name")?;
        let stmt = self.node_with_text(kind, start, &name)?;
        if let Some(schema) = schema {
            self.set_secondary(stmt, &schema)?;
        }
        if if_not_exists {
            self.flag(stmt, NodeFlags::IF_NOT_EXISTS)?;
        }
        Ok(stmt)
    }

    fn parse_create_table(&mut self, start: Span) -> Result<NodeId, ParseError> {
        self.expect_keyword(Keyword::Table)?;
        let if_not_exists = self.parse_if_not_exists()?;
        let stmt = self.named_statement(NodeKind::CreateTableStmt, start, if_not_exists)?;

        if self.eat_keyword(Keyword::As) {
            let query = self.parse_query()?;
            self.append(stmt, query)?;
            return Ok(stmt);
        }

        self.expect(&TokenKind::LeftParen)?;
        loop {
            let element = if self.at_table_constraint() {
                self.parse_table_constraint()?
            } else {
                self.parse_column_def()?
            };
            self.append(stmt, element)?;
            if !self.eat(&TokenKind::Comma) {
                break;
            }
        }
        self.expect(&TokenKind::RightParen)?;

        // Table options
        if self.eat_word("WITHOUT") {
            self.expect_word("ROWID")?;
        }
        self.eat_word("STRICT");
        Ok(stmt)
    }

    /// `name [type] [constraint ...]`.
    fn parse_column_def(&mut self) -> Result<NodeId, ParseError> {
        let (name, start) = self.expect_name("column name")?;
        let column = self.node_with_text(NodeKind::ColumnDef, start, &name)?;
        if self.at_name() {
            let data_type = self.parse_data_type()?;
            self.append(column, data_type)?;
        }
        while let Some(constraint) = self.parse_column_constraint()? {
            self.append(column, constraint)?;
        }
        self.finish(column)
    }

    fn parse_column_constraint(&mut self) -> Result<Option<NodeId>, ParseError> {
        let start = self.current_span();
        let name = if self.eat_keyword(Keyword::Constraint) {
            Some(self.expect_name("constraint name")?.0)
        } else {
            None
        };

        let constraint = match self.current().as_keyword() {
            Some(Keyword::Primary) => {
                self.advance();
                self.expect_keyword(Keyword::Key)?;
                let node = self.constraint(start, "PRIMARY KEY")?;
                if self.eat_keyword(Keyword::Desc) {
                    self.flag(node, NodeFlags::DESC)?;
                } else {
                    self.eat_keyword(Keyword::Asc);
                }
                node
            }
            Some(Keyword::Not) => {
                self.advance();
                self.expect_keyword(Keyword::Null)?;
                self.constraint(start, "NOT NULL")?
            }
            Some(Keyword::Null) => {
                self.advance();
                self.constraint(start, "NULL")?
            }
            Some(Keyword::Unique) => {
                self.advance();
                self.constraint(start, "UNIQUE")?
            }
            Some(Keyword::Autoincrement) => {
                self.advance();
                self.constraint(start, "AUTOINCREMENT")?
            }
            Some(Keyword::Default) => {
                self.advance();
                let node = self.constraint(start, "DEFAULT")?;
                let value = if self.check(&TokenKind::LeftParen) {
                    self.expect(&TokenKind::LeftParen)?;
                    let value = self.parse_expr()?;
                    self.expect(&TokenKind::RightParen)?;
                    value
                } else {
                    self.parse_expr_prec(PREC_UNARY)?
                };
                self.append(node, value)?;
                node
            }
            Some(Keyword::Check) => {
                self.advance();
                let node = self.constraint(start, "CHECK")?;
                self.expect(&TokenKind::LeftParen)?;
                let condition = self.parse_expr()?;
                self.expect(&TokenKind::RightParen)?;
                self.append(node, condition)?;
                node
            }
            Some(Keyword::References) => {
                let node = self.constraint(start, "REFERENCES")?;
                self.parse_references(node)?;
                node
            }
            Some(Keyword::Collate) => {
                self.advance();
                let node = self.constraint(start, "COLLATE")?;
                let (collation, span) = self.expect_name("collation name")?;
                let collation = self.identifier(&collation, span)?;
                self.append(node, collation)?;
                node
            }
            _ if name.is_some() => return Err(self.unexpected("constraint")),
            _ => return Ok(None),
        };

        if let Some(name) = name {
            self.set_secondary(constraint, &name)?;
        }
        self.finish(constraint).map(Some)
    }

    fn constraint(&mut self, start: Span, text: &str) -> Result<NodeId, ParseError> {
        self.node_with_text(NodeKind::ColumnConstraint, start, text)
    }

    fn at_table_constraint(&self) -> bool {
        match self.current().as_keyword() {
            Some(Keyword::Constraint | Keyword::Check | Keyword::Foreign) => true,
            // `PRIMARY KEY (` / `UNIQUE (` at element level
            Some(Keyword::Primary | Keyword::Unique) => true,
            _ => false,
        }
    }

    /// `[CONSTRAINT name] {PRIMARY KEY (cols) | UNIQUE (cols) | CHECK (expr) |
    /// FOREIGN KEY (cols) REFERENCES ...}`.
    fn parse_table_constraint(&mut self) -> Result<NodeId, ParseError> {
        let start = self.current_span();
        let name = if self.eat_keyword(Keyword::Constraint) {
            Some(self.expect_name("constraint name")?.0)
        } else {
            None
        };

        let constraint = match self.current().as_keyword() {
            Some(Keyword::Primary) => {
                self.advance();
                self.expect_keyword(Keyword::Key)?;
                let node = self.node_with_text(NodeKind::TableConstraint, start, "PRIMARY KEY")?;
                let columns = self.parse_column_list()?;
                self.append(node, columns)?;
                node
            }
            Some(Keyword::Unique) => {
                self.advance();
                let node = self.node_with_text(NodeKind::TableConstraint, start, "UNIQUE")?;
                let columns = self.parse_column_list()?;
                self.append(node, columns)?;
                node
            }
            Some(Keyword::Check) => {
                self.advance();
                let node = self.node_with_text(NodeKind::TableConstraint, start, "CHECK")?;
                self.expect(&TokenKind::LeftParen)?;
                let condition = self.parse_expr()?;
                self.expect(&TokenKind::RightParen)?;
                self.append(node, condition)?;
                node
            }
            Some(Keyword::Foreign) => {
                self.advance();
                self.expect_keyword(Keyword::Key)?;
                let node = self.node_with_text(NodeKind::TableConstraint, start, "FOREIGN KEY")?;
                let columns = self.parse_column_list()?;
                self.append(node, columns)?;
                self.parse_references(node)?;
                node
            }
            _ => return Err(self.unexpected("PRIMARY KEY, UNIQUE, CHECK or FOREIGN KEY")),
        };

        if let Some(name) = name {
            self.set_secondary(constraint, &name)?;
        }
        self.finish(constraint)
    }

    /// `REFERENCES table [(cols)] [ON {DELETE | UPDATE} action ...]`, appended
    /// to `parent`.
    fn parse_references(&mut self, parent: NodeId) -> Result<(), ParseError> {
        self.expect_keyword(Keyword::References)?;
        let (schema, name, span) = self.expect_qualified_name("table name")?;
        let table = self.table_ref(schema.as_deref(), &name, span)?;
        self.append(parent, table)?;
        if self.check(&TokenKind::LeftParen) {
            let columns = self.parse_column_list()?;
            self.append(parent, columns)?;
        }

        while self.check_keyword(Keyword::On) {
            let start = self.advance();
            let event = if self.eat_keyword(Keyword::Delete) {
                "DELETE"
            } else {
                self.expect_keyword(Keyword::Update)?;
                "UPDATE"
            };
            let action = if self.eat_keyword(Keyword::Cascade) {
                "CASCADE"
            } else if self.eat_keyword(Keyword::Restrict) {
                "RESTRICT"
            } else if self.eat_keyword(Keyword::Set) {
                if self.eat_keyword(Keyword::Null) {
                    "SET NULL"
                } else {
                    self.expect_keyword(Keyword::Default)?;
                    "SET DEFAULT"
                }
            } else {
                self.expect_word("NO")?;
                self.expect_word("ACTION")?;
                "NO ACTION"
            };
            let text = format!("ON {event} {action}");
            let span = self.span_from(start);
            let node = self.node_with_text(NodeKind::ReferentialAction, span, &text)?;
            self.append(parent, node)?;
        }
        Ok(())
    }

    /// `INDEX [IF NOT EXISTS] name ON table (col [ASC|DESC], ...) [WHERE ...]`.
    fn parse_create_index(&mut self, start: Span) -> Result<NodeId, ParseError> {
        self.expect_keyword(Keyword::Index)?;
        let if_not_exists = self.parse_if_not_exists()?;
        let stmt = self.named_statement(NodeKind::CreateIndexStmt, start, if_not_exists)?;

        self.expect_keyword(Keyword::On)?;
        let (schema, name, span) = self.expect_qualified_name("table name")?;
        let table = self.table_ref(schema.as_deref(), &name, span)?;
        self.append(stmt, table)?;

        self.expect(&TokenKind::LeftParen)?;
        loop {
            let column = self.parse_indexed_column()?;
            self.append(stmt, column)?;
            if !self.eat(&TokenKind::Comma) {
                break;
            }
        }
        self.expect(&TokenKind::RightParen)?;

        if let Some(filter) = self.parse_where()? {
            self.append(stmt, filter)?;
        }
        Ok(stmt)
    }

    /// An index key: a column name or expression, optional COLLATE and
    /// direction. Plain column names are also stored as the node text.
    fn parse_indexed_column(&mut self) -> Result<NodeId, ParseError> {
        let start = self.current_span();
        let plain_name = Self::is_name(self.current())
            && matches!(
                self.peek_kind(),
                TokenKind::Comma
                    | TokenKind::RightParen
                    | TokenKind::Keyword(Keyword::Asc | Keyword::Desc | Keyword::Collate)
            );
        let column = if plain_name {
            let (name, span) = self.expect_name("column name")?;
            let column = self.node_with_text(NodeKind::IndexedColumn, start, &name)?;
            let reference = self.identifier(&name, span)?;
            self.append(column, reference)?;
            column
        } else {
            let expr = self.parse_expr()?;
            self.wrap(NodeKind::IndexedColumn, start, &[expr])?
        };
        if self.eat_keyword(Keyword::Collate) {
            let (collation, span) = self.expect_name("collation name")?;
            let collation = self.identifier(&collation, span)?;
            self.append(column, collation)?;
        }
        if self.eat_keyword(Keyword::Desc) {
            self.flag(column, NodeFlags::DESC)?;
        } else {
            self.eat_keyword(Keyword::Asc);
        }
        self.finish(column)
    }

    /// `VIEW [IF NOT EXISTS] name [(cols)] AS query`.
    fn parse_create_view(&mut self, start: Span) -> Result<NodeId, ParseError> {
        self.expect_keyword(Keyword::View)?;
        let if_not_exists = self.parse_if_not_exists()?;
        let stmt = self.named_statement(NodeKind::CreateViewStmt, start, if_not_exists)?;
        if self.check(&TokenKind::LeftParen) {
            let columns = self.parse_column_list()?;
            self.append(stmt, columns)?;
        }
        self.expect_keyword(Keyword::As)?;
        let query = self.parse_query()?;
        self.append(stmt, query)?;
        Ok(stmt)
    }

    /// `TRIGGER [IF NOT EXISTS] name [BEFORE | AFTER | INSTEAD OF]
    /// {DELETE | INSERT | UPDATE [OF cols]} ON table [FOR EACH ROW]
    /// [WHEN expr] BEGIN stmt; ... END`.
    fn parse_create_trigger(&mut self, start: Span) -> Result<NodeId, ParseError> {
        self.expect_keyword(Keyword::Trigger)?;
        let if_not_exists = self.parse_if_not_exists()?;
        let stmt = self.named_statement(NodeKind::CreateTriggerStmt, start, if_not_exists)?;

        let timing = match self.current().as_keyword() {
            Some(Keyword::Before) => {
                self.advance();
                Some("BEFORE")
            }
            Some(Keyword::After) => {
                self.advance();
                Some("AFTER")
            }
            Some(Keyword::Instead) => {
                self.advance();
                self.expect_keyword(Keyword::Of)?;
                Some("INSTEAD OF")
            }
            _ => None,
        };
        let event = match self.current().as_keyword() {
            Some(Keyword::Insert) => "INSERT",
            Some(Keyword::Delete) => "DELETE",
            Some(Keyword::Update) => "UPDATE",
            _ => return Err(self.unexpected("INSERT, UPDATE or DELETE")),
        };
        self.advance();
        let description = match timing {
            Some(timing) => format!("{timing} {event}"),
            None => event.to_string(),
        };
        self.set_secondary(stmt, &description)?;

        if event == "UPDATE" && self.eat_keyword(Keyword::Of) {
            let columns = self.node(NodeKind::ColumnList, self.current_span());
            loop {
                let (name, span) = self.expect_name("column name")?;
                let column = self.identifier(&name, span)?;
                self.append(columns, column)?;
                if !self.eat(&TokenKind::Comma) {
                    break;
                }
            }
            self.append(stmt, columns)?;
        }

        self.expect_keyword(Keyword::On)?;
        let (schema, name, span) = self.expect_qualified_name("table name")?;
        let table = self.table_ref(schema.as_deref(), &name, span)?;
        self.append(stmt, table)?;

        if self.eat_keyword(Keyword::For) {
            self.expect_keyword(Keyword::Each)?;
            self.expect_keyword(Keyword::Row)?;
        }
        if self.check_keyword(Keyword::When) {
            let when_start = self.advance();
            let condition = self.parse_expr()?;
            let when = self.wrap(NodeKind::WhenClause, when_start, &[condition])?;
            self.append(stmt, when)?;
        }

        let body_start = self.expect_keyword(Keyword::Begin)?;
        let body = self.node(NodeKind::TriggerBody, body_start);
        loop {
            let statement = self.parse_trigger_statement()?;
            self.append(body, statement)?;
            self.expect(&TokenKind::Semicolon)?;
            if self.check_keyword(Keyword::End) {
                break;
            }
        }
        self.expect_keyword(Keyword::End)?;
        self.finish(body)?;
        self.append(stmt, body)?;
        Ok(stmt)
    }

    fn parse_trigger_statement(&mut self) -> Result<NodeId, ParseError> {
        match self.current().as_keyword() {
            Some(Keyword::Insert | Keyword::Replace) => self.parse_insert(),
            Some(Keyword::Update) => self.parse_update(),
            Some(Keyword::Delete) => self.parse_delete(),
            Some(Keyword::With) => self.parse_with(true),
            Some(Keyword::Select | Keyword::Values) => self.parse_set_expr(),
            _ => Err(self.unexpected("INSERT, UPDATE, DELETE or SELECT")),
        }
    }

    /// `SCHEMA [IF NOT EXISTS] name [AUTHORIZATION user]`, also
    /// `DATABASE name`.
    fn parse_create_schema(&mut self, start: Span) -> Result<NodeId, ParseError> {
        self.advance();
        let if_not_exists = self.parse_if_not_exists()?;
        let (name, _) = self.expect_name("schema name")?;
        let stmt = self.node_with_text(NodeKind::CreateSchemaStmt, start, &name)?;
        if if_not_exists {
            self.flag(stmt, NodeFlags::IF_NOT_EXISTS)?;
        }
        if self.eat_word("AUTHORIZATION") {
            let (owner, _) = self.expect_name("role name")?;
            self.set_secondary(stmt, &owner)?;
        }
        Ok(stmt)
    }

    /// `ALTER TABLE [IF EXISTS] name action, ...`.
    pub(super) fn parse_alter(&mut self) -> Result<NodeId, ParseError> {
        let start = self.expect_keyword(Keyword::Alter)?;
        self.expect_keyword(Keyword::Table)?;
        let if_exists = self.parse_if_exists()?;
        let stmt = self.named_statement(NodeKind::AlterTableStmt, start, false)?;
        if if_exists {
            self.flag(stmt, NodeFlags::IF_EXISTS)?;
        }
        loop {
            let action = self.parse_alter_action()?;
            self.append(stmt, action)?;
            if !self.eat(&TokenKind::Comma) {
                break;
            }
        }
        self.finish(stmt)
    }

    fn parse_alter_action(&mut self) -> Result<NodeId, ParseError> {
        let start = self.current_span();
        match self.current().as_keyword() {
            Some(Keyword::Add) => {
                self.advance();
                if self.at_table_constraint() {
                    let constraint = self.parse_table_constraint()?;
                    let action = self.alter_action(start, "ADD CONSTRAINT")?;
                    self.append(action, constraint)?;
                    return self.finish(action);
                }
                self.eat_keyword(Keyword::Column);
                let if_not_exists = self.parse_if_not_exists()?;
                let column = self.parse_column_def()?;
                let action = self.alter_action(start, "ADD COLUMN")?;
                if if_not_exists {
                    self.flag(action, NodeFlags::IF_NOT_EXISTS)?;
                }
                self.append(action, column)?;
                self.finish(action)
            }
            Some(Keyword::Drop) => {
                self.advance();
                let text = if self.eat_keyword(Keyword::Constraint) {
                    "DROP CONSTRAINT"
                } else {
                    self.eat_keyword(Keyword::Column);
                    "DROP COLUMN"
                };
                let action = self.alter_action(start, text)?;
                if self.parse_if_exists()? {
                    self.flag(action, NodeFlags::IF_EXISTS)?;
                }
                self.append_name(action, "column name")?;
                self.parse_drop_behavior(action)?;
                self.finish(action)
            }
            Some(Keyword::Alter) => {
                self.advance();
                self.eat_keyword(Keyword::Column);
                let (name, span) = self.expect_name("column name")?;
                let column = self.identifier(&name, span)?;
                let (text, value) = self.parse_alter_column_change()?;
                let action = self.alter_action(start, text)?;
                self.append(action, column)?;
                if let Some(value) = value {
                    self.append(action, value)?;
                }
                self.finish(action)
            }
            Some(Keyword::Rename) => {
                self.advance();
                if self.eat_keyword(Keyword::To) {
                    let action = self.alter_action(start, "RENAME TO")?;
                    self.append_name(action, "table name")?;
                    return self.finish(action);
                }
                self.eat_keyword(Keyword::Column);
                let action = self.alter_action(start, "RENAME COLUMN")?;
                self.append_name(action, "column name")?;
                self.expect_keyword(Keyword::To)?;
                self.append_name(action, "column name")?;
                self.finish(action)
            }
            _ => Err(self.unexpected("ADD, DROP, ALTER or RENAME")),
        }
    }

    /// The change applied by `ALTER COLUMN name ...`, as the action text and
    /// an optional operand.
    fn parse_alter_column_change(&mut self) -> Result<(&'static str, Option<NodeId>), ParseError> {
        if self.eat_keyword(Keyword::Set) {
            if self.eat_keyword(Keyword::Default) {
                let value = self.parse_expr()?;
                return Ok(("ALTER COLUMN SET DEFAULT", Some(value)));
            }
            if self.eat_keyword(Keyword::Not) {
                self.expect_keyword(Keyword::Null)?;
                return Ok(("ALTER COLUMN SET NOT NULL", None));
            }
            self.expect_word("DATA")?;
            self.expect_word("TYPE")?;
            let data_type = self.parse_data_type()?;
            return Ok(("ALTER COLUMN TYPE", Some(data_type)));
        }
        if self.eat_keyword(Keyword::Drop) {
            if self.eat_keyword(Keyword::Default) {
                return Ok(("ALTER COLUMN DROP DEFAULT", None));
            }
            self.expect_keyword(Keyword::Not)?;
            self.expect_keyword(Keyword::Null)?;
            return Ok(("ALTER COLUMN DROP NOT NULL", None));
        }
        self.expect_word("TYPE")?;
        let data_type = self.parse_data_type()?;
        Ok(("ALTER COLUMN TYPE", Some(data_type)))
    }

    fn alter_action(&mut self, start: Span, text: &str) -> Result<NodeId, ParseError> {
        self.node_with_text(NodeKind::AlterAction, start, text)
    }

    fn append_name(&mut self, parent: NodeId, what: &str) -> Result<(), ParseError> {
        let (name, span) = self.expect_name(what)?;
        let name = self.identifier(&name, span)?;
        self.append(parent, name)
    }

    fn parse_drop_behavior(&mut self, stmt: NodeId) -> Result<(), ParseError> {
        if self.eat_keyword(Keyword::Cascade) {
            self.flag(stmt, NodeFlags::CASCADE)
        } else if self.eat_keyword(Keyword::Restrict) {
            self.flag(stmt, NodeFlags::RESTRICT)
        } else {
            Ok(())
        }
    }

    /// `DROP {TABLE | INDEX | VIEW | TRIGGER | SCHEMA | DATABASE} [IF EXISTS]
    /// name, ... [CASCADE | RESTRICT]`.
    pub(super) fn parse_drop(&mut self) -> Result<NodeId, ParseError> {
        let start = self.expect_keyword(Keyword::Drop)?;
        let object = match self.current().as_keyword() {
            Some(
                kw @ (Keyword::Table
                | Keyword::Index
                | Keyword::View
                | Keyword::Trigger
                | Keyword::Schema
                | Keyword::Database),
            ) => kw.as_str(),
            _ => return Err(self.unexpected("TABLE, INDEX, VIEW, TRIGGER or SCHEMA")),
        };
        self.advance();
        let stmt = self.node(NodeKind::DropStmt, start);
        self.set_secondary(stmt, object)?;
        if self.parse_if_exists()? {
            self.flag(stmt, NodeFlags::IF_EXISTS)?;
        }
        self.parse_table_list(stmt)?;
        self.parse_drop_behavior(stmt)?;
        self.finish(stmt)
    }

    /// `TRUNCATE [TABLE] name, ... [CASCADE | RESTRICT]`.
    pub(super) fn parse_truncate(&mut self) -> Result<NodeId, ParseError> {
        let start = self.expect_word("TRUNCATE")?;
        self.eat_keyword(Keyword::Table);
        let stmt = self.node(NodeKind::TruncateStmt, start);
        self.parse_table_list(stmt)?;
        self.parse_drop_behavior(stmt)?;
        self.finish(stmt)
    }

    fn parse_table_list(&mut self, parent: NodeId) -> Result<(), ParseError> {
        loop {
            let (schema, name, span) = self.expect_qualified_name("name")?;
            let table = self.table_ref(schema.as_deref(), &name, span)?;
            self.append(parent, table)?;
            if !self.eat(&TokenKind::Comma) {
                return Ok(());
            }
        }
    }
}
