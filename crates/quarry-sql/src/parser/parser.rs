//! The parser façade.

use tracing::{debug, warn};

use super::cursor::TokenCursor;
use super::depth::DepthTracker;
use super::engine::Engine;
use super::error::{ParseError, ParseErrorKind};
use super::validate::validate;
use crate::ast::{Node, NodeId, Tree};
use crate::config::ParserConfig;
use crate::lexer::{Keyword, Lexer, Span, Token, TokenKind};

/// Result of [`Parser::parse_script_recovering`]: every statement that
/// parsed, plus one error per statement that did not.
#[derive(Debug)]
pub struct ScriptReport<'a> {
    pub statements: Vec<Node<'a>>,
    pub errors: Vec<ParseError>,
}

impl ScriptReport<'_> {
    /// Returns true if no statement failed.
    #[must_use]
    pub fn is_ok(&self) -> bool {
        self.errors.is_empty()
    }
}

/// SQL parser.
///
/// A parser owns the arena and node table its trees live in. Each call to
/// [`Parser::parse`] or [`Parser::parse_script`] starts from an empty tree,
/// and the returned [`Node`] views borrow the parser, so they cannot outlive
/// the next parse or [`Parser::reset`].
///
/// ```rust
/// use quarry_sql::{NodeKind, Parser};
///
/// let mut parser = Parser::new();
/// let root = parser.parse("SELECT * FROM users").unwrap();
/// assert_eq!(root.kind(), NodeKind::SelectStmt);
/// assert_eq!(root.child_count(), 2);
/// ```
#[derive(Debug)]
pub struct Parser {
    config: ParserConfig,
    tree: Tree,
    cursor: TokenCursor,
    depth: DepthTracker,
}

impl Default for Parser {
    fn default() -> Self {
        Self::new()
    }
}

impl Parser {
    /// Creates a strict parser with default limits.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(ParserConfig::default())
    }

    #[must_use]
    pub fn with_config(config: ParserConfig) -> Self {
        Self {
            config,
            tree: Tree::new(config.arena),
            cursor: TokenCursor::default(),
            depth: DepthTracker::new(config.max_depth).with_stack_budget(config.stack_budget),
        }
    }

    #[must_use]
    pub const fn config(&self) -> &ParserConfig {
        &self.config
    }

    /// Parses exactly one statement, optionally followed by `;`.
    ///
    /// # Errors
    ///
    /// Returns a `ParseError` if the input is empty, does not parse, nests
    /// deeper than the configured limit, or (in strict mode) fails
    /// validation.
    pub fn parse(&mut self, sql: &str) -> Result<Node<'_>, ParseError> {
        debug!(bytes = sql.len(), "Parsing SQL");
        let id = self.parse_single(sql).map_err(|err| err.with_source(sql))?;
        debug!(
            nodes = self.tree.len(),
            arena_bytes = self.memory_used(),
            "Parsed statement"
        );
        self.tree
            .get(id)
            .ok_or_else(|| missing_root(id).with_source(sql))
    }

    fn parse_single(&mut self, sql: &str) -> Result<NodeId, ParseError> {
        self.prepare(sql)?;
        let id = self.statement(sql)?;
        self.cursor.eat(&TokenKind::Semicolon);
        if !self.cursor.at_end() {
            return Err(ParseError::unexpected("end of input", self.cursor.current()));
        }
        Ok(id)
    }

    /// Parses a `;`-separated script, stopping at the first failing
    /// statement. Empty statements (`;;`) are skipped.
    ///
    /// # Errors
    ///
    /// Returns the first statement's error; its span locates the failing
    /// statement in `sql`.
    pub fn parse_script(&mut self, sql: &str) -> Result<Vec<Node<'_>>, ParseError> {
        debug!(bytes = sql.len(), "Parsing SQL script");
        let ids = self.parse_script_ids(sql).map_err(|err| err.with_source(sql))?;
        debug!(
            statements = ids.len(),
            nodes = self.tree.len(),
            arena_bytes = self.memory_used(),
            "Parsed script"
        );
        Ok(self.roots(&ids))
    }

    fn parse_script_ids(&mut self, sql: &str) -> Result<Vec<NodeId>, ParseError> {
        self.prepare(sql)?;
        let mut ids = Vec::new();
        loop {
            while self.cursor.eat(&TokenKind::Semicolon) {}
            if self.cursor.at_end() {
                break;
            }
            ids.push(self.statement(sql)?);
            if !self.cursor.eat(&TokenKind::Semicolon) && !self.cursor.at_end() {
                return Err(ParseError::unexpected("';'", self.cursor.current()));
            }
        }
        if ids.is_empty() {
            return Err(empty_input(sql));
        }
        Ok(ids)
    }

    /// Parses a script, skipping past each failing statement to the next
    /// statement boundary and carrying on.
    pub fn parse_script_recovering(&mut self, sql: &str) -> ScriptReport<'_> {
        debug!(bytes = sql.len(), "Parsing SQL script with recovery");
        let mut ids = Vec::new();
        let mut errors = Vec::new();
        if let Err(err) = self.prepare(sql) {
            errors.push(err.with_source(sql));
            return ScriptReport {
                statements: Vec::new(),
                errors,
            };
        }

        loop {
            while self.cursor.eat(&TokenKind::Semicolon) {}
            if self.cursor.at_end() {
                break;
            }
            let start = self.cursor.position();
            let outcome = self.statement(sql).and_then(|id| {
                if self.cursor.eat(&TokenKind::Semicolon) || self.cursor.at_end() {
                    Ok(id)
                } else {
                    Err(ParseError::unexpected("';'", self.cursor.current()))
                }
            });
            match outcome {
                Ok(id) => ids.push(id),
                Err(err) => {
                    errors.push(err.with_source(sql));
                    self.synchronize(sql, start);
                }
            }
        }
        if ids.is_empty() && errors.is_empty() {
            errors.push(empty_input(sql));
        }
        debug!(
            statements = ids.len(),
            errors = errors.len(),
            nodes = self.tree.len(),
            "Parsed script with recovery"
        );
        ScriptReport {
            statements: self.roots(&ids),
            errors,
        }
    }

    /// Drops the current tree and token buffer. Arena blocks are kept for
    /// the next parse.
    pub fn reset(&mut self) {
        self.tree.reset();
        self.cursor.clear();
        self.depth.reset();
    }

    /// Like [`Parser::reset`], but also releases the arena's memory.
    pub fn clear(&mut self) {
        self.tree.clear();
        self.cursor.clear();
        self.depth.reset();
    }

    /// Bytes of node text currently held by the arena.
    ///
    /// Node records live in the tree's node table and are not part of this
    /// figure; [`Parser::node_count`] reports how many there are.
    #[must_use]
    pub fn memory_used(&self) -> usize {
        self.tree.arena().bytes_used()
    }

    /// Number of nodes allocated by the last parse, including nodes of
    /// statements that failed during recovery.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.tree.len()
    }

    #[must_use]
    pub const fn tree(&self) -> &Tree {
        &self.tree
    }

    /// Looks up a node of the current tree.
    #[must_use]
    pub fn node(&self, id: NodeId) -> Option<Node<'_>> {
        self.tree.get(id)
    }

    /// Resets per-parse state and tokenizes `sql`.
    fn prepare(&mut self, sql: &str) -> Result<(), ParseError> {
        self.tree.reset();
        self.depth.reset();
        let tokens = Lexer::new(sql).tokenize();
        if tokens.iter().all(|t| t.is_eof()) {
            return Err(empty_input(sql));
        }
        self.cursor = TokenCursor::new(tokens);
        Ok(())
    }

    /// Parses the statement at the cursor, then validates it in strict mode.
    fn statement(&mut self, sql: &str) -> Result<NodeId, ParseError> {
        self.check_segment()?;
        self.depth.reset();
        self.cursor.reset_paren_depth();

        let result = Engine::new(
            sql,
            &mut self.cursor,
            &mut self.tree,
            self.depth.clone(),
            self.config.strict,
        )
        .parse_statement();

        if self.depth.exceeded() {
            let max_depth = self.depth.max_depth();
            warn!(max_depth, "Maximum nesting depth exceeded");
            return Err(match result {
                Err(err) if err.kind == ParseErrorKind::DepthExceeded => err,
                _ => ParseError::depth_exceeded(max_depth, self.cursor.current().span),
            });
        }
        let id = result?;

        if self.config.strict {
            let root = self.tree.get(id).ok_or_else(|| missing_root(id))?;
            if let Err(err) = validate(root, self.cursor.paren_depth()) {
                warn!(error = %err.message, "Strict validation rejected statement");
                return Err(err);
            }
        }
        Ok(id)
    }

    /// Checks the tokens of the statement at the cursor for lexer errors and
    /// unbalanced parentheses before any of them is parsed.
    ///
    /// The statement ends at the next `;`, except inside the `BEGIN .. END`
    /// body of a `CREATE TRIGGER`, whose statements carry their own `;`.
    fn check_segment(&self) -> Result<(), ParseError> {
        let tokens = &self.cursor.tokens()[self.cursor.position()..];
        let trigger = is_create_trigger(tokens);
        let mut in_body = false;
        let mut open_cases = 0usize;
        let mut open: Vec<Span> = Vec::new();
        for token in tokens {
            match &token.kind {
                TokenKind::Eof => break,
                TokenKind::Semicolon if !in_body => break,
                TokenKind::Keyword(Keyword::Begin) if trigger && !in_body => in_body = true,
                TokenKind::Keyword(Keyword::Case) if in_body => open_cases += 1,
                TokenKind::Keyword(Keyword::End) if in_body => {
                    if open_cases == 0 {
                        in_body = false;
                    } else {
                        open_cases -= 1;
                    }
                }
                TokenKind::Error(message) => {
                    return Err(ParseError::syntax(message.clone(), token.span));
                }
                TokenKind::LeftParen => open.push(token.span),
                TokenKind::RightParen => {
                    if open.pop().is_none() {
                        return Err(ParseError::new(
                            ParseErrorKind::UnbalancedParenthesis,
                            "unmatched ')'",
                            token.span,
                        ));
                    }
                }
                _ => {}
            }
        }
        match open.pop() {
            Some(span) => Err(ParseError::new(
                ParseErrorKind::UnbalancedParenthesis,
                "unclosed '('",
                span,
            )),
            None => Ok(()),
        }
    }

    /// Skips to the next statement boundary, making sure the cursor ends up
    /// past `start`.
    fn synchronize(&mut self, sql: &str, start: usize) {
        if self.cursor.position() == start || !self.cursor.at_end() {
            let mut engine = Engine::new(
                sql,
                &mut self.cursor,
                &mut self.tree,
                self.depth.clone(),
                self.config.strict,
            );
            engine.synchronize();
        }
    }

    fn roots(&self, ids: &[NodeId]) -> Vec<Node<'_>> {
        ids.iter().filter_map(|&id| self.tree.get(id)).collect()
    }
}

/// Returns true for `CREATE [OR REPLACE] [TEMP | TEMPORARY] TRIGGER`.
fn is_create_trigger(tokens: &[Token]) -> bool {
    let create = TokenKind::Keyword(Keyword::Create);
    if !tokens.first().is_some_and(|t| t.kind == create) {
        return false;
    }
    tokens[1..]
        .iter()
        .find(|t| {
            !matches!(
                t.kind,
                TokenKind::Keyword(
                    Keyword::Or | Keyword::Replace | Keyword::Temp | Keyword::Temporary
                )
            )
        })
        .is_some_and(|t| t.kind == TokenKind::Keyword(Keyword::Trigger))
}

fn empty_input(sql: &str) -> ParseError {
    ParseError::new(
        ParseErrorKind::EmptyInput,
        "no SQL statement found",
        Span::new(sql.len(), sql.len()),
    )
}

fn missing_root(id: NodeId) -> ParseError {
    ParseError::new(
        ParseErrorKind::Internal,
        format!("statement root {id} is not in the tree"),
        Span::new(0, 0),
    )
}
