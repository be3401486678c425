//! # quarry-sql
//!
//! An arena-backed SQL parser with Pratt expression parsing and a strict
//! structural validation pass.
//!
//! This crate provides:
//! - A hand-written recursive descent parser for queries, DML, DDL,
//!   transaction control and utility statements
//! - A precedence-climbing expression engine with a recursion depth guard
//! - An AST stored in a node table whose text lives in a bump arena
//! - Per-name clause hints (`SelectList`, `WhereClause`, ...) for downstream
//!   semantic analysis
//!
//! ## Parsing
//!
//! ```rust
//! use quarry_sql::{NodeKind, ParseContext, Parser};
//!
//! let mut parser = Parser::new();
//! let root = parser.parse("SELECT name FROM users WHERE id = 1").unwrap();
//! assert_eq!(root.kind(), NodeKind::SelectStmt);
//!
//! let column = root
//!     .descendants()
//!     .find(|n| n.kind() == NodeKind::ColumnRef)
//!     .unwrap();
//! assert_eq!(column.text(), Some("name"));
//! assert_eq!(column.context_hint(), ParseContext::SelectList);
//! ```
//!
//! ## Strict mode
//!
//! Strict mode (the default) rejects structurally incomplete statements:
//!
//! ```rust
//! use quarry_sql::{ParseErrorKind, Parser, ParserConfig};
//!
//! let mut strict = Parser::new();
//! let err = strict.parse("SELECT * WHERE id = 1").unwrap_err();
//! assert_eq!(err.kind, ParseErrorKind::Validation);
//!
//! let mut permissive = Parser::with_config(ParserConfig::default().with_strict(false));
//! assert!(permissive.parse("SELECT * WHERE id = 1").is_ok());
//! ```
//!
//! Returned nodes borrow the parser; they stay valid until the next parse or
//! [`Parser::reset`].

pub mod arena;
pub mod ast;
pub mod config;
pub mod lexer;
pub mod parser;

pub use arena::{Arena, ArenaConfig, ArenaError};
pub use ast::{Node, NodeFlags, NodeId, NodeKind, ParseContext, Tree};
pub use config::ParserConfig;
pub use lexer::{Lexer, Token, TokenKind};
pub use parser::{ParseError, ParseErrorKind, Parser, ScriptReport};
