//! SQL Parser
//!
//! A hand-written recursive descent parser with Pratt expression parsing,
//! building an arena-backed [`Tree`](crate::ast::Tree).

mod context;
mod cursor;
mod ddl;
mod depth;
mod dml;
mod engine;
mod error;
mod expr;
#[allow(clippy::module_inception)]
mod parser;
mod pratt;
mod select;
mod statement;
mod validate;

pub use context::ContextStack;
pub use cursor::{Mark, TokenCursor};
pub use depth::{DepthGuard, DepthTracker, DEFAULT_STACK_BUDGET};
pub use error::{ParseError, ParseErrorKind};
pub use parser::{Parser, ScriptReport};
pub use crate::config::ParserConfig;
