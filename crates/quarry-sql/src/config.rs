//! Parser configuration.

use serde::{Deserialize, Serialize};

use crate::arena::ArenaConfig;
use crate::parser::DEFAULT_STACK_BUDGET;

/// Default recursion limit, counted in guarded grammar calls. A
/// parenthesized expression costs four, a subquery five or more.
pub const DEFAULT_MAX_DEPTH: u32 = 512;

/// Per-instance parser settings.
///
/// Every field has a default, so a partial document deserializes:
///
/// ```rust
/// use quarry_sql::ParserConfig;
///
/// let config: ParserConfig = serde_json::from_str(r#"{ "strict": false }"#).unwrap();
/// assert!(!config.strict);
/// assert_eq!(config.max_depth, 512);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParserConfig {
    /// Run the structural validation pass and reject foreign operators
    /// (`==`, `===`, `!==`).
    pub strict: bool,
    /// Maximum nesting of expressions and subqueries.
    pub max_depth: u32,
    /// Bytes of native stack a parse may use before it fails with
    /// `DepthExceeded`, whatever `max_depth` allows.
    pub stack_budget: usize,
    /// Sizing of the arena holding node text.
    pub arena: ArenaConfig,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            strict: true,
            max_depth: DEFAULT_MAX_DEPTH,
            stack_budget: DEFAULT_STACK_BUDGET,
            arena: ArenaConfig::default(),
        }
    }
}

impl ParserConfig {
    #[must_use]
    pub const fn with_strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    #[must_use]
    pub const fn with_max_depth(mut self, max_depth: u32) -> Self {
        self.max_depth = max_depth;
        self
    }

    #[must_use]
    pub const fn with_stack_budget(mut self, bytes: usize) -> Self {
        self.stack_budget = bytes;
        self
    }

    #[must_use]
    pub const fn with_arena(mut self, arena: ArenaConfig) -> Self {
        self.arena = arena;
        self
    }
}
