//! Stack of enclosing clauses.

use crate::ast::ParseContext;

/// Mirrors clause nesting while parsing. The top of the stack is recorded on
/// every bare name the parser materializes.
#[derive(Debug, Default, Clone)]
pub struct ContextStack {
    stack: Vec<ParseContext>,
}

impl ContextStack {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, context: ParseContext) {
        self.stack.push(context);
    }

    pub fn pop(&mut self) -> Option<ParseContext> {
        self.stack.pop()
    }

    /// Innermost clause, `Unknown` when empty.
    #[must_use]
    pub fn current(&self) -> ParseContext {
        self.stack.last().copied().unwrap_or_default()
    }

    #[must_use]
    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    pub fn clear(&mut self) {
        self.stack.clear();
    }
}
