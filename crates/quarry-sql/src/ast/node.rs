//! AST node storage and the read-only node view.

use core::fmt;

use super::kind::{NodeFlags, NodeKind, ParseContext};
use super::tree::Tree;
use crate::arena::Text;
use crate::lexer::Span;

/// Index of a node in its [`Tree`]. Ids grow in allocation order, so they
/// double as a stable parse-order key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(pub(crate) u32);

impl NodeId {
    /// Position in the node table.
    #[must_use]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Stored form of a node. Children form a singly linked list through
/// `first_child`/`next_sibling`; `child_count` always equals its length.
#[derive(Debug, Clone)]
pub(crate) struct AstNode {
    pub(crate) id: NodeId,
    pub(crate) kind: NodeKind,
    pub(crate) span: Span,
    pub(crate) text: Option<Text>,
    pub(crate) secondary: Option<Text>,
    pub(crate) flags: NodeFlags,
    pub(crate) child_count: u32,
    pub(crate) parent: Option<NodeId>,
    pub(crate) first_child: Option<NodeId>,
    pub(crate) last_child: Option<NodeId>,
    pub(crate) next_sibling: Option<NodeId>,
}

impl AstNode {
    pub(crate) const fn new(id: NodeId, kind: NodeKind, span: Span) -> Self {
        Self {
            id,
            kind,
            span,
            text: None,
            secondary: None,
            flags: NodeFlags::NONE,
            child_count: 0,
            parent: None,
            first_child: None,
            last_child: None,
            next_sibling: None,
        }
    }
}

/// Borrowed view of one node.
///
/// A `Node` borrows the tree that owns it, so it cannot outlive the parser
/// (or survive the parser's next `reset`).
#[derive(Clone, Copy)]
pub struct Node<'a> {
    tree: &'a Tree,
    data: &'a AstNode,
}

impl<'a> Node<'a> {
    pub(crate) const fn new(tree: &'a Tree, data: &'a AstNode) -> Self {
        Self { tree, data }
    }

    fn link(&self, id: Option<NodeId>) -> Option<Self> {
        id.and_then(|id| self.tree.data(id))
            .map(|data| Self::new(self.tree, data))
    }

    #[must_use]
    pub const fn id(&self) -> NodeId {
        self.data.id
    }

    #[must_use]
    pub const fn kind(&self) -> NodeKind {
        self.data.kind
    }

    /// Source bytes covered by the node and its children.
    #[must_use]
    pub const fn span(&self) -> Span {
        self.data.span
    }

    /// Primary text: column, table, operator, function name or literal.
    #[must_use]
    pub fn text(&self) -> Option<&'a str> {
        self.data.text.map(|t| self.tree.text(t))
    }

    /// Secondary text: alias when [`NodeFlags::HAS_ALIAS`] is set, otherwise a
    /// qualifier or kind-specific detail.
    #[must_use]
    pub fn secondary(&self) -> Option<&'a str> {
        self.data.secondary.map(|t| self.tree.text(t))
    }

    #[must_use]
    pub fn alias(&self) -> Option<&'a str> {
        if self.has_flag(NodeFlags::HAS_ALIAS) {
            self.secondary()
        } else {
            None
        }
    }

    #[must_use]
    pub fn qualifier(&self) -> Option<&'a str> {
        if self.has_flag(NodeFlags::HAS_ALIAS) {
            None
        } else {
            self.secondary()
        }
    }

    #[must_use]
    pub const fn flags(&self) -> NodeFlags {
        self.data.flags
    }

    #[must_use]
    pub const fn has_flag(&self, flag: NodeFlags) -> bool {
        self.data.flags.contains(flag)
    }

    /// Enclosing clause recorded for `Identifier`/`ColumnRef` nodes.
    #[must_use]
    pub const fn context_hint(&self) -> ParseContext {
        self.data.flags.context_hint()
    }

    #[must_use]
    pub const fn child_count(&self) -> usize {
        self.data.child_count as usize
    }

    #[must_use]
    pub fn parent(&self) -> Option<Self> {
        self.link(self.data.parent)
    }

    #[must_use]
    pub fn first_child(&self) -> Option<Self> {
        self.link(self.data.first_child)
    }

    #[must_use]
    pub fn next_sibling(&self) -> Option<Self> {
        self.link(self.data.next_sibling)
    }

    /// Iterates direct children in source order.
    #[must_use]
    pub fn children(&self) -> Children<'a> {
        Children {
            next: self.first_child(),
        }
    }

    /// The `n`th child (0-based).
    #[must_use]
    pub fn child(&self, n: usize) -> Option<Self> {
        self.children().nth(n)
    }

    /// First direct child of the given kind.
    #[must_use]
    pub fn find_child(&self, kind: NodeKind) -> Option<Self> {
        self.children().find(|c| c.kind() == kind)
    }

    /// Pre-order traversal of this node and everything below it.
    #[must_use]
    pub fn descendants(&self) -> Descendants<'a> {
        Descendants { stack: vec![*self] }
    }
}

impl fmt::Debug for Node<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut s = f.debug_struct(self.kind().as_str());
        if let Some(text) = self.text() {
            s.field("text", &text);
        }
        if let Some(secondary) = self.secondary() {
            s.field("secondary", &secondary);
        }
        if self.flags() != NodeFlags::NONE {
            s.field("flags", &self.flags());
        }
        if self.child_count() > 0 {
            s.field("children", &self.children().collect::<Vec<_>>());
        }
        s.finish()
    }
}

/// Iterator over a node's direct children.
pub struct Children<'a> {
    next: Option<Node<'a>>,
}

impl<'a> Iterator for Children<'a> {
    type Item = Node<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.next?;
        self.next = current.next_sibling();
        Some(current)
    }
}

/// Pre-order iterator; uses an explicit stack so deep trees cannot overflow.
pub struct Descendants<'a> {
    stack: Vec<Node<'a>>,
}

impl<'a> Iterator for Descendants<'a> {
    type Item = Node<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        let mut children: Vec<Node<'a>> = node.children().collect();
        children.reverse();
        self.stack.extend(children);
        Some(node)
    }
}
