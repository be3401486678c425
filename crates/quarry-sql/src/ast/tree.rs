//! Node table and arena-backed text storage.

use thiserror::Error;

use super::kind::{NodeFlags, NodeKind, ParseContext};
use super::node::{AstNode, Node, NodeId};
use crate::arena::{Arena, ArenaConfig, ArenaError, Text};
use crate::lexer::Span;

/// Structural failures while building a tree.
///
/// The parser only links nodes it has just allocated, so these indicate a bug
/// rather than bad input; they are still returned instead of panicking.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TreeError {
    #[error("node {0} does not exist")]
    UnknownNode(NodeId),

    #[error("node {0} is already linked under a parent")]
    AlreadyLinked(NodeId),

    #[error("cannot link node {0} under itself")]
    SelfLink(NodeId),

    #[error(transparent)]
    Arena(#[from] ArenaError),
}

/// Owns every node of the trees produced by one parser, plus the arena holding
/// their text. Node records sit in a plain table; only text goes through the
/// arena, so [`Arena::bytes_used`] counts text bytes alone.
///
/// Node ids are assigned in allocation order and index the node table
/// directly. Nothing is freed individually: [`Tree::reset`] drops all nodes at
/// once and rewinds the arena for reuse.
#[derive(Debug, Default)]
pub struct Tree {
    arena: Arena,
    nodes: Vec<AstNode>,
}

impl Tree {
    /// Creates an empty tree whose arena uses `config`.
    #[must_use]
    pub fn new(config: ArenaConfig) -> Self {
        Self {
            arena: Arena::with_config(config),
            nodes: Vec::new(),
        }
    }

    /// Allocates a detached node.
    pub fn alloc(&mut self, kind: NodeKind, span: Span) -> NodeId {
        let id = NodeId(u32::try_from(self.nodes.len()).unwrap_or(u32::MAX));
        self.nodes.push(AstNode::new(id, kind, span));
        id
    }

    /// Allocates a detached node with primary text.
    ///
    /// # Errors
    ///
    /// Fails if the arena cannot hold the text.
    pub fn alloc_with_text(
        &mut self,
        kind: NodeKind,
        span: Span,
        text: &str,
    ) -> Result<NodeId, TreeError> {
        let id = self.alloc(kind, span);
        self.set_text(id, text)?;
        Ok(id)
    }

    fn get_mut(&mut self, id: NodeId) -> Result<&mut AstNode, TreeError> {
        self.nodes
            .get_mut(id.index())
            .ok_or(TreeError::UnknownNode(id))
    }

    /// Copies `text` into the arena and makes it the node's primary text.
    ///
    /// # Errors
    ///
    /// Fails for unknown nodes or when the arena cannot hold the text.
    pub fn set_text(&mut self, id: NodeId, text: &str) -> Result<(), TreeError> {
        let stored = self.arena.alloc_str(text)?;
        self.get_mut(id)?.text = Some(stored);
        Ok(())
    }

    /// Copies `text` into the arena and makes it the node's secondary text.
    ///
    /// # Errors
    ///
    /// Fails for unknown nodes or when the arena cannot hold the text.
    pub fn set_secondary(&mut self, id: NodeId, text: &str) -> Result<(), TreeError> {
        let stored = self.arena.alloc_str(text)?;
        self.get_mut(id)?.secondary = Some(stored);
        Ok(())
    }

    /// Sets flag bits on a node.
    ///
    /// # Errors
    ///
    /// Fails for unknown nodes.
    pub fn add_flags(&mut self, id: NodeId, flags: NodeFlags) -> Result<(), TreeError> {
        self.get_mut(id)?.flags.insert(flags);
        Ok(())
    }

    /// Stores the enclosing-clause hint in the node's flag byte.
    ///
    /// # Errors
    ///
    /// Fails for unknown nodes.
    pub fn set_context_hint(&mut self, id: NodeId, hint: ParseContext) -> Result<(), TreeError> {
        self.get_mut(id)?.flags.set_context_hint(hint);
        Ok(())
    }

    /// Widens the node's span to cover `span`.
    ///
    /// # Errors
    ///
    /// Fails for unknown nodes.
    pub fn extend_span(&mut self, id: NodeId, span: Span) -> Result<(), TreeError> {
        let node = self.get_mut(id)?;
        node.span = node.span.merge(span);
        Ok(())
    }

    fn check_link(&self, parent: NodeId, child: NodeId) -> Result<(), TreeError> {
        if parent == child {
            return Err(TreeError::SelfLink(child));
        }
        self.nodes
            .get(parent.index())
            .ok_or(TreeError::UnknownNode(parent))?;
        let child_node = self
            .nodes
            .get(child.index())
            .ok_or(TreeError::UnknownNode(child))?;
        if child_node.parent.is_some() {
            return Err(TreeError::AlreadyLinked(child));
        }
        Ok(())
    }

    /// Links a detached `child` as the last child of `parent`.
    ///
    /// # Errors
    ///
    /// Fails if either node is unknown or `child` already has a parent.
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) -> Result<(), TreeError> {
        self.check_link(parent, child)?;
        let previous_last = self.nodes[parent.index()].last_child;
        match previous_last {
            Some(last) => self.get_mut(last)?.next_sibling = Some(child),
            None => self.get_mut(parent)?.first_child = Some(child),
        }
        let child_span = self.nodes[child.index()].span;
        let parent_node = self.get_mut(parent)?;
        parent_node.last_child = Some(child);
        parent_node.child_count += 1;
        parent_node.span = parent_node.span.merge(child_span);
        self.get_mut(child)?.parent = Some(parent);
        Ok(())
    }

    /// Links a detached `child` as the first child of `parent`.
    ///
    /// # Errors
    ///
    /// Fails if either node is unknown or `child` already has a parent.
    pub fn prepend_child(&mut self, parent: NodeId, child: NodeId) -> Result<(), TreeError> {
        self.check_link(parent, child)?;
        let previous_first = self.nodes[parent.index()].first_child;
        let child_span = self.nodes[child.index()].span;
        let parent_node = self.get_mut(parent)?;
        parent_node.first_child = Some(child);
        if parent_node.last_child.is_none() {
            parent_node.last_child = Some(child);
        }
        parent_node.child_count += 1;
        parent_node.span = parent_node.span.merge(child_span);
        let child_node = self.get_mut(child)?;
        child_node.next_sibling = previous_first;
        child_node.parent = Some(parent);
        Ok(())
    }

    /// Allocates a node of `kind` and appends each of `children` to it.
    ///
    /// # Errors
    ///
    /// Fails if a child is unknown or already linked.
    pub fn wrap(
        &mut self,
        kind: NodeKind,
        span: Span,
        children: &[NodeId],
    ) -> Result<NodeId, TreeError> {
        let parent = self.alloc(kind, span);
        for &child in children {
            self.append_child(parent, child)?;
        }
        Ok(parent)
    }

    /// Read-only view of a node.
    #[must_use]
    pub fn get(&self, id: NodeId) -> Option<Node<'_>> {
        self.nodes.get(id.index()).map(|data| Node::new(self, data))
    }

    pub(crate) fn data(&self, id: NodeId) -> Option<&AstNode> {
        self.nodes.get(id.index())
    }

    pub(crate) fn text(&self, text: Text) -> &str {
        self.arena.text(text)
    }

    /// Number of nodes allocated since the last reset.
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Returns true if no node has been allocated since the last reset.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// The arena holding node text.
    #[must_use]
    pub const fn arena(&self) -> &Arena {
        &self.arena
    }

    /// Drops every node and rewinds the arena, keeping its blocks.
    pub fn reset(&mut self) {
        self.nodes.clear();
        self.arena.reset();
    }

    /// Drops every node and releases all arena blocks.
    pub fn clear(&mut self) {
        self.nodes = Vec::new();
        self.arena.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn span() -> Span {
        Span::default()
    }

    #[test]
    fn test_ids_follow_allocation_order() {
        let mut tree = Tree::default();
        let a = tree.alloc(NodeKind::SelectStmt, span());
        let b = tree.alloc(NodeKind::SelectList, span());
        assert_eq!(a.index(), 0);
        assert_eq!(b.index(), 1);
    }

    #[test]
    fn test_append_and_prepend_keep_counts() {
        let mut tree = Tree::default();
        let root = tree.alloc(NodeKind::SelectStmt, span());
        let list = tree.alloc(NodeKind::SelectList, span());
        let from = tree.alloc(NodeKind::FromClause, span());
        let cte = tree.alloc(NodeKind::CteClause, span());
        tree.append_child(root, list).unwrap();
        tree.append_child(root, from).unwrap();
        tree.prepend_child(root, cte).unwrap();

        let view = tree.get(root).unwrap();
        let kinds: Vec<NodeKind> = view.children().map(|c| c.kind()).collect();
        assert_eq!(
            kinds,
            vec![NodeKind::CteClause, NodeKind::SelectList, NodeKind::FromClause]
        );
        assert_eq!(view.child_count(), 3);
        assert_eq!(tree.get(cte).unwrap().parent().map(|p| p.id()), Some(root));
    }

    #[test]
    fn test_prepend_into_empty_parent() {
        let mut tree = Tree::default();
        let root = tree.alloc(NodeKind::SelectStmt, span());
        let cte = tree.alloc(NodeKind::CteClause, span());
        let list = tree.alloc(NodeKind::SelectList, span());
        tree.prepend_child(root, cte).unwrap();
        tree.append_child(root, list).unwrap();
        let kinds: Vec<NodeKind> = tree
            .get(root)
            .unwrap()
            .children()
            .map(|c| c.kind())
            .collect();
        assert_eq!(kinds, vec![NodeKind::CteClause, NodeKind::SelectList]);
    }

    #[test]
    fn test_relinking_is_rejected() {
        let mut tree = Tree::default();
        let a = tree.alloc(NodeKind::SelectStmt, span());
        let b = tree.alloc(NodeKind::SelectStmt, span());
        let c = tree.alloc(NodeKind::Star, span());
        tree.append_child(a, c).unwrap();
        assert_eq!(tree.append_child(b, c), Err(TreeError::AlreadyLinked(c)));
        assert_eq!(tree.append_child(a, a), Err(TreeError::SelfLink(a)));
        assert_eq!(
            tree.append_child(a, NodeId(99)),
            Err(TreeError::UnknownNode(NodeId(99)))
        );
    }

    #[test]
    fn test_text_is_owned_by_arena() {
        let mut tree = Tree::default();
        let id = {
            let name = String::from("users");
            tree.alloc_with_text(NodeKind::TableRef, span(), &name).unwrap()
        };
        assert_eq!(tree.get(id).unwrap().text(), Some("users"));
        assert_eq!(tree.arena().bytes_used(), 5);
    }

    #[test]
    fn test_reset_drops_nodes_and_keeps_blocks() {
        let mut tree = Tree::default();
        tree.alloc_with_text(NodeKind::Identifier, span(), "abc").unwrap();
        let blocks = tree.arena().block_count();
        tree.reset();
        assert!(tree.is_empty());
        assert_eq!(tree.arena().bytes_used(), 0);
        assert_eq!(tree.arena().block_count(), blocks);
    }
}
