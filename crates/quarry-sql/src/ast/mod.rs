//! Arena-backed abstract syntax tree.
//!
//! Every node is a tagged record (kind, text, secondary text, flags) linked to
//! its parent, first child and next sibling by [`NodeId`] handles into a single
//! node table. Text is copied into the tree's arena, so a parsed tree does not
//! borrow the SQL source or the token stream.

mod kind;
mod node;
mod tree;

pub use kind::{NodeFlags, NodeKind, ParseContext};
pub use node::{Children, Descendants, Node, NodeId};
pub use tree::{Tree, TreeError};
