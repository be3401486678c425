#![allow(dead_code)]

use quarry_sql::{Node, NodeKind, ParseError, Parser, ParserConfig};

/// Parses `sql` with a strict parser and renders the tree.
pub fn parse(sql: &str) -> String {
    let mut parser = Parser::new();
    let root = parser
        .parse(sql)
        .unwrap_or_else(|e| panic!("Failed to parse: {sql}\nError: {e}"));
    assert_sound(root);
    render(root)
}

/// Parses `sql` with a permissive parser and renders the tree.
pub fn parse_permissive(sql: &str) -> String {
    let mut parser = Parser::with_config(ParserConfig::default().with_strict(false));
    let root = parser
        .parse(sql)
        .unwrap_or_else(|e| panic!("Failed to parse: {sql}\nError: {e}"));
    assert_sound(root);
    render(root)
}

pub fn parse_err(sql: &str) -> ParseError {
    Parser::new()
        .parse(sql)
        .map(render)
        .expect_err(&format!("Expected parse error for: {sql}"))
}

/// Runs `f` on the root of `sql`.
pub fn with_root<T>(sql: &str, f: impl FnOnce(Node<'_>) -> T) -> T {
    let mut parser = Parser::new();
    let root = parser
        .parse(sql)
        .unwrap_or_else(|e| panic!("Failed to parse: {sql}\nError: {e}"));
    f(root)
}

/// Renders a node as `Kind`, `Kind[text]` or `Kind[text|secondary]`,
/// followed by its children in parentheses.
pub fn render(node: Node<'_>) -> String {
    let mut out = node.kind().to_string();
    match (node.text(), node.secondary()) {
        (Some(text), Some(secondary)) => out.push_str(&format!("[{text}|{secondary}]")),
        (Some(text), None) => out.push_str(&format!("[{text}]")),
        (None, Some(secondary)) => out.push_str(&format!("[|{secondary}]")),
        (None, None) => {}
    }
    if node.child_count() > 0 {
        let children: Vec<String> = node.children().map(render).collect();
        out.push_str(&format!("({})", children.join(" ")));
    }
    out
}

/// Kinds of the direct children of `node`.
pub fn kinds(node: Node<'_>) -> Vec<NodeKind> {
    node.children().map(|c| c.kind()).collect()
}

/// All nodes of `kind` below (and including) `root`, in preorder.
pub fn find_all<'a>(root: Node<'a>, kind: NodeKind) -> Vec<Node<'a>> {
    root.descendants().filter(|n| n.kind() == kind).collect()
}

/// Checks that every node's child list matches its child count and that
/// every child points back at its parent.
pub fn assert_sound(root: Node<'_>) {
    for node in root.descendants() {
        let mut walked = 0;
        let mut child = node.first_child();
        while let Some(c) = child {
            assert_eq!(c.parent().map(|p| p.id()), Some(node.id()));
            walked += 1;
            child = c.next_sibling();
        }
        assert_eq!(walked, node.child_count(), "child count of {node:?}");
    }
}
