//! Tests for binary and unary operators and their precedence.

mod common;
use common::*;

use quarry_sql::{NodeFlags, NodeKind};

/// Renders the WHERE condition of `SELECT * FROM t WHERE {cond}`.
fn condition(cond: &str) -> String {
    let sql = format!("SELECT * FROM t WHERE {cond}");
    with_root(&sql, |root| {
        render(root.find_child(NodeKind::WhereClause).unwrap().first_child().unwrap())
    })
}

/// Renders the only SELECT-list item of `SELECT {expr}`.
fn item(expr: &str) -> String {
    with_root(&format!("SELECT {expr}"), |root| {
        render(root.find_child(NodeKind::SelectList).unwrap().first_child().unwrap())
    })
}

#[test]
fn arithmetic_operators() {
    for op in ["+", "-", "*", "/", "%"] {
        assert_eq!(
            item(&format!("8 {op} 2")),
            format!("BinaryExpr[{op}](NumberLiteral[8] NumberLiteral[2])")
        );
    }
}

#[test]
fn comparison_operators() {
    for op in ["=", "<", "<=", ">", ">=", "<>"] {
        assert_eq!(
            condition(&format!("x {op} 1")),
            format!("BinaryExpr[{op}](ColumnRef[x] NumberLiteral[1])")
        );
    }
}

#[test]
fn bang_equals_is_stored_as_not_equal() {
    assert_eq!(
        condition("x != 1"),
        "BinaryExpr[<>](ColumnRef[x] NumberLiteral[1])"
    );
}

#[test]
fn bitwise_operators() {
    for op in ["&", "|", "<<", ">>"] {
        assert_eq!(
            item(&format!("16 {op} 2")),
            format!("BinaryExpr[{op}](NumberLiteral[16] NumberLiteral[2])")
        );
    }
    assert_eq!(
        item("1 | 2 + 3"),
        "BinaryExpr[|](NumberLiteral[1] BinaryExpr[+](NumberLiteral[2] NumberLiteral[3]))"
    );
}

#[test]
fn concat() {
    assert_eq!(
        item("'a' || 'b'"),
        "BinaryExpr[||](StringLiteral[a] StringLiteral[b])"
    );
}

#[test]
fn logical_operators() {
    assert_eq!(
        condition("a = 1 OR b = 2 AND c = 3"),
        "BinaryExpr[OR](BinaryExpr[=](ColumnRef[a] NumberLiteral[1]) \
         BinaryExpr[AND](BinaryExpr[=](ColumnRef[b] NumberLiteral[2]) \
         BinaryExpr[=](ColumnRef[c] NumberLiteral[3])))"
    );
}

#[test]
fn unary_operators() {
    assert_eq!(item("~flags"), "UnaryExpr[~](ColumnRef[flags])");
    assert_eq!(condition("NOT active"), "UnaryExpr[NOT](ColumnRef[active])");
    with_root("SELECT * FROM t WHERE NOT active", |root| {
        let not = find_all(root, NodeKind::UnaryExpr)[0];
        assert!(not.has_flag(NodeFlags::NOT));
    });
}

#[test]
fn unary_minus_binds_tighter_than_multiplication() {
    assert_eq!(
        condition("-x * y = 0"),
        "BinaryExpr[=](BinaryExpr[*](UnaryExpr[-](ColumnRef[x]) ColumnRef[y]) NumberLiteral[0])"
    );
}

#[test]
fn parentheses_override_precedence() {
    assert_eq!(
        item("(1 + 2) * 3"),
        "BinaryExpr[*](BinaryExpr[+](NumberLiteral[1] NumberLiteral[2]) NumberLiteral[3])"
    );
    assert_eq!(item("((1 + 2)) * 3"), item("(1 + 2) * 3"));
}

#[test]
fn left_associativity() {
    assert_eq!(
        item("1 - 2 - 3"),
        "BinaryExpr[-](BinaryExpr[-](NumberLiteral[1] NumberLiteral[2]) NumberLiteral[3])"
    );
}

#[test]
fn is_distinct_and_is_not() {
    assert_eq!(
        condition("a IS NOT b"),
        "BinaryExpr[IS NOT](ColumnRef[a] ColumnRef[b])"
    );
    assert_eq!(
        condition("a IS TRUE"),
        "BinaryExpr[IS](ColumnRef[a] BooleanLiteral[TRUE])"
    );
}

#[test]
fn is_distinct_from() {
    assert_eq!(
        condition("a IS DISTINCT FROM b"),
        "BinaryExpr[IS DISTINCT FROM](ColumnRef[a] ColumnRef[b])"
    );
    assert_eq!(
        condition("a IS NOT DISTINCT FROM b + 1"),
        "BinaryExpr[IS NOT DISTINCT FROM](ColumnRef[a] \
         BinaryExpr[+](ColumnRef[b] NumberLiteral[1]))"
    );
    with_root("SELECT * FROM t WHERE a IS NOT DISTINCT FROM b", |root| {
        let node = find_all(root, NodeKind::BinaryExpr)[0];
        assert!(node.has_flag(NodeFlags::NOT));
    });
}
