//! Multi-statement scripts, with and without error recovery.

mod common;
use common::*;

use quarry_sql::{NodeKind, ParseErrorKind, Parser};

const MIGRATION: &str = "
CREATE TABLE users (id INTEGER PRIMARY KEY, email TEXT NOT NULL);
CREATE UNIQUE INDEX users_email ON users (email);
CREATE TRIGGER users_audit AFTER DELETE ON users
BEGIN
    INSERT INTO audit (user_id) VALUES (old.id);
END;
INSERT INTO users (email) VALUES ('a@example.com');
";

#[test]
fn script_returns_every_statement() {
    let mut parser = Parser::new();
    let roots = parser.parse_script(MIGRATION).unwrap();
    let kinds: Vec<_> = roots.iter().map(|r| r.kind()).collect();
    assert_eq!(
        kinds,
        [
            NodeKind::CreateTableStmt,
            NodeKind::CreateIndexStmt,
            NodeKind::CreateTriggerStmt,
            NodeKind::InsertStmt
        ]
    );
    for root in &roots {
        assert_sound(*root);
        assert!(root.parent().is_none());
    }
    let body = roots[2].find_child(NodeKind::TriggerBody).unwrap();
    assert_eq!(body.child_count(), 1);
}

#[test]
fn script_without_trailing_semicolon() {
    let mut parser = Parser::new();
    let roots = parser.parse_script("SELECT 1; SELECT 2").unwrap();
    assert_eq!(roots.len(), 2);
    assert_eq!(render(roots[1]), "SelectStmt(SelectList(NumberLiteral[2]))");
}

#[test]
fn script_stops_at_first_error() {
    let sql = "SELECT 1;\nSELECT * FROM;\nSELECT 3";
    let mut parser = Parser::new();
    let err = parser.parse_script(sql).unwrap_err();
    assert_eq!(err.kind, ParseErrorKind::Syntax);
    assert_eq!(err.line, 2);
    assert_eq!(err.excerpt, "SELECT * FROM;");
}

#[test]
fn statements_need_separators() {
    let mut parser = Parser::new();
    let err = parser.parse_script("SELECT 1 SELECT 2").unwrap_err();
    assert_eq!(err.kind, ParseErrorKind::Syntax);
    assert_eq!(err.expected.as_deref(), Some("';'"));
}

#[test]
fn empty_script() {
    let mut parser = Parser::new();
    let err = parser.parse_script(";;  ;").unwrap_err();
    assert_eq!(err.kind, ParseErrorKind::EmptyInput);

    let report = parser.parse_script_recovering("  ");
    assert!(report.statements.is_empty());
    assert_eq!(report.errors[0].kind, ParseErrorKind::EmptyInput);
}

#[test]
fn recovery_collects_every_error() {
    let sql = "SELECT 1;\nSELEC 2;\nDELETE FROM t WHERE;\nCOMMIT";
    let mut parser = Parser::new();
    let report = parser.parse_script_recovering(sql);
    assert!(!report.is_ok());

    let kinds: Vec<_> = report.statements.iter().map(|r| r.kind()).collect();
    assert_eq!(kinds, [NodeKind::SelectStmt, NodeKind::TransactionStmt]);

    let lines: Vec<_> = report.errors.iter().map(|e| e.line).collect();
    assert_eq!(lines, [2, 3]);
}

#[test]
fn recovery_after_validation_error() {
    let mut parser = Parser::new();
    let report = parser.parse_script_recovering("SELECT * WHERE x = 1; SELECT * FROM t");
    assert_eq!(report.errors.len(), 1);
    assert_eq!(report.errors[0].kind, ParseErrorKind::Validation);
    assert_eq!(report.statements.len(), 1);
    assert_eq!(
        render(report.statements[0]),
        "SelectStmt(SelectList(Star) FromClause(TableRef[t]))"
    );
}

#[test]
fn recovery_of_clean_script_matches_fail_fast() {
    let mut parser = Parser::new();
    let expected: Vec<String> = parser
        .parse_script(MIGRATION)
        .unwrap()
        .into_iter()
        .map(render)
        .collect();
    let report = parser.parse_script_recovering(MIGRATION);
    assert!(report.is_ok());
    let actual: Vec<String> = report.statements.into_iter().map(render).collect();
    assert_eq!(actual, expected);
}
