//! Tests for DML, DDL, transaction and utility statements.

mod common;
use common::*;

use quarry_sql::{NodeFlags, NodeKind};

#[test]
fn insert_values() {
    assert_eq!(
        parse("INSERT INTO users (id, name) VALUES (1, 'a')"),
        "InsertStmt[users](ColumnList(Identifier[id] Identifier[name]) \
         ValuesStmt(ValuesRow(NumberLiteral[1] StringLiteral[a])))"
    );
}

#[test]
fn insert_from_select() {
    assert_eq!(
        parse("INSERT INTO archive SELECT * FROM users WHERE active = FALSE"),
        "InsertStmt[archive](SelectStmt(SelectList(Star) FromClause(TableRef[users]) \
         WhereClause(BinaryExpr[=](ColumnRef[active] BooleanLiteral[FALSE]))))"
    );
}

#[test]
fn insert_default_values() {
    assert_eq!(
        parse("INSERT INTO t DEFAULT VALUES"),
        "InsertStmt[t](DefaultValue[DEFAULT VALUES])"
    );
}

#[test]
fn insert_upsert_with_returning() {
    assert_eq!(
        parse(
            "INSERT INTO kv (k, v) VALUES ('a', 1) \
             ON CONFLICT (k) DO UPDATE SET v = excluded.v RETURNING *"
        ),
        "InsertStmt[kv](ColumnList(Identifier[k] Identifier[v]) \
         ValuesStmt(ValuesRow(StringLiteral[a] NumberLiteral[1])) \
         OnConflictClause[UPDATE](ColumnList(Identifier[k]) \
         SetClause(Assignment[v](ColumnRef[v|excluded]))) ReturningClause(Star))"
    );
    with_root("INSERT INTO kv VALUES (1) ON CONFLICT DO NOTHING", |root| {
        let clause = root.find_child(NodeKind::OnConflictClause).unwrap();
        assert_eq!(clause.text(), Some("NOTHING"));
        assert_eq!(clause.child_count(), 0);
    });
}

#[test]
fn insert_conflict_resolution() {
    with_root("INSERT OR IGNORE INTO t VALUES (1)", |root| {
        assert_eq!(
            kinds(root),
            [NodeKind::OnConflictClause, NodeKind::ValuesStmt]
        );
        assert_eq!(root.first_child().unwrap().text(), Some("IGNORE"));
    });
    with_root("REPLACE INTO main.t VALUES (1)", |root| {
        assert_eq!(root.kind(), NodeKind::InsertStmt);
        assert_eq!(root.secondary(), Some("main"));
        assert_eq!(root.first_child().unwrap().text(), Some("REPLACE"));
    });
}

#[test]
fn update_with_where() {
    assert_eq!(
        parse("UPDATE users SET name = 'x', visits = visits + 1 WHERE id = 7"),
        "UpdateStmt(TableRef[users] SetClause(Assignment[name](StringLiteral[x]) \
         Assignment[visits](BinaryExpr[+](Identifier[visits] NumberLiteral[1]))) \
         WhereClause(BinaryExpr[=](ColumnRef[id] NumberLiteral[7])))"
    );
}

#[test]
fn update_from_and_row_assignment() {
    with_root(
        "UPDATE t AS x SET (a, b) = (1, 2) FROM s WHERE x.id = s.id RETURNING x.a",
        |root| {
            assert_eq!(
                kinds(root),
                [
                    NodeKind::TableRef,
                    NodeKind::SetClause,
                    NodeKind::FromClause,
                    NodeKind::WhereClause,
                    NodeKind::ReturningClause
                ]
            );
            assert_eq!(root.first_child().unwrap().alias(), Some("x"));
            let assignment = find_all(root, NodeKind::Assignment)[0];
            assert_eq!(
                kinds(assignment),
                [NodeKind::ColumnList, NodeKind::RowExpr]
            );
        },
    );
}

#[test]
fn delete_with_returning() {
    assert_eq!(
        parse("DELETE FROM sessions WHERE expires < 100 RETURNING id"),
        "DeleteStmt(TableRef[sessions] WhereClause(BinaryExpr[<](ColumnRef[expires] \
         NumberLiteral[100])) ReturningClause(ColumnRef[id]))"
    );
    with_root("DELETE FROM a USING b, c WHERE a.id = b.id", |root| {
        let using = root.find_child(NodeKind::UsingClause).unwrap();
        assert_eq!(using.child_count(), 2);
    });
}

#[test]
fn cte_before_dml() {
    with_root(
        "WITH old AS (SELECT id FROM s) DELETE FROM t WHERE id IN (SELECT id FROM old)",
        |root| {
            assert_eq!(root.kind(), NodeKind::DeleteStmt);
            assert_eq!(
                kinds(root),
                [
                    NodeKind::CteClause,
                    NodeKind::TableRef,
                    NodeKind::WhereClause
                ]
            );
        },
    );
    with_root(
        "WITH n AS (SELECT 1 AS v) INSERT INTO t SELECT v FROM n",
        |root| {
            assert_eq!(root.kind(), NodeKind::InsertStmt);
            assert_eq!(root.first_child().unwrap().kind(), NodeKind::CteClause);
        },
    );
}

#[test]
fn create_table() {
    assert_eq!(
        parse("CREATE TABLE t (id INT PRIMARY KEY, body TEXT NOT NULL DEFAULT 'none')"),
        "CreateTableStmt[t](ColumnDef[id](DataType[INT] ColumnConstraint[PRIMARY KEY]) \
         ColumnDef[body](DataType[TEXT] ColumnConstraint[NOT NULL] \
         ColumnConstraint[DEFAULT](StringLiteral[none])))"
    );
    with_root(
        "CREATE TEMP TABLE IF NOT EXISTS app.events (\
           id INTEGER, \
           user_id INTEGER REFERENCES users (id) ON DELETE CASCADE, \
           CONSTRAINT pk PRIMARY KEY (id), \
           CHECK (id > 0)\
         ) WITHOUT ROWID",
        |root| {
            assert_eq!(root.text(), Some("events"));
            assert_eq!(root.secondary(), Some("app"));
            assert!(root.has_flag(NodeFlags::TEMPORARY | NodeFlags::IF_NOT_EXISTS));
            let constraints: Vec<_> = find_all(root, NodeKind::TableConstraint)
                .iter()
                .map(|c| (c.text().unwrap(), c.secondary()))
                .collect();
            assert_eq!(constraints, [("PRIMARY KEY", Some("pk")), ("CHECK", None)]);
            let action = find_all(root, NodeKind::ReferentialAction)[0];
            assert_eq!(action.text(), Some("ON DELETE CASCADE"));
        },
    );
}

#[test]
fn create_index_and_view() {
    assert_eq!(
        parse("CREATE INDEX idx ON t (a)"),
        "CreateIndexStmt[idx](TableRef[t] IndexedColumn[a](Identifier[a]))"
    );
    with_root("CREATE UNIQUE INDEX u ON t (lower(email), id DESC)", |root| {
        assert!(root.has_flag(NodeFlags::UNIQUE));
        let columns = find_all(root, NodeKind::IndexedColumn);
        assert_eq!(columns[0].text(), None);
        assert_eq!(
            columns[0].first_child().unwrap().kind(),
            NodeKind::FunctionCall
        );
        assert!(columns[1].has_flag(NodeFlags::DESC));
    });
    with_root("CREATE OR REPLACE VIEW v AS SELECT id FROM t", |root| {
        assert_eq!(root.kind(), NodeKind::CreateViewStmt);
        assert!(root.has_flag(NodeFlags::OR_REPLACE));
        assert_eq!(kinds(root), [NodeKind::SelectStmt]);
    });
}

#[test]
fn create_trigger() {
    with_root(
        "CREATE TRIGGER audit AFTER INSERT ON orders FOR EACH ROW \
         BEGIN INSERT INTO log VALUES (1); DELETE FROM queue; END",
        |root| {
            assert_eq!(root.kind(), NodeKind::CreateTriggerStmt);
            assert_eq!(root.text(), Some("audit"));
            assert_eq!(root.secondary(), Some("AFTER INSERT"));
            let body = root.find_child(NodeKind::TriggerBody).unwrap();
            assert_eq!(
                kinds(body),
                [NodeKind::InsertStmt, NodeKind::DeleteStmt]
            );
        },
    );
}

#[test]
fn alter_and_drop() {
    assert_eq!(
        parse("ALTER TABLE t RENAME TO u"),
        "AlterTableStmt[t](AlterAction[RENAME TO](Identifier[u]))"
    );
    with_root("ALTER TABLE t ADD COLUMN c INT NOT NULL", |root| {
        let action = root.first_child().unwrap();
        assert_eq!(action.text(), Some("ADD COLUMN"));
        assert_eq!(action.first_child().unwrap().kind(), NodeKind::ColumnDef);
    });
    assert_eq!(parse("DROP VIEW IF EXISTS v"), "DropStmt[|VIEW](TableRef[v])");
    with_root("DROP VIEW IF EXISTS v", |root| {
        assert!(root.has_flag(NodeFlags::IF_EXISTS));
    });
    assert_eq!(
        parse("TRUNCATE TABLE a, b"),
        "TruncateStmt(TableRef[a] TableRef[b])"
    );
}

#[test]
fn transaction_statements() {
    for (sql, text) in [
        ("BEGIN", "BEGIN"),
        ("BEGIN IMMEDIATE TRANSACTION", "BEGIN"),
        ("START TRANSACTION", "BEGIN"),
        ("COMMIT", "COMMIT"),
        ("END", "COMMIT"),
        ("ROLLBACK", "ROLLBACK"),
    ] {
        with_root(sql, |root| {
            assert_eq!(root.kind(), NodeKind::TransactionStmt, "{sql}");
            assert_eq!(root.text(), Some(text), "{sql}");
        });
    }
    with_root("ROLLBACK TO SAVEPOINT sp1", |root| {
        assert_eq!(root.text(), Some("ROLLBACK"));
        assert_eq!(root.secondary(), Some("sp1"));
    });
    with_root("SAVEPOINT sp1", |root| {
        assert_eq!(root.text(), Some("SAVEPOINT"));
        assert_eq!(root.secondary(), Some("sp1"));
    });
}

#[test]
fn explain_wraps_statement() {
    with_root("EXPLAIN QUERY PLAN SELECT * FROM t", |root| {
        assert_eq!(root.kind(), NodeKind::ExplainStmt);
        assert_eq!(root.text(), Some("EXPLAIN QUERY PLAN"));
        assert_eq!(kinds(root), [NodeKind::SelectStmt]);
    });
}

#[test]
fn set_and_utility_statements() {
    with_root("SET search_path = public", |root| {
        assert_eq!(root.kind(), NodeKind::SetStmt);
        assert_eq!(root.text(), Some("search_path"));
    });
    with_root("PRAGMA foreign_keys = 1", |root| {
        assert_eq!(root.kind(), NodeKind::UtilityStmt);
        assert_eq!(root.text(), Some("PRAGMA"));
        assert_eq!(root.secondary(), Some("foreign_keys"));
    });
    with_root("VACUUM", |root| {
        assert_eq!(root.kind(), NodeKind::UtilityStmt);
        assert_eq!(root.text(), Some("VACUUM"));
    });
    with_root("SHOW ALL", |root| {
        assert_eq!(root.secondary(), Some("ALL"));
    });
}
