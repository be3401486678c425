//! Tests for SELECT, set operations, CTEs and expressions.

mod common;
use common::*;

use quarry_sql::{NodeFlags, NodeKind};

/// Renders the first SELECT-list item of `SELECT {expr} FROM t`.
fn expr(expr: &str) -> String {
    let sql = format!("SELECT {expr} FROM t");
    with_root(&sql, |root| {
        let list = root.find_child(NodeKind::SelectList).unwrap();
        render(list.first_child().unwrap())
    })
}

#[test]
fn select_star_from_table() {
    assert_eq!(
        parse("SELECT * FROM users"),
        "SelectStmt(SelectList(Star) FromClause(TableRef[users]))"
    );
}

#[test]
fn select_all_clauses() {
    let sql = "SELECT DISTINCT dept, COUNT(*) AS n FROM emp GROUP BY dept \
               HAVING COUNT(*) > 5 ORDER BY n DESC LIMIT 10 OFFSET 20";
    assert_eq!(
        parse(sql),
        "SelectStmt(SelectList(ColumnRef[dept] FunctionCall[COUNT|n](Star)) \
         FromClause(TableRef[emp]) GroupByClause(ColumnRef[dept]) \
         HavingClause(BinaryExpr[>](FunctionCall[COUNT](Star) NumberLiteral[5])) \
         OrderByClause(OrderByItem(ColumnRef[n])) LimitClause(NumberLiteral[10]) \
         OffsetClause(NumberLiteral[20]))"
    );
    with_root(sql, |root| {
        assert!(root.has_flag(NodeFlags::DISTINCT));
        let item = find_all(root, NodeKind::OrderByItem)[0];
        assert!(item.has_flag(NodeFlags::DESC));
        let count = find_all(root, NodeKind::FunctionCall)[0];
        assert_eq!(count.alias(), Some("n"));
    });
}

#[test]
fn select_mysql_limit_form() {
    with_root("SELECT a FROM t LIMIT 5, 10", |root| {
        let limit = root.find_child(NodeKind::LimitClause).unwrap();
        let offset = root.find_child(NodeKind::OffsetClause).unwrap();
        assert_eq!(limit.first_child().unwrap().text(), Some("10"));
        assert_eq!(offset.first_child().unwrap().text(), Some("5"));
    });
}

#[test]
fn union_of_two_selects() {
    assert_eq!(
        parse("SELECT 1 UNION SELECT 2"),
        "Union(SelectStmt(SelectList(NumberLiteral[1])) SelectStmt(SelectList(NumberLiteral[2])))"
    );
}

#[test]
fn set_operations_are_right_nested() {
    with_root(
        "SELECT a FROM x INTERSECT SELECT a FROM y EXCEPT ALL SELECT a FROM z",
        |root| {
            assert_eq!(root.kind(), NodeKind::Intersect);
            let right = root.child(1).unwrap();
            assert_eq!(right.kind(), NodeKind::Except);
            assert!(right.has_flag(NodeFlags::ALL));
            assert!(!root.has_flag(NodeFlags::ALL));
        },
    );
}

#[test]
fn recursive_cte() {
    let sql = "WITH RECURSIVE h AS (SELECT 1 AS n UNION ALL SELECT n+1 FROM h WHERE n<5) \
               SELECT * FROM h";
    assert_eq!(
        parse(sql),
        "SelectStmt(CteClause(CteDefinition[h](Union(\
         SelectStmt(SelectList(NumberLiteral[1|n])) \
         SelectStmt(SelectList(BinaryExpr[+](ColumnRef[n] NumberLiteral[1])) \
         FromClause(TableRef[h]) \
         WhereClause(BinaryExpr[<](ColumnRef[n] NumberLiteral[5])))))) \
         SelectList(Star) FromClause(TableRef[h]))"
    );
    with_root(sql, |root| {
        let cte = root.first_child().unwrap();
        assert_eq!(cte.kind(), NodeKind::CteClause);
        assert!(cte.has_flag(NodeFlags::RECURSIVE));
        assert_eq!(cte.child_count(), 1);
        let body = cte.first_child().unwrap().first_child().unwrap();
        assert_eq!(body.kind(), NodeKind::Union);
        assert!(body.has_flag(NodeFlags::ALL));
    });
}

#[test]
fn cte_with_column_list() {
    assert_eq!(
        parse("WITH t (a, b) AS (VALUES (1, 2)) SELECT a FROM t"),
        "SelectStmt(CteClause(CteDefinition[t](ColumnList(Identifier[a] Identifier[b]) \
         ValuesStmt(ValuesRow(NumberLiteral[1] NumberLiteral[2])))) \
         SelectList(ColumnRef[a]) FromClause(TableRef[t]))"
    );
}

#[test]
fn join_with_aliases() {
    assert_eq!(
        parse(
            "SELECT u.name, o.total FROM users u \
             LEFT OUTER JOIN orders AS o ON o.user_id = u.id"
        ),
        "SelectStmt(SelectList(ColumnRef[name|u] ColumnRef[total|o]) \
         FromClause(TableRef[users|u] JoinClause[LEFT JOIN](TableRef[orders|o] \
         JoinCondition(BinaryExpr[=](ColumnRef[user_id|o] ColumnRef[id|u])))))"
    );
}

#[test]
fn join_variants() {
    with_root("SELECT * FROM a NATURAL JOIN b", |root| {
        let join = find_all(root, NodeKind::JoinClause)[0];
        assert_eq!(join.text(), Some("INNER JOIN"));
        assert!(join.has_flag(NodeFlags::NATURAL));
    });
    assert_eq!(
        parse("SELECT * FROM a JOIN b USING (id)"),
        "SelectStmt(SelectList(Star) FromClause(TableRef[a] \
         JoinClause[INNER JOIN](TableRef[b] UsingClause(ColumnRef[id]))))"
    );
    with_root("SELECT * FROM a CROSS JOIN b, c FULL JOIN d ON 1 = 1", |root| {
        let from = root.find_child(NodeKind::FromClause).unwrap();
        assert_eq!(
            kinds(from),
            [
                NodeKind::TableRef,
                NodeKind::JoinClause,
                NodeKind::TableRef,
                NodeKind::JoinClause
            ]
        );
        let texts: Vec<_> = find_all(root, NodeKind::JoinClause)
            .iter()
            .map(|j| j.text().unwrap())
            .collect();
        assert_eq!(texts, ["CROSS JOIN", "FULL JOIN"]);
    });
}

#[test]
fn qualified_table_alias_is_wrapped() {
    assert_eq!(
        parse("SELECT * FROM public.users AS u"),
        "SelectStmt(SelectList(Star) FromClause(AliasExpr[|u](TableRef[users|public])))"
    );
    with_root("SELECT * FROM public.users AS u", |root| {
        let alias = find_all(root, NodeKind::AliasExpr)[0];
        assert_eq!(alias.alias(), Some("u"));
        let table = alias.first_child().unwrap();
        assert_eq!(table.qualifier(), Some("public"));
        assert_eq!(table.alias(), None);
    });
}

#[test]
fn derived_table() {
    assert_eq!(
        parse("SELECT s.id FROM (SELECT id FROM t) AS s"),
        "SelectStmt(SelectList(ColumnRef[id|s]) FromClause(Subquery[|s](\
         SelectStmt(SelectList(ColumnRef[id]) FromClause(TableRef[t])))))"
    );
}

#[test]
fn grouping_sets() {
    with_root(
        "SELECT a, b FROM t GROUP BY GROUPING SETS ((a, b), (a), ()), ROLLUP (a)",
        |root| {
            let group = root.find_child(NodeKind::GroupByClause).unwrap();
            assert_eq!(
                render(group),
                "GroupByClause(GroupingElement[GROUPING SETS](RowExpr(ColumnRef[a] ColumnRef[b]) \
                 ColumnRef[a] RowExpr) GroupingElement[ROLLUP](ColumnRef[a]))"
            );
        },
    );
}

#[test]
fn standalone_values() {
    assert_eq!(
        parse("VALUES (1, 'a'), (2, 'b')"),
        "ValuesStmt(ValuesRow(NumberLiteral[1] StringLiteral[a]) \
         ValuesRow(NumberLiteral[2] StringLiteral[b]))"
    );
}

#[test]
fn expression_precedence() {
    assert_eq!(
        expr("a + b * c - d"),
        "BinaryExpr[-](BinaryExpr[+](ColumnRef[a] BinaryExpr[*](ColumnRef[b] ColumnRef[c])) \
         ColumnRef[d])"
    );
    assert_eq!(
        expr("NOT a = 1 AND b OR c"),
        "BinaryExpr[OR](BinaryExpr[AND](UnaryExpr[NOT](BinaryExpr[=](ColumnRef[a] \
         NumberLiteral[1])) ColumnRef[b]) ColumnRef[c])"
    );
    assert_eq!(
        expr("a || b = c"),
        "BinaryExpr[||](ColumnRef[a] BinaryExpr[=](ColumnRef[b] ColumnRef[c]))"
    );
}

#[test]
fn negative_literals_fold() {
    assert_eq!(expr("-5"), "NumberLiteral[-5]");
    assert_eq!(expr("-2.5"), "NumberLiteral[-2.5]");
    assert_eq!(expr("-x"), "UnaryExpr[-](ColumnRef[x])");
    assert_eq!(expr("3 - -1"), "BinaryExpr[-](NumberLiteral[3] NumberLiteral[-1])");
}

#[test]
fn predicates() {
    assert_eq!(
        expr("x NOT IN (1, 2)"),
        "InExpr[NOT IN](ColumnRef[x] NumberLiteral[1] NumberLiteral[2])"
    );
    assert_eq!(
        expr("x BETWEEN 1 AND 10"),
        "BetweenExpr[BETWEEN](ColumnRef[x] NumberLiteral[1] NumberLiteral[10])"
    );
    assert_eq!(
        expr("name NOT LIKE 'a%' ESCAPE '!'"),
        "LikeExpr[NOT LIKE](ColumnRef[name] StringLiteral[a%] StringLiteral[!])"
    );
    assert_eq!(expr("x IS NOT NULL"), "IsNullExpr(ColumnRef[x])");
    with_root("SELECT x IS NOT NULL FROM t", |root| {
        let is_null = find_all(root, NodeKind::IsNullExpr)[0];
        assert!(is_null.has_flag(NodeFlags::NOT));
    });
}

#[test]
fn subquery_expressions() {
    assert_eq!(
        expr("x = ANY (SELECT id FROM s)"),
        "BinaryExpr[=](ColumnRef[x] QuantifiedExpr[ANY](SelectStmt(SelectList(ColumnRef[id]) \
         FromClause(TableRef[s]))))"
    );
    assert_eq!(
        expr("EXISTS (SELECT 1 FROM s)"),
        "ExistsExpr(Subquery(SelectStmt(SelectList(NumberLiteral[1]) FromClause(TableRef[s]))))"
    );
    assert_eq!(
        expr("x IN (SELECT id FROM s)"),
        "InExpr[IN](ColumnRef[x] SelectStmt(SelectList(ColumnRef[id]) FromClause(TableRef[s])))"
    );
}

#[test]
fn case_cast_and_extract() {
    assert_eq!(
        expr("CASE WHEN x > 0 THEN 'pos' ELSE 'neg' END"),
        "CaseExpr(WhenClause(BinaryExpr[>](Identifier[x] NumberLiteral[0]) StringLiteral[pos]) \
         ElseClause(StringLiteral[neg]))"
    );
    assert_eq!(
        expr("CAST(price AS DECIMAL(10, 2))"),
        "CastExpr(ColumnRef[price] DataType[DECIMAL(10,2)])"
    );
    assert_eq!(
        expr("price::numeric(10,2)"),
        "CastExpr(ColumnRef[price] DataType[NUMERIC(10,2)])"
    );
    assert_eq!(
        expr("EXTRACT(year FROM created_at)"),
        "ExtractExpr[YEAR](ColumnRef[created_at])"
    );
}

#[test]
fn functions_and_windows() {
    assert_eq!(expr("COUNT(DISTINCT x)"), "FunctionCall[COUNT](Identifier[x])");
    assert_eq!(
        expr("row_number() OVER (PARTITION BY dept ORDER BY salary DESC)"),
        "FunctionCall[row_number](WindowSpec(PartitionByClause(ColumnRef[dept]) \
         OrderByClause(OrderByItem(ColumnRef[salary]))))"
    );
    with_root(
        "SELECT sum(x) OVER (ORDER BY d ROWS BETWEEN UNBOUNDED PRECEDING AND CURRENT ROW) FROM t",
        |root| {
            let frame = find_all(root, NodeKind::WindowFrame)[0];
            assert_eq!(frame.text(), Some("ROWS"));
            let bounds: Vec<_> = frame.children().map(|b| b.text().unwrap()).collect();
            assert_eq!(bounds, ["UNBOUNDED PRECEDING", "CURRENT ROW"]);
        },
    );
}

#[test]
fn literals_and_parameters() {
    assert_eq!(
        expr("? + :max_rows"),
        "BinaryExpr[+](Parameter[?] Parameter[max_rows])"
    );
    assert_eq!(expr("X'CAFE'"), "BlobLiteral[CAFE]");
    assert_eq!(expr("true"), "BooleanLiteral[TRUE]");
    assert_eq!(expr("NULL"), "NullLiteral[NULL]");
    assert_eq!(expr("(a, b)"), "RowExpr(ColumnRef[a] ColumnRef[b])");
    assert_eq!(expr("t.*"), "Star[|t]");
    assert_eq!(expr("s.t.c"), "ColumnRef[c|s.t]");
}

#[test]
fn permissive_select_without_from() {
    assert_eq!(
        parse_permissive("SELECT * WHERE id = 1"),
        "SelectStmt(SelectList(Star) WhereClause(BinaryExpr[=](ColumnRef[id] NumberLiteral[1])))"
    );
}
