//! Structural checks applied to a finished tree in strict mode.

use super::error::{ParseError, ParseErrorKind};
use crate::ast::{Node, NodeKind};

/// SELECT clauses that are meaningless without a FROM clause.
const FROM_DEPENDENT: [(NodeKind, &str); 4] = [
    (NodeKind::WhereClause, "WHERE"),
    (NodeKind::GroupByClause, "GROUP BY"),
    (NodeKind::HavingClause, "HAVING"),
    (NodeKind::OrderByClause, "ORDER BY"),
];

/// Validates one statement tree.
///
/// Checks that every SELECT using WHERE, GROUP BY, HAVING or ORDER BY also
/// has a FROM clause, that every join names a table or subquery, and that
/// `paren_depth` (the cursor's running depth after the statement) is zero.
/// A join without ON or USING is accepted.
pub(crate) fn validate(root: Node<'_>, paren_depth: i32) -> Result<(), ParseError> {
    if paren_depth != 0 {
        return Err(ParseError::new(
            ParseErrorKind::Validation,
            format!("parenthesis depth is {paren_depth} at end of statement"),
            root.span(),
        ));
    }

    for node in root.descendants() {
        match node.kind() {
            NodeKind::SelectStmt => check_select(node)?,
            NodeKind::JoinClause => check_join(node)?,
            _ => {}
        }
    }
    Ok(())
}

fn check_select(select: Node<'_>) -> Result<(), ParseError> {
    if select.find_child(NodeKind::FromClause).is_some() {
        return Ok(());
    }
    for (kind, clause) in FROM_DEPENDENT {
        if let Some(node) = select.find_child(kind) {
            return Err(ParseError::new(
                ParseErrorKind::Validation,
                format!("{clause} clause requires a FROM clause"),
                node.span(),
            ));
        }
    }
    Ok(())
}

fn check_join(join: Node<'_>) -> Result<(), ParseError> {
    let has_operand = join
        .children()
        .any(|c| !matches!(c.kind(), NodeKind::JoinCondition | NodeKind::UsingClause));
    if has_operand {
        Ok(())
    } else {
        let join_type = join.text().unwrap_or("JOIN");
        Err(ParseError::new(
            ParseErrorKind::Validation,
            format!("{join_type} requires a table or subquery"),
            join.span(),
        ))
    }
}
