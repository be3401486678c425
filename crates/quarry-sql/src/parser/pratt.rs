//! Operator precedence table for the Pratt expression parser.
//!
//! Tiers, lowest to highest binding:
//!
//! 1. `OR`
//! 2. `AND`, `|`, `&`, `^`, `<<`, `>>`
//! 3. `BETWEEN`, `IN`, `LIKE`, `IS`, `NOT LIKE/IN/BETWEEN`, `||`
//! 4. `=`, `<>`, `<`, `<=`, `>`, `>=`
//! 5. `+`, `-`
//! 6. `*`, `/`, `%`
//!
//! Bitwise operators share the `AND` tier and `||` shares the predicate tier.
//! Prefix operators and the postfix `::` cast bind tighter than any binary
//! operator.

use crate::lexer::{Keyword, TokenKind};

pub const PREC_OR: u8 = 1;
pub const PREC_AND: u8 = 2;
pub const PREC_PREDICATE: u8 = 3;
pub const PREC_COMPARISON: u8 = 4;
pub const PREC_ADDITIVE: u8 = 5;
pub const PREC_MULTIPLICATIVE: u8 = 6;
/// Operand precedence of unary `-`, `+` and `~`.
pub const PREC_UNARY: u8 = 7;
/// Postfix `::` cast.
pub const PREC_CAST: u8 = 8;

/// Marks operators borrowed from other languages (`==`, `===`, `!==`).
///
/// Strict mode rejects them; otherwise they end the expression like any
/// non-operator token.
pub const INVALID_PRECEDENCE: u8 = u8::MAX;

/// Infix precedence of `kind`, or `None` if it does not continue an
/// expression.
///
/// `NOT` only counts as infix when it prefixes `LIKE`, `IN` or `BETWEEN`, so
/// the following token is needed as well.
#[must_use]
pub const fn infix_precedence(kind: &TokenKind, next: &TokenKind) -> Option<u8> {
    match kind {
        TokenKind::Keyword(Keyword::Or) => Some(PREC_OR),

        TokenKind::Keyword(Keyword::And)
        | TokenKind::BitOr
        | TokenKind::BitAnd
        | TokenKind::BitXor
        | TokenKind::LeftShift
        | TokenKind::RightShift => Some(PREC_AND),

        TokenKind::Keyword(Keyword::Between | Keyword::In | Keyword::Like | Keyword::Is)
        | TokenKind::Concat => Some(PREC_PREDICATE),

        TokenKind::Keyword(Keyword::Not) => match next {
            TokenKind::Keyword(Keyword::Like | Keyword::In | Keyword::Between) => {
                Some(PREC_PREDICATE)
            }
            _ => None,
        },

        TokenKind::Eq
        | TokenKind::NotEq
        | TokenKind::Lt
        | TokenKind::LtEq
        | TokenKind::Gt
        | TokenKind::GtEq => Some(PREC_COMPARISON),

        TokenKind::Plus | TokenKind::Minus => Some(PREC_ADDITIVE),

        TokenKind::Star | TokenKind::Slash | TokenKind::Percent => Some(PREC_MULTIPLICATIVE),

        TokenKind::DoubleColon => Some(PREC_CAST),

        TokenKind::EqEq | TokenKind::EqEqEq | TokenKind::NotEqEq => Some(INVALID_PRECEDENCE),

        _ => None,
    }
}

/// Returns true for the six comparison operators, which may take an
/// `ANY`/`ALL`/`SOME` quantifier on their right side.
#[must_use]
pub const fn is_comparison(kind: &TokenKind) -> bool {
    matches!(
        kind,
        TokenKind::Eq
            | TokenKind::NotEq
            | TokenKind::Lt
            | TokenKind::LtEq
            | TokenKind::Gt
            | TokenKind::GtEq
    )
}

/// Spelling stored on a `BinaryExpr` node.
#[must_use]
pub const fn operator_text(kind: &TokenKind) -> &'static str {
    match kind {
        TokenKind::Keyword(kw) => kw.as_str(),
        other => other.symbol(),
    }
}
