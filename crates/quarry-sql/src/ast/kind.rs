//! Node kinds, flag bits and clause context hints.

use core::fmt;

/// Syntactic kind of an AST node.
///
/// The meaning of a node's `text`/`secondary` fields depends on its kind; see
/// the notes on each variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    // Statements
    SelectStmt,
    /// `text`: target table, `secondary`: schema.
    InsertStmt,
    UpdateStmt,
    DeleteStmt,
    CreateTableStmt,
    CreateIndexStmt,
    CreateViewStmt,
    /// `secondary`: `"BEFORE INSERT"`-style timing and event.
    CreateTriggerStmt,
    CreateSchemaStmt,
    AlterTableStmt,
    /// `secondary`: object type (`TABLE`, `INDEX`, ...).
    DropStmt,
    TruncateStmt,
    /// `text`: `BEGIN`, `COMMIT`, `ROLLBACK`, `SAVEPOINT` or `RELEASE`.
    TransactionStmt,
    /// `text`: `EXPLAIN`, `EXPLAIN QUERY PLAN` or `EXPLAIN ANALYZE`.
    ExplainStmt,
    ValuesStmt,
    /// `text`: variable name.
    SetStmt,
    /// `text`: upper-cased command (`PRAGMA`, `VACUUM`, ...).
    UtilityStmt,

    // Set operations; `ALL` is a flag.
    Union,
    Intersect,
    Except,

    // Query clauses
    CteClause,
    /// `text`: CTE name.
    CteDefinition,
    SelectList,
    FromClause,
    /// `text`: join type (`INNER JOIN`, `LEFT JOIN`, ...).
    JoinClause,
    JoinCondition,
    UsingClause,
    WhereClause,
    GroupByClause,
    /// `text`: `GROUPING SETS`, `CUBE` or `ROLLUP`.
    GroupingElement,
    HavingClause,
    OrderByClause,
    OrderByItem,
    LimitClause,
    OffsetClause,
    ColumnList,
    ValuesRow,
    SetClause,
    /// `text`: assigned column.
    Assignment,
    ReturningClause,
    /// `text`: resolution (`NOTHING`, `UPDATE`, or `REPLACE`/`IGNORE`/... for
    /// `INSERT OR ...`).
    OnConflictClause,
    WindowSpec,
    PartitionByClause,
    /// `text`: `ROWS` or `RANGE`.
    WindowFrame,
    /// `text`: e.g. `UNBOUNDED PRECEDING`, `CURRENT ROW`, `PRECEDING`.
    FrameBound,

    // DDL pieces
    /// `text`: column name.
    ColumnDef,
    /// `text`: normalized type name, e.g. `VARCHAR(20)`.
    DataType,
    /// `text`: constraint keyword(s), `secondary`: constraint name.
    ColumnConstraint,
    /// `text`: constraint keyword(s), `secondary`: constraint name.
    TableConstraint,
    /// `text`: indexed column name.
    IndexedColumn,
    /// `text`: action, e.g. `ADD COLUMN`, `RENAME TO`.
    AlterAction,
    TriggerBody,
    /// `text`: `ON DELETE CASCADE`-style referential action.
    ReferentialAction,

    // Expressions
    /// `text`: operator spelling.
    BinaryExpr,
    /// `text`: operator spelling.
    UnaryExpr,
    BetweenExpr,
    InExpr,
    /// `text`: `LIKE` or `NOT LIKE`.
    LikeExpr,
    IsNullExpr,
    /// `text`: `ANY`, `ALL` or `SOME`.
    QuantifiedExpr,
    CaseExpr,
    WhenClause,
    ElseClause,
    CastExpr,
    /// `text`: extracted field.
    ExtractExpr,
    ExistsExpr,
    /// `text`: function name.
    FunctionCall,
    Subquery,
    RowExpr,
    /// Carries an alias for a node whose `secondary` is already a qualifier.
    AliasExpr,

    // References and literals
    /// Bare name outside a column context.
    Identifier,
    /// `text`: column, `secondary`: qualifier.
    ColumnRef,
    /// `text`: table, `secondary`: schema.
    TableRef,
    /// `secondary`: qualifier for `t.*`.
    Star,
    NumberLiteral,
    StringLiteral,
    /// `text`: hex digits as written.
    BlobLiteral,
    BooleanLiteral,
    NullLiteral,
    /// `text`: `?` or the name of a `:name` placeholder.
    Parameter,
    /// `DEFAULT` used as a value.
    DefaultValue,
}

impl NodeKind {
    /// Returns the kind's name.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::SelectStmt => "SelectStmt",
            Self::InsertStmt => "InsertStmt",
            Self::UpdateStmt => "UpdateStmt",
            Self::DeleteStmt => "DeleteStmt",
            Self::CreateTableStmt => "CreateTableStmt",
            Self::CreateIndexStmt => "CreateIndexStmt",
            Self::CreateViewStmt => "CreateViewStmt",
            Self::CreateTriggerStmt => "CreateTriggerStmt",
            Self::CreateSchemaStmt => "CreateSchemaStmt",
            Self::AlterTableStmt => "AlterTableStmt",
            Self::DropStmt => "DropStmt",
            Self::TruncateStmt => "TruncateStmt",
            Self::TransactionStmt => "TransactionStmt",
            Self::ExplainStmt => "ExplainStmt",
            Self::ValuesStmt => "ValuesStmt",
            Self::SetStmt => "SetStmt",
            Self::UtilityStmt => "UtilityStmt",
            Self::Union => "Union",
            Self::Intersect => "Intersect",
            Self::Except => "Except",
            Self::CteClause => "CteClause",
            Self::CteDefinition => "CteDefinition",
            Self::SelectList => "SelectList",
            Self::FromClause => "FromClause",
            Self::JoinClause => "JoinClause",
            Self::JoinCondition => "JoinCondition",
            Self::UsingClause => "UsingClause",
            Self::WhereClause => "WhereClause",
            Self::GroupByClause => "GroupByClause",
            Self::GroupingElement => "GroupingElement",
            Self::HavingClause => "HavingClause",
            Self::OrderByClause => "OrderByClause",
            Self::OrderByItem => "OrderByItem",
            Self::LimitClause => "LimitClause",
            Self::OffsetClause => "OffsetClause",
            Self::ColumnList => "ColumnList",
            Self::ValuesRow => "ValuesRow",
            Self::SetClause => "SetClause",
            Self::Assignment => "Assignment",
            Self::ReturningClause => "ReturningClause",
            Self::OnConflictClause => "OnConflictClause",
            Self::WindowSpec => "WindowSpec",
            Self::PartitionByClause => "PartitionByClause",
            Self::WindowFrame => "WindowFrame",
            Self::FrameBound => "FrameBound",
            Self::ColumnDef => "ColumnDef",
            Self::DataType => "DataType",
            Self::ColumnConstraint => "ColumnConstraint",
            Self::TableConstraint => "TableConstraint",
            Self::IndexedColumn => "IndexedColumn",
            Self::AlterAction => "AlterAction",
            Self::TriggerBody => "TriggerBody",
            Self::ReferentialAction => "ReferentialAction",
            Self::BinaryExpr => "BinaryExpr",
            Self::UnaryExpr => "UnaryExpr",
            Self::BetweenExpr => "BetweenExpr",
            Self::InExpr => "InExpr",
            Self::LikeExpr => "LikeExpr",
            Self::IsNullExpr => "IsNullExpr",
            Self::QuantifiedExpr => "QuantifiedExpr",
            Self::CaseExpr => "CaseExpr",
            Self::WhenClause => "WhenClause",
            Self::ElseClause => "ElseClause",
            Self::CastExpr => "CastExpr",
            Self::ExtractExpr => "ExtractExpr",
            Self::ExistsExpr => "ExistsExpr",
            Self::FunctionCall => "FunctionCall",
            Self::Subquery => "Subquery",
            Self::RowExpr => "RowExpr",
            Self::AliasExpr => "AliasExpr",
            Self::Identifier => "Identifier",
            Self::ColumnRef => "ColumnRef",
            Self::TableRef => "TableRef",
            Self::Star => "Star",
            Self::NumberLiteral => "NumberLiteral",
            Self::StringLiteral => "StringLiteral",
            Self::BlobLiteral => "BlobLiteral",
            Self::BooleanLiteral => "BooleanLiteral",
            Self::NullLiteral => "NullLiteral",
            Self::Parameter => "Parameter",
            Self::DefaultValue => "DefaultValue",
        }
    }

    /// True for top-level statement kinds, set operations included.
    #[must_use]
    pub const fn is_statement(&self) -> bool {
        matches!(
            self,
            Self::SelectStmt
                | Self::InsertStmt
                | Self::UpdateStmt
                | Self::DeleteStmt
                | Self::CreateTableStmt
                | Self::CreateIndexStmt
                | Self::CreateViewStmt
                | Self::CreateTriggerStmt
                | Self::CreateSchemaStmt
                | Self::AlterTableStmt
                | Self::DropStmt
                | Self::TruncateStmt
                | Self::TransactionStmt
                | Self::ExplainStmt
                | Self::ValuesStmt
                | Self::SetStmt
                | Self::UtilityStmt
                | Self::Union
                | Self::Intersect
                | Self::Except
        )
    }

    /// True for `UNION`, `INTERSECT` and `EXCEPT`.
    #[must_use]
    pub const fn is_set_operation(&self) -> bool {
        matches!(self, Self::Union | Self::Intersect | Self::Except)
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Enclosing clause of a bare name, recorded on `Identifier`/`ColumnRef`
/// nodes for downstream analysis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(u8)]
pub enum ParseContext {
    #[default]
    Unknown = 0,
    SelectList = 1,
    FromClause = 2,
    WhereClause = 3,
    GroupByClause = 4,
    HavingClause = 5,
    OrderByClause = 6,
    JoinCondition = 7,
    CaseExpression = 8,
    FunctionArg = 9,
    Subquery = 10,
}

impl ParseContext {
    /// Decodes a stored hint byte. Unknown values map to `Unknown`.
    #[must_use]
    pub const fn from_u8(value: u8) -> Self {
        match value {
            1 => Self::SelectList,
            2 => Self::FromClause,
            3 => Self::WhereClause,
            4 => Self::GroupByClause,
            5 => Self::HavingClause,
            6 => Self::OrderByClause,
            7 => Self::JoinCondition,
            8 => Self::CaseExpression,
            9 => Self::FunctionArg,
            10 => Self::Subquery,
            _ => Self::Unknown,
        }
    }

    /// The six clauses in which a bare name is taken to be a column.
    #[must_use]
    pub const fn is_column_context(&self) -> bool {
        matches!(
            self,
            Self::SelectList
                | Self::WhereClause
                | Self::GroupByClause
                | Self::HavingClause
                | Self::OrderByClause
                | Self::JoinCondition
        )
    }
}

/// Per-node flag bits.
///
/// The lower 24 bits hold boolean modifiers; the upper byte holds the
/// [`ParseContext`] hint of `Identifier`/`ColumnRef` nodes.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct NodeFlags(u32);

impl NodeFlags {
    pub const NONE: Self = Self(0);
    pub const DISTINCT: Self = Self(1 << 0);
    pub const ALL: Self = Self(1 << 1);
    pub const HAS_ALIAS: Self = Self(1 << 2);
    pub const NOT: Self = Self(1 << 3);
    pub const DESC: Self = Self(1 << 4);
    pub const RECURSIVE: Self = Self(1 << 5);
    pub const NULLS_FIRST: Self = Self(1 << 6);
    pub const NULLS_LAST: Self = Self(1 << 7);
    pub const IF_NOT_EXISTS: Self = Self(1 << 8);
    pub const IF_EXISTS: Self = Self(1 << 9);
    pub const UNIQUE: Self = Self(1 << 10);
    pub const TEMPORARY: Self = Self(1 << 11);
    pub const OR_REPLACE: Self = Self(1 << 12);
    pub const CASCADE: Self = Self(1 << 13);
    pub const RESTRICT: Self = Self(1 << 14);
    pub const NATURAL: Self = Self(1 << 15);

    const HINT_SHIFT: u32 = 24;
    const FLAG_MASK: u32 = (1 << Self::HINT_SHIFT) - 1;

    const NAMES: [(Self, &'static str); 16] = [
        (Self::DISTINCT, "DISTINCT"),
        (Self::ALL, "ALL"),
        (Self::HAS_ALIAS, "HAS_ALIAS"),
        (Self::NOT, "NOT"),
        (Self::DESC, "DESC"),
        (Self::RECURSIVE, "RECURSIVE"),
        (Self::NULLS_FIRST, "NULLS_FIRST"),
        (Self::NULLS_LAST, "NULLS_LAST"),
        (Self::IF_NOT_EXISTS, "IF_NOT_EXISTS"),
        (Self::IF_EXISTS, "IF_EXISTS"),
        (Self::UNIQUE, "UNIQUE"),
        (Self::TEMPORARY, "TEMPORARY"),
        (Self::OR_REPLACE, "OR_REPLACE"),
        (Self::CASCADE, "CASCADE"),
        (Self::RESTRICT, "RESTRICT"),
        (Self::NATURAL, "NATURAL"),
    ];

    /// Raw bits, hint byte included.
    #[must_use]
    pub const fn bits(self) -> u32 {
        self.0
    }

    /// Returns true if every bit of `other` is set (the hint byte is ignored).
    #[must_use]
    pub const fn contains(self, other: Self) -> bool {
        let wanted = other.0 & Self::FLAG_MASK;
        self.0 & wanted == wanted
    }

    /// Sets the bits of `other`.
    pub fn insert(&mut self, other: Self) {
        self.0 |= other.0 & Self::FLAG_MASK;
    }

    /// The clause hint stored in the upper byte.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub const fn context_hint(self) -> ParseContext {
        ParseContext::from_u8((self.0 >> Self::HINT_SHIFT) as u8)
    }

    /// Replaces the clause hint.
    pub fn set_context_hint(&mut self, hint: ParseContext) {
        self.0 = (self.0 & Self::FLAG_MASK) | (u32::from(hint as u8) << Self::HINT_SHIFT);
    }
}

impl core::ops::BitOr for NodeFlags {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | (rhs.0 & Self::FLAG_MASK))
    }
}

impl fmt::Debug for NodeFlags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut set = f.debug_set();
        for (flag, name) in Self::NAMES {
            if self.contains(flag) {
                set.entry(&name);
            }
        }
        let hint = self.context_hint();
        if hint != ParseContext::Unknown {
            set.entry(&hint);
        }
        set.finish()
    }
}
