//! Token types produced by the lexer.

use super::Span;

macro_rules! keywords {
    ($($group:literal => { $($variant:ident = $text:literal),+ $(,)? })+) => {
        /// SQL keywords recognized by the lexer.
        ///
        /// Words missing from this table (`TRUNCATE`, `EXPLAIN`, `PRAGMA`, ...)
        /// reach the parser as identifiers and are matched by text.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum Keyword {
            $($($variant,)+)+
        }

        impl Keyword {
            /// Looks up a keyword, ignoring ASCII case.
            #[must_use]
            #[allow(clippy::should_implement_trait)]
            pub fn from_str(s: &str) -> Option<Self> {
                if s.len() > MAX_KEYWORD_LEN {
                    return None;
                }
                match s.to_ascii_uppercase().as_str() {
                    $($($text => Some(Self::$variant),)+)+
                    _ => None,
                }
            }

            /// Returns the canonical upper-case spelling.
            #[must_use]
            pub const fn as_str(&self) -> &'static str {
                match self {
                    $($(Self::$variant => $text,)+)+
                }
            }
        }
    };
}

const MAX_KEYWORD_LEN: usize = 16;

keywords! {
    "query" => {
        Select = "SELECT", From = "FROM", Where = "WHERE", Order = "ORDER", By = "BY",
        Group = "GROUP", Having = "HAVING", Limit = "LIMIT", Offset = "OFFSET",
        Distinct = "DISTINCT", All = "ALL", As = "AS", With = "WITH", Recursive = "RECURSIVE",
        Grouping = "GROUPING", Sets = "SETS", Cube = "CUBE", Rollup = "ROLLUP",
    }
    "joins" => {
        Join = "JOIN", Inner = "INNER", Left = "LEFT", Right = "RIGHT", Full = "FULL",
        Outer = "OUTER", Cross = "CROSS", Natural = "NATURAL", On = "ON", Using = "USING",
    }
    "set operations" => {
        Union = "UNION", Intersect = "INTERSECT", Except = "EXCEPT",
    }
    "dml" => {
        Insert = "INSERT", Into = "INTO", Values = "VALUES", Update = "UPDATE", Set = "SET",
        Delete = "DELETE", Returning = "RETURNING", Conflict = "CONFLICT", Do = "DO",
        Nothing = "NOTHING", Replace = "REPLACE", Abort = "ABORT", Rollback = "ROLLBACK",
        Fail = "FAIL", Ignore = "IGNORE",
    }
    "ddl" => {
        Create = "CREATE", Drop = "DROP", Alter = "ALTER", Table = "TABLE", Index = "INDEX",
        View = "VIEW", Database = "DATABASE", Schema = "SCHEMA", Trigger = "TRIGGER",
        Column = "COLUMN", Add = "ADD", Rename = "RENAME", To = "TO", If = "IF",
        Temporary = "TEMPORARY", Temp = "TEMP", Before = "BEFORE", After = "AFTER",
        Instead = "INSTEAD", Of = "OF", For = "FOR", Each = "EACH",
    }
    "constraints" => {
        Primary = "PRIMARY", Key = "KEY", Foreign = "FOREIGN", References = "REFERENCES",
        Unique = "UNIQUE", Check = "CHECK", Default = "DEFAULT", Constraint = "CONSTRAINT",
        Cascade = "CASCADE", Restrict = "RESTRICT", Autoincrement = "AUTOINCREMENT",
        Collate = "COLLATE",
    }
    "operators" => {
        And = "AND", Or = "OR", Not = "NOT", In = "IN", Between = "BETWEEN", Like = "LIKE",
        Is = "IS", Null = "NULL", True = "TRUE", False = "FALSE", Exists = "EXISTS",
        Any = "ANY", Some = "SOME",
    }
    "ordering" => {
        Asc = "ASC", Desc = "DESC", Nulls = "NULLS", First = "FIRST", Last = "LAST",
    }
    "functions" => {
        Count = "COUNT", Sum = "SUM", Avg = "AVG", Min = "MIN", Max = "MAX",
        Case = "CASE", When = "WHEN", Then = "THEN", Else = "ELSE", End = "END",
        Cast = "CAST", Extract = "EXTRACT", Coalesce = "COALESCE", Nullif = "NULLIF",
    }
    "types" => {
        Int = "INT", Integer = "INTEGER", Smallint = "SMALLINT", Bigint = "BIGINT",
        Real = "REAL", Double = "DOUBLE", Float = "FLOAT", Decimal = "DECIMAL",
        Numeric = "NUMERIC", Char = "CHAR", Varchar = "VARCHAR", Text = "TEXT",
        Blob = "BLOB", Boolean = "BOOLEAN", Date = "DATE", Time = "TIME",
        Timestamp = "TIMESTAMP", Datetime = "DATETIME",
    }
    "transactions" => {
        Begin = "BEGIN", Commit = "COMMIT", Transaction = "TRANSACTION",
    }
    "windows" => {
        Over = "OVER", Partition = "PARTITION", Window = "WINDOW", Rows = "ROWS",
        Range = "RANGE", Unbounded = "UNBOUNDED", Preceding = "PRECEDING",
        Following = "FOLLOWING", Current = "CURRENT", Row = "ROW",
    }
}

impl Keyword {
    /// Returns true if the keyword may also be used as a table, column or
    /// function name.
    #[must_use]
    pub const fn is_non_reserved(&self) -> bool {
        matches!(
            self,
            Self::Count
                | Self::Sum
                | Self::Avg
                | Self::Min
                | Self::Max
                | Self::Coalesce
                | Self::Nullif
                | Self::Int
                | Self::Integer
                | Self::Smallint
                | Self::Bigint
                | Self::Real
                | Self::Double
                | Self::Float
                | Self::Decimal
                | Self::Numeric
                | Self::Char
                | Self::Varchar
                | Self::Text
                | Self::Blob
                | Self::Boolean
                | Self::Date
                | Self::Time
                | Self::Timestamp
                | Self::Datetime
                | Self::First
                | Self::Last
                | Self::Key
                | Self::Row
                | Self::Rows
                | Self::Range
                | Self::Temp
                | Self::Temporary
                | Self::Replace
                | Self::Abort
                | Self::Fail
                | Self::Ignore
                | Self::Conflict
                | Self::Autoincrement
                | Self::Database
                | Self::Schema
                | Self::Trigger
                | Self::View
                | Self::Nulls
                | Self::Partition
                | Self::Current
                | Self::Unbounded
                | Self::Preceding
                | Self::Following
                | Self::Transaction
                | Self::Recursive
                | Self::Cascade
                | Self::Restrict
                | Self::Do
                | Self::Nothing
                | Self::Before
                | Self::After
                | Self::Instead
                | Self::Each
                | Self::Column
                | Self::Add
                | Self::Rename
                | Self::Grouping
                | Self::Sets
                | Self::Cube
                | Self::Rollup
                | Self::If
                | Self::Begin
                | Self::Commit
                | Self::Window
        )
    }
}

/// The kind of token.
#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    // Literals
    /// Integer literal (e.g., 42)
    Integer(i64),
    /// Float literal (e.g., 3.14)
    Float(f64),
    /// String literal with quotes removed and `''` unescaped
    String(String),
    /// Blob literal (e.g., X'1234')
    Blob(Vec<u8>),

    // Identifiers and keywords
    /// Bare or quoted identifier
    Identifier(String),
    /// SQL keyword
    Keyword(Keyword),

    // Operators
    /// +
    Plus,
    /// -
    Minus,
    /// *
    Star,
    /// /
    Slash,
    /// %
    Percent,
    /// =
    Eq,
    /// != or <>
    NotEq,
    /// <
    Lt,
    /// <=
    LtEq,
    /// >
    Gt,
    /// >=
    GtEq,
    /// ||
    Concat,
    /// &
    BitAnd,
    /// |
    BitOr,
    /// ^
    BitXor,
    /// ~
    BitNot,
    /// <<
    LeftShift,
    /// >>
    RightShift,
    /// `==`, not valid SQL
    EqEq,
    /// `===`, not valid SQL
    EqEqEq,
    /// `!==`, not valid SQL
    NotEqEq,

    // Delimiters
    /// (
    LeftParen,
    /// )
    RightParen,
    /// [
    LeftBracket,
    /// ]
    RightBracket,
    /// ,
    Comma,
    /// ;
    Semicolon,
    /// .
    Dot,
    /// :
    Colon,
    /// ::
    DoubleColon,
    /// ?
    Question,
    /// @
    At,

    // Special
    /// End of input
    Eof,
    /// Invalid/unknown token
    Error(String),
}

/// Coarse token classes, as seen by consumers that do not care about the
/// individual operator or delimiter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenCategory {
    Keyword,
    Identifier,
    Number,
    String,
    Operator,
    Delimiter,
    EndOfFile,
    Invalid,
}

impl TokenKind {
    /// Classifies the token.
    #[must_use]
    pub const fn category(&self) -> TokenCategory {
        match self {
            Self::Integer(_) | Self::Float(_) => TokenCategory::Number,
            Self::String(_) | Self::Blob(_) => TokenCategory::String,
            Self::Identifier(_) => TokenCategory::Identifier,
            Self::Keyword(_) => TokenCategory::Keyword,
            Self::Plus
            | Self::Minus
            | Self::Star
            | Self::Slash
            | Self::Percent
            | Self::Eq
            | Self::NotEq
            | Self::Lt
            | Self::LtEq
            | Self::Gt
            | Self::GtEq
            | Self::Concat
            | Self::BitAnd
            | Self::BitOr
            | Self::BitXor
            | Self::BitNot
            | Self::LeftShift
            | Self::RightShift
            | Self::EqEq
            | Self::EqEqEq
            | Self::NotEqEq => TokenCategory::Operator,
            Self::LeftParen
            | Self::RightParen
            | Self::LeftBracket
            | Self::RightBracket
            | Self::Comma
            | Self::Semicolon
            | Self::Dot
            | Self::Colon
            | Self::DoubleColon
            | Self::Question
            | Self::At => TokenCategory::Delimiter,
            Self::Eof => TokenCategory::EndOfFile,
            Self::Error(_) => TokenCategory::Invalid,
        }
    }

    /// Short human-readable description used in error messages.
    #[must_use]
    pub fn describe(&self) -> String {
        match self {
            Self::Integer(n) => format!("number {n}"),
            Self::Float(f) => format!("number {f}"),
            Self::String(s) => format!("string '{s}'"),
            Self::Blob(_) => String::from("blob literal"),
            Self::Identifier(name) => format!("identifier '{name}'"),
            Self::Keyword(kw) => format!("keyword {}", kw.as_str()),
            Self::Eof => String::from("end of input"),
            Self::Error(msg) => msg.clone(),
            other => format!("'{}'", other.symbol()),
        }
    }

    /// Source spelling of operator and delimiter tokens.
    #[must_use]
    pub const fn symbol(&self) -> &'static str {
        match self {
            Self::Plus => "+",
            Self::Minus => "-",
            Self::Star => "*",
            Self::Slash => "/",
            Self::Percent => "%",
            Self::Eq => "=",
            Self::NotEq => "<>",
            Self::Lt => "<",
            Self::LtEq => "<=",
            Self::Gt => ">",
            Self::GtEq => ">=",
            Self::Concat => "||",
            Self::BitAnd => "&",
            Self::BitOr => "|",
            Self::BitXor => "^",
            Self::BitNot => "~",
            Self::LeftShift => "<<",
            Self::RightShift => ">>",
            Self::EqEq => "==",
            Self::EqEqEq => "===",
            Self::NotEqEq => "!==",
            Self::LeftParen => "(",
            Self::RightParen => ")",
            Self::LeftBracket => "[",
            Self::RightBracket => "]",
            Self::Comma => ",",
            Self::Semicolon => ";",
            Self::Dot => ".",
            Self::Colon => ":",
            Self::DoubleColon => "::",
            Self::Question => "?",
            Self::At => "@",
            _ => "",
        }
    }
}

/// A token with its location in the source.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    /// The kind of token.
    pub kind: TokenKind,
    /// Byte range in the source.
    pub span: Span,
    /// 1-based line of the first byte.
    pub line: u32,
    /// 1-based column (in characters) of the first byte.
    pub column: u32,
}

impl Token {
    /// Creates a new token.
    #[must_use]
    pub const fn new(kind: TokenKind, span: Span, line: u32, column: u32) -> Self {
        Self {
            kind,
            span,
            line,
            column,
        }
    }

    /// Returns true if this is an EOF token.
    #[must_use]
    pub const fn is_eof(&self) -> bool {
        matches!(self.kind, TokenKind::Eof)
    }

    /// Returns the keyword if this is a keyword token.
    #[must_use]
    pub const fn as_keyword(&self) -> Option<Keyword> {
        match &self.kind {
            TokenKind::Keyword(kw) => Some(*kw),
            _ => None,
        }
    }

    /// Coarse class of the token.
    #[must_use]
    pub const fn category(&self) -> TokenCategory {
        self.kind.category()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keyword_from_str_ignores_case() {
        assert_eq!(Keyword::from_str("SELECT"), Some(Keyword::Select));
        assert_eq!(Keyword::from_str("select"), Some(Keyword::Select));
        assert_eq!(Keyword::from_str("ReTuRnInG"), Some(Keyword::Returning));
        assert_eq!(Keyword::from_str("not_a_keyword"), None);
    }

    #[test]
    fn test_text_matched_words_are_not_keywords() {
        for word in ["TRUNCATE", "EXPLAIN", "PRAGMA", "SAVEPOINT", "VACUUM"] {
            assert_eq!(Keyword::from_str(word), None, "{word}");
        }
    }

    #[test]
    fn test_keyword_round_trips_through_as_str() {
        for kw in [Keyword::Select, Keyword::Natural, Keyword::Rollup, Keyword::Datetime] {
            assert_eq!(Keyword::from_str(kw.as_str()), Some(kw));
        }
    }

    #[test]
    fn test_non_reserved() {
        assert!(Keyword::Date.is_non_reserved());
        assert!(Keyword::Count.is_non_reserved());
        assert!(!Keyword::Select.is_non_reserved());
        assert!(!Keyword::From.is_non_reserved());
    }

    #[test]
    fn test_token_category() {
        assert_eq!(TokenKind::Integer(1).category(), TokenCategory::Number);
        assert_eq!(TokenKind::Concat.category(), TokenCategory::Operator);
        assert_eq!(TokenKind::Comma.category(), TokenCategory::Delimiter);
        assert_eq!(
            TokenKind::Keyword(Keyword::Select).category(),
            TokenCategory::Keyword
        );
        assert_eq!(TokenKind::Eof.category(), TokenCategory::EndOfFile);
    }

    #[test]
    fn test_token_as_keyword() {
        let select = Token::new(TokenKind::Keyword(Keyword::Select), Span::new(0, 6), 1, 1);
        let plus = Token::new(TokenKind::Plus, Span::new(0, 1), 1, 1);
        assert_eq!(select.as_keyword(), Some(Keyword::Select));
        assert_eq!(plus.as_keyword(), None);
        assert!(!select.is_eof());
    }
}
