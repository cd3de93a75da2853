//! SQL token types.
//!
//! Every token carries a discriminant, the raw surface text, a 1-based
//! line/column, and byte offsets into the source. Keywords get their own
//! variants so the parser matches on them in O(1); the keyword table below
//! is the single process-wide source of truth and is immutable.

use serde::Serialize;
use sqlprism_ast::IntervalUnit;

/// A single token produced by the lexer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Token {
    /// The token discriminant.
    pub kind: TokenKind,
    /// Raw surface text (unquoted/unescaped for strings and identifiers).
    pub text: String,
    /// Line number (1-based) at the start of the token.
    pub line: u32,
    /// Column number (1-based) at the start of the token.
    pub column: u32,
    /// Byte offset of the first character (inclusive).
    pub start: usize,
    /// Byte offset one past the last character (exclusive).
    pub end: usize,
}

impl Token {
    /// The text shown in diagnostics for this token.
    #[must_use]
    pub fn describe(&self) -> &str {
        if self.kind == TokenKind::Eof {
            "end of input"
        } else {
            &self.text
        }
    }
}

/// Token discriminant.
///
/// Organized by category: literal classes, trivia, punctuation, operators,
/// and keywords. The literal value itself lives in [`Token::text`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum TokenKind {
    // === Literal classes ===
    /// Numeric literal: `42`, `3.14`, `1e-3`.
    Number,
    /// String literal (single-quoted), text holds the unescaped content.
    String,
    /// Identifier (bare, double-quoted, or backtick-quoted).
    Identifier,
    /// `TRUE` / `FALSE`.
    Boolean,
    /// The keyword `NULL`.
    Null,

    // === Trivia (emitted only on request) ===
    Whitespace,
    Newline,
    Comment,

    // === Punctuation ===
    Semicolon,
    Comma,
    Dot,
    LeftParen,
    RightParen,
    LeftBracket,
    RightBracket,

    // === Operators ===
    Eq,      // `=`
    NotEq,   // `!=`
    LtGt,    // `<>`
    Lt,      // `<`
    Gt,      // `>`
    LtEq,    // `<=`
    GtEq,    // `>=`
    Plus,
    Minus,
    Star,
    Slash,
    Percent,
    Concat, // `||`

    // === Statement / clause keywords ===
    KwSelect,
    KwFrom,
    KwWhere,
    KwGroup,
    KwBy,
    KwHaving,
    KwOrder,
    KwAsc,
    KwDesc,
    KwLimit,
    KwOffset,
    KwInsert,
    KwInto,
    KwValues,
    KwUpdate,
    KwSet,
    KwDelete,
    KwWith,
    KwRecursive,
    KwAs,
    KwDistinct,
    KwUnion,
    KwAll,
    KwAny,

    // === Join keywords ===
    KwJoin,
    KwInner,
    KwLeft,
    KwRight,
    KwFull,
    KwOuter,
    KwCross,
    KwOn,

    // === Logic / predicate keywords ===
    KwAnd,
    KwOr,
    KwNot,
    KwIn,
    KwBetween,
    KwLike,
    KwIlike,
    KwIs,
    KwExists,
    KwCase,
    KwWhen,
    KwThen,
    KwElse,
    KwEnd,

    // === Window keywords ===
    KwOver,
    KwPartition,
    KwRows,
    KwRange,
    KwUnbounded,
    KwPreceding,
    KwFollowing,
    KwCurrent,
    KwRow,

    // === Interval / date-part keywords ===
    KwInterval,
    KwExtract,
    KwYear,
    KwMonth,
    KwDay,
    KwHour,
    KwMinute,
    KwSecond,
    KwDate,
    KwTime,
    KwTimestamp,

    // === Function-name keywords ===
    KwCount,
    KwSum,
    KwAvg,
    KwMin,
    KwMax,
    KwGroupConcat,
    KwRowNumber,
    KwRank,
    KwDenseRank,
    KwCoalesce,
    KwNullif,
    KwUpper,
    KwLower,
    KwLength,
    KwRound,
    KwSubstring,
    KwTrim,
    KwNow,

    // === Special ===
    /// End of input; always the final token.
    Eof,
}

impl TokenKind {
    /// Case-insensitive keyword lookup against canonical upper-case
    /// spellings. `TRUE`/`FALSE` map to [`TokenKind::Boolean`] and `NULL`
    /// to [`TokenKind::Null`].
    #[must_use]
    pub fn lookup_keyword(s: &str) -> Option<Self> {
        match s.to_ascii_uppercase().as_str() {
            "SELECT" => Some(Self::KwSelect),
            "FROM" => Some(Self::KwFrom),
            "WHERE" => Some(Self::KwWhere),
            "GROUP" => Some(Self::KwGroup),
            "BY" => Some(Self::KwBy),
            "HAVING" => Some(Self::KwHaving),
            "ORDER" => Some(Self::KwOrder),
            "ASC" => Some(Self::KwAsc),
            "DESC" => Some(Self::KwDesc),
            "LIMIT" => Some(Self::KwLimit),
            "OFFSET" => Some(Self::KwOffset),
            "INSERT" => Some(Self::KwInsert),
            "INTO" => Some(Self::KwInto),
            "VALUES" => Some(Self::KwValues),
            "UPDATE" => Some(Self::KwUpdate),
            "SET" => Some(Self::KwSet),
            "DELETE" => Some(Self::KwDelete),
            "WITH" => Some(Self::KwWith),
            "RECURSIVE" => Some(Self::KwRecursive),
            "AS" => Some(Self::KwAs),
            "DISTINCT" => Some(Self::KwDistinct),
            "UNION" => Some(Self::KwUnion),
            "ALL" => Some(Self::KwAll),
            "ANY" => Some(Self::KwAny),
            "JOIN" => Some(Self::KwJoin),
            "INNER" => Some(Self::KwInner),
            "LEFT" => Some(Self::KwLeft),
            "RIGHT" => Some(Self::KwRight),
            "FULL" => Some(Self::KwFull),
            "OUTER" => Some(Self::KwOuter),
            "CROSS" => Some(Self::KwCross),
            "ON" => Some(Self::KwOn),
            "AND" => Some(Self::KwAnd),
            "OR" => Some(Self::KwOr),
            "NOT" => Some(Self::KwNot),
            "IN" => Some(Self::KwIn),
            "BETWEEN" => Some(Self::KwBetween),
            "LIKE" => Some(Self::KwLike),
            "ILIKE" => Some(Self::KwIlike),
            "IS" => Some(Self::KwIs),
            "EXISTS" => Some(Self::KwExists),
            "CASE" => Some(Self::KwCase),
            "WHEN" => Some(Self::KwWhen),
            "THEN" => Some(Self::KwThen),
            "ELSE" => Some(Self::KwElse),
            "END" => Some(Self::KwEnd),
            "OVER" => Some(Self::KwOver),
            "PARTITION" => Some(Self::KwPartition),
            "ROWS" => Some(Self::KwRows),
            "RANGE" => Some(Self::KwRange),
            "UNBOUNDED" => Some(Self::KwUnbounded),
            "PRECEDING" => Some(Self::KwPreceding),
            "FOLLOWING" => Some(Self::KwFollowing),
            "CURRENT" => Some(Self::KwCurrent),
            "ROW" => Some(Self::KwRow),
            "INTERVAL" => Some(Self::KwInterval),
            "EXTRACT" => Some(Self::KwExtract),
            "YEAR" => Some(Self::KwYear),
            "MONTH" => Some(Self::KwMonth),
            "DAY" => Some(Self::KwDay),
            "HOUR" => Some(Self::KwHour),
            "MINUTE" => Some(Self::KwMinute),
            "SECOND" => Some(Self::KwSecond),
            "DATE" => Some(Self::KwDate),
            "TIME" => Some(Self::KwTime),
            "TIMESTAMP" => Some(Self::KwTimestamp),
            "COUNT" => Some(Self::KwCount),
            "SUM" => Some(Self::KwSum),
            "AVG" => Some(Self::KwAvg),
            "MIN" => Some(Self::KwMin),
            "MAX" => Some(Self::KwMax),
            "GROUP_CONCAT" => Some(Self::KwGroupConcat),
            "ROW_NUMBER" => Some(Self::KwRowNumber),
            "RANK" => Some(Self::KwRank),
            "DENSE_RANK" => Some(Self::KwDenseRank),
            "COALESCE" => Some(Self::KwCoalesce),
            "NULLIF" => Some(Self::KwNullif),
            "UPPER" => Some(Self::KwUpper),
            "LOWER" => Some(Self::KwLower),
            "LENGTH" => Some(Self::KwLength),
            "ROUND" => Some(Self::KwRound),
            "SUBSTRING" => Some(Self::KwSubstring),
            "TRIM" => Some(Self::KwTrim),
            "NOW" => Some(Self::KwNow),
            "TRUE" | "FALSE" => Some(Self::Boolean),
            "NULL" => Some(Self::Null),
            _ => None,
        }
    }

    /// Whether a token of this kind may serve as a column/table alias.
    ///
    /// Besides plain identifiers, the date-part and function-name keywords
    /// are legitimate alias spellings (`SELECT created AS year`).
    #[must_use]
    pub const fn is_aliasable(self) -> bool {
        matches!(
            self,
            Self::Identifier
                | Self::KwYear
                | Self::KwMonth
                | Self::KwDay
                | Self::KwHour
                | Self::KwMinute
                | Self::KwSecond
                | Self::KwDate
                | Self::KwTime
                | Self::KwTimestamp
                | Self::KwCount
                | Self::KwSum
                | Self::KwAvg
                | Self::KwMin
                | Self::KwMax
                | Self::KwGroupConcat
                | Self::KwRowNumber
                | Self::KwRank
                | Self::KwDenseRank
                | Self::KwCoalesce
                | Self::KwNullif
                | Self::KwUpper
                | Self::KwLower
                | Self::KwLength
                | Self::KwRound
                | Self::KwSubstring
                | Self::KwTrim
                | Self::KwNow
        )
    }

    /// Whether a token of this kind may open a function call or column
    /// reference in expression position.
    #[must_use]
    pub const fn can_start_function(self) -> bool {
        matches!(
            self,
            Self::Identifier
                | Self::KwExtract
                | Self::KwDate
                | Self::KwTime
                | Self::KwTimestamp
                | Self::KwCount
                | Self::KwSum
                | Self::KwAvg
                | Self::KwMin
                | Self::KwMax
                | Self::KwGroupConcat
                | Self::KwRowNumber
                | Self::KwRank
                | Self::KwDenseRank
                | Self::KwCoalesce
                | Self::KwNullif
                | Self::KwUpper
                | Self::KwLower
                | Self::KwLength
                | Self::KwRound
                | Self::KwSubstring
                | Self::KwTrim
                | Self::KwNow
                | Self::KwYear
                | Self::KwMonth
                | Self::KwDay
                | Self::KwHour
                | Self::KwMinute
                | Self::KwSecond
        )
    }

    /// The interval/date-part unit this keyword names, if any.
    #[must_use]
    pub const fn date_part(self) -> Option<IntervalUnit> {
        match self {
            Self::KwYear => Some(IntervalUnit::Year),
            Self::KwMonth => Some(IntervalUnit::Month),
            Self::KwDay => Some(IntervalUnit::Day),
            Self::KwHour => Some(IntervalUnit::Hour),
            Self::KwMinute => Some(IntervalUnit::Minute),
            Self::KwSecond => Some(IntervalUnit::Second),
            _ => None,
        }
    }

    /// Whether this is a trivia kind (filtered out before parsing).
    #[must_use]
    pub const fn is_trivia(self) -> bool {
        matches!(self, Self::Whitespace | Self::Newline | Self::Comment)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keyword_lookup_is_case_insensitive() {
        assert_eq!(TokenKind::lookup_keyword("select"), Some(TokenKind::KwSelect));
        assert_eq!(TokenKind::lookup_keyword("SELECT"), Some(TokenKind::KwSelect));
        assert_eq!(TokenKind::lookup_keyword("SeLeCt"), Some(TokenKind::KwSelect));
        assert_eq!(TokenKind::lookup_keyword("users"), None);
    }

    #[test]
    fn boolean_and_null_are_literal_kinds() {
        assert_eq!(TokenKind::lookup_keyword("true"), Some(TokenKind::Boolean));
        assert_eq!(TokenKind::lookup_keyword("FALSE"), Some(TokenKind::Boolean));
        assert_eq!(TokenKind::lookup_keyword("null"), Some(TokenKind::Null));
    }

    #[test]
    fn date_parts_are_aliasable() {
        assert!(TokenKind::KwYear.is_aliasable());
        assert!(TokenKind::KwCount.is_aliasable());
        assert!(!TokenKind::KwSelect.is_aliasable());
        assert!(!TokenKind::KwFrom.is_aliasable());
    }

    #[test]
    fn date_part_mapping() {
        assert_eq!(TokenKind::KwMonth.date_part(), Some(IntervalUnit::Month));
        assert_eq!(TokenKind::KwCount.date_part(), None);
    }

    #[test]
    fn describe_eof() {
        let token = Token {
            kind: TokenKind::Eof,
            text: String::new(),
            line: 1,
            column: 1,
            start: 0,
            end: 0,
        };
        assert_eq!(token.describe(), "end of input");
    }
}
