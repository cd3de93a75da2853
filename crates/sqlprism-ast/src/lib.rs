//! SQL Abstract Syntax Tree node types for sqlprism.
//!
//! The parser produces a tree of these nodes for every accepted statement.
//! Ownership is strictly tree-shaped: parents own children, and
//! column→table references are symbolic names rather than pointers, so no
//! cycles can exist. Nodes are immutable once built and safe to share
//! across threads.
//!
//! Every node derives [`serde::Serialize`] so callers can dump a parse
//! result to a generic tree form, and implements [`std::fmt::Display`]
//! (see `display.rs`) to render readable SQL text.

mod display;
pub mod walk;

use serde::Serialize;

// ---------------------------------------------------------------------------
// Statements
// ---------------------------------------------------------------------------

/// A single parsed SQL statement, the top-level AST node.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Statement {
    Select(Box<SelectStatement>),
    Union(Box<UnionStatement>),
    Insert(InsertStatement),
    Update(UpdateStatement),
    Delete(DeleteStatement),
}

impl Statement {
    /// The statement kind as an upper-case SQL word (`"SELECT"`, `"UNION"`, …).
    #[must_use]
    pub const fn kind_name(&self) -> &'static str {
        match self {
            Self::Select(_) => "SELECT",
            Self::Union(_) => "UNION",
            Self::Insert(_) => "INSERT",
            Self::Update(_) => "UPDATE",
            Self::Delete(_) => "DELETE",
        }
    }
}

impl From<Query> for Statement {
    fn from(query: Query) -> Self {
        match query {
            Query::Select(select) => Self::Select(select),
            Query::Union(union) => Self::Union(union),
        }
    }
}

/// A query expression: a lone SELECT or a UNION chain.
///
/// UNION chains are right-associative: the left side of a [`UnionStatement`]
/// is always a plain SELECT, while the right side may itself be a chain.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Query {
    Select(Box<SelectStatement>),
    Union(Box<UnionStatement>),
}

impl Query {
    /// The SELECT at the head of this query (leftmost in a UNION chain).
    #[must_use]
    pub fn head_select(&self) -> &SelectStatement {
        match self {
            Self::Select(select) => select,
            Self::Union(union) => union.left.head_select(),
        }
    }
}

/// A `SELECT` statement.
///
/// `from` may be absent (`SELECT 'x' AS a`). When this SELECT is an inner
/// member of a UNION chain it carries no `order_by`/`limit`; those live on
/// the outermost node only.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SelectStatement {
    /// Common table expressions introduced by `WITH`.
    pub with: Option<WithClause>,
    /// Whether `DISTINCT` was present.
    pub distinct: bool,
    /// The select list, in source order.
    pub columns: Vec<SelectItem>,
    /// The `FROM` clause.
    pub from: Option<FromClause>,
    /// The `WHERE` condition, stored bare (no wrapper node).
    pub where_clause: Option<Expr>,
    /// `GROUP BY` expressions.
    pub group_by: Vec<Expr>,
    /// The `HAVING` condition.
    pub having: Option<Expr>,
    /// `ORDER BY` items.
    pub order_by: Vec<OrderByItem>,
    /// The `LIMIT` clause.
    pub limit: Option<LimitClause>,
}

impl SelectStatement {
    /// A SELECT with every optional part absent.
    #[must_use]
    pub fn bare(columns: Vec<SelectItem>) -> Self {
        Self {
            with: None,
            distinct: false,
            columns,
            from: None,
            where_clause: None,
            group_by: Vec::new(),
            having: None,
            order_by: Vec::new(),
            limit: None,
        }
    }
}

/// A `UNION` / `UNION ALL` of two queries.
///
/// `order_by` and `limit` apply to the whole chain and are only populated
/// on the outermost node.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UnionStatement {
    /// Common table expressions, attached to the outermost node of a chain.
    pub with: Option<WithClause>,
    pub left: Query,
    pub right: Query,
    /// True for `UNION ALL`.
    pub all: bool,
    pub order_by: Vec<OrderByItem>,
    pub limit: Option<LimitClause>,
}

/// A `WITH` clause: `WITH [RECURSIVE] cte [, cte]*`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WithClause {
    pub recursive: bool,
    pub ctes: Vec<Cte>,
}

/// A single common table expression: `name [(col, …)] AS (query)`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Cte {
    pub name: String,
    /// Optional explicit column-name list.
    pub columns: Vec<String>,
    pub query: Query,
}

/// An `INSERT INTO … VALUES …` statement.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InsertStatement {
    pub table: TableRef,
    /// Optional explicit column-name list.
    pub columns: Vec<String>,
    /// One entry per parenthesized value row.
    pub rows: Vec<Vec<Expr>>,
}

/// An `UPDATE … SET …` statement.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UpdateStatement {
    pub table: TableRef,
    pub assignments: Vec<Assignment>,
    pub where_clause: Option<Expr>,
}

/// A single `column = expr` assignment in an UPDATE.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Assignment {
    pub column: String,
    pub value: Expr,
}

/// A `DELETE FROM …` statement.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DeleteStatement {
    pub table: TableRef,
    pub where_clause: Option<Expr>,
}

// ---------------------------------------------------------------------------
// FROM clause, table references, joins
// ---------------------------------------------------------------------------

/// The `FROM` clause: base tables plus a run of joins.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FromClause {
    /// Comma-separated base table references.
    pub tables: Vec<TableRef>,
    /// Joins, in source order.
    pub joins: Vec<JoinClause>,
}

/// A table source: a named table or a parenthesized subquery.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum TableRef {
    Table {
        name: String,
        alias: Option<String>,
        schema: Option<String>,
    },
    Subquery {
        query: Box<Query>,
        alias: Option<String>,
    },
}

impl TableRef {
    /// A named table with no alias or schema.
    #[must_use]
    pub fn named(name: impl Into<String>) -> Self {
        Self::Table {
            name: name.into(),
            alias: None,
            schema: None,
        }
    }

    /// The table name, if this is a named table.
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        match self {
            Self::Table { name, .. } => Some(name),
            Self::Subquery { .. } => None,
        }
    }

    /// The alias, whichever variant carries it.
    #[must_use]
    pub fn alias(&self) -> Option<&str> {
        match self {
            Self::Table { alias, .. } | Self::Subquery { alias, .. } => alias.as_deref(),
        }
    }
}

/// A single join: `<kind> JOIN <table> [ON <expr>]`.
///
/// `CROSS` joins carry no `on` condition; every other kind does.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct JoinClause {
    pub kind: JoinKind,
    pub table: TableRef,
    pub on: Option<Expr>,
}

/// The join kind, preserving the surface spelling (`LEFT` vs `LEFT OUTER`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum JoinKind {
    Inner,
    Left,
    LeftOuter,
    Right,
    RightOuter,
    Full,
    FullOuter,
    Cross,
}

// ---------------------------------------------------------------------------
// Ordering and limits
// ---------------------------------------------------------------------------

/// One `ORDER BY` item.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OrderByItem {
    pub expr: Expr,
    pub direction: SortDirection,
}

/// Sort direction; `ASC` when unspecified.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

/// A `LIMIT count [OFFSET offset]` clause.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LimitClause {
    pub count: Expr,
    pub offset: Option<Expr>,
}

// ---------------------------------------------------------------------------
// Select list
// ---------------------------------------------------------------------------

/// One item in the select list: `*` or an aliased expression.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum SelectItem {
    Wildcard,
    Expr { expr: Expr, alias: Option<String> },
}

// ---------------------------------------------------------------------------
// Expressions
// ---------------------------------------------------------------------------

/// An expression node.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Expr {
    /// A literal constant.
    Literal(Literal),

    /// A column reference, possibly table-qualified.
    Column(ColumnRef),

    /// `left op right`. A comparison may carry an `ANY`/`ALL` quantifier,
    /// in which case `right` is a subquery and the operator renders as
    /// `"<op> ANY"` / `"<op> ALL"`.
    Binary {
        left: Box<Expr>,
        op: BinaryOp,
        quantifier: Option<Quantifier>,
        right: Box<Expr>,
    },

    /// `op expr`, including `EXISTS (subquery)`.
    Unary { op: UnaryOp, expr: Box<Expr> },

    /// An ordinary or aggregate function call (no `OVER`).
    Function(FunctionCall),

    /// A function call followed by an `OVER (…)` window specification.
    WindowFunction { call: FunctionCall, over: OverClause },

    /// `CASE [operand] WHEN … THEN … [ELSE …] END`. At least one WHEN.
    Case {
        operand: Option<Box<Expr>>,
        whens: Vec<WhenClause>,
        else_expr: Option<Box<Expr>>,
    },

    /// `INTERVAL <value> [unit]`; the unit defaults to `DAY`.
    Interval { value: Box<Expr>, unit: IntervalUnit },

    /// A parenthesized subquery used as an expression or table source.
    Subquery {
        query: Box<Query>,
        alias: Option<String>,
    },

    /// The right-hand side of `BETWEEN`: `low AND high`.
    BetweenRange { low: Box<Expr>, high: Box<Expr> },

    /// The right-hand side of the list form of `IN`.
    ValuesList(Vec<Expr>),
}

impl Expr {
    /// Build a binary node with no quantifier.
    #[must_use]
    pub fn binary(left: Self, op: BinaryOp, right: Self) -> Self {
        Self::Binary {
            left: Box::new(left),
            op,
            quantifier: None,
            right: Box::new(right),
        }
    }

    /// Build a quantified comparison (`left op ANY (subquery)`).
    #[must_use]
    pub fn quantified(left: Self, op: BinaryOp, quantifier: Quantifier, subquery: Self) -> Self {
        Self::Binary {
            left: Box::new(left),
            op,
            quantifier: Some(quantifier),
            right: Box::new(subquery),
        }
    }

    /// Build a unary node.
    #[must_use]
    pub fn unary(op: UnaryOp, expr: Self) -> Self {
        Self::Unary {
            op,
            expr: Box::new(expr),
        }
    }

    /// Build an unquantified column reference.
    #[must_use]
    pub fn column(name: impl Into<String>) -> Self {
        Self::Column(ColumnRef::bare(name))
    }

    /// A numeric literal, split integer/float on the presence of `.`.
    #[must_use]
    pub fn number(text: &str) -> Self {
        if text.contains('.') || text.contains(['e', 'E']) {
            Self::Literal(Literal::Float(text.parse().unwrap_or(f64::NAN)))
        } else {
            match text.parse::<i64>() {
                Ok(n) => Self::Literal(Literal::Integer(n)),
                Err(_) => Self::Literal(Literal::Float(text.parse().unwrap_or(f64::NAN))),
            }
        }
    }
}

/// A literal value.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Literal {
    Integer(i64),
    Float(f64),
    String(String),
    Boolean(bool),
    Null,
    /// The `*` argument of `COUNT(*)`.
    Star,
}

/// A reference to a column, possibly qualified with a table name or alias.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct ColumnRef {
    /// Optional table (or alias) qualifier.
    pub table: Option<String>,
    /// Column name.
    pub column: String,
}

impl ColumnRef {
    /// An unqualified column reference.
    #[must_use]
    pub fn bare(column: impl Into<String>) -> Self {
        Self {
            table: None,
            column: column.into(),
        }
    }

    /// A table-qualified column reference.
    #[must_use]
    pub fn qualified(table: impl Into<String>, column: impl Into<String>) -> Self {
        Self {
            table: Some(table.into()),
            column: column.into(),
        }
    }
}

/// Binary operators, lowest-precedence first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum BinaryOp {
    Or,
    And,
    Eq,
    NotEq,
    Lt,
    Gt,
    LtEq,
    GtEq,
    Like,
    ILike,
    In,
    Between,
    Is,
    IsNot,
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Concat,
}

impl BinaryOp {
    /// Whether this operator is one of `=`, `<`, `>`, `<=`, `>=`, `!=`,
    /// the set that admits an `ANY`/`ALL` quantifier.
    #[must_use]
    pub const fn is_comparison(self) -> bool {
        matches!(
            self,
            Self::Eq | Self::NotEq | Self::Lt | Self::Gt | Self::LtEq | Self::GtEq
        )
    }
}

/// `ANY` / `ALL` following a comparison operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Quantifier {
    Any,
    All,
}

/// Unary prefix operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum UnaryOp {
    Not,
    Neg,
    Plus,
    Exists,
}

/// A function call: `name(args)`, optionally `DISTINCT`, optionally the
/// `EXTRACT(field FROM source)` special form (two args, `extract` set).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FunctionCall {
    pub name: String,
    pub args: Vec<Expr>,
    pub distinct: bool,
    pub extract: bool,
}

impl FunctionCall {
    /// An ordinary call with defaulted flags.
    #[must_use]
    pub fn new(name: impl Into<String>, args: Vec<Expr>) -> Self {
        Self {
            name: name.into(),
            args,
            distinct: false,
            extract: false,
        }
    }
}

/// A `WHEN condition THEN result` arm of a CASE expression.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WhenClause {
    pub condition: Expr,
    pub result: Expr,
}

/// Units accepted by `INTERVAL` literals and frame bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum IntervalUnit {
    Year,
    Month,
    Day,
    Hour,
    Minute,
    Second,
}

impl IntervalUnit {
    /// Case-insensitive lookup from a surface spelling.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_uppercase().as_str() {
            "YEAR" => Some(Self::Year),
            "MONTH" => Some(Self::Month),
            "DAY" => Some(Self::Day),
            "HOUR" => Some(Self::Hour),
            "MINUTE" => Some(Self::Minute),
            "SECOND" => Some(Self::Second),
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Window specifications
// ---------------------------------------------------------------------------

/// The `OVER (…)` clause of a window function.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct OverClause {
    pub partition_by: Vec<Expr>,
    pub order_by: Vec<OrderByItem>,
    pub frame: Option<FrameSpec>,
}

/// A window frame: `ROWS|RANGE` plus bounds.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FrameSpec {
    pub kind: FrameKind,
    pub start: FrameBound,
    /// Absent for the single-bound syntax.
    pub end: Option<FrameBound>,
}

/// Frame unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum FrameKind {
    Rows,
    Range,
}

/// A window frame boundary.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum FrameBound {
    UnboundedPreceding,
    UnboundedFollowing,
    CurrentRow,
    /// `<expr> PRECEDING|FOLLOWING` (numeric offset).
    Offset {
        value: Box<Expr>,
        direction: FrameDirection,
    },
    /// `INTERVAL <value> <unit> PRECEDING|FOLLOWING`.
    Interval {
        value: Box<Expr>,
        unit: IntervalUnit,
        direction: FrameDirection,
    },
}

/// Which side of the current row a bound lies on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum FrameDirection {
    Preceding,
    Following,
}
