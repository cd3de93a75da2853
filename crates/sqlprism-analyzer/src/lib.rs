//! Structural analysis of SELECT statements.
//!
//! Walks a parsed SELECT and produces a flat, serializable description of
//! what the query does: WHERE predicates classified into semantic
//! categories, output fields, table sources, joins, grouping/ordering, and
//! a weighted complexity score. The walk is a plain structural recursion
//! over the AST; rendering of names and values reuses the AST `Display`
//! impls, with subqueries collapsed to a placeholder.

use serde::Serialize;
use sqlprism_ast::{
    BinaryOp, Expr, FromClause, JoinClause, Literal, Query, SelectItem, SelectStatement,
    SortDirection, Statement, TableRef, UnaryOp,
};

// ---------------------------------------------------------------------------
// Output model
// ---------------------------------------------------------------------------

/// The structured description of a SELECT query.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct QueryAnalysis {
    /// Flattened WHERE predicates.
    pub conditions: Vec<Condition>,
    /// One entry per select-list item.
    pub fields: Vec<FieldInfo>,
    /// Tables from the FROM clause and every join, in source order.
    pub tables: Vec<TableInfo>,
    /// Joins with rendered conditions.
    pub joins: Vec<JoinInfo>,
    /// ORDER BY items as `{field, direction}`.
    pub order_by: Vec<OrderByInfo>,
    /// GROUP BY field names.
    pub group_by: Vec<String>,
    /// LIMIT/OFFSET when both are literal.
    pub limit: Option<LimitInfo>,
}

/// A single WHERE predicate in `field operator value` form.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Condition {
    pub field: String,
    pub operator: String,
    pub value: String,
    pub kind: ConditionKind,
}

/// Semantic category of a WHERE predicate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ConditionKind {
    /// `=`, `!=`, `<>`.
    Equality,
    /// `<`, `>`, `<=`, `>=`.
    Comparison,
    /// `LIKE`, `ILIKE`.
    Pattern,
    /// `IN`.
    List,
    /// `BETWEEN`.
    Range,
    /// Everything else the classifier sees (`IS [NOT]`, arithmetic, …).
    Other,
}

/// A select-list entry.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldInfo {
    pub name: String,
    pub alias: Option<String>,
    pub kind: FieldKind,
    pub table: Option<String>,
    /// Rendered text for non-column items.
    pub expression: Option<String>,
    /// True for COUNT/SUM/AVG/MAX/MIN/GROUP_CONCAT calls.
    pub aggregate: bool,
}

/// What kind of thing a select-list entry is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldKind {
    Column,
    Function,
    Case,
    Expression,
}

/// A table source.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TableInfo {
    pub name: String,
    pub alias: Option<String>,
    pub schema: Option<String>,
}

/// A join with its rendered ON condition.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct JoinInfo {
    /// Join kind as written (`"LEFT"`, `"LEFT OUTER"`, `"CROSS"`, …).
    pub kind: String,
    pub table: String,
    pub alias: Option<String>,
    pub condition: Option<JoinCondition>,
}

/// A binary ON condition split into rendered sides.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct JoinCondition {
    pub left: String,
    pub operator: String,
    pub right: String,
}

/// One ORDER BY entry.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OrderByInfo {
    pub field: String,
    pub direction: SortDirection,
}

/// LIMIT/OFFSET, populated when the clause carries literal integers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LimitInfo {
    pub count: Option<i64>,
    pub offset: Option<i64>,
}

/// Weighted complexity of a query.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Complexity {
    pub score: u32,
    pub level: ComplexityLevel,
    /// Human-readable summary of each contributor.
    pub factors: Vec<String>,
}

/// Complexity bucket: ≤5 simple, ≤15 medium, else complex.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ComplexityLevel {
    Simple,
    Medium,
    Complex,
}

/// Function names treated as aggregates (upper-cased comparison).
const AGGREGATE_FUNCTIONS: &[&str] = &["COUNT", "SUM", "AVG", "MAX", "MIN", "GROUP_CONCAT"];

// ---------------------------------------------------------------------------
// Analysis
// ---------------------------------------------------------------------------

/// Analyze any statement.
///
/// Only SELECT statements get the full treatment; for everything else the
/// analysis fields stay empty but the tables are still populated (the
/// INSERT/UPDATE/DELETE target, or every FROM-level table of a UNION
/// chain).
#[must_use]
pub fn analyze_statement(stmt: &Statement) -> QueryAnalysis {
    match stmt {
        Statement::Select(select) => analyze_select(select),
        Statement::Union(union) => {
            let mut analysis = QueryAnalysis::default();
            union_tables(&union.left, &mut analysis.tables);
            union_tables(&union.right, &mut analysis.tables);
            analysis
        }
        Statement::Insert(insert) => target_only(&insert.table),
        Statement::Update(update) => target_only(&update.table),
        Statement::Delete(delete) => target_only(&delete.table),
    }
}

fn target_only(table: &TableRef) -> QueryAnalysis {
    QueryAnalysis {
        tables: vec![table_info(table)],
        ..QueryAnalysis::default()
    }
}

fn union_tables(query: &Query, out: &mut Vec<TableInfo>) {
    match query {
        Query::Select(select) => {
            if let Some(ref from) = select.from {
                collect_tables(from, out);
            }
        }
        Query::Union(union) => {
            union_tables(&union.left, out);
            union_tables(&union.right, out);
        }
    }
}

/// Produce the structured description of a SELECT statement.
#[must_use]
pub fn analyze_select(select: &SelectStatement) -> QueryAnalysis {
    let mut analysis = QueryAnalysis::default();

    if let Some(ref where_clause) = select.where_clause {
        flatten_conditions(where_clause, &mut analysis.conditions);
    }

    for item in &select.columns {
        analysis.fields.push(field_info(item));
    }

    if let Some(ref from) = select.from {
        collect_tables(from, &mut analysis.tables);
        for join in &from.joins {
            analysis.joins.push(join_info(join));
        }
    }

    for item in &select.order_by {
        analysis.order_by.push(OrderByInfo {
            field: render(&item.expr),
            direction: item.direction,
        });
    }

    for expr in &select.group_by {
        analysis.group_by.push(render(expr));
    }

    analysis.limit = select.limit.as_ref().map(|limit| LimitInfo {
        count: literal_int(&limit.count),
        offset: limit.offset.as_ref().and_then(literal_int),
    });

    analysis
}

/// Score an analysis: +2 per condition, +3 per table beyond the first,
/// +4 per join, +2 per aggregate field, +3 for grouping, +2 for ordering.
#[must_use]
pub fn complexity(analysis: &QueryAnalysis) -> Complexity {
    let mut score = 0u32;
    let mut factors = Vec::new();

    let conditions = analysis.conditions.len() as u32;
    if conditions > 0 {
        let points = conditions * 2;
        score += points;
        factors.push(format!("{conditions} filter condition(s) (+{points})"));
    }

    let tables = analysis.tables.len() as u32;
    if tables > 1 {
        let extra = tables - 1;
        let points = extra * 3;
        score += points;
        factors.push(format!("{extra} additional table(s) (+{points})"));
    }

    let joins = analysis.joins.len() as u32;
    if joins > 0 {
        let points = joins * 4;
        score += points;
        factors.push(format!("{joins} join(s) (+{points})"));
    }

    let aggregates = analysis.fields.iter().filter(|f| f.aggregate).count() as u32;
    if aggregates > 0 {
        let points = aggregates * 2;
        score += points;
        factors.push(format!("{aggregates} aggregate field(s) (+{points})"));
    }

    if !analysis.group_by.is_empty() {
        score += 3;
        factors.push("grouping (+3)".to_owned());
    }

    if !analysis.order_by.is_empty() {
        score += 2;
        factors.push("ordering (+2)".to_owned());
    }

    let level = if score <= 5 {
        ComplexityLevel::Simple
    } else if score <= 15 {
        ComplexityLevel::Medium
    } else {
        ComplexityLevel::Complex
    };

    Complexity {
        score,
        level,
        factors,
    }
}

// ---------------------------------------------------------------------------
// Conditions
// ---------------------------------------------------------------------------

/// Descend through AND/OR binaries and NOT unaries; every other binary
/// leaf becomes one condition.
fn flatten_conditions(expr: &Expr, out: &mut Vec<Condition>) {
    match expr {
        Expr::Binary {
            left,
            op: BinaryOp::And | BinaryOp::Or,
            right,
            ..
        } => {
            flatten_conditions(left, out);
            flatten_conditions(right, out);
        }
        Expr::Unary {
            op: UnaryOp::Not,
            expr,
        } => flatten_conditions(expr, out),
        Expr::Binary {
            left,
            op,
            quantifier,
            right,
        } => {
            let operator = match quantifier {
                Some(q) => format!("{op} {q}"),
                None => op.to_string(),
            };
            out.push(Condition {
                field: render(left),
                operator,
                value: render(right),
                kind: classify(*op),
            });
        }
        _ => {}
    }
}

const fn classify(op: BinaryOp) -> ConditionKind {
    match op {
        BinaryOp::Eq | BinaryOp::NotEq => ConditionKind::Equality,
        BinaryOp::Lt | BinaryOp::Gt | BinaryOp::LtEq | BinaryOp::GtEq => ConditionKind::Comparison,
        BinaryOp::Like | BinaryOp::ILike => ConditionKind::Pattern,
        BinaryOp::In => ConditionKind::List,
        BinaryOp::Between => ConditionKind::Range,
        _ => ConditionKind::Other,
    }
}

// ---------------------------------------------------------------------------
// Fields
// ---------------------------------------------------------------------------

fn field_info(item: &SelectItem) -> FieldInfo {
    let SelectItem::Expr { expr, alias } = item else {
        return FieldInfo {
            name: "*".to_owned(),
            alias: None,
            kind: FieldKind::Column,
            table: None,
            expression: None,
            aggregate: false,
        };
    };

    match expr {
        Expr::Column(col) => FieldInfo {
            name: col.column.clone(),
            alias: alias.clone(),
            kind: FieldKind::Column,
            table: col.table.clone(),
            expression: None,
            aggregate: false,
        },
        Expr::Function(call) | Expr::WindowFunction { call, .. } => FieldInfo {
            name: call.name.clone(),
            alias: alias.clone(),
            kind: FieldKind::Function,
            table: None,
            expression: Some(render(expr)),
            aggregate: is_aggregate(&call.name),
        },
        Expr::Case { .. } => FieldInfo {
            name: alias.clone().unwrap_or_else(|| "CASE".to_owned()),
            alias: alias.clone(),
            kind: FieldKind::Case,
            table: None,
            expression: Some(render(expr)),
            aggregate: false,
        },
        other => FieldInfo {
            name: render(other),
            alias: alias.clone(),
            kind: FieldKind::Expression,
            table: None,
            expression: Some(render(other)),
            aggregate: false,
        },
    }
}

fn is_aggregate(name: &str) -> bool {
    let upper = name.to_ascii_uppercase();
    AGGREGATE_FUNCTIONS.contains(&upper.as_str())
}

// ---------------------------------------------------------------------------
// Tables and joins
// ---------------------------------------------------------------------------

fn collect_tables(from: &FromClause, out: &mut Vec<TableInfo>) {
    for table in &from.tables {
        out.push(table_info(table));
    }
    for join in &from.joins {
        out.push(table_info(&join.table));
    }
}

fn table_info(table: &TableRef) -> TableInfo {
    match table {
        TableRef::Table {
            name,
            alias,
            schema,
        } => TableInfo {
            name: name.clone(),
            alias: alias.clone(),
            schema: schema.clone(),
        },
        TableRef::Subquery { alias, .. } => TableInfo {
            name: alias.clone().unwrap_or_else(|| "(subquery)".to_owned()),
            alias: alias.clone(),
            schema: None,
        },
    }
}

fn join_info(join: &JoinClause) -> JoinInfo {
    let info = table_info(&join.table);
    let condition = join.on.as_ref().and_then(|on| match on {
        Expr::Binary {
            left, op, right, ..
        } => Some(JoinCondition {
            left: render(left),
            operator: op.to_string(),
            right: render(right),
        }),
        _ => None,
    });
    JoinInfo {
        kind: join.kind.to_string(),
        table: info.name,
        alias: info.alias,
        condition,
    }
}

// ---------------------------------------------------------------------------
// Rendering helpers
// ---------------------------------------------------------------------------

/// Readable text for any expression; subqueries collapse to a placeholder.
fn render(expr: &Expr) -> String {
    match expr {
        Expr::Subquery { .. } => "(subquery)".to_owned(),
        other => other.to_string(),
    }
}

fn literal_int(expr: &Expr) -> Option<i64> {
    match expr {
        Expr::Literal(Literal::Integer(n)) => Some(*n),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlprism_ast::Statement;
    use sqlprism_parser::Parser;

    fn analyze(sql: &str) -> QueryAnalysis {
        let stmt = Parser::parse(sql, false).expect("parse should succeed");
        let Statement::Select(select) = stmt else {
            panic!("expected SELECT, got {stmt:?}");
        };
        analyze_select(&select)
    }

    #[test]
    fn classifies_condition_kinds() {
        let analysis = analyze(
            "SELECT * FROM users WHERE email IS NOT NULL \
             AND age BETWEEN 18 AND 65 AND name LIKE 'A%'",
        );
        let kinds: Vec<ConditionKind> = analysis.conditions.iter().map(|c| c.kind).collect();
        assert_eq!(
            kinds,
            vec![
                ConditionKind::Other,
                ConditionKind::Range,
                ConditionKind::Pattern,
            ]
        );
        assert_eq!(analysis.conditions[0].operator, "IS NOT");
        assert_eq!(analysis.conditions[1].value, "18 AND 65");
        assert_eq!(analysis.conditions[2].field, "name");
    }

    #[test]
    fn equality_and_list_kinds() {
        let analysis =
            analyze("SELECT * FROM t WHERE a = 1 AND b != 2 AND c IN (1, 2, 3) AND d > 0");
        let kinds: Vec<ConditionKind> = analysis.conditions.iter().map(|c| c.kind).collect();
        assert_eq!(
            kinds,
            vec![
                ConditionKind::Equality,
                ConditionKind::Equality,
                ConditionKind::List,
                ConditionKind::Comparison,
            ]
        );
        assert_eq!(analysis.conditions[2].value, "(1, 2, 3)");
    }

    #[test]
    fn descends_through_or_and_not() {
        let analysis = analyze("SELECT * FROM t WHERE NOT (a = 1 OR b = 2)");
        assert_eq!(analysis.conditions.len(), 2);
    }

    #[test]
    fn qualified_field_renders_table_dot_name() {
        let analysis = analyze("SELECT * FROM users u WHERE u.age >= 21");
        assert_eq!(analysis.conditions[0].field, "u.age");
        assert_eq!(analysis.conditions[0].operator, ">=");
    }

    #[test]
    fn fields_cover_all_kinds() {
        let analysis = analyze(
            "SELECT id, u.name AS n, COUNT(*) AS total, \
             CASE WHEN age < 18 THEN 'minor' ELSE 'adult' END AS bracket, \
             age + 1 \
             FROM users u",
        );
        let kinds: Vec<FieldKind> = analysis.fields.iter().map(|f| f.kind).collect();
        assert_eq!(
            kinds,
            vec![
                FieldKind::Column,
                FieldKind::Column,
                FieldKind::Function,
                FieldKind::Case,
                FieldKind::Expression,
            ]
        );
        assert_eq!(analysis.fields[1].table.as_deref(), Some("u"));
        assert_eq!(analysis.fields[1].alias.as_deref(), Some("n"));
        assert!(analysis.fields[2].aggregate);
        assert_eq!(analysis.fields[3].name, "bracket");
        assert_eq!(analysis.fields[4].expression.as_deref(), Some("age + 1"));
    }

    #[test]
    fn aggregate_detection_is_case_insensitive() {
        let analysis = analyze("SELECT count(id), Sum(total), upper(name) FROM t");
        let aggregates: Vec<bool> = analysis.fields.iter().map(|f| f.aggregate).collect();
        assert_eq!(aggregates, vec![true, true, false]);
    }

    #[test]
    fn tables_include_joined_tables() {
        let analysis = analyze(
            "SELECT * FROM users u LEFT JOIN orders o ON u.id = o.user_id",
        );
        let names: Vec<&str> = analysis.tables.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, vec!["users", "orders"]);
        assert_eq!(analysis.tables[0].alias.as_deref(), Some("u"));
    }

    #[test]
    fn join_condition_renders_sides() {
        let analysis = analyze(
            "SELECT * FROM users u LEFT OUTER JOIN orders o ON u.id = o.user_id",
        );
        assert_eq!(analysis.joins.len(), 1);
        let join = &analysis.joins[0];
        assert_eq!(join.kind, "LEFT OUTER");
        assert_eq!(join.table, "orders");
        let condition = join.condition.as_ref().expect("condition");
        assert_eq!(condition.left, "u.id");
        assert_eq!(condition.operator, "=");
        assert_eq!(condition.right, "o.user_id");
    }

    #[test]
    fn cross_join_has_no_condition() {
        let analysis = analyze("SELECT * FROM a CROSS JOIN b");
        assert_eq!(analysis.joins[0].kind, "CROSS");
        assert!(analysis.joins[0].condition.is_none());
    }

    #[test]
    fn order_group_limit() {
        let analysis = analyze(
            "SELECT dept, COUNT(*) FROM emp GROUP BY dept \
             ORDER BY dept DESC LIMIT 10 OFFSET 20",
        );
        assert_eq!(analysis.group_by, vec!["dept"]);
        assert_eq!(analysis.order_by.len(), 1);
        assert_eq!(analysis.order_by[0].field, "dept");
        assert_eq!(analysis.order_by[0].direction, SortDirection::Desc);
        assert_eq!(
            analysis.limit,
            Some(LimitInfo {
                count: Some(10),
                offset: Some(20),
            })
        );
    }

    #[test]
    fn subquery_condition_value_is_placeholder() {
        let analysis = analyze("SELECT * FROM t WHERE id IN (SELECT id FROM u)");
        assert_eq!(analysis.conditions[0].value, "(subquery)");
        assert_eq!(analysis.conditions[0].kind, ConditionKind::List);
    }

    #[test]
    fn simple_query_scores_simple() {
        let analysis = analyze("SELECT id, name FROM users WHERE active = TRUE");
        let complexity = complexity(&analysis);
        assert_eq!(complexity.score, 2);
        assert_eq!(complexity.level, ComplexityLevel::Simple);
        assert_eq!(complexity.factors.len(), 1);
    }

    #[test]
    fn joined_aggregate_query_scores_medium() {
        // 1 extra table (+3), 1 join (+4), 1 aggregate (+2), grouping (+3),
        // ordering (+2) = 14.
        let analysis = analyze(
            "SELECT u.name, COUNT(o.id) AS n FROM users u \
             LEFT JOIN orders o ON u.id = o.user_id \
             GROUP BY u.name ORDER BY n DESC",
        );
        let complexity = complexity(&analysis);
        assert_eq!(complexity.score, 14);
        assert_eq!(complexity.level, ComplexityLevel::Medium);
    }

    #[test]
    fn busy_query_scores_complex() {
        let analysis = analyze(
            "SELECT a.x, SUM(b.y), AVG(c.z) FROM a \
             JOIN b ON a.id = b.a_id \
             JOIN c ON b.id = c.b_id \
             WHERE a.x > 1 AND b.y < 2 AND c.z = 3 \
             GROUP BY a.x ORDER BY a.x",
        );
        let complexity = complexity(&analysis);
        assert!(complexity.score > 15, "score was {}", complexity.score);
        assert_eq!(complexity.level, ComplexityLevel::Complex);
    }

    #[test]
    fn empty_analysis_scores_zero() {
        let complexity = complexity(&QueryAnalysis::default());
        assert_eq!(complexity.score, 0);
        assert_eq!(complexity.level, ComplexityLevel::Simple);
        assert!(complexity.factors.is_empty());
    }

    #[test]
    fn non_select_statements_keep_tables_only() {
        let stmt = Parser::parse("INSERT INTO users (id) VALUES (1)", false).unwrap();
        let analysis = analyze_statement(&stmt);
        assert!(analysis.conditions.is_empty());
        assert!(analysis.fields.is_empty());
        assert_eq!(analysis.tables.len(), 1);
        assert_eq!(analysis.tables[0].name, "users");
    }

    #[test]
    fn union_analysis_collects_both_sides() {
        let stmt = Parser::parse("SELECT id FROM a UNION SELECT id FROM b", false).unwrap();
        let analysis = analyze_statement(&stmt);
        let names: Vec<&str> = analysis.tables.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, vec!["a", "b"]);
        assert!(analysis.fields.is_empty());
    }
}
