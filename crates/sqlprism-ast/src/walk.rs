//! Structural walks over the AST.
//!
//! Table and column extraction are simple recursions over every child of a
//! statement; a variant-by-variant analysis would be excessive here, so
//! these walkers visit everything and let the collectors pick what they
//! need. Traversal is pre-order and follows source order, including into
//! subqueries and CTE bodies.

use crate::{
    Expr, FrameBound, FromClause, Query, SelectItem, SelectStatement, Statement, TableRef,
    UnionStatement,
};

/// Every named-table reference in the statement, in source order.
///
/// Duplicates are preserved: a self-join mentions its table twice and the
/// result reflects that. Subquery sources contribute the tables of their
/// inner query, not a name of their own.
#[must_use]
pub fn collect_tables(stmt: &Statement) -> Vec<String> {
    let mut tables = Vec::new();
    statement_tables(stmt, &mut tables);
    tables
}

/// Every column name referenced in the statement, de-duplicated in
/// first-seen order.
///
/// Names positioned as tables or function names never appear here; the
/// field selector of `EXTRACT(field FROM …)` is likewise not a column.
#[must_use]
pub fn collect_columns(stmt: &Statement) -> Vec<String> {
    let mut columns = Vec::new();
    collect_columns_into(stmt, &mut columns);
    let mut seen = Vec::with_capacity(columns.len());
    for name in columns {
        if !seen.contains(&name) {
            seen.push(name);
        }
    }
    seen
}

fn collect_columns_into(stmt: &Statement, out: &mut Vec<String>) {
    match stmt {
        Statement::Select(select) => select_columns(select, out),
        Statement::Union(union) => union_columns(union, out),
        Statement::Insert(insert) => {
            out.extend(insert.columns.iter().cloned());
            for row in &insert.rows {
                for value in row {
                    expr_columns(value, out);
                }
            }
        }
        Statement::Update(update) => {
            for assignment in &update.assignments {
                out.push(assignment.column.clone());
                expr_columns(&assignment.value, out);
            }
            if let Some(ref where_clause) = update.where_clause {
                expr_columns(where_clause, out);
            }
        }
        Statement::Delete(delete) => {
            if let Some(ref where_clause) = delete.where_clause {
                expr_columns(where_clause, out);
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Table collection
// ---------------------------------------------------------------------------

fn statement_tables(stmt: &Statement, tables: &mut Vec<String>) {
    match stmt {
        Statement::Select(select) => select_tables(select, tables),
        Statement::Union(union) => union_tables(union, tables),
        Statement::Insert(insert) => {
            table_ref(&insert.table, tables);
            for row in &insert.rows {
                for value in row {
                    expr_tables(value, tables);
                }
            }
        }
        Statement::Update(update) => {
            table_ref(&update.table, tables);
            for assignment in &update.assignments {
                expr_tables(&assignment.value, tables);
            }
            if let Some(ref where_clause) = update.where_clause {
                expr_tables(where_clause, tables);
            }
        }
        Statement::Delete(delete) => {
            table_ref(&delete.table, tables);
            if let Some(ref where_clause) = delete.where_clause {
                expr_tables(where_clause, tables);
            }
        }
    }
}

fn query_tables(query: &Query, tables: &mut Vec<String>) {
    match query {
        Query::Select(select) => select_tables(select, tables),
        Query::Union(union) => union_tables(union, tables),
    }
}

fn union_tables(union: &UnionStatement, tables: &mut Vec<String>) {
    if let Some(ref with) = union.with {
        for cte in &with.ctes {
            query_tables(&cte.query, tables);
        }
    }
    query_tables(&union.left, tables);
    query_tables(&union.right, tables);
    for item in &union.order_by {
        expr_tables(&item.expr, tables);
    }
}

fn select_tables(select: &SelectStatement, tables: &mut Vec<String>) {
    if let Some(ref with) = select.with {
        for cte in &with.ctes {
            query_tables(&cte.query, tables);
        }
    }
    for item in &select.columns {
        if let SelectItem::Expr { expr, .. } = item {
            expr_tables(expr, tables);
        }
    }
    if let Some(ref from) = select.from {
        from_tables(from, tables);
    }
    if let Some(ref where_clause) = select.where_clause {
        expr_tables(where_clause, tables);
    }
    for expr in &select.group_by {
        expr_tables(expr, tables);
    }
    if let Some(ref having) = select.having {
        expr_tables(having, tables);
    }
    for item in &select.order_by {
        expr_tables(&item.expr, tables);
    }
}

fn from_tables(from: &FromClause, tables: &mut Vec<String>) {
    for table in &from.tables {
        table_ref(table, tables);
    }
    for join in &from.joins {
        table_ref(&join.table, tables);
        if let Some(ref on) = join.on {
            expr_tables(on, tables);
        }
    }
}

fn table_ref(table: &TableRef, tables: &mut Vec<String>) {
    match table {
        TableRef::Table { name, .. } => tables.push(name.clone()),
        TableRef::Subquery { query, .. } => query_tables(query, tables),
    }
}

fn frame_bound_tables(bound: &FrameBound, tables: &mut Vec<String>) {
    match bound {
        FrameBound::Offset { value, .. } | FrameBound::Interval { value, .. } => {
            expr_tables(value, tables);
        }
        FrameBound::UnboundedPreceding
        | FrameBound::UnboundedFollowing
        | FrameBound::CurrentRow => {}
    }
}

fn expr_tables(expr: &Expr, tables: &mut Vec<String>) {
    match expr {
        Expr::Literal(_) | Expr::Column(_) => {}
        Expr::Binary { left, right, .. } => {
            expr_tables(left, tables);
            expr_tables(right, tables);
        }
        Expr::Unary { expr, .. } => expr_tables(expr, tables),
        Expr::Function(call) => {
            for arg in &call.args {
                expr_tables(arg, tables);
            }
        }
        Expr::WindowFunction { call, over } => {
            for arg in &call.args {
                expr_tables(arg, tables);
            }
            for expr in &over.partition_by {
                expr_tables(expr, tables);
            }
            for item in &over.order_by {
                expr_tables(&item.expr, tables);
            }
            if let Some(ref frame) = over.frame {
                frame_bound_tables(&frame.start, tables);
                if let Some(ref end) = frame.end {
                    frame_bound_tables(end, tables);
                }
            }
        }
        Expr::Case {
            operand,
            whens,
            else_expr,
        } => {
            if let Some(operand) = operand {
                expr_tables(operand, tables);
            }
            for when in whens {
                expr_tables(&when.condition, tables);
                expr_tables(&when.result, tables);
            }
            if let Some(else_expr) = else_expr {
                expr_tables(else_expr, tables);
            }
        }
        Expr::Interval { value, .. } => expr_tables(value, tables),
        Expr::Subquery { query, .. } => query_tables(query, tables),
        Expr::BetweenRange { low, high } => {
            expr_tables(low, tables);
            expr_tables(high, tables);
        }
        Expr::ValuesList(values) => {
            for value in values {
                expr_tables(value, tables);
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Column collection
// ---------------------------------------------------------------------------

fn union_columns(union: &UnionStatement, out: &mut Vec<String>) {
    if let Some(ref with) = union.with {
        for cte in &with.ctes {
            query_columns(&cte.query, out);
        }
    }
    query_columns(&union.left, out);
    query_columns(&union.right, out);
    for item in &union.order_by {
        expr_columns(&item.expr, out);
    }
}

fn query_columns(query: &Query, out: &mut Vec<String>) {
    match query {
        Query::Select(select) => select_columns(select, out),
        Query::Union(union) => union_columns(union, out),
    }
}

fn select_columns(select: &SelectStatement, out: &mut Vec<String>) {
    if let Some(ref with) = select.with {
        for cte in &with.ctes {
            query_columns(&cte.query, out);
        }
    }
    for item in &select.columns {
        if let SelectItem::Expr { expr, .. } = item {
            expr_columns(expr, out);
        }
    }
    if let Some(ref from) = select.from {
        for table in &from.tables {
            if let TableRef::Subquery { query, .. } = table {
                query_columns(query, out);
            }
        }
        for join in &from.joins {
            if let TableRef::Subquery { query, .. } = &join.table {
                query_columns(query, out);
            }
            if let Some(ref on) = join.on {
                expr_columns(on, out);
            }
        }
    }
    if let Some(ref where_clause) = select.where_clause {
        expr_columns(where_clause, out);
    }
    for expr in &select.group_by {
        expr_columns(expr, out);
    }
    if let Some(ref having) = select.having {
        expr_columns(having, out);
    }
    for item in &select.order_by {
        expr_columns(&item.expr, out);
    }
}

fn expr_columns(expr: &Expr, out: &mut Vec<String>) {
    match expr {
        Expr::Literal(_) => {}
        Expr::Column(col) => out.push(col.column.clone()),
        Expr::Binary { left, right, .. } => {
            expr_columns(left, out);
            expr_columns(right, out);
        }
        Expr::Unary { expr, .. } => expr_columns(expr, out),
        Expr::Function(call) => {
            // The EXTRACT field selector is grammar, not a column.
            let args = if call.extract && !call.args.is_empty() {
                &call.args[1..]
            } else {
                &call.args[..]
            };
            for arg in args {
                expr_columns(arg, out);
            }
        }
        Expr::WindowFunction { call, over } => {
            for arg in &call.args {
                expr_columns(arg, out);
            }
            for expr in &over.partition_by {
                expr_columns(expr, out);
            }
            for item in &over.order_by {
                expr_columns(&item.expr, out);
            }
            if let Some(ref frame) = over.frame {
                frame_bound_columns(&frame.start, out);
                if let Some(ref end) = frame.end {
                    frame_bound_columns(end, out);
                }
            }
        }
        Expr::Case {
            operand,
            whens,
            else_expr,
        } => {
            if let Some(operand) = operand {
                expr_columns(operand, out);
            }
            for when in whens {
                expr_columns(&when.condition, out);
                expr_columns(&when.result, out);
            }
            if let Some(else_expr) = else_expr {
                expr_columns(else_expr, out);
            }
        }
        Expr::Interval { value, .. } => expr_columns(value, out),
        Expr::Subquery { query, .. } => query_columns(query, out),
        Expr::BetweenRange { low, high } => {
            expr_columns(low, out);
            expr_columns(high, out);
        }
        Expr::ValuesList(values) => {
            for value in values {
                expr_columns(value, out);
            }
        }
    }
}

fn frame_bound_columns(bound: &FrameBound, out: &mut Vec<String>) {
    match bound {
        FrameBound::Offset { value, .. } | FrameBound::Interval { value, .. } => {
            expr_columns(value, out);
        }
        FrameBound::UnboundedPreceding
        | FrameBound::UnboundedFollowing
        | FrameBound::CurrentRow => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{BinaryOp, FromClause, JoinClause, JoinKind, Literal, SelectItem};

    fn users_select(where_clause: Option<Expr>) -> Statement {
        Statement::Select(Box::new(SelectStatement {
            with: None,
            distinct: false,
            columns: vec![SelectItem::Wildcard],
            from: Some(FromClause {
                tables: vec![TableRef::named("users")],
                joins: Vec::new(),
            }),
            where_clause,
            group_by: Vec::new(),
            having: None,
            order_by: Vec::new(),
            limit: None,
        }))
    }

    #[test]
    fn collects_single_table() {
        let stmt = users_select(None);
        assert_eq!(collect_tables(&stmt), vec!["users"]);
    }

    #[test]
    fn preserves_duplicate_tables_for_self_join() {
        let stmt = Statement::Select(Box::new(SelectStatement {
            with: None,
            distinct: false,
            columns: vec![SelectItem::Wildcard],
            from: Some(FromClause {
                tables: vec![TableRef::named("employees")],
                joins: vec![JoinClause {
                    kind: JoinKind::Inner,
                    table: TableRef::named("employees"),
                    on: Some(Expr::binary(
                        Expr::Column(crate::ColumnRef::qualified("a", "manager_id")),
                        BinaryOp::Eq,
                        Expr::Column(crate::ColumnRef::qualified("b", "id")),
                    )),
                }],
            }),
            where_clause: None,
            group_by: Vec::new(),
            having: None,
            order_by: Vec::new(),
            limit: None,
        }));
        assert_eq!(collect_tables(&stmt), vec!["employees", "employees"]);
    }

    #[test]
    fn columns_deduplicate_in_first_seen_order() {
        let stmt = users_select(Some(Expr::binary(
            Expr::binary(
                Expr::column("age"),
                BinaryOp::Gt,
                Expr::Literal(Literal::Integer(18)),
            ),
            BinaryOp::And,
            Expr::binary(
                Expr::column("age"),
                BinaryOp::Lt,
                Expr::Literal(Literal::Integer(65)),
            ),
        )));
        assert_eq!(collect_columns(&stmt), vec!["age"]);
    }

    #[test]
    fn tables_descend_into_frame_bound_subquery() {
        use crate::{
            FrameBound, FrameDirection, FrameKind, FrameSpec, FunctionCall, OverClause,
        };
        let bound_query = Expr::Subquery {
            query: Box::new(Query::Select(Box::new(SelectStatement {
                with: None,
                distinct: false,
                columns: vec![SelectItem::Expr {
                    expr: Expr::column("n"),
                    alias: None,
                }],
                from: Some(FromClause {
                    tables: vec![TableRef::named("limits")],
                    joins: Vec::new(),
                }),
                where_clause: None,
                group_by: Vec::new(),
                having: None,
                order_by: Vec::new(),
                limit: None,
            }))),
            alias: None,
        };
        let window = Expr::WindowFunction {
            call: FunctionCall::new("SUM", vec![Expr::column("x")]),
            over: OverClause {
                partition_by: Vec::new(),
                order_by: Vec::new(),
                frame: Some(FrameSpec {
                    kind: FrameKind::Rows,
                    start: FrameBound::Offset {
                        value: Box::new(bound_query),
                        direction: FrameDirection::Preceding,
                    },
                    end: Some(FrameBound::CurrentRow),
                }),
            },
        };
        let stmt = Statement::Select(Box::new(SelectStatement {
            with: None,
            distinct: false,
            columns: vec![SelectItem::Expr {
                expr: window,
                alias: None,
            }],
            from: Some(FromClause {
                tables: vec![TableRef::named("t")],
                joins: Vec::new(),
            }),
            where_clause: None,
            group_by: Vec::new(),
            having: None,
            order_by: Vec::new(),
            limit: None,
        }));
        assert_eq!(collect_tables(&stmt), vec!["limits", "t"]);
    }

    #[test]
    fn tables_descend_into_in_subquery() {
        let subquery = Expr::Subquery {
            query: Box::new(Query::Select(Box::new(SelectStatement {
                with: None,
                distinct: false,
                columns: vec![SelectItem::Expr {
                    expr: Expr::column("user_id"),
                    alias: None,
                }],
                from: Some(FromClause {
                    tables: vec![TableRef::named("orders")],
                    joins: Vec::new(),
                }),
                where_clause: None,
                group_by: Vec::new(),
                having: None,
                order_by: Vec::new(),
                limit: None,
            }))),
            alias: None,
        };
        let stmt = users_select(Some(Expr::binary(
            Expr::column("id"),
            BinaryOp::In,
            subquery,
        )));
        assert_eq!(collect_tables(&stmt), vec!["users", "orders"]);
    }
}
