//! SQL rendering via `fmt::Display` for AST nodes.
//!
//! Every major node renders back to readable SQL text. The analyzer leans
//! on these impls for its field/value extraction, and tests use them to
//! check parse shapes without spelling out whole trees.

#[allow(clippy::wildcard_imports)]
use crate::*;
use std::fmt;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn comma_list<T: fmt::Display>(f: &mut fmt::Formatter<'_>, items: &[T]) -> fmt::Result {
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            f.write_str(", ")?;
        }
        write!(f, "{item}")?;
    }
    Ok(())
}

/// Quote an identifier only when it would not survive re-lexing bare.
fn write_ident(f: &mut fmt::Formatter<'_>, name: &str) -> fmt::Result {
    let bare = !name.is_empty()
        && (name.as_bytes()[0].is_ascii_alphabetic() || name.as_bytes()[0] == b'_')
        && name
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'_');
    if bare {
        f.write_str(name)
    } else {
        write!(f, "\"{}\"", name.replace('"', "\\\""))
    }
}

// ---------------------------------------------------------------------------
// Literals, names, operators
// ---------------------------------------------------------------------------

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Integer(n) => write!(f, "{n}"),
            Self::Float(v) => write!(f, "{v}"),
            Self::String(s) => write!(f, "'{}'", s.replace('\'', "\\'")),
            Self::Boolean(b) => f.write_str(if *b { "TRUE" } else { "FALSE" }),
            Self::Null => f.write_str("NULL"),
            Self::Star => f.write_str("*"),
        }
    }
}

impl fmt::Display for ColumnRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(ref table) = self.table {
            write_ident(f, table)?;
            f.write_str(".")?;
        }
        write_ident(f, &self.column)
    }
}

impl fmt::Display for BinaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Or => "OR",
            Self::And => "AND",
            Self::Eq => "=",
            Self::NotEq => "!=",
            Self::Lt => "<",
            Self::Gt => ">",
            Self::LtEq => "<=",
            Self::GtEq => ">=",
            Self::Like => "LIKE",
            Self::ILike => "ILIKE",
            Self::In => "IN",
            Self::Between => "BETWEEN",
            Self::Is => "IS",
            Self::IsNot => "IS NOT",
            Self::Add => "+",
            Self::Sub => "-",
            Self::Mul => "*",
            Self::Div => "/",
            Self::Mod => "%",
            Self::Concat => "||",
        })
    }
}

impl fmt::Display for Quantifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Any => "ANY",
            Self::All => "ALL",
        })
    }
}

impl fmt::Display for IntervalUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Year => "YEAR",
            Self::Month => "MONTH",
            Self::Day => "DAY",
            Self::Hour => "HOUR",
            Self::Minute => "MINUTE",
            Self::Second => "SECOND",
        })
    }
}

impl fmt::Display for SortDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Asc => "ASC",
            Self::Desc => "DESC",
        })
    }
}

impl fmt::Display for JoinKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Inner => "INNER",
            Self::Left => "LEFT",
            Self::LeftOuter => "LEFT OUTER",
            Self::Right => "RIGHT",
            Self::RightOuter => "RIGHT OUTER",
            Self::Full => "FULL",
            Self::FullOuter => "FULL OUTER",
            Self::Cross => "CROSS",
        })
    }
}

// ---------------------------------------------------------------------------
// Expressions
// ---------------------------------------------------------------------------

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Literal(lit) => write!(f, "{lit}"),
            Self::Column(col) => write!(f, "{col}"),
            Self::Binary {
                left,
                op,
                quantifier,
                right,
            } => {
                write!(f, "{left} {op}")?;
                if let Some(q) = quantifier {
                    write!(f, " {q}")?;
                }
                write!(f, " {right}")
            }
            Self::Unary { op, expr } => match op {
                UnaryOp::Not => write!(f, "NOT {expr}"),
                UnaryOp::Neg => write!(f, "-{expr}"),
                UnaryOp::Plus => write!(f, "+{expr}"),
                UnaryOp::Exists => write!(f, "EXISTS {expr}"),
            },
            Self::Function(call) => write!(f, "{call}"),
            Self::WindowFunction { call, over } => write!(f, "{call} OVER ({over})"),
            Self::Case {
                operand,
                whens,
                else_expr,
            } => {
                f.write_str("CASE")?;
                if let Some(operand) = operand {
                    write!(f, " {operand}")?;
                }
                for when in whens {
                    write!(f, " {when}")?;
                }
                if let Some(else_expr) = else_expr {
                    write!(f, " ELSE {else_expr}")?;
                }
                f.write_str(" END")
            }
            Self::Interval { value, unit } => write!(f, "INTERVAL {value} {unit}"),
            Self::Subquery { query, .. } => write!(f, "({query})"),
            Self::BetweenRange { low, high } => write!(f, "{low} AND {high}"),
            Self::ValuesList(values) => {
                f.write_str("(")?;
                comma_list(f, values)?;
                f.write_str(")")
            }
        }
    }
}

impl fmt::Display for FunctionCall {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.extract {
            // EXTRACT(field FROM source); args are [field, source].
            write!(f, "{}(", self.name)?;
            if let [field, source] = self.args.as_slice() {
                write!(f, "{field} FROM {source}")?;
            } else {
                comma_list(f, &self.args)?;
            }
            return f.write_str(")");
        }
        write!(f, "{}(", self.name)?;
        if self.distinct {
            f.write_str("DISTINCT ")?;
        }
        comma_list(f, &self.args)?;
        f.write_str(")")
    }
}

impl fmt::Display for WhenClause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "WHEN {} THEN {}", self.condition, self.result)
    }
}

impl fmt::Display for OverClause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut wrote = false;
        if !self.partition_by.is_empty() {
            f.write_str("PARTITION BY ")?;
            comma_list(f, &self.partition_by)?;
            wrote = true;
        }
        if !self.order_by.is_empty() {
            if wrote {
                f.write_str(" ")?;
            }
            f.write_str("ORDER BY ")?;
            comma_list(f, &self.order_by)?;
            wrote = true;
        }
        if let Some(ref frame) = self.frame {
            if wrote {
                f.write_str(" ")?;
            }
            write!(f, "{frame}")?;
        }
        Ok(())
    }
}

impl fmt::Display for FrameSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = match self.kind {
            FrameKind::Rows => "ROWS",
            FrameKind::Range => "RANGE",
        };
        match self.end {
            Some(ref end) => write!(f, "{kind} BETWEEN {} AND {end}", self.start),
            None => write!(f, "{kind} {}", self.start),
        }
    }
}

impl fmt::Display for FrameBound {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnboundedPreceding => f.write_str("UNBOUNDED PRECEDING"),
            Self::UnboundedFollowing => f.write_str("UNBOUNDED FOLLOWING"),
            Self::CurrentRow => f.write_str("CURRENT ROW"),
            Self::Offset { value, direction } => write!(f, "{value} {direction}"),
            Self::Interval {
                value,
                unit,
                direction,
            } => write!(f, "INTERVAL {value} {unit} {direction}"),
        }
    }
}

impl fmt::Display for FrameDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Preceding => "PRECEDING",
            Self::Following => "FOLLOWING",
        })
    }
}

// ---------------------------------------------------------------------------
// Clauses
// ---------------------------------------------------------------------------

impl fmt::Display for SelectItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Wildcard => f.write_str("*"),
            Self::Expr { expr, alias } => {
                write!(f, "{expr}")?;
                if let Some(alias) = alias {
                    f.write_str(" AS ")?;
                    write_ident(f, alias)?;
                }
                Ok(())
            }
        }
    }
}

impl fmt::Display for TableRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Table {
                name,
                alias,
                schema,
            } => {
                if let Some(schema) = schema {
                    write_ident(f, schema)?;
                    f.write_str(".")?;
                }
                write_ident(f, name)?;
                if let Some(alias) = alias {
                    f.write_str(" AS ")?;
                    write_ident(f, alias)?;
                }
                Ok(())
            }
            Self::Subquery { query, alias } => {
                write!(f, "({query})")?;
                if let Some(alias) = alias {
                    f.write_str(" AS ")?;
                    write_ident(f, alias)?;
                }
                Ok(())
            }
        }
    }
}

impl fmt::Display for JoinClause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} JOIN {}", self.kind, self.table)?;
        if let Some(ref on) = self.on {
            write!(f, " ON {on}")?;
        }
        Ok(())
    }
}

impl fmt::Display for FromClause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        comma_list(f, &self.tables)?;
        for join in &self.joins {
            write!(f, " {join}")?;
        }
        Ok(())
    }
}

impl fmt::Display for OrderByItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.expr, self.direction)
    }
}

impl fmt::Display for LimitClause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "LIMIT {}", self.count)?;
        if let Some(ref offset) = self.offset {
            write!(f, " OFFSET {offset}")?;
        }
        Ok(())
    }
}

impl fmt::Display for Assignment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_ident(f, &self.column)?;
        write!(f, " = {}", self.value)
    }
}

impl fmt::Display for WithClause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("WITH ")?;
        if self.recursive {
            f.write_str("RECURSIVE ")?;
        }
        comma_list(f, &self.ctes)
    }
}

impl fmt::Display for Cte {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_ident(f, &self.name)?;
        if !self.columns.is_empty() {
            f.write_str(" (")?;
            for (i, col) in self.columns.iter().enumerate() {
                if i > 0 {
                    f.write_str(", ")?;
                }
                write_ident(f, col)?;
            }
            f.write_str(")")?;
        }
        write!(f, " AS ({})", self.query)
    }
}

// ---------------------------------------------------------------------------
// Statements
// ---------------------------------------------------------------------------

impl fmt::Display for SelectStatement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(ref with) = self.with {
            write!(f, "{with} ")?;
        }
        f.write_str("SELECT ")?;
        if self.distinct {
            f.write_str("DISTINCT ")?;
        }
        comma_list(f, &self.columns)?;
        if let Some(ref from) = self.from {
            write!(f, " FROM {from}")?;
        }
        if let Some(ref where_clause) = self.where_clause {
            write!(f, " WHERE {where_clause}")?;
        }
        if !self.group_by.is_empty() {
            f.write_str(" GROUP BY ")?;
            comma_list(f, &self.group_by)?;
        }
        if let Some(ref having) = self.having {
            write!(f, " HAVING {having}")?;
        }
        if !self.order_by.is_empty() {
            f.write_str(" ORDER BY ")?;
            comma_list(f, &self.order_by)?;
        }
        if let Some(ref limit) = self.limit {
            write!(f, " {limit}")?;
        }
        Ok(())
    }
}

impl fmt::Display for UnionStatement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(ref with) = self.with {
            write!(f, "{with} ")?;
        }
        write!(f, "{} UNION ", self.left)?;
        if self.all {
            f.write_str("ALL ")?;
        }
        write!(f, "{}", self.right)?;
        if !self.order_by.is_empty() {
            f.write_str(" ORDER BY ")?;
            comma_list(f, &self.order_by)?;
        }
        if let Some(ref limit) = self.limit {
            write!(f, " {limit}")?;
        }
        Ok(())
    }
}

impl fmt::Display for Query {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Select(select) => write!(f, "{select}"),
            Self::Union(union) => write!(f, "{union}"),
        }
    }
}

impl fmt::Display for InsertStatement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "INSERT INTO {}", self.table)?;
        if !self.columns.is_empty() {
            f.write_str(" (")?;
            for (i, col) in self.columns.iter().enumerate() {
                if i > 0 {
                    f.write_str(", ")?;
                }
                write_ident(f, col)?;
            }
            f.write_str(")")?;
        }
        f.write_str(" VALUES ")?;
        for (i, row) in self.rows.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            f.write_str("(")?;
            comma_list(f, row)?;
            f.write_str(")")?;
        }
        Ok(())
    }
}

impl fmt::Display for UpdateStatement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "UPDATE {} SET ", self.table)?;
        comma_list(f, &self.assignments)?;
        if let Some(ref where_clause) = self.where_clause {
            write!(f, " WHERE {where_clause}")?;
        }
        Ok(())
    }
}

impl fmt::Display for DeleteStatement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "DELETE FROM {}", self.table)?;
        if let Some(ref where_clause) = self.where_clause {
            write!(f, " WHERE {where_clause}")?;
        }
        Ok(())
    }
}

impl fmt::Display for Statement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Select(select) => write!(f, "{select}"),
            Self::Union(union) => write!(f, "{union}"),
            Self::Insert(insert) => write!(f, "{insert}"),
            Self::Update(update) => write!(f, "{update}"),
            Self::Delete(delete) => write!(f, "{delete}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_qualified_column() {
        let col = ColumnRef::qualified("u", "name");
        assert_eq!(col.to_string(), "u.name");
    }

    #[test]
    fn renders_between_chain() {
        let expr = Expr::binary(
            Expr::column("age"),
            BinaryOp::Between,
            Expr::BetweenRange {
                low: Box::new(Expr::Literal(Literal::Integer(18))),
                high: Box::new(Expr::Literal(Literal::Integer(65))),
            },
        );
        assert_eq!(expr.to_string(), "age BETWEEN 18 AND 65");
    }

    #[test]
    fn renders_in_list() {
        let expr = Expr::binary(
            Expr::column("status"),
            BinaryOp::In,
            Expr::ValuesList(vec![
                Expr::Literal(Literal::String("a".to_owned())),
                Expr::Literal(Literal::String("b".to_owned())),
            ]),
        );
        assert_eq!(expr.to_string(), "status IN ('a', 'b')");
    }

    #[test]
    fn renders_quantified_comparison() {
        let subquery = Expr::Subquery {
            query: Box::new(Query::Select(Box::new(SelectStatement::bare(vec![
                SelectItem::Expr {
                    expr: Expr::column("id"),
                    alias: None,
                },
            ])))),
            alias: None,
        };
        let expr = Expr::quantified(Expr::column("x"), BinaryOp::Eq, Quantifier::Any, subquery);
        assert_eq!(expr.to_string(), "x = ANY (SELECT id)");
    }

    #[test]
    fn renders_extract_call() {
        let call = FunctionCall {
            name: "EXTRACT".to_owned(),
            args: vec![Expr::column("YEAR"), Expr::column("created_at")],
            distinct: false,
            extract: true,
        };
        assert_eq!(call.to_string(), "EXTRACT(YEAR FROM created_at)");
    }

    #[test]
    fn renders_case_without_operand() {
        let expr = Expr::Case {
            operand: None,
            whens: vec![WhenClause {
                condition: Expr::binary(
                    Expr::column("age"),
                    BinaryOp::Lt,
                    Expr::Literal(Literal::Integer(18)),
                ),
                result: Expr::Literal(Literal::String("minor".to_owned())),
            }],
            else_expr: Some(Box::new(Expr::Literal(Literal::String("adult".to_owned())))),
        };
        assert_eq!(
            expr.to_string(),
            "CASE WHEN age < 18 THEN 'minor' ELSE 'adult' END"
        );
    }

    #[test]
    fn renders_window_function() {
        let expr = Expr::WindowFunction {
            call: FunctionCall::new("ROW_NUMBER", Vec::new()),
            over: OverClause {
                partition_by: vec![Expr::column("dept")],
                order_by: vec![OrderByItem {
                    expr: Expr::column("salary"),
                    direction: SortDirection::Desc,
                }],
                frame: None,
            },
        };
        assert_eq!(
            expr.to_string(),
            "ROW_NUMBER() OVER (PARTITION BY dept ORDER BY salary DESC)"
        );
    }

    #[test]
    fn renders_select_round_trip_text() {
        let select = SelectStatement {
            with: None,
            distinct: false,
            columns: vec![SelectItem::Wildcard],
            from: Some(FromClause {
                tables: vec![TableRef::named("users")],
                joins: Vec::new(),
            }),
            where_clause: Some(Expr::binary(
                Expr::column("age"),
                BinaryOp::Gt,
                Expr::Literal(Literal::Integer(18)),
            )),
            group_by: Vec::new(),
            having: None,
            order_by: Vec::new(),
            limit: None,
        };
        assert_eq!(
            select.to_string(),
            "SELECT * FROM users WHERE age > 18"
        );
    }
}
