//! Expression parsing: precedence climbing with binding-power pairs.
//!
//! Precedence, lowest to highest:
//!   OR
//!   AND
//!   = != <>
//!   < > <= >= LIKE ILIKE IN BETWEEN IS   (one shared level)
//!   + -
//!   * / % ||
//!   NOT - + EXISTS  (unary prefix)
//!
//! The relational level chains left-associatively like the source grammar;
//! `a < b LIKE c` parses as `(a < b) LIKE c` rather than being rejected.

use sqlprism_ast::{
    BinaryOp, ColumnRef, Expr, FrameBound, FrameDirection, FrameKind, FrameSpec, FunctionCall,
    IntervalUnit, Literal, OverClause, Quantifier, UnaryOp, WhenClause,
};
use sqlprism_error::{Result, SqlError};

use crate::parser::Parser;
use crate::token::TokenKind;

// Binding powers: higher = tighter. Left BP is compared against min_bp;
// right BP seeds the recursive call.
mod bp {
    pub const OR: (u8, u8) = (1, 2);
    pub const AND: (u8, u8) = (3, 4);
    pub const EQUALITY: (u8, u8) = (5, 6);
    pub const RELATIONAL: (u8, u8) = (7, 8);
    pub const ADD: (u8, u8) = (9, 10);
    pub const MUL: (u8, u8) = (11, 12);
    // Unary prefix right BP:
    pub const UNARY: u8 = 13;
}

impl Parser {
    /// Parse a full expression.
    pub fn parse_expr(&mut self) -> Result<Expr> {
        self.parse_expr_bp(0)
    }

    // ── Precedence-climbing core ────────────────────────────────────────

    fn parse_expr_bp(&mut self, min_bp: u8) -> Result<Expr> {
        self.enter_recursion()?;
        let result = self.parse_expr_bp_inner(min_bp);
        self.leave_recursion();
        result
    }

    fn parse_expr_bp_inner(&mut self, min_bp: u8) -> Result<Expr> {
        let mut lhs = self.parse_prefix()?;
        loop {
            let Some((l_bp, r_bp)) = self.infix_bp() else {
                break;
            };
            if l_bp < min_bp {
                break;
            }
            lhs = self.parse_infix(lhs, r_bp)?;
        }
        Ok(lhs)
    }

    fn infix_bp(&self) -> Option<(u8, u8)> {
        match self.peek() {
            TokenKind::KwOr => Some(bp::OR),
            TokenKind::KwAnd => Some(bp::AND),
            TokenKind::Eq | TokenKind::NotEq | TokenKind::LtGt => Some(bp::EQUALITY),
            TokenKind::Lt
            | TokenKind::Gt
            | TokenKind::LtEq
            | TokenKind::GtEq
            | TokenKind::KwLike
            | TokenKind::KwIlike
            | TokenKind::KwIn
            | TokenKind::KwBetween
            | TokenKind::KwIs => Some(bp::RELATIONAL),
            // NOT IN / NOT LIKE / NOT ILIKE / NOT BETWEEN
            TokenKind::KwNot => match self.peek_nth(1) {
                TokenKind::KwIn
                | TokenKind::KwLike
                | TokenKind::KwIlike
                | TokenKind::KwBetween => Some(bp::RELATIONAL),
                _ => None,
            },
            TokenKind::Plus | TokenKind::Minus => Some(bp::ADD),
            TokenKind::Star | TokenKind::Slash | TokenKind::Percent | TokenKind::Concat => {
                Some(bp::MUL)
            }
            _ => None,
        }
    }

    // ── Infix ───────────────────────────────────────────────────────────

    fn parse_infix(&mut self, lhs: Expr, r_bp: u8) -> Result<Expr> {
        let tok = self.advance();
        match tok.kind {
            TokenKind::KwOr => self.finish_binary(lhs, BinaryOp::Or, r_bp),
            TokenKind::KwAnd => self.finish_binary(lhs, BinaryOp::And, r_bp),
            TokenKind::Eq => self.finish_comparison(lhs, BinaryOp::Eq, r_bp),
            TokenKind::NotEq | TokenKind::LtGt => {
                self.finish_comparison(lhs, BinaryOp::NotEq, r_bp)
            }
            TokenKind::Lt => self.finish_comparison(lhs, BinaryOp::Lt, r_bp),
            TokenKind::Gt => self.finish_comparison(lhs, BinaryOp::Gt, r_bp),
            TokenKind::LtEq => self.finish_comparison(lhs, BinaryOp::LtEq, r_bp),
            TokenKind::GtEq => self.finish_comparison(lhs, BinaryOp::GtEq, r_bp),
            TokenKind::KwLike => self.finish_binary(lhs, BinaryOp::Like, r_bp),
            TokenKind::KwIlike => self.finish_binary(lhs, BinaryOp::ILike, r_bp),
            TokenKind::KwIn => self.finish_in(lhs),
            TokenKind::KwBetween => self.finish_between(lhs),
            TokenKind::KwIs => self.finish_is(lhs),
            TokenKind::KwNot => {
                // `NOT IN` / `NOT LIKE` / `NOT ILIKE` / `NOT BETWEEN`:
                // parse the positive form and negate it.
                let positive = self.parse_infix(lhs, r_bp)?;
                Ok(Expr::unary(UnaryOp::Not, positive))
            }
            TokenKind::Plus => self.finish_binary(lhs, BinaryOp::Add, r_bp),
            TokenKind::Minus => self.finish_binary(lhs, BinaryOp::Sub, r_bp),
            TokenKind::Star => self.finish_binary(lhs, BinaryOp::Mul, r_bp),
            TokenKind::Slash => self.finish_binary(lhs, BinaryOp::Div, r_bp),
            TokenKind::Percent => self.finish_binary(lhs, BinaryOp::Mod, r_bp),
            TokenKind::Concat => self.finish_binary(lhs, BinaryOp::Concat, r_bp),
            other => Err(SqlError::unexpected(format!(
                "infix dispatch on non-operator token {other:?}"
            ))),
        }
    }

    fn finish_binary(&mut self, lhs: Expr, op: BinaryOp, r_bp: u8) -> Result<Expr> {
        let rhs = self.parse_expr_bp(r_bp)?;
        Ok(Expr::binary(lhs, op, rhs))
    }

    /// A comparison operator may be followed by `ANY`/`ALL`, which demands
    /// a parenthesized subquery on the right.
    fn finish_comparison(&mut self, lhs: Expr, op: BinaryOp, r_bp: u8) -> Result<Expr> {
        let quantifier = match self.peek() {
            TokenKind::KwAny => Some(Quantifier::Any),
            TokenKind::KwAll => Some(Quantifier::All),
            _ => None,
        };
        let Some(quantifier) = quantifier else {
            return self.finish_binary(lhs, op, r_bp);
        };
        self.advance();
        let subquery = self.parse_parenthesized_subquery()?;
        Ok(Expr::quantified(lhs, op, quantifier, subquery))
    }

    /// `IN (subquery)` or `IN (value, …)`.
    fn finish_in(&mut self, lhs: Expr) -> Result<Expr> {
        self.expect(TokenKind::LeftParen, "(")?;
        if self.check(TokenKind::KwSelect) {
            let query = self.parse_query()?;
            self.expect(TokenKind::RightParen, ")")?;
            let rhs = Expr::Subquery {
                query: Box::new(query),
                alias: None,
            };
            return Ok(Expr::binary(lhs, BinaryOp::In, rhs));
        }
        let mut values = Vec::new();
        loop {
            values.push(self.parse_expr()?);
            if !self.eat(TokenKind::Comma) {
                break;
            }
        }
        self.expect(TokenKind::RightParen, ")")?;
        Ok(Expr::binary(lhs, BinaryOp::In, Expr::ValuesList(values)))
    }

    /// `BETWEEN <additive> AND <additive>`.
    fn finish_between(&mut self, lhs: Expr) -> Result<Expr> {
        let low = self.parse_expr_bp(bp::ADD.0)?;
        self.expect(TokenKind::KwAnd, "AND")?;
        let high = self.parse_expr_bp(bp::ADD.0)?;
        Ok(Expr::binary(
            lhs,
            BinaryOp::Between,
            Expr::BetweenRange {
                low: Box::new(low),
                high: Box::new(high),
            },
        ))
    }

    /// `IS [NOT] NULL`; anything else after IS is an error.
    fn finish_is(&mut self, lhs: Expr) -> Result<Expr> {
        let not = self.eat(TokenKind::KwNot);
        self.expect(TokenKind::Null, "NULL")?;
        let op = if not { BinaryOp::IsNot } else { BinaryOp::Is };
        Ok(Expr::binary(lhs, op, Expr::Literal(Literal::Null)))
    }

    // ── Prefix ──────────────────────────────────────────────────────────

    fn parse_prefix(&mut self) -> Result<Expr> {
        match self.peek() {
            TokenKind::Number => {
                let tok = self.advance();
                Ok(Expr::number(&tok.text))
            }
            TokenKind::String => {
                let tok = self.advance();
                Ok(Expr::Literal(Literal::String(tok.text)))
            }
            TokenKind::Boolean => {
                let tok = self.advance();
                Ok(Expr::Literal(Literal::Boolean(
                    tok.text.eq_ignore_ascii_case("true"),
                )))
            }
            TokenKind::Null => {
                self.advance();
                Ok(Expr::Literal(Literal::Null))
            }
            TokenKind::Minus => {
                self.advance();
                let operand = self.parse_expr_bp(bp::UNARY)?;
                Ok(Expr::unary(UnaryOp::Neg, operand))
            }
            TokenKind::Plus => {
                self.advance();
                let operand = self.parse_expr_bp(bp::UNARY)?;
                Ok(Expr::unary(UnaryOp::Plus, operand))
            }
            TokenKind::KwNot => {
                self.advance();
                let operand = self.parse_expr_bp(bp::UNARY)?;
                Ok(Expr::unary(UnaryOp::Not, operand))
            }
            TokenKind::KwExists => {
                self.advance();
                let subquery = self.parse_parenthesized_subquery()?;
                Ok(Expr::unary(UnaryOp::Exists, subquery))
            }
            TokenKind::LeftParen => {
                if self.peek_nth(1) == TokenKind::KwSelect {
                    return self.parse_parenthesized_subquery();
                }
                self.advance();
                let inner = self.parse_expr()?;
                self.expect(TokenKind::RightParen, ")")?;
                Ok(inner)
            }
            TokenKind::KwCase => self.parse_case(),
            TokenKind::KwInterval => self.parse_interval(),
            kind if kind == TokenKind::Identifier || kind.can_start_function() => {
                self.parse_identifier_expr()
            }
            _ => Err(self.err_expected("expression")),
        }
    }

    /// `( SELECT … )` as an expression node.
    fn parse_parenthesized_subquery(&mut self) -> Result<Expr> {
        self.expect(TokenKind::LeftParen, "(")?;
        if !self.check(TokenKind::KwSelect) {
            return Err(self.err_expected("SELECT"));
        }
        let query = self.parse_query()?;
        self.expect(TokenKind::RightParen, ")")?;
        Ok(Expr::Subquery {
            query: Box::new(query),
            alias: None,
        })
    }

    /// Identifier (or function-able keyword): a function call when `(`
    /// follows, a qualified column when `.` follows, a bare column
    /// otherwise.
    fn parse_identifier_expr(&mut self) -> Result<Expr> {
        let tok = self.advance();
        let name = tok.text;

        if self.check(TokenKind::LeftParen) {
            if name.eq_ignore_ascii_case("EXTRACT") {
                return self.parse_extract(name);
            }
            return self.parse_function_call(name);
        }

        if self.eat(TokenKind::Dot) {
            let column = self.parse_name("column name")?;
            return Ok(Expr::Column(ColumnRef::qualified(name, column)));
        }

        Ok(Expr::Column(ColumnRef::bare(name)))
    }

    /// `name( [DISTINCT] args )` with `*` admitted as a literal argument,
    /// optionally wrapped into a window function by `OVER (…)`.
    fn parse_function_call(&mut self, name: String) -> Result<Expr> {
        self.expect(TokenKind::LeftParen, "(")?;
        let distinct = self.eat(TokenKind::KwDistinct);

        let mut args = Vec::new();
        if !self.check(TokenKind::RightParen) {
            loop {
                if self.check(TokenKind::Star) {
                    self.advance();
                    args.push(Expr::Literal(Literal::Star));
                } else {
                    args.push(self.parse_expr()?);
                }
                if !self.eat(TokenKind::Comma) {
                    break;
                }
            }
        }
        self.expect(TokenKind::RightParen, ")")?;

        let call = FunctionCall {
            name,
            args,
            distinct,
            extract: false,
        };

        if self.eat(TokenKind::KwOver) {
            let over = self.parse_over_clause()?;
            return Ok(Expr::WindowFunction { call, over });
        }
        Ok(Expr::Function(call))
    }

    /// `EXTRACT(field FROM source)`: the field is a date-part keyword or
    /// identifier, emitted as the first of two arguments.
    fn parse_extract(&mut self, name: String) -> Result<Expr> {
        self.expect(TokenKind::LeftParen, "(")?;
        let field = if self.peek().date_part().is_some() || self.check(TokenKind::Identifier) {
            self.advance().text
        } else {
            return Err(self.err_expected("date part"));
        };
        self.expect(TokenKind::KwFrom, "FROM")?;
        let source = self.parse_expr()?;
        self.expect(TokenKind::RightParen, ")")?;
        Ok(Expr::Function(FunctionCall {
            name,
            args: vec![Expr::Column(ColumnRef::bare(field)), source],
            distinct: false,
            extract: true,
        }))
    }

    /// `INTERVAL <value> [unit]`; unit may be a date-part keyword or an
    /// identifier spelling one, and defaults to DAY.
    fn parse_interval(&mut self) -> Result<Expr> {
        self.expect(TokenKind::KwInterval, "INTERVAL")?;
        let value = self.parse_prefix()?;
        let unit = self.parse_interval_unit().unwrap_or(IntervalUnit::Day);
        Ok(Expr::Interval {
            value: Box::new(value),
            unit,
        })
    }

    fn parse_interval_unit(&mut self) -> Option<IntervalUnit> {
        if let Some(unit) = self.peek().date_part() {
            self.advance();
            return Some(unit);
        }
        if self.check(TokenKind::Identifier) {
            if let Some(unit) = IntervalUnit::from_name(&self.current().text) {
                self.advance();
                return Some(unit);
            }
        }
        None
    }

    /// `CASE [operand] WHEN … THEN … [WHEN …]* [ELSE …] END`.
    fn parse_case(&mut self) -> Result<Expr> {
        self.expect(TokenKind::KwCase, "CASE")?;

        let operand = if self.check(TokenKind::KwWhen) {
            None
        } else {
            Some(Box::new(self.parse_expr()?))
        };

        let mut whens = Vec::new();
        self.expect(TokenKind::KwWhen, "WHEN")?;
        loop {
            let condition = self.parse_expr()?;
            self.expect(TokenKind::KwThen, "THEN")?;
            let result = self.parse_expr()?;
            whens.push(WhenClause { condition, result });
            if !self.eat(TokenKind::KwWhen) {
                break;
            }
        }

        let else_expr = if self.eat(TokenKind::KwElse) {
            Some(Box::new(self.parse_expr()?))
        } else {
            None
        };

        self.expect(TokenKind::KwEnd, "END")?;
        Ok(Expr::Case {
            operand,
            whens,
            else_expr,
        })
    }

    // ── Window specifications ───────────────────────────────────────────

    /// `( [PARTITION BY …] [ORDER BY …] [frame] )`, after `OVER`.
    fn parse_over_clause(&mut self) -> Result<OverClause> {
        self.expect(TokenKind::LeftParen, "(")?;

        let mut partition_by = Vec::new();
        if self.eat(TokenKind::KwPartition) {
            self.expect(TokenKind::KwBy, "BY")?;
            loop {
                partition_by.push(self.parse_expr()?);
                if !self.eat(TokenKind::Comma) {
                    break;
                }
            }
        }

        let order_by = if self.check(TokenKind::KwOrder) {
            self.parse_order_by()?
        } else {
            Vec::new()
        };

        let frame = if matches!(self.peek(), TokenKind::KwRows | TokenKind::KwRange) {
            Some(self.parse_frame_spec()?)
        } else {
            None
        };

        self.expect(TokenKind::RightParen, ")")?;
        Ok(OverClause {
            partition_by,
            order_by,
            frame,
        })
    }

    /// `ROWS|RANGE` then `BETWEEN bound AND bound` or a single bound.
    fn parse_frame_spec(&mut self) -> Result<FrameSpec> {
        let kind = if self.eat(TokenKind::KwRows) {
            FrameKind::Rows
        } else {
            self.expect(TokenKind::KwRange, "ROWS or RANGE")?;
            FrameKind::Range
        };

        if self.eat(TokenKind::KwBetween) {
            let start = self.parse_frame_bound()?;
            self.expect(TokenKind::KwAnd, "AND")?;
            let end = self.parse_frame_bound()?;
            return Ok(FrameSpec {
                kind,
                start,
                end: Some(end),
            });
        }

        let start = self.parse_frame_bound()?;
        Ok(FrameSpec {
            kind,
            start,
            end: None,
        })
    }

    fn parse_frame_bound(&mut self) -> Result<FrameBound> {
        match self.peek() {
            TokenKind::KwUnbounded => {
                self.advance();
                if self.eat(TokenKind::KwPreceding) {
                    Ok(FrameBound::UnboundedPreceding)
                } else if self.eat(TokenKind::KwFollowing) {
                    Ok(FrameBound::UnboundedFollowing)
                } else {
                    Err(self.err_expected("PRECEDING or FOLLOWING"))
                }
            }
            TokenKind::KwCurrent => {
                self.advance();
                self.expect(TokenKind::KwRow, "ROW")?;
                Ok(FrameBound::CurrentRow)
            }
            TokenKind::KwInterval => {
                self.advance();
                let value = self.parse_prefix()?;
                let unit = self.parse_interval_unit().unwrap_or(IntervalUnit::Day);
                let direction = self.parse_frame_direction()?;
                Ok(FrameBound::Interval {
                    value: Box::new(value),
                    unit,
                    direction,
                })
            }
            _ => {
                let value = self.parse_expr_bp(bp::ADD.0)?;
                let direction = self.parse_frame_direction()?;
                Ok(FrameBound::Offset {
                    value: Box::new(value),
                    direction,
                })
            }
        }
    }

    fn parse_frame_direction(&mut self) -> Result<FrameDirection> {
        if self.eat(TokenKind::KwPreceding) {
            Ok(FrameDirection::Preceding)
        } else if self.eat(TokenKind::KwFollowing) {
            Ok(FrameDirection::Following)
        } else {
            Err(self.err_expected("PRECEDING or FOLLOWING"))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::{Lexer, LexerOptions};
    use sqlprism_error::ErrorKind;

    fn parse_expr(sql: &str) -> Expr {
        let tokens = Lexer::tokenize(sql, &LexerOptions::default()).expect("lex");
        let mut parser = Parser::new(tokens);
        let expr = parser.parse_expr().expect("expression should parse");
        assert!(parser.at_eof(), "expression did not consume all input");
        expr
    }

    fn expr_err(sql: &str) -> sqlprism_error::SqlError {
        let tokens = Lexer::tokenize(sql, &LexerOptions::default()).expect("lex");
        Parser::new(tokens)
            .parse_expr()
            .expect_err("expression should fail")
    }

    #[test]
    fn precedence_or_under_and() {
        // a OR b AND c  →  a OR (b AND c)
        let expr = parse_expr("a OR b AND c");
        let Expr::Binary { op, right, .. } = &expr else {
            panic!("expected binary");
        };
        assert_eq!(*op, BinaryOp::Or);
        assert!(matches!(
            &**right,
            Expr::Binary { op: BinaryOp::And, .. }
        ));
    }

    #[test]
    fn precedence_arithmetic() {
        // 1 + 2 * 3  →  1 + (2 * 3)
        let expr = parse_expr("1 + 2 * 3");
        let Expr::Binary { op, right, .. } = &expr else {
            panic!("expected binary");
        };
        assert_eq!(*op, BinaryOp::Add);
        assert!(matches!(
            &**right,
            Expr::Binary { op: BinaryOp::Mul, .. }
        ));
    }

    #[test]
    fn equality_binds_looser_than_relational() {
        // a = b < c  →  a = (b < c)
        let expr = parse_expr("a = b < c");
        let Expr::Binary { op, right, .. } = &expr else {
            panic!("expected binary");
        };
        assert_eq!(*op, BinaryOp::Eq);
        assert!(matches!(&**right, Expr::Binary { op: BinaryOp::Lt, .. }));
    }

    #[test]
    fn relational_level_chains_left() {
        // a < b LIKE c parses (a < b) LIKE c, mirroring the source grammar.
        let expr = parse_expr("a < b LIKE c");
        let Expr::Binary { op, left, .. } = &expr else {
            panic!("expected binary");
        };
        assert_eq!(*op, BinaryOp::Like);
        assert!(matches!(&**left, Expr::Binary { op: BinaryOp::Lt, .. }));
    }

    #[test]
    fn concat_sits_at_multiplicative_level() {
        // || binds tighter than +: a || b groups first.
        let expr = parse_expr("a || b + c");
        let Expr::Binary { op, left, .. } = &expr else {
            panic!("expected binary");
        };
        assert_eq!(*op, BinaryOp::Add);
        assert!(matches!(
            &**left,
            Expr::Binary { op: BinaryOp::Concat, .. }
        ));
    }

    #[test]
    fn in_value_list() {
        let expr = parse_expr("status IN ('new', 'open', 'held')");
        let Expr::Binary { op, right, .. } = &expr else {
            panic!("expected binary");
        };
        assert_eq!(*op, BinaryOp::In);
        let Expr::ValuesList(values) = &**right else {
            panic!("expected values list");
        };
        assert_eq!(values.len(), 3);
    }

    #[test]
    fn in_subquery() {
        let expr = parse_expr("id IN (SELECT user_id FROM orders)");
        let Expr::Binary { op, right, .. } = &expr else {
            panic!("expected binary");
        };
        assert_eq!(*op, BinaryOp::In);
        assert!(matches!(&**right, Expr::Subquery { .. }));
    }

    #[test]
    fn between_range() {
        let expr = parse_expr("age BETWEEN 18 AND 65");
        let Expr::Binary { op, right, .. } = &expr else {
            panic!("expected binary");
        };
        assert_eq!(*op, BinaryOp::Between);
        let Expr::BetweenRange { low, high } = &**right else {
            panic!("expected between range");
        };
        assert_eq!(**low, Expr::Literal(Literal::Integer(18)));
        assert_eq!(**high, Expr::Literal(Literal::Integer(65)));
    }

    #[test]
    fn between_then_and_condition() {
        // The AND after the range belongs to the boolean level.
        let expr = parse_expr("age BETWEEN 18 AND 65 AND active = TRUE");
        let Expr::Binary { op, left, .. } = &expr else {
            panic!("expected binary");
        };
        assert_eq!(*op, BinaryOp::And);
        assert!(matches!(
            &**left,
            Expr::Binary { op: BinaryOp::Between, .. }
        ));
    }

    #[test]
    fn is_null_and_is_not_null() {
        let expr = parse_expr("email IS NULL");
        assert!(matches!(&expr, Expr::Binary { op: BinaryOp::Is, right, .. }
            if **right == Expr::Literal(Literal::Null)));

        let expr = parse_expr("email IS NOT NULL");
        assert!(matches!(&expr, Expr::Binary { op: BinaryOp::IsNot, right, .. }
            if **right == Expr::Literal(Literal::Null)));
    }

    #[test]
    fn is_without_null_is_error() {
        let err = expr_err("email IS 'x'");
        assert_eq!(err.kind, ErrorKind::UnexpectedToken);
    }

    #[test]
    fn not_in_wraps_positive_form() {
        let expr = parse_expr("status NOT IN (1, 2)");
        let Expr::Unary { op, expr } = &expr else {
            panic!("expected unary wrapper");
        };
        assert_eq!(*op, UnaryOp::Not);
        assert!(matches!(&**expr, Expr::Binary { op: BinaryOp::In, .. }));
    }

    #[test]
    fn not_like_wraps_positive_form() {
        let expr = parse_expr("name NOT LIKE 'A%'");
        assert!(matches!(&expr, Expr::Unary { op: UnaryOp::Not, expr }
            if matches!(&**expr, Expr::Binary { op: BinaryOp::Like, .. })));
    }

    #[test]
    fn any_quantifier_requires_subquery() {
        let expr = parse_expr("salary > ANY (SELECT salary FROM managers)");
        let Expr::Binary {
            op, quantifier, right, ..
        } = &expr
        else {
            panic!("expected binary");
        };
        assert_eq!(*op, BinaryOp::Gt);
        assert_eq!(*quantifier, Some(Quantifier::Any));
        assert!(matches!(&**right, Expr::Subquery { .. }));

        let err = expr_err("salary > ANY (1, 2)");
        assert_eq!(err.kind, ErrorKind::UnexpectedToken);
    }

    #[test]
    fn all_quantifier() {
        let expr = parse_expr("x = ALL (SELECT y FROM t)");
        assert!(matches!(&expr, Expr::Binary { quantifier: Some(Quantifier::All), .. }));
    }

    #[test]
    fn exists_subquery() {
        let expr = parse_expr("EXISTS (SELECT 1 FROM orders)");
        let Expr::Unary { op, expr } = &expr else {
            panic!("expected unary");
        };
        assert_eq!(*op, UnaryOp::Exists);
        assert!(matches!(&**expr, Expr::Subquery { .. }));
    }

    #[test]
    fn not_exists() {
        let expr = parse_expr("NOT EXISTS (SELECT 1 FROM orders)");
        assert!(matches!(&expr, Expr::Unary { op: UnaryOp::Not, expr }
            if matches!(&**expr, Expr::Unary { op: UnaryOp::Exists, .. })));
    }

    #[test]
    fn count_star_and_distinct() {
        let expr = parse_expr("COUNT(*)");
        let Expr::Function(call) = &expr else {
            panic!("expected function");
        };
        assert_eq!(call.args, vec![Expr::Literal(Literal::Star)]);
        assert!(!call.distinct);

        let expr = parse_expr("COUNT(DISTINCT user_id)");
        let Expr::Function(call) = &expr else {
            panic!("expected function");
        };
        assert!(call.distinct);
        assert_eq!(call.args.len(), 1);
    }

    #[test]
    fn extract_special_form() {
        let expr = parse_expr("EXTRACT(YEAR FROM created_at)");
        let Expr::Function(call) = &expr else {
            panic!("expected function");
        };
        assert!(call.extract);
        assert_eq!(call.args.len(), 2);
        assert_eq!(call.args[0], Expr::column("YEAR"));
        assert_eq!(call.args[1], Expr::column("created_at"));
    }

    #[test]
    fn interval_with_and_without_unit() {
        let expr = parse_expr("INTERVAL 7 DAY");
        assert!(matches!(&expr, Expr::Interval { unit: IntervalUnit::Day, .. }));

        let expr = parse_expr("INTERVAL '3' month");
        assert!(matches!(&expr, Expr::Interval { unit: IntervalUnit::Month, .. }));

        // No recognizable unit: defaults to DAY.
        let expr = parse_expr("INTERVAL 7");
        assert!(matches!(&expr, Expr::Interval { unit: IntervalUnit::Day, .. }));
    }

    #[test]
    fn case_with_operand() {
        let expr = parse_expr("CASE status WHEN 1 THEN 'open' WHEN 2 THEN 'held' ELSE 'done' END");
        let Expr::Case {
            operand,
            whens,
            else_expr,
        } = &expr
        else {
            panic!("expected case");
        };
        assert!(operand.is_some());
        assert_eq!(whens.len(), 2);
        assert!(else_expr.is_some());
    }

    #[test]
    fn case_without_operand() {
        let expr = parse_expr("CASE WHEN age < 18 THEN 'minor' END");
        let Expr::Case {
            operand,
            whens,
            else_expr,
        } = &expr
        else {
            panic!("expected case");
        };
        assert!(operand.is_none());
        assert_eq!(whens.len(), 1);
        assert!(else_expr.is_none());
    }

    #[test]
    fn case_requires_when() {
        let err = expr_err("CASE END");
        assert_eq!(err.kind, ErrorKind::UnexpectedToken);
    }

    #[test]
    fn window_function_with_frame() {
        let expr = parse_expr(
            "SUM(amount) OVER (PARTITION BY dept ORDER BY day \
             ROWS BETWEEN 2 PRECEDING AND CURRENT ROW)",
        );
        let Expr::WindowFunction { call, over } = &expr else {
            panic!("expected window function");
        };
        assert_eq!(call.name, "SUM");
        assert_eq!(over.partition_by.len(), 1);
        assert_eq!(over.order_by.len(), 1);
        let frame = over.frame.as_ref().expect("frame");
        assert_eq!(frame.kind, FrameKind::Rows);
        assert!(matches!(
            frame.start,
            FrameBound::Offset {
                direction: FrameDirection::Preceding,
                ..
            }
        ));
        assert_eq!(frame.end, Some(FrameBound::CurrentRow));
    }

    #[test]
    fn window_frame_single_bound_and_interval() {
        let expr = parse_expr(
            "AVG(x) OVER (ORDER BY ts RANGE INTERVAL 1 HOUR PRECEDING)",
        );
        let Expr::WindowFunction { over, .. } = &expr else {
            panic!("expected window function");
        };
        let frame = over.frame.as_ref().unwrap();
        assert_eq!(frame.kind, FrameKind::Range);
        assert!(frame.end.is_none());
        assert!(matches!(
            frame.start,
            FrameBound::Interval {
                unit: IntervalUnit::Hour,
                direction: FrameDirection::Preceding,
                ..
            }
        ));
    }

    #[test]
    fn unbounded_bounds() {
        let expr = parse_expr(
            "SUM(x) OVER (ROWS BETWEEN UNBOUNDED PRECEDING AND UNBOUNDED FOLLOWING)",
        );
        let Expr::WindowFunction { over, .. } = &expr else {
            panic!("expected window function");
        };
        let frame = over.frame.as_ref().unwrap();
        assert_eq!(frame.start, FrameBound::UnboundedPreceding);
        assert_eq!(frame.end, Some(FrameBound::UnboundedFollowing));
    }

    #[test]
    fn qualified_and_bare_columns() {
        assert_eq!(
            parse_expr("u.name"),
            Expr::Column(ColumnRef::qualified("u", "name"))
        );
        assert_eq!(parse_expr("name"), Expr::Column(ColumnRef::bare("name")));
    }

    #[test]
    fn unary_minus_binds_tight() {
        let expr = parse_expr("-a + b");
        let Expr::Binary { op, left, .. } = &expr else {
            panic!("expected binary");
        };
        assert_eq!(*op, BinaryOp::Add);
        assert!(matches!(&**left, Expr::Unary { op: UnaryOp::Neg, .. }));
    }

    #[test]
    fn deep_nesting_hits_guard() {
        let sql = format!("{}1{}", "(".repeat(300), ")".repeat(300));
        let err = expr_err(&sql);
        assert_eq!(err.kind, ErrorKind::SyntaxError);
    }
}
