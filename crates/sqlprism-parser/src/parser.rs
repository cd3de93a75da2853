//! Recursive-descent SQL parser.
//!
//! Statements and clauses live here; the expression grammar (precedence
//! climbing) is in `expr.rs`. The parser consumes a trivia-filtered token
//! vector in a single pass and either produces one [`Statement`] or one
//! [`SqlError`]; no partial trees are surfaced.

use sqlprism_ast::{
    Assignment, Cte, DeleteStatement, FromClause, InsertStatement, JoinClause, JoinKind,
    LimitClause, OrderByItem, Query, SelectItem, SelectStatement, SortDirection, Statement,
    TableRef, UnionStatement, UpdateStatement, WithClause,
};
use sqlprism_error::{Result, SqlError};

use crate::lexer::{Lexer, LexerOptions};
use crate::token::{Token, TokenKind};

/// Hard bound on grammar recursion (expressions, nested subqueries).
pub const MAX_PARSE_DEPTH: u32 = 200;

/// Recursive-descent parser over a materialized token stream.
pub struct Parser {
    pub(crate) tokens: Vec<Token>,
    pub(crate) pos: usize,
    pub(crate) depth: u32,
}

impl Parser {
    /// Build a parser from pre-lexed tokens. Trivia tokens are filtered
    /// out; a terminating `Eof` is appended when the caller left it off.
    #[must_use]
    pub fn new(tokens: Vec<Token>) -> Self {
        let mut tokens: Vec<Token> = tokens
            .into_iter()
            .filter(|t| !t.kind.is_trivia())
            .collect();
        if tokens.last().map_or(true, |t| t.kind != TokenKind::Eof) {
            let (line, column, offset) = tokens
                .last()
                .map_or((1, 1, 0), |t| (t.line, t.column, t.end));
            tokens.push(Token {
                kind: TokenKind::Eof,
                text: String::new(),
                line,
                column,
                start: offset,
                end: offset,
            });
        }
        Self {
            tokens,
            pos: 0,
            depth: 0,
        }
    }

    /// Lex and parse a single statement.
    ///
    /// In strict mode any trailing non-EOF token (a stray `;` included) is
    /// an error; otherwise trailing tokens are tolerated silently.
    pub fn parse(sql: &str, strict: bool) -> Result<Statement> {
        let span = tracing::debug_span!(target: "sqlprism.parse", "parse", sql_len = sql.len());
        let _guard = span.enter();

        let result = Lexer::tokenize(sql, &LexerOptions::default())
            .and_then(|tokens| Self::parse_tokens(tokens, strict));
        if let Err(ref error) = result {
            tracing::warn!(target: "sqlprism.parse", error = %error, "parse failed");
        }
        result
    }

    /// Parse a single statement from pre-lexed tokens.
    pub fn parse_tokens(tokens: Vec<Token>, strict: bool) -> Result<Statement> {
        let mut parser = Self::new(tokens);
        let statement = parser.parse_statement()?;
        if strict && !parser.at_eof() {
            let tok = parser.current();
            return Err(SqlError::unexpected_token(
                "end of input",
                tok.describe(),
                tok.line,
                tok.column,
            ));
        }
        Ok(statement)
    }

    /// Parse one statement from the current position.
    pub fn parse_statement(&mut self) -> Result<Statement> {
        if self.at_eof() {
            return Err(SqlError::empty_input());
        }
        match self.peek() {
            TokenKind::KwWith => self.parse_with_statement(),
            TokenKind::KwSelect => {
                let query = self.parse_query()?;
                Ok(Statement::from(query))
            }
            TokenKind::KwInsert => self.parse_insert().map(Statement::Insert),
            TokenKind::KwUpdate => self.parse_update().map(Statement::Update),
            TokenKind::KwDelete => self.parse_delete().map(Statement::Delete),
            _ => {
                let tok = self.current();
                Err(SqlError::unexpected_token(
                    "one of WITH, SELECT, INSERT, UPDATE, DELETE",
                    tok.describe(),
                    tok.line,
                    tok.column,
                ))
            }
        }
    }

    // -----------------------------------------------------------------------
    // Token navigation
    // -----------------------------------------------------------------------

    pub(crate) fn peek(&self) -> TokenKind {
        self.tokens.get(self.pos).map_or(TokenKind::Eof, |t| t.kind)
    }

    pub(crate) fn peek_nth(&self, n: usize) -> TokenKind {
        self.tokens
            .get(self.pos + n)
            .map_or(TokenKind::Eof, |t| t.kind)
    }

    /// The current token; the stream always holds at least the EOF token.
    pub(crate) fn current(&self) -> &Token {
        &self.tokens[self.pos.min(self.tokens.len() - 1)]
    }

    pub(crate) fn at_eof(&self) -> bool {
        self.peek() == TokenKind::Eof
    }

    /// Consume and return the current token; EOF is never consumed.
    pub(crate) fn advance(&mut self) -> Token {
        let tok = self.current().clone();
        if tok.kind != TokenKind::Eof {
            self.pos += 1;
        }
        tok
    }

    pub(crate) fn check(&self, kind: TokenKind) -> bool {
        self.peek() == kind
    }

    pub(crate) fn eat(&mut self, kind: TokenKind) -> bool {
        if self.check(kind) {
            self.advance();
            true
        } else {
            false
        }
    }

    pub(crate) fn expect(&mut self, kind: TokenKind, what: &str) -> Result<Token> {
        if self.check(kind) {
            Ok(self.advance())
        } else {
            Err(self.err_expected(what))
        }
    }

    /// `UnexpectedEnd` when the stream ran out, `UnexpectedToken` otherwise.
    pub(crate) fn err_expected(&self, what: &str) -> SqlError {
        let tok = self.current();
        tracing::debug!(
            target: "sqlprism.parse",
            expected = what,
            found = tok.describe(),
            line = tok.line,
            column = tok.column,
            "unexpected token"
        );
        if tok.kind == TokenKind::Eof {
            SqlError::unexpected_end(what, tok.line, tok.column)
        } else {
            SqlError::unexpected_token(what, tok.describe(), tok.line, tok.column)
        }
    }

    pub(crate) fn enter_recursion(&mut self) -> Result<()> {
        if self.depth >= MAX_PARSE_DEPTH {
            let tok = self.current();
            tracing::debug!(
                target: "sqlprism.parse",
                line = tok.line,
                column = tok.column,
                "recursion limit hit"
            );
            return Err(SqlError::syntax(
                format!("statement is nested too deeply (maximum depth {MAX_PARSE_DEPTH})"),
                tok.line,
                tok.column,
            ));
        }
        self.depth += 1;
        Ok(())
    }

    pub(crate) fn leave_recursion(&mut self) {
        self.depth = self.depth.saturating_sub(1);
    }

    // -----------------------------------------------------------------------
    // Names and aliases
    // -----------------------------------------------------------------------

    /// An identifier, or a keyword that may stand in for one.
    pub(crate) fn parse_name(&mut self, what: &str) -> Result<String> {
        if self.peek() == TokenKind::Identifier || self.peek().is_aliasable() {
            Ok(self.advance().text)
        } else {
            Err(self.err_expected(what))
        }
    }

    /// `AS <alias>` or an adjacent aliasable token; `AS` followed by a
    /// non-aliasable token is an error.
    fn parse_alias(&mut self) -> Result<Option<String>> {
        if self.eat(TokenKind::KwAs) {
            if self.peek().is_aliasable() {
                return Ok(Some(self.advance().text));
            }
            return Err(self.err_expected("alias"));
        }
        if self.peek().is_aliasable() {
            return Ok(Some(self.advance().text));
        }
        Ok(None)
    }

    // -----------------------------------------------------------------------
    // WITH / queries / UNION chaining
    // -----------------------------------------------------------------------

    fn parse_with_statement(&mut self) -> Result<Statement> {
        let with = self.parse_with_clause()?;
        if !self.check(TokenKind::KwSelect) {
            return Err(self.err_expected("SELECT"));
        }
        let mut query = self.parse_query()?;
        // The WITH clause attaches to the outermost node of the query.
        match &mut query {
            Query::Select(select) => select.with = Some(with),
            Query::Union(union) => union.with = Some(with),
        }
        Ok(Statement::from(query))
    }

    fn parse_with_clause(&mut self) -> Result<WithClause> {
        self.expect(TokenKind::KwWith, "WITH")?;
        let recursive = self.eat(TokenKind::KwRecursive);
        let mut ctes = Vec::new();
        loop {
            ctes.push(self.parse_cte()?);
            if !self.eat(TokenKind::Comma) {
                break;
            }
        }
        Ok(WithClause { recursive, ctes })
    }

    fn parse_cte(&mut self) -> Result<Cte> {
        let name = self.parse_name("common table expression name")?;
        let mut columns = Vec::new();
        if self.eat(TokenKind::LeftParen) {
            loop {
                columns.push(self.parse_name("column name")?);
                if !self.eat(TokenKind::Comma) {
                    break;
                }
            }
            self.expect(TokenKind::RightParen, ")")?;
        }
        self.expect(TokenKind::KwAs, "AS")?;
        self.expect(TokenKind::LeftParen, "(")?;
        let query = self.parse_query()?;
        self.expect(TokenKind::RightParen, ")")?;
        Ok(Cte {
            name,
            columns,
            query,
        })
    }

    /// A UNION-capable query with optional trailing ORDER BY / LIMIT that
    /// attach to the outermost node only.
    pub(crate) fn parse_query(&mut self) -> Result<Query> {
        self.enter_recursion()?;
        let result = self.parse_query_inner();
        self.leave_recursion();
        result
    }

    fn parse_query_inner(&mut self) -> Result<Query> {
        let mut query = self.parse_union_chain()?;

        let order_by = if self.check(TokenKind::KwOrder) {
            self.parse_order_by()?
        } else {
            Vec::new()
        };
        let limit = if self.check(TokenKind::KwLimit) {
            Some(self.parse_limit()?)
        } else {
            None
        };

        match &mut query {
            Query::Select(select) => {
                select.order_by = order_by;
                select.limit = limit;
            }
            Query::Union(union) => {
                union.order_by = order_by;
                union.limit = limit;
            }
        }
        Ok(query)
    }

    /// Right-associative `UNION [ALL]` chain; the inner selects never
    /// carry ORDER BY / LIMIT.
    fn parse_union_chain(&mut self) -> Result<Query> {
        let left = Query::Select(Box::new(self.parse_select_core()?));
        if self.eat(TokenKind::KwUnion) {
            let all = self.eat(TokenKind::KwAll);
            let right = self.parse_union_chain()?;
            return Ok(Query::Union(Box::new(UnionStatement {
                with: None,
                left,
                right,
                all,
                order_by: Vec::new(),
                limit: None,
            })));
        }
        Ok(left)
    }

    // -----------------------------------------------------------------------
    // SELECT
    // -----------------------------------------------------------------------

    /// `SELECT [DISTINCT] items [FROM …] [WHERE …] [GROUP BY …] [HAVING …]`.
    fn parse_select_core(&mut self) -> Result<SelectStatement> {
        self.expect(TokenKind::KwSelect, "SELECT")?;
        let distinct = self.eat(TokenKind::KwDistinct);

        let mut columns = Vec::new();
        loop {
            columns.push(self.parse_select_item()?);
            if !self.eat(TokenKind::Comma) {
                break;
            }
        }

        let from = if self.eat(TokenKind::KwFrom) {
            Some(self.parse_from_clause()?)
        } else {
            None
        };

        let where_clause = if self.eat(TokenKind::KwWhere) {
            Some(self.parse_expr()?)
        } else {
            None
        };

        let mut group_by = Vec::new();
        if self.eat(TokenKind::KwGroup) {
            self.expect(TokenKind::KwBy, "BY")?;
            loop {
                group_by.push(self.parse_expr()?);
                if !self.eat(TokenKind::Comma) {
                    break;
                }
            }
        }

        let having = if self.eat(TokenKind::KwHaving) {
            Some(self.parse_expr()?)
        } else {
            None
        };

        Ok(SelectStatement {
            with: None,
            distinct,
            columns,
            from,
            where_clause,
            group_by,
            having,
            order_by: Vec::new(),
            limit: None,
        })
    }

    fn parse_select_item(&mut self) -> Result<SelectItem> {
        if self.check(TokenKind::Star) {
            self.advance();
            return Ok(SelectItem::Wildcard);
        }
        let expr = self.parse_expr()?;
        let alias = self.parse_alias()?;
        Ok(SelectItem::Expr { expr, alias })
    }

    // -----------------------------------------------------------------------
    // FROM and joins
    // -----------------------------------------------------------------------

    fn parse_from_clause(&mut self) -> Result<FromClause> {
        let mut tables = Vec::new();
        let mut joins = Vec::new();
        loop {
            tables.push(self.parse_table_ref()?);
            joins.append(&mut self.parse_joins()?);
            if !self.eat(TokenKind::Comma) {
                break;
            }
        }
        Ok(FromClause { tables, joins })
    }

    /// A parenthesized subquery (lookahead on `( SELECT`) or a plain
    /// `[schema.]table [AS alias | alias]` reference.
    pub(crate) fn parse_table_ref(&mut self) -> Result<TableRef> {
        if self.check(TokenKind::LeftParen) {
            if self.peek_nth(1) == TokenKind::KwSelect {
                self.advance(); // `(`
                let query = self.parse_query()?;
                self.expect(TokenKind::RightParen, ")")?;
                let alias = self.parse_alias()?;
                return Ok(TableRef::Subquery {
                    query: Box::new(query),
                    alias,
                });
            }
            // `(` not opening a subquery cannot start a table reference.
            return Err(self.err_expected("table name or subquery"));
        }

        let first = self.parse_name("table name")?;
        let (schema, name) = if self.eat(TokenKind::Dot) {
            (Some(first), self.parse_name("table name")?)
        } else {
            (None, first)
        };
        let alias = self.parse_alias()?;
        Ok(TableRef::Table {
            name,
            alias,
            schema,
        })
    }

    fn parse_joins(&mut self) -> Result<Vec<JoinClause>> {
        let mut joins = Vec::new();
        while let Some(kind) = self.parse_join_kind()? {
            let table = self.parse_table_ref()?;
            let on = if kind == JoinKind::Cross {
                None
            } else {
                self.expect(TokenKind::KwOn, "ON")?;
                Some(self.parse_expr()?)
            };
            joins.push(JoinClause { kind, table, on });
        }
        Ok(joins)
    }

    /// Consume a join prefix if one is present: `INNER`, `LEFT [OUTER]`,
    /// `RIGHT [OUTER]`, `FULL [OUTER]`, `CROSS`, or bare `JOIN` (= INNER).
    fn parse_join_kind(&mut self) -> Result<Option<JoinKind>> {
        let kind = match self.peek() {
            TokenKind::KwJoin => {
                self.advance();
                return Ok(Some(JoinKind::Inner));
            }
            TokenKind::KwInner => {
                self.advance();
                JoinKind::Inner
            }
            TokenKind::KwLeft => {
                self.advance();
                if self.eat(TokenKind::KwOuter) {
                    JoinKind::LeftOuter
                } else {
                    JoinKind::Left
                }
            }
            TokenKind::KwRight => {
                self.advance();
                if self.eat(TokenKind::KwOuter) {
                    JoinKind::RightOuter
                } else {
                    JoinKind::Right
                }
            }
            TokenKind::KwFull => {
                self.advance();
                if self.eat(TokenKind::KwOuter) {
                    JoinKind::FullOuter
                } else {
                    JoinKind::Full
                }
            }
            TokenKind::KwCross => {
                self.advance();
                JoinKind::Cross
            }
            _ => return Ok(None),
        };
        self.expect(TokenKind::KwJoin, "JOIN")?;
        Ok(Some(kind))
    }

    // -----------------------------------------------------------------------
    // ORDER BY / LIMIT
    // -----------------------------------------------------------------------

    pub(crate) fn parse_order_by(&mut self) -> Result<Vec<OrderByItem>> {
        self.expect(TokenKind::KwOrder, "ORDER")?;
        self.expect(TokenKind::KwBy, "BY")?;
        let mut items = Vec::new();
        loop {
            let expr = self.parse_expr()?;
            let direction = if self.eat(TokenKind::KwDesc) {
                SortDirection::Desc
            } else {
                self.eat(TokenKind::KwAsc);
                SortDirection::Asc
            };
            items.push(OrderByItem { expr, direction });
            if !self.eat(TokenKind::Comma) {
                break;
            }
        }
        Ok(items)
    }

    fn parse_limit(&mut self) -> Result<LimitClause> {
        self.expect(TokenKind::KwLimit, "LIMIT")?;
        let count = self.parse_expr()?;
        let offset = if self.eat(TokenKind::KwOffset) {
            Some(self.parse_expr()?)
        } else {
            None
        };
        Ok(LimitClause { count, offset })
    }

    // -----------------------------------------------------------------------
    // INSERT / UPDATE / DELETE
    // -----------------------------------------------------------------------

    fn parse_insert(&mut self) -> Result<InsertStatement> {
        self.expect(TokenKind::KwInsert, "INSERT")?;
        self.expect(TokenKind::KwInto, "INTO")?;
        let table = self.parse_table_ref()?;

        let mut columns = Vec::new();
        if self.eat(TokenKind::LeftParen) {
            loop {
                columns.push(self.parse_name("column name")?);
                if !self.eat(TokenKind::Comma) {
                    break;
                }
            }
            self.expect(TokenKind::RightParen, ")")?;
        }

        self.expect(TokenKind::KwValues, "VALUES")?;
        let mut rows = Vec::new();
        loop {
            self.expect(TokenKind::LeftParen, "(")?;
            let mut row = Vec::new();
            loop {
                row.push(self.parse_expr()?);
                if !self.eat(TokenKind::Comma) {
                    break;
                }
            }
            self.expect(TokenKind::RightParen, ")")?;
            rows.push(row);
            if !self.eat(TokenKind::Comma) {
                break;
            }
        }

        Ok(InsertStatement {
            table,
            columns,
            rows,
        })
    }

    fn parse_update(&mut self) -> Result<UpdateStatement> {
        self.expect(TokenKind::KwUpdate, "UPDATE")?;
        let table = self.parse_table_ref()?;
        self.expect(TokenKind::KwSet, "SET")?;

        let mut assignments = Vec::new();
        loop {
            let column = self.parse_name("column name")?;
            self.expect(TokenKind::Eq, "=")?;
            let value = self.parse_expr()?;
            assignments.push(Assignment { column, value });
            if !self.eat(TokenKind::Comma) {
                break;
            }
        }

        let where_clause = if self.eat(TokenKind::KwWhere) {
            Some(self.parse_expr()?)
        } else {
            None
        };

        Ok(UpdateStatement {
            table,
            assignments,
            where_clause,
        })
    }

    fn parse_delete(&mut self) -> Result<DeleteStatement> {
        self.expect(TokenKind::KwDelete, "DELETE")?;
        self.expect(TokenKind::KwFrom, "FROM")?;
        let table = self.parse_table_ref()?;
        let where_clause = if self.eat(TokenKind::KwWhere) {
            Some(self.parse_expr()?)
        } else {
            None
        };
        Ok(DeleteStatement {
            table,
            where_clause,
        })
    }
}
