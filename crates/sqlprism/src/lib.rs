//! Public API façade for sqlprism.
//!
//! sqlprism is a SQL front-end: it turns SQL text into a typed AST with
//! precise diagnostics, and can derive a structural description of SELECT
//! queries (conditions, output fields, tables, joins, complexity). Every
//! entry point here is a total function returning a typed envelope; a
//! failed parse yields `success: false` plus the diagnostic, never a
//! partial tree.
//!
//! ```
//! use sqlprism::{parse_sql, ParseOptions};
//!
//! let outcome = parse_sql("SELECT name FROM users WHERE age > 18", &ParseOptions::default());
//! assert!(outcome.success);
//! assert_eq!(outcome.tables, vec!["users"]);
//! ```

use serde::Serialize;

pub use sqlprism_analyzer::{
    analyze_select, analyze_statement, complexity, Complexity, ComplexityLevel, Condition,
    ConditionKind, FieldInfo, FieldKind, JoinCondition, JoinInfo, LimitInfo, OrderByInfo,
    QueryAnalysis, TableInfo,
};
pub use sqlprism_ast as ast;
pub use sqlprism_ast::Statement;
pub use sqlprism_error::{ErrorContext, ErrorKind, Position, SqlError};
pub use sqlprism_parser::{Lexer, LexerOptions, Parser, Token, TokenKind};

// ---------------------------------------------------------------------------
// Options and envelopes
// ---------------------------------------------------------------------------

/// Options accepted by every façade entry point.
#[derive(Debug, Clone, Default)]
pub struct ParseOptions {
    /// Reject trailing tokens after the statement (default false).
    pub strict: bool,
    /// Retain comment tokens in the token stream (default false).
    pub include_comments: bool,
    /// Return the token list alongside the AST (default false).
    pub include_tokens: bool,
    /// Informational dialect label; the grammar itself is dialect-agnostic.
    pub dialect: Option<String>,
}

/// Result envelope of [`parse_sql`].
#[derive(Debug, Clone, Serialize)]
pub struct ParseOutcome {
    /// Whether a statement was produced.
    pub success: bool,
    /// The parsed statement on success, `None` on failure.
    pub ast: Option<Statement>,
    /// Every table name in the AST, duplicates preserved for self-joins.
    pub tables: Vec<String>,
    /// Column names, de-duplicated in first-seen order.
    pub columns: Vec<String>,
    /// The diagnostics of a failed parse (one entry).
    pub errors: Vec<SqlError>,
    /// The token stream, when `include_tokens` was set.
    pub tokens: Option<Vec<Token>>,
}

/// Result envelope of [`validate_sql`].
#[derive(Debug, Clone, Serialize)]
pub struct Validation {
    pub valid: bool,
    pub errors: Vec<SqlError>,
}

/// The statement summary inside an [`AnalyzeOutcome`].
#[derive(Debug, Clone, Serialize)]
pub struct QuerySummary {
    /// Statement kind (`"SELECT"`, `"INSERT"`, …); `None` on failure.
    pub kind: Option<String>,
    /// The original SQL text.
    pub sql: String,
}

/// Result envelope of [`analyze_sql`].
#[derive(Debug, Clone, Serialize)]
pub struct AnalyzeOutcome {
    pub success: bool,
    pub query: QuerySummary,
    /// Structural description; empty fields for non-SELECT statements.
    pub analysis: QueryAnalysis,
    pub complexity: Complexity,
    pub ast: Option<Statement>,
    pub errors: Vec<SqlError>,
}

// ---------------------------------------------------------------------------
// Entry points
// ---------------------------------------------------------------------------

/// Tokenize without parsing. Honors `include_comments`.
pub fn tokenize(sql: &str, options: &ParseOptions) -> Result<Vec<Token>, SqlError> {
    let lexer_options = LexerOptions {
        include_whitespace: false,
        include_comments: options.include_comments,
    };
    Lexer::tokenize(sql, &lexer_options)
}

/// Parse one SQL statement into the result envelope.
pub fn parse_sql(sql: &str, options: &ParseOptions) -> ParseOutcome {
    let span = tracing::debug_span!(
        target: "sqlprism",
        "parse_sql",
        sql_len = sql.len(),
        dialect = options.dialect.as_deref().unwrap_or("generic"),
    );
    let _guard = span.enter();

    let tokens = match tokenize(sql, options) {
        Ok(tokens) => tokens,
        Err(error) => return failure(error, None),
    };
    let kept_tokens = options.include_tokens.then(|| tokens.clone());

    match guarded_parse(tokens, options.strict) {
        Ok(statement) => {
            let tables = sqlprism_ast::walk::collect_tables(&statement);
            let columns = sqlprism_ast::walk::collect_columns(&statement);
            ParseOutcome {
                success: true,
                ast: Some(statement),
                tables,
                columns,
                errors: Vec::new(),
                tokens: kept_tokens,
            }
        }
        Err(error) => {
            tracing::debug!(target: "sqlprism", error = %error, "parse failed");
            failure(error, kept_tokens)
        }
    }
}

/// Thin shim over [`parse_sql`]: `validate_sql(s).valid` is exactly
/// `parse_sql(s).success`.
pub fn validate_sql(sql: &str, options: &ParseOptions) -> Validation {
    let outcome = parse_sql(sql, options);
    Validation {
        valid: outcome.success,
        errors: outcome.errors,
    }
}

/// Best-effort table extraction; empty on parse failure.
#[must_use]
pub fn extract_tables(sql: &str) -> Vec<String> {
    parse_sql(sql, &ParseOptions::default()).tables
}

/// Best-effort column extraction; empty on parse failure.
#[must_use]
pub fn extract_columns(sql: &str) -> Vec<String> {
    parse_sql(sql, &ParseOptions::default()).columns
}

/// Parse and analyze one statement.
///
/// SELECT statements get the full structural description; other statement
/// kinds keep the analysis fields empty but still report their tables.
pub fn analyze_sql(sql: &str, options: &ParseOptions) -> AnalyzeOutcome {
    let outcome = parse_sql(sql, options);
    let Some(statement) = outcome.ast else {
        return AnalyzeOutcome {
            success: false,
            query: QuerySummary {
                kind: None,
                sql: sql.to_owned(),
            },
            analysis: QueryAnalysis::default(),
            complexity: complexity(&QueryAnalysis::default()),
            ast: None,
            errors: outcome.errors,
        };
    };

    let analysis = analyze_statement(&statement);
    let complexity = complexity(&analysis);
    AnalyzeOutcome {
        success: true,
        query: QuerySummary {
            kind: Some(statement.kind_name().to_owned()),
            sql: sql.to_owned(),
        },
        analysis,
        complexity,
        ast: Some(statement),
        errors: Vec::new(),
    }
}

// ---------------------------------------------------------------------------
// Internals
// ---------------------------------------------------------------------------

/// Run the parser behind a panic guard; an internal failure must surface
/// as a diagnostic, never as an unwind across the façade boundary.
fn guarded_parse(tokens: Vec<Token>, strict: bool) -> Result<Statement, SqlError> {
    let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
        Parser::parse_tokens(tokens, strict)
    }));
    match result {
        Ok(parsed) => parsed,
        Err(_) => {
            tracing::error!(target: "sqlprism", "parser panicked; reporting as unexpected error");
            Err(SqlError::unexpected("unexpected internal parser failure"))
        }
    }
}

fn failure(error: SqlError, tokens: Option<Vec<Token>>) -> ParseOutcome {
    ParseOutcome {
        success: false,
        ast: None,
        tables: Vec::new(),
        columns: Vec::new(),
        errors: vec![error],
        tokens,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validate_mirrors_parse_success() {
        let inputs = [
            "SELECT * FROM users",
            "SELECT",
            "",
            "INSERT INTO t (a) VALUES (1)",
            "DROP TABLE t",
            "SELECT 'unterminated",
        ];
        for sql in inputs {
            let options = ParseOptions::default();
            assert_eq!(
                validate_sql(sql, &options).valid,
                parse_sql(sql, &options).success,
                "mismatch for {sql:?}"
            );
        }
    }

    #[test]
    fn extraction_is_empty_on_failure() {
        assert!(extract_tables("SELECT FROM WHERE").is_empty());
        assert!(extract_columns("not sql at all").is_empty());
    }

    #[test]
    fn include_tokens_returns_stream() {
        let options = ParseOptions {
            include_tokens: true,
            ..ParseOptions::default()
        };
        let outcome = parse_sql("SELECT 1", &options);
        let tokens = outcome.tokens.expect("tokens requested");
        assert_eq!(tokens.last().map(|t| t.kind), Some(TokenKind::Eof));

        let outcome = parse_sql("SELECT 1", &ParseOptions::default());
        assert!(outcome.tokens.is_none());
    }

    #[test]
    fn include_comments_keeps_comment_tokens() {
        let options = ParseOptions {
            include_tokens: true,
            include_comments: true,
            ..ParseOptions::default()
        };
        let outcome = parse_sql("SELECT 1 -- done", &options);
        assert!(outcome.success, "comments must not affect parsing");
        let tokens = outcome.tokens.unwrap();
        assert!(tokens.iter().any(|t| t.kind == TokenKind::Comment));
    }

    #[test]
    fn dialect_label_is_informational() {
        let options = ParseOptions {
            dialect: Some("postgres".to_owned()),
            ..ParseOptions::default()
        };
        assert!(parse_sql("SELECT 1", &options).success);
    }

    #[test]
    fn failed_parse_has_no_partial_ast() {
        let outcome = parse_sql("SELECT * FROM", &ParseOptions::default());
        assert!(!outcome.success);
        assert!(outcome.ast.is_none());
        assert_eq!(outcome.errors.len(), 1);
        assert_eq!(outcome.errors[0].kind, ErrorKind::UnexpectedEnd);
    }

    #[test]
    fn envelopes_serialize() {
        let outcome = parse_sql("SELECT id FROM t", &ParseOptions::default());
        let json = serde_json::to_value(&outcome).unwrap();
        assert_eq!(json["success"], serde_json::json!(true));
        assert_eq!(json["tables"][0], serde_json::json!("t"));
    }
}
