//! Diagnostic types for the sqlprism SQL front-end.
//!
//! Every failure in the lexer, parser, or façade is reported as a single
//! [`SqlError`] value: a stable kind tag, a human-readable message, a
//! 1-based source position, and (when applicable) structured context for
//! programmatic inspection. Diagnostics are plain values; the façade
//! collects them into error lists on its result envelopes.

use serde::Serialize;
use thiserror::Error;

/// A 1-based line/column source position.
///
/// Positions point at the first character of the offending token, or at
/// end-of-input when the source ends prematurely.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Position {
    /// Line number, starting at 1.
    pub line: u32,
    /// Column number, starting at 1.
    pub column: u32,
}

impl Position {
    /// Create a position.
    #[must_use]
    pub const fn new(line: u32, column: u32) -> Self {
        Self { line, column }
    }

    /// The start of the input.
    pub const START: Self = Self { line: 1, column: 1 };
}

/// The stable kind tag carried by every diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorKind {
    /// Generic grammar violation.
    SyntaxError,
    /// The scanner hit a character sequence it cannot tokenize.
    LexicalError,
    /// A token was present but not the one the grammar requires.
    UnexpectedToken,
    /// The input ended where the grammar required more tokens.
    UnexpectedEnd,
    /// A string literal was opened but never closed.
    UnterminatedString,
    /// An identifier is malformed.
    InvalidIdentifier,
    /// A recognized construct this library does not support.
    UnsupportedFeature,
    /// The caller passed input the façade cannot work with.
    InvalidInput,
    /// The input contained no tokens at all.
    EmptyInput,
    /// A post-parse validation check failed.
    ValidationError,
    /// An internal failure that should never surface; wrapped, not panicked.
    UnexpectedError,
}

/// Structured context attached to a diagnostic for programmatic use.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorContext {
    /// What the parser required versus what it saw.
    Expected {
        /// Description of the required token(s).
        expected: String,
        /// The surface text of the token actually present.
        actual: String,
    },
}

/// A single diagnostic produced by the lexer, parser, or façade.
///
/// Formats as `"<message> at line L, column C"` when the position is set.
#[derive(Debug, Clone, PartialEq, Error, Serialize)]
#[error("{}", render(.message, .position))]
pub struct SqlError {
    /// Stable kind tag.
    pub kind: ErrorKind,
    /// Human-readable description.
    pub message: String,
    /// Source position, when one is known.
    pub position: Option<Position>,
    /// Structured context, when the kind carries one.
    pub context: Option<ErrorContext>,
}

fn render(message: &str, position: &Option<Position>) -> String {
    match position {
        Some(pos) => format!("{message} at line {}, column {}", pos.line, pos.column),
        None => message.to_owned(),
    }
}

impl SqlError {
    /// Build a diagnostic with an explicit kind and position.
    #[must_use]
    pub fn new(kind: ErrorKind, message: impl Into<String>, line: u32, column: u32) -> Self {
        Self {
            kind,
            message: message.into(),
            position: Some(Position::new(line, column)),
            context: None,
        }
    }

    /// Build a positionless diagnostic (façade-level failures).
    #[must_use]
    pub fn bare(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            position: None,
            context: None,
        }
    }

    /// Grammar violation at a known position.
    #[must_use]
    pub fn syntax(message: impl Into<String>, line: u32, column: u32) -> Self {
        Self::new(ErrorKind::SyntaxError, message, line, column)
    }

    /// Untokenizable input at a known position.
    #[must_use]
    pub fn lexical(message: impl Into<String>, line: u32, column: u32) -> Self {
        Self::new(ErrorKind::LexicalError, message, line, column)
    }

    /// A token was present but not the one required.
    ///
    /// Carries `{expected, actual}` context for programmatic inspection.
    #[must_use]
    pub fn unexpected_token(
        expected: impl Into<String>,
        actual: impl Into<String>,
        line: u32,
        column: u32,
    ) -> Self {
        let expected = expected.into();
        let actual = actual.into();
        Self {
            kind: ErrorKind::UnexpectedToken,
            message: format!("expected {expected}, found '{actual}'"),
            position: Some(Position::new(line, column)),
            context: Some(ErrorContext::Expected { expected, actual }),
        }
    }

    /// The input ended where more tokens were required.
    #[must_use]
    pub fn unexpected_end(expected: impl Into<String>, line: u32, column: u32) -> Self {
        let expected = expected.into();
        Self {
            kind: ErrorKind::UnexpectedEnd,
            message: format!("unexpected end of input, expected {expected}"),
            position: Some(Position::new(line, column)),
            context: None,
        }
    }

    /// A string literal was never closed; position is the opening quote.
    #[must_use]
    pub fn unterminated_string(line: u32, column: u32) -> Self {
        Self::new(
            ErrorKind::UnterminatedString,
            "unterminated string literal",
            line,
            column,
        )
    }

    /// The input contained no tokens.
    #[must_use]
    pub fn empty_input() -> Self {
        Self::new(ErrorKind::EmptyInput, "empty input", 1, 1)
    }

    /// A malformed identifier at a known position.
    #[must_use]
    pub fn invalid_identifier(message: impl Into<String>, line: u32, column: u32) -> Self {
        Self::new(ErrorKind::InvalidIdentifier, message, line, column)
    }

    /// A recognized construct this library does not support.
    #[must_use]
    pub fn unsupported_feature(message: impl Into<String>, line: u32, column: u32) -> Self {
        Self::new(ErrorKind::UnsupportedFeature, message, line, column)
    }

    /// The caller handed the façade input it cannot work with.
    #[must_use]
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::bare(ErrorKind::InvalidInput, message)
    }

    /// A post-parse validation check failed.
    #[must_use]
    pub fn validation(message: impl Into<String>) -> Self {
        Self::bare(ErrorKind::ValidationError, message)
    }

    /// Wrap an internal failure that should never surface.
    #[must_use]
    pub fn unexpected(message: impl Into<String>) -> Self {
        Self::bare(ErrorKind::UnexpectedError, message)
    }

    /// Whether this diagnostic was raised by the scanner rather than the
    /// grammar.
    #[must_use]
    pub const fn is_lexical(&self) -> bool {
        matches!(
            self.kind,
            ErrorKind::LexicalError | ErrorKind::UnterminatedString
        )
    }
}

/// Result alias used throughout the sqlprism crates.
pub type Result<T> = std::result::Result<T, SqlError>;
