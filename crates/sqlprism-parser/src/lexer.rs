//! SQL lexer.
//!
//! Converts SQL text into a token stream with 1-based line/column tracking.
//! Uses memchr for accelerated delimiter scanning inside string literals
//! and block comments. The lexer is a pure function of its input: it
//! either returns a token list ending in exactly one `Eof`, or raises a
//! single lexical diagnostic.

use memchr::memchr;
use sqlprism_error::{Result, SqlError};

use crate::token::{Token, TokenKind};

/// Trivia emission options.
///
/// By default whitespace, newlines, and comments are skipped; callers that
/// want the full surface stream (formatters, highlighters) can opt in.
#[derive(Debug, Clone, Copy, Default)]
pub struct LexerOptions {
    /// Emit `Whitespace` tokens (and `Newline` for each `\n`).
    pub include_whitespace: bool,
    /// Emit `Comment` tokens with trimmed content.
    pub include_comments: bool,
}

/// SQL lexer over a UTF-8 source string.
pub struct Lexer<'a> {
    src: &'a [u8],
    pos: usize,
    line: u32,
    col: u32,
    options: LexerOptions,
}

impl<'a> Lexer<'a> {
    /// Create a new lexer for the given source text.
    #[must_use]
    pub fn new(source: &'a str, options: LexerOptions) -> Self {
        Self {
            src: source.as_bytes(),
            pos: 0,
            line: 1,
            col: 1,
            options,
        }
    }

    /// Tokenize the entire input.
    ///
    /// The returned list always ends in exactly one `Eof` token.
    pub fn tokenize(source: &'a str, options: &LexerOptions) -> Result<Vec<Token>> {
        let mut lexer = Self::new(source, *options);
        let mut tokens = Vec::new();
        loop {
            match lexer.next_token()? {
                Some(token) => tokens.push(token),
                None => continue,
            }
            if tokens.last().is_some_and(|t| t.kind == TokenKind::Eof) {
                break;
            }
        }
        Ok(tokens)
    }

    /// Scan the next token. Returns `None` when trivia was consumed but
    /// not requested.
    fn next_token(&mut self) -> Result<Option<Token>> {
        if self.pos >= self.src.len() {
            return Ok(Some(self.token_here(TokenKind::Eof, String::new())));
        }

        let start = self.pos;
        let line = self.line;
        let col = self.col;
        let ch = self.src[self.pos];

        // Trivia first: whitespace, newlines, comments.
        if ch == b'\n' {
            self.advance();
            return Ok(self
                .options
                .include_whitespace
                .then(|| self.token_at(TokenKind::Newline, "\n".to_owned(), start, line, col)));
        }
        if ch.is_ascii_whitespace() {
            while self.pos < self.src.len()
                && self.src[self.pos] != b'\n'
                && self.src[self.pos].is_ascii_whitespace()
            {
                self.advance();
            }
            let text = String::from_utf8_lossy(&self.src[start..self.pos]).into_owned();
            return Ok(self
                .options
                .include_whitespace
                .then(|| self.token_at(TokenKind::Whitespace, text, start, line, col)));
        }
        if ch == b'-' && self.peek_at(1) == Some(b'-') {
            return self.lex_line_comment(2, start, line, col);
        }
        if ch == b'#' {
            return self.lex_line_comment(1, start, line, col);
        }
        if ch == b'/' && self.peek_at(1) == Some(b'*') {
            return self.lex_block_comment(start, line, col);
        }

        let token = match ch {
            b'\'' => self.lex_string(start, line, col)?,
            b'"' | b'`' => self.lex_quoted_identifier(ch, start, line, col)?,
            b'0'..=b'9' => self.lex_number(start, line, col)?,
            b'a'..=b'z' | b'A'..=b'Z' | b'_' => self.lex_identifier(start, line, col),
            _ => self.lex_operator(start, line, col)?,
        };
        Ok(Some(token))
    }

    // -----------------------------------------------------------------------
    // Helpers
    // -----------------------------------------------------------------------

    fn advance(&mut self) -> u8 {
        let ch = self.src[self.pos];
        self.pos += 1;
        if ch == b'\n' {
            self.line += 1;
            self.col = 1;
        } else if ch & 0xC0 != 0x80 {
            // Count characters, not UTF-8 continuation bytes.
            self.col += 1;
        }
        ch
    }

    fn peek(&self) -> Option<u8> {
        self.src.get(self.pos).copied()
    }

    fn peek_at(&self, offset: usize) -> Option<u8> {
        self.src.get(self.pos + offset).copied()
    }

    fn token_here(&self, kind: TokenKind, text: String) -> Token {
        Token {
            kind,
            text,
            line: self.line,
            column: self.col,
            start: self.pos,
            end: self.pos,
        }
    }

    fn token_at(&self, kind: TokenKind, text: String, start: usize, line: u32, col: u32) -> Token {
        Token {
            kind,
            text,
            line,
            column: col,
            start,
            end: self.pos,
        }
    }

    fn raw_text(&self, start: usize) -> String {
        String::from_utf8_lossy(&self.src[start..self.pos]).into_owned()
    }

    // -----------------------------------------------------------------------
    // Trivia
    // -----------------------------------------------------------------------

    /// `--…EOL` and `#…EOL`; the content is trimmed.
    fn lex_line_comment(
        &mut self,
        marker_len: usize,
        start: usize,
        line: u32,
        col: u32,
    ) -> Result<Option<Token>> {
        for _ in 0..marker_len {
            self.advance();
        }
        let body_start = self.pos;
        while self.pos < self.src.len() && self.src[self.pos] != b'\n' {
            self.advance();
        }
        let text = String::from_utf8_lossy(&self.src[body_start..self.pos])
            .trim()
            .to_owned();
        Ok(self
            .options
            .include_comments
            .then(|| self.token_at(TokenKind::Comment, text, start, line, col)))
    }

    /// `/* … */`, not nested. Unterminated is a lexical error at the
    /// opening position.
    fn lex_block_comment(&mut self, start: usize, line: u32, col: u32) -> Result<Option<Token>> {
        self.advance(); // `/`
        self.advance(); // `*`
        let body_start = self.pos;
        loop {
            let remaining = &self.src[self.pos..];
            match memchr(b'*', remaining) {
                Some(offset) => {
                    for _ in 0..offset {
                        self.advance();
                    }
                    if self.peek_at(1) == Some(b'/') {
                        let body_end = self.pos;
                        self.advance(); // `*`
                        self.advance(); // `/`
                        let text = String::from_utf8_lossy(&self.src[body_start..body_end])
                            .trim()
                            .to_owned();
                        return Ok(self.options.include_comments.then(|| {
                            self.token_at(TokenKind::Comment, text, start, line, col)
                        }));
                    }
                    self.advance(); // lone `*`
                }
                None => {
                    return Err(SqlError::lexical("unterminated block comment", line, col));
                }
            }
        }
    }

    // -----------------------------------------------------------------------
    // Literals and identifiers
    // -----------------------------------------------------------------------

    /// Consume the body of a quoted region up to `delim`, applying the
    /// backslash escapes `\n` `\t` `\r` `\\` `\'` `\"`; any other `\x`
    /// yields `x`. Returns the unescaped content, or `None` when the
    /// input ends before the closing delimiter.
    fn lex_quoted_body(&mut self, delim: u8) -> Option<String> {
        self.advance(); // opening delimiter
        let mut value: Vec<u8> = Vec::new();
        while let Some(ch) = self.peek() {
            if ch == delim {
                self.advance();
                return Some(String::from_utf8_lossy(&value).into_owned());
            }
            if ch == b'\\' {
                self.advance();
                let escaped = self.peek()?;
                self.advance();
                match escaped {
                    b'n' => value.push(b'\n'),
                    b't' => value.push(b'\t'),
                    b'r' => value.push(b'\r'),
                    other => value.push(other),
                }
                continue;
            }
            self.advance();
            value.push(ch);
        }
        None
    }

    /// Single-quoted string literal.
    fn lex_string(&mut self, start: usize, line: u32, col: u32) -> Result<Token> {
        match self.lex_quoted_body(b'\'') {
            Some(value) => Ok(self.token_at(TokenKind::String, value, start, line, col)),
            None => Err(SqlError::unterminated_string(line, col)),
        }
    }

    /// Double-quote or backtick quoted identifier.
    fn lex_quoted_identifier(
        &mut self,
        delim: u8,
        start: usize,
        line: u32,
        col: u32,
    ) -> Result<Token> {
        match self.lex_quoted_body(delim) {
            Some(value) => Ok(self.token_at(TokenKind::Identifier, value, start, line, col)),
            None => Err(SqlError::lexical("unterminated quoted identifier", line, col)),
        }
    }

    /// Numeric literal: integer part, optional fraction (only when a digit
    /// follows the dot), optional exponent with at least one digit.
    fn lex_number(&mut self, start: usize, line: u32, col: u32) -> Result<Token> {
        while self.peek().is_some_and(|c| c.is_ascii_digit()) {
            self.advance();
        }

        if self.peek() == Some(b'.') && self.peek_at(1).is_some_and(|c| c.is_ascii_digit()) {
            self.advance(); // `.`
            while self.peek().is_some_and(|c| c.is_ascii_digit()) {
                self.advance();
            }
        }

        if matches!(self.peek(), Some(b'e' | b'E')) {
            let exp_line = self.line;
            let exp_col = self.col;
            self.advance();
            if matches!(self.peek(), Some(b'+' | b'-')) {
                self.advance();
            }
            if !self.peek().is_some_and(|c| c.is_ascii_digit()) {
                return Err(SqlError::lexical(
                    "malformed numeric exponent",
                    exp_line,
                    exp_col,
                ));
            }
            while self.peek().is_some_and(|c| c.is_ascii_digit()) {
                self.advance();
            }
        }

        Ok(self.token_at(TokenKind::Number, self.raw_text(start), start, line, col))
    }

    /// Identifier or keyword: `[A-Za-z_][A-Za-z0-9_]*`.
    fn lex_identifier(&mut self, start: usize, line: u32, col: u32) -> Token {
        self.advance();
        while self
            .peek()
            .is_some_and(|c| c.is_ascii_alphanumeric() || c == b'_')
        {
            self.advance();
        }
        let text = self.raw_text(start);
        let kind = TokenKind::lookup_keyword(&text).unwrap_or(TokenKind::Identifier);
        self.token_at(kind, text, start, line, col)
    }

    // -----------------------------------------------------------------------
    // Operators and punctuation
    // -----------------------------------------------------------------------

    fn lex_operator(&mut self, start: usize, line: u32, col: u32) -> Result<Token> {
        let ch = self.advance();
        let kind = match ch {
            b';' => TokenKind::Semicolon,
            b',' => TokenKind::Comma,
            b'.' => TokenKind::Dot,
            b'(' => TokenKind::LeftParen,
            b')' => TokenKind::RightParen,
            b'[' => TokenKind::LeftBracket,
            b']' => TokenKind::RightBracket,
            b'=' => TokenKind::Eq,
            b'+' => TokenKind::Plus,
            b'-' => TokenKind::Minus,
            b'*' => TokenKind::Star,
            b'/' => TokenKind::Slash,
            b'%' => TokenKind::Percent,
            b'<' => match self.peek() {
                Some(b'=') => {
                    self.advance();
                    TokenKind::LtEq
                }
                Some(b'>') => {
                    self.advance();
                    TokenKind::LtGt
                }
                _ => TokenKind::Lt,
            },
            b'>' => {
                if self.peek() == Some(b'=') {
                    self.advance();
                    TokenKind::GtEq
                } else {
                    TokenKind::Gt
                }
            }
            b'!' => {
                if self.peek() == Some(b'=') {
                    self.advance();
                    TokenKind::NotEq
                } else {
                    return Err(SqlError::lexical(
                        "unexpected '!', did you mean '!='?",
                        line,
                        col,
                    ));
                }
            }
            b'|' => {
                if self.peek() == Some(b'|') {
                    self.advance();
                    TokenKind::Concat
                } else {
                    return Err(SqlError::lexical("unexpected '|', did you mean '||'?", line, col));
                }
            }
            other => {
                return Err(SqlError::lexical(
                    format!("unexpected character '{}'", other as char),
                    line,
                    col,
                ));
            }
        };
        Ok(self.token_at(kind, self.raw_text(start), start, line, col))
    }
}
