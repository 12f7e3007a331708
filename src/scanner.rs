//! Module `scanner` implements a one‑pass, indentation‑aware lexer for Mython.
//!
//! It transforms source text into a sequence of `Token<'a>`s.  Besides the
//! usual punctuation, literals and keywords, the scanner synthesises the
//! layout tokens that carry the block structure of the language:
//!
//! - `NEWLINE` closes every line that produced at least one token,
//! - `INDENT` / `DEDENT` are emitted whenever the leading indentation of a
//!   line differs from the previous non‑blank line (one level = two spaces),
//! - at end of input the last line is closed, all open levels are dedented,
//!   and exactly one `EOF` is emitted.
//!
//! Blank lines and comment‑only lines are invisible: they yield no tokens and
//! never change the indentation level.  Designed as a `FusedIterator`, it can
//! be chained safely with other iterator adapters.
//!
//! # Example
//!
//! ```rust
//! use mython::scanner::Scanner;
//!
//! let mut scanner = Scanner::new("print 123 # example\n");
//! for result in &mut scanner {
//!     match result {
//!         Ok(token) => println!("{}", token),
//!         Err(err) => eprintln!("Lex error: {}", err),
//!     }
//! }
//! ```

use crate::error::{MythonError, Result};
use crate::token::{Token, TokenType};
use log::{debug, info};
use memchr::memchr;
use phf::phf_map;
use std::collections::VecDeque;
use std::iter::FusedIterator;

// ─────────────────────────────────────────────────────────────────────────────
// Static keyword map (compile‑time perfect hash)
// ─────────────────────────────────────────────────────────────────────────────

static KEYWORDS: phf::Map<&'static [u8], TokenType> = phf_map! {
    b"and"    => TokenType::AND,
    b"class"  => TokenType::CLASS,
    b"def"    => TokenType::DEF,
    b"else"   => TokenType::ELSE,
    b"False"  => TokenType::FALSE,
    b"if"     => TokenType::IF,
    b"None"   => TokenType::NONE,
    b"not"    => TokenType::NOT,
    b"or"     => TokenType::OR,
    b"print"  => TokenType::PRINT,
    b"return" => TokenType::RETURN,
    b"True"   => TokenType::TRUE,
};

/// Number of spaces forming one indentation level.
const INDENT_WIDTH: usize = 2;

/// A single pass **scanner / lexer** that converts Mython source into a
/// sequence of [`Token`]s.  The lifetime `'a` ties every emitted token’s
/// `lexeme` slice back to the original source buffer.
pub struct Scanner<'a> {
    source: &'a str,
    src: &'a [u8],
    start: usize,               // index of the *first* byte of the current lexeme
    curr: usize,                // index *one past* the last byte examined
    line: usize,                // 1‑based line counter (\n increments)
    pending: Option<TokenType>, // recognised token kind waiting to be emitted
    queued: VecDeque<Token<'a>>, // layout tokens waiting to be emitted
    indent: usize,              // current indentation level
    at_line_start: bool,
    line_has_tokens: bool,
    finished: bool,
}

impl<'a> Scanner<'a> {
    /// Create a new lexer over `source`.
    #[inline]
    pub fn new(source: &'a str) -> Self {
        info!("Scanner created over {} bytes", source.len());

        Self {
            source,
            src: source.as_bytes(),
            start: 0,
            curr: 0,
            line: 1,
            pending: None,
            queued: VecDeque::new(),
            indent: 0,
            at_line_start: true,
            line_has_tokens: false,
            finished: false,
        }
    }

    // ───────────────────────────── primitive helpers ────────────────────────

    #[inline(always)]
    const fn len(&self) -> usize {
        self.src.len()
    }

    #[inline(always)]
    fn is_at_end(&self) -> bool {
        self.curr >= self.len()
    }

    /// Advance one byte and return it.  Callers guard with [`Self::is_at_end`].
    #[inline(always)]
    fn advance(&mut self) -> u8 {
        let b = self.src[self.curr];
        self.curr += 1;
        b
    }

    /// Peek at the current byte without consuming it.  Returns `0` past EOF.
    #[inline(always)]
    fn peek(&self) -> u8 {
        if self.is_at_end() {
            0
        } else {
            self.src[self.curr]
        }
    }

    /// Peek one byte past the current one.  Returns `0` past EOF.
    #[inline(always)]
    fn peek_next(&self) -> u8 {
        self.src.get(self.curr + 1).copied().unwrap_or(0)
    }

    #[inline(always)]
    fn match_byte(&mut self, expected: u8) -> bool {
        if !self.is_at_end() && self.peek() == expected {
            self.advance();
            true
        } else {
            false
        }
    }

    /// Byte offset of the next `\n` at or after `self.curr`, or end of input.
    #[inline(always)]
    fn end_of_line(&self) -> usize {
        match memchr(b'\n', &self.src[self.curr..]) {
            Some(pos) => self.curr + pos,
            None => self.len(),
        }
    }

    fn push_layout(&mut self, token_type: TokenType) {
        self.queued.push_back(Token::new(token_type, "", self.line));
    }

    // ───────────────────────────── layout handling ──────────────────────────

    /// Measure the indentation of the line starting at `self.curr` and queue
    /// the matching `INDENT`/`DEDENT` tokens.  Blank and comment‑only lines
    /// are consumed whole and leave `at_line_start` set.
    fn scan_indentation(&mut self) -> Result<()> {
        let mut spaces = 0;
        loop {
            match self.peek() {
                b' ' => spaces += 1,
                // A lone carriage return is whitespace and does not indent.
                b'\r' if self.peek_next() != b'\n' => {}
                _ => break,
            }
            self.advance();
        }

        match self.peek() {
            b'\n' => {
                self.advance();
                self.line += 1;
                return Ok(());
            }
            b'\r' if self.peek_next() == b'\n' => {
                self.curr += 2;
                self.line += 1;
                return Ok(());
            }
            b'#' => {
                self.curr = self.end_of_line();
                if !self.is_at_end() {
                    self.advance();
                    self.line += 1;
                }
                return Ok(());
            }
            0 if self.is_at_end() => return Ok(()),
            _ => {}
        }

        self.at_line_start = false;

        if spaces % INDENT_WIDTH != 0 {
            return Err(MythonError::lex(
                self.line,
                format!("Indentation of {} spaces is not a multiple of {}", spaces, INDENT_WIDTH),
            ));
        }

        let level = spaces / INDENT_WIDTH;
        debug!("Line {} indentation level {} (was {})", self.line, level, self.indent);

        while self.indent < level {
            self.push_layout(TokenType::INDENT);
            self.indent += 1;
        }
        while self.indent > level {
            self.push_layout(TokenType::DEDENT);
            self.indent -= 1;
        }

        Ok(())
    }

    /// Close the last line and every open block, then emit `EOF`.
    fn finish(&mut self) {
        if self.line_has_tokens {
            self.push_layout(TokenType::NEWLINE);
            self.line_has_tokens = false;
        }

        while self.indent > 0 {
            self.push_layout(TokenType::DEDENT);
            self.indent -= 1;
        }

        self.push_layout(TokenType::EOF);
        self.finished = true;

        info!("Scanner reached end of input at line {}", self.line);
    }

    // ───────────────────────────── core lexing ─────────────────────────────

    /// Scan a *single* token starting at `self.curr`.  If the lexeme produces an
    /// actual token the kind is stored in `self.pending`.  Whitespace and
    /// comments are skipped by returning `Ok(())` with `pending = None`.
    fn scan_token(&mut self) -> Result<()> {
        let b = self.advance();

        match b {
            b'(' => self.pending = Some(TokenType::LEFT_PAREN),
            b')' => self.pending = Some(TokenType::RIGHT_PAREN),
            b',' => self.pending = Some(TokenType::COMMA),
            b'.' => self.pending = Some(TokenType::DOT),
            b':' => self.pending = Some(TokenType::COLON),
            b'-' => self.pending = Some(TokenType::MINUS),
            b'+' => self.pending = Some(TokenType::PLUS),
            b'*' => self.pending = Some(TokenType::STAR),
            b'/' => self.pending = Some(TokenType::SLASH),

            // ── two‑character operators (!=, ==, <=, >=) ─────────────────
            b'!' => {
                if !self.match_byte(b'=') {
                    return Err(MythonError::lex(self.line, "Unexpected character: !"));
                }

                self.pending = Some(TokenType::BANG_EQUAL);
            }

            b'=' => {
                let tt = if self.match_byte(b'=') {
                    TokenType::EQUAL_EQUAL
                } else {
                    TokenType::EQUAL
                };

                self.pending = Some(tt);
            }

            b'<' => {
                let tt = if self.match_byte(b'=') {
                    TokenType::LESS_EQUAL
                } else {
                    TokenType::LESS
                };

                self.pending = Some(tt);
            }

            b'>' => {
                let tt = if self.match_byte(b'=') {
                    TokenType::GREATER_EQUAL
                } else {
                    TokenType::GREATER
                };

                self.pending = Some(tt);
            }

            // ── whitespace / newline ─────────────────────────────────────
            b' ' | b'\r' | b'\t' => {
                return Ok(());
            }

            b'\n' => {
                if self.line_has_tokens {
                    self.push_layout(TokenType::NEWLINE);
                    self.line_has_tokens = false;
                }

                self.line += 1;
                self.at_line_start = true;

                return Ok(());
            }

            // ── comments (# … until newline) ─────────────────────────────
            b'#' => {
                self.curr = self.end_of_line();

                return Ok(());
            }

            b'"' | b'\'' => {
                return self.parse_string(b);
            }

            b'0'..=b'9' => {
                return self.parse_number();
            }

            b'a'..=b'z' | b'A'..=b'Z' | b'_' => {
                self.parse_identifier();
            }

            _ => {
                return Err(MythonError::lex(
                    self.line,
                    format!("Unexpected character: {}", b as char),
                ));
            }
        }

        Ok(())
    }

    /// Parse a string literal delimited by `quote`, resolving escapes.
    ///
    /// * `self.start` still points to the opening quote.
    /// * When we return, `self.curr` points **past** the closing quote.
    fn parse_string(&mut self, quote: u8) -> Result<()> {
        let mut bytes: Vec<u8> = Vec::new();

        loop {
            if self.is_at_end() || self.peek() == b'\n' {
                return Err(MythonError::lex(self.line, "Unterminated string."));
            }

            let c = self.advance();

            if c == quote {
                break;
            }

            if c != b'\\' {
                bytes.push(c);
                continue;
            }

            if self.is_at_end() {
                return Err(MythonError::lex(self.line, "Unterminated string."));
            }

            match self.advance() {
                b'n' => bytes.push(b'\n'),
                b't' => bytes.push(b'\t'),
                other => bytes.push(other),
            }
        }

        self.pending = Some(TokenType::STRING(String::from_utf8(bytes)?));

        Ok(())
    }

    /// Parse an integer literal.
    fn parse_number(&mut self) -> Result<()> {
        while self.peek().is_ascii_digit() {
            self.advance();
        }

        let digits: &str = &self.source[self.start..self.curr];
        let n: i64 = digits.parse().map_err(|_| {
            MythonError::lex(self.line, format!("Number literal out of range: {}", digits))
        })?;

        self.pending = Some(TokenType::NUMBER(n));

        Ok(())
    }

    /// Parse an identifier and decide if it is a **keyword** or a generic
    /// `IDENTIFIER` token.
    fn parse_identifier(&mut self) {
        while {
            let c: u8 = self.peek();
            c.is_ascii_alphanumeric() || c == b'_'
        } {
            self.advance();
        }

        let slice: &[u8] = &self.src[self.start..self.curr];

        let tt: TokenType = KEYWORDS
            .get(slice)
            .cloned()
            .unwrap_or(TokenType::IDENTIFIER);

        self.pending = Some(tt);
    }
}

// ───────────────────────── Iterator implementation ─────────────────────────

impl<'a> Iterator for Scanner<'a> {
    type Item = Result<Token<'a>>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(token) = self.queued.pop_front() {
                return Some(Ok(token));
            }

            if self.finished {
                return None;
            }

            if self.is_at_end() {
                self.finish();
                continue;
            }

            if self.at_line_start {
                if let Err(e) = self.scan_indentation() {
                    return Some(Err(e));
                }
                continue;
            }

            self.start = self.curr;
            self.pending = None;

            if let Err(e) = self.scan_token() {
                return Some(Err(e));
            }

            if let Some(tt) = self.pending.take() {
                let lex: &'a str = &self.source[self.start..self.curr];
                self.line_has_tokens = true;

                return Some(Ok(Token::new(tt, lex, self.line)));
            }
            // Otherwise it was whitespace / comment / newline → continue loop.
        }
    }
}

impl<'a> FusedIterator for Scanner<'a> {}
