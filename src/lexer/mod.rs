//! Lexer for the Beeflang language
//!
//! The [`Scanner`] wraps a logos lexer and turns its raw matches into
//! [`Token`]s carrying line and column information. Lexical errors never abort
//! the scan: they come out as `Illegal` tokens for the parser to report.

mod tokens;

pub use tokens::{Token, TokenKind};

use crate::common::{Position, Span};
use logos::Logos;

/// Lazily produces tokens from source text
pub struct Scanner<'src> {
    source: &'src str,
    inner: logos::Lexer<'src, TokenKind>,
    /// Byte offset up to which `line`/`column` have been computed
    offset: usize,
    line: usize,
    column: usize,
    finished: bool,
}

impl<'src> Scanner<'src> {
    pub fn new(source: &'src str) -> Self {
        Self {
            source,
            inner: TokenKind::lexer(source),
            offset: 0,
            line: 1,
            column: 1,
            finished: false,
        }
    }

    /// Produce the next token. Once the input is exhausted every call returns
    /// an `Eof` token.
    pub fn next_token(&mut self) -> Token {
        let Some(raw) = self.inner.next() else {
            self.advance_to(self.source.len());
            let end = self.source.len();
            return Token::new(TokenKind::Eof, "", self.cursor(), Span::new(end, end));
        };

        let range = self.inner.span();
        let slice = self.inner.slice();
        self.advance_to(range.start);
        let position = self.cursor();
        let span = Span::new(range.start, range.end);

        let token = match raw {
            Ok(TokenKind::Str) => Token::new(TokenKind::Str, unescape(&slice[1..slice.len() - 1]), position, span),
            Ok(TokenKind::UnterminatedStr) => {
                Token::new(TokenKind::Illegal, "unterminated string literal", position, span)
            }
            Ok(kind) => Token::new(kind, slice, position, span),
            Err(()) => Token::new(
                TokenKind::Illegal,
                format!("unexpected character '{}'", slice),
                position,
                span,
            ),
        };

        self.advance_to(range.end);
        token
    }

    fn cursor(&self) -> Position {
        Position::new(self.line, self.column)
    }

    /// Move the line/column cursor forward to byte offset `target`
    fn advance_to(&mut self, target: usize) {
        if target <= self.offset {
            return;
        }
        for ch in self.source[self.offset..target].chars() {
            if ch == '\n' {
                self.line += 1;
                self.column = 1;
            } else {
                self.column += 1;
            }
        }
        self.offset = target;
    }
}

impl Iterator for Scanner<'_> {
    type Item = Token;

    /// Yields every token including the final `Eof`, then stops
    fn next(&mut self) -> Option<Token> {
        if self.finished {
            return None;
        }
        let token = self.next_token();
        if token.kind == TokenKind::Eof {
            self.finished = true;
        }
        Some(token)
    }
}

/// Lex a whole source string. The result always ends with an `Eof` token.
pub fn lex(source: &str) -> Vec<Token> {
    let tokens: Vec<Token> = Scanner::new(source).collect();
    tracing::debug!("Lexed {} tokens", tokens.len());
    tokens
}

fn unescape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars();
    while let Some(ch) = chars.next() {
        if ch != '\\' {
            out.push(ch);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some('r') => out.push('\r'),
            Some('0') => out.push('\0'),
            Some(other) => out.push(other),
            None => out.push('\\'),
        }
    }
    out
}
