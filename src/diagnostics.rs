//! Diagnostic reporting with source locations
//!
//! Syntax errors are collected by the parser and rendered through miette with
//! labelled source snippets. Runtime errors live with the other runtime values
//! in [`crate::interp::value`]; [`RunError`] ties every failure of the
//! scan/parse/run pipeline together for callers such as the CLI.

use crate::common::{Position, Span};
use crate::interp::RuntimeError;
use crate::lexer::TokenKind;
use miette::{Diagnostic, NamedSource, SourceSpan};
use std::sync::Arc;
use thiserror::Error;

/// Source file for error reporting
#[derive(Debug, Clone)]
pub struct SourceFile {
    pub name: String,
    pub content: Arc<str>,
}

impl SourceFile {
    pub fn new(name: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            content: Arc::from(content.into()),
        }
    }

    pub fn to_named_source(&self) -> NamedSource<String> {
        NamedSource::new(self.name.clone(), self.content.to_string())
    }
}

/// Convert our Span to miette's SourceSpan
impl From<Span> for SourceSpan {
    fn from(span: Span) -> Self {
        SourceSpan::new(span.start.into(), span.len())
    }
}

/// A syntax error recorded by the parser
#[derive(Error, Debug, Diagnostic, Clone, PartialEq)]
pub enum SyntaxError {
    #[error("expected next token to be {expected}, got {found} instead")]
    #[diagnostic(code(parse::unexpected_token))]
    UnexpectedToken {
        expected: TokenKind,
        found: TokenKind,
        position: Position,
        #[label("expected {expected} here")]
        span: SourceSpan,
    },

    #[error("no prefix parse function for token type {kind}")]
    #[diagnostic(
        code(parse::no_prefix),
        help("an expression cannot start with this token")
    )]
    NoPrefixParseFn {
        kind: TokenKind,
        position: Position,
        #[label("unexpected {kind}")]
        span: SourceSpan,
    },

    #[error("could not parse {literal} as integer")]
    #[diagnostic(code(parse::invalid_integer), help("integers must fit in 64 bits"))]
    InvalidInteger {
        literal: String,
        position: Position,
        #[label("integer literal out of range")]
        span: SourceSpan,
    },

    #[error("{message}")]
    #[diagnostic(code(lex::illegal))]
    Illegal {
        message: String,
        position: Position,
        #[label("here")]
        span: SourceSpan,
    },
}

impl SyntaxError {
    /// Where the offending token starts
    pub fn position(&self) -> Position {
        match self {
            SyntaxError::UnexpectedToken { position, .. }
            | SyntaxError::NoPrefixParseFn { position, .. }
            | SyntaxError::InvalidInteger { position, .. }
            | SyntaxError::Illegal { position, .. } => *position,
        }
    }
}

/// Everything that can stop a program from running to completion
#[derive(Error, Debug, Diagnostic)]
pub enum RunError {
    #[error("failed to read `{path}`")]
    #[diagnostic(code(beeflang::io))]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("found {} syntax error(s)", .errors.len())]
    #[diagnostic(code(beeflang::syntax))]
    Syntax {
        #[related]
        errors: Vec<SyntaxError>,
    },

    #[error("{0}")]
    #[diagnostic(code(beeflang::runtime))]
    Runtime(RuntimeError),

    #[error("no {name}() entry point function found")]
    #[diagnostic(
        code(beeflang::missing_entry_point),
        help("declare a zero-argument entry point with `praise`")
    )]
    MissingEntryPoint { name: &'static str },

    #[error("{name} is not a function")]
    #[diagnostic(code(beeflang::entry_point_not_callable))]
    EntryPointNotCallable { name: &'static str },
}

/// Error reporter that renders syntax errors against their source file
pub struct Reporter {
    source: SourceFile,
    errors: Vec<SyntaxError>,
}

impl Reporter {
    pub fn new(source: SourceFile) -> Self {
        Self {
            source,
            errors: Vec::new(),
        }
    }

    pub fn error(&mut self, error: SyntaxError) {
        self.errors.push(error);
    }

    pub fn extend(&mut self, errors: impl IntoIterator<Item = SyntaxError>) {
        self.errors.extend(errors);
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    pub fn error_count(&self) -> usize {
        self.errors.len()
    }

    /// Create NamedSource for this file
    pub fn named_source(&self) -> NamedSource<String> {
        self.source.to_named_source()
    }

    /// One `line L, column C: message` line per error, in the order found
    pub fn messages(&self) -> Vec<String> {
        self.errors
            .iter()
            .map(|e| {
                let pos = e.position();
                format!("line {}, column {}: {}", pos.line, pos.column, e)
            })
            .collect()
    }

    /// Print all diagnostics
    pub fn emit_all(&self) {
        for error in &self.errors {
            let report = miette::Report::new(error.clone()).with_source_code(self.named_source());
            eprintln!("{:?}", report);
        }
    }

    /// Get errors by reference
    pub fn errors(&self) -> &[SyntaxError] {
        &self.errors
    }
}
