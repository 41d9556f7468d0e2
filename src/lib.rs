//! Beeflang Programming Language Interpreter
//!
//! A small dynamically typed scripting language with:
//! - Integers, booleans, strings and null
//! - First-class functions with lexical closures
//! - Indentation-free blocks closed by `beef`
//! - An `io` standard module brought in with `wrangle`
//!
//! # Architecture
//!
//! ```text
//! Source → Scanner → Tokens → Parser → AST → Interpreter
//! ```
//!
//! # Example
//!
//! ```text
//! wrangle io
//!
//! praise add(x, y):
//!     serve x + y
//! beef
//!
//! praise ChurchOfBeef():
//!     io.preach(add(2, 3))
//! beef
//! ```

pub mod ast;
pub mod common;
pub mod diagnostics;
pub mod interp;
pub mod lexer;
pub mod parser;

// Re-exports for convenience
pub use ast::Program;
pub use diagnostics::{Reporter, RunError, SourceFile, SyntaxError};
pub use interp::{Interpreter, RuntimeError, Value};

/// Interpreter version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Scan and parse source code, failing if any syntax error was found
pub fn parse(source: &str) -> Result<Program, RunError> {
    let tokens = lexer::lex(source);
    let (program, errors) = parser::parse(&tokens);
    if errors.is_empty() {
        Ok(program)
    } else {
        Err(RunError::Syntax { errors })
    }
}

/// Parse and run a program on standard input/output, returning the value
/// served by its entry point
pub fn interpret(source: &str) -> Result<Value, RunError> {
    let program = parse(source)?;
    Interpreter::new().run(&program)
}
