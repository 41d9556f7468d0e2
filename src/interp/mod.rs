//! Tree-walking interpreter
//!
//! Evaluates the AST directly. Scopes are shared, mutable [`Environment`]s so
//! functions can close over the scope they were declared in.

pub mod console;
pub mod env;
pub mod eval;
pub mod stdlib;
pub mod value;

pub use console::{BufferConsole, Console, StdConsole};
pub use env::{EnvRef, Environment};
pub use eval::{DEFAULT_MAX_CALL_DEPTH, ENTRY_POINT, Interpreter, Node};
pub use value::{ControlFlow, FALSE, NULL, RuntimeError, TRUE, Value};
