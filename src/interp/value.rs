//! Runtime values for the interpreter

use std::fmt;
use std::rc::Rc;

use indexmap::IndexMap;

use crate::ast::{BlockStatement, Identifier};
use crate::common::Position;

use super::console::Console;
use super::env::EnvRef;

/// The one `true`. Booleans and null compare by identity with these constants.
pub const TRUE: Value = Value::Boolean(true);
pub const FALSE: Value = Value::Boolean(false);
pub const NULL: Value = Value::Null;

/// Runtime value
#[derive(Clone)]
pub enum Value {
    /// 64-bit signed integer
    Integer(i64),
    Boolean(bool),
    String(String),
    Null,
    /// User function closing over its defining environment
    Function(Rc<Function>),
    /// Native routine from a standard library module
    Builtin(Rc<Builtin>),
    Module(Rc<Module>),
    /// Early exit from a function body
    ReturnSignal(Box<Value>),
    Error(Box<RuntimeError>),
}

/// A `praise` declaration evaluated in some environment
pub struct Function {
    pub name: String,
    pub parameters: Vec<Identifier>,
    pub body: Rc<BlockStatement>,
    /// Scope the function was declared in
    pub env: EnvRef,
}

/// Signature of native routines
pub type BuiltinFn = fn(&mut dyn Console, Vec<Value>) -> Result<Value, RuntimeError>;

pub struct Builtin {
    pub name: &'static str,
    pub func: BuiltinFn,
}

/// A namespace brought in with `wrangle`
#[derive(Clone, Default)]
pub struct Module {
    pub name: String,
    pub members: IndexMap<String, Value>,
}

impl Module {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            members: IndexMap::new(),
        }
    }

    pub fn get(&self, member: &str) -> Option<Value> {
        self.members.get(member).cloned()
    }

    pub fn set(&mut self, member: impl Into<String>, value: Value) {
        self.members.insert(member.into(), value);
    }

    pub fn builtin(&mut self, name: &'static str, func: BuiltinFn) {
        self.set(name, Value::Builtin(Rc::new(Builtin { name, func })));
    }
}

impl Value {
    /// Get the type name of this value
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Integer(_) => "INTEGER",
            Value::Boolean(_) => "BOOLEAN",
            Value::String(_) => "STRING",
            Value::Null => "NULL",
            Value::Function(_) => "FUNCTION",
            Value::Builtin(_) => "BUILTIN",
            Value::Module(_) => "MODULE",
            Value::ReturnSignal(_) => "RETURN_VALUE",
            Value::Error(_) => "ERROR",
        }
    }

    /// Only `false` and `null` are falsy
    pub fn is_truthy(&self) -> bool {
        !matches!(self, Value::Boolean(false) | Value::Null)
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Value::Error(_))
    }

    /// Identity comparison used by `==` when operands are not both integers
    /// or both strings. Heap values are the same only if they are the same
    /// allocation.
    pub fn identical(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Boolean(a), Value::Boolean(b)) => a == b,
            (Value::Null, Value::Null) => true,
            (Value::Integer(a), Value::Integer(b)) => a == b,
            (Value::String(a), Value::String(b)) => a == b,
            (Value::Function(a), Value::Function(b)) => Rc::ptr_eq(a, b),
            (Value::Builtin(a), Value::Builtin(b)) => Rc::ptr_eq(a, b),
            (Value::Module(a), Value::Module(b)) => Rc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        if b { TRUE } else { FALSE }
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Integer(n)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Integer(n) => write!(f, "{}", n),
            Value::Boolean(b) => write!(f, "{}", b),
            Value::String(s) => write!(f, "{}", s),
            Value::Null => write!(f, "null"),
            Value::Function(func) => {
                let params: Vec<&str> = func.parameters.iter().map(|p| p.value.as_str()).collect();
                write!(f, "<praise {}({})>", func.name, params.join(", "))
            }
            Value::Builtin(b) => write!(f, "<builtin {}>", b.name),
            Value::Module(m) => write!(f, "<module {}>", m.name),
            Value::ReturnSignal(v) => write!(f, "{}", v),
            Value::Error(e) => write!(f, "{}", e),
        }
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::String(s) => write!(f, "{:?}", s),
            Value::ReturnSignal(v) => write!(f, "Return({:?})", v),
            Value::Error(e) => write!(f, "Error({:?})", e.message),
            // Functions hold their environment; printing it could recurse forever
            other => write!(f, "{}", other),
        }
    }
}

/// Structural equality for tests and embedders; the language's own `==`
/// goes through [`Value::identical`].
impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::ReturnSignal(a), Value::ReturnSignal(b)) => a == b,
            (Value::Error(a), Value::Error(b)) => a == b,
            _ => self.identical(other),
        }
    }
}

/// An error raised while evaluating
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuntimeError {
    pub message: String,
    pub position: Option<Position>,
    /// Source file name, attached when the program came from a file
    pub file: Option<String>,
}

impl RuntimeError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            position: None,
            file: None,
        }
    }

    pub fn at(message: impl Into<String>, position: Position) -> Self {
        Self {
            message: message.into(),
            position: Some(position),
            file: None,
        }
    }

    pub fn with_file(mut self, file: impl Into<String>) -> Self {
        self.file = Some(file.into());
        self
    }
}

impl fmt::Display for RuntimeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.file, self.position) {
            (Some(file), Some(pos)) => {
                write!(f, "Error at {}:{}:{} - {}", file, pos.line, pos.column, self.message)
            }
            (None, Some(pos)) => write!(
                f,
                "Error at line {}, column {} - {}",
                pos.line, pos.column, self.message
            ),
            (_, None) => write!(f, "Error: {}", self.message),
        }
    }
}

impl std::error::Error for RuntimeError {}

/// Control flow signal carried on the error side of evaluation results
#[derive(Debug, Clone)]
pub enum ControlFlow {
    /// `serve` unwinding to the nearest function call
    Return(Value),
    /// Runtime error unwinding to the top level
    Error(RuntimeError),
}

impl From<RuntimeError> for ControlFlow {
    fn from(err: RuntimeError) -> Self {
        ControlFlow::Error(err)
    }
}

impl From<ControlFlow> for Value {
    fn from(flow: ControlFlow) -> Self {
        match flow {
            ControlFlow::Return(v) => Value::ReturnSignal(Box::new(v)),
            ControlFlow::Error(e) => Value::Error(Box::new(e)),
        }
    }
}
