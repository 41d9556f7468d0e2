//! Tree-walking evaluator

use std::rc::Rc;

use crate::ast::*;
use crate::diagnostics::RunError;
use crate::lexer::Token;

use super::console::{Console, StdConsole};
use super::env::{EnvRef, Environment};
use super::stdlib;
use super::value::{ControlFlow, FALSE, Function, NULL, RuntimeError, TRUE, Value};

/// Name of the function invoked after the top level has been evaluated
pub const ENTRY_POINT: &str = "ChurchOfBeef";

/// Nested user function calls allowed before evaluation gives up
pub const DEFAULT_MAX_CALL_DEPTH: usize = 1000;

/// Grow the stack when less than this much is left
const RED_ZONE: usize = 100 * 1024;

/// Size of each new stack segment
const STACK_PER_RECURSION: usize = 1024 * 1024;

type EvalResult = Result<Value, ControlFlow>;

/// Run `f`, first moving to a fresh stack segment if the current one is
/// nearly exhausted. Deep recursion in a program is bounded by the call depth
/// limit, never by the native stack.
#[inline]
fn ensure_sufficient_stack<R>(f: impl FnOnce() -> R) -> R {
    stacker::maybe_grow(RED_ZONE, STACK_PER_RECURSION, f)
}

/// Anything [`Interpreter::evaluate`] accepts
#[derive(Debug, Clone, Copy)]
pub enum Node<'a> {
    Program(&'a Program),
    Statement(&'a Statement),
    Expression(&'a Expression),
}

impl<'a> From<&'a Program> for Node<'a> {
    fn from(program: &'a Program) -> Self {
        Node::Program(program)
    }
}

impl<'a> From<&'a Statement> for Node<'a> {
    fn from(stmt: &'a Statement) -> Self {
        Node::Statement(stmt)
    }
}

impl<'a> From<&'a Expression> for Node<'a> {
    fn from(expr: &'a Expression) -> Self {
        Node::Expression(expr)
    }
}

/// Tree-walking interpreter
pub struct Interpreter<C: Console = StdConsole> {
    /// Passed to builtins for all I/O
    console: C,
    /// Source file name attached to runtime errors
    file: Option<String>,
    max_call_depth: usize,
    depth: usize,
}

impl Interpreter<StdConsole> {
    /// Create an interpreter talking to stdin/stdout
    pub fn new() -> Self {
        Self::with_console(StdConsole)
    }
}

impl Default for Interpreter<StdConsole> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: Console> Interpreter<C> {
    pub fn with_console(console: C) -> Self {
        Interpreter {
            console,
            file: None,
            max_call_depth: DEFAULT_MAX_CALL_DEPTH,
            depth: 0,
        }
    }

    /// Report runtime errors as coming from `file`
    pub fn with_file(mut self, file: impl Into<String>) -> Self {
        self.file = Some(file.into());
        self
    }

    pub fn with_max_call_depth(mut self, depth: usize) -> Self {
        self.max_call_depth = depth;
        self
    }

    pub fn into_console(self) -> C {
        self.console
    }

    /// Evaluate a program, statement or expression in `env`.
    ///
    /// Errors come back as [`Value::Error`]. A `serve` outside any function
    /// comes back as [`Value::ReturnSignal`], except at program level where
    /// it ends the program with the served value.
    pub fn evaluate<'n>(&mut self, node: impl Into<Node<'n>>, env: &EnvRef) -> Value {
        let result = match node.into() {
            Node::Program(program) => return self.eval_program(program, env),
            Node::Statement(stmt) => self.eval_statement(stmt, env),
            Node::Expression(expr) => self.eval_expression(expr, env),
        };
        result.unwrap_or_else(Value::from)
    }

    /// Evaluate top-level statements in order and return the last value
    pub fn eval_program(&mut self, program: &Program, env: &EnvRef) -> Value {
        let mut result = NULL;

        for stmt in &program.statements {
            match self.eval_statement(stmt, env) {
                Ok(value) => result = value,
                Err(ControlFlow::Return(value)) => return value,
                Err(ControlFlow::Error(err)) => return Value::Error(Box::new(err)),
            }
        }

        result
    }

    /// Evaluate `program` in a fresh top-level environment, then call the
    /// entry point
    pub fn run(&mut self, program: &Program) -> Result<Value, RunError> {
        let env = Environment::new().into_ref();
        if let Value::Error(err) = self.eval_program(program, &env) {
            return Err(RunError::Runtime(*err));
        }
        self.call_entry_point(&env)
    }

    /// Invoke the zero-argument entry point bound in `env`
    pub fn call_entry_point(&mut self, env: &EnvRef) -> Result<Value, RunError> {
        let entry = env
            .borrow()
            .get(ENTRY_POINT)
            .ok_or(RunError::MissingEntryPoint { name: ENTRY_POINT })?;
        let Value::Function(func) = entry else {
            return Err(RunError::EntryPointNotCallable { name: ENTRY_POINT });
        };

        tracing::debug!("Invoking entry point {}", ENTRY_POINT);
        let call_env = Environment::new_enclosed(Rc::clone(&func.env)).into_ref();
        self.depth += 1;
        let result = self.eval_block(&func.body, &call_env);
        self.depth -= 1;

        match result {
            Ok(_) => Ok(NULL),
            Err(ControlFlow::Return(value)) => Ok(value),
            Err(ControlFlow::Error(err)) => Err(RunError::Runtime(err)),
        }
    }

    // ==================== STATEMENTS ====================

    fn eval_statement(&mut self, stmt: &Statement, env: &EnvRef) -> EvalResult {
        match stmt {
            Statement::VariableDeclaration { name, value, .. } => {
                let val = self.eval_expression(value, env)?;
                env.borrow_mut().define(name.value.as_str(), val.clone());
                Ok(val)
            }

            Statement::Assignment { name, value, .. } => {
                let val = self.eval_expression(value, env)?;
                env.borrow_mut().set(&name.value, val.clone());
                Ok(val)
            }

            Statement::Block(block) => self.eval_block(block, env),

            Statement::If {
                condition,
                consequence,
                alternative,
                ..
            } => {
                let cond = self.eval_expression(condition, env)?;
                if cond.is_truthy() {
                    self.eval_block(consequence, env)
                } else if let Some(alternative) = alternative {
                    self.eval_block(alternative, env)
                } else {
                    Ok(NULL)
                }
            }

            Statement::While {
                condition, body, ..
            } => {
                let mut result = NULL;
                while self.eval_expression(condition, env)?.is_truthy() {
                    result = self.eval_block(body, env)?;
                }
                Ok(result)
            }

            Statement::FunctionDeclaration {
                name,
                parameters,
                body,
                ..
            } => {
                // Capture the declaring scope itself so later bindings in it,
                // including this one, are visible when the function runs
                let function = Value::Function(Rc::new(Function {
                    name: name.value.clone(),
                    parameters: parameters.clone(),
                    body: Rc::clone(body),
                    env: Rc::clone(env),
                }));
                env.borrow_mut()
                    .define(name.value.as_str(), function.clone());
                Ok(function)
            }

            Statement::Return { value, .. } => {
                let val = match value {
                    Some(expr) => self.eval_expression(expr, env)?,
                    None => NULL,
                };
                Err(ControlFlow::Return(val))
            }

            Statement::Wrangle { module, .. } => {
                let loaded = stdlib::load_module(&module.value);
                tracing::debug!(
                    "Loaded module `{}` with {} members",
                    loaded.name,
                    loaded.members.len()
                );
                let value = Value::Module(Rc::new(loaded));
                env.borrow_mut()
                    .define(module.value.as_str(), value.clone());
                Ok(value)
            }

            Statement::Expression { expression, .. } => self.eval_expression(expression, env),
        }
    }

    /// Evaluate a block in `env`. Blocks do not open a scope of their own.
    fn eval_block(&mut self, block: &BlockStatement, env: &EnvRef) -> EvalResult {
        let mut result = NULL;
        for stmt in &block.statements {
            result = self.eval_statement(stmt, env)?;
        }
        Ok(result)
    }

    // ==================== EXPRESSIONS ====================

    /// Every nested expression and every call passes through here
    fn eval_expression(&mut self, expr: &Expression, env: &EnvRef) -> EvalResult {
        ensure_sufficient_stack(|| self.eval_expression_on_stack(expr, env))
    }

    fn eval_expression_on_stack(&mut self, expr: &Expression, env: &EnvRef) -> EvalResult {
        match expr {
            Expression::Identifier(ident) => {
                let found = env.borrow().get(&ident.value);
                found.ok_or_else(|| {
                    self.error(
                        &ident.token,
                        format!("identifier not found: {}", ident.value),
                    )
                })
            }

            Expression::IntegerLiteral { value, .. } => Ok(Value::Integer(*value)),

            Expression::BooleanLiteral { value, .. } => Ok(Value::from(*value)),

            Expression::StringLiteral { value, .. } => Ok(Value::String(value.clone())),

            Expression::Prefix {
                token,
                operator,
                right,
            } => {
                let right = self.eval_expression(right, env)?;
                self.eval_prefix(token, *operator, right)
            }

            Expression::Infix {
                token,
                operator,
                left,
                right,
            } => {
                let left = self.eval_expression(left, env)?;
                let right = self.eval_expression(right, env)?;
                self.eval_infix(token, *operator, left, right)
            }

            Expression::Call {
                token,
                function,
                arguments,
            } => {
                let callee = self.eval_expression(function, env)?;
                let mut args = Vec::with_capacity(arguments.len());
                for arg in arguments {
                    args.push(self.eval_expression(arg, env)?);
                }
                self.apply_function(token, callee, args)
            }

            Expression::MemberAccess {
                token,
                object,
                member,
            } => match self.eval_expression(object, env)? {
                Value::Module(module) => Ok(module.get(&member.value).unwrap_or(NULL)),
                other => Err(self.error(
                    token,
                    format!("member access on non-module value: {}", other.type_name()),
                )),
            },
        }
    }

    fn eval_prefix(&self, token: &Token, op: PrefixOp, right: Value) -> EvalResult {
        match op {
            PrefixOp::Not => Ok(if right.is_truthy() { FALSE } else { TRUE }),
            PrefixOp::Neg => match right {
                Value::Integer(n) => Ok(Value::Integer(n.wrapping_neg())),
                other => Err(self.error(
                    token,
                    format!("unknown operator: -{}", other.type_name()),
                )),
            },
        }
    }

    fn eval_infix(&self, token: &Token, op: InfixOp, left: Value, right: Value) -> EvalResult {
        match (&left, &right) {
            (Value::Integer(a), Value::Integer(b)) => self.eval_integer_infix(token, op, *a, *b),
            (Value::String(a), Value::String(b)) => self.eval_string_infix(token, op, a, b),
            _ => match op {
                InfixOp::Eq => Ok(Value::from(left.identical(&right))),
                InfixOp::Ne => Ok(Value::from(!left.identical(&right))),
                _ if left.type_name() != right.type_name() => Err(self.error(
                    token,
                    format!(
                        "type mismatch: {} {} {}",
                        left.type_name(),
                        op,
                        right.type_name()
                    ),
                )),
                _ => Err(self.unknown_infix(token, op, &left, &right)),
            },
        }
    }

    fn eval_integer_infix(&self, token: &Token, op: InfixOp, a: i64, b: i64) -> EvalResult {
        let value = match op {
            InfixOp::Add => Value::Integer(a.wrapping_add(b)),
            InfixOp::Sub => Value::Integer(a.wrapping_sub(b)),
            InfixOp::Mul => Value::Integer(a.wrapping_mul(b)),
            InfixOp::Div | InfixOp::Rem if b == 0 => {
                return Err(self.error(token, "division by zero"));
            }
            InfixOp::Div => Value::Integer(a.wrapping_div(b)),
            InfixOp::Rem => Value::Integer(a.wrapping_rem(b)),
            InfixOp::Lt => Value::from(a < b),
            InfixOp::Gt => Value::from(a > b),
            InfixOp::Le => Value::from(a <= b),
            InfixOp::Ge => Value::from(a >= b),
            InfixOp::Eq => Value::from(a == b),
            InfixOp::Ne => Value::from(a != b),
        };
        Ok(value)
    }

    fn eval_string_infix(&self, token: &Token, op: InfixOp, a: &str, b: &str) -> EvalResult {
        match op {
            InfixOp::Add => Ok(Value::String(format!("{}{}", a, b))),
            InfixOp::Eq => Ok(Value::from(a == b)),
            InfixOp::Ne => Ok(Value::from(a != b)),
            _ => Err(self.error(
                token,
                format!("unknown operator: STRING {} STRING", op),
            )),
        }
    }

    fn unknown_infix(&self, token: &Token, op: InfixOp, left: &Value, right: &Value) -> ControlFlow {
        self.error(
            token,
            format!(
                "unknown operator: {} {} {}",
                left.type_name(),
                op,
                right.type_name()
            ),
        )
    }

    // ==================== CALLS ====================

    fn apply_function(&mut self, token: &Token, callee: Value, args: Vec<Value>) -> EvalResult {
        match callee {
            Value::Builtin(builtin) => {
                (builtin.func)(&mut self.console, args).map_err(|err| self.locate(err, token))
            }
            Value::Function(func) => self.call_function(token, &func, args),
            other => Err(self.error(
                token,
                format!("not a function: {}", other.type_name()),
            )),
        }
    }

    fn call_function(&mut self, token: &Token, func: &Function, args: Vec<Value>) -> EvalResult {
        if args.len() != func.parameters.len() {
            return Err(self.error(
                token,
                format!(
                    "wrong number of arguments: expected {}, got {}",
                    func.parameters.len(),
                    args.len()
                ),
            ));
        }
        if self.depth >= self.max_call_depth {
            return Err(self.error(
                token,
                format!("maximum call depth exceeded ({})", self.max_call_depth),
            ));
        }

        tracing::trace!(function = %func.name, depth = self.depth, "call");

        let call_env = Environment::new_enclosed(Rc::clone(&func.env)).into_ref();
        {
            let mut scope = call_env.borrow_mut();
            for (param, arg) in func.parameters.iter().zip(args) {
                scope.define(param.value.as_str(), arg);
            }
        }

        self.depth += 1;
        let result = self.eval_block(&func.body, &call_env);
        self.depth -= 1;

        match result {
            Ok(_) => Ok(NULL),
            Err(ControlFlow::Return(value)) => Ok(value),
            Err(err) => Err(err),
        }
    }

    // ==================== ERRORS ====================

    fn error(&self, token: &Token, message: impl Into<String>) -> ControlFlow {
        self.locate(RuntimeError::new(message), token)
    }

    /// Fill in whatever location `err` is missing from `token` and the
    /// current file
    fn locate(&self, mut err: RuntimeError, token: &Token) -> ControlFlow {
        if err.position.is_none() {
            err.position = Some(token.position());
        }
        if err.file.is_none() {
            err.file = self.file.clone();
        }
        ControlFlow::Error(err)
    }
}
