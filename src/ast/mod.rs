//! Abstract Syntax Tree for the Beeflang language
//!
//! This module defines the AST types produced by the parser. Every node keeps
//! the token it was parsed from so runtime errors can point back at the source.

use crate::lexer::Token;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::rc::Rc;

/// Root of a parsed source file
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Program {
    pub statements: Vec<Statement>,
}

/// A name in binding or reference position
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Identifier {
    pub token: Token,
    pub value: String,
}

impl Identifier {
    pub fn new(token: Token) -> Self {
        let value = token.literal.clone();
        Self { token, value }
    }
}

/// Statements between a block opener and its closing `beef`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlockStatement {
    pub token: Token,
    pub statements: Vec<Statement>,
}

// ==================== STATEMENTS ====================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Statement {
    /// `cut name = value`
    VariableDeclaration {
        token: Token,
        name: Identifier,
        value: Expression,
    },
    /// `name = value`
    Assignment {
        token: Token,
        name: Identifier,
        value: Expression,
    },
    /// A bare statement list evaluated in the current scope. The parser
    /// only produces blocks as parts of `if`, `feast while` and `praise`;
    /// embedders build this variant to hand a sequence to
    /// `Interpreter::evaluate` as one statement.
    Block(BlockStatement),
    /// `if condition: ... else: ... beef`
    If {
        token: Token,
        condition: Expression,
        consequence: BlockStatement,
        alternative: Option<BlockStatement>,
    },
    /// `feast while condition: ... beef`
    While {
        token: Token,
        condition: Expression,
        body: BlockStatement,
    },
    /// `praise name(params): ... beef`
    FunctionDeclaration {
        token: Token,
        name: Identifier,
        parameters: Vec<Identifier>,
        /// Shared with every function value created from this declaration
        body: Rc<BlockStatement>,
    },
    /// `serve value`
    Return {
        token: Token,
        value: Option<Expression>,
    },
    /// `wrangle module`
    Wrangle { token: Token, module: Identifier },
    Expression {
        token: Token,
        expression: Expression,
    },
}


// ==================== EXPRESSIONS ====================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Expression {
    Identifier(Identifier),
    IntegerLiteral {
        token: Token,
        value: i64,
    },
    BooleanLiteral {
        token: Token,
        value: bool,
    },
    StringLiteral {
        token: Token,
        value: String,
    },
    Prefix {
        token: Token,
        operator: PrefixOp,
        right: Box<Expression>,
    },
    Infix {
        token: Token,
        operator: InfixOp,
        left: Box<Expression>,
        right: Box<Expression>,
    },
    Call {
        /// The `(` token
        token: Token,
        function: Box<Expression>,
        arguments: Vec<Expression>,
    },
    MemberAccess {
        /// The `.` token
        token: Token,
        object: Box<Expression>,
        member: Identifier,
    },
}


/// Prefix operators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PrefixOp {
    Neg,
    Not,
}

impl PrefixOp {
    pub fn as_str(&self) -> &'static str {
        match self {
            PrefixOp::Neg => "-",
            PrefixOp::Not => "!",
        }
    }
}

/// Infix operators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum InfixOp {
    Add,
    Sub,
    Mul,
    Div,
    Rem,
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
}

impl InfixOp {
    pub fn as_str(&self) -> &'static str {
        match self {
            InfixOp::Add => "+",
            InfixOp::Sub => "-",
            InfixOp::Mul => "*",
            InfixOp::Div => "/",
            InfixOp::Rem => "%",
            InfixOp::Eq => "==",
            InfixOp::Ne => "!=",
            InfixOp::Lt => "<",
            InfixOp::Le => "<=",
            InfixOp::Gt => ">",
            InfixOp::Ge => ">=",
        }
    }
}

impl fmt::Display for PrefixOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for InfixOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ==================== PRETTY PRINTING ====================

/// Fully parenthesized rendering, mostly useful for checking precedence
impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expression::Identifier(ident) => write!(f, "{}", ident.value),
            Expression::IntegerLiteral { value, .. } => write!(f, "{}", value),
            Expression::BooleanLiteral { value, .. } => write!(f, "{}", value),
            Expression::StringLiteral { value, .. } => write!(f, "{:?}", value),
            Expression::Prefix {
                operator, right, ..
            } => write!(f, "({}{})", operator, right),
            Expression::Infix {
                operator,
                left,
                right,
                ..
            } => write!(f, "({} {} {})", left, operator, right),
            Expression::Call {
                function,
                arguments,
                ..
            } => {
                write!(f, "{}(", function)?;
                for (i, arg) in arguments.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", arg)?;
                }
                write!(f, ")")
            }
            Expression::MemberAccess { object, member, .. } => {
                write!(f, "{}.{}", object, member.value)
            }
        }
    }
}

impl fmt::Display for BlockStatement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for stmt in &self.statements {
            write!(f, "{} ", stmt)?;
        }
        Ok(())
    }
}

impl fmt::Display for Statement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Statement::VariableDeclaration { name, value, .. } => {
                write!(f, "cut {} = {}", name.value, value)
            }
            Statement::Assignment { name, value, .. } => write!(f, "{} = {}", name.value, value),
            Statement::Block(block) => write!(f, "{}", block),
            Statement::If {
                condition,
                consequence,
                alternative,
                ..
            } => {
                write!(f, "if {}: {}", condition, consequence)?;
                if let Some(alt) = alternative {
                    write!(f, "else: {}", alt)?;
                }
                write!(f, "beef")
            }
            Statement::While {
                condition, body, ..
            } => write!(f, "feast while {}: {}beef", condition, body),
            Statement::FunctionDeclaration {
                name,
                parameters,
                body,
                ..
            } => {
                let params: Vec<&str> = parameters.iter().map(|p| p.value.as_str()).collect();
                write!(f, "praise {}({}): {}beef", name.value, params.join(", "), body)
            }
            Statement::Return { value, .. } => match value {
                Some(value) => write!(f, "serve {}", value),
                None => write!(f, "serve"),
            },
            Statement::Wrangle { module, .. } => write!(f, "wrangle {}", module.value),
            Statement::Expression { expression, .. } => write!(f, "{}", expression),
        }
    }
}

impl fmt::Display for Program {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, stmt) in self.statements.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{}", stmt)?;
        }
        Ok(())
    }
}
