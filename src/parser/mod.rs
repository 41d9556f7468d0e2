//! Parser for the Beeflang language
//!
//! Statements are parsed by recursive descent. Expressions use Pratt
//! precedence climbing: each token kind has at most one prefix rule and one
//! infix rule, looked up by kind.
//!
//! Syntax errors never abort the parse. They are recorded and the parser skips
//! ahead and keeps going, so one run reports as many problems as it can find.
//! A program with any recorded error must not be evaluated.

use std::rc::Rc;

use crate::ast::*;
use crate::common::{Position, Span};
use crate::diagnostics::SyntaxError;
use crate::lexer::{Token, TokenKind};

type ParseResult<T> = Result<T, SyntaxError>;
type PrefixParseFn<'a> = fn(&mut Parser<'a>) -> ParseResult<Expression>;
type InfixParseFn<'a> = fn(&mut Parser<'a>, Expression) -> ParseResult<Expression>;

/// Parse a token stream into a program and the syntax errors found on the way
pub fn parse(tokens: &[Token]) -> (Program, Vec<SyntaxError>) {
    let mut parser = Parser::new(tokens);
    let program = parser.parse_program();
    (program, parser.into_errors())
}

/// Binding power of infix operators, lowest first
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Precedence {
    Lowest,
    /// `==` `!=`
    Equals,
    /// `<` `>` `<=` `>=`
    LessGreater,
    /// `+` `-`
    Sum,
    /// `*` `/` `%`
    Product,
    /// `-x` `!x`
    Prefix,
    /// `f(x)` `m.x`
    Call,
}

impl Precedence {
    /// Precedence of `kind` in infix position
    pub fn of(kind: TokenKind) -> Precedence {
        match kind {
            TokenKind::EqEq | TokenKind::Ne => Precedence::Equals,
            TokenKind::Lt | TokenKind::Gt | TokenKind::Le | TokenKind::Ge => {
                Precedence::LessGreater
            }
            TokenKind::Plus | TokenKind::Minus => Precedence::Sum,
            TokenKind::Star | TokenKind::Slash | TokenKind::Percent => Precedence::Product,
            TokenKind::LParen | TokenKind::Dot => Precedence::Call,
            _ => Precedence::Lowest,
        }
    }
}

/// Parser state
pub struct Parser<'a> {
    tokens: &'a [Token],
    pos: usize,
    /// Stands in for the current token once `tokens` is exhausted
    eof: Token,
    errors: Vec<SyntaxError>,
}

impl<'a> Parser<'a> {
    /// `tokens` should end with an `Eof` token, as produced by [`crate::lexer::lex`]
    pub fn new(tokens: &'a [Token]) -> Self {
        let eof = match tokens.last() {
            Some(last) => Token::new(
                TokenKind::Eof,
                "",
                last.position(),
                Span::new(last.span.end, last.span.end),
            ),
            None => Token::new(TokenKind::Eof, "", Position::new(1, 1), Span::default()),
        };
        Self {
            tokens,
            pos: 0,
            eof,
            errors: Vec::new(),
        }
    }

    /// Errors recorded so far, in source order
    pub fn errors(&self) -> &[SyntaxError] {
        &self.errors
    }

    pub fn into_errors(self) -> Vec<SyntaxError> {
        self.errors
    }

    fn current(&self) -> &Token {
        self.tokens.get(self.pos).unwrap_or(&self.eof)
    }

    fn peek(&self) -> TokenKind {
        self.current().kind
    }

    fn peek_n(&self, n: usize) -> TokenKind {
        self.tokens
            .get(self.pos + n)
            .map_or(TokenKind::Eof, |t| t.kind)
    }

    fn at(&self, kind: TokenKind) -> bool {
        self.peek() == kind
    }

    fn at_any(&self, kinds: &[TokenKind]) -> bool {
        kinds.contains(&self.peek())
    }

    fn advance(&mut self) -> Token {
        let tok = self.current().clone();
        if self.pos < self.tokens.len() {
            self.pos += 1;
        }
        tok
    }

    fn expect(&mut self, kind: TokenKind) -> ParseResult<Token> {
        if self.at(kind) {
            Ok(self.advance())
        } else {
            Err(self.unexpected(kind))
        }
    }

    fn unexpected(&self, expected: TokenKind) -> SyntaxError {
        let tok = self.current();
        SyntaxError::UnexpectedToken {
            expected,
            found: self.peek(),
            position: tok.position(),
            span: tok.span.into(),
        }
    }

    // ==================== PROGRAM ====================

    /// Parse statements until end of input
    pub fn parse_program(&mut self) -> Program {
        let mut statements = Vec::new();

        while !self.at(TokenKind::Eof) {
            if let Some(stmt) = self.parse_statement_recovering() {
                statements.push(stmt);
            }
        }

        tracing::debug!(
            "Parsed {} statements with {} errors",
            statements.len(),
            self.errors.len()
        );
        Program { statements }
    }

    /// Parse one statement. On failure the error is recorded and at least one
    /// token is skipped so the caller always makes progress.
    fn parse_statement_recovering(&mut self) -> Option<Statement> {
        let start = self.pos;
        match self.parse_statement() {
            Ok(stmt) => Some(stmt),
            Err(err) => {
                // A token no expression can start with is dropped along with
                // its error, unless it closes the enclosing block
                let stuck = matches!(
                    err,
                    SyntaxError::NoPrefixParseFn { .. } | SyntaxError::Illegal { .. }
                ) && !self.at_any(&[TokenKind::Beef, TokenKind::Else]);
                self.errors.push(err);
                if stuck || self.pos == start {
                    self.advance();
                }
                None
            }
        }
    }

    // ==================== STATEMENTS ====================

    fn parse_statement(&mut self) -> ParseResult<Statement> {
        match self.peek() {
            TokenKind::Cut => self.parse_variable_declaration(),
            TokenKind::Ident if self.peek_n(1) == TokenKind::Assign => self.parse_assignment(),
            TokenKind::If => self.parse_if(),
            TokenKind::Feast => self.parse_while(),
            TokenKind::Praise => self.parse_function_declaration(),
            TokenKind::Serve => self.parse_return(),
            TokenKind::Wrangle => self.parse_wrangle(),
            _ => self.parse_expression_statement(),
        }
    }

    fn parse_variable_declaration(&mut self) -> ParseResult<Statement> {
        let token = self.expect(TokenKind::Cut)?;
        let name = self.parse_ident()?;
        self.expect(TokenKind::Assign)?;
        let value = self.parse_expression(Precedence::Lowest)?;
        Ok(Statement::VariableDeclaration { token, name, value })
    }

    fn parse_assignment(&mut self) -> ParseResult<Statement> {
        let name = self.parse_ident()?;
        let token = self.expect(TokenKind::Assign)?;
        let value = self.parse_expression(Precedence::Lowest)?;
        Ok(Statement::Assignment { token, name, value })
    }

    fn parse_if(&mut self) -> ParseResult<Statement> {
        let token = self.expect(TokenKind::If)?;
        let condition = self.parse_expression(Precedence::Lowest)?;
        self.expect(TokenKind::Colon)?;
        let consequence = self.parse_block(&[TokenKind::Else, TokenKind::Beef]);

        // One `beef` closes the whole if/else
        let alternative = if self.at(TokenKind::Else) {
            self.advance();
            self.expect(TokenKind::Colon)?;
            Some(self.parse_block(&[TokenKind::Beef]))
        } else {
            None
        };
        self.expect(TokenKind::Beef)?;

        Ok(Statement::If {
            token,
            condition,
            consequence,
            alternative,
        })
    }

    fn parse_while(&mut self) -> ParseResult<Statement> {
        let token = self.expect(TokenKind::Feast)?;
        self.expect(TokenKind::While)?;
        let condition = self.parse_expression(Precedence::Lowest)?;
        self.expect(TokenKind::Colon)?;
        let body = self.parse_block(&[TokenKind::Beef]);
        self.expect(TokenKind::Beef)?;
        Ok(Statement::While {
            token,
            condition,
            body,
        })
    }

    fn parse_function_declaration(&mut self) -> ParseResult<Statement> {
        let token = self.expect(TokenKind::Praise)?;
        let name = self.parse_ident()?;
        let parameters = self.parse_params()?;
        self.expect(TokenKind::Colon)?;
        let body = self.parse_block(&[TokenKind::Beef]);
        self.expect(TokenKind::Beef)?;
        Ok(Statement::FunctionDeclaration {
            token,
            name,
            parameters,
            body: Rc::new(body),
        })
    }

    fn parse_params(&mut self) -> ParseResult<Vec<Identifier>> {
        self.expect(TokenKind::LParen)?;
        let mut params = Vec::new();

        while !self.at(TokenKind::RParen) {
            params.push(self.parse_ident()?);
            if !self.at(TokenKind::RParen) {
                self.expect(TokenKind::Comma)?;
            }
        }

        self.expect(TokenKind::RParen)?;
        Ok(params)
    }

    fn parse_return(&mut self) -> ParseResult<Statement> {
        let token = self.expect(TokenKind::Serve)?;
        // A bare `serve` right before a block terminator returns null
        let value = if self.at_any(&[TokenKind::Beef, TokenKind::Else, TokenKind::Eof]) {
            None
        } else {
            Some(self.parse_expression(Precedence::Lowest)?)
        };
        Ok(Statement::Return { token, value })
    }

    fn parse_wrangle(&mut self) -> ParseResult<Statement> {
        let token = self.expect(TokenKind::Wrangle)?;
        let module = self.parse_ident()?;
        Ok(Statement::Wrangle { token, module })
    }

    fn parse_expression_statement(&mut self) -> ParseResult<Statement> {
        let token = self.current().clone();
        let expression = self.parse_expression(Precedence::Lowest)?;
        Ok(Statement::Expression { token, expression })
    }

    /// Parse statements up to (not including) one of `terminators`. Running
    /// into end of input stops the block; the caller's `expect` reports it.
    fn parse_block(&mut self, terminators: &[TokenKind]) -> BlockStatement {
        let token = self.current().clone();
        let mut statements = Vec::new();

        while !self.at_any(terminators) && !self.at(TokenKind::Eof) {
            if let Some(stmt) = self.parse_statement_recovering() {
                statements.push(stmt);
            }
        }

        BlockStatement { token, statements }
    }

    // ==================== EXPRESSIONS ====================

    pub fn parse_expression(&mut self, precedence: Precedence) -> ParseResult<Expression> {
        let prefix = self.prefix_rule()?;
        let mut left = prefix(self)?;

        while precedence < Precedence::of(self.peek()) {
            let Some(infix) = Self::infix_rule(self.peek()) else {
                break;
            };
            left = infix(self, left)?;
        }

        Ok(left)
    }

    fn prefix_rule(&self) -> ParseResult<PrefixParseFn<'a>> {
        let rule: PrefixParseFn<'a> = match self.peek() {
            TokenKind::Ident => Self::parse_identifier,
            TokenKind::Int => Self::parse_integer_literal,
            TokenKind::True | TokenKind::False => Self::parse_boolean_literal,
            TokenKind::Str => Self::parse_string_literal,
            TokenKind::Minus | TokenKind::Bang => Self::parse_prefix_expression,
            TokenKind::LParen => Self::parse_grouped_expression,
            TokenKind::Illegal => {
                let tok = self.current();
                return Err(SyntaxError::Illegal {
                    message: tok.literal.clone(),
                    position: tok.position(),
                    span: tok.span.into(),
                });
            }
            kind => {
                let tok = self.current();
                return Err(SyntaxError::NoPrefixParseFn {
                    kind,
                    position: tok.position(),
                    span: tok.span.into(),
                });
            }
        };
        Ok(rule)
    }

    fn infix_rule(kind: TokenKind) -> Option<InfixParseFn<'a>> {
        match kind {
            TokenKind::Plus
            | TokenKind::Minus
            | TokenKind::Star
            | TokenKind::Slash
            | TokenKind::Percent
            | TokenKind::EqEq
            | TokenKind::Ne
            | TokenKind::Lt
            | TokenKind::Gt
            | TokenKind::Le
            | TokenKind::Ge => Some(Self::parse_infix_expression),
            TokenKind::LParen => Some(Self::parse_call_expression),
            TokenKind::Dot => Some(Self::parse_member_access),
            _ => None,
        }
    }

    fn parse_identifier(&mut self) -> ParseResult<Expression> {
        Ok(Expression::Identifier(self.parse_ident()?))
    }

    fn parse_integer_literal(&mut self) -> ParseResult<Expression> {
        let token = self.expect(TokenKind::Int)?;
        match token.literal.parse::<i64>() {
            Ok(value) => Ok(Expression::IntegerLiteral { token, value }),
            Err(_) => Err(SyntaxError::InvalidInteger {
                literal: token.literal.clone(),
                position: token.position(),
                span: token.span.into(),
            }),
        }
    }

    fn parse_boolean_literal(&mut self) -> ParseResult<Expression> {
        let token = self.advance();
        let value = token.kind == TokenKind::True;
        Ok(Expression::BooleanLiteral { token, value })
    }

    fn parse_string_literal(&mut self) -> ParseResult<Expression> {
        let token = self.expect(TokenKind::Str)?;
        let value = token.literal.clone();
        Ok(Expression::StringLiteral { token, value })
    }

    fn parse_prefix_expression(&mut self) -> ParseResult<Expression> {
        let token = self.advance();
        let operator = match token.kind {
            TokenKind::Minus => PrefixOp::Neg,
            _ => PrefixOp::Not,
        };
        let right = self.parse_expression(Precedence::Prefix)?;
        Ok(Expression::Prefix {
            token,
            operator,
            right: Box::new(right),
        })
    }

    fn parse_grouped_expression(&mut self) -> ParseResult<Expression> {
        self.expect(TokenKind::LParen)?;
        let expr = self.parse_expression(Precedence::Lowest)?;
        self.expect(TokenKind::RParen)?;
        Ok(expr)
    }

    fn parse_infix_expression(&mut self, left: Expression) -> ParseResult<Expression> {
        let token = self.advance();
        let precedence = Precedence::of(token.kind);
        let operator = match token.kind {
            TokenKind::Plus => InfixOp::Add,
            TokenKind::Minus => InfixOp::Sub,
            TokenKind::Star => InfixOp::Mul,
            TokenKind::Slash => InfixOp::Div,
            TokenKind::Percent => InfixOp::Rem,
            TokenKind::EqEq => InfixOp::Eq,
            TokenKind::Ne => InfixOp::Ne,
            TokenKind::Lt => InfixOp::Lt,
            TokenKind::Gt => InfixOp::Gt,
            TokenKind::Le => InfixOp::Le,
            _ => InfixOp::Ge,
        };
        // Same precedence on the right keeps operators left-associative
        let right = self.parse_expression(precedence)?;
        Ok(Expression::Infix {
            token,
            operator,
            left: Box::new(left),
            right: Box::new(right),
        })
    }

    fn parse_call_expression(&mut self, function: Expression) -> ParseResult<Expression> {
        let token = self.expect(TokenKind::LParen)?;
        let mut arguments = Vec::new();

        while !self.at(TokenKind::RParen) {
            arguments.push(self.parse_expression(Precedence::Lowest)?);
            if !self.at(TokenKind::RParen) {
                self.expect(TokenKind::Comma)?;
            }
        }

        self.expect(TokenKind::RParen)?;
        Ok(Expression::Call {
            token,
            function: Box::new(function),
            arguments,
        })
    }

    fn parse_member_access(&mut self, object: Expression) -> ParseResult<Expression> {
        let token = self.expect(TokenKind::Dot)?;
        let member = self.parse_ident()?;
        Ok(Expression::MemberAccess {
            token,
            object: Box::new(object),
            member,
        })
    }

    // ==================== HELPERS ====================

    fn parse_ident(&mut self) -> ParseResult<Identifier> {
        let token = self.expect(TokenKind::Ident)?;
        Ok(Identifier::new(token))
    }
}
