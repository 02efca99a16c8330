//! Precedence-climbing (Pratt) parser.
//!
//! The parser pulls tokens from a [`Lexer`] with one token of lookahead and
//! builds a [`Program`]. Each token kind that can start an expression has a
//! prefix step; operators, `(` and `[` have an infix continuation keyed by
//! their [`Precedence`].
//!
//! Errors are not accumulated: the first structural violation aborts the
//! whole parse with a [`ParseError`] naming the expected and actual token
//! kinds, and no partial program is returned.

use log::debug;

use crate::ast::{
    BlockStatement, Expression, Identifier, InfixOperator, PrefixOperator, Program, Statement,
};
use crate::lexer::Lexer;
use crate::token::{Token, TokenKind};
use crate::{Error, ParseError, ParseErrorKind};

/// Binding power of infix positions, lowest first
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Precedence {
    Lowest,
    Equals,
    LessGreater,
    Sum,
    Product,
    Prefix,
    Call,
    Index,
}

impl Precedence {
    pub fn of(kind: TokenKind) -> Self {
        match kind {
            TokenKind::Eq | TokenKind::NotEq => Precedence::Equals,
            TokenKind::Lt | TokenKind::Gt => Precedence::LessGreater,
            TokenKind::Plus | TokenKind::Minus => Precedence::Sum,
            TokenKind::Asterisk | TokenKind::Slash => Precedence::Product,
            TokenKind::LParen => Precedence::Call,
            TokenKind::LBracket => Precedence::Index,
            _ => Precedence::Lowest,
        }
    }
}

fn infix_operator(kind: TokenKind) -> Option<InfixOperator> {
    Some(match kind {
        TokenKind::Plus => InfixOperator::Plus,
        TokenKind::Minus => InfixOperator::Minus,
        TokenKind::Asterisk => InfixOperator::Asterisk,
        TokenKind::Slash => InfixOperator::Slash,
        TokenKind::Lt => InfixOperator::Lt,
        TokenKind::Gt => InfixOperator::Gt,
        TokenKind::Eq => InfixOperator::Eq,
        TokenKind::NotEq => InfixOperator::NotEq,
        _ => return None,
    })
}

type ParseResult<T> = Result<T, ParseError>;

pub struct Parser<'src> {
    lexer: Lexer<'src>,
    current: Token,
    peek: Token,
}

impl<'src> Parser<'src> {
    pub fn new(mut lexer: Lexer<'src>) -> Self {
        let current = lexer.next_token();
        let peek = lexer.next_token();
        Parser {
            lexer,
            current,
            peek,
        }
    }

    fn next_token(&mut self) {
        self.current = std::mem::replace(&mut self.peek, self.lexer.next_token());
    }

    /// Advance if the lookahead has the given kind, otherwise fail
    fn expect_peek(&mut self, kind: TokenKind) -> ParseResult<()> {
        if self.peek.is(kind) {
            self.next_token();
            Ok(())
        } else {
            Err(self.unexpected(&self.peek, &[kind]))
        }
    }

    fn unexpected(&self, token: &Token, expected: &[TokenKind]) -> ParseError {
        let names: Vec<&str> = expected.iter().map(|kind| kind.name()).collect();
        ParseError::with_context(
            ParseErrorKind::UnexpectedToken {
                expected: expected.to_vec(),
                found: token.kind,
            },
            format!(
                "expected next token to be {}, got {}",
                names.join(" or "),
                token.kind
            ),
            self.lexer.source(),
            token.offset,
            Some(token.literal.clone()),
        )
    }

    /// Parse statements until EOF
    pub fn parse_program(&mut self) -> ParseResult<Program> {
        let mut statements = Vec::new();
        while !self.current.is(TokenKind::Eof) {
            let statement = self.parse_statement()?;
            debug!("parsed statement: {statement}");
            statements.push(statement);
            self.next_token();
        }
        Ok(Program::new(statements))
    }

    fn parse_statement(&mut self) -> ParseResult<Statement> {
        match self.current.kind {
            TokenKind::Let => self.parse_let_statement(),
            TokenKind::Return => self.parse_return_statement(),
            _ => self.parse_expression_statement(),
        }
    }

    /// `let <ident> = <expression>;` with optional semicolon
    fn parse_let_statement(&mut self) -> ParseResult<Statement> {
        self.expect_peek(TokenKind::Ident)?;
        let name = Identifier::new(self.current.literal.clone());
        self.expect_peek(TokenKind::Assign)?;
        self.next_token();

        let value = self.parse_expression(Precedence::Lowest)?;
        self.skip_optional_semicolon();
        Ok(Statement::Let { name, value })
    }

    /// `return;` or `return <expression>;` with optional semicolon
    fn parse_return_statement(&mut self) -> ParseResult<Statement> {
        if matches!(
            self.peek.kind,
            TokenKind::Semicolon | TokenKind::Eof | TokenKind::RBrace
        ) {
            self.skip_optional_semicolon();
            return Ok(Statement::Return(None));
        }

        self.next_token();
        let value = self.parse_expression(Precedence::Lowest)?;
        self.skip_optional_semicolon();
        Ok(Statement::Return(Some(value)))
    }

    fn parse_expression_statement(&mut self) -> ParseResult<Statement> {
        let expression = self.parse_expression(Precedence::Lowest)?;
        self.skip_optional_semicolon();
        Ok(Statement::Expression(expression))
    }

    fn skip_optional_semicolon(&mut self) {
        if self.peek.is(TokenKind::Semicolon) {
            self.next_token();
        }
    }

    fn parse_expression(&mut self, precedence: Precedence) -> ParseResult<Expression> {
        let mut left = self.parse_prefix()?;

        while !self.peek.is(TokenKind::Semicolon) && precedence < Precedence::of(self.peek.kind) {
            left = match self.peek.kind {
                TokenKind::LParen => {
                    self.next_token();
                    self.parse_call_expression(left)?
                }
                TokenKind::LBracket => {
                    self.next_token();
                    self.parse_index_expression(left)?
                }
                kind => match infix_operator(kind) {
                    Some(operator) => {
                        self.next_token();
                        self.parse_infix_expression(left, operator)?
                    }
                    None => return Ok(left),
                },
            };
        }

        Ok(left)
    }

    /// Dispatch on the current token to the step that starts an expression
    fn parse_prefix(&mut self) -> ParseResult<Expression> {
        match self.current.kind {
            TokenKind::Ident => Ok(Expression::ident(self.current.literal.clone())),
            TokenKind::Int => self.parse_integer_literal(),
            TokenKind::String => Ok(Expression::String(self.current.literal.clone())),
            TokenKind::True => Ok(Expression::Boolean(true)),
            TokenKind::False => Ok(Expression::Boolean(false)),
            TokenKind::Bang => self.parse_prefix_expression(PrefixOperator::Bang),
            TokenKind::Minus => self.parse_prefix_expression(PrefixOperator::Minus),
            TokenKind::LParen => self.parse_grouped_expression(),
            TokenKind::If => self.parse_if_expression(),
            TokenKind::Function => {
                let (parameters, body) = self.parse_parameters_and_body()?;
                Ok(Expression::Function { parameters, body })
            }
            TokenKind::Macro => {
                let (parameters, body) = self.parse_parameters_and_body()?;
                Ok(Expression::Macro { parameters, body })
            }
            TokenKind::LBracket => Ok(Expression::Array(
                self.parse_expression_list(TokenKind::RBracket)?,
            )),
            TokenKind::LBrace => self.parse_hash_literal(),
            kind => Err(ParseError::with_context(
                ParseErrorKind::NoPrefixParse(kind),
                format!("no prefix parse function for {kind} found"),
                self.lexer.source(),
                self.current.offset,
                Some(self.current.literal.clone()),
            )),
        }
    }

    fn parse_integer_literal(&self) -> ParseResult<Expression> {
        let literal = &self.current.literal;
        literal.parse::<i64>().map(Expression::Integer).map_err(|_| {
            ParseError::with_context(
                ParseErrorKind::InvalidInteger,
                format!("could not parse {literal} as integer"),
                self.lexer.source(),
                self.current.offset,
                Some(literal.clone()),
            )
        })
    }

    fn parse_prefix_expression(&mut self, operator: PrefixOperator) -> ParseResult<Expression> {
        self.next_token();
        let right = self.parse_expression(Precedence::Prefix)?;
        Ok(Expression::prefix(operator, right))
    }

    fn parse_infix_expression(
        &mut self,
        left: Expression,
        operator: InfixOperator,
    ) -> ParseResult<Expression> {
        let precedence = Precedence::of(self.current.kind);
        self.next_token();
        let right = self.parse_expression(precedence)?;
        Ok(Expression::infix(left, operator, right))
    }

    fn parse_grouped_expression(&mut self) -> ParseResult<Expression> {
        self.next_token();
        let expression = self.parse_expression(Precedence::Lowest)?;
        self.expect_peek(TokenKind::RParen)?;
        Ok(expression)
    }

    /// `if (<condition>) { ... }` with optional `else { ... }`
    fn parse_if_expression(&mut self) -> ParseResult<Expression> {
        self.expect_peek(TokenKind::LParen)?;
        self.next_token();
        let condition = self.parse_expression(Precedence::Lowest)?;
        self.expect_peek(TokenKind::RParen)?;
        self.expect_peek(TokenKind::LBrace)?;
        let consequence = self.parse_block_statement()?;

        let alternative = if self.peek.is(TokenKind::Else) {
            self.next_token();
            self.expect_peek(TokenKind::LBrace)?;
            Some(self.parse_block_statement()?)
        } else {
            None
        };

        Ok(Expression::If {
            condition: Box::new(condition),
            consequence,
            alternative,
        })
    }

    /// Parse statements after a `{` up to the matching `}`
    fn parse_block_statement(&mut self) -> ParseResult<BlockStatement> {
        self.next_token();
        let mut statements = Vec::new();
        while !self.current.is(TokenKind::RBrace) {
            if self.current.is(TokenKind::Eof) {
                return Err(self.unexpected(&self.current, &[TokenKind::RBrace]));
            }
            statements.push(self.parse_statement()?);
            self.next_token();
        }
        Ok(BlockStatement::new(statements))
    }

    /// `(<ident>, ...) { ... }` shared by function and macro literals
    fn parse_parameters_and_body(&mut self) -> ParseResult<(Vec<Identifier>, BlockStatement)> {
        self.expect_peek(TokenKind::LParen)?;
        let parameters = self.parse_parameters()?;
        self.expect_peek(TokenKind::LBrace)?;
        let body = self.parse_block_statement()?;
        Ok((parameters, body))
    }

    fn parse_parameters(&mut self) -> ParseResult<Vec<Identifier>> {
        let mut parameters = Vec::new();
        if self.peek.is(TokenKind::RParen) {
            self.next_token();
            return Ok(parameters);
        }

        self.expect_peek(TokenKind::Ident)?;
        parameters.push(Identifier::new(self.current.literal.clone()));
        while self.peek.is(TokenKind::Comma) {
            self.next_token();
            self.expect_peek(TokenKind::Ident)?;
            parameters.push(Identifier::new(self.current.literal.clone()));
        }

        self.expect_peek(TokenKind::RParen)?;
        Ok(parameters)
    }

    fn parse_call_expression(&mut self, function: Expression) -> ParseResult<Expression> {
        let arguments = self.parse_expression_list(TokenKind::RParen)?;
        Ok(Expression::call(function, arguments))
    }

    fn parse_index_expression(&mut self, left: Expression) -> ParseResult<Expression> {
        self.next_token();
        let index = self.parse_expression(Precedence::Lowest)?;
        self.expect_peek(TokenKind::RBracket)?;
        Ok(Expression::index(left, index))
    }

    /// Comma-separated expressions terminated by `end`; the current token is
    /// the opening bracket
    fn parse_expression_list(&mut self, end: TokenKind) -> ParseResult<Vec<Expression>> {
        let mut list = Vec::new();
        if self.peek.is(end) {
            self.next_token();
            return Ok(list);
        }

        self.next_token();
        list.push(self.parse_expression(Precedence::Lowest)?);
        while self.peek.is(TokenKind::Comma) {
            self.next_token();
            self.next_token();
            list.push(self.parse_expression(Precedence::Lowest)?);
        }

        self.expect_peek(end)?;
        Ok(list)
    }

    /// `{<key>: <value>, ...}`
    fn parse_hash_literal(&mut self) -> ParseResult<Expression> {
        let mut pairs = Vec::new();
        while !self.peek.is(TokenKind::RBrace) {
            self.next_token();
            let key = self.parse_expression(Precedence::Lowest)?;
            self.expect_peek(TokenKind::Colon)?;
            self.next_token();
            let value = self.parse_expression(Precedence::Lowest)?;
            pairs.push((key, value));

            match self.peek.kind {
                TokenKind::Comma => self.next_token(),
                TokenKind::RBrace => {}
                _ => {
                    return Err(
                        self.unexpected(&self.peek, &[TokenKind::RBrace, TokenKind::Comma])
                    );
                }
            }
        }
        self.expect_peek(TokenKind::RBrace)?;
        Ok(Expression::Hash(pairs))
    }
}

/// Parse a complete source text into a program
pub fn parse(source: &str) -> Result<Program, Error> {
    let mut parser = Parser::new(Lexer::new(source));
    Ok(parser.parse_program()?)
}
