use std::{mem, rc::Rc};

use crate::{
    ast::{BlockStatement, Expression, Identifier, Program, Statement},
    lexer::Lexer,
    token::{Token, TokenKind},
};

type R<T> = std::result::Result<T, ParserError>;

type PrefixParseFn = fn(&mut Parser) -> R<Expression>;
type InfixParseFn = fn(&mut Parser, Expression) -> R<Expression>;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{0}")]
pub struct ParserError(pub String);

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Precedence {
    Lowest = 1,
    Equals,
    LessGreater,
    Sum,
    Product,
    Prefix,
    Call,
}

impl Precedence {
    fn of(kind: TokenKind) -> Precedence {
        match kind {
            TokenKind::Eq | TokenKind::NotEq => Precedence::Equals,
            TokenKind::Lt | TokenKind::Gt => Precedence::LessGreater,
            TokenKind::Plus | TokenKind::Minus => Precedence::Sum,
            TokenKind::Asterisk | TokenKind::Slash => Precedence::Product,
            TokenKind::LParen | TokenKind::LBracket => Precedence::Call,
            _ => Precedence::Lowest,
        }
    }
}

fn prefix_parse_fn(kind: TokenKind) -> Option<PrefixParseFn> {
    let f: PrefixParseFn = match kind {
        TokenKind::Ident => Parser::parse_identifier,
        TokenKind::Int => Parser::parse_integer_literal,
        TokenKind::String => Parser::parse_string_literal,
        TokenKind::True | TokenKind::False => Parser::parse_boolean,
        TokenKind::Bang | TokenKind::Minus => Parser::parse_prefix_expression,
        TokenKind::LParen => Parser::parse_grouped_expression,
        TokenKind::If => Parser::parse_if_expression,
        TokenKind::Function => Parser::parse_function_literal,
        TokenKind::LBracket => Parser::parse_array_literal,
        _ => return None,
    };
    Some(f)
}

fn infix_parse_fn(kind: TokenKind) -> Option<InfixParseFn> {
    let f: InfixParseFn = match kind {
        TokenKind::Plus
        | TokenKind::Minus
        | TokenKind::Asterisk
        | TokenKind::Slash
        | TokenKind::Lt
        | TokenKind::Gt
        | TokenKind::Eq
        | TokenKind::NotEq => Parser::parse_infix_expression,
        TokenKind::LParen => Parser::parse_call_expression,
        TokenKind::LBracket => Parser::parse_index_expression,
        _ => return None,
    };
    Some(f)
}

pub struct Parser {
    lexer: Lexer,
    cur_token: Token,
    peek_token: Token,
    errors: Vec<ParserError>,
}

impl Parser {
    pub fn new(lexer: Lexer) -> Self {
        let mut parser = Self {
            lexer,
            cur_token: Token::eof(),
            peek_token: Token::eof(),
            errors: vec![],
        };

        parser.next_token();
        parser.next_token();

        parser
    }

    /// Syntax errors collected so far, in the order they were found.
    pub fn errors(&self) -> &[ParserError] {
        &self.errors
    }

    pub fn into_errors(self) -> Vec<ParserError> {
        self.errors
    }

    fn next_token(&mut self) {
        self.cur_token = mem::replace(&mut self.peek_token, self.lexer.next_token());
    }

    pub fn parse_program(&mut self) -> Program {
        let mut program = Program::default();

        while !self.cur_token.is(TokenKind::Eof) {
            if let Some(statement) = self.parse_statement_recording() {
                program.statements.push(statement);
            }

            self.next_token();
        }

        tracing::debug!(
            statements = program.statements.len(),
            errors = self.errors.len(),
            "parsed program"
        );

        program
    }

    fn parse_statement_recording(&mut self) -> Option<Statement> {
        match self.parse_statement() {
            Ok(statement) => Some(statement),
            Err(err) => {
                tracing::debug!(error = %err, "syntax error");
                self.errors.push(err);
                None
            }
        }
    }

    fn parse_statement(&mut self) -> R<Statement> {
        match self.cur_token.kind {
            TokenKind::Let => self.parse_let_statement(),
            TokenKind::Return => self.parse_return_statement(),
            _ => self.parse_expression_statement(),
        }
    }

    fn parse_let_statement(&mut self) -> R<Statement> {
        let token = self.cur_token.clone();

        self.expect_peek(TokenKind::Ident)?;
        let name = Identifier {
            token: self.cur_token.clone(),
            name: self.cur_token.literal.clone(),
        };

        self.expect_peek(TokenKind::Assign)?;
        self.next_token();

        let value = self.parse_expression(Precedence::Lowest)?;
        self.skip_semicolon();

        Ok(Statement::Let { token, name, value })
    }

    fn parse_return_statement(&mut self) -> R<Statement> {
        let token = self.cur_token.clone();
        self.next_token();

        let value = self.parse_expression(Precedence::Lowest)?;
        self.skip_semicolon();

        Ok(Statement::Return { token, value })
    }

    fn parse_expression_statement(&mut self) -> R<Statement> {
        let token = self.cur_token.clone();
        let value = self.parse_expression(Precedence::Lowest)?;
        self.skip_semicolon();

        Ok(Statement::Expression { token, value })
    }

    fn skip_semicolon(&mut self) {
        if self.peek_token.is(TokenKind::Semicolon) {
            self.next_token();
        }
    }

    pub fn parse_expression(&mut self, precedence: Precedence) -> R<Expression> {
        let prefix = prefix_parse_fn(self.cur_token.kind).ok_or_else(|| {
            ParserError(format!(
                "no prefix parse function for {}",
                self.cur_token.kind
            ))
        })?;

        let mut left = prefix(self)?;

        while !self.peek_token.is(TokenKind::Semicolon) && precedence < self.peek_precedence() {
            let Some(infix) = infix_parse_fn(self.peek_token.kind) else {
                return Ok(left);
            };

            self.next_token();
            left = infix(self, left)?;
        }

        Ok(left)
    }

    fn parse_identifier(&mut self) -> R<Expression> {
        Ok(Expression::Identifier(Identifier {
            token: self.cur_token.clone(),
            name: self.cur_token.literal.clone(),
        }))
    }

    fn parse_integer_literal(&mut self) -> R<Expression> {
        let token = self.cur_token.clone();
        let value = token.literal.parse::<i64>().map_err(|_| {
            ParserError(format!("could not parse {} as integer", token.literal))
        })?;

        Ok(Expression::Integer { token, value })
    }

    fn parse_string_literal(&mut self) -> R<Expression> {
        Ok(Expression::Str {
            token: self.cur_token.clone(),
            value: self.cur_token.literal.clone(),
        })
    }

    fn parse_boolean(&mut self) -> R<Expression> {
        Ok(Expression::Boolean {
            token: self.cur_token.clone(),
            value: self.cur_token.is(TokenKind::True),
        })
    }

    fn parse_prefix_expression(&mut self) -> R<Expression> {
        let token = self.cur_token.clone();
        let operator = token.literal.clone();

        self.next_token();
        let right = self.parse_expression(Precedence::Prefix)?;

        Ok(Expression::Prefix {
            token,
            operator,
            right: Box::new(right),
        })
    }

    fn parse_infix_expression(&mut self, left: Expression) -> R<Expression> {
        let token = self.cur_token.clone();
        let operator = token.literal.clone();
        let precedence = self.cur_precedence();

        self.next_token();
        let right = self.parse_expression(precedence)?;

        Ok(Expression::Infix {
            token,
            left: Box::new(left),
            operator,
            right: Box::new(right),
        })
    }

    fn parse_grouped_expression(&mut self) -> R<Expression> {
        self.next_token();
        let expression = self.parse_expression(Precedence::Lowest)?;
        self.expect_peek(TokenKind::RParen)?;

        Ok(expression)
    }

    fn parse_if_expression(&mut self) -> R<Expression> {
        let token = self.cur_token.clone();

        self.expect_peek(TokenKind::LParen)?;
        self.next_token();
        let condition = self.parse_expression(Precedence::Lowest)?;
        self.expect_peek(TokenKind::RParen)?;

        self.expect_peek(TokenKind::LBrace)?;
        let consequence = self.parse_block_statement();

        let alternative = if self.peek_token.is(TokenKind::Else) {
            self.next_token();
            self.expect_peek(TokenKind::LBrace)?;
            Some(self.parse_block_statement())
        } else {
            None
        };

        Ok(Expression::If {
            token,
            condition: Box::new(condition),
            consequence,
            alternative,
        })
    }

    // Statement errors inside the block are recorded and skipped so one
    // bad line does not hide problems further down.
    fn parse_block_statement(&mut self) -> BlockStatement {
        let token = self.cur_token.clone();
        let mut statements = vec![];

        self.next_token();

        while !self.cur_token.is(TokenKind::RBrace) && !self.cur_token.is(TokenKind::Eof) {
            if let Some(statement) = self.parse_statement_recording() {
                statements.push(statement);
            }
            self.next_token();
        }

        BlockStatement { token, statements }
    }

    fn parse_function_literal(&mut self) -> R<Expression> {
        let token = self.cur_token.clone();

        self.expect_peek(TokenKind::LParen)?;
        let parameters = self.parse_list(TokenKind::RParen, Parser::parse_parameter)?;

        self.expect_peek(TokenKind::LBrace)?;
        let body = self.parse_block_statement();

        Ok(Expression::Function {
            token,
            parameters: parameters.into(),
            body: Rc::new(body),
        })
    }

    fn parse_parameter(&mut self) -> R<Identifier> {
        if !self.cur_token.is(TokenKind::Ident) {
            return Err(ParserError(format!(
                "expected parameter to be {}, got {} instead",
                TokenKind::Ident,
                self.cur_token.kind
            )));
        }

        Ok(Identifier {
            token: self.cur_token.clone(),
            name: self.cur_token.literal.clone(),
        })
    }

    fn parse_call_expression(&mut self, function: Expression) -> R<Expression> {
        let token = self.cur_token.clone();
        let arguments = self.parse_list(TokenKind::RParen, |p| {
            p.parse_expression(Precedence::Lowest)
        })?;

        Ok(Expression::Call {
            token,
            function: Box::new(function),
            arguments,
        })
    }

    fn parse_array_literal(&mut self) -> R<Expression> {
        let token = self.cur_token.clone();
        let elements = self.parse_list(TokenKind::RBracket, |p| {
            p.parse_expression(Precedence::Lowest)
        })?;

        Ok(Expression::Array { token, elements })
    }

    fn parse_index_expression(&mut self, left: Expression) -> R<Expression> {
        let token = self.cur_token.clone();

        self.next_token();
        let index = self.parse_expression(Precedence::Lowest)?;
        self.expect_peek(TokenKind::RBracket)?;

        Ok(Expression::Index {
            token,
            left: Box::new(left),
            index: Box::new(index),
        })
    }

    /// Parses `item (, item)* end`, starting with the opening delimiter as
    /// the current token. Shared by parameters, arguments and array elements.
    fn parse_list<T, F>(&mut self, end: TokenKind, mut parse_item: F) -> R<Vec<T>>
    where
        F: FnMut(&mut Self) -> R<T>,
    {
        let mut items = vec![];

        if self.peek_token.is(end) {
            self.next_token();
            return Ok(items);
        }

        self.next_token();
        items.push(parse_item(self)?);

        while self.peek_token.is(TokenKind::Comma) {
            self.next_token();
            self.next_token();
            items.push(parse_item(self)?);
        }

        self.expect_peek(end)?;

        Ok(items)
    }

    fn expect_peek(&mut self, kind: TokenKind) -> R<()> {
        if self.peek_token.is(kind) {
            self.next_token();
            Ok(())
        } else {
            Err(ParserError(format!(
                "expected next token to be {}, got {} instead",
                kind, self.peek_token.kind
            )))
        }
    }

    fn peek_precedence(&self) -> Precedence {
        Precedence::of(self.peek_token.kind)
    }

    fn cur_precedence(&self) -> Precedence {
        Precedence::of(self.cur_token.kind)
    }
}
