//! Operator-precedence (Pratt) parser
//!
//! The parser never fails hard: it records diagnostics and keeps going to
//! EOF, so a single pass surfaces as many errors as possible. Callers must
//! check the error list before trusting the returned [`Program`].

use thiserror::Error;

use base::span::Span;

use crate::syntax::{
    ast::{Block, Expr, InfixOp, PrefixOp, Program, Stmt},
    lex::{Lexer, Token, TokenKind},
};

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ParseErrorKind {
    #[error("expected next token to be {expected}, got {got} instead")]
    Unexpected {
        expected: TokenKind,
        got: TokenKind,
    },
    #[error("no prefix parse function for {kind} found")]
    NoPrefixParseFn { kind: TokenKind },
    #[error("could not parse {literal} as integer")]
    BadIntLiteral { literal: String },
}

/// Parse diagnostic. `Display` is the bare message; the span lets the driver
/// add line/column information.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{kind}")]
pub struct ParseError {
    pub kind: ParseErrorKind,
    pub span: Span,
}

/// Binding powers, low to high
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum Precedence {
    Lowest,
    /// `==`, `!=`
    Equality,
    /// `<`, `>`
    Comparison,
    /// `+`, `-`
    Sum,
    /// `*`, `/`
    Product,
    /// `!x`, `-x`
    Prefix,
    /// `f(x)`
    Call,
    /// `xs[i]`
    Index,
}

fn precedence_of(kind: TokenKind) -> Precedence {
    match kind {
        TokenKind::Eq | TokenKind::NotEq => Precedence::Equality,
        TokenKind::Lt | TokenKind::Gt => Precedence::Comparison,
        TokenKind::Plus | TokenKind::Minus => Precedence::Sum,
        TokenKind::Slash | TokenKind::Asterisk => Precedence::Product,
        TokenKind::LParen => Precedence::Call,
        TokenKind::LBracket => Precedence::Index,
        _ => Precedence::Lowest,
    }
}

/// Parses the whole source, best-effort
pub fn parse(src: &str) -> (Program, Vec<ParseError>) {
    let mut parser = Parser::new(src);
    let program = parser.parse_program();
    (program, parser.errors)
}

pub struct Parser<'s> {
    src: &'s str,
    lexer: Lexer<'s>,
    cur: Token,
    peek: Token,
    errors: Vec<ParseError>,
}

impl<'s> Parser<'s> {
    pub fn new(src: &'s str) -> Self {
        let mut lexer = Lexer::new(src);
        let cur = lexer.next_token();
        let peek = lexer.next_token();

        Self {
            src,
            lexer,
            cur,
            peek,
            errors: Vec::new(),
        }
    }

    pub fn errors(&self) -> &[ParseError] {
        &self.errors
    }

    pub fn parse_program(&mut self) -> Program {
        let mut stmts = Vec::new();

        while !self.cur_is(TokenKind::Eof) {
            if let Some(stmt) = self.parse_stmt() {
                stmts.push(stmt);
            }
            self.bump();
        }

        Program { stmts }
    }
}

/// Token plumbing
impl<'s> Parser<'s> {
    fn bump(&mut self) {
        self.cur = self.peek;
        self.peek = self.lexer.next_token();
    }

    fn cur_is(&self, kind: TokenKind) -> bool {
        self.cur.kind == kind
    }

    fn peek_is(&self, kind: TokenKind) -> bool {
        self.peek.kind == kind
    }

    fn cur_literal(&self) -> &'s str {
        self.cur.slice(self.src)
    }

    /// Advances over the expected token kind, or records a diagnostic and
    /// aborts the current statement by returning false.
    fn expect_peek(&mut self, expected: TokenKind) -> bool {
        if self.peek_is(expected) {
            self.bump();
            true
        } else {
            self.errors.push(ParseError {
                kind: ParseErrorKind::Unexpected {
                    expected,
                    got: self.peek.kind,
                },
                span: self.peek.span,
            });
            false
        }
    }
}

/// Statements
impl<'s> Parser<'s> {
    fn parse_stmt(&mut self) -> Option<Stmt> {
        match self.cur.kind {
            TokenKind::Let => self.parse_let_stmt(),
            TokenKind::Return => self.parse_return_stmt(),
            _ => self.parse_expr_stmt(),
        }
    }

    fn parse_let_stmt(&mut self) -> Option<Stmt> {
        if !self.expect_peek(TokenKind::Ident) {
            return None;
        }
        let name = self.cur_literal().to_string();

        if !self.expect_peek(TokenKind::Assign) {
            return None;
        }
        self.bump();

        let value = self.parse_expr(Precedence::Lowest)?;

        if self.peek_is(TokenKind::Semicolon) {
            self.bump();
        }

        Some(Stmt::Let { name, value })
    }

    fn parse_return_stmt(&mut self) -> Option<Stmt> {
        self.bump();

        let value = self.parse_expr(Precedence::Lowest)?;

        if self.peek_is(TokenKind::Semicolon) {
            self.bump();
        }

        Some(Stmt::Return { value })
    }

    fn parse_expr_stmt(&mut self) -> Option<Stmt> {
        let value = self.parse_expr(Precedence::Lowest)?;

        if self.peek_is(TokenKind::Semicolon) {
            self.bump();
        }

        Some(Stmt::Expr { value })
    }

    fn parse_block(&mut self) -> Block {
        let mut stmts = Vec::new();
        self.bump();

        while !self.cur_is(TokenKind::RBrace) && !self.cur_is(TokenKind::Eof) {
            if let Some(stmt) = self.parse_stmt() {
                stmts.push(stmt);
            }
            self.bump();
        }

        Block { stmts }
    }
}

/// Expressions
impl<'s> Parser<'s> {
    fn parse_expr(&mut self, min: Precedence) -> Option<Expr> {
        let mut left = self.parse_prefix()?;

        while !self.peek_is(TokenKind::Semicolon) && min < precedence_of(self.peek.kind) {
            left = match self.peek.kind {
                TokenKind::Plus
                | TokenKind::Minus
                | TokenKind::Slash
                | TokenKind::Asterisk
                | TokenKind::Lt
                | TokenKind::Gt
                | TokenKind::Eq
                | TokenKind::NotEq => {
                    self.bump();
                    self.parse_infix_expr(left)?
                }
                TokenKind::LParen => {
                    self.bump();
                    self.parse_call_expr(left)?
                }
                TokenKind::LBracket => {
                    self.bump();
                    self.parse_index_expr(left)?
                }
                _ => break,
            };
        }

        Some(left)
    }

    /// Prefix dispatch on the current token kind
    fn parse_prefix(&mut self) -> Option<Expr> {
        match self.cur.kind {
            TokenKind::Ident => Some(Expr::Ident(self.cur_literal().to_string())),
            TokenKind::Int => self.parse_int_literal(),
            TokenKind::Str => Some(Expr::Str(self.cur_literal().to_string())),
            TokenKind::True => Some(Expr::Bool(true)),
            TokenKind::False => Some(Expr::Bool(false)),
            TokenKind::Bang => self.parse_prefix_expr(PrefixOp::Bang),
            TokenKind::Minus => self.parse_prefix_expr(PrefixOp::Minus),
            TokenKind::LParen => self.parse_grouped_expr(),
            TokenKind::If => self.parse_if_expr(),
            TokenKind::Function => self.parse_func_literal(),
            TokenKind::LBracket => Some(Expr::Array(self.parse_expr_list(TokenKind::RBracket)?)),
            TokenKind::LBrace => self.parse_hash_literal(),
            TokenKind::Macro => self.parse_macro_literal(),
            kind => {
                self.errors.push(ParseError {
                    kind: ParseErrorKind::NoPrefixParseFn { kind },
                    span: self.cur.span,
                });
                None
            }
        }
    }

    fn parse_int_literal(&mut self) -> Option<Expr> {
        let literal = self.cur_literal();
        match literal.parse::<i64>() {
            Ok(value) => Some(Expr::Int(value)),
            Err(_) => {
                self.errors.push(ParseError {
                    kind: ParseErrorKind::BadIntLiteral {
                        literal: literal.to_string(),
                    },
                    span: self.cur.span,
                });
                None
            }
        }
    }

    fn parse_prefix_expr(&mut self, op: PrefixOp) -> Option<Expr> {
        self.bump();
        let right = self.parse_expr(Precedence::Prefix)?;
        Some(Expr::Prefix {
            op,
            right: Box::new(right),
        })
    }

    fn parse_infix_expr(&mut self, left: Expr) -> Option<Expr> {
        let op = match self.cur.kind {
            TokenKind::Plus => InfixOp::Add,
            TokenKind::Minus => InfixOp::Sub,
            TokenKind::Asterisk => InfixOp::Mul,
            TokenKind::Slash => InfixOp::Div,
            TokenKind::Lt => InfixOp::Lt,
            TokenKind::Gt => InfixOp::Gt,
            TokenKind::Eq => InfixOp::Eq,
            TokenKind::NotEq => InfixOp::NotEq,
            // only reachable from the infix dispatch above
            _ => unreachable!("not an infix operator: {}", self.cur.kind),
        };

        let prec = precedence_of(self.cur.kind);
        self.bump();
        let right = self.parse_expr(prec)?;

        Some(Expr::Infix {
            op,
            left: Box::new(left),
            right: Box::new(right),
        })
    }

    fn parse_grouped_expr(&mut self) -> Option<Expr> {
        self.bump();
        let expr = self.parse_expr(Precedence::Lowest)?;

        if !self.expect_peek(TokenKind::RParen) {
            return None;
        }

        Some(expr)
    }

    fn parse_if_expr(&mut self) -> Option<Expr> {
        if !self.expect_peek(TokenKind::LParen) {
            return None;
        }
        self.bump();

        let cond = self.parse_expr(Precedence::Lowest)?;

        if !self.expect_peek(TokenKind::RParen) {
            return None;
        }
        if !self.expect_peek(TokenKind::LBrace) {
            return None;
        }

        let then = self.parse_block();

        let alt = if self.peek_is(TokenKind::Else) {
            self.bump();
            if !self.expect_peek(TokenKind::LBrace) {
                return None;
            }
            Some(self.parse_block())
        } else {
            None
        };

        Some(Expr::If {
            cond: Box::new(cond),
            then,
            alt,
        })
    }

    fn parse_func_literal(&mut self) -> Option<Expr> {
        let (params, body) = self.parse_params_and_body()?;
        Some(Expr::Func { params, body })
    }

    fn parse_macro_literal(&mut self) -> Option<Expr> {
        let (params, body) = self.parse_params_and_body()?;
        Some(Expr::Macro { params, body })
    }

    /// `(<ident>, ...) { <stmts> }`, shared by `fn` and `macro` literals
    fn parse_params_and_body(&mut self) -> Option<(Vec<String>, Block)> {
        if !self.expect_peek(TokenKind::LParen) {
            return None;
        }

        let params = self.parse_list(TokenKind::RParen, |p| {
            if p.cur_is(TokenKind::Ident) {
                Some(p.cur_literal().to_string())
            } else {
                p.errors.push(ParseError {
                    kind: ParseErrorKind::Unexpected {
                        expected: TokenKind::Ident,
                        got: p.cur.kind,
                    },
                    span: p.cur.span,
                });
                None
            }
        })?;

        if !self.expect_peek(TokenKind::LBrace) {
            return None;
        }

        Some((params, self.parse_block()))
    }

    fn parse_call_expr(&mut self, func: Expr) -> Option<Expr> {
        let args = self.parse_expr_list(TokenKind::RParen)?;
        Some(Expr::Call {
            func: Box::new(func),
            args,
        })
    }

    fn parse_index_expr(&mut self, left: Expr) -> Option<Expr> {
        self.bump();
        let index = self.parse_expr(Precedence::Lowest)?;

        if !self.expect_peek(TokenKind::RBracket) {
            return None;
        }

        Some(Expr::Index {
            left: Box::new(left),
            index: Box::new(index),
        })
    }

    fn parse_hash_literal(&mut self) -> Option<Expr> {
        let pairs = self.parse_list(TokenKind::RBrace, |p| {
            let key = p.parse_expr(Precedence::Lowest)?;

            if !p.expect_peek(TokenKind::Colon) {
                return None;
            }
            p.bump();

            let value = p.parse_expr(Precedence::Lowest)?;
            Some((key, value))
        })?;

        Some(Expr::Hash(pairs))
    }

    fn parse_expr_list(&mut self, end: TokenKind) -> Option<Vec<Expr>> {
        self.parse_list(end, |p| p.parse_expr(Precedence::Lowest))
    }

    /// Comma-delimited list ending at `end`, with the current token sitting on
    /// the opening delimiter. Shared by call arguments, parameters, array and
    /// hash literals.
    fn parse_list<T>(
        &mut self,
        end: TokenKind,
        mut item: impl FnMut(&mut Self) -> Option<T>,
    ) -> Option<Vec<T>> {
        let mut items = Vec::new();

        if self.peek_is(end) {
            self.bump();
            return Some(items);
        }

        self.bump();
        items.push(item(self)?);

        while self.peek_is(TokenKind::Comma) {
            self.bump();
            self.bump();
            items.push(item(self)?);
        }

        if !self.expect_peek(end) {
            return None;
        }

        Some(items)
    }
}
