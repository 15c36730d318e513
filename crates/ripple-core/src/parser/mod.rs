// Parser for the Ripple language
// Hand-written recursive descent over the token stream. Statements are
// newline-separated; blocks are keyword-delimited (fn/endfn, if/endif,
// while/endwhile). Decorator lines precede function definitions.

pub mod lexer;

#[cfg(test)]
mod tests;

use thiserror::Error;
use tracing::trace;

use crate::ast::{self, BinOp, CmpOp, Expr, ExprKind, FunctionDef, Program, Span, Stmt, StmtKind, UnaryOp};

pub use lexer::{tokenize, Token, TokenKind};

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("syntax error at line {line}, column {col}: {message}")]
    Syntax {
        line: u32,
        col: u32,
        message: String,
    },
}

impl ParseError {
    fn at(span: Span, message: impl Into<String>) -> Self {
        ParseError::Syntax {
            line: span.line,
            col: span.col,
            message: message.into(),
        }
    }
}

/// Parses a complete Ripple program.
pub fn parse(source: &str) -> Result<Program, ParseError> {
    let tokens = tokenize(source)?;
    let mut parser = Parser { tokens, pos: 0 };
    parser.program()
}

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser {
    fn peek(&self) -> &TokenKind {
        &self.tokens[self.pos].kind
    }

    fn peek_span(&self) -> Span {
        self.tokens[self.pos].span
    }

    fn advance(&mut self) -> Token {
        let token = self.tokens[self.pos].clone();
        if !matches!(token.kind, TokenKind::Eof) {
            self.pos += 1;
        }
        token
    }

    fn eat(&mut self, kind: &TokenKind) -> bool {
        if self.peek() == kind {
            self.advance();
            true
        } else {
            false
        }
    }

    fn expect(&mut self, kind: TokenKind, what: &str) -> Result<Token, ParseError> {
        if self.peek() == &kind {
            Ok(self.advance())
        } else {
            Err(ParseError::at(
                self.peek_span(),
                format!("expected {what}, found {:?}", self.peek()),
            ))
        }
    }

    fn expect_ident(&mut self, what: &str) -> Result<(String, Span), ParseError> {
        let span = self.peek_span();
        match self.peek() {
            TokenKind::Ident(name) => {
                let name = name.clone();
                self.advance();
                Ok((name, span))
            }
            other => Err(ParseError::at(
                span,
                format!("expected {what}, found {other:?}"),
            )),
        }
    }

    fn skip_newlines(&mut self) {
        while self.eat(&TokenKind::Newline) {}
    }

    /// Consumes the statement separator: a newline, or the end of input /
    /// an enclosing block terminator.
    fn end_of_stmt(&mut self) -> Result<(), ParseError> {
        match self.peek() {
            TokenKind::Newline => {
                self.advance();
                Ok(())
            }
            TokenKind::Eof
            | TokenKind::EndFn
            | TokenKind::Else
            | TokenKind::EndIf
            | TokenKind::EndWhile => Ok(()),
            other => Err(ParseError::at(
                self.peek_span(),
                format!("expected end of statement, found {other:?}"),
            )),
        }
    }

    fn program(&mut self) -> Result<Program, ParseError> {
        let mut body = Vec::new();
        loop {
            self.skip_newlines();
            if matches!(self.peek(), TokenKind::Eof) {
                break;
            }
            body.push(self.statement()?);
        }
        Ok(Program { body })
    }

    fn block(&mut self, terminators: &[TokenKind]) -> Result<Vec<Stmt>, ParseError> {
        let mut body = Vec::new();
        loop {
            self.skip_newlines();
            if terminators.contains(self.peek()) {
                return Ok(body);
            }
            if matches!(self.peek(), TokenKind::Eof) {
                return Err(ParseError::at(
                    self.peek_span(),
                    "unexpected end of input inside block",
                ));
            }
            body.push(self.statement()?);
        }
    }

    fn statement(&mut self) -> Result<Stmt, ParseError> {
        trace!(token = ?self.peek(), "parsing statement");
        match self.peek() {
            TokenKind::At | TokenKind::Fn => self.function_def(),
            TokenKind::Return => self.return_stmt(),
            TokenKind::If => self.if_stmt(),
            TokenKind::While => self.while_stmt(),
            _ => self.simple_stmt(),
        }
    }

    fn function_def(&mut self) -> Result<Stmt, ParseError> {
        let span = self.peek_span();
        let mut decorators = Vec::new();
        while self.peek() == &TokenKind::At {
            self.advance();
            let expr = self.postfix()?;
            if ast::base_name(&expr).is_none() {
                return Err(ParseError::at(expr.span, "invalid decorator expression"));
            }
            decorators.push(expr);
            self.end_of_stmt()?;
            self.skip_newlines();
        }
        self.expect(TokenKind::Fn, "`fn`")?;
        let (name, _) = self.expect_ident("function name")?;
        self.expect(TokenKind::LParen, "`(`")?;
        let mut params = Vec::new();
        if self.peek() != &TokenKind::RParen {
            loop {
                let (param, _) = self.expect_ident("parameter name")?;
                params.push(param);
                if !self.eat(&TokenKind::Comma) {
                    break;
                }
            }
        }
        self.expect(TokenKind::RParen, "`)`")?;
        self.end_of_stmt()?;
        let body = self.block(&[TokenKind::EndFn])?;
        self.expect(TokenKind::EndFn, "`endfn`")?;
        self.end_of_stmt()?;
        Ok(Stmt::new(
            StmtKind::FunctionDef(FunctionDef {
                name,
                params,
                decorators,
                body,
                span,
            }),
            span,
        ))
    }

    fn return_stmt(&mut self) -> Result<Stmt, ParseError> {
        let span = self.peek_span();
        self.advance();
        let value = if matches!(
            self.peek(),
            TokenKind::Newline | TokenKind::Eof | TokenKind::EndFn
        ) {
            None
        } else {
            Some(self.expression()?)
        };
        self.end_of_stmt()?;
        Ok(Stmt::new(StmtKind::Return { value }, span))
    }

    fn if_stmt(&mut self) -> Result<Stmt, ParseError> {
        let span = self.peek_span();
        self.advance();
        let cond = self.expression()?;
        self.end_of_stmt()?;
        let then_body = self.block(&[TokenKind::Else, TokenKind::EndIf])?;
        let else_body = if self.eat(&TokenKind::Else) {
            self.end_of_stmt()?;
            Some(self.block(&[TokenKind::EndIf])?)
        } else {
            None
        };
        self.expect(TokenKind::EndIf, "`endif`")?;
        self.end_of_stmt()?;
        Ok(Stmt::new(
            StmtKind::If {
                cond,
                then_body,
                else_body,
            },
            span,
        ))
    }

    fn while_stmt(&mut self) -> Result<Stmt, ParseError> {
        let span = self.peek_span();
        self.advance();
        let cond = self.expression()?;
        self.end_of_stmt()?;
        let body = self.block(&[TokenKind::EndWhile])?;
        self.expect(TokenKind::EndWhile, "`endwhile`")?;
        self.end_of_stmt()?;
        Ok(Stmt::new(StmtKind::While { cond, body }, span))
    }

    fn simple_stmt(&mut self) -> Result<Stmt, ParseError> {
        let span = self.peek_span();
        let target = self.expression()?;
        let aug_op = match self.peek() {
            TokenKind::PlusEq => Some(BinOp::Add),
            TokenKind::MinusEq => Some(BinOp::Sub),
            TokenKind::StarEq => Some(BinOp::Mul),
            TokenKind::SlashEq => Some(BinOp::Div),
            _ => None,
        };
        let kind = if let Some(op) = aug_op {
            self.assignable(&target)?;
            self.advance();
            let value = self.expression()?;
            StmtKind::AugAssign { target, op, value }
        } else if self.peek() == &TokenKind::Assign {
            self.assignable(&target)?;
            self.advance();
            let value = self.expression()?;
            StmtKind::Assign { target, value }
        } else {
            StmtKind::Expr { value: target }
        };
        self.end_of_stmt()?;
        Ok(Stmt::new(kind, span))
    }

    fn assignable(&self, target: &Expr) -> Result<(), ParseError> {
        if target.is_lvalue() {
            Ok(())
        } else {
            Err(ParseError::at(
                target.span,
                "cannot assign to this expression",
            ))
        }
    }

    fn expression(&mut self) -> Result<Expr, ParseError> {
        let left = self.additive()?;
        let op = match self.peek() {
            TokenKind::EqEq => Some(CmpOp::Eq),
            TokenKind::NotEq => Some(CmpOp::Ne),
            TokenKind::Lt => Some(CmpOp::Lt),
            TokenKind::Le => Some(CmpOp::Le),
            TokenKind::Gt => Some(CmpOp::Gt),
            TokenKind::Ge => Some(CmpOp::Ge),
            _ => None,
        };
        let Some(op) = op else {
            return Ok(left);
        };
        self.advance();
        let right = self.additive()?;
        let span = left.span;
        Ok(Expr::new(
            ExprKind::Compare {
                op,
                left: Box::new(left),
                right: Box::new(right),
            },
            span,
        ))
    }

    fn additive(&mut self) -> Result<Expr, ParseError> {
        let mut left = self.multiplicative()?;
        loop {
            let op = match self.peek() {
                TokenKind::Plus => BinOp::Add,
                TokenKind::Minus => BinOp::Sub,
                _ => return Ok(left),
            };
            self.advance();
            let right = self.multiplicative()?;
            let span = left.span;
            left = Expr::new(
                ExprKind::Binary {
                    op,
                    left: Box::new(left),
                    right: Box::new(right),
                },
                span,
            );
        }
    }

    fn multiplicative(&mut self) -> Result<Expr, ParseError> {
        let mut left = self.unary()?;
        loop {
            let op = match self.peek() {
                TokenKind::Star => BinOp::Mul,
                TokenKind::Slash => BinOp::Div,
                TokenKind::Percent => BinOp::Mod,
                _ => return Ok(left),
            };
            self.advance();
            let right = self.unary()?;
            let span = left.span;
            left = Expr::new(
                ExprKind::Binary {
                    op,
                    left: Box::new(left),
                    right: Box::new(right),
                },
                span,
            );
        }
    }

    fn unary(&mut self) -> Result<Expr, ParseError> {
        let span = self.peek_span();
        let op = match self.peek() {
            TokenKind::Minus => Some(UnaryOp::Neg),
            TokenKind::Bang => Some(UnaryOp::Not),
            _ => None,
        };
        let Some(op) = op else {
            return self.postfix();
        };
        self.advance();
        let operand = self.unary()?;
        Ok(Expr::new(
            ExprKind::Unary {
                op,
                operand: Box::new(operand),
            },
            span,
        ))
    }

    fn postfix(&mut self) -> Result<Expr, ParseError> {
        let mut expr = self.primary()?;
        loop {
            let span = expr.span;
            match self.peek() {
                TokenKind::LParen => {
                    self.advance();
                    let mut args = Vec::new();
                    if self.peek() != &TokenKind::RParen {
                        loop {
                            args.push(self.expression()?);
                            if !self.eat(&TokenKind::Comma) {
                                break;
                            }
                        }
                    }
                    self.expect(TokenKind::RParen, "`)`")?;
                    expr = Expr::new(
                        ExprKind::Call {
                            callee: Box::new(expr),
                            args,
                        },
                        span,
                    );
                }
                TokenKind::Dot => {
                    self.advance();
                    let (name, _) = self.expect_ident("property name")?;
                    expr = Expr::new(
                        ExprKind::Property {
                            object: Box::new(expr),
                            name,
                        },
                        span,
                    );
                }
                TokenKind::LBracket => {
                    self.advance();
                    let index = self.expression()?;
                    self.expect(TokenKind::RBracket, "`]`")?;
                    expr = Expr::new(
                        ExprKind::Index {
                            object: Box::new(expr),
                            index: Box::new(index),
                        },
                        span,
                    );
                }
                _ => return Ok(expr),
            }
        }
    }

    fn primary(&mut self) -> Result<Expr, ParseError> {
        let span = self.peek_span();
        let kind = match self.peek().clone() {
            TokenKind::Int(n) => {
                self.advance();
                ExprKind::Int(n)
            }
            TokenKind::Float(x) => {
                self.advance();
                ExprKind::Float(x)
            }
            TokenKind::Str(s) => {
                self.advance();
                ExprKind::Str(s)
            }
            TokenKind::True => {
                self.advance();
                ExprKind::Bool(true)
            }
            TokenKind::False => {
                self.advance();
                ExprKind::Bool(false)
            }
            TokenKind::Null => {
                self.advance();
                ExprKind::Null
            }
            TokenKind::Ident(name) => {
                self.advance();
                ExprKind::Name(name)
            }
            TokenKind::LParen => {
                self.advance();
                let expr = self.expression()?;
                self.expect(TokenKind::RParen, "`)`")?;
                return Ok(expr);
            }
            TokenKind::LBracket => {
                self.advance();
                let mut elements = Vec::new();
                if self.peek() != &TokenKind::RBracket {
                    loop {
                        elements.push(self.expression()?);
                        if !self.eat(&TokenKind::Comma) {
                            break;
                        }
                    }
                }
                self.expect(TokenKind::RBracket, "`]`")?;
                ExprKind::List(elements)
            }
            other => {
                return Err(ParseError::at(
                    span,
                    format!("expected an expression, found {other:?}"),
                ))
            }
        };
        Ok(Expr::new(kind, span))
    }
}
