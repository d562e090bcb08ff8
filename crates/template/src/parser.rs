// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Recursive-descent parser over the token stream produced by [`crate::lexer`].

use crate::ast::{CompareOp, Expr, PathSeg};
use crate::error::TemplateError;
use crate::lexer::{tokenize, Token};
use weft_core::Value;

pub fn parse(expr: &str) -> Result<Expr, TemplateError> {
    let tokens = tokenize(expr)?;
    let mut parser = Parser {
        expr: expr.to_string(),
        tokens,
        pos: 0,
    };
    let result = parser.parse_expr()?;
    parser.expect_eof()?;
    Ok(result)
}

struct Parser {
    expr: String,
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser {
    fn peek(&self) -> &Token {
        &self.tokens[self.pos]
    }

    fn advance(&mut self) -> Token {
        let t = self.tokens[self.pos].clone();
        if self.pos + 1 < self.tokens.len() {
            self.pos += 1;
        }
        t
    }

    fn syntax_err(&self) -> TemplateError {
        TemplateError::Syntax {
            expr: self.expr.clone(),
            found: format!("{:?}", self.peek()),
            position: self.pos,
        }
    }

    fn expect_eof(&self) -> Result<(), TemplateError> {
        if matches!(self.peek(), Token::Eof) {
            Ok(())
        } else {
            Err(self.syntax_err())
        }
    }

    fn parse_expr(&mut self) -> Result<Expr, TemplateError> {
        self.parse_conditional()
    }

    fn parse_conditional(&mut self) -> Result<Expr, TemplateError> {
        let value = self.parse_filter_chain()?;
        if matches!(self.peek(), Token::If) {
            self.advance();
            let cond = self.parse_filter_chain()?;
            if !matches!(self.peek(), Token::Else) {
                return Err(self.syntax_err());
            }
            self.advance();
            let else_ = self.parse_conditional()?;
            Ok(Expr::Conditional {
                value: Box::new(value),
                cond: Box::new(cond),
                else_: Box::new(else_),
            })
        } else {
            Ok(value)
        }
    }

    fn parse_filter_chain(&mut self) -> Result<Expr, TemplateError> {
        let mut base = self.parse_concat()?;
        while matches!(self.peek(), Token::Pipe) {
            self.advance();
            let name = match self.advance() {
                Token::Ident(name) => name,
                _ => return Err(self.syntax_err()),
            };
            let mut args = Vec::new();
            if matches!(self.peek(), Token::LParen) {
                self.advance();
                if !matches!(self.peek(), Token::RParen) {
                    args.push(self.parse_expr()?);
                    while matches!(self.peek(), Token::Comma) {
                        self.advance();
                        args.push(self.parse_expr()?);
                    }
                }
                if !matches!(self.peek(), Token::RParen) {
                    return Err(self.syntax_err());
                }
                self.advance();
            }
            base = Expr::Filter {
                base: Box::new(base),
                name,
                args,
            };
        }
        Ok(base)
    }

    fn parse_concat(&mut self) -> Result<Expr, TemplateError> {
        let first = self.parse_comparison()?;
        if !matches!(self.peek(), Token::Plus) {
            return Ok(first);
        }
        let mut parts = vec![first];
        while matches!(self.peek(), Token::Plus) {
            self.advance();
            parts.push(self.parse_comparison()?);
        }
        Ok(Expr::Concat(parts))
    }

    fn parse_comparison(&mut self) -> Result<Expr, TemplateError> {
        let left = self.parse_primary()?;
        let op = match self.peek() {
            Token::Eq => CompareOp::Eq,
            Token::Ne => CompareOp::Ne,
            Token::Lt => CompareOp::Lt,
            Token::Le => CompareOp::Le,
            Token::Gt => CompareOp::Gt,
            Token::Ge => CompareOp::Ge,
            _ => return Ok(left),
        };
        self.advance();
        let right = self.parse_primary()?;
        Ok(Expr::Compare {
            left: Box::new(left),
            op,
            right: Box::new(right),
        })
    }

    fn parse_primary(&mut self) -> Result<Expr, TemplateError> {
        match self.peek().clone() {
            Token::Int(n) => {
                self.advance();
                Ok(Expr::Literal(Value::Int(n)))
            }
            Token::Float(f) => {
                self.advance();
                Ok(Expr::Literal(Value::Float(f)))
            }
            Token::Str(s) => {
                self.advance();
                Ok(Expr::Literal(Value::String(s)))
            }
            Token::Ident(name) => {
                self.advance();
                match name.as_str() {
                    "true" => return Ok(Expr::Literal(Value::Bool(true))),
                    "false" => return Ok(Expr::Literal(Value::Bool(false))),
                    "null" => return Ok(Expr::Literal(Value::Null)),
                    _ => {}
                }
                self.parse_path_tail(name)
            }
            Token::LParen => {
                self.advance();
                let inner = self.parse_expr()?;
                if !matches!(self.peek(), Token::RParen) {
                    return Err(self.syntax_err());
                }
                self.advance();
                Ok(inner)
            }
            _ => Err(self.syntax_err()),
        }
    }

    fn parse_path_tail(&mut self, root: String) -> Result<Expr, TemplateError> {
        let mut segs = Vec::new();
        loop {
            match self.peek() {
                Token::Dot => {
                    self.advance();
                    match self.advance() {
                        Token::Ident(name) => segs.push(PathSeg::Field(name)),
                        _ => return Err(self.syntax_err()),
                    }
                }
                Token::LBracket => {
                    self.advance();
                    let index = self.parse_expr()?;
                    if !matches!(self.peek(), Token::RBracket) {
                        return Err(self.syntax_err());
                    }
                    self.advance();
                    segs.push(PathSeg::Index(Box::new(index)));
                }
                _ => break,
            }
        }
        Ok(Expr::Path { root, segs })
    }
}
