// SPDX-License-Identifier: AGPL-3.0-or-later
// BurrowGen - Query Codegen for the Burrow Document Database
// Copyright (C) 2026 Burrow Labs (https://github.com/burrowdb)
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program. If not, see <https://www.gnu.org/licenses/>.

//! Recursive-descent parser for predicate modules
//!
//! ```text
//! module   → (use | type | const | fn)*
//! use      → 'use' IDENT
//! type     → 'type' IDENT '{' (IDENT typeref TAG?)* '}'
//! typeref  → '[' ']' typeref | 'map' '[' typeref ']' typeref | IDENT
//! const    → 'const' IDENT '=' expr
//! fn       → 'fn' IDENT '(' params? ')' typeref? block
//! stmt     → 'return' expr | if | block | expr (assign-op expr | '++' | '--')?
//! expr     → or ; or → and ('||' and)* ; and → cmp ('&&' cmp)*
//! cmp      → add (('=='|'!='|'<'|'<='|'>'|'>=') add)*
//! add      → mul (('+'|'-') mul)* ; mul → unary (('*'|'/') unary)*
//! unary    → ('!'|'-') unary | postfix
//! postfix  → primary ('.' IDENT | '[' expr ']' | '(' args ')')*
//! ```

use thiserror::Error;

use super::lexer::{Lexer, Token};
use super::{
    AssignOp, BinOp, ConstDecl, Else, Expr, FieldDef, FnDecl, IfStmt, Lit, Module, Param, Stmt,
    StructDef, TypeRef, UnOp,
};

/// Front-end error with source position.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("parse error at line {line}, column {column}: {message}")]
pub struct ParseError {
    pub message: String,
    pub line: usize,
    pub column: usize,
}

pub(crate) struct Parser<'a> {
    lexer: Lexer<'a>,
    current: Token,
}

fn bin(op: BinOp, x: Expr, y: Expr) -> Expr {
    Expr::Binary {
        op,
        x: Box::new(x),
        y: Box::new(y),
    }
}

/// Parse a whole predicate module.
pub fn parse_module(input: &str) -> Result<Module, ParseError> {
    Parser::new(input)?.module()
}

impl<'a> Parser<'a> {
    fn new(input: &'a str) -> Result<Self, ParseError> {
        let mut lexer = Lexer::new(input);
        let current = lexer.next_token()?;
        Ok(Self { lexer, current })
    }

    fn err(&self, message: impl Into<String>) -> ParseError {
        ParseError {
            message: message.into(),
            line: self.lexer.line(),
            column: self.lexer.column(),
        }
    }

    fn advance(&mut self) -> Result<(), ParseError> {
        self.current = self.lexer.next_token()?;
        Ok(())
    }

    fn expect(&mut self, tok: Token, what: &str) -> Result<(), ParseError> {
        if self.current == tok {
            self.advance()
        } else {
            Err(self.err(format!("expected {what}, got {:?}", self.current)))
        }
    }

    fn ident(&mut self, what: &str) -> Result<String, ParseError> {
        match self.current.clone() {
            Token::Ident(name) => {
                self.advance()?;
                Ok(name)
            }
            other => Err(self.err(format!("expected {what}, got {other:?}"))),
        }
    }

    fn module(&mut self) -> Result<Module, ParseError> {
        let mut m = Module::default();

        loop {
            match self.current {
                Token::Eof => return Ok(m),
                Token::KwUse => {
                    self.advance()?;
                    m.imports.push(self.ident("package name")?);
                }
                Token::KwType => m.types.push(self.type_decl()?),
                Token::KwConst => m.consts.push(self.const_decl()?),
                Token::KwFn => m.fns.push(self.fn_decl()?),
                ref other => {
                    return Err(self.err(format!("expected declaration, got {other:?}")))
                }
            }
        }
    }

    fn type_decl(&mut self) -> Result<StructDef, ParseError> {
        self.advance()?; // 'type'
        let name = self.ident("type name")?;
        self.expect(Token::LBrace, "'{'")?;

        let mut fields = Vec::new();
        while self.current != Token::RBrace {
            let fname = self.ident("field name")?;
            let ty = self.type_ref()?;
            let tag = match self.current.clone() {
                Token::Tag(t) => {
                    self.advance()?;
                    Some(t)
                }
                _ => None,
            };
            fields.push(FieldDef {
                name: fname,
                ty,
                tag,
            });
        }
        self.advance()?; // '}'

        Ok(StructDef { name, fields })
    }

    fn type_ref(&mut self) -> Result<TypeRef, ParseError> {
        match self.current.clone() {
            Token::LBracket => {
                self.advance()?;
                self.expect(Token::RBracket, "']'")?;
                Ok(TypeRef::List(Box::new(self.type_ref()?)))
            }
            Token::Ident(name) => {
                self.advance()?;
                if name == "map" && self.current == Token::LBracket {
                    self.advance()?;
                    let key = self.type_ref()?;
                    self.expect(Token::RBracket, "']'")?;
                    let value = self.type_ref()?;
                    return Ok(TypeRef::Map(Box::new(key), Box::new(value)));
                }
                Ok(match name.as_str() {
                    "bool" => TypeRef::Bool,
                    "int" => TypeRef::Int,
                    "float" => TypeRef::Float,
                    "string" => TypeRef::Str,
                    "bytes" => TypeRef::Bytes,
                    "time" => TypeRef::Time,
                    "uuid" => TypeRef::Uuid,
                    _ => TypeRef::Named(name),
                })
            }
            other => Err(self.err(format!("expected type, got {other:?}"))),
        }
    }

    fn const_decl(&mut self) -> Result<ConstDecl, ParseError> {
        self.advance()?; // 'const'
        let name = self.ident("constant name")?;
        self.expect(Token::Assign, "'='")?;
        let value = self.expr()?;
        Ok(ConstDecl { name, value })
    }

    fn fn_decl(&mut self) -> Result<FnDecl, ParseError> {
        self.advance()?; // 'fn'
        let name = self.ident("function name")?;
        self.expect(Token::LParen, "'('")?;

        let mut params = Vec::new();
        while self.current != Token::RParen {
            if !params.is_empty() {
                self.expect(Token::Comma, "','")?;
            }
            let pname = self.ident("parameter name")?;
            let ty = self.type_ref()?;
            params.push(Param { name: pname, ty });
        }
        self.advance()?; // ')'

        let ret = if self.current != Token::LBrace {
            Some(self.type_ref()?)
        } else {
            None
        };

        let body = self.block()?;

        Ok(FnDecl {
            name,
            params,
            ret,
            body,
        })
    }

    fn block(&mut self) -> Result<Vec<Stmt>, ParseError> {
        self.expect(Token::LBrace, "'{'")?;
        let mut stmts = Vec::new();
        while self.current != Token::RBrace {
            if self.current == Token::Eof {
                return Err(self.err("unexpected end of input in block"));
            }
            stmts.push(self.stmt()?);
        }
        self.advance()?; // '}'
        Ok(stmts)
    }

    fn stmt(&mut self) -> Result<Stmt, ParseError> {
        match self.current {
            Token::KwReturn => {
                self.advance()?;
                Ok(Stmt::Return(self.expr()?))
            }
            Token::KwIf => Ok(Stmt::If(self.if_stmt()?)),
            Token::LBrace => Ok(Stmt::Block(self.block()?)),
            _ => {
                let lhs = self.expr()?;
                let op = match self.current {
                    Token::Assign => Some(AssignOp::Assign),
                    Token::PlusAssign => Some(AssignOp::Add),
                    Token::MinusAssign => Some(AssignOp::Sub),
                    Token::StarAssign => Some(AssignOp::Mul),
                    Token::SlashAssign => Some(AssignOp::Div),
                    Token::PlusPlus => {
                        self.advance()?;
                        return Ok(Stmt::IncDec { lhs, inc: true });
                    }
                    Token::MinusMinus => {
                        self.advance()?;
                        return Ok(Stmt::IncDec { lhs, inc: false });
                    }
                    _ => None,
                };
                match op {
                    Some(op) => {
                        self.advance()?;
                        let rhs = self.expr()?;
                        Ok(Stmt::Assign { lhs, op, rhs })
                    }
                    None => Ok(Stmt::Expr(lhs)),
                }
            }
        }
    }

    fn if_stmt(&mut self) -> Result<IfStmt, ParseError> {
        self.advance()?; // 'if'
        let cond = self.expr()?;
        let then = self.block()?;

        let els = if self.current == Token::KwElse {
            self.advance()?;
            match self.current {
                Token::KwIf => Some(Else::If(Box::new(self.if_stmt()?))),
                Token::LBrace => Some(Else::Block(self.block()?)),
                ref other => {
                    return Err(self.err(format!("expected 'if' or block after else, got {other:?}")))
                }
            }
        } else {
            None
        };

        Ok(IfStmt { cond, then, els })
    }

    fn expr(&mut self) -> Result<Expr, ParseError> {
        self.or_expr()
    }

    fn or_expr(&mut self) -> Result<Expr, ParseError> {
        let mut left = self.and_expr()?;
        while self.current == Token::OrOr {
            self.advance()?;
            let right = self.and_expr()?;
            left = bin(BinOp::Or, left, right);
        }
        Ok(left)
    }

    fn and_expr(&mut self) -> Result<Expr, ParseError> {
        let mut left = self.cmp_expr()?;
        while self.current == Token::AndAnd {
            self.advance()?;
            let right = self.cmp_expr()?;
            left = bin(BinOp::And, left, right);
        }
        Ok(left)
    }

    fn cmp_expr(&mut self) -> Result<Expr, ParseError> {
        let mut left = self.add_expr()?;
        loop {
            let op = match self.current {
                Token::EqEq => BinOp::Eq,
                Token::NotEq => BinOp::Ne,
                Token::Lt => BinOp::Lt,
                Token::Lte => BinOp::Lte,
                Token::Gt => BinOp::Gt,
                Token::Gte => BinOp::Gte,
                _ => break,
            };
            self.advance()?;
            let right = self.add_expr()?;
            left = bin(op, left, right);
        }
        Ok(left)
    }

    fn add_expr(&mut self) -> Result<Expr, ParseError> {
        let mut left = self.mul_expr()?;
        loop {
            let op = match self.current {
                Token::Plus => BinOp::Add,
                Token::Minus => BinOp::Sub,
                _ => break,
            };
            self.advance()?;
            let right = self.mul_expr()?;
            left = bin(op, left, right);
        }
        Ok(left)
    }

    fn mul_expr(&mut self) -> Result<Expr, ParseError> {
        let mut left = self.unary_expr()?;
        loop {
            let op = match self.current {
                Token::Star => BinOp::Mul,
                Token::Slash => BinOp::Div,
                _ => break,
            };
            self.advance()?;
            let right = self.unary_expr()?;
            left = bin(op, left, right);
        }
        Ok(left)
    }

    fn unary_expr(&mut self) -> Result<Expr, ParseError> {
        let op = match self.current {
            Token::Not => UnOp::Not,
            Token::Minus => UnOp::Neg,
            _ => return self.postfix_expr(),
        };
        self.advance()?;
        let x = self.unary_expr()?;
        Ok(Expr::Unary { op, x: Box::new(x) })
    }

    fn postfix_expr(&mut self) -> Result<Expr, ParseError> {
        let mut e = self.primary_expr()?;
        loop {
            match self.current {
                Token::Dot => {
                    self.advance()?;
                    let sel = self.ident("selector name")?;
                    e = Expr::Selector {
                        x: Box::new(e),
                        sel,
                    };
                }
                Token::LBracket => {
                    self.advance()?;
                    let index = self.expr()?;
                    self.expect(Token::RBracket, "']'")?;
                    e = Expr::Index {
                        x: Box::new(e),
                        index: Box::new(index),
                    };
                }
                Token::LParen => {
                    self.advance()?;
                    let mut args = Vec::new();
                    while self.current != Token::RParen {
                        if !args.is_empty() {
                            self.expect(Token::Comma, "','")?;
                        }
                        args.push(self.expr()?);
                    }
                    self.advance()?; // ')'
                    e = Expr::Call {
                        func: Box::new(e),
                        args,
                    };
                }
                _ => return Ok(e),
            }
        }
    }

    fn primary_expr(&mut self) -> Result<Expr, ParseError> {
        match self.current.clone() {
            Token::Int(v) => {
                self.advance()?;
                Ok(Expr::Lit(Lit::Int(v)))
            }
            Token::Float(v) => {
                self.advance()?;
                Ok(Expr::Lit(Lit::Float(v)))
            }
            Token::Str(v) => {
                self.advance()?;
                Ok(Expr::Lit(Lit::Str(v)))
            }
            Token::KwTrue => {
                self.advance()?;
                Ok(Expr::Lit(Lit::Bool(true)))
            }
            Token::KwFalse => {
                self.advance()?;
                Ok(Expr::Lit(Lit::Bool(false)))
            }
            Token::Ident(name) => {
                self.advance()?;
                Ok(Expr::Ident(name))
            }
            Token::LParen => {
                self.advance()?;
                let inner = self.expr()?;
                self.expect(Token::RParen, "')'")?;
                Ok(Expr::Paren(Box::new(inner)))
            }
            other => Err(self.err(format!("expected expression, got {other:?}"))),
        }
    }
}
