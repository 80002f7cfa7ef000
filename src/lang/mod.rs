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

//! Burrow predicate language front end
//!
//! A module is a flat list of declarations:
//!
//! ```text
//! use burrow
//!
//! type Doc {
//!     FieldInt int `field_int`
//!     Nested   Nested `nested`
//!     Tags     []string
//! }
//!
//! const Threshold = 10 + 18
//!
//! fn Recent(d Doc, args Args) bool {
//!     return d.FieldInt < Threshold
//! }
//! ```
//!
//! Every AST node prints a canonical single-line source form via `Display`;
//! compile errors embed these snippets instead of carrying position tables.

mod lexer;
mod parser;

pub use lexer::{Lexer, Token};
pub use parser::{parse_module, ParseError};

use std::fmt;

/// Unary operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnOp {
    Not,
    Neg,
}

/// Binary operator, logical and arithmetic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinOp {
    Or,
    And,
    Eq,
    Ne,
    Lt,
    Lte,
    Gt,
    Gte,
    Add,
    Sub,
    Mul,
    Div,
}

impl fmt::Display for BinOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            BinOp::Or => "||",
            BinOp::And => "&&",
            BinOp::Eq => "==",
            BinOp::Ne => "!=",
            BinOp::Lt => "<",
            BinOp::Lte => "<=",
            BinOp::Gt => ">",
            BinOp::Gte => ">=",
            BinOp::Add => "+",
            BinOp::Sub => "-",
            BinOp::Mul => "*",
            BinOp::Div => "/",
        };
        f.write_str(s)
    }
}

/// Literal constant as written in source.
#[derive(Debug, Clone, PartialEq)]
pub enum Lit {
    Int(i64),
    Float(f64),
    Str(String),
    Bool(bool),
}

impl fmt::Display for Lit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Lit::Int(v) => write!(f, "{v}"),
            Lit::Float(v) => write!(f, "{v}"),
            Lit::Str(v) => write!(f, "{v:?}"),
            Lit::Bool(v) => write!(f, "{v}"),
        }
    }
}

/// Expression node.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Lit(Lit),
    Ident(String),
    Selector { x: Box<Expr>, sel: String },
    Index { x: Box<Expr>, index: Box<Expr> },
    Call { func: Box<Expr>, args: Vec<Expr> },
    Unary { op: UnOp, x: Box<Expr> },
    Binary { op: BinOp, x: Box<Expr>, y: Box<Expr> },
    Paren(Box<Expr>),
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Lit(l) => write!(f, "{l}"),
            Expr::Ident(n) => f.write_str(n),
            Expr::Selector { x, sel } => write!(f, "{x}.{sel}"),
            Expr::Index { x, index } => write!(f, "{x}[{index}]"),
            Expr::Call { func, args } => {
                write!(f, "{func}(")?;
                for (i, a) in args.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{a}")?;
                }
                f.write_str(")")
            }
            Expr::Unary { op: UnOp::Not, x } => write!(f, "!{x}"),
            Expr::Unary { op: UnOp::Neg, x } => write!(f, "-{x}"),
            Expr::Binary { op, x, y } => write!(f, "{x} {op} {y}"),
            Expr::Paren(x) => write!(f, "({x})"),
        }
    }
}

/// Assignment operator of an update statement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssignOp {
    Assign,
    Add,
    Sub,
    Mul,
    Div,
}

impl fmt::Display for AssignOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            AssignOp::Assign => "=",
            AssignOp::Add => "+=",
            AssignOp::Sub => "-=",
            AssignOp::Mul => "*=",
            AssignOp::Div => "/=",
        };
        f.write_str(s)
    }
}

/// The else arm of an `if` statement.
#[derive(Debug, Clone, PartialEq)]
pub enum Else {
    /// `else if …`
    If(Box<IfStmt>),
    /// `else { … }`
    Block(Vec<Stmt>),
}

/// An `if` statement with optional else chain.
#[derive(Debug, Clone, PartialEq)]
pub struct IfStmt {
    pub cond: Expr,
    pub then: Vec<Stmt>,
    pub els: Option<Else>,
}

/// Statement node.
#[derive(Debug, Clone, PartialEq)]
pub enum Stmt {
    Return(Expr),
    If(IfStmt),
    Assign {
        lhs: Expr,
        op: AssignOp,
        rhs: Expr,
    },
    IncDec {
        lhs: Expr,
        inc: bool,
    },
    Expr(Expr),
    Block(Vec<Stmt>),
}

fn fmt_stmts(f: &mut fmt::Formatter<'_>, stmts: &[Stmt]) -> fmt::Result {
    f.write_str("{ ")?;
    for (i, s) in stmts.iter().enumerate() {
        if i > 0 {
            f.write_str("; ")?;
        }
        write!(f, "{s}")?;
    }
    f.write_str(" }")
}

impl fmt::Display for IfStmt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "if {} ", self.cond)?;
        fmt_stmts(f, &self.then)?;
        match &self.els {
            None => Ok(()),
            Some(Else::If(next)) => write!(f, " else {next}"),
            Some(Else::Block(b)) => {
                f.write_str(" else ")?;
                fmt_stmts(f, b)
            }
        }
    }
}

impl fmt::Display for Stmt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stmt::Return(e) => write!(f, "return {e}"),
            Stmt::If(s) => write!(f, "{s}"),
            Stmt::Assign { lhs, op, rhs } => write!(f, "{lhs} {op} {rhs}"),
            Stmt::IncDec { lhs, inc: true } => write!(f, "{lhs}++"),
            Stmt::IncDec { lhs, inc: false } => write!(f, "{lhs}--"),
            Stmt::Expr(e) => write!(f, "{e}"),
            Stmt::Block(b) => fmt_stmts(f, b),
        }
    }
}

/// Type reference in declarations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeRef {
    Bool,
    Int,
    Float,
    Str,
    Bytes,
    Time,
    Uuid,
    List(Box<TypeRef>),
    Map(Box<TypeRef>, Box<TypeRef>),
    Named(String),
}

impl fmt::Display for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeRef::Bool => f.write_str("bool"),
            TypeRef::Int => f.write_str("int"),
            TypeRef::Float => f.write_str("float"),
            TypeRef::Str => f.write_str("string"),
            TypeRef::Bytes => f.write_str("bytes"),
            TypeRef::Time => f.write_str("time"),
            TypeRef::Uuid => f.write_str("uuid"),
            TypeRef::List(t) => write!(f, "[]{t}"),
            TypeRef::Map(k, v) => write!(f, "map[{k}]{v}"),
            TypeRef::Named(n) => f.write_str(n),
        }
    }
}

/// Struct field with optional serialization tag.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldDef {
    pub name: String,
    pub ty: TypeRef,
    pub tag: Option<String>,
}

/// Struct type declaration.
#[derive(Debug, Clone, PartialEq)]
pub struct StructDef {
    pub name: String,
    pub fields: Vec<FieldDef>,
}

impl StructDef {
    pub fn field(&self, name: &str) -> Option<&FieldDef> {
        self.fields.iter().find(|f| f.name == name)
    }
}

/// Named constant declaration.
#[derive(Debug, Clone, PartialEq)]
pub struct ConstDecl {
    pub name: String,
    pub value: Expr,
}

/// Function parameter.
#[derive(Debug, Clone, PartialEq)]
pub struct Param {
    pub name: String,
    pub ty: TypeRef,
}

/// Function declaration. `ret` is `None` for procedures.
#[derive(Debug, Clone, PartialEq)]
pub struct FnDecl {
    pub name: String,
    pub params: Vec<Param>,
    pub ret: Option<TypeRef>,
    pub body: Vec<Stmt>,
}

/// A parsed predicate module.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Module {
    pub imports: Vec<String>,
    pub types: Vec<StructDef>,
    pub consts: Vec<ConstDecl>,
    pub fns: Vec<FnDecl>,
}

impl Module {
    pub fn func(&self, name: &str) -> Option<&FnDecl> {
        self.fns.iter().find(|f| f.name == name)
    }
}
