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

//! Predicate lowering: filter functions → boolean filter expressions
//!
//! A filter body is one or more `return`/`if`/block statements. Lowering a
//! block is a right-fold producing a pair `(expr, fallthrough)`:
//!
//! - `expr` is the condition under which the block returned `true`;
//! - `fallthrough` is `None` when the block provably always returns,
//!   otherwise the condition under which execution passes the block.
//!
//! An `if` followed by more statements composes as
//! `expr ∨ (fallthrough ∧ rest)`, which is how multi-statement bodies
//! collapse into one flat boolean expression.

use std::collections::HashMap;

use tracing::debug;

use crate::error::{Error, Result};
use crate::expr::{CmpOp, Expr, Operand, Value};
use crate::lang as ast;
use crate::lang::{BinOp, Else, FnDecl, IfStmt, Stmt, StructDef, TypeRef, UnOp};
use crate::schema::{self, Registry};

/// Lowered form of a built-in call. The surrounding context decides which
/// variants it accepts.
pub(crate) enum Lowered {
    /// A complete comparison (`strings.Contains`, `time.After`, …).
    Filter(Expr),
    /// Deferred two-operand call; meaning comes from the comparison around
    /// it (`bytes.Compare`, `time.Compare`).
    Func(Operand, Operand),
    /// `append(field, value)`, a push on the update side.
    Push(Operand, Operand),
    /// `time.Now()`, the caller-provided timestamp on the update side.
    TimeNow,
}

/// Shared lowering context for one filter or update function.
pub(crate) struct FnParser<'a> {
    pub(crate) doc: &'a str,
    pub(crate) args: &'a str,
    pub(crate) doc_type: &'a StructDef,
    doc_ty: TypeRef,
    args_ty: TypeRef,
    pub(crate) reg: &'a Registry,
    pub(crate) consts: &'a HashMap<String, Value>,
}

/// Lower a filter function to its boolean expression. The fallthrough of the
/// top-level block is discarded: an unreachable function end is legal.
pub fn lower_filter(
    f: &FnDecl,
    reg: &Registry,
    consts: &HashMap<String, Value>,
) -> Result<Expr> {
    debug!(name = %f.name, "parsing filter function");

    if f.ret.as_ref() != Some(&TypeRef::Bool) {
        return Err(Error::FilterReturnType);
    }
    if f.body.is_empty() {
        return Err(Error::MissingReturn);
    }

    let p = FnParser::new(f, reg, consts, true)?;
    let (flt, _) = p.parse_block(&f.body)?;
    Ok(flt)
}

/// Comparison result of `filter_op`: the Field operand always ends up on the
/// left. A right-side Field swaps the operands; `Eq`/`Ne` are symmetric under
/// the swap, the ordered operators go through negation. `Func` operands are
/// unwrapped and re-dispatched; a comparison without any Field is client-only.
pub(crate) fn filter_op(op: CmpOp, x: Operand, y: Operand) -> Expr {
    if x.is_field() {
        return Expr::cmp(op, x, y);
    }

    if y.is_field() {
        if op == CmpOp::Eq || op == CmpOp::Ne {
            return Expr::cmp(op, y, x);
        }
        return Expr::cmp(op, y, x).negate();
    }

    if let Operand::Func(a, b) = x {
        return filter_op(op, *a, *b);
    }
    if let Operand::Func(a, b) = y {
        return filter_op(op, *a, *b);
    }

    Expr::cmp_client(op, x, y)
}

impl<'a> FnParser<'a> {
    pub(crate) fn new(
        f: &'a FnDecl,
        reg: &'a Registry,
        consts: &'a HashMap<String, Value>,
        filter: bool,
    ) -> Result<Self> {
        if f.params.len() != 2 {
            return Err(if filter {
                Error::FilterParams
            } else {
                Error::UpdateParams
            });
        }

        let doc_param = &f.params[0];
        let doc_type = match &doc_param.ty {
            TypeRef::Named(n) => reg
                .strct(n)
                .ok_or_else(|| Error::UnknownType(n.clone()))?,
            other => return Err(Error::DocNotStruct(other.to_string())),
        };

        let args_param = &f.params[1];
        if let TypeRef::Named(n) = &args_param.ty {
            if reg.strct(n).is_none() {
                return Err(Error::UnknownType(n.clone()));
            }
        }

        debug!(doc = %doc_param.name, args = %args_param.name, "params");

        Ok(Self {
            doc: &doc_param.name,
            args: &args_param.name,
            doc_type,
            doc_ty: doc_param.ty.clone(),
            args_ty: args_param.ty.clone(),
            reg,
            consts,
        })
    }

    /// Fold a block of statements into `(expr, fallthrough)`.
    pub(crate) fn parse_block(&self, stmts: &[Stmt]) -> Result<(Expr, Option<Expr>)> {
        debug!("parse block statement");

        if let Some(stmt) = stmts.first() {
            match stmt {
                Stmt::Return(e) => {
                    if stmts.len() > 1 {
                        return Err(Error::UnreachableCode(stmts[1].to_string()));
                    }
                    Ok((self.parse_return(e)?, None))
                }
                Stmt::If(s) => {
                    let head = self.parse_if(s)?;
                    self.compose(head, stmts)
                }
                Stmt::Block(b) => {
                    let head = self.parse_block(b)?;
                    self.compose(head, stmts)
                }
                other => Err(Error::unsupported("block statement", other)),
            }
        } else {
            Err(Error::unsupported("block statement", &"empty block"))
        }
    }

    /// Stitch the head statement's `(expr, fallthrough)` with the remainder
    /// of the block.
    fn compose(
        &self,
        (head, fall): (Expr, Option<Expr>),
        stmts: &[Stmt],
    ) -> Result<(Expr, Option<Expr>)> {
        let rest = &stmts[1..];

        let fall = match fall {
            None => {
                if let Some(next) = rest.first() {
                    return Err(Error::UnreachableCode(next.to_string()));
                }
                return Ok((head, None));
            }
            Some(f) => f,
        };

        if rest.is_empty() {
            return Ok((head, Some(fall)));
        }

        let (rest_expr, rest_fall) = self.parse_block(rest)?;
        let block = Expr::or(vec![head, Expr::and(vec![fall.clone(), rest_expr])]);
        let block_fall = rest_fall.map(|rf| Expr::and(vec![fall, rf]));

        Ok((block, block_fall))
    }

    /// Lower one `if` chain to `(expr, fallthrough)`.
    fn parse_if(&self, s: &IfStmt) -> Result<(Expr, Option<Expr>)> {
        debug!("parse if statement");

        let if_cond = self.parse_cond(&s.cond)?;
        let (if_body, if_body_fall) = self.parse_block(&s.then)?;
        let mut if_expr = Expr::and(vec![if_cond.clone(), if_body]);

        let arm = match &s.els {
            None => {
                let fall = match if_body_fall {
                    None => if_cond.negate(),
                    Some(f) => Expr::or(vec![if_cond.negate(), f]),
                };
                return Ok((if_expr, Some(fall)));
            }
            Some(arm) => arm,
        };

        let (else_expr, else_fall) = match arm {
            Else::If(next) => self.parse_if(next)?,
            Else::Block(b) => self.parse_block(b)?,
        };

        if_expr = Expr::or(vec![
            if_expr,
            Expr::and(vec![if_cond.clone().negate(), else_expr]),
        ]);

        let fall = match (if_body_fall, else_fall) {
            (None, None) => None,
            (None, Some(ef)) => Some(Expr::and(vec![if_cond.negate(), ef])),
            (Some(bf), None) => Some(Expr::and(vec![if_cond, bf])),
            (Some(bf), Some(ef)) => Some(Expr::or(vec![
                Expr::and(vec![if_cond.clone(), bf]),
                Expr::and(vec![if_cond.negate(), ef]),
            ])),
        };

        Ok((if_expr, fall))
    }

    /// Lower an `if` condition. Bare boolean document fields become
    /// `field == true`; bare argument references the client-side dual.
    pub(crate) fn parse_cond(&self, e: &ast::Expr) -> Result<Expr> {
        if let Some(v) = schema::fold(self.consts, e)? {
            return match v {
                Value::Bool(true) => Ok(Expr::True),
                Value::Bool(false) => Ok(Expr::False),
                _ => Err(Error::unsupported("constant in if", e)),
            };
        }

        match e {
            ast::Expr::Binary { .. } | ast::Expr::Paren(_) => self.parse_bool_expr(e),
            ast::Expr::Ident(_) | ast::Expr::Selector { .. } | ast::Expr::Index { .. } => {
                match self.parse_operand(e)? {
                    x @ Operand::Field(_) => {
                        Ok(Expr::cmp(CmpOp::Eq, x, Operand::constant(true)))
                    }
                    x @ Operand::Arg(_) => {
                        Ok(Expr::cmp_client(CmpOp::Eq, x, Operand::constant(true)))
                    }
                    _ => Err(Error::unsupported("selector in if condition", e)),
                }
            }
            ast::Expr::Unary { op: UnOp::Not, x } => self.parse_unary_not(x),
            ast::Expr::Call { .. } => self.parse_bool_expr(e),
            _ => Err(Error::unsupported("if condition", e)),
        }
    }

    /// Lower a boolean expression (the body of a comparison chain).
    fn parse_bool_expr(&self, e: &ast::Expr) -> Result<Expr> {
        if let Some(v) = schema::fold(self.consts, e)? {
            return match v {
                Value::Bool(true) => Ok(Expr::True),
                Value::Bool(false) => Ok(Expr::False),
                _ => Err(Error::unsupported("constant in condition", e)),
            };
        }

        match e {
            ast::Expr::Binary { op, x, y } => {
                debug!(op = %op, "parse binary expression");
                match op {
                    BinOp::And => Ok(Expr::and(vec![
                        self.parse_bool_expr(x)?,
                        self.parse_bool_expr(y)?,
                    ])),
                    BinOp::Or => Ok(Expr::or(vec![
                        self.parse_bool_expr(x)?,
                        self.parse_bool_expr(y)?,
                    ])),
                    BinOp::Eq | BinOp::Ne | BinOp::Lt | BinOp::Lte | BinOp::Gt | BinOp::Gte => {
                        let xo = self.parse_operand(x)?;
                        let yo = self.parse_operand(y)?;
                        if !Operand::compatible(&xo, &yo) {
                            return Err(Error::InvalidOperands(e.to_string()));
                        }
                        Ok(filter_op(cmp_of(*op), xo, yo))
                    }
                    BinOp::Add | BinOp::Sub | BinOp::Mul | BinOp::Div => {
                        Err(Error::unsupported("binary op", op))
                    }
                }
            }
            ast::Expr::Unary { op: UnOp::Not, x } => self.parse_unary_not(x),
            ast::Expr::Paren(inner) => self.parse_bool_expr(inner),
            ast::Expr::Ident(_) => match self.parse_operand(e)? {
                x @ Operand::Arg(_) => {
                    Ok(Expr::cmp_client(CmpOp::Eq, x, Operand::constant(true)))
                }
                _ => Err(Error::UnexpectedBinary(e.to_string())),
            },
            ast::Expr::Selector { .. } | ast::Expr::Index { .. } => {
                match self.parse_operand(e)? {
                    x @ Operand::Field(_) => {
                        Ok(Expr::cmp(CmpOp::Eq, x, Operand::constant(true)))
                    }
                    x @ Operand::Arg(_) => {
                        Ok(Expr::cmp_client(CmpOp::Eq, x, Operand::constant(true)))
                    }
                    _ => Err(Error::UnexpectedBinary(e.to_string())),
                }
            }
            ast::Expr::Call { .. } => match self.parse_call(e)? {
                Lowered::Filter(f) => Ok(f),
                _ => Err(Error::unsupported("function call", e)),
            },
            _ => Err(Error::UnexpectedBinary(e.to_string())),
        }
    }

    /// Lower the operand of a unary `!`, applying De Morgan through the
    /// subexpression.
    fn parse_unary_not(&self, e: &ast::Expr) -> Result<Expr> {
        if let Some(v) = schema::fold(self.consts, e)? {
            return match v {
                Value::Bool(true) => Ok(Expr::False),
                Value::Bool(false) => Ok(Expr::True),
                _ => Err(Error::unsupported("constant in unary operator", e)),
            };
        }

        match e {
            ast::Expr::Binary { .. } | ast::Expr::Paren(_) => {
                Ok(self.parse_bool_expr(e)?.negate())
            }
            ast::Expr::Ident(_) | ast::Expr::Selector { .. } | ast::Expr::Index { .. } => {
                match self.parse_operand(e)? {
                    x @ Operand::Field(_) => {
                        Ok(Expr::cmp(CmpOp::Ne, x, Operand::constant(true)))
                    }
                    x @ Operand::Arg(_) => {
                        Ok(Expr::cmp_client(CmpOp::Ne, x, Operand::constant(true)))
                    }
                    _ => Err(Error::unsupported("unary operator", e)),
                }
            }
            ast::Expr::Call { .. } => match self.parse_call(e)? {
                Lowered::Filter(f) => Ok(f.negate()),
                _ => Err(Error::unsupported("unary operator", e)),
            },
            _ => Err(Error::unsupported("unary operator", e)),
        }
    }

    /// Lower the expression of a `return` statement.
    fn parse_return(&self, e: &ast::Expr) -> Result<Expr> {
        debug!("parse return statement");

        if let Some(v) = schema::fold(self.consts, e)? {
            return match v {
                Value::Bool(true) => Ok(Expr::True),
                Value::Bool(false) => Ok(Expr::False),
                _ => Err(Error::unsupported("return variable", e)),
            };
        }

        match e {
            ast::Expr::Binary { .. } | ast::Expr::Paren(_) => self.parse_bool_expr(e),
            ast::Expr::Unary { op: UnOp::Not, x } => self.parse_unary_not(x),
            ast::Expr::Ident(_) | ast::Expr::Selector { .. } | ast::Expr::Index { .. } => {
                match self.parse_operand(e)? {
                    x @ Operand::Field(_) => {
                        Ok(Expr::cmp(CmpOp::Eq, x, Operand::constant(true)))
                    }
                    x @ Operand::Arg(_) => {
                        Ok(Expr::cmp_client(CmpOp::Eq, x, Operand::constant(true)))
                    }
                    _ => Err(Error::unsupported("return variable", e)),
                }
            }
            ast::Expr::Call { .. } => match self.parse_call(e)? {
                Lowered::Filter(f) => Ok(f),
                _ => Err(Error::unsupported("return statement", e)),
            },
            _ => Err(Error::unsupported("return statement", e)),
        }
    }

    /// Resolve an expression to a single operand: a folded constant, a
    /// document field path, an argument path, or a deferred call.
    pub(crate) fn parse_operand(&self, e: &ast::Expr) -> Result<Operand> {
        if let Some(v) = schema::fold(self.consts, e)? {
            return Ok(Operand::Const(v));
        }

        match e {
            ast::Expr::Selector { .. } | ast::Expr::Index { .. } => {
                let (root, path) = self.parse_selector(e)?;
                if root == self.doc {
                    Ok(Operand::Field(self.reg.field_name(self.doc_type, &path)?))
                } else if root == self.args {
                    Ok(Operand::Arg(path.join(".")))
                } else {
                    Err(Error::UnknownSelectorRoot {
                        got: root,
                        doc: self.doc.to_string(),
                        args: self.args.to_string(),
                    })
                }
            }
            ast::Expr::Ident(n) if n == self.args => Ok(Operand::Arg(String::new())),
            ast::Expr::Call { .. } => match self.parse_call(e)? {
                Lowered::Func(x, y) => Ok(Operand::func(x, y)),
                _ => Err(Error::unsupported("operand type", e)),
            },
            _ => Err(Error::unsupported("operand type", e)),
        }
    }

    /// Unroll a selector chain to its root identifier and path elements.
    /// Index elements render to the literal's raw form or an argument
    /// template token.
    fn parse_selector(&self, e: &ast::Expr) -> Result<(String, Vec<String>)> {
        match e {
            ast::Expr::Ident(n) => Ok((n.clone(), Vec::new())),
            ast::Expr::Selector { x, sel } => {
                let (root, mut path) = self.parse_selector(x)?;
                path.push(sel.clone());
                Ok((root, path))
            }
            ast::Expr::Index { x, index } => {
                let (root, mut path) = self.parse_selector(x)?;
                match self.parse_operand(index)? {
                    Operand::Const(v) => path.push(v.raw()),
                    Operand::Arg(p) if p.is_empty() => path.push("{{.Arg}}".to_string()),
                    Operand::Arg(p) => path.push(format!("{{{{.Arg.{p}}}}}")),
                    _ => return Err(Error::unsupported("expression in selector", e)),
                }
                Ok((root, path))
            }
            _ => Err(Error::unsupported("expression in selector", e)),
        }
    }

    /// Lower a call expression to one of the supported built-in forms.
    pub(crate) fn parse_call(&self, e: &ast::Expr) -> Result<Lowered> {
        debug!("parse func call");

        let ast::Expr::Call { func, args } = e else {
            return Err(Error::unsupported("function call", e));
        };

        match func.as_ref() {
            ast::Expr::Ident(name) if name == "append" => {
                if args.len() != 2 {
                    return Err(Error::unsupported("function call", e));
                }
                let x = self.parse_operand(&args[0])?;
                let y = self.parse_operand(&args[1])?;
                if !Operand::compatible(&x, &y) {
                    return Err(Error::InvalidOperands(e.to_string()));
                }
                if x.is_field() && matches!(y, Operand::Const(_) | Operand::Arg(_)) {
                    return Ok(Lowered::Push(x, y));
                }
                Err(Error::unsupported("function call", e))
            }
            ast::Expr::Selector { x: recv, sel } => {
                if let ast::Expr::Ident(pkg) = recv.as_ref() {
                    if pkg != self.doc && pkg != self.args {
                        return self.parse_pkg_call(pkg, sel, args, e);
                    }
                }
                self.parse_time_method(recv, sel, args, e)
            }
            _ => Err(Error::unsupported("function call", e)),
        }
    }

    /// `strings.Contains`, `bytes.Compare`, `time.Now`.
    fn parse_pkg_call(
        &self,
        pkg: &str,
        name: &str,
        args: &[ast::Expr],
        e: &ast::Expr,
    ) -> Result<Lowered> {
        match (pkg, name) {
            ("strings", "Contains") if args.len() == 2 => {
                let x = self.parse_operand(&args[0])?;
                let y = self.parse_operand(&args[1])?;
                if !Operand::compatible(&x, &y) {
                    return Err(Error::InvalidOperands(e.to_string()));
                }
                Ok(Lowered::Filter(filter_op(CmpOp::Contains, x, y)))
            }
            ("bytes", "Compare") if args.len() == 2 => {
                let x = self.parse_operand(&args[0])?;
                let y = self.parse_operand(&args[1])?;
                if !Operand::compatible(&x, &y) {
                    return Err(Error::InvalidOperands(e.to_string()));
                }
                Ok(Lowered::Func(x, y))
            }
            ("time", "Now") if args.is_empty() => Ok(Lowered::TimeNow),
            _ => Err(Error::unsupported("function call", e)),
        }
    }

    /// `After`/`Before`/`Equal`/`Compare` on a time-typed receiver, with the
    /// receiver in either document or argument position.
    fn parse_time_method(
        &self,
        recv: &ast::Expr,
        name: &str,
        args: &[ast::Expr],
        e: &ast::Expr,
    ) -> Result<Lowered> {
        if args.len() != 1 {
            return Err(Error::unsupported("function call", e));
        }

        let (root, path) = self.parse_selector(recv)?;
        let root_ty = if root == self.doc {
            &self.doc_ty
        } else if root == self.args {
            &self.args_ty
        } else {
            return Err(Error::UnknownSelectorRoot {
                got: root,
                doc: self.doc.to_string(),
                args: self.args.to_string(),
            });
        };

        if self.reg.type_of_path(root_ty, &path) != Some(TypeRef::Time) {
            return Err(Error::unsupported("function call", e));
        }

        let x = self.parse_operand(recv)?;
        let y = self.parse_operand(&args[0])?;
        if !Operand::compatible(&x, &y) {
            return Err(Error::InvalidOperands(e.to_string()));
        }

        let op = match name {
            "After" => CmpOp::Gt,
            "Before" => CmpOp::Lt,
            "Equal" => CmpOp::Eq,
            "Compare" => return Ok(Lowered::Func(x, y)),
            _ => return Err(Error::unsupported("function call", e)),
        };

        debug!(op = op.key(), method = name, "time method");

        Ok(Lowered::Filter(filter_op(op, x, y)))
    }
}

fn cmp_of(op: BinOp) -> CmpOp {
    match op {
        BinOp::Eq => CmpOp::Eq,
        BinOp::Ne => CmpOp::Ne,
        BinOp::Lt => CmpOp::Lt,
        BinOp::Lte => CmpOp::Lte,
        BinOp::Gt => CmpOp::Gt,
        // Add/Sub/Mul/Div are rejected before this point; Gte is the only
        // remaining comparison.
        _ => CmpOp::Gte,
    }
}
