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

//! Update lowering: mutator functions → ordered update expression lists
//!
//! Update bodies accept assignment statements and `if` statements whose
//! conditions are client-evaluable. Each assignment becomes one
//! [`UpdateExpr::Assign`]; an `if`/`else if`/`else` chain becomes one
//! [`UpdateExpr::If`] per branch, with each branch condition conjoined with
//! the negation of the conditions before it.

use std::collections::HashMap;

use tracing::debug;

use crate::error::{Error, Result};
use crate::expr::{Expr, Operand, UpdateExpr, UpdateOp, Value};
use crate::filter::{FnParser, Lowered};
use crate::lang as ast;
use crate::lang::{AssignOp, Else, FnDecl, IfStmt, Stmt};
use crate::schema::Registry;

/// Lower an update function to its update expression list.
pub fn lower_update(
    f: &FnDecl,
    reg: &Registry,
    consts: &HashMap<String, Value>,
) -> Result<Vec<UpdateExpr>> {
    debug!(name = %f.name, "parsing update function");

    if f.ret.is_some() {
        return Err(Error::UpdateReturns);
    }
    if f.body.is_empty() {
        return Err(Error::EmptyUpdate);
    }

    let p = FnParser::new(f, reg, consts, false)?;
    p.parse_update_block(&f.body)
}

impl FnParser<'_> {
    fn parse_update_block(&self, stmts: &[Stmt]) -> Result<Vec<UpdateExpr>> {
        let mut upd = Vec::new();

        for stmt in stmts {
            match stmt {
                Stmt::Assign { lhs, op, rhs } => {
                    debug!("assignment statement");

                    let field = self.parse_operand(lhs)?;
                    if !field.is_field() {
                        return Err(Error::UpdateLhsNotField);
                    }

                    if matches!(rhs, ast::Expr::Call { .. }) {
                        upd.push(self.parse_call_rhs(stmt, field, rhs)?);
                        continue;
                    }

                    let value = self.parse_operand(rhs)?;
                    if !matches!(value, Operand::Const(_) | Operand::Arg(_)) {
                        return Err(Error::UpdateRhsNotValue);
                    }

                    let op = match op {
                        AssignOp::Assign => UpdateOp::Set,
                        AssignOp::Add => UpdateOp::Inc,
                        AssignOp::Sub => UpdateOp::Dec,
                        AssignOp::Mul => UpdateOp::Mul,
                        AssignOp::Div => UpdateOp::Div,
                    };
                    upd.push(UpdateExpr::Assign { op, field, value });
                }
                Stmt::IncDec { lhs, inc } => {
                    let field = self.parse_operand(lhs)?;
                    if !field.is_field() {
                        return Err(Error::UpdateLhsNotField);
                    }
                    upd.push(UpdateExpr::Assign {
                        op: if *inc { UpdateOp::Inc } else { UpdateOp::Dec },
                        field,
                        value: Operand::constant(1i64),
                    });
                }
                Stmt::If(s) => upd.extend(self.parse_update_if(s)?),
                other => return Err(Error::UpdateStatement(other.to_string())),
            }
        }

        Ok(upd)
    }

    /// Call right-hand sides: `append` on the assigned field becomes a push,
    /// `time.Now()` a set of the caller-provided timestamp.
    fn parse_call_rhs(
        &self,
        stmt: &Stmt,
        field: Operand,
        rhs: &ast::Expr,
    ) -> Result<UpdateExpr> {
        match self.parse_call(rhs)? {
            Lowered::Push(x, y) => {
                let same = matches!(
                    (&field, &x),
                    (Operand::Field(lhs), Operand::Field(apd)) if lhs == apd
                );
                if same {
                    return Ok(UpdateExpr::Assign {
                        op: UpdateOp::Push,
                        field: x,
                        value: y,
                    });
                }
                Err(Error::UpdateStatement(stmt.to_string()))
            }
            Lowered::TimeNow => Ok(UpdateExpr::Assign {
                op: UpdateOp::Set,
                field,
                value: Operand::arg("{{toJSON .Time}}"),
            }),
            _ => Err(Error::UpdateStatement(stmt.to_string())),
        }
    }

    /// One `If` node per branch of the chain; each later branch carries the
    /// negated conditions of the branches before it.
    fn parse_update_if(&self, s: &IfStmt) -> Result<Vec<UpdateExpr>> {
        debug!("parse update if statement");

        let cond = self.parse_update_cond(&s.cond)?;
        let body = self.parse_update_block(&s.then)?;
        let mut out = vec![UpdateExpr::If {
            cond: cond.clone(),
            body,
        }];

        match &s.els {
            None => {}
            Some(Else::Block(b)) => {
                out.push(UpdateExpr::If {
                    cond: cond.negate(),
                    body: self.parse_update_block(b)?,
                });
            }
            Some(Else::If(next)) => {
                for branch in self.parse_update_if(next)? {
                    let UpdateExpr::If { cond: c, body } = branch else {
                        continue;
                    };
                    out.push(UpdateExpr::If {
                        cond: Expr::and(vec![cond.clone().negate(), c]),
                        body,
                    });
                }
            }
        }

        Ok(out)
    }

    /// Update conditions must be decidable before the query is sent; any
    /// condition touching a document field is rejected.
    fn parse_update_cond(&self, e: &ast::Expr) -> Result<Expr> {
        let cond = self.parse_cond(e)?;
        if cond.is_true() || cond.is_false() || cond.is_client() {
            return Ok(cond);
        }
        Err(Error::ClientOnlyUpdateCond(e.to_string()))
    }
}
