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

//! Discovery of client API call sites
//!
//! Walks every function body of a module for calls on the database client
//! package and records which functions are referenced as filter or update
//! callbacks. Argument positions are fixed: index 2 is the filter, index 3
//! the update (`Update`/`UpdateOne` only); `UpdateAll` takes its update at
//! index 2 and has no filter.

use std::collections::HashSet;

use tracing::debug;

use crate::error::{Error, Result};
use crate::lang::{Else, Expr, IfStmt, Module, Stmt};

/// Client API surface scanned for callbacks.
pub const API_NAMES: [&str; 8] = [
    "Update",
    "UpdateOne",
    "UpdateAll",
    "Read",
    "ReadOne",
    "ReadWithOptions",
    "Delete",
    "DeleteOne",
];

/// Function names referenced as callbacks, in first-seen order.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct Discovered {
    pub filters: Vec<String>,
    pub updates: Vec<String>,
}

struct Walker<'a> {
    client_pkg: &'a str,
    found: Discovered,
    seen_filters: HashSet<String>,
    seen_updates: HashSet<String>,
}

/// Scan a module for API call sites on `client_pkg`.
pub fn discover(m: &Module, client_pkg: &str) -> Result<Discovered> {
    let mut w = Walker {
        client_pkg,
        found: Discovered::default(),
        seen_filters: HashSet::new(),
        seen_updates: HashSet::new(),
    };

    for f in &m.fns {
        debug!(name = %f.name, "scanning function");
        w.walk_stmts(&f.body)?;
    }

    Ok(w.found)
}

impl Walker<'_> {
    fn walk_stmts(&mut self, stmts: &[Stmt]) -> Result<()> {
        for s in stmts {
            match s {
                Stmt::Return(e) | Stmt::Expr(e) => self.walk_expr(e)?,
                Stmt::Assign { lhs, rhs, .. } => {
                    self.walk_expr(lhs)?;
                    self.walk_expr(rhs)?;
                }
                Stmt::IncDec { lhs, .. } => self.walk_expr(lhs)?,
                Stmt::If(s) => self.walk_if(s)?,
                Stmt::Block(b) => self.walk_stmts(b)?,
            }
        }
        Ok(())
    }

    fn walk_if(&mut self, s: &IfStmt) -> Result<()> {
        self.walk_expr(&s.cond)?;
        self.walk_stmts(&s.then)?;
        match &s.els {
            None => Ok(()),
            Some(Else::If(next)) => self.walk_if(next),
            Some(Else::Block(b)) => self.walk_stmts(b),
        }
    }

    fn walk_expr(&mut self, e: &Expr) -> Result<()> {
        match e {
            Expr::Call { func, args } => {
                self.check_api(e, func, args)?;
                self.walk_expr(func)?;
                for a in args {
                    self.walk_expr(a)?;
                }
                Ok(())
            }
            Expr::Selector { x, .. } => self.walk_expr(x),
            Expr::Index { x, index } => {
                self.walk_expr(x)?;
                self.walk_expr(index)
            }
            Expr::Unary { x, .. } => self.walk_expr(x),
            Expr::Binary { x, y, .. } => {
                self.walk_expr(x)?;
                self.walk_expr(y)
            }
            Expr::Paren(x) => self.walk_expr(x),
            Expr::Lit(_) | Expr::Ident(_) => Ok(()),
        }
    }

    fn check_api(&mut self, call: &Expr, func: &Expr, args: &[Expr]) -> Result<()> {
        let Expr::Selector { x, sel } = func else {
            return Ok(());
        };
        let Expr::Ident(pkg) = x.as_ref() else {
            return Ok(());
        };
        if pkg != self.client_pkg || !API_NAMES.contains(&sel.as_str()) {
            return Ok(());
        }

        debug!(api = %sel, "found API call");

        if sel == "UpdateAll" {
            let name = callback_name(call, args, 2)?;
            self.record_update(name);
            return Ok(());
        }

        let name = callback_name(call, args, 2)?;
        self.record_filter(name);

        if sel == "Update" || sel == "UpdateOne" {
            let name = callback_name(call, args, 3)?;
            self.record_update(name);
        }

        Ok(())
    }

    fn record_filter(&mut self, name: &str) {
        if self.seen_filters.insert(name.to_string()) {
            self.found.filters.push(name.to_string());
        } else {
            debug!(name, "skipping duplicate filter");
        }
    }

    fn record_update(&mut self, name: &str) {
        if self.seen_updates.insert(name.to_string()) {
            self.found.updates.push(name.to_string());
        } else {
            debug!(name, "skipping duplicate update");
        }
    }
}

fn callback_name<'a>(call: &Expr, args: &'a [Expr], idx: usize) -> Result<&'a str> {
    match args.get(idx) {
        Some(Expr::Ident(name)) => Ok(name),
        Some(other) => Err(Error::unsupported("API function parameter", other)),
        None => Err(Error::unsupported("API function parameter", call)),
    }
}
