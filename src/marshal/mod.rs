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

//! Rendering of lowered expressions to the JSON+template wire form
//!
//! Filters render to a JSON document over `$and`/`$or`/comparison keys;
//! updates to `{"$set":{…},…}` sections. Client-evaluable conditions become
//! `{{ if … }} … {{end}}` guards around the fragment they control, and the
//! helpers here produce the template-side boolean clauses those guards use.

mod filter;
mod update;

pub use filter::marshal_filter;
pub use update::marshal_update;

use crate::error::{Error, Result};
use crate::expr::{Expr, Operand};

/// JSON-quoted string.
pub(crate) fn json_str(s: &str) -> String {
    serde_json::Value::String(s.to_string()).to_string()
}

/// Template clause of one client condition: `eq .Arg.X 10`, with nested
/// `and`/`or` wrapping each subcondition in parentheses.
pub(crate) fn templ_cond(e: &Expr) -> Result<String> {
    match e {
        Expr::Cmp { op, x, y, .. } => Ok(format!(
            "{} {} {}",
            op.templ(),
            templ_operand(x)?,
            templ_operand(y)?
        )),
        Expr::And { client, .. } => templ_list("and", client),
        Expr::Or { client, .. } => templ_list("or", client),
        Expr::True | Expr::False => Err(Error::Internal(
            "boolean constant in template guard".to_string(),
        )),
    }
}

fn templ_list(op: &str, children: &[Expr]) -> Result<String> {
    let mut out = String::from(op);
    for c in children {
        out.push_str(" ( ");
        out.push_str(&templ_cond(c)?);
        out.push_str(" )");
    }
    Ok(out)
}

/// Guard clause over an AND's client list: one condition stays bare,
/// several are and-joined.
pub(crate) fn guard_of(client: &[Expr]) -> Result<String> {
    if client.len() == 1 {
        templ_cond(&client[0])
    } else {
        templ_list("and", client)
    }
}

/// Guard clause of a whole client-evaluable expression.
pub(crate) fn client_guard(e: &Expr) -> Result<String> {
    match e {
        Expr::Cmp { .. } => templ_cond(e),
        Expr::And { client, .. } => guard_of(client),
        Expr::Or { client, .. } => templ_list("or", client),
        Expr::True | Expr::False => Err(Error::Internal(
            "boolean constant in template guard".to_string(),
        )),
    }
}

fn templ_operand(o: &Operand) -> Result<String> {
    match o {
        Operand::Arg(p) if p.is_empty() => Ok(".Arg".to_string()),
        Operand::Arg(p) => Ok(format!(".Arg.{p}")),
        Operand::Const(v) => Ok(v.to_json()),
        Operand::Field(_) | Operand::Func(..) => Err(Error::Internal(
            "server operand in template guard".to_string(),
        )),
    }
}

/// Value position of a comparison or update entry. Argument paths that are
/// already template form (`{{toJSON .Time}}`) pass through verbatim.
pub(crate) fn render_value(o: &Operand) -> Result<String> {
    match o {
        Operand::Const(v) => Ok(v.to_json()),
        Operand::Arg(p) if p.starts_with("{{") => Ok(p.clone()),
        Operand::Arg(p) if p.is_empty() => Ok("{{toJSON .Arg}}".to_string()),
        Operand::Arg(p) => Ok(format!("{{{{toJSON .Arg.{p}}}}}")),
        Operand::Field(_) | Operand::Func(..) => Err(Error::Internal(
            "unexpected operand in value position".to_string(),
        )),
    }
}
