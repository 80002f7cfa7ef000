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

//! Filter marshalling
//!
//! The tricky part is comma placement: inside a `$and`/`$or` array any
//! element may be wrapped in a guard the runtime can elide, so the separator
//! has to stay valid for every combination of guard outcomes. One element is
//! the anchor (the last unconditional one, or the last element when all are
//! guarded); elements before it carry a trailing comma inside their guard,
//! elements after it a leading comma inside their guard.

use crate::error::{Error, Result};
use crate::expr::{CmpOp, Expr, Operand};

use super::{client_guard, guard_of, json_str, render_value};

/// Render a filter expression to its JSON+template form.
pub fn marshal_filter(flt: &Expr) -> Result<String> {
    if flt.is_true() {
        return Ok("{}".to_string());
    }
    if flt.is_false() {
        return Err(Error::FilterAlwaysFalse);
    }

    // A filter with no server side at all guards the match-all document.
    if flt.is_client() {
        let mut out = String::new();
        out.push_str("{{ if ");
        out.push_str(&client_guard(flt)?);
        out.push_str(" }}{}{{end}}");
        return Ok(out);
    }

    let mut out = String::new();
    render(flt, &mut out)?;
    Ok(out)
}

fn render(e: &Expr, out: &mut String) -> Result<()> {
    match e {
        Expr::True => {
            out.push_str("{}");
            Ok(())
        }
        Expr::False => Err(Error::FilterAlwaysFalse),
        Expr::Cmp { op, x, y, .. } => render_cmp(*op, x, y, out),
        Expr::And { list, client } => {
            let guard = if client.is_empty() {
                None
            } else {
                Some(guard_of(client)?)
            };
            if let Some(g) = &guard {
                out.push_str("{{ if ");
                out.push_str(g);
                out.push_str(" }}");
            }
            render_and_body(list, out)?;
            if guard.is_some() {
                out.push_str("{{end}}");
            }
            Ok(())
        }
        Expr::Or { list, client } => {
            if !client.is_empty() {
                return Err(Error::ClientEvalInOr);
            }
            if list.len() == 1 {
                return render(&list[0], out);
            }
            out.push_str("{\"$or\":[");
            render_array(list, out)?;
            out.push_str("]}");
            Ok(())
        }
    }
}

fn render_and_body(list: &[Expr], out: &mut String) -> Result<()> {
    match list.len() {
        0 => {
            out.push_str("{}");
            Ok(())
        }
        1 => render(&list[0], out),
        _ => {
            out.push_str("{\"$and\":[");
            render_array(list, out)?;
            out.push_str("]}");
            Ok(())
        }
    }
}

struct Elem {
    guard: Option<String>,
    body: String,
}

fn elem_of(e: &Expr) -> Result<Elem> {
    if let Expr::And { list, client } = e {
        if !client.is_empty() {
            let mut body = String::new();
            render_and_body(list, &mut body)?;
            return Ok(Elem {
                guard: Some(guard_of(client)?),
                body,
            });
        }
    }

    let mut body = String::new();
    render(e, &mut body)?;
    Ok(Elem { guard: None, body })
}

fn render_array(children: &[Expr], out: &mut String) -> Result<()> {
    let elems = children
        .iter()
        .map(elem_of)
        .collect::<Result<Vec<Elem>>>()?;

    let anchor = elems
        .iter()
        .rposition(|e| e.guard.is_none())
        .unwrap_or(elems.len().saturating_sub(1));

    for (i, el) in elems.iter().enumerate() {
        match &el.guard {
            Some(g) => {
                out.push_str("{{ if ");
                out.push_str(g);
                out.push_str(" }}");
                if i > anchor {
                    out.push(',');
                }
                out.push_str(&el.body);
                if i < anchor {
                    out.push(',');
                }
                out.push_str("{{end}}");
            }
            None => {
                if i > anchor {
                    out.push(',');
                }
                out.push_str(&el.body);
                if i < anchor {
                    out.push(',');
                }
            }
        }
    }

    Ok(())
}

fn render_cmp(op: CmpOp, x: &Operand, y: &Operand, out: &mut String) -> Result<()> {
    let name = match x {
        Operand::Field(p) => json_str(p),
        _ => {
            return Err(Error::Internal(
                "comparison without document field".to_string(),
            ))
        }
    };
    let value = render_value(y)?;

    out.push('{');
    out.push_str(&name);
    out.push(':');
    if op == CmpOp::Eq {
        out.push_str(&value);
    } else {
        out.push_str("{\"");
        out.push_str(op.key());
        out.push_str("\":");
        out.push_str(&value);
        out.push('}');
    }
    out.push('}');

    Ok(())
}
