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

//! Update marshalling
//!
//! Sections appear in the fixed order `$set`, `$increment`, `$decrement`,
//! `$divide`, `$multiply`, `$push`; empty sections are omitted. A guarded
//! group contributes to every section its body assigns in, wrapped in its
//! own `{{ if … }}`. The anchor of a section is its first unconditional
//! entry: guarded entries before it emit a synthetic or-guarded comma, and
//! everything after it leads with a comma inside its guard.

use crate::error::{Error, Result};
use crate::expr::{Operand, UpdateExpr, UpdateOp};

use super::{client_guard, json_str, render_value};

const OP_ORDER: [UpdateOp; 6] = [
    UpdateOp::Set,
    UpdateOp::Inc,
    UpdateOp::Dec,
    UpdateOp::Div,
    UpdateOp::Mul,
    UpdateOp::Push,
];

/// Render an update expression list to its JSON+template form.
pub fn marshal_update(upd: &[UpdateExpr]) -> Result<String> {
    let mut out = String::from("{");
    let mut first = true;

    for op in OP_ORDER {
        let entries = collect(upd, op)?;
        if entries.is_empty() {
            continue;
        }
        if !first {
            out.push(',');
        }
        first = false;

        out.push('"');
        out.push_str(op.key());
        out.push_str("\":{");
        render_entries(&entries, &mut out);
        out.push('}');
    }

    out.push('}');
    Ok(out)
}

enum Entry {
    /// Rendered `"field":value` pair.
    Plain(String),
    /// Guard clause plus the entries it controls.
    Guarded(String, Vec<Entry>),
}

/// Entries of one operator section, in source order. Guarded groups keep
/// only the assignments matching the operator; groups left empty vanish.
fn collect(upd: &[UpdateExpr], op: UpdateOp) -> Result<Vec<Entry>> {
    let mut out = Vec::new();

    for u in upd {
        match u {
            UpdateExpr::Assign {
                op: o,
                field,
                value,
            } if *o == op => {
                let name = match field {
                    Operand::Field(p) => json_str(p),
                    _ => {
                        return Err(Error::Internal(
                            "update target is not a document field".to_string(),
                        ))
                    }
                };
                out.push(Entry::Plain(format!("{name}:{}", render_value(value)?)));
            }
            UpdateExpr::Assign { .. } => {}
            UpdateExpr::If { cond, body } => {
                let sub = collect(body, op)?;
                if sub.is_empty() || cond.is_false() {
                    continue;
                }
                if cond.is_true() {
                    out.extend(sub);
                } else {
                    out.push(Entry::Guarded(client_guard(cond)?, sub));
                }
            }
        }
    }

    Ok(out)
}

fn render_entries(entries: &[Entry], out: &mut String) {
    let anchor = entries.iter().position(|e| matches!(e, Entry::Plain(_)));

    let Some(anchor) = anchor else {
        render_guarded_run(entries, out);
        return;
    };

    render_guarded_run(&entries[..anchor], out);

    // One synthetic separator covers every optional entry before the anchor.
    if anchor > 0 {
        let guards: Vec<&str> = entries[..anchor]
            .iter()
            .filter_map(|e| match e {
                Entry::Guarded(g, _) => Some(g.as_str()),
                Entry::Plain(_) => None,
            })
            .collect();
        out.push_str("{{ if ");
        if guards.len() == 1 {
            out.push_str(guards[0]);
        } else {
            out.push_str("or");
            for g in guards {
                out.push_str(" ( ");
                out.push_str(g);
                out.push_str(" )");
            }
        }
        out.push_str(" }},{{end}}");
    }

    if let Entry::Plain(s) = &entries[anchor] {
        out.push_str(s);
    }

    for e in &entries[anchor + 1..] {
        match e {
            Entry::Plain(s) => {
                out.push(',');
                out.push_str(s);
            }
            Entry::Guarded(g, sub) => {
                out.push_str("{{ if ");
                out.push_str(g);
                out.push_str(" }},");
                render_entries(sub, out);
                out.push_str("{{end}}");
            }
        }
    }
}

/// A run of guarded entries with no unconditional anchor: the first goes
/// bare, later ones lead with a comma inside their guard.
fn render_guarded_run(entries: &[Entry], out: &mut String) {
    for (i, e) in entries.iter().enumerate() {
        let Entry::Guarded(g, sub) = e else {
            continue;
        };
        out.push_str("{{ if ");
        out.push_str(g);
        out.push_str(" }}");
        if i > 0 {
            out.push(',');
        }
        render_entries(sub, out);
        out.push_str("{{end}}");
    }
}
