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

//! Boolean expression algebra over document filters
//!
//! Predicates lower into an [`Expr`] tree of n-ary `$and`/`$or` nodes over
//! comparison leaves. The smart constructors normalize while building:
//!
//! - nested `AND` inside `AND` (and `OR` inside `OR`) is flattened,
//! - `TRUE`/`FALSE` children are absorbed or short-circuit the node,
//! - children that never touch a document field are split into the node's
//!   client list, which the marshaller renders as a template guard.
//!
//! Trees are immutable values built bottom-up; there is no separate
//! simplification pass, the constructor postconditions are the invariants.

use std::fmt;

/// A single leaf value of a comparison.
#[derive(Debug, Clone, PartialEq)]
pub enum Operand {
    /// Dotted path into the document, serialization tags already applied.
    Field(String),
    /// Dotted path into the query arguments; empty when the argument itself
    /// is a primitive.
    Arg(String),
    /// Compile-time constant.
    Const(Value),
    /// Deferred two-argument call (`bytes.Compare`, `time.Compare`); the
    /// surrounding comparison operator decides its meaning.
    Func(Box<Operand>, Box<Operand>),
}

impl Operand {
    pub fn field(path: impl Into<String>) -> Self {
        Operand::Field(path.into())
    }

    pub fn arg(path: impl Into<String>) -> Self {
        Operand::Arg(path.into())
    }

    pub fn constant(v: impl Into<Value>) -> Self {
        Operand::Const(v.into())
    }

    pub fn func(x: Operand, y: Operand) -> Self {
        Operand::Func(Box::new(x), Box::new(y))
    }

    pub fn is_field(&self) -> bool {
        matches!(self, Operand::Field(_))
    }

    pub fn is_const(&self) -> bool {
        matches!(self, Operand::Const(_))
    }

    /// A binary comparison needs a document side and a value side.
    /// Field x Field, Const x Const, Arg x Arg and Func x anything-but-Const
    /// have no server-side rendering.
    pub fn compatible(x: &Operand, y: &Operand) -> bool {
        use Operand::*;
        match (x, y) {
            (Const(_), Const(_))
            | (Field(_), Field(_))
            | (Arg(_), Arg(_))
            | (Func(..), Func(..)) => false,
            (Func(..), other) | (other, Func(..)) => other.is_const(),
            _ => true,
        }
    }
}

/// Folded constant value. Only these four kinds survive constant folding.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
}

impl Value {
    /// JSON form, used for comparison values and template literals.
    pub fn to_json(&self) -> String {
        match self {
            Value::Bool(b) => b.to_string(),
            Value::Int(i) => i.to_string(),
            Value::Float(f) => serde_json::Number::from_f64(*f)
                .map_or_else(|| "null".to_string(), |n| n.to_string()),
            Value::Str(s) => serde_json::Value::String(s.clone()).to_string(),
        }
    }

    /// Raw form, used for path elements (array indices, map keys).
    pub fn raw(&self) -> String {
        match self {
            Value::Bool(b) => b.to_string(),
            Value::Int(i) => i.to_string(),
            Value::Float(f) => f.to_string(),
            Value::Str(s) => s.clone(),
        }
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Str(v.to_string())
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw())
    }
}

/// Comparison operator of a filter leaf.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CmpOp {
    Eq,
    Ne,
    Lt,
    Lte,
    Gt,
    Gte,
    Contains,
    NotContains,
}

impl CmpOp {
    /// Wire key in the filter document.
    pub fn key(self) -> &'static str {
        match self {
            CmpOp::Eq => "$eq",
            CmpOp::Ne => "$ne",
            CmpOp::Lt => "$lt",
            CmpOp::Lte => "$lte",
            CmpOp::Gt => "$gt",
            CmpOp::Gte => "$gte",
            CmpOp::Contains => "$contains",
            CmpOp::NotContains => "$not_contains",
        }
    }

    /// Logical complement, used by De Morgan negation.
    pub fn negated(self) -> CmpOp {
        match self {
            CmpOp::Eq => CmpOp::Ne,
            CmpOp::Ne => CmpOp::Eq,
            CmpOp::Lt => CmpOp::Gte,
            CmpOp::Gte => CmpOp::Lt,
            CmpOp::Gt => CmpOp::Lte,
            CmpOp::Lte => CmpOp::Gt,
            CmpOp::Contains => CmpOp::NotContains,
            CmpOp::NotContains => CmpOp::Contains,
        }
    }

    /// Template function name used inside `{{ if … }}` guards.
    pub fn templ(self) -> &'static str {
        match self {
            CmpOp::Eq => "eq",
            CmpOp::Ne => "ne",
            CmpOp::Lt => "lt",
            CmpOp::Lte => "le",
            CmpOp::Gt => "gt",
            CmpOp::Gte => "ge",
            CmpOp::Contains => "contains",
            CmpOp::NotContains => "not_contains",
        }
    }
}

/// Filter expression tree.
///
/// `list` holds server-evaluable children, `client` the children that only
/// reference arguments or constants. An `Or` with both sides populated is
/// legal to construct (negation can produce one transiently) but the
/// marshaller refuses to render it.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    True,
    False,
    And { list: Vec<Expr>, client: Vec<Expr> },
    Or { list: Vec<Expr>, client: Vec<Expr> },
    Cmp {
        op: CmpOp,
        x: Operand,
        y: Operand,
        client_eval: bool,
    },
}

impl Expr {
    /// Server-evaluable comparison.
    pub fn cmp(op: CmpOp, x: Operand, y: Operand) -> Expr {
        Expr::Cmp {
            op,
            x,
            y,
            client_eval: false,
        }
    }

    /// Comparison decided on the client before the query is sent.
    pub fn cmp_client(op: CmpOp, x: Operand, y: Operand) -> Expr {
        Expr::Cmp {
            op,
            x,
            y,
            client_eval: true,
        }
    }

    pub fn is_true(&self) -> bool {
        matches!(self, Expr::True)
    }

    pub fn is_false(&self) -> bool {
        matches!(self, Expr::False)
    }

    /// Whether this node can be decided without any document field.
    pub fn is_client(&self) -> bool {
        match self {
            Expr::Cmp { client_eval, .. } => *client_eval,
            Expr::And { list, client } | Expr::Or { list, client } => {
                list.is_empty() && !client.is_empty()
            }
            Expr::True | Expr::False => false,
        }
    }

    /// N-ary conjunction with flattening, absorption and partitioning.
    pub fn and(ops: Vec<Expr>) -> Expr {
        let mut list = Vec::new();
        let mut client = Vec::new();

        for v in ops {
            match v {
                Expr::False => return Expr::False,
                Expr::True => {}
                Expr::And { list: l, client: c } => {
                    list.extend(l);
                    client.extend(c);
                }
                // An all-client OR stays whole: it guards the surrounding
                // conjunction instead of being lifted.
                v @ Expr::Or { .. } if v.is_client() => client.push(v),
                v if v.is_client() => client.push(v),
                v => list.push(v),
            }
        }

        Expr::collapse(list, client, Expr::True, |list, client| Expr::And {
            list,
            client,
        })
    }

    /// N-ary disjunction, dual of [`Expr::and`].
    pub fn or(ops: Vec<Expr>) -> Expr {
        let mut list = Vec::new();
        let mut client = Vec::new();

        for v in ops {
            match v {
                Expr::True => return Expr::True,
                Expr::False => {}
                Expr::Or { list: l, client: c } => {
                    list.extend(l);
                    client.extend(c);
                }
                v if v.is_client() => client.push(v),
                v => list.push(v),
            }
        }

        Expr::collapse(list, client, Expr::False, |list, client| Expr::Or {
            list,
            client,
        })
    }

    fn collapse(
        mut list: Vec<Expr>,
        mut client: Vec<Expr>,
        identity: Expr,
        node: impl FnOnce(Vec<Expr>, Vec<Expr>) -> Expr,
    ) -> Expr {
        match (list.len(), client.len()) {
            (0, 0) => identity,
            (1, 0) => list.remove(0),
            (0, 1) => client.remove(0),
            _ => node(list, client),
        }
    }

    /// De Morgan negation. Comparisons flip their operator and keep their
    /// client flag; logical nodes negate every child on both sides and swap
    /// kind, which preserves the no-same-tag-nesting invariant.
    pub fn negate(self) -> Expr {
        match self {
            Expr::True => Expr::False,
            Expr::False => Expr::True,
            Expr::And { list, client } => Expr::Or {
                list: list.into_iter().map(Expr::negate).collect(),
                client: client.into_iter().map(Expr::negate).collect(),
            },
            Expr::Or { list, client } => Expr::And {
                list: list.into_iter().map(Expr::negate).collect(),
                client: client.into_iter().map(Expr::negate).collect(),
            },
            Expr::Cmp {
                op,
                x,
                y,
                client_eval,
            } => Expr::Cmp {
                op: op.negated(),
                x,
                y,
                client_eval,
            },
        }
    }
}

/// Update operator of a single assignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateOp {
    Set,
    Inc,
    Dec,
    Div,
    Mul,
    Push,
}

impl UpdateOp {
    /// Wire key of the update section.
    pub fn key(self) -> &'static str {
        match self {
            UpdateOp::Set => "$set",
            UpdateOp::Inc => "$increment",
            UpdateOp::Dec => "$decrement",
            UpdateOp::Div => "$divide",
            UpdateOp::Mul => "$multiply",
            UpdateOp::Push => "$push",
        }
    }
}

/// One lowered update statement, in source order.
#[derive(Debug, Clone, PartialEq)]
pub enum UpdateExpr {
    Assign {
        op: UpdateOp,
        field: Operand,
        value: Operand,
    },
    /// Conditional group; `cond` is always client-evaluable.
    If { cond: Expr, body: Vec<UpdateExpr> },
}

#[cfg(test)]
mod tests {
    use super::*;

    fn f(name: &str) -> Operand {
        Operand::field(name)
    }

    fn server(name: &str, v: i64) -> Expr {
        Expr::cmp(CmpOp::Eq, f(name), Operand::constant(v))
    }

    fn client(name: &str, v: i64) -> Expr {
        Expr::cmp_client(CmpOp::Ne, Operand::arg(name), Operand::constant(v))
    }

    #[test]
    fn and_flattens_nested_and() {
        let e = Expr::and(vec![
            server("a", 1),
            Expr::and(vec![server("b", 2), server("c", 3)]),
        ]);
        match e {
            Expr::And { list, client } => {
                assert_eq!(list.len(), 3);
                assert!(client.is_empty());
                assert!(!list.iter().any(|c| matches!(c, Expr::And { .. })));
            }
            other => panic!("expected And, got {other:?}"),
        }
    }

    #[test]
    fn or_flattens_nested_or() {
        let e = Expr::or(vec![
            server("a", 1),
            Expr::or(vec![server("b", 2), server("c", 3)]),
        ]);
        match e {
            Expr::Or { list, .. } => {
                assert_eq!(list.len(), 3);
                assert!(!list.iter().any(|c| matches!(c, Expr::Or { .. })));
            }
            other => panic!("expected Or, got {other:?}"),
        }
    }

    #[test]
    fn constant_absorption() {
        assert_eq!(
            Expr::and(vec![Expr::True, server("a", 1)]),
            server("a", 1)
        );
        assert!(Expr::and(vec![server("a", 1), Expr::False]).is_false());
        assert!(Expr::or(vec![server("a", 1), Expr::True]).is_true());
        assert_eq!(
            Expr::or(vec![Expr::False, server("a", 1)]),
            server("a", 1)
        );
        assert!(Expr::and(vec![]).is_true());
        assert!(Expr::or(vec![]).is_false());
    }

    #[test]
    fn and_partitions_client_children() {
        let e = Expr::and(vec![client("x", 10), server("a", 1), client("y", 11)]);
        match e {
            Expr::And { list, client } => {
                assert_eq!(list.len(), 1);
                assert_eq!(client.len(), 2);
            }
            other => panic!("expected And, got {other:?}"),
        }
    }

    #[test]
    fn all_client_or_stays_whole_inside_and() {
        let or = Expr::or(vec![client("x", 1), client("y", 2)]);
        assert!(or.is_client());

        let e = Expr::and(vec![or.clone(), server("a", 1)]);
        match e {
            Expr::And { list, client } => {
                assert_eq!(list.len(), 1);
                assert_eq!(client, vec![or]);
            }
            other => panic!("expected And, got {other:?}"),
        }
    }

    #[test]
    fn single_child_collapses() {
        assert_eq!(Expr::and(vec![server("a", 1)]), server("a", 1));
        assert_eq!(Expr::or(vec![client("x", 1)]), client("x", 1));
    }

    #[test]
    fn double_negation_is_identity() {
        let e = Expr::or(vec![
            Expr::and(vec![server("a", 1), client("x", 2)]),
            Expr::cmp(CmpOp::Lt, f("b"), Operand::constant(5)),
        ]);
        assert_eq!(e.clone().negate().negate(), e);
    }

    #[test]
    fn negation_flips_operators_and_kind() {
        let e = Expr::and(vec![
            Expr::cmp(CmpOp::Gt, f("a"), Operand::constant(2)),
            Expr::cmp(CmpOp::Contains, f("s"), Operand::arg("P")),
        ]);
        match e.negate() {
            Expr::Or { list, .. } => {
                assert!(matches!(list[0], Expr::Cmp { op: CmpOp::Lte, .. }));
                assert!(matches!(
                    list[1],
                    Expr::Cmp {
                        op: CmpOp::NotContains,
                        ..
                    }
                ));
            }
            other => panic!("expected Or, got {other:?}"),
        }
    }

    #[test]
    fn negating_mixed_and_yields_mixed_or() {
        let e = Expr::and(vec![server("a", 1), client("x", 2)]).negate();
        match e {
            Expr::Or { list, client } => {
                assert_eq!(list.len(), 1);
                assert_eq!(client.len(), 1);
            }
            other => panic!("expected Or, got {other:?}"),
        }
    }

    #[test]
    fn operand_compatibility() {
        let fld = f("a");
        let arg = Operand::arg("x");
        let cst = Operand::constant(1i64);
        let fun = Operand::func(f("a"), Operand::arg("x"));

        assert!(Operand::compatible(&fld, &cst));
        assert!(Operand::compatible(&fld, &arg));
        assert!(Operand::compatible(&fun, &cst));
        assert!(!Operand::compatible(&fld, &fld));
        assert!(!Operand::compatible(&cst, &cst));
        assert!(!Operand::compatible(&arg, &arg));
        assert!(!Operand::compatible(&fun, &arg));
        assert!(!Operand::compatible(&arg, &fun));
    }

    #[test]
    fn value_json_forms() {
        assert_eq!(Value::Int(10).to_json(), "10");
        assert_eq!(Value::Float(1.1).to_json(), "1.1");
        assert_eq!(Value::Bool(true).to_json(), "true");
        assert_eq!(Value::Str("a\"b".into()).to_json(), r#""a\"b""#);
        assert_eq!(Value::Str("abc".into()).raw(), "abc");
    }
}
