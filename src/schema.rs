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

//! Type registry, field-path resolution and constant folding
//!
//! This module is the "type checker" side of the front end: it resolves
//! selector chains against declared struct types (applying serialization
//! tags), answers type queries for receivers of built-in method calls, and
//! folds constant expressions down to the four value kinds the filter DSL
//! accepts.

use std::collections::HashMap;

use crate::error::{Error, Result};
use crate::expr::Value;
use crate::lang::{BinOp, Expr, Lit, Module, StructDef, TypeRef, UnOp};

/// Declared struct types of a module, by name.
#[derive(Debug, Default)]
pub struct Registry {
    types: HashMap<String, StructDef>,
}

impl Registry {
    /// Build the registry, rejecting duplicate declarations and references
    /// to undeclared struct types.
    pub fn from_module(m: &Module) -> Result<Self> {
        let mut types = HashMap::new();
        for t in &m.types {
            if types.insert(t.name.clone(), t.clone()).is_some() {
                return Err(Error::DuplicateType(t.name.clone()));
            }
        }

        for t in m.types.iter() {
            for f in &t.fields {
                let mut ty = &f.ty;
                loop {
                    match ty {
                        TypeRef::List(t) => ty = &**t,
                        TypeRef::Map(_, v) => ty = &**v,
                        TypeRef::Named(n) if !types.contains_key(n.as_str()) => {
                            return Err(Error::UnknownType(n.clone()))
                        }
                        _ => break,
                    }
                }
            }
        }

        Ok(Self { types })
    }

    pub fn strct(&self, name: &str) -> Option<&StructDef> {
        self.types.get(name)
    }

    /// Dotted wire name of a document field path.
    ///
    /// Each struct-level element is replaced by its serialization tag prefix
    /// (before any comma) when present, the declared name otherwise. The
    /// element following a list or map is the index or key and is taken
    /// verbatim; descent resumes when the element type is a struct.
    pub fn field_name(&self, root: &StructDef, path: &[String]) -> Result<String> {
        let mut out = String::new();
        let mut cur: Option<&StructDef> = Some(root);
        let mut verbatim = false;

        for seg in path {
            if verbatim {
                if !out.is_empty() {
                    out.push('.');
                }
                out.push_str(seg);
                verbatim = false;
                continue;
            }

            let not_found = || Error::NestedFieldNotFound {
                field: seg.clone(),
                path: path.join("."),
            };
            let st = cur.ok_or_else(not_found)?;
            let fld = st.field(seg).ok_or_else(not_found)?;

            if !out.is_empty() {
                out.push('.');
            }
            let tag = fld
                .tag
                .as_deref()
                .and_then(|t| t.split(',').next())
                .filter(|t| !t.is_empty());
            out.push_str(tag.unwrap_or(&fld.name));

            match &fld.ty {
                TypeRef::Named(n) => cur = self.strct(n),
                TypeRef::List(t) | TypeRef::Map(_, t) => {
                    cur = match t.as_ref() {
                        TypeRef::Named(n) => self.strct(n),
                        _ => None,
                    };
                    verbatim = true;
                }
                _ => cur = None,
            }
        }

        Ok(out)
    }

    /// Type of a selector chain starting at `root`; index/key elements
    /// consume one path segment. `None` when the chain does not resolve.
    pub fn type_of_path(&self, root: &TypeRef, path: &[String]) -> Option<TypeRef> {
        let mut cur = root.clone();
        let mut i = 0;
        while i < path.len() {
            match cur {
                TypeRef::Named(n) => {
                    let fld = self.strct(&n)?.field(&path[i])?;
                    cur = fld.ty.clone();
                    i += 1;
                }
                TypeRef::List(t) | TypeRef::Map(_, t) => {
                    cur = *t;
                    i += 1;
                }
                _ => return None,
            }
        }
        Some(cur)
    }
}

/// Fold every `const` declaration of a module, in order. Later constants may
/// reference earlier ones.
pub fn fold_decls(m: &Module) -> Result<HashMap<String, Value>> {
    let mut consts = HashMap::new();
    for c in &m.consts {
        match fold(&consts, &c.value)? {
            Some(v) => {
                consts.insert(c.name.clone(), v);
            }
            None => return Err(Error::unsupported("constant expression", &c.value)),
        }
    }
    Ok(consts)
}

enum Num {
    I(i64),
    F(f64),
}

fn num(v: &Value) -> Option<Num> {
    match v {
        Value::Int(i) => Some(Num::I(*i)),
        Value::Float(f) => Some(Num::F(*f)),
        _ => None,
    }
}

/// Fold a constant expression. `Ok(None)` means the expression is not
/// constant; errors are reserved for constants that exist but cannot be
/// represented (integer overflow, division by zero).
pub fn fold(consts: &HashMap<String, Value>, e: &Expr) -> Result<Option<Value>> {
    match e {
        Expr::Lit(Lit::Int(v)) => Ok(Some(Value::Int(*v))),
        Expr::Lit(Lit::Float(v)) => Ok(Some(Value::Float(*v))),
        Expr::Lit(Lit::Str(v)) => Ok(Some(Value::Str(v.clone()))),
        Expr::Lit(Lit::Bool(v)) => Ok(Some(Value::Bool(*v))),
        Expr::Ident(n) => Ok(consts.get(n).cloned()),
        Expr::Paren(x) => fold(consts, x),
        Expr::Unary { op: UnOp::Neg, x } => match fold(consts, x)? {
            Some(Value::Int(i)) => i
                .checked_neg()
                .map(|v| Some(Value::Int(v)))
                .ok_or_else(|| Error::ConstIntOverflow(e.to_string())),
            Some(Value::Float(f)) => Ok(Some(Value::Float(-f))),
            _ => Ok(None),
        },
        Expr::Unary { op: UnOp::Not, x } => match fold(consts, x)? {
            Some(Value::Bool(b)) => Ok(Some(Value::Bool(!b))),
            _ => Ok(None),
        },
        Expr::Binary { op, x, y } => {
            let (a, b) = match (fold(consts, x)?, fold(consts, y)?) {
                (Some(a), Some(b)) => (a, b),
                _ => return Ok(None),
            };
            fold_binary(*op, a, b, e)
        }
        _ => Ok(None),
    }
}

fn fold_binary(op: BinOp, a: Value, b: Value, e: &Expr) -> Result<Option<Value>> {
    use BinOp::*;

    match op {
        Add | Sub | Mul | Div => {
            if let (Value::Str(a), Value::Str(b)) = (&a, &b) {
                if op == Add {
                    return Ok(Some(Value::Str(format!("{a}{b}"))));
                }
                return Ok(None);
            }

            let (a, b) = match (num(&a), num(&b)) {
                (Some(a), Some(b)) => (a, b),
                _ => return Ok(None),
            };

            match (a, b) {
                (Num::I(a), Num::I(b)) => {
                    let r = match op {
                        Add => a.checked_add(b),
                        Sub => a.checked_sub(b),
                        Mul => a.checked_mul(b),
                        Div => {
                            if b == 0 {
                                return Err(Error::ConstDivByZero(e.to_string()));
                            }
                            a.checked_div(b)
                        }
                        _ => None,
                    };
                    r.map(|v| Some(Value::Int(v)))
                        .ok_or_else(|| Error::ConstIntOverflow(e.to_string()))
                }
                (a, b) => {
                    let (a, b) = (as_f64(a), as_f64(b));
                    if op == Div && b == 0.0 {
                        return Err(Error::ConstDivByZero(e.to_string()));
                    }
                    let r = match op {
                        Add => a + b,
                        Sub => a - b,
                        Mul => a * b,
                        Div => a / b,
                        _ => return Ok(None),
                    };
                    Ok(Some(Value::Float(r)))
                }
            }
        }

        Eq | Ne => {
            let r = match (&a, &b) {
                (Value::Str(a), Value::Str(b)) => a == b,
                (Value::Bool(a), Value::Bool(b)) => a == b,
                _ => match (num(&a), num(&b)) {
                    (Some(a), Some(b)) => as_f64(a) == as_f64(b),
                    _ => return Ok(None),
                },
            };
            Ok(Some(Value::Bool(if op == Eq { r } else { !r })))
        }

        Lt | Lte | Gt | Gte => {
            let ord = match (&a, &b) {
                (Value::Str(a), Value::Str(b)) => a.partial_cmp(b),
                _ => match (num(&a), num(&b)) {
                    (Some(a), Some(b)) => as_f64(a).partial_cmp(&as_f64(b)),
                    _ => return Ok(None),
                },
            };
            let ord = match ord {
                Some(o) => o,
                None => return Ok(None),
            };
            let r = match op {
                Lt => ord.is_lt(),
                Lte => ord.is_le(),
                Gt => ord.is_gt(),
                Gte => ord.is_ge(),
                _ => return Ok(None),
            };
            Ok(Some(Value::Bool(r)))
        }

        And | Or => match (a, b) {
            (Value::Bool(a), Value::Bool(b)) => Ok(Some(Value::Bool(if op == And {
                a && b
            } else {
                a || b
            }))),
            _ => Ok(None),
        },
    }
}

fn as_f64(n: Num) -> f64 {
    match n {
        Num::I(i) => i as f64,
        Num::F(f) => f,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lang::{parse_module, Stmt};

    fn registry(src: &str) -> Registry {
        Registry::from_module(&parse_module(src).unwrap()).unwrap()
    }

    const TYPES: &str = r#"
        type Nested {
            FieldInt int `field_int`
            FieldArrFloat []float `field_arr_float`
        }
        type Doc {
            FieldInt int `field_int`
            FieldBool bool `field_bool`
            FieldTime time `field_time`
            FieldArr []Nested `field_arr`
            FieldMap map[string]float
            FieldMapStruct map[string]Nested
            Nested Nested `nested`
        }
    "#;

    fn path(segs: &[&str]) -> Vec<String> {
        segs.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn field_name_applies_tags() {
        let reg = registry(TYPES);
        let doc = reg.strct("Doc").unwrap();

        assert_eq!(reg.field_name(doc, &path(&["FieldInt"])).unwrap(), "field_int");
        assert_eq!(
            reg.field_name(doc, &path(&["Nested", "FieldInt"])).unwrap(),
            "nested.field_int"
        );
    }

    #[test]
    fn field_name_untagged_uses_declared_name() {
        let reg = registry(TYPES);
        let doc = reg.strct("Doc").unwrap();
        assert_eq!(
            reg.field_name(doc, &path(&["FieldMap", "abc"])).unwrap(),
            "FieldMap.abc"
        );
    }

    #[test]
    fn field_name_array_and_map_elements_verbatim() {
        let reg = registry(TYPES);
        let doc = reg.strct("Doc").unwrap();

        assert_eq!(
            reg.field_name(doc, &path(&["FieldArr", "1", "FieldInt"])).unwrap(),
            "field_arr.1.field_int"
        );
        assert_eq!(
            reg.field_name(doc, &path(&["FieldMapStruct", "hjk", "FieldArrFloat", "5"]))
                .unwrap(),
            "FieldMapStruct.hjk.field_arr_float.5"
        );
    }

    #[test]
    fn field_name_unknown_field_fails() {
        let reg = registry(TYPES);
        let doc = reg.strct("Doc").unwrap();
        let err = reg.field_name(doc, &path(&["Missing"])).unwrap_err();
        assert!(err.to_string().contains("nested field not found"));
    }

    #[test]
    fn type_of_path_resolves_time() {
        let reg = registry(TYPES);
        let root = TypeRef::Named("Doc".into());
        assert_eq!(
            reg.type_of_path(&root, &path(&["FieldTime"])),
            Some(TypeRef::Time)
        );
        assert_eq!(
            reg.type_of_path(&root, &path(&["FieldArr", "0", "FieldInt"])),
            Some(TypeRef::Int)
        );
        assert_eq!(reg.type_of_path(&root, &path(&["Missing"])), None);
    }

    #[test]
    fn registry_rejects_unknown_named_type() {
        let m = parse_module("type Doc { X Widget }").unwrap();
        assert!(Registry::from_module(&m).is_err());
    }

    #[test]
    fn folds_arithmetic_and_strings() {
        let m = parse_module(
            "const A = 10 + 18\nconst B = \"aaa\" + \"bbb\"\nconst C = A * 2\nconst D = 10.5 - 0.25",
        )
        .unwrap();
        let consts = fold_decls(&m).unwrap();
        assert_eq!(consts["A"], Value::Int(28));
        assert_eq!(consts["B"], Value::Str("aaabbb".into()));
        assert_eq!(consts["C"], Value::Int(56));
        assert_eq!(consts["D"], Value::Float(10.25));
    }

    #[test]
    fn folds_comparisons_to_bool() {
        let m = parse_module("const T = 10 < 20\nconst F = !T").unwrap();
        let consts = fold_decls(&m).unwrap();
        assert_eq!(consts["T"], Value::Bool(true));
        assert_eq!(consts["F"], Value::Bool(false));
    }

    #[test]
    fn rejects_integer_overflow() {
        let m = parse_module("const X = 9223372036854775807 + 1").unwrap();
        let err = fold_decls(&m).unwrap_err();
        assert!(err.to_string().contains("unsupported constant integer value"));
    }

    #[test]
    fn rejects_division_by_zero() {
        let m = parse_module("const X = 10 / 0").unwrap();
        assert!(fold_decls(&m).is_err());
    }

    #[test]
    fn non_constant_stays_unfolded() {
        let consts = HashMap::new();
        let m = parse_module("fn F(d Doc, a Args) bool { return d.X == 1 }").unwrap();
        let Stmt::Return(e) = &m.fns[0].body[0] else {
            panic!("expected return");
        };
        assert_eq!(fold(&consts, e).unwrap(), None);
    }
}
