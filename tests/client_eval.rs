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

//! Client-evaluable conditions: template guards and comma migration.

mod common;

use common::{filter, norm, update};

#[test]
fn guarded_conjunct_before_the_anchor() {
    let flt = filter(
        "fn F(d Doc, args Args) bool { return args.ArgInt != 10 && d.FieldFloat > 100 || d.FieldFloat == args.ArgFloat }",
    )
    .unwrap();
    assert_eq!(
        flt,
        concat!(
            r#"{"$or":["#,
            r#"{{ if ne .Arg.ArgInt 10 }}{"field_float":{"$gt":100}},{{end}}"#,
            r#"{"field_float":{{toJSON .Arg.ArgFloat}}}"#,
            r#"]}"#
        )
    );
}

#[test]
fn guarded_disjunct_last() {
    let flt = filter(
        "fn F(d Doc, args Args) bool { return d.FieldFloat == args.ArgFloat || args.ArgInt != 10 && d.FieldFloat > 100 }",
    )
    .unwrap();
    assert_eq!(
        flt,
        concat!(
            r#"{"$or":["#,
            r#"{"field_float":{{toJSON .Arg.ArgFloat}}}"#,
            r#"{{ if ne .Arg.ArgInt 10 }},{"field_float":{"$gt":100}}{{end}}"#,
            r#"]}"#
        )
    );
}

#[test]
fn guarded_disjunct_in_the_middle() {
    let flt = filter(
        "fn F(d Doc, args Args) bool { return d.FieldFloat == args.ArgFloat || args.ArgInt != 10 && d.FieldFloat > 100 || d.FieldFloat == args.NestedArg.ArgFloat }",
    )
    .unwrap();
    assert_eq!(
        flt,
        concat!(
            r#"{"$or":["#,
            r#"{"field_float":{{toJSON .Arg.ArgFloat}}},"#,
            r#"{{ if ne .Arg.ArgInt 10 }}{"field_float":{"$gt":100}},{{end}}"#,
            r#"{"field_float":{{toJSON .Arg.NestedArg.ArgFloat}}}"#,
            r#"]}"#
        )
    );
}

#[test]
fn client_disjunct_is_rejected() {
    let err = filter(
        "fn F(d Doc, args Args) bool { return args.ArgInt != 10 || d.FieldFloat > 100 }",
    )
    .unwrap_err();
    assert_eq!(
        norm(&err.to_string()),
        "Client side evaluated expressions are not allowed in the OR condition These are the expressions which doesn't include document fields"
    );
}

#[test]
fn client_conditions_from_if_chain_share_one_guard() {
    let flt = filter(
        r#"
        fn F(d Doc, args Args) bool {
            if args.ArgInt != 10 {
                return args.ArgInt != 11 && d.FieldFloat == args.ArgFloat
            }

            return false
        }
        "#,
    )
    .unwrap();
    assert_eq!(
        flt,
        r#"{{ if and ( ne .Arg.ArgInt 10 ) ( ne .Arg.ArgInt 11 ) }}{"field_float":{{toJSON .Arg.ArgFloat}}}{{end}}"#
    );
}

#[test]
fn nested_client_ifs_build_or_guards() {
    let flt = filter(
        r#"
        fn F(d Doc, args Args) bool {
            if args.ArgBool {
                if args.ArgInt != 10 {
                    return d.FieldFloat == args.ArgFloat
                }
            }

            return args.ArgInt == 110 && d.FieldFloat != args.ArgFloat
        }
        "#,
    )
    .unwrap();
    assert_eq!(
        flt,
        concat!(
            r#"{"$or":["#,
            r#"{{ if and ( eq .Arg.ArgBool true ) ( ne .Arg.ArgInt 10 ) }}{"field_float":{{toJSON .Arg.ArgFloat}}},{{end}}"#,
            r#"{{ if and ( or ( ne .Arg.ArgBool true ) ( eq .Arg.ArgInt 10 ) ) ( eq .Arg.ArgInt 110 ) }}{"field_float":{"$ne":{{toJSON .Arg.ArgFloat}}}}{{end}}"#,
            r#"]}"#
        )
    );
}

#[test]
fn client_if_else_chain() {
    let flt = filter(
        r#"
        fn F(d Doc, args Args) bool {
            if args.ArgBool {
                return d.FieldFloat == args.ArgFloat
            } else if args.ArgInt == 18 {
                return d.FieldString == "val1"
            }

            return args.ArgInt == 110 && d.FieldFloat != args.ArgFloat
        }
        "#,
    )
    .unwrap();
    assert_eq!(
        flt,
        concat!(
            r#"{"$or":["#,
            r#"{{ if eq .Arg.ArgBool true }}{"field_float":{{toJSON .Arg.ArgFloat}}},{{end}}"#,
            r#"{{ if and ( ne .Arg.ArgBool true ) ( eq .Arg.ArgInt 18 ) }}{"field_string":"val1"},{{end}}"#,
            r#"{{ if and ( ne .Arg.ArgBool true ) ( ne .Arg.ArgInt 18 ) ( eq .Arg.ArgInt 110 ) }}{"field_float":{"$ne":{{toJSON .Arg.ArgFloat}}}}{{end}}"#,
            r#"]}"#
        )
    );
}

#[test]
fn fully_client_filter_guards_match_all() {
    let flt = filter("fn F(d Doc, args Args) bool { return args.ArgInt == 1 }").unwrap();
    assert_eq!(flt, "{{ if eq .Arg.ArgInt 1 }}{}{{end}}");
}

#[test]
fn update_guarded_entry_before_plain() {
    let upd = update(
        r#"
        fn U(d Doc, args Args) {
            if args.ArgInt == 10 {
                d.FieldInt = 10
            }

            d.FieldFloat = 1.1
        }
        "#,
    )
    .unwrap();
    assert_eq!(
        upd,
        concat!(
            r#"{"$set":{"#,
            r#"{{ if eq .Arg.ArgInt 10 }}"field_int":10{{end}}"#,
            r#"{{ if eq .Arg.ArgInt 10 }},{{end}}"#,
            r#""field_float":1.1"#,
            r#"}}"#
        )
    );
}

#[test]
fn update_guarded_entry_after_plain() {
    let upd = update(
        r#"
        fn U(d Doc, args Args) {
            d.FieldFloat = 1.1

            if args.ArgInt == 10 {
                d.FieldInt = 10
            }
        }
        "#,
    )
    .unwrap();
    assert_eq!(
        upd,
        r#"{"$set":{"field_float":1.1{{ if eq .Arg.ArgInt 10 }},"field_int":10{{end}}}}"#
    );
}

#[test]
fn update_guarded_entry_between_plain() {
    let upd = update(
        r#"
        fn U(d Doc, args Args) {
            d.FieldFloat = 1.1

            if args.ArgInt == 10 {
                d.FieldInt = 10
            }

            d.FieldBool = true
        }
        "#,
    )
    .unwrap();
    assert_eq!(
        upd,
        concat!(
            r#"{"$set":{"#,
            r#""field_float":1.1"#,
            r#"{{ if eq .Arg.ArgInt 10 }},"field_int":10{{end}}"#,
            r#","field_bool":true"#,
            r#"}}"#
        )
    );
}

#[test]
fn update_string_guard() {
    let upd = update(
        r#"
        fn U(d Doc, args Args) {
            d.FieldFloat = 1.1

            if args.ArgString == "qwerty" {
                d.FieldString = "abc"
            }

            d.FieldBool = true
        }
        "#,
    )
    .unwrap();
    assert_eq!(
        upd,
        concat!(
            r#"{"$set":{"#,
            r#""field_float":1.1"#,
            r#"{{ if eq .Arg.ArgString "qwerty" }},"field_string":"abc"{{end}}"#,
            r#","field_bool":true"#,
            r#"}}"#
        )
    );
}

#[test]
fn update_multiple_guarded_entries_share_or_separator() {
    let upd = update(
        r#"
        fn U(d Doc, args Args) {
            if args.ArgString == "qwerty" {
                d.FieldString = "abc"
            }

            if args.ArgInt == 10 {
                d.FieldInt = 22
            }

            if args.ArgFloat == 3.3 {
                d.FieldFloat = 5.5
            }

            d.FieldBool = true
        }
        "#,
    )
    .unwrap();
    assert_eq!(
        upd,
        concat!(
            r#"{"$set":{"#,
            r#"{{ if eq .Arg.ArgString "qwerty" }}"field_string":"abc"{{end}}"#,
            r#"{{ if eq .Arg.ArgInt 10 }},"field_int":22{{end}}"#,
            r#"{{ if eq .Arg.ArgFloat 3.3 }},"field_float":5.5{{end}}"#,
            r#"{{ if or ( eq .Arg.ArgString "qwerty" ) ( eq .Arg.ArgInt 10 ) ( eq .Arg.ArgFloat 3.3 ) }},{{end}}"#,
            r#""field_bool":true"#,
            r#"}}"#
        )
    );
}

#[test]
fn update_nested_conditions() {
    let upd = update(
        r#"
        fn U(d Doc, args Args) {
            if args.ArgInt == 10 {
                d.FieldInt = 22

                if args.ArgString == "qwerty" {
                    if args.ArgFloat == 3.3 {
                        d.FieldFloat = 5.5
                    }

                    d.FieldString = "abc"
                }

                d.FieldString = "uuu"
            }
        }
        "#,
    )
    .unwrap();
    assert_eq!(
        upd,
        concat!(
            r#"{"$set":{"#,
            r#"{{ if eq .Arg.ArgInt 10 }}"field_int":22"#,
            r#"{{ if eq .Arg.ArgString "qwerty" }},"#,
            r#"{{ if eq .Arg.ArgFloat 3.3 }}"field_float":5.5{{end}}"#,
            r#"{{ if eq .Arg.ArgFloat 3.3 }},{{end}}"#,
            r#""field_string":"abc"{{end}}"#,
            r#","field_string":"uuu"{{end}}"#,
            r#"}}"#
        )
    );
}

#[test]
fn update_conditions_across_operator_sections() {
    let upd = update(
        r#"
        fn U(d Doc, args Args) {
            if args.ArgInt == 10 {
                d.FieldInt = 22
                d.FieldInt += 22

                if args.ArgString == "qwerty" {
                    if args.ArgFloat == 3.3 {
                        d.FieldFloat = 5.5
                        d.FieldArrFloat = append(d.FieldArrFloat, 5.5)
                    }

                    d.FieldString = "abc"
                    d.Nested.FieldInt /= 888
                }

                d.FieldString = "uuu"
                d.Nested.FieldFloat *= 777
            }
        }
        "#,
    )
    .unwrap();
    assert_eq!(
        upd,
        concat!(
            r#"{"$set":{"#,
            r#"{{ if eq .Arg.ArgInt 10 }}"field_int":22"#,
            r#"{{ if eq .Arg.ArgString "qwerty" }},"#,
            r#"{{ if eq .Arg.ArgFloat 3.3 }}"field_float":5.5{{end}}"#,
            r#"{{ if eq .Arg.ArgFloat 3.3 }},{{end}}"#,
            r#""field_string":"abc"{{end}}"#,
            r#","field_string":"uuu"{{end}}"#,
            r#"},"#,
            r#""$increment":{{{ if eq .Arg.ArgInt 10 }}"field_int":22{{end}}},"#,
            r#""$divide":{{{ if eq .Arg.ArgInt 10 }}{{ if eq .Arg.ArgString "qwerty" }}"nested.field_int":888{{end}}{{end}}},"#,
            r#""$multiply":{{{ if eq .Arg.ArgInt 10 }}"nested.field_float":777{{end}}},"#,
            r#""$push":{{{ if eq .Arg.ArgInt 10 }}{{ if eq .Arg.ArgString "qwerty" }}{{ if eq .Arg.ArgFloat 3.3 }}"field_arr_float":5.5{{end}}{{end}}{{end}}}"#,
            r#"}"#
        )
    );
}
