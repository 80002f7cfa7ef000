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

#![allow(dead_code)]

//! Shared fixture types and compile helpers for the end-to-end suites.

/// Document/argument types every suite compiles against.
pub const TYPES: &str = r#"
type Nested {
    FieldInt int `field_int`
    FieldFloat float `field_float`
    FieldString string `field_string`
    FieldBool bool `field_bool`
    FieldTime time `field_time`
    FieldUUID uuid `field_uuid`
    FieldBytes bytes `field_bytes`
    FieldArr []Nested `field_arr`
    FieldArrFloat []float `field_arr_float`
    FieldMap map[string]float
    FieldMapInt map[int]string
    FieldMapStruct map[string]Nested
}

type Doc {
    FieldInt int `field_int`
    FieldFloat float `field_float`
    FieldString string `field_string`
    FieldBool bool `field_bool`
    FieldTime time `field_time`
    FieldUUID uuid `field_uuid`
    FieldBytes bytes `field_bytes`
    FieldArr []Nested `field_arr`
    FieldArrFloat []float `field_arr_float`
    FieldMap map[string]float
    FieldMapInt map[int]string
    FieldMapStruct map[string]Nested
    Nested Nested `nested`
}

type NestedArg {
    ArgInt int
    ArgFloat float
    ArgString string
    ArgBool bool
}

type Args {
    ArgInt int
    ArgFloat float
    ArgString string
    ArgBool bool
    ArgTime time
    ArgUUID uuid
    ArgBytes bytes
    NestedArg NestedArg
}
"#;

/// First declared function name in a snippet.
pub fn fn_name(src: &str) -> &str {
    let start = src.find("fn ").expect("snippet declares a function") + 3;
    let rest = &src[start..];
    let end = rest.find('(').expect("function has a parameter list");
    rest[..end].trim()
}

/// Compile a filter snippet against the shared types.
pub fn filter(src: &str) -> burrowgen::Result<String> {
    burrowgen::compile_filter(&format!("{TYPES}\n{src}"), fn_name(src))
}

/// Compile an update snippet against the shared types.
pub fn update(src: &str) -> burrowgen::Result<String> {
    burrowgen::compile_update(&format!("{TYPES}\n{src}"), fn_name(src))
}

/// Whitespace-collapsed form used for error message comparison.
pub fn norm(s: &str) -> String {
    let mut out = s.replace(['\n', '\t'], " ");
    while out.contains("  ") {
        out = out.replace("  ", " ");
    }
    out.trim().to_string()
}
