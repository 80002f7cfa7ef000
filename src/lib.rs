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

//! BurrowGen
//!
//! Build-time compiler from typed Burrow predicate modules to the JSON+
//! template filter and update documents the Burrow server evaluates.
//! Developers write ordinary boolean predicates and imperative mutators over
//! their document types; BurrowGen lowers them so the conditions run
//! server-side instead of being evaluated after the fact.
//!
//! ## Pipeline
//!
//! ```text
//! parse(.bpl) → Module → discover API calls → lower predicates/updates
//!            → Expr / [UpdateExpr] → marshal → burrow.gen.json
//! ```
//!
//! ## Example
//!
//! ```
//! let src = r#"
//!     type Doc { X int `x` }
//!     type Args { Limit int }
//!     fn Small(d Doc, args Args) bool { return d.X < 10 }
//! "#;
//! let flt = burrowgen::compile_filter(src, "Small").unwrap();
//! assert_eq!(flt, r#"{"x":{"$lt":10}}"#);
//! ```
//!
//! Conditions that never touch a document field are hoisted into template
//! guards the client renderer can elide:
//!
//! ```text
//! {"$or":[{{ if ne .Arg.I 10 }}{"f":{"$gt":100}},{{end}}{"f":{{toJSON .Arg.F}}}]}
//! ```

pub mod discover;
pub mod error;
pub mod expr;
pub mod filter;
pub mod generate;
pub mod lang;
pub mod marshal;
pub mod schema;
pub mod update;

pub use discover::{discover as discover_api_calls, Discovered, API_NAMES};
pub use error::{Error, Result};
pub use expr::{CmpOp, Expr, Operand, UpdateExpr, UpdateOp, Value};
pub use filter::lower_filter;
pub use generate::{
    compile_filter, compile_update, generate_module, write_gen_file, FilterDef, GenFile, Options,
};
pub use lang::{parse_module, Module, ParseError};
pub use marshal::{marshal_filter, marshal_update};
pub use schema::Registry;
pub use update::lower_update;
