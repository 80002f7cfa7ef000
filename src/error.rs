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

//! Error types for predicate compilation
//!
//! BurrowGen is a build-time tool, so every error is fatal to the run; the
//! public entry points bubble a single [`Error`] to the caller. Messages that
//! point at a construct embed the canonical single-line form of the offending
//! source, so callers can match them without position tables.

use std::io;
use thiserror::Error;

use crate::lang::ParseError;

#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("unsupported {kind}: {snippet}")]
    Unsupported { kind: &'static str, snippet: String },

    #[error("Unsupported update statement: {0}")]
    UpdateStatement(String),

    #[error("unexpected binary expression: {0}")]
    UnexpectedBinary(String),

    #[error("unreachable code: {0}")]
    UnreachableCode(String),

    #[error("filter always evaluates to false")]
    FilterAlwaysFalse,

    #[error("Client side evaluated expressions are not allowed in the OR condition\nThese are the expressions which doesn't include document fields")]
    ClientEvalInOr,

    #[error("only client side evaluated conditions allowed in the update function: {0}")]
    ClientOnlyUpdateCond(String),

    #[error("field name, arg, func call or constant expected in binary operation, got: {0}")]
    InvalidOperands(String),

    #[error("unsupported constant integer value: {0}")]
    ConstIntOverflow(String),

    #[error("division by zero in constant expression: {0}")]
    ConstDivByZero(String),

    #[error("unsupported selector {got}, expected: {doc} or {args}")]
    UnknownSelectorRoot {
        got: String,
        doc: String,
        args: String,
    },

    #[error("nested field not found: {field}, path: {path}")]
    NestedFieldNotFound { field: String, path: String },

    #[error("unknown type: {0}")]
    UnknownType(String),

    #[error("duplicate type declaration: {0}")]
    DuplicateType(String),

    #[error("filter should have bool return type")]
    FilterReturnType,

    #[error("Update should not return results")]
    UpdateReturns,

    #[error("Filter function expects exactly two parameters. First is the document type. Second is query arguments")]
    FilterParams,

    #[error("Update function expects exactly two parameters. First is the document type. Second is query arguments")]
    UpdateParams,

    #[error("Document parameter should be of struct type, got: {0}")]
    DocNotStruct(String),

    #[error("Return statement is missing in the filter function")]
    MissingReturn,

    #[error("Update should contain at least one statement")]
    EmptyUpdate,

    #[error("Document field is expected on the left hand side")]
    UpdateLhsNotField,

    #[error("Arguments field is expected on the right hand side")]
    UpdateRhsNotValue,

    #[error("function declaration {0} not found in module")]
    FnNotFound(String),

    #[error("internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Unsupported-construct error carrying the canonical source snippet.
    pub fn unsupported(kind: &'static str, node: &impl std::fmt::Display) -> Self {
        Error::Unsupported {
            kind,
            snippet: node.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
