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

//! Generation driver
//!
//! Compiles a predicate module end to end: parse, resolve types and
//! constants, discover API call sites, lower and marshal every referenced
//! callback, and write the registration file the client loads at startup.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::discover;
use crate::error::{Error, Result};
use crate::filter;
use crate::lang::{self, Module};
use crate::marshal;
use crate::schema::{self, Registry};
use crate::update;

/// One compiled callback: function name and rendered document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterDef {
    pub name: String,
    pub body: String,
}

/// Contents of the generated registration file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenFile {
    pub package: String,
    pub filters: Vec<FilterDef>,
    pub updates: Vec<FilterDef>,
}

/// Generation options.
#[derive(Debug, Clone)]
pub struct Options {
    /// Package name the client API calls are made through.
    pub client_pkg: String,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            client_pkg: "burrow".to_string(),
        }
    }
}

/// Compile a whole module: every filter and update referenced from an API
/// call site.
pub fn generate_module(src: &str, package: &str, opts: &Options) -> Result<GenFile> {
    let module = lang::parse_module(src)?;
    let env = Env::new(&module)?;

    let found = discover::discover(&module, &opts.client_pkg)?;

    let mut filters = Vec::new();
    for name in &found.filters {
        let body = env.compile_filter(name)?;
        info!(name = %name, filter = %body, "filter");
        filters.push(FilterDef {
            name: name.clone(),
            body,
        });
    }

    let mut updates = Vec::new();
    for name in &found.updates {
        let body = env.compile_update(name)?;
        info!(name = %name, update = %body, "update");
        updates.push(FilterDef {
            name: name.clone(),
            body,
        });
    }

    Ok(GenFile {
        package: package.to_string(),
        filters,
        updates,
    })
}

/// Compile a single named filter function from module source.
pub fn compile_filter(src: &str, name: &str) -> Result<String> {
    let module = lang::parse_module(src)?;
    Env::new(&module)?.compile_filter(name)
}

/// Compile a single named update function from module source.
pub fn compile_update(src: &str, name: &str) -> Result<String> {
    let module = lang::parse_module(src)?;
    Env::new(&module)?.compile_update(name)
}

/// Write the registration file.
pub fn write_gen_file(path: &Path, gen: &GenFile) -> Result<()> {
    info!(file = %path.display(), package = %gen.package, "generating");

    let f = File::create(path)?;
    let mut w = BufWriter::new(f);
    serde_json::to_writer_pretty(&mut w, gen)?;
    w.write_all(b"\n")?;
    w.flush()?;
    Ok(())
}

struct Env<'a> {
    module: &'a Module,
    reg: Registry,
    consts: std::collections::HashMap<String, crate::expr::Value>,
}

impl<'a> Env<'a> {
    fn new(module: &'a Module) -> Result<Self> {
        Ok(Self {
            module,
            reg: Registry::from_module(module)?,
            consts: schema::fold_decls(module)?,
        })
    }

    fn compile_filter(&self, name: &str) -> Result<String> {
        let f = self
            .module
            .func(name)
            .ok_or_else(|| Error::FnNotFound(name.to_string()))?;
        let flt = filter::lower_filter(f, &self.reg, &self.consts)?;
        marshal::marshal_filter(&flt)
    }

    fn compile_update(&self, name: &str) -> Result<String> {
        let f = self
            .module
            .func(name)
            .ok_or_else(|| Error::FnNotFound(name.to_string()))?;
        let upd = update::lower_update(f, &self.reg, &self.consts)?;
        marshal::marshal_update(&upd)
    }
}
