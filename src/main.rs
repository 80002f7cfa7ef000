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

//! BurrowGen CLI
//!
//! ```bash
//! # Compile a predicate module next to its sources
//! burrowgen app/predicates.bpl
//!
//! # Explicit output path and package name
//! burrowgen app/predicates.bpl -o app/burrow.gen.json -p app
//! ```

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use burrowgen::generate::{generate_module, write_gen_file, Options};

/// Compile Burrow predicate modules into filter/update documents
#[derive(Parser)]
#[command(name = "burrowgen")]
#[command(about = "Compiles Burrow predicate modules into server-side filter and update documents")]
#[command(version)]
struct Cli {
    /// Input predicate module (.bpl)
    input: PathBuf,

    /// Output path (defaults to burrow.gen.json next to the input)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Package name recorded in the generated file (defaults to the input
    /// file stem)
    #[arg(short, long)]
    package: Option<String>,

    /// Database client package name in call sites
    #[arg(long, default_value = "burrow")]
    client_package: String,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    let src = fs::read_to_string(&cli.input)
        .with_context(|| format!("reading {}", cli.input.display()))?;

    let package = cli.package.unwrap_or_else(|| {
        cli.input
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "main".to_string())
    });

    let opts = Options {
        client_pkg: cli.client_package,
    };

    let gen = generate_module(&src, &package, &opts)
        .with_context(|| format!("compiling {}", cli.input.display()))?;

    let output = cli
        .output
        .unwrap_or_else(|| cli.input.with_file_name("burrow.gen.json"));

    write_gen_file(&output, &gen)
        .with_context(|| format!("writing {}", output.display()))?;

    Ok(())
}
