// SPDX-License-Identifier: GPL-3.0-or-later

/*
 *  src/main.rs - Command line front end for the assembly package builder.
 *  Copyright (C) 2026  Forest Crossman <cyrozap@gmail.com>
 *
 *  This program is free software: you can redistribute it and/or modify
 *  it under the terms of the GNU General Public License as published by
 *  the Free Software Foundation, either version 3 of the License, or
 *  (at your option) any later version.
 *
 *  This program is distributed in the hope that it will be useful,
 *  but WITHOUT ANY WARRANTY; without even the implied warranty of
 *  MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
 *  GNU General Public License for more details.
 *
 *  You should have received a copy of the GNU General Public License
 *  along with this program.  If not, see <https://www.gnu.org/licenses/>.
 */

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{ArgAction, Parser};
use tracing_subscriber::EnvFilter;

use pcbassembly::pipeline::{BuildOptions, run};
use pcbassembly::rotation::RotationTable;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// The KiCad project name (without extension).
    #[arg(long)]
    project: String,

    /// A reference designator to leave out of the placement file.
    #[arg(long, value_name = "REF")]
    dnp: Vec<String>,

    /// Keep previous outputs and the consumed exports.
    #[arg(long)]
    preserve: bool,

    /// The project directory.
    #[arg(long, value_name = "DIR", default_value = ".")]
    dir: PathBuf,

    /// A CSV of `prefix,footprint,degrees` rotation rules to use instead of
    /// the built-in table.
    #[arg(long, value_name = "FILE")]
    rules: Option<PathBuf>,

    /// Log more (repeat for debug output).
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn build(args: Args) -> pcbassembly::Result<()> {
    let mut options = BuildOptions::new(args.project, args.dir);
    options.dnp = args.dnp.into_iter().collect();
    options.preserve = args.preserve;
    if let Some(rules) = &args.rules {
        options.rotations = RotationTable::from_file(rules)?;
    }

    let stdin = std::io::stdin();
    run(&options, stdin.lock(), std::io::stdout())?;
    Ok(())
}

fn main() -> ExitCode {
    let args = Args::parse();
    init_logging(args.verbose);

    match build(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            eprintln!("Error: {}", error);
            ExitCode::from(error.exit_code())
        }
    }
}
