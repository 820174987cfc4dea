// SPDX-License-Identifier: GPL-3.0-or-later

/*
 *  src/lib.rs - JLCPCB assembly package builder for KiCad projects.
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

/*!
 * # `pcbassembly` Crate
 *
 * Turns the BOM and footprint position exports of a KiCad project into the
 * files JLCPCB's assembly service wants.
 *
 * The build is a single pass over a project directory:
 *
 * 1. [bom]: Cleans up footprints and values so JLCPCB can match parts.
 * 2. [placement]: Rewrites the position export, fixing rotations with a
 *    [rotation::RotationTable] and dropping do-not-place parts.
 * 3. [archive]: Zips the plot outputs.
 *
 * [pipeline::run] drives all of it.
 *
 * ## Usage Example
 *
 * ```no_run
 * use pcbassembly::pipeline::{BuildOptions, run};
 *
 * fn main() -> Result<(), Box<dyn std::error::Error>> {
 *     let mut options = BuildOptions::new("keyboard", ".");
 *     options.dnp = ["J3", "R12"].into_iter().collect();
 *
 *     let stdin = std::io::stdin();
 *     let report = run(&options, stdin.lock(), std::io::stdout())?;
 *
 *     for note in &report.notes {
 *         println!("{}", note);
 *     }
 *
 *     Ok(())
 * }
 * ```
 */

pub mod archive;
pub mod bom;
pub mod error;
pub mod footprint;
pub mod pipeline;
pub mod placement;
pub mod rotation;

pub use error::{Error, Result};
