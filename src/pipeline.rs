// SPDX-License-Identifier: GPL-3.0-or-later

/*
 *  src/pipeline.rs - The assembly package build, start to finish.
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
 * # `pipeline` Module
 *
 * Runs the whole build in one linear pass:
 *
 * 1. Check that `<project>.pro` exists.
 * 2. Unless preserving, remove `gerbers/` and `assembly/`.
 * 3. Print the KiCad export checklist and wait for the operator.
 * 4. Clean the BOM into `assembly/bom.csv`.
 * 5. Convert the position export into `assembly/pos.csv`.
 * 6. Zip the plot outputs into `assembly/gerbers.zip`.
 * 7. Write `assembly/verify.txt` and list the simplified values.
 *
 * Any error stops the build where it is. Nothing is rolled back.
 */

use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::archive;
use crate::bom::{self, VerifyNote};
use crate::error::{Error, Result};
use crate::placement::{self, DoNotPlace};
use crate::rotation::RotationTable;

const CHECKLIST: &str = "\
Manual steps:

Eeschema:
- BOM Button -> bom2grouped_csv_jlcpcb
  (make sure output is \"%O.bom.csv\".)

Pcbnew:
- File -> Plot.
- Ensure \"Plot footprint values\" is unchecked (if not desired).
- Ensure \"Output directory\" is \"gerbers/\".
- Click \"Plot\".
- Click \"Generate Drill Files...\".
- Ensure \"Output folder\" is \"gerbers/\".
- Check \"Merge PTH and NPTH holes into one file\".
- Click \"Generate Drill File\".
- Close dialogs.
- File -> Fabrication Outputs -> Footprint Position (.pos) File...
- Ensure: Format=CSV, Files=Single
- Click \"Generate Position File\".

Misc:
- View Gerbers if desired.
- Press Enter to continue.
";

/// Everything a build needs to know.
#[derive(Debug, Clone)]
pub struct BuildOptions {
    /// Base name of the KiCad project.
    pub project: String,
    /// Directory holding `<project>.pro`.
    pub project_dir: PathBuf,
    /// Designators to leave out of the placement file.
    pub dnp: DoNotPlace,
    /// Keep previous outputs and the consumed exports.
    pub preserve: bool,
    pub rotations: RotationTable,
}

impl BuildOptions {
    pub fn new(project: impl Into<String>, project_dir: impl Into<PathBuf>) -> Self {
        Self {
            project: project.into(),
            project_dir: project_dir.into(),
            dnp: DoNotPlace::default(),
            preserve: false,
            rotations: RotationTable::default(),
        }
    }

    pub fn paths(&self) -> ProjectPaths {
        ProjectPaths::new(&self.project_dir, &self.project)
    }
}

/// Input and output locations for a project.
#[derive(Debug, Clone)]
pub struct ProjectPaths {
    pub marker: PathBuf,
    pub bom_export: PathBuf,
    pub gerbers_dir: PathBuf,
    pub placement_export: PathBuf,
    pub assembly_dir: PathBuf,
    pub bom: PathBuf,
    pub placement: PathBuf,
    pub archive: PathBuf,
    pub verify: PathBuf,
}

impl ProjectPaths {
    pub fn new(project_dir: &Path, project: &str) -> Self {
        let gerbers_dir = project_dir.join("gerbers");
        let assembly_dir = project_dir.join("assembly");
        Self {
            marker: project_dir.join(format!("{project}.pro")),
            bom_export: project_dir.join(format!("{project}.bom.csv")),
            placement_export: gerbers_dir.join(format!("{project}-all-pos.csv")),
            bom: assembly_dir.join("bom.csv"),
            placement: assembly_dir.join("pos.csv"),
            archive: assembly_dir.join("gerbers.zip"),
            verify: assembly_dir.join("verify.txt"),
            gerbers_dir,
            assembly_dir,
        }
    }
}

/// What a finished build produced.
#[derive(Debug, Default)]
pub struct BuildReport {
    /// Number of rows written to the BOM.
    pub bom_rows: usize,
    /// Number of components written to the placement file.
    pub placed: usize,
    /// Number of placement rows dropped as do-not-place.
    pub not_placed: usize,
    /// Files added to the gerber archive.
    pub archived: Vec<String>,
    /// Values that were shortened and need checking.
    pub notes: Vec<VerifyNote>,
}

/// Runs the build, talking to the operator through `input` and `output`.
pub fn run<R: BufRead, W: Write>(
    options: &BuildOptions,
    mut input: R,
    mut output: W,
) -> Result<BuildReport> {
    let paths = options.paths();

    if !paths.marker.exists() {
        return Err(Error::NotProjectDirectory {
            marker: paths.marker,
        });
    }

    if !options.preserve {
        for dir in [&paths.gerbers_dir, &paths.assembly_dir] {
            if dir.exists() {
                info!(dir = %dir.display(), "removing previous outputs");
                std::fs::remove_dir_all(dir).map_err(|e| Error::io(dir, e))?;
            }
        }
    }

    wait_for_exports(&mut input, &mut output)?;

    std::fs::create_dir_all(&paths.assembly_dir)
        .map_err(|e| Error::io(&paths.assembly_dir, e))?;

    let mut report = BuildReport::default();

    let normalized = bom::normalize(bom::read_file(&paths.bom_export)?);
    bom::write_file(&paths.bom, &normalized.rows)?;
    info!(rows = normalized.rows.len(), path = %paths.bom.display(), "wrote BOM");
    report.bom_rows = normalized.rows.len();
    report.notes = normalized.notes;
    consume(options, &paths.bom_export)?;

    let exported = placement::read_file(&paths.placement_export)?;
    let exported_count = exported.len();
    debug!(count = options.dnp.len(), "do-not-place designators");
    let placed = placement::convert(exported, &options.rotations, &options.dnp);
    placement::write_file(&paths.placement, &placed)?;
    info!(rows = placed.len(), path = %paths.placement.display(), "wrote placement file");
    report.placed = placed.len();
    report.not_placed = exported_count - placed.len();
    consume(options, &paths.placement_export)?;

    report.archived = archive::pack(&paths.gerbers_dir, &paths.archive)?;
    if report.archived.is_empty() {
        warn!(dir = %paths.gerbers_dir.display(), "no fabrication files found");
    }
    info!(files = report.archived.len(), path = %paths.archive.display(), "wrote gerber archive");

    write_verify(&paths.verify, &report.notes, &mut output)?;

    Ok(report)
}

fn wait_for_exports<R: BufRead, W: Write>(input: &mut R, output: &mut W) -> Result<()> {
    writeln!(output, "{CHECKLIST}").map_err(Error::Console)?;
    output.flush().map_err(Error::Console)?;

    let mut line = String::new();
    let read = input.read_line(&mut line).map_err(Error::Console)?;
    if read == 0 {
        warn!("no acknowledgement on stdin, continuing");
    }
    Ok(())
}

// Deletes an export that has been rewritten into assembly/.
fn consume(options: &BuildOptions, path: &Path) -> Result<()> {
    if options.preserve {
        return Ok(());
    }
    std::fs::remove_file(path).map_err(|e| Error::io(path, e))
}

fn write_verify<W: Write>(path: &Path, notes: &[VerifyNote], output: &mut W) -> Result<()> {
    let mut contents = String::new();
    for note in notes {
        contents.push_str(&note.to_string());
        contents.push('\n');
    }
    std::fs::write(path, &contents).map_err(|e| Error::io(path, e))?;

    writeln!(output).map_err(Error::Console)?;
    writeln!(output, "Verify these values in the automatically matched parts:")
        .map_err(Error::Console)?;
    output.write_all(contents.as_bytes()).map_err(Error::Console)?;
    output.flush().map_err(Error::Console)
}
