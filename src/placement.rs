// SPDX-License-Identifier: GPL-3.0-or-later

/*
 *  src/placement.rs - Pick-and-place file conversion for JLCPCB assembly.
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
 * # `placement` Module
 *
 * Converts the Pcbnew footprint position export (CSV, single file) into the
 * CPL file JLCPCB expects.
 *
 * The export header row (first field `Ref`) is replaced by JLCPCB's column
 * names. Every other row keeps its coordinates verbatim, gets its rotation
 * corrected through a [RotationTable], and is dropped if its designator is
 * marked do-not-place.
 *
 * The JLCPCB header names six columns while each row carries seven fields
 * (the board side trails the rotation). Assembly uploads have been accepted
 * in that shape, so it is written exactly that way.
 */

use std::collections::BTreeSet;
use std::io::{Read, Write};
use std::path::Path;
use std::str::FromStr;

use rust_decimal::Decimal;
use tracing::debug;

use crate::error::{Error, Result};
use crate::rotation::RotationTable;

/// Column names written at the top of the JLCPCB placement file.
pub const POS_HEADER: [&str; 6] = [
    "Designator",
    "Val",
    "Package",
    "Mid X",
    "Mid Y",
    "RotationLayer",
];

const POS_FIELDS: usize = 7;
const EXPORT_HEADER_REF: &str = "Ref";

/// A single placed component.
#[derive(Debug, Clone, PartialEq)]
pub struct PlacementRow {
    /// The reference designator (e.g. `U1`).
    pub reference: String,
    /// The component value.
    pub value: String,
    /// The package/footprint name.
    pub footprint: String,
    /// The X position, as exported.
    pub x: String,
    /// The Y position, as exported.
    pub y: String,
    /// The rotation in degrees.
    pub rotation: Decimal,
    /// The board side (`top` or `bottom`).
    pub side: String,
}

impl PlacementRow {
    fn fields(&self) -> [String; POS_FIELDS] {
        [
            self.reference.clone(),
            self.value.clone(),
            self.footprint.clone(),
            self.x.clone(),
            self.y.clone(),
            self.rotation.to_string(),
            self.side.clone(),
        ]
    }
}

/// Designators that are left unpopulated.
#[derive(Debug, Clone, Default)]
pub struct DoNotPlace {
    references: BTreeSet<String>,
}

impl DoNotPlace {
    pub fn contains(&self, reference: &str) -> bool {
        self.references.contains(reference)
    }

    pub fn len(&self) -> usize {
        self.references.len()
    }

    pub fn is_empty(&self) -> bool {
        self.references.is_empty()
    }
}

impl<S: Into<String>> FromIterator<S> for DoNotPlace {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self {
            references: iter.into_iter().map(Into::into).collect(),
        }
    }
}

/// Corrects rotations and drops do-not-place rows, keeping the export order.
pub fn convert(
    rows: Vec<PlacementRow>,
    table: &RotationTable,
    dnp: &DoNotPlace,
) -> Vec<PlacementRow> {
    rows.into_iter()
        .filter(|row| {
            let placed = !dnp.contains(&row.reference);
            if !placed {
                debug!(reference = %row.reference, "skipping do-not-place component");
            }
            placed
        })
        .map(|row| {
            let rotation = table.correct(&row.reference, &row.footprint, row.rotation);
            PlacementRow { rotation, ..row }
        })
        .collect()
}

/// Parses the position export. The `Ref` header row is skipped.
///
/// `path` is only used in error messages.
pub fn read_rows<R: Read>(reader: R, path: &Path) -> Result<Vec<PlacementRow>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(reader);

    let mut rows = Vec::new();
    for result in reader.records() {
        let record = result.map_err(|e| Error::csv(path, e))?;
        let line = record.position().map_or(0, |p| p.line());
        if record.len() != POS_FIELDS {
            return Err(Error::RowShape {
                path: path.to_path_buf(),
                line,
                expected: POS_FIELDS,
                found: record.len(),
            });
        }

        let field = |i: usize| record[i].to_string();
        let reference = field(0);
        if reference == EXPORT_HEADER_REF {
            continue;
        }

        let rotation_text = field(5);
        let rotation = parse_rotation(&rotation_text).map_err(|source| Error::Rotation {
            path: path.to_path_buf(),
            line,
            value: rotation_text.clone(),
            source,
        })?;

        rows.push(PlacementRow {
            reference,
            value: field(1),
            footprint: field(2),
            x: field(3),
            y: field(4),
            rotation,
            side: field(6),
        });
    }

    Ok(rows)
}

// Plain decimals first, then exponent notation (`1.8e2`).
fn parse_rotation(text: &str) -> std::result::Result<Decimal, rust_decimal::Error> {
    let text = text.trim();
    Decimal::from_str(text).or_else(|e| Decimal::from_scientific(text).map_err(|_| e))
}

/// Writes the JLCPCB header followed by the rows.
///
/// `path` is only used in error messages.
pub fn write_rows<W: Write>(writer: W, path: &Path, rows: &[PlacementRow]) -> Result<()> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_writer(writer);
    writer
        .write_record(POS_HEADER)
        .map_err(|e| Error::csv(path, e))?;
    for row in rows {
        writer
            .write_record(row.fields())
            .map_err(|e| Error::csv(path, e))?;
    }
    writer.flush().map_err(|e| Error::io(path, e))
}

pub fn read_file(path: &Path) -> Result<Vec<PlacementRow>> {
    let file = std::fs::File::open(path).map_err(|e| Error::io(path, e))?;
    read_rows(std::io::BufReader::new(file), path)
}

pub fn write_file(path: &Path, rows: &[PlacementRow]) -> Result<()> {
    let file = std::fs::File::create(path).map_err(|e| Error::io(path, e))?;
    write_rows(file, path, rows)
}
