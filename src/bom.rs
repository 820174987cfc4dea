// SPDX-License-Identifier: GPL-3.0-or-later

/*
 *  src/bom.rs - Bill of materials cleanup for JLCPCB part matching.
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
 * # `bom` Module
 *
 * Reads the grouped BOM exported from Eeschema (`value,reference,footprint,LCSC`),
 * cleans up rows that JLCPCB will have to match automatically, and writes the
 * result back out in the same column order.
 *
 * Rows that already carry an LCSC part number are passed through untouched.
 * For every other row the footprint is normalized (see
 * [crate::footprint::normalize_footprint]) and descriptive text after the first
 * space in the value is dropped, producing a [VerifyNote] so the operator can
 * check the part JLCPCB picks.
 */

use std::fmt;
use std::io::{Read, Write};
use std::path::Path;

use tracing::debug;

use crate::error::{Error, Result};
use crate::footprint::normalize_footprint;

const BOM_FIELDS: usize = 4;

/// A single line of the BOM.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BomRow {
    /// The component value (e.g. `10k`).
    pub value: String,
    /// The reference designator(s) (e.g. `R5` or `R1,R2`).
    pub reference: String,
    /// The footprint name.
    pub footprint: String,
    /// The supplier (LCSC) part number, empty if not yet matched.
    pub part_number: String,
}

impl BomRow {
    pub fn new(value: &str, reference: &str, footprint: &str, part_number: &str) -> Self {
        Self {
            value: value.to_string(),
            reference: reference.to_string(),
            footprint: footprint.to_string(),
            part_number: part_number.to_string(),
        }
    }

    fn fields(&self) -> [&str; BOM_FIELDS] {
        [
            &self.value,
            &self.reference,
            &self.footprint,
            &self.part_number,
        ]
    }
}

/// A value that was shortened and should be checked by hand.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifyNote {
    pub reference: String,
    pub original: String,
    pub simplified: String,
}

impl fmt::Display for VerifyNote {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "- Value simplified ({}): \"{}\" -> {}",
            self.reference, self.original, self.simplified
        )
    }
}

/// The cleaned BOM together with the values that need checking.
#[derive(Debug, Default)]
pub struct NormalizedBom {
    pub rows: Vec<BomRow>,
    pub notes: Vec<VerifyNote>,
}

/// Drops everything from the first space in `value` onwards.
///
/// Returns the value unchanged and no note if it has no space.
pub fn simplify_value(reference: &str, value: &str) -> (String, Option<VerifyNote>) {
    match value.split_once(' ') {
        Some((short, _)) => {
            let note = VerifyNote {
                reference: reference.to_string(),
                original: value.to_string(),
                simplified: short.to_string(),
            };
            (short.to_string(), Some(note))
        }
        None => (value.to_string(), None),
    }
}

/// Cleans up a single row, returning the note if its value was shortened.
pub fn normalize_row(row: BomRow) -> (BomRow, Option<VerifyNote>) {
    if !row.part_number.is_empty() {
        return (row, None);
    }

    let footprint = normalize_footprint(&row.footprint).into_owned();
    let (value, note) = simplify_value(&row.reference, &row.value);
    if let Some(note) = &note {
        debug!(reference = %note.reference, original = %note.original, "value simplified");
    }

    let row = BomRow {
        value,
        footprint,
        ..row
    };
    (row, note)
}

/// Cleans up every row in order.
pub fn normalize(rows: Vec<BomRow>) -> NormalizedBom {
    let mut normalized = NormalizedBom::default();
    for row in rows {
        let (row, note) = normalize_row(row);
        normalized.rows.push(row);
        normalized.notes.extend(note);
    }
    normalized
}

/// Parses BOM rows from CSV. `path` is only used in error messages.
pub fn read_rows<R: Read>(reader: R, path: &Path) -> Result<Vec<BomRow>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(reader);

    let mut rows = Vec::new();
    for result in reader.records() {
        let record = result.map_err(|e| Error::csv(path, e))?;
        if record.len() != BOM_FIELDS {
            return Err(Error::RowShape {
                path: path.to_path_buf(),
                line: record.position().map_or(0, |p| p.line()),
                expected: BOM_FIELDS,
                found: record.len(),
            });
        }

        rows.push(BomRow {
            value: record[0].to_string(),
            reference: record[1].to_string(),
            footprint: record[2].to_string(),
            part_number: record[3].to_string(),
        });
    }

    Ok(rows)
}

/// Writes BOM rows as CSV. `path` is only used in error messages.
pub fn write_rows<W: Write>(writer: W, path: &Path, rows: &[BomRow]) -> Result<()> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(writer);
    for row in rows {
        writer
            .write_record(row.fields())
            .map_err(|e| Error::csv(path, e))?;
    }
    writer.flush().map_err(|e| Error::io(path, e))
}

pub fn read_file(path: &Path) -> Result<Vec<BomRow>> {
    let file = std::fs::File::open(path).map_err(|e| Error::io(path, e))?;
    read_rows(std::io::BufReader::new(file), path)
}

pub fn write_file(path: &Path, rows: &[BomRow]) -> Result<()> {
    let file = std::fs::File::create(path).map_err(|e| Error::io(path, e))?;
    write_rows(file, path, rows)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_simplify_value() {
        let row = BomRow::new("10k ohm 1%", "R5", "Resistor_SMD", "");
        let (row, note) = normalize_row(row);
        assert_eq!(row, BomRow::new("10k", "R5", "Resistor_SMD", ""));
        let note = note.unwrap();
        assert_eq!(note.reference, "R5");
        assert_eq!(
            note.to_string(),
            "- Value simplified (R5): \"10k ohm 1%\" -> 10k"
        );
    }

    #[test]
    fn test_matched_rows_untouched() {
        let row = BomRow::new(
            "100nF 50V",
            "C1,C2",
            "Capacitor_SMD:C_0603_1608Metric_Pad1.08x0.95mm_HandSolder",
            "C14663",
        );
        let (out, note) = normalize_row(row.clone());
        assert_eq!(out, row);
        assert!(note.is_none());
    }

    #[test]
    fn test_footprint_normalized_without_note() {
        let row = BomRow::new(
            "4.7k",
            "R1,R2",
            "Resistor_SMD:R_0805_2012Metric_Pad1.20x1.40mm_HandSolder",
            "",
        );
        let (out, note) = normalize_row(row);
        assert_eq!(out.footprint, "Resistor_SMD:R_0805_2012Metric");
        assert_eq!(out.value, "4.7k");
        assert!(note.is_none());
    }

    #[test]
    fn test_notes_in_row_order() {
        let normalized = normalize(vec![
            BomRow::new("Comment", "Designator", "Footprint", "LCSC"),
            BomRow::new("10k ohm", "R1", "R_0805", ""),
            BomRow::new("1uF", "C1", "C_0805", ""),
            BomRow::new("LED red", "D1", "LED_0805", ""),
        ]);
        assert_eq!(normalized.rows.len(), 4);
        assert_eq!(normalized.rows[0].value, "Comment");
        let refs: Vec<_> = normalized.notes.iter().map(|n| n.reference.as_str()).collect();
        assert_eq!(refs, ["R1", "D1"]);
    }

    #[test]
    fn test_read_rows() {
        let csv = "Comment,Designator,Footprint,LCSC\n\"10k ohm 1%\",\"R1,R5\",R_0805,\n";
        let rows = read_rows(csv.as_bytes(), Path::new("board.bom.csv")).unwrap();
        assert_eq!(
            rows,
            [
                BomRow::new("Comment", "Designator", "Footprint", "LCSC"),
                BomRow::new("10k ohm 1%", "R1,R5", "R_0805", ""),
            ]
        );
    }

    #[test]
    fn test_read_rows_wrong_shape() {
        let csv = "10k,R1,R_0805,\n1uF,C1\n";
        let err = read_rows(csv.as_bytes(), Path::new("board.bom.csv")).unwrap_err();
        match err {
            Error::RowShape {
                line,
                expected,
                found,
                ..
            } => {
                assert_eq!(line, 2);
                assert_eq!(expected, 4);
                assert_eq!(found, 2);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_invalid_utf8_is_an_error() {
        let csv: &[u8] = b"100\xb5F,C1,C_0603,C14663\n";
        let err = read_rows(csv, Path::new("board.bom.csv")).unwrap_err();
        assert!(matches!(err, Error::Csv { .. }));
    }

    #[test]
    fn test_matched_rows_pass_through_unchanged() {
        let csv = concat!(
            "\"100nF 50V X7R\",\"C1,C2\",",
            "C_0603_1608Metric_Pad1.08x0.95mm_HandSolder,C14663\n",
        );
        let normalized = normalize(read_rows(csv.as_bytes(), Path::new("board.bom.csv")).unwrap());
        let mut out = Vec::new();
        write_rows(&mut out, Path::new("bom.csv"), &normalized.rows).unwrap();
        assert_eq!(String::from_utf8(out).unwrap().trim_end(), csv.trim_end());
        assert!(normalized.notes.is_empty());
    }

    #[test]
    fn test_write_rows_quotes_grouped_references() {
        let mut out = Vec::new();
        let rows = [BomRow::new("10k", "R1,R2", "R_0805", "")];
        write_rows(&mut out, Path::new("bom.csv"), &rows).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert_eq!(text.trim_end(), "10k,\"R1,R2\",R_0805,");
    }
}
