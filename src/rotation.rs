// SPDX-License-Identifier: GPL-3.0-or-later

/*
 *  src/rotation.rs - Footprint rotation corrections for JLCPCB assembly.
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
 * # `rotation` Module
 *
 * KiCad and JLCPCB disagree on the zero orientation of some package families.
 * A [RotationTable] holds an ordered list of [RotationRule]s; the first rule
 * whose designator pattern and footprint both match a placement contributes
 * its offset, and the result is normalized into `[0, 360)`.
 *
 * ## Usage Example
 *
 * ```
 * use std::str::FromStr;
 *
 * use rust_decimal::Decimal;
 *
 * use pcbassembly::rotation::RotationTable;
 *
 * let table = RotationTable::default();
 * let rotated = table.correct("Q1", "SOT-23", Decimal::from_str("90").unwrap());
 * assert_eq!(rotated.to_string(), "270");
 * ```
 */

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;
use std::str::FromStr;

use regex::Regex;
use rust_decimal::Decimal;
use tracing::debug;

use crate::error::{Error, Result};

/// Built-in corrections as `(designator prefix, footprint, degrees)`.
pub const DEFAULT_RULES: [(&str, &str, i64); 5] = [
    ("Q", "SOT-23", 180),
    ("U", "SOT-23-5", 180),
    ("U", "SOT-23-8", 270),
    ("U", "SOT-223-3_TabPin2", 180),
    ("U", "LQFP-48_7x7mm_P0.5mm", 270),
];

/// A single rotation correction.
#[derive(Debug, Clone)]
pub struct RotationRule {
    /// The designator prefix pattern as written (e.g. `U`).
    pub prefix: String,
    /// The exact footprint name this rule applies to.
    pub footprint: String,
    /// Degrees added to the exported rotation.
    pub degrees: Decimal,
    designator: Regex,
}

impl RotationRule {
    /// Builds a rule matching designators of the form `<prefix><digits>`.
    ///
    /// The prefix is a regular expression, so `U|IC` matches both `U3` and
    /// `IC3`.
    pub fn new(
        prefix: &str,
        footprint: &str,
        degrees: Decimal,
    ) -> std::result::Result<Self, regex::Error> {
        let designator = Regex::new(&format!(r"^(?:{prefix})\d+$"))?;
        Ok(Self {
            prefix: prefix.to_string(),
            footprint: footprint.to_string(),
            degrees,
            designator,
        })
    }

    /// Whether this rule applies to a placement.
    pub fn matches(&self, reference: &str, footprint: &str) -> bool {
        self.footprint == footprint && self.designator.is_match(reference)
    }
}

/// An ordered list of rotation rules. First match wins.
#[derive(Debug, Clone)]
pub struct RotationTable {
    rules: Vec<RotationRule>,
}

impl Default for RotationTable {
    fn default() -> Self {
        let rules = DEFAULT_RULES
            .iter()
            .map(|&(prefix, footprint, degrees)| {
                RotationRule::new(prefix, footprint, Decimal::from(degrees))
                    .expect("built-in rotation rule is valid")
            })
            .collect();
        Self { rules }
    }
}

impl RotationTable {
    pub fn new(rules: Vec<RotationRule>) -> Self {
        Self { rules }
    }

    /// Reads a table from CSV rows of `prefix,footprint,degrees`.
    ///
    /// Lines starting with `#` are comments. Fields are trimmed.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .comment(Some(b'#'))
            .trim(csv::Trim::All)
            .from_reader(reader);

        let mut rules = Vec::new();
        for result in reader.records() {
            let record = result.map_err(|e| Error::Rules {
                line: e.position().map_or(0, |p| p.line()),
                message: e.to_string(),
            })?;
            let line = record.position().map_or(0, |p| p.line());
            if record.len() != 3 {
                return Err(Error::Rules {
                    line,
                    message: format!("expected 3 fields, found {}", record.len()),
                });
            }

            let degrees = Decimal::from_str(&record[2]).map_err(|e| Error::Rules {
                line,
                message: format!("invalid degrees {:?}: {e}", &record[2]),
            })?;
            let rule = RotationRule::new(&record[0], &record[1], degrees).map_err(|e| {
                Error::Rules {
                    line,
                    message: format!("invalid designator pattern {:?}: {e}", &record[0]),
                }
            })?;
            rules.push(rule);
        }

        Ok(Self { rules })
    }

    /// Reads a table from a rules CSV file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let file = File::open(path).map_err(|e| Error::io(path, e))?;
        Self::from_reader(BufReader::new(file))
    }

    pub fn rules(&self) -> &[RotationRule] {
        &self.rules
    }

    /// Finds the first rule that applies to a placement.
    pub fn lookup(&self, reference: &str, footprint: &str) -> Option<&RotationRule> {
        self.rules
            .iter()
            .find(|rule| rule.matches(reference, footprint))
    }

    /// Returns the corrected rotation for a placement, in `[0, 360)`.
    ///
    /// The result carries the larger of the exported and offset scales, so
    /// `0.000000` rotated by 270 is `270.000000`.
    pub fn correct(&self, reference: &str, footprint: &str, rotation: Decimal) -> Decimal {
        let offset = match self.lookup(reference, footprint) {
            Some(rule) => {
                debug!(
                    reference,
                    footprint,
                    %rotation,
                    degrees = %rule.degrees,
                    "applying rotation correction"
                );
                rule.degrees
            }
            None => Decimal::ZERO,
        };

        // Both terms are below 360, so the sum cannot overflow.
        let mut corrected =
            normalize_degrees(normalize_degrees(rotation) + normalize_degrees(offset));
        corrected.rescale(rotation.scale().max(offset.scale()));
        corrected
    }
}

/// Wraps an angle into `[0, 360)`, keeping its scale.
pub fn normalize_degrees(degrees: Decimal) -> Decimal {
    let full_turn = Decimal::from(360);
    let wrapped = degrees % full_turn;
    if wrapped.is_zero() {
        wrapped.abs()
    } else if wrapped.is_sign_negative() {
        wrapped + full_turn
    } else {
        wrapped
    }
}
