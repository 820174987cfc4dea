// SPDX-License-Identifier: GPL-3.0-or-later

/*
 *  src/error.rs - Error type for the assembly package builder.
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

/// Process exit code for configuration problems (wrong directory, bad rules).
pub const EXIT_CONFIG: u8 = 2;
/// Process exit code for unreadable or malformed input files.
pub const EXIT_INPUT: u8 = 3;
/// Process exit code for failures while writing the archive.
pub const EXIT_OUTPUT: u8 = 4;

/// Every way a build can fail. All of them abort the run.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The project marker file was not found in the project directory.
    #[error("{} not found; run from the project directory", .marker.display())]
    NotProjectDirectory { marker: PathBuf },

    /// A file or directory could not be read, written or removed.
    #[error("{}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A CSV file could not be parsed, including invalid UTF-8.
    #[error("{}: {source}", .path.display())]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    /// A CSV record had the wrong number of fields.
    #[error("{}:{line}: expected {expected} fields, found {found}", .path.display())]
    RowShape {
        path: PathBuf,
        line: u64,
        expected: usize,
        found: usize,
    },

    /// A placement rotation was not a number.
    #[error("{}:{line}: invalid rotation {value:?}: {source}", .path.display())]
    Rotation {
        path: PathBuf,
        line: u64,
        value: String,
        #[source]
        source: rust_decimal::Error,
    },

    /// A rotation rule could not be built.
    #[error("rotation rule {line}: {message}")]
    Rules { line: u64, message: String },

    /// Talking to the operator on stdin/stdout failed.
    #[error("console: {0}")]
    Console(#[source] std::io::Error),

    /// The gerber archive could not be written.
    #[error("{}: {source}", .path.display())]
    Archive {
        path: PathBuf,
        #[source]
        source: zip::result::ZipError,
    },
}

impl Error {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn csv(path: impl Into<PathBuf>, source: csv::Error) -> Self {
        Self::Csv {
            path: path.into(),
            source,
        }
    }

    /// The process exit code this error should produce.
    pub fn exit_code(&self) -> u8 {
        match self {
            Self::NotProjectDirectory { .. } | Self::Rules { .. } => EXIT_CONFIG,
            Self::Io { .. } | Self::Csv { .. } | Self::RowShape { .. } | Self::Rotation { .. } => {
                EXIT_INPUT
            }
            Self::Console(_) | Self::Archive { .. } => EXIT_OUTPUT,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_codes() {
        let marker = Error::NotProjectDirectory {
            marker: PathBuf::from("board.pro"),
        };
        assert_eq!(marker.exit_code(), EXIT_CONFIG);

        let missing = Error::io(
            "board.bom.csv",
            std::io::Error::from(std::io::ErrorKind::NotFound),
        );
        assert_eq!(missing.exit_code(), EXIT_INPUT);

        let shape = Error::RowShape {
            path: PathBuf::from("board.bom.csv"),
            line: 3,
            expected: 4,
            found: 3,
        };
        assert_eq!(shape.exit_code(), EXIT_INPUT);
        assert_eq!(
            shape.to_string(),
            "board.bom.csv:3: expected 4 fields, found 3"
        );
    }

    #[test]
    fn test_input_and_output_variants() {
        let rotation = Error::Rotation {
            path: PathBuf::from("board-all-pos.csv"),
            line: 4,
            value: "ninety".to_string(),
            source: rust_decimal::Error::ConversionTo("Decimal".to_string()),
        };
        assert_eq!(rotation.exit_code(), EXIT_INPUT);
        assert!(
            rotation
                .to_string()
                .starts_with("board-all-pos.csv:4: invalid rotation \"ninety\"")
        );

        let archive = Error::Archive {
            path: PathBuf::from("assembly/gerbers.zip"),
            source: zip::result::ZipError::FileNotFound,
        };
        assert_eq!(archive.exit_code(), EXIT_OUTPUT);
        assert!(archive.to_string().starts_with("assembly/gerbers.zip: "));
    }

    #[test]
    fn test_marker_message() {
        let err = Error::NotProjectDirectory {
            marker: PathBuf::from("board.pro"),
        };
        assert_eq!(
            err.to_string(),
            "board.pro not found; run from the project directory"
        );
    }
}
