// SPDX-License-Identifier: GPL-3.0-or-later

/*
 *  src/archive.rs - Gerber bundle packaging.
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

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use tracing::{debug, warn};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::error::{Error, Result};

/// Suffix of the position export, which is rewritten rather than shipped.
pub const PLACEMENT_EXPORT_SUFFIX: &str = "-pos.csv";

/// Whether a plot output file belongs in the gerber bundle.
pub fn is_fabrication_file(name: &str) -> bool {
    !name.ends_with(PLACEMENT_EXPORT_SUFFIX)
}

/// Zips the fabrication files in `source_dir` into a flat archive at `dest`.
///
/// Entries are added in name order. Subdirectories are skipped. Returns the
/// names that were archived.
pub fn pack(source_dir: &Path, dest: &Path) -> Result<Vec<String>> {
    let entries = std::fs::read_dir(source_dir).map_err(|e| Error::io(source_dir, e))?;

    let mut files = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| Error::io(source_dir, e))?;
        let path = entry.path();
        let file_type = entry.file_type().map_err(|e| Error::io(&path, e))?;
        if !file_type.is_file() {
            warn!(path = %path.display(), "not a regular file, leaving it out of the archive");
            continue;
        }

        let name = entry.file_name().to_string_lossy().to_string();
        if is_fabrication_file(&name) {
            files.push((name, path));
        }
    }
    files.sort();

    let archive = File::create(dest).map_err(|e| Error::io(dest, e))?;
    let mut zip = ZipWriter::new(archive);
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
    let archive_err = |source: zip::result::ZipError| Error::Archive {
        path: dest.to_path_buf(),
        source,
    };

    for (name, path) in &files {
        debug!(%name, "adding to archive");
        zip.start_file(name.as_str(), options).map_err(archive_err)?;
        let file = File::open(path).map_err(|e| Error::io(path, e))?;
        std::io::copy(&mut BufReader::new(file), &mut zip).map_err(|e| Error::io(dest, e))?;
    }
    zip.finish().map_err(archive_err)?;

    Ok(files.into_iter().map(|(name, _)| name).collect())
}

#[cfg(test)]
mod tests {
    use std::io::Read;

    use zip::ZipArchive;

    use super::*;

    #[test]
    fn test_is_fabrication_file() {
        assert!(is_fabrication_file("board-F_Cu.gbr"));
        assert!(is_fabrication_file("board.drl"));
        assert!(is_fabrication_file("board-job.gbrjob"));
        assert!(!is_fabrication_file("board-all-pos.csv"));
        assert!(!is_fabrication_file("board-top-pos.csv"));
    }

    #[test]
    fn test_pack() {
        let dir = tempfile::tempdir().unwrap();
        let gerbers = dir.path().join("gerbers");
        std::fs::create_dir(&gerbers).unwrap();
        std::fs::write(gerbers.join("board-F_Cu.gbr"), "G04 top copper*\n").unwrap();
        std::fs::write(gerbers.join("board-B_Cu.gbr"), "G04 bottom copper*\n").unwrap();
        std::fs::write(gerbers.join("board.drl"), "M48\n").unwrap();
        std::fs::write(gerbers.join("board-all-pos.csv"), "Ref,Val\n").unwrap();
        std::fs::create_dir(gerbers.join("nested")).unwrap();

        let dest = dir.path().join("gerbers.zip");
        let names = pack(&gerbers, &dest).unwrap();
        assert_eq!(names, ["board-B_Cu.gbr", "board-F_Cu.gbr", "board.drl"]);

        let mut archive = ZipArchive::new(File::open(&dest).unwrap()).unwrap();
        assert_eq!(archive.len(), 3);
        let mut contents = String::new();
        archive
            .by_name("board-F_Cu.gbr")
            .unwrap()
            .read_to_string(&mut contents)
            .unwrap();
        assert_eq!(contents, "G04 top copper*\n");
        assert!(archive.by_name("board-all-pos.csv").is_err());
    }

    #[test]
    fn test_pack_missing_dir() {
        let dir = tempfile::tempdir().unwrap();
        let err = pack(&dir.path().join("gerbers"), &dir.path().join("gerbers.zip")).unwrap_err();
        assert!(matches!(err, Error::Io { .. }));
    }
}
