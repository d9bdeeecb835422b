//! Workbook discovery.
//!
//! A workbook is a directory holding one CSV file per sheet. Sheets are
//! located by file stem, ignoring ASCII case and surrounding whitespace.

use std::path::{Path, PathBuf};

use crate::error::{IngestError, Result};
use crate::sheet::{RawSheet, read_sheet};

/// Lists all CSV files in a directory.
///
/// Returns files sorted by filename.
pub fn list_csv_files(dir: &Path) -> Result<Vec<PathBuf>> {
    if !dir.is_dir() {
        return Err(IngestError::DirectoryNotFound {
            path: dir.to_path_buf(),
        });
    }

    let mut files = Vec::new();

    let entries = std::fs::read_dir(dir).map_err(|e| IngestError::DirectoryRead {
        path: dir.to_path_buf(),
        source: e,
    })?;

    for entry_result in entries {
        let entry = entry_result.map_err(|e| IngestError::DirectoryRead {
            path: dir.to_path_buf(),
            source: e,
        })?;

        let path = entry.path();

        // Skip directories
        if !path.is_file() {
            continue;
        }

        let is_csv = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("csv"));

        if is_csv {
            files.push(path);
        }
    }

    files.sort_by(|a, b| a.file_name().cmp(&b.file_name()));

    Ok(files)
}

/// Finds the file backing a sheet.
pub fn locate_sheet(dir: &Path, sheet: &str) -> Result<PathBuf> {
    let wanted = sheet.trim();
    let mut candidates: Vec<PathBuf> = list_csv_files(dir)?
        .into_iter()
        .filter(|path| {
            path.file_stem()
                .and_then(|stem| stem.to_str())
                .is_some_and(|stem| stem.trim().eq_ignore_ascii_case(wanted))
        })
        .collect();

    if candidates.len() > 1 {
        return Err(IngestError::AmbiguousSheet {
            sheet: sheet.to_string(),
            dir: dir.to_path_buf(),
            candidates,
        });
    }
    candidates.pop().ok_or_else(|| IngestError::SheetNotFound {
        sheet: sheet.to_string(),
        dir: dir.to_path_buf(),
    })
}

/// Locates and reads a sheet in one step.
pub fn load_sheet(dir: &Path, sheet: &str) -> Result<(PathBuf, RawSheet)> {
    let path = locate_sheet(dir, sheet)?;
    let raw = read_sheet(&path, sheet)?;
    Ok((path, raw))
}
