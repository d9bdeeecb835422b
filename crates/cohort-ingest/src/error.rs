//! Error types for workbook ingestion.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while locating or reading sheets.
#[derive(Debug, Error)]
pub enum IngestError {
    // === File System Errors ===
    /// Workbook directory not found or not a directory.
    #[error("workbook directory not found: {path}")]
    DirectoryNotFound { path: PathBuf },

    /// Failed to read directory entries.
    #[error("failed to read directory {path}: {source}")]
    DirectoryRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// No sheet file matches the configured sheet name.
    #[error("sheet '{sheet}' not found in {dir}")]
    SheetNotFound { sheet: String, dir: PathBuf },

    /// More than one file matches the configured sheet name.
    #[error("sheet '{sheet}' is ambiguous in {dir}: {candidates:?}")]
    AmbiguousSheet {
        sheet: String,
        dir: PathBuf,
        candidates: Vec<PathBuf>,
    },

    // === CSV Parsing Errors ===
    /// Failed to parse a sheet file.
    #[error("failed to parse sheet {path}: {message}")]
    CsvParse { path: PathBuf, message: String },

    /// Sheet file has no non-blank rows.
    #[error("sheet file is empty: {path}")]
    EmptySheet { path: PathBuf },
}

/// Result type for ingestion operations.
pub type Result<T> = std::result::Result<T, IngestError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = IngestError::SheetNotFound {
            sheet: "control".to_string(),
            dir: PathBuf::from("/data/study"),
        };
        assert_eq!(err.to_string(), "sheet 'control' not found in /data/study");
    }
}
