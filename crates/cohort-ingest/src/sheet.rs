//! Raw sheet loading.
//!
//! A sheet is read as untyped text: the first non-blank row supplies the
//! headers, every later non-blank row becomes a [`RawRecord`]. No column is
//! interpreted here.

use std::path::Path;

use csv::ReaderBuilder;

use crate::error::{IngestError, Result};

/// One raw data row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawRecord {
    /// 1-based position among the sheet's data rows.
    pub line: usize,
    /// Cell text, padded to the header width.
    pub values: Vec<String>,
}

impl RawRecord {
    pub fn get(&self, index: usize) -> Option<&str> {
        self.values.get(index).map(String::as_str)
    }
}

/// A sheet held in memory as text.
#[derive(Debug, Clone)]
pub struct RawSheet {
    pub name: String,
    pub headers: Vec<String>,
    pub records: Vec<RawRecord>,
}

impl RawSheet {
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Collapses internal whitespace and strips a byte-order mark.
pub fn normalize_header(raw: &str) -> String {
    let trimmed = raw.trim().trim_matches('\u{feff}');
    let mut parts = trimmed.split_whitespace();
    let mut normalized = String::new();
    if let Some(first) = parts.next() {
        normalized.push_str(first);
        for part in parts {
            normalized.push(' ');
            normalized.push_str(part);
        }
    }
    normalized
}

fn normalize_cell(raw: &str) -> String {
    raw.trim().trim_matches('\u{feff}').to_string()
}

/// Reads a sheet file.
pub fn read_sheet(path: &Path, name: &str) -> Result<RawSheet> {
    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_path(path)
        .map_err(|e| IngestError::CsvParse {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;

    let mut headers: Option<Vec<String>> = None;
    let mut records = Vec::new();
    for record in reader.records() {
        let record = record.map_err(|e| IngestError::CsvParse {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        let row: Vec<String> = record.iter().map(normalize_cell).collect();
        if row.iter().all(String::is_empty) {
            continue;
        }
        if headers.is_none() {
            headers = Some(row.iter().map(|v| normalize_header(v)).collect());
            continue;
        }
        let width = headers.as_ref().map_or(0, Vec::len);
        let mut values = row;
        values.resize(width.max(values.len()), String::new());
        records.push(RawRecord {
            line: records.len() + 1,
            values,
        });
    }

    let Some(headers) = headers else {
        return Err(IngestError::EmptySheet {
            path: path.to_path_buf(),
        });
    };
    tracing::debug!(
        sheet = name,
        path = %path.display(),
        columns = headers.len(),
        rows = records.len(),
        "sheet loaded"
    );
    Ok(RawSheet {
        name: name.to_string(),
        headers,
        records,
    })
}
