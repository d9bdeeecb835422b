//! Workbook ingestion.
//!
//! Reads the sheets of a cohort workbook (one CSV file per sheet) into
//! untyped [`RawSheet`]s. Column meaning is resolved later by the mapping
//! tables in `cohort-map`.
//!
//! # Example
//!
//! ```ignore
//! use std::path::Path;
//! use cohort_ingest::load_sheet;
//!
//! let (path, sheet) = load_sheet(Path::new("data/study"), "treatment")?;
//! println!("{} rows from {}", sheet.len(), path.display());
//! ```

mod error;
mod sheet;
mod workbook;

// === Error Types ===
pub use error::{IngestError, Result};

// === Sheet Reading ===
pub use sheet::{RawRecord, RawSheet, normalize_header, read_sheet};

// === Workbook Discovery ===
pub use workbook::{list_csv_files, load_sheet, locate_sheet};
