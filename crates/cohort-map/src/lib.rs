//! Column mapping for cohort workbooks.
//!
//! Each sheet is described by a versioned [`SheetMapping`] from canonical
//! fields to source column names. [`ResolvedMapping::resolve`] binds a table
//! to a sheet's headers up front, so a workbook with renamed or missing
//! columns fails before any row is harmonized.

mod error;
mod field;
mod lookup;
mod resolve;
mod table;

// === Error Types ===
pub use error::{MappingError, MissingColumn, Result};

// === Fields and Tables ===
pub use field::CanonicalField;
pub use table::{MappingSet, SheetMapping};

// === Resolution ===
pub use lookup::HeaderLookup;
pub use resolve::ResolvedMapping;
