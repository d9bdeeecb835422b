//! Error types for mapping operations.

use std::fmt;

use thiserror::Error;

use crate::field::CanonicalField;

/// A mapped column that the sheet does not carry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MissingColumn {
    pub field: CanonicalField,
    pub column: String,
}

impl fmt::Display for MissingColumn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} <- '{}'", self.field, self.column)
    }
}

/// Errors from mapping operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MappingError {
    // === Table Errors ===
    #[error("unknown canonical field: {field}")]
    UnknownField { field: String },

    #[error("mapping for sheet '{sheet}' (v{version}) has no column for required field {field}")]
    MissingRequiredField {
        sheet: String,
        version: u32,
        field: CanonicalField,
    },

    #[error("mapping for sheet '{sheet}' (v{version}) maps {field} to a blank column name")]
    BlankColumn {
        sheet: String,
        version: u32,
        field: CanonicalField,
    },

    // === Resolution Errors ===
    #[error(
        "sheet '{sheet}' is missing {} mapped column(s) (mapping v{version}): {}",
        .missing.len(),
        join_missing(.missing)
    )]
    MissingColumns {
        sheet: String,
        version: u32,
        missing: Vec<MissingColumn>,
    },
}

fn join_missing(missing: &[MissingColumn]) -> String {
    missing
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

pub type Result<T> = std::result::Result<T, MappingError>;
