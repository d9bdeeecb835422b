//! Eager resolution of a mapping table against sheet headers.

use std::collections::BTreeMap;

use cohort_ingest::{RawRecord, RawSheet};
use cohort_model::Group;

use crate::error::{MappingError, MissingColumn, Result};
use crate::field::CanonicalField;
use crate::lookup::HeaderLookup;
use crate::table::SheetMapping;

/// A mapping table bound to column positions of one sheet.
#[derive(Debug, Clone)]
pub struct ResolvedMapping {
    pub sheet: String,
    pub version: u32,
    pub group: Group,
    positions: BTreeMap<CanonicalField, usize>,
}

impl ResolvedMapping {
    /// Binds every mapped column before any row is read.
    ///
    /// Fails with [`MappingError::MissingColumns`] naming all absent columns
    /// at once.
    pub fn resolve(mapping: &SheetMapping, headers: &[String]) -> Result<Self> {
        mapping.validate()?;
        let lookup = HeaderLookup::new(headers);

        let mut positions = BTreeMap::new();
        let mut missing = Vec::new();
        for (field, column) in &mapping.columns {
            match lookup.position(column) {
                Some(index) => {
                    positions.insert(*field, index);
                }
                None => missing.push(MissingColumn {
                    field: *field,
                    column: column.clone(),
                }),
            }
        }

        if !missing.is_empty() {
            return Err(MappingError::MissingColumns {
                sheet: mapping.sheet.clone(),
                version: mapping.version,
                missing,
            });
        }

        tracing::debug!(
            sheet = %mapping.sheet,
            version = mapping.version,
            fields = positions.len(),
            "mapping resolved"
        );
        Ok(Self {
            sheet: mapping.sheet.clone(),
            version: mapping.version,
            group: mapping.group,
            positions,
        })
    }

    /// Resolves against a loaded sheet's headers.
    pub fn for_sheet(mapping: &SheetMapping, sheet: &RawSheet) -> Result<Self> {
        Self::resolve(mapping, &sheet.headers)
    }

    /// Whether the sheet supplies this field at all.
    pub fn maps(&self, field: CanonicalField) -> bool {
        self.positions.contains_key(&field)
    }

    pub fn position(&self, field: CanonicalField) -> Option<usize> {
        self.positions.get(&field).copied()
    }

    /// Trimmed cell text for a field, or `None` when unmapped or blank.
    pub fn value<'r>(&self, field: CanonicalField, record: &'r RawRecord) -> Option<&'r str> {
        let index = self.position(field)?;
        let value = record.get(index)?.trim();
        (!value.is_empty()).then_some(value)
    }
}
