//! Mapping raw sheet rows onto [`PatientRecord`]s.
//!
//! Fields are filled in a fixed order: identity, demographics,
//! comorbidities, labs, exposure, then derived values.

use cohort_ingest::{RawRecord, RawSheet};
use cohort_map::{CanonicalField, ResolvedMapping, Result, SheetMapping};
use cohort_model::{Comorbidity, Enzyme, PatientRecord, Timepoint};
use tracing::debug;

use crate::derive::derive_fields;
use crate::normalization::{
    adverse_event_flag, clean_yes_no, dose_category, harmonize_race, is_patient_identifier,
    parse_numeric,
};

/// Canonical rows of one sheet.
#[derive(Debug, Clone, Default)]
pub struct HarmonizedSheet {
    pub sheet: String,
    pub records: Vec<PatientRecord>,
    /// Rows dropped because their identifier is not numeric.
    pub skipped: usize,
}

impl HarmonizedSheet {
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Harmonizes a whole sheet.
///
/// Fails only when the mapping cannot be resolved against the sheet's
/// headers; cell-level problems become missing values.
pub fn harmonize_sheet(sheet: &RawSheet, mapping: &SheetMapping) -> Result<HarmonizedSheet> {
    let resolved = ResolvedMapping::for_sheet(mapping, sheet)?;

    let mut records = Vec::with_capacity(sheet.len());
    let mut skipped = 0usize;
    for raw in &sheet.records {
        match harmonize_record(&resolved, raw) {
            Some(record) => records.push(record),
            None => skipped += 1,
        }
    }

    debug!(
        sheet = %sheet.name,
        group = %resolved.group,
        records = records.len(),
        skipped,
        "sheet harmonized"
    );
    Ok(HarmonizedSheet {
        sheet: sheet.name.clone(),
        records,
        skipped,
    })
}

/// Maps one raw row, or `None` when it is not a patient row.
pub fn harmonize_record(mapping: &ResolvedMapping, raw: &RawRecord) -> Option<PatientRecord> {
    let id = mapping
        .value(CanonicalField::PatientId, raw)
        .filter(|id| is_patient_identifier(id))?;

    let text = |field: CanonicalField| mapping.value(field, raw);
    let number = |field: CanonicalField| text(field).and_then(parse_numeric);

    let mut record = PatientRecord::new(mapping.group, raw.line, id);

    record.age = number(CanonicalField::Age);
    record.sex = text(CanonicalField::Sex).map(str::to_string);
    record.race = harmonize_race(text(CanonicalField::Race));

    for flag in Comorbidity::ALL {
        let value = clean_yes_no(text(CanonicalField::Comorbidity(flag)));
        record.comorbidities.set(flag, value);
    }

    for enzyme in Enzyme::ALL {
        for timepoint in Timepoint::ALL {
            let value = number(CanonicalField::Lab(enzyme, timepoint));
            record.labs.set(enzyme, timepoint, value);
        }
    }

    record.mgkg = number(CanonicalField::DoseMgkg);
    record.interval_days = number(CanonicalField::IntervalDays);
    if mapping.maps(CanonicalField::DoseMgkg) {
        record.dose_category = Some(dose_category(record.mgkg));
    }
    if mapping.maps(CanonicalField::AdverseEvent) {
        record.adverse_event = Some(adverse_event_flag(text(CanonicalField::AdverseEvent)));
    }

    record.derived = derive_fields(&record.labs);
    Some(record)
}
