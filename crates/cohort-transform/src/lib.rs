//! Harmonization of raw cohort sheets.
//!
//! Turns [`RawSheet`](cohort_ingest::RawSheet)s into canonical
//! [`PatientRecord`](cohort_model::PatientRecord)s using a resolved mapping
//! table, then combines both arms into a
//! [`CombinedCohort`](cohort_model::CombinedCohort) for matching.

pub mod combine;
pub mod derive;
pub mod harmonize;
pub mod normalization;

pub use combine::{combine, sex_indicator};
pub use derive::derive_fields;
pub use harmonize::{HarmonizedSheet, harmonize_record, harmonize_sheet};
