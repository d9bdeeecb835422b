//! Data model for two-arm cohort harmonization and matching.
//!
//! Types here are plain values: harmonization creates [`PatientRecord`]s,
//! the combiner wraps them in a [`CombinedCohort`], and the matcher selects
//! a [`MatchedCohort`]. Nothing is mutated after it is produced.

pub mod cohort;
pub mod enums;
pub mod error;
pub mod patient;

pub use cohort::{CombinedCohort, CombinedRecord, MatchedCohort, MatchedRecord};
pub use enums::{Comorbidity, DoseCategory, Enzyme, Group, Race, Timepoint};
pub use error::{ModelError, Result};
pub use patient::{Comorbidities, Derived, LabPanel, PatientRecord};
