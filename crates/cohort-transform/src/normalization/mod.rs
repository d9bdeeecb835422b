//! Per-value normalization rules.
//!
//! Every function here maps one raw cell (or a pair of numbers) to a
//! canonical value. None of them fail: unusable input becomes `None`.

mod categorical;
mod numeric;

pub use categorical::{adverse_event_flag, clean_yes_no, dose_category, harmonize_race};
pub use numeric::{finite, is_patient_identifier, parse_numeric, percent_change};
