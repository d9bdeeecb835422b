//! Categorical encodings.

use std::sync::LazyLock;

use regex::Regex;

use cohort_model::{DoseCategory, Race};

static YES_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(1|y)").expect("Invalid yes regex"));

static NO_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(0|n)").expect("Invalid no regex"));

static NO_EVENT_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^(n|no|none)").expect("Invalid adverse event regex"));

/// Tokens that mean "not recorded" rather than "no".
const MISSING_TOKENS: &[&str] = &["n/a", "na"];

/// Normalizes a yes/no style cell to a tri-state flag.
///
/// `1`, `y...` mean yes; `0`, `n...` mean no. Blank, `n/a`, `na` and any
/// other text are missing.
pub fn clean_yes_no(value: Option<&str>) -> Option<bool> {
    let lowered = value?.trim().to_lowercase();
    if lowered.is_empty() || MISSING_TOKENS.contains(&lowered.as_str()) {
        return None;
    }
    if YES_PATTERN.is_match(&lowered) {
        Some(true)
    } else if NO_PATTERN.is_match(&lowered) {
        Some(false)
    } else {
        None
    }
}

/// Maps a free-text race entry by its first letter.
///
/// Missing and unrecognized values both become [`Race::Other`].
pub fn harmonize_race(value: Option<&str>) -> Race {
    let first = value
        .and_then(|v| v.trim().chars().next())
        .map(|c| c.to_ascii_uppercase());
    match first {
        Some('W') => Race::White,
        Some('B') => Race::Black,
        Some('H') => Race::Hispanic,
        Some('A') => Race::Asian,
        _ => Race::Other,
    }
}

/// Buckets a mg/kg dose. Both 10 and 15 fall in the middle bucket.
pub fn dose_category(mgkg: Option<f64>) -> DoseCategory {
    match mgkg.filter(|v| v.is_finite()) {
        None => DoseCategory::NotRecorded,
        Some(v) if v < 10.0 => DoseCategory::Below10,
        Some(v) if v <= 15.0 => DoseCategory::From10To15,
        Some(_) => DoseCategory::Above15,
    }
}

/// Whether an adverse-event cell records an event.
///
/// Blank cells and text starting with "n" ("no", "none") are no event.
pub fn adverse_event_flag(value: Option<&str>) -> bool {
    match value.map(str::trim) {
        None | Some("") => false,
        Some(text) => !NO_EVENT_PATTERN.is_match(text),
    }
}
