//! Numeric parsing and arithmetic on lab values.

/// Parse a string value to a finite number.
///
/// Handles common numeric formats:
/// - Standard numbers: "123", "-45.67"
/// - Thousands separators: "1,234,567"
/// - Whitespace: "  123  "
/// - Scientific notation: "1.23e5"
///
/// Returns `None` for blank, unparseable, NaN or infinite values.
pub fn parse_numeric(value: &str) -> Option<f64> {
    let trimmed = value.trim();

    if trimmed.is_empty() {
        return None;
    }

    // Remove thousands separators and whitespace
    let cleaned = trimmed
        .replace(',', "")
        .replace(' ', "")
        .replace('\u{a0}', ""); // Non-breaking space

    cleaned.parse::<f64>().ok().and_then(finite)
}

/// Keeps a value only when it is finite.
pub fn finite(value: f64) -> Option<f64> {
    value.is_finite().then_some(value)
}

/// Relative change from `pre` to `post`, in percent.
///
/// Not finite when `pre` is zero; callers store such results as missing.
pub fn percent_change(pre: f64, post: f64) -> f64 {
    (post - pre) / pre * 100.0
}

/// Whether a raw identifier marks a patient row.
///
/// Summary and note rows in the sheets carry text in this column.
pub fn is_patient_identifier(value: &str) -> bool {
    parse_numeric(value).is_some()
}
