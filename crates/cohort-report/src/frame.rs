//! DataFrame rendering.

use polars::prelude::{AnyValue, CsvWriter, DataFrame, SerWriter};

use crate::error::{ReportError, Result};

/// Decimal places for float columns in every CSV.
pub const FLOAT_PRECISION: usize = 4;

/// Renders a frame as CSV bytes with a header row and fixed float precision.
pub fn render_csv(df: &mut DataFrame, file: &str) -> Result<Vec<u8>> {
    let mut buffer = Vec::new();
    CsvWriter::new(&mut buffer)
        .include_header(true)
        .with_float_precision(Some(FLOAT_PRECISION))
        .finish(df)
        .map_err(|source| ReportError::Render {
            file: file.to_string(),
            source,
        })?;
    Ok(buffer)
}

/// Converts an AnyValue to its display string; nulls become empty.
pub fn any_to_string(value: AnyValue<'_>) -> String {
    match value {
        AnyValue::Null => String::new(),
        AnyValue::UInt32(v) => v.to_string(),
        AnyValue::UInt64(v) => v.to_string(),
        AnyValue::Int32(v) => v.to_string(),
        AnyValue::Int64(v) => v.to_string(),
        AnyValue::Float64(v) => format!("{v:.prec$}", prec = FLOAT_PRECISION),
        AnyValue::Boolean(b) => if b { "1" } else { "0" }.to_string(),
        AnyValue::String(s) => s.to_string(),
        AnyValue::StringOwned(s) => s.to_string(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use polars::prelude::{IntoColumn, NamedFrom, Series};

    #[test]
    fn test_render_csv_fixed_precision_and_nulls() {
        let mut df = DataFrame::new(vec![
            Series::new("name".into(), vec!["a", "b"]).into_column(),
            Series::new("value".into(), vec![Some(1.0_f64 / 3.0), None]).into_column(),
        ])
        .unwrap();
        let bytes = render_csv(&mut df, "test.csv").unwrap();
        assert_eq!(String::from_utf8(bytes).unwrap(), "name,value\na,0.3333\nb,\n");
    }

    #[test]
    fn test_any_to_string() {
        assert_eq!(any_to_string(AnyValue::Null), "");
        assert_eq!(any_to_string(AnyValue::Float64(0.5)), "0.5000");
        assert_eq!(any_to_string(AnyValue::UInt32(7)), "7");
        assert_eq!(any_to_string(AnyValue::String("x")), "x");
    }
}
