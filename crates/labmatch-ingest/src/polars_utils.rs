//! Polars AnyValue helpers for all-text source frames.

use polars::prelude::*;

use crate::error::Result;

/// Converts a Polars AnyValue to a String representation.
/// Returns empty string for Null.
pub fn any_to_string(value: AnyValue<'_>) -> String {
    match value {
        AnyValue::Null => String::new(),
        AnyValue::String(s) => s.to_string(),
        AnyValue::StringOwned(s) => s.to_string(),
        other => other.to_string(),
    }
}

/// Every value of one column as text, in row order.
pub fn column_strings(df: &DataFrame, name: &str) -> Result<Vec<String>> {
    let column = df.column(name)?;
    (0..df.height())
        .map(|idx| Ok(any_to_string(column.get(idx).unwrap_or(AnyValue::Null))))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_any_to_string() {
        assert_eq!(any_to_string(AnyValue::Null), "");
        assert_eq!(any_to_string(AnyValue::String("LDL")), "LDL");
        assert_eq!(any_to_string(AnyValue::Int64(42)), "42");
    }

    #[test]
    fn test_column_strings_maps_nulls_to_empty() {
        let df = DataFrame::new(vec![
            Series::new("code".into(), vec![Some("A1"), None, Some("B2")]).into(),
        ])
        .unwrap();
        assert_eq!(column_strings(&df, "code").unwrap(), vec!["A1", "", "B2"]);
        assert!(column_strings(&df, "missing").is_err());
    }
}
