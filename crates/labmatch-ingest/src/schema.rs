//! Required-column checks against source frames.

use std::fmt;

use polars::prelude::DataFrame;

use crate::error::{IngestError, Result};

/// The three source extracts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum SourceTable {
    Cohort,
    Labs,
    Cancer,
}

impl SourceTable {
    pub const fn name(self) -> &'static str {
        match self {
            SourceTable::Cohort => "cohort",
            SourceTable::Labs => "labs",
            SourceTable::Cancer => "cancer",
        }
    }
}

impl fmt::Display for SourceTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

fn normalize_header(raw: &str) -> &str {
    raw.trim().trim_matches('\u{feff}').trim()
}

/// Header names of a frame, as read.
pub fn frame_headers(df: &DataFrame) -> Vec<String> {
    df.get_column_names()
        .iter()
        .map(|name| name.to_string())
        .collect()
}

/// Find the frame column holding `wanted`.
///
/// Exact match first, then a case-insensitive match on trimmed headers.
pub fn resolve_column(headers: &[String], wanted: &str) -> Option<String> {
    if let Some(exact) = headers.iter().find(|header| header.as_str() == wanted) {
        return Some(exact.clone());
    }
    let wanted = normalize_header(wanted);
    headers
        .iter()
        .find(|header| normalize_header(header).eq_ignore_ascii_case(wanted))
        .cloned()
}

/// Resolve every required column, failing on the first one that is absent.
///
/// The returned names are in `required` order.
pub fn require_columns(
    df: &DataFrame,
    table: SourceTable,
    required: &[&str],
) -> Result<Vec<String>> {
    let headers = frame_headers(df);
    required
        .iter()
        .map(|wanted| {
            resolve_column(&headers, wanted).ok_or_else(|| IngestError::MissingColumn {
                table,
                column: (*wanted).to_string(),
                available: headers.clone(),
            })
        })
        .collect()
}

/// A zero-byte or whitespace-only file reads as a frame without columns.
pub fn is_blank_frame(df: &DataFrame) -> bool {
    df.width() == 0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn headers(values: &[&str]) -> Vec<String> {
        values.iter().map(|value| (*value).to_string()).collect()
    }

    #[test]
    fn resolve_prefers_exact_match() {
        let available = headers(&["Patient_ID", "patient_id"]);
        assert_eq!(
            resolve_column(&available, "patient_id"),
            Some("patient_id".to_string())
        );
    }

    #[test]
    fn resolve_falls_back_to_case_insensitive() {
        let available = headers(&["\u{feff}PATIENT_ID ", "Result_Text"]);
        assert_eq!(
            resolve_column(&available, "patient_id"),
            Some("\u{feff}PATIENT_ID ".to_string())
        );
        assert_eq!(
            resolve_column(&available, "result_text"),
            Some("Result_Text".to_string())
        );
        assert_eq!(resolve_column(&available, "collection_date"), None);
    }
}
