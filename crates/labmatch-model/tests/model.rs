//! Tests for labmatch-model serde behavior.

use labmatch_model::{AnalysisOptions, PatientLimit, RunSummary, SourceColumns};

#[test]
fn options_from_partial_toml_keep_defaults() {
    let options: AnalysisOptions = toml::from_str("max_date_diff_days = 30\n").expect("parse");
    assert_eq!(options.max_date_diff_days, 30);
    assert_eq!(options.patient_limit, PatientLimit::Bounded(5));
    assert!(options.prune_digit_only_columns);
}

#[test]
fn patient_limit_accepts_word_or_count() {
    let unbounded: AnalysisOptions =
        toml::from_str("patient_limit = \"unbounded\"\n").expect("parse");
    assert_eq!(unbounded.patient_limit, PatientLimit::Unbounded);

    let bounded: AnalysisOptions = toml::from_str("patient_limit = 12\n").expect("parse");
    assert_eq!(bounded.patient_limit, PatientLimit::Bounded(12));

    let zero = toml::from_str::<AnalysisOptions>("patient_limit = 0\n");
    assert!(zero.is_err());
}

#[test]
fn options_json_round_trip() {
    let options = AnalysisOptions::default()
        .with_patient_limit(PatientLimit::Unbounded)
        .with_prune_digit_only_columns(false);
    let json = serde_json::to_string(&options).expect("serialize");
    assert!(json.contains("\"patient_limit\":\"unbounded\""));
    let round: AnalysisOptions = serde_json::from_str(&json).expect("deserialize");
    assert_eq!(round, options);
}

#[test]
fn source_columns_override_single_name() {
    let columns: SourceColumns = toml::from_str(
        r#"
[cohort]
reference_date = "index_date"

[labs]
result_text = "value"
"#,
    )
    .expect("parse");
    assert_eq!(columns.cohort.reference_date, "index_date");
    assert_eq!(columns.cohort.patient_id, "patient_id");
    assert_eq!(columns.labs.result_text, "value");
    assert_eq!(columns.cancer.required().len(), 7);
}

#[test]
fn summary_deserializes_without_optional_fields() {
    let json = r#"{
        "patients_processed": 2,
        "unique_test_types": 3,
        "total_measurements": 6,
        "non_null_measurements": 4,
        "columns_before_pruning": 3,
        "columns_after_pruning": 2,
        "pruned_columns": ["123"],
        "duplicate_groups": 0,
        "matrix_rows": 2,
        "long_format_rows": 5,
        "suffix_rows": 3
    }"#;
    let summary: RunSummary = serde_json::from_str(json).expect("deserialize");
    assert!(summary.overlap.is_none());
    assert!(!summary.has_warnings());
    assert_eq!(summary.pruned_columns, vec!["123".to_string()]);
}
