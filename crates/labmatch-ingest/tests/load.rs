//! File-based tests for loading the three extracts.

use std::fs;
use std::path::Path;

use chrono::NaiveDate;
use labmatch_ingest::{IngestError, SourcePaths, SourceTable, load_sources};
use labmatch_model::SourceColumns;
use tempfile::TempDir;

const COHORT: &str = "\
patient_id,reference_date,sex
P1,10-Jan-20,F
P2,01-Jun-21,M
P3,15-Mar-21,F
";

const LABS: &str = "\
patient_id,collection_date,test_type_code,test_type_description,result_text
P1,2020-01-05,A1C,HbA1c,6.5
P1,2020-06-01,A1C,HbA1c,7.0
P2,2021-06-03T09:15:00,007,,12
P9,2021-01-01,GLU,Glucose,5.2
";

const CANCER: &str = "\
patient_id,diagnosis_date,icd10_code,icd10_description,morphology,behaviour,stage
P1,2019-11-02,C18,Malignant neoplasm of colon,8140,3,II
";

fn write_sources(dir: &Path, cohort: &str, labs: &str, cancer: &str) -> SourcePaths {
    let paths = SourcePaths::new(
        dir.join("cohort.csv"),
        dir.join("labs.csv"),
        dir.join("cancer.csv"),
    );
    fs::write(&paths.cohort, cohort).unwrap();
    fs::write(&paths.labs, labs).unwrap();
    fs::write(&paths.cancer, cancer).unwrap();
    paths
}

#[test]
fn loads_all_three_extracts() {
    let dir = TempDir::new().unwrap();
    let paths = write_sources(dir.path(), COHORT, LABS, CANCER);
    let loaded = load_sources(&paths, &SourceColumns::default()).unwrap();

    assert_eq!(loaded.cohort.len(), 3);
    assert_eq!(
        loaded.cohort[1].reference_date,
        NaiveDate::from_ymd_opt(2021, 6, 1).unwrap()
    );
    assert_eq!(loaded.labs.len(), 4);
    // Codes are read as text, leading zeros intact.
    assert_eq!(loaded.labs.observations[2].code().as_str(), "007");
    assert_eq!(
        loaded.labs.observations[2].collection_date,
        NaiveDate::from_ymd_opt(2021, 6, 3)
    );
    assert_eq!(loaded.cancer.len(), 1);

    assert_eq!(loaded.overlap.labs.shared_patients, 2);
    assert_eq!(loaded.overlap.cancer.shared_patients, 1);
}

#[test]
fn fingerprint_ignores_unused_columns_but_tracks_values() {
    let dir = TempDir::new().unwrap();
    let paths = write_sources(dir.path(), COHORT, LABS, CANCER);
    let first = load_sources(&paths, &SourceColumns::default()).unwrap();

    let widened = COHORT
        .replace(",sex\n", ",sex,site\n")
        .replace(",F\n", ",F,x\n")
        .replace(",M\n", ",M,y\n");
    let paths = write_sources(dir.path(), &widened, LABS, CANCER);
    let second = load_sources(&paths, &SourceColumns::default()).unwrap();
    assert_eq!(first.fingerprint, second.fingerprint);

    let changed = LABS.replace("6.5", "6.6");
    let paths = write_sources(dir.path(), COHORT, &changed, CANCER);
    let third = load_sources(&paths, &SourceColumns::default()).unwrap();
    assert_ne!(first.fingerprint.combined, third.fingerprint.combined);
    assert_eq!(first.fingerprint.cohort, third.fingerprint.cohort);
}

#[test]
fn empty_and_header_only_files() {
    let dir = TempDir::new().unwrap();
    let paths = write_sources(
        dir.path(),
        "patient_id,reference_date\n",
        "",
        "patient_id,diagnosis_date,icd10_code,icd10_description,morphology,behaviour,stage\n",
    );
    let loaded = load_sources(&paths, &SourceColumns::default()).unwrap();
    assert!(loaded.cohort.is_empty());
    assert!(loaded.labs.is_empty());
    assert!(loaded.cancer.is_empty());
    assert_eq!(loaded.overlap.labs.percent_of_cohort, 0.0);
}

#[test]
fn header_only_file_is_still_schema_checked() {
    let dir = TempDir::new().unwrap();
    let paths = write_sources(dir.path(), "patient_id,index_date\n", LABS, CANCER);
    let err = load_sources(&paths, &SourceColumns::default()).unwrap_err();
    match err {
        IngestError::MissingColumn { table, column, .. } => {
            assert_eq!(table, SourceTable::Cohort);
            assert_eq!(column, "reference_date");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn missing_cancer_column_names_table_and_column() {
    let dir = TempDir::new().unwrap();
    let cancer = "patient_id,diagnosis_date,icd10_code\nP1,2019-11-02,C18\n";
    let paths = write_sources(dir.path(), COHORT, LABS, cancer);
    let err = load_sources(&paths, &SourceColumns::default()).unwrap_err();
    assert_eq!(err.kind(), "SchemaError");
    assert_eq!(err.table(), Some(SourceTable::Cancer));
    assert!(err.to_string().contains("icd10_description"));
}

#[test]
fn configured_column_names_are_used() {
    let dir = TempDir::new().unwrap();
    let cohort = "PatientID,IndexDate\nP1,10-Jan-20\n";
    let paths = write_sources(dir.path(), cohort, LABS, CANCER);
    let mut columns = SourceColumns::default();
    columns.cohort.patient_id = "PatientID".to_string();
    columns.cohort.reference_date = "indexdate".to_string();
    let loaded = load_sources(&paths, &columns).unwrap();
    assert_eq!(loaded.cohort.len(), 1);
}

#[test]
fn bad_reference_date_reports_row() {
    let dir = TempDir::new().unwrap();
    let cohort = "patient_id,reference_date\nP1,10-Jan-20\nP2,2020/01/10\n";
    let paths = write_sources(dir.path(), cohort, LABS, CANCER);
    let err = load_sources(&paths, &SourceColumns::default()).unwrap_err();
    match err {
        IngestError::DateParse { row, value, .. } => {
            assert_eq!(row, 2);
            assert_eq!(value, "2020/01/10");
        }
        other => panic!("unexpected error: {other}"),
    }
}
