//! Content fingerprint of the normalized inputs.
//!
//! Two loads with equal fingerprints produce identical analysis results for
//! identical options, whatever the files' timestamps say.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use labmatch_model::{CancerTable, CohortPatient, LabObservation};

/// Bumped whenever normalization changes what a fingerprint covers.
pub const FINGERPRINT_VERSION: &str = "labmatch-fingerprint-v1";

const FIELD_SEP: u8 = 0x1f;
const ROW_SEP: u8 = 0x1e;

/// Digest of one normalized table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableFingerprint {
    pub rows: usize,
    pub sha256: String,
}

/// Digests of the three inputs plus a combined digest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputFingerprint {
    pub version: String,
    pub cohort: TableFingerprint,
    pub labs: TableFingerprint,
    pub cancer: TableFingerprint,
    pub combined: String,
}

struct TableHasher {
    hasher: Sha256,
    rows: usize,
}

impl TableHasher {
    fn new(schema: &[&str]) -> Self {
        let mut hasher = Sha256::new();
        for name in schema {
            hasher.update(name.as_bytes());
            hasher.update([FIELD_SEP]);
        }
        hasher.update([ROW_SEP]);
        Self { hasher, rows: 0 }
    }

    fn row<'a>(&mut self, fields: impl IntoIterator<Item = &'a str>) {
        for field in fields {
            self.hasher.update(field.as_bytes());
            self.hasher.update([FIELD_SEP]);
        }
        self.hasher.update([ROW_SEP]);
        self.rows += 1;
    }

    fn finish(mut self) -> TableFingerprint {
        self.hasher.update(self.rows.to_le_bytes());
        TableFingerprint {
            rows: self.rows,
            sha256: hex::encode(self.hasher.finalize()),
        }
    }
}

fn cohort_fingerprint(cohort: &[CohortPatient]) -> TableFingerprint {
    let mut table = TableHasher::new(&["patient_id", "reference_date"]);
    for patient in cohort {
        let date = patient.reference_date.to_string();
        table.row([patient.patient_id.as_str(), date.as_str()]);
    }
    table.finish()
}

fn labs_fingerprint(labs: &[LabObservation]) -> TableFingerprint {
    let mut table = TableHasher::new(&[
        "patient_id",
        "collection_date",
        "test_type_code",
        "test_type_description",
        "result_text",
    ]);
    for lab in labs {
        let date = lab
            .collection_date
            .map(|d| d.to_string())
            .unwrap_or_default();
        table.row([
            lab.patient_id.as_str(),
            date.as_str(),
            lab.code().as_str(),
            lab.description().unwrap_or_default(),
            lab.result_text.as_str(),
        ]);
    }
    table.finish()
}

fn cancer_fingerprint(cancer: &CancerTable) -> TableFingerprint {
    let schema: Vec<&str> = cancer.headers.iter().map(String::as_str).collect();
    let mut table = TableHasher::new(&schema);
    for row in &cancer.rows {
        table.row(row.iter().map(String::as_str));
    }
    table.finish()
}

/// Fingerprint the three normalized tables.
pub fn fingerprint_inputs(
    cohort: &[CohortPatient],
    labs: &[LabObservation],
    cancer: &CancerTable,
) -> InputFingerprint {
    let cohort = cohort_fingerprint(cohort);
    let labs = labs_fingerprint(labs);
    let cancer = cancer_fingerprint(cancer);

    let mut hasher = Sha256::new();
    hasher.update(FINGERPRINT_VERSION.as_bytes());
    for part in [&cohort, &labs, &cancer] {
        hasher.update([FIELD_SEP]);
        hasher.update(part.sha256.as_bytes());
    }
    InputFingerprint {
        version: FINGERPRINT_VERSION.to_string(),
        cohort,
        labs,
        cancer,
        combined: hex::encode(hasher.finalize()),
    }
}
