#![deny(unsafe_code)]

use std::fmt;

use crate::ModelError;

/// Opaque patient key shared by the cohort, lab and cancer extracts.
#[derive(
    Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
pub struct PatientId(String);

impl PatientId {
    pub fn new(value: impl Into<String>) -> Result<Self, ModelError> {
        let value = value.into();
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(ModelError::BlankPatientId);
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Row identifier for the `ordinal`-th same-type lab event of this patient.
    ///
    /// Ordinals are 1-based: `P1` with ordinal 2 becomes `P1_2`.
    pub fn with_ordinal(&self, ordinal: usize) -> String {
        format!("{}_{ordinal}", self.0)
    }
}

impl fmt::Display for PatientId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Categorical key of a kind of laboratory measurement.
///
/// Matrix columns are named after these codes.
#[derive(
    Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
pub struct TestTypeCode(String);

impl TestTypeCode {
    pub fn new(value: impl Into<String>) -> Result<Self, ModelError> {
        let value = value.into();
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(ModelError::BlankTestTypeCode);
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// True when the code is made of ASCII digits only (`"1234"`).
    ///
    /// Such codes have no descriptive counterpart and are pruned from the
    /// matrices by default.
    pub fn is_digit_only(&self) -> bool {
        !self.0.is_empty() && self.0.bytes().all(|b| b.is_ascii_digit())
    }
}

impl fmt::Display for TestTypeCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A test type code tagged with its optional human-readable label.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct TestType {
    pub code: TestTypeCode,
    pub label: Option<String>,
}

impl TestType {
    pub fn new(code: TestTypeCode, label: Option<String>) -> Self {
        let label = label
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty());
        Self { code, label }
    }
}
