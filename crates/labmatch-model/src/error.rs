use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ModelError {
    #[error("patient id must not be blank")]
    BlankPatientId,
    #[error("test type code must not be blank")]
    BlankTestTypeCode,
    #[error("invalid patient limit '{0}': expected a positive integer or 'unbounded'")]
    InvalidPatientLimit(String),
}

pub type Result<T> = std::result::Result<T, ModelError>;
