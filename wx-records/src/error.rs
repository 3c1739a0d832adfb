//! Parse failures for a single input line.

use thiserror::Error;

/// Why one line of an input file could not be turned into a record.
///
/// Every variant means the whole line is rejected; callers decide whether
/// that aborts the file or only skips the line.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("expected {expected} fields, found {found}")]
    FieldCount { expected: usize, found: usize },

    #[error("invalid date '{value}' (expected YYYYMMDD)")]
    InvalidDate { value: String },

    #[error("invalid integer for {field}: '{value}'")]
    InvalidNumber { field: &'static str, value: String },

    #[error("line is not valid UTF-8")]
    InvalidEncoding,
}
