//! Error types for the marshaling layer
//!
//! Only recoverable failures live here. Contract violations (a null base
//! pointer with a positive declared length, disposing a null instance
//! pointer) are panics: they indicate a bug in the caller, not bad data.

use thiserror::Error;

use crate::core::time::Timestamp;

/// Errors raised while converting between native collections and flat structs
#[derive(Debug, Error)]
pub enum InteropError {
    #[error("Duplicate key '{key}': names must be unique to build a key-unique mapping")]
    DuplicateKey { key: String },

    #[error("Malformed timestamp {0}: not a valid calendar date and time of day")]
    MalformedTimestamp(Timestamp),

    #[error("Cannot parse '{input}' as a naive date-time (time zone offsets are not supported)")]
    UnparsableTimestamp { input: String },

    #[error("String at index {index} contains an interior NUL byte")]
    InteriorNul { index: usize },

    #[error("String at index {index} is not valid UTF-8")]
    InvalidUtf8 { index: usize },

    #[error("Length mismatch for {what}: expected {expected}, got {actual}")]
    LengthMismatch {
        what: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error("Negative length {len} declared for {what}")]
    NegativeLength { what: &'static str, len: i32 },

    #[error("Length {len} of {what} does not fit the flat struct's size field")]
    LengthOverflow { what: &'static str, len: usize },

    #[error("Step {index} of the time series lies outside the representable calendar range")]
    TimeIndexOutOfRange { index: usize },

    #[error("Invalid time step code {0}: expected 0 (strictly regular) or 1 (monthly)")]
    InvalidTimeStepCode(i32),

    #[error("Monthly time steps require a start day of month at most 28, got {day}")]
    UnsupportedMonthlyStart { day: u32 },

    #[error("Invalid statistic specification: {0}")]
    Spec(#[from] serde_json::Error),
}

/// Result alias used throughout the crate
pub type Result<T> = std::result::Result<T, InteropError>;
