//! Validation Error Types

use thiserror::Error;

/// Errors raised when assembling input from an untrusted caller
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    /// Score outside the allowed range
    #[error("{field} value {value} is out of range [{min}, {max}]")]
    OutOfRange {
        field: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },

    /// Score is NaN or infinite
    #[error("{field} value {value} is not a finite number")]
    NotFinite { field: &'static str, value: f64 },
}
