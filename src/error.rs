//! Error taxonomy shared by every table operation
//!
//! All checks run before any output is built, so a failed call never leaves
//! a partially transformed table behind. Nothing here is retried: every
//! operation is a deterministic function of its inputs.

use thiserror::Error;

/// Errors raised by windowing, squashing, splitting, dedup and alignment
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SignalError {
    /// Unsupported policy name, incompatible mode combination or out-of-range parameter
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// A column required by the operation is absent from the input table
    #[error("Missing column: {0}")]
    MissingColumn(String),

    /// Input data is incomplete where the operation needs complete data
    #[error("Data quality error: {0}")]
    DataQuality(String),
}

impl SignalError {
    pub(crate) fn invalid(msg: impl Into<String>) -> Self {
        SignalError::InvalidArgument(msg.into())
    }

    pub(crate) fn missing_column(name: impl Into<String>) -> Self {
        SignalError::MissingColumn(name.into())
    }
}

/// Result type for signal operations
pub type Result<T> = std::result::Result<T, SignalError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        assert_eq!(
            SignalError::invalid("bad method").to_string(),
            "Invalid argument: bad method"
        );
        assert_eq!(
            SignalError::missing_column("pid").to_string(),
            "Missing column: pid"
        );
        assert_eq!(
            SignalError::DataQuality("NaN".into()).to_string(),
            "Data quality error: NaN"
        );
    }
}
