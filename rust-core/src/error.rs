//! Error types shared by the transform and filter engines

use thiserror::Error;

/// Result alias used throughout the crate
pub type DspResult<T> = Result<T, DspError>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum DspError {
    /// Malformed shapes, lengths or out-of-range parameters.
    /// Always raised before any computation starts.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Degenerate normalization (e.g. a zero leading denominator coefficient)
    #[error("Division by zero: {0}")]
    DivisionByZero(String),

    /// Root finding did not converge or produced implausible roots
    #[error("Numerical instability: {0}")]
    NumericalInstability(String),
}

impl DspError {
    pub(crate) fn invalid(message: impl Into<String>) -> Self {
        DspError::InvalidArgument(message.into())
    }
}
