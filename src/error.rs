//! Kernel Errors
//!
//! Every fallible kernel function returns [`KernelResult`]. The variants follow the classification of
//! invalid inputs: range, normalization and shape violations of probability data,
//! division by the zero polynomial, inconsistent information values, malformed bit strings
//! and structurally impossible parameters.
//!

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum KernelError {
    /// a probability outside of `[0, 1]`
    #[error("probability {value} at index {index} is outside of [0, 1]")]
    OutOfRange { index: usize, value: f64 },

    /// a probability vector whose sum is not 1 within tolerance; see [`crate::probability::normalize`]
    #[error("probabilities sum to {sum}, deviating from 1 by more than {tolerance}")]
    Normalization { sum: f64, tolerance: f64 },

    /// a violation found in one row of a matrix
    #[error("row {row}: {source}")]
    InRow {
        row: usize,
        #[source]
        source: Box<KernelError>,
    },

    /// inconsistent row lengths, or dimensions that do not match the declared ones
    #[error("shape mismatch: {0}")]
    ShapeMismatch(String),

    #[error("division by the zero polynomial")]
    DivisionByZero,

    /// an entropy-like quantity evaluated meaningfully below zero
    #[error("{quantity} evaluated to {value}, below -{tolerance}; the inputs are inconsistent")]
    NegativeInformation {
        quantity: &'static str,
        value: f64,
        tolerance: f64,
    },

    #[error("invalid bit {character:?} at position {position}, expected '0' or '1'")]
    InvalidBit { position: usize, character: char },

    #[error("invalid parameter: {0}")]
    InvalidParameter(String),
}

impl KernelError {
    pub fn in_row(row: usize, error: KernelError) -> Self {
        Self::InRow {
            row,
            source: Box::new(error),
        }
    }

    /// the innermost error, skipping the row context
    pub fn root(&self) -> &KernelError {
        match self {
            Self::InRow { source, .. } => source.root(),
            other => other,
        }
    }
}

pub type KernelResult<T> = Result<T, KernelError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kernel_error_row_context_message() {
        // cargo test kernel_error_row_context_message -- --nocapture
        let error = KernelError::in_row(2, KernelError::OutOfRange { index: 1, value: 1.5 });
        println!("{error}");
        assert_eq!(error.to_string(), "row 2: probability 1.5 at index 1 is outside of [0, 1]");
        assert_eq!(error.root(), &KernelError::OutOfRange { index: 1, value: 1.5 });
    }
}
