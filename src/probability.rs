//! Probability Validation
//!
//! Range, normalization and shape checks for probability vectors and row-stochastic matrices.
//! Renormalization is offered through [`normalize`] but never applied implicitly.
//!

use crate::error::*;
use crate::util::*;

pub fn validate_probability_vector(probabilities: &[Probability], tolerance: f64) -> KernelResult<()> {
    for (index, &value) in probabilities.iter().enumerate() {
        if !(0.0..=1.0).contains(&value) {
            return Err(KernelError::OutOfRange { index, value });
        }
    }
    let sum: f64 = probabilities.iter().sum();
    if (sum - 1.0).abs() > tolerance {
        return Err(KernelError::Normalization { sum, tolerance });
    }
    Ok(())
}

/// every row a probability vector of the same length
pub fn validate_stochastic_rows(rows: &[Vec<Probability>], tolerance: f64) -> KernelResult<usize> {
    let columns = match rows.first() {
        Some(first) => first.len(),
        None => return Err(KernelError::ShapeMismatch("matrix has no rows".to_string())),
    };
    for (row, probabilities) in rows.iter().enumerate() {
        if probabilities.len() != columns {
            return Err(KernelError::ShapeMismatch(format!(
                "row {row} has {} entries, expected {columns}",
                probabilities.len()
            )));
        }
        validate_probability_vector(probabilities, tolerance).map_err(|error| KernelError::in_row(row, error))?;
    }
    Ok(columns)
}

/// a channel matrix with the declared number of input (rows) and output (columns) symbols
pub fn validate_channel_matrix(
    rows: &[Vec<Probability>],
    inputs: usize,
    outputs: usize,
    tolerance: f64,
) -> KernelResult<()> {
    if rows.len() != inputs {
        return Err(KernelError::ShapeMismatch(format!(
            "{} rows for {inputs} input symbols",
            rows.len()
        )));
    }
    let columns = validate_stochastic_rows(rows, tolerance)?;
    if columns != outputs {
        return Err(KernelError::ShapeMismatch(format!(
            "{columns} columns for {outputs} output symbols"
        )));
    }
    Ok(())
}

pub fn validate_square_stochastic(rows: &[Vec<Probability>], tolerance: f64) -> KernelResult<usize> {
    let columns = validate_stochastic_rows(rows, tolerance)?;
    if columns != rows.len() {
        return Err(KernelError::ShapeMismatch(format!(
            "transition matrix must be square, got {} x {columns}",
            rows.len()
        )));
    }
    Ok(columns)
}

/// scale non-negative weights to sum to one
pub fn normalize(weights: &[f64]) -> KernelResult<ProbabilityVector> {
    for (index, &value) in weights.iter().enumerate() {
        if !(value >= 0.0 && value.is_finite()) {
            return Err(KernelError::OutOfRange { index, value });
        }
    }
    let sum: f64 = weights.iter().sum();
    if sum <= 0.0 {
        return Err(KernelError::Normalization { sum, tolerance: 0.0 });
    }
    Ok(weights.iter().map(|value| value / sum).collect())
}

pub fn uniform(n: usize) -> ProbabilityVector {
    vec![1.0 / n as f64; n]
}

pub fn is_uniform(probabilities: &[Probability], tolerance: f64) -> bool {
    let expected = 1.0 / probabilities.len() as f64;
    probabilities.iter().all(|p| (p - expected).abs() <= tolerance)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn probability_vector_validation() {
        // cargo test probability_vector_validation -- --nocapture
        assert!(validate_probability_vector(&[0.25, 0.75], STRICT_TOLERANCE).is_ok());
        assert!(validate_probability_vector(&[0.1, 0.2, 0.7 + 1e-8], STRICT_TOLERANCE).is_ok());
        assert_eq!(
            validate_probability_vector(&[1.2, -0.2], STRICT_TOLERANCE),
            Err(KernelError::OutOfRange { index: 0, value: 1.2 })
        );
        assert!(matches!(
            validate_probability_vector(&[0.3, 0.3], STRICT_TOLERANCE),
            Err(KernelError::Normalization { .. })
        ));
        assert!(matches!(
            validate_probability_vector(&[f64::NAN, 1.0], STRICT_TOLERANCE),
            Err(KernelError::OutOfRange { index: 0, .. })
        ));
    }

    #[test]
    fn probability_channel_matrix_validation() {
        // cargo test probability_channel_matrix_validation -- --nocapture
        let rows = vec![vec![0.9, 0.1], vec![0.2, 0.8]];
        assert!(validate_channel_matrix(&rows, 2, 2, STRICT_TOLERANCE).is_ok());
        assert!(matches!(
            validate_channel_matrix(&rows, 3, 2, STRICT_TOLERANCE),
            Err(KernelError::ShapeMismatch(_))
        ));
        assert!(matches!(
            validate_channel_matrix(&rows, 2, 3, STRICT_TOLERANCE),
            Err(KernelError::ShapeMismatch(_))
        ));
        let ragged = vec![vec![0.9, 0.1], vec![1.0]];
        assert!(matches!(
            validate_stochastic_rows(&ragged, STRICT_TOLERANCE),
            Err(KernelError::ShapeMismatch(_))
        ));
        let unnormalized = vec![vec![0.9, 0.1], vec![0.5, 0.6]];
        let error = validate_stochastic_rows(&unnormalized, STRICT_TOLERANCE).unwrap_err();
        assert!(matches!(error, KernelError::InRow { row: 1, .. }));
        assert!(matches!(error.root(), KernelError::Normalization { .. }));
        assert!(validate_square_stochastic(&[vec![0.5, 0.5]], STRICT_TOLERANCE).is_err());
        assert!(validate_stochastic_rows(&[], STRICT_TOLERANCE).is_err());
    }

    #[test]
    fn probability_normalize() {
        // cargo test probability_normalize -- --nocapture
        assert_eq!(normalize(&[1.0, 3.0]).unwrap(), vec![0.25, 0.75]);
        assert!(normalize(&[0.0, 0.0]).is_err());
        assert!(normalize(&[1.0, -1.0]).is_err());
        assert!(is_uniform(&uniform(4), 1e-12));
        assert!(!is_uniform(&[0.4, 0.6], 1e-12));
    }
}
