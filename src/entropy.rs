//! Source Entropy
//!
//! Entropies in bits. Zero-probability symbols contribute nothing, `log2(0)` is never evaluated.
//! These functions assume validated inputs, see [`crate::probability`].
//!

use crate::error::*;
use crate::util::*;

/// `-sum p log2 p` over the nonzero entries
pub fn entropy(probabilities: &[Probability]) -> f64 {
    probabilities
        .iter()
        .filter(|&&p| p > 0.0)
        .map(|&p| -p * p.log2())
        .sum()
}

/// entropy of the uniform source over `symbols` symbols
pub fn max_entropy(symbols: usize) -> f64 {
    if symbols == 0 {
        return 0.0;
    }
    (symbols as f64).log2()
}

/// relative redundancy `1 - H / H_max`; a source of a single symbol has none
pub fn redundancy(probabilities: &[Probability]) -> f64 {
    let maximum = max_entropy(probabilities.len());
    if maximum == 0.0 {
        return 0.0;
    }
    1.0 - entropy(probabilities) / maximum
}

/// entropy of a joint distribution given as a matrix
pub fn joint_entropy(joint: &[Vec<Probability>]) -> f64 {
    joint.iter().map(|row| entropy(row)).sum()
}

/// `py[j] = sum_i px[i] pyx[i][j]`
pub fn output_distribution(px: &[Probability], pyx: &[Vec<Probability>]) -> KernelResult<ProbabilityVector> {
    if px.len() != pyx.len() {
        return Err(KernelError::ShapeMismatch(format!(
            "{} input probabilities for a channel of {} inputs",
            px.len(),
            pyx.len()
        )));
    }
    let outputs = pyx.first().map(|row| row.len()).unwrap_or(0);
    let mut py = vec![0.0; outputs];
    for (row, (&p, probabilities)) in px.iter().zip(pyx.iter()).enumerate() {
        if probabilities.len() != outputs {
            return Err(KernelError::ShapeMismatch(format!(
                "row {row} has {} entries, expected {outputs}",
                probabilities.len()
            )));
        }
        for (j, &q) in probabilities.iter().enumerate() {
            py[j] += p * q;
        }
    }
    Ok(py)
}

/// the noise entropy `H(Y|X) = sum_i px[i] H(pyx[i])`
pub fn conditional_entropy(px: &[Probability], pyx: &[Vec<Probability>]) -> KernelResult<f64> {
    if px.len() != pyx.len() {
        return Err(KernelError::ShapeMismatch(format!(
            "{} input probabilities for a channel of {} inputs",
            px.len(),
            pyx.len()
        )));
    }
    Ok(px.iter().zip(pyx.iter()).map(|(&p, row)| p * entropy(row)).sum())
}

/// accept values down to `-strict_tolerance` as floating-point noise and clamp them to zero;
/// anything more negative means the inputs are inconsistent
pub fn clamp_information(quantity: &'static str, value: f64, config: &KernelConfig) -> KernelResult<f64> {
    if value >= 0.0 {
        return Ok(value);
    }
    if value < -config.strict_tolerance {
        return Err(KernelError::NegativeInformation {
            quantity,
            value,
            tolerance: config.strict_tolerance,
        });
    }
    if value < -config.rounding_tolerance {
        tracing::warn!("{quantity} evaluated to {value}, clamped to 0");
    } else {
        tracing::debug!("{quantity} evaluated to {value}, clamped to 0");
    }
    Ok(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::probability::*;
    use more_asserts::*;
    use rand::prelude::*;

    #[test]
    fn entropy_boundaries() {
        // cargo test entropy_boundaries -- --nocapture
        assert_eq!(entropy(&[1.0]), 0.0);
        assert_eq!(entropy(&[0.5, 0.5]), 1.0);
        assert_eq!(entropy(&[0.25; 4]), 2.0);
        assert_eq!(entropy(&[0.0, 1.0, 0.0]), 0.0);
        assert_eq!(entropy(&[]), 0.0);
        assert!((entropy(&[0.1, 0.9]) - 0.4689955935892812).abs() < 1e-12);
    }

    #[test]
    fn entropy_is_bounded_by_max_entropy() {
        // cargo test entropy_is_bounded_by_max_entropy -- --nocapture
        let mut rng = SmallRng::seed_from_u64(1);
        for _ in 0..500 {
            let n = rng.gen_range(1..20);
            let weights: Vec<f64> = (0..n).map(|_| rng.gen_range(0.0..1.0)).collect();
            let Ok(p) = normalize(&weights) else { continue };
            let h = entropy(&p);
            assert_ge!(h, 0.0);
            assert_le!(h, max_entropy(n) + 1e-12);
            if !is_uniform(&p, 1e-9) {
                assert_lt!(h, max_entropy(n));
            }
        }
        for n in 1..20 {
            assert!((entropy(&uniform(n)) - max_entropy(n)).abs() < 1e-12);
        }
    }

    #[test]
    fn entropy_redundancy() {
        // cargo test entropy_redundancy -- --nocapture
        assert_eq!(redundancy(&[0.5, 0.5]), 0.0);
        assert_eq!(redundancy(&[1.0]), 0.0);
        assert_eq!(redundancy(&[1.0, 0.0]), 1.0);
        assert!((redundancy(&[0.5, 0.25, 0.25, 0.0]) - 0.25).abs() < 1e-12);
    }

    #[test]
    fn entropy_of_channel_quantities() {
        // cargo test entropy_of_channel_quantities -- --nocapture
        let px = vec![0.5, 0.5];
        let pyx = vec![vec![0.9, 0.1], vec![0.1, 0.9]];
        let py = output_distribution(&px, &pyx).unwrap();
        assert!((py[0] - 0.5).abs() < 1e-12 && (py[1] - 0.5).abs() < 1e-12);
        let noise = conditional_entropy(&px, &pyx).unwrap();
        assert!((noise - entropy(&[0.1, 0.9])).abs() < 1e-12);
        // independent joint distribution adds entropies
        let joint = vec![vec![0.25, 0.25], vec![0.25, 0.25]];
        assert_eq!(joint_entropy(&joint), 2.0);
        assert!(output_distribution(&[1.0], &pyx).is_err());
        assert!(conditional_entropy(&[1.0], &pyx).is_err());
        assert!(output_distribution(&px, &[vec![1.0], vec![0.5, 0.5]]).is_err());
    }

    #[test]
    fn entropy_clamp_information() {
        // cargo test entropy_clamp_information -- --nocapture
        let config = KernelConfig::default();
        assert_eq!(clamp_information("I(X;Y)", 0.3, &config).unwrap(), 0.3);
        assert_eq!(clamp_information("I(X;Y)", -1e-12, &config).unwrap(), 0.0);
        assert_eq!(clamp_information("I(X;Y)", -1e-8, &config).unwrap(), 0.0);
        assert_eq!(
            clamp_information("I(X;Y)", -0.01, &config),
            Err(KernelError::NegativeInformation {
                quantity: "I(X;Y)",
                value: -0.01,
                tolerance: STRICT_TOLERANCE
            })
        );
    }
}
