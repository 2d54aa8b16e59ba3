//! Markov Source
//!
//! Stationary distribution and entropy rate of a first-order Markov source given by its
//! row-stochastic transition matrix `P[i][j] = P(X_{t+1} = j | X_t = i)`.
//!

use crate::entropy::*;
use crate::error::*;
use crate::probability::*;
use crate::util::*;
use serde::Serialize;

/// power iteration from the uniform distribution, `config.stationary_iterations` left
/// multiplications with renormalization; there is no convergence check, so periodic chains
/// return the iterate reached at that point
pub fn stationary_distribution(transition: &[Vec<Probability>]) -> KernelResult<ProbabilityVector> {
    stationary_distribution_config(transition, &KernelConfig::default())
}

pub fn stationary_distribution_config(
    transition: &[Vec<Probability>],
    config: &KernelConfig,
) -> KernelResult<ProbabilityVector> {
    let states = validate_square_stochastic(transition, config.strict_tolerance)?;
    let mut distribution = uniform(states);
    for iteration in 0..config.stationary_iterations {
        let mut next = vec![0.0; states];
        for (from, &weight) in distribution.iter().enumerate() {
            for (to, &p) in transition[from].iter().enumerate() {
                next[to] += weight * p;
            }
        }
        let next = normalize(&next)?;
        let change: f64 = next.iter().zip(distribution.iter()).map(|(a, b)| (a - b).abs()).sum();
        tracing::trace!("power iteration {iteration}: L1 change {change}");
        distribution = next;
    }
    tracing::debug!("stationary distribution after {} iterations: {distribution:?}", config.stationary_iterations);
    Ok(distribution)
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MarkovEntropy {
    pub stationary: ProbabilityVector,
    /// entropy rate `H(X_{t+1} | X_t)`
    pub entropy_rate: f64,
    /// `H(pi)`, the entropy of a memoryless source with the same marginal
    pub stationary_entropy: f64,
    /// `1 - entropy_rate / H(pi)`, zero when `H(pi)` is zero
    pub redundancy: f64,
    /// `H(pi) - entropy_rate`, bits per symbol saved by exploiting the memory;
    /// negative when `stationary` is an iterate that has not converged, e.g. of a periodic chain
    pub memory_gain: f64,
}

pub fn entropy_rate(transition: &[Vec<Probability>]) -> KernelResult<MarkovEntropy> {
    entropy_rate_config(transition, &KernelConfig::default())
}

pub fn entropy_rate_config(transition: &[Vec<Probability>], config: &KernelConfig) -> KernelResult<MarkovEntropy> {
    let stationary = stationary_distribution_config(transition, config)?;
    let rate = conditional_entropy(&stationary, transition)?;
    let stationary_entropy = entropy(&stationary);
    let mut memory_gain = stationary_entropy - rate;
    if memory_gain < -config.strict_tolerance {
        tracing::warn!(
            "memory gain {memory_gain} is negative, the power iteration has not converged after {} iterations",
            config.stationary_iterations
        );
    } else if memory_gain < 0.0 {
        memory_gain = 0.0;
    }
    let redundancy = if stationary_entropy > 0.0 {
        memory_gain / stationary_entropy
    } else {
        0.0
    };
    Ok(MarkovEntropy {
        stationary,
        entropy_rate: rate,
        stationary_entropy,
        redundancy,
        memory_gain,
    })
}
