//! Discrete Memoryless Channel
//!
//! A channel is given by its matrix P(Y|X), one row per input symbol. This module computes the
//! transinformation I(X;Y) and related entropies, the channel capacity (the uniform-input
//! approximation and the Blahut-Arimoto iteration), and the decision tables of the maximum
//! likelihood, maximum a posteriori and minimum cost decoders together with their error probability.
//!

use crate::entropy::*;
use crate::error::*;
use crate::probability::*;
use crate::util::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// a validated channel matrix P(Y|X)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "ProbabilityMatrix", into = "ProbabilityMatrix")]
pub struct ChannelMatrix {
    rows: ProbabilityMatrix,
}

impl ChannelMatrix {
    pub fn new(rows: ProbabilityMatrix) -> KernelResult<Self> {
        Self::new_config(rows, &KernelConfig::default())
    }

    pub fn new_config(rows: ProbabilityMatrix, config: &KernelConfig) -> KernelResult<Self> {
        validate_stochastic_rows(&rows, config.strict_tolerance)?;
        Ok(Self { rows })
    }

    /// with the number of input and output symbols fixed beforehand
    pub fn new_shaped(rows: ProbabilityMatrix, inputs: usize, outputs: usize, config: &KernelConfig) -> KernelResult<Self> {
        validate_channel_matrix(&rows, inputs, outputs, config.strict_tolerance)?;
        Ok(Self { rows })
    }

    /// the binary symmetric channel with crossover probability `epsilon`
    pub fn binary_symmetric(epsilon: Probability) -> KernelResult<Self> {
        Self::new(vec![vec![1.0 - epsilon, epsilon], vec![epsilon, 1.0 - epsilon]])
    }

    pub fn inputs(&self) -> usize {
        self.rows.len()
    }

    pub fn outputs(&self) -> usize {
        self.rows[0].len()
    }

    /// P(y = output | x = input)
    pub fn get(&self, input: SymbolIndex, output: SymbolIndex) -> Probability {
        self.rows[input][output]
    }

    pub fn rows(&self) -> &ProbabilityMatrix {
        &self.rows
    }

    /// every row is a permutation of the first row and every column a permutation of the first column,
    /// in which case the uniform input achieves capacity
    pub fn is_symmetric(&self, tolerance: f64) -> bool {
        let sorted = |mut values: Vec<f64>| {
            values.sort_by(f64::total_cmp);
            values
        };
        let same = |a: &[f64], b: &[f64]| a.iter().zip(b.iter()).all(|(x, y)| (x - y).abs() <= tolerance);
        let first_row = sorted(self.rows[0].clone());
        let column = |j: usize| sorted(self.rows.iter().map(|row| row[j]).collect());
        let first_column = column(0);
        self.rows.iter().all(|row| same(&sorted(row.clone()), &first_row))
            && (0..self.outputs()).all(|j| same(&column(j), &first_column))
    }

    fn check_priors(&self, priors: &[Probability], config: &KernelConfig) -> KernelResult<()> {
        if priors.len() != self.inputs() {
            return Err(KernelError::ShapeMismatch(format!(
                "{} input probabilities for a channel of {} inputs",
                priors.len(),
                self.inputs()
            )));
        }
        validate_probability_vector(priors, config.strict_tolerance)
    }
}

impl TryFrom<ProbabilityMatrix> for ChannelMatrix {
    type Error = KernelError;
    fn try_from(rows: ProbabilityMatrix) -> KernelResult<Self> {
        Self::new(rows)
    }
}

impl From<ChannelMatrix> for ProbabilityMatrix {
    fn from(channel: ChannelMatrix) -> ProbabilityMatrix {
        channel.rows
    }
}

/// `I(X;Y) = H(Y) - H(Y|X)`
pub fn mutual_information(px: &[Probability], channel: &ChannelMatrix) -> KernelResult<f64> {
    mutual_information_config(px, channel, &KernelConfig::default())
}

pub fn mutual_information_config(px: &[Probability], channel: &ChannelMatrix, config: &KernelConfig) -> KernelResult<f64> {
    channel.check_priors(px, config)?;
    let py = output_distribution(px, channel.rows())?;
    let information = entropy(&py) - conditional_entropy(px, channel.rows())?;
    clamp_information("mutual information", information, config)
}

/// the mutual information under the uniform input distribution; this is the capacity only for
/// symmetric channels such as the BSC, otherwise a lower bound
pub fn channel_capacity_approx(channel: &ChannelMatrix) -> KernelResult<f64> {
    mutual_information(&uniform(channel.inputs()), channel)
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CapacityEstimate {
    pub capacity: f64,
    /// the input distribution achieving `capacity`
    pub input_distribution: ProbabilityVector,
    pub iterations: usize,
}

/// the Blahut-Arimoto iteration, stopping when the gap between the lower and upper capacity
/// bounds drops below `tolerance`
pub fn channel_capacity_blahut_arimoto(
    channel: &ChannelMatrix,
    max_iterations: usize,
    tolerance: f64,
) -> KernelResult<CapacityEstimate> {
    let mut px = uniform(channel.inputs());
    let mut iterations = 0;
    while iterations < max_iterations {
        iterations += 1;
        let py = output_distribution(&px, channel.rows())?;
        // exp2 of the relative entropy D(P(Y|x) || P(Y)) for every input x
        let factors: Vec<f64> = channel
            .rows()
            .iter()
            .map(|row| {
                let divergence: f64 = row
                    .iter()
                    .zip(py.iter())
                    .filter(|&(&p, _)| p > 0.0)
                    .map(|(&p, &q)| p * (p / q).log2())
                    .sum();
                divergence.exp2()
            })
            .collect();
        let total: f64 = px.iter().zip(factors.iter()).map(|(p, c)| p * c).sum();
        let lower = total.log2();
        let upper = factors.iter().cloned().fold(f64::MIN, f64::max).log2();
        px = px.iter().zip(factors.iter()).map(|(p, c)| p * c / total).collect();
        if upper - lower < tolerance {
            break;
        }
    }
    tracing::debug!("Blahut-Arimoto finished after {iterations} iterations");
    Ok(CapacityEstimate {
        capacity: mutual_information(&px, channel)?,
        input_distribution: px,
        iterations,
    })
}

/// chosen input symbol for every output symbol
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct DecisionTable {
    decisions: Vec<SymbolIndex>,
}

impl DecisionTable {
    pub fn decide(&self, output: SymbolIndex) -> SymbolIndex {
        self.decisions[output]
    }

    pub fn decisions(&self) -> &[SymbolIndex] {
        &self.decisions
    }

    pub fn to_map(&self) -> BTreeMap<SymbolIndex, SymbolIndex> {
        self.decisions.iter().cloned().enumerate().collect()
    }
}

/// for every output, the input whose score is largest; ties keep the first input
fn decide_by_max<F: Fn(SymbolIndex, SymbolIndex) -> f64>(channel: &ChannelMatrix, score: F) -> DecisionTable {
    let decisions = (0..channel.outputs())
        .map(|output| {
            let mut best = 0;
            let mut best_score = score(0, output);
            for input in 1..channel.inputs() {
                let candidate = score(input, output);
                if candidate > best_score {
                    best = input;
                    best_score = candidate;
                }
            }
            best
        })
        .collect();
    DecisionTable { decisions }
}

pub fn maximum_likelihood_decoder(channel: &ChannelMatrix) -> DecisionTable {
    decide_by_max(channel, |input, output| channel.get(input, output))
}

/// compares `P(y|x) P(x)` instead of the likelihood alone
pub fn maximum_a_posteriori_decoder(channel: &ChannelMatrix, priors: &[Probability]) -> KernelResult<DecisionTable> {
    maximum_a_posteriori_decoder_config(channel, priors, &KernelConfig::default())
}

pub fn maximum_a_posteriori_decoder_config(
    channel: &ChannelMatrix,
    priors: &[Probability],
    config: &KernelConfig,
) -> KernelResult<DecisionTable> {
    channel.check_priors(priors, config)?;
    Ok(decide_by_max(channel, |input, output| channel.get(input, output) * priors[input]))
}

/// the 0/1 cost: nothing for a correct decision, one for any error
pub fn default_cost_matrix(inputs: usize) -> Vec<Vec<f64>> {
    (0..inputs)
        .map(|actual| (0..inputs).map(|decided| if actual == decided { 0.0 } else { 1.0 }).collect())
        .collect()
}

/// Bayes decoder: for every output, the hypothesis `h` minimizing `sum_i P(y|x=i) P(x=i) cost[i][h]`;
/// ties keep the first hypothesis. Without a cost matrix this is the MAP decoder.
pub fn minimum_cost_decoder(
    channel: &ChannelMatrix,
    priors: &[Probability],
    cost_matrix: Option<&[Vec<f64>]>,
) -> KernelResult<DecisionTable> {
    minimum_cost_decoder_config(channel, priors, cost_matrix, &KernelConfig::default())
}

pub fn minimum_cost_decoder_config(
    channel: &ChannelMatrix,
    priors: &[Probability],
    cost_matrix: Option<&[Vec<f64>]>,
    config: &KernelConfig,
) -> KernelResult<DecisionTable> {
    channel.check_priors(priors, config)?;
    let inputs = channel.inputs();
    let default_costs;
    let costs: &[Vec<f64>] = match cost_matrix {
        Some(costs) => costs,
        None => {
            default_costs = default_cost_matrix(inputs);
            &default_costs
        }
    };
    if costs.len() != inputs || costs.iter().any(|row| row.len() != inputs) {
        return Err(KernelError::ShapeMismatch(format!(
            "cost matrix must be {inputs} x {inputs}"
        )));
    }
    if let Some((actual, decided)) = (0..inputs)
        .flat_map(|actual| (0..inputs).map(move |decided| (actual, decided)))
        .find(|&(actual, decided)| !costs[actual][decided].is_finite())
    {
        return Err(KernelError::InvalidParameter(format!(
            "cost of deciding {decided} when {actual} was sent is not finite"
        )));
    }
    let risk = |hypothesis: SymbolIndex, output: SymbolIndex| -> f64 {
        (0..inputs)
            .map(|actual| channel.get(actual, output) * priors[actual] * costs[actual][hypothesis])
            .sum()
    };
    // the largest negative risk is the smallest risk, with the same first-wins tie breaking
    Ok(decide_by_max(channel, |hypothesis, output| -risk(hypothesis, output)))
}

/// `sum over (i, j) with decoder(j) != i of P(x=i) P(y=j|x=i)`
pub fn error_probability(decoder: &DecisionTable, channel: &ChannelMatrix, priors: &[Probability]) -> KernelResult<f64> {
    error_probability_config(decoder, channel, priors, &KernelConfig::default())
}

pub fn error_probability_config(
    decoder: &DecisionTable,
    channel: &ChannelMatrix,
    priors: &[Probability],
    config: &KernelConfig,
) -> KernelResult<f64> {
    channel.check_priors(priors, config)?;
    if decoder.decisions.len() != channel.outputs() {
        return Err(KernelError::ShapeMismatch(format!(
            "decision table covers {} outputs, the channel has {}",
            decoder.decisions.len(),
            channel.outputs()
        )));
    }
    let mut error = 0.0;
    for (input, &prior) in priors.iter().enumerate() {
        for output in 0..channel.outputs() {
            if decoder.decide(output) != input {
                error += prior * channel.get(input, output);
            }
        }
    }
    Ok(error)
}

/// all entropies of a channel under one input distribution
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChannelReport {
    pub output_distribution: ProbabilityVector,
    /// H(X)
    pub input_entropy: f64,
    /// H(Y)
    pub output_entropy: f64,
    /// H(Y|X)
    pub noise_entropy: f64,
    /// H(X|Y)
    pub equivocation: f64,
    /// I(X;Y)
    pub mutual_information: f64,
}

pub fn analyze(px: &[Probability], channel: &ChannelMatrix, config: &KernelConfig) -> KernelResult<ChannelReport> {
    let mutual_information = mutual_information_config(px, channel, config)?;
    let output_distribution = output_distribution(px, channel.rows())?;
    let input_entropy = entropy(px);
    let equivocation = clamp_information("equivocation", input_entropy - mutual_information, config)?;
    Ok(ChannelReport {
        output_entropy: entropy(&output_distribution),
        noise_entropy: conditional_entropy(px, channel.rows())?,
        output_distribution,
        input_entropy,
        equivocation,
        mutual_information,
    })
}
