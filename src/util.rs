use crate::error::*;
use serde::{Deserialize, Serialize};

pub type Bit = bool;
pub type SymbolIndex = usize;
pub type Probability = f64;
pub type ProbabilityVector = Vec<Probability>;
pub type ProbabilityMatrix = Vec<Vec<Probability>>;

/// tolerance on sums of probabilities, and on how negative an information value may get
pub const STRICT_TOLERANCE: f64 = 1e-6;
/// negatives smaller than this are floating-point noise and are clamped without a warning
pub const ROUNDING_TOLERANCE: f64 = 1e-10;
pub const STATIONARY_ITERATIONS: usize = 50;
/// up to this degree the primitivity test walks the whole multiplicative group
pub const EXACT_PRIMITIVITY_MAX_DEGREE: usize = 4;
/// ceiling of `exact_primitivity_max_degree`: the walk counts the `2^d - 1` group elements in a `usize`
pub const MAX_EXACT_PRIMITIVITY_DEGREE: usize = usize::BITS as usize - 1;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct KernelConfig {
    /// allowed deviation of a probability sum from 1, also the tolerance on negative information
    #[serde(default = "kernel_default_configs::strict_tolerance")]
    pub strict_tolerance: f64,
    /// negative information values above `-rounding_tolerance` are clamped silently
    #[serde(default = "kernel_default_configs::rounding_tolerance")]
    pub rounding_tolerance: f64,
    /// number of power iterations when approximating a stationary distribution
    #[serde(default = "kernel_default_configs::stationary_iterations")]
    pub stationary_iterations: usize,
    /// highest polynomial degree for which primitivity is verified exactly
    #[serde(default = "kernel_default_configs::exact_primitivity_max_degree")]
    pub exact_primitivity_max_degree: usize,
}

impl Default for KernelConfig {
    fn default() -> Self {
        serde_json::from_value(json!({})).unwrap()
    }
}

impl KernelConfig {
    pub fn from_json(value: serde_json::Value) -> KernelResult<Self> {
        let config: Self = serde_json::from_value(value)
            .map_err(|error| KernelError::InvalidParameter(format!("kernel config: {error}")))?;
        if config.exact_primitivity_max_degree > MAX_EXACT_PRIMITIVITY_DEGREE {
            return Err(KernelError::InvalidParameter(format!(
                "kernel config: exact_primitivity_max_degree must not exceed {MAX_EXACT_PRIMITIVITY_DEGREE}, got {}",
                config.exact_primitivity_max_degree
            )));
        }
        Ok(config)
    }
}

pub mod kernel_default_configs {
    pub fn strict_tolerance() -> f64 {
        super::STRICT_TOLERANCE
    }
    pub fn rounding_tolerance() -> f64 {
        super::ROUNDING_TOLERANCE
    }
    pub fn stationary_iterations() -> usize {
        super::STATIONARY_ITERATIONS
    }
    pub fn exact_primitivity_max_degree() -> usize {
        super::EXACT_PRIMITIVITY_MAX_DEGREE
    }
}

/// parse a string of '0'/'1' characters, leftmost character first; ASCII whitespace is skipped
pub fn parse_bits(bits: &str) -> KernelResult<Vec<Bit>> {
    bits.chars()
        .enumerate()
        .filter(|(_, character)| !character.is_ascii_whitespace())
        .map(|(position, character)| match character {
            '0' => Ok(false),
            '1' => Ok(true),
            _ => Err(KernelError::InvalidBit { position, character }),
        })
        .collect()
}

pub fn bits_to_string(bits: &[Bit]) -> String {
    bits.iter().map(|&bit| if bit { '1' } else { '0' }).collect()
}

/// serde helper writing a bit vector as a compact bit string, e.g. `"1011"`
pub fn serialize_bits<S: serde::Serializer>(bits: &[Bit], serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&bits_to_string(bits))
}

pub fn serialize_bit_vectors<S: serde::Serializer>(vectors: &[Vec<Bit>], serializer: S) -> Result<S::Ok, S::Error> {
    use serde::ser::SerializeSeq;
    let mut seq = serializer.serialize_seq(Some(vectors.len()))?;
    for bits in vectors.iter() {
        seq.serialize_element(&bits_to_string(bits))?;
    }
    seq.end()
}

/// the `width`-bit binary representation of `value`, most significant bit first
pub fn bits_of_usize(value: usize, width: usize) -> Vec<Bit> {
    (0..width).rev().map(|shift| shift < usize::BITS as usize && (value >> shift) & 1 == 1).collect()
}

/// read bits, most significant first, as an unsigned integer
pub fn usize_of_bits(bits: &[Bit]) -> usize {
    bits.iter().fold(0, |value, &bit| (value << 1) | bit as usize)
}
