//! Linear and Cyclic Block Codes
//!
//! CRC computation and checking by GF(2) polynomial division, syndromes as parity-check
//! matrix products, construction of Hamming and cyclic code matrices, the Hamming-bound
//! (perfect code) test, and single-error syndrome decoding.
//!
//! Codewords are bit vectors written highest degree first: bit `j` of a length-`n` word is the
//! coefficient of `x^(n-1-j)`.
//!

use crate::error::*;
use crate::matrix::*;
use crate::polynomial::*;
use crate::util::*;
use num_bigint::BigUint;
use num_traits::One;
use serde::Serialize;

/// the largest message length whose codewords are enumerated
pub const MAX_ENUMERATED_MESSAGE_LENGTH: usize = 20;
/// the largest r accepted for 2^r - 1 column matrices
pub const MAX_PARITY_BITS: usize = 16;

/// number of check bits a generator adds, i.e. its degree
pub fn check_bit_count(generator: &Gf2Poly) -> KernelResult<usize> {
    generator.degree().ok_or(KernelError::DivisionByZero)
}

/// the CRC remainder of `data` appended with `deg(generator)` zeros, padded to `deg(generator)` bits
pub fn crc_compute(data: &[Bit], generator: &Gf2Poly) -> KernelResult<Vec<Bit>> {
    let check_bits = check_bit_count(generator)?;
    let padded = Gf2Poly::from_bits_high_first(data).shift(check_bits);
    let (_, remainder) = divide(&padded, generator)?;
    Ok(remainder.to_bits_padded(check_bits))
}

/// the transmitted word `data + crc_compute(data, generator)`
pub fn crc_codeword(data: &[Bit], generator: &Gf2Poly) -> KernelResult<Vec<Bit>> {
    let mut codeword = data.to_vec();
    codeword.extend(crc_compute(data, generator)?);
    Ok(codeword)
}

/// a received word is valid iff the generator divides it
pub fn crc_check(message: &[Bit], generator: &Gf2Poly) -> KernelResult<bool> {
    let check_bits = check_bit_count(generator)?;
    if message.len() < check_bits {
        return Err(KernelError::InvalidParameter(format!(
            "message of {} bits is shorter than the {check_bits} check bits",
            message.len()
        )));
    }
    let (_, remainder) = divide(&Gf2Poly::from_bits_high_first(message), generator)?;
    Ok(remainder.is_zero())
}

/// `H * received` over GF(2); all zero means the word is consistent with the code,
/// which does not exclude an undetectable error pattern
pub fn syndrome(received: &[Bit], parity_check_matrix: &BitMatrix) -> KernelResult<Vec<Bit>> {
    parity_check_matrix.multiply_vector(received)
}

fn check_parity_bits(r: usize) -> KernelResult<()> {
    if r == 0 || r > MAX_PARITY_BITS {
        return Err(KernelError::InvalidParameter(format!(
            "number of parity bits must be within 1..={MAX_PARITY_BITS}, got {r}"
        )));
    }
    Ok(())
}

/// the r x (2^r - 1) parity-check matrix of the Hamming code: column `j` (counting from 1)
/// holds the binary representation of `j`, most significant bit in the first row
pub fn hamming_parity_matrix(r: usize) -> KernelResult<BitMatrix> {
    check_parity_bits(r)?;
    let n = (1 << r) - 1;
    let mut matrix = BitMatrix::new_zero(r, n);
    for column in 0..n {
        for (row, bit) in bits_of_usize(column + 1, r).into_iter().enumerate() {
            matrix.set(row, column, bit);
        }
    }
    Ok(matrix)
}

/// the cyclic matrix of a generator of degree r: the first row is the generator bits
/// zero-padded to n = 2^r - 1, and each of the following k - 1 = n - r - 1 rows is the
/// previous one rotated right by one position
pub fn create_parity_matrix_from_generator(generator: &Gf2Poly) -> KernelResult<BitMatrix> {
    let r = check_bit_count(generator)?;
    check_parity_bits(r)?;
    let n = (1usize << r) - 1;
    if r + 1 > n {
        return Err(KernelError::InvalidParameter(format!(
            "generator {} of degree {r} does not fit into a code of length {n}",
            generator.notation()
        )));
    }
    let mut first = generator.to_bits_padded(r + 1);
    first.resize(n, false);
    let mut row = BitRow::from_bits(&first);
    let mut matrix = BitMatrix::new();
    for _ in 0..(n - r) {
        let next = row.rotate_right();
        matrix.push_row(row)?;
        row = next;
    }
    Ok(matrix)
}

/// the r x n parity-check matrix whose column `j` is `x^(n-1-j) mod generator`, so that the
/// syndrome of a word is its remainder modulo the generator
pub fn cyclic_parity_check_matrix(generator: &Gf2Poly, codeword_length: usize) -> KernelResult<BitMatrix> {
    let r = check_bit_count(generator)?;
    let mut matrix = BitMatrix::new_zero(r, codeword_length);
    for position in 0..codeword_length {
        let (_, column) = calculate_error_syndrome(position, generator, codeword_length)?;
        for (row, bit) in column.into_iter().enumerate() {
            matrix.set(row, position, bit);
        }
    }
    Ok(matrix)
}

fn binomial(n: usize, k: usize) -> BigUint {
    let mut value = BigUint::one();
    for i in 0..k {
        value = value * BigUint::from(n - i) / BigUint::from(i + 1);
    }
    value
}

/// whether an (n, k) code of minimum distance d meets the Hamming bound with equality,
/// i.e. `2^k * sum_{i<=t} C(n, i) == 2^n` where `t = (d - 1) / 2`
pub fn is_densely_packed(n: usize, k: usize, d: usize) -> bool {
    let t = d.saturating_sub(1) / 2;
    let mut sphere_size = BigUint::from(0u32);
    for i in 0..=t.min(n) {
        sphere_size += binomial(n, i);
    }
    (BigUint::one() << k) * sphere_size == BigUint::one() << n
}

/// every message of `message_length` bits in counting order, each followed by its CRC
pub fn generate_cyclic_codewords(generator: &Gf2Poly, message_length: usize) -> KernelResult<Vec<Vec<Bit>>> {
    if message_length > MAX_ENUMERATED_MESSAGE_LENGTH {
        return Err(KernelError::InvalidParameter(format!(
            "refuse to enumerate 2^{message_length} codewords, at most 2^{MAX_ENUMERATED_MESSAGE_LENGTH}"
        )));
    }
    (0..(1usize << message_length))
        .map(|message| crc_codeword(&bits_of_usize(message, message_length), generator))
        .collect()
}

/// syndrome of a single-bit error at `position` (counting from the leftmost bit) in a word of
/// `codeword_length` bits, in polynomial notation and as `deg(generator)` bits
pub fn calculate_error_syndrome(
    position: usize,
    generator: &Gf2Poly,
    codeword_length: usize,
) -> KernelResult<(String, Vec<Bit>)> {
    let r = check_bit_count(generator)?;
    if position >= codeword_length {
        return Err(KernelError::InvalidParameter(format!(
            "error position {position} is outside of a codeword of length {codeword_length}"
        )));
    }
    let error = Gf2Poly::monomial(codeword_length - 1 - position);
    let remainder = modulo(&error, generator)?;
    Ok((remainder.notation(), remainder.to_bits_padded(r)))
}

pub fn hamming_weight(word: &[Bit]) -> usize {
    BitRow::from_bits(word).weight()
}

pub fn hamming_distance(a: &[Bit], b: &[Bit]) -> KernelResult<usize> {
    if a.len() != b.len() {
        return Err(KernelError::ShapeMismatch(format!(
            "words of length {} and {} have no Hamming distance",
            a.len(),
            b.len()
        )));
    }
    let mut difference = BitRow::from_bits(a);
    difference.add(&BitRow::from_bits(b));
    Ok(difference.weight())
}

/// smallest pairwise distance, `None` when there are fewer than two codewords
pub fn minimum_distance(codewords: &[Vec<Bit>]) -> KernelResult<Option<usize>> {
    let mut minimum: Option<usize> = None;
    for (i, a) in codewords.iter().enumerate() {
        for b in codewords.iter().skip(i + 1) {
            let distance = hamming_distance(a, b)?;
            minimum = Some(minimum.map_or(distance, |minimum| minimum.min(distance)));
        }
    }
    Ok(minimum)
}

pub fn detectable_errors(minimum_distance: usize) -> usize {
    minimum_distance.saturating_sub(1)
}

pub fn correctable_errors(minimum_distance: usize) -> usize {
    minimum_distance.saturating_sub(1) / 2
}

pub fn code_rate(n: usize, k: usize) -> f64 {
    k as f64 / n as f64
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SyndromeEntry {
    /// error position counting from the leftmost bit
    pub position: usize,
    #[serde(serialize_with = "serialize_bits")]
    pub syndrome: Vec<Bit>,
}

/// syndrome of every single-bit error: the columns of the parity-check matrix
pub fn syndrome_table(parity_check_matrix: &BitMatrix) -> Vec<SyndromeEntry> {
    (0..parity_check_matrix.columns())
        .map(|position| SyndromeEntry {
            position,
            syndrome: parity_check_matrix.column(position),
        })
        .collect()
}

pub fn cyclic_syndrome_table(generator: &Gf2Poly, codeword_length: usize) -> KernelResult<Vec<SyndromeEntry>> {
    (0..codeword_length)
        .map(|position| {
            let (_, syndrome) = calculate_error_syndrome(position, generator, codeword_length)?;
            Ok(SyndromeEntry { position, syndrome })
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case", tag = "result")]
pub enum SingleErrorCorrection {
    NoError,
    Corrected {
        position: usize,
        #[serde(serialize_with = "serialize_bits")]
        codeword: Vec<Bit>,
    },
    /// the syndrome matches no single-bit error
    Uncorrectable {
        #[serde(serialize_with = "serialize_bits")]
        syndrome: Vec<Bit>,
    },
}

/// syndrome decoding under the assumption of at most one flipped bit; the first column
/// matching the syndrome wins
pub fn correct_single_error(received: &[Bit], parity_check_matrix: &BitMatrix) -> KernelResult<SingleErrorCorrection> {
    let syndrome = syndrome(received, parity_check_matrix)?;
    if BitRow::from_bits(&syndrome).is_all_zero() {
        return Ok(SingleErrorCorrection::NoError);
    }
    for entry in syndrome_table(parity_check_matrix) {
        if entry.syndrome == syndrome {
            let mut codeword = BitRow::from_bits(received);
            codeword.flip(entry.position);
            return Ok(SingleErrorCorrection::Corrected {
                position: entry.position,
                codeword: codeword.to_bits(),
            });
        }
    }
    Ok(SingleErrorCorrection::Uncorrectable { syndrome })
}
