//! GF(2) Polynomials
//!
//! The single representation of binary polynomials used across the crate.
//! Coefficients are stored by power: `coefficients[i]` is the coefficient of `x^i`, and the
//! highest stored coefficient is always one (the zero polynomial stores nothing).
//! Conversions to the two external conventions are explicit:
//! - high-first integer lists, e.g. `[1, 0, 1, 1]` for `x^3 + x + 1`, see [`Gf2Poly::from_high_first`]
//! - bit strings with the leftmost character the highest degree, e.g. `"1011"`, see [`Gf2Poly::from_bit_str`]
//!
//! The irreducibility test enumerates every candidate divisor and is only practical for small degrees (up to ~10).
//!

use crate::error::*;
use crate::util::*;
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct Gf2Poly {
    coefficients: Vec<Bit>,
}

impl Gf2Poly {
    pub fn zero() -> Self {
        Self::default()
    }

    pub fn one() -> Self {
        Self::monomial(0)
    }

    /// the generator `x` of an extension field
    pub fn x() -> Self {
        Self::monomial(1)
    }

    pub fn monomial(power: usize) -> Self {
        let mut coefficients = vec![false; power + 1];
        coefficients[power] = true;
        Self { coefficients }
    }

    /// from coefficients indexed by power, `low_first[i]` being the coefficient of `x^i`
    pub fn from_low_first(low_first: Vec<Bit>) -> Self {
        let mut poly = Self { coefficients: low_first };
        poly.normalize();
        poly
    }

    pub fn from_powers(powers: &[usize]) -> Self {
        let mut poly = Self::zero();
        for &power in powers {
            poly = poly.add(&Self::monomial(power));
        }
        poly
    }

    /// from a high-first coefficient list, where every entry must be 0 or 1
    pub fn from_high_first(high_first: &[u8]) -> KernelResult<Self> {
        let mut low_first = Vec::with_capacity(high_first.len());
        for (position, &coefficient) in high_first.iter().enumerate().rev() {
            match coefficient {
                0 => low_first.push(false),
                1 => low_first.push(true),
                _ => {
                    return Err(KernelError::InvalidParameter(format!(
                        "coefficient {coefficient} at position {position} is not in GF(2)"
                    )))
                }
            }
        }
        Ok(Self::from_low_first(low_first))
    }

    /// from bits ordered highest degree first, the way codewords are written
    pub fn from_bits_high_first(bits: &[Bit]) -> Self {
        Self::from_low_first(bits.iter().rev().cloned().collect())
    }

    /// from a bit string whose leftmost character is the highest degree
    pub fn from_bit_str(bits: &str) -> KernelResult<Self> {
        Ok(Self::from_bits_high_first(&parse_bits(bits)?))
    }

    /// high-first coefficient list; the zero polynomial is `[0]`
    pub fn to_high_first(&self) -> Vec<u8> {
        if self.is_zero() {
            return vec![0];
        }
        self.coefficients.iter().rev().map(|&bit| bit as u8).collect()
    }

    /// exactly `width` bits, highest degree first; a polynomial that needs more bits is not truncated
    pub fn to_bits_padded(&self, width: usize) -> Vec<Bit> {
        let length = width.max(self.coefficients.len());
        (0..length).rev().map(|power| self.coefficient(power)).collect()
    }

    /// the bit string of the polynomial with no leading zeros; the zero polynomial is `"0"`
    pub fn to_bit_string(&self) -> String {
        if self.is_zero() {
            return "0".to_string();
        }
        bits_to_string(&self.to_bits_padded(0))
    }

    pub fn to_bit_string_padded(&self, width: usize) -> String {
        bits_to_string(&self.to_bits_padded(width))
    }

    pub fn degree(&self) -> Option<usize> {
        self.coefficients.len().checked_sub(1)
    }

    pub fn is_zero(&self) -> bool {
        self.coefficients.is_empty()
    }

    pub fn is_one(&self) -> bool {
        self.coefficients.len() == 1
    }

    pub fn coefficient(&self, power: usize) -> Bit {
        self.coefficients.get(power).cloned().unwrap_or(false)
    }

    /// number of nonzero coefficients
    pub fn weight(&self) -> usize {
        self.coefficients.iter().filter(|&&bit| bit).count()
    }

    /// human readable notation like `x^3 + x + 1`
    pub fn notation(&self) -> String {
        if self.is_zero() {
            return "0".to_string();
        }
        (0..self.coefficients.len())
            .rev()
            .filter(|&power| self.coefficients[power])
            .map(|power| match power {
                0 => "1".to_string(),
                1 => "x".to_string(),
                _ => format!("x^{power}"),
            })
            .join(" + ")
    }

    /// addition and subtraction coincide in GF(2)
    pub fn add(&self, other: &Self) -> Self {
        let length = self.coefficients.len().max(other.coefficients.len());
        Self::from_low_first(
            (0..length)
                .map(|power| self.coefficient(power) ^ other.coefficient(power))
                .collect(),
        )
    }

    /// multiply by `x^power`
    pub fn shift(&self, power: usize) -> Self {
        if self.is_zero() {
            return Self::zero();
        }
        let mut coefficients = vec![false; power];
        coefficients.extend_from_slice(&self.coefficients);
        Self { coefficients }
    }

    fn normalize(&mut self) {
        while self.coefficients.last() == Some(&false) {
            self.coefficients.pop();
        }
    }
}

impl std::fmt::Display for Gf2Poly {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.notation())
    }
}

impl std::fmt::Debug for Gf2Poly {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Gf2Poly({})", self.to_bit_string())
    }
}

impl From<Gf2Poly> for String {
    fn from(poly: Gf2Poly) -> String {
        poly.to_bit_string()
    }
}

impl TryFrom<String> for Gf2Poly {
    type Error = KernelError;
    fn try_from(bits: String) -> KernelResult<Self> {
        Self::from_bit_str(&bits)
    }
}

impl std::str::FromStr for Gf2Poly {
    type Err = KernelError;
    fn from_str(bits: &str) -> KernelResult<Self> {
        Self::from_bit_str(bits)
    }
}

/// long division with XOR in place of subtraction, returns `(quotient, remainder)`
pub fn divide(dividend: &Gf2Poly, divisor: &Gf2Poly) -> KernelResult<(Gf2Poly, Gf2Poly)> {
    let divisor_degree = divisor.degree().ok_or(KernelError::DivisionByZero)?;
    let mut remainder = dividend.coefficients.clone();
    let quotient_length = remainder.len().saturating_sub(divisor_degree);
    let mut quotient = vec![false; quotient_length];
    for shift in (0..quotient_length).rev() {
        if remainder[shift + divisor_degree] {
            quotient[shift] = true;
            for (power, &bit) in divisor.coefficients.iter().enumerate() {
                remainder[shift + power] ^= bit;
            }
        }
    }
    Ok((Gf2Poly::from_low_first(quotient), Gf2Poly::from_low_first(remainder)))
}

/// convolution of the coefficient sequences with XOR accumulation
pub fn multiply(a: &Gf2Poly, b: &Gf2Poly) -> Gf2Poly {
    if a.is_zero() || b.is_zero() {
        return Gf2Poly::zero();
    }
    let mut product = vec![false; a.coefficients.len() + b.coefficients.len() - 1];
    for (i, &a_bit) in a.coefficients.iter().enumerate() {
        if !a_bit {
            continue;
        }
        for (j, &b_bit) in b.coefficients.iter().enumerate() {
            product[i + j] ^= b_bit;
        }
    }
    Gf2Poly::from_low_first(product)
}

pub fn modulo(a: &Gf2Poly, m: &Gf2Poly) -> KernelResult<Gf2Poly> {
    Ok(divide(a, m)?.1)
}

/// trial division enumerates divisors of up to half this degree by a `usize` counter
pub const MAX_IRREDUCIBILITY_DEGREE: usize = 2 * (usize::BITS as usize - 1) + 1;

/// all polynomials of exactly `degree`, i.e. the leading one followed by every pattern of lower coefficients;
/// `degree` must stay below `usize::BITS`
fn polynomials_of_degree(degree: usize) -> impl Iterator<Item = Gf2Poly> {
    let leading = Gf2Poly::monomial(degree);
    (0..(1usize << degree)).map(move |lower| {
        let lower = Gf2Poly::from_low_first((0..degree).map(|power| (lower >> power) & 1 == 1).collect());
        leading.add(&lower)
    })
}

/// a polynomial of degree `d >= 1` is irreducible iff no polynomial of degree `1..=d/2` divides it;
/// constants and the zero polynomial are not irreducible
pub fn is_irreducible(poly: &Gf2Poly) -> KernelResult<bool> {
    let degree = match poly.degree() {
        Some(degree) if degree >= 1 => degree,
        _ => return Ok(false),
    };
    if degree > MAX_IRREDUCIBILITY_DEGREE {
        return Err(KernelError::InvalidParameter(format!(
            "irreducibility test supports degree up to {MAX_IRREDUCIBILITY_DEGREE}, got {degree}"
        )));
    }
    for divisor_degree in 1..=degree / 2 {
        for candidate in polynomials_of_degree(divisor_degree) {
            if modulo(poly, &candidate)?.is_zero() {
                return Ok(false);
            }
        }
    }
    Ok(true)
}

/// verdict of the primitivity test; when `exact` is false the answer only reflects irreducibility
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Primitivity {
    pub primitive: bool,
    pub exact: bool,
}

pub fn is_primitive(poly: &Gf2Poly) -> KernelResult<Primitivity> {
    is_primitive_with_limit(poly, EXACT_PRIMITIVITY_MAX_DEGREE)
}

/// exact for degree up to `exact_max_degree`, by checking that the powers of `x` visit all `2^d - 1`
/// nonzero residues; above that only irreducibility is checked and may report false positives.
/// The exact walk never goes beyond [`MAX_EXACT_PRIMITIVITY_DEGREE`].
pub fn is_primitive_with_limit(poly: &Gf2Poly, exact_max_degree: usize) -> KernelResult<Primitivity> {
    if !is_irreducible(poly)? {
        return Ok(Primitivity {
            primitive: false,
            exact: true,
        });
    }
    let degree = poly.degree().unwrap_or(0);
    let exact_max_degree = exact_max_degree.min(MAX_EXACT_PRIMITIVITY_DEGREE);
    if degree > exact_max_degree {
        tracing::warn!(
            "primitivity of {} (degree {degree} > {exact_max_degree}) approximated by irreducibility",
            poly.notation()
        );
        return Ok(Primitivity {
            primitive: true,
            exact: false,
        });
    }
    let group_order = (1usize << degree) - 1;
    let mut visited = BTreeSet::new();
    let mut residue = match modulo(&Gf2Poly::x(), poly) {
        Ok(residue) => residue,
        Err(_) => return Ok(Primitivity { primitive: false, exact: true }),
    };
    while visited.len() < group_order {
        if residue.is_zero() || !visited.insert(residue.clone()) {
            break;
        }
        residue = match modulo(&residue.shift(1), poly) {
            Ok(residue) => residue,
            Err(_) => break,
        };
    }
    Ok(Primitivity {
        primitive: visited.len() == group_order,
        exact: true,
    })
}

/// the successive powers `1, x, x^2, ...` reduced modulo `poly`, at most `min(max_elements, 2^d - 1)` of them;
/// stops early when a power repeats or vanishes, which only happens when `poly` is not primitive
pub fn generate_extension_field(poly: &Gf2Poly, max_elements: usize) -> KernelResult<Vec<Gf2Poly>> {
    let degree = match poly.degree() {
        Some(degree) if degree >= 1 => degree,
        _ => {
            return Err(KernelError::InvalidParameter(format!(
                "extension field needs a polynomial of degree at least 1, got {}",
                poly.notation()
            )))
        }
    };
    if degree >= usize::BITS as usize - 1 {
        return Err(KernelError::InvalidParameter(format!("degree {degree} is too large")));
    }
    let limit = max_elements.min((1usize << degree) - 1);
    let mut elements: Vec<Gf2Poly> = Vec::with_capacity(limit);
    let mut element = Gf2Poly::one();
    while elements.len() < limit {
        if element.is_zero() || elements.contains(&element) {
            break;
        }
        elements.push(element.clone());
        element = modulo(&element.shift(1), poly)?;
    }
    tracing::debug!("generated {} elements of GF(2^{degree}) modulo {}", elements.len(), poly.notation());
    Ok(elements)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::prelude::*;
    use test_case::test_case;

    fn poly(bits: &str) -> Gf2Poly {
        Gf2Poly::from_bit_str(bits).unwrap()
    }

    #[test]
    fn polynomial_representations() {
        // cargo test polynomial_representations -- --nocapture
        let p = poly("1011");
        assert_eq!(p.degree(), Some(3));
        assert_eq!(p.notation(), "x^3 + x + 1");
        assert_eq!(p.to_high_first(), vec![1, 0, 1, 1]);
        assert_eq!(Gf2Poly::from_high_first(&[1, 0, 1, 1]).unwrap(), p);
        assert_eq!(Gf2Poly::from_powers(&[3, 1, 0]), p);
        assert!(p.coefficient(0) && p.coefficient(1) && !p.coefficient(2) && p.coefficient(3));
        assert!(!p.coefficient(10));
        // leading zeros are stripped on entry
        assert_eq!(poly("0001011"), p);
        assert_eq!(p.to_bit_string_padded(6), "001011");
        assert_eq!(Gf2Poly::zero().to_bit_string(), "0");
        assert_eq!(Gf2Poly::zero().to_high_first(), vec![0]);
        assert_eq!(poly("000"), Gf2Poly::zero());
        assert_eq!(Gf2Poly::zero().notation(), "0");
        assert_eq!(poly("1").notation(), "1");
        assert_eq!(poly("110").notation(), "x^2 + x");
        assert!(Gf2Poly::from_high_first(&[1, 2]).is_err());
        assert_eq!(format!("{p:?}"), "Gf2Poly(1011)");
    }

    #[test]
    fn polynomial_serde_as_bit_string() {
        // cargo test polynomial_serde_as_bit_string -- --nocapture
        let p = poly("10011");
        assert_eq!(serde_json::to_value(&p).unwrap(), json!("10011"));
        let q: Gf2Poly = serde_json::from_value(json!("0110")).unwrap();
        assert_eq!(q, poly("110"));
        assert!(serde_json::from_value::<Gf2Poly>(json!("12")).is_err());
    }

    #[test]
    fn polynomial_divide_by_hand() {
        // cargo test polynomial_divide_by_hand -- --nocapture
        // x^6 + x^5 + x^3 + x^2 divided by x^3 + x + 1
        let (quotient, remainder) = divide(&poly("1101100"), &poly("1011")).unwrap();
        assert_eq!(quotient, poly("1111"));
        assert_eq!(remainder, poly("101"));
        // dividend of smaller degree
        let (quotient, remainder) = divide(&poly("11"), &poly("1011")).unwrap();
        assert!(quotient.is_zero());
        assert_eq!(remainder, poly("11"));
        assert_eq!(divide(&poly("1011"), &Gf2Poly::zero()), Err(KernelError::DivisionByZero));
        assert_eq!(divide(&poly("1011"), &poly("0000")), Err(KernelError::DivisionByZero));
    }

    #[test]
    fn polynomial_multiply_by_hand() {
        // cargo test polynomial_multiply_by_hand -- --nocapture
        // (x + 1)^2 = x^2 + 1
        assert_eq!(multiply(&poly("11"), &poly("11")), poly("101"));
        // (x + 1)(x^2 + x + 1) = x^3 + 1
        assert_eq!(multiply(&poly("11"), &poly("111")), poly("1001"));
        assert!(multiply(&poly("11"), &Gf2Poly::zero()).is_zero());
        assert_eq!(multiply(&Gf2Poly::one(), &poly("1011")), poly("1011"));
    }

    #[test]
    fn polynomial_multiply_then_divide_has_no_remainder() {
        // cargo test polynomial_multiply_then_divide_has_no_remainder -- --nocapture
        let mut rng = SmallRng::seed_from_u64(0);
        for _ in 0..200 {
            let a = Gf2Poly::from_low_first((0..rng.gen_range(1..12)).map(|_| rng.gen()).collect());
            let b = Gf2Poly::from_low_first((0..rng.gen_range(1..12)).map(|_| rng.gen()).collect());
            if a.is_zero() || b.is_zero() {
                continue;
            }
            let product = multiply(&a, &b);
            let (quotient, remainder) = divide(&product, &b).unwrap();
            assert!(remainder.is_zero(), "{a:?} * {b:?}");
            assert_eq!(quotient, a);
            assert_eq!(modulo(&product, &a).unwrap(), Gf2Poly::zero());
        }
    }

    #[test_case("11", true; "x + 1")]
    #[test_case("10", true; "x")]
    #[test_case("111", true; "x^2 + x + 1")]
    #[test_case("101", false; "x^2 + 1 = (x + 1)^2")]
    #[test_case("1011", true; "x^3 + x + 1")]
    #[test_case("1101", true; "x^3 + x^2 + 1")]
    #[test_case("1001", false; "x^3 + 1")]
    #[test_case("10011", true; "x^4 + x + 1")]
    #[test_case("11111", true; "x^4 + x^3 + x^2 + x + 1")]
    #[test_case("10101", false; "x^4 + x^2 + 1 = (x^2 + x + 1)^2")]
    #[test_case("100101", true; "x^5 + x^2 + 1")]
    #[test_case("100011011", true; "AES polynomial")]
    #[test_case("1", false; "constant")]
    #[test_case("0", false; "zero")]
    fn polynomial_irreducibility(bits: &str, expected: bool) {
        assert_eq!(is_irreducible(&poly(bits)).unwrap(), expected);
    }

    #[test_case("11", true; "x + 1")]
    #[test_case("10", false; "x")]
    #[test_case("111", true; "x^2 + x + 1")]
    #[test_case("1011", true; "x^3 + x + 1")]
    #[test_case("10011", true; "x^4 + x + 1")]
    #[test_case("11001", true; "x^4 + x^3 + 1")]
    #[test_case("11111", false; "x^4 + x^3 + x^2 + x + 1 has order 5")]
    #[test_case("10101", false; "reducible")]
    fn polynomial_primitivity_exact(bits: &str, expected: bool) {
        let verdict = is_primitive(&poly(bits)).unwrap();
        assert!(verdict.exact);
        assert_eq!(verdict.primitive, expected);
    }

    #[test]
    fn polynomial_primitivity_above_degree_four_is_approximate() {
        // cargo test polynomial_primitivity_above_degree_four_is_approximate -- --nocapture
        // x^5 + x^2 + 1 is primitive, the answer is right but not verified
        assert_eq!(
            is_primitive(&poly("100101")).unwrap(),
            Primitivity {
                primitive: true,
                exact: false
            }
        );
        // x^6 + x^3 + 1 is irreducible but x has order 9, not 63: a known false positive
        let false_positive = poly("1001001");
        assert!(is_irreducible(&false_positive).unwrap());
        assert_eq!(
            is_primitive(&false_positive).unwrap(),
            Primitivity {
                primitive: true,
                exact: false
            }
        );
        // raising the exact limit uncovers it
        assert_eq!(
            is_primitive_with_limit(&false_positive, 6).unwrap(),
            Primitivity {
                primitive: false,
                exact: true
            }
        );
        // reducible polynomials are rejected exactly at any degree
        assert_eq!(
            is_primitive(&poly("1000001")).unwrap(),
            Primitivity {
                primitive: false,
                exact: true
            }
        );
    }

    #[test]
    fn polynomial_oversized_degrees_are_rejected() {
        // cargo test polynomial_oversized_degrees_are_rejected -- --nocapture
        let huge = Gf2Poly::from_powers(&[MAX_IRREDUCIBILITY_DEGREE + 1, 0]);
        assert!(matches!(is_irreducible(&huge), Err(KernelError::InvalidParameter(_))));
        assert!(matches!(
            is_primitive_with_limit(&huge, usize::MAX),
            Err(KernelError::InvalidParameter(_))
        ));
        // an unbounded exact limit is capped instead of overflowing the group order
        assert_eq!(
            is_primitive_with_limit(&poly("1011"), usize::MAX).unwrap(),
            Primitivity {
                primitive: true,
                exact: true
            }
        );
    }

    #[test]
    fn polynomial_extension_field_gf8() {
        // cargo test polynomial_extension_field_gf8 -- --nocapture
        let elements = generate_extension_field(&poly("1011"), 100).unwrap();
        let bits: Vec<String> = elements.iter().map(|element| element.to_bit_string_padded(3)).collect();
        println!("{bits:?}");
        assert_eq!(bits, vec!["001", "010", "100", "011", "110", "111", "101"]);
        let limited = generate_extension_field(&poly("1011"), 3).unwrap();
        assert_eq!(limited.len(), 3);
        assert_eq!(generate_extension_field(&poly("11"), 10).unwrap(), vec![Gf2Poly::one()]);
        assert!(generate_extension_field(&poly("1"), 10).is_err());
    }

    #[test]
    fn polynomial_extension_field_of_non_primitive_stops_at_cycle() {
        // cargo test polynomial_extension_field_of_non_primitive_stops_at_cycle -- --nocapture
        // x has order 5 modulo x^4 + x^3 + x^2 + x + 1
        let elements = generate_extension_field(&poly("11111"), 100).unwrap();
        assert_eq!(elements.len(), 5);
        let elements = generate_extension_field(&poly("10011"), 100).unwrap();
        assert_eq!(elements.len(), 15);
        let distinct: BTreeSet<_> = elements.iter().cloned().collect();
        assert_eq!(distinct.len(), 15);
    }
}
