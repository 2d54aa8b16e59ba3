//! Bit Row
//!
//! A fixed-length vector over GF(2), packed into machine words, providing the operations the
//! parity-check computations need: XOR of rows, weight and the mod-2 inner product
//!

use crate::util::*;
use derivative::Derivative;

pub type BitArrayUnit = usize;
pub const BIT_UNIT_LENGTH: usize = std::mem::size_of::<BitArrayUnit>() * 8;

#[derive(Clone, Derivative, PartialEq, Eq, Hash)]
#[derivative(Default(new = "true"))]
pub struct BitRow {
    /// number of valid bits; bits beyond it are always zero
    length: usize,
    units: Vec<BitArrayUnit>,
}

impl BitRow {
    pub fn new_length(length: usize) -> Self {
        Self {
            length,
            units: vec![0; length.div_ceil(BIT_UNIT_LENGTH)],
        }
    }

    pub fn from_bits(bits: &[Bit]) -> Self {
        let mut row = Self::new_length(bits.len());
        for (index, &bit) in bits.iter().enumerate() {
            row.set(index, bit);
        }
        row
    }

    pub fn len(&self) -> usize {
        self.length
    }

    pub fn is_empty(&self) -> bool {
        self.length == 0
    }

    pub fn set(&mut self, index: usize, value: Bit) {
        debug_assert!(index < self.length, "index {index} out of bound {}", self.length);
        let (unit, bit) = (index / BIT_UNIT_LENGTH, index % BIT_UNIT_LENGTH);
        if value {
            self.units[unit] |= 0x01 << bit;
        } else {
            self.units[unit] &= !(0x01 << bit);
        }
    }

    pub fn get(&self, index: usize) -> Bit {
        debug_assert!(index < self.length, "index {index} out of bound {}", self.length);
        self.units[index / BIT_UNIT_LENGTH] & (0x01 << (index % BIT_UNIT_LENGTH)) != 0
    }

    pub fn flip(&mut self, index: usize) {
        let value = self.get(index);
        self.set(index, !value);
    }

    pub fn add(&mut self, other: &Self) {
        debug_assert_eq!(self.length, other.length, "size must be the same");
        for (unit, other_unit) in self.units.iter_mut().zip(other.units.iter()) {
            *unit ^= other_unit;
        }
    }

    /// mod-2 inner product
    pub fn dot(&self, other: &Self) -> Bit {
        debug_assert_eq!(self.length, other.length, "size must be the same");
        let ones: u32 = self
            .units
            .iter()
            .zip(other.units.iter())
            .map(|(unit, other_unit)| (unit & other_unit).count_ones())
            .sum();
        ones % 2 == 1
    }

    pub fn weight(&self) -> usize {
        self.units.iter().map(|unit| unit.count_ones() as usize).sum()
    }

    pub fn is_all_zero(&self) -> bool {
        self.units.iter().all(|&unit| unit == 0)
    }

    /// cyclic rotation to the right by one position, the last bit moves to the front
    pub fn rotate_right(&self) -> Self {
        let mut rotated = Self::new_length(self.length);
        for index in 0..self.length {
            if self.get(index) {
                rotated.set((index + 1) % self.length, true);
            }
        }
        rotated
    }

    pub fn to_bits(&self) -> Vec<Bit> {
        (0..self.length).map(|index| self.get(index)).collect()
    }
}

impl std::fmt::Display for BitRow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", bits_to_string(&self.to_bits()))
    }
}

impl std::fmt::Debug for BitRow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "BitRow({self})")
    }
}
