//! InputPattern - binary input activity vector presented to the lattice.
//!
//! A thin wrapper over `BitVec<u32, Lsb0>` that can be built from a dense
//! boolean slice or from the sparse list of active bit positions.

use crate::error::{LatticeError, Result};
use bitvec::prelude::*;
use serde::{Deserialize, Serialize};

/// Binary activity over the flattened input space.
///
/// # Examples
///
/// ```
/// use spatial_lattice::InputPattern;
///
/// let input = InputPattern::from_acts(100, &[2, 5, 40]).unwrap();
/// assert_eq!(input.num_bits(), 100);
/// assert_eq!(input.num_set(), 3);
/// assert!(input.get_bit(5));
/// assert!(!input.get_bit(9));
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputPattern {
    bv: BitVec<u32, Lsb0>,
}

impl InputPattern {
    /// Create an all-inactive pattern of `n` bits.
    #[inline]
    pub fn new(n: usize) -> Self {
        Self {
            bv: BitVec::repeat(false, n),
        }
    }

    /// Build from a dense activity vector.
    pub fn from_dense(bits: &[bool]) -> Self {
        Self {
            bv: bits.iter().copied().collect(),
        }
    }

    /// Build from the positions of the active bits.
    pub fn from_acts(n: usize, acts: &[usize]) -> Result<Self> {
        let mut pattern = Self::new(n);
        for &b in acts {
            if b >= n {
                return Err(LatticeError::IndexOutOfBounds { index: b, length: n });
            }
            pattern.set_bit(b);
        }
        Ok(pattern)
    }

    /// Total number of bits.
    #[inline(always)]
    pub fn num_bits(&self) -> usize {
        self.bv.len()
    }

    /// Activate bit `b`.
    #[inline]
    pub fn set_bit(&mut self, b: usize) {
        debug_assert!(b < self.bv.len(), "bit index {} out of bounds (length: {})", b, self.bv.len());
        self.bv.set(b, true);
    }

    /// Deactivate bit `b`.
    #[inline]
    pub fn clear_bit(&mut self, b: usize) {
        debug_assert!(b < self.bv.len(), "bit index {} out of bounds (length: {})", b, self.bv.len());
        self.bv.set(b, false);
    }

    /// Whether bit `b` is active.
    #[inline]
    pub fn get_bit(&self, b: usize) -> bool {
        debug_assert!(b < self.bv.len(), "bit index {} out of bounds (length: {})", b, self.bv.len());
        self.bv[b]
    }

    /// Deactivate every bit.
    pub fn clear_all(&mut self) {
        self.bv.fill(false);
    }

    /// Number of active bits.
    #[inline]
    pub fn num_set(&self) -> usize {
        self.bv.count_ones()
    }

    /// Positions of the active bits, ascending.
    pub fn acts(&self) -> Vec<usize> {
        self.bv.iter_ones().collect()
    }
}

impl From<&[bool]> for InputPattern {
    fn from(bits: &[bool]) -> Self {
        Self::from_dense(bits)
    }
}
