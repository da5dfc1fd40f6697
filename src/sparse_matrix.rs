//! SparseMatrix - containers keyed by multi-dimensional coordinates.
//!
//! Entries are stored in a hash map keyed by the linear index folded from the
//! coordinate (see [`Shape`]). Only non-default values are kept: writing the
//! default value removes the entry. A per-row index of populated offsets keeps
//! row aggregation and iteration proportional to the populated entries only.
//!
//! The first dimension is the row; the remaining dimensions are folded into
//! an in-row offset. For the lattice's `[numColumns, numInputs]` matrices
//! the row is a column index and the offset an input index.
//!
//! # Examples
//!
//! ```
//! use spatial_lattice::SparseMatrix;
//!
//! let mut perms: SparseMatrix<f64> = SparseMatrix::new(&[4, 10]).unwrap();
//! perms.set(&[1, 3], 0.25).unwrap();
//! perms.set(&[1, 7], 0.5).unwrap();
//!
//! assert_eq!(perms.get(&[1, 3]).unwrap(), 0.25);
//! assert_eq!(perms.get(&[0, 3]).unwrap(), 0.0);
//! assert_eq!(perms.row_sum(1).unwrap(), 0.75);
//!
//! // Storing the default removes the entry
//! perms.set(&[1, 3], 0.0).unwrap();
//! assert_eq!(perms.nnz(), 1);
//! ```

use crate::error::{LatticeError, Result};
use crate::topology::Shape;
use fxhash::FxHashMap;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

/// Value types storable in a [`SparseMatrix`].
///
/// `Default::default()` is the implicit value of every absent entry.
pub trait SparseValue: Copy + Default + PartialEq + fmt::Debug {
    /// Numeric view used by row aggregation.
    fn to_f64(self) -> f64;
}

impl SparseValue for f64 {
    #[inline]
    fn to_f64(self) -> f64 {
        self
    }
}

impl SparseValue for f32 {
    #[inline]
    fn to_f64(self) -> f64 {
        self as f64
    }
}

impl SparseValue for u8 {
    #[inline]
    fn to_f64(self) -> f64 {
        self as f64
    }
}

impl SparseValue for u32 {
    #[inline]
    fn to_f64(self) -> f64 {
        self as f64
    }
}

impl SparseValue for usize {
    #[inline]
    fn to_f64(self) -> f64 {
        self as f64
    }
}

impl SparseValue for bool {
    #[inline]
    fn to_f64(self) -> f64 {
        if self {
            1.0
        } else {
            0.0
        }
    }
}

/// Sparse container over a fixed coordinate space.
#[derive(Debug, Clone)]
pub struct SparseMatrix<T: SparseValue> {
    shape: Shape,
    row_len: usize,
    entries: FxHashMap<usize, T>,
    rows: BTreeMap<usize, BTreeSet<usize>>,
}

impl<T: SparseValue> SparseMatrix<T> {
    /// Create an empty matrix over `dims`.
    ///
    /// Fails with `Configuration` if `dims` is empty or holds a zero.
    pub fn new(dims: &[usize]) -> Result<Self> {
        let shape = Shape::new(dims)?;
        let row_len = shape.size() / shape.dims()[0];
        Ok(Self {
            shape,
            row_len,
            entries: FxHashMap::default(),
            rows: BTreeMap::new(),
        })
    }

    /// Coordinate space of the matrix.
    #[inline]
    pub fn shape(&self) -> &Shape {
        &self.shape
    }

    /// Extent of the first dimension.
    #[inline]
    pub fn num_rows(&self) -> usize {
        self.shape.dims()[0]
    }

    /// Number of positions per row.
    #[inline]
    pub fn row_len(&self) -> usize {
        self.row_len
    }

    /// Number of stored (non-default) entries.
    #[inline]
    pub fn nnz(&self) -> usize {
        self.entries.len()
    }

    /// Whether no entry is stored.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Value at `coords`, or the default if absent.
    pub fn get(&self, coords: &[usize]) -> Result<T> {
        let index = self.shape.index_of(coords)?;
        Ok(self.entries.get(&index).copied().unwrap_or_default())
    }

    /// Store `value` at `coords`; storing the default removes the entry.
    pub fn set(&mut self, coords: &[usize], value: T) -> Result<()> {
        let index = self.shape.index_of(coords)?;
        self.store(index, value);
        Ok(())
    }

    /// Value at a linear index, or the default if absent.
    pub fn get_index(&self, index: usize) -> Result<T> {
        self.check_index(index)?;
        Ok(self.entries.get(&index).copied().unwrap_or_default())
    }

    /// Store `value` at a linear index; storing the default removes the entry.
    pub fn set_index(&mut self, index: usize, value: T) -> Result<()> {
        self.check_index(index)?;
        self.store(index, value);
        Ok(())
    }

    /// Populated `(offset, value)` pairs of `row`, ascending by offset.
    pub fn row(&self, row: usize) -> Result<Vec<(usize, T)>> {
        self.check_row(row)?;
        let base = row * self.row_len;
        Ok(self
            .rows
            .get(&row)
            .map(|offsets| {
                offsets
                    .iter()
                    .map(|&off| (off, self.entries[&(base + off)]))
                    .collect()
            })
            .unwrap_or_default())
    }

    /// Populated offsets of `row`, ascending.
    pub fn row_offsets(&self, row: usize) -> Result<Vec<usize>> {
        self.check_row(row)?;
        Ok(self
            .rows
            .get(&row)
            .map(|offsets| offsets.iter().copied().collect())
            .unwrap_or_default())
    }

    /// Number of populated entries in `row`.
    pub fn row_nnz(&self, row: usize) -> Result<usize> {
        self.check_row(row)?;
        Ok(self.rows.get(&row).map_or(0, BTreeSet::len))
    }

    /// Sum of the populated entries of `row`.
    pub fn row_sum(&self, row: usize) -> Result<f64> {
        Ok(self.row(row)?.into_iter().map(|(_, v)| v.to_f64()).sum())
    }

    /// Largest populated entry of `row`, or `None` for an empty row.
    pub fn row_max(&self, row: usize) -> Result<Option<T>>
    where
        T: PartialOrd,
    {
        Ok(self
            .row(row)?
            .into_iter()
            .map(|(_, v)| v)
            .fold(None, |acc, v| match acc {
                Some(m) if m >= v => Some(m),
                _ => Some(v),
            }))
    }

    /// Remove every entry of `row`.
    pub fn clear_row(&mut self, row: usize) -> Result<()> {
        self.check_row(row)?;
        let base = row * self.row_len;
        if let Some(offsets) = self.rows.remove(&row) {
            for off in offsets {
                self.entries.remove(&(base + off));
            }
        }
        Ok(())
    }

    /// Indices of the rows holding at least one entry, ascending.
    pub fn populated_rows(&self) -> impl Iterator<Item = usize> + '_ {
        self.rows.keys().copied()
    }

    fn store(&mut self, index: usize, value: T) {
        let row = index / self.row_len;
        let off = index % self.row_len;

        if value == T::default() {
            if self.entries.remove(&index).is_some() {
                if let Some(offsets) = self.rows.get_mut(&row) {
                    offsets.remove(&off);
                    if offsets.is_empty() {
                        self.rows.remove(&row);
                    }
                }
            }
        } else {
            self.entries.insert(index, value);
            self.rows.entry(row).or_default().insert(off);
        }
    }

    #[inline]
    fn check_index(&self, index: usize) -> Result<()> {
        if index >= self.shape.size() {
            return Err(LatticeError::IndexOutOfBounds {
                index,
                length: self.shape.size(),
            });
        }
        Ok(())
    }

    #[inline]
    fn check_row(&self, row: usize) -> Result<()> {
        if row >= self.num_rows() {
            return Err(LatticeError::IndexOutOfBounds {
                index: row,
                length: self.num_rows(),
            });
        }
        Ok(())
    }
}
