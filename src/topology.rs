//! Topology - coordinate math over column space and input space.
//!
//! `Shape` folds n-dimensional coordinates to linear indices with row-major
//! strides (last dimension varies fastest) and enumerates hypercube
//! neighborhoods. `Topology` pairs the column shape with the input shape and
//! maps a column onto the input position its potential pool is centred on.
//!
//! # Examples
//!
//! ```
//! use spatial_lattice::Topology;
//!
//! let topology = Topology::new(&[4, 4], &[16, 16]).unwrap();
//! assert_eq!(topology.num_columns(), 16);
//! assert_eq!(topology.num_inputs(), 256);
//!
//! // Column (0, 0) lands at input (2, 2)
//! assert_eq!(topology.map_column(0).unwrap(), 2 * 16 + 2);
//! ```

use crate::error::{LatticeError, Result};
use itertools::Itertools;

/// Dimension vector with precomputed strides.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Shape {
    dims: Vec<usize>,
    strides: Vec<usize>,
    size: usize,
}

impl Shape {
    /// Create a shape, failing if `dims` is empty or holds a zero.
    pub fn new(dims: &[usize]) -> Result<Self> {
        if dims.is_empty() {
            return Err(LatticeError::Configuration(
                "dimension vector must not be empty".into(),
            ));
        }
        if let Some(pos) = dims.iter().position(|&d| d == 0) {
            return Err(LatticeError::Configuration(format!(
                "dimension {} must be positive, got 0",
                pos
            )));
        }

        let mut strides = vec![1; dims.len()];
        for i in (0..dims.len() - 1).rev() {
            strides[i] = strides[i + 1] * dims[i + 1];
        }
        let size = dims.iter().product();

        Ok(Self {
            dims: dims.to_vec(),
            strides,
            size,
        })
    }

    /// Dimension sizes.
    #[inline]
    pub fn dims(&self) -> &[usize] {
        &self.dims
    }

    /// Row-major strides.
    #[inline]
    pub fn strides(&self) -> &[usize] {
        &self.strides
    }

    /// Number of dimensions.
    #[inline]
    pub fn rank(&self) -> usize {
        self.dims.len()
    }

    /// Total number of addressable positions (product of the dimensions).
    #[inline]
    pub fn size(&self) -> usize {
        self.size
    }

    /// Fold a coordinate to its linear index.
    pub fn index_of(&self, coords: &[usize]) -> Result<usize> {
        if coords.len() != self.dims.len() {
            return Err(LatticeError::RankMismatch {
                expected: self.dims.len(),
                actual: coords.len(),
            });
        }

        let mut index = 0;
        for ((&c, &d), &s) in coords.iter().zip(&self.dims).zip(&self.strides) {
            if c >= d {
                return Err(LatticeError::IndexOutOfBounds { index: c, length: d });
            }
            index += c * s;
        }
        Ok(index)
    }

    /// Unfold a linear index to its coordinate.
    pub fn coords_of(&self, index: usize) -> Result<Vec<usize>> {
        if index >= self.size {
            return Err(LatticeError::IndexOutOfBounds {
                index,
                length: self.size,
            });
        }
        Ok(self.coords_unchecked(index))
    }

    #[inline]
    pub(crate) fn coords_unchecked(&self, index: usize) -> Vec<usize> {
        self.dims
            .iter()
            .zip(&self.strides)
            .map(|(&d, &s)| (index / s) % d)
            .collect()
    }

    /// All positions within Chebyshev distance `radius` of `center`,
    /// sorted ascending and including `center` itself.
    ///
    /// With `wrap` the space is toroidal; a window wider than a dimension
    /// covers that dimension exactly once.
    pub fn neighborhood(&self, center: usize, radius: usize, wrap: bool) -> Result<Vec<usize>> {
        let center_coords = self.coords_of(center)?;

        let axes: Vec<Vec<usize>> = center_coords
            .iter()
            .zip(&self.dims)
            .map(|(&c, &d)| axis_window(c, d, radius, wrap))
            .collect();

        let mut neighbors: Vec<usize> = axes
            .into_iter()
            .multi_cartesian_product()
            .map(|coords| {
                coords
                    .iter()
                    .zip(&self.strides)
                    .map(|(&c, &s)| c * s)
                    .sum()
            })
            .collect();

        neighbors.sort_unstable();
        neighbors.dedup();
        Ok(neighbors)
    }
}

/// Coordinates along one axis within `radius` of `c`.
fn axis_window(c: usize, dim: usize, radius: usize, wrap: bool) -> Vec<usize> {
    if wrap && radius.saturating_mul(2).saturating_add(1) >= dim {
        return (0..dim).collect();
    }

    if wrap {
        let (c, dim, r) = (c as i64, dim as i64, radius as i64);
        (c - r..=c + r).map(|x| x.rem_euclid(dim) as usize).collect()
    } else {
        let lo = c.saturating_sub(radius);
        let hi = c.saturating_add(radius).min(dim - 1);
        (lo..=hi).collect()
    }
}

/// Column space and input space of one lattice.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Topology {
    columns: Shape,
    inputs: Shape,
}

impl Topology {
    /// Create a topology from the column and input dimension vectors.
    ///
    /// Fails with `Configuration` if either vector is empty or holds a zero.
    pub fn new(column_dimensions: &[usize], input_dimensions: &[usize]) -> Result<Self> {
        Ok(Self {
            columns: Shape::new(column_dimensions)?,
            inputs: Shape::new(input_dimensions)?,
        })
    }

    /// Column-space shape.
    #[inline]
    pub fn column_shape(&self) -> &Shape {
        &self.columns
    }

    /// Input-space shape.
    #[inline]
    pub fn input_shape(&self) -> &Shape {
        &self.inputs
    }

    /// Column dimension vector.
    pub fn column_dimensions(&self) -> &[usize] {
        self.columns.dims()
    }

    /// Input dimension vector.
    pub fn input_dimensions(&self) -> &[usize] {
        self.inputs.dims()
    }

    /// Product of the column dimensions.
    #[inline]
    pub fn num_columns(&self) -> usize {
        self.columns.size()
    }

    /// Product of the input dimensions.
    #[inline]
    pub fn num_inputs(&self) -> usize {
        self.inputs.size()
    }

    /// Map a column onto the input index at the centre of its receptive field.
    ///
    /// Each axis is scaled linearly: the column's cell centre
    /// `(coord + 0.5) * inputDim / columnDim`, floored. Input axes with no
    /// column counterpart use coordinate 0 over a column dimension of 1.
    pub fn map_column(&self, column: usize) -> Result<usize> {
        let column_coords = self.columns.coords_of(column)?;

        let input_coords: Vec<usize> = self
            .inputs
            .dims()
            .iter()
            .enumerate()
            .map(|(axis, &input_dim)| {
                let col_coord = column_coords.get(axis).copied().unwrap_or(0) as f64;
                let col_dim = self.columns.dims().get(axis).copied().unwrap_or(1) as f64;
                let coord = ((col_coord + 0.5) * input_dim as f64 / col_dim).floor() as usize;
                coord.min(input_dim - 1)
            })
            .collect();

        self.inputs.index_of(&input_coords)
    }

    /// Average ratio of column extent to input extent across axes.
    ///
    /// Vectors of different rank are padded with ones.
    pub fn avg_columns_per_input(&self) -> f64 {
        let rank = self.columns.rank().max(self.inputs.rank());
        let total: f64 = (0..rank)
            .map(|axis| {
                let col = self.columns.dims().get(axis).copied().unwrap_or(1) as f64;
                let inp = self.inputs.dims().get(axis).copied().unwrap_or(1) as f64;
                col / inp
            })
            .sum();
        total / rank as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shape_strides() {
        let shape = Shape::new(&[2, 3, 4]).unwrap();
        assert_eq!(shape.strides(), &[12, 4, 1]);
        assert_eq!(shape.size(), 24);
        assert_eq!(shape.rank(), 3);
    }

    #[test]
    fn test_shape_rejects_zero_and_empty() {
        assert!(matches!(
            Shape::new(&[4, 0]),
            Err(LatticeError::Configuration(_))
        ));
        assert!(matches!(Shape::new(&[]), Err(LatticeError::Configuration(_))));
    }

    #[test]
    fn test_index_round_trip() {
        let shape = Shape::new(&[3, 5]).unwrap();
        assert_eq!(shape.index_of(&[2, 4]).unwrap(), 14);
        assert_eq!(shape.coords_of(14).unwrap(), vec![2, 4]);
    }

    #[test]
    fn test_index_errors() {
        let shape = Shape::new(&[3, 5]).unwrap();
        assert!(matches!(
            shape.index_of(&[3, 0]),
            Err(LatticeError::IndexOutOfBounds { index: 3, length: 3 })
        ));
        assert!(matches!(
            shape.index_of(&[1]),
            Err(LatticeError::RankMismatch { expected: 2, actual: 1 })
        ));
        assert!(shape.coords_of(15).is_err());
    }

    #[test]
    fn test_neighborhood_clipped() {
        let shape = Shape::new(&[10]).unwrap();
        assert_eq!(shape.neighborhood(1, 2, false).unwrap(), vec![0, 1, 2, 3]);
    }

    #[test]
    fn test_neighborhood_wrapped() {
        let shape = Shape::new(&[10]).unwrap();
        assert_eq!(
            shape.neighborhood(1, 2, true).unwrap(),
            vec![0, 1, 2, 3, 9]
        );
    }

    #[test]
    fn test_neighborhood_wider_than_space() {
        let shape = Shape::new(&[5]).unwrap();
        assert_eq!(shape.neighborhood(2, 16, true).unwrap(), vec![0, 1, 2, 3, 4]);
        assert_eq!(shape.neighborhood(0, 16, false).unwrap(), vec![0, 1, 2, 3, 4]);
    }

    #[test]
    fn test_neighborhood_2d() {
        let shape = Shape::new(&[4, 4]).unwrap();
        let hood = shape.neighborhood(5, 1, false).unwrap();
        assert_eq!(hood, vec![0, 1, 2, 4, 5, 6, 8, 9, 10]);
    }

    #[test]
    fn test_map_column_1d() {
        let topology = Topology::new(&[10], &[100]).unwrap();
        assert_eq!(topology.map_column(0).unwrap(), 5);
        assert_eq!(topology.map_column(9).unwrap(), 95);
    }

    #[test]
    fn test_map_column_rank_mismatch() {
        let topology = Topology::new(&[4], &[8, 3]).unwrap();
        // Column 1 -> input row 3, input col floor(0.5 * 3) = 1
        assert_eq!(topology.map_column(1).unwrap(), 3 * 3 + 1);
    }

    #[test]
    fn test_avg_columns_per_input() {
        let topology = Topology::new(&[10], &[100]).unwrap();
        assert!((topology.avg_columns_per_input() - 0.1).abs() < 1e-12);
    }

    #[test]
    fn test_neighborhood_saturates_radius() {
        let shape = Shape::new(&[4, 3]).unwrap();
        for wrap in [false, true] {
            let hood = shape.neighborhood(5, usize::MAX, wrap).unwrap();
            assert_eq!(hood, (0..12).collect::<Vec<_>>());
        }
    }
}
