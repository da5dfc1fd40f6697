//! Error types for the spatial lattice.
//!
//! This module provides a unified error type for all fallible operations on
//! the lattice, its sparse matrices and its configuration, using the
//! `thiserror` crate for ergonomic error handling.

use thiserror::Error;

/// The main error type for lattice operations.
#[derive(Error, Debug)]
pub enum LatticeError {
    /// Topology or parameter values are invalid. Fatal to construction.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Coordinate or linear index outside the addressed space
    #[error("Index out of bounds: index {index}, length {length}")]
    IndexOutOfBounds {
        /// The index that was accessed
        index: usize,
        /// The valid length along that axis
        length: usize,
    },

    /// Coordinate has the wrong number of dimensions
    #[error("Coordinate rank mismatch: expected {expected} dimensions, got {actual}")]
    RankMismatch {
        /// Rank of the addressed space
        expected: usize,
        /// Rank of the supplied coordinate
        actual: usize,
    },

    /// Input vector or per-column slice does not match the expected size
    #[error("Invalid input size: expected {expected}, got {actual}")]
    InvalidInputSize {
        /// Expected size
        expected: usize,
        /// Actual size received
        actual: usize,
    },

    /// A permanence was addressed outside the column's potential pool
    #[error("Input {input} is not in the potential pool of column {column}")]
    NotInPotentialPool {
        /// Column index
        column: usize,
        /// Input index
        input: usize,
    },

    /// Configuration document could not be parsed or rendered
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl LatticeError {
    /// Whether this error signals an out-of-range or mis-ranked coordinate.
    pub fn is_index_error(&self) -> bool {
        matches!(
            self,
            LatticeError::IndexOutOfBounds { .. } | LatticeError::RankMismatch { .. }
        )
    }
}

/// A specialized `Result` type for lattice operations.
pub type Result<T> = std::result::Result<T, LatticeError>;
