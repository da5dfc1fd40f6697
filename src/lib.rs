//! Spatial Lattice - memory, state and update algorithms for spatial pooling
//!
//! Spatial pooling maps a binary input vector onto a sparse set of active
//! columns and learns that mapping over time. This crate implements the
//! stateful core of the process: the sparse connectivity-and-permanence
//! model and the procedures that initialize, learn and adapt it.
//!
//! # Architecture
//!
//! - **SparseMatrix**: hash-backed containers keyed by folded coordinates
//! - **Topology**: column and input spaces, stride math, neighborhoods
//! - **SpatialLattice**: the aggregate state owned by one pooling session
//! - **Potential pools**: which inputs a column may ever connect to
//! - **Permanences**: initialization and Hebbian-style learning
//! - **Inhibition radius**: neighborhood size from connected-synapse spread
//! - **Duty cycles & boosting**: activity statistics and under-use rescue
//!
//! Encoding inputs and choosing the winning columns are left to the caller:
//! the lattice supplies overlap scores, tie-breakers and the inhibition
//! radius, and consumes the winners once per iteration.
//!
//! # Examples
//!
//! ```
//! use spatial_lattice::{InputPattern, LatticeConfig, SpatialLattice, Topology};
//!
//! let topology = Topology::new(&[32], &[64]).unwrap();
//! let config = LatticeConfig {
//!     seed: 7,
//!     ..Default::default()
//! };
//! let mut lattice = SpatialLattice::new(topology, config).unwrap();
//!
//! let input = InputPattern::from_acts(64, &[1, 2, 3, 30, 31, 32]).unwrap();
//! let overlaps = lattice.calculate_overlaps(&input).unwrap();
//! lattice.step(&input, &overlaps, &[0, 5, 9], true).unwrap();
//!
//! for c in 0..lattice.num_columns() {
//!     let row = lattice.connected_row(c).unwrap();
//!     assert_eq!(row.len(), lattice.connected_counts()[c]);
//! }
//! ```
//!
//! # Determinism
//!
//! Every random draw comes from a stream seeded by `(seed, column)`, so two
//! lattices built from the same topology and configuration hold identical
//! potential pools, permanences and tie-breakers.

pub mod error;
pub mod utils;

pub mod config;
pub mod input;
pub mod sparse_matrix;
pub mod topology;

pub mod lattice;

pub mod duty_cycle;
pub mod inhibition;
pub mod permanence;
pub mod potential_pool;

pub use config::{DensityMode, LatticeConfig};
pub use error::{LatticeError, Result};
pub use input::InputPattern;
pub use lattice::SpatialLattice;
pub use sparse_matrix::{SparseMatrix, SparseValue};
pub use topology::{Shape, Topology};

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name
pub const NAME: &str = "SpatialLattice";

/// Get version string
pub fn version() -> String {
    format!("{} v{}", NAME, VERSION)
}
