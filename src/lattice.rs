//! SpatialLattice - memory and state of a spatial pooling session.
//!
//! The lattice owns every structure the pooling procedures act on:
//!
//! - **Potential pools** - which inputs each column may ever connect to
//! - **Permanences** - learned synapse strengths over the potential pools
//! - **Connected synapses / counts** - derived from the permanences, never set directly
//! - **Tie-breakers** - tiny fixed random values used to order equal overlaps
//! - **Inhibition radius** and the column neighborhoods it implies
//! - **Duty cycles and boost factors** - per-column activity statistics
//!
//! The procedures themselves live in sibling modules as further `impl`
//! blocks: [`potential_pool`](crate::potential_pool),
//! [`permanence`](crate::permanence), [`inhibition`](crate::inhibition) and
//! [`duty_cycle`](crate::duty_cycle).
//!
//! # Lifecycle
//!
//! 1. `SpatialLattice::new` validates the configuration, allocates the
//!    matrices, maps every column's potential pool, initializes permanences
//!    and tie-breakers and seeds the inhibition radius.
//! 2. Each input presentation calls [`SpatialLattice::step`] with the
//!    overlaps and winning columns chosen by the external inhibition stage.
//!
//! # Examples
//!
//! ```
//! use spatial_lattice::{InputPattern, LatticeConfig, SpatialLattice, Topology};
//!
//! let topology = Topology::new(&[64], &[128]).unwrap();
//! let mut lattice = SpatialLattice::new(topology, LatticeConfig::default()).unwrap();
//!
//! let input = InputPattern::from_acts(128, &[3, 17, 40, 41, 42, 99]).unwrap();
//! let overlaps = lattice.calculate_overlaps(&input).unwrap();
//!
//! // A trivial stand-in for the inhibition stage: the top 4 columns win
//! let mut order: Vec<usize> = (0..64).collect();
//! order.sort_by(|&a, &b| overlaps[b].partial_cmp(&overlaps[a]).unwrap());
//! let winners = &order[..4];
//!
//! lattice.step(&input, &overlaps, winners, true).unwrap();
//! assert_eq!(lattice.iteration_learn_num(), 1);
//! ```

use crate::config::LatticeConfig;
use crate::error::{LatticeError, Result};
use crate::input::InputPattern;
use crate::permanence::init_permanences;
use crate::potential_pool::map_potential;
use crate::sparse_matrix::SparseMatrix;
use crate::topology::Topology;
use crate::utils::column_rng;
use rand::Rng;
use std::fmt;
use tracing::{debug, info, trace};

/// Scale of the tie-breaker values.
pub const TIE_BREAKER_SCALE: f64 = 0.01;

/// Aggregate state of a spatial pooling session.
#[derive(Debug, Clone)]
pub struct SpatialLattice {
    pub(crate) topology: Topology,
    pub(crate) config: LatticeConfig,

    pub(crate) potential_pools: SparseMatrix<bool>,
    pub(crate) permanences: SparseMatrix<f64>,
    pub(crate) connected_synapses: SparseMatrix<bool>,
    pub(crate) connected_counts: Vec<usize>,
    pub(crate) tie_breaker: SparseMatrix<f64>,

    pub(crate) inhibition_radius: usize,

    pub(crate) overlap_duty_cycles: Vec<f64>,
    pub(crate) active_duty_cycles: Vec<f64>,
    pub(crate) min_overlap_duty_cycles: Vec<f64>,
    pub(crate) min_active_duty_cycles: Vec<f64>,
    pub(crate) boost_factors: Vec<f64>,

    pub(crate) iteration_num: u64,
    pub(crate) iteration_learn_num: u64,
}

impl SpatialLattice {
    /// Create a lattice and run the one-time initialization sequence.
    ///
    /// # Errors
    ///
    /// `Configuration` if the configuration fails validation.
    pub fn new(topology: Topology, config: LatticeConfig) -> Result<Self> {
        let mut lattice = Self::unconnected(topology, config)?;
        lattice.connect_inputs()?;

        info!(
            num_columns = lattice.num_columns(),
            num_inputs = lattice.num_inputs(),
            inhibition_radius = lattice.inhibition_radius,
            "spatial lattice initialized"
        );
        if lattice.config.verbosity > 0 {
            for (name, value) in lattice.parameters() {
                info!("{:<27}= {}", name, value);
            }
        }

        Ok(lattice)
    }

    /// Create a lattice with allocated but empty structures.
    ///
    /// No potential pools are mapped; use [`connect_inputs`](Self::connect_inputs)
    /// or the injection accessors to populate them.
    pub fn unconnected(topology: Topology, config: LatticeConfig) -> Result<Self> {
        config.validate()?;

        let num_columns = topology.num_columns();
        let dims = [num_columns, topology.num_inputs()];

        Ok(Self {
            potential_pools: SparseMatrix::new(&dims)?,
            permanences: SparseMatrix::new(&dims)?,
            connected_synapses: SparseMatrix::new(&dims)?,
            connected_counts: vec![0; num_columns],
            tie_breaker: SparseMatrix::new(&dims)?,
            inhibition_radius: 0,
            overlap_duty_cycles: vec![0.0; num_columns],
            active_duty_cycles: vec![0.0; num_columns],
            min_overlap_duty_cycles: vec![0.0; num_columns],
            min_active_duty_cycles: vec![0.0; num_columns],
            boost_factors: vec![1.0; num_columns],
            iteration_num: 0,
            iteration_learn_num: 0,
            topology,
            config,
        })
    }

    /// Map potential pools, initialize permanences and tie-breakers for every
    /// column, then seed the inhibition radius.
    ///
    /// Column `c` draws from its own stream seeded by `(seed, c)`, in the
    /// order pool, permanences, tie-breakers.
    pub fn connect_inputs(&mut self) -> Result<()> {
        for column in 0..self.num_columns() {
            let mut rng = column_rng(self.config.seed, column);

            let pool = map_potential(&self.topology, &self.config, column, &mut rng)?;
            let perms = init_permanences(&self.config, &pool, &mut rng);

            self.write_potential_pool(column, &pool)?;
            self.update_permanences_for_column(column, perms)?;

            self.tie_breaker.clear_row(column)?;
            for &input in &pool {
                let value = TIE_BREAKER_SCALE * rng.gen::<f64>();
                self.tie_breaker.set(&[column, input], value)?;
            }
        }

        self.update_inhibition_radius()
    }

    // =========================================================================
    // Read accessors
    // =========================================================================

    /// Column and input spaces.
    #[inline]
    pub fn topology(&self) -> &Topology {
        &self.topology
    }

    /// Validated configuration.
    #[inline]
    pub fn config(&self) -> &LatticeConfig {
        &self.config
    }

    /// Product of the column dimensions.
    #[inline]
    pub fn num_columns(&self) -> usize {
        self.topology.num_columns()
    }

    /// Product of the input dimensions.
    #[inline]
    pub fn num_inputs(&self) -> usize {
        self.topology.num_inputs()
    }

    /// Potential radius actually used by the mapper, capped at the input count.
    pub fn potential_radius(&self) -> usize {
        self.config.potential_radius.min(self.num_inputs())
    }

    /// Potential-pool membership over `(column, input)`.
    pub fn potential_pools(&self) -> &SparseMatrix<bool> {
        &self.potential_pools
    }

    /// Input indices in the potential pool of `column`, ascending.
    pub fn potential_pool(&self, column: usize) -> Result<Vec<usize>> {
        self.potential_pools.row_offsets(column)
    }

    /// Permanences over `(column, input)`.
    pub fn permanences(&self) -> &SparseMatrix<f64> {
        &self.permanences
    }

    /// Stored `(input, permanence)` pairs of `column`, ascending by input.
    pub fn permanence_row(&self, column: usize) -> Result<Vec<(usize, f64)>> {
        self.permanences.row(column)
    }

    /// Connected-synapse flags over `(column, input)`.
    pub fn connected_synapses(&self) -> &SparseMatrix<bool> {
        &self.connected_synapses
    }

    /// Inputs `column` is connected to, ascending.
    pub fn connected_row(&self, column: usize) -> Result<Vec<usize>> {
        self.connected_synapses.row_offsets(column)
    }

    /// Number of connected synapses per column.
    pub fn connected_counts(&self) -> &[usize] {
        &self.connected_counts
    }

    /// Tie-breaker values over `(column, input)`.
    pub fn tie_breaker(&self) -> &SparseMatrix<f64> {
        &self.tie_breaker
    }

    /// Current inhibition radius in column space.
    #[inline]
    pub fn inhibition_radius(&self) -> usize {
        self.inhibition_radius
    }

    /// Moving average of how often each column's overlap beat the threshold.
    pub fn overlap_duty_cycles(&self) -> &[f64] {
        &self.overlap_duty_cycles
    }

    /// Moving average of how often each column won.
    pub fn active_duty_cycles(&self) -> &[f64] {
        &self.active_duty_cycles
    }

    /// Overlap duty-cycle floor per column.
    pub fn min_overlap_duty_cycles(&self) -> &[f64] {
        &self.min_overlap_duty_cycles
    }

    /// Active duty-cycle floor per column.
    pub fn min_active_duty_cycles(&self) -> &[f64] {
        &self.min_active_duty_cycles
    }

    /// Boost factor per column, each in `[1, max_boost]`.
    pub fn boost_factors(&self) -> &[f64] {
        &self.boost_factors
    }

    /// Iterations presented so far.
    #[inline]
    pub fn iteration_num(&self) -> u64 {
        self.iteration_num
    }

    /// Learning iterations presented so far.
    #[inline]
    pub fn iteration_learn_num(&self) -> u64 {
        self.iteration_learn_num
    }

    // =========================================================================
    // Write accessors (initialization only)
    // =========================================================================

    /// Replace the potential pool of `column`.
    ///
    /// Stored permanences outside the new pool are dropped and the connected
    /// row re-derived. Every input is checked before anything is written.
    pub fn set_potential_pool(&mut self, column: usize, inputs: &[usize]) -> Result<()> {
        self.check_column(column)?;
        for &input in inputs {
            if input >= self.num_inputs() {
                return Err(LatticeError::IndexOutOfBounds {
                    index: input,
                    length: self.num_inputs(),
                });
            }
        }
        self.write_potential_pool(column, inputs)?;

        let mut kept = Vec::new();
        for (input, perm) in self.permanences.row(column)? {
            if self.potential_pools.get(&[column, input])? {
                kept.push((input, perm));
            }
        }
        self.update_permanences_for_column(column, kept)?;

        debug!(column, pool_size = inputs.len(), "potential pool injected");
        Ok(())
    }

    /// Replace the permanences of `column`.
    ///
    /// Every input must belong to the column's potential pool. Values are
    /// clipped and trimmed, and the connected row is re-derived.
    pub fn set_permanences(&mut self, column: usize, entries: &[(usize, f64)]) -> Result<()> {
        self.check_column(column)?;
        self.update_permanences_for_column(column, entries.to_vec())?;
        debug!(column, connected = self.connected_counts[column], "permanences injected");
        Ok(())
    }

    /// Override the inhibition radius.
    #[inline]
    pub fn set_inhibition_radius(&mut self, radius: usize) {
        self.inhibition_radius = radius;
    }

    /// Overwrite the overlap duty cycles.
    pub fn set_overlap_duty_cycles(&mut self, values: &[f64]) -> Result<()> {
        self.check_len(values.len())?;
        self.overlap_duty_cycles.copy_from_slice(values);
        Ok(())
    }

    /// Overwrite the active duty cycles.
    pub fn set_active_duty_cycles(&mut self, values: &[f64]) -> Result<()> {
        self.check_len(values.len())?;
        self.active_duty_cycles.copy_from_slice(values);
        Ok(())
    }

    // =========================================================================
    // Overlap scoring
    // =========================================================================

    /// Count each column's connected synapses on active inputs.
    ///
    /// Scores below the stimulus threshold are reported as 0.
    pub fn calculate_overlaps(&self, input: &InputPattern) -> Result<Vec<f64>> {
        self.check_input(input)?;

        let mut overlaps = vec![0.0; self.num_columns()];
        for column in self.connected_synapses.populated_rows() {
            let count = self
                .connected_synapses
                .row_offsets(column)?
                .into_iter()
                .filter(|&j| input.get_bit(j))
                .count() as f64;
            if count >= self.config.stimulus_threshold {
                overlaps[column] = count;
            }
        }
        Ok(overlaps)
    }

    /// Multiply each overlap by its column's boost factor.
    pub fn boosted_overlaps(&self, overlaps: &[f64]) -> Result<Vec<f64>> {
        self.check_len(overlaps.len())?;
        Ok(overlaps
            .iter()
            .zip(&self.boost_factors)
            .map(|(o, b)| o * b)
            .collect())
    }

    /// Add each column's mean tie-breaker value over its active pooled inputs.
    ///
    /// The added amount is below [`TIE_BREAKER_SCALE`], so distinct integer
    /// overlaps keep their order.
    pub fn tie_broken_overlaps(&self, overlaps: &[f64], input: &InputPattern) -> Result<Vec<f64>> {
        self.check_len(overlaps.len())?;
        self.check_input(input)?;

        let mut out = overlaps.to_vec();
        for column in self.tie_breaker.populated_rows() {
            let active: Vec<f64> = self
                .tie_breaker
                .row(column)?
                .into_iter()
                .filter(|&(j, _)| input.get_bit(j))
                .map(|(_, v)| v)
                .collect();
            if !active.is_empty() {
                out[column] += active.iter().sum::<f64>() / active.len() as f64;
            }
        }
        Ok(out)
    }

    // =========================================================================
    // Iteration driver
    // =========================================================================

    /// Run one iteration given the inhibition stage's overlaps and winners.
    ///
    /// When `learn` is set: permanence update, duty cycles and their floors,
    /// boost rescue of under-active columns, boost factors, and every
    /// `update_period` iterations an inhibition-radius update. Inputs are
    /// validated before any state changes.
    pub fn step(
        &mut self,
        input: &InputPattern,
        overlaps: &[f64],
        active_columns: &[usize],
        learn: bool,
    ) -> Result<()> {
        self.check_input(input)?;
        self.check_len(overlaps.len())?;
        let active = self.normalize_columns(active_columns)?;

        self.iteration_num += 1;
        if !learn {
            return Ok(());
        }
        self.iteration_learn_num += 1;

        self.adapt_synapses(input, &active)?;
        self.update_duty_cycles(overlaps, &active)?;
        self.update_min_duty_cycles()?;
        self.bump_up_weak_columns()?;
        self.update_boost_factors();

        if self.is_update_round() {
            self.update_inhibition_radius()?;
        }

        trace!(
            iteration = self.iteration_num,
            active = active.len(),
            "learning iteration complete"
        );
        Ok(())
    }

    fn is_update_round(&self) -> bool {
        self.iteration_num % u64::from(self.config.update_period) == 0
    }

    // =========================================================================
    // Diagnostics
    // =========================================================================

    /// Parameter name/value pairs for diagnostics.
    pub fn parameters(&self) -> Vec<(&'static str, String)> {
        let c = &self.config;
        vec![
            ("numInputs", self.num_inputs().to_string()),
            ("numColumns", self.num_columns().to_string()),
            ("columnDimensions", format!("{:?}", self.topology.column_dimensions())),
            ("inputDimensions", format!("{:?}", self.topology.input_dimensions())),
            (
                "numActiveColumnsPerInhArea",
                c.density.num_active_columns_per_inh_area().to_string(),
            ),
            ("potentialRadius", self.potential_radius().to_string()),
            ("potentialPct", c.potential_pct.to_string()),
            ("globalInhibition", c.global_inhibition.to_string()),
            ("localAreaDensity", c.density.local_area_density().to_string()),
            ("stimulusThreshold", c.stimulus_threshold.to_string()),
            ("synPermActiveInc", c.syn_perm_active_inc.to_string()),
            ("synPermInactiveDec", c.syn_perm_inactive_dec.to_string()),
            ("synPermConnected", c.syn_perm_connected.to_string()),
            ("synPermBelowStimulusInc", c.syn_perm_below_stimulus_inc.to_string()),
            ("synPermTrimThreshold", c.syn_perm_trim_threshold.to_string()),
            ("minPctOverlapDutyCycle", c.min_pct_overlap_duty_cycles.to_string()),
            ("minPctActiveDutyCycle", c.min_pct_active_duty_cycles.to_string()),
            ("dutyCyclePeriod", c.duty_cycle_period.to_string()),
            ("maxBoost", c.max_boost.to_string()),
            ("updatePeriod", c.update_period.to_string()),
            ("wrapAround", c.wrap_around.to_string()),
            ("seed", c.seed.to_string()),
            ("spVerbosity", c.verbosity.to_string()),
            ("version", crate::VERSION.to_string()),
        ]
    }

    // =========================================================================
    // Internal helpers
    // =========================================================================

    fn write_potential_pool(&mut self, column: usize, inputs: &[usize]) -> Result<()> {
        self.potential_pools.clear_row(column)?;
        for &input in inputs {
            self.potential_pools.set(&[column, input], true)?;
        }
        Ok(())
    }

    pub(crate) fn check_column(&self, column: usize) -> Result<()> {
        if column >= self.num_columns() {
            return Err(LatticeError::IndexOutOfBounds {
                index: column,
                length: self.num_columns(),
            });
        }
        Ok(())
    }

    pub(crate) fn check_len(&self, len: usize) -> Result<()> {
        if len != self.num_columns() {
            return Err(LatticeError::InvalidInputSize {
                expected: self.num_columns(),
                actual: len,
            });
        }
        Ok(())
    }

    pub(crate) fn check_input(&self, input: &InputPattern) -> Result<()> {
        if input.num_bits() != self.num_inputs() {
            return Err(LatticeError::InvalidInputSize {
                expected: self.num_inputs(),
                actual: input.num_bits(),
            });
        }
        Ok(())
    }

    /// Validate, sort and de-duplicate a list of column indices.
    pub(crate) fn normalize_columns(&self, columns: &[usize]) -> Result<Vec<usize>> {
        let mut out = columns.to_vec();
        for &c in &out {
            self.check_column(c)?;
        }
        out.sort_unstable();
        out.dedup();
        Ok(out)
    }
}

impl fmt::Display for SpatialLattice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "------------ SpatialLattice Parameters ------------------")?;
        for (name, value) in self.parameters() {
            writeln!(f, "{:<27}= {}", name, value)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DensityMode;

    fn small_lattice() -> SpatialLattice {
        let topology = Topology::new(&[10], &[100]).unwrap();
        let config = LatticeConfig {
            seed: 42,
            ..Default::default()
        };
        SpatialLattice::new(topology, config).unwrap()
    }

    #[test]
    fn test_unconnected_is_empty() {
        let topology = Topology::new(&[8], &[32]).unwrap();
        let lattice = SpatialLattice::unconnected(topology, LatticeConfig::default()).unwrap();

        assert!(lattice.potential_pools().is_empty());
        assert!(lattice.permanences().is_empty());
        assert_eq!(lattice.connected_counts(), &[0; 8]);
        assert_eq!(lattice.boost_factors(), &[1.0; 8]);
        assert_eq!(lattice.inhibition_radius(), 0);
    }

    #[test]
    fn test_invalid_config_rejected() {
        let topology = Topology::new(&[8], &[32]).unwrap();
        let config = LatticeConfig {
            density: DensityMode::Fixed(0.0),
            ..Default::default()
        };
        assert!(matches!(
            SpatialLattice::new(topology, config),
            Err(LatticeError::Configuration(_))
        ));
    }

    #[test]
    fn test_every_column_has_pool_and_tie_breakers() {
        let lattice = small_lattice();
        for column in 0..lattice.num_columns() {
            let pool = lattice.potential_pool(column).unwrap();
            assert!(!pool.is_empty());
            let ties = lattice.tie_breaker().row_offsets(column).unwrap();
            assert!(ties.iter().all(|j| pool.contains(j)));
        }
    }

    #[test]
    fn test_potential_radius_capped() {
        let topology = Topology::new(&[4], &[8]).unwrap();
        let lattice = SpatialLattice::unconnected(topology, LatticeConfig::default()).unwrap();
        assert_eq!(lattice.potential_radius(), 8);
    }

    #[test]
    fn test_overlaps_count_connected_active() {
        let topology = Topology::new(&[2], &[10]).unwrap();
        let mut lattice = SpatialLattice::unconnected(topology, LatticeConfig::default()).unwrap();
        lattice.set_potential_pool(0, &[1, 2, 3]).unwrap();
        lattice.set_permanences(0, &[(1, 0.5), (2, 0.5), (3, 0.07)]).unwrap();

        let input = InputPattern::from_acts(10, &[1, 3, 7]).unwrap();
        let overlaps = lattice.calculate_overlaps(&input).unwrap();
        assert_eq!(overlaps, vec![1.0, 0.0]);
    }

    #[test]
    fn test_stimulus_threshold_zeroes_overlap() {
        let topology = Topology::new(&[1], &[10]).unwrap();
        let config = LatticeConfig {
            stimulus_threshold: 3.0,
            ..Default::default()
        };
        let mut lattice = SpatialLattice::unconnected(topology, config).unwrap();
        lattice.set_potential_pool(0, &[1, 2]).unwrap();
        lattice.set_permanences(0, &[(1, 0.5), (2, 0.5)]).unwrap();

        let input = InputPattern::from_acts(10, &[1, 2]).unwrap();
        assert_eq!(lattice.calculate_overlaps(&input).unwrap(), vec![0.0]);
    }

    #[test]
    fn test_tie_breaker_preserves_order() {
        let lattice = small_lattice();
        let input = InputPattern::from_dense(&[true; 100]);
        let overlaps: Vec<f64> = (0..10).map(|c| c as f64).collect();
        let broken = lattice.tie_broken_overlaps(&overlaps, &input).unwrap();

        for w in broken.windows(2) {
            assert!(w[0] < w[1]);
        }
        for (o, b) in overlaps.iter().zip(&broken) {
            assert!(b - o < TIE_BREAKER_SCALE);
        }
    }

    #[test]
    fn test_step_without_learning_only_counts() {
        let mut lattice = small_lattice();
        let before = lattice.permanences().clone();
        let input = InputPattern::from_acts(100, &[1, 2, 3]).unwrap();

        lattice.step(&input, &[0.0; 10], &[0, 1], false).unwrap();
        assert_eq!(lattice.iteration_num(), 1);
        assert_eq!(lattice.iteration_learn_num(), 0);
        assert_eq!(lattice.permanences().nnz(), before.nnz());
    }

    #[test]
    fn test_step_rejects_bad_sizes() {
        let mut lattice = small_lattice();
        let input = InputPattern::new(99);
        assert!(matches!(
            lattice.step(&input, &[0.0; 10], &[], true),
            Err(LatticeError::InvalidInputSize { expected: 100, actual: 99 })
        ));

        let input = InputPattern::new(100);
        assert!(lattice.step(&input, &[0.0; 10], &[10], true).unwrap_err().is_index_error());
        assert_eq!(lattice.iteration_num(), 0);
    }

    #[test]
    fn test_failed_pool_injection_leaves_state() {
        let topology = Topology::new(&[1], &[16]).unwrap();
        let mut lattice = SpatialLattice::unconnected(topology, LatticeConfig::default()).unwrap();
        lattice.set_potential_pool(0, &[2, 5, 9]).unwrap();
        lattice.set_permanences(0, &[(2, 0.3), (5, 0.3), (9, 0.3)]).unwrap();

        let err = lattice.set_potential_pool(0, &[2, 100]).unwrap_err();
        assert!(matches!(err, LatticeError::IndexOutOfBounds { index: 100, length: 16 }));
        assert_eq!(lattice.potential_pool(0).unwrap(), vec![2, 5, 9]);
        assert_eq!(
            lattice.permanence_row(0).unwrap(),
            vec![(2, 0.3), (5, 0.3), (9, 0.3)]
        );
        assert_eq!(lattice.connected_counts(), &[3]);
    }

    #[test]
    fn test_parameter_dump() {
        let lattice = small_lattice();
        let dump = lattice.to_string();
        assert!(dump.contains("numColumns"));
        assert!(dump.contains("synPermConnected"));
        assert!(dump.contains("localAreaDensity           = -1"));
    }
}
