//! Permanence initialization and learning.
//!
//! Permanences are continuous synapse strengths in `[syn_perm_min,
//! syn_perm_max]`, stored only over a column's potential pool. Every write
//! goes through [`SpatialLattice::update_permanences_for_column`], which
//! clips, prunes values at or below the trim threshold and re-derives the
//! column's connected row and count. Nothing else writes the connected
//! matrix.
//!
//! # Learning
//!
//! For each winning column and each input in its pool:
//!
//! - active input: `+ syn_perm_active_inc`
//! - inactive input: `- syn_perm_inactive_dec`
//!
//! Once the duty cycles and their floors are current, columns whose active
//! duty cycle fell below the floor get `+ syn_perm_below_stimulus_inc` over
//! their whole pool, whatever the input.

use crate::config::LatticeConfig;
use crate::error::{LatticeError, Result};
use crate::input::InputPattern;
use crate::lattice::SpatialLattice;
use crate::utils::clip;
use rand::Rng;

/// Draw initial permanences for the inputs of a potential pool.
///
/// Each synapse starts connected with probability `init_connected_pct`,
/// drawn from `(syn_perm_connected, syn_perm_max]`; otherwise it is drawn
/// from `[syn_perm_min, syn_perm_connected)`. Clipping and trimming happen
/// when the values are written to a lattice.
pub fn init_permanences<R: Rng>(
    config: &LatticeConfig,
    pool: &[usize],
    rng: &mut R,
) -> Vec<(usize, f64)> {
    pool.iter()
        .map(|&input| {
            let perm = if rng.gen::<f64>() < config.init_connected_pct {
                init_perm_connected(config, rng)
            } else {
                init_perm_non_connected(config, rng)
            };
            (input, perm)
        })
        .collect()
}

/// Uniform in `(syn_perm_connected, syn_perm_max]`.
fn init_perm_connected<R: Rng>(config: &LatticeConfig, rng: &mut R) -> f64 {
    let span = config.syn_perm_max - config.syn_perm_connected;
    config.syn_perm_max - span * rng.gen::<f64>()
}

/// Uniform in `[syn_perm_min, syn_perm_connected)`.
fn init_perm_non_connected<R: Rng>(config: &LatticeConfig, rng: &mut R) -> f64 {
    let span = config.syn_perm_connected - config.syn_perm_min;
    config.syn_perm_min + span * rng.gen::<f64>()
}

impl SpatialLattice {
    /// Adjust the permanences of the winning columns toward `input`.
    ///
    /// Each touched row's connected synapses and count are recomputed
    /// locally.
    pub fn adapt_synapses(&mut self, input: &InputPattern, active_columns: &[usize]) -> Result<()> {
        self.check_input(input)?;
        let active = self.normalize_columns(active_columns)?;

        let inc = self.config.syn_perm_active_inc;
        let dec = self.config.syn_perm_inactive_dec;

        for column in active {
            let pool = self.potential_pools.row_offsets(column)?;
            let mut updated = Vec::with_capacity(pool.len());
            for input_idx in pool {
                let perm = self.permanences.get(&[column, input_idx])?;
                let delta = if input.get_bit(input_idx) { inc } else { -dec };
                updated.push((input_idx, perm + delta));
            }
            self.update_permanences_for_column(column, updated)?;
        }
        Ok(())
    }

    /// Raise every pooled permanence of columns whose active duty cycle is
    /// below their minimum by `syn_perm_below_stimulus_inc`.
    ///
    /// Returns the columns that were bumped.
    pub fn bump_up_weak_columns(&mut self) -> Result<Vec<usize>> {
        let weak: Vec<usize> = (0..self.num_columns())
            .filter(|&c| self.active_duty_cycles[c] < self.min_active_duty_cycles[c])
            .collect();

        let inc = self.config.syn_perm_below_stimulus_inc;
        for &column in &weak {
            let pool = self.potential_pools.row_offsets(column)?;
            let mut updated = Vec::with_capacity(pool.len());
            for input_idx in pool {
                let perm = self.permanences.get(&[column, input_idx])?;
                updated.push((input_idx, perm + inc));
            }
            self.update_permanences_for_column(column, updated)?;
        }

        Ok(weak)
    }

    /// Replace the permanence row of `column` and re-derive its connected
    /// state.
    ///
    /// Values are clipped to `[syn_perm_min, syn_perm_max]`; values at or
    /// below `syn_perm_trim_threshold` are not stored. Fails with
    /// `NotInPotentialPool` before touching the row if any input lies outside
    /// the column's pool.
    pub(crate) fn update_permanences_for_column(
        &mut self,
        column: usize,
        perms: Vec<(usize, f64)>,
    ) -> Result<()> {
        for &(input, _) in &perms {
            if !self.potential_pools.get(&[column, input])? {
                return Err(LatticeError::NotInPotentialPool { column, input });
            }
        }

        let (lo, hi) = (self.config.syn_perm_min, self.config.syn_perm_max);
        let trim = self.config.syn_perm_trim_threshold;

        self.permanences.clear_row(column)?;
        for (input, value) in perms {
            let value = clip(value, lo, hi);
            if value > trim {
                self.permanences.set(&[column, input], value)?;
            }
        }

        self.update_connected_for_column(column)
    }

    /// Re-derive the connected row and count of `column` from its permanences.
    fn update_connected_for_column(&mut self, column: usize) -> Result<()> {
        let threshold = self.config.syn_perm_connected;

        self.connected_synapses.clear_row(column)?;
        let mut count = 0;
        for (input, value) in self.permanences.row(column)? {
            if value >= threshold {
                self.connected_synapses.set(&[column, input], true)?;
                count += 1;
            }
        }
        self.connected_counts[column] = count;
        Ok(())
    }
}
