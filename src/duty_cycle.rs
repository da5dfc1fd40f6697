//! Duty cycles and boosting.
//!
//! Per column, two exponential moving averages with time constant
//! `duty_cycle_period` are kept:
//!
//! - overlap duty cycle: how often the overlap exceeded the stimulus threshold
//! - active duty cycle: how often the column was among the winners
//!
//! Each has a floor: a fixed fraction of the largest duty cycle in the
//! column's neighborhood. A column whose overlap duty cycle sits below its
//! floor is boosted, linearly from 1 at the floor up to `max_boost` at 0.

use crate::error::Result;
use crate::lattice::SpatialLattice;
use crate::utils::clip;

/// One step of the duty-cycle moving average.
///
/// ```
/// use spatial_lattice::duty_cycle::update_duty_cycle;
///
/// assert_eq!(update_duty_cycle(0.0, 1.0, 4.0), 0.25);
/// assert_eq!(update_duty_cycle(0.25, 0.0, 4.0), 0.1875);
/// ```
#[inline]
pub fn update_duty_cycle(old: f64, indicator: f64, period: f64) -> f64 {
    ((period - 1.0) * old + indicator) / period
}

/// Boost for a column given its overlap duty cycle and floor.
///
/// 1 when `overlap_duty >= min_duty`, rising linearly to `max_boost` as
/// `overlap_duty` approaches 0. Always in `[1, max_boost]`.
///
/// ```
/// use spatial_lattice::duty_cycle::boost_factor;
///
/// assert_eq!(boost_factor(0.2, 0.1, 10.0), 1.0);
/// assert_eq!(boost_factor(0.0, 0.1, 10.0), 10.0);
/// assert!((boost_factor(0.05, 0.1, 10.0) - 5.5).abs() < 1e-12);
/// ```
pub fn boost_factor(overlap_duty: f64, min_duty: f64, max_boost: f64) -> f64 {
    if overlap_duty >= min_duty {
        return 1.0;
    }
    let boost = (1.0 - max_boost) / min_duty * overlap_duty + max_boost;
    clip(boost, 1.0, max_boost)
}

impl SpatialLattice {
    /// Fold this iteration's overlaps and winners into the duty cycles.
    pub fn update_duty_cycles(&mut self, overlaps: &[f64], active_columns: &[usize]) -> Result<()> {
        self.check_len(overlaps.len())?;
        let active = self.normalize_columns(active_columns)?;

        let period = f64::from(self.config.duty_cycle_period);
        let threshold = self.config.stimulus_threshold;

        let mut won = vec![false; self.num_columns()];
        for c in active {
            won[c] = true;
        }

        for (c, &overlap) in overlaps.iter().enumerate() {
            let stimulated = if overlap > threshold { 1.0 } else { 0.0 };
            let winner = if won[c] { 1.0 } else { 0.0 };
            self.overlap_duty_cycles[c] =
                update_duty_cycle(self.overlap_duty_cycles[c], stimulated, period);
            self.active_duty_cycles[c] =
                update_duty_cycle(self.active_duty_cycles[c], winner, period);
        }
        Ok(())
    }

    /// Recompute the duty-cycle floors from each column's neighborhood.
    pub fn update_min_duty_cycles(&mut self) -> Result<()> {
        let pct_overlap = self.config.min_pct_overlap_duty_cycles;
        let pct_active = self.config.min_pct_active_duty_cycles;

        if self.config.global_inhibition {
            let max_overlap = self.overlap_duty_cycles.iter().copied().fold(0.0, f64::max);
            let max_active = self.active_duty_cycles.iter().copied().fold(0.0, f64::max);
            self.min_overlap_duty_cycles.fill(pct_overlap * max_overlap);
            self.min_active_duty_cycles.fill(pct_active * max_active);
            return Ok(());
        }

        for c in 0..self.num_columns() {
            let hood = self.neighborhood(c)?;
            let max_overlap = hood
                .iter()
                .map(|&n| self.overlap_duty_cycles[n])
                .fold(0.0, f64::max);
            let max_active = hood
                .iter()
                .map(|&n| self.active_duty_cycles[n])
                .fold(0.0, f64::max);
            self.min_overlap_duty_cycles[c] = pct_overlap * max_overlap;
            self.min_active_duty_cycles[c] = pct_active * max_active;
        }
        Ok(())
    }

    /// Recompute every boost factor from the overlap duty cycles.
    pub fn update_boost_factors(&mut self) {
        let max_boost = self.config.max_boost;
        for c in 0..self.num_columns() {
            self.boost_factors[c] = boost_factor(
                self.overlap_duty_cycles[c],
                self.min_overlap_duty_cycles[c],
                max_boost,
            );
        }
    }
}
