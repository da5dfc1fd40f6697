//! Potential-pool mapping.
//!
//! A column's potential pool is the fixed set of inputs it may ever connect
//! to. It is drawn once, before any learning:
//!
//! 1. Map the column onto its centre in input space.
//! 2. Take every input within Chebyshev distance `potential_radius` of that
//!    centre, wrapping around the boundaries when `wrap_around` is set. With
//!    global inhibition the candidates are the whole input space.
//! 3. Sample `round(potential_pct * |candidates|)` of them without
//!    replacement from the column's random stream.

use crate::config::LatticeConfig;
use crate::error::Result;
use crate::topology::Topology;
use crate::utils::sample_without_replacement;
use rand::Rng;

/// Inputs a column could be pooled over before sampling, ascending.
pub fn potential_candidates(
    topology: &Topology,
    config: &LatticeConfig,
    column: usize,
) -> Result<Vec<usize>> {
    if config.global_inhibition {
        // Validates the column index
        topology.map_column(column)?;
        return Ok((0..topology.num_inputs()).collect());
    }

    let center = topology.map_column(column)?;
    let radius = config.potential_radius.min(topology.num_inputs());
    topology
        .input_shape()
        .neighborhood(center, radius, config.wrap_around)
}

/// Draw the potential pool of `column`, ascending.
///
/// # Examples
///
/// ```
/// use spatial_lattice::{LatticeConfig, Topology};
/// use spatial_lattice::potential_pool::map_potential;
/// use rand::SeedableRng;
///
/// let topology = Topology::new(&[10], &[100]).unwrap();
/// let config = LatticeConfig::default();
/// let mut rng = rand::rngs::StdRng::seed_from_u64(42);
///
/// // 33-wide window around input 5, half of it sampled
/// let pool = map_potential(&topology, &config, 0, &mut rng).unwrap();
/// assert_eq!(pool.len(), 17);
/// ```
pub fn map_potential<R: Rng>(
    topology: &Topology,
    config: &LatticeConfig,
    column: usize,
    rng: &mut R,
) -> Result<Vec<usize>> {
    let candidates = potential_candidates(topology, config, column)?;
    let num_potential = (config.potential_pct * candidates.len() as f64).round() as usize;
    Ok(sample_without_replacement(&candidates, num_potential, rng))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_candidates_wrapped_window() {
        let topology = Topology::new(&[10], &[100]).unwrap();
        let config = LatticeConfig::default();

        let candidates = potential_candidates(&topology, &config, 0).unwrap();
        assert_eq!(candidates.len(), 33);
        assert!(candidates.contains(&89));
        assert!(candidates.contains(&21));
        assert!(!candidates.contains(&22));
    }

    #[test]
    fn test_candidates_clipped_window() {
        let topology = Topology::new(&[10], &[100]).unwrap();
        let config = LatticeConfig {
            wrap_around: false,
            ..Default::default()
        };

        let candidates = potential_candidates(&topology, &config, 0).unwrap();
        assert_eq!(candidates, (0..=21).collect::<Vec<_>>());
    }

    #[test]
    fn test_candidates_global() {
        let topology = Topology::new(&[10], &[100]).unwrap();
        let config = LatticeConfig {
            global_inhibition: true,
            ..Default::default()
        };

        assert_eq!(potential_candidates(&topology, &config, 3).unwrap().len(), 100);
        assert!(potential_candidates(&topology, &config, 10).is_err());
    }

    #[test]
    fn test_full_pct_takes_all_candidates() {
        let topology = Topology::new(&[4], &[16]).unwrap();
        let config = LatticeConfig {
            potential_radius: 2,
            potential_pct: 1.0,
            wrap_around: false,
            ..Default::default()
        };
        let mut rng = StdRng::seed_from_u64(0);

        // Column 1 maps to input 6
        let pool = map_potential(&topology, &config, 1, &mut rng).unwrap();
        assert_eq!(pool, vec![4, 5, 6, 7, 8]);
    }

    #[test]
    fn test_zero_pct_is_empty() {
        let topology = Topology::new(&[4], &[16]).unwrap();
        let config = LatticeConfig {
            potential_pct: 0.0,
            ..Default::default()
        };
        let mut rng = StdRng::seed_from_u64(0);
        assert!(map_potential(&topology, &config, 0, &mut rng).unwrap().is_empty());
    }
}
