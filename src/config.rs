//! Lattice configuration.
//!
//! `LatticeConfig` holds every numeric and boolean option of the spatial
//! lattice with its documented default. It is validated once, when a lattice
//! is constructed, and never re-checked per iteration.
//!
//! The density selector is a tagged variant rather than a pair of
//! sentinel-valued fields, so exactly one of "local area density" and
//! "active columns per inhibition area" is always in force.
//!
//! # Example
//!
//! ```
//! use spatial_lattice::{DensityMode, LatticeConfig};
//!
//! let config = LatticeConfig::from_json(r#"{
//!     "potential_radius": 8,
//!     "density": { "fixed": 0.02 },
//!     "seed": 7
//! }"#).unwrap();
//!
//! assert_eq!(config.potential_radius, 8);
//! assert_eq!(config.density, DensityMode::Fixed(0.02));
//! assert_eq!(config.syn_perm_connected, 0.10); // default
//! ```

use crate::error::{LatticeError, Result};
use serde::{Deserialize, Serialize};

/// How many columns the inhibition stage keeps active.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DensityMode {
    /// Fraction of columns active within an inhibition area, in `(0, 1]`.
    Fixed(f64),
    /// Number of active columns per inhibition area.
    TargetCount(usize),
}

impl DensityMode {
    /// Build from the legacy sentinel pair where a negative value means "unset".
    ///
    /// Exactly one of the two values must be non-negative.
    ///
    /// ```
    /// use spatial_lattice::DensityMode;
    ///
    /// assert_eq!(DensityMode::from_sentinels(-1.0, 40.0).unwrap(), DensityMode::TargetCount(40));
    /// assert!(DensityMode::from_sentinels(-1.0, -1.0).is_err());
    /// assert!(DensityMode::from_sentinels(0.1, 40.0).is_err());
    /// ```
    pub fn from_sentinels(local_area_density: f64, num_active_columns_per_inh_area: f64) -> Result<Self> {
        let mode = match (local_area_density >= 0.0, num_active_columns_per_inh_area >= 0.0) {
            (true, false) => DensityMode::Fixed(local_area_density),
            (false, true) => DensityMode::TargetCount(num_active_columns_per_inh_area.round() as usize),
            (true, true) => {
                return Err(LatticeError::Configuration(
                    "only one of local_area_density and num_active_columns_per_inh_area may be set"
                        .into(),
                ))
            }
            (false, false) => {
                return Err(LatticeError::Configuration(
                    "one of local_area_density and num_active_columns_per_inh_area must be set".into(),
                ))
            }
        };
        mode.validate()?;
        Ok(mode)
    }

    /// Local area density, or `-1.0` when the target-count mode is active.
    pub fn local_area_density(&self) -> f64 {
        match *self {
            DensityMode::Fixed(d) => d,
            DensityMode::TargetCount(_) => -1.0,
        }
    }

    /// Active columns per inhibition area, or `-1.0` when the density mode is active.
    pub fn num_active_columns_per_inh_area(&self) -> f64 {
        match *self {
            DensityMode::Fixed(_) => -1.0,
            DensityMode::TargetCount(n) => n as f64,
        }
    }

    fn validate(&self) -> Result<()> {
        match *self {
            DensityMode::Fixed(d) if !(d > 0.0 && d <= 1.0) => Err(LatticeError::Configuration(
                format!("local_area_density must be in (0, 1], got {}", d),
            )),
            DensityMode::TargetCount(0) => Err(LatticeError::Configuration(
                "num_active_columns_per_inh_area must be positive".into(),
            )),
            _ => Ok(()),
        }
    }
}

impl Default for DensityMode {
    fn default() -> Self {
        DensityMode::TargetCount(10)
    }
}

/// Parameters of a spatial lattice.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LatticeConfig {
    /// Chebyshev radius of a column's candidate input window
    pub potential_radius: usize,
    /// Fraction of the candidate window sampled into the potential pool
    pub potential_pct: f64,
    /// Treat the whole column population as one inhibition area
    pub global_inhibition: bool,
    /// Active-column selector used by the inhibition stage
    pub density: DensityMode,
    /// Overlap a column must exceed to count as stimulated
    pub stimulus_threshold: f64,
    /// Permanence decrement for inactive inputs
    pub syn_perm_inactive_dec: f64,
    /// Permanence increment for active inputs
    pub syn_perm_active_inc: f64,
    /// Permanence at or above which a synapse is connected
    pub syn_perm_connected: f64,
    /// Permanence increment applied to under-active columns
    pub syn_perm_below_stimulus_inc: f64,
    /// Fraction of the neighborhood's max overlap duty cycle used as floor
    pub min_pct_overlap_duty_cycles: f64,
    /// Fraction of the neighborhood's max active duty cycle used as floor
    pub min_pct_active_duty_cycles: f64,
    /// Time constant of the duty-cycle moving averages
    pub duty_cycle_period: u32,
    /// Upper bound of the boost factors
    pub max_boost: f64,
    /// Seed of every random stream in the lattice
    pub seed: u64,
    /// Lower permanence bound
    pub syn_perm_min: f64,
    /// Upper permanence bound
    pub syn_perm_max: f64,
    /// Permanences at or below this value are pruned
    pub syn_perm_trim_threshold: f64,
    /// Iterations between inhibition-radius updates
    pub update_period: u32,
    /// Probability that an initial synapse starts connected
    pub init_connected_pct: f64,
    /// Toroidal input and column spaces
    pub wrap_around: bool,
    /// Dump parameters on construction when > 0
    pub verbosity: u8,
}

impl Default for LatticeConfig {
    fn default() -> Self {
        let syn_perm_active_inc = 0.10;
        let syn_perm_connected = 0.10;
        Self {
            potential_radius: 16,
            potential_pct: 0.5,
            global_inhibition: false,
            density: DensityMode::default(),
            stimulus_threshold: 0.0,
            syn_perm_inactive_dec: 0.01,
            syn_perm_active_inc,
            syn_perm_connected,
            syn_perm_below_stimulus_inc: syn_perm_connected / 10.0,
            min_pct_overlap_duty_cycles: 0.001,
            min_pct_active_duty_cycles: 0.001,
            duty_cycle_period: 1000,
            max_boost: 10.0,
            seed: 0,
            syn_perm_min: 0.0,
            syn_perm_max: 1.0,
            syn_perm_trim_threshold: syn_perm_active_inc / 2.0,
            update_period: 50,
            init_connected_pct: 0.5,
            wrap_around: true,
            verbosity: 0,
        }
    }
}

impl LatticeConfig {
    /// Parse a JSON document and validate it. Missing fields take defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Render as pretty-printed JSON.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Check every parameter constraint.
    pub fn validate(&self) -> Result<()> {
        check_unit("potential_pct", self.potential_pct)?;
        check_unit("init_connected_pct", self.init_connected_pct)?;
        check_unit("min_pct_overlap_duty_cycles", self.min_pct_overlap_duty_cycles)?;
        check_unit("min_pct_active_duty_cycles", self.min_pct_active_duty_cycles)?;
        self.density.validate()?;

        if !(self.syn_perm_min < self.syn_perm_max) {
            return Err(LatticeError::Configuration(format!(
                "syn_perm_min ({}) must be below syn_perm_max ({})",
                self.syn_perm_min, self.syn_perm_max
            )));
        }
        if !(self.syn_perm_min..=self.syn_perm_max).contains(&self.syn_perm_connected) {
            return Err(LatticeError::Configuration(format!(
                "syn_perm_connected must be in [{}, {}], got {}",
                self.syn_perm_min, self.syn_perm_max, self.syn_perm_connected
            )));
        }
        if !(self.syn_perm_min..self.syn_perm_max).contains(&self.syn_perm_trim_threshold) {
            return Err(LatticeError::Configuration(format!(
                "syn_perm_trim_threshold must be in [{}, {}), got {}",
                self.syn_perm_min, self.syn_perm_max, self.syn_perm_trim_threshold
            )));
        }
        for (name, value) in [
            ("syn_perm_active_inc", self.syn_perm_active_inc),
            ("syn_perm_inactive_dec", self.syn_perm_inactive_dec),
            ("syn_perm_below_stimulus_inc", self.syn_perm_below_stimulus_inc),
            ("stimulus_threshold", self.stimulus_threshold),
        ] {
            if !(value >= 0.0) {
                return Err(LatticeError::Configuration(format!(
                    "{} must be non-negative, got {}",
                    name, value
                )));
            }
        }
        if self.duty_cycle_period == 0 {
            return Err(LatticeError::Configuration(
                "duty_cycle_period must be at least 1".into(),
            ));
        }
        if self.update_period == 0 {
            return Err(LatticeError::Configuration(
                "update_period must be at least 1".into(),
            ));
        }
        if !(self.max_boost >= 1.0) {
            return Err(LatticeError::Configuration(format!(
                "max_boost must be at least 1.0, got {}",
                self.max_boost
            )));
        }
        Ok(())
    }
}

fn check_unit(name: &str, value: f64) -> Result<()> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(LatticeError::Configuration(format!(
            "{} must be in [0, 1], got {}",
            name, value
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        let config = LatticeConfig::default();
        config.validate().unwrap();
        assert_eq!(config.syn_perm_trim_threshold, 0.05);
        assert_eq!(config.syn_perm_below_stimulus_inc, 0.01);
    }

    #[test]
    fn test_density_accessors() {
        let fixed = DensityMode::Fixed(0.02);
        assert_eq!(fixed.local_area_density(), 0.02);
        assert_eq!(fixed.num_active_columns_per_inh_area(), -1.0);

        let count = DensityMode::TargetCount(40);
        assert_eq!(count.local_area_density(), -1.0);
        assert_eq!(count.num_active_columns_per_inh_area(), 40.0);
    }

    #[test]
    fn test_rejects_bad_pct() {
        let config = LatticeConfig {
            potential_pct: 1.5,
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(LatticeError::Configuration(_))));

        let config = LatticeConfig {
            init_connected_pct: -0.1,
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(LatticeError::Configuration(_))));
    }

    #[test]
    fn test_rejects_nan() {
        let config = LatticeConfig {
            max_boost: f64::NAN,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_json_round_trip() {
        let config = LatticeConfig {
            density: DensityMode::Fixed(0.05),
            seed: 99,
            ..Default::default()
        };
        let json = config.to_json().unwrap();
        assert_eq!(LatticeConfig::from_json(&json).unwrap(), config);
    }
}
