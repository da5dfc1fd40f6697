//! Inhibition-radius estimation and column neighborhoods.
//!
//! The inhibition radius is the column-space neighborhood size used for
//! local competition. It tracks how far, on average, a column's connected
//! synapses spread over the input space, scaled into column space:
//!
//! ```text
//! diameter = avg_connected_span * avg_columns_per_input
//! radius   = round(max((diameter - 1) / 2, 1))
//! ```
//!
//! Only columns with at least one connected synapse contribute to the
//! average. When no column has any, the radius falls back to 1. With global
//! inhibition the radius is the largest column dimension.

use crate::error::Result;
use crate::lattice::SpatialLattice;
use tracing::debug;

/// Radius used when no column has a connected synapse.
pub const DEGENERATE_RADIUS: usize = 1;

impl SpatialLattice {
    /// Recompute the inhibition radius from the connected synapses.
    pub fn update_inhibition_radius(&mut self) -> Result<()> {
        let radius = self.estimate_inhibition_radius()?;
        if radius == self.inhibition_radius {
            return Ok(());
        }
        debug!(
            old = self.inhibition_radius,
            new = radius,
            iteration = self.iteration_num,
            "inhibition radius updated"
        );
        self.set_inhibition_radius(radius);
        Ok(())
    }

    /// Estimate the inhibition radius from the current connected synapses.
    pub fn estimate_inhibition_radius(&self) -> Result<usize> {
        if self.config.global_inhibition {
            return Ok(self
                .topology
                .column_dimensions()
                .iter()
                .copied()
                .max()
                .unwrap_or(DEGENERATE_RADIUS));
        }

        let mut total = 0.0;
        let mut counted = 0usize;
        for column in self.connected_synapses.populated_rows() {
            if let Some(span) = self.avg_connected_span_for_column(column)? {
                total += span;
                counted += 1;
            }
        }
        if counted == 0 {
            return Ok(DEGENERATE_RADIUS);
        }

        let avg_span = total / counted as f64;
        let diameter = avg_span * self.topology.avg_columns_per_input();
        let radius = ((diameter - 1.0) / 2.0).max(1.0);
        Ok(radius.round() as usize)
    }

    /// Mean per-axis extent of the input region covered by the connected
    /// synapses of `column`, or `None` if it has none.
    ///
    /// The extent along an axis is `max - min + 1` of the connected inputs'
    /// coordinates on that axis.
    pub fn avg_connected_span_for_column(&self, column: usize) -> Result<Option<f64>> {
        let connected = self.connected_synapses.row_offsets(column)?;
        if connected.is_empty() {
            return Ok(None);
        }

        let shape = self.topology.input_shape();
        let rank = shape.rank();
        let mut mins = vec![usize::MAX; rank];
        let mut maxs = vec![0usize; rank];

        for input in connected {
            for (axis, c) in shape.coords_unchecked(input).into_iter().enumerate() {
                mins[axis] = mins[axis].min(c);
                maxs[axis] = maxs[axis].max(c);
            }
        }

        let total: usize = mins.iter().zip(&maxs).map(|(lo, hi)| hi - lo + 1).sum();
        Ok(Some(total as f64 / rank as f64))
    }

    /// Columns competing with `column`, itself included, ascending.
    ///
    /// Computed on demand from the current radius; nothing is cached, so
    /// memory stays proportional to one neighborhood.
    pub fn neighborhood(&self, column: usize) -> Result<Vec<usize>> {
        self.check_column(column)?;
        if self.config.global_inhibition {
            return Ok((0..self.num_columns()).collect());
        }
        self.topology
            .column_shape()
            .neighborhood(column, self.inhibition_radius, self.config.wrap_around)
    }
}
