//! Threshold grids produced by the estimator.

use std::collections::BTreeMap;

use heatdays_grid::{GridError, Lattice};

use crate::config::{HistoricalWindow, Percentile};

/// One percentile level's threshold for every pixel.
///
/// `None` marks pixels whose historical sample failed the missing-data
/// tolerance.
#[derive(Debug, Clone)]
pub struct ThresholdGrid {
    lattice: Lattice,
    percentile: Percentile,
    values: Vec<Option<f64>>,
}

impl ThresholdGrid {
    /// Creates a threshold grid from precomputed values.
    ///
    /// Used by callers that load thresholds persisted by an earlier run.
    ///
    /// # Errors
    ///
    /// Returns [`GridError::LengthMismatch`] on a length mismatch.
    pub fn new(
        lattice: Lattice,
        percentile: Percentile,
        values: Vec<Option<f64>>,
    ) -> Result<Self, GridError> {
        if values.len() != lattice.n_pixels() {
            return Err(GridError::LengthMismatch {
                what: format!("{percentile} threshold grid"),
                expected: lattice.n_pixels(),
                got: values.len(),
            });
        }
        Ok(Self {
            lattice,
            percentile,
            values,
        })
    }

    /// The lattice of the grid.
    pub fn lattice(&self) -> &Lattice {
        &self.lattice
    }

    /// The percentile level.
    pub fn percentile(&self) -> Percentile {
        self.percentile
    }

    /// Threshold for every pixel.
    pub fn values(&self) -> &[Option<f64>] {
        &self.values
    }

    /// Threshold of one pixel.
    #[inline]
    pub fn get(&self, pixel: usize) -> Option<f64> {
        self.values.get(pixel).copied().flatten()
    }

    /// Number of pixels flagged "no data".
    pub fn n_no_data(&self) -> usize {
        self.values.iter().filter(|v| v.is_none()).count()
    }
}

/// Thresholds for every requested percentile, computed in one pass.
#[derive(Debug, Clone)]
pub struct ThresholdSet {
    window: HistoricalWindow,
    grids: BTreeMap<Percentile, ThresholdGrid>,
    n_days: usize,
}

impl ThresholdSet {
    pub(crate) fn new(
        window: HistoricalWindow,
        grids: BTreeMap<Percentile, ThresholdGrid>,
        n_days: usize,
    ) -> Self {
        Self {
            window,
            grids,
            n_days,
        }
    }

    /// Historical window the thresholds were derived from.
    pub fn window(&self) -> HistoricalWindow {
        self.window
    }

    /// Number of time steps in the window.
    pub fn n_days(&self) -> usize {
        self.n_days
    }

    /// Grid for one level, if it was requested.
    pub fn get(&self, percentile: Percentile) -> Option<&ThresholdGrid> {
        self.grids.get(&percentile)
    }

    /// Levels present, ascending.
    pub fn percentiles(&self) -> impl Iterator<Item = Percentile> + '_ {
        self.grids.keys().copied()
    }

    /// Number of pixels flagged "no data" (identical for every level).
    pub fn n_no_data(&self) -> usize {
        self.grids.values().next().map_or(0, ThresholdGrid::n_no_data)
    }

    /// Consumes the set and returns the grid for one level.
    pub fn into_grid(mut self, percentile: Percentile) -> Option<ThresholdGrid> {
        self.grids.remove(&percentile)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grid_length_checked() {
        let lattice = Lattice::new(0.0, 0.0, 1, 2).unwrap();
        assert!(ThresholdGrid::new(lattice, Percentile::P95, vec![Some(1.0)]).is_err());
    }

    #[test]
    fn grid_counts_no_data() {
        let lattice = Lattice::new(0.0, 0.0, 1, 3).unwrap();
        let g = ThresholdGrid::new(lattice, Percentile::P95, vec![Some(1.0), None, None]).unwrap();
        assert_eq!(g.n_no_data(), 2);
        assert_eq!(g.get(0), Some(1.0));
    }
}
