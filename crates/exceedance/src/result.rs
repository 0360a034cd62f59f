//! Exceedance counts for one projection year.

use heatdays_grid::{GridError, Lattice, ProjectionKey, ValueGrid};
use heatdays_threshold::Percentile;

use crate::config::DayNormalization;

/// Per-pixel count of days above threshold for one (model, scenario, year).
///
/// `None` marks pixels whose threshold was "no data".
#[derive(Debug, Clone)]
pub struct ExceedanceGrid {
    key: ProjectionKey,
    lattice: Lattice,
    percentile: Percentile,
    counts: Vec<Option<u32>>,
    n_days: usize,
}

impl ExceedanceGrid {
    pub(crate) fn new(
        key: ProjectionKey,
        lattice: Lattice,
        percentile: Percentile,
        counts: Vec<Option<u32>>,
        n_days: usize,
    ) -> Self {
        Self {
            key,
            lattice,
            percentile,
            counts,
            n_days,
        }
    }

    /// The (model, scenario, year) counted.
    pub fn key(&self) -> &ProjectionKey {
        &self.key
    }

    /// Lattice of the counts.
    pub fn lattice(&self) -> &Lattice {
        &self.lattice
    }

    /// Threshold level the days were compared against.
    pub fn percentile(&self) -> Percentile {
        self.percentile
    }

    /// Count for every pixel.
    pub fn counts(&self) -> &[Option<u32>] {
        &self.counts
    }

    /// Count of one pixel.
    #[inline]
    pub fn get(&self, pixel: usize) -> Option<u32> {
        self.counts.get(pixel).copied().flatten()
    }

    /// Time steps in the projection year.
    pub fn n_days(&self) -> usize {
        self.n_days
    }

    /// Number of pixels flagged "no data".
    pub fn n_no_data(&self) -> usize {
        self.counts.iter().filter(|c| c.is_none()).count()
    }

    /// Converts the counts into values for regional aggregation.
    ///
    /// # Errors
    ///
    /// Propagates [`ValueGrid::new`] errors.
    pub fn to_values(&self, normalization: DayNormalization) -> Result<ValueGrid, GridError> {
        let values = self
            .counts
            .iter()
            .map(|c| c.map(|c| normalization.apply(c, self.n_days)))
            .collect();
        ValueGrid::new(self.lattice, values)
    }
}
