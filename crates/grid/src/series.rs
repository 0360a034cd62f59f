//! Daily time-series grids: the historical record and one projection year.

use std::collections::BTreeSet;
use std::ops::Range;

use ndarray::{Array2, ArrayView1, Axis, s};

use crate::error::GridError;
use crate::key::ProjectionKey;
use crate::lattice::Lattice;

/// Read access to a historical daily record, one year and latitude band at a time.
///
/// Implemented by the reanalysis readers outside this workspace and by
/// [`DailySeries`] for data already in memory. Returned arrays are shaped
/// `(days, band_pixels)` with pixels in lattice order. Non-finite values mark
/// missing observations.
pub trait DailySource: Sync {
    /// Lattice of the record.
    fn lattice(&self) -> &Lattice;

    /// Calendar years available, ascending.
    fn years(&self) -> Vec<i32>;

    /// Reads every day of `year` for the latitude rows in `rows`.
    ///
    /// # Errors
    ///
    /// Returns [`GridError`] if the year is unavailable or the read fails.
    fn read_band(&self, year: i32, rows: Range<usize>) -> Result<Array2<f64>, GridError>;
}

/// Pixel-indexed daily values over a historical window, held in memory.
///
/// Stored as a `(days, pixels)` array; `years[d]` is the calendar year of
/// day `d`.
#[derive(Debug, Clone)]
pub struct DailySeries {
    lattice: Lattice,
    years: Vec<i32>,
    values: Array2<f64>,
}

impl DailySeries {
    /// Creates a series after checking its shape.
    ///
    /// # Errors
    ///
    /// Returns [`GridError::LengthMismatch`] if the pixel axis does not match
    /// the lattice or `years` does not label every day.
    pub fn new(lattice: Lattice, years: Vec<i32>, values: Array2<f64>) -> Result<Self, GridError> {
        let (n_days, n_pixels) = values.dim();
        if n_pixels != lattice.n_pixels() {
            return Err(GridError::LengthMismatch {
                what: "daily series pixels".to_string(),
                expected: lattice.n_pixels(),
                got: n_pixels,
            });
        }
        if years.len() != n_days {
            return Err(GridError::LengthMismatch {
                what: "daily series year labels".to_string(),
                expected: n_days,
                got: years.len(),
            });
        }
        Ok(Self {
            lattice,
            years,
            values,
        })
    }

    /// Number of days.
    pub fn n_days(&self) -> usize {
        self.values.nrows()
    }

    /// Calendar year of each day.
    pub fn day_years(&self) -> &[i32] {
        &self.years
    }

    /// The `(days, pixels)` value array.
    pub fn values(&self) -> &Array2<f64> {
        &self.values
    }
}

impl DailySource for DailySeries {
    fn lattice(&self) -> &Lattice {
        &self.lattice
    }

    fn years(&self) -> Vec<i32> {
        let set: BTreeSet<i32> = self.years.iter().copied().collect();
        set.into_iter().collect()
    }

    fn read_band(&self, year: i32, rows: Range<usize>) -> Result<Array2<f64>, GridError> {
        let days: Vec<usize> = self
            .years
            .iter()
            .enumerate()
            .filter(|&(_, &y)| y == year)
            .map(|(d, _)| d)
            .collect();
        if days.is_empty() {
            return Err(GridError::Source {
                reason: format!("year {year} not present in daily series"),
            });
        }
        let pixels = self.lattice.band_pixels(rows);
        Ok(self
            .values
            .slice(s![.., pixels])
            .select(Axis(0), &days))
    }
}

/// Daily values of one (model, scenario, year) projection.
///
/// Stored as `(days, pixels)`. The day count is whatever the model's calendar
/// produced for that year (360, 365 or 366).
#[derive(Debug, Clone)]
pub struct ProjectionSeries {
    key: ProjectionKey,
    lattice: Lattice,
    values: Array2<f64>,
}

impl ProjectionSeries {
    /// Creates a projection year after checking its pixel axis.
    ///
    /// # Errors
    ///
    /// Returns [`GridError::LengthMismatch`] if the pixel axis does not match
    /// the lattice.
    pub fn new(key: ProjectionKey, lattice: Lattice, values: Array2<f64>) -> Result<Self, GridError> {
        if values.ncols() != lattice.n_pixels() {
            return Err(GridError::LengthMismatch {
                what: format!("projection pixels ({key})"),
                expected: lattice.n_pixels(),
                got: values.ncols(),
            });
        }
        Ok(Self {
            key,
            lattice,
            values,
        })
    }

    /// The (model, scenario, year) this series belongs to.
    pub fn key(&self) -> &ProjectionKey {
        &self.key
    }

    /// Lattice of the series.
    pub fn lattice(&self) -> &Lattice {
        &self.lattice
    }

    /// Number of days present.
    pub fn n_days(&self) -> usize {
        self.values.nrows()
    }

    /// The `(days, pixels)` value array.
    pub fn values(&self) -> &Array2<f64> {
        &self.values
    }

    /// Time series of one pixel.
    pub fn pixel(&self, pixel: usize) -> ArrayView1<'_, f64> {
        self.values.column(pixel)
    }

    pub(crate) fn from_parts(key: ProjectionKey, lattice: Lattice, values: Array2<f64>) -> Self {
        Self {
            key,
            lattice,
            values,
        }
    }

    pub(crate) fn into_parts(self) -> (ProjectionKey, Lattice, Array2<f64>) {
        (self.key, self.lattice, self.values)
    }
}
