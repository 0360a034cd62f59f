//! Per-pixel historical temperature thresholds.
//!
//! For every pixel of the lattice, the daily maxima of a historical window
//! are reduced to one or more high percentiles. These grids are the
//! reference against which projection days are later counted as "hot".
//!
//! # Pipeline
//!
//! 1. **Select** the days whose calendar year falls in the window
//! 2. **Filter** missing observations and check the missing-data tolerance
//! 3. **Sort** the remaining sample once per pixel
//! 4. **Interpolate** every requested level with [`QUANTILE_RULE`]
//!
//! Pixels that fail the tolerance, or have no finite observation at all, are
//! reported as `None` in every level.
//!
//! # Memory
//!
//! [`estimate_thresholds_banded`] reads the record one latitude band at a
//! time through [`heatdays_grid::DailySource`]; peak memory is one band of
//! the whole window rather than the whole grid.
//!
//! # Quick Start
//!
//! ```no_run
//! use heatdays_grid::{DailySeries, Lattice};
//! use heatdays_threshold::{Percentile, ThresholdConfig, estimate_thresholds};
//! use ndarray::Array2;
//!
//! let lattice = Lattice::new(40.0, 70.0, 2, 2).unwrap();
//! let years: Vec<i32> = (1995..=2024).flat_map(|y| std::iter::repeat_n(y, 365)).collect();
//! let values = Array2::from_elem((years.len(), lattice.n_pixels()), 30.0);
//! let series = DailySeries::new(lattice, years, values).unwrap();
//!
//! let set = estimate_thresholds(&series, &ThresholdConfig::new()).unwrap();
//! let p95 = set.get(Percentile::P95).unwrap();
//! assert_eq!(p95.get(0), Some(30.0));
//! ```

mod config;
mod error;
mod estimate;
mod result;

pub use config::{HistoricalWindow, Percentile, QUANTILE_RULE, QuantileRule, ThresholdConfig};
pub use error::ThresholdError;
pub use estimate::{estimate_thresholds, estimate_thresholds_banded};
pub use result::{ThresholdGrid, ThresholdSet};
