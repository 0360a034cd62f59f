//! Counting projected days above historical heat thresholds.
//!
//! For one (model, scenario, year) projection and one percentile threshold
//! grid, [`count_exceedances`] returns how many days each pixel's daily
//! maximum was strictly above its threshold. [`count_ensemble`] does the
//! same for a set of projections in parallel.
//!
//! Counts are whole days over the time steps actually present. Converting
//! them to values for aggregation goes through [`DayNormalization`], which
//! can rescale to a reference year length so 360, 365 and 366-day model
//! calendars become comparable.

mod config;
mod count;
mod error;
mod result;

pub use config::{DayNormalization, ExceedanceConfig};
pub use count::{align_projection, count_ensemble, count_exceedances};
pub use error::ExceedanceError;
pub use result::ExceedanceGrid;
