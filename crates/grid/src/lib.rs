//! # heatdays-grid
//!
//! Shared spatial types for the heatdays pipeline: the fixed 0.25° lattice,
//! per-pixel grids with explicit "no data", daily series for the historical
//! record and projection years, population weights and region membership.
//!
//! Every grid carries its [`Lattice`]. Components that combine grids check
//! lattices with [`Lattice::ensure_same`] before touching any pixel, so a
//! misaligned input fails fast instead of producing shifted output.
//!
//! # Missing values
//!
//! Raw inputs use non-finite floats (NaN) for missing observations, the way
//! array libraries hand them over. Everything derived from them uses
//! `Option`, where `None` is "no data".

mod align;
mod error;
mod key;
mod lattice;
mod population;
mod region;
mod series;
mod values;

pub use align::{
    KELVIN_OFFSET, flip_latitude, flip_latitude_values, kelvin_to_celsius, recentre_columns,
    recentre_projection, recentre_values,
};
pub use error::GridError;
pub use key::{Cmip6FileName, ProjectionKey};
pub use lattice::{Lattice, LatitudeOrder, RESOLUTION};
pub use population::PopulationGrid;
pub use region::{RegionId, RegionMembership};
pub use series::{DailySeries, DailySource, ProjectionSeries};
pub use values::ValueGrid;
