//! Population-weighted regional aggregation and ensemble statistics.
//!
//! Two reductions, always in this order:
//!
//! 1. **Pixel → region** for each model: [`regional_values`] computes
//!    `Σ v·pop / Σ pop` over the region's pixels that have both a value and a
//!    population.
//! 2. **Model → ensemble** for each (scenario, year): [`summarize_ensemble`]
//!    takes the mean and sample standard deviation across the models that
//!    produced a value.
//!
//! The ensemble stage only accepts [`RegionalValues`], so the order cannot
//! be swapped. "No data" is carried as `None` through both stages; a region
//! without eligible population or without contributing models is reported
//! with empty statistics rather than zeros.
//!
//! # Quick Start
//!
//! ```no_run
//! use heatdays_aggregate::{EnsembleConfig, regional_values, summarize_ensemble, to_json};
//! use heatdays_grid::{
//!     Lattice, PopulationGrid, ProjectionKey, RegionId, RegionMembership, ValueGrid,
//! };
//!
//! let lattice = Lattice::new(0.0, 0.0, 1, 2).unwrap();
//! let pop = PopulationGrid::new(lattice, vec![100.0, 300.0]).unwrap();
//! let regions = RegionMembership::new(lattice, vec![Some(RegionId(1)); 2]).unwrap();
//!
//! let key = ProjectionKey::new("MRI-ESM2-0", "ssp245", 2030);
//! let counts = ValueGrid::new(lattice, vec![Some(5.0), Some(15.0)]).unwrap();
//! let per_model = regional_values(&key, &counts, &pop, &regions).unwrap();
//!
//! let table = summarize_ensemble(&[per_model], &EnsembleConfig::new()).unwrap();
//! println!("{}", to_json(&table).unwrap());
//! ```

mod config;
mod ensemble;
mod error;
mod output;
mod regional;
mod table;

pub use config::{EnsembleConfig, SingleMemberSpread};
pub use ensemble::{EnsembleStat, ensemble_stats, summarize_ensemble};
pub use error::AggregateError;
pub use output::{
    EnsembleRow, RegionalRow, parse_regional_json, regional_from_rows, table_rows, to_json,
};
pub use regional::{RegionalValues, regional_values};
pub use table::EnsembleTable;
