//! End-to-end heat-day exposure pipeline.
//!
//! Wires the stages together over pluggable data sources:
//!
//! ```text
//! DailySource ──► thresholds ──┐
//!                              ▼
//! ProjectionSource ──► exceedance counts ──► regional values ──► ensemble table
//!                                              ▲
//! PopulationSource, RegionMembership ──────────┘
//! ```
//!
//! [`run_heat_index`] runs the whole chain. [`run_precomputed_index`] feeds
//! an already computed per-pixel index (e.g. Fire Weather Index) from an
//! [`IndexSource`] through the same regional and ensemble stages.
//!
//! Every (model, scenario, year) combination is an independent task run on
//! the rayon pool; the ensemble stage runs once all tasks have finished.

mod config;
mod error;
mod run;
mod source;

pub use config::PipelineConfig;
pub use error::PipelineError;
pub use run::{PipelineOutput, run_heat_index, run_precomputed_index};
pub use source::{
    InMemoryIndex, InMemoryPopulation, InMemoryProjections, IndexSource, PopulationSource,
    ProjectionSource,
};
