//! Error types for the heatdays-pipeline crate.

use heatdays_aggregate::AggregateError;
use heatdays_exceedance::ExceedanceError;
use heatdays_grid::GridError;
use heatdays_threshold::ThresholdError;

/// Error type for all fallible operations in the heatdays-pipeline crate.
#[derive(Debug, Clone, thiserror::Error)]
pub enum PipelineError {
    /// Returned when a configuration parameter is invalid.
    #[error("invalid configuration: {reason}")]
    InvalidConfig {
        /// Description of the problem.
        reason: String,
    },

    /// Returned when a configured model is not offered by the source.
    #[error("unknown model '{model}' (available: {available})")]
    UnknownModel {
        /// The configured model id.
        model: String,
        /// Comma-separated ids the source offers.
        available: String,
    },

    /// Returned when a configured scenario is not offered by the source.
    #[error("unknown scenario '{scenario}' (available: {available})")]
    UnknownScenario {
        /// The configured scenario id.
        scenario: String,
        /// Comma-separated ids the source offers.
        available: String,
    },

    /// Returned when reading one projection or index grid fails.
    #[error("reading {key}: {source}")]
    Source {
        /// The (model, scenario, year), formatted.
        key: String,
        /// The underlying failure.
        source: GridError,
    },

    /// Returned when the population grid for a scenario and year cannot be read.
    #[error("reading population for scenario {scenario} year {year}: {source}")]
    Population {
        /// Population scenario.
        scenario: String,
        /// Year.
        year: i32,
        /// The underlying failure.
        source: GridError,
    },

    /// Threshold estimation failed.
    #[error(transparent)]
    Threshold(#[from] ThresholdError),

    /// Exceedance counting failed.
    #[error(transparent)]
    Exceedance(#[from] ExceedanceError),

    /// Regional or ensemble aggregation failed.
    #[error(transparent)]
    Aggregate(#[from] AggregateError),

    /// Returned when aligning or converting one task's grid fails.
    #[error("{key}: {source}")]
    Grid {
        /// The (model, scenario, year), formatted.
        key: String,
        /// The underlying grid failure.
        source: GridError,
    },
}
