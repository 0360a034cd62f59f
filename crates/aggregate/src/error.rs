//! Error types for the heatdays-aggregate crate.

use heatdays_grid::{GridError, RegionId};

/// Error type for all fallible operations in the heatdays-aggregate crate.
#[derive(Debug, Clone, thiserror::Error)]
pub enum AggregateError {
    /// Returned when a configuration parameter is invalid.
    #[error("invalid configuration: {reason}")]
    InvalidConfig {
        /// Description of the problem.
        reason: String,
    },

    /// Returned when the value, population and region grids disagree.
    #[error("{context}: {source}")]
    GridMismatch {
        /// What was being aggregated (usually a projection key).
        context: String,
        /// The underlying lattice comparison failure.
        source: GridError,
    },

    /// Returned when one model contributes twice to the same ensemble.
    #[error("model '{model}' appears more than once for scenario {scenario} year {year}")]
    DuplicateMember {
        /// Offending model.
        model: String,
        /// Scenario of the ensemble.
        scenario: String,
        /// Year of the ensemble.
        year: i32,
    },

    /// Returned when a region is listed twice for one (model, scenario, year).
    #[error("{key}: region {region} listed more than once")]
    DuplicateRow {
        /// The (model, scenario, year), formatted.
        key: String,
        /// Repeated region.
        region: RegionId,
    },

    /// Returned when JSON serialisation or parsing fails.
    #[error("serialization error: {reason}")]
    Serialization {
        /// Description of the failure.
        reason: String,
    },
}
