//! Error types for the heatdays-threshold crate.

use heatdays_grid::GridError;

/// Error type for all fallible operations in the heatdays-threshold crate.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ThresholdError {
    /// Returned when a configuration parameter is invalid.
    #[error("invalid configuration: {reason}")]
    InvalidConfig {
        /// Description of the problem.
        reason: String,
    },

    /// Returned when a year of the historical window is absent from the source.
    #[error("historical year {year} missing from source (available: {available})")]
    MissingYear {
        /// The absent year.
        year: i32,
        /// Compact description of the years the source does have.
        available: String,
    },

    /// Returned when a year read from the source has no days.
    #[error("historical year {year} has no days")]
    EmptyYear {
        /// The empty year.
        year: i32,
    },

    /// Wraps a grid-level failure (shape mismatch, source read failure).
    #[error(transparent)]
    Grid(#[from] GridError),
}
