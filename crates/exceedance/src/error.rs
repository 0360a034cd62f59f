//! Error types for the heatdays-exceedance crate.

use heatdays_grid::GridError;

/// Error type for all fallible operations in the heatdays-exceedance crate.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ExceedanceError {
    /// Returned when a configuration parameter is invalid.
    #[error("invalid configuration: {reason}")]
    InvalidConfig {
        /// Description of the problem.
        reason: String,
    },

    /// Returned when a projection and its threshold grid sit on different lattices.
    #[error("{key}: {source}")]
    GridMismatch {
        /// The (model, scenario, year) being counted, formatted.
        key: String,
        /// The underlying lattice comparison failure.
        source: GridError,
    },

    /// Returned when a projection year holds no days at all.
    #[error("{key}: projection has no days")]
    EmptyProjection {
        /// The (model, scenario, year), formatted.
        key: String,
    },

    /// Returned when a projection cannot be brought onto the threshold conventions.
    #[error("aligning {key}: {source}")]
    Alignment {
        /// The (model, scenario, year) being aligned, formatted.
        key: String,
        /// The underlying grid failure.
        source: GridError,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_grid_mismatch_names_key() {
        let e = ExceedanceError::GridMismatch {
            key: "model=M scenario=ssp245 year=2030".to_string(),
            source: GridError::GridMismatch {
                role: "projection".to_string(),
                expected: "a".to_string(),
                got: "b".to_string(),
            },
        };
        assert_eq!(
            e.to_string(),
            "model=M scenario=ssp245 year=2030: grid mismatch for projection: expected lattice a, got b"
        );
        assert!(std::error::Error::source(&e).is_some());
    }

    #[test]
    fn error_alignment_names_key() {
        let e = ExceedanceError::Alignment {
            key: "model=M scenario=ssp245 year=2030".to_string(),
            source: GridError::InvalidLattice {
                reason: "not a full circle".to_string(),
            },
        };
        assert_eq!(
            e.to_string(),
            "aligning model=M scenario=ssp245 year=2030: invalid lattice: not a full circle"
        );
    }

    #[test]
    fn error_empty_projection() {
        let e = ExceedanceError::EmptyProjection {
            key: "model=M scenario=ssp585 year=2050".to_string(),
        };
        assert_eq!(
            e.to_string(),
            "model=M scenario=ssp585 year=2050: projection has no days"
        );
    }

    #[test]
    fn error_is_send_and_sync() {
        fn assert_impl<T: Send + Sync + std::error::Error>() {}
        assert_impl::<ExceedanceError>();
    }
}
