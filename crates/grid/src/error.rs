//! Error types for the heatdays-grid crate.

/// Error type for all fallible operations in the heatdays-grid crate.
#[derive(Debug, Clone, thiserror::Error)]
pub enum GridError {
    /// Returned when two grids that must be used together sit on different lattices.
    #[error("grid mismatch for {role}: expected lattice {expected}, got {got}")]
    GridMismatch {
        /// Which input was being checked (e.g. "population", "projection").
        role: String,
        /// Lattice the input was expected to share.
        expected: String,
        /// Lattice the input actually carries.
        got: String,
    },

    /// Returned when a buffer length does not match the lattice or time axis.
    #[error("length mismatch for {what}: expected {expected}, got {got}")]
    LengthMismatch {
        /// Name of the mismatched buffer.
        what: String,
        /// Expected length.
        expected: usize,
        /// Actual length.
        got: usize,
    },

    /// Returned when lattice parameters are unusable.
    #[error("invalid lattice: {reason}")]
    InvalidLattice {
        /// Description of the problem.
        reason: String,
    },

    /// Returned when a population value is negative.
    #[error("negative population {value} at pixel {pixel}")]
    NegativePopulation {
        /// Flat pixel index.
        pixel: usize,
        /// Offending value.
        value: f64,
    },

    /// Returned when a grid value is present but not a finite number.
    #[error("non-finite value {value} at pixel {pixel}")]
    NonFiniteValue {
        /// Flat pixel index.
        pixel: usize,
        /// Offending value.
        value: f64,
    },

    /// Returned when a region code cannot be turned into a region identifier.
    #[error("invalid region code {code} at pixel {pixel}")]
    InvalidRegionCode {
        /// Flat pixel index.
        pixel: usize,
        /// Offending code.
        code: f64,
    },

    /// Returned when a projection file name does not follow the CMIP6 convention.
    #[error("cannot parse file name '{name}': {reason}")]
    InvalidFileName {
        /// The file name that failed to parse.
        name: String,
        /// Description of the problem.
        reason: String,
    },

    /// Returned when an external data source fails to produce a grid.
    #[error("source error: {reason}")]
    Source {
        /// Description of the underlying failure.
        reason: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_grid_mismatch() {
        let e = GridError::GridMismatch {
            role: "population".to_string(),
            expected: "2x2".to_string(),
            got: "3x2".to_string(),
        };
        assert_eq!(
            e.to_string(),
            "grid mismatch for population: expected lattice 2x2, got 3x2"
        );
    }

    #[test]
    fn error_negative_population() {
        let e = GridError::NegativePopulation {
            pixel: 4,
            value: -1.5,
        };
        assert_eq!(e.to_string(), "negative population -1.5 at pixel 4");
    }

    #[test]
    fn error_is_send_and_sync() {
        fn assert_impl<T: Send + Sync + std::error::Error>() {}
        assert_impl::<GridError>();
    }
}
