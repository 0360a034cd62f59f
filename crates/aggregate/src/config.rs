//! Configuration for the ensemble stage.

use crate::error::AggregateError;

/// Spread reported when exactly one model contributes.
///
/// A one-member sample standard deviation is undefined; pipelines differ on
/// whether to show that as zero or as a gap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SingleMemberSpread {
    /// Report a spread of exactly 0.
    #[default]
    Zero,
    /// Report "no data".
    Undefined,
}

/// Configuration for ensemble statistics.
///
/// # Example
///
/// ```
/// use heatdays_aggregate::{EnsembleConfig, SingleMemberSpread};
///
/// let config = EnsembleConfig::new()
///     .with_single_member_spread(SingleMemberSpread::Undefined)
///     .with_min_models(3);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Clone, Debug)]
pub struct EnsembleConfig {
    single_member_spread: SingleMemberSpread,
    min_models: usize,
}

impl EnsembleConfig {
    /// Creates a new configuration with defaults.
    ///
    /// Defaults: `single_member_spread = Zero`, `min_models = 1`.
    pub fn new() -> Self {
        Self {
            single_member_spread: SingleMemberSpread::Zero,
            min_models: 1,
        }
    }

    /// Sets the single-member spread convention.
    pub fn with_single_member_spread(mut self, spread: SingleMemberSpread) -> Self {
        self.single_member_spread = spread;
        self
    }

    /// Sets the fewest contributing models for which mean and spread are reported.
    pub fn with_min_models(mut self, n: usize) -> Self {
        self.min_models = n;
        self
    }

    /// Single-member spread convention.
    pub fn single_member_spread(&self) -> SingleMemberSpread {
        self.single_member_spread
    }

    /// Fewest contributing models for a reported statistic.
    pub fn min_models(&self) -> usize {
        self.min_models
    }

    /// Validates this configuration.
    pub fn validate(&self) -> Result<(), AggregateError> {
        if self.min_models < 1 {
            return Err(AggregateError::InvalidConfig {
                reason: "min_models must be >= 1".to_string(),
            });
        }
        Ok(())
    }
}

impl Default for EnsembleConfig {
    fn default() -> Self {
        Self::new()
    }
}
