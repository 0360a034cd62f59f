//! Configuration for exceedance counting.

use crate::error::ExceedanceError;

/// How exceedance counts are turned into values for aggregation.
///
/// Model calendars differ (360, 365 or 366 days), so a raw count is not
/// directly comparable across models or years.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DayNormalization {
    /// Use the count as is.
    #[default]
    Raw,
    /// Rescale to a reference year length: `count * days / n_days`.
    PerYearLength(u16),
}

impl DayNormalization {
    /// Applies the normalisation to one count over `n_days` time steps.
    ///
    /// `n_days` must be non-zero; counts are only produced for non-empty
    /// projection years.
    #[inline]
    pub fn apply(self, count: u32, n_days: usize) -> f64 {
        match self {
            DayNormalization::Raw => f64::from(count),
            DayNormalization::PerYearLength(days) => {
                f64::from(count) * f64::from(days) / n_days as f64
            }
        }
    }
}

/// Configuration for exceedance counting.
///
/// # Example
///
/// ```
/// use heatdays_exceedance::{DayNormalization, ExceedanceConfig};
///
/// let config = ExceedanceConfig::new()
///     .with_normalization(DayNormalization::PerYearLength(365))
///     .with_kelvin_input(true);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Clone, Debug)]
pub struct ExceedanceConfig {
    normalization: DayNormalization,
    kelvin_input: bool,
    recentre_longitude: bool,
    flip_latitude: bool,
}

impl ExceedanceConfig {
    /// Creates a new configuration with defaults.
    ///
    /// Defaults: `normalization = Raw`, `kelvin_input = false`,
    /// `recentre_longitude = false`, `flip_latitude = false`.
    pub fn new() -> Self {
        Self {
            normalization: DayNormalization::Raw,
            kelvin_input: false,
            recentre_longitude: false,
            flip_latitude: false,
        }
    }

    /// Sets the day-count normalisation.
    pub fn with_normalization(mut self, normalization: DayNormalization) -> Self {
        self.normalization = normalization;
        self
    }

    /// Sets whether projections arrive in Kelvin and need converting to Celsius.
    pub fn with_kelvin_input(mut self, kelvin: bool) -> Self {
        self.kelvin_input = kelvin;
        self
    }

    /// Sets whether projection longitudes are re-centred from [0, 360) to [-180, 180).
    pub fn with_recentre_longitude(mut self, recentre: bool) -> Self {
        self.recentre_longitude = recentre;
        self
    }

    /// Sets whether projection latitude rows are reversed, e.g. to bring
    /// south-to-north model output onto a north-to-south reanalysis grid.
    pub fn with_flip_latitude(mut self, flip: bool) -> Self {
        self.flip_latitude = flip;
        self
    }

    /// Day-count normalisation.
    pub fn normalization(&self) -> DayNormalization {
        self.normalization
    }

    /// Whether projections are converted from Kelvin.
    pub fn kelvin_input(&self) -> bool {
        self.kelvin_input
    }

    /// Whether projection longitudes are re-centred.
    pub fn recentre_longitude(&self) -> bool {
        self.recentre_longitude
    }

    /// Whether projection latitude rows are reversed.
    pub fn flip_latitude(&self) -> bool {
        self.flip_latitude
    }

    /// Validates this configuration.
    ///
    /// A reference year length must be in 1..=366.
    pub fn validate(&self) -> Result<(), ExceedanceError> {
        if let DayNormalization::PerYearLength(days) = self.normalization
            && !(1..=366).contains(&days)
        {
            return Err(ExceedanceError::InvalidConfig {
                reason: format!("reference year length must be in 1..=366, got {days}"),
            });
        }
        Ok(())
    }
}

impl Default for ExceedanceConfig {
    fn default() -> Self {
        Self::new()
    }
}
