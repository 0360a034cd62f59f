//! Configuration for threshold estimation.

use std::fmt;

use crate::error::ThresholdError;

/// A whole-number percentile level in 1..=99.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Percentile(u8);

impl Percentile {
    /// The 90th percentile.
    pub const P90: Percentile = Percentile(90);
    /// The 95th percentile.
    pub const P95: Percentile = Percentile(95);

    /// Creates a percentile level.
    ///
    /// # Errors
    ///
    /// Returns [`ThresholdError::InvalidConfig`] outside 1..=99.
    pub fn new(level: u8) -> Result<Self, ThresholdError> {
        if !(1..=99).contains(&level) {
            return Err(ThresholdError::InvalidConfig {
                reason: format!("percentile must be in 1..=99, got {level}"),
            });
        }
        Ok(Self(level))
    }

    /// Level in percent.
    pub fn level(&self) -> u8 {
        self.0
    }

    /// Level as a probability in (0, 1).
    pub fn fraction(&self) -> f64 {
        f64::from(self.0) / 100.0
    }
}

impl fmt::Display for Percentile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "p{}", self.0)
    }
}

/// Rule used to interpolate between order statistics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum QuantileRule {
    /// Linear interpolation between order statistics (Hyndman-Fan type 7).
    #[default]
    Linear,
}

impl QuantileRule {
    /// Evaluates the rule on a sorted, non-empty sample.
    pub(crate) fn apply(self, sorted: &[f64], p: f64) -> f64 {
        match self {
            QuantileRule::Linear => heatdays_stats::quantile_type7(sorted, p),
        }
    }
}

/// The interpolation rule applied to every pixel of every run.
///
/// Fixed at compile time so thresholds are reproducible across runs.
pub const QUANTILE_RULE: QuantileRule = QuantileRule::Linear;

/// Inclusive span of calendar years forming the historical baseline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HistoricalWindow {
    start_year: i32,
    end_year: i32,
}

impl HistoricalWindow {
    /// Creates a window covering `start_year..=end_year`.
    ///
    /// # Errors
    ///
    /// Returns [`ThresholdError::InvalidConfig`] if `end_year < start_year`.
    pub fn new(start_year: i32, end_year: i32) -> Result<Self, ThresholdError> {
        if end_year < start_year {
            return Err(ThresholdError::InvalidConfig {
                reason: format!("historical window end {end_year} precedes start {start_year}"),
            });
        }
        Ok(Self {
            start_year,
            end_year,
        })
    }

    /// First year.
    pub fn start_year(&self) -> i32 {
        self.start_year
    }

    /// Last year.
    pub fn end_year(&self) -> i32 {
        self.end_year
    }

    /// Whether `year` lies in the window.
    pub fn contains(&self, year: i32) -> bool {
        (self.start_year..=self.end_year).contains(&year)
    }

    /// All years, ascending.
    pub fn years(&self) -> impl Iterator<Item = i32> {
        self.start_year..=self.end_year
    }

    /// Number of years.
    pub fn n_years(&self) -> usize {
        (self.end_year - self.start_year + 1) as usize
    }
}

impl Default for HistoricalWindow {
    /// The 30-year 1995-2024 ERA5 baseline.
    fn default() -> Self {
        Self {
            start_year: 1995,
            end_year: 2024,
        }
    }
}

/// Configuration for threshold estimation.
///
/// # Example
///
/// ```
/// use heatdays_threshold::{HistoricalWindow, Percentile, ThresholdConfig};
///
/// let config = ThresholdConfig::new()
///     .with_percentiles(vec![Percentile::P95])
///     .with_window(HistoricalWindow::new(1991, 2020).unwrap())
///     .with_missing_tolerance(0.05);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Clone, Debug)]
pub struct ThresholdConfig {
    percentiles: Vec<Percentile>,
    window: HistoricalWindow,
    missing_tolerance: f64,
    band_rows: usize,
}

impl ThresholdConfig {
    /// Creates a new configuration with defaults.
    ///
    /// Defaults: `percentiles = [p90, p95]`, `window = 1995..=2024`,
    /// `missing_tolerance = 0.1`, `band_rows = 30`.
    pub fn new() -> Self {
        Self {
            percentiles: vec![Percentile::P90, Percentile::P95],
            window: HistoricalWindow::default(),
            missing_tolerance: 0.1,
            band_rows: 30,
        }
    }

    // --- Builder methods ---

    /// Sets the percentile levels to compute.
    pub fn with_percentiles(mut self, percentiles: Vec<Percentile>) -> Self {
        self.percentiles = percentiles;
        self
    }

    /// Sets the historical window.
    pub fn with_window(mut self, window: HistoricalWindow) -> Self {
        self.window = window;
        self
    }

    /// Sets the largest tolerated fraction of missing days per pixel.
    pub fn with_missing_tolerance(mut self, fraction: f64) -> Self {
        self.missing_tolerance = fraction;
        self
    }

    /// Sets how many latitude rows are read per band.
    pub fn with_band_rows(mut self, rows: usize) -> Self {
        self.band_rows = rows;
        self
    }

    // --- Accessors ---

    /// Percentile levels to compute.
    pub fn percentiles(&self) -> &[Percentile] {
        &self.percentiles
    }

    /// Historical window.
    pub fn window(&self) -> HistoricalWindow {
        self.window
    }

    /// Largest tolerated fraction of missing days per pixel.
    pub fn missing_tolerance(&self) -> f64 {
        self.missing_tolerance
    }

    /// Latitude rows per band.
    pub fn band_rows(&self) -> usize {
        self.band_rows
    }

    /// Validates this configuration.
    ///
    /// Checks that at least one percentile is requested with no duplicates,
    /// `missing_tolerance` is finite and in [0, 1], and `band_rows >= 1`.
    pub fn validate(&self) -> Result<(), ThresholdError> {
        if self.percentiles.is_empty() {
            return Err(ThresholdError::InvalidConfig {
                reason: "at least one percentile level is required".to_string(),
            });
        }
        let mut sorted = self.percentiles.clone();
        sorted.sort();
        if sorted.windows(2).any(|w| w[0] == w[1]) {
            return Err(ThresholdError::InvalidConfig {
                reason: format!("duplicate percentile levels in {:?}", self.percentiles),
            });
        }
        if !self.missing_tolerance.is_finite() || !(0.0..=1.0).contains(&self.missing_tolerance) {
            return Err(ThresholdError::InvalidConfig {
                reason: format!(
                    "missing_tolerance must be finite and in [0, 1], got {}",
                    self.missing_tolerance
                ),
            });
        }
        if self.band_rows < 1 {
            return Err(ThresholdError::InvalidConfig {
                reason: format!("band_rows must be >= 1, got {}", self.band_rows),
            });
        }
        Ok(())
    }
}

impl Default for ThresholdConfig {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let cfg = ThresholdConfig::new();
        assert_eq!(cfg.percentiles(), &[Percentile::P90, Percentile::P95]);
        assert_eq!(cfg.window(), HistoricalWindow::new(1995, 2024).unwrap());
        assert_eq!(cfg.window().n_years(), 30);
        assert!((cfg.missing_tolerance() - 0.1).abs() < f64::EPSILON);
        assert_eq!(cfg.band_rows(), 30);
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn percentile_bounds() {
        assert!(Percentile::new(0).is_err());
        assert!(Percentile::new(100).is_err());
        assert_eq!(Percentile::new(95).unwrap(), Percentile::P95);
        assert!((Percentile::P90.fraction() - 0.9).abs() < f64::EPSILON);
        assert_eq!(Percentile::P95.to_string(), "p95");
    }

    #[test]
    fn window_rejects_reversed() {
        assert!(HistoricalWindow::new(2024, 1995).is_err());
    }

    #[test]
    fn validate_empty_percentiles() {
        assert!(ThresholdConfig::new().with_percentiles(vec![]).validate().is_err());
    }

    #[test]
    fn validate_duplicate_percentiles() {
        let cfg = ThresholdConfig::new().with_percentiles(vec![Percentile::P95, Percentile::P95]);
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn validate_bad_tolerance() {
        assert!(ThresholdConfig::new().with_missing_tolerance(-0.1).validate().is_err());
        assert!(ThresholdConfig::new().with_missing_tolerance(1.5).validate().is_err());
        assert!(ThresholdConfig::new().with_missing_tolerance(f64::NAN).validate().is_err());
    }

    #[test]
    fn validate_zero_band_rows() {
        assert!(ThresholdConfig::new().with_band_rows(0).validate().is_err());
    }
}
