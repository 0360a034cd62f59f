//! Configuration for an end-to-end run.

use std::collections::BTreeSet;

use heatdays_aggregate::EnsembleConfig;
use heatdays_exceedance::ExceedanceConfig;
use heatdays_grid::ProjectionKey;
use heatdays_threshold::{Percentile, ThresholdConfig};

use crate::error::PipelineError;

/// Configuration for an end-to-end run.
///
/// Bundles the configuration of every stage with the task list: the models,
/// scenarios and target years whose combinations are processed.
///
/// # Example
///
/// ```
/// use heatdays_pipeline::PipelineConfig;
///
/// let config = PipelineConfig::new()
///     .with_models(vec!["ACCESS-CM2".into(), "MRI-ESM2-0".into()])
///     .with_scenarios(vec!["ssp245".into()])
///     .with_years(vec![2030, 2050]);
/// assert!(config.validate().is_ok());
/// assert_eq!(config.tasks().len(), 4);
/// ```
#[derive(Clone, Debug)]
pub struct PipelineConfig {
    models: Vec<String>,
    scenarios: Vec<String>,
    years: Vec<i32>,
    counted_percentile: Percentile,
    population_scenario: Option<String>,
    threshold: ThresholdConfig,
    exceedance: ExceedanceConfig,
    ensemble: EnsembleConfig,
}

impl PipelineConfig {
    /// Creates a new configuration with defaults.
    ///
    /// Defaults: no models or scenarios, `years = [2025, 2030, 2050]`,
    /// `counted_percentile = p95`, population read per climate scenario, and
    /// default stage configurations.
    pub fn new() -> Self {
        Self {
            models: Vec::new(),
            scenarios: Vec::new(),
            years: vec![2025, 2030, 2050],
            counted_percentile: Percentile::P95,
            population_scenario: None,
            threshold: ThresholdConfig::new(),
            exceedance: ExceedanceConfig::new(),
            ensemble: EnsembleConfig::new(),
        }
    }

    // --- Builder methods ---

    /// Sets the model ids to process.
    pub fn with_models(mut self, models: Vec<String>) -> Self {
        self.models = models;
        self
    }

    /// Sets the scenario ids to process.
    pub fn with_scenarios(mut self, scenarios: Vec<String>) -> Self {
        self.scenarios = scenarios;
        self
    }

    /// Sets the target years.
    pub fn with_years(mut self, years: Vec<i32>) -> Self {
        self.years = years;
        self
    }

    /// Sets the threshold level exceedances are counted against.
    pub fn with_counted_percentile(mut self, percentile: Percentile) -> Self {
        self.counted_percentile = percentile;
        self
    }

    /// Reads population for one fixed scenario instead of each climate scenario.
    pub fn with_population_scenario(mut self, scenario: Option<String>) -> Self {
        self.population_scenario = scenario;
        self
    }

    /// Sets the threshold estimation configuration.
    pub fn with_threshold(mut self, threshold: ThresholdConfig) -> Self {
        self.threshold = threshold;
        self
    }

    /// Sets the exceedance configuration.
    pub fn with_exceedance(mut self, exceedance: ExceedanceConfig) -> Self {
        self.exceedance = exceedance;
        self
    }

    /// Sets the ensemble configuration.
    pub fn with_ensemble(mut self, ensemble: EnsembleConfig) -> Self {
        self.ensemble = ensemble;
        self
    }

    // --- Accessors ---

    /// Model ids.
    pub fn models(&self) -> &[String] {
        &self.models
    }

    /// Scenario ids.
    pub fn scenarios(&self) -> &[String] {
        &self.scenarios
    }

    /// Target years.
    pub fn years(&self) -> &[i32] {
        &self.years
    }

    /// Level exceedances are counted against.
    pub fn counted_percentile(&self) -> Percentile {
        self.counted_percentile
    }

    /// Population scenario to read for a climate scenario.
    pub fn population_scenario_for<'a>(&'a self, climate_scenario: &'a str) -> &'a str {
        self.population_scenario.as_deref().unwrap_or(climate_scenario)
    }

    /// Threshold estimation configuration.
    pub fn threshold(&self) -> &ThresholdConfig {
        &self.threshold
    }

    /// Exceedance configuration.
    pub fn exceedance(&self) -> &ExceedanceConfig {
        &self.exceedance
    }

    /// Ensemble configuration.
    pub fn ensemble(&self) -> &EnsembleConfig {
        &self.ensemble
    }

    /// Every (model, scenario, year) combination, in key order.
    pub fn tasks(&self) -> Vec<ProjectionKey> {
        let mut tasks: Vec<ProjectionKey> = self
            .models
            .iter()
            .flat_map(|m| {
                self.scenarios.iter().flat_map(move |s| {
                    self.years.iter().map(move |&y| ProjectionKey::new(m.as_str(), s.as_str(), y))
                })
            })
            .collect();
        tasks.sort();
        tasks
    }

    /// Validates this configuration and every stage configuration.
    ///
    /// Checks that models, scenarios and years are non-empty and free of
    /// duplicates and that the counted percentile is one the threshold stage
    /// computes.
    pub fn validate(&self) -> Result<(), PipelineError> {
        non_empty_unique("models", &self.models)?;
        non_empty_unique("scenarios", &self.scenarios)?;
        non_empty_unique("years", &self.years)?;
        if !self.threshold.percentiles().contains(&self.counted_percentile) {
            return Err(PipelineError::InvalidConfig {
                reason: format!(
                    "counted percentile {} is not among the estimated levels {:?}",
                    self.counted_percentile,
                    self.threshold.percentiles()
                ),
            });
        }
        if let Some(s) = &self.population_scenario
            && s.is_empty()
        {
            return Err(PipelineError::InvalidConfig {
                reason: "population scenario must not be empty".to_string(),
            });
        }
        self.threshold.validate()?;
        self.exceedance.validate()?;
        self.ensemble.validate()?;
        Ok(())
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self::new()
    }
}

fn non_empty_unique<T: Ord + std::fmt::Debug>(what: &str, items: &[T]) -> Result<(), PipelineError> {
    if items.is_empty() {
        return Err(PipelineError::InvalidConfig {
            reason: format!("{what} must not be empty"),
        });
    }
    let mut seen = BTreeSet::new();
    if let Some(dup) = items.iter().find(|item| !seen.insert(*item)) {
        return Err(PipelineError::InvalidConfig {
            reason: format!("duplicate entry {dup:?} in {what}"),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use heatdays_exceedance::DayNormalization;

    fn valid() -> PipelineConfig {
        PipelineConfig::new()
            .with_models(vec!["A".into(), "B".into()])
            .with_scenarios(vec!["ssp245".into()])
    }

    #[test]
    fn defaults() {
        let cfg = PipelineConfig::new();
        assert_eq!(cfg.years(), &[2025, 2030, 2050]);
        assert_eq!(cfg.counted_percentile(), Percentile::P95);
        assert_eq!(cfg.population_scenario_for("ssp245"), "ssp245");
        // no models configured yet
        assert!(cfg.validate().is_err());
        assert!(valid().validate().is_ok());
    }

    #[test]
    fn tasks_cover_every_combination() {
        let tasks = valid().with_years(vec![2050, 2030]).tasks();
        assert_eq!(tasks.len(), 4);
        assert_eq!(tasks[0], ProjectionKey::new("A", "ssp245", 2030));
        assert_eq!(tasks[3], ProjectionKey::new("B", "ssp245", 2050));
    }

    #[test]
    fn validate_duplicates() {
        let cfg = valid().with_years(vec![2030, 2030]);
        let err = cfg.validate().unwrap_err();
        assert!(err.to_string().contains("duplicate entry 2030 in years"));
    }

    #[test]
    fn validate_counted_level_must_be_estimated() {
        let cfg = valid()
            .with_threshold(ThresholdConfig::new().with_percentiles(vec![Percentile::P90]));
        assert!(cfg.validate().is_err());
        assert!(cfg.with_counted_percentile(Percentile::P90).validate().is_ok());
    }

    #[test]
    fn validate_delegates_to_stages() {
        let cfg = valid().with_exceedance(
            ExceedanceConfig::new().with_normalization(DayNormalization::PerYearLength(0)),
        );
        assert!(matches!(cfg.validate(), Err(PipelineError::Exceedance(_))));
    }

    #[test]
    fn population_scenario_override() {
        let cfg = valid().with_population_scenario(Some("SSP2_CP".into()));
        assert_eq!(cfg.population_scenario_for("ssp585"), "SSP2_CP");
    }
}
