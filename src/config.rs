use std::collections::BTreeMap;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;

/// Reads and parses a TOML configuration file.
pub fn load(path: &Path) -> Result<HeatdaysConfig> {
    let toml_str = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read config file: {}", path.display()))?;
    toml::from_str(&toml_str).context("failed to parse TOML config")
}

/// Top-level heatdays configuration.
#[derive(Debug, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct HeatdaysConfig {
    /// Historical threshold settings.
    #[serde(default)]
    pub historical: HistoricalToml,

    /// Projection and counting settings.
    #[serde(default)]
    pub projection: ProjectionToml,

    /// Ensemble statistics settings.
    #[serde(default)]
    pub ensemble: EnsembleToml,

    /// Runner settings.
    #[serde(default)]
    pub run: RunToml,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct HistoricalToml {
    #[serde(default = "default_start_year")]
    pub start_year: i32,
    #[serde(default = "default_end_year")]
    pub end_year: i32,
    #[serde(default = "default_percentiles")]
    pub percentiles: Vec<u8>,
    #[serde(default = "default_missing_tolerance")]
    pub missing_tolerance: f64,
    #[serde(default = "default_band_rows")]
    pub band_rows: usize,
}

impl Default for HistoricalToml {
    fn default() -> Self {
        Self {
            start_year: default_start_year(),
            end_year: default_end_year(),
            percentiles: default_percentiles(),
            missing_tolerance: default_missing_tolerance(),
            band_rows: default_band_rows(),
        }
    }
}

fn default_start_year() -> i32 {
    1995
}
fn default_end_year() -> i32 {
    2024
}
fn default_percentiles() -> Vec<u8> {
    vec![90, 95]
}
fn default_missing_tolerance() -> f64 {
    0.1
}
fn default_band_rows() -> usize {
    30
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProjectionToml {
    #[serde(default)]
    pub models: Vec<String>,
    #[serde(default)]
    pub scenarios: Vec<String>,
    #[serde(default = "default_years")]
    pub years: Vec<i32>,
    #[serde(default = "default_counted_percentile")]
    pub counted_percentile: u8,
    #[serde(default = "default_normalization")]
    pub normalization: String,
    #[serde(default = "default_reference_days")]
    pub reference_days: u16,
    #[serde(default = "default_true")]
    pub kelvin_input: bool,
    #[serde(default = "default_true")]
    pub recentre_longitude: bool,
    /// Reverse south-to-north model rows onto the north-to-south reanalysis grid.
    #[serde(default = "default_true")]
    pub flip_latitude: bool,
    #[serde(default)]
    pub population_scenario: Option<String>,
}

impl Default for ProjectionToml {
    fn default() -> Self {
        Self {
            models: Vec::new(),
            scenarios: Vec::new(),
            years: default_years(),
            counted_percentile: default_counted_percentile(),
            normalization: default_normalization(),
            reference_days: default_reference_days(),
            kelvin_input: true,
            recentre_longitude: true,
            flip_latitude: true,
            population_scenario: None,
        }
    }
}

fn default_years() -> Vec<i32> {
    vec![2025, 2030, 2050]
}
fn default_counted_percentile() -> u8 {
    95
}
fn default_normalization() -> String {
    "raw".to_string()
}
fn default_reference_days() -> u16 {
    365
}
fn default_true() -> bool {
    true
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EnsembleToml {
    #[serde(default = "default_single_member_spread")]
    pub single_member_spread: String,
    #[serde(default = "default_min_models")]
    pub min_models: usize,
}

impl Default for EnsembleToml {
    fn default() -> Self {
        Self {
            single_member_spread: default_single_member_spread(),
            min_models: default_min_models(),
        }
    }
}

fn default_single_member_spread() -> String {
    "zero".to_string()
}
fn default_min_models() -> usize {
    1
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RunToml {
    /// CMIP6 variable id of the projection files to plan.
    #[serde(default = "default_variable")]
    pub variable: String,
    /// CMIP6 table id of the projection files to plan.
    #[serde(default = "default_table")]
    pub table: String,
    /// Region display names keyed by region number.
    #[serde(default)]
    pub region_names: BTreeMap<String, String>,
}

impl Default for RunToml {
    fn default() -> Self {
        Self {
            variable: default_variable(),
            table: default_table(),
            region_names: BTreeMap::new(),
        }
    }
}

fn default_variable() -> String {
    "tasmax".to_string()
}
fn default_table() -> String {
    "day".to_string()
}
