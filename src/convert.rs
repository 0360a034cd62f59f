//! Pure conversion functions: TOML config structs -> crate API config types.

use std::collections::BTreeMap;

use anyhow::{Context, Result, bail};

use crate::config::*;

use heatdays_aggregate::{EnsembleConfig, SingleMemberSpread};
use heatdays_exceedance::{DayNormalization, ExceedanceConfig};
use heatdays_grid::RegionId;
use heatdays_pipeline::PipelineConfig;
use heatdays_threshold::{HistoricalWindow, Percentile, ThresholdConfig};

/// Parses a day normalisation name into the corresponding enum variant.
pub fn parse_normalization(s: &str, reference_days: u16) -> Result<DayNormalization> {
    match s.to_lowercase().as_str() {
        "raw" => Ok(DayNormalization::Raw),
        "per_year_length" => Ok(DayNormalization::PerYearLength(reference_days)),
        other => bail!("unknown normalization: {other:?}"),
    }
}

/// Parses a single-member spread convention name into the corresponding enum variant.
pub fn parse_spread(s: &str) -> Result<SingleMemberSpread> {
    match s.to_lowercase().as_str() {
        "zero" => Ok(SingleMemberSpread::Zero),
        "undefined" => Ok(SingleMemberSpread::Undefined),
        other => bail!("unknown single_member_spread: {other:?}"),
    }
}

/// Parses region display names keyed by region number.
pub fn parse_region_names(names: &BTreeMap<String, String>) -> Result<BTreeMap<RegionId, String>> {
    names
        .iter()
        .map(|(k, v)| -> Result<(RegionId, String)> {
            let id: u32 = k
                .trim()
                .parse()
                .with_context(|| format!("region name key {k:?} is not a region number"))?;
            Ok((RegionId(id), v.clone()))
        })
        .collect()
}

/// Builds a [`ThresholdConfig`] from the TOML historical configuration.
pub fn build_threshold_config(h: &HistoricalToml) -> Result<ThresholdConfig> {
    let percentiles = h
        .percentiles
        .iter()
        .map(|&p| Percentile::new(p))
        .collect::<Result<Vec<_>, _>>()?;
    let window = HistoricalWindow::new(h.start_year, h.end_year)?;
    Ok(ThresholdConfig::new()
        .with_percentiles(percentiles)
        .with_window(window)
        .with_missing_tolerance(h.missing_tolerance)
        .with_band_rows(h.band_rows))
}

/// Builds an [`ExceedanceConfig`] from the TOML projection configuration.
pub fn build_exceedance_config(p: &ProjectionToml) -> Result<ExceedanceConfig> {
    let normalization = parse_normalization(&p.normalization, p.reference_days)?;
    Ok(ExceedanceConfig::new()
        .with_normalization(normalization)
        .with_kelvin_input(p.kelvin_input)
        .with_recentre_longitude(p.recentre_longitude)
        .with_flip_latitude(p.flip_latitude))
}

/// Builds an [`EnsembleConfig`] from the TOML ensemble configuration.
pub fn build_ensemble_config(e: &EnsembleToml) -> Result<EnsembleConfig> {
    Ok(EnsembleConfig::new()
        .with_single_member_spread(parse_spread(&e.single_member_spread)?)
        .with_min_models(e.min_models))
}

/// Builds and validates a [`PipelineConfig`] from the whole TOML file.
pub fn build_pipeline_config(cfg: &HeatdaysConfig) -> Result<PipelineConfig> {
    let p = &cfg.projection;
    let pipeline = PipelineConfig::new()
        .with_models(p.models.clone())
        .with_scenarios(p.scenarios.clone())
        .with_years(p.years.clone())
        .with_counted_percentile(Percentile::new(p.counted_percentile)?)
        .with_population_scenario(p.population_scenario.clone())
        .with_threshold(build_threshold_config(&cfg.historical)?)
        .with_exceedance(build_exceedance_config(p)?)
        .with_ensemble(build_ensemble_config(&cfg.ensemble)?);
    pipeline.validate().context("validating configuration")?;
    Ok(pipeline)
}
