//! End-to-end runs: thresholds, counts, regional values, ensemble table.

use std::collections::BTreeMap;

use heatdays_aggregate::{EnsembleTable, RegionalValues, regional_values, summarize_ensemble};
use heatdays_exceedance::{align_projection, count_exceedances};
use heatdays_grid::{
    DailySource, GridError, ProjectionKey, RegionId, RegionMembership, ValueGrid,
    flip_latitude_values, recentre_values,
};
use heatdays_threshold::{ThresholdGrid, ThresholdSet, estimate_thresholds_banded};
use rayon::prelude::*;
use tracing::{debug, info, info_span, warn};

use crate::config::PipelineConfig;
use crate::error::PipelineError;
use crate::source::{IndexSource, PopulationSource, ProjectionSource};

/// Everything an end-to-end run produces.
#[derive(Debug, Clone)]
pub struct PipelineOutput {
    /// Historical thresholds; `None` for the precomputed-index path.
    pub thresholds: Option<ThresholdSet>,
    /// Per-model regional values, in key order.
    pub regional: Vec<RegionalValues>,
    /// Ensemble statistics per (region, scenario, year).
    pub table: EnsembleTable,
    /// Combinations the source did not cover.
    pub skipped: Vec<ProjectionKey>,
}

/// Runs the heat-day index: thresholds from the historical record, then
/// per-model exceedance counts aggregated by region and across the ensemble.
///
/// Each (model, scenario, year) is an independent parallel task. A
/// combination the projection source does not cover is skipped and listed
/// in [`PipelineOutput::skipped`].
///
/// # Errors
///
/// Returns [`PipelineError::UnknownModel`] or [`PipelineError::UnknownScenario`]
/// for ids the source does not offer, and the first stage error otherwise.
#[tracing::instrument(skip_all, fields(n_tasks = config.tasks().len()))]
pub fn run_heat_index<H, P, Q>(
    historical: &H,
    projections: &P,
    population: &Q,
    membership: &RegionMembership,
    config: &PipelineConfig,
) -> Result<PipelineOutput, PipelineError>
where
    H: DailySource + ?Sized,
    P: ProjectionSource + ?Sized,
    Q: PopulationSource + ?Sized,
{
    config.validate()?;
    check_ids(config, &projections.models(), &projections.scenarios())?;

    let thresholds = estimate_thresholds_banded(historical, config.threshold())?;
    let threshold = thresholds
        .get(config.counted_percentile())
        .ok_or_else(|| PipelineError::InvalidConfig {
            reason: format!("{} thresholds were not estimated", config.counted_percentile()),
        })?;

    let (regional, skipped) = run_tasks(config, population, membership, |key| {
        heat_index_task(key, threshold, projections, config)
    })?;

    let table = finish(&regional, membership, config)?;
    Ok(PipelineOutput {
        thresholds: Some(thresholds),
        regional,
        table,
        skipped,
    })
}

/// Runs the regional and ensemble stages on a precomputed per-pixel index
/// such as the annual Fire Weather Index.
///
/// The alignment switches of `config.exceedance()` apply to index grids too:
/// `recentre_longitude` re-centres them onto [-180, 180) and `flip_latitude`
/// reverses their rows before aggregation.
///
/// # Errors
///
/// As for [`run_heat_index`], without the threshold stage.
#[tracing::instrument(skip_all, fields(n_tasks = config.tasks().len()))]
pub fn run_precomputed_index<I, Q>(
    index: &I,
    population: &Q,
    membership: &RegionMembership,
    config: &PipelineConfig,
) -> Result<PipelineOutput, PipelineError>
where
    I: IndexSource + ?Sized,
    Q: PopulationSource + ?Sized,
{
    config.validate()?;
    check_ids(config, &index.models(), &index.scenarios())?;

    let (regional, skipped) = run_tasks(config, population, membership, |key| {
        let Some(mut grid) = index.read(key).map_err(|source| PipelineError::Source {
            key: key.to_string(),
            source,
        })?
        else {
            return Ok(None);
        };
        if config.exceedance().recentre_longitude() {
            grid = recentre_values(&grid).map_err(|source| keyed(key, source))?;
        }
        if config.exceedance().flip_latitude() {
            grid = flip_latitude_values(&grid).map_err(|source| keyed(key, source))?;
        }
        Ok(Some(grid))
    })?;

    let table = finish(&regional, membership, config)?;
    Ok(PipelineOutput {
        thresholds: None,
        regional,
        table,
        skipped,
    })
}

/// Loads, aligns and counts one projection, returning values for aggregation.
fn heat_index_task<P: ProjectionSource + ?Sized>(
    key: &ProjectionKey,
    threshold: &ThresholdGrid,
    projections: &P,
    config: &PipelineConfig,
) -> Result<Option<ValueGrid>, PipelineError> {
    let Some(series) = projections.read(key).map_err(|source| PipelineError::Source {
        key: key.to_string(),
        source,
    })?
    else {
        return Ok(None);
    };
    let series = align_projection(series, config.exceedance())?;
    let counts = count_exceedances(&series, threshold)?;
    let values = counts
        .to_values(config.exceedance().normalization())
        .map_err(|source| keyed(key, source))?;
    Ok(Some(values))
}

fn keyed(key: &ProjectionKey, source: GridError) -> PipelineError {
    PipelineError::Grid {
        key: key.to_string(),
        source,
    }
}

/// Runs `load` for every task in parallel and reduces each grid by region.
fn run_tasks<F, Q>(
    config: &PipelineConfig,
    population: &Q,
    membership: &RegionMembership,
    load: F,
) -> Result<(Vec<RegionalValues>, Vec<ProjectionKey>), PipelineError>
where
    F: Fn(&ProjectionKey) -> Result<Option<ValueGrid>, PipelineError> + Sync,
    Q: PopulationSource + ?Sized,
{
    let tasks = config.tasks();
    let outcomes = tasks
        .par_iter()
        .map(|key| -> Result<Option<RegionalValues>, PipelineError> {
            let _span = info_span!("task", %key).entered();
            let Some(grid) = load(key)? else {
                debug!("combination not covered by source");
                return Ok(None);
            };
            let pop_scenario = config.population_scenario_for(&key.scenario);
            let pop = population.population(pop_scenario, key.year).map_err(|source| {
                PipelineError::Population {
                    scenario: pop_scenario.to_string(),
                    year: key.year,
                    source,
                }
            })?;
            Ok(Some(regional_values(key, &grid, &pop, membership)?))
        })
        .collect::<Result<Vec<_>, _>>()?;

    let mut regional = Vec::with_capacity(tasks.len());
    let mut skipped = Vec::new();
    for (key, outcome) in tasks.into_iter().zip(outcomes) {
        match outcome {
            Some(values) => regional.push(values),
            None => skipped.push(key),
        }
    }
    if !skipped.is_empty() {
        warn!(
            n_skipped = skipped.len(),
            n_tasks = regional.len() + skipped.len(),
            "some combinations were not covered by the source"
        );
    }
    Ok((regional, skipped))
}

fn finish(
    regional: &[RegionalValues],
    membership: &RegionMembership,
    config: &PipelineConfig,
) -> Result<EnsembleTable, PipelineError> {
    let names: BTreeMap<RegionId, String> = membership
        .region_ids()
        .filter_map(|id| Some((id, membership.name(id)?.to_string())))
        .collect();
    let table = summarize_ensemble(regional, config.ensemble())?
        .with_expected_cells(membership.region_ids(), config.scenarios(), config.years())
        .with_names(names);
    info!(
        n_members = regional.len(),
        n_rows = table.len(),
        "pipeline finished"
    );
    Ok(table)
}

/// Fails on configured ids the source does not offer.
fn check_ids(
    config: &PipelineConfig,
    models: &[String],
    scenarios: &[String],
) -> Result<(), PipelineError> {
    if let Some(model) = config.models().iter().find(|m| !models.contains(m)) {
        return Err(PipelineError::UnknownModel {
            model: model.clone(),
            available: models.join(", "),
        });
    }
    if let Some(scenario) = config.scenarios().iter().find(|s| !scenarios.contains(s)) {
        return Err(PipelineError::UnknownScenario {
            scenario: scenario.clone(),
            available: scenarios.join(", "),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn check_ids_reports_first_unknown() {
        let config = PipelineConfig::new()
            .with_models(vec!["A".into(), "Z".into()])
            .with_scenarios(vec!["ssp245".into()]);
        let err = check_ids(&config, &["A".to_string(), "B".to_string()], &["ssp245".to_string()])
            .unwrap_err();
        assert!(matches!(err, PipelineError::UnknownModel { ref model, .. } if model == "Z"));
        assert!(err.to_string().contains("available: A, B"));

        let err = check_ids(&config, &["A".to_string(), "Z".to_string()], &[]).unwrap_err();
        assert!(matches!(err, PipelineError::UnknownScenario { .. }));
    }
}
