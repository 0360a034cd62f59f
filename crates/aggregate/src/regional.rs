//! Pixel to region reduction for one model's grid.

use std::collections::BTreeMap;

use heatdays_grid::{PopulationGrid, ProjectionKey, RegionId, RegionMembership, ValueGrid};
use heatdays_stats::weighted_mean;
use rayon::prelude::*;
use tracing::debug;

use crate::error::AggregateError;

/// Population-weighted value of every region for one (model, scenario, year).
///
/// The only input accepted by the ensemble stage, which keeps the
/// pixel-then-model order of the two reductions fixed.
#[derive(Debug, Clone, PartialEq)]
pub struct RegionalValues {
    key: ProjectionKey,
    values: BTreeMap<RegionId, Option<f64>>,
}

impl RegionalValues {
    /// Wraps regional values computed elsewhere (e.g. read back from disk).
    pub fn new(key: ProjectionKey, values: BTreeMap<RegionId, Option<f64>>) -> Self {
        Self { key, values }
    }

    /// The (model, scenario, year) the values belong to.
    pub fn key(&self) -> &ProjectionKey {
        &self.key
    }

    /// Value of one region; `None` if absent or "no data".
    pub fn get(&self, region: RegionId) -> Option<f64> {
        self.values.get(&region).copied().flatten()
    }

    /// All regions, ascending.
    pub fn values(&self) -> &BTreeMap<RegionId, Option<f64>> {
        &self.values
    }

    /// Number of regions with data.
    pub fn n_valid(&self) -> usize {
        self.values.values().filter(|v| v.is_some()).count()
    }
}

/// Reduces one value grid to population-weighted regional means.
///
/// For each region, `Σ v·pop / Σ pop` over member pixels where both the value
/// and the population are present. A region with no eligible population is
/// reported as "no data", never as zero. Every region of `membership` appears
/// in the result.
///
/// # Errors
///
/// Returns [`AggregateError::GridMismatch`] if the three grids are not on the
/// same lattice.
#[tracing::instrument(skip_all, fields(key = %key, n_regions = membership.n_regions()))]
pub fn regional_values(
    key: &ProjectionKey,
    grid: &ValueGrid,
    population: &PopulationGrid,
    membership: &RegionMembership,
) -> Result<RegionalValues, AggregateError> {
    let mismatch = |source| AggregateError::GridMismatch {
        context: key.to_string(),
        source,
    };
    grid.lattice()
        .ensure_same(population.lattice(), "population")
        .map_err(mismatch)?;
    grid.lattice()
        .ensure_same(membership.lattice(), "region membership")
        .map_err(mismatch)?;

    let values: BTreeMap<RegionId, Option<f64>> = membership
        .members()
        .par_iter()
        .map(|(&region, pixels)| {
            let pairs = pixels
                .iter()
                .filter_map(|&p| Some((grid.get(p)?, population.weight(p)?)));
            (region, weighted_mean(pairs))
        })
        .collect();

    let result = RegionalValues::new(key.clone(), values);
    debug!(n_valid = result.n_valid(), "regional values computed");
    Ok(result)
}
