//! Model to ensemble reduction.

use std::collections::{BTreeMap, BTreeSet};

use heatdays_grid::RegionId;
use heatdays_stats::{mean, sd};
use tracing::{info, warn};

use crate::config::{EnsembleConfig, SingleMemberSpread};
use crate::error::AggregateError;
use crate::regional::RegionalValues;
use crate::table::EnsembleTable;

/// Ensemble mean, sample spread and contributing-model count for one cell.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EnsembleStat {
    /// Arithmetic mean across contributing models.
    pub mean: Option<f64>,
    /// Sample (N-1) standard deviation across contributing models.
    pub std: Option<f64>,
    /// Models whose regional value was not "no data".
    pub n_models: usize,
}

impl EnsembleStat {
    /// A cell no model contributed to.
    pub const EMPTY: EnsembleStat = EnsembleStat {
        mean: None,
        std: None,
        n_models: 0,
    };
}

/// Mean and spread of the values contributed by an ensemble.
///
/// With fewer than `config.min_models()` values (including none at all) the
/// count is reported and both statistics are "no data".
pub fn ensemble_stats(values: &[f64], config: &EnsembleConfig) -> EnsembleStat {
    let n = values.len();
    if n == 0 || n < config.min_models() {
        return EnsembleStat {
            n_models: n,
            ..EnsembleStat::EMPTY
        };
    }
    let std = match (n, config.single_member_spread()) {
        (1, SingleMemberSpread::Zero) => Some(0.0),
        (1, SingleMemberSpread::Undefined) => None,
        _ => Some(sd(values)),
    };
    EnsembleStat {
        mean: Some(mean(values)),
        std,
        n_models: n,
    }
}

/// Reduces per-model regional values to an ensemble table.
///
/// Members are grouped by (scenario, year); within a group every region seen
/// in any member gets one [`EnsembleStat`]. Models whose value for a region
/// is "no data" do not contribute to that region.
///
/// # Errors
///
/// Returns [`AggregateError::InvalidConfig`] for an invalid configuration and
/// [`AggregateError::DuplicateMember`] if a model appears twice in a group.
#[tracing::instrument(skip_all, fields(n_members = members.len()))]
pub fn summarize_ensemble(
    members: &[RegionalValues],
    config: &EnsembleConfig,
) -> Result<EnsembleTable, AggregateError> {
    config.validate()?;

    let mut groups: BTreeMap<(&str, i32), BTreeMap<&str, &RegionalValues>> = BTreeMap::new();
    for member in members {
        let key = member.key();
        let group = groups.entry((key.scenario.as_str(), key.year)).or_default();
        if group.insert(key.model.as_str(), member).is_some() {
            return Err(AggregateError::DuplicateMember {
                model: key.model.clone(),
                scenario: key.scenario.clone(),
                year: key.year,
            });
        }
    }

    let mut table = EnsembleTable::new();
    for ((scenario, year), group) in &groups {
        let regions: BTreeSet<RegionId> = group
            .values()
            .flat_map(|m| m.values().keys().copied())
            .collect();
        for region in regions {
            let contributions: Vec<f64> = group.values().filter_map(|m| m.get(region)).collect();
            let stat = ensemble_stats(&contributions, config);
            if stat.n_models == 0 {
                warn!(%region, scenario, year, "no model contributed to region");
            }
            table.insert(region, scenario, *year, stat);
        }
    }

    info!(
        n_groups = groups.len(),
        n_rows = table.len(),
        "ensemble statistics computed"
    );
    Ok(table)
}
