//! Terminal result table keyed by (region, scenario, year).

use std::collections::BTreeMap;

use heatdays_grid::RegionId;
use tracing::warn;

use crate::ensemble::EnsembleStat;

/// Ensemble statistics for every (region, scenario, year).
///
/// Iteration is in key order: region, then scenario, then year.
#[derive(Debug, Clone, Default)]
pub struct EnsembleTable {
    cells: BTreeMap<(RegionId, String, i32), EnsembleStat>,
    names: BTreeMap<RegionId, String>,
}

impl EnsembleTable {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn insert(&mut self, region: RegionId, scenario: &str, year: i32, stat: EnsembleStat) {
        self.cells.insert((region, scenario.to_string(), year), stat);
    }

    /// Attaches display names used when the table is written out.
    pub fn with_names(mut self, names: BTreeMap<RegionId, String>) -> Self {
        self.names = names;
        self
    }

    /// Reports every expected (region, scenario, year).
    ///
    /// Cells no member reached are added as [`EnsembleStat::EMPTY`]; cells
    /// already present are left alone.
    pub fn with_expected_cells(
        mut self,
        regions: impl IntoIterator<Item = RegionId>,
        scenarios: &[String],
        years: &[i32],
    ) -> Self {
        let mut n_added = 0usize;
        for region in regions {
            for scenario in scenarios {
                for &year in years {
                    let key = (region, scenario.clone(), year);
                    if !self.cells.contains_key(&key) {
                        self.cells.insert(key, EnsembleStat::EMPTY);
                        n_added += 1;
                    }
                }
            }
        }
        if n_added > 0 {
            warn!(n_added, "cells without any contributing model");
        }
        self
    }

    /// Statistic for one cell.
    pub fn get(&self, region: RegionId, scenario: &str, year: i32) -> Option<&EnsembleStat> {
        self.cells.get(&(region, scenario.to_string(), year))
    }

    /// Display name of a region, if one was attached.
    pub fn name(&self, region: RegionId) -> Option<&str> {
        self.names.get(&region).map(String::as_str)
    }

    /// All cells in key order.
    pub fn iter(&self) -> impl Iterator<Item = (RegionId, &str, i32, &EnsembleStat)> + '_ {
        self.cells
            .iter()
            .map(|((region, scenario, year), stat)| (*region, scenario.as_str(), *year, stat))
    }

    /// Number of cells.
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Whether the table has no cells.
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}
