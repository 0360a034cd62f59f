//! JSON row formats for regional values and the ensemble table.

use std::collections::BTreeMap;

use heatdays_grid::{ProjectionKey, RegionId};
use serde::{Deserialize, Serialize};

use crate::error::AggregateError;
use crate::regional::RegionalValues;
use crate::table::EnsembleTable;

/// One row of the ensemble table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnsembleRow {
    pub region: RegionId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region_name: Option<String>,
    pub scenario: String,
    pub year: i32,
    pub mean: Option<f64>,
    pub std: Option<f64>,
    pub n_models: usize,
}

/// One per-model regional value; `value: null` is "no data".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RegionalRow {
    pub model: String,
    pub scenario: String,
    pub year: i32,
    pub region: RegionId,
    pub value: Option<f64>,
}

/// Flattens the table into rows, in key order.
pub fn table_rows(table: &EnsembleTable) -> Vec<EnsembleRow> {
    table
        .iter()
        .map(|(region, scenario, year, stat)| EnsembleRow {
            region,
            region_name: table.name(region).map(str::to_string),
            scenario: scenario.to_string(),
            year,
            mean: stat.mean,
            std: stat.std,
            n_models: stat.n_models,
        })
        .collect()
}

/// Serialize the ensemble table to a JSON array of rows.
pub fn to_json(table: &EnsembleTable) -> Result<String, AggregateError> {
    serde_json::to_string_pretty(&table_rows(table)).map_err(|e| AggregateError::Serialization {
        reason: e.to_string(),
    })
}

/// Regroups rows by (model, scenario, year).
///
/// # Errors
///
/// Returns [`AggregateError::DuplicateRow`] if a region is listed twice for
/// the same key.
pub fn regional_from_rows(
    rows: impl IntoIterator<Item = RegionalRow>,
) -> Result<Vec<RegionalValues>, AggregateError> {
    let mut grouped: BTreeMap<ProjectionKey, BTreeMap<RegionId, Option<f64>>> = BTreeMap::new();
    for row in rows {
        let key = ProjectionKey::new(row.model, row.scenario, row.year);
        let regions = grouped.entry(key.clone()).or_default();
        if regions.insert(row.region, row.value).is_some() {
            return Err(AggregateError::DuplicateRow {
                key: key.to_string(),
                region: row.region,
            });
        }
    }
    Ok(grouped
        .into_iter()
        .map(|(key, values)| RegionalValues::new(key, values))
        .collect())
}

/// Parses a JSON array of [`RegionalRow`]s.
pub fn parse_regional_json(json: &str) -> Result<Vec<RegionalValues>, AggregateError> {
    let rows: Vec<RegionalRow> =
        serde_json::from_str(json).map_err(|e| AggregateError::Serialization {
            reason: e.to_string(),
        })?;
    regional_from_rows(rows)
}
