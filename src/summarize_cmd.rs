//! Summarize command: per-model regional values -> ensemble table JSON.

use std::collections::BTreeSet;

use anyhow::{Context, Result, bail};
use tracing::{info, info_span};

use heatdays_aggregate::{RegionalValues, parse_regional_json, summarize_ensemble, to_json};
use heatdays_grid::RegionId;
use heatdays_pipeline::PipelineConfig;

use crate::cli::SummarizeArgs;
use crate::config;
use crate::convert;

/// Run the summarize command.
pub fn run(args: SummarizeArgs) -> Result<()> {
    let _cmd = info_span!("summarize").entered();
    let toml_cfg = config::load(&args.config)?;
    let pipeline = convert::build_pipeline_config(&toml_cfg)?;
    let names = convert::parse_region_names(&toml_cfg.run.region_names)?;

    let json = std::fs::read_to_string(&args.input)
        .with_context(|| format!("failed to read input: {}", args.input.display()))?;
    let members = parse_regional_json(&json)
        .with_context(|| format!("failed to parse regional values: {}", args.input.display()))?;
    check_members(&members, &pipeline)?;
    info!(n_members = members.len(), "regional values loaded");

    let regions: BTreeSet<RegionId> = members
        .iter()
        .flat_map(|m| m.values().keys().copied())
        .chain(names.keys().copied())
        .collect();
    let table = summarize_ensemble(&members, pipeline.ensemble())?
        .with_expected_cells(regions, pipeline.scenarios(), pipeline.years())
        .with_names(names);
    let out = to_json(&table)?;

    let out_path = args
        .output
        .unwrap_or_else(|| args.input.with_extension("ensemble.json"));
    std::fs::write(&out_path, &out)
        .with_context(|| format!("failed to write ensemble table: {}", out_path.display()))?;
    info!(path = %out_path.display(), n_rows = table.len(), "ensemble table written");
    Ok(())
}

/// Rejects members whose model or scenario is not configured.
fn check_members(members: &[RegionalValues], pipeline: &PipelineConfig) -> Result<()> {
    for m in members {
        let key = m.key();
        if !pipeline.models().contains(&key.model) {
            bail!("regional values for unknown model '{}' ({key})", key.model);
        }
        if !pipeline.scenarios().contains(&key.scenario) {
            bail!("regional values for unknown scenario '{}' ({key})", key.scenario);
        }
    }
    Ok(())
}
