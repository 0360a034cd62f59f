//! Plan command: match projection files against the configured tasks.

use std::collections::BTreeSet;
use std::path::Path;

use anyhow::{Context, Result, bail};
use serde::Serialize;
use tracing::{info, info_span, warn};

use heatdays_grid::{Cmip6FileName, ProjectionKey};
use heatdays_pipeline::PipelineConfig;

use crate::cli::PlanArgs;
use crate::config;
use crate::convert;

/// One task of the plan: a (model, scenario, year) and the file that covers it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlanEntry {
    pub model: String,
    pub scenario: String,
    pub year: i32,
    pub file: String,
}

/// Run the plan command.
pub fn run(args: PlanArgs) -> Result<()> {
    let _cmd = info_span!("plan").entered();
    let toml_cfg = config::load(&args.config)?;
    let pipeline = convert::build_pipeline_config(&toml_cfg)?;

    let prefix = format!("{}_{}_", toml_cfg.run.variable, toml_cfg.run.table);
    let names = list_projection_files(&args.models_dir, &prefix)?;
    info!(n_files = names.len(), dir = %args.models_dir.display(), "projection files found");

    let plan = build_plan(&names, &pipeline)?;
    let json = serde_json::to_string_pretty(&plan).context("failed to serialize plan")?;

    match args.output {
        Some(path) => {
            std::fs::write(&path, &json)
                .with_context(|| format!("failed to write plan: {}", path.display()))?;
            info!(path = %path.display(), n_tasks = plan.len(), "plan written");
        }
        None => println!("{json}"),
    }
    Ok(())
}

/// File names in `dir` that start with `prefix` and end in `.nc`, sorted.
fn list_projection_files(dir: &Path, prefix: &str) -> Result<Vec<String>> {
    let entries = std::fs::read_dir(dir)
        .with_context(|| format!("failed to list models directory: {}", dir.display()))?;
    let mut names = Vec::new();
    for entry in entries {
        let entry = entry.with_context(|| format!("failed to list {}", dir.display()))?;
        let file_name = entry.file_name();
        if let Some(name) = file_name.to_str()
            && name.starts_with(prefix)
            && name.ends_with(".nc")
        {
            names.push(name.to_string());
        }
    }
    names.sort();
    Ok(names)
}

/// Matches parsed file names against the configured models, scenarios and years.
///
/// Every file must name a configured model and scenario. A configured year
/// is planned from the first file (in name order) whose date range covers it.
pub fn build_plan(names: &[String], pipeline: &PipelineConfig) -> Result<Vec<PlanEntry>> {
    let mut plan = Vec::new();
    let mut planned: BTreeSet<ProjectionKey> = BTreeSet::new();

    for name in names {
        let parsed = Cmip6FileName::parse(name)?;
        if !pipeline.models().contains(&parsed.model) {
            bail!(
                "file {name} names model '{}', which is not configured (models: {})",
                parsed.model,
                pipeline.models().join(", ")
            );
        }
        if !pipeline.scenarios().contains(&parsed.scenario) {
            bail!(
                "file {name} names scenario '{}', which is not configured (scenarios: {})",
                parsed.scenario,
                pipeline.scenarios().join(", ")
            );
        }
        for &year in pipeline.years() {
            if parsed.covers(year) && planned.insert(parsed.key_for(year)) {
                plan.push(PlanEntry {
                    model: parsed.model.clone(),
                    scenario: parsed.scenario.clone(),
                    year,
                    file: name.clone(),
                });
            }
        }
    }

    for key in pipeline.tasks() {
        if !planned.contains(&key) {
            warn!(%key, "no projection file covers task");
        }
    }
    plan.sort_by(|a, b| {
        (&a.model, &a.scenario, a.year).cmp(&(&b.model, &b.scenario, b.year))
    });
    Ok(plan)
}
