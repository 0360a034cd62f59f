//! Data sources the pipeline reads from.
//!
//! File formats live outside this workspace. Readers implement these traits;
//! the in-memory implementations here serve tests and small studies where
//! grids are already loaded.

use std::collections::{BTreeMap, BTreeSet};

use heatdays_grid::{GridError, PopulationGrid, ProjectionKey, ProjectionSeries, ValueGrid};

/// Daily projections, one (model, scenario, year) at a time.
pub trait ProjectionSource: Sync {
    /// Model ids the source can serve, ascending.
    fn models(&self) -> Vec<String>;

    /// Scenario ids the source can serve, ascending.
    fn scenarios(&self) -> Vec<String>;

    /// Reads one projection year.
    ///
    /// Returns `Ok(None)` when the model does not cover that scenario or year.
    ///
    /// # Errors
    ///
    /// Returns [`GridError`] if the data exists but cannot be read.
    fn read(&self, key: &ProjectionKey) -> Result<Option<ProjectionSeries>, GridError>;
}

/// Precomputed per-pixel index grids (e.g. annual Fire Weather Index).
pub trait IndexSource: Sync {
    /// Model ids the source can serve, ascending.
    fn models(&self) -> Vec<String>;

    /// Scenario ids the source can serve, ascending.
    fn scenarios(&self) -> Vec<String>;

    /// Reads one index grid, `Ok(None)` when the combination is not covered.
    ///
    /// # Errors
    ///
    /// Returns [`GridError`] if the data exists but cannot be read.
    fn read(&self, key: &ProjectionKey) -> Result<Option<ValueGrid>, GridError>;
}

/// Population weights per population scenario and year.
pub trait PopulationSource: Sync {
    /// Reads the population grid for `scenario` in `year`.
    ///
    /// # Errors
    ///
    /// Returns [`GridError`] if no grid is available.
    fn population(&self, scenario: &str, year: i32) -> Result<PopulationGrid, GridError>;
}

/// Projections held in memory.
#[derive(Debug, Clone, Default)]
pub struct InMemoryProjections {
    series: BTreeMap<ProjectionKey, ProjectionSeries>,
}

impl InMemoryProjections {
    /// Creates an empty source.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a projection, replacing any earlier one for the same key.
    pub fn insert(&mut self, series: ProjectionSeries) {
        self.series.insert(series.key().clone(), series);
    }
}

impl ProjectionSource for InMemoryProjections {
    fn models(&self) -> Vec<String> {
        unique(self.series.keys().map(|k| &k.model))
    }

    fn scenarios(&self) -> Vec<String> {
        unique(self.series.keys().map(|k| &k.scenario))
    }

    fn read(&self, key: &ProjectionKey) -> Result<Option<ProjectionSeries>, GridError> {
        Ok(self.series.get(key).cloned())
    }
}

/// Index grids held in memory.
#[derive(Debug, Clone, Default)]
pub struct InMemoryIndex {
    grids: BTreeMap<ProjectionKey, ValueGrid>,
}

impl InMemoryIndex {
    /// Creates an empty source.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a grid, replacing any earlier one for the same key.
    pub fn insert(&mut self, key: ProjectionKey, grid: ValueGrid) {
        self.grids.insert(key, grid);
    }
}

impl IndexSource for InMemoryIndex {
    fn models(&self) -> Vec<String> {
        unique(self.grids.keys().map(|k| &k.model))
    }

    fn scenarios(&self) -> Vec<String> {
        unique(self.grids.keys().map(|k| &k.scenario))
    }

    fn read(&self, key: &ProjectionKey) -> Result<Option<ValueGrid>, GridError> {
        Ok(self.grids.get(key).cloned())
    }
}

/// Population grids held in memory, with an optional grid for any other
/// scenario and year.
#[derive(Debug, Clone, Default)]
pub struct InMemoryPopulation {
    grids: BTreeMap<(String, i32), PopulationGrid>,
    fallback: Option<PopulationGrid>,
}

impl InMemoryPopulation {
    /// Creates an empty source.
    pub fn new() -> Self {
        Self::default()
    }

    /// A source that returns `grid` for every scenario and year.
    pub fn constant(grid: PopulationGrid) -> Self {
        Self {
            grids: BTreeMap::new(),
            fallback: Some(grid),
        }
    }

    /// Adds the grid for one scenario and year.
    pub fn insert(&mut self, scenario: impl Into<String>, year: i32, grid: PopulationGrid) {
        self.grids.insert((scenario.into(), year), grid);
    }
}

impl PopulationSource for InMemoryPopulation {
    fn population(&self, scenario: &str, year: i32) -> Result<PopulationGrid, GridError> {
        self.grids
            .get(&(scenario.to_string(), year))
            .or(self.fallback.as_ref())
            .cloned()
            .ok_or_else(|| GridError::Source {
                reason: format!("no population grid for scenario {scenario} year {year}"),
            })
    }
}

fn unique<'a>(ids: impl Iterator<Item = &'a String>) -> Vec<String> {
    ids.collect::<BTreeSet<_>>().into_iter().cloned().collect()
}
