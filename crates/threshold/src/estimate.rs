//! Percentile estimation over the historical window.
//!
//! Both entry points reduce to [`block_thresholds`]: a `(days, pixels)` block
//! is processed column by column in parallel, each pixel's finite values are
//! sorted once, and every requested level is read off the same sorted sample.

use std::collections::BTreeMap;

use heatdays_grid::{DailySeries, DailySource, GridError, Lattice};
use heatdays_stats::sorted_finite_into;
use ndarray::{ArrayView2, Axis, concatenate};
use rayon::prelude::*;
use tracing::{debug, info, warn};

use crate::config::{HistoricalWindow, QUANTILE_RULE, ThresholdConfig};
use crate::error::ThresholdError;
use crate::result::{ThresholdGrid, ThresholdSet};

/// Estimates thresholds from a historical series held in memory.
///
/// Days outside the configured window are ignored.
///
/// # Errors
///
/// Returns [`ThresholdError::InvalidConfig`] for an invalid configuration and
/// [`ThresholdError::MissingYear`] if a window year has no days in `series`.
#[tracing::instrument(skip_all, fields(n_pixels = series.values().ncols(), n_days = series.n_days()))]
pub fn estimate_thresholds(
    series: &DailySeries,
    config: &ThresholdConfig,
) -> Result<ThresholdSet, ThresholdError> {
    config.validate()?;
    let window = config.window();
    check_window(&series.years(), window)?;

    let window_days: Vec<usize> = series
        .day_years()
        .iter()
        .enumerate()
        .filter(|&(_, &y)| window.contains(y))
        .map(|(d, _)| d)
        .collect();

    let probs = probabilities(config);
    let per_pixel = if window_days.len() == series.n_days() {
        block_thresholds(series.values().view(), &probs, config.missing_tolerance())
    } else {
        let block = series.values().select(Axis(0), &window_days);
        block_thresholds(block.view(), &probs, config.missing_tolerance())
    };

    let mut acc = LevelAccumulator::new(series.lattice().n_pixels(), probs.len());
    acc.write(0, per_pixel);
    finish(*series.lattice(), config, acc, window_days.len())
}

/// Estimates thresholds by streaming the source one latitude band at a time.
///
/// For each band of `config.band_rows()` rows, every window year is read and
/// concatenated along time, so only one band of the full record is resident
/// at once. Results are identical to [`estimate_thresholds`] on the same data.
///
/// # Errors
///
/// Returns [`ThresholdError::MissingYear`] if the source lacks a window year,
/// [`ThresholdError::EmptyYear`] if a read returns no days, and
/// [`ThresholdError::Grid`] for read failures or band shape mismatches.
#[tracing::instrument(skip_all, fields(n_pixels = source.lattice().n_pixels()))]
pub fn estimate_thresholds_banded<S: DailySource + ?Sized>(
    source: &S,
    config: &ThresholdConfig,
) -> Result<ThresholdSet, ThresholdError> {
    config.validate()?;
    let window = config.window();
    check_window(&source.years(), window)?;

    let lattice = *source.lattice();
    let probs = probabilities(config);
    let mut acc = LevelAccumulator::new(lattice.n_pixels(), probs.len());
    let mut n_days = 0usize;

    for start in (0..lattice.n_lat()).step_by(config.band_rows()) {
        let rows = start..(start + config.band_rows()).min(lattice.n_lat());
        let pixels = lattice.band_pixels(rows.clone());
        debug!(rows = ?rows, "processing latitude band");

        let mut pieces = Vec::with_capacity(window.n_years());
        for year in window.years() {
            let piece = source.read_band(year, rows.clone())?;
            if piece.nrows() == 0 {
                return Err(ThresholdError::EmptyYear { year });
            }
            if piece.ncols() != pixels.len() {
                return Err(GridError::LengthMismatch {
                    what: format!("band {rows:?} of year {year}"),
                    expected: pixels.len(),
                    got: piece.ncols(),
                }
                .into());
            }
            pieces.push(piece);
        }

        let block = {
            let views: Vec<ArrayView2<'_, f64>> = pieces.iter().map(|p| p.view()).collect();
            concatenate(Axis(0), &views).map_err(|e| GridError::Source {
                reason: format!("cannot join band {rows:?}: {e}"),
            })?
        };
        drop(pieces);
        if start == 0 {
            n_days = block.nrows();
        }

        let per_pixel = block_thresholds(block.view(), &probs, config.missing_tolerance());
        acc.write(pixels.start, per_pixel);
    }

    finish(lattice, config, acc, n_days)
}

/// Thresholds for one pixel's sample, one value per entry of `probs`.
///
/// Returns `None` when the sample has no finite values or its missing
/// fraction exceeds `tolerance`. `buf` is scratch space reused across calls.
pub(crate) fn pixel_thresholds(
    sample: impl IntoIterator<Item = f64>,
    n_days: usize,
    probs: &[f64],
    tolerance: f64,
    buf: &mut Vec<f64>,
) -> Option<Vec<f64>> {
    let n_valid = sorted_finite_into(sample, buf);
    if n_valid == 0 {
        return None;
    }
    let missing_fraction = (n_days - n_valid) as f64 / n_days as f64;
    if missing_fraction > tolerance {
        return None;
    }
    Some(probs.iter().map(|&p| QUANTILE_RULE.apply(buf, p)).collect())
}

/// Thresholds for every column of a `(days, pixels)` block.
fn block_thresholds(block: ArrayView2<'_, f64>, probs: &[f64], tolerance: f64) -> Vec<Option<Vec<f64>>> {
    let n_days = block.nrows();
    (0..block.ncols())
        .into_par_iter()
        .map_init(Vec::new, |buf, col| {
            pixel_thresholds(block.column(col).iter().copied(), n_days, probs, tolerance, buf)
        })
        .collect()
}

fn probabilities(config: &ThresholdConfig) -> Vec<f64> {
    config.percentiles().iter().map(|p| p.fraction()).collect()
}

fn check_window(available: &[i32], window: HistoricalWindow) -> Result<(), ThresholdError> {
    for year in window.years() {
        if available.binary_search(&year).is_err() {
            let available = match (available.first(), available.last()) {
                (Some(first), Some(last)) => {
                    format!("{first}..={last}, {} years", available.len())
                }
                _ => "none".to_string(),
            };
            return Err(ThresholdError::MissingYear { year, available });
        }
    }
    Ok(())
}

/// Per-level output buffers filled band by band.
struct LevelAccumulator {
    levels: Vec<Vec<Option<f64>>>,
}

impl LevelAccumulator {
    fn new(n_pixels: usize, n_levels: usize) -> Self {
        Self {
            levels: vec![vec![None; n_pixels]; n_levels],
        }
    }

    fn write(&mut self, offset: usize, per_pixel: Vec<Option<Vec<f64>>>) {
        for (i, thresholds) in per_pixel.into_iter().enumerate() {
            if let Some(values) = thresholds {
                for (level, v) in self.levels.iter_mut().zip(values) {
                    level[offset + i] = Some(v);
                }
            }
        }
    }
}

fn finish(
    lattice: Lattice,
    config: &ThresholdConfig,
    acc: LevelAccumulator,
    n_days: usize,
) -> Result<ThresholdSet, ThresholdError> {
    let mut grids = BTreeMap::new();
    for (&percentile, values) in config.percentiles().iter().zip(acc.levels) {
        grids.insert(percentile, ThresholdGrid::new(lattice, percentile, values)?);
    }
    let set = ThresholdSet::new(config.window(), grids, n_days);

    let n_no_data = set.n_no_data();
    if n_no_data > 0 {
        warn!(
            n_no_data,
            n_pixels = lattice.n_pixels(),
            tolerance = config.missing_tolerance(),
            "pixels flagged no data for insufficient historical coverage"
        );
    }
    info!(
        levels = ?config.percentiles(),
        n_days,
        window_start = config.window().start_year(),
        window_end = config.window().end_year(),
        "historical thresholds estimated"
    );
    Ok(set)
}
