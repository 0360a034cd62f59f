//! Bringing model output onto the reanalysis conventions before comparison.
//!
//! Climate-model archives store `tasmax` in Kelvin on a 0..360 longitude
//! axis with rows running south to north; the reanalysis thresholds are in
//! Celsius on -180..180 with rows running north to south.

use ndarray::Array2;
use tracing::debug;

use crate::error::GridError;
use crate::key::ProjectionKey;
use crate::lattice::Lattice;
use crate::series::ProjectionSeries;
use crate::values::ValueGrid;

/// Offset between Kelvin and Celsius.
pub const KELVIN_OFFSET: f64 = 273.15;

/// Converts a projection from Kelvin to Celsius.
pub fn kelvin_to_celsius(series: ProjectionSeries) -> ProjectionSeries {
    let (key, lattice, mut values) = series.into_parts();
    values.mapv_inplace(|v| v - KELVIN_OFFSET);
    rebuild(key, lattice, values)
}

/// Column order that re-centres a full-circle lattice on [-180, 180).
///
/// Returns the new lattice and, for each destination column, the source column.
///
/// # Errors
///
/// Returns [`GridError::InvalidLattice`] unless the lattice wraps 360°.
pub fn recentre_columns(lattice: &Lattice) -> Result<(Lattice, Vec<usize>), GridError> {
    if !lattice.is_full_circle() {
        return Err(GridError::InvalidLattice {
            reason: format!("longitude re-centring needs a full-circle lattice, got {lattice}"),
        });
    }
    let n_lon = lattice.n_lon();
    let wrapped = |col: usize| (lattice.lon(col) + 180.0).rem_euclid(360.0) - 180.0;
    let start = (0..n_lon)
        .min_by(|&a, &b| wrapped(a).total_cmp(&wrapped(b)))
        .unwrap_or(0);
    let order: Vec<usize> = (start..n_lon).chain(0..start).collect();
    let new_lattice = lattice.with_first_lon(wrapped(start));
    Ok((new_lattice, order))
}

/// Re-centres a projection's longitudes on [-180, 180).
///
/// # Errors
///
/// See [`recentre_columns`].
pub fn recentre_projection(series: ProjectionSeries) -> Result<ProjectionSeries, GridError> {
    let (key, lattice, values) = series.into_parts();
    let (new_lattice, order) = recentre_columns(&lattice)?;
    if order.first() == Some(&0) {
        return Ok(rebuild(key, new_lattice, values));
    }
    debug!(%key, shift = order[0], "re-centring projection longitudes");
    let pixel_map = pixel_permutation(&lattice, &order);
    let permuted = Array2::from_shape_fn(values.dim(), |(d, p)| values[[d, pixel_map[p]]]);
    Ok(rebuild(key, new_lattice, permuted))
}

/// Re-centres a value grid's longitudes on [-180, 180).
///
/// # Errors
///
/// See [`recentre_columns`].
pub fn recentre_values(grid: &ValueGrid) -> Result<ValueGrid, GridError> {
    let (new_lattice, order) = recentre_columns(grid.lattice())?;
    let pixel_map = pixel_permutation(grid.lattice(), &order);
    let values = pixel_map.iter().map(|&src| grid.get(src)).collect();
    ValueGrid::new(new_lattice, values)
}

/// Reverses a projection's latitude rows (south-to-north <-> north-to-south).
pub fn flip_latitude(series: ProjectionSeries) -> ProjectionSeries {
    let (key, lattice, values) = series.into_parts();
    debug!(%key, "flipping projection latitude order");
    let pixel_map = row_reversal(&lattice);
    let flipped = Array2::from_shape_fn(values.dim(), |(d, p)| values[[d, pixel_map[p]]]);
    rebuild(key, lattice.flipped(), flipped)
}

/// Reverses a value grid's latitude rows.
///
/// # Errors
///
/// Propagates [`ValueGrid::new`] errors.
pub fn flip_latitude_values(grid: &ValueGrid) -> Result<ValueGrid, GridError> {
    let values = row_reversal(grid.lattice())
        .iter()
        .map(|&src| grid.get(src))
        .collect();
    ValueGrid::new(grid.lattice().flipped(), values)
}

/// Flat source pixel for every destination pixel when rows are reversed.
fn row_reversal(lattice: &Lattice) -> Vec<usize> {
    let last = lattice.n_lat() - 1;
    (0..lattice.n_lat())
        .flat_map(|row| (0..lattice.n_lon()).map(move |col| lattice.pixel(last - row, col)))
        .collect()
}

/// Flat source pixel for every destination pixel, row by row.
fn pixel_permutation(lattice: &Lattice, order: &[usize]) -> Vec<usize> {
    (0..lattice.n_lat())
        .flat_map(|row| order.iter().map(move |&col| lattice.pixel(row, col)))
        .collect()
}

// Every transform here preserves the pixel count, so the shape check is skipped.
fn rebuild(key: ProjectionKey, lattice: Lattice, values: Array2<f64>) -> ProjectionSeries {
    ProjectionSeries::from_parts(key, lattice, values)
}
