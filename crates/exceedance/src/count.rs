//! Counting projection days above the historical threshold.

use heatdays_grid::{ProjectionSeries, flip_latitude, kelvin_to_celsius, recentre_projection};
use heatdays_threshold::ThresholdGrid;
use rayon::prelude::*;
use tracing::{debug, info};

use crate::config::ExceedanceConfig;
use crate::error::ExceedanceError;
use crate::result::ExceedanceGrid;

/// Counts, per pixel, the days whose value strictly exceeds the threshold.
///
/// Days with a non-finite value never count. Pixels whose threshold is
/// "no data" get a "no data" count, not zero. A short year is counted over
/// the days present; the result records how many that was.
///
/// # Errors
///
/// Returns [`ExceedanceError::GridMismatch`] if the projection lattice
/// differs from the threshold lattice and [`ExceedanceError::EmptyProjection`]
/// if the projection has no days.
#[tracing::instrument(skip_all, fields(key = %projection.key()))]
pub fn count_exceedances(
    projection: &ProjectionSeries,
    threshold: &ThresholdGrid,
) -> Result<ExceedanceGrid, ExceedanceError> {
    threshold
        .lattice()
        .ensure_same(projection.lattice(), "projection")
        .map_err(|source| ExceedanceError::GridMismatch {
            key: projection.key().to_string(),
            source,
        })?;
    if projection.n_days() == 0 {
        return Err(ExceedanceError::EmptyProjection {
            key: projection.key().to_string(),
        });
    }

    let counts: Vec<Option<u32>> = (0..projection.lattice().n_pixels())
        .into_par_iter()
        .map(|pixel| {
            let t = threshold.get(pixel)?;
            let n = projection
                .pixel(pixel)
                .iter()
                .filter(|&&v| v.is_finite() && v > t)
                .count();
            Some(n as u32)
        })
        .collect();

    let grid = ExceedanceGrid::new(
        projection.key().clone(),
        *projection.lattice(),
        threshold.percentile(),
        counts,
        projection.n_days(),
    );
    debug!(
        n_days = grid.n_days(),
        n_no_data = grid.n_no_data(),
        "exceedances counted"
    );
    Ok(grid)
}

/// Counts every projection of an ensemble against the same threshold.
///
/// Projections are processed in parallel; results keep the input order.
///
/// # Errors
///
/// Returns the first error encountered by [`count_exceedances`].
#[tracing::instrument(skip_all, fields(n_projections = projections.len()))]
pub fn count_ensemble(
    projections: &[ProjectionSeries],
    threshold: &ThresholdGrid,
) -> Result<Vec<ExceedanceGrid>, ExceedanceError> {
    let grids = projections
        .par_iter()
        .map(|p| count_exceedances(p, threshold))
        .collect::<Result<Vec<_>, _>>()?;
    info!(n_grids = grids.len(), percentile = %threshold.percentile(), "ensemble counted");
    Ok(grids)
}

/// Brings a projection onto the threshold conventions before counting.
///
/// Applies the Kelvin conversion and longitude re-centring enabled in
/// `config`; with both disabled the series is returned untouched.
///
/// # Errors
///
/// Returns [`ExceedanceError::Alignment`], naming the projection, if
/// re-centring is requested on a lattice that does not span 360°.
pub fn align_projection(
    projection: ProjectionSeries,
    config: &ExceedanceConfig,
) -> Result<ProjectionSeries, ExceedanceError> {
    let mut series = projection;
    if config.kelvin_input() {
        series = kelvin_to_celsius(series);
    }
    if config.recentre_longitude() {
        let key = series.key().to_string();
        series = recentre_projection(series)
            .map_err(|source| ExceedanceError::Alignment { key, source })?;
    }
    if config.flip_latitude() {
        series = flip_latitude(series);
    }
    Ok(series)
}

#[cfg(test)]
mod tests {
    use super::*;
    use heatdays_grid::{Lattice, ProjectionKey};
    use heatdays_threshold::Percentile;
    use ndarray::{Array2, array};

    fn lattice() -> Lattice {
        Lattice::new(0.0, 0.0, 1, 3).unwrap()
    }

    fn threshold(values: Vec<Option<f64>>) -> ThresholdGrid {
        ThresholdGrid::new(lattice(), Percentile::P95, values).unwrap()
    }

    fn projection(values: Array2<f64>) -> ProjectionSeries {
        ProjectionSeries::new(ProjectionKey::new("M", "ssp245", 2030), lattice(), values).unwrap()
    }

    #[test]
    fn strictly_greater_counts() {
        let p = projection(array![[30.0, 31.0, 29.0], [30.5, 30.0, 35.0]]);
        let t = threshold(vec![Some(30.0), Some(30.0), Some(30.0)]);
        let g = count_exceedances(&p, &t).unwrap();
        assert_eq!(g.counts(), &[Some(1), Some(1), Some(1)]);
        assert_eq!(g.n_days(), 2);
    }

    #[test]
    fn missing_days_never_count() {
        let p = projection(array![[f64::NAN, f64::INFINITY, 40.0], [f64::NAN, 40.0, 40.0]]);
        let t = threshold(vec![Some(0.0), Some(0.0), Some(0.0)]);
        let g = count_exceedances(&p, &t).unwrap();
        assert_eq!(g.counts(), &[Some(0), Some(1), Some(2)]);
    }

    #[test]
    fn no_data_threshold_propagates() {
        let p = projection(array![[40.0, 40.0, 40.0]]);
        let t = threshold(vec![None, Some(0.0), None]);
        let g = count_exceedances(&p, &t).unwrap();
        assert_eq!(g.counts(), &[None, Some(1), None]);
    }

    #[test]
    fn empty_projection_rejected() {
        let p = projection(Array2::zeros((0, 3)));
        let t = threshold(vec![Some(0.0); 3]);
        assert!(matches!(
            count_exceedances(&p, &t),
            Err(ExceedanceError::EmptyProjection { .. })
        ));
    }

    #[test]
    fn align_disabled_is_identity() {
        let p = projection(array![[300.0, 301.0, 302.0]]);
        let aligned = align_projection(p.clone(), &ExceedanceConfig::new()).unwrap();
        assert_eq!(aligned.values(), p.values());
    }

    #[test]
    fn align_converts_kelvin() {
        let p = projection(array![[273.15, 303.15, 0.0]]);
        let config = ExceedanceConfig::new().with_kelvin_input(true);
        let aligned = align_projection(p, &config).unwrap();
        assert!((aligned.values()[[0, 0]]).abs() < 1e-9);
        assert!((aligned.values()[[0, 1]] - 30.0).abs() < 1e-9);
    }

    #[test]
    fn align_recentre_needs_full_circle() {
        let p = projection(array![[1.0, 2.0, 3.0]]);
        let config = ExceedanceConfig::new().with_recentre_longitude(true);
        let err = align_projection(p, &config).unwrap_err();
        assert!(matches!(err, ExceedanceError::Alignment { .. }));
        assert!(err.to_string().contains("model=M scenario=ssp245 year=2030"));
    }

    #[test]
    fn align_flips_onto_north_to_south_threshold() {
        let south_up = Lattice::new(40.0, 70.0, 2, 1).unwrap();
        let north_up = south_up.flipped();
        let key = ProjectionKey::new("M", "ssp245", 2030);
        // southern row hot, northern row cool
        let p = ProjectionSeries::new(key, south_up, array![[35.0, 20.0]]).unwrap();
        let t = ThresholdGrid::new(north_up, Percentile::P95, vec![Some(30.0), Some(30.0)]).unwrap();

        assert!(count_exceedances(&p, &t).is_err());
        let config = ExceedanceConfig::new().with_flip_latitude(true);
        let aligned = align_projection(p, &config).unwrap();
        let g = count_exceedances(&aligned, &t).unwrap();
        // row 0 of the threshold grid is now the northern row
        assert_eq!(g.counts(), &[Some(0), Some(1)]);
    }
}
