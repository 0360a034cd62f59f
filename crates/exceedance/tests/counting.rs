//! Integration tests for exceedance counting against estimated thresholds.

use approx::assert_relative_eq;
use heatdays_exceedance::{
    DayNormalization, ExceedanceError, count_ensemble, count_exceedances,
};
use heatdays_grid::{DailySeries, Lattice, ProjectionKey, ProjectionSeries};
use heatdays_threshold::{
    HistoricalWindow, Percentile, ThresholdConfig, ThresholdGrid, estimate_thresholds,
};
use ndarray::Array2;
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand_distr::{Distribution, Normal};

fn lattice() -> Lattice {
    Lattice::new(35.0, 60.0, 2, 2).unwrap()
}

fn p95_from(series: &DailySeries, start: i32, end: i32) -> ThresholdGrid {
    let config = ThresholdConfig::new()
        .with_percentiles(vec![Percentile::P90, Percentile::P95])
        .with_window(HistoricalWindow::new(start, end).unwrap());
    estimate_thresholds(series, &config)
        .unwrap()
        .into_grid(Percentile::P95)
        .unwrap()
}

#[test]
fn ten_hot_days_over_constant_history() {
    let years: Vec<i32> = (1995..=2024)
        .flat_map(|y| std::iter::repeat_n(y, 365))
        .collect();
    let history = Array2::from_elem((years.len(), 4), 30.0);
    let series = DailySeries::new(lattice(), years, history).unwrap();
    let threshold = p95_from(&series, 1995, 2024);

    let values = Array2::from_shape_fn((365, 4), |(d, _)| if d < 10 { 31.0 } else { 29.0 });
    let projection =
        ProjectionSeries::new(ProjectionKey::new("MRI-ESM2-0", "ssp245", 2050), lattice(), values)
            .unwrap();

    let grid = count_exceedances(&projection, &threshold).unwrap();
    assert_eq!(grid.counts(), &[Some(10); 4]);
    assert_eq!(grid.n_days(), 365);
    assert_eq!(grid.percentile(), Percentile::P95);
}

#[test]
fn identical_projection_exceeds_at_tail_rate() {
    let mut rng = StdRng::seed_from_u64(11);
    let normal = Normal::new(25.0, 5.0).unwrap();
    let years = vec![2000; 3650];
    let history = Array2::from_shape_fn((years.len(), 4), |_| normal.sample(&mut rng));
    let series = DailySeries::new(lattice(), years, history.clone()).unwrap();
    let threshold = p95_from(&series, 2000, 2000);

    let projection =
        ProjectionSeries::new(ProjectionKey::new("M", "historical", 2000), lattice(), history)
            .unwrap();
    let grid = count_exceedances(&projection, &threshold).unwrap();

    let expected = 0.05 * 3650.0;
    for c in grid.counts() {
        assert_relative_eq!(f64::from(c.unwrap()), expected, epsilon = 1.0);
    }
}

#[test]
fn ensemble_keeps_order_and_keys() {
    let threshold =
        ThresholdGrid::new(lattice(), Percentile::P95, vec![Some(30.0); 4]).unwrap();
    let projections: Vec<ProjectionSeries> = ["A", "B", "C"]
        .iter()
        .enumerate()
        .map(|(i, model)| {
            let values =
                Array2::from_shape_fn((365, 4), |(d, _)| if d < i + 1 { 35.0 } else { 20.0 });
            ProjectionSeries::new(ProjectionKey::new(*model, "ssp585", 2040), lattice(), values)
                .unwrap()
        })
        .collect();

    let grids = count_ensemble(&projections, &threshold).unwrap();
    assert_eq!(grids.len(), 3);
    for (i, grid) in grids.iter().enumerate() {
        assert_eq!(grid.key(), projections[i].key());
        assert_eq!(grid.get(0), Some(i as u32 + 1));
    }
}

#[test]
fn lattice_mismatch_identifies_projection() {
    let threshold =
        ThresholdGrid::new(lattice(), Percentile::P95, vec![Some(30.0); 4]).unwrap();
    let shifted = Lattice::new(35.25, 60.0, 2, 2).unwrap();
    let projection = ProjectionSeries::new(
        ProjectionKey::new("EC-Earth3", "ssp370", 2035),
        shifted,
        Array2::zeros((365, 4)),
    )
    .unwrap();

    let err = count_exceedances(&projection, &threshold).unwrap_err();
    assert!(matches!(err, ExceedanceError::GridMismatch { .. }));
    let msg = err.to_string();
    assert!(msg.contains("model=EC-Earth3"));
    assert!(msg.contains("year=2035"));

    let err = count_ensemble(&[projection], &threshold).unwrap_err();
    assert!(matches!(err, ExceedanceError::GridMismatch { .. }));
}

#[test]
fn leap_year_counts_rescale_to_reference_length() {
    let threshold =
        ThresholdGrid::new(lattice(), Percentile::P95, vec![Some(0.0); 4]).unwrap();
    let projection = ProjectionSeries::new(
        ProjectionKey::new("M", "ssp245", 2048),
        lattice(),
        Array2::from_elem((366, 4), 1.0),
    )
    .unwrap();
    let grid = count_exceedances(&projection, &threshold).unwrap();
    assert_eq!(grid.get(0), Some(366));

    let raw = grid.to_values(DayNormalization::Raw).unwrap();
    assert_relative_eq!(raw.get(0).unwrap(), 366.0);

    let scaled = grid.to_values(DayNormalization::PerYearLength(365)).unwrap();
    assert_relative_eq!(scaled.get(0).unwrap(), 365.0, epsilon = 1e-12);
    assert_relative_eq!(scaled.get(3).unwrap(), 366.0 * 365.0 / 366.0, epsilon = 1e-12);
}
