//! Integration tests for historical threshold estimation.

use std::ops::Range;

use approx::assert_relative_eq;
use heatdays_grid::{DailySeries, DailySource, GridError, Lattice};
use heatdays_threshold::{
    HistoricalWindow, Percentile, ThresholdConfig, ThresholdError, estimate_thresholds,
    estimate_thresholds_banded,
};
use ndarray::Array2;
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand_distr::{Distribution, Normal};

const DAYS_PER_YEAR: usize = 365;

fn year_labels(start: i32, end: i32) -> Vec<i32> {
    (start..=end)
        .flat_map(|y| std::iter::repeat_n(y, DAYS_PER_YEAR))
        .collect()
}

/// Normally distributed daily maxima, a different mean per pixel.
fn random_series(lattice: Lattice, start: i32, end: i32, seed: u64) -> DailySeries {
    let mut rng = StdRng::seed_from_u64(seed);
    let years = year_labels(start, end);
    let n_pixels = lattice.n_pixels();
    let mut values = Array2::zeros((years.len(), n_pixels));
    for p in 0..n_pixels {
        let normal = Normal::new(20.0 + p as f64, 4.0).unwrap();
        for d in 0..years.len() {
            values[[d, p]] = normal.sample(&mut rng);
        }
    }
    DailySeries::new(lattice, years, values).unwrap()
}

fn window_config(start: i32, end: i32) -> ThresholdConfig {
    ThresholdConfig::new().with_window(HistoricalWindow::new(start, end).unwrap())
}

// ---------------------------------------------------------------------------
// Basic behaviour
// ---------------------------------------------------------------------------

#[test]
fn constant_record_gives_constant_threshold() {
    let lattice = Lattice::new(0.0, 0.0, 2, 3).unwrap();
    let years = year_labels(1995, 2024);
    let values = Array2::from_elem((years.len(), lattice.n_pixels()), 30.0);
    let series = DailySeries::new(lattice, years, values).unwrap();

    let set = estimate_thresholds(&series, &ThresholdConfig::new()).unwrap();
    assert_eq!(set.n_days(), 30 * DAYS_PER_YEAR);
    assert_eq!(set.n_no_data(), 0);
    for level in [Percentile::P90, Percentile::P95] {
        let grid = set.get(level).unwrap();
        for &v in grid.values() {
            assert_relative_eq!(v.unwrap(), 30.0);
        }
    }
}

#[test]
fn higher_level_never_below_lower_level() {
    let lattice = Lattice::new(10.0, 20.0, 3, 4).unwrap();
    let series = random_series(lattice, 2001, 2010, 7);
    let set = estimate_thresholds(&series, &window_config(2001, 2010)).unwrap();

    let p90 = set.get(Percentile::P90).unwrap();
    let p95 = set.get(Percentile::P95).unwrap();
    for pixel in 0..lattice.n_pixels() {
        assert!(p95.get(pixel).unwrap() >= p90.get(pixel).unwrap());
    }
}

#[test]
fn thresholds_match_reference_values() {
    // Each pixel holds 1..=100 exactly once; type-7 interpolation gives
    // 90.1 and 95.05.
    let lattice = Lattice::new(0.0, 0.0, 1, 2).unwrap();
    let years = vec![2000; 100];
    let mut values = Array2::zeros((100, 2));
    for d in 0..100 {
        values[[d, 0]] = (d + 1) as f64;
        values[[d, 1]] = (100 - d) as f64;
    }
    let series = DailySeries::new(lattice, years, values).unwrap();
    let set = estimate_thresholds(&series, &window_config(2000, 2000)).unwrap();

    for pixel in 0..2 {
        assert_relative_eq!(
            set.get(Percentile::P90).unwrap().get(pixel).unwrap(),
            90.1,
            epsilon = 1e-10
        );
        assert_relative_eq!(
            set.get(Percentile::P95).unwrap().get(pixel).unwrap(),
            95.05,
            epsilon = 1e-10
        );
    }
}

#[test]
fn days_outside_window_are_ignored() {
    let lattice = Lattice::new(0.0, 0.0, 1, 1).unwrap();
    let years = year_labels(1990, 2000);
    let values = Array2::from_shape_fn((years.len(), 1), |(d, _)| {
        if years[d] < 1995 { 1000.0 } else { 20.0 }
    });
    let series = DailySeries::new(lattice, years, values).unwrap();

    let set = estimate_thresholds(&series, &window_config(1995, 2000)).unwrap();
    assert_eq!(set.n_days(), 6 * DAYS_PER_YEAR);
    assert_relative_eq!(set.get(Percentile::P95).unwrap().get(0).unwrap(), 20.0);
}

// ---------------------------------------------------------------------------
// Missing data
// ---------------------------------------------------------------------------

#[test]
fn pixel_over_tolerance_is_no_data() {
    let lattice = Lattice::new(0.0, 0.0, 1, 2).unwrap();
    let years = vec![2000; 10];
    let mut values = Array2::from_elem((10, 2), 25.0);
    // pixel 0: 2 of 10 days missing
    values[[0, 0]] = f64::NAN;
    values[[1, 0]] = f64::NAN;
    let series = DailySeries::new(lattice, years, values).unwrap();

    let strict = window_config(2000, 2000).with_missing_tolerance(0.1);
    let set = estimate_thresholds(&series, &strict).unwrap();
    assert_eq!(set.n_no_data(), 1);
    assert!(set.get(Percentile::P95).unwrap().get(0).is_none());
    assert!(set.get(Percentile::P90).unwrap().get(0).is_none());
    assert_relative_eq!(set.get(Percentile::P95).unwrap().get(1).unwrap(), 25.0);

    let lenient = window_config(2000, 2000).with_missing_tolerance(0.25);
    let set = estimate_thresholds(&series, &lenient).unwrap();
    assert_eq!(set.n_no_data(), 0);
    assert_relative_eq!(set.get(Percentile::P95).unwrap().get(0).unwrap(), 25.0);
}

#[test]
fn all_missing_pixel_is_no_data_even_with_full_tolerance() {
    let lattice = Lattice::new(0.0, 0.0, 1, 2).unwrap();
    let mut values = Array2::from_elem((5, 2), 25.0);
    values.column_mut(1).fill(f64::NAN);
    let series = DailySeries::new(lattice, vec![2000; 5], values).unwrap();

    let config = window_config(2000, 2000).with_missing_tolerance(1.0);
    let set = estimate_thresholds(&series, &config).unwrap();
    assert!(set.get(Percentile::P95).unwrap().get(1).is_none());
    assert!(set.get(Percentile::P95).unwrap().get(0).is_some());
}

// ---------------------------------------------------------------------------
// Banded streaming
// ---------------------------------------------------------------------------

#[test]
fn banded_matches_in_memory() {
    let lattice = Lattice::new(-10.0, 30.0, 7, 5).unwrap();
    let mut series = random_series(lattice, 2011, 2015, 42);
    // sprinkle some gaps so the tolerance path is exercised
    let mut values = series.values().clone();
    for d in (0..values.nrows()).step_by(3) {
        values[[d, 4]] = f64::NAN;
    }
    series = DailySeries::new(lattice, series.day_years().to_vec(), values).unwrap();

    for band_rows in [1, 3, 7, 30] {
        let config = window_config(2011, 2015).with_band_rows(band_rows);
        let full = estimate_thresholds(&series, &config).unwrap();
        let banded = estimate_thresholds_banded(&series, &config).unwrap();

        assert_eq!(full.n_days(), banded.n_days());
        for level in full.percentiles() {
            assert_eq!(
                full.get(level).unwrap().values(),
                banded.get(level).unwrap().values(),
                "band_rows = {band_rows}, level = {level}"
            );
        }
    }
}

/// A source that serves a fixed band shape regardless of the rows asked for.
struct BrokenSource {
    lattice: Lattice,
    days_per_year: usize,
    columns: usize,
}

impl DailySource for BrokenSource {
    fn lattice(&self) -> &Lattice {
        &self.lattice
    }

    fn years(&self) -> Vec<i32> {
        vec![2000, 2001]
    }

    fn read_band(&self, _year: i32, _rows: Range<usize>) -> Result<Array2<f64>, GridError> {
        Ok(Array2::from_elem((self.days_per_year, self.columns), 1.0))
    }
}

#[test]
fn banded_rejects_empty_year() {
    let source = BrokenSource {
        lattice: Lattice::new(0.0, 0.0, 2, 2).unwrap(),
        days_per_year: 0,
        columns: 4,
    };
    let err = estimate_thresholds_banded(&source, &window_config(2000, 2001)).unwrap_err();
    assert!(matches!(err, ThresholdError::EmptyYear { year: 2000 }));
}

#[test]
fn banded_rejects_wrong_band_width() {
    let source = BrokenSource {
        lattice: Lattice::new(0.0, 0.0, 2, 2).unwrap(),
        days_per_year: 3,
        columns: 3,
    };
    let config = window_config(2000, 2001).with_band_rows(1);
    let err = estimate_thresholds_banded(&source, &config).unwrap_err();
    assert!(matches!(
        err,
        ThresholdError::Grid(GridError::LengthMismatch {
            expected: 2,
            got: 3,
            ..
        })
    ));
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[test]
fn missing_window_year_is_an_error() {
    let lattice = Lattice::new(0.0, 0.0, 1, 1).unwrap();
    let series = random_series(lattice, 1996, 2024, 1);
    let config = ThresholdConfig::new();

    let err = estimate_thresholds(&series, &config).unwrap_err();
    assert!(matches!(err, ThresholdError::MissingYear { year: 1995, .. }));
    let err = estimate_thresholds_banded(&series, &config).unwrap_err();
    assert!(matches!(err, ThresholdError::MissingYear { year: 1995, .. }));
}

#[test]
fn invalid_config_is_rejected_before_reading() {
    let lattice = Lattice::new(0.0, 0.0, 1, 1).unwrap();
    let series = random_series(lattice, 2000, 2000, 1);
    let config = window_config(2000, 2000).with_missing_tolerance(2.0);
    assert!(matches!(
        estimate_thresholds(&series, &config),
        Err(ThresholdError::InvalidConfig { .. })
    ));
}
