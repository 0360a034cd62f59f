//! Population weights per pixel.

use crate::error::GridError;
use crate::lattice::Lattice;

/// One non-negative population value per pixel.
///
/// Non-finite entries mean the raster has no value there; such pixels carry
/// no weight and are excluded from every weighted sum.
#[derive(Debug, Clone)]
pub struct PopulationGrid {
    lattice: Lattice,
    values: Vec<f64>,
}

impl PopulationGrid {
    /// Creates a population grid.
    ///
    /// # Errors
    ///
    /// Returns [`GridError::LengthMismatch`] on a length mismatch and
    /// [`GridError::NegativePopulation`] for the first negative value.
    pub fn new(lattice: Lattice, values: Vec<f64>) -> Result<Self, GridError> {
        if values.len() != lattice.n_pixels() {
            return Err(GridError::LengthMismatch {
                what: "population grid".to_string(),
                expected: lattice.n_pixels(),
                got: values.len(),
            });
        }
        if let Some((pixel, &value)) = values.iter().enumerate().find(|&(_, &v)| v < 0.0) {
            return Err(GridError::NegativePopulation { pixel, value });
        }
        Ok(Self { lattice, values })
    }

    /// Lattice of the grid.
    pub fn lattice(&self) -> &Lattice {
        &self.lattice
    }

    /// Raw values, including non-finite entries.
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Weight of a pixel, `None` where the raster has no value.
    #[inline]
    pub fn weight(&self, pixel: usize) -> Option<f64> {
        self.values.get(pixel).copied().filter(|v| v.is_finite())
    }

    /// Sum of all finite weights.
    pub fn total(&self) -> f64 {
        self.values.iter().filter(|v| v.is_finite()).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lattice() -> Lattice {
        Lattice::new(0.0, 0.0, 1, 3).unwrap()
    }

    #[test]
    fn rejects_negative() {
        let err = PopulationGrid::new(lattice(), vec![1.0, -2.0, 3.0]).unwrap_err();
        assert!(matches!(err, GridError::NegativePopulation { pixel: 1, .. }));
    }

    #[test]
    fn nan_has_no_weight() {
        let p = PopulationGrid::new(lattice(), vec![1.0, f64::NAN, 3.0]).unwrap();
        assert_eq!(p.weight(0), Some(1.0));
        assert_eq!(p.weight(1), None);
        assert_eq!(p.total(), 4.0);
    }
}
