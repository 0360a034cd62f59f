//! Per-pixel scalar grids with explicit "no data".

use crate::error::GridError;
use crate::lattice::Lattice;

/// One optional scalar per pixel.
///
/// `None` is "no data". It is never coerced to a number by anything in this
/// workspace; arithmetic touching it yields `None`.
#[derive(Debug, Clone, PartialEq)]
pub struct ValueGrid {
    lattice: Lattice,
    values: Vec<Option<f64>>,
}

impl ValueGrid {
    /// Creates a grid after checking its length against the lattice.
    ///
    /// # Errors
    ///
    /// Returns [`GridError::LengthMismatch`] if `values.len() != lattice.n_pixels()`
    /// and [`GridError::NonFiniteValue`] for a `Some` holding NaN or infinity.
    pub fn new(lattice: Lattice, values: Vec<Option<f64>>) -> Result<Self, GridError> {
        if values.len() != lattice.n_pixels() {
            return Err(GridError::LengthMismatch {
                what: "value grid".to_string(),
                expected: lattice.n_pixels(),
                got: values.len(),
            });
        }
        if let Some((pixel, value)) = values
            .iter()
            .enumerate()
            .find_map(|(p, v)| v.filter(|x| !x.is_finite()).map(|x| (p, x)))
        {
            return Err(GridError::NonFiniteValue { pixel, value });
        }
        Ok(Self { lattice, values })
    }

    /// Builds a grid from raw floats, mapping non-finite values to `None`.
    ///
    /// This is the boundary where array-library missing markers (NaN) turn
    /// into explicit "no data".
    ///
    /// # Errors
    ///
    /// Returns [`GridError::LengthMismatch`] on a length mismatch.
    pub fn from_raw(lattice: Lattice, raw: &[f64]) -> Result<Self, GridError> {
        let values = raw
            .iter()
            .map(|&v| if v.is_finite() { Some(v) } else { None })
            .collect();
        Self::new(lattice, values)
    }

    /// The lattice this grid lives on.
    pub fn lattice(&self) -> &Lattice {
        &self.lattice
    }

    /// All pixel values.
    pub fn values(&self) -> &[Option<f64>] {
        &self.values
    }

    /// Value at a flat pixel index.
    pub fn get(&self, pixel: usize) -> Option<f64> {
        self.values.get(pixel).copied().flatten()
    }

    /// Number of pixels holding data.
    pub fn n_valid(&self) -> usize {
        self.values.iter().filter(|v| v.is_some()).count()
    }

    /// Consumes the grid and returns its values.
    pub fn into_values(self) -> Vec<Option<f64>> {
        self.values
    }
}
