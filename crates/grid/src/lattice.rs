//! The fixed 0.25° regular latitude/longitude lattice.

use std::fmt;
use std::ops::Range;

use crate::error::GridError;

/// Grid spacing in degrees. Every lattice in the pipeline uses it.
pub const RESOLUTION: f64 = 0.25;

/// Tolerance used when comparing coordinates in degrees.
const COORD_EPS: f64 = 1e-6;

/// Direction in which latitude rows are stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LatitudeOrder {
    /// Row 0 is the southernmost row.
    #[default]
    SouthToNorth,
    /// Row 0 is the northernmost row (ERA5 convention).
    NorthToSouth,
}

/// Spatial indexing shared by every grid used together.
///
/// Pixels are stored row-major: `pixel = row * n_lon + col`. Coordinates
/// refer to cell centres.
#[derive(Debug, Clone, Copy)]
pub struct Lattice {
    first_lat: f64,
    first_lon: f64,
    n_lat: usize,
    n_lon: usize,
    lat_order: LatitudeOrder,
}

impl Lattice {
    /// Creates a lattice with rows stored south to north.
    ///
    /// # Errors
    ///
    /// Returns [`GridError::InvalidLattice`] if either dimension is zero,
    /// a coordinate is not finite, or the rows run past the poles.
    pub fn new(first_lat: f64, first_lon: f64, n_lat: usize, n_lon: usize) -> Result<Self, GridError> {
        Self::with_order(first_lat, first_lon, n_lat, n_lon, LatitudeOrder::SouthToNorth)
    }

    /// Creates a lattice with an explicit row order.
    ///
    /// # Errors
    ///
    /// See [`Lattice::new`].
    pub fn with_order(
        first_lat: f64,
        first_lon: f64,
        n_lat: usize,
        n_lon: usize,
        lat_order: LatitudeOrder,
    ) -> Result<Self, GridError> {
        if n_lat == 0 || n_lon == 0 {
            return Err(GridError::InvalidLattice {
                reason: format!("dimensions must be non-zero, got {n_lat}x{n_lon}"),
            });
        }
        if !first_lat.is_finite() || !first_lon.is_finite() {
            return Err(GridError::InvalidLattice {
                reason: format!("origin must be finite, got ({first_lat}, {first_lon})"),
            });
        }
        if n_lon as f64 * RESOLUTION > 360.0 + COORD_EPS {
            return Err(GridError::InvalidLattice {
                reason: format!("{n_lon} longitude columns exceed a full circle"),
            });
        }
        let lattice = Self {
            first_lat,
            first_lon,
            n_lat,
            n_lon,
            lat_order,
        };
        let last_lat = lattice.lat(n_lat - 1);
        for lat in [first_lat, last_lat] {
            if !(-90.0 - COORD_EPS..=90.0 + COORD_EPS).contains(&lat) {
                return Err(GridError::InvalidLattice {
                    reason: format!("latitude {lat} outside [-90, 90]"),
                });
            }
        }
        Ok(lattice)
    }

    /// The global 720x1440 ERA5-style lattice: rows from 90°N southwards,
    /// columns from -180°E eastwards.
    pub fn global() -> Self {
        Self {
            first_lat: 90.0,
            first_lon: -180.0,
            n_lat: 720,
            n_lon: 1440,
            lat_order: LatitudeOrder::NorthToSouth,
        }
    }

    /// Number of latitude rows.
    pub fn n_lat(&self) -> usize {
        self.n_lat
    }

    /// Number of longitude columns.
    pub fn n_lon(&self) -> usize {
        self.n_lon
    }

    /// Total number of pixels.
    pub fn n_pixels(&self) -> usize {
        self.n_lat * self.n_lon
    }

    /// Latitude of the first row centre.
    pub fn first_lat(&self) -> f64 {
        self.first_lat
    }

    /// Longitude of the first column centre.
    pub fn first_lon(&self) -> f64 {
        self.first_lon
    }

    /// Row storage order.
    pub fn lat_order(&self) -> LatitudeOrder {
        self.lat_order
    }

    /// Latitude of a row centre.
    pub fn lat(&self, row: usize) -> f64 {
        match self.lat_order {
            LatitudeOrder::SouthToNorth => self.first_lat + row as f64 * RESOLUTION,
            LatitudeOrder::NorthToSouth => self.first_lat - row as f64 * RESOLUTION,
        }
    }

    /// Longitude of a column centre.
    pub fn lon(&self, col: usize) -> f64 {
        self.first_lon + col as f64 * RESOLUTION
    }

    /// Flat pixel index of `(row, col)`.
    #[inline]
    pub fn pixel(&self, row: usize, col: usize) -> usize {
        row * self.n_lon + col
    }

    /// `(row, col)` of a flat pixel index.
    #[inline]
    pub fn row_col(&self, pixel: usize) -> (usize, usize) {
        (pixel / self.n_lon, pixel % self.n_lon)
    }

    /// Flat pixel range covered by a block of whole rows.
    ///
    /// `rows.end` is clamped to `n_lat`.
    pub fn band_pixels(&self, rows: Range<usize>) -> Range<usize> {
        let end = rows.end.min(self.n_lat);
        let start = rows.start.min(end);
        start * self.n_lon..end * self.n_lon
    }

    /// Whether the columns wrap the full 360° of longitude.
    pub fn is_full_circle(&self) -> bool {
        (self.n_lon as f64 * RESOLUTION - 360.0).abs() < COORD_EPS
    }

    /// Whether two lattices index pixels identically.
    pub fn same_as(&self, other: &Lattice) -> bool {
        self.n_lat == other.n_lat
            && self.n_lon == other.n_lon
            && self.lat_order == other.lat_order
            && (self.first_lat - other.first_lat).abs() < COORD_EPS
            && (self.first_lon - other.first_lon).abs() < COORD_EPS
    }

    /// Fails with [`GridError::GridMismatch`] unless `other` matches `self`.
    ///
    /// `role` names the input being checked and ends up in the message.
    pub fn ensure_same(&self, other: &Lattice, role: &str) -> Result<(), GridError> {
        if self.same_as(other) {
            Ok(())
        } else {
            Err(GridError::GridMismatch {
                role: role.to_string(),
                expected: self.to_string(),
                got: other.to_string(),
            })
        }
    }

    /// The same pixels with the row order reversed.
    ///
    /// Row `r` of the result is row `n_lat - 1 - r` of `self`.
    pub fn flipped(&self) -> Self {
        let lat_order = match self.lat_order {
            LatitudeOrder::SouthToNorth => LatitudeOrder::NorthToSouth,
            LatitudeOrder::NorthToSouth => LatitudeOrder::SouthToNorth,
        };
        Self {
            first_lat: self.lat(self.n_lat - 1),
            lat_order,
            ..*self
        }
    }

    /// Returns a copy with a different first longitude.
    pub(crate) fn with_first_lon(mut self, first_lon: f64) -> Self {
        self.first_lon = first_lon;
        self
    }
}

impl PartialEq for Lattice {
    fn eq(&self, other: &Self) -> bool {
        self.same_as(other)
    }
}

impl fmt::Display for Lattice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let order = match self.lat_order {
            LatitudeOrder::SouthToNorth => "S->N",
            LatitudeOrder::NorthToSouth => "N->S",
        };
        write!(
            f,
            "{}x{} from ({:.2}, {:.2}) {}",
            self.n_lat, self.n_lon, self.first_lat, self.first_lon, order
        )
    }
}
