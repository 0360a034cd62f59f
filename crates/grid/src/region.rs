//! Pixel-to-region membership.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::GridError;
use crate::lattice::Lattice;

/// Region identifier (e.g. IMAGE region number 1..=26).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RegionId(pub u32);

impl fmt::Display for RegionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Maps each pixel to at most one region.
///
/// Member pixel lists are built once at construction so every aggregation
/// walks only the pixels that belong to a region.
#[derive(Debug, Clone)]
pub struct RegionMembership {
    lattice: Lattice,
    regions: Vec<Option<RegionId>>,
    members: BTreeMap<RegionId, Vec<usize>>,
    names: BTreeMap<RegionId, String>,
}

impl RegionMembership {
    /// Creates a membership map.
    ///
    /// # Errors
    ///
    /// Returns [`GridError::LengthMismatch`] on a length mismatch.
    pub fn new(lattice: Lattice, regions: Vec<Option<RegionId>>) -> Result<Self, GridError> {
        if regions.len() != lattice.n_pixels() {
            return Err(GridError::LengthMismatch {
                what: "region membership".to_string(),
                expected: lattice.n_pixels(),
                got: regions.len(),
            });
        }
        let mut members: BTreeMap<RegionId, Vec<usize>> = BTreeMap::new();
        for (pixel, region) in regions.iter().enumerate() {
            if let Some(id) = region {
                members.entry(*id).or_default().push(pixel);
            }
        }
        Ok(Self {
            lattice,
            regions,
            members,
            names: BTreeMap::new(),
        })
    }

    /// Builds membership from a float-coded region raster.
    ///
    /// NaN marks pixels outside every region. Other codes must be
    /// non-negative whole numbers.
    ///
    /// # Errors
    ///
    /// Returns [`GridError::InvalidRegionCode`] for fractional, negative or
    /// infinite codes, and [`GridError::LengthMismatch`] on a length mismatch.
    pub fn from_codes(lattice: Lattice, codes: &[f64]) -> Result<Self, GridError> {
        let regions = codes
            .iter()
            .enumerate()
            .map(|(pixel, &code)| {
                if code.is_nan() {
                    Ok(None)
                } else if code.is_finite() && code >= 0.0 && code.fract() == 0.0 && code <= u32::MAX as f64 {
                    Ok(Some(RegionId(code as u32)))
                } else {
                    Err(GridError::InvalidRegionCode { pixel, code })
                }
            })
            .collect::<Result<Vec<_>, _>>()?;
        Self::new(lattice, regions)
    }

    /// Attaches display names to region identifiers.
    pub fn with_names(mut self, names: BTreeMap<RegionId, String>) -> Self {
        self.names = names;
        self
    }

    /// Lattice of the map.
    pub fn lattice(&self) -> &Lattice {
        &self.lattice
    }

    /// Region of a pixel.
    pub fn region_of(&self, pixel: usize) -> Option<RegionId> {
        self.regions.get(pixel).copied().flatten()
    }

    /// Region identifiers in ascending order.
    pub fn region_ids(&self) -> impl Iterator<Item = RegionId> + '_ {
        self.members.keys().copied()
    }

    /// Number of distinct regions.
    pub fn n_regions(&self) -> usize {
        self.members.len()
    }

    /// Pixels belonging to each region, ascending by region.
    pub fn members(&self) -> &BTreeMap<RegionId, Vec<usize>> {
        &self.members
    }

    /// Display name of a region, if one was attached.
    pub fn name(&self, id: RegionId) -> Option<&str> {
        self.names.get(&id).map(String::as_str)
    }
}
