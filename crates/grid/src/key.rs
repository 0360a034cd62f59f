//! Identifiers for one projection task and CMIP6 file-name parsing.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::GridError;

/// One (model, scenario, year) triple.
///
/// Ordering is lexicographic on (model, scenario, year), which keeps task
/// lists and result tables deterministic.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ProjectionKey {
    /// Climate model identifier (CMIP6 `source_id`).
    pub model: String,
    /// Scenario identifier (e.g. `ssp245`).
    pub scenario: String,
    /// Calendar year.
    pub year: i32,
}

impl ProjectionKey {
    /// Creates a key.
    pub fn new(model: impl Into<String>, scenario: impl Into<String>, year: i32) -> Self {
        Self {
            model: model.into(),
            scenario: scenario.into(),
            year,
        }
    }
}

impl fmt::Display for ProjectionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "model={} scenario={} year={}",
            self.model, self.scenario, self.year
        )
    }
}

/// Parsed ESGF/CMIP6 file name:
/// `{variable}_{table}_{model}_{scenario}_{variant}_{grid}_{YYYYMMDD}-{YYYYMMDD}.nc`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Cmip6FileName {
    /// Variable id, e.g. `tasmax`.
    pub variable: String,
    /// Table id, e.g. `day`.
    pub table: String,
    /// Model (`source_id`).
    pub model: String,
    /// Experiment (scenario) id.
    pub scenario: String,
    /// Variant label, e.g. `r1i1p1f1`.
    pub variant: String,
    /// Grid label, e.g. `gn`.
    pub grid: String,
    /// First year covered by the file.
    pub start_year: i32,
    /// Last year covered by the file.
    pub end_year: i32,
}

impl Cmip6FileName {
    /// Parses a bare file name (no directory component).
    ///
    /// # Errors
    ///
    /// Returns [`GridError::InvalidFileName`] if the name does not have the
    /// seven underscore-separated fields, the variant label does not start
    /// with `r`, or the date range is malformed.
    pub fn parse(name: &str) -> Result<Self, GridError> {
        let fail = |reason: &str| GridError::InvalidFileName {
            name: name.to_string(),
            reason: reason.to_string(),
        };

        let stem = name
            .strip_suffix(".nc")
            .ok_or_else(|| fail("missing .nc extension"))?;
        let parts: Vec<&str> = stem.split('_').collect();
        if parts.len() != 7 {
            return Err(fail(&format!(
                "expected 7 underscore-separated fields, got {}",
                parts.len()
            )));
        }
        if parts.iter().any(|p| p.is_empty()) {
            return Err(fail("empty field"));
        }
        if !parts[4].starts_with('r') {
            return Err(fail("variant label must start with 'r'"));
        }

        let (start, end) = parts[6]
            .split_once('-')
            .ok_or_else(|| fail("date range must be START-END"))?;
        let start_year = parse_year(start).ok_or_else(|| fail("bad start date"))?;
        let end_year = parse_year(end).ok_or_else(|| fail("bad end date"))?;
        if end_year < start_year {
            return Err(fail("end date precedes start date"));
        }

        Ok(Self {
            variable: parts[0].to_string(),
            table: parts[1].to_string(),
            model: parts[2].to_string(),
            scenario: parts[3].to_string(),
            variant: parts[4].to_string(),
            grid: parts[5].to_string(),
            start_year,
            end_year,
        })
    }

    /// Whether `year` falls inside the file's date range.
    pub fn covers(&self, year: i32) -> bool {
        (self.start_year..=self.end_year).contains(&year)
    }

    /// Task key for one year of this file.
    pub fn key_for(&self, year: i32) -> ProjectionKey {
        ProjectionKey::new(&self.model, &self.scenario, year)
    }
}

/// `YYYYMMDD` → `YYYY`.
fn parse_year(date: &str) -> Option<i32> {
    if date.len() != 8 || !date.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    date[..4].parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_esgf_name() {
        let f = Cmip6FileName::parse("tasmax_day_EC-Earth3-Veg_ssp245_r1i1p1f1_gr_20150101-20501231.nc")
            .unwrap();
        assert_eq!(f.variable, "tasmax");
        assert_eq!(f.model, "EC-Earth3-Veg");
        assert_eq!(f.scenario, "ssp245");
        assert_eq!(f.variant, "r1i1p1f1");
        assert_eq!(f.grid, "gr");
        assert_eq!((f.start_year, f.end_year), (2015, 2050));
        assert!(f.covers(2030));
        assert!(!f.covers(2051));
        assert_eq!(f.key_for(2030), ProjectionKey::new("EC-Earth3-Veg", "ssp245", 2030));
    }

    #[test]
    fn rejects_wrong_field_count() {
        let err = Cmip6FileName::parse("tasmax_day_MODEL_20150101-20501231.nc").unwrap_err();
        assert!(matches!(err, GridError::InvalidFileName { .. }));
    }

    #[test]
    fn rejects_bad_dates() {
        assert!(Cmip6FileName::parse("tasmax_day_M_ssp126_r1i1p1f1_gn_2015-2050.nc").is_err());
        assert!(
            Cmip6FileName::parse("tasmax_day_M_ssp126_r1i1p1f1_gn_20500101-20150101.nc").is_err()
        );
    }

    #[test]
    fn rejects_missing_extension() {
        assert!(Cmip6FileName::parse("tasmax_day_M_ssp126_r1i1p1f1_gn_20150101-20501231").is_err());
    }

    #[test]
    fn key_display_names_all_parts() {
        let k = ProjectionKey::new("MIROC6", "ssp585", 2050);
        assert_eq!(k.to_string(), "model=MIROC6 scenario=ssp585 year=2050");
    }

    #[test]
    fn keys_order_by_model_then_scenario_then_year() {
        let mut keys = vec![
            ProjectionKey::new("B", "ssp126", 2025),
            ProjectionKey::new("A", "ssp585", 2030),
            ProjectionKey::new("A", "ssp585", 2025),
        ];
        keys.sort();
        assert_eq!(keys[0], ProjectionKey::new("A", "ssp585", 2025));
        assert_eq!(keys[2].model, "B");
    }
}
