//! Radius filtering of candidates around a center point

use crate::config::ConfigError;
use crate::domain::geo::{distance_km, GeoPoint, Located};

/// Keep only the records within `radius_km` of `center` (inclusive).
pub fn within_radius<T: Located>(records: Vec<T>, center: GeoPoint, radius_km: f64) -> Vec<T> {
    records
        .into_iter()
        .filter(|record| distance_km(record.location(), center) <= radius_km)
        .collect()
}

/// Two-stage radius filter applied to the car park snapshot before enrichment.
///
/// The loose pre-filter radius shrinks the candidate set cheaply; the final
/// radius decides inclusion. `prefilter_radius_km >= final_radius_km` always
/// holds, so the final set is a subset of the pre-filtered one.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpatialPreFilter {
    prefilter_radius_km: f64,
    final_radius_km: f64,
}

impl SpatialPreFilter {
    pub fn new(prefilter_radius_km: f64, final_radius_km: f64) -> Result<Self, ConfigError> {
        let final_ok = final_radius_km > 0.0 && final_radius_km.is_finite();
        if !final_ok || !(prefilter_radius_km >= final_radius_km) {
            return Err(ConfigError::Invalid(format!(
                "pre-filter radius {prefilter_radius_km} km must be >= final radius {final_radius_km} km > 0"
            )));
        }
        Ok(Self {
            prefilter_radius_km,
            final_radius_km,
        })
    }

    pub fn prefilter_radius_km(&self) -> f64 {
        self.prefilter_radius_km
    }

    pub fn final_radius_km(&self) -> f64 {
        self.final_radius_km
    }

    pub fn prefilter<T: Located>(&self, records: Vec<T>, center: GeoPoint) -> Vec<T> {
        within_radius(records, center, self.prefilter_radius_km)
    }

    pub fn select<T: Located>(&self, records: Vec<T>, center: GeoPoint) -> Vec<T> {
        within_radius(self.prefilter(records, center), center, self.final_radius_km)
    }
}

impl Default for SpatialPreFilter {
    fn default() -> Self {
        Self {
            prefilter_radius_km: 2.5,
            final_radius_km: 2.0,
        }
    }
}
