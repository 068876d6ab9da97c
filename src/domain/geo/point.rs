//! WGS84 points, survey-grid points and great-circle distance

use serde::{Deserialize, Serialize};

/// Mean Earth radius used by the haversine formula, in kilometers.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// A latitude/longitude pair in decimal degrees (WGS84).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub latitude: f64,
    pub longitude: f64,
}

impl GeoPoint {
    pub const fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Whether both components lie inside the WGS84 bounds.
    pub fn is_valid(&self) -> bool {
        (-90.0..=90.0).contains(&self.latitude) && (-180.0..=180.0).contains(&self.longitude)
    }

    pub fn distance_km(&self, other: &GeoPoint) -> f64 {
        distance_km(*self, *other)
    }
}

impl std::fmt::Display for GeoPoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{},{}", self.latitude, self.longitude)
    }
}

/// A northing/easting pair in meters on the local survey grid.
///
/// Only meaningful together with the [`GridParameters`](super::GridParameters)
/// of the datum it was measured in.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SurveyGridPoint {
    pub northing: f64,
    pub easting: f64,
}

impl SurveyGridPoint {
    pub const fn new(northing: f64, easting: f64) -> Self {
        Self { northing, easting }
    }
}

/// Anything with a fixed WGS84 position.
pub trait Located {
    fn location(&self) -> GeoPoint;
}

impl Located for GeoPoint {
    fn location(&self) -> GeoPoint {
        *self
    }
}

/// Great-circle distance between two points using the haversine formula.
///
/// Assumes a spherical Earth of radius [`EARTH_RADIUS_KM`]; good to about
/// 0.5% which is plenty for radius filtering.
pub fn distance_km(a: GeoPoint, b: GeoPoint) -> f64 {
    let lat1 = a.latitude.to_radians();
    let lat2 = b.latitude.to_radians();
    let delta_lat = (b.latitude - a.latitude).to_radians();
    let delta_lon = (b.longitude - a.longitude).to_radians();

    let h = (delta_lat / 2.0).sin().powi(2)
        + lat1.cos() * lat2.cos() * (delta_lon / 2.0).sin().powi(2);
    let c = 2.0 * h.sqrt().atan2((1.0 - h).sqrt());

    EARTH_RADIUS_KM * c
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    const MARINA_BAY: GeoPoint = GeoPoint::new(1.2834, 103.8607);
    const ORCHARD: GeoPoint = GeoPoint::new(1.3048, 103.8318);
    const JURONG_EAST: GeoPoint = GeoPoint::new(1.3329, 103.7436);

    #[test]
    fn distance_to_self_is_zero() {
        for p in [MARINA_BAY, ORCHARD, JURONG_EAST, GeoPoint::new(-33.86, 151.21)] {
            assert_eq!(distance_km(p, p), 0.0);
        }
    }

    #[test]
    fn distance_is_symmetric() {
        assert_abs_diff_eq!(
            distance_km(MARINA_BAY, ORCHARD),
            distance_km(ORCHARD, MARINA_BAY),
            epsilon = 1e-12
        );
    }

    #[test]
    fn distance_satisfies_triangle_inequality() {
        let direct = distance_km(MARINA_BAY, JURONG_EAST);
        let via = distance_km(MARINA_BAY, ORCHARD) + distance_km(ORCHARD, JURONG_EAST);
        assert!(direct <= via + 1e-9);
    }

    #[test]
    fn one_degree_of_latitude_is_about_111_km() {
        let d = distance_km(GeoPoint::new(0.0, 0.0), GeoPoint::new(1.0, 0.0));
        assert_abs_diff_eq!(d, 111.19, epsilon = 0.01);
    }

    #[test]
    fn validity_bounds() {
        assert!(MARINA_BAY.is_valid());
        assert!(GeoPoint::new(90.0, -180.0).is_valid());
        assert!(!GeoPoint::new(90.1, 0.0).is_valid());
        assert!(!GeoPoint::new(0.0, 180.5).is_valid());
    }
}
