//! Transverse Mercator conversion between the local survey grid and WGS84
//!
//! Implements the Redfearn series used by the SVY21 grid: forward conversion
//! takes the meridional arc from a four-term series in latitude and adds
//! northing/easting corrections up to the 8th power of the longitude offset;
//! the inverse finds the footpoint latitude from the rectifying latitude and
//! back-corrects with terms up to the 7th power of the transverse distance.
//!
//! Accuracy degrades with distance from the grid origin. No zone check is
//! performed.

use serde::{Deserialize, Serialize};

use super::point::{GeoPoint, SurveyGridPoint};

/// Ellipsoid and origin constants of a transverse Mercator grid.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GridParameters {
    /// Semi-major axis in meters.
    pub semi_major_axis: f64,
    /// Flattening.
    pub flattening: f64,
    /// Origin latitude in degrees.
    pub origin_latitude: f64,
    /// Origin longitude in degrees.
    pub origin_longitude: f64,
    /// False northing in meters.
    pub false_northing: f64,
    /// False easting in meters.
    pub false_easting: f64,
    /// Central meridian scale factor.
    pub scale_factor: f64,
}

impl GridParameters {
    /// Constants of the SVY21 datum (WGS84 ellipsoid).
    pub const SVY21: GridParameters = GridParameters {
        semi_major_axis: 6_378_137.0,
        flattening: 1.0 / 298.257223563,
        origin_latitude: 1.366666,
        origin_longitude: 103.833333,
        false_northing: 38_744.572,
        false_easting: 28_001.642,
        scale_factor: 1.0,
    };

    pub fn origin(&self) -> GeoPoint {
        GeoPoint::new(self.origin_latitude, self.origin_longitude)
    }

    pub fn false_origin(&self) -> SurveyGridPoint {
        SurveyGridPoint::new(self.false_northing, self.false_easting)
    }
}

impl Default for GridParameters {
    fn default() -> Self {
        Self::SVY21
    }
}

/// Converter bound to one set of [`GridParameters`].
///
/// All derived ellipsoid terms are computed once in [`Svy21Converter::new`].
#[derive(Debug, Clone)]
pub struct Svy21Converter {
    params: GridParameters,
    semi_minor_axis: f64,
    e2: f64,
    a0: f64,
    a2: f64,
    a4: f64,
    a6: f64,
    /// Meridional arc at the origin latitude.
    origin_arc: f64,
}

impl Svy21Converter {
    pub fn new(params: GridParameters) -> Self {
        let a = params.semi_major_axis;
        let f = params.flattening;
        let e2 = 2.0 * f - f * f;
        let e4 = e2 * e2;
        let e6 = e4 * e2;

        let mut converter = Self {
            params,
            semi_minor_axis: a * (1.0 - f),
            e2,
            a0: 1.0 - e2 / 4.0 - (3.0 * e4) / 64.0 - (5.0 * e6) / 256.0,
            a2: (3.0 / 8.0) * (e2 + e4 / 4.0 + (15.0 * e6) / 128.0),
            a4: (15.0 / 256.0) * (e4 + (3.0 * e6) / 4.0),
            a6: (35.0 * e6) / 3072.0,
            origin_arc: 0.0,
        };
        converter.origin_arc = converter.meridional_arc(params.origin_latitude.to_radians());
        converter
    }

    pub fn svy21() -> Self {
        Self::new(GridParameters::SVY21)
    }

    pub fn params(&self) -> &GridParameters {
        &self.params
    }

    /// Grid northing/easting to WGS84 latitude/longitude.
    pub fn to_lat_lon(&self, northing: f64, easting: f64) -> GeoPoint {
        let p = &self.params;
        let a = p.semi_major_axis;
        let k = p.scale_factor;

        let n_prime = northing - p.false_northing;
        let m_prime = self.origin_arc + n_prime / k;

        let n = (a - self.semi_minor_axis) / (a + self.semi_minor_axis);
        let n2 = n * n;
        let n3 = n2 * n;
        let n4 = n2 * n2;

        // Mean length of one degree of the meridian.
        let g = a * (1.0 - n) * (1.0 - n2) * (1.0 + 9.0 * n2 / 4.0 + 225.0 * n4 / 64.0)
            * (std::f64::consts::PI / 180.0);
        let sigma = (m_prime * std::f64::consts::PI) / (180.0 * g);

        let footpoint = sigma
            + ((3.0 * n / 2.0) - (27.0 * n3 / 32.0)) * (2.0 * sigma).sin()
            + ((21.0 * n2 / 16.0) - (55.0 * n4 / 32.0)) * (4.0 * sigma).sin()
            + (151.0 * n3 / 96.0) * (6.0 * sigma).sin()
            + (1097.0 * n4 / 512.0) * (8.0 * sigma).sin();

        let sin2 = footpoint.sin().powi(2);
        let rho = self.rho(sin2);
        let nu = self.nu(sin2);
        let psi = nu / rho;
        let psi2 = psi * psi;
        let psi3 = psi2 * psi;
        let psi4 = psi3 * psi;
        let t = footpoint.tan();
        let t2 = t * t;
        let t4 = t2 * t2;
        let t6 = t4 * t2;

        let e_prime = easting - p.false_easting;
        let x = e_prime / (k * nu);
        let x2 = x * x;
        let x3 = x2 * x;
        let x5 = x3 * x2;
        let x7 = x5 * x2;

        let lat_factor = t / (k * rho);
        let lat_term1 = lat_factor * ((e_prime * x) / 2.0);
        let lat_term2 = lat_factor
            * ((e_prime * x3) / 24.0)
            * (-4.0 * psi2 + 9.0 * psi * (1.0 - t2) + 12.0 * t2);
        let lat_term3 = lat_factor
            * ((e_prime * x5) / 720.0)
            * (8.0 * psi4 * (11.0 - 24.0 * t2) - 12.0 * psi3 * (21.0 - 71.0 * t2)
                + 15.0 * psi2 * (15.0 - 98.0 * t2 + 15.0 * t4)
                + 180.0 * psi * (5.0 * t2 - 3.0 * t4)
                + 360.0 * t4);
        let lat_term4 = lat_factor
            * ((e_prime * x7) / 40320.0)
            * (1385.0 - 3633.0 * t2 + 4095.0 * t4 + 1575.0 * t6);

        let lat = footpoint - lat_term1 + lat_term2 - lat_term3 + lat_term4;

        let sec_lat = 1.0 / lat.cos();
        let lon_term1 = x * sec_lat;
        let lon_term2 = ((x3 * sec_lat) / 6.0) * (psi + 2.0 * t2);
        let lon_term3 = ((x5 * sec_lat) / 120.0)
            * (-4.0 * psi3 * (1.0 - 6.0 * t2) + psi2 * (9.0 - 68.0 * t2) + 72.0 * psi * t2
                + 24.0 * t4);
        let lon_term4 =
            ((x7 * sec_lat) / 5040.0) * (61.0 + 662.0 * t2 + 1320.0 * t4 + 720.0 * t6);

        let lon = p.origin_longitude.to_radians() + lon_term1 - lon_term2 + lon_term3 - lon_term4;

        GeoPoint::new(lat.to_degrees(), lon.to_degrees())
    }

    /// WGS84 latitude/longitude to grid northing/easting.
    pub fn to_grid(&self, latitude: f64, longitude: f64) -> SurveyGridPoint {
        let p = &self.params;
        let k = p.scale_factor;

        let lat = latitude.to_radians();
        let sin_lat = lat.sin();
        let sin2 = sin_lat * sin_lat;
        let cos_lat = lat.cos();
        let cos2 = cos_lat * cos_lat;
        let cos3 = cos2 * cos_lat;
        let cos4 = cos3 * cos_lat;
        let cos5 = cos4 * cos_lat;
        let cos6 = cos5 * cos_lat;
        let cos7 = cos6 * cos_lat;

        let rho = self.rho(sin2);
        let nu = self.nu(sin2);
        let psi = nu / rho;
        let psi2 = psi * psi;
        let psi3 = psi2 * psi;
        let psi4 = psi3 * psi;
        let t = lat.tan();
        let t2 = t * t;
        let t4 = t2 * t2;
        let t6 = t4 * t2;

        let w = (longitude - p.origin_longitude).to_radians();
        let w2 = w * w;
        let w4 = w2 * w2;
        let w6 = w4 * w2;
        let w8 = w6 * w2;

        let arc = self.meridional_arc(lat);

        let n_term1 = w2 / 2.0 * nu * sin_lat * cos_lat;
        let n_term2 = w4 / 24.0 * nu * sin_lat * cos3 * (4.0 * psi2 + psi - t2);
        let n_term3 = w6 / 720.0
            * nu
            * sin_lat
            * cos5
            * (8.0 * psi4 * (11.0 - 24.0 * t2) - 28.0 * psi3 * (1.0 - 6.0 * t2)
                + psi2 * (1.0 - 32.0 * t2)
                - psi * 2.0 * t2
                + t4);
        let n_term4 =
            w8 / 40320.0 * nu * sin_lat * cos7 * (1385.0 - 3111.0 * t2 + 543.0 * t4 - t6);
        let northing = p.false_northing
            + k * (arc - self.origin_arc + n_term1 + n_term2 + n_term3 + n_term4);

        let e_term1 = w2 / 6.0 * cos2 * (psi - t2);
        let e_term2 = w4 / 120.0
            * cos4
            * (4.0 * psi3 * (1.0 - 6.0 * t2) + psi2 * (1.0 + 8.0 * t2) - psi * 2.0 * t2 + t4);
        let e_term3 = w6 / 5040.0 * cos6 * (61.0 - 479.0 * t2 + 179.0 * t4 - t6);
        let easting = p.false_easting + k * nu * w * cos_lat * (1.0 + e_term1 + e_term2 + e_term3);

        SurveyGridPoint::new(northing, easting)
    }

    pub fn grid_to_point(&self, grid: SurveyGridPoint) -> GeoPoint {
        self.to_lat_lon(grid.northing, grid.easting)
    }

    pub fn point_to_grid(&self, point: GeoPoint) -> SurveyGridPoint {
        self.to_grid(point.latitude, point.longitude)
    }

    /// Meridional arc length from the equator to `lat` (radians).
    fn meridional_arc(&self, lat: f64) -> f64 {
        self.params.semi_major_axis
            * (self.a0 * lat - self.a2 * (2.0 * lat).sin() + self.a4 * (4.0 * lat).sin()
                - self.a6 * (6.0 * lat).sin())
    }

    /// Radius of curvature in the meridian.
    fn rho(&self, sin2_lat: f64) -> f64 {
        let a = self.params.semi_major_axis;
        a * (1.0 - self.e2) / (1.0 - self.e2 * sin2_lat).powf(1.5)
    }

    /// Radius of curvature in the prime vertical.
    fn nu(&self, sin2_lat: f64) -> f64 {
        self.params.semi_major_axis / (1.0 - self.e2 * sin2_lat).sqrt()
    }
}

impl Default for Svy21Converter {
    fn default() -> Self {
        Self::svy21()
    }
}
