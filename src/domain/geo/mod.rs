//! Geographic primitives: points, distances and grid conversion

pub mod point;
pub mod svy21;

pub use point::{distance_km, GeoPoint, Located, SurveyGridPoint, EARTH_RADIUS_KM};
pub use svy21::{GridParameters, Svy21Converter};
