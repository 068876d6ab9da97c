//! Nearby search DTOs
//!
//! Field names follow the existing mobile client contract, hence the
//! PascalCase top-level keys and mixed-case charger fields.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::domain::{ConnectorAggregate, EvLotCandidate, GeoPoint};

// ── Request ────────────────────────────────────────────────────

/// WGS84 coordinate. Accepts both `{latitude, longitude}` and the places
/// provider's `{lat, lng}` spelling.
#[derive(Debug, Clone, Copy, Deserialize, Validate, ToSchema)]
pub struct CoordinateDto {
    #[serde(alias = "lat")]
    #[validate(range(min = -90.0, max = 90.0, message = "must be within [-90, 90]"))]
    pub latitude: f64,
    #[serde(alias = "lng")]
    #[validate(range(min = -180.0, max = 180.0, message = "must be within [-180, 180]"))]
    pub longitude: f64,
}

impl From<CoordinateDto> for GeoPoint {
    fn from(c: CoordinateDto) -> Self {
        GeoPoint::new(c.latitude, c.longitude)
    }
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ConnectorAggregationDto {
    #[serde(rename = "type")]
    pub connector_type: String,
    #[serde(default)]
    pub count: i64,
    #[serde(default, alias = "maxChargeRateKW")]
    pub max_charge_rate_kw: f64,
    /// Absent or `null` when live availability is unknown
    #[serde(default)]
    pub available_count: Option<i64>,
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct EvChargeOptionsDto {
    #[serde(default)]
    pub connector_count: i64,
    #[serde(default)]
    pub connector_aggregation: Vec<ConnectorAggregationDto>,
}

/// EV lot candidate as returned by the client's places lookup
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct EvLotRequest {
    #[serde(default)]
    pub formatted_address: String,
    #[validate(nested)]
    pub location: CoordinateDto,
    #[serde(default, alias = "displayName")]
    pub name: String,
    #[serde(default)]
    pub ev_charge_options: EvChargeOptionsDto,
}

impl From<EvLotRequest> for EvLotCandidate {
    fn from(r: EvLotRequest) -> Self {
        EvLotCandidate {
            address: r.formatted_address,
            location: r.location.into(),
            display_name: r.name,
            total_connectors: r.ev_charge_options.connector_count,
            connectors: r
                .ev_charge_options
                .connector_aggregation
                .into_iter()
                .map(|c| ConnectorAggregate {
                    connector_type: c.connector_type,
                    count: c.count,
                    max_charge_rate_kw: c.max_charge_rate_kw,
                    available_count: c.available_count,
                })
                .collect(),
        }
    }
}

/// `POST /api/carpark/nearby` body
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct NearbyRequest {
    #[serde(rename = "EVLot", default)]
    #[validate(nested)]
    pub ev_lots: Vec<EvLotRequest>,
    #[serde(rename = "CurrentUserLocation")]
    #[validate(nested)]
    pub current_user_location: CoordinateDto,
    #[serde(rename = "SearchLocation")]
    #[validate(nested)]
    pub search_location: CoordinateDto,
}

// ── Response ───────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct LocationDto {
    pub latitude: f64,
    pub longitude: f64,
}

impl From<GeoPoint> for LocationDto {
    fn from(p: GeoPoint) -> Self {
        Self {
            latitude: p.latitude,
            longitude: p.longitude,
        }
    }
}

/// Distance in km (1 decimal) and duration in minutes (no decimals), as strings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct RouteInfoDto {
    pub distance: String,
    pub duration: String,
    pub polyline: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ChargerDto {
    #[serde(rename = "type")]
    pub connector_type: String,
    #[serde(rename = "maxChargeRateKW")]
    pub max_charge_rate_kw: String,
    pub count: String,
    /// `"N/A"` when unknown
    #[serde(rename = "availableCount")]
    pub available_count: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct EvLotResponse {
    pub formatted_address: String,
    pub location: LocationDto,
    pub display_name: String,
    pub chargers: Vec<ChargerDto>,
    pub total_chargers: i64,
    pub route_info: RouteInfoDto,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LotDetailDto {
    pub total_lots: String,
    pub available_lots: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CarParkResponse {
    #[serde(rename = "carParkID")]
    pub car_park_id: String,
    pub address: String,
    pub car_park_type: String,
    pub latitude: f64,
    pub longitude: f64,
    pub lot_details: BTreeMap<String, LotDetailDto>,
    pub route_info: RouteInfoDto,
}

/// Both keys are always present; a failed or empty category is `[]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct NearbyResponse {
    #[serde(rename = "EV")]
    pub ev: Vec<EvLotResponse>,
    #[serde(rename = "CarPark")]
    pub car_park: Vec<CarParkResponse>,
}
