//! Maps enriched search results onto the wire schema

use crate::application::{AggregationResult, EnrichedCarPark, EnrichedEvLot};
use crate::domain::{ConnectorAggregate, RouteInfo};

use super::dto::{
    CarParkResponse, ChargerDto, EvLotResponse, LotDetailDto, NearbyResponse, RouteInfoDto,
};

/// Marker for an availability count the places provider did not report.
pub const UNKNOWN_AVAILABILITY: &str = "N/A";

pub struct ResponseAssembler;

impl ResponseAssembler {
    /// Failed and empty batches both become `[]`.
    pub fn assemble(result: AggregationResult) -> NearbyResponse {
        NearbyResponse {
            ev: result
                .ev_lots
                .into_entries()
                .into_iter()
                .map(Self::ev_lot)
                .collect(),
            car_park: result
                .car_parks
                .into_entries()
                .into_iter()
                .map(Self::car_park)
                .collect(),
        }
    }

    pub fn ev_lot(entry: EnrichedEvLot) -> EvLotResponse {
        let lot = entry.item;
        EvLotResponse {
            formatted_address: lot.address,
            location: lot.location.into(),
            display_name: lot.display_name,
            chargers: lot.connectors.iter().map(Self::charger).collect(),
            total_chargers: lot.total_connectors,
            route_info: Self::route_info(&entry.route),
        }
    }

    pub fn car_park(entry: EnrichedCarPark) -> CarParkResponse {
        let park = entry.item;
        CarParkResponse {
            car_park_id: park.id,
            address: park.address,
            car_park_type: park.car_park_type,
            latitude: park.location.latitude,
            longitude: park.location.longitude,
            lot_details: park
                .lot_details
                .into_iter()
                .map(|(lot_type, lots)| {
                    (
                        lot_type,
                        LotDetailDto {
                            total_lots: lots.total_lots,
                            available_lots: lots.available_lots,
                        },
                    )
                })
                .collect(),
            route_info: Self::route_info(&entry.route),
        }
    }

    fn charger(c: &ConnectorAggregate) -> ChargerDto {
        ChargerDto {
            connector_type: c.connector_type.clone(),
            max_charge_rate_kw: format!("{:.1}", c.max_charge_rate_kw),
            count: c.count.to_string(),
            available_count: c
                .available_count
                .map(|n| n.to_string())
                .unwrap_or_else(|| UNKNOWN_AVAILABILITY.to_string()),
        }
    }

    pub fn route_info(route: &RouteInfo) -> RouteInfoDto {
        RouteInfoDto {
            distance: format!("{:.1}", route.distance_km()),
            duration: format!("{:.0}", route.duration_minutes()),
            polyline: route.polyline.clone(),
        }
    }
}
