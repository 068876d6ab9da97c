//! Car park domain model

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::domain::geo::{GeoPoint, Located, Svy21Converter, SurveyGridPoint};

/// Lot counts for one lot type, kept exactly as the upstream feed reported them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LotAvailability {
    pub total_lots: String,
    pub available_lots: String,
}

/// A fully located car park, as read by the aggregation engine.
#[derive(Debug, Clone, PartialEq)]
pub struct CarParkRecord {
    pub id: String,
    pub address: String,
    pub car_park_type: String,
    pub location: GeoPoint,
    /// Lot type (e.g. `C`, `Y`, `H`) to availability.
    pub lot_details: BTreeMap<String, LotAvailability>,
}

impl CarParkRecord {
    /// Overlay the lot details of a later report for the same car park.
    pub fn merge_lots(&mut self, lots: BTreeMap<String, LotAvailability>) {
        self.lot_details.extend(lots);
    }
}

impl Located for CarParkRecord {
    fn location(&self) -> GeoPoint {
        self.location
    }
}

/// Where an upstream feed says a car park is.
///
/// Some feeds publish WGS84 coordinates, others only survey-grid
/// northing/easting; the latter are resolved once during ingestion.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RecordPosition {
    Located(GeoPoint),
    NeedsConversion(SurveyGridPoint),
}

impl RecordPosition {
    pub fn resolve(&self, converter: &Svy21Converter) -> GeoPoint {
        match self {
            RecordPosition::Located(point) => *point,
            RecordPosition::NeedsConversion(grid) => converter.grid_to_point(*grid),
        }
    }
}

/// A car park as delivered by an ingestion feed, before its position is resolved.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CarParkFeedRecord {
    #[serde(rename = "carParkID")]
    pub id: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub car_park_type: String,
    pub position: RecordPosition,
    #[serde(default)]
    pub lot_details: BTreeMap<String, LotAvailability>,
}

impl CarParkFeedRecord {
    pub fn into_record(self, converter: &Svy21Converter) -> CarParkRecord {
        CarParkRecord {
            location: self.position.resolve(converter),
            id: self.id,
            address: self.address,
            car_park_type: self.car_park_type,
            lot_details: self.lot_details,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn grid_positions_are_converted() {
        let converter = Svy21Converter::svy21();
        let feed: CarParkFeedRecord = serde_json::from_value(serde_json::json!({
            "carParkID": "HLM",
            "address": "BLK 2 HAIG ROAD",
            "carParkType": "SURFACE CAR PARK",
            "position": { "needsConversion": { "northing": 38744.572, "easting": 28001.642 } },
            "lotDetails": { "C": { "totalLots": "105", "availableLots": "12" } }
        }))
        .unwrap();

        let record = feed.into_record(&converter);
        assert_eq!(record.id, "HLM");
        assert_abs_diff_eq!(record.location.latitude, 1.366666, epsilon = 1e-6);
        assert_abs_diff_eq!(record.location.longitude, 103.833333, epsilon = 1e-6);
        assert_eq!(record.lot_details["C"].available_lots, "12");
    }

    #[test]
    fn located_positions_pass_through() {
        let converter = Svy21Converter::svy21();
        let position = RecordPosition::Located(GeoPoint::new(1.3, 103.8));
        assert_eq!(position.resolve(&converter), GeoPoint::new(1.3, 103.8));
    }

    #[test]
    fn merge_overlays_later_lot_counts() {
        let mut record = CarParkRecord {
            id: "A1".into(),
            address: "x".into(),
            car_park_type: "MULTI-STOREY".into(),
            location: GeoPoint::new(1.3, 103.8),
            lot_details: BTreeMap::from([(
                "C".to_string(),
                LotAvailability {
                    total_lots: "10".into(),
                    available_lots: "3".into(),
                },
            )]),
        };
        record.merge_lots(BTreeMap::from([
            (
                "C".to_string(),
                LotAvailability {
                    total_lots: "10".into(),
                    available_lots: "7".into(),
                },
            ),
            (
                "Y".to_string(),
                LotAvailability {
                    total_lots: "4".into(),
                    available_lots: "4".into(),
                },
            ),
        ]));
        assert_eq!(record.lot_details.len(), 2);
        assert_eq!(record.lot_details["C"].available_lots, "7");
    }
}
