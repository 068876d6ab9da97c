//! EV charging lot candidates supplied by the client

use crate::domain::geo::{GeoPoint, Located};

/// Charger statistics for one connector type at a lot.
#[derive(Debug, Clone, PartialEq)]
pub struct ConnectorAggregate {
    pub connector_type: String,
    pub count: i64,
    pub max_charge_rate_kw: f64,
    /// `None` when the places provider did not report live availability.
    pub available_count: Option<i64>,
}

/// One EV lot from the request body. Never persisted.
#[derive(Debug, Clone, PartialEq)]
pub struct EvLotCandidate {
    pub address: String,
    pub location: GeoPoint,
    pub display_name: String,
    pub connectors: Vec<ConnectorAggregate>,
    pub total_connectors: i64,
}

impl Located for EvLotCandidate {
    fn location(&self) -> GeoPoint {
        self.location
    }
}
