//! Domain layer: pure types and numeric algorithms

pub mod car_park;
pub mod error;
pub mod ev_lot;
pub mod geo;
pub mod route;

pub use car_park::{CarParkFeedRecord, CarParkRecord, CarParkSource, LotAvailability, RecordPosition};
pub use error::{AggregationError, IngestError, RouteError};
pub use ev_lot::{ConnectorAggregate, EvLotCandidate};
pub use geo::{distance_km, GeoPoint, Located, GridParameters, Svy21Converter, SurveyGridPoint};
pub use route::RouteInfo;
