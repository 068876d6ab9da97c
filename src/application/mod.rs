//! Application layer: ports and the nearby search use case

pub mod nearby;
pub mod ports;

pub use nearby::{
    AggregationRequest, AggregationResult, BatchOutcome, BoundedAggregator, Enriched,
    EnrichedCarPark, EnrichedEvLot, NearbySearchService, SpatialPreFilter,
};
pub use ports::{CarParkSource, RouteInfoProvider, RouteProviderFactory, SharedRouteProviderFactory};
