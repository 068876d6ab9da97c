//! Nearby EV lot and car park search

pub mod aggregator;
pub mod prefilter;
pub mod service;

pub use aggregator::{BatchOutcome, BoundedAggregator, Enriched, DEFAULT_WORKER_CAP};
pub use prefilter::{within_radius, SpatialPreFilter};
pub use service::{
    AggregationRequest, AggregationResult, EnrichedCarPark, EnrichedEvLot, NearbySearchService,
};
