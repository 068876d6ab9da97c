//! Outbound ports to the routing service
//!
//! [`RouteInfoProvider`] is the contract the aggregation engine calls per
//! candidate. [`RouteProviderFactory`] hands each worker its own provider
//! instance so that workers never share one connection pool.
//!
//! The production implementation lives in
//! [`OneMapRouteFactory`](crate::infrastructure::routing::OneMapRouteFactory).

use std::sync::Arc;

use async_trait::async_trait;

use crate::domain::{GeoPoint, RouteError, RouteInfo};

/// Computes a driving route between two points.
#[async_trait]
pub trait RouteInfoProvider: Send + Sync {
    async fn compute_route(
        &self,
        origin: GeoPoint,
        destination: GeoPoint,
    ) -> Result<RouteInfo, RouteError>;
}

/// Builds one [`RouteInfoProvider`] per aggregation worker.
pub trait RouteProviderFactory: Send + Sync {
    fn create(&self) -> Result<Arc<dyn RouteInfoProvider>, RouteError>;
}

pub type SharedRouteProviderFactory = Arc<dyn RouteProviderFactory>;
