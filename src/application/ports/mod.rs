//! Application ports (hexagonal architecture boundaries)
//!
//! The car park read port is a domain contract (`domain::car_park`).
//! Outbound ports to external services live here.

pub mod outbound;

pub use crate::domain::car_park::CarParkSource;
pub use outbound::{RouteInfoProvider, RouteProviderFactory, SharedRouteProviderFactory};
