//! Route provider adapters

mod credentials;
mod onemap;

pub use credentials::RoutingCredentials;
pub use onemap::{OneMapRouteClient, OneMapRouteFactory, ROUTE_PATH};
