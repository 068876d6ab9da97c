//! Infrastructure layer: car park storage and outbound routing adapters

pub mod routing;
pub mod storage;

pub use routing::{OneMapRouteClient, OneMapRouteFactory, RoutingCredentials};
pub use storage::{InMemoryCarParkTable, SharedCarParkTable};
