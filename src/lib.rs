//! # SweetSpot nearby service
//!
//! Finds EV charging lots and car parks around a searched location and
//! enriches each with a driving route from the user's current position.
//!
//! ## Architecture
//!
//! - **domain**: coordinates, SVY21 grid conversion, haversine distance,
//!   car park and EV lot models, error types
//! - **application**: ports, the spatial pre-filter, the bounded route
//!   aggregator and the nearby search service
//! - **infrastructure**: in-memory car park table, OneMap routing adapter
//! - **interfaces**: REST API (axum) with OpenAPI document
//! - **shared**: graceful shutdown
//! - **server**: lifecycle handle used by the CLI

pub mod application;
pub mod config;
pub mod domain;
pub mod infrastructure;
pub mod interfaces;
pub mod server;
pub mod shared;

pub use config::{config_path_from_env, default_config_path, AppConfig};
pub use interfaces::http::create_api_router;
pub use server::{init_tracing, ServerError, ServerHandle, ServerOptions};
