//! Health check handler

use std::sync::Arc;
use std::time::Instant;

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::infrastructure::SharedCarParkTable;

/// Health check state
#[derive(Clone)]
pub struct HealthState {
    pub car_parks: SharedCarParkTable,
    pub started_at: Arc<Instant>,
}

/// Service health response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub uptime_seconds: u64,
    /// Car parks currently available to nearby searches
    pub car_parks: usize,
    /// RFC 3339 time of the last car park ingestion, if any
    pub car_parks_refreshed_at: Option<String>,
}

#[utoipa::path(
    get,
    path = "/health",
    tag = "Health",
    responses(
        (status = 200, description = "Service is up", body = HealthResponse)
    )
)]
pub async fn health_check(State(state): State<HealthState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_seconds: state.started_at.elapsed().as_secs(),
        car_parks: state.car_parks.len(),
        car_parks_refreshed_at: state
            .car_parks
            .last_refreshed()
            .await
            .map(|t| t.to_rfc3339()),
    })
}
