//! Domain and application error types

use thiserror::Error;

/// Failure of a single routing call.
#[derive(Debug, Error)]
pub enum RouteError {
    #[error("Routing request timed out")]
    Timeout,

    #[error("Routing service returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Routing transport error: {0}")]
    Transport(String),

    #[error("Malformed routing payload: {0}")]
    MalformedPayload(String),

    #[error("No route found")]
    NoRoute,

    #[error("Failed to build routing client: {0}")]
    ClientBuild(String),
}

impl RouteError {
    /// Short label used in logs and metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            RouteError::Timeout => "timeout",
            RouteError::Status { .. } => "status",
            RouteError::Transport(_) => "transport",
            RouteError::MalformedPayload(_) => "malformed",
            RouteError::NoRoute => "no_route",
            RouteError::ClientBuild(_) => "client_build",
        }
    }
}

/// Failure of a whole nearby search.
#[derive(Debug, Error)]
pub enum AggregationError {
    #[error("Both batches failed (ev: {ev}; car park: {car_park})")]
    TotalFailure { ev: String, car_park: String },
}

/// Failure to load the car park seed data.
#[derive(Debug, Error)]
pub enum IngestError {
    #[error("Failed to read car park feed: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse car park feed: {0}")]
    Parse(#[from] serde_json::Error),
}
