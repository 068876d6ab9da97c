//! API router and OpenAPI document

use axum::{
    extract::FromRef,
    middleware,
    routing::{get, post},
    Json, Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;

use super::common::ErrorBody;
use super::modules::health::{self, HealthResponse, HealthState};
use super::modules::metrics::{http_metrics_middleware, prometheus_metrics, MetricsState};
use super::modules::nearby::{dto, handlers as nearby, NearbyState};
use super::modules::request_id::request_id_middleware;

/// Unified router state. Each handler extracts its own slice via `FromRef`.
#[derive(Clone)]
pub struct ApiState {
    pub nearby: NearbyState,
    pub health: HealthState,
    pub metrics: MetricsState,
}

impl FromRef<ApiState> for NearbyState {
    fn from_ref(s: &ApiState) -> Self {
        s.nearby.clone()
    }
}

impl FromRef<ApiState> for HealthState {
    fn from_ref(s: &ApiState) -> Self {
        s.health.clone()
    }
}

impl FromRef<ApiState> for MetricsState {
    fn from_ref(s: &ApiState) -> Self {
        s.metrics.clone()
    }
}

/// OpenAPI documentation
#[derive(OpenApi)]
#[openapi(
    paths(
        health::handlers::health_check,
        nearby::nearby_search,
    ),
    components(
        schemas(
            ErrorBody,
            HealthResponse,
            dto::NearbyRequest,
            dto::EvLotRequest,
            dto::EvChargeOptionsDto,
            dto::ConnectorAggregationDto,
            dto::CoordinateDto,
            dto::NearbyResponse,
            dto::EvLotResponse,
            dto::ChargerDto,
            dto::CarParkResponse,
            dto::LotDetailDto,
            dto::LocationDto,
            dto::RouteInfoDto,
        )
    ),
    tags(
        (name = "Health", description = "Service health"),
        (name = "Nearby", description = "EV lots and car parks near a searched location, with driving routes"),
    ),
    info(
        title = "SweetSpot Nearby API",
        version = "1.0.0",
        description = "Nearby EV charging lots and car parks enriched with driving routes",
    )
)]
pub struct ApiDoc;

async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

/// Create the API router with all routes
pub fn create_api_router(state: ApiState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health::health_check))
        .route("/metrics", get(prometheus_metrics))
        .route("/api-doc/openapi.json", get(openapi_json))
        .route("/api/carpark/nearby", post(nearby::nearby_search))
        .with_state(state)
        .layer(middleware::from_fn(http_metrics_middleware))
        .layer(middleware::from_fn(request_id_middleware))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}
