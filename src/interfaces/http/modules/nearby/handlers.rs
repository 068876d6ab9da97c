//! Nearby search handler

use std::sync::Arc;

use axum::extract::State;
use axum::http::{HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use tracing::{error, warn};

use super::assembler::ResponseAssembler;
use super::dto::{NearbyRequest, NearbyResponse};
use crate::application::{AggregationRequest, NearbySearchService};
use crate::interfaces::http::common::{ErrorBody, ValidatedJson};

/// Response header naming the categories that were dropped because their batch failed.
pub const DEGRADED_HEADER: &str = "x-degraded-categories";

pub const PROCESSING_ERROR_MESSAGE: &str = "Error processing data";

/// Nearby search handler state
#[derive(Clone)]
pub struct NearbyState {
    pub service: Arc<NearbySearchService>,
    /// Answer 500 when exactly one category failed instead of a degraded 200
    pub fail_on_partial: bool,
}

#[utoipa::path(
    post,
    path = "/api/carpark/nearby",
    tag = "Nearby",
    request_body = NearbyRequest,
    responses(
        (status = 200, description = "EV lots and car parks with driving routes", body = NearbyResponse),
        (status = 400, description = "Body is not valid JSON for this schema", body = ErrorBody),
        (status = 422, description = "Coordinates out of range", body = ErrorBody),
        (status = 500, description = "Routing failed for both categories", body = ErrorBody)
    )
)]
pub async fn nearby_search(
    State(state): State<NearbyState>,
    ValidatedJson(body): ValidatedJson<NearbyRequest>,
) -> Response {
    let request = AggregationRequest {
        current_user_location: body.current_user_location.into(),
        searched_location: body.search_location.into(),
        ev_candidates: body.ev_lots.into_iter().map(Into::into).collect(),
    };

    let result = match state.service.search(request).await {
        Ok(result) => result,
        Err(e) => {
            error!(error = %e, "Nearby search failed");
            return processing_error();
        }
    };

    let degraded = result.failed_categories().join(",");
    if !degraded.is_empty() && state.fail_on_partial {
        warn!(categories = %degraded, "Partial failure rejected");
        return processing_error();
    }

    let mut response = (StatusCode::OK, Json(ResponseAssembler::assemble(result))).into_response();
    if !degraded.is_empty() {
        if let Ok(value) = HeaderValue::from_str(&degraded) {
            response.headers_mut().insert(DEGRADED_HEADER, value);
        }
    }
    response
}

fn processing_error() -> Response {
    ErrorBody::new(PROCESSING_ERROR_MESSAGE).into_response_with(StatusCode::INTERNAL_SERVER_ERROR)
}
