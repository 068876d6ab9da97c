//! Validated JSON extractor for Axum
//!
//! `ValidatedJson<T>` works like `axum::Json<T>`, but additionally runs
//! `validator::Validate::validate()` on the deserialized value.
//!
//! - Any body that cannot be read as `T` (bad syntax, wrong types, missing
//!   fields, wrong content type) is answered with
//!   `400 {"error": "Cannot parse JSON"}` before any processing happens.
//! - A body that parses but fails validation is answered with
//!   `422 {"error": "<field>: <reason>; ..."}`. Nested fields are reported
//!   with dotted paths, e.g. `EVLot[2].location.latitude`.

use axum::extract::rejection::JsonRejection;
use axum::extract::FromRequest;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::de::DeserializeOwned;
use tracing::debug;
use validator::{Validate, ValidationErrors, ValidationErrorsKind};

use super::ErrorBody;

pub const PARSE_ERROR_MESSAGE: &str = "Cannot parse JSON";

/// An extractor that deserializes JSON and validates it.
pub struct ValidatedJson<T>(pub T);

/// Error type for `ValidatedJson` extraction failures.
pub enum ValidatedJsonRejection {
    JsonError(JsonRejection),
    ValidationError(ValidationErrors),
}

impl IntoResponse for ValidatedJsonRejection {
    fn into_response(self) -> Response {
        match self {
            Self::JsonError(rejection) => {
                debug!(reason = %rejection.body_text(), "Rejected request body");
                ErrorBody::new(PARSE_ERROR_MESSAGE).into_response_with(StatusCode::BAD_REQUEST)
            }
            Self::ValidationError(errors) => {
                let mut messages = Vec::new();
                collect_messages("", &errors, &mut messages);
                messages.sort();

                let message = if messages.is_empty() {
                    "Validation failed".to_string()
                } else {
                    messages.join("; ")
                };
                ErrorBody::new(message).into_response_with(StatusCode::UNPROCESSABLE_ENTITY)
            }
        }
    }
}

fn collect_messages(prefix: &str, errors: &ValidationErrors, out: &mut Vec<String>) {
    for (field, kind) in errors.errors() {
        let path = if prefix.is_empty() {
            field.to_string()
        } else {
            format!("{prefix}.{field}")
        };
        match kind {
            ValidationErrorsKind::Field(errs) => {
                out.extend(errs.iter().map(|e| {
                    let msg = e
                        .message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| e.code.to_string());
                    format!("{path}: {msg}")
                }));
            }
            ValidationErrorsKind::Struct(inner) => collect_messages(&path, inner, out),
            ValidationErrorsKind::List(items) => {
                for (index, inner) in items {
                    collect_messages(&format!("{path}[{index}]"), inner, out);
                }
            }
        }
    }
}

impl<S, T> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = ValidatedJsonRejection;

    async fn from_request(
        req: axum::extract::Request,
        state: &S,
    ) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(ValidatedJsonRejection::JsonError)?;

        value
            .validate()
            .map_err(ValidatedJsonRejection::ValidationError)?;

        Ok(ValidatedJson(value))
    }
}

// ── Tests ──────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use axum::routing::post;
    use axum::Router;
    use serde::Deserialize;
    use validator::Validate;

    #[derive(Debug, Deserialize, Validate)]
    struct Point {
        #[validate(range(min = -90.0, max = 90.0, message = "must be within [-90, 90]"))]
        latitude: f64,
    }

    #[derive(Debug, Deserialize, Validate)]
    struct TestBody {
        #[validate(nested)]
        origin: Point,
        #[validate(nested)]
        stops: Vec<Point>,
    }

    async fn handler(ValidatedJson(_body): ValidatedJson<TestBody>) -> &'static str {
        "ok"
    }

    fn app() -> Router {
        Router::new().route("/test", post(handler))
    }

    async fn send(body: impl Into<Body>) -> axum::http::Response<Body> {
        use tower::Service;
        let req = Request::builder()
            .method("POST")
            .uri("/test")
            .header("content-type", "application/json")
            .body(body.into())
            .unwrap();
        let mut svc = app().into_service();
        svc.call(req).await.unwrap()
    }

    async fn error_of(resp: axum::http::Response<Body>) -> String {
        let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        let body: ErrorBody = serde_json::from_slice(&bytes).unwrap();
        body.error
    }

    #[tokio::test]
    async fn valid_body_returns_ok() {
        let body = serde_json::json!({"origin": {"latitude": 1.3}, "stops": [{"latitude": 1.2}]});
        let resp = send(serde_json::to_vec(&body).unwrap()).await;
        assert_eq!(resp.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn invalid_json_returns_400() {
        let resp = send("not json").await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        assert_eq!(error_of(resp).await, PARSE_ERROR_MESSAGE);
    }

    #[tokio::test]
    async fn missing_field_returns_400() {
        let resp = send(r#"{"stops": []}"#).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        assert_eq!(error_of(resp).await, PARSE_ERROR_MESSAGE);
    }

    #[tokio::test]
    async fn nested_validation_failure_returns_422_with_path() {
        let body = serde_json::json!({"origin": {"latitude": 1.3}, "stops": [{"latitude": 1.0}, {"latitude": 95.0}]});
        let resp = send(serde_json::to_vec(&body).unwrap()).await;
        assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(
            error_of(resp).await,
            "stops[1].latitude: must be within [-90, 90]"
        );
    }
}
