//! OneMap routing adapter
//!
//! `GET {base}/api/public/routingsvc/route?start=lat,lng&end=lat,lng&routeType=drive`
//! with the access token in the `Authorization` header.

use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::{Client, StatusCode, Url};
use serde::Deserialize;
use tracing::debug;

use super::credentials::RoutingCredentials;
use crate::application::ports::{RouteInfoProvider, RouteProviderFactory};
use crate::config::RoutingConfig;
use crate::domain::{GeoPoint, RouteError, RouteInfo};

pub const ROUTE_PATH: &str = "/api/public/routingsvc/route";

/// Longest error body kept in [`RouteError::Status`].
const MAX_ERROR_BODY: usize = 256;

#[derive(Debug, Deserialize)]
struct RouteResponse {
    #[serde(default)]
    route_geometry: String,
    route_summary: Option<RouteSummary>,
}

#[derive(Debug, Deserialize)]
struct RouteSummary {
    /// Meters
    total_distance: f64,
    /// Seconds
    total_time: f64,
}

/// Builds one [`OneMapRouteClient`] per aggregation worker.
pub struct OneMapRouteFactory {
    endpoint: Url,
    route_type: String,
    timeout: Duration,
    pool_idle_per_worker: usize,
    credentials: RoutingCredentials,
}

impl OneMapRouteFactory {
    pub fn new(config: &RoutingConfig, credentials: RoutingCredentials) -> Result<Self, RouteError> {
        let base = config.base_url.trim_end_matches('/');
        let endpoint = Url::parse(&format!("{base}{ROUTE_PATH}"))
            .map_err(|e| RouteError::ClientBuild(format!("invalid base_url {base}: {e}")))?;

        Ok(Self {
            endpoint,
            route_type: config.route_type.clone(),
            timeout: Duration::from_secs(config.timeout_secs),
            pool_idle_per_worker: config.pool_idle_per_worker,
            credentials,
        })
    }

    pub fn credentials(&self) -> &RoutingCredentials {
        &self.credentials
    }
}

impl RouteProviderFactory for OneMapRouteFactory {
    fn create(&self) -> Result<Arc<dyn RouteInfoProvider>, RouteError> {
        let client = Client::builder()
            .timeout(self.timeout)
            .pool_max_idle_per_host(self.pool_idle_per_worker)
            .build()
            .map_err(|e| RouteError::ClientBuild(e.to_string()))?;

        Ok(Arc::new(OneMapRouteClient {
            client,
            endpoint: self.endpoint.clone(),
            route_type: self.route_type.clone(),
            credentials: self.credentials.clone(),
        }))
    }
}

/// A single worker's routing client. Its connection pool is not shared.
pub struct OneMapRouteClient {
    client: Client,
    endpoint: Url,
    route_type: String,
    credentials: RoutingCredentials,
}

impl OneMapRouteClient {
    fn route_url(&self, origin: GeoPoint, destination: GeoPoint) -> Result<Url, RouteError> {
        Url::parse_with_params(
            self.endpoint.as_str(),
            &[
                ("start", origin.to_string()),
                ("end", destination.to_string()),
                ("routeType", self.route_type.clone()),
            ],
        )
        .map_err(|e| RouteError::ClientBuild(e.to_string()))
    }

    async fn fetch(&self, origin: GeoPoint, destination: GeoPoint) -> Result<RouteInfo, RouteError> {
        let url = self.route_url(origin, destination)?;
        let token = self.credentials.current().await;

        let response = self
            .client
            .get(url)
            .header(reqwest::header::AUTHORIZATION, token)
            .send()
            .await
            .map_err(map_transport_error)?;

        let status = response.status();
        let body = response.bytes().await.map_err(map_transport_error)?;

        if status == StatusCode::NOT_FOUND {
            return Err(RouteError::NoRoute);
        }
        if !status.is_success() {
            let text = String::from_utf8_lossy(&body);
            return Err(RouteError::Status {
                status: status.as_u16(),
                body: text.chars().take(MAX_ERROR_BODY).collect(),
            });
        }

        let parsed: RouteResponse = serde_json::from_slice(&body)
            .map_err(|e| RouteError::MalformedPayload(e.to_string()))?;
        let summary = parsed
            .route_summary
            .ok_or_else(|| RouteError::MalformedPayload("missing route_summary".into()))?;

        Ok(RouteInfo {
            distance_meters: summary.total_distance,
            duration_seconds: summary.total_time,
            polyline: parsed.route_geometry,
        })
    }
}

fn map_transport_error(err: reqwest::Error) -> RouteError {
    if err.is_timeout() {
        RouteError::Timeout
    } else {
        RouteError::Transport(err.to_string())
    }
}

#[async_trait]
impl RouteInfoProvider for OneMapRouteClient {
    async fn compute_route(
        &self,
        origin: GeoPoint,
        destination: GeoPoint,
    ) -> Result<RouteInfo, RouteError> {
        let started = Instant::now();
        let result = self.fetch(origin, destination).await;
        let elapsed = started.elapsed().as_secs_f64();

        let outcome = match &result {
            Ok(_) => "ok",
            Err(e) => e.kind(),
        };
        metrics::histogram!("route_request_duration_seconds").record(elapsed);
        metrics::counter!("route_requests_total", "outcome" => outcome).increment(1);
        debug!(%origin, %destination, outcome, elapsed_ms = elapsed * 1000.0, "Route request");

        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(base_url: &str) -> RoutingConfig {
        RoutingConfig {
            base_url: base_url.to_string(),
            ..RoutingConfig::default()
        }
    }

    #[test]
    fn route_url_carries_coordinates_and_route_type() {
        let factory =
            OneMapRouteFactory::new(&config("https://example.test/"), RoutingCredentials::default())
                .unwrap();
        let client = OneMapRouteClient {
            client: Client::new(),
            endpoint: factory.endpoint.clone(),
            route_type: "drive".to_string(),
            credentials: RoutingCredentials::default(),
        };

        let url = client
            .route_url(GeoPoint::new(1.3, 103.8), GeoPoint::new(1.31, 103.81))
            .unwrap();

        assert_eq!(url.path(), ROUTE_PATH);
        let pairs: Vec<(String, String)> = url.query_pairs().into_owned().collect();
        assert_eq!(
            pairs,
            vec![
                ("start".to_string(), "1.3,103.8".to_string()),
                ("end".to_string(), "1.31,103.81".to_string()),
                ("routeType".to_string(), "drive".to_string()),
            ]
        );
    }

    #[test]
    fn invalid_base_url_is_rejected() {
        let err = OneMapRouteFactory::new(&config("not a url"), RoutingCredentials::default())
            .err()
            .unwrap();
        assert!(matches!(err, RouteError::ClientBuild(_)));
    }

    #[test]
    fn summary_payload_parses() {
        let parsed: RouteResponse = serde_json::from_str(
            r#"{"status":0,"route_geometry":"abc","route_summary":{"total_distance":1523.0,"total_time":240}}"#,
        )
        .unwrap();
        let summary = parsed.route_summary.unwrap();
        assert_eq!(summary.total_distance, 1523.0);
        assert_eq!(summary.total_time, 240.0);
        assert_eq!(parsed.route_geometry, "abc");
    }
}
