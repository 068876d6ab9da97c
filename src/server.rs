//! Reusable service runtime.
//!
//! [`ServerHandle`] owns the full lifecycle: metrics recorder, car park
//! table (and optional seed file), routing adapter, nearby search service,
//! REST API listener and graceful shutdown.

use std::net::SocketAddr;
use std::sync::{Arc, OnceLock};
use std::time::Instant;

use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use thiserror::Error;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

use crate::application::{
    BoundedAggregator, NearbySearchService, SharedRouteProviderFactory, SpatialPreFilter,
};
use crate::config::{AppConfig, ConfigError};
use crate::domain::{IngestError, RouteError, Svy21Converter};
use crate::infrastructure::{
    InMemoryCarParkTable, OneMapRouteFactory, RoutingCredentials, SharedCarParkTable,
};
use crate::interfaces::http::modules::health::HealthState;
use crate::interfaces::http::modules::metrics::MetricsState;
use crate::interfaces::http::modules::nearby::NearbyState;
use crate::interfaces::http::{create_api_router, ApiState};
use crate::shared::shutdown::{ShutdownCoordinator, ShutdownSignal};

#[derive(Debug, Error)]
pub enum ServerError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("Routing adapter: {0}")]
    Routing(#[from] RouteError),

    #[error("Car park seed data: {0}")]
    Ingest(#[from] IngestError),

    #[error("Failed to bind {addr}: {source}")]
    Bind {
        addr: String,
        source: std::io::Error,
    },
}

// ── Options ────────────────────────────────────────────────────────

/// Options for starting the service.
pub struct ServerOptions {
    pub config: AppConfig,
    /// Install the global Prometheus recorder backing `GET /metrics`.
    pub install_metrics_recorder: bool,
    /// Route providers to use instead of the OneMap adapter.
    pub route_providers: Option<SharedRouteProviderFactory>,
}

impl Default for ServerOptions {
    fn default() -> Self {
        Self {
            config: AppConfig::default(),
            install_metrics_recorder: true,
            route_providers: None,
        }
    }
}

// ── ServerHandle ───────────────────────────────────────────────────

/// Handle to a running service.
///
/// The car park table, converter and routing credentials are exposed so an
/// ingestion or token-refresh collaborator running in the same process can
/// feed them.
pub struct ServerHandle {
    pub config: AppConfig,
    /// Address the REST API is actually listening on.
    pub local_addr: SocketAddr,
    pub car_parks: SharedCarParkTable,
    pub converter: Svy21Converter,
    pub credentials: RoutingCredentials,

    shutdown: ShutdownCoordinator,
    api_task: JoinHandle<()>,
}

impl ServerHandle {
    pub async fn start(opts: ServerOptions) -> Result<Self, ServerError> {
        let config = opts.config;
        config.validate()?;

        info!("Starting SweetSpot nearby service...");

        let prometheus_handle = if opts.install_metrics_recorder {
            prometheus_handle()
        } else {
            None
        };

        // ── Car park table ─────────────────────────────────────
        let converter = Svy21Converter::new(config.grid);
        let car_parks = InMemoryCarParkTable::shared();
        if let Some(path) = &config.data.car_parks_file {
            car_parks.load_seed_file(path, &converter).await?;
        } else {
            warn!("No car park seed file configured; table starts empty");
        }

        // ── Routing ────────────────────────────────────────────
        let credentials = RoutingCredentials::new(config.routing.access_token.clone());
        let route_providers: SharedRouteProviderFactory = match opts.route_providers {
            Some(providers) => providers,
            None => {
                let factory = OneMapRouteFactory::new(&config.routing, credentials.clone())?;
                info!(base_url = %config.routing.base_url, "🧭 OneMap routing adapter configured");
                Arc::new(factory)
            }
        };

        // ── Nearby search ──────────────────────────────────────
        let filter = SpatialPreFilter::new(
            config.search.prefilter_radius_km,
            config.search.final_radius_km,
        )?;
        let aggregator = BoundedAggregator::new(route_providers, config.search.worker_cap);
        let service = NearbySearchService::new(car_parks.clone(), aggregator, filter);
        info!(
            final_radius_km = config.search.final_radius_km,
            prefilter_radius_km = config.search.prefilter_radius_km,
            worker_cap = config.search.worker_cap,
            "Nearby search ready"
        );

        // ── REST API server ────────────────────────────────────
        let router = create_api_router(ApiState {
            nearby: NearbyState {
                service: Arc::new(service),
                fail_on_partial: config.search.fail_on_partial,
            },
            health: HealthState {
                car_parks: car_parks.clone(),
                started_at: Arc::new(Instant::now()),
            },
            metrics: MetricsState {
                handle: prometheus_handle,
            },
        });

        let shutdown = ShutdownCoordinator::new(config.server.shutdown_timeout);
        let api_shutdown = shutdown.signal();

        let api_addr = config.api_address();
        let listener = tokio::net::TcpListener::bind(&api_addr)
            .await
            .map_err(|source| ServerError::Bind {
                addr: api_addr.clone(),
                source,
            })?;
        let local_addr = listener.local_addr().map_err(|source| ServerError::Bind {
            addr: api_addr.clone(),
            source,
        })?;
        info!("REST API server listening on http://{}", local_addr);

        let api_server = axum::serve(listener, router).with_graceful_shutdown(async move {
            api_shutdown.wait().await;
            info!("🛑 REST API server received shutdown signal");
        });

        let api_task = tokio::spawn(async move {
            if let Err(e) = api_server.await {
                error!(error = %e, "REST API server error");
            }
        });

        info!("🚀 SweetSpot nearby service started");

        Ok(Self {
            config,
            local_addr,
            car_parks,
            converter,
            credentials,
            shutdown,
            api_task,
        })
    }

    pub fn shutdown_signal(&self) -> ShutdownSignal {
        self.shutdown.signal()
    }

    /// Install OS signal listeners (SIGTERM, SIGINT) that trigger shutdown.
    pub fn install_signal_handler(&self) {
        self.shutdown.start_signal_listener();
    }

    pub fn trigger_shutdown(&self) {
        self.shutdown.signal().trigger();
    }

    /// Wait for shutdown to be triggered, then for the API server to drain
    /// within the configured timeout.
    pub async fn wait(self) {
        let api_task = self.api_task;
        let abort = api_task.abort_handle();
        let completed = self
            .shutdown
            .shutdown_with_cleanup(move || async move {
                match api_task.await {
                    Ok(()) => info!("REST API server stopped"),
                    Err(e) => error!(error = %e, "REST API server task panicked"),
                }
            })
            .await;

        if !completed {
            abort.abort();
            warn!("In-flight requests were abandoned at shutdown");
        }
        info!("👋 SweetSpot nearby service shutdown complete");
    }

    /// Trigger shutdown and wait for completion.
    pub async fn shutdown(self) {
        info!("🛑 Shutting down SweetSpot nearby service...");
        self.trigger_shutdown();
        self.wait().await;
    }

    pub fn is_running(&self) -> bool {
        !self.api_task.is_finished()
    }
}

/// The global recorder can only be installed once per process, so restarts
/// within the same process reuse the first handle.
fn prometheus_handle() -> Option<PrometheusHandle> {
    static PROM_HANDLE: OnceLock<Option<PrometheusHandle>> = OnceLock::new();

    PROM_HANDLE
        .get_or_init(|| match PrometheusBuilder::new().install_recorder() {
            Ok(handle) => {
                info!("📊 Prometheus metrics recorder installed");
                Some(handle)
            }
            Err(e) => {
                warn!(error = %e, "Prometheus recorder unavailable; /metrics disabled");
                None
            }
        })
        .clone()
}

/// Initialize tracing (logging) from the application config.
///
/// Call this once at process startup (before [`ServerHandle::start`]).
/// `RUST_LOG` takes precedence over `[logging].level`.
pub fn init_tracing(config: &AppConfig) {
    use tracing_subscriber::layer::SubscriberExt;
    use tracing_subscriber::util::SubscriberInitExt;

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.logging.level));

    if config.logging.json {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }
}
