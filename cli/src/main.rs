//! SweetSpot nearby service - CLI server
//!
//! ```sh
//! # Run with default config (~/.config/sweetspot/config.toml)
//! sweetspot-service
//!
//! # Custom config path
//! sweetspot-service --config /etc/sweetspot/config.toml
//!
//! # Override the API port
//! sweetspot-service --api-port 9090
//!
//! # Validate config without starting
//! sweetspot-service --check
//! ```

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing::{error, info};

use sweetspot::config::{AppConfig, CONFIG_ENV_VAR};
use sweetspot::server::{init_tracing, ServerHandle, ServerOptions};

/// SweetSpot: nearby EV charging lots and car parks with driving routes.
#[derive(Parser, Debug)]
#[command(
    name = "sweetspot-service",
    version,
    about = "Nearby EV charging lots and car parks with driving routes",
    long_about = "REST API that returns EV charging lots and car parks near a searched \
                  location, each enriched with a driving route from the user.\n\n\
                  Default config: ~/.config/sweetspot/config.toml"
)]
struct Cli {
    /// Path to the configuration file (TOML).
    #[arg(short, long, env = CONFIG_ENV_VAR)]
    config: Option<PathBuf>,

    /// Override the REST API listen port.
    #[arg(long)]
    api_port: Option<u16>,

    /// Override the log level (trace, debug, info, warn, error).
    #[arg(short, long)]
    log_level: Option<String>,

    /// Validate the configuration file and exit without starting the server.
    #[arg(long)]
    check: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let config_path = cli.config.unwrap_or_else(sweetspot::default_config_path);

    let loaded = AppConfig::load(&config_path);
    let mut config = match &loaded {
        Ok(cfg) => cfg.clone(),
        Err(_) => AppConfig::default(),
    };

    if let Some(level) = &cli.log_level {
        config.logging.level = level.clone();
    }
    init_tracing(&config);

    match loaded {
        Ok(_) => info!("Configuration loaded from {}", config_path.display()),
        Err(e) => {
            if cli.check {
                error!("❌ Invalid configuration {}: {}", config_path.display(), e);
                return ExitCode::FAILURE;
            }
            error!("Failed to load config from {}: {}", config_path.display(), e);
            error!("Using default configuration.");
        }
    }

    if let Some(port) = cli.api_port {
        info!("CLI override: api_port = {}", port);
        config.server.api_port = port;
    }

    if cli.check {
        if let Err(e) = config.validate() {
            error!("❌ {}", e);
            return ExitCode::FAILURE;
        }
        println!("✅ Configuration is valid");
        println!("   Config file   : {}", config_path.display());
        println!("   API address   : {}", config.api_address());
        println!("   Routing base  : {}", config.routing.base_url);
        println!(
            "   Radii (km)    : final {} / pre-filter {}",
            config.search.final_radius_km, config.search.prefilter_radius_km
        );
        println!("   Worker cap    : {}", config.search.worker_cap);
        println!("   Log level     : {}", config.logging.level);
        return ExitCode::SUCCESS;
    }

    let handle = match ServerHandle::start(ServerOptions {
        config,
        ..ServerOptions::default()
    })
    .await
    {
        Ok(handle) => handle,
        Err(e) => {
            error!("Failed to start: {}", e);
            return ExitCode::FAILURE;
        }
    };

    handle.install_signal_handler();
    info!("🚀 Press Ctrl+C to shutdown gracefully.");

    handle.wait().await;
    ExitCode::SUCCESS
}
