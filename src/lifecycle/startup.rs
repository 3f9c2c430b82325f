//! Startup orchestration.
//!
//! # Responsibilities
//! - Load and validate configuration (file or environment)
//! - Initialize logging and metrics
//! - Start the config watcher when running from a file
//! - Bind the listener and serve until a termination signal
//!
//! # Design Decisions
//! - Fail fast: a bad config or bind error is fatal
//! - A missing API key is only a warning; requests get a 500 until one is set

use std::net::SocketAddr;
use std::path::PathBuf;

use tokio::net::TcpListener;
use tokio::sync::mpsc;

use crate::config::loader::{self, ENV_API_KEY};
use crate::config::watcher::ConfigWatcher;
use crate::config::ProxyConfig;
use crate::http::HttpServer;
use crate::lifecycle::{signals, Shutdown};
use crate::observability::{logging, metrics};

/// Options resolved from the command line.
#[derive(Debug, Clone, Default)]
pub struct StartupOptions {
    pub config_path: Option<PathBuf>,
    pub bind_override: Option<String>,
}

/// Load the config and apply command-line overrides. Also used for every
/// file-triggered reload so overrides survive.
pub fn load(options: &StartupOptions) -> Result<ProxyConfig, loader::ConfigError> {
    let mut config = match &options.config_path {
        Some(path) => loader::load_config(path)?,
        None => loader::from_env()?,
    };
    if let Some(bind) = &options.bind_override {
        config.listener.bind_address = bind.clone();
    }
    Ok(config)
}

pub async fn run(options: StartupOptions) -> Result<(), Box<dyn std::error::Error>> {
    let config = load(&options)?;

    logging::init(&config.observability.log_level);
    tracing::info!("genai-proxy v{} starting", env!("CARGO_PKG_VERSION"));

    if config.credential.api_key.is_none() {
        tracing::warn!(env = ENV_API_KEY, "No API key configured; POST requests will fail with 500");
    }

    tracing::info!(
        bind_address = %config.listener.bind_address,
        route = %config.listener.route,
        upstream = %config.upstream.endpoint,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        let addr: SocketAddr = config.observability.metrics_address.parse()?;
        metrics::init_metrics(addr);
    }

    // The watcher handle must outlive the server.
    let (config_updates, _watcher) = match &options.config_path {
        Some(path) => {
            let reload_options = options.clone();
            let (watcher, updates) = ConfigWatcher::new(path, move || load(&reload_options));
            (updates, Some(watcher.run()?))
        }
        None => {
            let (_, updates) = mpsc::unbounded_channel();
            (updates, None)
        }
    };

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let shutdown = Shutdown::new();
    tokio::spawn(signals::trigger_on_signal(shutdown.clone()));

    let server = HttpServer::new(config);
    server.run(listener, config_updates, shutdown.subscribe()).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
