//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create the Axum Router with the proxy handler
//! - Wire up middleware (request ID, tracing, body limit)
//! - Bind server to listener
//! - Swap in reloaded configuration
//! - Stop on the shutdown signal

use std::sync::Arc;

use arc_swap::ArcSwap;
use axum::extract::DefaultBodyLimit;
use axum::routing::any;
use axum::Router;
use tokio::net::TcpListener;
use tokio::sync::{broadcast, mpsc};
use tower::ServiceBuilder;
use tower_http::request_id::{PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::TraceLayer;

use crate::config::ProxyConfig;
use crate::http::handler::proxy_handler;
use crate::http::request::{MakeRequestUuidV4, X_REQUEST_ID};
use crate::observability::tracing::make_request_span;
use crate::upstream::UpstreamClient;

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    /// Current configuration; replaced wholesale on reload.
    pub config: Arc<ArcSwap<ProxyConfig>>,
    pub upstream: UpstreamClient,
}

impl AppState {
    pub fn new(config: ProxyConfig) -> Self {
        Self::with_upstream(config, UpstreamClient::default())
    }

    pub fn with_upstream(config: ProxyConfig, upstream: UpstreamClient) -> Self {
        Self {
            config: Arc::new(ArcSwap::from_pointee(config)),
            upstream,
        }
    }
}

/// Build the Axum router with all middleware layers.
///
/// The route and body limit are fixed here; changing them needs a restart.
pub fn build_router(state: AppState, config: &ProxyConfig) -> Router {
    Router::new()
        .route(&config.listener.route, any(proxy_handler))
        .with_state(state)
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::new(X_REQUEST_ID, MakeRequestUuidV4))
                .layer(TraceLayer::new_for_http().make_span_with(make_request_span))
                .layer(PropagateRequestIdLayer::new(X_REQUEST_ID))
                .layer(DefaultBodyLimit::max(config.security.max_body_size)),
        )
}

/// HTTP server for the proxy.
pub struct HttpServer {
    router: Router,
    state: AppState,
}

impl HttpServer {
    /// Create a new HTTP server with the given configuration.
    pub fn new(config: ProxyConfig) -> Self {
        Self::with_state(AppState::new(config))
    }

    pub fn with_state(state: AppState) -> Self {
        let config = state.config.load_full();
        let router = build_router(state.clone(), &config);
        Self { router, state }
    }

    /// Run the server until `shutdown` fires.
    ///
    /// Configs received on `config_updates` replace the live config; the next
    /// request sees them.
    pub async fn run(
        self,
        listener: TcpListener,
        mut config_updates: mpsc::UnboundedReceiver<ProxyConfig>,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        let live = self.state.config.clone();
        tokio::spawn(async move {
            while let Some(new_config) = config_updates.recv().await {
                let current = live.load();
                if new_config.listener.route != current.listener.route
                    || new_config.listener.bind_address != current.listener.bind_address
                    || new_config.security.max_body_size != current.security.max_body_size
                {
                    tracing::warn!("Listener and body limit changes take effect after restart");
                }
                live.store(Arc::new(new_config));
                tracing::info!("Configuration reloaded");
            }
        });

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("Shutdown signal received");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }
}
