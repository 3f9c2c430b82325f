//! Shared utilities for integration tests.

use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use axum::routing::post;
use axum::Router;
use tokio::net::TcpListener;
use tokio::sync::mpsc;

use genai_proxy::http::{AppState, HttpServer};
use genai_proxy::upstream::UpstreamClient;
use genai_proxy::{ProxyConfig, Shutdown};

/// What the mock upstream received on its last call.
#[derive(Clone, Default)]
pub struct Seen {
    pub body: Arc<Mutex<Option<String>>>,
    pub query: Arc<Mutex<Option<String>>>,
}

#[allow(dead_code)]
impl Seen {
    pub fn body(&self) -> Option<String> {
        self.body.lock().unwrap().clone()
    }

    pub fn query(&self) -> Option<String> {
        self.query.lock().unwrap().clone()
    }
}

/// Start a mock upstream on a random port answering every POST to
/// `/generate` with a fixed status and raw body. Returns its endpoint URL.
pub async fn start_mock_upstream(status: u16, body: &'static str) -> (String, Seen) {
    let seen = Seen::default();
    let recorder = seen.clone();
    let status = StatusCode::from_u16(status).unwrap();

    let app = Router::new().route(
        "/generate",
        post(move |request: Request<Body>| {
            let recorder = recorder.clone();
            async move {
                *recorder.query.lock().unwrap() = request.uri().query().map(str::to_string);
                let bytes = to_bytes(request.into_body(), usize::MAX).await.unwrap();
                *recorder.body.lock().unwrap() = Some(String::from_utf8(bytes.to_vec()).unwrap());
                (status, [("content-type", "application/json")], body)
            }
        }),
    );

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });

    (format!("http://{}/generate", addr), seen)
}

/// A running proxy plus the handles needed to drive it.
#[allow(dead_code)]
pub struct RunningProxy {
    pub addr: SocketAddr,
    pub shutdown: Shutdown,
    pub config_tx: mpsc::UnboundedSender<ProxyConfig>,
    pub server: tokio::task::JoinHandle<Result<(), std::io::Error>>,
}

#[allow(dead_code)]
impl RunningProxy {
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }
}

pub async fn start_proxy(config: ProxyConfig) -> RunningProxy {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let upstream = UpstreamClient::new(test_client());
    let server = HttpServer::with_state(AppState::with_upstream(config, upstream));

    let shutdown = Shutdown::new();
    let (config_tx, config_updates) = mpsc::unbounded_channel();
    let server_shutdown = shutdown.subscribe();
    let server = tokio::spawn(async move { server.run(listener, config_updates, server_shutdown).await });

    RunningProxy {
        addr,
        shutdown,
        config_tx,
        server,
    }
}

/// Client that ignores proxy environment variables.
pub fn test_client() -> reqwest::Client {
    reqwest::Client::builder()
        .pool_max_idle_per_host(0)
        .no_proxy()
        .build()
        .unwrap()
}
