use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};
use parking_lot::RwLock;
use serde::Serialize;
use tracing::{info, warn};

pub const KEEP_ALIVE_INTERVAL: Duration = Duration::from_secs(600);
pub const KEEP_ALIVE_TIMEOUT: Duration = Duration::from_secs(10);
const KEEP_ALIVE_BACKOFF: Duration = Duration::from_secs(60);

/// Live bot facts shared between the gateway handler and the HTTP surface.
#[derive(Debug, Default)]
pub struct StatusBoard {
    bot_name: RwLock<Option<String>>,
    guilds: AtomicUsize,
    latency_ms: RwLock<Option<u64>>,
    ready: AtomicBool,
}

impl StatusBoard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mark_ready(&self, bot_name: &str, guilds: usize) {
        *self.bot_name.write() = Some(bot_name.to_string());
        self.guilds.store(guilds, Ordering::Relaxed);
        self.ready.store(true, Ordering::Release);
    }

    pub fn set_guilds(&self, guilds: usize) {
        self.guilds.store(guilds, Ordering::Relaxed);
    }

    pub fn set_latency(&self, latency: Option<Duration>) {
        *self.latency_ms.write() = latency.map(|l| l.as_millis() as u64);
    }

    pub fn is_ready(&self) -> bool {
        self.ready.load(Ordering::Acquire)
    }

    pub fn guilds(&self) -> usize {
        self.guilds.load(Ordering::Relaxed)
    }

    pub fn latency_ms(&self) -> Option<u64> {
        *self.latency_ms.read()
    }

    pub fn bot_label(&self) -> String {
        if !self.is_ready() {
            return "connecting".to_string();
        }
        self.bot_name
            .read()
            .clone()
            .unwrap_or_else(|| "connecting".to_string())
    }
}

#[derive(Debug, Serialize)]
struct StatusResponse {
    status: &'static str,
    bot: String,
    guilds: usize,
    latency_ms: Option<u64>,
    timestamp: String,
}

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
    ready: bool,
}

async fn status(State(board): State<Arc<StatusBoard>>) -> Json<StatusResponse> {
    Json(StatusResponse {
        status: "online",
        bot: board.bot_label(),
        guilds: board.guilds(),
        latency_ms: board.latency_ms(),
        timestamp: chrono::Utc::now().to_rfc3339(),
    })
}

async fn health(State(board): State<Arc<StatusBoard>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        ready: board.is_ready(),
    })
}

pub fn router(board: Arc<StatusBoard>) -> Router {
    Router::new()
        .route("/", get(status))
        .route("/health", get(health))
        .with_state(board)
}

/// Binds `0.0.0.0:{port}` and serves until the process exits.
pub async fn serve(port: u16, board: Arc<StatusBoard>) -> std::io::Result<()> {
    let listener = tokio::net::TcpListener::bind(("0.0.0.0", port)).await?;
    info!("Health server listening on {}", listener.local_addr()?);
    axum::serve(listener, router(board)).await
}

pub async fn ping_once(
    http: &reqwest::Client,
    base_url: &str,
) -> Result<reqwest::StatusCode, reqwest::Error> {
    let url = format!("{}/health", base_url.trim_end_matches('/'));
    let resp = http.get(url).timeout(KEEP_ALIVE_TIMEOUT).send().await?;
    Ok(resp.status())
}

/// Pings our own public URL so the hosting platform does not idle us out.
pub async fn keep_alive(http: reqwest::Client, base_url: String) {
    info!("Keep-alive enabled for {base_url}");
    loop {
        tokio::time::sleep(KEEP_ALIVE_INTERVAL).await;
        match ping_once(&http, &base_url).await {
            Ok(status) => info!("Keep-alive ping: {status}"),
            Err(e) => {
                warn!("Keep-alive ping failed: {e}");
                tokio::time::sleep(KEEP_ALIVE_BACKOFF).await;
            }
        }
    }
}
