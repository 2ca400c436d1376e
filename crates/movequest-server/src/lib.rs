//! HTTP ingest and snapshot server for MoveQuest wearables.
//!
//! The wearable POSTs one reading at a time to `/api/step-data`; dashboards
//! and other consumers GET `/api/data` for a copy of the recent history.
//! All handlers share one [`TelemetryBuffer`] owned by the server's state.

use std::sync::Arc;
use std::time::Duration;

use axum::{
    Router,
    body::Bytes,
    extract::State,
    http::StatusCode,
    response::Json,
    routing::{get, post},
};
use serde::Serialize;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tower_http::cors::CorsLayer;
use tower_http::timeout::TimeoutLayer;

use movequest_core::{IngestPayload, Snapshot, TelemetryBuffer, unix_now_secs};

/// Listener and request settings.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Upper bound on handling a single request, body upload included.
    pub request_timeout: Duration,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 5000,
            request_timeout: Duration::from_secs(5),
        }
    }
}

/// Shared server state.
struct AppState {
    buffer: Arc<TelemetryBuffer>,
}

#[derive(Debug, Serialize)]
struct IngestResponse {
    status: &'static str,
    /// Error message if the payload was refused.
    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<String>,
}

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
    samples: usize,
    capacity: usize,
    total_received: u64,
    evicted: u64,
}

async fn handle_ingest(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> (StatusCode, Json<IngestResponse>) {
    let payload = match IngestPayload::parse(&body) {
        Ok(p) => p,
        Err(e) => {
            log::warn!("rejected step data: {e}");
            return (
                StatusCode::BAD_REQUEST,
                Json(IngestResponse {
                    status: "error",
                    message: Some(e.to_string()),
                }),
            );
        }
    };

    let sample = payload.into_sample(unix_now_secs());
    state.buffer.append(sample);
    log::info!(
        "steps: {}, raw: {:.2}, filtered: {:.2}",
        sample.step_count,
        sample.raw_magnitude,
        sample.filtered_magnitude
    );

    (
        StatusCode::OK,
        Json(IngestResponse {
            status: "success",
            message: None,
        }),
    )
}

async fn handle_data(State(state): State<Arc<AppState>>) -> Json<Snapshot> {
    Json(state.buffer.snapshot())
}

async fn handle_health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    let stats = state.buffer.stats();
    Json(HealthResponse {
        status: "ok",
        samples: stats.len,
        capacity: stats.capacity,
        total_received: stats.total_appended,
        evicted: stats.evicted,
    })
}

async fn handle_index(State(state): State<Arc<AppState>>) -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "name": "MoveQuest Receiver",
        "version": movequest_core::VERSION,
        "capacity": state.buffer.capacity(),
        "endpoints": {
            "/": "This API index",
            "/api/step-data": {
                "method": "POST",
                "description": "Submit one reading from the wearable",
                "body": {
                    "timestamp": "Seconds (number, default: server arrival time)",
                    "steps": "Step count (non-negative integer, default: 0)",
                    "raw_magnitude": "Raw acceleration magnitude in g (number, default: 0)",
                    "filtered_magnitude": "Filtered magnitude in g (number, default: 0)",
                }
            },
            "/api/data": "Recent history as four same-length arrays",
            "/health": "Buffer fill and counters",
        }
    }))
}

/// Build the axum router around an existing buffer.
pub fn build_router(buffer: Arc<TelemetryBuffer>, request_timeout: Duration) -> Router {
    let state = Arc::new(AppState { buffer });

    Router::new()
        .route("/", get(handle_index))
        .route("/api/step-data", post(handle_ingest))
        .route("/api/data", get(handle_data))
        .route("/health", get(handle_health))
        .with_state(state)
        .layer(TimeoutLayer::new(request_timeout))
        .layer(CorsLayer::permissive())
}

/// Bind the configured address.
pub async fn bind(config: &ServerConfig) -> std::io::Result<TcpListener> {
    let addr = format!("{}:{}", config.host, config.port);
    TcpListener::bind(&addr).await
}

/// Serve on an already-bound listener until `shutdown` is cancelled, then
/// drain in-flight requests.
pub async fn serve(
    listener: TcpListener,
    buffer: Arc<TelemetryBuffer>,
    request_timeout: Duration,
    shutdown: CancellationToken,
) -> std::io::Result<()> {
    log::info!("listening on http://{}", listener.local_addr()?);
    let app = build_router(buffer, request_timeout);

    axum::serve(listener, app)
        .with_graceful_shutdown(async move { shutdown.cancelled().await })
        .await
}

/// Bind and serve in one step.
pub async fn run_server(
    buffer: Arc<TelemetryBuffer>,
    config: &ServerConfig,
    shutdown: CancellationToken,
) -> std::io::Result<()> {
    let listener = bind(config).await?;
    serve(listener, buffer, config.request_timeout, shutdown).await
}
