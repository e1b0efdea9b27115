//! HTTP front-end: upload a CSV, get it back with distances attached.
//!
//! | Method | Path              | Description                                  |
//! |--------|-------------------|----------------------------------------------|
//! | GET    | `/`               | Upload form                                  |
//! | GET    | `/health`         | Health check                                 |
//! | POST   | `/api/distances`  | Multipart `file`, `units`, `pause` → CSV     |

use crate::config::{pause_duration, DEFAULT_PAUSE_SECONDS};
use crate::core::emitter::{OUTPUT_FILENAME, OUTPUT_MEDIA_TYPE};
use crate::core::pipeline::enrich_bytes;
use crate::domain::model::Units;
use crate::domain::ports::DistanceLookup;
use crate::utils::error::{EtlError, Result};
use crate::utils::validation::validate_pause;
use axum::{
    extract::{DefaultBodyLimit, Multipart, State},
    http::{header, HeaderName, StatusCode},
    response::{Html, IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use serde_json::{json, Value};
use std::net::SocketAddr;
use std::sync::Arc;

pub const MAX_UPLOAD_BYTES: usize = 50 * 1024 * 1024;

pub const ROWS_TOTAL_HEADER: HeaderName = HeaderName::from_static("x-rows-total");
pub const ROWS_SUCCEEDED_HEADER: HeaderName = HeaderName::from_static("x-rows-succeeded");

const INDEX_HTML: &str = r#"<!doctype html>
<html lang="en">
<head><meta charset="utf-8"><title>Drive Time &amp; Distance</title></head>
<body>
<h1>Drive Time &amp; Distance</h1>
<p>Upload a CSV with <code>origin</code> and <code>destination</code> columns.
Other columns are preserved in the output.</p>
<form action="/api/distances" method="post" enctype="multipart/form-data">
  <p><input type="file" name="file" accept=".csv,text/csv" required></p>
  <p><label>Units
    <select name="units">
      <option value="imperial" selected>imperial</option>
      <option value="metric">metric</option>
    </select></label></p>
  <p><label>Pause between requests (seconds)
    <input type="number" name="pause" min="0" max="2" step="0.1" value="0.1"></label></p>
  <p><button type="submit">Run Distance Lookup</button></p>
</form>
<p><small>Be mindful of API quotas. Consider batching larger files and adding pauses.</small></p>
</body>
</html>
"#;

#[derive(Clone)]
pub struct AppState {
    lookup: Arc<dyn DistanceLookup>,
}

/// JSON error body with an HTTP status.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }
}

impl From<EtlError> for ApiError {
    fn from(err: EtlError) -> Self {
        let status = if err.is_client_error() {
            StatusCode::BAD_REQUEST
        } else {
            StatusCode::INTERNAL_SERVER_ERROR
        };
        Self {
            status,
            message: err.user_friendly_message(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (
            self.status,
            Json(json!({ "error": self.message, "success": false })),
        )
            .into_response()
    }
}

pub fn router(lookup: Arc<dyn DistanceLookup>) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/health", get(health))
        .route("/api/distances", post(upload_csv))
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        .with_state(AppState { lookup })
}

pub async fn start_server(port: u16, lookup: Arc<dyn DistanceLookup>) -> Result<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = tokio::net::TcpListener::bind(addr).await?;

    tracing::info!("🚀 Server running on http://localhost:{}", port);
    tracing::info!("   POST /api/distances - Upload CSV file");
    tracing::info!("   GET  /health        - Health check");

    axum::serve(listener, router(lookup))
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
    }
    tracing::info!("Shutting down");
}

async fn index() -> Html<&'static str> {
    Html(INDEX_HTML)
}

async fn health() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "service": "drivetime-etl",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

async fn upload_csv(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> std::result::Result<Response, ApiError> {
    let mut file_data: Option<Vec<u8>> = None;
    let mut file_name: Option<String> = None;
    let mut units = Units::default();
    let mut pause = DEFAULT_PAUSE_SECONDS;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::bad_request(format!("Multipart error: {}", e)))?
    {
        let name = field.name().unwrap_or("").to_string();
        match name.as_str() {
            "file" => {
                file_name = field.file_name().map(str::to_string);
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| ApiError::bad_request(format!("Read error: {}", e)))?;
                file_data = Some(bytes.to_vec());
            }
            "units" => {
                let text = field
                    .text()
                    .await
                    .map_err(|e| ApiError::bad_request(format!("Read error: {}", e)))?;
                units = text.parse().map_err(ApiError::bad_request)?;
            }
            "pause" => {
                let text = field
                    .text()
                    .await
                    .map_err(|e| ApiError::bad_request(format!("Read error: {}", e)))?;
                // 清空的輸入框會送出空字串
                let text = text.trim();
                if !text.is_empty() {
                    pause = text.parse().map_err(|_| {
                        ApiError::bad_request(format!("pause must be a number, got '{}'", text))
                    })?;
                }
            }
            _ => {}
        }
    }

    // 瀏覽器未選檔案時會送出空的 file 欄位
    let bytes = match file_data {
        Some(bytes) if !bytes.is_empty() || file_name.as_deref().is_some_and(|n| !n.is_empty()) => {
            bytes
        }
        _ => return Err(ApiError::bad_request("Please upload a CSV first.")),
    };
    validate_pause("pause", pause)?;

    tracing::info!(
        "📄 New upload: {} ({} bytes, units: {}, pause: {}s)",
        file_name.as_deref().unwrap_or("unknown"),
        bytes.len(),
        units,
        pause
    );

    let enriched = enrich_bytes(
        &bytes,
        b',',
        state.lookup.as_ref(),
        units,
        pause_duration(pause),
    )
    .await
    .inspect_err(|e| tracing::warn!("❌ Upload rejected: {}", e))?;

    tracing::info!(
        "📊 Done: {} rows, {} OK, {} failed",
        enriched.summary.total,
        enriched.summary.succeeded,
        enriched.summary.failed
    );

    let headers = [
        (header::CONTENT_TYPE, format!("{}; charset=utf-8", OUTPUT_MEDIA_TYPE)),
        (
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{}\"", OUTPUT_FILENAME),
        ),
        (ROWS_TOTAL_HEADER, enriched.summary.total.to_string()),
        (ROWS_SUCCEEDED_HEADER, enriched.summary.succeeded.to_string()),
    ];

    Ok((headers, enriched.bytes).into_response())
}
