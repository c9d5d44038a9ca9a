use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use anyhow::Context;
use axum::{
    Json, Router,
    body::Bytes,
    extract::{Query, State},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::get,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;

use crate::openfoodfacts::OpenFoodFactsClient;
use intake_core::openfoodfacts::FoodCandidate;

const BODY_LIMIT: usize = 5 * 1024 * 1024; // 5 MB

#[derive(Clone)]
struct AppState {
    document: Arc<Mutex<DocumentFile>>,
    off: Arc<OpenFoodFactsClient>,
}

/// The history document on disk. The server treats it as an opaque blob;
/// the schema belongs to the core library and the clients that embed it.
struct DocumentFile {
    path: PathBuf,
}

impl DocumentFile {
    /// The raw document. A file that was never written, or was left empty,
    /// reads as `{}`.
    fn read(&self) -> anyhow::Result<String> {
        if !self.path.exists() {
            return Ok("{}".to_string());
        }
        let raw = std::fs::read_to_string(&self.path)
            .with_context(|| format!("Failed to read {}", self.path.display()))?;
        if raw.trim().is_empty() {
            return Ok("{}".to_string());
        }
        Ok(raw)
    }

    fn write(&self, value: &serde_json::Value) -> anyhow::Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).with_context(|| {
                    format!("Failed to create data directory: {}", parent.display())
                })?;
            }
        }
        let pretty =
            serde_json::to_string_pretty(value).context("Failed to serialize document")?;
        std::fs::write(&self.path, pretty)
            .with_context(|| format!("Failed to write {}", self.path.display()))
    }
}

// --- Request / Response types ---

#[derive(Deserialize)]
struct SearchQuery {
    q: String,
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

// --- Error handling ---

enum ApiError {
    BadRequest(String),
    Upstream(anyhow::Error),
    Internal(anyhow::Error),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            Self::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            Self::Upstream(err) => {
                tracing::warn!("upstream lookup failed: {err:#}");
                (
                    StatusCode::BAD_GATEWAY,
                    "Food lookup unavailable".to_string(),
                )
            }
            Self::Internal(err) => {
                tracing::error!("internal server error: {err:#}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
        };
        (status, Json(ErrorResponse { error: message })).into_response()
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(err: anyhow::Error) -> Self {
        Self::Internal(err)
    }
}

// --- Handlers ---

async fn get_history(State(state): State<AppState>) -> Result<Response, ApiError> {
    let raw = {
        let document = state
            .document
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        document.read().context("failed to read history document")?
    };
    Ok((
        StatusCode::OK,
        [(header::CONTENT_TYPE, "application/json")],
        raw,
    )
        .into_response())
}

async fn save_history(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<serde_json::Value>, ApiError> {
    let value: serde_json::Value = serde_json::from_slice(&body)
        .map_err(|_| ApiError::BadRequest("Invalid JSON".to_string()))?;
    // A bare null is not a document
    if value.is_null() {
        return Err(ApiError::BadRequest("Invalid JSON".to_string()));
    }

    let document = state
        .document
        .lock()
        .unwrap_or_else(std::sync::PoisonError::into_inner);
    document
        .write(&value)
        .context("failed to write history document")?;

    Ok(Json(json!({"status": "saved"})))
}

async fn search_foods(
    State(state): State<AppState>,
    Query(params): Query<SearchQuery>,
) -> Result<Json<Vec<FoodCandidate>>, ApiError> {
    let query = params.q.trim();
    if query.is_empty() {
        return Err(ApiError::BadRequest("q must not be empty".to_string()));
    }

    let candidates = state.off.search(query).await.map_err(ApiError::Upstream)?;

    Ok(Json(candidates))
}

fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/api/history", get(get_history).post(save_history))
        .route("/api/foods/search", get(search_foods))
        .layer(RequestBodyLimitLayer::new(BODY_LIMIT))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

// --- Server startup ---

pub async fn start_server(history_path: PathBuf, port: u16, bind: &str) -> anyhow::Result<()> {
    let state = AppState {
        document: Arc::new(Mutex::new(DocumentFile { path: history_path })),
        off: Arc::new(OpenFoodFactsClient::new()),
    };

    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(format!("{bind}:{port}"))
        .await
        .with_context(|| format!("Failed to bind {bind}:{port}"))?;
    tracing::info!("listening on http://{bind}:{port}");
    axum::serve(listener, app).await?;

    Ok(())
}
