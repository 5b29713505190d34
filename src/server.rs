//! Browser front end for the file viewer (`tidy serve`).
//!
//! Every request ingests and renders its own batch; the server keeps no
//! per-user state between requests.
//!
//! # Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `GET`  | `/` | Upload form and folder form |
//! | `POST` | `/upload` | Multipart upload (`files` fields) → results page |
//! | `POST` | `/folder` | Form field `path` → results page |
//! | `GET`  | `/health` | Health check (returns version) |
//!
//! The forms post back to the same origin, so no CORS headers are sent:
//! other sites may submit to `/folder` but cannot read the response.
//!
//! Errors render as HTML pages: `400` for an empty or unusable folder path
//! or a malformed upload, `500` for anything else.

use std::path::PathBuf;
use std::sync::Arc;

use axum::{
    extract::{DefaultBodyLimit, Form, Multipart, State},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};

use crate::config::Config;
use crate::error::TidyError;
use crate::ingest::{self, IngestOptions};
use crate::models::Upload;
use crate::present::{self, PresentOptions};
use crate::progress::NoProgress;

/// Request body cap for uploads.
const UPLOAD_LIMIT_BYTES: usize = 256 * 1024 * 1024;

#[derive(Clone)]
struct AppState {
    ingest: Arc<IngestOptions>,
    present: Arc<PresentOptions>,
}

/// Routes for the viewer, without binding a socket.
pub fn router(config: &Config) -> Router {
    let state = AppState {
        ingest: Arc::new(IngestOptions::from_config(&config.viewer)),
        present: Arc::new(PresentOptions::from_config(&config.viewer)),
    };

    Router::new()
        .route("/", get(handle_index))
        .route("/upload", post(handle_upload))
        .route("/folder", post(handle_folder))
        .route("/health", get(handle_health))
        .layer(DefaultBodyLimit::max(UPLOAD_LIMIT_BYTES))
        .with_state(state)
}

/// Binds `[server].bind` and serves until the process is terminated.
pub async fn run_server(config: &Config) -> anyhow::Result<()> {
    let bind_addr = config.server.bind.clone();
    let app = router(config);

    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    println!("File viewer listening on http://{}", bind_addr);
    tracing::info!(bind = %bind_addr, "viewer server started");

    axum::serve(listener, app).await?;
    Ok(())
}

// ============ Error response ============

struct AppError {
    status: StatusCode,
    message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let page = present::render_error("File Contents Viewer", &self.message);
        (self.status, Html(page)).into_response()
    }
}

fn bad_request(message: impl Into<String>) -> AppError {
    AppError {
        status: StatusCode::BAD_REQUEST,
        message: message.into(),
    }
}

fn internal(message: impl Into<String>) -> AppError {
    AppError {
        status: StatusCode::INTERNAL_SERVER_ERROR,
        message: message.into(),
    }
}

// ============ GET /health ============

#[derive(Serialize)]
struct HealthResponse {
    status: String,
    version: String,
}

async fn handle_health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

// ============ GET / ============

async fn handle_index(State(state): State<AppState>) -> Html<String> {
    Html(present::render_index(&state.present.title))
}

// ============ POST /upload ============

async fn handle_upload(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Html<String>, AppError> {
    let mut uploads = Vec::new();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| bad_request(format!("malformed upload: {}", e)))?
    {
        let Some(name) = field.file_name().map(str::to_string) else {
            continue;
        };
        let bytes = field
            .bytes()
            .await
            .map_err(|e| bad_request(format!("malformed upload: {}", e)))?;

        // Browsers send one empty, unnamed part when no file is chosen.
        if name.is_empty() && bytes.is_empty() {
            continue;
        }
        uploads.push(Upload {
            name,
            bytes: bytes.to_vec(),
        });
    }

    tracing::debug!(files = uploads.len(), "upload received");
    let batch = ingest::ingest_uploads(uploads, &NoProgress);
    Ok(Html(present::render_html(&batch, &state.present)))
}

// ============ POST /folder ============

#[derive(Deserialize)]
struct FolderForm {
    path: String,
}

async fn handle_folder(
    State(state): State<AppState>,
    Form(form): Form<FolderForm>,
) -> Result<Html<String>, AppError> {
    let path = form.path.trim();
    if path.is_empty() {
        return Err(bad_request("folder path must not be empty"));
    }

    let root = PathBuf::from(path);
    let options = state.ingest.clone();
    let batch =
        tokio::task::spawn_blocking(move || ingest::ingest_folder(&root, &options, &NoProgress))
            .await
            .map_err(|e| internal(format!("folder read task failed: {}", e)))?
            .map_err(|e| match e.downcast_ref::<TidyError>() {
                Some(TidyError::FolderUnavailable(_) | TidyError::FolderUnreadable { .. }) => {
                    bad_request(e.to_string())
                }
                _ => internal(format!("{:#}", e)),
            })?;

    Ok(Html(present::render_html(&batch, &state.present)))
}
