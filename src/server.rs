//! HTTP surface: upload, ask, clear, and health routes over one pipeline.
//!
//! Pipeline calls block on provider HTTP round-trips, so handlers run them on
//! the blocking pool. Core errors are rendered here into `{"message": ...}`
//! bodies; the pipeline itself never turns failures into answer text.

use std::sync::Arc;

use anyhow::{Context, Result};
use axum::extract::{DefaultBodyLimit, Multipart, State};
use axum::http::{HeaderValue, StatusCode};
use axum::routing::{delete, get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use tower_http::cors::{AllowHeaders, AllowMethods, AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::error::RagError;
use crate::pipeline::RetrievalPipeline;

const PDF_CONTENT_TYPE: &str = "application/pdf";

/// Shared handler state.
#[derive(Clone)]
pub struct AppState {
    pipeline: Arc<RetrievalPipeline>,
}

impl AppState {
    /// Wraps a pipeline for use by the router.
    pub fn new(pipeline: Arc<RetrievalPipeline>) -> Self {
        Self { pipeline }
    }
}

/// Transport-level limits and CORS allow-list.
#[derive(Debug, Clone)]
pub struct ServerSettings {
    /// Origins allowed to call the API from a browser.
    pub allowed_origins: Vec<String>,
    /// Largest accepted request body in bytes.
    pub max_upload_bytes: usize,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            allowed_origins: vec!["http://localhost:3000".to_string()],
            max_upload_bytes: 32 * 1024 * 1024,
        }
    }
}

#[derive(Debug, Serialize)]
struct UploadResponse {
    message: String,
    filename: String,
    chunks: usize,
}

#[derive(Debug, Deserialize)]
struct QuestionRequest {
    question: String,
}

#[derive(Debug, Serialize)]
struct QuestionResponse {
    answer: String,
}

#[derive(Debug, Serialize)]
struct MessageBody {
    message: String,
}

#[derive(Debug, Serialize)]
struct HealthBody {
    status: &'static str,
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    message: String,
}

type ApiError = (StatusCode, Json<ErrorBody>);

/// Builds the application router.
pub fn router(state: AppState, settings: &ServerSettings) -> Result<Router> {
    let cors = cors_layer(&settings.allowed_origins)?;
    Ok(Router::new()
        .route("/upload", post(upload_handler))
        .route("/ask", post(ask_handler))
        .route("/clear", delete(clear_handler))
        .route("/health", get(health_handler))
        .layer(DefaultBodyLimit::max(settings.max_upload_bytes))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state))
}

fn cors_layer(origins: &[String]) -> Result<CorsLayer> {
    let origins = origins
        .iter()
        .map(|origin| {
            HeaderValue::from_str(origin.trim())
                .with_context(|| format!("invalid CORS origin {origin}"))
        })
        .collect::<Result<Vec<_>>>()?;
    Ok(CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods(AllowMethods::mirror_request())
        .allow_headers(AllowHeaders::mirror_request())
        .allow_credentials(true))
}

async fn upload_handler(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<UploadResponse>, ApiError> {
    let mut upload = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|err| bad_request(err.to_string()))?
    {
        if field.name() != Some("file") {
            continue;
        }
        let content_type = field.content_type().map(str::to_string);
        let filename = field.file_name().unwrap_or("upload.pdf").to_string();
        let data = field
            .bytes()
            .await
            .map_err(|err| bad_request(err.to_string()))?;
        upload = Some((content_type, filename, data));
        break;
    }

    let Some((content_type, filename, data)) = upload else {
        return Err(bad_request("missing multipart field 'file'"));
    };
    if content_type.as_deref() != Some(PDF_CONTENT_TYPE) {
        return Err(bad_request("File must be a PDF"));
    }
    if data.is_empty() {
        return Err(bad_request("Empty file"));
    }

    let pipeline = Arc::clone(&state.pipeline);
    let chunks = tokio::task::spawn_blocking(move || pipeline.ingest(&data))
        .await
        .map_err(|err| internal_error(format!("ingest task join error: {err}")))?
        .map_err(|err| {
            tracing::error!(error = %err, filename = %filename, "error processing PDF");
            rag_error("Error processing PDF", err)
        })?;

    tracing::info!(filename = %filename, chunks, "successfully processed PDF");
    Ok(Json(UploadResponse {
        message: format!("PDF processed successfully. Created {chunks} chunks."),
        filename,
        chunks,
    }))
}

async fn ask_handler(
    State(state): State<AppState>,
    Json(request): Json<QuestionRequest>,
) -> Result<Json<QuestionResponse>, ApiError> {
    if request.question.trim().is_empty() {
        return Err(bad_request("Question cannot be empty"));
    }
    let preview: String = request.question.chars().take(50).collect();
    tracing::info!(question = %preview, "answering question");

    let pipeline = Arc::clone(&state.pipeline);
    let answer = tokio::task::spawn_blocking(move || pipeline.answer(&request.question))
        .await
        .map_err(|err| internal_error(format!("answer task join error: {err}")))?
        .map_err(|err| {
            tracing::error!(error = %err, "error answering question");
            rag_error("Error processing question", err)
        })?;
    Ok(Json(QuestionResponse { answer }))
}

async fn clear_handler(State(state): State<AppState>) -> Json<MessageBody> {
    state.pipeline.clear();
    Json(MessageBody {
        message: "Database cleared successfully".to_string(),
    })
}

async fn health_handler() -> Json<HealthBody> {
    Json(HealthBody { status: "healthy" })
}

/// Maps the core taxonomy onto HTTP statuses.
fn status_for(err: &RagError) -> StatusCode {
    match err {
        RagError::EmptyInput
        | RagError::EmptyQuestion
        | RagError::NoContent
        | RagError::Extraction(_) => StatusCode::BAD_REQUEST,
        RagError::Embedding(_) | RagError::Generation(_) => StatusCode::BAD_GATEWAY,
        RagError::DimensionMismatch { .. } | RagError::Configuration(_) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

fn rag_error(prefix: &str, err: RagError) -> ApiError {
    (
        status_for(&err),
        Json(ErrorBody {
            message: format!("{prefix}: {err}"),
        }),
    )
}

fn bad_request(message: impl Into<String>) -> ApiError {
    (
        StatusCode::BAD_REQUEST,
        Json(ErrorBody {
            message: message.into(),
        }),
    )
}

fn internal_error(message: impl Into<String>) -> ApiError {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ErrorBody {
            message: message.into(),
        }),
    )
}
