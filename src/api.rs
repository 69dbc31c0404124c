//! HTTP surface for docflow.
//!
//! This module exposes a compact Axum router with a handful of endpoints:
//!
//! - `POST /process-document` – Accept a multipart file upload, run the full pipeline
//!   (OCR extraction, summarization, index construction), and cache the result under a
//!   fresh document identifier.
//! - `GET /summaries` – Summarize raw text or a previously processed document at a
//!   caller-chosen granularity (`type`, default `short`).
//! - `GET /metrics` – Observe pipeline counters.
//! - `GET /health` – Liveness probe.
//!
//! Errors always map to a non-2xx status with a uniform `{"error": message}` body.

use crate::pipeline::{PipelineApi, SummaryError, SummaryRequest, WorkflowError};
use crate::summarization::SummaryType;
use axum::{
    Json, Router,
    extract::{Multipart, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;

/// Build the HTTP router exposing the document pipeline.
pub fn create_router<S>(service: Arc<S>) -> Router
where
    S: PipelineApi + 'static,
{
    Router::new()
        .route("/process-document", post(process_document::<S>))
        .route("/summaries", get(get_summary::<S>))
        .route("/metrics", get(get_metrics::<S>))
        .route("/health", get(health))
        .with_state(service)
}

/// Success response for `POST /process-document`.
#[derive(Serialize)]
struct ProcessDocumentResponse {
    success: bool,
    /// Identifier for later `GET /summaries?document_id=` lookups.
    document_id: String,
    filename: String,
    summary: String,
    faiss_index_path: String,
}

/// Run the full processing pipeline for one uploaded file.
///
/// The upload is expected as a multipart field named `file`; any other fields are
/// ignored. The original filename is carried through to the response and recorded on
/// every index chunk.
async fn process_document<S>(
    State(service): State<Arc<S>>,
    mut multipart: Multipart,
) -> Result<Json<ProcessDocumentResponse>, AppError>
where
    S: PipelineApi,
{
    let mut upload: Option<(String, Vec<u8>)> = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|error| AppError::BadRequest(format!("invalid multipart body: {error}")))?
    {
        if field.name() != Some("file") {
            continue;
        }
        let filename = field
            .file_name()
            .map(|name| name.to_string())
            .unwrap_or_else(|| "upload".to_string());
        let bytes = field
            .bytes()
            .await
            .map_err(|error| AppError::BadRequest(format!("failed to read upload: {error}")))?;
        upload = Some((filename, bytes.to_vec()));
        break;
    }

    let (filename, bytes) =
        upload.ok_or_else(|| AppError::BadRequest("no file provided".to_string()))?;

    let outcome = service.process_document(&filename, bytes).await?;
    tracing::info!(
        filename = outcome.filename,
        document_id = %outcome.document_id,
        "Process request completed"
    );
    Ok(Json(ProcessDocumentResponse {
        success: true,
        document_id: outcome.document_id.to_string(),
        filename: outcome.filename,
        summary: outcome.summary,
        faiss_index_path: outcome.index_path,
    }))
}

/// Query parameters for `GET /summaries`.
#[derive(Deserialize)]
struct SummaryParams {
    /// Summary granularity; defaults to `short`.
    #[serde(rename = "type", default)]
    summary_type: Option<String>,
    /// Identifier of a previously processed document.
    #[serde(default)]
    document_id: Option<String>,
    /// Raw text to summarize directly.
    #[serde(default)]
    text: Option<String>,
}

/// Success response for `GET /summaries`.
#[derive(Serialize)]
struct SummaryResponse {
    summary: String,
    word_count: usize,
    status: &'static str,
}

/// Summarize raw text or cached document text.
async fn get_summary<S>(
    State(service): State<Arc<S>>,
    Query(params): Query<SummaryParams>,
) -> Result<Json<SummaryResponse>, AppError>
where
    S: PipelineApi,
{
    let summary_type = match params.summary_type.as_deref() {
        None => SummaryType::default(),
        Some(raw) => raw
            .parse()
            .map_err(|()| AppError::BadRequest(format!("unsupported summary type '{raw}'")))?,
    };

    let outcome = service
        .summarize(SummaryRequest {
            summary_type,
            document_id: params.document_id.map(Into::into),
            text: params.text,
        })
        .await?;

    Ok(Json(SummaryResponse {
        summary: outcome.summary,
        word_count: outcome.word_count,
        status: "success",
    }))
}

/// Response body for `GET /metrics`.
#[derive(Serialize)]
struct MetricsResponse {
    documents_processed: u64,
    summaries_generated: u64,
}

/// Return pipeline counters for observability.
async fn get_metrics<S>(State(service): State<Arc<S>>) -> Json<MetricsResponse>
where
    S: PipelineApi,
{
    let snapshot = service.metrics_snapshot();
    Json(MetricsResponse {
        documents_processed: snapshot.documents_processed,
        summaries_generated: snapshot.summaries_generated,
    })
}

/// Liveness probe.
async fn health() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok", "version": env!("CARGO_PKG_VERSION") }))
}

/// Error wrapper translating pipeline failures into HTTP responses.
enum AppError {
    Workflow(WorkflowError),
    Summary(SummaryError),
    BadRequest(String),
}

impl AppError {
    fn status(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Workflow(error) => match error {
                WorkflowError::EmptyExtraction => StatusCode::BAD_REQUEST,
                WorkflowError::Ocr(_) | WorkflowError::Summarization(_) => StatusCode::BAD_GATEWAY,
                WorkflowError::Index(_) | WorkflowError::Io(_) => {
                    StatusCode::INTERNAL_SERVER_ERROR
                }
                WorkflowError::MissingApiKey => StatusCode::SERVICE_UNAVAILABLE,
            },
            Self::Summary(error) => match error {
                SummaryError::MissingApiKey => StatusCode::SERVICE_UNAVAILABLE,
                SummaryError::UnknownDocument(_) => StatusCode::NOT_FOUND,
                SummaryError::NoSourceText => StatusCode::BAD_REQUEST,
                SummaryError::Summarization(_) => StatusCode::BAD_GATEWAY,
            },
        }
    }

    fn message(&self) -> String {
        match self {
            Self::Workflow(error) => error.to_string(),
            Self::Summary(error) => error.to_string(),
            Self::BadRequest(message) => message.clone(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = self.message();
        if status.is_server_error() {
            tracing::error!(%status, message, "Request failed");
        } else {
            tracing::debug!(%status, message, "Request rejected");
        }
        (status, Json(json!({ "error": message }))).into_response()
    }
}

impl From<WorkflowError> for AppError {
    fn from(inner: WorkflowError) -> Self {
        Self::Workflow(inner)
    }
}

impl From<SummaryError> for AppError {
    fn from(inner: SummaryError) -> Self {
        Self::Summary(inner)
    }
}
