//! Core data types and error definitions for the processing pipeline.

use thiserror::Error;

use crate::cache::DocumentId;
use crate::index::IndexError;
use crate::ocr::OcrClientError;
use crate::summarization::{SummarizationClientError, SummaryType};

/// Errors emitted by the document workflow (upload through index build).
#[derive(Debug, Error)]
pub enum WorkflowError {
    /// No summarization credential is configured.
    #[error("Missing OPENAI_API_KEY")]
    MissingApiKey,
    /// The upload could not be persisted to a temporary location.
    #[error("Failed to stage upload: {0}")]
    Io(#[from] std::io::Error),
    /// The OCR collaborator failed.
    #[error(transparent)]
    Ocr(#[from] OcrClientError),
    /// Extraction succeeded but produced no text.
    #[error("no text could be extracted from the document")]
    EmptyExtraction,
    /// The summarization collaborator failed.
    #[error(transparent)]
    Summarization(#[from] SummarizationClientError),
    /// The index builder reported an error.
    #[error("Failed to build index: {0}")]
    Index(#[from] IndexError),
}

/// Errors emitted while serving an on-demand summary.
#[derive(Debug, Error)]
pub enum SummaryError {
    /// No summarization credential is configured.
    #[error("Missing OPENAI_API_KEY")]
    MissingApiKey,
    /// The supplied identifier has no cached processing result.
    #[error(
        "Document {0} not processed yet. Process the document first via POST /process-document"
    )]
    UnknownDocument(DocumentId),
    /// Neither raw text nor a resolvable identifier yielded non-empty text.
    #[error("No text provided. Pass 'text' or the 'document_id' of a processed document")]
    NoSourceText,
    /// The summarization collaborator failed.
    #[error(transparent)]
    Summarization(#[from] SummarizationClientError),
}

/// Result of a completed workflow run, as returned to the uploader.
#[derive(Debug, Clone)]
pub struct WorkflowOutcome {
    /// Identifier under which the processing result was cached.
    pub document_id: DocumentId,
    /// Original filename of the upload.
    pub filename: String,
    /// Summary generated with the fixed `general` type.
    pub summary: String,
    /// Path of the persisted similarity index.
    pub index_path: String,
}

/// Parameters for an on-demand summary.
#[derive(Debug, Clone, Default)]
pub struct SummaryRequest {
    /// Requested granularity.
    pub summary_type: SummaryType,
    /// Identifier of a previously processed document.
    pub document_id: Option<DocumentId>,
    /// Raw text to summarize; takes precedence over `document_id` when non-empty.
    pub text: Option<String>,
}

/// Result of an on-demand summary.
#[derive(Debug, Clone)]
pub struct SummaryOutcome {
    /// Generated summary text.
    pub summary: String,
    /// Whitespace-split word count of the summary.
    pub word_count: usize,
}
