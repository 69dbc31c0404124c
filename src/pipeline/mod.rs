//! Document processing pipeline: orchestration of OCR extraction, summarization,
//! and index construction, plus the cache contract shared by both endpoints.

/// Page-wise chunking helpers.
pub mod chunking;
/// Pipeline orchestration service.
pub mod service;
/// Request, outcome, and error types for the pipeline.
pub mod types;

pub use service::{PipelineApi, PipelineService};
pub use types::{SummaryError, SummaryOutcome, SummaryRequest, WorkflowError, WorkflowOutcome};
