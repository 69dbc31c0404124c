#![deny(missing_docs)]

//! Core library for the docflow document processing service.

/// HTTP routing and REST handlers.
pub mod api;
/// Process-wide document result cache.
pub mod cache;
/// Environment-driven configuration management.
pub mod config;
/// Embedding client abstraction and adapters.
pub mod embedding;
/// Similarity-index construction and persistence.
pub mod index;
/// Structured logging and tracing setup.
pub mod logging;
/// Pipeline activity counters.
pub mod metrics;
/// OCR collaborator boundary.
pub mod ocr;
/// Document processing pipeline orchestration.
pub mod pipeline;
/// Summarization collaborator boundary.
pub mod summarization;
