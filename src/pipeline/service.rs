//! Pipeline service coordinating OCR, summarization, index construction, and the
//! document cache.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::io::AsyncWriteExt;

use crate::{
    cache::{DocumentCache, DocumentId, ProcessingResult},
    config::get_config,
    index::{IndexBuilder, get_index_builder},
    metrics::{MetricsSnapshot, PipelineMetrics},
    ocr::{OcrClient, get_ocr_client},
    pipeline::{
        chunking::chunk_pages,
        types::{SummaryError, SummaryOutcome, SummaryRequest, WorkflowError, WorkflowOutcome},
    },
    summarization::{SummarizationClient, SummaryType, get_summarization_client},
};

/// Coordinates the full document workflow and the on-demand summary path.
///
/// The service owns the collaborator handles, the document cache, and the metrics
/// registry. All of them are injected at construction so the HTTP surface and tests
/// share one explicit wiring point instead of module-level singletons. Construct the
/// service once near process start and share it through an `Arc`.
pub struct PipelineService {
    ocr: Box<dyn OcrClient + Send + Sync>,
    summarizer: Option<Box<dyn SummarizationClient + Send + Sync>>,
    index_builder: Box<dyn IndexBuilder + Send + Sync>,
    cache: Arc<DocumentCache>,
    metrics: Arc<PipelineMetrics>,
}

/// Abstraction over the pipeline used by the HTTP surface.
#[async_trait]
pub trait PipelineApi: Send + Sync {
    /// Run the full workflow for one uploaded file: stage to disk, extract, summarize,
    /// chunk, index, and cache the result under a fresh identifier.
    async fn process_document(
        &self,
        filename: &str,
        bytes: Vec<u8>,
    ) -> Result<WorkflowOutcome, WorkflowError>;

    /// Produce a summary from raw text or a previously processed document.
    async fn summarize(&self, request: SummaryRequest) -> Result<SummaryOutcome, SummaryError>;

    /// Retrieve the current metrics snapshot for diagnostics.
    fn metrics_snapshot(&self) -> MetricsSnapshot;
}

impl PipelineService {
    /// Build a service from explicit collaborators and a fresh cache.
    pub fn new(
        ocr: Box<dyn OcrClient + Send + Sync>,
        summarizer: Option<Box<dyn SummarizationClient + Send + Sync>>,
        index_builder: Box<dyn IndexBuilder + Send + Sync>,
    ) -> Self {
        Self {
            ocr,
            summarizer,
            index_builder,
            cache: Arc::new(DocumentCache::new()),
            metrics: Arc::new(PipelineMetrics::new()),
        }
    }

    /// Build a service wired to the collaborators named in configuration.
    pub fn from_config() -> Self {
        tracing::info!("Initializing pipeline collaborators");
        let service = Self::new(
            get_ocr_client(),
            get_summarization_client(),
            get_index_builder(),
        );
        if service.summarizer.is_none() {
            tracing::warn!("No summarization credential configured; summaries disabled");
        }
        service
    }

    /// Shared handle to the document cache (read access for embedders and tests).
    pub fn cache(&self) -> Arc<DocumentCache> {
        Arc::clone(&self.cache)
    }

    async fn run_workflow(
        &self,
        filename: &str,
        bytes: Vec<u8>,
    ) -> Result<WorkflowOutcome, WorkflowError> {
        let summarizer = self
            .summarizer
            .as_deref()
            .ok_or(WorkflowError::MissingApiKey)?;

        tracing::info!(filename, size = bytes.len(), "Processing uploaded document");

        // The temp file is removed on drop, covering every exit path below.
        let staged = tempfile::Builder::new()
            .prefix("docflow-upload-")
            .tempfile()?;
        let mut writer = tokio::fs::File::create(staged.path()).await?;
        writer.write_all(&bytes).await?;
        writer.flush().await?;
        drop(writer);

        let extracted = self.ocr.process(staged.path()).await?;
        if extracted.text.trim().is_empty() {
            tracing::warn!(filename, "Extraction produced no text");
            return Err(WorkflowError::EmptyExtraction);
        }

        let summary = summarizer
            .summarize(&extracted.text, SummaryType::General)
            .await?;

        let config = get_config();
        let document_id = DocumentId::generate();
        let pages = if extracted.page_details.is_empty() {
            // Some extraction backends return only the flat text.
            vec![crate::cache::PageRecord {
                text: extracted.text.clone(),
                page_number: 1,
            }]
        } else {
            extracted.page_details
        };
        let chunks = chunk_pages(filename, &pages, config.chunk_size, config.chunk_overlap);
        let index = self.index_builder.build_index(&chunks).await?;
        let index_path = index.path.clone();

        self.cache.put(
            document_id.clone(),
            ProcessingResult {
                text: extracted.text,
                page_details: pages,
                summary: summary.clone(),
                index,
            },
        );
        self.metrics.record_document();

        tracing::info!(
            filename,
            document_id = %document_id,
            chunks = chunks.len(),
            index_path = %index_path,
            "Document processed"
        );

        Ok(WorkflowOutcome {
            document_id,
            filename: filename.to_string(),
            summary,
            index_path,
        })
    }

    async fn run_summary(&self, request: SummaryRequest) -> Result<SummaryOutcome, SummaryError> {
        // Configuration errors short-circuit before any cache or collaborator access.
        let summarizer = self
            .summarizer
            .as_deref()
            .ok_or(SummaryError::MissingApiKey)?;

        let mut source_text = request.text.unwrap_or_default();
        if source_text.is_empty() {
            if let Some(document_id) = request.document_id {
                let cached = self
                    .cache
                    .get(&document_id)
                    .ok_or(SummaryError::UnknownDocument(document_id))?;
                source_text = cached.text.clone();
            }
        }
        if source_text.trim().is_empty() {
            return Err(SummaryError::NoSourceText);
        }

        let summary = summarizer
            .summarize(&source_text, request.summary_type)
            .await?;
        let word_count = summary.split_whitespace().count();
        self.metrics.record_summary();

        tracing::debug!(
            summary_type = request.summary_type.as_str(),
            word_count,
            "Summary generated"
        );

        Ok(SummaryOutcome {
            summary,
            word_count,
        })
    }
}

#[async_trait]
impl PipelineApi for PipelineService {
    async fn process_document(
        &self,
        filename: &str,
        bytes: Vec<u8>,
    ) -> Result<WorkflowOutcome, WorkflowError> {
        self.run_workflow(filename, bytes).await
    }

    async fn summarize(&self, request: SummaryRequest) -> Result<SummaryOutcome, SummaryError> {
        self.run_summary(request).await
    }

    fn metrics_snapshot(&self) -> MetricsSnapshot {
        self.metrics.snapshot()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::{IndexDescriptor, PageRecord};
    use crate::config::{CONFIG, Config};
    use crate::index::IndexError;
    use crate::ocr::{OcrClientError, OcrOutput};
    use crate::pipeline::chunking::Chunk;
    use crate::summarization::SummarizationClientError;
    use std::path::Path;
    use std::sync::Once;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn ensure_test_config() {
        static INIT: Once = Once::new();
        INIT.call_once(|| {
            let _ = CONFIG.set(Config {
                openai_api_key: Some("sk-test".into()),
                openai_base_url: None,
                openai_model: "gpt-4o-mini".into(),
                ocr_service_url: "http://127.0.0.1:9".into(),
                index_dir: "embeddings".into(),
                chunk_size: 250,
                chunk_overlap: 50,
                embedding_dimension: 8,
                server_port: None,
            });
        });
    }

    struct StubOcr {
        output: Option<OcrOutput>,
    }

    #[async_trait]
    impl OcrClient for StubOcr {
        async fn process(&self, path: &Path) -> Result<OcrOutput, OcrClientError> {
            // The staged upload must exist while the collaborator runs.
            assert!(path.exists(), "staged upload missing during extraction");
            match &self.output {
                Some(output) => Ok(output.clone()),
                None => Err(OcrClientError::ExtractionFailed("stub failure".into())),
            }
        }
    }

    struct StubSummarizer;

    #[async_trait]
    impl SummarizationClient for StubSummarizer {
        async fn summarize(
            &self,
            _text: &str,
            summary_type: SummaryType,
        ) -> Result<String, SummarizationClientError> {
            Ok(format!("{} summary", summary_type.as_str()))
        }
    }

    struct StubIndexBuilder {
        fail_with: Option<String>,
        calls: AtomicUsize,
    }

    impl StubIndexBuilder {
        fn ok() -> Self {
            Self {
                fail_with: None,
                calls: AtomicUsize::new(0),
            }
        }

        fn failing(message: &str) -> Self {
            Self {
                fail_with: Some(message.to_string()),
                calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl IndexBuilder for StubIndexBuilder {
        async fn build_index(&self, chunks: &[Chunk]) -> Result<IndexDescriptor, IndexError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            assert!(!chunks.is_empty());
            match &self.fail_with {
                Some(message) => Err(IndexError::Io(std::io::Error::other(message.clone()))),
                None => Ok(IndexDescriptor {
                    path: "embeddings/document_index.faiss".into(),
                }),
            }
        }
    }

    fn ocr_output(text: &str) -> OcrOutput {
        OcrOutput {
            text: text.to_string(),
            page_details: vec![PageRecord {
                text: text.to_string(),
                page_number: 1,
            }],
        }
    }

    fn service_with(
        ocr: StubOcr,
        summarizer: Option<Box<dyn SummarizationClient + Send + Sync>>,
        index_builder: StubIndexBuilder,
    ) -> PipelineService {
        ensure_test_config();
        PipelineService::new(Box::new(ocr), summarizer, Box::new(index_builder))
    }

    #[tokio::test]
    async fn workflow_caches_result_under_fresh_id() {
        let service = service_with(
            StubOcr {
                output: Some(ocr_output("Extracted document text.")),
            },
            Some(Box::new(StubSummarizer)),
            StubIndexBuilder::ok(),
        );

        let outcome = service
            .process_document("report.pdf", b"%PDF".to_vec())
            .await
            .expect("workflow succeeds");

        assert_eq!(outcome.filename, "report.pdf");
        assert_eq!(outcome.summary, "general summary");
        let cached = service.cache().get(&outcome.document_id).expect("cached");
        assert_eq!(cached.text, "Extracted document text.");
    }

    #[tokio::test]
    async fn reupload_creates_a_second_entry() {
        let service = service_with(
            StubOcr {
                output: Some(ocr_output("Same file twice.")),
            },
            Some(Box::new(StubSummarizer)),
            StubIndexBuilder::ok(),
        );

        let first = service
            .process_document("doc.pdf", b"data".to_vec())
            .await
            .expect("first run");
        let second = service
            .process_document("doc.pdf", b"data".to_vec())
            .await
            .expect("second run");

        assert_ne!(first.document_id, second.document_id);
        assert_eq!(service.cache().len(), 2);
    }

    #[tokio::test]
    async fn empty_extraction_leaves_cache_untouched() {
        let service = service_with(
            StubOcr {
                output: Some(OcrOutput {
                    text: "   ".into(),
                    page_details: Vec::new(),
                }),
            },
            Some(Box::new(StubSummarizer)),
            StubIndexBuilder::ok(),
        );

        let error = service
            .process_document("blank.pdf", b"data".to_vec())
            .await
            .expect_err("empty extraction fails");

        assert!(matches!(error, WorkflowError::EmptyExtraction));
        assert!(service.cache().is_empty());
    }

    #[tokio::test]
    async fn index_failure_surfaces_message_and_skips_cache() {
        let service = service_with(
            StubOcr {
                output: Some(ocr_output("Indexable text.")),
            },
            Some(Box::new(StubSummarizer)),
            StubIndexBuilder::failing("disk full"),
        );

        let error = service
            .process_document("doc.pdf", b"data".to_vec())
            .await
            .expect_err("index failure propagates");

        assert!(error.to_string().contains("disk full"));
        assert!(service.cache().is_empty());
    }

    #[tokio::test]
    async fn summary_prefers_raw_text_over_identifier() {
        let service = service_with(
            StubOcr {
                output: Some(ocr_output("Cached text.")),
            },
            Some(Box::new(StubSummarizer)),
            StubIndexBuilder::ok(),
        );
        let processed = service
            .process_document("doc.pdf", b"data".to_vec())
            .await
            .expect("workflow");

        let outcome = service
            .summarize(SummaryRequest {
                summary_type: SummaryType::Short,
                document_id: Some(processed.document_id),
                text: Some("Raw text wins".into()),
            })
            .await
            .expect("summary");

        assert_eq!(outcome.summary, "short summary");
        assert_eq!(outcome.word_count, 2);
    }

    #[tokio::test]
    async fn summary_resolves_cached_text_by_id() {
        let service = service_with(
            StubOcr {
                output: Some(ocr_output("The cached body of the document.")),
            },
            Some(Box::new(StubSummarizer)),
            StubIndexBuilder::ok(),
        );
        let processed = service
            .process_document("doc.pdf", b"data".to_vec())
            .await
            .expect("workflow");

        let outcome = service
            .summarize(SummaryRequest {
                summary_type: SummaryType::Detailed,
                document_id: Some(processed.document_id),
                text: None,
            })
            .await
            .expect("summary");

        assert_eq!(outcome.summary, "detailed summary");
    }

    #[tokio::test]
    async fn unknown_document_is_an_actionable_error() {
        let service = service_with(
            StubOcr { output: None },
            Some(Box::new(StubSummarizer)),
            StubIndexBuilder::ok(),
        );

        let error = service
            .summarize(SummaryRequest {
                summary_type: SummaryType::Short,
                document_id: Some(DocumentId::generate()),
                text: None,
            })
            .await
            .expect_err("unknown id fails");

        assert!(matches!(error, SummaryError::UnknownDocument(_)));
        assert!(error.to_string().contains("not processed yet"));
    }

    #[tokio::test]
    async fn missing_credential_short_circuits_summary() {
        let service = service_with(StubOcr { output: None }, None, StubIndexBuilder::ok());

        let error = service
            .summarize(SummaryRequest {
                summary_type: SummaryType::Short,
                document_id: None,
                text: Some("Hello world".into()),
            })
            .await
            .expect_err("missing key fails");

        assert_eq!(error.to_string(), "Missing OPENAI_API_KEY");
    }

    #[tokio::test]
    async fn no_text_and_no_id_is_a_usage_error() {
        let service = service_with(
            StubOcr { output: None },
            Some(Box::new(StubSummarizer)),
            StubIndexBuilder::ok(),
        );

        let error = service
            .summarize(SummaryRequest::default())
            .await
            .expect_err("usage error");

        assert!(matches!(error, SummaryError::NoSourceText));
    }
}
