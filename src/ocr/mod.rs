//! OCR collaborator boundary.
//!
//! Extraction itself is opaque to this service: the client hands over a file and gets
//! back full text plus ordered per-page records. The production adapter talks to an
//! external extraction service over HTTP.

use std::path::Path;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use thiserror::Error;

use crate::cache::PageRecord;
use crate::config::get_config;

/// Errors raised while extracting text from an uploaded document.
#[derive(Debug, Error)]
pub enum OcrClientError {
    /// The uploaded file could not be read from disk.
    #[error("Failed to read upload: {0}")]
    Io(#[from] std::io::Error),
    /// The extraction service was unreachable.
    #[error("OCR service unavailable: {0}")]
    ServiceUnavailable(String),
    /// The extraction service rejected the document or failed internally.
    #[error("Failed to extract text: {0}")]
    ExtractionFailed(String),
    /// The extraction service response could not be parsed.
    #[error("Malformed OCR response: {0}")]
    InvalidResponse(String),
}

/// Full output of one extraction run.
#[derive(Debug, Clone, Deserialize)]
pub struct OcrOutput {
    /// Concatenated text of the whole document.
    pub text: String,
    /// Ordered per-page text and metadata.
    #[serde(default)]
    pub page_details: Vec<PageRecord>,
}

/// Interface implemented by text extraction backends.
#[async_trait]
pub trait OcrClient: Send + Sync {
    /// Extract text and page records from the document at `path`.
    async fn process(&self, path: &Path) -> Result<OcrOutput, OcrClientError>;
}

/// Build the OCR client for the configured extraction service.
pub fn get_ocr_client() -> Box<dyn OcrClient + Send + Sync> {
    Box::new(HttpOcrClient::new(get_config().ocr_service_url.clone()))
}

/// OCR adapter posting raw document bytes to an HTTP extraction service.
pub struct HttpOcrClient {
    http: Client,
    base_url: String,
}

impl HttpOcrClient {
    /// Create a client targeting the extraction service at `base_url`.
    pub fn new(base_url: String) -> Self {
        let http = Client::builder()
            .user_agent("docflow/ocr")
            .build()
            .expect("Failed to construct reqwest::Client for OCR");
        Self { http, base_url }
    }

    fn endpoint(&self) -> String {
        format!("{}/process", self.base_url.trim_end_matches('/'))
    }
}

#[async_trait]
impl OcrClient for HttpOcrClient {
    async fn process(&self, path: &Path) -> Result<OcrOutput, OcrClientError> {
        let bytes = tokio::fs::read(path).await?;
        let filename = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();

        let response = self
            .http
            .post(self.endpoint())
            .header("content-type", "application/octet-stream")
            .header("x-filename", filename)
            .body(bytes)
            .send()
            .await
            .map_err(|error| {
                OcrClientError::ServiceUnavailable(format!(
                    "failed to reach OCR service at {}: {error}",
                    self.base_url
                ))
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(OcrClientError::ExtractionFailed(format!(
                "OCR service returned {status}: {body}"
            )));
        }

        response.json::<OcrOutput>().await.map_err(|error| {
            OcrClientError::InvalidResponse(format!("failed to decode OCR response: {error}"))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::{Method::POST, MockServer};
    use serde_json::json;
    use std::io::Write;

    fn temp_upload(contents: &[u8]) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        file.write_all(contents).expect("write upload");
        file
    }

    #[tokio::test]
    async fn decodes_text_and_page_details() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(POST).path("/process");
                then.status(200).json_body(json!({
                    "text": "Page one. Page two.",
                    "page_details": [
                        { "text": "Page one.", "page_number": 1 },
                        { "text": "Page two.", "page_number": 2 }
                    ]
                }));
            })
            .await;

        let upload = temp_upload(b"%PDF-1.4 fake");
        let client = HttpOcrClient::new(server.base_url());
        let output = client.process(upload.path()).await.expect("ocr output");

        mock.assert();
        assert_eq!(output.text, "Page one. Page two.");
        assert_eq!(output.page_details.len(), 2);
        assert_eq!(output.page_details[1].page_number, 2);
    }

    #[tokio::test]
    async fn surfaces_service_errors() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/process");
                then.status(422).body("unsupported format");
            })
            .await;

        let upload = temp_upload(b"not a document");
        let client = HttpOcrClient::new(server.base_url());
        let error = client.process(upload.path()).await.expect_err("error");

        assert!(matches!(error, OcrClientError::ExtractionFailed(message)
            if message.contains("422") && message.contains("unsupported format")));
    }

    #[tokio::test]
    async fn missing_file_is_an_io_error() {
        let client = HttpOcrClient::new("http://127.0.0.1:9".into());
        let error = client
            .process(Path::new("/nonexistent/upload.pdf"))
            .await
            .expect_err("error");
        assert!(matches!(error, OcrClientError::Io(_)));
    }
}
