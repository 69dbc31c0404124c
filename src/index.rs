//! Similarity-index construction and persistence.
//!
//! The builder embeds every chunk and writes the resulting vectors to a single index
//! file under the configured directory. Querying the index is out of scope for this
//! service; downstream consumers load the persisted file themselves.

use std::path::PathBuf;

use async_trait::async_trait;
use serde::Serialize;
use thiserror::Error;

use crate::cache::IndexDescriptor;
use crate::config::get_config;
use crate::embedding::{EmbeddingClient, EmbeddingClientError, get_embedding_client};
use crate::pipeline::chunking::Chunk;

const INDEX_FILE_NAME: &str = "document_index.faiss";

/// Errors raised while building or persisting a similarity index.
#[derive(Debug, Error)]
pub enum IndexError {
    /// No chunks were supplied, so there is nothing to index.
    #[error("no chunks to index")]
    EmptyInput,
    /// The embedding backend failed to produce vectors.
    #[error("Failed to generate embeddings: {0}")]
    Embedding(#[from] EmbeddingClientError),
    /// The index payload could not be serialized.
    #[error("Failed to serialize index: {0}")]
    Serialization(#[from] serde_json::Error),
    /// The index file could not be written.
    #[error("Failed to persist index: {0}")]
    Io(#[from] std::io::Error),
}

/// Interface implemented by index-construction backends.
#[async_trait]
pub trait IndexBuilder: Send + Sync {
    /// Embed `chunks` and persist a similarity index, returning its location.
    async fn build_index(&self, chunks: &[Chunk]) -> Result<IndexDescriptor, IndexError>;
}

/// Build the index builder for the configured index directory.
pub fn get_index_builder() -> Box<dyn IndexBuilder + Send + Sync> {
    Box::new(FileIndexBuilder::new(
        get_embedding_client(),
        PathBuf::from(&get_config().index_dir),
    ))
}

/// Index builder persisting embedded chunks as a single on-disk file.
pub struct FileIndexBuilder {
    embedder: Box<dyn EmbeddingClient + Send + Sync>,
    index_dir: PathBuf,
}

#[derive(Serialize)]
struct IndexFile<'a> {
    dimension: usize,
    entries: Vec<IndexEntry<'a>>,
}

#[derive(Serialize)]
struct IndexEntry<'a> {
    text: &'a str,
    source: &'a str,
    page_number: usize,
    vector: Vec<f32>,
}

impl FileIndexBuilder {
    /// Create a builder writing index files into `index_dir`.
    pub fn new(embedder: Box<dyn EmbeddingClient + Send + Sync>, index_dir: PathBuf) -> Self {
        Self { embedder, index_dir }
    }
}

#[async_trait]
impl IndexBuilder for FileIndexBuilder {
    async fn build_index(&self, chunks: &[Chunk]) -> Result<IndexDescriptor, IndexError> {
        if chunks.is_empty() {
            return Err(IndexError::EmptyInput);
        }

        let texts: Vec<String> = chunks.iter().map(|chunk| chunk.text.clone()).collect();
        let vectors = self.embedder.generate_embeddings(&texts).await?;
        debug_assert_eq!(chunks.len(), vectors.len());

        let dimension = vectors.first().map(Vec::len).unwrap_or_default();
        let entries = chunks
            .iter()
            .zip(vectors)
            .map(|(chunk, vector)| IndexEntry {
                text: &chunk.text,
                source: &chunk.source,
                page_number: chunk.page_number,
                vector,
            })
            .collect();

        let payload = serde_json::to_vec(&IndexFile { dimension, entries })?;

        tokio::fs::create_dir_all(&self.index_dir).await?;
        let path = self.index_dir.join(INDEX_FILE_NAME);
        tokio::fs::write(&path, payload).await?;

        tracing::info!(
            path = %path.display(),
            chunks = chunks.len(),
            dimension,
            "Persisted similarity index"
        );

        Ok(IndexDescriptor {
            path: path.to_string_lossy().into_owned(),
        })
    }
}
