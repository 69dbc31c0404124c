//! Process-wide cache of per-document processing results.
//!
//! The workflow endpoint is the only writer; the summaries endpoint is the only
//! reader. An identifier becomes visible to readers strictly after its
//! [`ProcessingResult`] has been fully constructed, so no partially populated entry
//! is ever observable. Entries live for the process lifetime; there is no eviction,
//! TTL, or on-disk persistence.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use serde::{Deserialize, Serialize};

/// Opaque unique token identifying one processed upload.
///
/// Generated fresh for every successful workflow run; re-uploading the same file
/// yields a new identifier and a new cache entry rather than updating an old one.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DocumentId(String);

impl DocumentId {
    /// Generate a fresh random identifier.
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().simple().to_string())
    }

    /// View the identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for DocumentId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl std::fmt::Display for DocumentId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Text and metadata extracted for a single page of the source document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageRecord {
    /// Extracted text for this page.
    pub text: String,
    /// 1-based page number within the source document.
    pub page_number: usize,
}

/// Location of a persisted similarity index.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexDescriptor {
    /// Filesystem path of the index file written by the builder.
    pub path: String,
}

/// Everything produced by one full workflow run for one upload.
///
/// Immutable after construction; the cache hands out shared references only.
#[derive(Debug, Clone)]
pub struct ProcessingResult {
    /// Full extracted text of the document.
    pub text: String,
    /// Ordered per-page extraction records.
    pub page_details: Vec<PageRecord>,
    /// Summary generated during the workflow run.
    pub summary: String,
    /// Descriptor of the persisted similarity index.
    pub index: IndexDescriptor,
}

/// Mapping from [`DocumentId`] to the result of its processing run.
///
/// A plain `RwLock<HashMap>` is sufficient here: identifiers are generated fresh per
/// upload so writers never contend on a key, and the lock is held only for the map
/// operation itself, never across an await point.
#[derive(Default)]
pub struct DocumentCache {
    entries: RwLock<HashMap<DocumentId, Arc<ProcessingResult>>>,
}

impl DocumentCache {
    /// Create an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or overwrite the result stored under `id`. Never fails.
    pub fn put(&self, id: DocumentId, result: ProcessingResult) {
        let mut entries = self.entries.write().expect("document cache lock poisoned");
        entries.insert(id, Arc::new(result));
    }

    /// Look up the result for `id`, returning `None` when the identifier is unknown.
    pub fn get(&self, id: &DocumentId) -> Option<Arc<ProcessingResult>> {
        let entries = self.entries.read().expect("document cache lock poisoned");
        entries.get(id).cloned()
    }

    /// Number of entries currently stored.
    pub fn len(&self) -> usize {
        let entries = self.entries.read().expect("document cache lock poisoned");
        entries.len()
    }

    /// Whether the cache holds no entries.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
