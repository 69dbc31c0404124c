//! Page-wise word chunking for index construction.
//!
//! Pages are split independently so a chunk never straddles a page boundary and each
//! chunk keeps its page number for retrieval. Sizes are counted in whitespace-split
//! words; adjacent chunks within a page share a configurable overlap.

use crate::cache::PageRecord;

/// One chunk of page text destined for the similarity index.
#[derive(Debug, Clone, PartialEq)]
pub struct Chunk {
    /// Chunk text, joined with single spaces.
    pub text: String,
    /// Filename of the source document.
    pub source: String,
    /// Page the chunk was taken from.
    pub page_number: usize,
}

/// Split per-page text into word windows of `chunk_size` with `overlap` words shared
/// between adjacent windows.
///
/// Pages whose text is all whitespace yield no chunks. A `chunk_size` of zero yields
/// no chunks at all; an `overlap` of `chunk_size` or more is clamped so the window
/// always advances.
pub fn chunk_pages(
    source: &str,
    pages: &[PageRecord],
    chunk_size: usize,
    overlap: usize,
) -> Vec<Chunk> {
    if chunk_size == 0 {
        return Vec::new();
    }
    let step = chunk_size - overlap.min(chunk_size - 1);

    let mut chunks = Vec::new();
    for page in pages {
        let words: Vec<&str> = page.text.split_whitespace().collect();
        if words.is_empty() {
            continue;
        }

        let mut start = 0;
        loop {
            let end = (start + chunk_size).min(words.len());
            chunks.push(Chunk {
                text: words[start..end].join(" "),
                source: source.to_string(),
                page_number: page.page_number,
            });
            if end == words.len() {
                break;
            }
            start += step;
        }
    }

    chunks
}
