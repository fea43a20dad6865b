use serde::Serialize;

/// A chunk ready to be written, borrowed from the indexer's buffers.
#[derive(Debug, Clone)]
pub struct NewChunk<'a> {
    pub position: usize,
    pub content: &'a str,
    pub language: &'a str,
    pub line_start: u32,
    pub line_end: u32,
    pub start_byte: usize,
    pub end_byte: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CollectionInfo {
    pub id: i64,
    pub name: String,
    pub documents: usize,
    pub chunks: usize,
}

/// One stored chunk as returned by retrieval.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredChunk {
    pub chunk_id: i64,
    pub filename: String,
    pub content: String,
    pub language: String,
    pub line_start: u32,
    pub line_end: u32,
    /// Retriever-specific score, higher is better.
    pub score: f64,
}
