//! Query modes, fusion and reranking on top of the chunk store.
pub mod fusion;
pub mod rerank;

use std::fmt;
use std::path::Path;
use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::db::models::StoredChunk;

pub use fusion::{RRF_K, reciprocal_rank_fusion};
pub use rerank::{LexicalReranker, Reranker};

/// Which retrievers answer a query.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QueryMode {
    /// Vector similarity only.
    #[serde(alias = "default")]
    Dense,
    /// Keyword containment only.
    Sparse,
    /// Both, fused by reciprocal rank.
    #[default]
    Hybrid,
}

impl FromStr for QueryMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "default" | "dense" => Ok(Self::Dense),
            "sparse" => Ok(Self::Sparse),
            "hybrid" => Ok(Self::Hybrid),
            other => Err(format!(
                "unknown query mode '{other}' (expected default, dense, sparse or hybrid)"
            )),
        }
    }
}

impl fmt::Display for QueryMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Dense => "dense",
            Self::Sparse => "sparse",
            Self::Hybrid => "hybrid",
        })
    }
}

/// One search result as shown to callers.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchHit {
    pub chunk_id: i64,
    pub file_path: String,
    pub file_name: String,
    pub content: String,
    pub line_start: u32,
    pub line_end: u32,
    pub score: f64,
}

impl From<StoredChunk> for SearchHit {
    fn from(chunk: StoredChunk) -> Self {
        let file_name = Path::new(&chunk.filename)
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| chunk.filename.clone());
        Self {
            chunk_id: chunk.chunk_id,
            file_path: chunk.filename,
            file_name,
            content: chunk.content,
            line_start: chunk.line_start,
            line_end: chunk.line_end,
            score: chunk.score,
        }
    }
}

static TERM_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[A-Za-z0-9_]+").unwrap());

/// Lower-cased, de-duplicated identifier-like terms of a query, in order.
/// Single characters are dropped.
pub fn query_terms(query: &str) -> Vec<String> {
    let mut terms: Vec<String> = Vec::new();
    for m in TERM_RE.find_iter(query) {
        let term = m.as_str().to_lowercase();
        if term.chars().count() > 1 && !terms.contains(&term) {
            terms.push(term);
        }
    }
    terms
}
