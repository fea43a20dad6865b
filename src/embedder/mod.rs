/// Embedder trait and shared types for text embedding.
///
/// The vector model is an external collaborator; the crate ships one
/// deterministic implementation so indexing and search work offline.
pub mod hash;

use thiserror::Error;

/// Largest batch accepted by a single `embed_batch` call.
pub const MAX_BATCH: usize = 2048;

/// Errors that can occur during embedding operations.
#[derive(Error, Debug)]
pub enum EmbedderError {
    #[error("inference failed: {0}")]
    InferenceFailed(String),

    #[error("batch of {size} texts exceeds the limit of {max}")]
    BatchTooLarge { size: usize, max: usize },
}

/// Trait for text embedding implementations.
///
/// All implementations must be `Send + Sync` to allow concurrent use
/// behind `Arc`.
pub trait Embedder: Send + Sync {
    /// Embed a single text string into a vector.
    fn embed(&self, text: &str) -> Result<Vec<f32>, EmbedderError>;

    /// Embed multiple text strings into vectors, in input order.
    fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>, EmbedderError>;

    /// Return the dimensionality of the embedding vectors.
    fn dimensions(&self) -> usize;
}
