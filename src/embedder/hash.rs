//! Feature-hashing embedder.
//!
//! Buckets lower-cased word tokens into a fixed number of signed dimensions
//! and L2-normalises the result, so texts sharing identifiers land close
//! together without any model files. Token hashes come from BLAKE3, so
//! stored vectors stay comparable across builds.
use super::{Embedder, EmbedderError, MAX_BATCH};

pub const DEFAULT_DIMENSIONS: usize = 384;

/// Deterministic embedder built on token hashes.
pub struct HashEmbedder {
    pub dimensions: usize,
}

impl HashEmbedder {
    /// Create a new `HashEmbedder` with the given dimensionality.
    #[must_use]
    pub fn new(dimensions: usize) -> Self {
        Self {
            dimensions: dimensions.max(1),
        }
    }

    fn bucket(&self, token: &str) -> (usize, f32) {
        let digest = blake3::hash(token.as_bytes());
        let mut prefix = [0u8; 8];
        prefix.copy_from_slice(&digest.as_bytes()[..8]);
        let hash = u64::from_le_bytes(prefix);
        let dims = u64::try_from(self.dimensions).unwrap_or(u64::MAX);
        let index = usize::try_from(hash % dims).unwrap_or(0);
        let sign = if hash >> 63 == 0 { 1.0 } else { -1.0 };
        (index, sign)
    }
}

impl Default for HashEmbedder {
    fn default() -> Self {
        Self::new(DEFAULT_DIMENSIONS)
    }
}

fn tokens(text: &str) -> impl Iterator<Item = String> + '_ {
    text.split(|c: char| !c.is_alphanumeric() && c != '_')
        .filter(|t| !t.is_empty())
        .map(str::to_lowercase)
}

impl Embedder for HashEmbedder {
    fn embed(&self, text: &str) -> Result<Vec<f32>, EmbedderError> {
        let mut embedding = vec![0.0f32; self.dimensions];
        for token in tokens(text) {
            let (index, sign) = self.bucket(&token);
            embedding[index] += sign;
        }

        // L2 normalize; token-free text gets a fixed unit vector so cosine
        // distance stays defined.
        let norm_sq: f32 = embedding.iter().map(|v| v * v).sum();
        if norm_sq > 0.0 {
            let inv = 1.0 / norm_sq.sqrt();
            for v in &mut embedding {
                *v *= inv;
            }
        } else {
            embedding[0] = 1.0;
        }

        Ok(embedding)
    }

    fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>, EmbedderError> {
        if texts.len() > MAX_BATCH {
            return Err(EmbedderError::BatchTooLarge {
                size: texts.len(),
                max: MAX_BATCH,
            });
        }
        texts.iter().map(|t| self.embed(t)).collect()
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }
}
