use crate::db::models::StoredChunk;

/// Reorders retrieved candidates and keeps the best `top_n`.
pub trait Reranker: Send + Sync {
    fn rerank(
        &self,
        terms: &[String],
        candidates: Vec<StoredChunk>,
        top_n: usize,
    ) -> Vec<StoredChunk>;
}

/// Ranks by the share of query terms found in a chunk's content or file
/// name, then by retrieval score.
#[derive(Debug, Default, Clone, Copy)]
pub struct LexicalReranker;

impl LexicalReranker {
    fn coverage(terms: &[String], chunk: &StoredChunk) -> f64 {
        if terms.is_empty() {
            return 0.0;
        }
        let content = chunk.content.to_lowercase();
        let filename = chunk.filename.to_lowercase();
        let found = terms
            .iter()
            .filter(|t| content.contains(t.as_str()) || filename.contains(t.as_str()))
            .count();
        found as f64 / terms.len() as f64
    }
}

impl Reranker for LexicalReranker {
    fn rerank(
        &self,
        terms: &[String],
        candidates: Vec<StoredChunk>,
        top_n: usize,
    ) -> Vec<StoredChunk> {
        let mut scored: Vec<(f64, StoredChunk)> = candidates
            .into_iter()
            .map(|c| (Self::coverage(terms, &c), c))
            .collect();

        scored.sort_by(|(ca, a), (cb, b)| {
            cb.total_cmp(ca)
                .then_with(|| b.score.total_cmp(&a.score))
                .then_with(|| a.chunk_id.cmp(&b.chunk_id))
        });

        scored.into_iter().take(top_n).map(|(_, c)| c).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stored(id: i64, filename: &str, content: &str, score: f64) -> StoredChunk {
        StoredChunk {
            chunk_id: id,
            filename: filename.to_string(),
            content: content.to_string(),
            language: "python".to_string(),
            line_start: 1,
            line_end: 2,
            score,
        }
    }

    fn terms(words: &[&str]) -> Vec<String> {
        words.iter().map(|w| w.to_string()).collect()
    }

    #[test]
    fn test_coverage_beats_score() {
        let candidates = vec![
            stored(1, "a.py", "def unrelated(): pass", 0.9),
            stored(2, "b.py", "def load_config(path): pass", 0.1),
        ];
        let out = LexicalReranker.rerank(&terms(&["load", "config"]), candidates, 5);
        assert_eq!(out[0].chunk_id, 2);
        assert_eq!(out[1].chunk_id, 1);
    }

    #[test]
    fn test_file_name_counts() {
        let candidates = vec![
            stored(1, "src/other.py", "x = 1", 0.5),
            stored(2, "src/config.py", "x = 1", 0.5),
        ];
        let out = LexicalReranker.rerank(&terms(&["config"]), candidates, 5);
        assert_eq!(out[0].chunk_id, 2);
    }

    #[test]
    fn test_score_breaks_ties_and_truncates() {
        let candidates = vec![
            stored(1, "a.py", "alpha", 0.2),
            stored(2, "b.py", "alpha", 0.8),
            stored(3, "c.py", "alpha", 0.5),
        ];
        let out = LexicalReranker.rerank(&terms(&["alpha"]), candidates, 2);
        let ids: Vec<i64> = out.iter().map(|c| c.chunk_id).collect();
        assert_eq!(ids, vec![2, 3]);
    }

    #[test]
    fn test_no_terms_orders_by_score() {
        let candidates = vec![stored(1, "a.py", "", 0.1), stored(2, "b.py", "", 0.3)];
        let out = LexicalReranker.rerank(&[], candidates, 10);
        assert_eq!(out[0].chunk_id, 2);
        assert!(LexicalReranker.rerank(&[], Vec::new(), 3).is_empty());
    }
}
