// Reciprocal rank fusion of retriever outputs.

use std::collections::HashMap;

use crate::db::models::StoredChunk;

/// Rank offset; larger values flatten the weight of top positions.
pub const RRF_K: usize = 60;

/// Merge ranked lists into one, scoring each chunk by
/// `sum over lists of 1 / (k + rank)` with 1-based ranks.
///
/// Chunks are identified by id; the copy from the first list that holds it is
/// kept, with its score replaced by the fused score. Ties keep first-seen order.
pub fn reciprocal_rank_fusion(lists: &[&[StoredChunk]], k: usize) -> Vec<StoredChunk> {
    let k = k as f64;
    let mut fused: Vec<StoredChunk> = Vec::new();
    let mut slot: HashMap<i64, usize> = HashMap::new();

    for list in lists {
        for (rank, chunk) in list.iter().enumerate() {
            let contribution = 1.0 / (k + (rank + 1) as f64);
            match slot.get(&chunk.chunk_id) {
                Some(&i) => fused[i].score += contribution,
                None => {
                    slot.insert(chunk.chunk_id, fused.len());
                    fused.push(StoredChunk {
                        score: contribution,
                        ..chunk.clone()
                    });
                }
            }
        }
    }

    // Stable sort keeps first-seen order among equal scores.
    fused.sort_by(|a, b| b.score.total_cmp(&a.score));
    fused
}
