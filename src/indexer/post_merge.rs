//! Last-resort merge of undersized chunks, independent of syntax.
use crate::chunker::CodeChunk;

fn non_ws_len(text: &str) -> usize {
    text.chars().filter(|c| !c.is_whitespace()).count()
}

/// Concatenate adjacent chunks until the running chunk has more than
/// `min_length` non-whitespace characters and spans a line break.
///
/// The trailing remainder is kept even when it stays small.
pub fn merge_small_chunks(chunks: Vec<CodeChunk>, min_length: usize) -> Vec<CodeChunk> {
    let mut merged = Vec::with_capacity(chunks.len());
    let mut current: Option<CodeChunk> = None;

    for chunk in chunks {
        let acc = match current.take() {
            None => chunk,
            Some(mut acc) => {
                if acc.line_count() > 0 && chunk.line_count() > 0 {
                    acc.content.push('\n');
                }
                acc.content.push_str(&chunk.content);
                acc.line_end = chunk.line_end;
                acc.range = acc.range.concat(chunk.range);
                acc
            }
        };

        if non_ws_len(&acc.content) > min_length && acc.content.contains('\n') {
            merged.push(acc);
        } else {
            current = Some(acc);
        }
    }

    merged.extend(current);
    merged
}
