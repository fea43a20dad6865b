use serde::{Deserialize, Serialize};

use super::Result;
use super::range::ByteRange;
use super::source_index::SourceIndex;

/// A line-bounded slice of source text, ready for embedding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodeChunk {
    /// First line, 1-based, inclusive.
    pub line_start: u32,
    /// One past the last line, 1-based, exclusive.
    pub line_end: u32,
    /// Lines `[line_start, line_end)` joined with `\n`.
    pub content: String,
    /// Byte span this chunk was cut from.
    pub range: ByteRange,
}

impl CodeChunk {
    #[must_use]
    pub fn line_count(&self) -> u32 {
        self.line_end.saturating_sub(self.line_start)
    }
}

/// Turn final byte ranges into line-numbered chunks.
///
/// A range ending inside a line leaves that line to the chunk that starts
/// in it, so every physical line lands in exactly one chunk.
pub fn materialize(ranges: &[ByteRange], index: &SourceIndex) -> Result<Vec<CodeChunk>> {
    ranges
        .iter()
        .map(|&range| {
            let line_start = index.line_of(range.start)?;
            let line_end = index.line_of(range.end)?;
            Ok(CodeChunk {
                line_start,
                line_end,
                content: index.lines(line_start, line_end).collect::<Vec<_>>().join("\n"),
                range,
            })
        })
        .collect()
}
