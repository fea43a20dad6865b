//! Byte-offset to line-number mapping for one source text.
use super::range::ByteRange;
use super::{ChunkError, Result};

/// Pre-computed line starts of a source text.
///
/// Line `k` (1-based) starts at byte `line_starts[k - 1]`. Lines are split on
/// `\n`; a trailing `\r` is not part of a line's content.
#[derive(Debug, Clone)]
pub struct SourceIndex {
    text: String,
    line_starts: Vec<usize>,
}

impl SourceIndex {
    pub fn new(text: impl Into<String>) -> Self {
        let text = text.into();
        let mut line_starts = Vec::new();
        let mut pos = 0;
        for line in text.split_inclusive('\n') {
            line_starts.push(pos);
            pos += line.len();
        }
        Self { text, line_starts }
    }

    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Number of physical lines.
    #[must_use]
    pub fn line_count(&self) -> usize {
        self.line_starts.len()
    }

    /// 1-based line containing `byte_idx`.
    ///
    /// The end of the text maps one past the last line, so a range ending at
    /// the end of the document still includes its final line.
    pub fn line_of(&self, byte_idx: usize) -> Result<u32> {
        let len = self.text.len();
        if byte_idx > len {
            return Err(ChunkError::OutOfRange {
                offset: byte_idx,
                len,
            });
        }
        let line = if byte_idx == len {
            self.line_starts.len() + 1
        } else {
            self.line_starts.partition_point(|&start| start <= byte_idx)
        };
        Ok(u32::try_from(line).unwrap_or(u32::MAX))
    }

    /// Content of 1-based `line`, without its line terminator.
    #[must_use]
    pub fn line(&self, line: u32) -> Option<&str> {
        let idx = usize::try_from(line).ok()?.checked_sub(1)?;
        let start = *self.line_starts.get(idx)?;
        let end = self
            .line_starts
            .get(idx + 1)
            .copied()
            .unwrap_or(self.text.len());
        let raw = &self.text[start..end];
        let raw = raw.strip_suffix('\n').unwrap_or(raw);
        Some(raw.strip_suffix('\r').unwrap_or(raw))
    }

    /// Lines in `[line_start, line_end)`, clamped to the document.
    pub fn lines(&self, line_start: u32, line_end: u32) -> impl Iterator<Item = &str> + '_ {
        (line_start..line_end).filter_map(move |line| self.line(line))
    }

    /// Count of lines touched by `range` that hold more than whitespace.
    pub fn non_blank_line_count(&self, range: ByteRange) -> Result<u32> {
        let line_start = self.line_of(range.start)?;
        let line_end = self.line_of(range.end)?;
        let count = self
            .lines(line_start, line_end)
            .filter(|line| !line.trim().is_empty())
            .count();
        Ok(u32::try_from(count).unwrap_or(u32::MAX))
    }
}
