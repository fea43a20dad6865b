//! Syntax-aware source splitting.
//!
//! Pipeline for one document:
//! 1. [`TreeChunker`] packs sibling subtrees into ranges under `max_chars`,
//!    recursing only into subtrees that cannot fit on their own.
//! 2. [`connect_ranges`] closes the gaps so the ranges tile the root span.
//! 3. [`merge_by_lines`] coalesces neighbours until each group has
//!    `min_lines` non-blank lines.
//! 4. [`materialize`] maps the final ranges to line-numbered [`CodeChunk`]s.
//!
//! Everything here is synchronous and allocation-only; independent
//! documents can be split on separate threads without coordination.
pub mod connect;
pub mod materialize;
pub mod merge;
pub mod range;
pub mod source_index;
pub mod syntax;
pub mod tree;

#[cfg(test)]
pub(crate) mod testing;

pub use connect::connect_ranges;
pub use materialize::{CodeChunk, materialize};
pub use merge::merge_by_lines;
pub use range::{Accumulator, ByteRange};
pub use source_index::SourceIndex;
pub use syntax::SyntaxNode;
pub use tree::TreeChunker;

use thiserror::Error;

pub const DEFAULT_MAX_CHARS: u32 = 500;
pub const DEFAULT_MIN_LINES: u32 = 2;

/// Errors raised while splitting a document.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ChunkError {
    #[error("byte offset {offset} out of range for text of length {len}")]
    OutOfRange { offset: usize, len: usize },

    #[error("could not parse {language} source: {reason}")]
    Parse { language: String, reason: String },

    #[error("invalid chunker configuration: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, ChunkError>;

/// Validated splitting limits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SplitterConfig {
    max_chars: u32,
    min_lines: u32,
}

impl SplitterConfig {
    /// Both limits must be positive.
    pub fn new(max_chars: u32, min_lines: u32) -> Result<Self> {
        if max_chars == 0 {
            return Err(ChunkError::Config("max_chars must be positive".into()));
        }
        if min_lines == 0 {
            return Err(ChunkError::Config("min_lines must be positive".into()));
        }
        Ok(Self {
            max_chars,
            min_lines,
        })
    }

    #[must_use]
    pub const fn max_chars(&self) -> u32 {
        self.max_chars
    }

    #[must_use]
    pub const fn min_lines(&self) -> u32 {
        self.min_lines
    }
}

impl Default for SplitterConfig {
    fn default() -> Self {
        Self {
            max_chars: DEFAULT_MAX_CHARS,
            min_lines: DEFAULT_MIN_LINES,
        }
    }
}

/// Splits one parsed document into retrieval-sized chunks.
#[derive(Debug, Clone)]
pub struct CodeSplitter {
    language: String,
    config: SplitterConfig,
}

impl CodeSplitter {
    pub fn new(language: impl Into<String>, config: SplitterConfig) -> Self {
        Self {
            language: language.into(),
            config,
        }
    }

    #[must_use]
    pub fn language(&self) -> &str {
        &self.language
    }

    #[must_use]
    pub const fn config(&self) -> SplitterConfig {
        self.config
    }

    /// Split `root` (the parse of `index.text()`) into chunks.
    ///
    /// A tree whose root, or first top-level node, is an error node is
    /// rejected as a whole. An empty document yields no chunks.
    pub fn split<N: SyntaxNode>(&self, root: &N, index: &SourceIndex) -> Result<Vec<CodeChunk>> {
        let ranges = self.split_ranges(root, index)?;
        materialize(&ranges, index)
    }

    /// Same as [`split`](Self::split) but stops before materialization.
    pub fn split_ranges<N: SyntaxNode>(
        &self,
        root: &N,
        index: &SourceIndex,
    ) -> Result<Vec<ByteRange>> {
        self.reject_error_tree(root)?;

        let span = ByteRange::of(root);
        if span.end > index.text().len() {
            return Err(ChunkError::OutOfRange {
                offset: span.end,
                len: index.text().len(),
            });
        }

        let max_chars = usize::try_from(self.config.max_chars).unwrap_or(usize::MAX);
        let mut ranges = TreeChunker::new(max_chars).partition(root);
        connect_ranges(&mut ranges, span);
        merge_by_lines(&ranges, index, self.config.min_lines)
    }

    fn reject_error_tree<N: SyntaxNode>(&self, root: &N) -> Result<()> {
        let first_is_error = root
            .child_nodes()
            .first()
            .is_some_and(SyntaxNode::is_error);
        if root.is_error() || first_is_error {
            return Err(ChunkError::Parse {
                language: self.language.clone(),
                reason: "syntax error at top level".into(),
            });
        }
        Ok(())
    }
}
