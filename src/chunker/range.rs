//! Half-open byte intervals and the packing accumulator built on them.
use serde::{Deserialize, Serialize};

use super::syntax::SyntaxNode;

/// A half-open `[start, end)` interval over a document's byte offsets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct ByteRange {
    pub start: usize,
    pub end: usize,
}

impl ByteRange {
    #[must_use]
    pub const fn new(start: usize, end: usize) -> Self {
        debug_assert!(end >= start);
        Self { start, end }
    }

    /// Zero-length range positioned at `offset`.
    #[must_use]
    pub const fn empty_at(offset: usize) -> Self {
        Self {
            start: offset,
            end: offset,
        }
    }

    /// Span covered by an AST node.
    pub fn of<N: SyntaxNode>(node: &N) -> Self {
        Self::new(node.start_byte(), node.end_byte())
    }

    #[must_use]
    pub const fn len(&self) -> usize {
        self.end - self.start
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.end == self.start
    }

    /// `self + next`: keeps this start and takes the other's end.
    ///
    /// The caller guarantees `next` does not begin before `self` ends.
    #[must_use]
    pub const fn concat(self, next: ByteRange) -> Self {
        Self {
            start: self.start,
            end: next.end,
        }
    }
}

/// Running group of sibling ranges while packing or merging.
///
/// `Empty` means no group is open (e.g. right after an oversized child was
/// recursed into); the next absorbed range opens a group at its own start.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Accumulator {
    Empty,
    Active(ByteRange),
}

impl Accumulator {
    /// Open, zero-length group anchored at `offset`.
    #[must_use]
    pub const fn anchored(offset: usize) -> Self {
        Self::Active(ByteRange::empty_at(offset))
    }

    /// Length the group would have after absorbing `next`.
    #[must_use]
    pub const fn len_with(&self, next: ByteRange) -> usize {
        match self {
            Self::Empty => next.len(),
            Self::Active(range) => range.concat(next).len(),
        }
    }

    /// The group as it would look after absorbing `next`.
    #[must_use]
    pub const fn peek_with(&self, next: ByteRange) -> ByteRange {
        match self {
            Self::Empty => next,
            Self::Active(range) => range.concat(next),
        }
    }

    pub fn absorb(&mut self, next: ByteRange) {
        *self = Self::Active(self.peek_with(next));
    }

    /// Close the group, returning it if it covers at least one byte.
    pub fn take(&mut self) -> Option<ByteRange> {
        match std::mem::replace(self, Self::Empty) {
            Self::Active(range) if !range.is_empty() => Some(range),
            _ => None,
        }
    }
}
