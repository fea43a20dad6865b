//! Packing of an AST into budget-sized byte ranges.
use super::range::{Accumulator, ByteRange};
use super::syntax::SyntaxNode;

/// Greedily packs runs of sibling subtrees into ranges of at most
/// `max_chars` bytes, descending only into children that cannot fit alone.
#[derive(Debug, Clone, Copy)]
pub struct TreeChunker {
    max_chars: usize,
}

impl TreeChunker {
    #[must_use]
    pub const fn new(max_chars: usize) -> Self {
        Self { max_chars }
    }

    /// Partition `node` into ordered, non-overlapping ranges.
    ///
    /// Ranges may leave gaps between siblings (whitespace the parser does not
    /// attach to any node). A node with no packable children is emitted whole
    /// when it has a non-zero span, even if it exceeds the budget; a
    /// zero-length node yields nothing.
    ///
    /// Oversized children are descended into through a heap-allocated frame
    /// stack; tree depth never grows the call stack.
    pub fn partition<N: SyntaxNode>(&self, node: &N) -> Vec<ByteRange> {
        let mut out = Vec::new();
        let mut stack = vec![Frame::open(node, 0)];

        loop {
            let Some(frame) = stack.last_mut() else {
                break;
            };
            let Some(child) = frame.children.next() else {
                if let Some(mut done) = stack.pop() {
                    out.extend(done.acc.take());
                    if out.len() == done.emitted_before && !done.span.is_empty() {
                        out.push(done.span);
                    }
                }
                continue;
            };

            let span = ByteRange::of(&child);
            if span.len() > self.max_chars {
                out.extend(frame.acc.take());
                stack.push(Frame::open(&child, out.len()));
            } else if frame.acc.len_with(span) > self.max_chars {
                out.extend(frame.acc.take());
                frame.acc = Accumulator::Active(span);
            } else {
                frame.acc.absorb(span);
            }
        }

        out
    }
}

/// A node whose children are still being packed.
struct Frame<N> {
    span: ByteRange,
    children: std::vec::IntoIter<N>,
    acc: Accumulator,
    /// Output length when the node was entered; unchanged at exit means the
    /// node had nothing packable and is emitted whole.
    emitted_before: usize,
}

impl<N: SyntaxNode> Frame<N> {
    fn open(node: &N, emitted_before: usize) -> Self {
        Self {
            span: ByteRange::of(node),
            children: node.child_nodes().into_iter(),
            acc: Accumulator::anchored(node.start_byte()),
            emitted_before,
        }
    }
}
