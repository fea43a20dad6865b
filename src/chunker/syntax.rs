//! Read-only view over the parser's syntax tree.
//!
//! The chunker never owns the tree; it walks copyable handles (or plain
//! references) into a tree built and kept alive by the caller.

/// The three things the chunker needs from an AST node.
pub trait SyntaxNode: Sized {
    fn start_byte(&self) -> usize;

    fn end_byte(&self) -> usize;

    /// Direct children in document order.
    fn child_nodes(&self) -> Vec<Self>;

    /// Whether the parser marked this node as unparseable input.
    fn is_error(&self) -> bool {
        false
    }
}

impl<'tree> SyntaxNode for tree_sitter::Node<'tree> {
    fn start_byte(&self) -> usize {
        tree_sitter::Node::start_byte(self)
    }

    fn end_byte(&self) -> usize {
        tree_sitter::Node::end_byte(self)
    }

    fn child_nodes(&self) -> Vec<Self> {
        let mut cursor = self.walk();
        tree_sitter::Node::children(self, &mut cursor).collect()
    }

    fn is_error(&self) -> bool {
        tree_sitter::Node::is_error(self)
    }
}
