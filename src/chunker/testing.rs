//! Hand-built syntax trees for exercising the chunker without a parser.
use super::syntax::SyntaxNode;

#[derive(Debug, Clone)]
pub struct FixtureNode {
    pub start: usize,
    pub end: usize,
    pub children: Vec<FixtureNode>,
    pub error: bool,
}

impl FixtureNode {
    pub fn leaf(start: usize, end: usize) -> Self {
        Self::branch(start, end, Vec::new())
    }

    pub fn branch(start: usize, end: usize, children: Vec<FixtureNode>) -> Self {
        Self {
            start,
            end,
            children,
            error: false,
        }
    }

    pub fn error(start: usize, end: usize) -> Self {
        Self {
            error: true,
            ..Self::leaf(start, end)
        }
    }

    /// Root spanning `text` with one leaf per non-empty line (newline excluded).
    pub fn lines_of(text: &str) -> Self {
        let mut children = Vec::new();
        let mut pos = 0;
        for line in text.split_inclusive('\n') {
            let body = line.trim_end_matches('\n').len();
            if body > 0 {
                children.push(Self::leaf(pos, pos + body));
            }
            pos += line.len();
        }
        Self::branch(0, text.len(), children)
    }
}

impl<'a> SyntaxNode for &'a FixtureNode {
    fn start_byte(&self) -> usize {
        self.start
    }

    fn end_byte(&self) -> usize {
        self.end
    }

    fn child_nodes(&self) -> Vec<Self> {
        let node: &'a FixtureNode = *self;
        node.children.iter().collect()
    }

    fn is_error(&self) -> bool {
        self.error
    }
}
