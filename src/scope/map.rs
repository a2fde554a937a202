use crate::model::Span;

use super::selector::ScopeSelector;

/// One tagged range. Nodes form a tree: a node's parent always encloses it
/// and is stored at a lower index.
#[derive(Debug, Clone)]
struct ScopeNode {
    span: Span,
    scope: String,
    parent: Option<usize>,
    token: bool,
}

/// Scope tags of a whole buffer
#[derive(Debug, Clone, Default)]
pub struct ScopeMap {
    base: String,
    nodes: Vec<ScopeNode>,
}

impl ScopeMap {
    /// Scope stack at `point`, outermost first
    pub fn stack_at(&self, point: usize) -> Vec<&str> {
        let mut stack = vec![self.base.as_str()];
        stack.extend(
            self.nodes
                .iter()
                .filter(|node| node.span.contains(point))
                .map(|node| node.scope.as_str()),
        );
        stack
    }

    /// Token spans whose own scope stack matches `selector`
    pub fn find_by_selector(&self, selector: &ScopeSelector) -> Vec<Span> {
        self.nodes
            .iter()
            .enumerate()
            .filter(|(_, node)| node.token)
            .filter(|(idx, _)| selector.matches(&self.stack_of(*idx)))
            .map(|(_, node)| node.span)
            .collect()
    }

    fn stack_of(&self, idx: usize) -> Vec<&str> {
        let mut chain = Vec::new();
        let mut current = Some(idx);
        while let Some(i) = current {
            chain.push(self.nodes[i].scope.as_str());
            current = self.nodes[i].parent;
        }
        chain.push(self.base.as_str());
        chain.reverse();
        chain
    }

    pub fn base(&self) -> &str {
        &self.base
    }
}

/// Incremental construction of a [`ScopeMap`] while scanning a buffer
pub struct ScopeBuilder {
    base: String,
    nodes: Vec<ScopeNode>,
    open: Vec<usize>,
    len: usize,
}

impl ScopeBuilder {
    /// `len` is the buffer length in characters
    pub fn new(base: &str, len: usize) -> Self {
        Self {
            base: base.to_string(),
            nodes: Vec::new(),
            open: Vec::new(),
            len,
        }
    }

    /// Open a container scope at `start`; close it with [`ScopeBuilder::close`]
    pub fn open(&mut self, scope: impl Into<String>, start: usize) -> usize {
        let idx = self.push(scope.into(), Span::new(start, usize::MAX), false);
        self.open.push(idx);
        idx
    }

    /// Close the innermost open scope
    pub fn close(&mut self, end: usize) {
        if let Some(idx) = self.open.pop() {
            self.nodes[idx].span.end = end.max(self.nodes[idx].span.start);
        }
    }

    /// Add a leaf token inside the innermost open scope
    pub fn token(&mut self, scope: impl Into<String>, start: usize, end: usize) -> usize {
        self.push(scope.into(), Span::new(start, end), true)
    }

    /// Add a closed container scope inside the innermost open scope
    pub fn region(&mut self, scope: impl Into<String>, start: usize, end: usize) -> usize {
        self.push(scope.into(), Span::new(start, end), false)
    }

    pub fn rename(&mut self, idx: usize, scope: impl Into<String>) {
        if let Some(node) = self.nodes.get_mut(idx) {
            node.scope = scope.into();
        }
    }

    /// Exclusive end for a scope that runs to the end of the buffer.
    ///
    /// Unterminated scopes reach one past the last character so that a caret
    /// sitting at the end of the buffer is still inside them.
    pub fn unterminated_end(&self) -> usize {
        self.len + 1
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn finish(mut self) -> ScopeMap {
        let end = self.unterminated_end();
        while !self.open.is_empty() {
            self.close(end);
        }
        ScopeMap {
            base: self.base,
            nodes: self.nodes,
        }
    }

    fn push(&mut self, scope: String, span: Span, token: bool) -> usize {
        let idx = self.nodes.len();
        self.nodes.push(ScopeNode {
            span,
            scope,
            parent: self.open.last().copied(),
            token,
        });
        idx
    }
}
