//! Arena storage for syntax trees.

use crate::node::{NodeId, NodeKind, SyntaxNode};
use xqa_common::{Position, PositionRange};

/// Arena-based storage for a syntax tree.
///
/// Nodes are stored contiguously and referenced by index; node 0, when
/// present, is the root. Parent links are plain indices, so walking up
/// (needed to recover call arity) is a dereference with no ownership
/// ambiguity.
#[derive(Debug, Default, Clone)]
pub struct SyntaxTree {
    nodes: Vec<SyntaxNode>,
}

impl SyntaxTree {
    pub fn new() -> SyntaxTree {
        SyntaxTree { nodes: Vec::new() }
    }

    /// The root node, or `None` for an empty tree.
    pub fn root(&self) -> Option<NodeId> {
        if self.nodes.is_empty() {
            None
        } else {
            Some(NodeId(0))
        }
    }

    /// Get a node by index.
    pub fn get(&self, id: NodeId) -> Option<&SyntaxNode> {
        self.nodes.get(id.index())
    }

    /// Get a node by index, panicking on a stale id.
    pub fn node(&self, id: NodeId) -> &SyntaxNode {
        &self.nodes[id.index()]
    }

    /// Kind of the node at `id`.
    pub fn kind(&self, id: NodeId) -> NodeKind {
        self.node(id).kind
    }

    /// Source range of the node at `id`.
    pub fn pos(&self, id: NodeId) -> PositionRange {
        self.node(id).pos
    }

    /// Children of the node at `id`, in source order.
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.node(id).children
    }

    /// Parent of the node at `id`.
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).parent
    }

    /// Get the number of nodes.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Check if the tree is empty.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Iterate over every node id in creation (pre-order) order.
    pub fn ids(&self) -> impl Iterator<Item = NodeId> + '_ {
        (0..self.nodes.len() as u32).map(NodeId)
    }

    /// Recover the text of a node: its own literal value if it has one,
    /// otherwise the concatenation of its children's texts in order.
    pub fn text(&self, id: NodeId) -> String {
        let node = self.node(id);
        match &node.value {
            Some(value) => value.clone(),
            None => {
                let mut out = String::new();
                self.collect_text(id, &mut out);
                out
            }
        }
    }

    fn collect_text(&self, id: NodeId, out: &mut String) {
        let node = self.node(id);
        if let Some(value) = &node.value {
            out.push_str(value);
        } else {
            for &child in node.children.iter() {
                self.collect_text(child, out);
            }
        }
    }

    /// Find the deepest node containing `point`, descending from the
    /// root. The first containing child wins at every level; a node
    /// whose children do not contain the point is itself the answer.
    ///
    /// `exclusive` containment admits a cursor sitting one column past
    /// a range's end, which is what editor selections need.
    ///
    /// The descent recurses one frame per tree level; callers feeding
    /// untrusted input must bound its nesting depth.
    pub fn node_at(&self, point: Position, exclusive: bool) -> Option<NodeId> {
        let root = self.root()?;
        self.descend(root, point, exclusive)
    }

    fn descend(&self, id: NodeId, point: Position, exclusive: bool) -> Option<NodeId> {
        if !self.node(id).pos.contains(point, exclusive) {
            return None;
        }
        for &child in self.children(id) {
            if let Some(hit) = self.descend(child, point, exclusive) {
                return Some(hit);
            }
        }
        Some(id)
    }
}

/// Incremental builder for well-formed [`SyntaxTree`]s.
///
/// Parent and child links are maintained automatically; external parser
/// adapters and tests construct trees through this instead of wiring
/// indices by hand.
#[derive(Debug, Default)]
pub struct TreeBuilder {
    tree: SyntaxTree,
    stack: Vec<NodeId>,
}

impl TreeBuilder {
    pub fn new() -> TreeBuilder {
        TreeBuilder::default()
    }

    fn add(&mut self, mut node: SyntaxNode) -> NodeId {
        let id = NodeId(self.tree.nodes.len() as u32);
        if let Some(&parent) = self.stack.last() {
            node.parent = Some(parent);
            self.tree.nodes[parent.index()].children.push(id);
        }
        self.tree.nodes.push(node);
        id
    }

    /// Open an interior node; subsequent nodes become its children until
    /// the matching [`TreeBuilder::close`].
    pub fn open(&mut self, kind: NodeKind, pos: PositionRange) -> NodeId {
        let id = self.add(SyntaxNode::new(kind, pos));
        self.stack.push(id);
        id
    }

    /// Close the most recently opened node.
    pub fn close(&mut self) {
        self.stack.pop().expect("close() without a matching open()");
    }

    /// Add a childless node.
    pub fn leaf(&mut self, kind: NodeKind, pos: PositionRange) -> NodeId {
        self.add(SyntaxNode::new(kind, pos))
    }

    /// Add a childless node carrying a literal value.
    pub fn token(&mut self, kind: NodeKind, pos: PositionRange, value: impl Into<String>) -> NodeId {
        let mut node = SyntaxNode::new(kind, pos);
        node.value = Some(value.into());
        self.add(node)
    }

    /// Finish building. Every opened node must have been closed.
    pub fn finish(self) -> SyntaxTree {
        assert!(self.stack.is_empty(), "finish() with {} unclosed node(s)", self.stack.len());
        self.tree
    }
}
