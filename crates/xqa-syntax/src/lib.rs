//! Syntax tree representation for the XQA analyzer.
//!
//! The analyzer does not parse source text; it consumes a tree produced
//! by an external XQuery parser. This crate defines that tree: a flat
//! arena of nodes addressed by stable indices, a closed set of node
//! kinds the analyzer dispatches on, text recovery for interior nodes,
//! and the cursor-to-node descent used by the refactoring layer.

// Node kinds and the node record
pub mod node;
pub use node::{NodeId, NodeKind, SyntaxNode};

// Arena storage, builder, and point lookup
pub mod tree;
pub use tree::{SyntaxTree, TreeBuilder};
