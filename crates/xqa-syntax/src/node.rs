//! Node kinds and the node record.

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use xqa_common::PositionRange;

/// Index of a node within its [`crate::SyntaxTree`] arena.
///
/// A `NodeId` is only meaningful for the tree that produced it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NodeId(pub u32);

impl NodeId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// The closed set of node kinds the analyzer knows about.
///
/// The external parser labels every production it emits; labels the
/// analyzer has no behavior for map to [`NodeKind::Other`], which is
/// traversed generically. Keeping the set closed lets every dispatch
/// site be an exhaustive `match`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NodeKind {
    // Module structure
    MainModule,
    LibraryModule,
    ModuleDecl,
    ModuleImport,
    SchemaImport,
    SchemaPrefix,
    NamespaceDecl,
    DefaultNamespaceDecl,

    // Functions
    FunctionDecl,
    ParamList,
    Param,
    FunctionCall,
    ArgumentList,

    // Scoping constructs
    StatementsAndOptionalExpr,
    BlockExpr,
    FlworExpr,
    LetBinding,
    ForBinding,
    TumblingWindowClause,
    SlidingWindowClause,
    WindowVars,
    PositionalVar,
    CurrentItem,
    PreviousItem,
    NextItem,
    CountClause,
    QuantifiedExpr,

    // Variables
    VarDeclStatement,
    VarDecl,
    VarName,
    VarRef,

    // Names and terminals
    EqName,
    QName,
    NcName,
    Wildcard,
    UriLiteral,
    Token,

    /// Any production the analyzer has no dedicated behavior for.
    Other,
}

impl NodeKind {
    /// Whether this construct declares the variables named by its direct
    /// `VarName`/`EqName` children.
    pub fn declares_variables(self) -> bool {
        matches!(
            self,
            NodeKind::Param
                | NodeKind::QuantifiedExpr
                | NodeKind::VarDeclStatement
                | NodeKind::VarDecl
                | NodeKind::LetBinding
                | NodeKind::ForBinding
                | NodeKind::TumblingWindowClause
                | NodeKind::SlidingWindowClause
                | NodeKind::WindowVars
                | NodeKind::PositionalVar
                | NodeKind::CurrentItem
                | NodeKind::PreviousItem
                | NodeKind::NextItem
                | NodeKind::CountClause
        )
    }

    /// FLWOR clauses whose bindings stay visible to their following
    /// siblings. Each opens a scope that the enclosing FLWOR closes.
    pub fn is_flwor_binding_clause(self) -> bool {
        matches!(
            self,
            NodeKind::LetBinding
                | NodeKind::ForBinding
                | NodeKind::TumblingWindowClause
                | NodeKind::SlidingWindowClause
                | NodeKind::WindowVars
                | NodeKind::CountClause
        )
    }
}

/// One syntax node: a kind, a source range, an optional literal value,
/// and parent/child links expressed as arena indices.
///
/// Interior nodes usually carry no value of their own; their text is
/// recovered by concatenating descendant values in order.
#[derive(Debug, Clone)]
pub struct SyntaxNode {
    pub kind: NodeKind,
    pub pos: PositionRange,
    pub value: Option<String>,
    pub parent: Option<NodeId>,
    pub children: SmallVec<[NodeId; 4]>,
}

impl SyntaxNode {
    pub fn new(kind: NodeKind, pos: PositionRange) -> Self {
        SyntaxNode {
            kind,
            pos,
            value: None,
            parent: None,
            children: SmallVec::new(),
        }
    }
}
