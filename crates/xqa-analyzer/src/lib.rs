//! Semantic analysis for XQuery syntax trees.
//!
//! One call to [`analyze`] runs a single depth-first pass over a tree
//! produced by the external parser and returns everything the editor
//! front end consumes: diagnostics, a structural outline, the resolved
//! namespace table, and the scope tree used by later rename queries.
//!
//! Nothing persists between calls; every [`Analysis`] is built fresh
//! and owned by the caller.

// Scope tree (static context)
pub mod sctx;
pub use sctx::{Scope, ScopeId, ScopeTree, VarDecl, VarRef};

// Namespace prefix resolution
pub mod namespaces;
pub use namespaces::{NamespaceEntry, NamespaceKind, Namespaces};

// Structural outline
pub mod outline;
pub use outline::{OutlineEntry, OutlineIcon};

// The tree-walking translator
pub mod translator;
pub use translator::{Analysis, analyze};
