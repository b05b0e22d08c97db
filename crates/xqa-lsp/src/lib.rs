//! Rename-query resolution for the XQA analyzer.
//!
//! Operates on an already-analyzed tree: given a cursor position it
//! classifies the selected node and computes the declaration plus every
//! reference of the symbol, leaving highlight-range math to the editor
//! front end.

pub mod refactor;
pub use refactor::{RefactorKind, RefactorProvider, RefactorResult};
