//! Common types for the XQA analyzer.
//!
//! This crate provides the foundational types shared by all xqa crates:
//! - Line/column positions and source ranges (`Position`, `PositionRange`)
//! - Diagnostics (`Diagnostic`, `DiagnosticBag`, `DiagnosticCode`)

// Position/Range types for line/column source locations
pub mod position;
pub use position::{Position, PositionRange};

// Diagnostic collection
pub mod diagnostics;
pub use diagnostics::{Diagnostic, DiagnosticBag, DiagnosticCode, DiagnosticSeverity};
