//! Diagnostic infrastructure.
//!
//! Semantic problems found during analysis are data, not control flow:
//! the walker records every problem it sees into a [`DiagnosticBag`] and
//! keeps going, so one pass reports everything at once.
//!
//! - `Diagnostic` - a single message with range, severity, and code
//! - `DiagnosticBag` - the ordered collection for one analysis pass
//! - `DiagnosticCode` - XQuery static-error codes plus analyzer warnings

use crate::position::PositionRange;
use serde::{Deserialize, Serialize};
use std::fmt;

/// The severity level of a diagnostic.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DiagnosticSeverity {
    /// A warning
    Warning = 2,
    /// An error (highest severity)
    Error = 1,
}

impl DiagnosticSeverity {
    /// Get the severity name for display.
    pub fn name(&self) -> &'static str {
        match self {
            DiagnosticSeverity::Error => "error",
            DiagnosticSeverity::Warning => "warning",
        }
    }

    /// Check if this is an error.
    pub fn is_error(&self) -> bool {
        matches!(self, DiagnosticSeverity::Error)
    }
}

impl fmt::Display for DiagnosticSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// The code identifying what kind of problem a diagnostic reports.
///
/// Errors carry the XQuery static-error code the front end already
/// understands; warnings use analyzer-local codes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DiagnosticCode {
    /// XPST0008: reference to an undeclared variable.
    #[serde(rename = "XPST0008")]
    UndeclaredVariable,
    /// XPST0081: a QName prefix that cannot be expanded to a namespace URI.
    #[serde(rename = "XPST0081")]
    UnresolvablePrefix,
    /// XQST0033: multiple bindings for the same namespace prefix.
    #[serde(rename = "XQST0033")]
    DuplicatePrefix,
    /// XQST0039: duplicate parameter name in a function declaration.
    #[serde(rename = "XQST0039")]
    DuplicateParameter,
    /// XQST0049: duplicate variable declaration in the same scope.
    #[serde(rename = "XQST0049")]
    DuplicateVariable,
    /// A declared variable that is never referenced.
    #[serde(rename = "unused-variable")]
    UnusedVariable,
    /// A declared namespace prefix that is never referenced.
    #[serde(rename = "unused-prefix")]
    UnusedPrefix,
    /// A namespace URI already bound under an earlier prefix.
    #[serde(rename = "redundant-namespace")]
    RedundantNamespace,
}

impl DiagnosticCode {
    /// The code as the front end sees it.
    pub fn as_str(&self) -> &'static str {
        match self {
            DiagnosticCode::UndeclaredVariable => "XPST0008",
            DiagnosticCode::UnresolvablePrefix => "XPST0081",
            DiagnosticCode::DuplicatePrefix => "XQST0033",
            DiagnosticCode::DuplicateParameter => "XQST0039",
            DiagnosticCode::DuplicateVariable => "XQST0049",
            DiagnosticCode::UnusedVariable => "unused-variable",
            DiagnosticCode::UnusedPrefix => "unused-prefix",
            DiagnosticCode::RedundantNamespace => "redundant-namespace",
        }
    }
}

/// A diagnostic message with range, severity, and code.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    /// The source range the diagnostic points at
    pub pos: PositionRange,
    /// The severity level
    pub severity: DiagnosticSeverity,
    /// The human-readable message
    pub message: String,
    /// The diagnostic code
    pub code: DiagnosticCode,
}

impl Diagnostic {
    /// Create an error diagnostic.
    pub fn error(pos: PositionRange, message: impl Into<String>, code: DiagnosticCode) -> Self {
        Diagnostic {
            pos,
            severity: DiagnosticSeverity::Error,
            message: message.into(),
            code,
        }
    }

    /// Create a warning diagnostic.
    pub fn warning(pos: PositionRange, message: impl Into<String>, code: DiagnosticCode) -> Self {
        Diagnostic {
            pos,
            severity: DiagnosticSeverity::Warning,
            message: message.into(),
            code,
        }
    }

    /// Check if this is an error.
    pub fn is_error(&self) -> bool {
        self.severity.is_error()
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}[{}]: {}", self.severity, self.code.as_str(), self.message)
    }
}

/// The ordered diagnostic collection for one analysis pass.
///
/// Diagnostics are kept in the order they were reported (visitation
/// order) and are never deduplicated.
#[derive(Clone, Debug, Default)]
pub struct DiagnosticBag {
    diagnostics: Vec<Diagnostic>,
    error_count: usize,
    warning_count: usize,
}

impl DiagnosticBag {
    /// Create a new empty diagnostic bag.
    pub fn new() -> Self {
        DiagnosticBag::default()
    }

    /// Add a diagnostic.
    pub fn add(&mut self, diagnostic: Diagnostic) {
        match diagnostic.severity {
            DiagnosticSeverity::Error => self.error_count += 1,
            DiagnosticSeverity::Warning => self.warning_count += 1,
        }
        self.diagnostics.push(diagnostic);
    }

    /// Add an error diagnostic.
    pub fn error(&mut self, pos: PositionRange, message: impl Into<String>, code: DiagnosticCode) {
        self.add(Diagnostic::error(pos, message, code));
    }

    /// Add a warning diagnostic.
    pub fn warning(
        &mut self,
        pos: PositionRange,
        message: impl Into<String>,
        code: DiagnosticCode,
    ) {
        self.add(Diagnostic::warning(pos, message, code));
    }

    /// Check if there are any errors.
    pub fn has_errors(&self) -> bool {
        self.error_count > 0
    }

    /// Get the number of diagnostics.
    pub fn len(&self) -> usize {
        self.diagnostics.len()
    }

    /// Check if the bag is empty.
    pub fn is_empty(&self) -> bool {
        self.diagnostics.is_empty()
    }

    /// Get the error count.
    pub fn error_count(&self) -> usize {
        self.error_count
    }

    /// Get the warning count.
    pub fn warning_count(&self) -> usize {
        self.warning_count
    }

    /// Get all diagnostics as a slice.
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    /// Iterate over diagnostics.
    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics.iter()
    }

    /// Get only diagnostics with the given code.
    pub fn by_code(&self, code: DiagnosticCode) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics.iter().filter(move |d| d.code == code)
    }

    /// Take all diagnostics, leaving the bag empty.
    pub fn take(&mut self) -> Vec<Diagnostic> {
        self.error_count = 0;
        self.warning_count = 0;
        std::mem::take(&mut self.diagnostics)
    }
}

impl IntoIterator for DiagnosticBag {
    type Item = Diagnostic;
    type IntoIter = std::vec::IntoIter<Diagnostic>;

    fn into_iter(self) -> Self::IntoIter {
        self.diagnostics.into_iter()
    }
}

impl<'a> IntoIterator for &'a DiagnosticBag {
    type Item = &'a Diagnostic;
    type IntoIter = std::slice::Iter<'a, Diagnostic>;

    fn into_iter(self) -> Self::IntoIter {
        self.diagnostics.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn range() -> PositionRange {
        PositionRange::new(0, 0, 0, 4)
    }

    #[test]
    fn bag_counts_by_severity() {
        let mut bag = DiagnosticBag::new();
        assert!(bag.is_empty());

        bag.error(range(), "no such variable", DiagnosticCode::UndeclaredVariable);
        bag.warning(range(), "never used", DiagnosticCode::UnusedVariable);

        assert_eq!(bag.len(), 2);
        assert!(bag.has_errors());
        assert_eq!(bag.error_count(), 1);
        assert_eq!(bag.warning_count(), 1);
    }

    #[test]
    fn bag_preserves_insertion_order() {
        let mut bag = DiagnosticBag::new();
        bag.warning(range(), "first", DiagnosticCode::UnusedPrefix);
        bag.error(range(), "second", DiagnosticCode::UnresolvablePrefix);

        let messages: Vec<_> = bag.iter().map(|d| d.message.as_str()).collect();
        assert_eq!(messages, vec!["first", "second"]);
    }

    #[test]
    fn by_code_filters() {
        let mut bag = DiagnosticBag::new();
        bag.error(range(), "a", DiagnosticCode::UndeclaredVariable);
        bag.error(range(), "b", DiagnosticCode::DuplicateVariable);
        bag.error(range(), "c", DiagnosticCode::UndeclaredVariable);

        assert_eq!(bag.by_code(DiagnosticCode::UndeclaredVariable).count(), 2);
    }

    #[test]
    fn take_leaves_the_bag_empty() {
        let mut bag = DiagnosticBag::new();
        bag.error(range(), "a", DiagnosticCode::UndeclaredVariable);

        let taken = bag.take();
        assert_eq!(taken.len(), 1);
        assert!(bag.is_empty());
        assert_eq!(bag.error_count(), 0);
    }

    #[test]
    fn codes_serialize_to_front_end_strings() {
        let diag = Diagnostic::error(range(), "x", DiagnosticCode::UndeclaredVariable);
        let json = serde_json::to_value(&diag).unwrap();
        assert_eq!(json["code"], "XPST0008");
        assert_eq!(json["severity"], "error");
    }
}
