//! Namespace-prefix resolution.
//!
//! Prefixes are not block-scoped: one flat table serves the whole tree.
//! A prefix resolves against three sources: the process-wide well-known
//! table, prefixes bound by the module declaration or module imports,
//! and explicit declarations. Resolvability is checked immediately at
//! each use; the unused/duplicate sweeps need the complete table and
//! run once after the walk.

use indexmap::IndexMap;
use once_cell::sync::Lazy;
use rustc_hash::{FxHashMap, FxHashSet};
use serde::{Deserialize, Serialize};
use xqa_common::{DiagnosticBag, DiagnosticCode, PositionRange};

/// The default function namespace before any prologue declaration.
pub const XPATH_FUNCTIONS_NS: &str = "http://www.w3.org/2005/xpath-functions";

/// Prefixes every module can use without declaring them.
///
/// Loaded once per process on first use and immutable afterwards; safe
/// to share between analysis sessions.
static WELL_KNOWN: Lazy<FxHashMap<&'static str, &'static str>> = Lazy::new(|| {
    let mut table = FxHashMap::default();
    table.insert("local", "http://www.w3.org/2005/xquery-local-functions");
    table.insert("xs", "http://www.w3.org/2001/XMLSchema");
    table.insert("fn", "http://www.w3.org/2005/xpath-functions");
    table.insert("an", "http://www.zorba-xquery.com/annotations");
    table.insert("db", "http://www.zorba-xquery.com/modules/store/static/collections/dml");
    table.insert("idx", "http://www.zorba-xquery.com/modules/store/static/indexes/dml");
    table.insert("zerr", "http://www.zorba-xquery.com/errors");
    table.insert("err", "http://www.w3.org/2005/xqt-error");
    table
});

/// How a prefix entered the table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NamespaceKind {
    /// `declare namespace p = "..."`
    Decl,
    /// `import module namespace p = "..."`
    Module,
    /// `import schema namespace p = "..."`
    Schema,
}

/// One declared prefix with its provenance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamespaceEntry {
    pub uri: String,
    pub pos: PositionRange,
    pub kind: NamespaceKind,
}

/// The combined prefix table for one analysis pass.
#[derive(Debug, Clone, Default)]
pub struct Namespaces {
    /// Explicitly declared prefixes, in declaration order.
    declared: IndexMap<String, NamespaceEntry>,
    /// Prefixes bound outside the declared table (module declaration,
    /// module imports). Resolvable but never swept.
    bound: FxHashMap<String, String>,
    /// Prefixes seen in use anywhere in the tree.
    referenced: FxHashSet<String>,
    /// Overridden by `declare default function namespace`.
    default_function_namespace: Option<String>,
}

impl Namespaces {
    pub fn new() -> Namespaces {
        Namespaces::default()
    }

    /// Bind a prefix without declaring it (the module declaration's own
    /// prefix). Never flagged unused or duplicate.
    pub fn bind(&mut self, prefix: &str, uri: &str) {
        self.bound.insert(prefix.to_string(), uri.to_string());
    }

    /// Record an explicit declaration or import of `prefix`.
    ///
    /// A prefix can be bound once; later bindings are `XQST0033` errors
    /// and the first entry is retained. Module imports additionally bind
    /// the prefix for resolution.
    pub fn declare(
        &mut self,
        prefix: &str,
        uri: &str,
        pos: PositionRange,
        kind: NamespaceKind,
        diagnostics: &mut DiagnosticBag,
    ) {
        if self.declared.contains_key(prefix) {
            diagnostics.error(
                pos,
                format!("\"{prefix}\": namespace prefix already bound."),
                DiagnosticCode::DuplicatePrefix,
            );
            return;
        }
        self.declared.insert(
            prefix.to_string(),
            NamespaceEntry {
                uri: uri.to_string(),
                pos,
                kind,
            },
        );
        if kind == NamespaceKind::Module {
            self.bind(prefix, uri);
        }
    }

    /// Mark a prefix as used.
    pub fn reference(&mut self, prefix: &str) {
        self.referenced.insert(prefix.to_string());
    }

    /// Whether `prefix` resolves against any of the three sources.
    pub fn is_resolvable(&self, prefix: &str) -> bool {
        self.declared.contains_key(prefix)
            || self.bound.contains_key(prefix)
            || WELL_KNOWN.contains_key(prefix)
    }

    /// Resolve a prefix to its namespace URI.
    pub fn resolve(&self, prefix: &str) -> Option<&str> {
        if let Some(entry) = self.declared.get(prefix) {
            return Some(&entry.uri);
        }
        if let Some(uri) = self.bound.get(prefix) {
            return Some(uri);
        }
        WELL_KNOWN.get(prefix).copied()
    }

    /// Look up the declaration record for a prefix.
    pub fn get(&self, prefix: &str) -> Option<&NamespaceEntry> {
        self.declared.get(prefix)
    }

    /// Iterate declared prefixes in declaration order.
    pub fn declared(&self) -> impl Iterator<Item = (&str, &NamespaceEntry)> {
        self.declared.iter().map(|(p, e)| (p.as_str(), e))
    }

    /// Check a prefix at its point of use: unresolvable prefixes are
    /// `XPST0081` errors right away (this does not wait for the end of
    /// the pass); resolvable ones are marked referenced.
    pub fn check_prefix(
        &mut self,
        prefix: &str,
        pos: PositionRange,
        diagnostics: &mut DiagnosticBag,
    ) {
        if self.is_resolvable(prefix) {
            self.reference(prefix);
        } else {
            diagnostics.error(
                pos,
                format!("\"{prefix}\": can not expand namespace prefix."),
                DiagnosticCode::UnresolvablePrefix,
            );
        }
    }

    /// Record the default function namespace from the prologue.
    pub fn set_default_function_namespace(&mut self, uri: &str) {
        self.default_function_namespace = Some(uri.to_string());
    }

    /// The namespace unprefixed function names resolve into.
    pub fn default_function_namespace(&self) -> &str {
        self.default_function_namespace
            .as_deref()
            .unwrap_or(XPATH_FUNCTIONS_NS)
    }

    /// End-of-pass sweeps over the completed table: warn on explicitly
    /// declared prefixes that were never referenced, and on URIs that
    /// are redundantly re-declared under additional prefixes (the first
    /// prefix for a URI wins; later `Decl` entries are flagged).
    pub fn finish(&self, diagnostics: &mut DiagnosticBag) {
        let mut by_uri: IndexMap<&str, (&str, Vec<PositionRange>)> = IndexMap::new();

        for (prefix, entry) in &self.declared {
            if entry.kind == NamespaceKind::Decl && !self.referenced.contains(prefix) {
                diagnostics.warning(
                    entry.pos,
                    format!("\"{prefix}\": unused namespace prefix."),
                    DiagnosticCode::UnusedPrefix,
                );
            }
            match by_uri.get_mut(entry.uri.as_str()) {
                None => {
                    by_uri.insert(entry.uri.as_str(), (prefix.as_str(), vec![entry.pos]));
                }
                Some((_, positions)) if entry.kind == NamespaceKind::Decl => {
                    positions.push(entry.pos);
                }
                Some(_) => {}
            }
        }

        for (uri, (first_prefix, positions)) in &by_uri {
            for pos in positions.iter().skip(1) {
                diagnostics.warning(
                    *pos,
                    format!("\"{uri}\": is already available with the prefix \"{first_prefix}\"."),
                    DiagnosticCode::RedundantNamespace,
                );
            }
        }
    }
}
