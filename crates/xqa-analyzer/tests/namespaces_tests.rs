//! Namespace-prefix handling driven through the full analysis pass.

use xqa_analyzer::analyze;
use xqa_common::{DiagnosticCode, PositionRange};
use xqa_syntax::{NodeKind, SyntaxTree, TreeBuilder};

fn span(line: u32, start: u32, end: u32) -> PositionRange {
    PositionRange::new(line, start, line, end)
}

struct ModuleBuilder {
    b: TreeBuilder,
    line: u32,
}

/// Builds a main module one prologue/body line at a time.
impl ModuleBuilder {
    fn new() -> ModuleBuilder {
        let mut b = TreeBuilder::new();
        b.open(NodeKind::MainModule, PositionRange::new(0, 0, 99, 0));
        ModuleBuilder { b, line: 0 }
    }

    fn next_line(&mut self) -> u32 {
        let line = self.line;
        self.line += 1;
        line
    }

    fn namespace_decl(&mut self, prefix: &str, uri: &str) -> PositionRange {
        let line = self.next_line();
        let pos = span(line, 0, 40);
        self.b.open(NodeKind::NamespaceDecl, pos);
        self.b.token(NodeKind::NcName, span(line, 18, 18 + prefix.len() as u32), prefix);
        self.b.token(NodeKind::UriLiteral, span(line, 22, 38), format!("\"{uri}\""));
        self.b.close();
        pos
    }

    fn module_import(&mut self, prefix: &str, uri: &str, hint: Option<&str>) -> PositionRange {
        let line = self.next_line();
        let pos = span(line, 0, 60);
        self.b.open(NodeKind::ModuleImport, pos);
        self.b.token(NodeKind::NcName, span(line, 24, 24 + prefix.len() as u32), prefix);
        self.b.token(NodeKind::UriLiteral, span(line, 30, 45), format!("\"{uri}\""));
        if let Some(hint) = hint {
            self.b.token(NodeKind::UriLiteral, span(line, 48, 58), format!("\"{hint}\""));
        }
        self.b.close();
        pos
    }

    fn eq_name(&mut self, text: &str) -> PositionRange {
        let line = self.next_line();
        let pos = span(line, 0, text.len() as u32);
        self.b.token(NodeKind::EqName, pos, text);
        pos
    }

    fn finish(mut self) -> SyntaxTree {
        self.b.close();
        self.b.finish()
    }
}

#[test]
fn undefined_prefix_is_reported_at_the_usage() {
    let mut m = ModuleBuilder::new();
    let use_pos = m.eq_name("ghost:item");
    let analysis = analyze(&m.finish());

    let errors: Vec<_> = analysis
        .diagnostics
        .iter()
        .filter(|d| d.code == DiagnosticCode::UnresolvablePrefix)
        .collect();
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].pos, use_pos);
    assert!(errors[0].message.contains("\"ghost\""));
}

#[test]
fn well_known_prefixes_need_no_declaration() {
    let mut m = ModuleBuilder::new();
    m.eq_name("fn:concat");
    m.eq_name("xs:integer");
    let analysis = analyze(&m.finish());
    assert!(analysis.diagnostics.is_empty(), "{:?}", analysis.diagnostics);
}

#[test]
fn declared_prefix_resolves_and_counts_as_used() {
    let mut m = ModuleBuilder::new();
    m.namespace_decl("foo", "urn:foo");
    m.eq_name("foo:bar");
    let analysis = analyze(&m.finish());

    assert!(analysis.diagnostics.is_empty(), "{:?}", analysis.diagnostics);
    assert_eq!(analysis.namespaces.resolve("foo"), Some("urn:foo"));
}

#[test]
fn unused_declared_prefix_warns_once() {
    let mut m = ModuleBuilder::new();
    let decl_pos = m.namespace_decl("quiet", "urn:quiet");
    let analysis = analyze(&m.finish());

    assert_eq!(analysis.diagnostics.len(), 1);
    let diag = &analysis.diagnostics[0];
    assert_eq!(diag.code, DiagnosticCode::UnusedPrefix);
    assert_eq!(diag.pos, decl_pos);
    assert_eq!(diag.message, "\"quiet\": unused namespace prefix.");
}

#[test]
fn duplicate_uri_warns_at_the_second_declaration_naming_the_first() {
    // Scenario: namespace a and b both bound to urn:x.
    let mut m = ModuleBuilder::new();
    m.namespace_decl("a", "urn:x");
    let b_pos = m.namespace_decl("b", "urn:x");
    m.eq_name("a:one");
    m.eq_name("b:two");
    let analysis = analyze(&m.finish());

    let redundant: Vec<_> = analysis
        .diagnostics
        .iter()
        .filter(|d| d.code == DiagnosticCode::RedundantNamespace)
        .collect();
    assert_eq!(redundant.len(), 1);
    assert_eq!(redundant[0].pos, b_pos);
    assert_eq!(
        redundant[0].message,
        "\"urn:x\": is already available with the prefix \"a\"."
    );
}

#[test]
fn rebinding_a_prefix_is_a_duplicate_prefix_error() {
    let mut m = ModuleBuilder::new();
    m.namespace_decl("p", "urn:a");
    let second = m.namespace_decl("p", "urn:b");
    m.eq_name("p:use");
    let analysis = analyze(&m.finish());

    let dup: Vec<_> = analysis
        .diagnostics
        .iter()
        .filter(|d| d.code == DiagnosticCode::DuplicatePrefix)
        .collect();
    assert_eq!(dup.len(), 1);
    assert_eq!(dup[0].pos, second);
    // The first binding stays in force.
    assert_eq!(analysis.namespaces.resolve("p"), Some("urn:a"));
}

#[test]
fn module_import_binds_its_prefix_and_ignores_location_hints() {
    let mut m = ModuleBuilder::new();
    m.module_import("m", "urn:mod", Some("http://hint.example.com"));
    m.eq_name("m:do-it");
    let analysis = analyze(&m.finish());

    assert!(analysis.diagnostics.is_empty(), "{:?}", analysis.diagnostics);
    assert_eq!(analysis.namespaces.resolve("m"), Some("urn:mod"));
}

#[test]
fn unused_module_import_is_not_flagged() {
    let mut m = ModuleBuilder::new();
    m.module_import("m", "urn:mod", None);
    let analysis = analyze(&m.finish());

    assert!(analysis.diagnostics.is_empty(), "{:?}", analysis.diagnostics);
}

#[test]
fn qname_marks_prefix_used_without_resolvability_check() {
    // QName position (element names etc.): the prefix counts as used
    // but an unknown one is not an error there.
    let mut b = TreeBuilder::new();
    b.open(NodeKind::MainModule, PositionRange::new(0, 0, 2, 0));
    b.open(NodeKind::NamespaceDecl, span(0, 0, 40));
    b.token(NodeKind::NcName, span(0, 18, 19), "e");
    b.token(NodeKind::UriLiteral, span(0, 22, 30), "\"urn:e\"");
    b.close();
    b.token(NodeKind::QName, span(1, 1, 7), "e:item");
    b.token(NodeKind::QName, span(1, 10, 18), "unknown:x");
    b.close();
    let analysis = analyze(&b.finish());

    assert!(analysis.diagnostics.is_empty(), "{:?}", analysis.diagnostics);
}

#[test]
fn wildcard_prefix_counts_as_a_reference() {
    let mut m = ModuleBuilder::new();
    m.namespace_decl("w", "urn:w");
    let line = m.next_line();
    m.b.token(NodeKind::Wildcard, span(line, 0, 3), "w:*");
    let analysis = analyze(&m.finish());

    assert!(analysis.diagnostics.is_empty(), "{:?}", analysis.diagnostics);
}

#[test]
fn star_wildcard_references_nothing() {
    let mut m = ModuleBuilder::new();
    let line = m.next_line();
    m.b.token(NodeKind::Wildcard, span(line, 0, 7), "*:local");
    let analysis = analyze(&m.finish());
    assert!(analysis.diagnostics.is_empty(), "{:?}", analysis.diagnostics);
}
