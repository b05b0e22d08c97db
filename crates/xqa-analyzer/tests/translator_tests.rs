//! End-to-end behavior of the analysis pass itself: empty input,
//! prologue handling, and the ordering guarantees of the diagnostic
//! stream.

use xqa_analyzer::analyze;
use xqa_analyzer::namespaces::XPATH_FUNCTIONS_NS;
use xqa_common::{DiagnosticCode, PositionRange};
use xqa_syntax::{NodeKind, TreeBuilder};

fn span(line: u32, start: u32, end: u32) -> PositionRange {
    PositionRange::new(line, start, line, end)
}

#[test]
fn empty_tree_yields_empty_analysis() {
    let tree = TreeBuilder::new().finish();
    let analysis = analyze(&tree);

    assert!(analysis.diagnostics.is_empty());
    assert!(analysis.outline.is_empty());
    assert_eq!(analysis.scopes.len(), 1); // just the root sentinel
    assert_eq!(analysis.default_function_namespace(), XPATH_FUNCTIONS_NS);
}

#[test]
fn default_function_namespace_follows_the_prologue() {
    let mut b = TreeBuilder::new();
    b.open(NodeKind::MainModule, PositionRange::new(0, 0, 1, 0));
    b.open(NodeKind::DefaultNamespaceDecl, span(0, 0, 50));
    b.token(NodeKind::Token, span(0, 8, 15), "function");
    b.token(NodeKind::UriLiteral, span(0, 26, 48), "\"urn:my-functions\"");
    b.close();
    b.close();
    let analysis = analyze(&b.finish());

    assert_eq!(analysis.default_function_namespace(), "urn:my-functions");
}

#[test]
fn default_element_namespace_does_not_touch_the_function_namespace() {
    let mut b = TreeBuilder::new();
    b.open(NodeKind::MainModule, PositionRange::new(0, 0, 1, 0));
    b.open(NodeKind::DefaultNamespaceDecl, span(0, 0, 50));
    b.token(NodeKind::Token, span(0, 8, 15), "element");
    b.token(NodeKind::UriLiteral, span(0, 26, 40), "\"urn:elements\"");
    b.close();
    b.close();
    let analysis = analyze(&b.finish());

    assert_eq!(analysis.default_function_namespace(), XPATH_FUNCTIONS_NS);
}

#[test]
fn library_module_decl_binds_its_own_prefix_silently() {
    // module namespace my = "urn:lib"; ... my:thing ...
    let mut b = TreeBuilder::new();
    b.open(NodeKind::LibraryModule, PositionRange::new(0, 0, 2, 0));
    b.open(NodeKind::ModuleDecl, span(0, 0, 35));
    b.token(NodeKind::NcName, span(0, 17, 19), "my");
    b.token(NodeKind::UriLiteral, span(0, 22, 33), "\"urn:lib\"");
    b.close();
    b.token(NodeKind::EqName, span(1, 0, 8), "my:thing");
    b.close();
    let analysis = analyze(&b.finish());

    // Resolvable, and never swept as unused.
    assert!(analysis.diagnostics.is_empty(), "{:?}", analysis.diagnostics);
    assert_eq!(analysis.namespaces.resolve("my"), Some("urn:lib"));
}

#[test]
fn function_name_is_not_prefix_checked() {
    // The declaration's own name is consumed for the outline; an
    // undeclared prefix there is not a use.
    let mut b = TreeBuilder::new();
    b.open(NodeKind::MainModule, PositionRange::new(0, 0, 1, 0));
    b.open(NodeKind::FunctionDecl, span(0, 0, 40));
    b.token(NodeKind::EqName, span(0, 17, 27), "private:go");
    b.open(NodeKind::StatementsAndOptionalExpr, span(0, 30, 38));
    b.close();
    b.close();
    b.close();
    let analysis = analyze(&b.finish());

    assert!(
        !analysis
            .diagnostics
            .iter()
            .any(|d| d.code == DiagnosticCode::UnresolvablePrefix)
    );
}

#[test]
fn uri_qualified_names_bypass_variable_scoping() {
    // Q{urn:x}v is neither declared nor referenced by name.
    let mut b = TreeBuilder::new();
    b.open(NodeKind::MainModule, PositionRange::new(0, 0, 1, 0));
    b.open(NodeKind::VarRef, span(0, 0, 10));
    b.token(NodeKind::EqName, span(0, 1, 10), "Q{urn:x}v");
    b.close();
    b.close();
    let analysis = analyze(&b.finish());

    assert!(analysis.diagnostics.is_empty(), "{:?}", analysis.diagnostics);
}

#[test]
fn diagnostics_arrive_in_visitation_order() {
    // Two unresolvable prefixes on successive lines, then an unused
    // namespace declared on line 0: immediate checks come first in
    // source order, the end-of-pass sweep last.
    let mut b = TreeBuilder::new();
    b.open(NodeKind::MainModule, PositionRange::new(0, 0, 3, 0));
    b.open(NodeKind::NamespaceDecl, span(0, 0, 30));
    b.token(NodeKind::NcName, span(0, 18, 23), "later");
    b.token(NodeKind::UriLiteral, span(0, 24, 30), "\"urn:l\"");
    b.close();
    b.token(NodeKind::EqName, span(1, 0, 5), "aa:x");
    b.token(NodeKind::EqName, span(2, 0, 5), "bb:y");
    b.close();
    let analysis = analyze(&b.finish());

    let codes: Vec<_> = analysis.diagnostics.iter().map(|d| d.code).collect();
    assert_eq!(
        codes,
        vec![
            DiagnosticCode::UnresolvablePrefix,
            DiagnosticCode::UnresolvablePrefix,
            DiagnosticCode::UnusedPrefix,
        ]
    );
    assert_eq!(analysis.diagnostics[0].pos, span(1, 0, 5));
    assert_eq!(analysis.diagnostics[1].pos, span(2, 0, 5));
}

#[test]
fn analysis_serializes_for_the_front_end() {
    let mut b = TreeBuilder::new();
    b.open(NodeKind::MainModule, PositionRange::new(0, 0, 1, 0));
    b.token(NodeKind::EqName, span(0, 0, 7), "ghost:n");
    b.close();
    let analysis = analyze(&b.finish());

    let json = serde_json::to_value(&analysis.diagnostics).unwrap();
    let diag = &json[0];
    assert_eq!(diag["code"], "XPST0081");
    assert_eq!(diag["severity"], "error");
    assert_eq!(diag["pos"]["sl"], 0);
}
