//! The tree-walking translator.
//!
//! One depth-first pass composes the scope tree, namespace resolver,
//! diagnostics, and outline. Dispatch is an exhaustive match on
//! [`NodeKind`]; kinds with no dedicated behavior are traversed
//! generically.
//!
//! FLWOR binding clauses open scopes that must stay open for their
//! following sibling clauses. Instead of threading a shared counter
//! through the handlers, every `visit` returns the number of scopes its
//! subtree left open; enclosing constructs pop exactly that many on the
//! way out.

use crate::namespaces::{NamespaceKind, Namespaces};
use crate::outline::OutlineEntry;
use crate::sctx::ScopeTree;
use tracing::debug;
use xqa_common::{Diagnostic, DiagnosticBag, PositionRange};
use xqa_syntax::{NodeId, NodeKind, SyntaxTree};

/// Everything one analysis pass produces.
///
/// Built fresh per call and owned by the caller; nothing is shared with
/// later calls.
#[derive(Debug, Default)]
pub struct Analysis {
    /// Diagnostics in visitation order.
    pub diagnostics: Vec<Diagnostic>,
    /// Outline entries in visitation order.
    pub outline: Vec<OutlineEntry>,
    /// The completed scope tree.
    pub scopes: ScopeTree,
    /// The completed namespace table.
    pub namespaces: Namespaces,
}

impl Analysis {
    /// The namespace unprefixed function names resolve into.
    pub fn default_function_namespace(&self) -> &str {
        self.namespaces.default_function_namespace()
    }
}

/// Run one full analysis pass over `tree`.
///
/// An empty tree short-circuits to an empty [`Analysis`]. The walk
/// recurses one frame per tree level; callers feeding untrusted input
/// must bound its nesting depth.
pub fn analyze(tree: &SyntaxTree) -> Analysis {
    let Some(root) = tree.root() else {
        return Analysis::default();
    };
    debug!(nodes = tree.len(), "analyzing syntax tree");

    let mut translator = Translator::new(tree);
    let open = translator.visit(root);
    // Binding clauses with no enclosing FLWOR can only come from a
    // malformed tree; close whatever they left open so reconciliation
    // still runs.
    translator.close_scopes(open);
    translator.namespaces.finish(&mut translator.diagnostics);

    Analysis {
        diagnostics: translator.diagnostics.take(),
        outline: translator.outline,
        scopes: translator.sctx,
        namespaces: translator.namespaces,
    }
}

struct Translator<'a> {
    tree: &'a SyntaxTree,
    sctx: ScopeTree,
    namespaces: Namespaces,
    diagnostics: DiagnosticBag,
    outline: Vec<OutlineEntry>,
    /// Parameter names of the function declaration being visited, for
    /// the outline label. `None` outside function declarations.
    fn_params: Option<Vec<String>>,
    /// Whether the enclosing function declaration is `external` (its
    /// parameters are not processed).
    in_external_fn: bool,
}

impl<'a> Translator<'a> {
    fn new(tree: &'a SyntaxTree) -> Translator<'a> {
        Translator {
            tree,
            sctx: ScopeTree::new(),
            namespaces: Namespaces::new(),
            diagnostics: DiagnosticBag::new(),
            outline: Vec::new(),
            fn_params: None,
            in_external_fn: false,
        }
    }

    /// Visit one node. Returns the number of scopes the subtree opened
    /// and left open for its following siblings.
    fn visit(&mut self, id: NodeId) -> usize {
        let kind = self.tree.kind(id);
        match kind {
            // The module root owns the scope that is the propagation
            // boundary for unresolved references.
            NodeKind::MainModule | NodeKind::LibraryModule => {
                self.sctx.push();
                let open = self.visit_children(id);
                self.close_scopes(open + 1);
                0
            }

            // Prologue: namespace-introducing declarations consume
            // their name/URI children directly.
            NodeKind::ModuleDecl => {
                self.module_decl(id);
                0
            }
            NodeKind::ModuleImport => {
                self.import(id, NamespaceKind::Module);
                0
            }
            NodeKind::SchemaImport => {
                self.import(id, NamespaceKind::Schema);
                0
            }
            NodeKind::NamespaceDecl => {
                self.namespace_decl(id);
                0
            }
            NodeKind::DefaultNamespaceDecl => {
                self.default_namespace_decl(id);
                0
            }

            NodeKind::FunctionDecl => {
                self.function_decl(id);
                0
            }
            NodeKind::Param => {
                if self.in_external_fn {
                    0
                } else {
                    self.visit_binding_children(id)
                }
            }

            // Plain nested scopes.
            NodeKind::StatementsAndOptionalExpr | NodeKind::BlockExpr => {
                self.sctx.push();
                let open = self.visit_children(id);
                self.close_scopes(open + 1);
                0
            }

            // A FLWOR closes every scope its binding clauses opened,
            // plus its own.
            NodeKind::FlworExpr => {
                self.sctx.push();
                let open = self.visit_children(id);
                self.close_scopes(open + 1);
                0
            }

            NodeKind::QuantifiedExpr => {
                self.sctx.push();
                let open = self.visit_binding_children(id);
                self.close_scopes(open + 1);
                0
            }

            // Binding clauses leave their scope open for the siblings
            // that follow them; the enclosing FLWOR pops it.
            NodeKind::LetBinding
            | NodeKind::ForBinding
            | NodeKind::TumblingWindowClause
            | NodeKind::SlidingWindowClause
            | NodeKind::WindowVars
            | NodeKind::CountClause => {
                debug_assert!(kind.is_flwor_binding_clause());
                self.sctx.push();
                self.visit_binding_children(id) + 1
            }

            // Declare into whatever scope is current.
            NodeKind::PositionalVar
            | NodeKind::CurrentItem
            | NodeKind::PreviousItem
            | NodeKind::NextItem
            | NodeKind::VarDeclStatement => self.visit_binding_children(id),

            NodeKind::VarDecl => self.var_decl(id),
            NodeKind::VarRef => self.var_ref(id),

            NodeKind::EqName => self.eq_name(id),
            NodeKind::QName => {
                let text = self.tree.text(id);
                if let Some(idx) = text.find(':') {
                    self.namespaces.reference(&text[..idx]);
                }
                self.visit_children(id)
            }
            NodeKind::Wildcard => {
                let text = self.tree.text(id);
                if let Some(idx) = text.find(':') {
                    let prefix = &text[..idx];
                    if prefix != "*" {
                        self.namespaces.reference(prefix);
                    }
                }
                0
            }

            // Everything else is traversed generically.
            NodeKind::SchemaPrefix
            | NodeKind::FunctionCall
            | NodeKind::ArgumentList
            | NodeKind::ParamList
            | NodeKind::VarName
            | NodeKind::NcName
            | NodeKind::UriLiteral
            | NodeKind::Token
            | NodeKind::Other => self.visit_children(id),
        }
    }

    fn visit_children(&mut self, id: NodeId) -> usize {
        let tree = self.tree;
        let mut open = 0;
        for &child in tree.children(id) {
            open += self.visit(child);
        }
        open
    }

    fn close_scopes(&mut self, count: usize) {
        for _ in 0..count {
            self.sctx.pop(&mut self.diagnostics);
        }
    }

    /// Visit children, declaring every direct `VarName`/`EqName` child
    /// as a variable bound by this construct. The declaration records
    /// the construct's own range and kind.
    fn visit_binding_children(&mut self, id: NodeId) -> usize {
        let tree = self.tree;
        let kind = tree.kind(id);
        debug_assert!(kind.declares_variables());
        let pos = tree.pos(id);
        let mut open = 0;
        for &child in tree.children(id) {
            match tree.kind(child) {
                NodeKind::VarName | NodeKind::EqName => {
                    let name = tree.text(child);
                    self.declare_var(&name, pos, kind);
                }
                _ => open += self.visit(child),
            }
        }
        open
    }

    fn declare_var(&mut self, name: &str, pos: PositionRange, kind: NodeKind) {
        // URI-qualified names (Q{...}local) bypass prefix scoping.
        if name.starts_with("Q{") {
            return;
        }
        if kind == NodeKind::Param {
            if let Some(params) = self.fn_params.as_mut() {
                params.push(name.to_string());
            }
        }
        self.sctx.declare(name, pos, kind, &mut self.diagnostics);
    }

    fn module_decl(&mut self, id: NodeId) {
        let tree = self.tree;
        let mut prefix = String::new();
        for &child in tree.children(id) {
            match tree.kind(child) {
                NodeKind::NcName => prefix = tree.text(child),
                NodeKind::UriLiteral => {
                    let uri = tree.text(child);
                    self.namespaces.bind(&prefix, unquote(&uri));
                }
                _ => {
                    self.visit(child);
                }
            }
        }
    }

    /// Module and schema imports. The first URI literal is the imported
    /// namespace; any further ones are location hints and ignored.
    fn import(&mut self, id: NodeId, kind: NamespaceKind) {
        let tree = self.tree;
        let pos = tree.pos(id);
        let mut prefix = String::new();
        let mut uri_seen = false;
        for &child in tree.children(id) {
            match tree.kind(child) {
                NodeKind::NcName => prefix = tree.text(child),
                NodeKind::SchemaPrefix => {
                    for &grandchild in tree.children(child) {
                        if tree.kind(grandchild) == NodeKind::NcName {
                            prefix = tree.text(grandchild);
                        }
                    }
                }
                NodeKind::UriLiteral => {
                    if !uri_seen {
                        uri_seen = true;
                        let uri = tree.text(child);
                        self.namespaces
                            .declare(&prefix, unquote(&uri), pos, kind, &mut self.diagnostics);
                    }
                }
                _ => {
                    self.visit(child);
                }
            }
        }
    }

    fn namespace_decl(&mut self, id: NodeId) {
        let tree = self.tree;
        let pos = tree.pos(id);
        let mut prefix = String::new();
        for &child in tree.children(id) {
            match tree.kind(child) {
                NodeKind::NcName => prefix = tree.text(child),
                NodeKind::UriLiteral => {
                    let uri = tree.text(child);
                    self.namespaces.declare(
                        &prefix,
                        unquote(&uri),
                        pos,
                        NamespaceKind::Decl,
                        &mut self.diagnostics,
                    );
                }
                _ => {
                    self.visit(child);
                }
            }
        }
    }

    fn default_namespace_decl(&mut self, id: NodeId) {
        let tree = self.tree;
        let mut is_function = false;
        for &child in tree.children(id) {
            match tree.kind(child) {
                NodeKind::Token => {
                    is_function = tree.text(child) == "function";
                }
                NodeKind::UriLiteral => {
                    if is_function {
                        let uri = tree.text(child);
                        self.namespaces.set_default_function_namespace(unquote(&uri));
                    }
                }
                _ => {
                    self.visit(child);
                }
            }
        }
    }

    fn function_decl(&mut self, id: NodeId) {
        let tree = self.tree;
        let children = tree.children(id);
        // Trailing `external` token: the body and parameters are
        // elsewhere, so parameters are not declared here.
        let is_external = children
            .last()
            .is_some_and(|&last| tree.kind(last) == NodeKind::Token);

        let saved_external = std::mem::replace(&mut self.in_external_fn, is_external);
        let saved_params = std::mem::replace(&mut self.fn_params, Some(Vec::new()));

        let mut name = String::new();
        let mut display_pos = None;
        self.sctx.push();
        let mut open = 0;
        for &child in children {
            match tree.kind(child) {
                // The function's own name feeds the outline and is not
                // prefix-checked.
                NodeKind::EqName => {
                    name = tree.text(child);
                    display_pos = Some(tree.pos(child));
                }
                _ => open += self.visit(child),
            }
        }
        self.close_scopes(open + 1);

        let params = std::mem::replace(&mut self.fn_params, saved_params).unwrap_or_default();
        self.in_external_fn = saved_external;

        let label = format!("{}({})", name, params.join(", "));
        self.outline
            .push(OutlineEntry::function(label, display_pos, tree.pos(id)));
    }

    fn var_decl(&mut self, id: NodeId) -> usize {
        let tree = self.tree;
        let pos = tree.pos(id);
        let mut name = String::new();
        let mut display_pos = None;
        let mut open = 0;
        for &child in tree.children(id) {
            match tree.kind(child) {
                NodeKind::VarName | NodeKind::EqName => {
                    name = tree.text(child);
                    display_pos = Some(tree.pos(child));
                    let declared = name.clone();
                    self.declare_var(&declared, pos, NodeKind::VarDecl);
                }
                _ => open += self.visit(child),
            }
        }
        self.outline
            .push(OutlineEntry::variable(format!("${name}"), display_pos, pos));
        open
    }

    fn var_ref(&mut self, id: NodeId) -> usize {
        let tree = self.tree;
        let text = tree.text(id);
        let name = text.strip_prefix('$').unwrap_or(&text);
        if !name.starts_with("Q{") {
            self.sctx.reference(name, tree.pos(id));
        }
        // Recurse so the name inside still gets its prefix checked.
        self.visit_children(id)
    }

    fn eq_name(&mut self, id: NodeId) -> usize {
        let tree = self.tree;
        let text = tree.text(id);
        if !text.starts_with("Q{") {
            if let Some(idx) = text.find(':') {
                let prefix = text[..idx].to_string();
                self.namespaces
                    .check_prefix(&prefix, tree.pos(id), &mut self.diagnostics);
            }
        }
        self.visit_children(id)
    }
}

/// Strip the surrounding quote characters from a URI literal's text.
fn unquote(text: &str) -> &str {
    let mut chars = text.chars();
    match (chars.next(), chars.next_back()) {
        (Some(_), Some(_)) => chars.as_str(),
        _ => text,
    }
}
