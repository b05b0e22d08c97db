//! Rename-target resolution.
//!
//! Two symbol families can be renamed: namespace prefixes (from their
//! declaration or from any prefixed name) and functions (from a
//! declaration or a call site). Functions are identified by name *and*
//! arity; a same-named function with a different argument count is a
//! different rename target.

use serde::Serialize;
use tracing::debug;
use xqa_analyzer::Analysis;
use xqa_common::{Position, PositionRange};
use xqa_syntax::{NodeId, NodeKind, SyntaxTree};

/// What kind of rename the selected node supports.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefactorKind {
    NamespacePrefixOrDecl,
    FunctionDeclOrCall,
    Unsupported,
}

/// The answer to a rename query.
///
/// The selection covers exactly the span the editor should highlight:
/// the prefix or the name, never the whole qualified name. The
/// declaration is absent when the symbol is unresolved (or built in).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RefactorResult {
    pub selection_position: Position,
    pub selection_length: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub declaration_position: Option<PositionRange>,
    pub reference_positions: Vec<PositionRange>,
}

/// Rename-query resolution over one analyzed tree.
pub struct RefactorProvider<'a> {
    tree: &'a SyntaxTree,
    analysis: &'a Analysis,
}

impl<'a> RefactorProvider<'a> {
    pub fn new(tree: &'a SyntaxTree, analysis: &'a Analysis) -> RefactorProvider<'a> {
        RefactorProvider { tree, analysis }
    }

    /// Resolve the rename targets for the symbol under `cursor`.
    ///
    /// Returns `None` when nothing renameable sits there; the caller
    /// must handle the absence gracefully.
    pub fn rename_targets(&self, cursor: Position) -> Option<RefactorResult> {
        let id = self.tree.node_at(cursor, true)?;
        let kind = self.classify(id, cursor);
        debug!(node = id.0, ?kind, "rename query");
        match kind {
            RefactorKind::NamespacePrefixOrDecl => self.prefix_targets(id),
            RefactorKind::FunctionDeclOrCall => self.function_targets(id),
            RefactorKind::Unsupported => None,
        }
    }

    /// Classify the node under the cursor.
    pub fn classify(&self, id: NodeId, cursor: Position) -> RefactorKind {
        let tree = self.tree;
        match tree.kind(id) {
            NodeKind::NcName => {
                if self.declaring_construct(id).is_some() {
                    RefactorKind::NamespacePrefixOrDecl
                } else {
                    RefactorKind::Unsupported
                }
            }
            NodeKind::EqName | NodeKind::QName | NodeKind::Wildcard => {
                if self.prefix_under_cursor(id, cursor).is_some() {
                    return RefactorKind::NamespacePrefixOrDecl;
                }
                let is_function_name = tree.kind(id) == NodeKind::EqName
                    && matches!(
                        tree.parent(id).map(|p| tree.kind(p)),
                        Some(NodeKind::FunctionCall) | Some(NodeKind::FunctionDecl)
                    );
                if is_function_name {
                    RefactorKind::FunctionDeclOrCall
                } else {
                    RefactorKind::Unsupported
                }
            }
            _ => RefactorKind::Unsupported,
        }
    }

    /// The namespace-introducing construct an `NcName` names, if any.
    /// Schema imports reach their prefix through a `SchemaPrefix` node.
    fn declaring_construct(&self, id: NodeId) -> Option<NodeId> {
        let tree = self.tree;
        let mut parent = tree.parent(id)?;
        if tree.kind(parent) == NodeKind::SchemaPrefix {
            parent = tree.parent(parent)?;
        }
        match tree.kind(parent) {
            NodeKind::NamespaceDecl | NodeKind::ModuleImport | NodeKind::SchemaImport => {
                Some(parent)
            }
            _ => None,
        }
    }

    /// The prefix of a qualified name, when the cursor sits inside the
    /// prefix span (boundary-inclusive, like exclusive containment).
    fn prefix_under_cursor(&self, id: NodeId, cursor: Position) -> Option<String> {
        let tree = self.tree;
        let text = tree.text(id);
        if text.starts_with("Q{") {
            return None;
        }
        let idx = text.find(':')?;
        let prefix = &text[..idx];
        if prefix.is_empty() || prefix == "*" {
            return None;
        }
        let pos = tree.pos(id);
        let span = PositionRange::on_line(pos.start_line, pos.start_col, prefix.chars().count() as u32);
        if span.contains(cursor, true) {
            Some(prefix.to_string())
        } else {
            None
        }
    }

    /// Declaration and references for a namespace prefix.
    fn prefix_targets(&self, id: NodeId) -> Option<RefactorResult> {
        let tree = self.tree;
        let (prefix, selection, declaration) = if tree.kind(id) == NodeKind::NcName {
            // The selection *is* the declaration.
            let prefix = tree.text(id);
            let pos = tree.pos(id);
            (prefix, pos, Some(pos))
        } else {
            let text = tree.text(id);
            let idx = text.find(':')?;
            let prefix = text[..idx].to_string();
            let pos = tree.pos(id);
            let selection =
                PositionRange::on_line(pos.start_line, pos.start_col, prefix.chars().count() as u32);
            let declaration = self.analysis.namespaces.get(&prefix).map(|entry| entry.pos);
            (prefix, selection, declaration)
        };

        let mut references = Vec::new();
        for node in tree.ids() {
            match tree.kind(node) {
                NodeKind::EqName | NodeKind::QName | NodeKind::Wildcard => {}
                _ => continue,
            }
            let text = tree.text(node);
            if text.starts_with("Q{") {
                continue;
            }
            let Some(idx) = text.find(':') else { continue };
            if text[..idx] != prefix {
                continue;
            }
            let pos = tree.pos(node);
            references.push(PositionRange::on_line(
                pos.start_line,
                pos.start_col,
                prefix.chars().count() as u32,
            ));
        }

        Some(RefactorResult {
            selection_position: selection.start(),
            selection_length: prefix.chars().count() as u32,
            declaration_position: declaration,
            reference_positions: references,
        })
    }

    /// Declaration and references for a function, matched on name and
    /// arity.
    fn function_targets(&self, id: NodeId) -> Option<RefactorResult> {
        let tree = self.tree;
        let parent = tree.parent(id)?;
        let name = tree.text(id);
        let arity = arity_of(tree, parent)?;

        let mut declaration = None;
        let mut references = Vec::new();
        for node in tree.ids() {
            let kind = tree.kind(node);
            if kind != NodeKind::FunctionDecl && kind != NodeKind::FunctionCall {
                continue;
            }
            let Some(name_node) = tree
                .children(node)
                .iter()
                .copied()
                .find(|&child| tree.kind(child) == NodeKind::EqName)
            else {
                continue;
            };
            if tree.text(name_node) != name || arity_of(tree, node) != Some(arity) {
                continue;
            }
            if kind == NodeKind::FunctionDecl {
                if declaration.is_none() {
                    declaration = Some(tree.pos(name_node));
                }
            } else {
                references.push(tree.pos(name_node));
            }
        }

        let pos = tree.pos(id);
        Some(RefactorResult {
            selection_position: pos.start(),
            selection_length: name.chars().count() as u32,
            declaration_position: declaration,
            reference_positions: references,
        })
    }
}

/// Argument count of a call, parameter count of a declaration.
fn arity_of(tree: &SyntaxTree, id: NodeId) -> Option<usize> {
    match tree.kind(id) {
        NodeKind::FunctionDecl => {
            let params = tree
                .children(id)
                .iter()
                .copied()
                .find(|&child| tree.kind(child) == NodeKind::ParamList)
                .map(|list| {
                    tree.children(list)
                        .iter()
                        .filter(|&&child| tree.kind(child) == NodeKind::Param)
                        .count()
                })
                .unwrap_or(0);
            Some(params)
        }
        NodeKind::FunctionCall => {
            let args = tree
                .children(id)
                .iter()
                .copied()
                .find(|&child| tree.kind(child) == NodeKind::ArgumentList)
                .map(|list| tree.children(list).len())
                .unwrap_or(0);
            Some(args)
        }
        _ => None,
    }
}
