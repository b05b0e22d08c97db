//! The scope tree (static context).
//!
//! Each lexical construct that binds variables gets its own scope. A
//! scope owns the names declared in it and the references that have not
//! yet found a declaration; when a scope closes, its pending references
//! either resolve against its declarations or move up to the parent.
//!
//! Scopes live in an arena and form a tree rooted at a sentinel scope
//! that never holds declarations; the translator opens one module scope
//! directly under it. A reference that is still unresolved when its
//! scope's parent turns out to be the root has nowhere left to go and
//! becomes an `XPST0008` error.

use indexmap::IndexMap;
use tracing::debug;
use xqa_common::{DiagnosticBag, DiagnosticCode, PositionRange};
use xqa_syntax::NodeKind;

/// Index of a scope within its [`ScopeTree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ScopeId(pub u32);

impl ScopeId {
    fn index(self) -> usize {
        self.0 as usize
    }
}

/// A recorded variable declaration.
#[derive(Debug, Clone)]
pub struct VarDecl {
    /// Range of the declaring construct (not just the name token).
    pub pos: PositionRange,
    /// Kind of the declaring construct. `VarDecl` marks the
    /// module-level/public kind that is exempt from unused warnings.
    pub kind: NodeKind,
}

/// A recorded variable reference still waiting for a declaration.
#[derive(Debug, Clone)]
pub struct VarRef {
    pub pos: PositionRange,
}

/// One lexical binding region.
#[derive(Debug, Default, Clone)]
pub struct Scope {
    pub parent: Option<ScopeId>,
    pub children: Vec<ScopeId>,
    /// Declared names, in declaration order.
    pub var_decls: IndexMap<String, VarDecl>,
    /// Pending references, in first-seen order.
    pub var_refs: IndexMap<String, VarRef>,
}

/// Arena of scopes plus the cursor of the walk in progress.
#[derive(Debug, Clone)]
pub struct ScopeTree {
    scopes: Vec<Scope>,
    current: ScopeId,
}

impl ScopeTree {
    /// Create a tree holding only the root sentinel scope.
    pub fn new() -> ScopeTree {
        ScopeTree {
            scopes: vec![Scope::default()],
            current: ScopeId(0),
        }
    }

    /// The root sentinel scope.
    pub fn root(&self) -> ScopeId {
        ScopeId(0)
    }

    /// The scope the walk is currently inside.
    pub fn current(&self) -> ScopeId {
        self.current
    }

    /// Get a scope by id.
    pub fn get(&self, id: ScopeId) -> &Scope {
        &self.scopes[id.index()]
    }

    /// Number of scopes ever opened (including the root).
    pub fn len(&self) -> usize {
        self.scopes.len()
    }

    /// Whether no scope beyond the root sentinel was ever opened.
    pub fn is_empty(&self) -> bool {
        self.scopes.len() == 1
    }

    /// Open a new scope as a child of the current one and enter it.
    pub fn push(&mut self) -> ScopeId {
        let id = ScopeId(self.scopes.len() as u32);
        let parent = self.current;
        self.scopes.push(Scope {
            parent: Some(parent),
            ..Scope::default()
        });
        self.scopes[parent.index()].children.push(id);
        self.current = id;
        debug!(scope = id.0, parent = parent.0, "push scope");
        id
    }

    /// Declare `name` in the current scope.
    ///
    /// The first declaration of a name wins. A second declaration in
    /// the same scope is reported as `XQST0039` when the declaring
    /// construct is a function parameter, `XQST0049` otherwise.
    pub fn declare(
        &mut self,
        name: &str,
        pos: PositionRange,
        kind: NodeKind,
        diagnostics: &mut DiagnosticBag,
    ) {
        let scope = &mut self.scopes[self.current.index()];
        if scope.var_decls.contains_key(name) {
            if kind == NodeKind::Param {
                diagnostics.error(
                    pos,
                    format!("\"${name}\": duplicate parameter name."),
                    DiagnosticCode::DuplicateParameter,
                );
            } else {
                diagnostics.error(
                    pos,
                    format!("\"${name}\": duplicate variable declaration."),
                    DiagnosticCode::DuplicateVariable,
                );
            }
        } else {
            scope.var_decls.insert(name.to_string(), VarDecl { pos, kind });
        }
    }

    /// Record a reference to `name` in the current scope.
    pub fn reference(&mut self, name: &str, pos: PositionRange) {
        let scope = &mut self.scopes[self.current.index()];
        scope.var_refs.insert(name.to_string(), VarRef { pos });
    }

    /// Close the current scope and reconcile it.
    ///
    /// Declarations with no same-scope reference get an unused-variable
    /// warning unless they are of the public `VarDecl` kind. References
    /// with no same-scope declaration propagate to the parent, or become
    /// `XPST0008` errors when the parent is the root (there is no outer
    /// construct left that could declare them).
    ///
    /// # Panics
    ///
    /// Panics if the current scope is the root: a pop with no matching
    /// push is a walker bug, not a document problem.
    pub fn pop(&mut self, diagnostics: &mut DiagnosticBag) {
        let popped = self.current;
        let parent = self.scopes[popped.index()]
            .parent
            .expect("static context underflow: popped the root scope");
        let parent_is_boundary = self.scopes[parent.index()].parent.is_none();

        let scope = &self.scopes[popped.index()];
        for (name, decl) in &scope.var_decls {
            if !scope.var_refs.contains_key(name) && decl.kind != NodeKind::VarDecl {
                diagnostics.warning(
                    decl.pos,
                    format!("\"${name}\": unused variable."),
                    DiagnosticCode::UnusedVariable,
                );
            }
        }

        let mut unresolved: Vec<(String, VarRef)> = Vec::new();
        for (name, var_ref) in &scope.var_refs {
            if !scope.var_decls.contains_key(name) {
                if parent_is_boundary {
                    diagnostics.error(
                        var_ref.pos,
                        format!("\"${name}\": undeclared variable."),
                        DiagnosticCode::UndeclaredVariable,
                    );
                } else {
                    unresolved.push((name.clone(), var_ref.clone()));
                }
            }
        }

        let parent_scope = &mut self.scopes[parent.index()];
        for (name, var_ref) in unresolved {
            parent_scope.var_refs.insert(name, var_ref);
        }

        self.current = parent;
        debug!(scope = popped.0, "pop scope");
    }
}

impl Default for ScopeTree {
    fn default() -> Self {
        ScopeTree::new()
    }
}
