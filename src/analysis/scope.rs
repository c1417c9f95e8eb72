use std::collections::HashMap;

use crate::span::Span;

use super::types::{FnSig, TypeScheme};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ScopeId(pub u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SymbolId(pub u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SymbolKind {
    /// Function or function-expression parameter. Exempt from the unused sweep.
    Param,
    /// `let` / `const` binding.
    Local,
}

/// What a name is bound to: a plain value or a callable signature.
#[derive(Debug, Clone)]
pub enum SymbolScheme {
    Value(TypeScheme),
    Fn(FnSig),
}

#[derive(Debug, Clone)]
pub struct Symbol {
    pub name: String,
    pub scheme: SymbolScheme,
    pub scope: ScopeId,
    pub span: Span,
    pub kind: SymbolKind,
    pub usage_count: u32,
    pub is_captured: bool,
}

#[derive(Debug)]
pub struct Scope {
    pub parent: Option<ScopeId>,
    entries: HashMap<String, SymbolId>,
}

/// Arena-owned lexical scope tree for one top-level declaration's pass.
/// Scopes hold a parent back-reference only; symbols live in a flat arena
/// whose insertion order is declaration order, which the unused sweep
/// relies on.
#[derive(Debug)]
pub struct ScopeTree {
    scopes: Vec<Scope>,
    symbols: Vec<Symbol>,
}

impl ScopeTree {
    pub fn new() -> Self {
        Self {
            scopes: vec![Scope { parent: None, entries: HashMap::new() }],
            symbols: Vec::new(),
        }
    }

    pub fn root(&self) -> ScopeId {
        ScopeId(0)
    }

    pub fn push_scope(&mut self, parent: ScopeId) -> ScopeId {
        let id = ScopeId(self.scopes.len() as u32);
        self.scopes.push(Scope { parent: Some(parent), entries: HashMap::new() });
        id
    }

    /// Declare `name` in `scope`. Redeclaration in the same scope shadows by
    /// replacing the entry; the old symbol stays in the arena so usage
    /// recorded against it survives.
    pub fn declare(
        &mut self,
        scope: ScopeId,
        name: impl Into<String>,
        scheme: SymbolScheme,
        kind: SymbolKind,
        span: Span,
    ) -> SymbolId {
        let name = name.into();
        let id = SymbolId(self.symbols.len() as u32);
        self.symbols.push(Symbol {
            name: name.clone(),
            scheme,
            scope,
            span,
            kind,
            usage_count: 0,
            is_captured: false,
        });
        self.scopes[scope.0 as usize].entries.insert(name, id);
        id
    }

    /// Resolve `name` innermost-first from `from` up the parent chain.
    pub fn resolve(&self, from: ScopeId, name: &str) -> Option<SymbolId> {
        self.resolve_with_scope(from, name).map(|(id, _)| id)
    }

    /// Like [`resolve`](Self::resolve), but also returns the scope the name
    /// was found in, for local-vs-captured classification.
    pub fn resolve_with_scope(&self, from: ScopeId, name: &str) -> Option<(SymbolId, ScopeId)> {
        let mut current = Some(from);
        while let Some(id) = current {
            let scope = &self.scopes[id.0 as usize];
            if let Some(sym) = scope.entries.get(name) {
                return Some((*sym, id));
            }
            current = scope.parent;
        }
        None
    }

    pub fn symbol(&self, id: SymbolId) -> &Symbol {
        &self.symbols[id.0 as usize]
    }

    pub fn symbol_mut(&mut self, id: SymbolId) -> &mut Symbol {
        &mut self.symbols[id.0 as usize]
    }

    /// True when `scope` equals `of` or sits on `of`'s parent chain.
    pub fn contains(&self, scope: ScopeId, of: ScopeId) -> bool {
        let mut current = Some(of);
        while let Some(id) = current {
            if id == scope {
                return true;
            }
            current = self.scopes[id.0 as usize].parent;
        }
        false
    }

    /// True when `ancestor` is a strict ancestor of `of`.
    pub fn is_strict_ancestor(&self, ancestor: ScopeId, of: ScopeId) -> bool {
        ancestor != of && self.contains(ancestor, of)
    }

    pub fn mark_used(&mut self, id: SymbolId) {
        self.symbols[id.0 as usize].usage_count += 1;
    }

    pub fn mark_captured(&mut self, id: SymbolId) {
        self.symbols[id.0 as usize].is_captured = true;
    }

    /// All symbols in declaration order.
    pub fn symbols(&self) -> impl Iterator<Item = (SymbolId, &Symbol)> {
        self.symbols
            .iter()
            .enumerate()
            .map(|(i, s)| (SymbolId(i as u32), s))
    }
}

impl Default for ScopeTree {
    fn default() -> Self {
        Self::new()
    }
}
