use std::collections::HashSet;

use uuid::Uuid;

use crate::parser::ast::FnExpr;
use crate::span::Span;

use super::check;
use super::scope::{ScopeId, ScopeTree, SymbolId, SymbolKind, SymbolScheme};
use super::types::{FnSig, Type, TypeScheme};
use super::Analyzer;

/// One captured binding: the function expression that closes over it, the
/// symbol itself, and the scope the lookup landed in. `resolved_at` is
/// always a strict ancestor of the capturing function's own scope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaptureEdge {
    pub decl: Uuid,
    pub symbol: SymbolId,
    pub resolved_at: ScopeId,
}

struct FnFrame {
    decl: Uuid,
    scope: ScopeId,
    seen: HashSet<SymbolId>,
    edges: Vec<CaptureEdge>,
}

/// Stack of in-flight function-expression analyses. Every identifier use the
/// checker resolves is reported here; a use whose defining scope lies outside
/// the innermost frame's subtree becomes a capture edge on that frame.
/// Captures do not propagate to outer frames.
#[derive(Default)]
pub struct CaptureTracker {
    frames: Vec<FnFrame>,
}

impl CaptureTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn enter(&mut self, decl: Uuid, scope: ScopeId) {
        self.frames.push(FnFrame {
            decl,
            scope,
            seen: HashSet::new(),
            edges: Vec::new(),
        });
    }

    pub fn exit(&mut self) -> Vec<CaptureEdge> {
        self.frames.pop().unwrap().edges
    }

    /// Classify one resolved identifier use. Outside any function expression,
    /// or when the binding lives inside the current function's own subtree,
    /// this is a plain local use. Otherwise an edge is recorded, deduplicated
    /// per symbol within the frame.
    pub fn record_use(&mut self, tree: &ScopeTree, symbol: SymbolId, resolved_at: ScopeId) {
        let Some(frame) = self.frames.last_mut() else {
            return;
        };
        if tree.contains(frame.scope, resolved_at) {
            return;
        }
        if frame.seen.insert(symbol) {
            frame.edges.push(CaptureEdge {
                decl: frame.decl,
                symbol,
                resolved_at,
            });
        }
    }
}

/// Build a function expression's declared signature from its annotations.
/// The body is not consulted, so a `let` binding can be declared before its
/// initializer's body is analyzed and recursive references resolve. A missing
/// return annotation leaves the return opaque.
pub fn fn_expr_sig(az: &mut Analyzer<'_>, fn_expr: &FnExpr) -> FnSig {
    let type_params: Vec<String> = fn_expr
        .type_params
        .iter()
        .map(|tp| tp.node.clone())
        .collect();
    let params = fn_expr
        .params
        .iter()
        .map(|p| check::resolve_annotation(az, &p.ty, &type_params))
        .collect();
    let ret = match &fn_expr.return_type {
        Some(ann) => check::resolve_annotation(az, ann, &type_params),
        None => TypeScheme::Concrete(Type::Unknown),
    };
    FnSig { type_params, params, ret }
}

/// Analyze one function expression declaration: push its scope, declare its
/// parameters, walk the body, and record which enclosing bindings it closes
/// over. Runs exactly once per declaration; capture is a lexical property, so
/// call sites never re-trigger it.
pub fn analyze_fn_expr(az: &mut Analyzer<'_>, fn_expr: &FnExpr, span: Span, sig: &FnSig) {
    let fn_scope = az.tree.push_scope(az.current);
    for (param, scheme) in fn_expr.params.iter().zip(&sig.params) {
        az.tree.declare(
            fn_scope,
            param.name.node.clone(),
            SymbolScheme::Value(scheme.clone()),
            SymbolKind::Param,
            param.name.span,
        );
    }

    az.tracker.enter(fn_expr.id, fn_scope);
    az.ret_stack
        .push(fn_expr.return_type.is_some().then(|| sig.ret.clone()));
    az.type_param_stack.push(sig.type_params.clone());

    let enclosing = az.current;
    az.current = fn_scope;
    check::check_block(az, &fn_expr.body.node);
    az.current = enclosing;

    az.type_param_stack.pop();
    az.ret_stack.pop();
    let edges = az.tracker.exit();
    for edge in &edges {
        az.tree.mark_captured(edge.symbol);
    }
    az.capture_edges.insert(span.key(), edges);
}
