//! Semantic analysis: scope and symbol tracking, generic instantiation,
//! closure capture analysis, and the non-fatal diagnostics they produce.
//!
//! Each top-level function is analyzed on its own: it gets a fresh scope
//! tree, its diagnostics accumulate into a per-declaration batch, and the
//! batches merge in declaration order. Call-site types and capture sets are
//! reported back keyed by byte span.

pub mod capture;
pub mod check;
pub mod instantiate;
pub mod scope;
pub mod types;
pub mod unify;

use std::collections::HashMap;

use crate::diagnostics::{Diagnostic, DiagnosticKind, Diagnostics};
use crate::parser::ast::{Function, Program, TypeExpr};
use crate::span::Spanned;

use capture::{CaptureEdge, CaptureTracker};
use scope::{ScopeId, ScopeTree, SymbolKind, SymbolScheme};
use types::{resolve_type_name, FnSig, Type, TypeScheme};

/// Everything one pass over a unit produces. The result maps are keyed by
/// `(span.start, span.end)` of the call expression or function expression.
#[derive(Debug)]
pub struct Analysis {
    pub diagnostics: Vec<Diagnostic>,
    pub call_types: HashMap<(usize, usize), Type>,
    pub captures: HashMap<(usize, usize), Vec<Capture>>,
}

/// One captured binding of a function expression, snapshotted when the
/// enclosing declaration's pass finishes. `usage_count` is the symbol's
/// total across the declaration, not just uses inside the capturing body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Capture {
    pub name: String,
    pub usage_count: u32,
}

/// Mutable state for one top-level declaration's pass. `funcs` is the shared
/// read-only registry of top-level signatures; everything else belongs to
/// this declaration alone and is torn down when the pass completes.
pub struct Analyzer<'a> {
    pub funcs: &'a HashMap<String, FnSig>,
    pub tree: ScopeTree,
    pub current: ScopeId,
    pub diagnostics: Diagnostics,
    pub tracker: CaptureTracker,
    pub ret_stack: Vec<Option<TypeScheme>>,
    pub type_param_stack: Vec<Vec<String>>,
    pub call_types: HashMap<(usize, usize), Type>,
    pub capture_edges: HashMap<(usize, usize), Vec<CaptureEdge>>,
}

struct DeclInfo {
    sig: FnSig,
    batch: Diagnostics,
}

fn resolve_decl_annotation(ann: &Spanned<TypeExpr>, batch: &mut Diagnostics) -> TypeScheme {
    let TypeExpr::Named(name) = &ann.node;
    match resolve_type_name(name, &[]) {
        Some(scheme) => scheme,
        None => {
            batch.report(
                DiagnosticKind::UnresolvedIdentifier,
                ann.span,
                format!("unknown type '{name}'"),
            );
            TypeScheme::Concrete(Type::Unknown)
        }
    }
}

/// Register every top-level function before any body is analyzed, so a body
/// can call siblings declared later in the unit. Annotation problems found
/// here open the declaring function's batch, ahead of its body diagnostics.
/// A missing return annotation registers as `void`.
fn register_functions(program: &Program) -> (HashMap<String, FnSig>, Vec<DeclInfo>) {
    let mut funcs = HashMap::new();
    let mut infos = Vec::with_capacity(program.functions.len());
    for func in &program.functions {
        let mut batch = Diagnostics::new();
        let params = func
            .node
            .params
            .iter()
            .map(|p| resolve_decl_annotation(&p.ty, &mut batch))
            .collect();
        let ret = match &func.node.return_type {
            Some(ann) => resolve_decl_annotation(ann, &mut batch),
            None => TypeScheme::Concrete(Type::Void),
        };
        let sig = FnSig { type_params: Vec::new(), params, ret };
        funcs.insert(func.node.name.node.clone(), sig.clone());
        infos.push(DeclInfo { sig, batch });
    }
    (funcs, infos)
}

type DeclResults = (
    Diagnostics,
    HashMap<(usize, usize), Type>,
    HashMap<(usize, usize), Vec<Capture>>,
);

fn analyze_decl(funcs: &HashMap<String, FnSig>, func: &Function, info: DeclInfo) -> DeclResults {
    let tree = ScopeTree::new();
    let root = tree.root();
    let mut az = Analyzer {
        funcs,
        tree,
        current: root,
        diagnostics: info.batch,
        tracker: CaptureTracker::new(),
        ret_stack: vec![func.return_type.is_some().then(|| info.sig.ret.clone())],
        type_param_stack: Vec::new(),
        call_types: HashMap::new(),
        capture_edges: HashMap::new(),
    };
    for (param, scheme) in func.params.iter().zip(&info.sig.params) {
        az.tree.declare(
            root,
            param.name.node.clone(),
            SymbolScheme::Value(scheme.clone()),
            SymbolKind::Param,
            param.name.span,
        );
    }

    check::check_block(&mut az, &func.body.node);

    // Unused sweep over the whole arena: declaration order, locals only,
    // underscore-prefixed names opt out.
    let unused: Vec<_> = az
        .tree
        .symbols()
        .filter(|(_, sym)| {
            sym.kind == SymbolKind::Local && sym.usage_count == 0 && !sym.name.starts_with('_')
        })
        .map(|(_, sym)| (sym.span, sym.name.clone()))
        .collect();
    for (span, name) in unused {
        az.diagnostics.report(
            DiagnosticKind::UnusedSymbol,
            span,
            format!("unused variable '{name}'"),
        );
    }

    let Analyzer { tree, diagnostics, call_types, capture_edges, .. } = az;
    let captures = capture_edges
        .into_iter()
        .map(|(key, edges)| {
            let list = edges
                .into_iter()
                .map(|edge| {
                    let sym = tree.symbol(edge.symbol);
                    Capture { name: sym.name.clone(), usage_count: sym.usage_count }
                })
                .collect();
            (key, list)
        })
        .collect();
    (diagnostics, call_types, captures)
}

/// Analyze a parsed unit: every top-level function in declaration order,
/// each with exclusively-owned scope state. One declaration's failures never
/// stop its siblings; all diagnostics come back in the final report.
pub fn analyze_unit(program: &Program) -> Analysis {
    let (funcs, infos) = register_functions(program);
    let mut diagnostics = Diagnostics::new();
    let mut call_types = HashMap::new();
    let mut captures = HashMap::new();
    for (func, info) in program.functions.iter().zip(infos) {
        let (batch, decl_calls, decl_captures) = analyze_decl(&funcs, &func.node, info);
        diagnostics.merge(batch);
        call_types.extend(decl_calls);
        captures.extend(decl_captures);
    }
    Analysis {
        diagnostics: diagnostics.into_vec(),
        call_types,
        captures,
    }
}
