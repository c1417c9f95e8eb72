use crate::diagnostics::DiagnosticKind;
use crate::parser::ast::{BinOp, Block, Expr, Stmt, TypeExpr, UnaryOp};
use crate::span::{Span, Spanned};

use super::capture;
use super::instantiate::instantiate;
use super::scope::{SymbolKind, SymbolScheme};
use super::types::{resolve_type_name, Type, TypeScheme};
use super::Analyzer;

/// Resolve a type annotation against the builtin type names, a signature's
/// own type parameters, and any enclosing function expressions' type
/// parameters. Unresolved names are reported and poison to `Unknown`.
pub fn resolve_annotation(
    az: &mut Analyzer<'_>,
    ann: &Spanned<TypeExpr>,
    own: &[String],
) -> TypeScheme {
    let TypeExpr::Named(name) = &ann.node;
    if let Some(scheme) = resolve_type_name(name, own) {
        return scheme;
    }
    if az
        .type_param_stack
        .iter()
        .any(|frame| frame.iter().any(|p| p == name))
    {
        return TypeScheme::Param(name.clone());
    }
    az.diagnostics.report(
        DiagnosticKind::UnresolvedIdentifier,
        ann.span,
        format!("unknown type '{name}'"),
    );
    TypeScheme::Concrete(Type::Unknown)
}

/// Check every statement of a block in order. The caller owns the scope:
/// function bodies check in the function's own scope, nested blocks get a
/// child scope pushed around this call.
pub fn check_block(az: &mut Analyzer<'_>, block: &Block) {
    for stmt in &block.stmts {
        check_stmt(az, stmt);
    }
}

fn check_nested_block(az: &mut Analyzer<'_>, block: &Spanned<Block>) {
    let scope = az.tree.push_scope(az.current);
    let enclosing = az.current;
    az.current = scope;
    check_block(az, &block.node);
    az.current = enclosing;
}

fn check_stmt(az: &mut Analyzer<'_>, stmt: &Spanned<Stmt>) {
    match &stmt.node {
        Stmt::Let { name, ty, value } => {
            let annotation = ty.as_ref().map(|ann| resolve_annotation(az, ann, &[]));

            // A function-expression initializer is declared before its body
            // is analyzed so the body can refer to the binding recursively.
            if let Expr::Fn(fn_expr) = &value.node {
                let sig = capture::fn_expr_sig(az, fn_expr);
                az.tree.declare(
                    az.current,
                    name.node.clone(),
                    SymbolScheme::Fn(sig.clone()),
                    SymbolKind::Local,
                    name.span,
                );
                capture::analyze_fn_expr(az, fn_expr, value.span, &sig);
                return;
            }

            let value_ty = check_expr(az, value);
            if let (Some(TypeScheme::Concrete(expected)), Some(actual)) =
                (&annotation, value_ty.as_settled())
            {
                if *expected != Type::Unknown && actual != Type::Unknown && *expected != actual {
                    az.diagnostics.report(
                        DiagnosticKind::TypeMismatch,
                        value.span,
                        format!("type mismatch: expected {expected}, found {actual}"),
                    );
                }
            }
            let declared = annotation.unwrap_or(value_ty);
            az.tree.declare(
                az.current,
                name.node.clone(),
                SymbolScheme::Value(declared),
                SymbolKind::Local,
                name.span,
            );
        }
        Stmt::Return(value) => {
            let found = match value {
                Some(v) => check_expr(az, v).as_settled(),
                None => Some(Type::Void),
            };
            let declared = az.ret_stack.last().and_then(|r| r.clone());
            let Some(TypeScheme::Concrete(expected)) = declared else {
                return;
            };
            if expected == Type::Unknown {
                return;
            }
            // Type-parameter returns stay opaque against concrete annotations.
            let Some(found) = found else {
                return;
            };
            if found == Type::Unknown || found == expected {
                return;
            }
            let at = value.as_ref().map(|v| v.span).unwrap_or(stmt.span);
            az.diagnostics.report(
                DiagnosticKind::TypeMismatch,
                at,
                format!("return type mismatch: expected {expected}, found {found}"),
            );
        }
        Stmt::If { condition, then_block, else_block } => {
            let cond = check_expr(az, condition);
            if let Some(found) = cond.as_settled() {
                if found != Type::Boolean && found != Type::Unknown {
                    az.diagnostics.report(
                        DiagnosticKind::TypeMismatch,
                        condition.span,
                        format!("condition must be boolean, found {found}"),
                    );
                }
            }
            check_nested_block(az, then_block);
            if let Some(else_block) = else_block {
                check_nested_block(az, else_block);
            }
        }
        Stmt::Block(block) => check_nested_block(az, block),
        Stmt::Expr(expr) => {
            check_expr(az, expr);
        }
    }
}

pub fn check_expr(az: &mut Analyzer<'_>, expr: &Spanned<Expr>) -> TypeScheme {
    match &expr.node {
        Expr::NumberLit(_) => TypeScheme::Concrete(Type::Number),
        Expr::StringLit(_) => TypeScheme::Concrete(Type::String),
        Expr::BoolLit(_) => TypeScheme::Concrete(Type::Boolean),
        Expr::Ident(name) => check_ident(az, name, expr.span),
        Expr::BinOp { op, lhs, rhs } => {
            let lt = check_expr(az, lhs);
            let rt = check_expr(az, rhs);
            infer_binop(az, *op, &lt, &rt, expr.span)
        }
        Expr::UnaryOp { op, operand } => {
            let operand = check_expr(az, operand);
            infer_unary(az, *op, &operand, expr.span)
        }
        Expr::Call { callee, type_args, args } => {
            check_call(az, expr.span, callee, type_args, args)
        }
        Expr::Fn(fn_expr) => {
            let sig = capture::fn_expr_sig(az, fn_expr);
            capture::analyze_fn_expr(az, fn_expr, expr.span, &sig);
            // A bare function value has no first-class type in this lattice.
            TypeScheme::Concrete(Type::Unknown)
        }
    }
}

fn check_ident(az: &mut Analyzer<'_>, name: &str, span: Span) -> TypeScheme {
    if let Some((sym, at)) = az.tree.resolve_with_scope(az.current, name) {
        az.tree.mark_used(sym);
        az.tracker.record_use(&az.tree, sym, at);
        return match &az.tree.symbol(sym).scheme {
            SymbolScheme::Value(scheme) => scheme.clone(),
            SymbolScheme::Fn(_) => TypeScheme::Concrete(Type::Unknown),
        };
    }
    // Top-level function names and builtins referenced as values stay opaque.
    if az.funcs.contains_key(name) || name == "print" {
        return TypeScheme::Concrete(Type::Unknown);
    }
    az.diagnostics.report(
        DiagnosticKind::UnresolvedIdentifier,
        span,
        format!("undefined variable '{name}'"),
    );
    TypeScheme::Concrete(Type::Unknown)
}

fn check_call(
    az: &mut Analyzer<'_>,
    span: Span,
    callee: &Spanned<String>,
    type_args: &[Spanned<TypeExpr>],
    args: &[Spanned<Expr>],
) -> TypeScheme {
    let name = callee.node.as_str();

    // Resolve the callee before the arguments so diagnostics keep source
    // order. Arguments are checked exactly once even when the callee fails
    // to resolve, so identifier accounting inside them still happens.
    let mut sig = None;
    let mut builtin = false;
    if let Some((sym, at)) = az.tree.resolve_with_scope(az.current, name) {
        az.tree.mark_used(sym);
        az.tracker.record_use(&az.tree, sym, at);
        match &az.tree.symbol(sym).scheme {
            SymbolScheme::Fn(s) => sig = Some(s.clone()),
            SymbolScheme::Value(_) => {
                az.diagnostics.report(
                    DiagnosticKind::TypeMismatch,
                    callee.span,
                    format!("'{name}' is not a function"),
                );
            }
        }
    } else if let Some(s) = az.funcs.get(name) {
        sig = Some(s.clone());
    } else if name == "print" {
        builtin = true;
    } else {
        az.diagnostics.report(
            DiagnosticKind::UnresolvedIdentifier,
            callee.span,
            format!("undefined function '{name}'"),
        );
    }

    let explicit_types: Option<Vec<Type>> = if builtin || type_args.is_empty() {
        None
    } else {
        Some(
            type_args
                .iter()
                .map(|ta| match resolve_annotation(az, ta, &[]) {
                    TypeScheme::Concrete(ty) => ty,
                    TypeScheme::Param(_) => Type::Unknown,
                })
                .collect(),
        )
    };

    let arg_types: Vec<Type> = args
        .iter()
        .map(|arg| check_expr(az, arg).as_settled().unwrap_or(Type::Unknown))
        .collect();

    if builtin {
        return check_print(az, span, type_args, args, &arg_types);
    }
    let Some(sig) = sig else {
        return TypeScheme::Concrete(Type::Unknown);
    };

    match instantiate(name, &sig, explicit_types.as_deref(), &arg_types) {
        Ok(ret) => {
            if ret != Type::Unknown {
                az.call_types.insert(span.key(), ret);
            }
            TypeScheme::Concrete(ret)
        }
        Err(err) => {
            let at = err.arg.map(|i| args[i].span).unwrap_or(span);
            az.diagnostics.report(err.kind, at, err.message);
            TypeScheme::Concrete(Type::Unknown)
        }
    }
}

fn check_print(
    az: &mut Analyzer<'_>,
    span: Span,
    type_args: &[Spanned<TypeExpr>],
    args: &[Spanned<Expr>],
    arg_types: &[Type],
) -> TypeScheme {
    if !type_args.is_empty() {
        az.diagnostics.report(
            DiagnosticKind::TypeMismatch,
            span,
            "builtin function 'print' does not accept type arguments".to_string(),
        );
        return TypeScheme::Concrete(Type::Unknown);
    }
    if arg_types.len() != 1 {
        az.diagnostics.report(
            DiagnosticKind::TypeMismatch,
            span,
            format!("print() expects 1 argument, got {}", args.len()),
        );
        return TypeScheme::Concrete(Type::Unknown);
    }
    if arg_types[0] == Type::Void {
        az.diagnostics.report(
            DiagnosticKind::TypeMismatch,
            args[0].span,
            "print() expects a value, found void".to_string(),
        );
        return TypeScheme::Concrete(Type::Void);
    }
    az.call_types.insert(span.key(), Type::Void);
    TypeScheme::Concrete(Type::Void)
}

fn infer_binop(
    az: &mut Analyzer<'_>,
    op: BinOp,
    lhs: &TypeScheme,
    rhs: &TypeScheme,
    span: Span,
) -> TypeScheme {
    // Equality is dynamic: any two operands compare, the result is boolean.
    if op.is_equality() {
        return TypeScheme::Concrete(Type::Boolean);
    }
    let (Some(lt), Some(rt)) = (lhs.as_settled(), rhs.as_settled()) else {
        // Type-parameter operands stay opaque.
        return TypeScheme::Concrete(Type::Unknown);
    };
    if lt == Type::Unknown || rt == Type::Unknown {
        return TypeScheme::Concrete(Type::Unknown);
    }

    if op.is_comparison() {
        if lt != rt {
            az.diagnostics.report(
                DiagnosticKind::TypeMismatch,
                span,
                format!("cannot compare {lt} with {rt}"),
            );
            return TypeScheme::Concrete(Type::Unknown);
        }
        if lt == Type::Number {
            return TypeScheme::Concrete(Type::Boolean);
        }
        az.diagnostics.report(
            DiagnosticKind::TypeMismatch,
            span,
            format!("comparison not supported for type {lt}"),
        );
        return TypeScheme::Concrete(Type::Unknown);
    }

    if lt != rt {
        az.diagnostics.report(
            DiagnosticKind::TypeMismatch,
            span,
            format!("operand type mismatch: {lt} vs {rt}"),
        );
        return TypeScheme::Concrete(Type::Unknown);
    }
    if op == BinOp::Add && lt == Type::String {
        return TypeScheme::Concrete(Type::String);
    }
    if lt == Type::Number {
        return TypeScheme::Concrete(Type::Number);
    }
    az.diagnostics.report(
        DiagnosticKind::TypeMismatch,
        span,
        format!("operator not supported for type {lt}"),
    );
    TypeScheme::Concrete(Type::Unknown)
}

fn infer_unary(az: &mut Analyzer<'_>, op: UnaryOp, operand: &TypeScheme, span: Span) -> TypeScheme {
    let Some(found) = operand.as_settled() else {
        return TypeScheme::Concrete(Type::Unknown);
    };
    if found == Type::Unknown {
        return TypeScheme::Concrete(Type::Unknown);
    }
    let expected = match op {
        UnaryOp::Neg => Type::Number,
        UnaryOp::Not => Type::Boolean,
    };
    if found == expected {
        return TypeScheme::Concrete(found);
    }
    az.diagnostics.report(
        DiagnosticKind::TypeMismatch,
        span,
        format!("cannot apply '{op}' to type {found}"),
    );
    TypeScheme::Concrete(Type::Unknown)
}
