//! AST visitor infrastructure.
//!
//! `Visitor` is a read-only traversal trait: implement it for your pass,
//! overriding only the methods you need, and call the corresponding `walk_*`
//! function inside your override to get default recursion. Omit the walk call
//! to prune traversal at that node.

use crate::parser::ast::*;
use crate::span::Spanned;

/// Read-only AST visitor. Default implementations recurse into all children.
pub trait Visitor: Sized {
    fn visit_program(&mut self, program: &Program) {
        walk_program(self, program);
    }

    fn visit_function(&mut self, func: &Spanned<Function>) {
        walk_function(self, func);
    }

    fn visit_fn_expr(&mut self, fn_expr: &FnExpr) {
        walk_fn_expr(self, fn_expr);
    }

    fn visit_block(&mut self, block: &Spanned<Block>) {
        walk_block(self, block);
    }

    fn visit_stmt(&mut self, stmt: &Spanned<Stmt>) {
        walk_stmt(self, stmt);
    }

    fn visit_expr(&mut self, expr: &Spanned<Expr>) {
        walk_expr(self, expr);
    }

    fn visit_type_expr(&mut self, te: &Spanned<TypeExpr>) {
        walk_type_expr(self, te);
    }
}

pub fn walk_program<V: Visitor>(v: &mut V, program: &Program) {
    for func in &program.functions {
        v.visit_function(func);
    }
}

pub fn walk_function<V: Visitor>(v: &mut V, func: &Spanned<Function>) {
    for param in &func.node.params {
        v.visit_type_expr(&param.ty);
    }
    if let Some(rt) = &func.node.return_type {
        v.visit_type_expr(rt);
    }
    v.visit_block(&func.node.body);
}

pub fn walk_fn_expr<V: Visitor>(v: &mut V, fn_expr: &FnExpr) {
    for param in &fn_expr.params {
        v.visit_type_expr(&param.ty);
    }
    if let Some(rt) = &fn_expr.return_type {
        v.visit_type_expr(rt);
    }
    v.visit_block(&fn_expr.body);
}

pub fn walk_block<V: Visitor>(v: &mut V, block: &Spanned<Block>) {
    for stmt in &block.node.stmts {
        v.visit_stmt(stmt);
    }
}

pub fn walk_stmt<V: Visitor>(v: &mut V, stmt: &Spanned<Stmt>) {
    match &stmt.node {
        Stmt::Let { ty, value, .. } => {
            if let Some(te) = ty {
                v.visit_type_expr(te);
            }
            v.visit_expr(value);
        }
        Stmt::Return(Some(expr)) => v.visit_expr(expr),
        Stmt::Return(None) => {}
        Stmt::If { condition, then_block, else_block } => {
            v.visit_expr(condition);
            v.visit_block(then_block);
            if let Some(else_block) = else_block {
                v.visit_block(else_block);
            }
        }
        Stmt::Block(block) => v.visit_block(block),
        Stmt::Expr(expr) => v.visit_expr(expr),
    }
}

pub fn walk_expr<V: Visitor>(v: &mut V, expr: &Spanned<Expr>) {
    match &expr.node {
        Expr::NumberLit(_) | Expr::BoolLit(_) | Expr::StringLit(_) | Expr::Ident(_) => {}
        Expr::BinOp { lhs, rhs, .. } => {
            v.visit_expr(lhs);
            v.visit_expr(rhs);
        }
        Expr::UnaryOp { operand, .. } => v.visit_expr(operand),
        Expr::Call { type_args, args, .. } => {
            for ta in type_args {
                v.visit_type_expr(ta);
            }
            for arg in args {
                v.visit_expr(arg);
            }
        }
        Expr::Fn(fn_expr) => v.visit_fn_expr(fn_expr),
    }
}

pub fn walk_type_expr<V: Visitor>(_v: &mut V, _te: &Spanned<TypeExpr>) {
    // TypeExpr is a bare name, nothing nested to visit
}
