use std::fmt;

use uuid::Uuid;

use crate::span::Spanned;

#[derive(Debug)]
pub struct Program {
    pub functions: Vec<Spanned<Function>>,
}

/// Top-level `function name(params): ret { body }` declaration.
#[derive(Debug, Clone)]
pub struct Function {
    pub name: Spanned<String>,
    pub params: Vec<Param>,
    pub return_type: Option<Spanned<TypeExpr>>,
    pub body: Spanned<Block>,
}

/// Function expression, the only generic form: `<T, R>(lhs: T, rhs: R): boolean { .. }`
/// or the arrow shorthand `(x: number): number => x + 1`. The parser stamps each
/// one with a fresh id so later passes can attach per-declaration results.
#[derive(Debug, Clone)]
pub struct FnExpr {
    pub id: Uuid,
    pub type_params: Vec<Spanned<String>>,
    pub params: Vec<Param>,
    pub return_type: Option<Spanned<TypeExpr>>,
    pub body: Spanned<Block>,
}

#[derive(Debug, Clone)]
pub struct Param {
    pub name: Spanned<String>,
    pub ty: Spanned<TypeExpr>,
}

/// A type as written. Always a bare name here: a builtin type or a
/// type-parameter in scope, resolved during analysis.
#[derive(Debug, Clone, PartialEq)]
pub enum TypeExpr {
    Named(String),
}

#[derive(Debug, Clone)]
pub struct Block {
    pub stmts: Vec<Spanned<Stmt>>,
}

#[derive(Debug, Clone)]
pub enum Stmt {
    /// `let x: T = v;` or `const x: T = v;` (initializer required, so the
    /// two keywords analyze identically).
    Let {
        name: Spanned<String>,
        ty: Option<Spanned<TypeExpr>>,
        value: Spanned<Expr>,
    },
    Return(Option<Spanned<Expr>>),
    If {
        condition: Spanned<Expr>,
        then_block: Spanned<Block>,
        else_block: Option<Spanned<Block>>,
    },
    Block(Spanned<Block>),
    Expr(Spanned<Expr>),
}

#[derive(Debug, Clone)]
pub enum Expr {
    NumberLit(f64),
    BoolLit(bool),
    StringLit(String),
    Ident(String),
    BinOp {
        op: BinOp,
        lhs: Box<Spanned<Expr>>,
        rhs: Box<Spanned<Expr>>,
    },
    UnaryOp {
        op: UnaryOp,
        operand: Box<Spanned<Expr>>,
    },
    /// `f(a, b)` or the explicitly instantiated `f<number>(a, b)`.
    Call {
        callee: Spanned<String>,
        type_args: Vec<Spanned<TypeExpr>>,
        args: Vec<Spanned<Expr>>,
    },
    Fn(FnExpr),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BinOp {
    Add,
    Sub,
    Mul,
    Div,
    StrictEq,
    StrictNeq,
    Eq,
    Neq,
    Lt,
    Gt,
    LtEq,
    GtEq,
}

impl BinOp {
    pub fn is_equality(self) -> bool {
        matches!(self, BinOp::StrictEq | BinOp::StrictNeq | BinOp::Eq | BinOp::Neq)
    }

    pub fn is_comparison(self) -> bool {
        matches!(self, BinOp::Lt | BinOp::Gt | BinOp::LtEq | BinOp::GtEq)
    }
}

impl fmt::Display for BinOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sym = match self {
            BinOp::Add => "+",
            BinOp::Sub => "-",
            BinOp::Mul => "*",
            BinOp::Div => "/",
            BinOp::StrictEq => "===",
            BinOp::StrictNeq => "!==",
            BinOp::Eq => "==",
            BinOp::Neq => "!=",
            BinOp::Lt => "<",
            BinOp::Gt => ">",
            BinOp::LtEq => "<=",
            BinOp::GtEq => ">=",
        };
        write!(f, "{sym}")
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum UnaryOp {
    Neg,
    Not,
}

impl fmt::Display for UnaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UnaryOp::Neg => write!(f, "-"),
            UnaryOp::Not => write!(f, "!"),
        }
    }
}
