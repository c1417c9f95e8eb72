pub mod ast;

use uuid::Uuid;

use crate::diagnostics::CompileError;
use crate::lexer::token::Token;
use crate::span::{Span, Spanned};
use ast::*;

pub struct Parser<'a> {
    tokens: &'a [Spanned<Token>],
    pos: usize,
}

impl<'a> Parser<'a> {
    pub fn new(tokens: &'a [Spanned<Token>]) -> Self {
        Self { tokens, pos: 0 }
    }

    fn peek(&self) -> Option<&Spanned<Token>> {
        self.tokens.get(self.pos)
    }

    fn peek_at(&self, offset: usize) -> Option<&Token> {
        self.tokens.get(self.pos + offset).map(|t| &t.node)
    }

    fn advance(&mut self) -> Option<&Spanned<Token>> {
        if self.pos < self.tokens.len() {
            let tok = &self.tokens[self.pos];
            self.pos += 1;
            Some(tok)
        } else {
            None
        }
    }

    fn expect(&mut self, expected: &Token) -> Result<&Spanned<Token>, CompileError> {
        match self.tokens.get(self.pos) {
            Some(tok) if std::mem::discriminant(&tok.node) == std::mem::discriminant(expected) => {
                self.pos += 1;
                Ok(&self.tokens[self.pos - 1])
            }
            Some(tok) => Err(CompileError::syntax(
                format!("expected '{expected}', found '{}'", tok.node),
                tok.span,
            )),
            None => Err(CompileError::syntax(
                format!("expected '{expected}', found end of file"),
                self.eof_span(),
            )),
        }
    }

    fn expect_ident(&mut self) -> Result<Spanned<String>, CompileError> {
        match self.tokens.get(self.pos) {
            Some(tok) => {
                if let Token::Ident(name) = &tok.node {
                    let spanned = Spanned::new(name.clone(), tok.span);
                    self.pos += 1;
                    Ok(spanned)
                } else {
                    Err(CompileError::syntax(
                        format!("expected identifier, found '{}'", tok.node),
                        tok.span,
                    ))
                }
            }
            None => Err(CompileError::syntax(
                "expected identifier, found end of file",
                self.eof_span(),
            )),
        }
    }

    fn eof_span(&self) -> Span {
        if let Some(last) = self.tokens.last() {
            Span::new(last.span.end, last.span.end)
        } else {
            Span::dummy()
        }
    }

    pub fn parse_program(&mut self) -> Result<Program, CompileError> {
        let mut functions = Vec::new();

        while let Some(tok) = self.peek() {
            match &tok.node {
                Token::Function => functions.push(self.parse_function()?),
                _ => {
                    return Err(CompileError::syntax(
                        format!("expected 'function', found '{}'", tok.node),
                        tok.span,
                    ));
                }
            }
        }

        Ok(Program { functions })
    }

    fn parse_function(&mut self) -> Result<Spanned<Function>, CompileError> {
        let fn_tok = self.expect(&Token::Function)?;
        let start = fn_tok.span.start;
        let name = self.expect_ident()?;
        let params = self.parse_params()?;
        let return_type = self.parse_return_annotation()?;
        let body = self.parse_block()?;
        let end = body.span.end;

        Ok(Spanned::new(
            Function { name, params, return_type, body },
            Span::new(start, end),
        ))
    }

    fn parse_params(&mut self) -> Result<Vec<Param>, CompileError> {
        self.expect(&Token::LParen)?;
        let mut params = Vec::new();
        while self.peek().is_some() && !matches!(self.peek().unwrap().node, Token::RParen) {
            if !params.is_empty() {
                self.expect(&Token::Comma)?;
            }
            let pname = self.expect_ident()?;
            self.expect(&Token::Colon)?;
            let pty = self.parse_type()?;
            params.push(Param { name: pname, ty: pty });
        }
        self.expect(&Token::RParen)?;
        Ok(params)
    }

    fn parse_return_annotation(&mut self) -> Result<Option<Spanned<TypeExpr>>, CompileError> {
        if self.peek().is_some() && matches!(self.peek().unwrap().node, Token::Colon) {
            self.advance();
            Ok(Some(self.parse_type()?))
        } else {
            Ok(None)
        }
    }

    fn parse_type(&mut self) -> Result<Spanned<TypeExpr>, CompileError> {
        let ident = self.expect_ident()?;
        Ok(Spanned::new(TypeExpr::Named(ident.node), ident.span))
    }

    /// Parse a type parameter list `<T, R>` if one starts here.
    fn parse_type_params(&mut self) -> Result<Vec<Spanned<String>>, CompileError> {
        if self.peek().is_some() && matches!(self.peek().unwrap().node, Token::Less) {
            self.advance();
            let mut params = Vec::new();
            while self.peek().is_some() && !matches!(self.peek().unwrap().node, Token::Greater) {
                if !params.is_empty() {
                    self.expect(&Token::Comma)?;
                }
                params.push(self.expect_ident()?);
            }
            self.expect(&Token::Greater)?;
            Ok(params)
        } else {
            Ok(Vec::new())
        }
    }

    /// Parse a type argument list `<number, string>`. Assumes we're positioned at `<`.
    fn parse_type_arg_list(&mut self) -> Result<Vec<Spanned<TypeExpr>>, CompileError> {
        self.expect(&Token::Less)?;
        let mut args = Vec::new();
        while self.peek().is_some() && !matches!(self.peek().unwrap().node, Token::Greater) {
            if !args.is_empty() {
                self.expect(&Token::Comma)?;
            }
            args.push(self.parse_type()?);
        }
        self.expect(&Token::Greater)?;
        Ok(args)
    }

    fn parse_block(&mut self) -> Result<Spanned<Block>, CompileError> {
        let open = self.expect(&Token::LBrace)?;
        let start = open.span.start;
        let mut stmts = Vec::new();

        while self.peek().is_some() && !matches!(self.peek().unwrap().node, Token::RBrace) {
            stmts.push(self.parse_stmt()?);
        }

        let close = self.expect(&Token::RBrace)?;
        let end = close.span.end;

        Ok(Spanned::new(Block { stmts }, Span::new(start, end)))
    }

    fn parse_stmt(&mut self) -> Result<Spanned<Stmt>, CompileError> {
        let tok = self.peek().ok_or_else(|| {
            CompileError::syntax("unexpected end of file", self.eof_span())
        })?;

        match &tok.node {
            Token::Let | Token::Const => self.parse_let_stmt(),
            Token::Return => self.parse_return_stmt(),
            Token::If => self.parse_if_stmt(),
            Token::LBrace => {
                let block = self.parse_block()?;
                let span = block.span;
                Ok(Spanned::new(Stmt::Block(block), span))
            }
            _ => {
                let expr = self.parse_expr(0)?;
                let start = expr.span.start;
                let semi = self.expect(&Token::Semicolon)?;
                let end = semi.span.end;
                Ok(Spanned::new(Stmt::Expr(expr), Span::new(start, end)))
            }
        }
    }

    fn parse_let_stmt(&mut self) -> Result<Spanned<Stmt>, CompileError> {
        // `let` and `const` bind identically; the initializer is mandatory.
        let kw = self.advance().unwrap();
        let start = kw.span.start;
        let name = self.expect_ident()?;

        let ty = if self.peek().is_some() && matches!(self.peek().unwrap().node, Token::Colon) {
            self.advance();
            Some(self.parse_type()?)
        } else {
            None
        };

        self.expect(&Token::Assign)?;
        let value = self.parse_expr(0)?;
        let semi = self.expect(&Token::Semicolon)?;
        let end = semi.span.end;

        Ok(Spanned::new(Stmt::Let { name, ty, value }, Span::new(start, end)))
    }

    fn parse_return_stmt(&mut self) -> Result<Spanned<Stmt>, CompileError> {
        let ret = self.expect(&Token::Return)?;
        let start = ret.span.start;

        if self.peek().is_some() && matches!(self.peek().unwrap().node, Token::Semicolon) {
            let semi = self.advance().unwrap();
            let end = semi.span.end;
            return Ok(Spanned::new(Stmt::Return(None), Span::new(start, end)));
        }

        let expr = self.parse_expr(0)?;
        let semi = self.expect(&Token::Semicolon)?;
        let end = semi.span.end;
        Ok(Spanned::new(Stmt::Return(Some(expr)), Span::new(start, end)))
    }

    fn parse_if_stmt(&mut self) -> Result<Spanned<Stmt>, CompileError> {
        let if_tok = self.expect(&Token::If)?;
        let start = if_tok.span.start;
        self.expect(&Token::LParen)?;
        let condition = self.parse_expr(0)?;
        self.expect(&Token::RParen)?;
        let then_block = self.parse_block()?;
        let mut end = then_block.span.end;

        let else_block = if self.peek().is_some() && matches!(self.peek().unwrap().node, Token::Else) {
            self.advance();
            if self.peek().is_some() && matches!(self.peek().unwrap().node, Token::If) {
                // `else if` wraps the chained if in a synthetic block.
                let chained = self.parse_if_stmt()?;
                let span = chained.span;
                end = span.end;
                Some(Spanned::new(Block { stmts: vec![chained] }, span))
            } else {
                let block = self.parse_block()?;
                end = block.span.end;
                Some(block)
            }
        } else {
            None
        };

        Ok(Spanned::new(
            Stmt::If { condition, then_block, else_block },
            Span::new(start, end),
        ))
    }

    fn parse_expr(&mut self, min_bp: u8) -> Result<Spanned<Expr>, CompileError> {
        let mut lhs = self.parse_prefix()?;

        loop {
            let Some(tok) = self.peek() else { break };

            let op = match &tok.node {
                Token::Plus => BinOp::Add,
                Token::Minus => BinOp::Sub,
                Token::Star => BinOp::Mul,
                Token::Slash => BinOp::Div,
                Token::StrictEq => BinOp::StrictEq,
                Token::StrictNeq => BinOp::StrictNeq,
                Token::EqEq => BinOp::Eq,
                Token::BangEq => BinOp::Neq,
                Token::Less => BinOp::Lt,
                Token::Greater => BinOp::Gt,
                Token::LessEq => BinOp::LtEq,
                Token::GreaterEq => BinOp::GtEq,
                _ => break,
            };

            let (lbp, rbp) = infix_binding_power(op);
            if lbp < min_bp {
                break;
            }

            self.advance(); // consume operator

            let rhs = self.parse_expr(rbp)?;
            let span = Span::new(lhs.span.start, rhs.span.end);
            lhs = Spanned::new(
                Expr::BinOp {
                    op,
                    lhs: Box::new(lhs),
                    rhs: Box::new(rhs),
                },
                span,
            );
        }

        Ok(lhs)
    }

    fn parse_prefix(&mut self) -> Result<Spanned<Expr>, CompileError> {
        let tok = self.peek().ok_or_else(|| {
            CompileError::syntax("unexpected end of file in expression", self.eof_span())
        })?;

        match &tok.node {
            Token::NumberLit(_) => {
                let tok = self.advance().unwrap();
                let Token::NumberLit(n) = &tok.node else { unreachable!() };
                Ok(Spanned::new(Expr::NumberLit(*n), tok.span))
            }
            Token::True => {
                let tok = self.advance().unwrap();
                Ok(Spanned::new(Expr::BoolLit(true), tok.span))
            }
            Token::False => {
                let tok = self.advance().unwrap();
                Ok(Spanned::new(Expr::BoolLit(false), tok.span))
            }
            Token::StringLit(_) => {
                let tok = self.advance().unwrap();
                let Token::StringLit(s) = &tok.node else { unreachable!() };
                Ok(Spanned::new(Expr::StringLit(s.clone()), tok.span))
            }
            Token::Ident(_) => {
                let ident = self.expect_ident()?;
                self.parse_expr_after_ident(ident)
            }
            Token::Less => self.parse_fn_expr(),
            Token::LParen => {
                if self.is_fn_expr_ahead() {
                    self.parse_fn_expr()
                } else {
                    self.advance(); // consume '('
                    let expr = self.parse_expr(0)?;
                    self.expect(&Token::RParen)?;
                    Ok(expr)
                }
            }
            Token::Minus => {
                let tok = self.advance().unwrap();
                let start = tok.span.start;
                let operand = self.parse_prefix()?;
                let end = operand.span.end;
                Ok(Spanned::new(
                    Expr::UnaryOp { op: UnaryOp::Neg, operand: Box::new(operand) },
                    Span::new(start, end),
                ))
            }
            Token::Bang => {
                let tok = self.advance().unwrap();
                let start = tok.span.start;
                let operand = self.parse_prefix()?;
                let end = operand.span.end;
                Ok(Spanned::new(
                    Expr::UnaryOp { op: UnaryOp::Not, operand: Box::new(operand) },
                    Span::new(start, end),
                ))
            }
            _ => Err(CompileError::syntax(
                format!("unexpected token '{}' in expression", tok.node),
                tok.span,
            )),
        }
    }

    /// Continue an expression that started with an identifier: a call,
    /// an explicitly instantiated call, or a plain identifier.
    fn parse_expr_after_ident(&mut self, ident: Spanned<String>) -> Result<Spanned<Expr>, CompileError> {
        if self.peek().is_some() && matches!(self.peek().unwrap().node, Token::LParen) {
            let (args, end) = self.parse_call_args()?;
            let span = Span::new(ident.span.start, end);
            Ok(Spanned::new(
                Expr::Call { callee: ident, type_args: Vec::new(), args },
                span,
            ))
        } else if self.peek().is_some()
            && matches!(self.peek().unwrap().node, Token::Less)
            && self.is_instantiated_call_ahead()
        {
            let type_args = self.parse_type_arg_list()?;
            let (args, end) = self.parse_call_args()?;
            let span = Span::new(ident.span.start, end);
            Ok(Spanned::new(
                Expr::Call { callee: ident, type_args, args },
                span,
            ))
        } else {
            Ok(Spanned::new(Expr::Ident(ident.node.clone()), ident.span))
        }
    }

    fn parse_call_args(&mut self) -> Result<(Vec<Spanned<Expr>>, usize), CompileError> {
        self.expect(&Token::LParen)?;
        let mut args = Vec::new();
        while self.peek().is_some() && !matches!(self.peek().unwrap().node, Token::RParen) {
            if !args.is_empty() {
                self.expect(&Token::Comma)?;
            }
            args.push(self.parse_expr(0)?);
        }
        let close = self.expect(&Token::RParen)?;
        Ok((args, close.span.end))
    }

    /// Parse a function expression. Positioned at `<` (generic) or `(`.
    fn parse_fn_expr(&mut self) -> Result<Spanned<Expr>, CompileError> {
        let start = self.peek().map(|t| t.span.start).unwrap_or(0);
        let type_params = self.parse_type_params()?;
        let params = self.parse_params()?;
        let return_type = self.parse_return_annotation()?;

        let body = if self.peek().is_some() && matches!(self.peek().unwrap().node, Token::FatArrow) {
            // Arrow shorthand desugars to a single-return block.
            self.advance();
            let expr = self.parse_expr(0)?;
            let span = expr.span;
            Spanned::new(
                Block { stmts: vec![Spanned::new(Stmt::Return(Some(expr)), span)] },
                span,
            )
        } else {
            self.parse_block()?
        };

        let end = body.span.end;
        Ok(Spanned::new(
            Expr::Fn(FnExpr {
                id: Uuid::new_v4(),
                type_params,
                params,
                return_type,
                body,
            }),
            Span::new(start, end),
        ))
    }

    /// Lookahead from a `(`: `()` or `(ident :` starts a function expression,
    /// anything else is a parenthesized expression. Param annotations are
    /// mandatory, so one token of context decides.
    fn is_fn_expr_ahead(&self) -> bool {
        if !matches!(self.peek_at(0), Some(Token::LParen)) {
            return false;
        }
        match self.peek_at(1) {
            Some(Token::RParen) => true,
            Some(Token::Ident(_)) => matches!(self.peek_at(2), Some(Token::Colon)),
            _ => false,
        }
    }

    /// Lookahead from a `<` after a callee name: `<T, R>(` commits to an
    /// instantiated call, anything else falls back to a comparison. Type
    /// arguments are bare names, so the scan never nests.
    fn is_instantiated_call_ahead(&self) -> bool {
        let mut i = 1;
        loop {
            if !matches!(self.peek_at(i), Some(Token::Ident(_))) {
                return false;
            }
            i += 1;
            match self.peek_at(i) {
                Some(Token::Comma) => i += 1,
                Some(Token::Greater) => {
                    i += 1;
                    break;
                }
                _ => return false,
            }
        }
        matches!(self.peek_at(i), Some(Token::LParen))
    }
}

fn infix_binding_power(op: BinOp) -> (u8, u8) {
    match op {
        BinOp::StrictEq | BinOp::StrictNeq | BinOp::Eq | BinOp::Neq => (5, 6),
        BinOp::Lt | BinOp::Gt | BinOp::LtEq | BinOp::GtEq => (7, 8),
        BinOp::Add | BinOp::Sub => (9, 10),
        BinOp::Mul | BinOp::Div => (11, 12),
    }
}
