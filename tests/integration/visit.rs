//! The read-only AST visitor as a library consumer sees it: override one
//! method, call the matching `walk_*` to recurse, skip it to prune.

use tycho::parser::ast::{Expr, Program, Stmt};
use tycho::span::Spanned;
use tycho::visit::{walk_expr, walk_stmt, Visitor};

fn parse(src: &str) -> Program {
    tycho::parse(src).unwrap()
}

#[test]
fn collects_call_sites_across_closure_boundaries() {
    let program = parse(
        "function main() {\n    let f = <T>(x: T): T => id(x);\n    print(f(1));\n}\n",
    );

    struct CallCollector {
        callees: Vec<String>,
    }

    impl Visitor for CallCollector {
        fn visit_expr(&mut self, expr: &Spanned<Expr>) {
            if let Expr::Call { callee, .. } = &expr.node {
                self.callees.push(callee.node.clone());
            }
            walk_expr(self, expr);
        }
    }

    let mut collector = CallCollector { callees: Vec::new() };
    collector.visit_program(&program);

    collector.callees.sort();
    assert_eq!(collector.callees, vec!["f", "id", "print"]);
}

#[test]
fn pruning_a_statement_skips_its_subtree() {
    let program = parse(
        "function main() {\n    return inside;\n    print(outside);\n}\n",
    );

    struct PruneReturns {
        idents: Vec<String>,
    }

    impl Visitor for PruneReturns {
        fn visit_stmt(&mut self, stmt: &Spanned<Stmt>) {
            if matches!(stmt.node, Stmt::Return(_)) {
                return;
            }
            walk_stmt(self, stmt);
        }

        fn visit_expr(&mut self, expr: &Spanned<Expr>) {
            if let Expr::Ident(name) = &expr.node {
                self.idents.push(name.clone());
            }
            walk_expr(self, expr);
        }
    }

    let mut visitor = PruneReturns { idents: Vec::new() };
    visitor.visit_program(&program);

    assert_eq!(visitor.idents, vec!["outside"]);
}
