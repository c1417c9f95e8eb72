pub mod span;
pub mod diagnostics;
pub mod lexer;
pub mod parser;
pub mod visit;
pub mod analysis;

use analysis::Analysis;
use diagnostics::CompileError;
use parser::ast::Program;

/// Lex and parse a source string into a unit. Syntax errors fail fast.
pub fn parse(source: &str) -> Result<Program, CompileError> {
    let tokens = lexer::lex(source)?;
    let mut parser = parser::Parser::new(&tokens);
    parser.parse_program()
}

/// Run the full front end over a source string (lex → parse → analyze).
/// Only syntax errors surface as `Err`; semantic findings are collected in
/// the returned analysis, one report for the whole unit.
pub fn analyze(source: &str) -> Result<Analysis, CompileError> {
    let program = parse(source)?;
    Ok(analysis::analyze_unit(&program))
}
