use clap::{Parser, Subcommand};
use serde::Serialize;
use std::path::{Path, PathBuf};

use tycho::analysis::types::Type;
use tycho::analysis::Analysis;
use tycho::diagnostics::{
    render_diagnostic, render_error, DiagnosticKind, DiagnosticSpan, Severity,
};

#[derive(Parser)]
#[command(name = "tychoc", version, about = "The Tycho front-end analyzer")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Analyze a .ty source file and report all diagnostics
    Check {
        /// Source file path
        file: PathBuf,
        /// Emit the report as JSON on stdout
        #[arg(long)]
        json: bool,
        /// Print the resolved type of every call site
        #[arg(long)]
        types: bool,
    },
}

#[derive(Serialize)]
struct JsonDiagnostic<'a> {
    kind: DiagnosticKind,
    severity: Severity,
    span: DiagnosticSpan,
    message: &'a str,
}

#[derive(Serialize)]
struct JsonCallType {
    span: DiagnosticSpan,
    #[serde(rename = "type")]
    ty: Type,
}

#[derive(Serialize)]
struct JsonReport<'a> {
    diagnostics: Vec<JsonDiagnostic<'a>>,
    call_types: Vec<JsonCallType>,
}

fn sorted_call_types(analysis: &Analysis) -> Vec<((usize, usize), Type)> {
    let mut entries: Vec<_> = analysis.call_types.iter().map(|(k, v)| (*k, *v)).collect();
    entries.sort_by_key(|(k, _)| *k);
    entries
}

fn run_check(file: &Path, json: bool, types: bool) -> i32 {
    let source = match std::fs::read_to_string(file) {
        Ok(source) => source,
        Err(err) => {
            eprintln!("error [{}]: {err}", file.display());
            return 2;
        }
    };

    let analysis = match tycho::analyze(&source) {
        Ok(analysis) => analysis,
        Err(err) => {
            render_error(&source, &err);
            return 2;
        }
    };

    if json {
        let report = JsonReport {
            diagnostics: analysis
                .diagnostics
                .iter()
                .map(|d| JsonDiagnostic {
                    kind: d.kind,
                    severity: d.severity(),
                    span: DiagnosticSpan::from_span(d.span, &source),
                    message: &d.message,
                })
                .collect(),
            call_types: sorted_call_types(&analysis)
                .into_iter()
                .map(|((start, end), ty)| JsonCallType {
                    span: DiagnosticSpan::from_span(tycho::span::Span::new(start, end), &source),
                    ty,
                })
                .collect(),
        };
        println!("{}", serde_json::to_string_pretty(&report).unwrap());
    } else {
        for diag in &analysis.diagnostics {
            render_diagnostic(&source, diag);
        }
        if types {
            for ((start, end), ty) in sorted_call_types(&analysis) {
                let span = DiagnosticSpan::from_span(tycho::span::Span::new(start, end), &source);
                println!("{}:{}: {ty}", span.line, span.column);
            }
        }
    }

    let errors = analysis
        .diagnostics
        .iter()
        .filter(|d| d.severity() == Severity::Error)
        .count();
    if errors > 0 {
        1
    } else {
        0
    }
}

fn main() {
    let cli = Cli::parse();

    match cli.command {
        Commands::Check { file, json, types } => {
            std::process::exit(run_check(&file, json, types));
        }
    }
}
