use std::fmt;
use std::io;

use serde::Serialize;
use thiserror::Error;

use crate::span::Span;

/// Fail-fast pipeline errors: anything that prevents analysis from running
/// at all. Semantic findings are never reported this way; they go through
/// [`Diagnostic`] so one bad expression cannot abort the unit.
#[derive(Debug, Error)]
pub enum CompileError {
    #[error("Syntax error: {msg}")]
    Syntax { msg: String, span: Span },

    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

impl CompileError {
    pub fn syntax(msg: impl Into<String>, span: Span) -> Self {
        Self::Syntax { msg: msg.into(), span }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DiagnosticKind {
    TypeMismatch,
    UnresolvedTypeParameter,
    UnresolvedIdentifier,
    UnusedSymbol,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
}

impl DiagnosticKind {
    /// Severity is a function of the kind, not a per-instance choice.
    pub fn severity(self) -> Severity {
        match self {
            DiagnosticKind::UnusedSymbol => Severity::Warning,
            DiagnosticKind::TypeMismatch
            | DiagnosticKind::UnresolvedTypeParameter
            | DiagnosticKind::UnresolvedIdentifier => Severity::Error,
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Error => write!(f, "error"),
            Severity::Warning => write!(f, "warning"),
        }
    }
}

/// A non-fatal semantic finding.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Diagnostic {
    pub kind: DiagnosticKind,
    pub span: Span,
    pub message: String,
}

impl Diagnostic {
    pub fn new(kind: DiagnosticKind, span: Span, message: impl Into<String>) -> Self {
        Self { kind, span, message: message.into() }
    }

    pub fn severity(&self) -> Severity {
        self.kind.severity()
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.severity(), self.message)
    }
}

/// Append-only bag of diagnostics for one unit. Per-declaration batches are
/// collected separately and merged in declaration order, so the final report
/// preserves source order within each declaration.
#[derive(Debug, Default)]
pub struct Diagnostics {
    items: Vec<Diagnostic>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, diag: Diagnostic) {
        self.items.push(diag);
    }

    pub fn report(&mut self, kind: DiagnosticKind, span: Span, message: impl Into<String>) {
        self.push(Diagnostic::new(kind, span, message));
    }

    pub fn merge(&mut self, batch: Diagnostics) {
        self.items.extend(batch.items);
    }

    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.items.iter()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn has_errors(&self) -> bool {
        self.items.iter().any(|d| d.severity() == Severity::Error)
    }

    pub fn error_count(&self) -> usize {
        self.items.iter().filter(|d| d.severity() == Severity::Error).count()
    }

    pub fn warning_count(&self) -> usize {
        self.items.iter().filter(|d| d.severity() == Severity::Warning).count()
    }

    pub fn into_vec(self) -> Vec<Diagnostic> {
        self.items
    }
}

impl IntoIterator for Diagnostics {
    type Item = Diagnostic;
    type IntoIter = std::vec::IntoIter<Diagnostic>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.into_iter()
    }
}

/// Span with 1-based line/column for machine-readable output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DiagnosticSpan {
    pub start: usize,
    pub end: usize,
    pub line: usize,
    pub column: usize,
}

impl DiagnosticSpan {
    pub fn from_span(span: Span, source: &str) -> Self {
        let line = source[..span.start].chars().filter(|c| *c == '\n').count() + 1;
        let col_start = source[..span.start].rfind('\n').map(|i| i + 1).unwrap_or(0);
        let column = source[col_start..span.start].chars().count() + 1;
        Self { start: span.start, end: span.end, line, column }
    }
}

/// Render a diagnostic with ariadne for nice terminal output.
pub fn render_diagnostic(source: &str, diag: &Diagnostic) {
    use ariadne::{Label, Report, ReportKind, Source};

    let kind = match diag.severity() {
        Severity::Error => ReportKind::Error,
        Severity::Warning => ReportKind::Warning,
    };

    Report::build(kind, (), diag.span.start)
        .with_message(&diag.message)
        .with_label(
            Label::new(diag.span.start..diag.span.end)
                .with_message(&diag.message),
        )
        .finish()
        .eprint(Source::from(source))
        .unwrap();
}

/// Render a fail-fast CompileError with ariadne.
pub fn render_error(source: &str, err: &CompileError) {
    use ariadne::{Label, Report, ReportKind, Source};

    match err {
        CompileError::Syntax { msg, span } => {
            Report::build(ReportKind::Error, (), span.start)
                .with_message("syntax error")
                .with_label(
                    Label::new(span.start..span.end)
                        .with_message(msg),
                )
                .finish()
                .eprint(Source::from(source))
                .unwrap();
        }
        CompileError::Io(e) => {
            eprintln!("error: {e}");
        }
    }
}
