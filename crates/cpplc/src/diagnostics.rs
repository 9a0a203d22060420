//! Diagnostic reporting utilities for the cppl compiler.
//!
//! Semantic failures are described by [`SemanticError`], wrapped into a
//! [`Diagnostic`] that carries the span and item it was found in, and either
//! propagated with `?` (as `Box<Diagnostic>`) or collected by the
//! [`Program`](crate::program::Program) so that compilation can continue
//! with the next item.
//!
//! Rendering follows rustc conventions: a colored `error[E0001]:` header, a
//! `--> file:line:col` location when the span and source are known, the
//! offending source line with a caret, and optional `note:` lines.

use colored::Colorize;
use cppl_ast::Span;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};

/// Result type used throughout lowering. The diagnostic is boxed to keep
/// the `Ok` path small.
pub type DiagnosticResult<T> = Result<T, Box<Diagnostic>>;

/// How serious a diagnostic is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Error,
    Warning,
    Note,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Severity::Error => "error",
            Severity::Warning => "warning",
            Severity::Note => "note",
        })
    }
}

/// The kind of a semantic failure, without its payload. Tests and callers
/// match on this rather than on message text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Redefinition,
    UndefinedSymbol,
    UnknownType,
    NotCallable,
    ArityOrTypeMismatch,
    BranchTypeMismatch,
    CyclicDependency,
    ExpectedValue,
    MissingReturn,
    InvalidIr,
}

/// Semantic errors raised while resolving names and lowering items.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SemanticError {
    /// A name was bound twice in the same scope.
    #[error("`{name}` is defined multiple times in the same scope")]
    Redefinition { name: String },

    /// No binding exists anywhere in the scope chain.
    #[error("cannot find `{name}` in this scope")]
    UndefinedSymbol { name: String },

    /// The name exists but does not denote a type.
    #[error("`{name}` is not a type")]
    UnknownType { name: String },

    /// The callee's type is not a function type.
    #[error("`{callee}` is not callable; its type is `{ty}`")]
    NotCallable { callee: String, ty: String },

    /// Wrong number of arguments or a value of the wrong type.
    #[error("{message}")]
    ArityOrTypeMismatch { message: String },

    /// The arms of an `if` used as a value disagree.
    #[error("{message}")]
    BranchTypeMismatch { message: String },

    /// A type's layout depends on itself.
    #[error("cyclic dependency: `{name}` depends on itself")]
    CyclicDependency { name: String },

    /// A value was required but the expression yields none.
    #[error("expected a value, but `{expr}` does not produce one")]
    ExpectedValue { expr: String },

    /// A non-void function can fall off the end of its body.
    #[error("function `{name}` does not return a value on every path")]
    MissingReturn { name: String },

    /// The emitted IR failed structural verification.
    #[error("invalid IR in `{function}`: {message}")]
    InvalidIr { function: String, message: String },
}

impl SemanticError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            SemanticError::Redefinition { .. } => ErrorKind::Redefinition,
            SemanticError::UndefinedSymbol { .. } => ErrorKind::UndefinedSymbol,
            SemanticError::UnknownType { .. } => ErrorKind::UnknownType,
            SemanticError::NotCallable { .. } => ErrorKind::NotCallable,
            SemanticError::ArityOrTypeMismatch { .. } => ErrorKind::ArityOrTypeMismatch,
            SemanticError::BranchTypeMismatch { .. } => ErrorKind::BranchTypeMismatch,
            SemanticError::CyclicDependency { .. } => ErrorKind::CyclicDependency,
            SemanticError::ExpectedValue { .. } => ErrorKind::ExpectedValue,
            SemanticError::MissingReturn { .. } => ErrorKind::MissingReturn,
            SemanticError::InvalidIr { .. } => ErrorKind::InvalidIr,
        }
    }

    /// Stable error code shown in rendered diagnostics.
    pub fn code(&self) -> &'static str {
        match self.kind() {
            ErrorKind::Redefinition => "E0001",
            ErrorKind::UndefinedSymbol => "E0002",
            ErrorKind::UnknownType => "E0003",
            ErrorKind::NotCallable => "E0004",
            ErrorKind::ArityOrTypeMismatch => "E0005",
            ErrorKind::BranchTypeMismatch => "E0006",
            ErrorKind::CyclicDependency => "E0007",
            ErrorKind::ExpectedValue => "E0008",
            ErrorKind::MissingReturn => "E0009",
            ErrorKind::InvalidIr => "E0010",
        }
    }

    pub fn mismatch(message: impl Into<String>) -> Self {
        SemanticError::ArityOrTypeMismatch {
            message: message.into(),
        }
    }

    pub fn branch_mismatch(message: impl Into<String>) -> Self {
        SemanticError::BranchTypeMismatch {
            message: message.into(),
        }
    }

    /// Wraps the error into a boxed diagnostic located at `span`.
    pub fn at(self, span: Span) -> Box<Diagnostic> {
        Box::new(Diagnostic::from(self).with_span(span))
    }
}

/// Structured diagnostic container for propagating compiler errors.
///
/// Detection is decoupled from emission: lowering returns diagnostics, the
/// program collects them per item, and the driver decides how to print.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub severity: Severity,
    /// The semantic kind, absent for free-form diagnostics.
    pub kind: Option<ErrorKind>,
    pub code: Option<&'static str>,
    pub message: String,
    pub note: Option<String>,
    /// Top-level item being built when the diagnostic was raised.
    pub item: Option<String>,
    /// Optional file path where the error occurred.
    pub file: Option<String>,
    /// Byte range into the source text.
    pub span: Option<Span>,
}

impl Diagnostic {
    pub fn new(severity: Severity, message: impl Into<String>) -> Self {
        Diagnostic {
            severity,
            kind: None,
            code: None,
            message: message.into(),
            note: None,
            item: None,
            file: None,
            span: None,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Diagnostic::new(Severity::Error, message)
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Diagnostic::new(Severity::Warning, message)
    }

    /// Boxed free-form diagnostic, for `Err(...)` returns.
    pub fn simple_boxed(severity: Severity, message: impl Into<String>) -> Box<Self> {
        Box::new(Diagnostic::new(severity, message))
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.note = Some(note.into());
        self
    }

    pub fn with_span(mut self, span: Span) -> Self {
        self.span = Some(span);
        self
    }

    pub fn with_item(mut self, item: impl Into<String>) -> Self {
        self.item = Some(item.into());
        self
    }

    pub fn with_file(mut self, file: impl Into<String>) -> Self {
        self.file = Some(file.into());
        self
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

impl From<SemanticError> for Diagnostic {
    fn from(err: SemanticError) -> Self {
        Diagnostic {
            severity: Severity::Error,
            kind: Some(err.kind()),
            code: Some(err.code()),
            message: err.to_string(),
            note: None,
            item: None,
            file: None,
            span: None,
        }
    }
}

impl From<SemanticError> for Box<Diagnostic> {
    fn from(err: SemanticError) -> Self {
        Box::new(Diagnostic::from(err))
    }
}

impl From<inkwell::builder::BuilderError> for Box<Diagnostic> {
    fn from(err: inkwell::builder::BuilderError) -> Self {
        Box::new(Diagnostic::error(format!("internal IR builder error: {}", err)))
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.severity)?;
        if let Some(code) = self.code {
            write!(f, "[{}]", code)?;
        }
        write!(f, ": {}", self.message)?;
        if let Some(item) = &self.item {
            write!(f, " (in `{}`)", item)?;
        }
        if let Some(note) = &self.note {
            write!(f, "\nnote: {}", note)?;
        }
        Ok(())
    }
}

impl std::error::Error for Diagnostic {}

/// Every error diagnostic collected while finalizing a program.
#[derive(Debug, Clone, thiserror::Error)]
#[error("compilation failed with {} error(s)", .diagnostics.len())]
pub struct CompileErrors {
    pub diagnostics: Vec<Diagnostic>,
}

impl CompileErrors {
    /// Whether any collected diagnostic has the given kind.
    pub fn contains(&self, kind: ErrorKind) -> bool {
        self.diagnostics.iter().any(|d| d.kind == Some(kind))
    }

    pub fn kinds(&self) -> Vec<ErrorKind> {
        self.diagnostics.iter().filter_map(|d| d.kind).collect()
    }
}

static DIAGNOSTICS_ENABLED: AtomicBool = AtomicBool::new(true);

/// Converts a byte offset into 1-based line and 0-based column.
fn line_col(source: &str, offset: usize) -> (usize, usize) {
    let mut byte_idx = 0usize;
    for (lineno, line) in source.lines().enumerate() {
        let line_len = line.len() + 1;
        if offset >= byte_idx && offset < byte_idx + line_len {
            return (lineno + 1, offset - byte_idx);
        }
        byte_idx += line_len;
    }
    (source.lines().count().max(1), 0)
}

fn header(d: &Diagnostic) -> String {
    let label = match d.severity {
        Severity::Error => match d.code {
            Some(code) => format!("error[{}]", code).red().bold(),
            None => "error".red().bold(),
        },
        Severity::Warning => "warning".yellow().bold(),
        Severity::Note => "note".blue().bold(),
    };
    match &d.item {
        Some(item) => format!("{}: {} (in `{}`)", label, d.message, item),
        None => format!("{}: {}", label, d.message),
    }
}

/// Renders a diagnostic to a string, without color codes when the
/// `colored` override is off.
pub fn render(d: &Diagnostic, source: Option<&str>) -> String {
    let mut out = header(d);
    out.push('\n');

    match (&d.span, source) {
        (Some(span), Some(src)) if !src.is_empty() => {
            let (line_no, col) = line_col(src, span.start);
            let file = d
                .file
                .as_deref()
                .map(sanitize_file_path)
                .unwrap_or_else(|| "<input>".to_string());
            out.push_str(&format!("  --> {}:{}:{}\n", file, line_no, col + 1));
            if let Some(line) = src.lines().nth(line_no - 1) {
                let width = span.end.saturating_sub(span.start).max(1);
                let width = width.min(line.len().saturating_sub(col).max(1));
                out.push_str(&format!("{:4} | {}\n", line_no, line));
                out.push_str(&format!(
                    "     | {}{}\n",
                    " ".repeat(col),
                    "^".repeat(width).red()
                ));
            }
        }
        (Some(span), _) => {
            if let Some(file) = &d.file {
                out.push_str(&format!("  --> {}\n", sanitize_file_path(file)));
            }
            out.push_str(&format!("     = at bytes {}..{}\n", span.start, span.end));
        }
        (None, _) => {
            if let Some(file) = &d.file {
                out.push_str(&format!("  --> {}\n", sanitize_file_path(file)));
            }
        }
    }

    if let Some(note) = &d.note {
        out.push_str(&format!("{}: {}\n", "note".blue().bold(), note));
    }
    out
}

/// Emits a diagnostic to stderr unless output is suppressed.
pub fn emit_diagnostic(d: &Diagnostic, source: Option<&str>) {
    if DIAGNOSTICS_ENABLED.load(Ordering::SeqCst) {
        eprint!("{}", render(d, source));
    }
}

/// Only the file name is shown, never the full path.
fn sanitize_file_path(path: &str) -> String {
    std::path::Path::new(path)
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("file")
        .to_string()
}

/// Temporarily suppresses diagnostic output; restores the previous state
/// when the returned guard is dropped.
pub fn suppress() -> SuppressGuard {
    let prev = DIAGNOSTICS_ENABLED.swap(false, Ordering::SeqCst);
    SuppressGuard { prev }
}

/// RAII guard returned by [`suppress`].
pub struct SuppressGuard {
    prev: bool,
}

impl Drop for SuppressGuard {
    fn drop(&mut self) {
        DIAGNOSTICS_ENABLED.store(self.prev, Ordering::SeqCst);
    }
}
