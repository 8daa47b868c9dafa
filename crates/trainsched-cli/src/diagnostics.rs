//! Diagnostic reporting for the `trainsched` binary
//!
//! Normalizer, scheduler and projector findings reach the user through one of
//! two emitters: [`TerminalEmitter`] writes them to stderr, [`JsonEmitter`]
//! gathers them for a JSON document. Both resolve each finding through the
//! same [`DiagnosticConfig`]:
//!
//! - `--strict` turns dropped-row and degraded-cost warnings into errors
//! - `--quiet` hides everything that did not end up an error
//!
//! The process exits 1 as soon as one finding resolves to an error. `--quiet`
//! never changes that.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::process;

use serde::Serialize;
use trainsched_core::{Diagnostic, DiagnosticEmitter, Severity, Subject};

/// Process outcome of a command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitCode {
    Success = 0,
    Failure = 1,
}

impl ExitCode {
    /// `errors` counts findings after `--strict` escalation
    pub fn from_error_count(errors: usize) -> Self {
        if errors == 0 {
            ExitCode::Success
        } else {
            ExitCode::Failure
        }
    }
}

impl From<ExitCode> for process::ExitCode {
    fn from(code: ExitCode) -> Self {
        process::ExitCode::from(code as u8)
    }
}

/// How findings are escalated, filtered and located
#[derive(Debug, Clone, Default)]
pub struct DiagnosticConfig {
    pub strict: bool,
    pub quiet: bool,
    /// Snapshot paths are shown relative to this directory when below it
    pub base_path: Option<PathBuf>,
}

impl DiagnosticConfig {
    fn effective_severity(&self, severity: Severity) -> Severity {
        match (self.strict, severity) {
            (true, Severity::Warning) => Severity::Error,
            (true, Severity::Hint) => Severity::Warning,
            (_, severity) => severity,
        }
    }

    /// Severity to report a finding with, or `None` when it is hidden
    fn resolve(&self, diagnostic: &Diagnostic) -> Option<Severity> {
        let severity = self.effective_severity(diagnostic.severity);
        (!self.quiet || severity == Severity::Error).then_some(severity)
    }

    fn display_path(&self, path: &Path) -> String {
        self.base_path
            .as_deref()
            .and_then(|base| path.strip_prefix(base).ok())
            .unwrap_or(path)
            .display()
            .to_string()
    }
}

// ============================================================================
// Terminal
// ============================================================================

/// Writes findings as `warning[W001]: ...` blocks
pub struct TerminalEmitter<W: Write> {
    writer: W,
    config: DiagnosticConfig,
    snapshot: Option<String>,
    error_count: usize,
}

impl<W: Write> TerminalEmitter<W> {
    pub fn new(writer: W, config: DiagnosticConfig) -> Self {
        Self {
            writer,
            config,
            snapshot: None,
            error_count: 0,
        }
    }

    /// Quote snapshot the findings were raised for
    pub fn with_source(mut self, path: impl AsRef<Path>) -> Self {
        self.snapshot = Some(self.config.display_path(path.as_ref()));
        self
    }

    pub fn exit_code(&self) -> ExitCode {
        ExitCode::from_error_count(self.error_count)
    }

    fn write_diagnostic(&mut self, severity: Severity, diagnostic: &Diagnostic) -> std::io::Result<()> {
        writeln!(
            self.writer,
            "{severity}[{}]: {}",
            diagnostic.code, diagnostic.message
        )?;

        let location = match (&self.snapshot, &diagnostic.subject) {
            (Some(file), Some(subject)) => Some(format!("{file} ({subject})")),
            (Some(file), None) => Some(file.clone()),
            (None, Some(subject)) => Some(subject.to_string()),
            (None, None) => None,
        };
        if let Some(location) = location {
            writeln!(self.writer, "  --> {location}")?;
        }

        for note in &diagnostic.notes {
            writeln!(self.writer, "   = {note}")?;
        }
        if diagnostic.code.degrades_cost() {
            writeln!(self.writer, "   = costs marked * are incomplete")?;
        }
        for hint in &diagnostic.hints {
            writeln!(self.writer, "   = hint: {hint}")?;
        }
        writeln!(self.writer)
    }
}

impl<W: Write> DiagnosticEmitter for TerminalEmitter<W> {
    fn emit(&mut self, diagnostic: Diagnostic) {
        let Some(severity) = self.config.resolve(&diagnostic) else {
            return;
        };
        if severity == Severity::Error {
            self.error_count += 1;
        }
        // stderr may be closed
        let _ = self.write_diagnostic(severity, &diagnostic);
    }
}

// ============================================================================
// JSON
// ============================================================================

#[derive(Debug, Serialize)]
struct JsonDiagnostic {
    code: &'static str,
    severity: Severity,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    file: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    subject: Option<Subject>,
    cost_incomplete: bool,
    notes: Vec<String>,
    hints: Vec<String>,
}

/// Gathers findings for the `diagnostics` array of a JSON report
pub struct JsonEmitter {
    config: DiagnosticConfig,
    snapshot: Option<String>,
    diagnostics: Vec<JsonDiagnostic>,
    error_count: usize,
}

impl JsonEmitter {
    pub fn new(config: DiagnosticConfig) -> Self {
        Self {
            config,
            snapshot: None,
            diagnostics: Vec::new(),
            error_count: 0,
        }
    }

    pub fn with_source(mut self, path: impl AsRef<Path>) -> Self {
        self.snapshot = Some(self.config.display_path(path.as_ref()));
        self
    }

    pub fn exit_code(&self) -> ExitCode {
        ExitCode::from_error_count(self.error_count)
    }

    pub fn to_json_value(&self) -> serde_json::Value {
        serde_json::to_value(&self.diagnostics).unwrap_or(serde_json::Value::Null)
    }
}

impl DiagnosticEmitter for JsonEmitter {
    fn emit(&mut self, diagnostic: Diagnostic) {
        let Some(severity) = self.config.resolve(&diagnostic) else {
            return;
        };
        if severity == Severity::Error {
            self.error_count += 1;
        }
        self.diagnostics.push(JsonDiagnostic {
            code: diagnostic.code.as_str(),
            severity,
            message: diagnostic.message,
            file: self.snapshot.clone(),
            subject: diagnostic.subject,
            cost_incomplete: diagnostic.code.degrades_cost(),
            notes: diagnostic.notes,
            hints: diagnostic.hints,
        });
    }
}
