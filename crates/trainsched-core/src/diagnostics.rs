//! Data-quality diagnostics
//!
//! Bad input rows never abort a computation. Each stage records what it skipped
//! or degraded as a [`Diagnostic`] and returns the list next to its result, so
//! a quote with one broken row still schedules every good one.
//!
//! | Code | Condition |
//! |------|-----------|
//! | W001 | hours missing, zero or negative |
//! | W002 | row without a resource id |
//! | W003 | resource unknown to the catalog |
//! | W004 | row names both a machine and a software item, or neither |
//! | W005 | item unknown to the catalog |
//! | W006 | quote has no area selected, trip cost is 0 |
//! | W007 | selected area has no rate row, trip cost is 0 |
//! | W008 | segment lands past the synthetic horizon |
//! | W009 | negative rate, treated as 0 and flagged incomplete |
//! | W010 | segment resource has no rate row, training cost is 0 |
//! | W011 | hours exceed a full synthetic year, row dropped |
//! | I001 | plan scheduled |

use serde::{Deserialize, Serialize};

use crate::{AreaId, ItemRef, PlanId, ResourceId};

/// Diagnostic severity
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
    Hint,
    Info,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Error => "error",
            Severity::Warning => "warning",
            Severity::Hint => "hint",
            Severity::Info => "info",
        }
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Stable diagnostic codes
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DiagnosticCode {
    W001NonPositiveHours,
    W002MissingResource,
    W003UnknownResource,
    W004AmbiguousItem,
    W005UnknownItem,
    W006NoAreaSelected,
    W007UnknownArea,
    W008BeyondHorizon,
    W009NegativeRate,
    W010MissingHourlyRate,
    W011ExcessiveHours,
    I001PlanScheduled,
}

impl DiagnosticCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            DiagnosticCode::W001NonPositiveHours => "W001",
            DiagnosticCode::W002MissingResource => "W002",
            DiagnosticCode::W003UnknownResource => "W003",
            DiagnosticCode::W004AmbiguousItem => "W004",
            DiagnosticCode::W005UnknownItem => "W005",
            DiagnosticCode::W006NoAreaSelected => "W006",
            DiagnosticCode::W007UnknownArea => "W007",
            DiagnosticCode::W008BeyondHorizon => "W008",
            DiagnosticCode::W009NegativeRate => "W009",
            DiagnosticCode::W010MissingHourlyRate => "W010",
            DiagnosticCode::W011ExcessiveHours => "W011",
            DiagnosticCode::I001PlanScheduled => "I001",
        }
    }

    pub fn default_severity(&self) -> Severity {
        match self {
            DiagnosticCode::I001PlanScheduled => Severity::Info,
            _ => Severity::Warning,
        }
    }

    /// Codes that mark a cost figure as incomplete
    pub fn degrades_cost(&self) -> bool {
        matches!(
            self,
            DiagnosticCode::W006NoAreaSelected
                | DiagnosticCode::W007UnknownArea
                | DiagnosticCode::W009NegativeRate
                | DiagnosticCode::W010MissingHourlyRate
        )
    }
}

impl std::fmt::Display for DiagnosticCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// What a diagnostic is about
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Subject {
    /// A raw requirement row, by position in its plan
    Row { plan_id: PlanId, row: usize },
    /// A normalized requirement, by index in the scheduler input
    Requirement { index: usize },
    Resource { id: ResourceId },
    Item { item: ItemRef },
    Area { id: Option<AreaId> },
    Plan { id: PlanId },
}

impl std::fmt::Display for Subject {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Subject::Row { plan_id, row } => write!(f, "plan {plan_id}, row {row}"),
            Subject::Requirement { index } => write!(f, "requirement {index}"),
            Subject::Resource { id } => write!(f, "resource {id}"),
            Subject::Item { item } => write!(f, "{item}"),
            Subject::Area { id: Some(id) } => write!(f, "area {id}"),
            Subject::Area { id: None } => write!(f, "no area"),
            Subject::Plan { id } => write!(f, "plan {id}"),
        }
    }
}

/// A data-quality finding
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub code: DiagnosticCode,
    pub severity: Severity,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subject: Option<Subject>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub notes: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub hints: Vec<String>,
}

impl Diagnostic {
    /// Create a diagnostic with the code's default severity
    pub fn new(code: DiagnosticCode, message: impl Into<String>) -> Self {
        Self {
            code,
            severity: code.default_severity(),
            message: message.into(),
            subject: None,
            notes: Vec::new(),
            hints: Vec::new(),
        }
    }

    /// Override the code's default severity
    pub fn with_severity(mut self, severity: Severity) -> Self {
        self.severity = severity;
        self
    }

    pub fn with_subject(mut self, subject: Subject) -> Self {
        self.subject = Some(subject);
        self
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.notes.push(note.into());
        self
    }

    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hints.push(hint.into());
        self
    }
}

/// Sink for diagnostics
pub trait DiagnosticEmitter {
    fn emit(&mut self, diagnostic: Diagnostic);

    fn emit_all(&mut self, diagnostics: impl IntoIterator<Item = Diagnostic>)
    where
        Self: Sized,
    {
        for diagnostic in diagnostics {
            self.emit(diagnostic);
        }
    }
}
