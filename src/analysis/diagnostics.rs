//! Diagnostic reporting

use crate::memory::Pointer;
use std::fmt;
use std::sync::{Mutex, PoisonError};

/// Anything that accepts reports of problems found during analysis.
///
/// Reporting never fails and never stops a scan by itself. Sinks are shared
/// between scan workers, so they must be `Sync`.
pub trait Diagnostics: Send + Sync {
    fn warn(&self, at: Pointer, message: &str);
    fn error(&self, at: Pointer, message: &str);
}

/// Forwards diagnostics to the `log` facade.
#[derive(Copy, Clone, Debug, Default)]
pub struct LogDiagnostics;

impl Diagnostics for LogDiagnostics {
    fn warn(&self, at: Pointer, message: &str) {
        warn!("{}: {}", at, message);
    }

    fn error(&self, at: Pointer, message: &str) {
        error!("{}: {}", at, message);
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Severity {
    Warning,
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Warning => write!(f, "warning"),
            Severity::Error => write!(f, "error"),
        }
    }
}

/// A single reported problem.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Diagnostic {
    pub at: Pointer,
    pub severity: Severity,
    pub message: String,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} at {}: {}", self.severity, self.at, self.message)
    }
}

/// Collects every diagnostic reported to it, in order, and also forwards
/// them to the `log` facade.
#[derive(Debug, Default)]
pub struct DiagnosticLog {
    entries: Mutex<Vec<Diagnostic>>,
}

impl DiagnosticLog {
    pub fn new() -> Self {
        DiagnosticLog::default()
    }

    fn push(&self, at: Pointer, severity: Severity, message: &str) {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(Diagnostic {
                at,
                severity,
                message: message.to_string(),
            });
    }

    pub fn entries(&self) -> Vec<Diagnostic> {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn filtered(&self, severity: Severity) -> Vec<Diagnostic> {
        self.entries()
            .into_iter()
            .filter(|d| d.severity == severity)
            .collect()
    }

    pub fn warnings(&self) -> Vec<Diagnostic> {
        self.filtered(Severity::Warning)
    }

    pub fn errors(&self) -> Vec<Diagnostic> {
        self.filtered(Severity::Error)
    }
}

impl Diagnostics for DiagnosticLog {
    fn warn(&self, at: Pointer, message: &str) {
        LogDiagnostics.warn(at, message);
        self.push(at, Severity::Warning, message);
    }

    fn error(&self, at: Pointer, message: &str) {
        LogDiagnostics.error(at, message);
        self.push(at, Severity::Error, message);
    }
}
