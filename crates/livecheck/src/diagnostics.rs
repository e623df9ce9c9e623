//! Diagnostics data model.
//!
//! The checker publishes the complete set of diagnostics across every open file on each
//! emission. A [`DiagnosticBatch`] is one such snapshot, shared between subscribers.

use std::fmt;
use std::sync::Arc;

/// Diagnostic severity levels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Severity {
    /// Informational output (e.g. `#check` results).
    Information,
    /// Warnings.
    Warning,
    /// Errors.
    Error,
}

impl Severity {
    /// The checker's name for this severity.
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Information => "information",
            Severity::Warning => "warning",
            Severity::Error => "error",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A positioned, severity-tagged message about some file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    /// File path the message belongs to.
    pub file: String,
    /// Line (1-based).
    pub line: u32,
    /// Column (0-based, as the checker reports it).
    pub column: u32,
    /// Severity.
    pub severity: Severity,
    /// Short caption (may be empty).
    pub caption: String,
    /// Pre-formatted body text.
    pub text: String,
}

impl Diagnostic {
    /// `line:column: severity: caption`
    pub fn header(&self) -> String {
        format!(
            "{}:{}: {}: {}",
            self.line, self.column, self.severity, self.caption
        )
    }
}

/// One complete diagnostics snapshot.
pub type DiagnosticBatch = Arc<[Diagnostic]>;

/// Keep the diagnostics of `batch` whose file is exactly `file`, in batch order.
pub fn diagnostics_for_file(batch: &[Diagnostic], file: &str) -> Vec<Diagnostic> {
    batch.iter().filter(|d| d.file == file).cloned().collect()
}
