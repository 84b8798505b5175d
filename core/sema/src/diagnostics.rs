//! Diagnostic log: severities, error codes, and the fixed-width rendering
//! format passes emit when they report a problem.
//!
//! Rendered form: `<SEV>:: (<line>,<col>): [E<code>] <text>`, where `SEV` is
//! right-aligned to width 5, `line`/`col` are right-aligned to width 3, the
//! location clause is dropped entirely when both are `<= 0` (a synthetic
//! location), and the `[E<code>]` clause is dropped when `code` is `0`
//! (a message with no assigned code).

use std::cell::RefCell;
use std::fmt;

use scriptlang_ast::Location;

#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Debug, Hash)]
pub enum Severity {
    Debug,
    Info,
    Warning,
    Error,
    /// Anything a caller wants to log that doesn't fit the four fixed
    /// severities — carries no ordering guarantee relative to the others
    /// beyond what `derive(Ord)` gives it here, so don't rely on where it
    /// sorts.
    Other,
}

impl Severity {
    #[must_use]
    fn label(self) -> &'static str {
        match self {
            Severity::Debug => "DEBUG",
            Severity::Info => "INFO",
            Severity::Warning => "WARN",
            Severity::Error => "ERROR",
            Severity::Other => "NOTE",
        }
    }
}

#[derive(Clone, Debug)]
pub struct Diagnostic {
    pub severity: Severity,
    pub code: u32,
    pub location: Location,
    pub message: String,
}

impl Diagnostic {
    #[must_use]
    pub fn new(severity: Severity, code: u32, location: Location, message: impl Into<String>) -> Self {
        Self { severity, code, location, message: message.into() }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:>5}::", self.severity.label())?;
        if self.location.first_line > 0 || self.location.first_column > 0 {
            write!(f, " ({:>3},{:>3}):", self.location.first_line, self.location.first_column)?;
        }
        if self.code != 0 {
            write!(f, " [E{}]", self.code)?;
        }
        write!(f, " {}", self.message)
    }
}

/// An `(line, code)` pair used by the test-assertion protocol: a diagnostic
/// matching an expectation is suppressed from [`DiagnosticLog::unexpected`]
/// rather than reported as a surprise.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash)]
pub struct Expectation {
    pub line: i32,
    pub code: u32,
}

/// Accumulates diagnostics over the course of a pass run.
///
/// Passes take `&DiagnosticLog` (not `&mut`) because they're handed out
/// alongside a shared, immutably-borrowed [`scriptlang_ast::Arena`] walk —
/// the log's interior mutability is what lets a `Visitor::enter` push a
/// diagnostic without also needing `&mut self` on the visitor.
#[derive(Debug, Default)]
pub struct DiagnosticLog {
    entries: RefCell<Vec<Diagnostic>>,
}

impl DiagnosticLog {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, diagnostic: Diagnostic) {
        self.entries.borrow_mut().push(diagnostic);
    }

    pub fn error(&self, code: u32, location: Location, message: impl Into<String>) {
        self.push(Diagnostic::new(Severity::Error, code, location, message));
    }

    pub fn warning(&self, code: u32, location: Location, message: impl Into<String>) {
        self.push(Diagnostic::new(Severity::Warning, code, location, message));
    }

    #[must_use]
    pub fn has_errors(&self) -> bool {
        self.entries.borrow().iter().any(|d| d.severity == Severity::Error)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.borrow().is_empty()
    }

    #[must_use]
    pub fn into_entries(self) -> Vec<Diagnostic> {
        self.entries.into_inner()
    }

    #[must_use]
    pub fn entries(&self) -> std::cell::Ref<'_, Vec<Diagnostic>> {
        self.entries.borrow()
    }

    /// Sorts entries by `(severity, line, column)`, most severe first. Used
    /// only for presentation — the order diagnostics were pushed in is the
    /// order passes ran, which matters for `unexpected`'s stability but not
    /// for a human-facing report.
    pub fn sort_for_report(&self) {
        self.entries.borrow_mut().sort_by(|a, b| {
            b.severity
                .cmp(&a.severity)
                .then_with(|| a.location.first_line.cmp(&b.location.first_line))
                .then_with(|| a.location.first_column.cmp(&b.location.first_column))
        });
    }

    /// Returns the diagnostics that don't match any `(line, code)` pair in
    /// `expected`. Each expectation is consumed by at most one diagnostic, so
    /// duplicate expectations require duplicate matching diagnostics.
    #[must_use]
    pub fn unexpected(&self, expected: &[Expectation]) -> Vec<Diagnostic> {
        let mut remaining: Vec<Expectation> = expected.to_vec();
        let mut surprises = Vec::new();
        for diagnostic in self.entries.borrow().iter() {
            let candidate = Expectation { line: diagnostic.location.first_line, code: diagnostic.code };
            if let Some(pos) = remaining.iter().position(|e| *e == candidate) {
                remaining.remove(pos);
            } else {
                surprises.push(diagnostic.clone());
            }
        }
        surprises
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_full_format() {
        let d = Diagnostic::new(Severity::Error, 10001, Location::new(4, 2, 4, 10), "oops");
        assert_eq!(d.to_string(), "ERROR:: (  4,  2): [E10001] oops");
    }

    #[test]
    fn omits_location_when_synthetic() {
        let d = Diagnostic::new(Severity::Warning, 0, Location::synthetic(), "hmm");
        assert_eq!(d.to_string(), " WARN:: hmm");
    }

    #[test]
    fn omits_code_when_zero() {
        let d = Diagnostic::new(Severity::Info, 0, Location::new(1, 1, 1, 1), "fyi");
        assert_eq!(d.to_string(), " INFO:: (  1,  1): fyi");
    }

    #[test]
    fn unexpected_filters_matched_pairs() {
        let log = DiagnosticLog::new();
        log.error(10001, Location::new(4, 2, 4, 2), "Duplicate declaration of `x'");
        log.error(10002, Location::new(9, 1, 9, 1), "Something else");

        let surprises = log.unexpected(&[Expectation { line: 4, code: 10001 }]);
        assert_eq!(surprises.len(), 1);
        assert_eq!(surprises[0].code, 10002);
    }
}
