//! Parse diagnostics with colored terminal output.
//!
//! Malformed markup never fails a parse. Every place where the tokenizer or
//! tree builder has to guess is recorded as a [`Diagnostic`] instead, so the
//! caller can decide whether to look at them. A [`Diagnostics`] collector
//! belongs to a single parse pass and deduplicates repeated messages.

use std::collections::HashSet;
use std::fmt;

use owo_colors::OwoColorize;

/// How serious a diagnostic is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Severity {
    /// Recovered silently; the output is what a browser would produce.
    Warning,
    /// Recovered heuristically; the output may not match the author's intent.
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Warning => f.write_str("warning"),
            Self::Error => f.write_str("error"),
        }
    }
}

/// A single recoverable issue found while parsing.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Diagnostic {
    /// Whether this was a warning or an error.
    pub severity: Severity,
    /// Human readable description.
    pub message: String,
    /// Byte offset into the decoded input where the issue was noticed.
    pub offset: usize,
}

impl Diagnostic {
    /// Create a warning at `offset`.
    #[must_use]
    pub fn warning(message: impl Into<String>, offset: usize) -> Self {
        Self {
            severity: Severity::Warning,
            message: message.into(),
            offset,
        }
    }

    /// Create an error at `offset`.
    #[must_use]
    pub fn error(message: impl Into<String>, offset: usize) -> Self {
        Self {
            severity: Severity::Error,
            message: message.into(),
            offset,
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} at byte {}: {}", self.severity, self.offset, self.message)
    }
}

/// Collector for the diagnostics of one parse pass.
///
/// The same message at the same offset is only kept once. When created
/// with [`Diagnostics::suppressed`], everything pushed is dropped.
#[derive(Debug, Default)]
pub struct Diagnostics {
    seen: HashSet<(Severity, String, usize)>,
    items: Vec<Diagnostic>,
    suppressed: bool,
}

impl Diagnostics {
    /// A collector that keeps what it is given.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A collector that discards everything.
    #[must_use]
    pub fn suppressed() -> Self {
        Self {
            suppressed: true,
            ..Self::default()
        }
    }

    /// Record a diagnostic unless suppressed or already recorded.
    pub fn push(&mut self, diagnostic: Diagnostic) {
        if self.suppressed {
            return;
        }
        let key = (
            diagnostic.severity,
            diagnostic.message.clone(),
            diagnostic.offset,
        );
        if self.seen.insert(key) {
            self.items.push(diagnostic);
        }
    }

    /// Record a warning.
    pub fn warn(&mut self, message: impl Into<String>, offset: usize) {
        self.push(Diagnostic::warning(message, offset));
    }

    /// Record an error.
    pub fn error(&mut self, message: impl Into<String>, offset: usize) {
        self.push(Diagnostic::error(message, offset));
    }

    /// Move every diagnostic out of `other` into this collector.
    pub fn absorb(&mut self, other: Vec<Diagnostic>) {
        for diagnostic in other {
            self.push(diagnostic);
        }
    }

    /// Number of recorded diagnostics.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// True if nothing was recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Consume the collector, returning diagnostics in the order they were found.
    #[must_use]
    pub fn into_vec(self) -> Vec<Diagnostic> {
        self.items
    }
}

/// Print a diagnostic to stderr: yellow for warnings, red for errors.
pub fn report(component: &str, diagnostic: &Diagnostic) {
    let line = format!("[tagwalk {component}] {diagnostic}");
    match diagnostic.severity {
        Severity::Warning => eprintln!("{}", line.yellow()),
        Severity::Error => eprintln!("{}", line.red()),
    }
}
