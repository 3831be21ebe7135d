//! Diagnostic types and sinks.
//!
//! Errors in this pipeline are first-class data (spec §7), not exceptions or
//! `Result::Err` returns: parsing, binding, and resolving all push
//! `Diagnostic` values into a sink and keep going.

use crate::span::Span;

/// Diagnostic severity, per spec §6.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum DiagnosticLevel {
    Hint,
    Info,
    Warning,
    Error,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Suggestion {
    pub message: String,
    pub replacement: Option<String>,
    pub span: Span,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Diagnostic {
    pub level: DiagnosticLevel,
    pub message: String,
    pub span: Span,
    pub suggestions: Vec<Suggestion>,
}

impl Diagnostic {
    #[must_use]
    pub fn new(level: DiagnosticLevel, message: impl Into<String>, span: Span) -> Self {
        Self { level, message: message.into(), span, suggestions: Vec::new() }
    }

    #[must_use]
    pub fn error(message: impl Into<String>, span: Span) -> Self {
        Self::new(DiagnosticLevel::Error, message, span)
    }

    #[must_use]
    pub fn warning(message: impl Into<String>, span: Span) -> Self {
        Self::new(DiagnosticLevel::Warning, message, span)
    }

    #[must_use]
    pub fn with_suggestion(mut self, message: impl Into<String>, span: Span) -> Self {
        self.suggestions.push(Suggestion { message: message.into(), replacement: None, span });
        self
    }

    #[must_use]
    pub fn with_replacement(mut self, message: impl Into<String>, span: Span, replacement: impl Into<String>) -> Self {
        self.suggestions.push(Suggestion {
            message: message.into(),
            replacement: Some(replacement.into()),
            span,
        });
        self
    }
}

/// Replace `{0}`, `{1}`, ... placeholders in a diagnostic message template.
#[must_use]
pub fn format_message(template: &str, args: &[&str]) -> String {
    let mut result = template.to_string();
    for (i, arg) in args.iter().enumerate() {
        result = result.replace(&format!("{{{i}}}"), arg);
    }
    result
}

/// Receives diagnostics as they are produced, decoupling production from
/// presentation (grounded in `ParserDiagnosticSink` from the original
/// Bryo/Mycelium parser).
pub trait DiagnosticSink {
    fn report(&mut self, diagnostic: Diagnostic);

    fn error(&mut self, message: impl Into<String>, span: Span) {
        self.report(Diagnostic::error(message, span));
    }

    fn warning(&mut self, message: impl Into<String>, span: Span) {
        self.report(Diagnostic::warning(message, span));
    }
}

/// A `Vec`-backed sink: the default for tests and for embedding this crate
/// without committing to any particular presentation layer.
#[derive(Debug, Default, Clone)]
pub struct CollectingSink {
    diagnostics: Vec<Diagnostic>,
}

impl CollectingSink {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    #[must_use]
    pub fn into_diagnostics(self) -> Vec<Diagnostic> {
        self.diagnostics
    }

    #[must_use]
    pub fn has_errors(&self) -> bool {
        self.diagnostics.iter().any(|d| d.level == DiagnosticLevel::Error)
    }

    #[must_use]
    pub fn error_count(&self) -> usize {
        self.diagnostics.iter().filter(|d| d.level == DiagnosticLevel::Error).count()
    }
}

impl DiagnosticSink for CollectingSink {
    fn report(&mut self, diagnostic: Diagnostic) {
        self.diagnostics.push(diagnostic);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_message_substitutes_placeholders() {
        let msg = format_message("cannot unify '{0}' with '{1}'", &["i32", "string"]);
        assert_eq!(msg, "cannot unify 'i32' with 'string'");
    }

    #[test]
    fn collecting_sink_tracks_errors() {
        let mut sink = CollectingSink::new();
        sink.warning("careful", Span::at(0));
        assert!(!sink.has_errors());
        sink.error("boom", Span::at(1));
        assert!(sink.has_errors());
        assert_eq!(sink.error_count(), 1);
        assert_eq!(sink.diagnostics().len(), 2);
    }
}
