//! Diagnostic accumulation.
//!
//! Every phase reports problems through a [`Handler`] instead of
//! returning on the first error: the lexer keeps scanning past an illegal
//! character, and the driver only needs to know, at the end of a phase,
//! whether anything was reported (`has_errors`) to decide whether to
//! continue to the next pipeline stage.

use crate::Span;
use std::fmt;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Level {
    Error,
    Warning,
}

#[derive(Clone, Debug)]
pub struct Diagnostic {
    pub level: Level,
    pub message: String,
    pub span: Span,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tag = match self.level {
            Level::Error => "error",
            Level::Warning => "warning",
        };
        if self.span == Span::DUMMY {
            write!(f, "{}: {}", tag, self.message)
        } else {
            write!(f, "{}: {} (line {})", tag, self.message, self.span)
        }
    }
}

/// Collects diagnostics emitted over the lifetime of a compilation.
#[derive(Default)]
pub struct Handler {
    diagnostics: Vec<Diagnostic>,
}

impl Handler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn error(&mut self, message: impl Into<String>, span: Span) {
        self.diagnostics.push(Diagnostic { level: Level::Error, message: message.into(), span });
    }

    pub fn warn(&mut self, message: impl Into<String>, span: Span) {
        self.diagnostics.push(Diagnostic { level: Level::Warning, message: message.into(), span });
    }

    pub fn has_errors(&self) -> bool {
        self.diagnostics.iter().any(|d| d.level == Level::Error)
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    /// Prints every accumulated diagnostic to stderr, in emission order.
    pub fn emit_to_stderr(&self) {
        for diag in &self.diagnostics {
            eprintln!("{diag}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn has_errors_is_false_until_an_error_is_recorded() {
        let mut handler = Handler::new();
        assert!(!handler.has_errors());
        handler.warn("unused thing", Span::new(3));
        assert!(!handler.has_errors());
        handler.error("boom", Span::new(3));
        assert!(handler.has_errors());
    }

    #[test]
    fn display_includes_the_line_number() {
        let diag = Diagnostic { level: Level::Error, message: "oops".into(), span: Span::new(5) };
        assert_eq!(format!("{diag}"), "error: oops (line 5)");
    }
}
