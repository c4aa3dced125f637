//! Grammar diagnostics.
//!
//! Every failure of the generator pipeline (meta-parse, analysis, code emission) is a
//! [`GrammarError`]: a kind, a message, and the byte span in the grammar file it points at.
//! Generation aborts on the first error; there is no recovery.

use std::fmt;

use miette::{Diagnostic, NamedSource, SourceSpan};
use thiserror::Error;

use crate::grammar::Span;

/// Category of a grammar error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GrammarErrorKind {
    /// Malformed meta-language input.
    Syntax,
    DuplicateRule,
    UndefinedName,
    MissingStart,
    MissingType,
    /// A left-recursive cycle with no rule common to all of its cycles.
    NoLeader,
    /// A cut (`~`) placed before anything was consumed.
    CutPlacement,
    /// A repetition whose element can match the empty input.
    NullableRepeat,
    /// A string literal that is neither an identifier nor a known operator.
    UnknownLiteral,
    /// An action or type annotation that is not a valid Rust token sequence.
    HostCode,
    /// The emitted Rust failed to re-parse.
    Emit,
}

impl fmt::Display for GrammarErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            GrammarErrorKind::Syntax => "syntax error",
            GrammarErrorKind::DuplicateRule => "duplicate rule",
            GrammarErrorKind::UndefinedName => "undefined name",
            GrammarErrorKind::MissingStart => "missing start rule",
            GrammarErrorKind::MissingType => "missing type annotation",
            GrammarErrorKind::NoLeader => "unsupported left recursion",
            GrammarErrorKind::CutPlacement => "misplaced cut",
            GrammarErrorKind::NullableRepeat => "nullable repetition",
            GrammarErrorKind::UnknownLiteral => "unknown literal",
            GrammarErrorKind::HostCode => "invalid host code",
            GrammarErrorKind::Emit => "emission failure",
        };
        f.write_str(s)
    }
}

/// A grammar diagnostic with an optional labelled location.
#[derive(Debug, Error, Diagnostic)]
#[error("{kind}: {message}")]
#[diagnostic(code(serpent::grammar))]
pub struct GrammarError {
    pub kind: GrammarErrorKind,
    pub message: String,
    #[label("here")]
    pub span: Option<SourceSpan>,
    #[source_code]
    pub source_code: NamedSource<String>,
    #[help]
    pub help: Option<String>,
}

impl GrammarError {
    pub fn new(kind: GrammarErrorKind, message: impl Into<String>, span: Option<Span>) -> Self {
        Self {
            kind,
            message: message.into(),
            span: span.map(|s| SourceSpan::from((s.start, s.end.saturating_sub(s.start)))),
            source_code: NamedSource::new("<grammar>", String::new()),
            help: None,
        }
    }

    pub fn syntax(message: impl Into<String>, span: Span) -> Self {
        Self::new(GrammarErrorKind::Syntax, message, Some(span))
    }

    pub fn with_help(mut self, help: impl Into<String>) -> Self {
        self.help = Some(help.into());
        self
    }

    /// Attach the grammar text so the diagnostic renders with a snippet.
    pub fn with_source(mut self, name: &str, source: &str) -> Self {
        self.source_code = NamedSource::new(name, source.to_string());
        self
    }

    /// `(line, column)` of the error start within `source`, both 1-based.
    pub fn line_col(&self, source: &str) -> Option<(usize, usize)> {
        let offset = self.span?.offset().min(source.len());
        let before = source.get(..offset)?;
        let line = before.matches('\n').count() + 1;
        let col = offset - before.rfind('\n').map(|i| i + 1).unwrap_or(0) + 1;
        Some((line, col))
    }
}

pub type GrammarResult<T> = Result<T, GrammarError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_col_is_one_based() {
        let src = "start[()]: a\nb: 'x'\n";
        let err = GrammarError::syntax("boom", Span::new(13, 14));
        assert_eq!(err.line_col(src), Some((2, 1)));
    }

    #[test]
    fn test_display_includes_kind() {
        let err = GrammarError::new(GrammarErrorKind::UndefinedName, "rule 'x' is not defined", None);
        assert_eq!(err.to_string(), "undefined name: rule 'x' is not defined");
    }
}
