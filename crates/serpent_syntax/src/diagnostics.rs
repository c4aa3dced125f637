//! User-facing parse errors.
//!
//! The runtime and the tokenizer report [`RuntimeError`]s: a kind, a message and a token range.
//! [`SyntaxError`] adds what a caller needs to show the error: the offending source line, the
//! file name, the expected-token set for generic failures, and a `miette` snippet.
//!
//! [`SyntaxError::render`] prints the CPython traceback tail:
//!
//! ```text
//!   File "<unknown>", line 1
//!     x = (1,
//!         ^
//! SyntaxError: '(' was never closed
//! ```

use std::fmt::Write as _;

use miette::{Diagnostic, NamedSource, SourceSpan};
use serpent_core::{ErrorKind, Expected, Position, RuntimeError};
use thiserror::Error;

/// Default file name used when the caller does not provide one.
pub const DEFAULT_FILENAME: &str = "<unknown>";

/// A parse failure, positioned in the source it came from.
#[derive(Debug, Error, Diagnostic)]
#[error("{message} ({filename}, line {})", .start.line)]
#[diagnostic(code(serpent::syntax))]
pub struct SyntaxError {
    pub kind: ErrorKind,
    pub message: String,
    pub start: Position,
    pub end: Position,
    /// The source line the error starts on, without its line break.
    pub text: Option<String>,
    pub filename: String,
    /// Token-level expectations at the furthest failure, for generic `invalid syntax` errors.
    pub expected: Vec<Expected>,
    #[help]
    pub hint: Option<String>,
    #[label("here")]
    pub label: Option<SourceSpan>,
    #[source_code]
    pub source_code: NamedSource<String>,
}

impl SyntaxError {
    pub fn from_runtime(err: RuntimeError) -> Self {
        Self {
            kind: err.kind,
            message: err.message,
            start: err.start,
            end: err.end,
            text: None,
            filename: DEFAULT_FILENAME.to_string(),
            expected: Vec::new(),
            hint: None,
            label: None,
            source_code: NamedSource::new(DEFAULT_FILENAME, String::new()),
        }
    }

    /// Set the reported file name. Call before [`SyntaxError::with_source`].
    pub fn with_filename(mut self, filename: impl Into<String>) -> Self {
        self.filename = filename.into();
        self
    }

    /// Record the expected-token set and turn it into a hint.
    pub fn with_expected(mut self, expected: &[Expected]) -> Self {
        let mut expected = expected.to_vec();
        expected.sort();
        expected.dedup();
        if !expected.is_empty() {
            let list: Vec<String> = expected.iter().map(ToString::to_string).collect();
            self.hint = Some(format!("expected one of: {}", list.join(", ")));
        }
        self.expected = expected;
        self
    }

    /// Attach the full source: fills in the error line and the labelled snippet.
    pub fn with_source(mut self, source: &str) -> Self {
        self.text = source_line(source, self.start.line).map(str::to_string);
        let offset = self.start.offset.min(source.len());
        let len = self.end.offset.saturating_sub(self.start.offset).min(source.len() - offset);
        self.label = Some(SourceSpan::from((offset, len)));
        self.source_code = NamedSource::new(self.filename.clone(), source.to_string());
        self
    }

    /// Python exception class this error corresponds to.
    pub fn exception_name(&self) -> &'static str {
        self.kind.exception_name()
    }

    /// 1-based column of the error start, as Python reports it.
    pub fn column(&self) -> u32 {
        self.start.col + 1
    }

    /// Render the error the way the Python interpreter prints it.
    pub fn render(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "  File \"{}\", line {}", self.filename, self.start.line);
        if let Some(text) = &self.text {
            let trimmed = text.trim_start();
            let indent = text.len() - trimmed.len();
            let trimmed = trimmed.trim_end();
            if !trimmed.is_empty() {
                let _ = writeln!(out, "    {trimmed}");
                let col = (self.start.col as usize).saturating_sub(indent).min(trimmed.len());
                let width = if self.end.line == self.start.line && self.end.col > self.start.col {
                    ((self.end.col - self.start.col) as usize).min(trimmed.len().saturating_sub(col).max(1))
                } else {
                    1
                };
                let pad: String = trimmed[..floor_char_boundary(trimmed, col)]
                    .chars()
                    .map(|c| if c == '\t' { '\t' } else { ' ' })
                    .collect();
                let _ = writeln!(out, "    {pad}{}", "^".repeat(width.max(1)));
            }
        }
        let _ = write!(out, "{}: {}", self.exception_name(), self.message);
        out
    }
}

impl From<RuntimeError> for SyntaxError {
    fn from(err: RuntimeError) -> Self {
        Self::from_runtime(err)
    }
}

/// The text of 1-based line `line`, without its terminator.
pub fn source_line(source: &str, line: u32) -> Option<&str> {
    let index = (line as usize).checked_sub(1)?;
    let raw = source.split_inclusive('\n').nth(index)?;
    Some(raw.trim_end_matches(['\n', '\r']))
}

fn floor_char_boundary(s: &str, mut index: usize) -> usize {
    while index > 0 && !s.is_char_boundary(index) {
        index -= 1;
    }
    index
}
