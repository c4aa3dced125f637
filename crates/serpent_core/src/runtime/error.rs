use std::fmt;

use thiserror::Error;

use crate::tokens::{OpKind, Position, TokenKind};

/// Kind of a parse failure surfaced to the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// The token source could not produce the next token.
    Lexical,
    /// No alternative of the start rule consumed the whole stream.
    UnexpectedToken,
    /// An action-level or forced-token check rejected otherwise well-formed input.
    InvalidSyntaxInContext,
    /// Malformed indentation (unexpected indent/unindent, inconsistent dedent).
    Indentation,
    /// Rule nesting exceeded the configured depth.
    TooDeeplyNested,
    /// Memo corruption, non-monotonic token indices or other contract violations.
    InternalInvariant,
}

impl ErrorKind {
    /// Python exception class name used when rendering.
    pub fn exception_name(self) -> &'static str {
        match self {
            ErrorKind::Indentation => "IndentationError",
            ErrorKind::InternalInvariant => "SystemError",
            ErrorKind::TooDeeplyNested => "RecursionError",
            _ => "SyntaxError",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ErrorKind::Lexical => "lexical error",
            ErrorKind::UnexpectedToken => "unexpected token",
            ErrorKind::InvalidSyntaxInContext => "invalid syntax in context",
            ErrorKind::Indentation => "indentation error",
            ErrorKind::TooDeeplyNested => "too deeply nested",
            ErrorKind::InternalInvariant => "internal invariant violated",
        };
        f.write_str(name)
    }
}

/// An error recorded by the runtime or reported by a token source.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{kind}: {message} at {start}")]
pub struct RuntimeError {
    pub kind: ErrorKind,
    pub message: String,
    pub start: Position,
    pub end: Position,
}

impl RuntimeError {
    pub fn new(kind: ErrorKind, message: impl Into<String>, start: Position, end: Position) -> Self {
        Self {
            kind,
            message: message.into(),
            start,
            end,
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(
            ErrorKind::InternalInvariant,
            message,
            Position::default(),
            Position::default(),
        )
    }
}

/// A token-level expectation recorded at the furthest failure position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Expected {
    Kind(TokenKind),
    Keyword(&'static str),
    SoftKeyword(&'static str),
}

impl Expected {
    pub fn op(op: OpKind) -> Self {
        Expected::Kind(TokenKind::Op(op))
    }
}

impl fmt::Display for Expected {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expected::Kind(TokenKind::Op(op)) => write!(f, "'{}'", op.as_str()),
            Expected::Kind(kind) => write!(f, "{}", kind.name()),
            Expected::Keyword(kw) | Expected::SoftKeyword(kw) => write!(f, "'{kw}'"),
        }
    }
}
