//! Provide the token contract and the PEG parser runtime shared by every generated Python parser.
//!
//! This crate sits between the parser generator (`serpent_pegen`) and the concrete Python frontend
//! (`serpent_syntax`). Generated parsers only ever talk to the types defined here:
//! - [`tokens`]: token kinds, exact-operator subkinds, positions and the immutable [`Token`] record.
//! - [`keywords`]: the hard/soft keyword registry for the Python dialect.
//! - [`stream`]: the lazy, random-access [`TokenStream`] over any [`TokenSource`].
//! - [`runtime`]: the memo table, the left-recursion driver, error-position tracking and token
//!   matching helpers, exposed through the [`PegParser`] trait.
//!
//! ## Notes
//!
//! - The runtime is **language-neutral**: it knows token kinds and keyword spellings, never AST types.
//! - There is no process-wide mutable state. Two parses on two threads share nothing but `'static`
//!   tables emitted by the generator.
//!
//! ## See also
//! - `serpent_pegen` for the grammar meta-language and code generation.
//! - `serpent_syntax` for the Python tokenizer, AST and generated parser.

#![forbid(unsafe_code)]

pub mod keywords;
pub mod runtime;
pub mod stream;
pub mod tokens;

pub use runtime::{ErrorKind, Expected, MemoTable, ParserState, PegParser, RuleId, RuntimeError};
pub use stream::{TokenSource, TokenStream, VecSource};
pub use tokens::{OpKind, Position, Token, TokenKind};
