#![forbid(unsafe_code)]
//! Serpent: a PEG parser generator and the Python parser built with it.
//!
//! The workspace is split by concern:
//!
//! - [`serpent_core`]: token contract and the packrat runtime generated parsers run on.
//! - [`serpent_pegen`]: grammar meta-language, analysis and Rust code generation.
//! - [`serpent_syntax`]: Python tokenizer, AST and the parser generated from `python.gram`.
//!
//! This crate ties them together behind the `serpent` binary and provides [`compile`], the hook an
//! embedding interpreter calls to turn source text into code objects.
//!
//! ## Panic Policy
//!
//! - **Production code**: Use `Result` or `Option` with `?` / `ok_or` / `map_err`. The `cli` module
//!   enforces `#![deny(clippy::unwrap_used)]`.
//! - **Test code**: `.unwrap()` and `.expect()` are acceptable in tests.
//! - **Parser invariants**: broken token-stream contracts surface as `InternalInvariant` syntax
//!   errors (reported as `SystemError`), not panics.

pub mod cli;
pub mod compile;

pub use compile::{BytecodeCompiler, CompileError, compile, compile_with};

pub use serpent_core as core;
pub use serpent_pegen as pegen;
pub use serpent_syntax as syntax;

pub use serpent_syntax::ast;
pub use serpent_syntax::{Mode, ParserConfig, SyntaxError, parse_source, parse_tokens};
