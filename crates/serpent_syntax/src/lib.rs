//! Python frontend of the serpent toolchain: tokenizer, AST, generated parser and diagnostics.
//!
//! The parser is generated at build time from `grammar/python.gram` by `serpent_pegen` and runs on
//! the `serpent_core` runtime. This crate adds everything Python-specific around it.
//!
//! ## Examples
//! ```rust
//! use serpent_syntax::{Mode, parse_source};
//!
//! let tree = parse_source("a = b = 1\n", Mode::Module).unwrap();
//! let text = serpent_syntax::dump(&tree, &Default::default());
//! assert!(text.starts_with("Module(body=[Assign(targets=[Name(id='a', ctx=Store()), Name(id='b', ctx=Store())]"));
//!
//! let err = parse_source("x = (1,\n", Mode::Module).unwrap_err();
//! assert_eq!(err.message, "'(' was never closed");
//! ```
//!
//! ## Notes
//! - Semantic checks the CPython compiler performs after parsing (`'return' outside function`,
//!   name binding rules) are out of scope.
//!
//! ## See also
//! - `serpent_core` for the token contract and the PEG runtime.
//! - `serpent_pegen` for the grammar meta-language.

#![forbid(unsafe_code)]

pub mod ast;
pub mod diagnostics;
pub mod dump;
pub mod literals;
pub mod parser;
pub mod tokenizer;
pub mod unparse;

pub use diagnostics::SyntaxError;
pub use dump::{DumpOptions, dump};
pub use parser::{Mode, ParserConfig, parse_source, parse_source_with, parse_tokens, parse_tokens_with};
pub use tokenizer::{Tokenizer, tokenize};
pub use unparse::{unparse, unparse_expr};
