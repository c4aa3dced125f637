//! Embedding hook: source text to code object.
//!
//! The parser produces the AST; turning it into executable code belongs to the embedding
//! interpreter, which plugs in through [`BytecodeCompiler`].
//!
//! ## Examples
//! ```rust
//! use serpent::ast::Mod;
//! use serpent::{BytecodeCompiler, Mode, compile};
//!
//! struct StatementCount;
//!
//! impl BytecodeCompiler for StatementCount {
//!     type Code = usize;
//!     type Error = std::convert::Infallible;
//!
//!     fn compile(&mut self, tree: &Mod, _filename: &str, _mode: Mode) -> Result<usize, Self::Error> {
//!         Ok(match tree {
//!             Mod::Module { body, .. } | Mod::Interactive { body } => body.len(),
//!             _ => 0,
//!         })
//!     }
//! }
//!
//! let code = compile(&mut StatementCount, "a = 1\nb = 2\n", "demo.py", Mode::Module).unwrap();
//! assert_eq!(code, 2);
//! ```

use serpent_syntax::ast::Mod;
use serpent_syntax::{Mode, ParserConfig, SyntaxError, parse_source_with};
use thiserror::Error;

/// Back end that turns a parsed module into a code object.
pub trait BytecodeCompiler {
    type Code;
    type Error: std::error::Error + 'static;

    fn compile(&mut self, tree: &Mod, filename: &str, mode: Mode) -> Result<Self::Code, Self::Error>;
}

/// Failure of [`compile`]: either the source does not parse or the back end rejected the tree.
#[derive(Debug, Error)]
pub enum CompileError<E: std::error::Error + 'static> {
    #[error(transparent)]
    Syntax(#[from] SyntaxError),
    #[error("compiling {filename} failed: {source}")]
    Backend {
        filename: String,
        #[source]
        source: E,
    },
}

impl<E: std::error::Error + 'static> CompileError<E> {
    pub fn as_syntax_error(&self) -> Option<&SyntaxError> {
        match self {
            CompileError::Syntax(err) => Some(err),
            CompileError::Backend { .. } => None,
        }
    }
}

/// Parse `source` and hand the tree to `compiler`.
///
/// `filename` is attached to syntax errors and passed through to the back end; the parser does not
/// otherwise look at it.
pub fn compile<C: BytecodeCompiler>(
    compiler: &mut C,
    source: &str,
    filename: &str,
    mode: Mode,
) -> Result<C::Code, CompileError<C::Error>> {
    compile_with(compiler, source, filename, mode, &ParserConfig::default())
}

/// [`compile`] with explicit parser settings. The filename argument overrides the config's.
#[tracing::instrument(skip_all, fields(filename = %filename, mode = %mode))]
pub fn compile_with<C: BytecodeCompiler>(
    compiler: &mut C,
    source: &str,
    filename: &str,
    mode: Mode,
    config: &ParserConfig,
) -> Result<C::Code, CompileError<C::Error>> {
    let config = config.clone().with_filename(filename);
    let tree = parse_source_with(source, mode, &config)?;
    compiler.compile(&tree, filename, mode).map_err(|source| CompileError::Backend {
        filename: filename.to_string(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use std::fmt;

    use serpent_syntax::ast::StmtKind;

    use super::*;

    #[derive(Debug)]
    struct Unsupported(&'static str);

    impl fmt::Display for Unsupported {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            write!(f, "unsupported statement: {}", self.0)
        }
    }

    impl std::error::Error for Unsupported {}

    /// Accepts assignments only.
    struct AssignmentsOnly;

    impl BytecodeCompiler for AssignmentsOnly {
        type Code = Vec<String>;
        type Error = Unsupported;

        fn compile(&mut self, tree: &Mod, _filename: &str, _mode: Mode) -> Result<Vec<String>, Unsupported> {
            let Mod::Module { body, .. } = tree else {
                return Err(Unsupported("non-module"));
            };
            body.iter()
                .map(|stmt| match &stmt.node {
                    StmtKind::Assign { .. } => Ok(format!("STORE line {}", stmt.span.start.line)),
                    _ => Err(Unsupported("non-assignment")),
                })
                .collect()
        }
    }

    #[test]
    fn test_compile_runs_the_back_end() {
        let code = compile(&mut AssignmentsOnly, "a = 1\n\nb = 2\n", "m.py", Mode::Module).unwrap();
        assert_eq!(code, vec!["STORE line 1", "STORE line 3"]);
    }

    #[test]
    fn test_syntax_errors_carry_the_filename() {
        let err = compile(&mut AssignmentsOnly, "a = (\n", "m.py", Mode::Module).unwrap_err();
        let syntax = err.as_syntax_error().unwrap();
        assert_eq!(syntax.filename, "m.py");
        assert_eq!(syntax.message, "'(' was never closed");
    }

    #[test]
    fn test_back_end_errors_are_wrapped() {
        let err = compile(&mut AssignmentsOnly, "pass\n", "m.py", Mode::Module).unwrap_err();
        assert!(err.as_syntax_error().is_none());
        assert_eq!(err.to_string(), "compiling m.py failed: unsupported statement: non-assignment");
    }
}
