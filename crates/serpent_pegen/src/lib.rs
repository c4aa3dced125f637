//! PEG parser generator for the serpent toolchain.
//!
//! Reads a grammar written in the PEG meta-language (rules with ordered alternatives, lookaheads,
//! cuts, gathers, forced tokens and embedded Rust actions) and emits a packrat parser in Rust that
//! runs on the `serpent_core` runtime.
//!
//! ## Pipeline
//! 1. [`meta::parse_grammar`]: grammar text to [`grammar::Grammar`].
//! 2. [`analysis::analyze`]: validation, nullability, left-recursion leaders, memo decisions.
//! 3. [`codegen::emit_parser`]: Rust source text.
//!
//! [`generate`] runs all three; [`check_grammar`] stops after analysis.

#![forbid(unsafe_code)]

pub mod analysis;
pub mod codegen;
pub mod config;
pub mod errors;
pub mod grammar;
pub mod meta;

use std::path::Path;

pub use analysis::Analysis;
pub use config::GeneratorConfig;
pub use errors::{GrammarError, GrammarErrorKind, GrammarResult};
pub use grammar::Grammar;

/// Parse and analyse a grammar without emitting code.
pub fn check_grammar(source: &str, name: &str, config: &GeneratorConfig) -> GrammarResult<(Grammar, Analysis)> {
    let run = || -> GrammarResult<(Grammar, Analysis)> {
        let mut grammar = meta::parse_grammar(source)?;
        let analysis = analysis::analyze(&mut grammar, config)?;
        Ok((grammar, analysis))
    };
    run().map_err(|e| e.with_source(name, source))
}

/// Generate the parser for `source`. `name` labels diagnostics and the generated file header.
#[tracing::instrument(skip_all, fields(grammar = name))]
pub fn generate(source: &str, name: &str, config: &GeneratorConfig) -> GrammarResult<String> {
    let (grammar, analysis) = check_grammar(source, name, config)?;
    let code = codegen::emit_parser(&grammar, &analysis, config, name).map_err(|e| e.with_source(name, source))?;
    tracing::info!(
        rules = grammar.rules.len(),
        leaders = analysis.leaders.len(),
        bytes = code.len(),
        "generated parser"
    );
    Ok(code)
}

/// Failure of [`generate_file`].
#[derive(Debug, thiserror::Error, miette::Diagnostic)]
pub enum GenerateFileError {
    #[error("cannot access {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error(transparent)]
    #[diagnostic(transparent)]
    Grammar(#[from] GrammarError),
}

/// Read a grammar file, generate its parser and write it to `output`, for build scripts.
///
/// The output is only rewritten when its contents change, so dependants are not rebuilt needlessly.
pub fn generate_file(input: &Path, output: &Path, config: &GeneratorConfig) -> Result<(), GenerateFileError> {
    let source = std::fs::read_to_string(input).map_err(io_error(input))?;
    let name = input.file_name().and_then(|n| n.to_str()).unwrap_or("<grammar>");
    let code = generate(&source, name, config)?;
    if std::fs::read_to_string(output).ok().as_deref() == Some(code.as_str()) {
        return Ok(());
    }
    std::fs::write(output, code).map_err(io_error(output))
}

fn io_error(path: &Path) -> impl FnOnce(std::io::Error) -> GenerateFileError {
    let path = path.display().to_string();
    move |source| GenerateFileError::Io { path, source }
}
