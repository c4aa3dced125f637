//! CLI command implementations
//!
//! All command functions return `CliResult<ExitCode>` instead of calling
//! `process::exit`. Error handling and exits happen in the top-level `run()`.

use std::fs;
use std::io::{self, Read};
use std::path::Path;

use serpent_pegen::GeneratorConfig;
use serpent_syntax::{DumpOptions, Mode, ParserConfig, SyntaxError, dump, parse_source_with, tokenize as lex};

use super::{CliError, CliResult, ExitCode};

/// Maximum source file size (100 MB) to prevent memory exhaustion
const MAX_SOURCE_SIZE: u64 = 100 * 1024 * 1024;

/// File name reported for source read from stdin.
const STDIN_NAME: &str = "<stdin>";

// ============================================================================
// Input
// ============================================================================

/// Read a source file, or stdin when `file_path` is `-`.
///
/// # Errors
///
/// Returns an error if:
/// - The file cannot be accessed or read
/// - The file exceeds `MAX_SOURCE_SIZE` (100 MB)
pub fn read_source(file_path: &str) -> CliResult<String> {
    if file_path == "-" {
        let mut source = String::new();
        io::stdin()
            .read_to_string(&mut source)
            .map_err(|e| CliError::failure(format!("Error reading stdin: {}", e)))?;
        return Ok(source);
    }

    let metadata =
        fs::metadata(file_path).map_err(|e| CliError::failure(format!("Cannot access file '{}': {}", file_path, e)))?;

    if metadata.len() > MAX_SOURCE_SIZE {
        return Err(CliError::failure(format!(
            "Source file '{}' is too large ({} bytes, max {} bytes)",
            file_path,
            metadata.len(),
            MAX_SOURCE_SIZE
        )));
    }

    fs::read_to_string(file_path).map_err(|e| CliError::failure(format!("Error reading file '{}': {}", file_path, e)))
}

fn display_name(file_path: &str) -> &str {
    if file_path == "-" { STDIN_NAME } else { file_path }
}

fn grammar_name(path: &Path) -> String {
    path.file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("<grammar>")
        .to_string()
}

/// Render a `miette` diagnostic with the fancy handler.
fn render_diagnostic(err: impl miette::Diagnostic + Send + Sync + 'static) -> String {
    format!("{:?}", miette::Report::new(err))
}

fn syntax_failure(err: &SyntaxError) -> CliError {
    if let Some(hint) = &err.hint {
        tracing::debug!(hint = hint.as_str(), "parse failed");
    }
    CliError::failure(err.render())
}

// ============================================================================
// Grammar commands
// ============================================================================

/// Generate a parser and write it to `output`, or stdout.
pub fn generate(grammar: &Path, output: Option<&Path>, config: &GeneratorConfig) -> CliResult<ExitCode> {
    let path = grammar.to_string_lossy();
    let source = read_source(&path)?;
    let code = serpent_pegen::generate(&source, &grammar_name(grammar), config)
        .map_err(|e| CliError::failure(render_diagnostic(e)))?;

    match output {
        Some(out) => {
            fs::write(out, code)
                .map_err(|e| CliError::failure(format!("Error writing '{}': {}", out.display(), e)))?;
            tracing::info!(output = %out.display(), "wrote parser");
        }
        None => print!("{code}"),
    }
    Ok(ExitCode::SUCCESS)
}

/// Validate a grammar and print a summary of its analysis.
pub fn check_grammar(grammar: &Path) -> CliResult<ExitCode> {
    let path = grammar.to_string_lossy();
    let source = read_source(&path)?;
    let config = GeneratorConfig::default();
    let (parsed, analysis) = serpent_pegen::check_grammar(&source, &grammar_name(grammar), &config)
        .map_err(|e| CliError::failure(render_diagnostic(e)))?;

    let memoized = parsed.rules.iter().filter(|r| r.memo).count();
    println!("{}: {} rules ({} memoized)", path, parsed.rules.len(), memoized);
    println!("start rules: {}", list(&analysis.start_rules));
    println!("left-recursive: {}", list(&analysis.left_recursive));
    println!("leaders: {}", list(&analysis.leaders));
    println!("keywords: {}", list(&analysis.keywords));
    println!("soft keywords: {}", list(&analysis.soft_keywords));
    if !analysis.unreachable.is_empty() {
        println!("unreachable: {}", list(&analysis.unreachable));
    }
    Ok(ExitCode::SUCCESS)
}

fn list(items: &[String]) -> String {
    if items.is_empty() { "-".to_string() } else { items.join(", ") }
}

// ============================================================================
// Python commands
// ============================================================================

/// Parse Python source and print its AST dump.
pub fn parse(file_path: &str, mode: Mode, config: ParserConfig, options: DumpOptions) -> CliResult<ExitCode> {
    let source = read_source(file_path)?;
    let config = config.with_filename(display_name(file_path));

    let result = parse_source_with(&source, mode, &config).map(|tree| dump(&tree, &options));

    match result {
        Ok(text) => {
            println!("{text}");
            Ok(ExitCode::SUCCESS)
        }
        Err(err) => Err(syntax_failure(&err)),
    }
}

/// Print one token per line, in the layout of Python's `tokenize` module.
pub fn tokenize(file_path: &str, type_comments: bool) -> CliResult<ExitCode> {
    let source = read_source(file_path)?;
    let tokens = lex(&source, type_comments).map_err(|e| {
        let err = SyntaxError::from(e)
            .with_filename(display_name(file_path))
            .with_source(&source);
        syntax_failure(&err)
    })?;

    for tok in &tokens {
        let range = format!("{},{}-{},{}:", tok.start.line, tok.start.col, tok.end.line, tok.end.col);
        println!("{:<20}{:<15}{:?}", range, tok.kind.name(), tok.text);
    }
    Ok(ExitCode::SUCCESS)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_display_name_for_stdin() {
        assert_eq!(display_name("-"), "<stdin>");
        assert_eq!(display_name("a.py"), "a.py");
    }

    #[test]
    fn test_grammar_name_uses_file_name() {
        assert_eq!(grammar_name(Path::new("crates/x/grammar/python.gram")), "python.gram");
    }

    #[test]
    fn test_missing_file_is_a_failure() {
        let err = read_source("definitely/not/here.py").unwrap_err();
        assert_eq!(err.exit_code, ExitCode::FAILURE);
        assert!(err.message.starts_with("Cannot access file 'definitely/not/here.py'"));
    }

    #[test]
    fn test_list_formatting() {
        assert_eq!(list(&[]), "-");
        assert_eq!(list(&["a".to_string(), "b".to_string()]), "a, b");
    }
}
