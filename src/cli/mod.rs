//! CLI module for serpent
//!
//! ## Commands
//!
//! - `generate <grammar>` - Generate a Rust parser from a grammar file
//! - `check-grammar <grammar>` - Validate a grammar and summarise its analysis
//! - `parse <file|->` - Parse Python source and print the AST
//! - `tokenize <file|->` - Print the token stream of Python source
//!
//! ## Design
//!
//! The CLI uses clap for argument parsing with derive macros.
//! Command functions return `CliResult<T>` instead of calling `process::exit`.
//! Only the top-level `run()` function handles errors and exits.

// Enforce explicit error handling - no panicking in production code
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]

pub mod commands;

use std::fmt;
use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand, ValueEnum};
use serpent_syntax::Mode;

// ============================================================================
// CLI Error handling
// ============================================================================

/// Exit code for CLI operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExitCode(pub i32);

impl ExitCode {
    pub const SUCCESS: ExitCode = ExitCode(0);
    pub const FAILURE: ExitCode = ExitCode(1);
}

/// Error type for CLI operations.
///
/// Contains a user-facing message and an exit code. The CLI entry point
/// catches these errors, prints the message, and exits with the code.
#[derive(Debug)]
pub struct CliError {
    /// User-facing error message (already formatted for display)
    pub message: String,
    /// Exit code to return to the shell
    pub exit_code: ExitCode,
}

impl CliError {
    pub fn new(message: impl Into<String>, exit_code: ExitCode) -> Self {
        Self {
            message: message.into(),
            exit_code,
        }
    }

    /// Create a failure error (exit code 1).
    pub fn failure(message: impl Into<String>) -> Self {
        Self::new(message, ExitCode::FAILURE)
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for CliError {}

/// Result type for CLI operations.
pub type CliResult<T> = Result<T, CliError>;

const VERSION: &str = env!("CARGO_PKG_VERSION");

// ============================================================================
// Clap CLI definition
// ============================================================================

/// PEG parser generator and Python parser
#[derive(Parser, Debug)]
#[command(name = "serpent")]
#[command(version = VERSION)]
#[command(about = "PEG parser generator and Python parser", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Generate a Rust parser from a grammar file
    Generate {
        /// Grammar file
        #[arg(value_name = "GRAMMAR")]
        grammar: PathBuf,
        /// Write the parser here instead of stdout
        #[arg(short, long, value_name = "OUT")]
        output: Option<PathBuf>,
        /// Memoize every rule
        #[arg(long)]
        memoize_all: bool,
        /// Emit the raw token stream instead of pretty-printed code
        #[arg(long)]
        no_format: bool,
        /// Name of the generated parser struct
        #[arg(long, value_name = "NAME")]
        class_name: Option<String>,
        /// Path of the runtime crate as seen from the generated code
        #[arg(long, value_name = "PATH", default_value = "::serpent_core")]
        runtime_path: String,
    },

    /// Validate a grammar and print its analysis
    CheckGrammar {
        /// Grammar file
        #[arg(value_name = "GRAMMAR")]
        grammar: PathBuf,
    },

    /// Parse Python source and print the AST
    Parse {
        /// Source file, or `-` for stdin
        #[arg(value_name = "FILE", default_value = "-")]
        file: String,
        /// Start rule
        #[arg(long, value_enum, default_value_t = ModeArg::Module)]
        mode: ModeArg,
        /// Include line and column attributes
        #[arg(long)]
        positions: bool,
        /// Indent nested nodes by this many spaces
        #[arg(long, value_name = "N")]
        indent: Option<usize>,
        /// Emit TYPE_COMMENT tokens and collect `# type: ignore` comments
        #[arg(long)]
        type_comments: bool,
        /// Python version gating soft keywords, e.g. 3.9
        #[arg(long, value_name = "X.Y", value_parser = parse_feature_version)]
        feature_version: Option<(u8, u8)>,
        /// Report the first-pass error without running the diagnostic pass
        #[arg(long)]
        no_second_pass: bool,
    },

    /// Print the token stream of Python source
    Tokenize {
        /// Source file, or `-` for stdin
        #[arg(value_name = "FILE", default_value = "-")]
        file: String,
        /// Emit TYPE_COMMENT tokens
        #[arg(long)]
        type_comments: bool,
    },
}

/// `--mode` values; mirrors [`Mode`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
#[value(rename_all = "snake_case")]
pub enum ModeArg {
    Module,
    Interactive,
    Eval,
    FuncType,
    Fstring,
}

impl From<ModeArg> for Mode {
    fn from(arg: ModeArg) -> Self {
        match arg {
            ModeArg::Module => Mode::Module,
            ModeArg::Interactive => Mode::Interactive,
            ModeArg::Eval => Mode::Eval,
            ModeArg::FuncType => Mode::FuncType,
            ModeArg::Fstring => Mode::FString,
        }
    }
}

fn parse_feature_version(s: &str) -> Result<(u8, u8), String> {
    let (major, minor) = s.split_once('.').ok_or_else(|| format!("expected MAJOR.MINOR, got '{s}'"))?;
    let major = major.parse().map_err(|_| format!("invalid major version '{major}'"))?;
    let minor = minor.parse().map_err(|_| format!("invalid minor version '{minor}'"))?;
    Ok((major, minor))
}

// ============================================================================
// CLI entry point
// ============================================================================

/// Main CLI entry point.
///
/// This is the only place where `process::exit` is called. All command
/// implementations return `CliResult` and errors are handled here.
pub fn run() {
    let cli = Cli::parse();

    match execute(cli) {
        Ok(exit_code) => {
            if exit_code.0 != 0 {
                process::exit(exit_code.0);
            }
        }
        Err(e) => {
            if !e.message.is_empty() {
                eprintln!("{}", e.message);
            }
            process::exit(e.exit_code.0);
        }
    }
}

/// Execute the CLI command and return result.
pub fn execute(cli: Cli) -> CliResult<ExitCode> {
    match cli.command {
        Command::Generate {
            grammar,
            output,
            memoize_all,
            no_format,
            class_name,
            runtime_path,
        } => {
            let mut config = serpent_pegen::GeneratorConfig::new()
                .with_memoize_all(memoize_all)
                .with_format(!no_format)
                .with_runtime_path(runtime_path);
            if let Some(name) = class_name {
                config = config.with_class_name(name);
            }
            commands::generate(&grammar, output.as_deref(), &config)
        }
        Command::CheckGrammar { grammar } => commands::check_grammar(&grammar),
        Command::Parse {
            file,
            mode,
            positions,
            indent,
            type_comments,
            feature_version,
            no_second_pass,
        } => {
            let mut config = serpent_syntax::ParserConfig::new()
                .with_type_comments(type_comments)
                .with_second_pass(!no_second_pass);
            if let Some(version) = feature_version {
                config = config.with_feature_version(version);
            }
            let options = serpent_syntax::DumpOptions::new().with_attributes(positions);
            let options = match indent {
                Some(n) => options.with_indent(n),
                None => options,
            };
            commands::parse(&file, mode.into(), config, options)
        }
        Command::Tokenize { file, type_comments } => commands::tokenize(&file, type_comments),
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parse_generate() {
        let cli = Cli::try_parse_from(["serpent", "generate", "python.gram", "-o", "out.rs", "--memoize-all"]).unwrap();
        if let Command::Generate {
            output,
            memoize_all,
            no_format,
            runtime_path,
            ..
        } = cli.command
        {
            assert_eq!(output, Some(PathBuf::from("out.rs")));
            assert!(memoize_all);
            assert!(!no_format);
            assert_eq!(runtime_path, "::serpent_core");
        } else {
            panic!("Expected Generate command");
        }
    }

    #[test]
    fn test_cli_parse_check_grammar() {
        let cli = Cli::try_parse_from(["serpent", "check-grammar", "toy.gram"]).unwrap();
        assert!(matches!(cli.command, Command::CheckGrammar { .. }));
    }

    #[test]
    fn test_cli_parse_modes() {
        for (name, mode) in [
            ("module", Mode::Module),
            ("interactive", Mode::Interactive),
            ("eval", Mode::Eval),
            ("func_type", Mode::FuncType),
            ("fstring", Mode::FString),
        ] {
            let cli = Cli::try_parse_from(["serpent", "parse", "x.py", "--mode", name]).unwrap();
            if let Command::Parse { mode: arg, .. } = cli.command {
                assert_eq!(Mode::from(arg), mode);
                assert_eq!(mode.as_str(), name);
            } else {
                panic!("Expected Parse command");
            }
        }
    }

    #[test]
    fn test_cli_parse_defaults_to_stdin() {
        let cli = Cli::try_parse_from(["serpent", "parse", "--positions"]).unwrap();
        if let Command::Parse { file, positions, mode, .. } = cli.command {
            assert_eq!(file, "-");
            assert!(positions);
            assert_eq!(mode, ModeArg::Module);
        } else {
            panic!("Expected Parse command");
        }
    }

    #[test]
    fn test_cli_feature_version() {
        let cli = Cli::try_parse_from(["serpent", "parse", "x.py", "--feature-version", "3.9"]).unwrap();
        if let Command::Parse { feature_version, .. } = cli.command {
            assert_eq!(feature_version, Some((3, 9)));
        } else {
            panic!("Expected Parse command");
        }
        assert!(Cli::try_parse_from(["serpent", "parse", "x.py", "--feature-version", "3"]).is_err());
    }

    #[test]
    fn test_cli_rejects_unknown_mode() {
        assert!(Cli::try_parse_from(["serpent", "parse", "x.py", "--mode", "exec"]).is_err());
    }
}
