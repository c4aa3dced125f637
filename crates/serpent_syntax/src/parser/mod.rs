//! Python parser entry points.
//!
//! The parser itself is generated from `grammar/python.gram`; this module drives it:
//! - the **first pass** runs with `invalid_*` rules disabled, so valid input pays nothing for
//!   error reporting;
//! - on failure without an error, the memo table is cleared and a **second pass** runs with them
//!   enabled to produce a specific message;
//! - if that pass stays silent, a **generic** error is reported at the furthest token the first
//!   pass looked at.
//!
//! Tokenizer errors found anywhere in the rest of the file take priority over parser errors, as
//! the Python interpreter does.
//!
//! ## Examples
//! ```rust
//! use serpent_syntax::parser::{Mode, parse_source};
//!
//! let module = parse_source("x = 1\n", Mode::Module).unwrap();
//! assert!(matches!(module, serpent_syntax::ast::Mod::Module { .. }));
//! ```

mod actions;
mod generated;
#[cfg(test)]
mod toy;

use std::fmt;
use std::str::FromStr;

use serpent_core::runtime::DEFAULT_EXPECTED_LIMIT;
use serpent_core::{
    ErrorKind, ParserState, PegParser, Position, RuntimeError, Token, TokenKind, TokenSource, TokenStream, keywords,
};

use crate::ast::Mod;
use crate::diagnostics::SyntaxError;
use crate::tokenizer::Tokenizer;
use generated::{KEYWORDS, PythonParser, SOFT_KEYWORDS};

pub use generated::{RULE_ID_BASE, RULE_NAMES};

/// The start rule a parse begins at, mirroring the modes of Python's `compile()`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Mode {
    /// A whole file (`exec`).
    Module,
    /// One interactive statement (`single`).
    Interactive,
    /// A single expression (`eval`).
    Eval,
    /// A function type comment signature: `(int, str) -> bool`.
    FuncType,
    /// The expression of an f-string replacement field.
    FString,
}

impl Mode {
    pub const ALL: [Mode; 5] = [Mode::Module, Mode::Interactive, Mode::Eval, Mode::FuncType, Mode::FString];

    pub fn as_str(self) -> &'static str {
        match self {
            Mode::Module => "module",
            Mode::Interactive => "interactive",
            Mode::Eval => "eval",
            Mode::FuncType => "func_type",
            Mode::FString => "fstring",
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Mode {
    type Err = String;

    /// Accepts the names above and the `compile()` spellings `exec` and `single`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "module" | "exec" => Ok(Mode::Module),
            "interactive" | "single" => Ok(Mode::Interactive),
            "eval" => Ok(Mode::Eval),
            "func_type" => Ok(Mode::FuncType),
            "fstring" => Ok(Mode::FString),
            other => Err(format!("unknown parse mode `{other}`")),
        }
    }
}

/// Knobs for one parse.
#[derive(Debug, Clone)]
pub struct ParserConfig {
    pub max_depth: usize,
    pub type_comments: bool,
    pub second_pass: bool,
    pub expected_limit: usize,
    pub filename: Option<String>,
    /// `(major, minor)` Python version; gates the soft keywords.
    pub feature_version: (u8, u8),
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            max_depth: serpent_core::runtime::DEFAULT_MAX_DEPTH,
            type_comments: false,
            second_pass: true,
            expected_limit: DEFAULT_EXPECTED_LIMIT,
            filename: None,
            feature_version: keywords::LATEST_VERSION,
        }
    }
}

impl ParserConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bound on simultaneously active rules; deeper input fails with a "too deeply nested" error.
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Turn `# type:` comments into tokens and fill `Module.type_ignores`.
    pub fn with_type_comments(mut self, enabled: bool) -> Self {
        self.type_comments = enabled;
        self
    }

    /// Disable to skip the diagnostic pass; failures then always get the generic message.
    pub fn with_second_pass(mut self, enabled: bool) -> Self {
        self.second_pass = enabled;
        self
    }

    pub fn with_expected_limit(mut self, limit: usize) -> Self {
        self.expected_limit = limit;
        self
    }

    pub fn with_filename(mut self, filename: impl Into<String>) -> Self {
        self.filename = Some(filename.into());
        self
    }

    pub fn with_feature_version(mut self, version: (u8, u8)) -> Self {
        self.feature_version = version;
        self
    }
}

/// Parse Python source with the default configuration.
pub fn parse_source(source: &str, mode: Mode) -> Result<Mod, SyntaxError> {
    parse_source_with(source, mode, &ParserConfig::default())
}

/// Parse Python source. Tokenizer errors are reported as [`SyntaxError`]s.
///
/// ## Errors
/// Returns the first error found; the error carries the offending source line.
#[tracing::instrument(skip_all, fields(mode = %mode, source_len = source.len()))]
pub fn parse_source_with(source: &str, mode: Mode, config: &ParserConfig) -> Result<Mod, SyntaxError> {
    let mut tokenizer = Tokenizer::new(source).with_type_comments(config.type_comments);
    if mode == Mode::FString {
        // A replacement field is read as if parenthesized: line breaks never end it.
        tokenizer = tokenizer.with_implicit_parens();
    }
    run(TokenStream::new(tokenizer), mode, config).map_err(|err| err.with_source(source))
}

/// Parse a caller-supplied token source with the default configuration.
pub fn parse_tokens<'s>(tokens: impl TokenSource + 's, mode: Mode) -> Result<Mod, SyntaxError> {
    parse_tokens_with(tokens, mode, &ParserConfig::default())
}

/// Parse a caller-supplied token source.
///
/// The source must produce tokens in order and finish with one `ENDMARKER`. Errors carry no
/// source line since the text is unknown here.
#[tracing::instrument(skip_all, fields(mode = %mode))]
pub fn parse_tokens_with<'s>(
    tokens: impl TokenSource + 's,
    mode: Mode,
    config: &ParserConfig,
) -> Result<Mod, SyntaxError> {
    run(TokenStream::new(tokens), mode, config)
}

fn run(stream: TokenStream<'_>, mode: Mode, config: &ParserConfig) -> Result<Mod, SyntaxError> {
    let state = ParserState::new(stream, KEYWORDS, SOFT_KEYWORDS)
        .with_max_depth(config.max_depth)
        .with_expected_limit(config.expected_limit)
        .with_feature_version(config.feature_version);
    let mut parser = PythonParser::from_state(state);
    let result = two_pass(&mut parser, mode, config.second_pass);
    match (&config.filename, result) {
        (Some(filename), Err(err)) => Err(err.with_filename(filename.clone())),
        (_, result) => result,
    }
}

fn start(parser: &mut PythonParser<'_>, mode: Mode) -> Option<Mod> {
    match mode {
        Mode::Module => parser.file(),
        Mode::Interactive => parser.interactive(),
        Mode::Eval => parser.eval(),
        Mode::FuncType => parser.func_type(),
        Mode::FString => parser.fstring().map(|expr| Mod::Expression { body: Box::new(expr) }),
    }
}

fn two_pass(parser: &mut PythonParser<'_>, mode: Mode, second_pass: bool) -> Result<Mod, SyntaxError> {
    if let Some(tree) = start(parser, mode) {
        return finish(parser, mode, tree);
    }
    if let Some(err) = parser.state_mut().take_error() {
        return Err(prefer_tokenizer_error(parser, err));
    }

    // The generic error points at what the first pass saw, not at how far the second one got.
    let last_token = parser.state().stream().tokens().last().cloned();
    let expected = parser.state().expected().to_vec();

    if second_pass {
        tracing::debug!(
            filled = parser.state().filled(),
            "first pass failed; re-parsing with invalid rules enabled"
        );
        parser.state_mut().reset_for_error_pass();
        let _ = start(parser, mode);
        if let Some(err) = parser.state_mut().take_error() {
            return Err(prefer_tokenizer_error(parser, err));
        }
    }

    let Some(last) = last_token else {
        let at = Position::start();
        return Err(RuntimeError::new(
            ErrorKind::UnexpectedToken,
            "error at start before reading any input",
            at,
            at,
        )
        .into());
    };
    let err = match last.kind {
        TokenKind::Indent => RuntimeError::new(ErrorKind::Indentation, "unexpected indent", last.start, last.end),
        TokenKind::Dedent => RuntimeError::new(ErrorKind::Indentation, "unexpected unindent", last.start, last.end),
        _ => {
            let generic = RuntimeError::new(ErrorKind::UnexpectedToken, "invalid syntax", last.start, last.end);
            return Err(prefer_tokenizer_error(parser, generic).with_expected(&expected));
        }
    };
    Err(err.into())
}

/// A tokenizer error further down the file wins over a parser error.
fn prefer_tokenizer_error(parser: &mut PythonParser<'_>, err: RuntimeError) -> SyntaxError {
    if matches!(err.kind, ErrorKind::TooDeeplyNested | ErrorKind::InternalInvariant) {
        return err.into();
    }
    match parser.state_mut().stream_mut().fill_all() {
        Err(lexical) => {
            tracing::debug!(parser_error = %err.message, "tokenizer error overrides parser error");
            lexical.into()
        }
        Ok(_) => err.into(),
    }
}

/// Interactive input must hold exactly one statement.
fn finish(parser: &mut PythonParser<'_>, mode: Mode, tree: Mod) -> Result<Mod, SyntaxError> {
    if mode != Mode::Interactive {
        return Ok(tree);
    }
    let state = parser.state_mut();
    let mut at = state.mark();
    while let Some(tok) = state.peek_at(at).cloned() {
        match tok.kind {
            TokenKind::Newline => at += 1,
            TokenKind::EndMarker => return Ok(tree),
            _ => return Err(multiple_statements(&tok).into()),
        }
    }
    Err(state
        .take_error()
        .unwrap_or_else(|| RuntimeError::internal("token source ended without ENDMARKER"))
        .into())
}

fn multiple_statements(tok: &Token) -> RuntimeError {
    RuntimeError::new(
        ErrorKind::InvalidSyntaxInContext,
        "multiple statements found while compiling a single statement",
        tok.start,
        tok.end,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{ExprKind, StmtKind};

    fn module_body(source: &str) -> Vec<crate::ast::Stmt> {
        match parse_source(source, Mode::Module) {
            Ok(Mod::Module { body, .. }) => body,
            other => panic!("expected a module, got {other:?}"),
        }
    }

    fn error(source: &str, mode: Mode) -> SyntaxError {
        parse_source(source, mode).expect_err("source should be rejected")
    }

    #[test]
    fn test_mode_names_round_trip() {
        for mode in Mode::ALL {
            assert_eq!(mode.as_str().parse::<Mode>(), Ok(mode));
        }
        assert_eq!("exec".parse::<Mode>(), Ok(Mode::Module));
        assert_eq!("single".parse::<Mode>(), Ok(Mode::Interactive));
        assert!("statement".parse::<Mode>().is_err());
    }

    #[test]
    fn test_empty_and_comment_only_files() {
        assert!(module_body("").is_empty());
        assert!(module_body("# nothing here\n\n   \n# still nothing").is_empty());
    }

    #[test]
    fn test_missing_trailing_newline_is_accepted() {
        let body = module_body("x = 1");
        assert_eq!(body.len(), 1);
        assert!(matches!(body[0].node, StmtKind::Assign { .. }));
    }

    #[test]
    fn test_interactive_accepts_one_statement_line() {
        let tree = parse_source("x = 1; y = 2\n", Mode::Interactive).unwrap();
        let Mod::Interactive { body } = tree else {
            panic!("expected interactive");
        };
        assert_eq!(body.len(), 2);
    }

    #[test]
    fn test_interactive_rejects_second_statement() {
        let err = error("x = 1\ny = 2\n", Mode::Interactive);
        assert_eq!(err.message, "multiple statements found while compiling a single statement");
        assert_eq!(err.start.line, 2);
    }

    #[test]
    fn test_fstring_mode_wraps_expression() {
        let tree = parse_source("a + b", Mode::FString).unwrap();
        let Mod::Expression { body } = tree else {
            panic!("expected expression");
        };
        assert!(matches!(body.node, ExprKind::BinOp { .. }));
    }

    #[test]
    fn test_fstring_mode_accepts_line_breaks() {
        for source in ["a + b\n", "a +\n b", "x if y else z\n\n"] {
            let tree = parse_source(source, Mode::FString);
            assert!(matches!(tree, Ok(Mod::Expression { .. })), "{source:?}: {tree:?}");
        }
        assert!(parse_source("a b", Mode::FString).is_err());
    }

    #[test]
    fn test_fstring_rule_allows_trailing_newlines_from_a_token_source() {
        let tokens = crate::tokenizer::tokenize("a + b\n", false).unwrap();
        let tree = parse_tokens(serpent_core::VecSource::new(tokens), Mode::FString).unwrap();
        assert!(matches!(tree, Mod::Expression { .. }));
    }

    #[test]
    fn test_generic_error_reports_furthest_first_pass_token() {
        let err = error("x = = 1\n", Mode::Module);
        assert_eq!(err.kind, ErrorKind::UnexpectedToken);
        assert_eq!(err.message, "invalid syntax");
        assert_eq!((err.start.line, err.start.col), (1, 4));
        assert!(!err.expected.is_empty());
    }

    #[test]
    fn test_unexpected_indent() {
        let err = error("x = 1\n    y = 2\n", Mode::Module);
        assert_eq!(err.kind, ErrorKind::Indentation);
        assert_eq!(err.message, "unexpected indent");
        assert_eq!(err.exception_name(), "IndentationError");
    }

    #[test]
    fn test_tokenizer_error_overrides_parser_error() {
        // The parser fails on `1 2` long before the tokenizer sees the unclosed bracket.
        let err = error("x = (1 2\ny = [\n", Mode::Module);
        assert_eq!(err.kind, ErrorKind::Lexical);
        assert_eq!(err.message, "'[' was never closed");
    }

    #[test]
    fn test_second_pass_can_be_disabled() {
        let config = ParserConfig::new().with_second_pass(false);
        let err = parse_source_with("f(x for x in y, 1)\n", Mode::Module, &config).unwrap_err();
        assert_eq!(err.message, "invalid syntax");
        let err = error("f(x for x in y, 1)\n", Mode::Module);
        assert_eq!(err.message, "Generator expression must be parenthesized");
    }

    #[test]
    fn test_filename_is_attached() {
        let config = ParserConfig::new().with_filename("pkg/mod.py");
        let err = parse_source_with("(\n", Mode::Module, &config).unwrap_err();
        assert_eq!(err.filename, "pkg/mod.py");
        assert!(err.render().starts_with("  File \"pkg/mod.py\", line 1"));
    }

    #[test]
    fn test_soft_keywords_follow_feature_version() {
        let source = "match x:\n    case 1:\n        pass\n";
        assert!(parse_source(source, Mode::Module).is_ok());
        let old = ParserConfig::new().with_feature_version((3, 9));
        assert!(parse_source_with(source, Mode::Module, &old).is_err());
    }

    #[test]
    fn test_parse_tokens_matches_parse_source() {
        let source = "for i in range(3):\n    print(i)\n";
        let tokens = crate::tokenizer::tokenize(source, false).unwrap();
        let from_tokens = parse_tokens(serpent_core::VecSource::new(tokens), Mode::Module).unwrap();
        assert_eq!(from_tokens, parse_source(source, Mode::Module).unwrap());
    }

    #[test]
    fn test_type_ignores_are_collected() {
        let config = ParserConfig::new().with_type_comments(true);
        let tree = parse_source_with("import a  # type: ignore[attr]\n", Mode::Module, &config).unwrap();
        let Mod::Module { type_ignores, .. } = tree else {
            panic!("expected module");
        };
        assert_eq!(type_ignores.len(), 1);
        assert_eq!(type_ignores[0].lineno, 1);
        assert_eq!(type_ignores[0].tag, "[attr]");
    }
}
