use crate::keywords;
use crate::stream::TokenStream;
use crate::tokens::{Position, Token, TokenKind};

use super::error::{ErrorKind, Expected, RuntimeError};
use super::memo::MemoTable;

/// Default bound on simultaneously active rule invocations.
pub const DEFAULT_MAX_DEPTH: usize = 1500;

/// Default bound on the expected-item set kept at the furthest position.
pub const DEFAULT_EXPECTED_LIMIT: usize = 16;

/// Furthest-failure bookkeeping.
#[derive(Debug, Default)]
struct FailureTracker {
    furthest: usize,
    expected: Vec<Expected>,
    limit: usize,
}

impl FailureTracker {
    fn record(&mut self, mark: usize, item: Expected) {
        if mark > self.furthest {
            self.furthest = mark;
            self.expected.clear();
        }
        if mark == self.furthest && self.expected.len() < self.limit && !self.expected.contains(&item) {
            self.expected.push(item);
        }
    }
}

/// Everything one parse owns: token stream, memo table, error state and limits.
#[derive(Debug)]
pub struct ParserState<'s> {
    stream: TokenStream<'s>,
    memo: MemoTable,
    failures: FailureTracker,
    keywords: &'static [&'static str],
    soft_keywords: &'static [&'static str],
    feature_version: (u8, u8),
    call_invalid_rules: bool,
    depth: usize,
    max_depth: usize,
    error: Option<RuntimeError>,
}

impl<'s> ParserState<'s> {
    /// Create the state for one parse.
    ///
    /// `keywords` and `soft_keywords` are the static tables the generator emitted for the grammar.
    pub fn new(
        stream: TokenStream<'s>,
        keywords: &'static [&'static str],
        soft_keywords: &'static [&'static str],
    ) -> Self {
        Self {
            stream,
            memo: MemoTable::new(),
            failures: FailureTracker {
                limit: DEFAULT_EXPECTED_LIMIT,
                ..FailureTracker::default()
            },
            keywords,
            soft_keywords,
            feature_version: keywords::LATEST_VERSION,
            call_invalid_rules: false,
            depth: 0,
            max_depth: DEFAULT_MAX_DEPTH,
            error: None,
        }
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn with_feature_version(mut self, version: (u8, u8)) -> Self {
        self.feature_version = version;
        self
    }

    pub fn with_expected_limit(mut self, limit: usize) -> Self {
        self.failures.limit = limit;
        self
    }

    // ========================================================================
    // Token access
    // ========================================================================

    pub fn mark(&self) -> usize {
        self.stream.mark()
    }

    pub fn reset(&mut self, mark: usize) {
        if let Err(err) = self.stream.reset(mark) {
            self.raise(err);
        }
    }

    /// The token at the current mark. A failed source ends the parse through the error slot.
    pub fn current(&mut self) -> Option<&Token> {
        let at = self.stream.mark();
        self.peek_at(at)
    }

    /// The token at an absolute index.
    pub fn peek_at(&mut self, i: usize) -> Option<&Token> {
        if self.stream.peek(i).is_none() {
            if let Some(err) = self.stream.take_failure() {
                if self.error.is_none() {
                    self.error = Some(err);
                }
            }
            return None;
        }
        self.stream.peek(i)
    }

    /// Consume the current token, returning a copy of it.
    pub fn advance(&mut self) -> Option<Token> {
        let tok = self.current()?.clone();
        self.stream.advance();
        Some(tok)
    }

    /// Start of the token at `mark`, used as the `start_pos` of rule actions.
    pub fn start_position(&mut self, mark: usize) -> Position {
        if let Some(tok) = self.peek_at(mark) {
            return tok.start;
        }
        self.stream.tokens().last().map(|t| t.end).unwrap_or_default()
    }

    /// End of the last consumed token that is not layout (`NEWLINE`, `INDENT`, `DEDENT`,
    /// `ENDMARKER`); the `end_pos` of rule actions.
    pub fn end_position(&self) -> Position {
        let tokens = self.stream.tokens();
        let upto = self.stream.mark().min(tokens.len());
        tokens[..upto]
            .iter()
            .rev()
            .find(|t| !t.kind.is_layout())
            .or_else(|| tokens[..upto].last())
            .map(|t| t.end)
            .unwrap_or_default()
    }

    pub fn stream(&self) -> &TokenStream<'s> {
        &self.stream
    }

    pub fn stream_mut(&mut self) -> &mut TokenStream<'s> {
        &mut self.stream
    }

    /// Number of tokens the source has produced; the last of them is the furthest token seen.
    pub fn filled(&self) -> usize {
        self.stream.filled()
    }

    // ========================================================================
    // Keywords
    // ========================================================================

    pub fn is_keyword(&self, text: &str) -> bool {
        self.keywords.contains(&text)
    }

    pub fn keywords(&self) -> &'static [&'static str] {
        self.keywords
    }

    /// Whether `text` is a soft keyword of this grammar that is enabled for the feature version.
    pub fn is_soft_keyword(&self, text: &str) -> bool {
        self.soft_keywords.contains(&text) && keywords::soft_keyword_enabled(text, self.feature_version)
    }

    pub fn feature_version(&self) -> (u8, u8) {
        self.feature_version
    }

    // ========================================================================
    // Memo table
    // ========================================================================

    pub fn memo(&mut self) -> &mut MemoTable {
        &mut self.memo
    }

    // ========================================================================
    // Error state
    // ========================================================================

    pub fn record_expected(&mut self, mark: usize, item: Expected) {
        self.failures.record(mark, item);
    }

    /// Token index of the furthest recorded expectation failure.
    pub fn furthest_failure(&self) -> usize {
        self.failures.furthest
    }

    pub fn expected(&self) -> &[Expected] {
        &self.failures.expected
    }

    /// Record an error; the first one wins.
    pub fn raise(&mut self, err: RuntimeError) {
        if self.error.is_none() {
            tracing::debug!(kind = %err.kind, message = %err.message, "parser error raised");
            self.error = Some(err);
        }
    }

    pub fn has_error(&self) -> bool {
        self.error.is_some()
    }

    pub fn error(&self) -> Option<&RuntimeError> {
        self.error.as_ref()
    }

    pub fn take_error(&mut self) -> Option<RuntimeError> {
        self.error.take()
    }

    pub fn call_invalid_rules(&self) -> bool {
        self.call_invalid_rules
    }

    /// Prepare for the diagnostic pass: clear the memo table, rewind to the first token and
    /// enable `invalid_*` alternatives. Tokens already produced are kept.
    pub fn reset_for_error_pass(&mut self) {
        self.memo.clear();
        self.depth = 0;
        self.call_invalid_rules = true;
        self.reset(0);
    }

    // ========================================================================
    // Depth accounting
    // ========================================================================

    /// Enter a rule invocation. Returns `false` (and records the error) past the depth limit.
    pub fn enter(&mut self) -> bool {
        self.depth += 1;
        if self.depth > self.max_depth {
            if self.error.is_none() {
                let at = self.start_position(self.mark());
                self.raise(RuntimeError::new(
                    ErrorKind::TooDeeplyNested,
                    "too deeply nested: maximum parser recursion depth exceeded",
                    at,
                    at,
                ));
            }
            return false;
        }
        true
    }

    pub fn exit(&mut self) {
        self.depth = self.depth.saturating_sub(1);
    }

    pub fn depth(&self) -> usize {
        self.depth
    }

    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    pub fn last_token_kind(&self) -> Option<TokenKind> {
        self.stream.tokens().last().map(|t| t.kind)
    }
}
