use crate::tokens::{OpKind, Position, Token, TokenKind};

use super::RuleId;
use super::error::{ErrorKind, Expected, RuntimeError};
use super::memo::Memoized;
use super::state::ParserState;

/// Free stack below which a rule body runs on a freshly allocated segment.
const STACK_RED_ZONE: usize = 1024 * 1024;
/// Size of each segment allocated when the red zone is reached.
const STACK_SEGMENT: usize = 16 * 1024 * 1024;

/// Runtime surface of a generated parser.
///
/// Implementors only provide access to their [`ParserState`]; every other method is provided and
/// is what generated rule functions call into.
pub trait PegParser<'s>: Sized {
    fn state(&self) -> &ParserState<'s>;
    fn state_mut(&mut self) -> &mut ParserState<'s>;

    // ========================================================================
    // Marks and positions
    // ========================================================================

    fn mark(&self) -> usize {
        self.state().mark()
    }

    fn reset(&mut self, mark: usize) {
        self.state_mut().reset(mark);
    }

    fn start_position(&mut self, mark: usize) -> Position {
        self.state_mut().start_position(mark)
    }

    fn end_position(&self) -> Position {
        self.state().end_position()
    }

    fn has_error(&self) -> bool {
        self.state().has_error()
    }

    fn call_invalid_rules(&self) -> bool {
        self.state().call_invalid_rules()
    }

    // ========================================================================
    // Rule drivers
    // ========================================================================

    /// Run a rule body without memoization. On failure the mark is restored.
    fn plain_rule<T>(&mut self, body: impl FnOnce(&mut Self) -> Option<T>) -> Option<T> {
        if self.has_error() {
            return None;
        }
        if !self.state_mut().enter() {
            self.state_mut().exit();
            return None;
        }
        let mark = self.mark();
        let result = stacker::maybe_grow(STACK_RED_ZONE, STACK_SEGMENT, || body(self));
        let result = if self.has_error() { None } else { result };
        if result.is_none() {
            self.reset(mark);
        }
        self.state_mut().exit();
        result
    }

    /// Run a rule body through the memo table keyed by `(rule, mark)`.
    fn memo_rule<T: Clone + 'static>(&mut self, rule: RuleId, body: impl FnOnce(&mut Self) -> Option<T>) -> Option<T> {
        if self.has_error() {
            return None;
        }
        let mark = self.mark();
        match self.state_mut().memo().lookup::<T>(rule, mark) {
            Ok(Memoized::Hit { value, end }) => {
                self.reset(end);
                return value;
            }
            Ok(Memoized::Miss) => {}
            Err(err) => {
                self.state_mut().raise(err);
                return None;
            }
        }
        let result = self.plain_rule(body);
        if self.has_error() {
            return None;
        }
        let end = self.mark();
        self.state_mut().memo().store(rule, mark, result.clone(), end);
        result
    }

    /// Grow-the-seed driver for the leader of a left-recursive cycle.
    ///
    /// The memo entry at `(rule, mark)` is seeded with FAIL, then the body is re-run from `mark`
    /// for as long as each attempt ends strictly further than the previous best. The loop runs at
    /// most once per remaining token.
    fn left_rec_rule<T: Clone + 'static>(&mut self, rule: RuleId, body: impl Fn(&mut Self) -> Option<T>) -> Option<T> {
        if self.has_error() {
            return None;
        }
        let mark = self.mark();
        match self.state_mut().memo().lookup::<T>(rule, mark) {
            Ok(Memoized::Hit { value, end }) => {
                self.reset(end);
                return value;
            }
            Ok(Memoized::Miss) => {}
            Err(err) => {
                self.state_mut().raise(err);
                return None;
            }
        }
        if !self.state_mut().enter() {
            self.state_mut().exit();
            return None;
        }

        let mut result: Option<T> = None;
        let mut resmark = mark;
        let mut rounds = 0usize;
        loop {
            self.state_mut().memo().store(rule, mark, result.clone(), resmark);
            self.reset(mark);
            let raw = stacker::maybe_grow(STACK_RED_ZONE, STACK_SEGMENT, || body(self));
            if self.has_error() {
                self.state_mut().exit();
                return None;
            }
            if raw.is_none() || self.mark() <= resmark {
                break;
            }
            resmark = self.mark();
            result = raw;
            rounds += 1;
        }
        tracing::trace!(rule, mark, rounds, "left recursion settled");
        self.reset(resmark);
        self.state_mut().exit();
        result
    }

    // ========================================================================
    // Token matching
    // ========================================================================

    /// Consume the current token if `accept` holds, otherwise record `expected` at this mark.
    fn expect_where(&mut self, expected: Expected, accept: impl FnOnce(&ParserState<'s>, &Token) -> bool) -> Option<Token> {
        let mark = self.mark();
        let state = self.state_mut();
        // Fill first; matching itself only needs shared access.
        let _ = state.current();
        let state_ref: &ParserState<'s> = state;
        let ok = state_ref
            .stream()
            .tokens()
            .get(mark)
            .is_some_and(|tok| accept(state_ref, tok));
        if ok {
            state.advance()
        } else {
            state.record_expected(mark, expected);
            None
        }
    }

    /// Match a token by kind (`NEWLINE`, `NUMBER`, an exact operator, ...).
    fn expect_kind(&mut self, kind: TokenKind) -> Option<Token> {
        self.expect_where(Expected::Kind(kind), |_, tok| tok.kind == kind)
    }

    fn expect_op(&mut self, op: OpKind) -> Option<Token> {
        self.expect_kind(TokenKind::Op(op))
    }

    /// Match a reserved keyword.
    fn expect_keyword(&mut self, keyword: &'static str) -> Option<Token> {
        self.expect_where(Expected::Keyword(keyword), |_, tok| tok.is_name(keyword))
    }

    /// Match a soft keyword: a NAME with this text, when the soft keyword is enabled.
    fn expect_soft_keyword(&mut self, keyword: &'static str) -> Option<Token> {
        self.expect_where(Expected::SoftKeyword(keyword), |state, tok| {
            tok.is_name(keyword) && state.is_soft_keyword(keyword)
        })
    }

    /// Match a NAME that is not a reserved keyword.
    fn name_token(&mut self) -> Option<Token> {
        self.expect_where(Expected::Kind(TokenKind::Name), |state, tok| {
            tok.kind == TokenKind::Name && !state.is_keyword(&tok.text)
        })
    }

    /// Match any enabled soft keyword.
    fn soft_keyword_token(&mut self) -> Option<Token> {
        self.expect_where(Expected::Kind(TokenKind::Name), |state, tok| {
            tok.kind == TokenKind::Name && state.is_soft_keyword(&tok.text)
        })
    }

    /// A forced item: its failure is an immediate `expected '...'` error at the current token.
    fn forced<T>(&mut self, result: Option<T>, expected: &str) -> Option<T> {
        if result.is_some() || self.has_error() {
            return result;
        }
        let state = self.state_mut();
        let (start, end) = match state.current() {
            Some(tok) => (tok.start, tok.end),
            None => {
                let at = state.end_position();
                (at, at)
            }
        };
        state.raise(RuntimeError::new(
            ErrorKind::InvalidSyntaxInContext,
            format!("expected {expected}"),
            start,
            end,
        ));
        None
    }

    /// Evaluate `item` without consuming input. Returns whether the lookahead holds.
    fn lookahead<T>(&mut self, positive: bool, item: impl FnOnce(&mut Self) -> Option<T>) -> bool {
        let mark = self.mark();
        let matched = item(self).is_some();
        self.reset(mark);
        matched == positive
    }

    /// Record an error raised by an action and fail the current rule.
    fn raise_error<T>(&mut self, kind: ErrorKind, message: impl Into<String>, start: Position, end: Position) -> Option<T> {
        self.state_mut().raise(RuntimeError::new(kind, message, start, end));
        None
    }
}
