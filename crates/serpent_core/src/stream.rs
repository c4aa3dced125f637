//! Lazy, random-access token stream.
//!
//! A [`TokenStream`] pulls tokens from a [`TokenSource`] on demand and retains every token it has
//! produced, so backtracking (`reset`) is O(1) and never re-runs the tokenizer.
//!
//! ## Notes
//! - `TYPE_IGNORE` tokens are side-channel tokens: the stream strips them out of the indexable
//!   sequence and keeps them in [`TokenStream::type_ignores`].
//! - After the source reports an error, the stream stops pulling and [`TokenStream::peek`] answers
//!   `None` for every index beyond what was already produced.

use crate::runtime::RuntimeError;
use crate::tokens::{Token, TokenKind};

/// Producer of tokens for a [`TokenStream`].
///
/// Implementors return tokens in source order and finish with exactly one `EndMarker`. Lexical
/// errors are reported once, as `Err`; the stream never asks again afterwards.
pub trait TokenSource {
    fn next_token(&mut self) -> Result<Token, RuntimeError>;
}

/// A [`TokenSource`] over an already materialised token vector.
///
/// Used by `parse_tokens` callers that tokenized up front, and by tests.
#[derive(Debug, Clone)]
pub struct VecSource {
    tokens: std::vec::IntoIter<Token>,
    last_end: Option<Token>,
}

impl VecSource {
    pub fn new(tokens: Vec<Token>) -> Self {
        Self {
            tokens: tokens.into_iter(),
            last_end: None,
        }
    }
}

impl TokenSource for VecSource {
    fn next_token(&mut self) -> Result<Token, RuntimeError> {
        match self.tokens.next() {
            Some(tok) => {
                self.last_end = Some(tok.clone());
                Ok(tok)
            }
            None => {
                // A vector without an explicit ENDMARKER ends at the last token's end.
                let at = self.last_end.as_ref().map(|t| t.end).unwrap_or_default();
                Ok(Token::empty(TokenKind::EndMarker, at))
            }
        }
    }
}

/// The lazily filled, indexable token sequence consumed by the parser runtime.
pub struct TokenStream<'s> {
    source: Box<dyn TokenSource + 's>,
    tokens: Vec<Token>,
    type_ignores: Vec<Token>,
    pos: usize,
    done: bool,
    failure: Option<RuntimeError>,
}

impl<'s> TokenStream<'s> {
    pub fn new(source: impl TokenSource + 's) -> Self {
        Self {
            source: Box::new(source),
            tokens: Vec::new(),
            type_ignores: Vec::new(),
            pos: 0,
            done: false,
            failure: None,
        }
    }

    pub fn from_tokens(tokens: Vec<Token>) -> TokenStream<'static> {
        TokenStream::new(VecSource::new(tokens))
    }

    /// Pull from the source until index `i` exists or the source is exhausted.
    fn fill_to(&mut self, i: usize) {
        while self.tokens.len() <= i && !self.done {
            match self.source.next_token() {
                Ok(tok) if tok.kind == TokenKind::TypeIgnore => self.type_ignores.push(tok),
                Ok(tok) => {
                    if tok.kind == TokenKind::EndMarker {
                        self.done = true;
                    }
                    self.tokens.push(tok);
                }
                Err(err) => {
                    tracing::debug!(index = self.tokens.len(), error = %err, "token source failed");
                    self.failure = Some(err);
                    self.done = true;
                }
            }
        }
    }

    /// The token at absolute index `i`, producing it if needed.
    ///
    /// Returns `None` when `i` lies past the ENDMARKER or the source failed before reaching it.
    pub fn peek(&mut self, i: usize) -> Option<&Token> {
        self.fill_to(i);
        self.tokens.get(i)
    }

    /// The token at the current position.
    pub fn current(&mut self) -> Option<&Token> {
        self.peek(self.pos)
    }

    /// Consume the current token and return its index.
    pub fn advance(&mut self) -> Option<usize> {
        self.fill_to(self.pos);
        if self.pos < self.tokens.len() {
            self.pos += 1;
            Some(self.pos - 1)
        } else {
            None
        }
    }

    pub fn mark(&self) -> usize {
        self.pos
    }

    /// Rewind (or fast-forward) to an index that was already produced.
    pub fn reset(&mut self, i: usize) -> Result<(), RuntimeError> {
        if i > self.tokens.len() {
            return Err(RuntimeError::internal(format!(
                "reset to unobserved token index {i} (only {} produced)",
                self.tokens.len()
            )));
        }
        self.pos = i;
        Ok(())
    }

    /// Number of tokens produced so far.
    pub fn filled(&self) -> usize {
        self.tokens.len()
    }

    /// Tokens produced so far.
    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    pub fn type_ignores(&self) -> &[Token] {
        &self.type_ignores
    }

    /// The error the source reported, if any.
    pub fn failure(&self) -> Option<&RuntimeError> {
        self.failure.as_ref()
    }

    pub fn take_failure(&mut self) -> Option<RuntimeError> {
        self.failure.take()
    }

    /// Whether the last produced token is the ENDMARKER.
    pub fn at_end_marker(&self) -> bool {
        self.tokens.last().is_some_and(|t| t.kind == TokenKind::EndMarker)
    }

    /// Drain the source completely, for tools that want every token.
    pub fn fill_all(&mut self) -> Result<&[Token], RuntimeError> {
        while !self.done {
            let next = self.tokens.len();
            self.fill_to(next);
        }
        match &self.failure {
            Some(err) => Err(err.clone()),
            None => Ok(&self.tokens),
        }
    }
}

impl std::fmt::Debug for TokenStream<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenStream")
            .field("filled", &self.tokens.len())
            .field("pos", &self.pos)
            .field("done", &self.done)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::ErrorKind;
    use crate::tokens::{OpKind, Position};

    fn tok(kind: TokenKind, text: &str, col: u32) -> Token {
        let start = Position::new(1, col, col as usize);
        let end = Position::new(1, col + text.len() as u32, col as usize + text.len());
        Token::new(kind, text, start, end)
    }

    struct CountingSource {
        produced: std::rc::Rc<std::cell::Cell<usize>>,
        limit: usize,
    }

    impl TokenSource for CountingSource {
        fn next_token(&mut self) -> Result<Token, RuntimeError> {
            let n = self.produced.get();
            self.produced.set(n + 1);
            if n == self.limit {
                Ok(tok(TokenKind::EndMarker, "", n as u32))
            } else {
                Ok(tok(TokenKind::Name, "x", n as u32))
            }
        }
    }

    #[test]
    fn test_stream_is_lazy_and_retains_tokens() {
        let produced = std::rc::Rc::new(std::cell::Cell::new(0));
        let mut stream = TokenStream::new(CountingSource {
            produced: produced.clone(),
            limit: 10,
        });
        assert_eq!(produced.get(), 0);
        assert!(stream.peek(2).is_some());
        assert_eq!(produced.get(), 3);

        stream.advance();
        stream.advance();
        stream.reset(0).unwrap();
        assert!(stream.peek(1).is_some());
        assert_eq!(produced.get(), 3, "rewinding must not re-run the source");
    }

    #[test]
    fn test_peek_past_end_marker_refuses() {
        let mut stream = TokenStream::from_tokens(vec![tok(TokenKind::Name, "a", 0)]);
        assert_eq!(stream.peek(1).map(|t| t.kind), Some(TokenKind::EndMarker));
        assert!(stream.peek(2).is_none());
        assert!(stream.at_end_marker());
    }

    #[test]
    fn test_reset_to_unobserved_index_is_internal_error() {
        let mut stream = TokenStream::from_tokens(vec![tok(TokenKind::Name, "a", 0)]);
        let err = stream.reset(5).unwrap_err();
        assert_eq!(err.kind, ErrorKind::InternalInvariant);
    }

    #[test]
    fn test_type_ignores_are_side_channel() {
        let mut stream = TokenStream::from_tokens(vec![
            tok(TokenKind::Name, "a", 0),
            tok(TokenKind::TypeIgnore, "# type: ignore", 2),
            tok(TokenKind::Op(OpKind::Semi), ";", 17),
        ]);
        assert_eq!(stream.peek(1).map(|t| t.kind), Some(TokenKind::Op(OpKind::Semi)));
        assert_eq!(stream.type_ignores().len(), 1);
    }

    #[test]
    fn test_source_failure_stops_the_stream() {
        struct Failing(bool);
        impl TokenSource for Failing {
            fn next_token(&mut self) -> Result<Token, RuntimeError> {
                if self.0 {
                    return Err(RuntimeError::new(
                        ErrorKind::Lexical,
                        "bad",
                        Position::start(),
                        Position::start(),
                    ));
                }
                self.0 = true;
                Ok(tok(TokenKind::Name, "a", 0))
            }
        }
        let mut stream = TokenStream::new(Failing(false));
        assert!(stream.peek(0).is_some());
        assert!(stream.peek(1).is_none());
        assert_eq!(stream.failure().map(|e| e.kind), Some(ErrorKind::Lexical));
        assert!(stream.fill_all().is_err());
    }

    #[derive(Debug, Clone)]
    enum Op {
        Advance,
        Peek(usize),
        Rewind(usize),
    }

    fn op() -> impl proptest::strategy::Strategy<Value = Op> {
        use proptest::prelude::*;
        prop_oneof![
            Just(Op::Advance),
            (0usize..40).prop_map(Op::Peek),
            (0usize..40).prop_map(Op::Rewind),
        ]
    }

    proptest::proptest! {
        /// Any interleaving of consumption, lookahead, and backtracking sees the same tokens
        #[test]
        fn backtracking_replays_identical_tokens(
            len in 0usize..20,
            ops in proptest::collection::vec(op(), 0..60),
        ) {
            let tokens: Vec<Token> = (0..len).map(|i| tok(TokenKind::Name, "x", i as u32)).collect();
            let mut stream = TokenStream::from_tokens(tokens);
            let mut marks = vec![0usize];
            for op in ops {
                match op {
                    Op::Advance => {
                        let before = stream.mark();
                        match stream.advance() {
                            Some(i) => {
                                proptest::prop_assert_eq!(i, before);
                                marks.push(stream.mark());
                            }
                            None => proptest::prop_assert_eq!(before, len + 1),
                        }
                    }
                    Op::Peek(i) => {
                        let kind = stream.peek(i).map(|t| t.kind);
                        let expected = match i.cmp(&len) {
                            std::cmp::Ordering::Less => Some(TokenKind::Name),
                            std::cmp::Ordering::Equal => Some(TokenKind::EndMarker),
                            std::cmp::Ordering::Greater => None,
                        };
                        proptest::prop_assert_eq!(kind, expected);
                    }
                    Op::Rewind(k) => {
                        let target = marks[k % marks.len()];
                        proptest::prop_assert!(stream.reset(target).is_ok());
                        proptest::prop_assert_eq!(stream.mark(), target);
                    }
                }
                proptest::prop_assert!(stream.mark() <= stream.filled());
                proptest::prop_assert!(stream.filled() <= len + 1);
            }
            for (i, t) in stream.tokens().iter().enumerate().take(len) {
                proptest::prop_assert_eq!(t.start.col as usize, i);
            }
        }
    }
}
