//! Meta-language lexer.
//!
//! Newlines are not tokens. Instead each token records whether it starts in column 0, which is
//! how the parser finds where one rule ends and the next begins.
//!
//! Two token classes carry raw host text and are lexed by bracket matching rather than by the
//! meta-language rules:
//! - `{ ... }` actions (string and char literals inside are skipped so braces in them don't count),
//! - `[ ... ]` type annotations directly after a rule name in column 0.

use crate::errors::{GrammarError, GrammarResult};
use crate::grammar::{Quote, Span};

#[derive(Debug, Clone, PartialEq)]
pub enum MetaTokenKind {
    Name(String),
    String { value: String, quote: Quote },
    /// Raw text of a `{ ... }` action, without the braces.
    Action(String),
    /// Raw text of a `[ ... ]` rule type, without the brackets.
    Type(String),
    Colon,
    Bar,
    LParen,
    RParen,
    LBracket,
    RBracket,
    Question,
    Star,
    Plus,
    Dot,
    Amp,
    AmpAmp,
    Bang,
    Tilde,
    Equals,
    At,
    Eof,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MetaToken {
    pub kind: MetaTokenKind,
    pub span: Span,
    /// The token starts in column 0.
    pub at_line_start: bool,
}

pub struct MetaLexer<'a> {
    source: &'a str,
    pos: usize,
    tokens: Vec<MetaToken>,
}

impl<'a> MetaLexer<'a> {
    pub fn new(source: &'a str) -> Self {
        Self {
            source,
            pos: 0,
            tokens: Vec::new(),
        }
    }

    pub fn tokenize(mut self) -> GrammarResult<Vec<MetaToken>> {
        loop {
            self.skip_trivia();
            let start = self.pos;
            let at_line_start = start == 0 || self.source.as_bytes().get(start - 1) == Some(&b'\n');
            let Some(c) = self.peek() else {
                self.push(MetaTokenKind::Eof, start, false);
                return Ok(self.tokens);
            };
            self.bump();
            let kind = match c {
                ':' => MetaTokenKind::Colon,
                '|' => MetaTokenKind::Bar,
                '(' => MetaTokenKind::LParen,
                ')' => MetaTokenKind::RParen,
                '[' if self.previous_is_rule_name() => self.scan_type(start)?,
                '[' => MetaTokenKind::LBracket,
                ']' => MetaTokenKind::RBracket,
                '?' => MetaTokenKind::Question,
                '*' => MetaTokenKind::Star,
                '+' => MetaTokenKind::Plus,
                '.' => MetaTokenKind::Dot,
                '&' if self.peek() == Some('&') => {
                    self.bump();
                    MetaTokenKind::AmpAmp
                }
                '&' => MetaTokenKind::Amp,
                '!' => MetaTokenKind::Bang,
                '~' => MetaTokenKind::Tilde,
                '=' => MetaTokenKind::Equals,
                '@' => MetaTokenKind::At,
                '{' => self.scan_action(start)?,
                '\'' => self.scan_string(start, '\'', Quote::Single)?,
                '"' => self.scan_string(start, '"', Quote::Double)?,
                c if c.is_ascii_alphabetic() || c == '_' => {
                    while self.peek().is_some_and(|c| c.is_ascii_alphanumeric() || c == '_') {
                        self.bump();
                    }
                    MetaTokenKind::Name(self.source[start..self.pos].to_string())
                }
                other => {
                    return Err(GrammarError::syntax(
                        format!("unexpected character {other:?}"),
                        Span::new(start, self.pos),
                    ));
                }
            };
            self.push(kind, start, at_line_start);
        }
    }

    // ========================================================================
    // Character handling
    // ========================================================================

    fn peek(&self) -> Option<char> {
        self.source[self.pos..].chars().next()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        Some(c)
    }

    fn push(&mut self, kind: MetaTokenKind, start: usize, at_line_start: bool) {
        self.tokens.push(MetaToken {
            kind,
            span: Span::new(start, self.pos),
            at_line_start,
        });
    }

    fn skip_trivia(&mut self) {
        while let Some(c) = self.peek() {
            if c == '#' {
                while self.peek().is_some_and(|c| c != '\n') {
                    self.bump();
                }
            } else if c.is_whitespace() {
                self.bump();
            } else {
                break;
            }
        }
    }

    /// A `[` directly after a column-0 rule name opens a type annotation.
    fn previous_is_rule_name(&self) -> bool {
        matches!(
            self.tokens.last(),
            Some(MetaToken { kind: MetaTokenKind::Name(_), at_line_start: true, span }) if span.end + 1 == self.pos
        )
    }

    // ========================================================================
    // Raw host text
    // ========================================================================

    fn scan_type(&mut self, start: usize) -> GrammarResult<MetaTokenKind> {
        let body_start = self.pos;
        let mut depth = 1usize;
        while let Some(c) = self.bump() {
            match c {
                '[' => depth += 1,
                ']' => {
                    depth -= 1;
                    if depth == 0 {
                        let text = self.source[body_start..self.pos - 1].trim().to_string();
                        return Ok(MetaTokenKind::Type(text));
                    }
                }
                _ => {}
            }
        }
        Err(GrammarError::syntax("unterminated type annotation", Span::new(start, self.pos)))
    }

    fn scan_action(&mut self, start: usize) -> GrammarResult<MetaTokenKind> {
        let body_start = self.pos;
        let mut depth = 1usize;
        while let Some(c) = self.bump() {
            match c {
                '{' => depth += 1,
                '}' => {
                    depth -= 1;
                    if depth == 0 {
                        let text = self.source[body_start..self.pos - 1].trim().to_string();
                        return Ok(MetaTokenKind::Action(text));
                    }
                }
                '"' => self.skip_host_string(start)?,
                '\'' => self.skip_host_char(),
                _ => {}
            }
        }
        Err(GrammarError::syntax("unterminated action", Span::new(start, self.pos)))
    }

    /// Skip a Rust string literal inside an action.
    fn skip_host_string(&mut self, action_start: usize) -> GrammarResult<()> {
        while let Some(c) = self.bump() {
            match c {
                '\\' => {
                    self.bump();
                }
                '"' => return Ok(()),
                _ => {}
            }
        }
        Err(GrammarError::syntax(
            "unterminated string literal in action",
            Span::new(action_start, self.pos),
        ))
    }

    /// Skip a Rust char literal (`'{'`, `'\''`); a lifetime or label is left alone.
    fn skip_host_char(&mut self) {
        let rest = &self.source[self.pos..];
        let mut chars = rest.chars();
        match (chars.next(), chars.next(), chars.next()) {
            (Some('\\'), Some(escaped), _) => {
                let body = 1 + escaped.len_utf8();
                if let Some(end) = rest[body..].find('\'') {
                    self.pos += body + end + 1;
                }
            }
            (Some(c), Some('\''), _) => {
                self.pos += c.len_utf8() + 1;
            }
            _ => {}
        }
    }

    // ========================================================================
    // Strings
    // ========================================================================

    fn scan_string(&mut self, start: usize, q: char, quote: Quote) -> GrammarResult<MetaTokenKind> {
        let triple: String = std::iter::repeat_n(q, 3).collect();
        if self.source[self.pos..].starts_with(&triple[..2]) {
            self.pos += 2;
            let Some(end) = self.source[self.pos..].find(&triple) else {
                return Err(GrammarError::syntax(
                    "unterminated triple-quoted string",
                    Span::new(start, self.source.len()),
                ));
            };
            let value = self.source[self.pos..self.pos + end].to_string();
            self.pos += end + 3;
            return Ok(MetaTokenKind::String { value, quote });
        }

        let mut value = String::new();
        while let Some(c) = self.bump() {
            match c {
                '\\' => match self.bump() {
                    Some(escaped) if escaped == q || escaped == '\\' => value.push(escaped),
                    Some(other) => {
                        value.push('\\');
                        value.push(other);
                    }
                    None => break,
                },
                '\n' => break,
                c if c == q => return Ok(MetaTokenKind::String { value, quote }),
                c => value.push(c),
            }
        }
        Err(GrammarError::syntax("unterminated string", Span::new(start, self.pos)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(src: &str) -> Vec<MetaTokenKind> {
        MetaLexer::new(src)
            .tokenize()
            .unwrap()
            .into_iter()
            .map(|t| t.kind)
            .collect()
    }

    #[test]
    fn test_rule_type_and_action_are_raw() {
        let toks = kinds("sum[Vec<Expr>]: a=x { Foo { bar: \"}\" } }");
        assert_eq!(toks[0], MetaTokenKind::Name("sum".into()));
        assert_eq!(toks[1], MetaTokenKind::Type("Vec<Expr>".into()));
        assert_eq!(toks[2], MetaTokenKind::Colon);
        assert_eq!(toks[6], MetaTokenKind::Action("Foo { bar: \"}\" }".into()));
        assert_eq!(toks[7], MetaTokenKind::Eof);
    }

    #[test]
    fn test_bracket_inside_alternative_is_optional() {
        let toks = kinds("r: ['x']");
        assert!(toks.contains(&MetaTokenKind::LBracket));
    }

    #[test]
    fn test_char_literal_braces_in_action() {
        let toks = kinds("r: a { c == '{' }");
        assert_eq!(toks[3], MetaTokenKind::Action("c == '{'".into()));
    }

    #[test]
    fn test_line_start_flags() {
        let toks = MetaLexer::new("a: b\n  | c\nd: e").tokenize().unwrap();
        let starts: Vec<bool> = toks.iter().map(|t| t.at_line_start).collect();
        assert_eq!(starts, vec![true, false, false, false, false, true, false, false, false]);
    }

    #[test]
    fn test_forced_and_lookahead_tokens() {
        assert_eq!(
            kinds("&&':' &x !y ~")[..5],
            [
                MetaTokenKind::AmpAmp,
                MetaTokenKind::String {
                    value: ":".into(),
                    quote: Quote::Single
                },
                MetaTokenKind::Amp,
                MetaTokenKind::Name("x".into()),
                MetaTokenKind::Bang,
            ]
        );
    }

    #[test]
    fn test_triple_quoted_meta_value() {
        let toks = kinds("@subheader '''use a::b;\nuse c;'''");
        assert_eq!(
            toks[2],
            MetaTokenKind::String {
                value: "use a::b;\nuse c;".into(),
                quote: Quote::Single
            }
        );
    }

    #[test]
    fn test_unterminated_action_is_error() {
        let err = MetaLexer::new("r: a { x").tokenize().unwrap_err();
        assert!(err.message.contains("unterminated action"));
    }
}
