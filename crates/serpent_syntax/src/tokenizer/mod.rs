//! Tokenizer for Python source.
//!
//! Produces the token stream the generated parser consumes, one token at a time, through the
//! [`TokenSource`] contract:
//! - `NAME`, `NUMBER`, `STRING` and exact operators,
//! - `NEWLINE` at the end of each logical line, plus an implicit one at end of file,
//! - `INDENT`/`DEDENT` from the indentation stack,
//! - `TYPE_COMMENT`/`TYPE_IGNORE` when type comments are enabled,
//! - a single `ENDMARKER`.
//!
//! ## Module Structure
//!
//! - `indent` - line starts, blank lines and the indentation stacks
//! - `numbers` - numeric literal scanning
//! - `strings` - string prefixes and quoted literal scanning
//!
//! ## Notes
//! - Lexical errors are returned once as `Err` and end the stream. Messages follow CPython.
//! - Columns are UTF-8 byte offsets within the line.
//! - f-strings are scanned as whole `STRING` tokens. The parser re-tokenizes each replacement
//!   field with [`Tokenizer::with_origin`] and [`Tokenizer::with_implicit_parens`], so field
//!   positions land at their place in the enclosing file.

mod indent;
mod numbers;
mod strings;

use std::collections::VecDeque;

use serpent_core::tokens::MAX_OP_LEN;
use serpent_core::{ErrorKind, OpKind, Position, RuntimeError, Token, TokenKind, TokenSource};

/// Deepest bracket nesting the tokenizer accepts.
pub const MAX_PAREN_LEVEL: usize = 200;

/// Deepest indentation the tokenizer accepts.
pub const MAX_INDENT_LEVEL: usize = 100;

// ============================================================================
// TOKENIZER STATE
// ----------------------------------------------------------------------------
// [line start] → measure indent → INDENT/DEDENT* → [in line]
//                   ↓ blank/comment line: skip     ↓
//                                            '(' → push bracket (newlines ignored)
//                                            '\n' → NEWLINE → [line start]
//                                            EOF → NEWLINE? DEDENT* ENDMARKER
// ============================================================================

/// Pull-based Python tokenizer over a source buffer.
pub struct Tokenizer<'a> {
    src: &'a str,
    pos: usize,
    line: u32,
    line_start: usize,
    /// Where this buffer starts in the enclosing file (f-string fields).
    origin: Position,
    indents: Vec<u32>,
    /// Indentation measured with tab size 1, for the tabs/spaces consistency check.
    alt_indents: Vec<u32>,
    brackets: Vec<(OpKind, Position)>,
    pending: VecDeque<Token>,
    at_line_start: bool,
    line_has_tokens: bool,
    type_comments: bool,
    implicit_parens: bool,
    eof: Option<Position>,
}

impl<'a> Tokenizer<'a> {
    pub fn new(source: &'a str) -> Self {
        let pos = if source.starts_with('\u{feff}') { '\u{feff}'.len_utf8() } else { 0 };
        Self {
            src: source,
            pos,
            line: 1,
            line_start: pos,
            origin: Position::start(),
            indents: vec![0],
            alt_indents: vec![0],
            brackets: Vec::new(),
            pending: VecDeque::new(),
            at_line_start: true,
            line_has_tokens: false,
            type_comments: false,
            implicit_parens: false,
            eof: None,
        }
    }

    /// Emit `# type:` comments as `TYPE_COMMENT`/`TYPE_IGNORE` tokens instead of skipping them.
    pub fn with_type_comments(mut self, enabled: bool) -> Self {
        self.type_comments = enabled;
        self
    }

    /// Report positions as if the buffer started at `origin` of an enclosing file.
    pub fn with_origin(mut self, origin: Position) -> Self {
        self.origin = origin;
        self
    }

    /// Tokenize as if the whole buffer were inside parentheses: no `NEWLINE`, `INDENT` or
    /// `DEDENT` tokens are produced.
    pub fn with_implicit_parens(mut self) -> Self {
        self.implicit_parens = true;
        self.at_line_start = false;
        self
    }

    // ========================================================================
    // Character access
    // ========================================================================

    fn peek(&self) -> Option<char> {
        self.src[self.pos..].chars().next()
    }

    fn peek_nth(&self, n: usize) -> Option<char> {
        self.src[self.pos..].chars().nth(n)
    }

    fn rest(&self) -> &'a str {
        &self.src[self.pos..]
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        Some(c)
    }

    fn eat(&mut self, expected: char) -> bool {
        if self.peek() == Some(expected) {
            self.pos += expected.len_utf8();
            true
        } else {
            false
        }
    }

    /// Record that a line break was just consumed.
    fn start_new_line(&mut self) {
        self.line += 1;
        self.line_start = self.pos;
    }

    /// Consume `\n`, `\r\n` or `\r` if present.
    fn eat_line_break(&mut self) -> bool {
        let broke = if self.eat('\r') {
            self.eat('\n');
            true
        } else {
            self.eat('\n')
        };
        if broke {
            self.start_new_line();
        }
        broke
    }

    fn in_brackets(&self) -> bool {
        self.implicit_parens || !self.brackets.is_empty()
    }

    // ========================================================================
    // Positions and token construction
    // ========================================================================

    fn map(&self, line: u32, col: usize, offset: usize) -> Position {
        let col = if line == 1 { col + self.origin.col as usize } else { col };
        Position::new(line + self.origin.line - 1, col as u32, offset + self.origin.offset)
    }

    fn here(&self) -> Position {
        self.map(self.line, self.pos - self.line_start, self.pos)
    }

    /// The line a lexical error is detected on, in file coordinates.
    fn current_line(&self) -> u32 {
        self.line + self.origin.line - 1
    }

    fn token(&mut self, kind: TokenKind, start_offset: usize, start: Position) -> Token {
        if !kind.is_layout() {
            self.line_has_tokens = true;
        }
        Token::new(kind, &self.src[start_offset..self.pos], start, self.here())
    }

    fn error(&self, message: impl Into<String>, start: Position, end: Position) -> RuntimeError {
        RuntimeError::new(ErrorKind::Lexical, message, start, end)
    }

    // ========================================================================
    // Main scanning dispatch
    // ========================================================================

    /// Scan one item of the current line. `None` means something was skipped.
    fn scan(&mut self) -> Result<Option<Token>, RuntimeError> {
        while matches!(self.peek(), Some(' ' | '\t' | '\x0c')) {
            self.pos += 1;
        }
        let start_offset = self.pos;
        let start = self.here();
        let Some(c) = self.peek() else {
            self.finish()?;
            return Ok(None);
        };

        match c {
            '#' => Ok(self.comment(start_offset, start)),
            '\\' => {
                self.continuation()?;
                Ok(None)
            }
            '\n' | '\r' => {
                if self.in_brackets() {
                    self.eat_line_break();
                    return Ok(None);
                }
                // The NEWLINE token ends where the line break ends, on its own line.
                if self.eat('\r') {
                    self.eat('\n');
                } else {
                    self.pos += 1;
                }
                let tok = Token::new(TokenKind::Newline, &self.src[start_offset..self.pos], start, self.here());
                self.start_new_line();
                self.at_line_start = true;
                self.line_has_tokens = false;
                Ok(Some(tok))
            }
            '0'..='9' => self.number(start_offset, start).map(Some),
            '.' if self.peek_nth(1).is_some_and(|d| d.is_ascii_digit()) => self.number(start_offset, start).map(Some),
            '"' | '\'' => self.string(start_offset, start).map(Some),
            c if is_identifier_start(c) => self.name_or_string(start_offset, start).map(Some),
            _ => self.operator(start_offset, start).map(Some),
        }
    }

    fn comment(&mut self, start_offset: usize, start: Position) -> Option<Token> {
        while !matches!(self.peek(), None | Some('\n' | '\r')) {
            self.bump();
        }
        if !self.type_comments {
            return None;
        }
        let text = &self.src[start_offset..self.pos];
        let body = type_comment_body(text)?;
        let end = self.here();
        if let Some(tag) = type_ignore_tag(body) {
            return Some(Token::new(TokenKind::TypeIgnore, tag, start, end));
        }
        self.line_has_tokens = true;
        Some(Token::new(TokenKind::TypeComment, body, start, end))
    }

    fn continuation(&mut self) -> Result<(), RuntimeError> {
        self.bump();
        if self.eat_line_break() {
            return Ok(());
        }
        let at = self.here();
        match self.peek() {
            None => Err(self.error("unexpected EOF while parsing", at, at)),
            Some(_) => Err(self.error("unexpected character after line continuation character", at, at)),
        }
    }

    fn name_or_string(&mut self, start_offset: usize, start: Position) -> Result<Token, RuntimeError> {
        while self.peek().is_some_and(is_identifier_continue) {
            self.bump();
        }
        let word = &self.src[start_offset..self.pos];
        if matches!(self.peek(), Some('"' | '\'')) && strings::is_string_prefix(word) {
            return self.string(start_offset, start);
        }
        Ok(self.token(TokenKind::Name, start_offset, start))
    }

    fn operator(&mut self, start_offset: usize, start: Position) -> Result<Token, RuntimeError> {
        let rest = self.rest();
        let max = rest.bytes().take(MAX_OP_LEN).take_while(u8::is_ascii).count();
        let found = (1..=max)
            .rev()
            .find_map(|len| OpKind::from_spelling(&rest[..len]).map(|op| (op, len)));

        let Some((op, len)) = found else {
            let c = self.peek().unwrap_or('\0');
            self.bump();
            let message = if c.is_control() || c == '\u{a0}' {
                format!("invalid non-printable character U+{:04X}", c as u32)
            } else if c.is_ascii() {
                "invalid syntax".to_string()
            } else {
                format!("invalid character '{c}' (U+{:04X})", c as u32)
            };
            return Err(self.error(message, start, self.here()));
        };
        self.pos += len;

        match op {
            OpKind::Lpar | OpKind::Lsqb | OpKind::Lbrace => {
                if self.brackets.len() >= MAX_PAREN_LEVEL {
                    return Err(self.error("too many nested parentheses", start, self.here()));
                }
                self.brackets.push((op, start));
            }
            OpKind::Rpar | OpKind::Rsqb | OpKind::Rbrace => match self.brackets.pop() {
                None => {
                    return Err(self.error(format!("unmatched '{}'", op.as_str()), start, self.here()));
                }
                Some((open, at)) if open.closing() != Some(op) => {
                    let mut message = format!(
                        "closing parenthesis '{}' does not match opening parenthesis '{}'",
                        op.as_str(),
                        open.as_str()
                    );
                    if at.line != start.line {
                        message.push_str(&format!(" on line {}", at.line));
                    }
                    return Err(self.error(message, start, self.here()));
                }
                Some(_) => {}
            },
            _ => {}
        }
        Ok(self.token(TokenKind::Op(op), start_offset, start))
    }

    /// Queue the end-of-file tokens: an implicit NEWLINE, closing DEDENTs and the ENDMARKER.
    fn finish(&mut self) -> Result<(), RuntimeError> {
        if !self.implicit_parens {
            if let Some((op, at)) = self.brackets.last() {
                return Err(self.error(format!("'{}' was never closed", op.as_str()), *at, *at));
            }
        }
        let here = self.here();
        if self.line_has_tokens && !self.implicit_parens {
            self.pending.push_back(Token::empty(TokenKind::Newline, here));
            self.line_has_tokens = false;
        }
        let eof = if self.pos == self.line_start || self.implicit_parens {
            here
        } else {
            self.map(self.line + 1, 0, self.pos)
        };
        for _ in 1..self.indents.len() {
            self.pending.push_back(Token::empty(TokenKind::Dedent, eof));
        }
        self.indents.truncate(1);
        self.alt_indents.truncate(1);
        self.pending.push_back(Token::empty(TokenKind::EndMarker, eof));
        self.eof = Some(eof);
        Ok(())
    }
}

impl TokenSource for Tokenizer<'_> {
    fn next_token(&mut self) -> Result<Token, RuntimeError> {
        loop {
            if let Some(tok) = self.pending.pop_front() {
                return Ok(tok);
            }
            if let Some(eof) = self.eof {
                return Ok(Token::empty(TokenKind::EndMarker, eof));
            }
            if self.at_line_start {
                self.line_start()?;
                continue;
            }
            if let Some(tok) = self.scan()? {
                return Ok(tok);
            }
        }
    }
}

// ============================================================================
// Helper functions
// ============================================================================

fn is_identifier_start(c: char) -> bool {
    c == '_' || c.is_alphabetic()
}

fn is_identifier_continue(c: char) -> bool {
    c == '_' || c.is_alphanumeric()
}

/// The text after `# type:` in a comment, if it is a type comment.
fn type_comment_body(comment: &str) -> Option<&str> {
    let body = comment.strip_prefix('#')?.trim_start();
    Some(body.strip_prefix("type:")?.trim_start())
}

/// The tag after `ignore` in a type comment body, if it is a `type: ignore` comment.
fn type_ignore_tag(body: &str) -> Option<&str> {
    let tag = body.strip_prefix("ignore")?;
    match tag.chars().next() {
        Some(c) if c.is_ascii_alphanumeric() || c == '_' => None,
        _ => Some(tag),
    }
}

/// Tokenize a whole source buffer, up to and including the ENDMARKER.
#[tracing::instrument(skip_all, fields(source_len = source.len()))]
pub fn tokenize(source: &str, type_comments: bool) -> Result<Vec<Token>, RuntimeError> {
    let mut tokenizer = Tokenizer::new(source).with_type_comments(type_comments);
    let mut tokens = Vec::new();
    loop {
        let tok = tokenizer.next_token()?;
        let done = tok.kind == TokenKind::EndMarker;
        tokens.push(tok);
        if done {
            return Ok(tokens);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(src: &str) -> Vec<String> {
        tokenize(src, false)
            .unwrap()
            .iter()
            .map(|t| match t.kind {
                TokenKind::Name | TokenKind::Number | TokenKind::String => format!("{}:{}", t.kind, t.text),
                TokenKind::Op(op) => op.as_str().to_string(),
                kind => kind.to_string(),
            })
            .collect()
    }

    fn lex_error(src: &str) -> RuntimeError {
        tokenize(src, false).unwrap_err()
    }

    #[test]
    fn test_empty_source_is_just_endmarker() {
        assert_eq!(kinds(""), vec!["ENDMARKER"]);
        assert_eq!(kinds("# only a comment\n\n   \n"), vec!["ENDMARKER"]);
    }

    #[test]
    fn test_implicit_newline_at_eof() {
        assert_eq!(kinds("x"), vec!["NAME:x", "NEWLINE", "ENDMARKER"]);
        assert_eq!(kinds("x\n"), vec!["NAME:x", "NEWLINE", "ENDMARKER"]);
    }

    #[test]
    fn test_indent_and_dedent() {
        let src = "if x:\n    y\n\n    # c\n    z\nw\n";
        assert_eq!(
            kinds(src),
            vec![
                "NAME:if", "NAME:x", ":", "NEWLINE", "INDENT", "NAME:y", "NEWLINE", "NAME:z", "NEWLINE", "DEDENT",
                "NAME:w", "NEWLINE", "ENDMARKER",
            ]
        );
    }

    #[test]
    fn test_dedents_at_eof() {
        let src = "if a:\n  if b:\n    c";
        let toks = kinds(src);
        assert_eq!(&toks[toks.len() - 4..], &["NEWLINE", "DEDENT", "DEDENT", "ENDMARKER"]);
    }

    #[test]
    fn test_newlines_inside_brackets_are_ignored() {
        assert_eq!(
            kinds("f(a,\n  b)\n"),
            vec!["NAME:f", "(", "NAME:a", ",", "NAME:b", ")", "NEWLINE", "ENDMARKER"]
        );
    }

    #[test]
    fn test_longest_operator_match() {
        assert_eq!(
            kinds("a **= b // c -> d := ..."),
            vec!["NAME:a", "**=", "NAME:b", "//", "NAME:c", "->", "NAME:d", ":=", "...", "NEWLINE", "ENDMARKER"]
        );
    }

    #[test]
    fn test_string_prefixes_and_names() {
        assert_eq!(
            kinds("rb'x' f\"{y}\" u'z' bar'q'"),
            vec!["STRING:rb'x'", "STRING:f\"{y}\"", "STRING:u'z'", "NAME:bar", "STRING:'q'", "NEWLINE", "ENDMARKER"]
        );
    }

    #[test]
    fn test_positions_are_byte_columns() {
        let toks = tokenize("é = 1\n", false).unwrap();
        assert_eq!(toks[0].end, Position::new(1, 2, 2));
        assert_eq!(toks[1].start, Position::new(1, 3, 3));
    }

    #[test]
    fn test_backslash_continuation() {
        assert_eq!(kinds("a = \\\n  1\n"), vec!["NAME:a", "=", "NUMBER:1", "NEWLINE", "ENDMARKER"]);
        assert_eq!(
            lex_error("a = \\ 1\n").message,
            "unexpected character after line continuation character"
        );
        assert_eq!(lex_error("a = \\").message, "unexpected EOF while parsing");
    }

    #[test]
    fn test_bracket_errors() {
        assert_eq!(lex_error("a)").message, "unmatched ')'");
        assert_eq!(
            lex_error("(a]").message,
            "closing parenthesis ']' does not match opening parenthesis '('"
        );
        assert_eq!(
            lex_error("(a,\nb]").message,
            "closing parenthesis ']' does not match opening parenthesis '(' on line 1"
        );
        let err = lex_error("x = [1,\n2");
        assert_eq!(err.message, "'[' was never closed");
        assert_eq!(err.start, Position::new(1, 4, 4));
        let deep = "(".repeat(MAX_PAREN_LEVEL + 1);
        assert_eq!(lex_error(&deep).message, "too many nested parentheses");
    }

    #[test]
    fn test_indentation_errors() {
        let err = lex_error("if x:\n    a\n  b\n");
        assert_eq!(err.kind, ErrorKind::Indentation);
        assert_eq!(err.message, "unindent does not match any outer indentation level");

        let err = lex_error("if x:\n\ta\n        b\n");
        assert_eq!(err.message, "inconsistent use of tabs and spaces in indentation");

        let mut src = String::new();
        for depth in 0..=MAX_INDENT_LEVEL {
            src.push_str(&" ".repeat(depth));
            src.push_str("if x:\n");
        }
        assert_eq!(lex_error(&src).message, "too many levels of indentation");
    }

    #[test]
    fn test_invalid_characters() {
        assert_eq!(lex_error("a € b").message, "invalid character '€' (U+20AC)");
        assert_eq!(lex_error("a $ b").message, "invalid syntax");
    }

    #[test]
    fn test_type_comments_when_enabled() {
        let toks = tokenize("x = 1  # type: int\n# type: ignore[misc]\n", true).unwrap();
        let tc: Vec<_> = toks
            .iter()
            .filter(|t| matches!(t.kind, TokenKind::TypeComment | TokenKind::TypeIgnore))
            .map(|t| (t.kind, t.text.as_str()))
            .collect();
        assert_eq!(tc, vec![(TokenKind::TypeComment, "int"), (TokenKind::TypeIgnore, "[misc]")]);
        assert!(tokenize("x = 1  # type: int\n", false)
            .unwrap()
            .iter()
            .all(|t| t.kind != TokenKind::TypeComment));
    }

    #[test]
    fn test_origin_and_implicit_parens() {
        let mut tok = Tokenizer::new("a +\n b").with_origin(Position::new(3, 10, 40)).with_implicit_parens();
        let a = tok.next_token().unwrap();
        assert_eq!(a.start, Position::new(3, 10, 40));
        tok.next_token().unwrap();
        let b = tok.next_token().unwrap();
        assert_eq!(b.start, Position::new(4, 1, 45));
        assert_eq!(tok.next_token().unwrap().kind, TokenKind::EndMarker);
    }
}
