//! String literal scanning.
//!
//! The token text is the whole literal, prefix and quotes included. Decoding happens in
//! `crate::literals`.

use serpent_core::{Position, RuntimeError, Token, TokenKind};

use super::Tokenizer;

/// Whether `word` is a valid string prefix (`r`, `b`, `u`, `f` and their legal pairs).
pub(super) fn is_string_prefix(word: &str) -> bool {
    matches!(
        word.to_ascii_lowercase().as_str(),
        "r" | "u" | "b" | "f" | "br" | "rb" | "fr" | "rf"
    )
}

impl Tokenizer<'_> {
    /// Scan a quoted literal starting at the opening quote. `start` is the start of the prefix.
    pub(super) fn string(&mut self, start_offset: usize, start: Position) -> Result<Token, RuntimeError> {
        let quote = self.bump().unwrap_or('"');
        let triple = self.peek() == Some(quote) && self.peek_nth(1) == Some(quote);
        if triple {
            self.pos += 2 * quote.len_utf8();
        }

        loop {
            match self.peek() {
                None => return Err(self.unterminated(triple, start)),
                Some(c) if c == quote => {
                    self.bump();
                    if !triple {
                        break;
                    }
                    if self.peek() == Some(quote) && self.peek_nth(1) == Some(quote) {
                        self.pos += 2 * quote.len_utf8();
                        break;
                    }
                }
                Some('\\') => {
                    self.bump();
                    if !self.eat_line_break() && self.bump().is_none() {
                        return Err(self.unterminated(triple, start));
                    }
                }
                Some('\n' | '\r') => {
                    if !triple {
                        return Err(self.unterminated(triple, start));
                    }
                    self.eat_line_break();
                }
                Some(_) => {
                    self.bump();
                }
            }
        }
        Ok(self.token(TokenKind::String, start_offset, start))
    }

    fn unterminated(&self, triple: bool, start: Position) -> RuntimeError {
        let mut line = self.current_line();
        // A final line break belongs to the last line of the file.
        if triple && self.peek().is_none() && self.pos == self.line_start && line > start.line {
            line -= 1;
        }
        let what = if triple { "triple-quoted string literal" } else { "string literal" };
        self.error(format!("unterminated {what} (detected at line {line})"), start, start)
    }
}

#[cfg(test)]
mod tests {
    use super::super::tokenize;

    #[test]
    fn test_unterminated_single_quoted() {
        let err = tokenize("x = 'abc\ny = 1\n", false).unwrap_err();
        assert_eq!(err.message, "unterminated string literal (detected at line 1)");
        assert_eq!((err.start.line, err.start.col), (1, 4));
    }

    #[test]
    fn test_unterminated_triple_quoted_points_at_opening_quote() {
        let err = tokenize("x = 1\ns = '''abc\ndef\n", false).unwrap_err();
        assert_eq!(err.message, "unterminated triple-quoted string literal (detected at line 3)");
        assert_eq!((err.start.line, err.start.col), (2, 4));
    }

    #[test]
    fn test_triple_quoted_spans_lines() {
        let toks = tokenize("s = \"\"\"a\n\"b\"\n\"\"\"\nt", false).unwrap();
        assert_eq!(toks[2].text, "\"\"\"a\n\"b\"\n\"\"\"");
        assert_eq!(toks[2].end.line, 3);
        assert_eq!(toks[4].text, "t");
        assert_eq!(toks[4].start.line, 4);
    }

    #[test]
    fn test_escaped_quote_and_continuation_inside_string() {
        let toks = tokenize("'a\\'b' 'c\\\nd'", false).unwrap();
        assert_eq!(toks[0].text, "'a\\'b'");
        assert_eq!(toks[1].text, "'c\\\nd'");
    }
}
