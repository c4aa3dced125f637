//! Numeric literal scanning with CPython's error messages.

use serpent_core::{Position, RuntimeError, Token, TokenKind};

use super::{Tokenizer, is_identifier_continue};

/// Keywords that may directly follow a number (`1if x else y`).
const KEYWORDS_AFTER_NUMBER: &[&str] = &["and", "else", "for", "if", "in", "is", "not", "or"];

impl Tokenizer<'_> {
    pub(super) fn number(&mut self, start_offset: usize, start: Position) -> Result<Token, RuntimeError> {
        if self.peek() == Some('.') {
            self.bump();
            self.decimal_tail(start)?;
            return self.float_tail(start_offset, start);
        }

        if self.eat('0') {
            let radix = match self.peek() {
                Some('x' | 'X') => Some((16, "hexadecimal")),
                Some('o' | 'O') => Some((8, "octal")),
                Some('b' | 'B') => Some((2, "binary")),
                _ => None,
            };
            if let Some((radix, name)) = radix {
                self.bump();
                self.radix_digits(radix, name, start)?;
                self.end_of_number(name, start)?;
                return Ok(self.token(TokenKind::Number, start_offset, start));
            }

            let mut nonzero = false;
            loop {
                match self.peek() {
                    Some('0') => {
                        self.bump();
                    }
                    Some('_') => {
                        self.bump();
                        if !self.peek().is_some_and(|c| c.is_ascii_digit()) {
                            return Err(self.invalid("decimal", start));
                        }
                    }
                    _ => break,
                }
            }
            if self.peek().is_some_and(|c| c.is_ascii_digit()) {
                nonzero = true;
                self.decimal_tail(start)?;
            }
            if nonzero && !matches!(self.peek(), Some('.' | 'e' | 'E' | 'j' | 'J')) {
                let here = self.here();
                return Err(self.error(
                    "leading zeros in decimal integer literals are not permitted; use an 0o prefix for octal integers",
                    start,
                    here,
                ));
            }
        } else {
            self.decimal_tail(start)?;
        }

        if self.eat('.') {
            if self.peek().is_some_and(|c| c.is_ascii_digit()) {
                self.decimal_tail(start)?;
            }
        }
        self.float_tail(start_offset, start)
    }

    /// Optional exponent and imaginary suffix, then the end-of-number check.
    fn float_tail(&mut self, start_offset: usize, start: Position) -> Result<Token, RuntimeError> {
        if matches!(self.peek(), Some('e' | 'E')) {
            self.bump();
            if matches!(self.peek(), Some('+' | '-')) {
                self.bump();
            }
            if !self.peek().is_some_and(|c| c.is_ascii_digit()) {
                return Err(self.invalid("decimal", start));
            }
            self.decimal_tail(start)?;
        }
        let kind = if matches!(self.peek(), Some('j' | 'J')) {
            self.bump();
            "imaginary"
        } else {
            "decimal"
        };
        self.end_of_number(kind, start)?;
        Ok(self.token(TokenKind::Number, start_offset, start))
    }

    /// Digits with single underscores between them.
    fn decimal_tail(&mut self, start: Position) -> Result<(), RuntimeError> {
        loop {
            while self.peek().is_some_and(|c| c.is_ascii_digit()) {
                self.bump();
            }
            if !self.eat('_') {
                return Ok(());
            }
            if !self.peek().is_some_and(|c| c.is_ascii_digit()) {
                return Err(self.invalid("decimal", start));
            }
        }
    }

    fn radix_digits(&mut self, radix: u32, name: &str, start: Position) -> Result<(), RuntimeError> {
        loop {
            self.eat('_');
            match self.peek() {
                Some(c) if c.is_digit(radix) => {}
                Some(c) if c.is_ascii_digit() => return Err(self.invalid_digit(c, name, start)),
                _ => return Err(self.invalid(name, start)),
            }
            while self.peek().is_some_and(|c| c.is_digit(radix)) {
                self.bump();
            }
            if self.peek() != Some('_') {
                break;
            }
        }
        match self.peek() {
            Some(c) if c.is_ascii_digit() => Err(self.invalid_digit(c, name, start)),
            _ => Ok(()),
        }
    }

    /// A number must not run straight into an identifier, except for a few keywords.
    fn end_of_number(&mut self, kind: &str, start: Position) -> Result<(), RuntimeError> {
        let Some(c) = self.peek() else {
            return Ok(());
        };
        if !is_identifier_continue(c) {
            return Ok(());
        }
        let rest = self.rest();
        let keyword_follows = KEYWORDS_AFTER_NUMBER.iter().any(|kw| {
            rest.strip_prefix(kw)
                .is_some_and(|after| !after.chars().next().is_some_and(is_identifier_continue))
        });
        if keyword_follows {
            return Ok(());
        }
        self.bump();
        Err(self.invalid(kind, start))
    }

    fn invalid(&self, kind: &str, start: Position) -> RuntimeError {
        self.error(format!("invalid {kind} literal"), start, self.here())
    }

    fn invalid_digit(&self, digit: char, kind: &str, start: Position) -> RuntimeError {
        self.error(format!("invalid digit '{digit}' in {kind} literal"), start, self.here())
    }
}

#[cfg(test)]
mod tests {
    use super::super::tokenize;

    fn number(src: &str) -> String {
        let toks = tokenize(src, false).unwrap();
        toks[0].text.clone()
    }

    fn message(src: &str) -> String {
        tokenize(src, false).unwrap_err().message
    }

    #[test]
    fn test_valid_numbers() {
        for src in ["0", "00", "0_0", "1_000", "0x_ff", "0o17", "0b1010", "1.5", "1.", ".5", "1e10", "1E-3", "3j", "1.5e+3J", "0.0"] {
            assert_eq!(number(src), src);
        }
    }

    #[test]
    fn test_keyword_may_follow_number() {
        let toks = tokenize("1if x else 2", false).unwrap();
        assert_eq!(toks[0].text, "1");
        assert_eq!(toks[1].text, "if");
    }

    #[test]
    fn test_number_errors() {
        assert_eq!(message("1_"), "invalid decimal literal");
        assert_eq!(message("1__0"), "invalid decimal literal");
        assert_eq!(message("12abc"), "invalid decimal literal");
        assert_eq!(message("0xg"), "invalid hexadecimal literal");
        assert_eq!(message("0o8"), "invalid digit '8' in octal literal");
        assert_eq!(message("0b102"), "invalid digit '2' in binary literal");
        assert_eq!(message("1jx"), "invalid imaginary literal");
        assert_eq!(
            message("012"),
            "leading zeros in decimal integer literals are not permitted; use an 0o prefix for octal integers"
        );
    }
}
