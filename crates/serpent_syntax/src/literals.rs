//! Decoding of `NUMBER` and `STRING` token text.
//!
//! - [`parse_number`]: underscores, radix prefixes, floats, imaginary literals and integers
//!   beyond `i64` (kept as decimal digit strings).
//! - [`split_string`], [`decode_string`], [`decode_bytes`]: prefixes, quotes and escapes.
//! - [`parse_fstring`]: splits an f-string into literal text and replacement fields. Field
//!   expressions are returned as byte ranges into the token text; the parser re-enters the grammar
//!   for them.
//!
//! Errors are plain messages; callers attach the token's location.

use std::ops::Range;

use crate::ast::{Constant, Conversion, Int};

// ============================================================================
// Numbers
// ============================================================================

/// Value of a `NUMBER` token.
pub fn parse_number(text: &str) -> Result<Constant, String> {
    let clean: String = text.chars().filter(|&c| c != '_').collect();
    let invalid = || format!("invalid number literal '{text}'");

    if let Some(imag) = clean.strip_suffix(['j', 'J']) {
        let imag: f64 = imag.parse().map_err(|_| invalid())?;
        return Ok(Constant::Complex { real: 0.0, imag });
    }

    let lower = clean.to_ascii_lowercase();
    let radix = match lower.get(..2) {
        Some("0x") => Some(16),
        Some("0o") => Some(8),
        Some("0b") => Some(2),
        _ => None,
    };
    if let Some(radix) = radix {
        return integer(&lower[2..], radix).ok_or_else(invalid).map(Constant::Int);
    }
    if lower.contains(['.', 'e']) {
        return lower.parse::<f64>().map(Constant::Float).map_err(|_| invalid());
    }
    integer(&lower, 10).ok_or_else(invalid).map(Constant::Int)
}

fn integer(digits: &str, radix: u32) -> Option<Int> {
    if digits.is_empty() {
        return None;
    }
    if let Ok(v) = i64::from_str_radix(digits, radix) {
        return Some(Int::Small(v));
    }
    to_decimal(digits, radix).map(Int::Big)
}

/// Convert digits in `radix` to a decimal string, for values beyond `i64`.
fn to_decimal(digits: &str, radix: u32) -> Option<String> {
    const BASE: u64 = 1_000_000_000;
    // Little-endian limbs in base 10^9.
    let mut limbs: Vec<u64> = vec![0];
    for c in digits.chars() {
        let mut carry = u64::from(c.to_digit(radix)?);
        for limb in &mut limbs {
            let v = *limb * u64::from(radix) + carry;
            *limb = v % BASE;
            carry = v / BASE;
        }
        while carry > 0 {
            limbs.push(carry % BASE);
            carry /= BASE;
        }
    }
    let mut out = String::new();
    let mut iter = limbs.iter().rev();
    if let Some(top) = iter.next() {
        out.push_str(&top.to_string());
    }
    for limb in iter {
        out.push_str(&format!("{limb:09}"));
    }
    Some(out)
}

// ============================================================================
// String prefixes and quotes
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Prefix {
    pub raw: bool,
    pub bytes: bool,
    pub unicode: bool,
    pub fstring: bool,
}

/// A `STRING` token split into prefix, quotes and body.
#[derive(Debug, Clone, Copy)]
pub struct StringLiteral<'t> {
    pub prefix: Prefix,
    pub body: &'t str,
    /// Byte offset of `body` within the token text.
    pub body_offset: usize,
    pub quote: char,
    pub triple: bool,
}

pub fn split_string(text: &str) -> StringLiteral<'_> {
    let mut prefix = Prefix::default();
    let quote_at = text.find(['\'', '"']).unwrap_or(text.len());
    for c in text[..quote_at].chars() {
        match c.to_ascii_lowercase() {
            'r' => prefix.raw = true,
            'b' => prefix.bytes = true,
            'u' => prefix.unicode = true,
            'f' => prefix.fstring = true,
            _ => {}
        }
    }
    let rest = &text[quote_at..];
    let quote = rest.chars().next().unwrap_or('"');
    let triple = rest.len() >= 6 && rest.starts_with(&quote.to_string().repeat(3));
    let q = if triple { 3 } else { 1 };
    let body_end = rest.len().saturating_sub(q).max(q.min(rest.len()));
    let body = rest.get(q..body_end).unwrap_or_default();
    StringLiteral {
        prefix,
        body,
        body_offset: quote_at + q,
        quote,
        triple,
    }
}

// ============================================================================
// Escapes
// ============================================================================

/// Decode the body of a `str` literal.
pub fn decode_string(body: &str, raw: bool) -> Result<String, String> {
    if raw || !body.contains('\\') {
        return Ok(body.to_string());
    }
    let mut out = String::with_capacity(body.len());
    let mut chars = body.char_indices().peekable();
    while let Some((at, c)) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        let Some((_, esc)) = chars.next() else {
            out.push('\\');
            break;
        };
        match esc {
            '\n' => {}
            '\r' => {
                chars.next_if(|&(_, c)| c == '\n');
            }
            '\\' | '\'' | '"' => out.push(esc),
            'a' => out.push('\x07'),
            'b' => out.push('\x08'),
            'f' => out.push('\x0c'),
            'n' => out.push('\n'),
            'r' => out.push('\r'),
            't' => out.push('\t'),
            'v' => out.push('\x0b'),
            '0'..='7' => {
                let value = octal_escape(esc, &mut chars);
                out.push(char::from_u32(value).unwrap_or('\u{fffd}'));
            }
            'x' | 'u' | 'U' => {
                let width = match esc {
                    'x' => 2,
                    'u' => 4,
                    _ => 8,
                };
                let value = hex_escape(width, &mut chars).ok_or_else(|| {
                    format!(
                        "(unicode error) 'unicodeescape' codec can't decode bytes in position {at}-{}: truncated \\{}{} escape",
                        at + 1 + width.min(body.len() - at - 1),
                        esc,
                        "X".repeat(width)
                    )
                })?;
                let c = char::from_u32(value).ok_or_else(|| {
                    format!(
                        "(unicode error) 'unicodeescape' codec can't decode bytes in position {at}-{}: illegal Unicode character",
                        at + 1 + width
                    )
                })?;
                out.push(c);
            }
            // Named escapes are kept as written.
            'N' => {
                out.push_str("\\N");
            }
            other => {
                out.push('\\');
                out.push(other);
            }
        }
    }
    Ok(out)
}

/// Decode the body of a `bytes` literal.
pub fn decode_bytes(body: &str, raw: bool) -> Result<Vec<u8>, String> {
    if !body.is_ascii() {
        return Err("bytes can only contain ASCII literal characters".to_string());
    }
    if raw {
        return Ok(body.as_bytes().to_vec());
    }
    let mut out = Vec::with_capacity(body.len());
    let mut chars = body.char_indices().peekable();
    while let Some((at, c)) = chars.next() {
        if c != '\\' {
            out.push(c as u8);
            continue;
        }
        let Some((_, esc)) = chars.next() else {
            out.push(b'\\');
            break;
        };
        match esc {
            '\n' => {}
            '\r' => {
                chars.next_if(|&(_, c)| c == '\n');
            }
            '\\' | '\'' | '"' => out.push(esc as u8),
            'a' => out.push(0x07),
            'b' => out.push(0x08),
            'f' => out.push(0x0c),
            'n' => out.push(b'\n'),
            'r' => out.push(b'\r'),
            't' => out.push(b'\t'),
            'v' => out.push(0x0b),
            '0'..='7' => out.push((octal_escape(esc, &mut chars) & 0xff) as u8),
            'x' => {
                let value =
                    hex_escape(2, &mut chars).ok_or_else(|| format!("(value error) invalid \\x escape at position {at}"))?;
                out.push(value as u8);
            }
            other => {
                out.push(b'\\');
                out.push(other as u8);
            }
        }
    }
    Ok(out)
}

type Chars<'b> = std::iter::Peekable<std::str::CharIndices<'b>>;

fn octal_escape(first: char, chars: &mut Chars<'_>) -> u32 {
    let mut value = first.to_digit(8).unwrap_or(0);
    for _ in 0..2 {
        match chars.next_if(|&(_, c)| c.is_digit(8)) {
            Some((_, c)) => value = value * 8 + c.to_digit(8).unwrap_or(0),
            None => break,
        }
    }
    value
}

fn hex_escape(width: usize, chars: &mut Chars<'_>) -> Option<u32> {
    let mut value = 0u32;
    for _ in 0..width {
        let (_, c) = chars.next_if(|&(_, c)| c.is_ascii_hexdigit())?;
        value = value.checked_mul(16)? + c.to_digit(16)?;
    }
    Some(value)
}

// ============================================================================
// f-strings
// ============================================================================

/// A piece of an f-string.
#[derive(Debug, Clone, PartialEq)]
pub enum FStringPart {
    /// Decoded literal text.
    Literal(String),
    Field(FStringField),
}

/// A replacement field `{expr=!c:spec}`.
#[derive(Debug, Clone, PartialEq)]
pub struct FStringField {
    /// Byte range of the expression within the token text.
    pub expr: Range<usize>,
    /// Literal text emitted before the value for the `=` specifier.
    pub debug_text: Option<String>,
    pub conversion: Conversion,
    pub spec: Option<Vec<FStringPart>>,
}

/// Split the text of an f-string token into literal parts and replacement fields.
pub fn parse_fstring(text: &str) -> Result<Vec<FStringPart>, String> {
    let lit = split_string(text);
    let mut parser = FStringScanner {
        text,
        raw: lit.prefix.raw,
        pos: lit.body_offset,
        end: lit.body_offset + lit.body.len(),
    };
    let parts = parser.parts(0)?;
    if parser.pos < parser.end {
        return Err("f-string: single '}' is not allowed".to_string());
    }
    Ok(parts)
}

const MAX_SPEC_NESTING: usize = 2;

struct FStringScanner<'t> {
    text: &'t str,
    raw: bool,
    pos: usize,
    end: usize,
}

impl FStringScanner<'_> {
    fn peek(&self) -> Option<char> {
        self.text[self.pos..self.end].chars().next()
    }

    fn peek2(&self) -> Option<char> {
        self.text[self.pos..self.end].chars().nth(1)
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        Some(c)
    }

    /// Literal text and fields, up to the end or (inside a format spec) an unmatched `}`.
    fn parts(&mut self, nesting: usize) -> Result<Vec<FStringPart>, String> {
        let mut parts = Vec::new();
        let mut literal = String::new();
        while let Some(c) = self.peek() {
            match c {
                '{' if self.peek2() == Some('{') => {
                    self.pos += 2;
                    literal.push('{');
                }
                '{' => {
                    self.flush(&mut literal, &mut parts)?;
                    self.bump();
                    parts.push(FStringPart::Field(self.field(nesting)?));
                }
                '}' if self.peek2() == Some('}') && nesting == 0 => {
                    self.pos += 2;
                    literal.push('}');
                }
                '}' if nesting > 0 => break,
                '}' => return Err("f-string: single '}' is not allowed".to_string()),
                '\\' if !self.raw => {
                    literal.push(c);
                    self.bump();
                    if self.text[self.pos..self.end].starts_with("N{") {
                        while let Some(n) = self.bump() {
                            literal.push(n);
                            if n == '}' {
                                break;
                            }
                        }
                    } else if let Some(next) = self.bump() {
                        literal.push(next);
                    }
                }
                _ => {
                    literal.push(c);
                    self.bump();
                }
            }
        }
        self.flush(&mut literal, &mut parts)?;
        Ok(parts)
    }

    fn flush(&self, literal: &mut String, parts: &mut Vec<FStringPart>) -> Result<(), String> {
        if !literal.is_empty() {
            parts.push(FStringPart::Literal(decode_string(literal, self.raw)?));
            literal.clear();
        }
        Ok(())
    }

    /// A replacement field; the opening `{` is already consumed.
    fn field(&mut self, nesting: usize) -> Result<FStringField, String> {
        if nesting >= MAX_SPEC_NESTING {
            return Err("f-string: expressions nested too deeply".to_string());
        }
        let expr_start = self.pos;
        let mut brackets: Vec<char> = Vec::new();
        let mut debug = false;
        loop {
            let Some(c) = self.peek() else {
                return Err("f-string: expecting '}'".to_string());
            };
            match c {
                '\\' => return Err("f-string expression part cannot include a backslash".to_string()),
                '#' => return Err("f-string expression part cannot include '#'".to_string()),
                '\'' | '"' => self.skip_quoted(c)?,
                '(' | '[' | '{' => {
                    brackets.push(c);
                    self.bump();
                }
                ')' | ']' | '}' if !brackets.is_empty() => {
                    let open = brackets.pop().unwrap_or('(');
                    let expected = match open {
                        '(' => ')',
                        '[' => ']',
                        _ => '}',
                    };
                    if c != expected {
                        return Err(format!(
                            "f-string: closing parenthesis '{c}' does not match opening parenthesis '{open}'"
                        ));
                    }
                    self.bump();
                }
                ')' | ']' => return Err(format!("f-string: unmatched '{c}'")),
                '}' => break,
                '!' | '=' | '<' | '>' if self.peek2() == Some('=') => self.pos += 2,
                ':' | '!' if brackets.is_empty() => break,
                '=' if brackets.is_empty() => {
                    debug = true;
                    break;
                }
                _ => {
                    self.bump();
                }
            }
        }
        let expr = expr_start..self.pos;
        if self.text[expr.clone()].trim().is_empty() {
            return Err("f-string: empty expression not allowed".to_string());
        }

        let mut debug_text = None;
        if debug {
            self.bump();
            while self.peek().is_some_and(char::is_whitespace) {
                self.bump();
            }
            debug_text = Some(self.text[expr_start..self.pos].to_string());
        }

        let mut conversion = Conversion::None;
        if self.peek() == Some('!') {
            self.bump();
            let c = self.bump().ok_or("f-string: expecting '}'")?;
            conversion = Conversion::from_char(c)
                .filter(|_| matches!(self.peek(), Some(':' | '}')))
                .ok_or("f-string: invalid conversion character: expected 's', 'r', or 'a'")?;
        }

        let mut spec = None;
        if self.peek() == Some(':') {
            self.bump();
            spec = Some(self.parts(nesting + 1)?);
        }

        if self.bump() != Some('}') {
            return Err("f-string: expecting '}'".to_string());
        }
        if debug_text.is_some() && conversion == Conversion::None && spec.is_none() {
            conversion = Conversion::Repr;
        }
        Ok(FStringField {
            expr,
            debug_text,
            conversion,
            spec,
        })
    }

    fn skip_quoted(&mut self, quote: char) -> Result<(), String> {
        let triple = self.text[self.pos..self.end].starts_with(&quote.to_string().repeat(3));
        let q = if triple { 3 } else { 1 };
        self.pos += q;
        let closing = quote.to_string().repeat(q);
        match self.text[self.pos..self.end].find(&closing) {
            Some(at) => {
                self.pos += at + q;
                Ok(())
            }
            None => Err("f-string: unterminated string".to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_numbers() {
        assert_eq!(parse_number("1_000").unwrap(), Constant::Int(Int::Small(1000)));
        assert_eq!(parse_number("0xff").unwrap(), Constant::Int(Int::Small(255)));
        assert_eq!(parse_number("0o17").unwrap(), Constant::Int(Int::Small(15)));
        assert_eq!(parse_number("0b101").unwrap(), Constant::Int(Int::Small(5)));
        assert_eq!(parse_number("1.5e3").unwrap(), Constant::Float(1500.0));
        assert_eq!(parse_number(".5").unwrap(), Constant::Float(0.5));
        assert_eq!(
            parse_number("2j").unwrap(),
            Constant::Complex { real: 0.0, imag: 2.0 }
        );
    }

    #[test]
    fn test_big_integers_keep_their_digits() {
        assert_eq!(
            parse_number("123456789012345678901234567890").unwrap(),
            Constant::Int(Int::Big("123456789012345678901234567890".into()))
        );
        assert_eq!(
            parse_number("0xffffffffffffffffff").unwrap(),
            Constant::Int(Int::Big("4722366482869645213695".into()))
        );
    }

    #[test]
    fn test_split_string() {
        let s = split_string("Rb'''x'''");
        assert!(s.prefix.raw && s.prefix.bytes && s.triple);
        assert_eq!(s.body, "x");
        assert_eq!(s.body_offset, 5);
        assert_eq!(split_string("''").body, "");
        assert_eq!(split_string("''''''").body, "");
    }

    #[test]
    fn test_escapes() {
        assert_eq!(decode_string(r"a\tb\x41é\101\q", false).unwrap(), "a\tbAé A\\q".replace(' ', ""));
        assert_eq!(decode_string(r"a\nb", true).unwrap(), r"a\nb");
        assert_eq!(decode_string("a\\\nb", false).unwrap(), "ab");
        assert_eq!(decode_string(r"\N{DASH}", false).unwrap(), r"\N{DASH}");
        assert!(decode_string(r"\x4", false).unwrap_err().contains("truncated \\xXX escape"));
        assert_eq!(decode_bytes(r"a\x00\n", false).unwrap(), b"a\x00\n".to_vec());
        assert_eq!(
            decode_bytes("é", false).unwrap_err(),
            "bytes can only contain ASCII literal characters"
        );
    }

    fn fields(text: &str) -> Vec<FStringPart> {
        parse_fstring(text).unwrap()
    }

    #[test]
    fn test_fstring_fields() {
        let parts = fields("f'a{x!r:>{w}}b{{c}}'");
        assert_eq!(parts.len(), 3);
        assert_eq!(parts[0], FStringPart::Literal("a".into()));
        let FStringPart::Field(field) = &parts[1] else {
            panic!("expected field");
        };
        assert_eq!(&"f'a{x!r:>{w}}b{{c}}'"[field.expr.clone()], "x");
        assert_eq!(field.conversion, Conversion::Repr);
        let spec = field.spec.as_ref().unwrap();
        assert_eq!(spec[0], FStringPart::Literal(">".into()));
        assert!(matches!(spec[1], FStringPart::Field(_)));
        assert_eq!(parts[2], FStringPart::Literal("b{c}".into()));
    }

    #[test]
    fn test_fstring_debug_specifier() {
        let parts = fields("f'{x = }'");
        let FStringPart::Field(field) = &parts[0] else {
            panic!("expected field");
        };
        assert_eq!(field.debug_text.as_deref(), Some("x = "));
        assert_eq!(field.conversion, Conversion::Repr);

        let parts = fields("f'{a == b}'");
        let FStringPart::Field(field) = &parts[0] else {
            panic!("expected field");
        };
        assert_eq!(field.debug_text, None);
    }

    #[test]
    fn test_fstring_errors() {
        assert_eq!(parse_fstring("f'{}'").unwrap_err(), "f-string: empty expression not allowed");
        assert_eq!(parse_fstring("f'}'").unwrap_err(), "f-string: single '}' is not allowed");
        assert_eq!(parse_fstring("f'{x'").unwrap_err(), "f-string: expecting '}'");
        assert_eq!(
            parse_fstring("f'{x!z}'").unwrap_err(),
            "f-string: invalid conversion character: expected 's', 'r', or 'a'"
        );
        assert_eq!(
            parse_fstring("f'{x:{y:{z}}}'").unwrap_err(),
            "f-string: expressions nested too deeply"
        );
    }
}
