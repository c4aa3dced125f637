//! Line starts: blank-line skipping and the INDENT/DEDENT stacks.

use serpent_core::{ErrorKind, RuntimeError, Token, TokenKind};

use super::{MAX_INDENT_LEVEL, Tokenizer, type_comment_body, type_ignore_tag};

const TAB_SIZE: u32 = 8;

impl Tokenizer<'_> {
    /// Process the start of a physical line outside brackets.
    ///
    /// Blank and comment-only lines are consumed whole. For the first line with code, the
    /// indentation is compared against the stack and INDENT/DEDENT tokens are queued.
    pub(super) fn line_start(&mut self) -> Result<(), RuntimeError> {
        loop {
            let (col, alt_col, width) = self.measure_indent();
            let after = &self.rest()[width..];
            match after.chars().next() {
                None => {
                    self.pos += width;
                    self.at_line_start = false;
                    return Ok(());
                }
                Some('\n' | '\r') => {
                    self.pos += width;
                    self.eat_line_break();
                }
                Some('#') => {
                    let line_end = after.find(['\n', '\r']).unwrap_or(after.len());
                    let comment = &after[..line_end];
                    let body = if self.type_comments { type_comment_body(comment) } else { None };
                    match body {
                        // A type comment on its own line is part of the grammar (function
                        // signatures), so the line is not blank; its indentation is ignored.
                        Some(body) if type_ignore_tag(body).is_none() => {
                            self.pos += width;
                            self.at_line_start = false;
                            return Ok(());
                        }
                        Some(body) => {
                            let start = self.here_after(width);
                            self.pos += width + line_end;
                            let tag = type_ignore_tag(body).unwrap_or_default();
                            self.pending.push_back(Token::new(TokenKind::TypeIgnore, tag, start, self.here()));
                        }
                        None => self.pos += width + line_end,
                    }
                    self.eat_line_break();
                }
                Some(_) => {
                    self.pos += width;
                    self.at_line_start = false;
                    return self.indent_to(col, alt_col);
                }
            }
        }
    }

    fn here_after(&self, width: usize) -> serpent_core::Position {
        self.map(self.line, self.pos + width - self.line_start, self.pos + width)
    }

    /// Columns of the leading whitespace (tab size 8, and tab size 1) and its byte width.
    fn measure_indent(&self) -> (u32, u32, usize) {
        let mut col = 0u32;
        let mut alt_col = 0u32;
        let mut width = 0usize;
        for b in self.rest().bytes() {
            match b {
                b' ' => {
                    col += 1;
                    alt_col += 1;
                }
                b'\t' => {
                    col = (col / TAB_SIZE + 1) * TAB_SIZE;
                    alt_col += 1;
                }
                b'\x0c' => {
                    col = 0;
                    alt_col = 0;
                }
                _ => break,
            }
            width += 1;
        }
        (col, alt_col, width)
    }

    fn indent_to(&mut self, col: u32, alt_col: u32) -> Result<(), RuntimeError> {
        let here = self.here();
        let line_begin = self.map(self.line, 0, self.line_start);
        let top = self.indents.last().copied().unwrap_or(0);
        let alt_top = self.alt_indents.last().copied().unwrap_or(0);

        if col == top {
            if alt_col != alt_top {
                return Err(self.inconsistent_tabs());
            }
        } else if col > top {
            if self.indents.len() >= MAX_INDENT_LEVEL {
                return Err(RuntimeError::new(
                    ErrorKind::Indentation,
                    "too many levels of indentation",
                    here,
                    here,
                ));
            }
            if alt_col <= alt_top {
                return Err(self.inconsistent_tabs());
            }
            self.indents.push(col);
            self.alt_indents.push(alt_col);
            let text = &self.src[self.line_start..self.pos];
            self.pending.push_back(Token::new(TokenKind::Indent, text, line_begin, here));
        } else {
            while self.indents.len() > 1 && col < self.indents.last().copied().unwrap_or(0) {
                self.indents.pop();
                self.alt_indents.pop();
                self.pending.push_back(Token::empty(TokenKind::Dedent, here));
            }
            if self.indents.last().copied() != Some(col) {
                return Err(RuntimeError::new(
                    ErrorKind::Indentation,
                    "unindent does not match any outer indentation level",
                    here,
                    here,
                ));
            }
            if self.alt_indents.last().copied() != Some(alt_col) {
                return Err(self.inconsistent_tabs());
            }
        }
        Ok(())
    }

    fn inconsistent_tabs(&self) -> RuntimeError {
        let here = self.here();
        RuntimeError::new(
            ErrorKind::Indentation,
            "inconsistent use of tabs and spaces in indentation",
            here,
            here,
        )
    }
}
