//! Output buffer with indentation tracking.

/// Spaces per indentation level in unparsed source.
pub const INDENT_WIDTH: usize = 4;

/// Builds unparsed source line by line.
pub struct SourceWriter {
    output: String,
    indent_level: usize,
    at_line_start: bool,
}

impl SourceWriter {
    pub fn new() -> Self {
        Self {
            output: String::new(),
            indent_level: 0,
            at_line_start: true,
        }
    }

    pub fn finish(self) -> String {
        self.output
    }

    pub fn indent(&mut self) {
        self.indent_level += 1;
    }

    pub fn dedent(&mut self) {
        self.indent_level = self.indent_level.saturating_sub(1);
    }

    fn write_indent(&mut self) {
        if self.at_line_start {
            self.output.push_str(&" ".repeat(self.indent_level * INDENT_WIDTH));
            self.at_line_start = false;
        }
    }

    /// Write text, indenting first if a line is starting.
    pub fn write(&mut self, s: &str) {
        if s.is_empty() {
            return;
        }
        self.write_indent();
        self.output.push_str(s);
    }

    pub fn newline(&mut self) {
        self.output.push('\n');
        self.at_line_start = true;
    }
}

impl Default for SourceWriter {
    fn default() -> Self {
        Self::new()
    }
}
