//! Line-oriented text buffer with an indentation counter.

use core::fmt;

/// Accumulates lines, prefixing each with the current indentation.
///
/// Anything `Display` can be appended; multi-line input is split and every
/// line is re-indented, so nested constructs compose by appending their
/// rendered text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndentedWriter {
    indent: String,
    level: usize,
    lines: Vec<String>,
}

impl Default for IndentedWriter {
    fn default() -> Self {
        Self::new()
    }
}

impl IndentedWriter {
    #[must_use]
    pub fn new() -> Self {
        Self::with_indent("    ")
    }

    #[must_use]
    pub fn with_indent(indent: impl Into<String>) -> Self {
        Self {
            indent: indent.into(),
            level: 0,
            lines: Vec::new(),
        }
    }

    pub fn increase(&mut self) {
        self.level += 1;
    }

    /// Saturates at zero.
    pub fn decrease(&mut self) {
        self.level = self.level.saturating_sub(1);
    }

    pub fn append(&mut self, content: impl fmt::Display) {
        let text = content.to_string();
        if text.is_empty() {
            self.push_line("");
            return;
        }
        for line in text.lines() {
            self.push_line(line);
        }
    }

    fn push_line(&mut self, line: &str) {
        let line = line.trim_end();
        if line.is_empty() {
            // no trailing whitespace on blank lines
            self.lines.push(String::new());
        } else {
            self.lines
                .push(format!("{}{line}", self.indent.repeat(self.level)));
        }
    }

    #[must_use]
    pub fn lines(&self) -> &[String] {
        &self.lines
    }
}

impl fmt::Display for IndentedWriter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for line in &self.lines {
            writeln!(f, "{line}")?;
        }
        Ok(())
    }
}
