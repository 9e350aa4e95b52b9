//! Output writer with indentation tracking
//!
//! Accumulates generated Go text line by line.

/// Writer that tracks indentation and builds generated output
#[derive(Debug)]
pub struct SourceWriter {
    /// The output buffer
    output: String,
    /// Current indentation level
    indent_level: usize,
    /// Text of one indentation level
    indent_unit: String,
    /// Whether we're at the start of a line
    at_line_start: bool,
}

impl SourceWriter {
    /// Create a new writer indenting with `indent_unit`
    pub fn new(indent_unit: impl Into<String>) -> Self {
        Self {
            output: String::new(),
            indent_level: 0,
            indent_unit: indent_unit.into(),
            at_line_start: true,
        }
    }

    /// Get the generated output
    pub fn finish(self) -> String {
        self.output
    }

    /// Get the output written so far
    pub fn as_str(&self) -> &str {
        &self.output
    }

    /// Insert `s` at byte offset `at` of the output written so far
    pub fn insert(&mut self, at: usize, s: &str) {
        self.output.insert_str(at, s);
    }

    /// Increase indentation level
    pub fn indent(&mut self) {
        self.indent_level += 1;
    }

    /// Decrease indentation level
    pub fn dedent(&mut self) {
        if self.indent_level > 0 {
            self.indent_level -= 1;
        }
    }

    /// Write indentation if at line start
    fn write_indent(&mut self) {
        if self.at_line_start {
            for _ in 0..self.indent_level {
                self.output.push_str(&self.indent_unit);
            }
            self.at_line_start = false;
        }
    }

    /// Write a string (with auto-indent)
    pub fn write(&mut self, s: &str) {
        if s.is_empty() {
            return;
        }
        self.write_indent();
        self.output.push_str(s);
    }

    /// Write a string and newline
    pub fn writeln(&mut self, s: &str) {
        self.write(s);
        self.newline();
    }

    /// Write just a newline
    pub fn newline(&mut self) {
        self.output.push('\n');
        self.at_line_start = true;
    }

    /// Write multiple blank lines (for spacing between declarations)
    pub fn blank_lines(&mut self, count: usize) {
        for _ in 0..count {
            self.newline();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tab_writer() -> SourceWriter {
        SourceWriter::new("\t")
    }

    // ========================================
    // Write tests
    // ========================================

    #[test]
    fn test_new_writer_empty_output() {
        let writer = tab_writer();
        assert_eq!(writer.as_str(), "");
        assert_eq!(writer.finish(), "");
    }

    #[test]
    fn test_write_empty_string() {
        let mut writer = tab_writer();
        writer.indent();
        writer.write("");
        assert_eq!(writer.finish(), "");
    }

    #[test]
    fn test_write_multiple() {
        let mut writer = tab_writer();
        writer.write("func");
        writer.write(" ");
        writer.write("main()");
        assert_eq!(writer.finish(), "func main()");
    }

    #[test]
    fn test_writeln_empty_string() {
        let mut writer = tab_writer();
        writer.writeln("");
        assert_eq!(writer.finish(), "\n");
    }

    // ========================================
    // Indent/dedent tests
    // ========================================

    #[test]
    fn test_dedent_at_zero_stays_zero() {
        let mut writer = tab_writer();
        writer.dedent();
        writer.writeln("a");
        writer.indent();
        writer.writeln("b");
        assert_eq!(writer.finish(), "a\n\tb\n");
    }

    #[test]
    fn test_indent_affects_output() {
        let mut writer = tab_writer();
        writer.writeln("func main() {");
        writer.indent();
        writer.writeln("return");
        writer.dedent();
        writer.writeln("}");
        assert_eq!(writer.finish(), "func main() {\n\treturn\n}\n");
    }

    #[test]
    fn test_indent_with_spaces() {
        let mut writer = SourceWriter::new("  ");
        writer.indent();
        writer.indent();
        writer.write("x");
        assert_eq!(writer.finish(), "    x");
    }

    #[test]
    fn test_indent_only_once_per_line() {
        let mut writer = tab_writer();
        writer.indent();
        writer.write("a");
        writer.write("b");
        writer.newline();
        assert_eq!(writer.as_str(), "\tab\n");
    }

    #[test]
    fn test_insert_keeps_indentation_state() {
        let mut writer = tab_writer();
        writer.writeln("import (");
        let at = writer.as_str().len();
        writer.indent();
        writer.writeln("\"log\"");
        writer.insert(at, "\t\"fmt\"\n");
        writer.writeln("\"sync\"");
        assert_eq!(writer.finish(), "import (\n\t\"fmt\"\n\t\"log\"\n\t\"sync\"\n");
    }

    // ========================================
    // Blank lines tests
    // ========================================

    #[test]
    fn test_blank_lines_between_content() {
        let mut writer = tab_writer();
        writer.writeln("line1");
        writer.blank_lines(1);
        writer.writeln("line2");
        assert_eq!(writer.finish(), "line1\n\nline2\n");
    }

    #[test]
    fn test_blank_lines_are_not_indented() {
        let mut writer = tab_writer();
        writer.indent();
        writer.blank_lines(2);
        assert_eq!(writer.finish(), "\n\n");
    }
}
