// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Rich terminal formatter for diagnostics.
//!
//! Produces multi-line, color-coded error output:
//!
//! ```text
//! error[E0104]: expected ')' to close '(', found ';'
//!   --> main.zn:2:10
//!     |
//!   2 |  foo(1, 2;
//!     |          ^ delimiter missing before this
//!     |
//!     = help: the argument list ends before ';'
//! ```

use colored::Colorize;

use zenith_ast::LineMap;

use crate::{Diagnostic, Label, LabelStyle, Severity};

/// Formats diagnostics for terminal output.
pub struct DiagnosticFormatter<'a> {
    source: &'a str,
    file_name: Option<&'a str>,
    line_map: LineMap,
}

/// A label resolved to its first source line.
struct Mark<'d> {
    line: usize,
    col: usize,
    width: usize,
    style: LabelStyle,
    message: Option<&'d str>,
}

impl<'a> DiagnosticFormatter<'a> {
    pub fn new(source: &'a str) -> Self {
        let line_map = LineMap::new(source);
        Self {
            source,
            file_name: None,
            line_map,
        }
    }

    pub fn with_file_name(mut self, name: &'a str) -> Self {
        self.file_name = Some(name);
        self
    }

    pub fn format(&self, diagnostic: &Diagnostic) -> String {
        let mut out = String::new();

        // Line 1: severity[code]: message
        self.format_header(&mut out, diagnostic);

        let Some(primary) = diagnostic.primary_span() else {
            self.format_footer(&mut out, diagnostic, 2);
            return out;
        };

        // Line 2: --> file:line:col of the primary label
        let file = self.file_name.unwrap_or("<source>");
        let (line, col) = self.offset_to_line_col(primary.start);
        out.push_str(&format!("  {} {}:{}:{}\n", "-->".blue(), file, line, col));

        // An opener label sits on or before the line of the error
        let mut marks: Vec<Mark> = diagnostic.labels.iter().map(|l| self.mark(l)).collect();
        marks.sort_by_key(|m| m.line);

        let max_line = marks.last().map(|m| m.line).unwrap_or(1);
        let gutter_width = max_line.to_string().len().max(2);
        let pipe = format!("{} {}", " ".repeat(gutter_width + 1), "|".blue());

        out.push_str(&format!("{}\n", pipe));
        let mut prev_line: Option<usize> = None;
        for mark in &marks {
            if prev_line != Some(mark.line) {
                if prev_line.is_some_and(|prev| mark.line > prev + 1) {
                    out.push_str(&format!("{} {}\n", " ".repeat(gutter_width), "...".blue()));
                }
                out.push_str(&format!(
                    "{:>width$} {} {}\n",
                    mark.line.to_string().blue().bold(),
                    "|".blue(),
                    self.get_line(mark.line).unwrap_or(""),
                    width = gutter_width + 1,
                ));
                prev_line = Some(mark.line);
            }

            let underline = match mark.style {
                LabelStyle::Primary => "^".repeat(mark.width).red().bold(),
                LabelStyle::Secondary => "-".repeat(mark.width).blue(),
            };
            let indent = " ".repeat(mark.col - 1);
            match mark.message {
                Some(msg) => out.push_str(&format!(
                    "{} {}{} {}\n",
                    pipe,
                    indent,
                    underline,
                    styled(msg, mark.style)
                )),
                None => out.push_str(&format!("{} {}{}\n", pipe, indent, underline)),
            }
        }

        if diagnostic.help.is_some() {
            out.push_str(&format!("{}\n", pipe));
        }
        self.format_footer(&mut out, diagnostic, gutter_width);

        out
    }

    /// Format every diagnostic, separated by blank lines.
    pub fn format_all(&self, diagnostics: &[Diagnostic]) -> String {
        diagnostics
            .iter()
            .map(|d| self.format(d))
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn format_header(&self, out: &mut String, diagnostic: &Diagnostic) {
        let severity_str = match diagnostic.severity {
            Severity::Error => "error".red().bold(),
            Severity::Warning => "warning".yellow().bold(),
        };

        if let Some(ref code) = diagnostic.code {
            out.push_str(&format!(
                "{}[{}]: {}\n",
                severity_str,
                code.0.clone().red().bold(),
                diagnostic.message.bold()
            ));
        } else {
            out.push_str(&format!("{}: {}\n", severity_str, diagnostic.message.bold()));
        }
    }

    fn format_footer(&self, out: &mut String, diagnostic: &Diagnostic, gutter_width: usize) {
        if let Some(ref help) = diagnostic.help {
            out.push_str(&format!(
                "{} {} {}: {}\n",
                " ".repeat(gutter_width + 1),
                "=".cyan(),
                "help".cyan().bold(),
                help
            ));
        }
    }

    /// Multi-line spans are underlined to the end of their first line.
    fn mark<'d>(&self, label: &'d Label) -> Mark<'d> {
        let (line, col) = self.offset_to_line_col(label.span.start);
        let (end_line, end_col) = self.offset_to_line_col(label.span.end);
        let end_col = if end_line == line {
            end_col
        } else {
            self.get_line(line).unwrap_or("").len() + 1
        };
        Mark {
            line,
            col: col.max(1),
            width: end_col.saturating_sub(col).max(1),
            style: label.style,
            message: label.message.as_deref(),
        }
    }

    /// Convert byte offset to (line, col), both 1-based.
    fn offset_to_line_col(&self, offset: usize) -> (usize, usize) {
        let (line, col) = self.line_map.offset_to_line_col(offset);
        (line as usize, col as usize)
    }

    /// Get source line text by 1-based line number.
    fn get_line(&self, line_num: usize) -> Option<&str> {
        self.line_map.line_text(self.source, line_num as u32)
    }
}

fn styled(msg: &str, style: LabelStyle) -> String {
    match style {
        LabelStyle::Primary => msg.red().bold().to_string(),
        LabelStyle::Secondary => msg.blue().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::convert::from_reporter;

    fn render(src: &str) -> String {
        colored::control::set_override(false);
        let result = zenith_parser::parse(src, "main.zn");
        let diags = from_reporter(&result.reporter);
        DiagnosticFormatter::new(src).with_file_name("main.zn").format_all(&diags)
    }

    #[test]
    fn formats_missing_delimiter() {
        let out = render("fun main() {\n foo(1, 2;\n}");
        let expected = "\
error[E0104]: expected ')' to close '(', found ';'
  --> main.zn:2:10
    |
  2 |  foo(1, 2;
    |          ^ delimiter missing before this
    |
    = help: the argument list ends before ';'
";
        assert_eq!(out, expected);
    }

    #[test]
    fn formats_secondary_label_on_other_line() {
        let out = render("fun f() {\n let x = 1;\n");
        assert!(out.starts_with("error[E0103]: unterminated block"), "{}", out);
        assert!(out.contains("  --> main.zn:3:1\n"), "{}", out);
        assert!(out.contains(" 1 | fun f() {\n"), "{}", out);
        assert!(out.contains("- block opened here"), "{}", out);
        assert!(out.contains("^ file ends here"), "{}", out);
        assert!(out.contains("   ...\n"), "{}", out);
    }

    #[test]
    fn formats_without_labels() {
        colored::control::set_override(false);
        let diag = Diagnostic::error("no source").with_help("try again");
        let out = DiagnosticFormatter::new("").format(&diag);
        assert_eq!(out, "error: no source\n    = help: try again\n");
    }
}
