// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Conversions from front-end error types to `Diagnostic`.

use zenith_ast::{ErrorReporter, Report, Severity};

use crate::{Diagnostic, ToDiagnostic};

// ============================================================================
// Reports
// ============================================================================

impl ToDiagnostic for Report {
    fn to_diagnostic(&self) -> Diagnostic {
        let base = match self.severity {
            Severity::Error => Diagnostic::error(&self.message),
            Severity::Warning => Diagnostic::warning(&self.message),
        };

        let mut diag = match self.code {
            Some(code) => base.with_code(code),
            None => base,
        };

        if let Some(ref related) = self.related {
            diag = diag.with_secondary(related.loc.span(), related.message.as_str());
        }
        diag = diag.with_primary(self.loc.span(), label_for(self.kind));

        if let Some(ref hint) = self.hint {
            diag = diag.with_help(hint.as_str());
        }

        diag
    }
}

/// Short text shown under the offending source.
fn label_for(kind: &str) -> &'static str {
    match kind {
        "InvalidCharacter" => "not valid here",
        "UnterminatedString" => "string starts here",
        "MalformedNumber" => "not a number",
        "UnterminatedComment" => "comment starts here",
        "InvalidEscape" => "unknown escape",
        "UnexpectedToken" => "unexpected here",
        "ExpectedExpression" => "expected a value here",
        "ExpectedType" => "expected a type here",
        "UnterminatedBlock" => "file ends here",
        "MissingDelimiter" => "delimiter missing before this",
        "MisplacedAnnotation" => "annotation not allowed here",
        "InvalidUnionVariant" => "not allowed in a union",
        "NestingTooDeep" => "nested too deeply",
        _ => "here",
    }
}

/// All reports of a pass as diagnostics, in source order.
pub fn from_reporter(reporter: &ErrorReporter) -> Vec<Diagnostic> {
    reporter.diagnostics().into_iter().map(ToDiagnostic::to_diagnostic).collect()
}

// ============================================================================
// Lex Errors
// ============================================================================

impl ToDiagnostic for zenith_lexer::LexError {
    fn to_diagnostic(&self) -> Diagnostic {
        Report::from(self.clone()).to_diagnostic()
    }
}

// ============================================================================
// Parse Errors
// ============================================================================

impl ToDiagnostic for zenith_parser::ParseError {
    fn to_diagnostic(&self) -> Diagnostic {
        Report::from(self.clone()).to_diagnostic()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::LabelStyle;
    use zenith_ast::{SourceLocation, Span};

    #[test]
    fn parse_errors_carry_code_label_and_help() {
        let result = zenith_parser::parse("fun main() {\n foo(1, 2;\n}", "main.zn");
        let diags = from_reporter(&result.reporter);
        assert_eq!(diags.len(), 1);
        let diag = &diags[0];
        assert_eq!(diag.code.as_ref().map(|c| c.0.as_str()), Some("E0104"));
        assert_eq!(diag.message, "expected ')' to close '(', found ';'");
        assert_eq!(diag.primary_span(), Some(Span::new(22, 23)));
        assert_eq!(diag.help.as_deref(), Some("the argument list ends before ';'"));
    }

    #[test]
    fn unterminated_block_points_at_opener() {
        let result = zenith_parser::parse("class A {\n int x;\n", "a.zn");
        let diags = from_reporter(&result.reporter);
        assert_eq!(diags.len(), 1);
        let secondary = diags[0]
            .labels
            .iter()
            .find(|l| l.style == LabelStyle::Secondary)
            .expect("opener label");
        assert_eq!(secondary.span, Span::new(8, 9));
        assert_eq!(secondary.message.as_deref(), Some("block opened here"));
    }

    #[test]
    fn lex_error_converts() {
        let err = zenith_lexer::LexError::invalid_character("&", SourceLocation::new(1, 3, 2, 1));
        let diag = err.to_diagnostic();
        assert_eq!(diag.code.map(|c| c.0), Some("E0001".to_string()));
        assert_eq!(diag.help.as_deref(), Some("use '&&' for logical and"));
        assert_eq!(diag.labels[0].message.as_deref(), Some("not valid here"));
    }

    #[test]
    fn warning_reports_stay_warnings() {
        let report = Report::new(SourceLocation::new(1, 1, 0, 2), Severity::Warning, "Style", "odd");
        let diag = report.to_diagnostic();
        assert!(!diag.is_error());
        assert!(diag.code.is_none());
        assert_eq!(diag.labels[0].message.as_deref(), Some("here"));
    }
}
