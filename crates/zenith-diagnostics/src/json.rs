// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! JSON diagnostic output for machine consumption.
//!
//! Produces structured JSON that editors and scripts can parse. Each
//! diagnostic includes source context and exact locations (line/col).
//!
//! Use `--format json` with `zenith lex`, `zenith parse` or `zenith check`.

use serde::Serialize;

use zenith_ast::LineMap;

use crate::{codes::ErrorCodeRegistry, Diagnostic, LabelStyle, Severity};

/// A complete JSON diagnostic report for one front-end run.
#[derive(Debug, Serialize)]
pub struct DiagnosticReport {
    /// Schema version for forward compatibility.
    pub version: u32,
    /// The file that was processed.
    pub file: String,
    /// Whether the run produced no errors.
    pub success: bool,
    /// The phase that produced these diagnostics ("lex" or "parse").
    pub phase: String,
    pub diagnostics: Vec<JsonDiagnostic>,
    pub error_count: usize,
    pub warning_count: usize,
}

/// A single diagnostic in JSON form, enriched with source context.
#[derive(Debug, Serialize)]
pub struct JsonDiagnostic {
    /// "error" or "warning".
    pub severity: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    /// "Lexical" or "Syntax".
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    pub message: String,
    /// Primary source location.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<JsonLocation>,
    pub labels: Vec<JsonLabel>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub help: Option<String>,
}

/// A source location with line/column (1-based).
#[derive(Debug, Serialize)]
pub struct JsonLocation {
    pub line: u32,
    pub column: u32,
    pub length: usize,
    pub byte_offset: usize,
    /// The source line text for context.
    pub source_line: String,
}

/// A labeled span in JSON form.
#[derive(Debug, Serialize)]
pub struct JsonLabel {
    /// "primary" or "secondary".
    pub role: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub start: LineCol,
    pub end: LineCol,
}

/// Line/column pair (1-based).
#[derive(Debug, Serialize)]
pub struct LineCol {
    pub line: u32,
    pub column: u32,
    pub byte_offset: usize,
}

/// Convert diagnostics to a structured JSON report.
pub fn to_json_report(
    diagnostics: &[Diagnostic],
    source: &str,
    file: &str,
    phase: &str,
) -> DiagnosticReport {
    let registry = ErrorCodeRegistry::default();
    let line_map = LineMap::new(source);
    let mut error_count = 0;
    let mut warning_count = 0;

    let json_diags: Vec<JsonDiagnostic> = diagnostics
        .iter()
        .map(|d| {
            match d.severity {
                Severity::Error => error_count += 1,
                Severity::Warning => warning_count += 1,
            }
            to_json_diagnostic(d, source, &line_map, &registry)
        })
        .collect();

    DiagnosticReport {
        version: 1,
        file: file.to_string(),
        success: error_count == 0,
        phase: phase.to_string(),
        diagnostics: json_diags,
        error_count,
        warning_count,
    }
}

fn to_json_diagnostic(
    diag: &Diagnostic,
    source: &str,
    line_map: &LineMap,
    registry: &ErrorCodeRegistry,
) -> JsonDiagnostic {
    let severity = match diag.severity {
        Severity::Error => "error",
        Severity::Warning => "warning",
    };

    let code = diag.code.as_ref().map(|c| c.0.clone());
    let category = code
        .as_ref()
        .and_then(|c| registry.get(c))
        .map(|info| info.category.to_string());

    let location = diag.primary_span().map(|span| {
        let (line, column) = line_map.offset_to_line_col(span.start);
        JsonLocation {
            line,
            column,
            length: span.len(),
            byte_offset: span.start,
            source_line: line_map.line_text(source, line).unwrap_or("").to_string(),
        }
    });

    let labels = diag
        .labels
        .iter()
        .map(|l| JsonLabel {
            role: match l.style {
                LabelStyle::Primary => "primary".to_string(),
                LabelStyle::Secondary => "secondary".to_string(),
            },
            message: l.message.clone(),
            start: line_col(line_map, l.span.start),
            end: line_col(line_map, l.span.end),
        })
        .collect();

    JsonDiagnostic {
        severity: severity.to_string(),
        code,
        category,
        message: diag.message.clone(),
        location,
        labels,
        help: diag.help.clone(),
    }
}

fn line_col(line_map: &LineMap, offset: usize) -> LineCol {
    let (line, column) = line_map.offset_to_line_col(offset);
    LineCol {
        line,
        column,
        byte_offset: offset,
    }
}

/// Serialize a diagnostic report to pretty JSON.
pub fn to_json_string(report: &DiagnosticReport) -> String {
    serde_json::to_string_pretty(report).unwrap_or_else(|e| format!("{{\"error\": \"{}\"}}", e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::convert::from_reporter;

    fn report_for(src: &str) -> DiagnosticReport {
        let result = zenith_parser::parse(src, "main.zn");
        let diags = from_reporter(&result.reporter);
        to_json_report(&diags, src, "main.zn", "parse")
    }

    #[test]
    fn clean_source_reports_success() {
        let report = report_for("fun main() { return 0; }");
        assert!(report.success);
        assert_eq!(report.error_count, 0);
        assert!(report.diagnostics.is_empty());
    }

    #[test]
    fn location_and_category_are_filled() {
        let report = report_for("fun main() {\n foo(1, 2;\n}");
        assert!(!report.success);
        assert_eq!(report.error_count, 1);

        let diag = &report.diagnostics[0];
        assert_eq!(diag.severity, "error");
        assert_eq!(diag.code.as_deref(), Some("E0104"));
        assert_eq!(diag.category.as_deref(), Some("Syntax"));

        let loc = diag.location.as_ref().expect("primary location");
        assert_eq!((loc.line, loc.column), (2, 10));
        assert_eq!(loc.byte_offset, 22);
        assert_eq!(loc.length, 1);
        assert_eq!(loc.source_line, " foo(1, 2;");
    }

    #[test]
    fn json_string_has_expected_fields() {
        let report = report_for("class A {\n int x;\n");
        let json = to_json_string(&report);
        let value: serde_json::Value = serde_json::from_str(&json).expect("valid json");

        assert_eq!(value["version"], 1);
        assert_eq!(value["file"], "main.zn");
        assert_eq!(value["phase"], "parse");
        assert_eq!(value["success"], false);

        let labels = value["diagnostics"][0]["labels"].as_array().expect("labels");
        assert_eq!(labels.len(), 2);
        assert_eq!(labels[0]["role"], "secondary");
        assert_eq!(labels[0]["message"], "block opened here");
        assert_eq!(labels[0]["start"]["line"], 1);
        assert_eq!(labels[1]["role"], "primary");
        assert!(value["diagnostics"][0].get("help").is_some());
    }
}
