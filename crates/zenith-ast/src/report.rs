// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Diagnostic sink shared by the lexer and parser of one compilation unit.
//!
//! Producers only append. Readers get reports back ordered by source
//! offset, with reports at the same offset kept in the order they were
//! made. Nothing is ever dropped.

use std::fmt;

use crate::SourceLocation;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Severity {
    Error,
    Warning,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Error => f.write_str("error"),
            Severity::Warning => f.write_str("warning"),
        }
    }
}

/// One located problem found while lexing or parsing.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Report {
    pub loc: SourceLocation,
    pub severity: Severity,
    /// Error kind tag, e.g. `"UnterminatedString"`.
    pub kind: &'static str,
    /// Stable error code, e.g. `"E0002"`.
    pub code: Option<&'static str>,
    pub message: String,
    pub hint: Option<String>,
    /// A second location that explains this one, e.g. where a block opened.
    pub related: Option<Related>,
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Related {
    pub loc: SourceLocation,
    pub message: String,
}

impl Report {
    pub fn new(
        loc: SourceLocation,
        severity: Severity,
        kind: &'static str,
        message: impl Into<String>,
    ) -> Self {
        Self {
            loc,
            severity,
            kind,
            code: None,
            message: message.into(),
            hint: None,
            related: None,
        }
    }

    pub fn with_code(mut self, code: &'static str) -> Self {
        self.code = Some(code);
        self
    }

    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }

    pub fn with_related(mut self, loc: SourceLocation, message: impl Into<String>) -> Self {
        self.related = Some(Related { loc, message: message.into() });
        self
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

/// Collects every diagnostic of one lex + parse pass.
#[derive(Debug, Clone, Default)]
pub struct ErrorReporter {
    source_name: String,
    reports: Vec<Report>,
}

impl ErrorReporter {
    pub fn new(source_name: impl Into<String>) -> Self {
        Self {
            source_name: source_name.into(),
            reports: Vec::new(),
        }
    }

    pub fn source_name(&self) -> &str {
        &self.source_name
    }

    pub fn report(
        &mut self,
        loc: SourceLocation,
        severity: Severity,
        kind: &'static str,
        message: impl Into<String>,
    ) {
        self.reports.push(Report::new(loc, severity, kind, message));
    }

    pub fn push(&mut self, report: impl Into<Report>) {
        self.reports.push(report.into());
    }

    /// All reports ordered by source offset; ties keep insertion order.
    pub fn diagnostics(&self) -> Vec<&Report> {
        let mut sorted: Vec<&Report> = self.reports.iter().collect();
        sorted.sort_by_key(|r| r.loc.offset);
        sorted
    }

    pub fn into_sorted(self) -> Vec<Report> {
        let mut reports = self.reports;
        reports.sort_by_key(|r| r.loc.offset);
        reports
    }

    pub fn had_errors(&self) -> bool {
        self.reports.iter().any(Report::is_error)
    }

    pub fn error_count(&self) -> usize {
        self.reports.iter().filter(|r| r.is_error()).count()
    }

    pub fn warning_count(&self) -> usize {
        self.reports.len() - self.error_count()
    }

    pub fn len(&self) -> usize {
        self.reports.len()
    }

    pub fn is_empty(&self) -> bool {
        self.reports.is_empty()
    }
}
