// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Syntax error types.

use thiserror::Error;
use zenith_ast::token::TokenKind;
use zenith_ast::{Report, Severity, SourceLocation};

/// A syntax error, located at the offending token.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{kind}")]
pub struct ParseError {
    pub kind: ParseErrorKind,
    pub loc: SourceLocation,
    pub hint: Option<String>,
    /// Where the unclosed construct began, for errors that have one.
    pub opened: Option<SourceLocation>,
}

impl ParseError {
    pub fn expected(expected: &str, found: &TokenKind, loc: SourceLocation) -> Self {
        Self {
            kind: ParseErrorKind::UnexpectedToken {
                expected: expected.to_string(),
                found: found.display_name().to_string(),
            },
            loc,
            hint: crate::hints::for_expected(expected, found).map(String::from),
            opened: None,
        }
    }

    pub fn expected_expression(found: &TokenKind, loc: SourceLocation) -> Self {
        Self {
            kind: ParseErrorKind::ExpectedExpression { found: found.display_name().to_string() },
            loc,
            hint: crate::hints::for_expected("expression", found).map(String::from),
            opened: None,
        }
    }

    pub fn expected_type(found: &TokenKind, loc: SourceLocation) -> Self {
        Self {
            kind: ParseErrorKind::ExpectedType { found: found.display_name().to_string() },
            loc,
            hint: crate::hints::for_expected("type", found).map(String::from),
            opened: None,
        }
    }

    pub fn unterminated_block(open: SourceLocation, loc: SourceLocation) -> Self {
        Self {
            kind: ParseErrorKind::UnterminatedBlock,
            loc,
            hint: Some(format!("the block opened on line {} is never closed", open.line)),
            opened: Some(open),
        }
    }

    pub fn missing_delimiter(
        delimiter: &'static str,
        opener: &'static str,
        found: &TokenKind,
        loc: SourceLocation,
    ) -> Self {
        Self {
            kind: ParseErrorKind::MissingDelimiter {
                delimiter,
                opener,
                found: found.display_name().to_string(),
            },
            loc,
            hint: crate::hints::for_expected(delimiter, found).map(String::from),
            opened: None,
        }
    }

    pub fn misplaced_annotation(loc: SourceLocation) -> Self {
        Self {
            kind: ParseErrorKind::MisplacedAnnotation,
            loc,
            hint: Some("annotate a function, a member or an operator".to_string()),
            opened: None,
        }
    }

    pub fn invalid_union_variant(loc: SourceLocation) -> Self {
        Self {
            kind: ParseErrorKind::InvalidUnionVariant,
            loc,
            hint: Some("list concrete types; a union already holds any one of them".to_string()),
            opened: None,
        }
    }

    pub fn nesting_too_deep(limit: usize, loc: SourceLocation) -> Self {
        Self {
            kind: ParseErrorKind::NestingTooDeep { limit },
            loc,
            hint: Some("move the inner part into a function or a variable".to_string()),
            opened: None,
        }
    }

    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }

    /// True when the offending token is lexer error output, which already
    /// has its own diagnostic.
    pub fn is_at_invalid_token(&self) -> bool {
        let invalid = TokenKind::Error.display_name();
        match &self.kind {
            ParseErrorKind::UnexpectedToken { found, .. }
            | ParseErrorKind::ExpectedExpression { found }
            | ParseErrorKind::ExpectedType { found }
            | ParseErrorKind::MissingDelimiter { found, .. } => found == invalid,
            _ => false,
        }
    }
}

/// The kind of syntax error.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ParseErrorKind {
    #[error("expected {expected}, found {found}")]
    UnexpectedToken { expected: String, found: String },

    #[error("expected expression, found {found}")]
    ExpectedExpression { found: String },

    #[error("expected type, found {found}")]
    ExpectedType { found: String },

    #[error("unterminated block: expected '}}' before end of file")]
    UnterminatedBlock,

    #[error("expected {delimiter} to close {opener}, found {found}")]
    MissingDelimiter {
        delimiter: &'static str,
        opener: &'static str,
        found: String,
    },

    #[error("annotation is not allowed here")]
    MisplacedAnnotation,

    #[error("union variants cannot be 'dynamic'")]
    InvalidUnionVariant,

    #[error("nesting is deeper than {limit} levels")]
    NestingTooDeep { limit: usize },
}

impl ParseErrorKind {
    /// Stable tag naming the error kind.
    pub fn tag(&self) -> &'static str {
        match self {
            ParseErrorKind::UnexpectedToken { .. } => "UnexpectedToken",
            ParseErrorKind::ExpectedExpression { .. } => "ExpectedExpression",
            ParseErrorKind::ExpectedType { .. } => "ExpectedType",
            ParseErrorKind::UnterminatedBlock => "UnterminatedBlock",
            ParseErrorKind::MissingDelimiter { .. } => "MissingDelimiter",
            ParseErrorKind::MisplacedAnnotation => "MisplacedAnnotation",
            ParseErrorKind::InvalidUnionVariant => "InvalidUnionVariant",
            ParseErrorKind::NestingTooDeep { .. } => "NestingTooDeep",
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            ParseErrorKind::UnexpectedToken { .. } => "E0100",
            ParseErrorKind::ExpectedExpression { .. } => "E0101",
            ParseErrorKind::ExpectedType { .. } => "E0102",
            ParseErrorKind::UnterminatedBlock => "E0103",
            ParseErrorKind::MissingDelimiter { .. } => "E0104",
            ParseErrorKind::MisplacedAnnotation => "E0105",
            ParseErrorKind::InvalidUnionVariant => "E0106",
            ParseErrorKind::NestingTooDeep { .. } => "E0107",
        }
    }
}

impl From<ParseError> for Report {
    fn from(err: ParseError) -> Self {
        let mut report = Report::new(err.loc, Severity::Error, err.kind.tag(), err.kind.to_string())
            .with_code(err.kind.code());
        if let Some(hint) = err.hint {
            report = report.with_hint(hint);
        }
        if let Some(open) = err.opened {
            report = report.with_related(open, "block opened here");
        }
        report
    }
}
