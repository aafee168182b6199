// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Lexical error types.

use thiserror::Error;
use zenith_ast::{Report, Severity, SourceLocation};

/// A lexical error.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{kind}")]
pub struct LexError {
    pub kind: LexErrorKind,
    pub loc: SourceLocation,
    pub hint: Option<String>,
}

impl LexError {
    pub fn invalid_character(text: &str, loc: SourceLocation) -> Self {
        let hint = match text {
            "&" => Some("use '&&' for logical and".to_string()),
            "|" => Some("use '||' for logical or".to_string()),
            "'" => Some("string literals use '\"' or '`'".to_string()),
            _ => None,
        };
        Self {
            kind: LexErrorKind::InvalidCharacter { text: text.to_string() },
            loc,
            hint,
        }
    }

    pub fn unterminated_string(quote: char, loc: SourceLocation) -> Self {
        Self {
            kind: LexErrorKind::UnterminatedString,
            loc,
            hint: Some(format!("add a closing '{}'", quote)),
        }
    }

    pub fn malformed_number(text: &str, loc: SourceLocation) -> Self {
        Self {
            kind: LexErrorKind::MalformedNumber { text: text.to_string() },
            loc,
            hint: None,
        }
    }

    pub fn unterminated_comment(loc: SourceLocation) -> Self {
        Self {
            kind: LexErrorKind::UnterminatedComment,
            loc,
            hint: Some("add a closing '*/'".to_string()),
        }
    }

    pub fn invalid_escape(ch: char, loc: SourceLocation) -> Self {
        Self {
            kind: LexErrorKind::InvalidEscape { ch },
            loc,
            hint: Some("valid: \\n \\r \\t \\0 \\\\ \\\" \\' \\` \\$".to_string()),
        }
    }
}

/// The kind of lexical error.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LexErrorKind {
    #[error("invalid character '{text}'")]
    InvalidCharacter { text: String },

    #[error("unterminated string literal")]
    UnterminatedString,

    #[error("malformed number literal '{text}'")]
    MalformedNumber { text: String },

    #[error("unterminated block comment")]
    UnterminatedComment,

    #[error("invalid escape sequence '\\{ch}'")]
    InvalidEscape { ch: char },
}

impl LexErrorKind {
    /// Stable tag naming the error kind.
    pub fn tag(&self) -> &'static str {
        match self {
            LexErrorKind::InvalidCharacter { .. } => "InvalidCharacter",
            LexErrorKind::UnterminatedString => "UnterminatedString",
            LexErrorKind::MalformedNumber { .. } => "MalformedNumber",
            LexErrorKind::UnterminatedComment => "UnterminatedComment",
            LexErrorKind::InvalidEscape { .. } => "InvalidEscape",
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            LexErrorKind::InvalidCharacter { .. } => "E0001",
            LexErrorKind::UnterminatedString => "E0002",
            LexErrorKind::MalformedNumber { .. } => "E0003",
            LexErrorKind::UnterminatedComment => "E0004",
            LexErrorKind::InvalidEscape { .. } => "E0005",
        }
    }
}

impl From<LexError> for Report {
    fn from(err: LexError) -> Self {
        let report = Report::new(err.loc, Severity::Error, err.kind.tag(), err.kind.to_string())
            .with_code(err.kind.code());
        match err.hint {
            Some(hint) => report.with_hint(hint),
            None => report,
        }
    }
}
