//! Error code registry.
//!
//! Maps error codes (E0001, E0104, etc.) to titles and categories.
//! Used by `zenith explain <code>` and for JSON output.

use std::collections::HashMap;

/// Registry of all known error codes.
pub struct ErrorCodeRegistry {
    codes: HashMap<&'static str, ErrorCodeInfo>,
}

/// Information about a single error code.
pub struct ErrorCodeInfo {
    pub code: &'static str,
    pub title: &'static str,
    pub category: ErrorCategory,
    pub explanation: &'static str,
}

/// Error category for grouping.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Lexical,
    Syntax,
}

impl std::fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorCategory::Lexical => write!(f, "Lexical"),
            ErrorCategory::Syntax => write!(f, "Syntax"),
        }
    }
}

macro_rules! register_codes {
    ($($code:literal => ($title:literal, $cat:expr, $why:literal)),* $(,)?) => {{
        let mut map = HashMap::new();
        $(
            map.insert($code, ErrorCodeInfo {
                code: $code,
                title: $title,
                category: $cat,
                explanation: $why,
            });
        )*
        map
    }};
}

impl Default for ErrorCodeRegistry {
    fn default() -> Self {
        use ErrorCategory::*;

        Self {
            codes: register_codes! {
                // Lexer errors (E00xx)
                "E0001" => ("invalid character", Lexical,
                    "A character that cannot start any token. Consecutive invalid characters are reported once."),
                "E0002" => ("unterminated string literal", Lexical,
                    "A double-quoted string ran into the end of its line, or a backtick string into the end of the file."),
                "E0003" => ("malformed number literal", Lexical,
                    "A numeric literal with stray letters, a second decimal point, or a value too large for 64 bits."),
                "E0004" => ("unterminated block comment", Lexical,
                    "A '/*' comment that is never closed with '*/'."),
                "E0005" => ("invalid escape sequence", Lexical,
                    "A backslash followed by a character with no escape meaning. The character is kept as written."),

                // Parser errors (E01xx)
                "E0100" => ("unexpected token", Syntax,
                    "The parser expected a specific token or construct and found something else."),
                "E0101" => ("expected expression", Syntax,
                    "A value was required here, e.g. after '=' or inside parentheses."),
                "E0102" => ("expected type", Syntax,
                    "A type name such as 'int', a class name, or '[T]' was required here."),
                "E0103" => ("unterminated block", Syntax,
                    "A '{' is never closed before the end of the file."),
                "E0104" => ("missing closing delimiter", Syntax,
                    "An opening '(', '[', '{', '<' or '${' has no matching closing delimiter."),
                "E0105" => ("misplaced annotation", Syntax,
                    "Annotations may precede functions, members and operator overloads only."),
                "E0106" => ("invalid union variant", Syntax,
                    "A union lists concrete types; 'dynamic' cannot be one of them."),
                "E0107" => ("nesting too deep", Syntax,
                    "Blocks, expressions or types are nested more deeply than the parser allows. The innermost part is skipped."),
            },
        }
    }
}

impl ErrorCodeRegistry {
    pub fn get(&self, code: &str) -> Option<&ErrorCodeInfo> {
        self.codes.get(code)
    }

    pub fn all(&self) -> impl Iterator<Item = &ErrorCodeInfo> {
        self.codes.values()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use zenith_lexer::LexErrorKind;
    use zenith_parser::ParseErrorKind;

    #[test]
    fn every_emitted_code_is_registered() {
        let registry = ErrorCodeRegistry::default();
        let lex = [
            LexErrorKind::InvalidCharacter { text: "#".into() },
            LexErrorKind::UnterminatedString,
            LexErrorKind::MalformedNumber { text: "1x".into() },
            LexErrorKind::UnterminatedComment,
            LexErrorKind::InvalidEscape { ch: 'q' },
        ];
        for kind in &lex {
            let info = registry.get(kind.code()).expect("lexer code registered");
            assert_eq!(info.category, ErrorCategory::Lexical);
        }

        let parse = [
            ParseErrorKind::ExpectedType { found: "x".into() },
            ParseErrorKind::UnterminatedBlock,
            ParseErrorKind::MisplacedAnnotation,
            ParseErrorKind::InvalidUnionVariant,
            ParseErrorKind::NestingTooDeep { limit: 256 },
        ];
        for kind in &parse {
            let info = registry.get(kind.code()).expect("parser code registered");
            assert_eq!(info.category, ErrorCategory::Syntax);
        }
        assert_eq!(registry.all().count(), 13);
    }

    #[test]
    fn unknown_code() {
        assert!(ErrorCodeRegistry::default().get("E9999").is_none());
    }
}
