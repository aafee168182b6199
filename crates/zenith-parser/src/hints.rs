// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Error hints - suggestions for fixing common mistakes.
//!
//! Kept separate from the main parser to avoid clutter.

use zenith_ast::token::TokenKind;

/// Get a hint for an "expected X" error based on context.
pub fn for_expected(expected: &str, found: &TokenKind) -> Option<&'static str> {
    match (expected, found) {
        // Block hints
        ("'{'", _) => Some("blocks start with '{'"),
        ("'}'", TokenKind::Eof) => Some("every '{' needs a matching '}'"),
        ("'}'", _) => None,

        // Parentheses hints
        ("'('", _) => Some("parameter lists and conditions are wrapped in parentheses"),
        ("')'", TokenKind::Eof) => Some("add ')' to close the parenthesis"),
        ("')'", TokenKind::Semi) => Some("the argument list ends before ';'"),
        ("')'", _) => None,

        // Bracket hints
        ("']'", TokenKind::Eof) => Some("add ']' to close the bracket"),
        ("']'", _) => None,

        // Template angle brackets
        ("'>'", _) => Some("close the template argument list with '>'"),

        // Property hints
        ("':'", TokenKind::Eq) => Some("object properties use ':' between key and value"),

        // Lambda hints
        ("'=>'", _) => Some("lambda parameters are followed by '=>'"),

        // Declaration end
        ("';' or '='", _) => Some("end the declaration with ';' or give it a value with '='"),

        // Loop hints
        ("'while'", _) => Some("a do-loop ends with 'while (condition)'"),
        ("';'", _) => Some("for-loop clauses are separated by ';'"),

        // Expression hints
        ("expression", TokenKind::Eq) => Some("put the value after '='"),
        ("expression", TokenKind::Semi) => Some("statement is incomplete"),
        ("expression", TokenKind::RParen) => Some("remove the stray ')' or add an operand before it"),
        ("expression", _) => Some("try a value, variable, or function call"),

        // Name/identifier hints
        ("a name", TokenKind::Int(..)) => Some("names can't start with a number"),
        ("a name", _) => Some("names start with a letter or '_'"),

        // String hints
        ("a string", _) => Some("expected a quoted path like \"lib/util.zn\""),

        // Type hints
        ("type", TokenKind::Let | TokenKind::Var) => Some("'let' and 'var' already declare an untyped variable"),
        ("type", _) => Some("try a type like 'int', 'string', or a class name"),

        // Declaration hints
        ("declaration", TokenKind::RBrace) => Some("this '}' has no matching '{'"),
        ("declaration", _) => Some("start with 'fun', 'class', 'actor', 'import', or a type"),
        ("member declaration", TokenKind::On) => Some("message handlers are only allowed in actors"),
        ("member declaration", _) => Some("members are fields, methods, constructors and operators"),
        ("overloadable operator", _) => Some("overloadable: + - * / % == != < <= > >= ! []"),

        _ => None,
    }
}
