//! The lexer implementation using logos.

use logos::Logos;
use zenith_ast::token::{NumSuffix, Token, TokenKind};
use zenith_ast::{ErrorReporter, LineMap, SourceLocation, Span};

use crate::error::LexError;

/// Raw token type for logos - values, strings and comments get a second pass.
#[derive(Logos, Debug, Clone, Copy, PartialEq)]
#[logos(skip r"[ \t\r\n\f]+")]
enum RawToken {
    // === Keywords ===
    #[token("let")]
    Let,
    #[token("var")]
    Var,
    #[token("dynamic")]
    Dynamic,
    #[token("hoist")]
    Hoist,
    #[token("const")]
    Const,
    #[token("fun")]
    Fun,
    #[token("class")]
    Class,
    #[token("struct")]
    Struct,
    #[token("union")]
    Union,
    #[token("actor")]
    Actor,
    #[token("on")]
    On,
    #[token("new")]
    New,
    #[token("this")]
    This,
    #[token("unsafe")]
    Unsafe,
    #[token("scope")]
    Scope,
    #[token("import")]
    Import,
    #[token("java")]
    Java,
    #[token("public")]
    Public,
    #[token("private")]
    Private,
    #[token("protected")]
    Protected,
    #[token("privatew")]
    PrivateW,
    #[token("protectedw")]
    ProtectedW,
    #[token("static")]
    Static,
    #[token("template")]
    Template,
    #[token("typename")]
    Typename,
    #[token("operator")]
    Operator,
    #[token("if")]
    If,
    #[token("else")]
    Else,
    #[token("for")]
    For,
    #[token("while")]
    While,
    #[token("do")]
    Do,
    #[token("return")]
    Return,
    #[token("true")]
    True,
    #[token("false")]
    False,
    #[token("null")]
    Null,

    // === Built-in types ===
    #[token("int")]
    IntTy,
    #[token("long")]
    LongTy,
    #[token("short")]
    ShortTy,
    #[token("byte")]
    ByteTy,
    #[token("float")]
    FloatTy,
    #[token("double")]
    DoubleTy,
    #[token("string")]
    StringTy,
    #[token("bool")]
    BoolTy,
    #[token("freeobj")]
    FreeObj,
    #[token("Number")]
    NumberTy,
    #[token("BigInt")]
    BigIntTy,
    #[token("BigNumber")]
    BigNumberTy,

    // === Operators (longest match wins) ===
    #[token("...")]
    Ellipsis,
    #[token("==")]
    EqEq,
    #[token("!=")]
    BangEq,
    #[token("<=")]
    LtEq,
    #[token(">=")]
    GtEq,
    #[token("&&")]
    AmpAmp,
    #[token("||")]
    PipePipe,
    #[token("->")]
    Arrow,
    #[token("=>")]
    FatArrow,
    #[token("+=")]
    PlusEq,
    #[token("-=")]
    MinusEq,
    #[token("*=")]
    StarEq,
    #[token("/=")]
    SlashEq,
    #[token("%=")]
    PercentEq,
    #[token("+")]
    Plus,
    #[token("-")]
    Minus,
    #[token("*")]
    Star,
    #[token("/")]
    Slash,
    #[token("%")]
    Percent,
    #[token("=")]
    Eq,
    #[token("<")]
    Lt,
    #[token(">")]
    Gt,
    #[token("!")]
    Bang,
    #[token("@")]
    At,
    #[token(".")]
    Dot,
    // Only valid doubled
    #[token("&")]
    Amp,
    #[token("|")]
    Pipe,

    // === Delimiters ===
    #[token("{")]
    LBrace,
    #[token("}")]
    RBrace,
    #[token("(")]
    LParen,
    #[token(")")]
    RParen,
    #[token("[")]
    LBracket,
    #[token("]")]
    RBracket,
    #[token(":")]
    Colon,
    #[token(";")]
    Semi,
    #[token(",")]
    Comma,

    // === Comments ===
    #[regex(r"//[^\n]*", logos::skip)]
    LineComment,
    // Body scanned by hand so an unterminated comment can be reported
    #[token("/*")]
    BlockComment,

    // === Literals ===
    #[regex(r"[0-9]+\.[0-9]+([eE][+-]?[0-9]+)?[fF]?")]
    #[regex(r"[0-9]+[eE][+-]?[0-9]+[fF]?")]
    Float,
    #[regex(r"[0-9]+[lLfF]?")]
    Int,
    // String bodies are scanned by hand for `${` segments
    #[token("\"")]
    Quote,
    #[token("`")]
    Backtick,

    // === Identifier (must come after keywords) ===
    #[regex(r"[a-zA-Z_][a-zA-Z0-9_]*")]
    Ident,
}

/// An open template string whose embedded expression is being lexed.
#[derive(Debug, Clone, Copy)]
struct TemplateFrame {
    quote: char,
    /// Unclosed `{` inside the current `${ ... }`.
    depth: u32,
}

/// How a string body scan stopped.
#[derive(Debug, PartialEq)]
enum StringEnd {
    Closed,
    /// Stopped right after `${`
    Interpolation,
    Unterminated,
}

struct StringScan {
    text: String,
    end: StringEnd,
    /// Bytes consumed, closing quote or `${` included.
    consumed: usize,
    /// First bad escape: offset of the backslash and the escaped char.
    bad_escape: Option<(usize, char)>,
}

/// The lexer for Zenith source code.
///
/// Tokens are pulled one at a time with [`Lexer::next_token`]; problems go
/// to the caller's [`ErrorReporter`] and the stream carries on.
pub struct Lexer<'a> {
    source: &'a str,
    raw: logos::Lexer<'a, RawToken>,
    line_map: LineMap,
    templates: Vec<TemplateFrame>,
    /// End of the last emitted token; trivia starts here.
    last_end: usize,
}

impl<'a> Lexer<'a> {
    /// Create a new lexer for the given source code.
    pub fn new(source: &'a str) -> Self {
        Self {
            source,
            raw: RawToken::lexer(source),
            line_map: LineMap::new(source),
            templates: Vec::new(),
            last_end: 0,
        }
    }

    pub fn source(&self) -> &'a str {
        self.source
    }

    pub fn line_map(&self) -> &LineMap {
        &self.line_map
    }

    /// Produce the next token. Returns `Eof` forever once input is exhausted.
    pub fn next_token(&mut self, reporter: &mut ErrorReporter) -> Token {
        loop {
            let Some(result) = self.raw.next() else {
                return self.eof();
            };
            let span = self.raw.span();

            let raw = match result {
                Ok(raw) => raw,
                Err(()) => {
                    self.invalid_run(span.start, span.end, reporter);
                    return self.make_token(TokenKind::Error, span.start);
                }
            };

            let kind = match raw {
                RawToken::LineComment => continue,
                RawToken::BlockComment => {
                    self.block_comment(span.start, reporter);
                    continue;
                }
                RawToken::Quote => self.string_literal('"', span.start, reporter),
                RawToken::Backtick => self.string_literal('`', span.start, reporter),
                RawToken::Int | RawToken::Float => self.number(raw, span.start, reporter),
                RawToken::Amp | RawToken::Pipe => {
                    let err = LexError::invalid_character(self.raw.slice(), self.locate(span.start, span.end));
                    reporter.push(err);
                    TokenKind::Error
                }
                RawToken::LBrace => {
                    if let Some(frame) = self.templates.last_mut() {
                        frame.depth += 1;
                    }
                    TokenKind::LBrace
                }
                RawToken::RBrace => match self.templates.last().map(|f| f.depth) {
                    Some(0) => self.template_continuation(span.start, reporter),
                    Some(_) => {
                        if let Some(frame) = self.templates.last_mut() {
                            frame.depth -= 1;
                        }
                        TokenKind::RBrace
                    }
                    None => TokenKind::RBrace,
                },
                other => convert_token(other, self.raw.slice()),
            };
            return self.make_token(kind, span.start);
        }
    }

    /// Lex the whole source into a token vector ending in `Eof`.
    pub fn tokenize(mut self, source_name: &str) -> LexResult {
        let mut reporter = ErrorReporter::new(source_name);
        let mut tokens = Vec::new();
        loop {
            let token = self.next_token(&mut reporter);
            let done = token.kind == TokenKind::Eof;
            tokens.push(token);
            if done {
                break;
            }
        }
        LexResult { tokens, reporter }
    }

    fn make_token(&mut self, kind: TokenKind, start: usize) -> Token {
        let end = self.raw.span().end;
        let token = Token {
            kind,
            lexeme: self.text(start, end).to_string(),
            loc: self.locate(start, end),
            leading_trivia: Span::new(self.last_end, start),
        };
        self.last_end = end;
        token
    }

    fn eof(&mut self) -> Token {
        let end = self.source.len();
        let token = Token {
            kind: TokenKind::Eof,
            lexeme: String::new(),
            loc: self.locate(end, end),
            leading_trivia: Span::new(self.last_end, end),
        };
        self.last_end = end;
        token
    }

    fn locate(&self, start: usize, end: usize) -> SourceLocation {
        self.line_map.locate(Span::new(start, end))
    }

    fn text(&self, start: usize, end: usize) -> &'a str {
        self.source.get(start..end).unwrap_or("")
    }

    /// Extend an unrecognized character into the whole run of junk up to the
    /// next plausible token start, reporting it once.
    fn invalid_run(&mut self, start: usize, end: usize, reporter: &mut ErrorReporter) {
        let rest = &self.source[start..];
        let run = rest
            .char_indices()
            .skip(1)
            .find(|&(_, c)| c.is_whitespace() || starts_token(c))
            .map(|(i, _)| i)
            .unwrap_or(rest.len());
        let run_end = (start + run).max(end);
        self.raw.bump(run_end - end);
        reporter.push(LexError::invalid_character(self.text(start, run_end), self.locate(start, run_end)));
    }

    fn block_comment(&mut self, start: usize, reporter: &mut ErrorReporter) {
        let rest = self.raw.remainder();
        match rest.find("*/") {
            Some(i) => self.raw.bump(i + 2),
            None => {
                self.raw.bump(rest.len());
                let end = self.raw.span().end;
                reporter.push(LexError::unterminated_comment(self.locate(start, end)));
            }
        }
    }

    fn number(&mut self, raw: RawToken, start: usize, reporter: &mut ErrorReporter) -> TokenKind {
        let tail = malformed_tail_len(self.raw.remainder());
        if tail == 0 {
            if let Some(kind) = parse_number(raw, self.raw.slice()) {
                return kind;
            }
        }
        self.raw.bump(tail);
        let end = self.raw.span().end;
        reporter.push(LexError::malformed_number(self.text(start, end), self.locate(start, end)));
        TokenKind::Error
    }

    fn string_literal(&mut self, quote: char, start: usize, reporter: &mut ErrorReporter) -> TokenKind {
        let scan = self.scan_string(quote, reporter);
        match scan.end {
            StringEnd::Closed => TokenKind::String(scan.text),
            StringEnd::Interpolation => {
                self.templates.push(TemplateFrame { quote, depth: 0 });
                TokenKind::TemplateHead(scan.text)
            }
            StringEnd::Unterminated => {
                let end = self.raw.span().end;
                reporter.push(LexError::unterminated_string(quote, self.locate(start, end)));
                TokenKind::Error
            }
        }
    }

    /// A `}` closing a `${ ... }`: scan on to the next `${` or the closing quote.
    fn template_continuation(&mut self, start: usize, reporter: &mut ErrorReporter) -> TokenKind {
        let Some(quote) = self.templates.last().map(|f| f.quote) else {
            return TokenKind::RBrace;
        };
        let scan = self.scan_string(quote, reporter);
        match scan.end {
            StringEnd::Interpolation => TokenKind::TemplateMiddle(scan.text),
            StringEnd::Closed => {
                self.templates.pop();
                TokenKind::TemplateTail(scan.text)
            }
            StringEnd::Unterminated => {
                self.templates.pop();
                let end = self.raw.span().end;
                reporter.push(LexError::unterminated_string(quote, self.locate(start, end)));
                TokenKind::Error
            }
        }
    }

    /// Scan a string body from the current position and bump over it.
    fn scan_string(&mut self, quote: char, reporter: &mut ErrorReporter) -> StringScan {
        let base = self.raw.span().end;
        let scan = scan_string_body(self.raw.remainder(), quote);
        self.raw.bump(scan.consumed);
        if let Some((offset, ch)) = scan.bad_escape {
            let at = base + offset;
            reporter.push(LexError::invalid_escape(ch, self.locate(at, at + 1 + ch.len_utf8())));
        }
        scan
    }
}

/// Convert a raw logos token with no payload to our TokenKind.
fn convert_token(raw: RawToken, slice: &str) -> TokenKind {
    match raw {
        // Keywords
        RawToken::Let => TokenKind::Let,
        RawToken::Var => TokenKind::Var,
        RawToken::Dynamic => TokenKind::Dynamic,
        RawToken::Hoist => TokenKind::Hoist,
        RawToken::Const => TokenKind::Const,
        RawToken::Fun => TokenKind::Fun,
        RawToken::Class => TokenKind::Class,
        RawToken::Struct => TokenKind::Struct,
        RawToken::Union => TokenKind::Union,
        RawToken::Actor => TokenKind::Actor,
        RawToken::On => TokenKind::On,
        RawToken::New => TokenKind::New,
        RawToken::This => TokenKind::This,
        RawToken::Unsafe => TokenKind::Unsafe,
        RawToken::Scope => TokenKind::Scope,
        RawToken::Import => TokenKind::Import,
        RawToken::Java => TokenKind::Java,
        RawToken::Public => TokenKind::Public,
        RawToken::Private => TokenKind::Private,
        RawToken::Protected => TokenKind::Protected,
        RawToken::PrivateW => TokenKind::PrivateW,
        RawToken::ProtectedW => TokenKind::ProtectedW,
        RawToken::Static => TokenKind::Static,
        RawToken::Template => TokenKind::Template,
        RawToken::Typename => TokenKind::Typename,
        RawToken::Operator => TokenKind::Operator,
        RawToken::If => TokenKind::If,
        RawToken::Else => TokenKind::Else,
        RawToken::For => TokenKind::For,
        RawToken::While => TokenKind::While,
        RawToken::Do => TokenKind::Do,
        RawToken::Return => TokenKind::Return,
        RawToken::True => TokenKind::Bool(true),
        RawToken::False => TokenKind::Bool(false),
        RawToken::Null => TokenKind::Null,

        // Built-in types
        RawToken::IntTy => TokenKind::IntTy,
        RawToken::LongTy => TokenKind::LongTy,
        RawToken::ShortTy => TokenKind::ShortTy,
        RawToken::ByteTy => TokenKind::ByteTy,
        RawToken::FloatTy => TokenKind::FloatTy,
        RawToken::DoubleTy => TokenKind::DoubleTy,
        RawToken::StringTy => TokenKind::StringTy,
        RawToken::BoolTy => TokenKind::BoolTy,
        RawToken::FreeObj => TokenKind::FreeObj,
        RawToken::NumberTy => TokenKind::NumberTy,
        RawToken::BigIntTy => TokenKind::BigIntTy,
        RawToken::BigNumberTy => TokenKind::BigNumberTy,

        // Operators
        RawToken::Ellipsis => TokenKind::Ellipsis,
        RawToken::EqEq => TokenKind::EqEq,
        RawToken::BangEq => TokenKind::BangEq,
        RawToken::LtEq => TokenKind::LtEq,
        RawToken::GtEq => TokenKind::GtEq,
        RawToken::AmpAmp => TokenKind::AmpAmp,
        RawToken::PipePipe => TokenKind::PipePipe,
        RawToken::Arrow => TokenKind::Arrow,
        RawToken::FatArrow => TokenKind::FatArrow,
        RawToken::PlusEq => TokenKind::PlusEq,
        RawToken::MinusEq => TokenKind::MinusEq,
        RawToken::StarEq => TokenKind::StarEq,
        RawToken::SlashEq => TokenKind::SlashEq,
        RawToken::PercentEq => TokenKind::PercentEq,
        RawToken::Plus => TokenKind::Plus,
        RawToken::Minus => TokenKind::Minus,
        RawToken::Star => TokenKind::Star,
        RawToken::Slash => TokenKind::Slash,
        RawToken::Percent => TokenKind::Percent,
        RawToken::Eq => TokenKind::Eq,
        RawToken::Lt => TokenKind::Lt,
        RawToken::Gt => TokenKind::Gt,
        RawToken::Bang => TokenKind::Bang,
        RawToken::At => TokenKind::At,
        RawToken::Dot => TokenKind::Dot,

        // Delimiters
        RawToken::LBrace => TokenKind::LBrace,
        RawToken::RBrace => TokenKind::RBrace,
        RawToken::LParen => TokenKind::LParen,
        RawToken::RParen => TokenKind::RParen,
        RawToken::LBracket => TokenKind::LBracket,
        RawToken::RBracket => TokenKind::RBracket,
        RawToken::Colon => TokenKind::Colon,
        RawToken::Semi => TokenKind::Semi,
        RawToken::Comma => TokenKind::Comma,

        RawToken::Ident => TokenKind::Ident(slice.to_string()),

        // Handled in next_token before conversion
        RawToken::Amp
        | RawToken::Pipe
        | RawToken::LineComment
        | RawToken::BlockComment
        | RawToken::Int
        | RawToken::Float
        | RawToken::Quote
        | RawToken::Backtick => TokenKind::Error,
    }
}

/// Characters that can begin some token.
fn starts_token(c: char) -> bool {
    c.is_ascii_alphanumeric() || "_\"`+-*/%=<>!&|@.,;:(){}[]".contains(c)
}

/// Length of identifier characters (or a second fraction) stuck to the end
/// of a number, e.g. the `abc` in `12abc` or `.3` in `1.2.3`.
fn malformed_tail_len(rest: &str) -> usize {
    let bytes = rest.as_bytes();
    let mut i = 0;
    loop {
        match bytes.get(i) {
            Some(b) if b.is_ascii_alphanumeric() || *b == b'_' => i += 1,
            Some(b'.') if bytes.get(i + 1).is_some_and(u8::is_ascii_digit) => i += 2,
            _ => return i,
        }
    }
}

/// Parse a numeric literal. `None` when the value does not fit.
fn parse_number(raw: RawToken, slice: &str) -> Option<TokenKind> {
    let (digits, suffix) = strip_num_suffix(slice);
    match (raw, suffix) {
        (RawToken::Int, NumSuffix::Float) | (RawToken::Float, _) => {
            digits.parse::<f64>().ok().map(|v| TokenKind::Float(v, suffix))
        }
        _ => digits.parse::<i64>().ok().map(|v| TokenKind::Int(v, suffix)),
    }
}

/// Split the `l`/`f` suffix off a number literal.
fn strip_num_suffix(s: &str) -> (&str, NumSuffix) {
    if let Some(stripped) = s.strip_suffix(['l', 'L']) {
        (stripped, NumSuffix::Long)
    } else if let Some(stripped) = s.strip_suffix(['f', 'F']) {
        (stripped, NumSuffix::Float)
    } else {
        (s, NumSuffix::None)
    }
}

/// Scan string text after an opening quote or after the `}` ending an
/// interpolation. `"` strings stop at a newline; both kinds stop at EOF.
fn scan_string_body(rest: &str, quote: char) -> StringScan {
    let mut text = String::new();
    let mut bad_escape = None;
    let mut chars = rest.char_indices().peekable();

    while let Some((i, c)) = chars.next() {
        match c {
            c if c == quote => {
                return StringScan { text, end: StringEnd::Closed, consumed: i + 1, bad_escape };
            }
            '\n' if quote == '"' => {
                return StringScan { text, end: StringEnd::Unterminated, consumed: i, bad_escape };
            }
            '$' if matches!(chars.peek(), Some((_, '{'))) => {
                return StringScan { text, end: StringEnd::Interpolation, consumed: i + 2, bad_escape };
            }
            '\\' => match chars.peek().copied() {
                // A `"` string cannot continue past the line end, escaped or not
                Some((_, '\n')) if quote == '"' => {
                    return StringScan { text, end: StringEnd::Unterminated, consumed: i + 1, bad_escape };
                }
                Some((_, esc)) => {
                    chars.next();
                    match parse_escape(esc) {
                        Some(decoded) => text.push(decoded),
                        None => {
                            bad_escape.get_or_insert((i, esc));
                            text.push(esc);
                        }
                    }
                }
                None => break,
            },
            c => text.push(c),
        }
    }

    StringScan { text, end: StringEnd::Unterminated, consumed: rest.len(), bad_escape }
}

/// Decode the character after a backslash.
fn parse_escape(c: char) -> Option<char> {
    match c {
        'n' => Some('\n'),
        'r' => Some('\r'),
        't' => Some('\t'),
        '0' => Some('\0'),
        '\\' => Some('\\'),
        '"' => Some('"'),
        '\'' => Some('\''),
        '`' => Some('`'),
        '$' => Some('$'),
        _ => None,
    }
}

/// Result of lexing: tokens plus every problem found.
#[derive(Debug)]
pub struct LexResult {
    pub tokens: Vec<Token>,
    pub reporter: ErrorReporter,
}

impl LexResult {
    /// Returns true if lexing completed without errors.
    pub fn is_ok(&self) -> bool {
        !self.reporter.had_errors()
    }
}
