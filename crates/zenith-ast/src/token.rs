// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Token definitions for the lexer.

use crate::{SourceLocation, Span};

/// A token produced by the lexer.
///
/// `lexeme` is the exact source slice, `leading_trivia` the whitespace and
/// comments skipped right before it. Concatenating trivia and lexeme over a
/// whole token stream gives back the source text.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Token {
    pub kind: TokenKind,
    pub lexeme: String,
    pub loc: SourceLocation,
    pub leading_trivia: Span,
}

impl Token {
    pub fn span(&self) -> Span {
        self.loc.span()
    }
}

/// Suffix written after a numeric literal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum NumSuffix {
    #[default]
    None,
    /// `l` / `L`
    Long,
    /// `f` / `F`
    Float,
}

/// The kind of token.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum TokenKind {
    // Literals
    Int(i64, NumSuffix),
    Float(f64, NumSuffix),
    String(String),
    /// Opening quote up to and including the first `${`.
    TemplateHead(String),
    /// `}` up to and including the next `${`.
    TemplateMiddle(String),
    /// `}` up to and including the closing quote.
    TemplateTail(String),
    Bool(bool),
    Null,

    // Identifier
    Ident(String),

    // Declaration keywords
    Let,
    Var,
    Dynamic,
    Hoist,
    Const,
    Fun,
    Class,
    Struct,
    Union,
    Actor,
    On,
    New,
    This,
    Unsafe,
    Scope,
    Import,
    Java,
    Public,
    Private,
    Protected,
    PrivateW,
    ProtectedW,
    Static,
    Template,
    Typename,
    Operator,

    // Control flow
    If,
    Else,
    For,
    While,
    Do,
    Return,

    // Built-in type names
    IntTy,
    LongTy,
    ShortTy,
    ByteTy,
    FloatTy,
    DoubleTy,
    StringTy,
    BoolTy,
    FreeObj,
    NumberTy,
    BigIntTy,
    BigNumberTy,

    // Operators
    Plus,
    Minus,
    Star,
    Slash,
    Percent,
    Eq,
    EqEq,
    BangEq,
    Lt,
    LtEq,
    Gt,
    GtEq,
    Bang,
    PlusEq,
    MinusEq,
    StarEq,
    SlashEq,
    PercentEq,
    AmpAmp,
    PipePipe,
    Arrow,
    FatArrow,
    At,
    Dot,
    Ellipsis,

    // Delimiters
    LBrace,
    RBrace,
    LParen,
    RParen,
    LBracket,
    RBracket,
    Colon,
    Semi,
    Comma,

    // Special
    /// Malformed input that the lexer already reported.
    Error,
    Eof,
}

impl TokenKind {
    /// Human-readable name for error messages.
    pub fn display_name(&self) -> &'static str {
        match self {
            TokenKind::Int(..) => "integer",
            TokenKind::Float(..) => "number",
            TokenKind::String(_) => "string",
            TokenKind::TemplateHead(_) => "template string",
            TokenKind::TemplateMiddle(_) | TokenKind::TemplateTail(_) => "template string segment",
            TokenKind::Bool(true) => "'true'",
            TokenKind::Bool(false) => "'false'",
            TokenKind::Null => "'null'",
            TokenKind::Ident(_) => "identifier",

            TokenKind::Let => "'let'",
            TokenKind::Var => "'var'",
            TokenKind::Dynamic => "'dynamic'",
            TokenKind::Hoist => "'hoist'",
            TokenKind::Const => "'const'",
            TokenKind::Fun => "'fun'",
            TokenKind::Class => "'class'",
            TokenKind::Struct => "'struct'",
            TokenKind::Union => "'union'",
            TokenKind::Actor => "'actor'",
            TokenKind::On => "'on'",
            TokenKind::New => "'new'",
            TokenKind::This => "'this'",
            TokenKind::Unsafe => "'unsafe'",
            TokenKind::Scope => "'scope'",
            TokenKind::Import => "'import'",
            TokenKind::Java => "'java'",
            TokenKind::Public => "'public'",
            TokenKind::Private => "'private'",
            TokenKind::Protected => "'protected'",
            TokenKind::PrivateW => "'privatew'",
            TokenKind::ProtectedW => "'protectedw'",
            TokenKind::Static => "'static'",
            TokenKind::Template => "'template'",
            TokenKind::Typename => "'typename'",
            TokenKind::Operator => "'operator'",

            TokenKind::If => "'if'",
            TokenKind::Else => "'else'",
            TokenKind::For => "'for'",
            TokenKind::While => "'while'",
            TokenKind::Do => "'do'",
            TokenKind::Return => "'return'",

            TokenKind::IntTy => "'int'",
            TokenKind::LongTy => "'long'",
            TokenKind::ShortTy => "'short'",
            TokenKind::ByteTy => "'byte'",
            TokenKind::FloatTy => "'float'",
            TokenKind::DoubleTy => "'double'",
            TokenKind::StringTy => "'string'",
            TokenKind::BoolTy => "'bool'",
            TokenKind::FreeObj => "'freeobj'",
            TokenKind::NumberTy => "'Number'",
            TokenKind::BigIntTy => "'BigInt'",
            TokenKind::BigNumberTy => "'BigNumber'",

            TokenKind::Plus => "'+'",
            TokenKind::Minus => "'-'",
            TokenKind::Star => "'*'",
            TokenKind::Slash => "'/'",
            TokenKind::Percent => "'%'",
            TokenKind::Eq => "'='",
            TokenKind::EqEq => "'=='",
            TokenKind::BangEq => "'!='",
            TokenKind::Lt => "'<'",
            TokenKind::LtEq => "'<='",
            TokenKind::Gt => "'>'",
            TokenKind::GtEq => "'>='",
            TokenKind::Bang => "'!'",
            TokenKind::PlusEq => "'+='",
            TokenKind::MinusEq => "'-='",
            TokenKind::StarEq => "'*='",
            TokenKind::SlashEq => "'/='",
            TokenKind::PercentEq => "'%='",
            TokenKind::AmpAmp => "'&&'",
            TokenKind::PipePipe => "'||'",
            TokenKind::Arrow => "'->'",
            TokenKind::FatArrow => "'=>'",
            TokenKind::At => "'@'",
            TokenKind::Dot => "'.'",
            TokenKind::Ellipsis => "'...'",

            TokenKind::LBrace => "'{'",
            TokenKind::RBrace => "'}'",
            TokenKind::LParen => "'('",
            TokenKind::RParen => "')'",
            TokenKind::LBracket => "'['",
            TokenKind::RBracket => "']'",
            TokenKind::Colon => "':'",
            TokenKind::Semi => "';'",
            TokenKind::Comma => "','",

            TokenKind::Error => "invalid input",
            TokenKind::Eof => "end of file",
        }
    }

    /// Keywords naming a built-in type.
    pub fn is_primitive_type(&self) -> bool {
        matches!(
            self,
            TokenKind::IntTy
                | TokenKind::LongTy
                | TokenKind::ShortTy
                | TokenKind::ByteTy
                | TokenKind::FloatTy
                | TokenKind::DoubleTy
                | TokenKind::StringTy
                | TokenKind::BoolTy
                | TokenKind::FreeObj
                | TokenKind::NumberTy
                | TokenKind::BigIntTy
                | TokenKind::BigNumberTy
                | TokenKind::Dynamic
        )
    }

    /// Tokens that begin a declaration; the parser resynchronizes on these.
    pub fn starts_declaration(&self) -> bool {
        matches!(
            self,
            TokenKind::Fun
                | TokenKind::Class
                | TokenKind::Struct
                | TokenKind::Union
                | TokenKind::Actor
                | TokenKind::Import
                | TokenKind::Template
                | TokenKind::Operator
                | TokenKind::At
        )
    }
}
