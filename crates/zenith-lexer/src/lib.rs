//! Lexer for the Zenith language.
//!
//! Tokenizes source code into a stream of tokens for the parser.

mod error;
mod lexer;

pub use error::{LexError, LexErrorKind};
pub use lexer::{LexResult, Lexer};
