mod error;
mod lexer;

pub use error::LexError;
pub use lexer::{Lexer, Literal, Token, TokenKind};
