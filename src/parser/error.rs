use thiserror::Error;

/// The parser's error taxonomy. Every variant maps to exactly one failure
/// condition in the grammar; parsing halts on the first one raised.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("{message} Got {lexeme}")]
    SyntaxExpect { message: String, lexeme: String },

    #[error("Unexpected token: {lexeme}")]
    UnexpectedToken { lexeme: String },

    #[error("Invalid assignment target.")]
    InvalidAssignTarget,

    #[error("Invalid increment target.")]
    InvalidIncrementTarget,

    #[error("Invalid decrement target.")]
    InvalidDecrementTarget,
}
