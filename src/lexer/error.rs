use thiserror::Error;

/// Failures raised while scanning source text into tokens.
///
/// This sits outside the CORE pipeline (the parser only ever sees a
/// well-formed `Token[]`), but a lexer that feeds it still needs somewhere
/// to report its own problems.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LexError {
    #[error("[line {line}] Unexpected character: {character}")]
    UnexpectedCharacter { line: usize, character: char },

    #[error("[line {line}] Unterminated string.")]
    UnterminatedString { line: usize },
}
