use thiserror::Error;

use crate::generator::GenError;
use crate::lexer::LexError;
use crate::parser::ParseError;

/// Unifies the three pipeline stages' error types for callers that just
/// want to run `Lexer -> Parser -> Generator` end to end and report one
/// failure. Each stage's own error type is still the one returned by that
/// stage directly — this only exists at the runner boundary.
#[derive(Debug, Error)]
pub enum TranspileError {
    #[error("{}", .0.iter().map(ToString::to_string).collect::<Vec<_>>().join("\n"))]
    Lex(Vec<LexError>),

    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Gen(#[from] GenError),
}
