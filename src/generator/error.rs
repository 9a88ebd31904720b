use thiserror::Error;

/// Errors the code generator can raise. Both variants are defensive: the
/// parser's invariants guarantee `Binary.operator` and `Unary.operator`
/// only ever carry the arithmetic kinds these match against, so in
/// practice these never fire on an AST the parser produced — but the
/// generator doesn't assume that and checks anyway.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GenError {
    #[error("Unknown binary operator: {lexeme}")]
    UnknownBinaryOperator { lexeme: String },

    #[error("Unknown unary operator: {lexeme}")]
    UnknownUnaryOperator { lexeme: String },
}
