pub mod ast;
mod error;
mod parser;

pub use ast::{Expr, ExprVisitor, Stmt, StmtVisitor};
pub use error::ParseError;
pub use parser::Parser;
