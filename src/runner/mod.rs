mod error;
mod runner;

pub use error::TranspileError;
pub use runner::{run_file, run_prompt, transpile_source, HAD_ERROR};
