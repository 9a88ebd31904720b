mod error;
mod generator;

pub use error::GenError;
pub use generator::Generator;
