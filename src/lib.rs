pub mod artifacts;
pub mod benches;
pub mod config;
pub mod env;
pub mod error;
pub mod harness;
pub mod schema;

pub use error::{BenchError, Result};
