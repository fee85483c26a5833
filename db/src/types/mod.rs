//! Shared types for query results.

mod results;
mod value;

pub use results::{ExecutionOutcome, Row, TabularResult};
pub use value::Value;
