use thiserror::Error;

use crate::types::FieldType;
use crate::value::Value;

#[derive(Debug, Error)]
pub enum AnvilError {
    /// No execution context was supplied before running a query
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Query-construction invariant violated at compile time
    #[error("Query error: {0}")]
    Query(String),

    /// Operator used in a position where it has no meaning
    #[error("Unsupported operation: {0}")]
    Unsupported(String),

    /// Comparison value cannot be coerced to the declared field type
    #[error("Cannot coerce {value} to {target}")]
    Coercion { value: Value, target: FieldType },

    /// Error raised by the engine while executing a compiled query
    #[error("Execution error: {0}")]
    Execution(String),

    /// Error mapping a row into the requested result shape
    #[error("Mapping error: {0}")]
    Mapping(String),

    /// No rows returned when at least one was expected
    #[error("No rows found")]
    NotFound,
}

impl AnvilError {
    pub fn query(message: impl Into<String>) -> Self {
        Self::Query(message.into())
    }

    pub fn unsupported(message: impl Into<String>) -> Self {
        Self::Unsupported(message.into())
    }
}

/// Result type for query building and execution
pub type Result<T> = std::result::Result<T, AnvilError>;
