//! Error types for the convex-schema crate.

use thiserror::Error;

/// Errors raised when reading schema vocabulary from text.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SchemaError {
    #[error("Unknown function type: {0}. Expected one of: query, mutation, action")]
    UnknownFunctionType(String),

    #[error("Unknown argument type: {0}")]
    UnknownArgType(String),
}
