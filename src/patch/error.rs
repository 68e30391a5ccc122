//! Model patch errors.

use thiserror::Error;

/// Errors raised while validating or applying model update operations.
///
/// Any of these aborts the whole update list; the model is left as it was
/// before the call.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum PatchError {
    #[error("Invalid path '{path}': {reason}")]
    InvalidPath { path: String, reason: String },

    #[error("Parent of '{path}' does not exist")]
    MissingParent { path: String },

    #[error("Nothing to {op} at '{path}'")]
    MissingTarget { op: &'static str, path: String },

    #[error("Value at the parent of '{path}' is neither an object nor an array")]
    NotAContainer { path: String },

    #[error("Array index '{index}' in '{path}' is out of bounds or malformed")]
    InvalidIndex { path: String, index: String },

    #[error("Expected a JSON object to derive update operations from, got {found}")]
    NotAnObject { found: String },
}
