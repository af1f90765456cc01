//! OPVM Error Types
//!
//! Defines every error condition produced by the operand substrate.
//! Errors are surfaced synchronously to the immediate caller and never retried.

use std::io;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum OpvmError {
    // Operand stack errors
    #[error("operation is not valid on an empty collection")]
    EmptyCollection,
    #[error("invalid argument: {reason}")]
    InvalidArgument { reason: String },
    #[error("collection was modified; iteration cannot continue")]
    InvalidatedIteration,
    #[error("iterator is not positioned on an element ({0})")]
    InvalidIteratorState(&'static str),

    // Encoding errors
    #[error("malformed encoding at offset {offset}: {reason}")]
    MalformedEncoding { offset: usize, reason: &'static str },

    // IO boundary, carried unchanged from the wrapped stream
    #[error("underlying stream failure: {0}")]
    Stream(#[from] io::Error),

    // Configuration
    #[error("invalid configuration: {0}")]
    Config(String),
}

impl OpvmError {
    pub(crate) fn invalid_argument(reason: impl Into<String>) -> Self {
        OpvmError::InvalidArgument { reason: reason.into() }
    }

    pub(crate) fn malformed(offset: usize, reason: &'static str) -> Self {
        OpvmError::MalformedEncoding { offset, reason }
    }
}

pub type OpvmResult<T> = Result<T, OpvmError>;
