//! Error types for primitive parsing
//!
//! Comprehensive error taxonomy using thiserror

use thiserror::Error;

/// Errors raised while parsing an [`Address`](crate::ids::Address).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AddressError {
    #[error("Invalid hex in address: {0}")]
    InvalidHex(String),

    #[error("Invalid address length: expected {expected} bytes, got {actual}")]
    InvalidLength { expected: usize, actual: usize },
}
