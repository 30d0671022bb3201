//! Error types for parsing roomwatch input data.

use thiserror::Error;

/// Errors that can occur when parsing threshold or quantity input.
///
/// This enum is marked `#[non_exhaustive]` to allow adding new error variants
/// in future versions without breaking downstream code.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum ParseError {
    /// A mandatory threshold field was not supplied.
    #[error("Missing field: {0}")]
    MissingField(&'static str),

    /// A field value did not parse to a finite number.
    #[error("Invalid number for {field}: {value:?}")]
    InvalidNumber { field: String, value: String },

    /// A field name that is not part of a threshold set.
    #[error("Unknown threshold field: {0}")]
    UnknownField(String),

    /// A quantity name that does not match any measured quantity.
    #[error("Unknown quantity: {0}")]
    UnknownQuantity(String),
}

/// Result type alias using roomwatch-types' ParseError type.
pub type ParseResult<T> = std::result::Result<T, ParseError>;
