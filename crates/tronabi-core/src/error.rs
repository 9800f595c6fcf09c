//! Error types for the tronabi encode/decode pipeline.

use thiserror::Error;

/// Errors raised while parsing types, building interfaces, encoding or decoding.
///
/// Every operation aborts on the first error and returns no partial output.
#[derive(Debug, Error)]
pub enum AbiError {
    #[error("Unsupported type: {ty}")]
    UnsupportedType { ty: String },

    #[error("Malformed tuple type: {ty}")]
    MalformedTuple { ty: String },

    #[error("Value type not supported: expected {expected}, got {got}")]
    ValueTypeNotSupported { expected: String, got: String },

    #[error("Bytes size mismatch: expected {expected}, got {got}")]
    BytesSizeMismatch { expected: usize, got: usize },

    #[error("Truncated input: need {needed} bytes, have {available}")]
    TruncatedInput { needed: usize, available: usize },

    #[error("Argument count mismatch: expected {expected}, got {got}")]
    ArgumentCount { expected: usize, got: usize },

    #[error("Length mismatch: expected {expected} elements, got {got}")]
    LengthMismatch { expected: usize, got: usize },

    #[error("Integer {value} out of range for {ty}")]
    IntegerOutOfRange { ty: String, value: String },

    #[error("Offset or length word does not fit in memory")]
    OffsetOverflow,

    #[error("Decoded value count exceeds the budget of {limit} for this input")]
    DecodeBudgetExceeded { limit: usize },

    #[error("Invalid UTF-8 in string payload")]
    InvalidUtf8,

    #[error("Invalid address: {reason}")]
    InvalidAddress { reason: String },

    #[error("Invalid hex: {0}")]
    InvalidHex(String),

    #[error("Missing topic at index {index}")]
    MissingTopic { index: usize },

    #[error("Selector mismatch: expected {expected}, got {got}")]
    SelectorMismatch { expected: String, got: String },

    #[error("Unknown method: {name}")]
    UnknownMethod { name: String },

    #[error("Unknown event: {name}")]
    UnknownEvent { name: String },

    #[error("Invalid ABI JSON: {0}")]
    InvalidAbiJson(#[from] serde_json::Error),

    #[error("A default address translator is already installed")]
    TranslatorAlreadyInstalled,
}

impl AbiError {
    pub(crate) fn unsupported(ty: impl Into<String>) -> Self {
        AbiError::UnsupportedType { ty: ty.into() }
    }

    pub(crate) fn malformed(ty: impl Into<String>) -> Self {
        AbiError::MalformedTuple { ty: ty.into() }
    }

    /// Shorthand for a value/type mismatch at the encoder boundary.
    pub fn value_mismatch(expected: impl Into<String>, got: impl Into<String>) -> Self {
        AbiError::ValueTypeNotSupported {
            expected: expected.into(),
            got: got.into(),
        }
    }
}

impl From<hex::FromHexError> for AbiError {
    fn from(e: hex::FromHexError) -> Self {
        AbiError::InvalidHex(e.to_string())
    }
}

/// Convenience alias used throughout the workspace.
pub type AbiResult<T> = Result<T, AbiError>;
