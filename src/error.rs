//! Error types for the ABI codec
//!
//! Every failure is returned to the caller immediately. The codec never
//! retries and never hands back a partially decoded value.

use thiserror::Error;

/// Result alias used throughout the crate
pub type Result<T> = std::result::Result<T, Error>;

/// Errors produced while parsing types, encoding, decoding or mapping values
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// Malformed type signature or field description
    #[error("invalid type '{input}': {reason}")]
    Parse { input: String, reason: String },

    /// Value shape disagrees with the declared type
    #[error("invalid value: {0}")]
    Validation(String),

    /// Fewer bytes remain than a word (or selector) requires
    #[error("input too short: need {needed} bytes, have {available}")]
    Truncated { needed: usize, available: usize },

    /// Offset or length points outside the buffer or above the safety limit
    #[error("out of bounds: {0}")]
    Bounds(String),

    /// Padding violation in a boolean, function or text payload
    #[error("malformed word: {0}")]
    Format(String),

    /// Two tuple fields resolve to the same key
    #[error("tuple with repeated field '{0}'")]
    DuplicateField(String),

    /// Decoded value cannot be projected onto the target record
    #[error("cannot map value: {0}")]
    Mapping(String),

    /// Contract description could not be read
    #[error("invalid contract description: {0}")]
    Description(String),
}

impl Error {
    pub(crate) fn parse(input: &str, reason: impl Into<String>) -> Self {
        Self::Parse {
            input: input.to_string(),
            reason: reason.into(),
        }
    }

    pub(crate) fn validation(reason: impl Into<String>) -> Self {
        Self::Validation(reason.into())
    }

    pub(crate) fn truncated(needed: usize, available: usize) -> Self {
        Self::Truncated { needed, available }
    }

    pub(crate) fn mapping(reason: impl Into<String>) -> Self {
        Self::Mapping(reason.into())
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Self::Description(err.to_string())
    }
}
