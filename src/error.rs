//! Error definitions for decoding, option handling, and output.

use thiserror::Error;

#[derive(Debug, Error)]
/// Top-level error type returned by public APIs.
///
/// Compound resolution itself never fails; every variant here originates
/// before it (decoding, options) or after it (serialization, I/O).
pub enum SolfaceError {
    /// Malformed JSON or an ABI item whose shape does not match its kind.
    #[error("decode error: {0}")]
    DecodeError(String),
    /// Invalid interface generation options (for example an empty interface name).
    #[error("option error: {0}")]
    OptionError(String),
    /// Output serialization failure.
    #[error("serialization error: {0}")]
    SerializationError(String),
    /// Filesystem I/O error from CLI or callers that propagate I/O.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}
