//! Error types

use std::fmt;

/// Result type with [`Error`].
pub type Result<T> = core::result::Result<T, Error>;

/// Kinds of errors.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
#[non_exhaustive]
pub enum Error {
    /// Argument outside of its documented domain
    ArgumentError,

    /// Stored checksum of a configuration record does not match its contents
    ChecksumError,

    /// Response from the device could not be interpreted
    MalformedResponse {
        /// What was wrong with the response
        reason: &'static str,
    },

    /// Text input could not be parsed
    ParseError,

    /// Size error
    SizeError,
}

impl Error {
    /// Name of the error.
    ///
    /// These names map to the variant identifiers and are stable across
    /// releases.
    pub fn name(self) -> &'static str {
        match self {
            Error::ArgumentError => "ArgumentError",
            Error::ChecksumError => "ChecksumError",
            Error::MalformedResponse { .. } => "MalformedResponse",
            Error::ParseError => "ParseError",
            Error::SizeError => "SizeError",
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::ArgumentError => f.write_str("argument error"),
            Error::ChecksumError => f.write_str("checksum mismatch"),
            Error::MalformedResponse { reason } => write!(f, "malformed response: {}", reason),
            Error::ParseError => f.write_str("parse error"),
            Error::SizeError => f.write_str("size error"),
        }
    }
}

impl std::error::Error for Error {}
