use bdoc_types::{Int64Error, ObjectIdError};
use thiserror::Error;

/// Convenience alias used across the crate.
pub type Result<T, E = Error> = core::result::Result<T, E>;

/// Errors surfaced by the codec.
///
/// Encoding and decoding fail as a whole: no partial output survives an
/// error, and nothing is retried internally.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum Error {
    /// A document key started with `$` while strict key checking was on.
    #[error("key {0:?} must not start with '$'")]
    InvalidKeyDollar(String),
    /// A document key contained `.` while strict key checking was on.
    #[error("key {0:?} must not contain '.'")]
    InvalidKeyDot(String),
    /// The value cannot be framed on the wire.
    #[error("value cannot be encoded: {0}")]
    UnsupportedValue(&'static str),
    /// An identifier was neither 12 raw bytes nor 24 hex characters.
    #[error("invalid object id: {0}")]
    InvalidObjectId(#[from] ObjectIdError),
    /// A 64-bit division had a zero divisor.
    #[error("division by zero")]
    DivisionByZero,
    /// A 64-bit value was rendered in a radix other than 10 or 16.
    #[error("unsupported radix {0}")]
    UnsupportedRadix(u32),
    /// A declared length reached past the end of the input.
    #[error("need {expected} more bytes but only {remaining} remain")]
    Truncated {
        /// Bytes the current read required.
        expected: usize,
        /// Bytes actually left in the input.
        remaining: usize,
    },
    /// An element carried a type byte this library does not know.
    #[error("unknown element tag {tag:#04x} at offset {offset}")]
    UnknownTag {
        /// The offending type byte.
        tag: u8,
        /// Absolute offset of the type byte in the input.
        offset: usize,
    },
    /// A document or array was not terminated by a `0x00` byte.
    #[error("missing document terminator")]
    MissingTerminator,
    /// A string payload or key was not valid UTF-8.
    #[error("invalid utf-8 at offset {offset}")]
    InvalidUtf8 {
        /// Absolute offset of the first invalid byte region.
        offset: usize,
    },
}

impl From<Int64Error> for Error {
    fn from(err: Int64Error) -> Self {
        match err {
            Int64Error::DivisionByZero => Error::DivisionByZero,
            Int64Error::UnsupportedRadix(radix) => Error::UnsupportedRadix(radix),
        }
    }
}
