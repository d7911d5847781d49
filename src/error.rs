//! Error types for BSON construction and decoding.
//!
//! This module contains the [`Error`] type which represents all possible
//! errors that can occur when building or walking a BSON document. Policy
//! validation failures have their own offset-carrying type,
//! [`crate::ValidateError`].

use std::collections::TryReserveError;
use std::fmt::{self, Display};

use crate::BsonType;

/// Alias for a `Result` with the error type [`Error`].
pub type Result<T> = std::result::Result<T, Error>;

/// This type represents all possible errors that can occur when building
/// or decoding BSON data.
///
/// Every mutation failure is local and recoverable: the document is left
/// in its last valid state, byte for byte.
#[derive(Debug)]
pub enum Error {
    /// The buffer could not be grown.
    ///
    /// Growth goes through the document's injected grow function, which
    /// defaults to [`Vec::try_reserve_exact`]; its failure surfaces here
    /// instead of aborting the process.
    Alloc(TryReserveError),

    /// The operation would push the document past the 2^31 - 1 byte
    /// ceiling. Carries the total size that was requested.
    TooLarge(usize),

    /// Attempted to mutate a read-only (shared/static) document.
    ReadOnly,

    /// A key or a cstring-shaped value (regex pattern or options,
    /// dbpointer collection) contains an embedded NUL byte.
    EmbeddedNul,

    /// Structural corruption was detected while decoding.
    ///
    /// Carries the byte offset of the first inconsistent byte. The
    /// iterator that reported this is permanently exhausted; the
    /// underlying buffer is never touched.
    Corrupt(u32),

    /// A type-specific operation was applied to a field of another type,
    /// e.g. recursing into a non-container field.
    UnexpectedType(BsonType, BsonType),
}

impl Display for Error {
    fn fmt(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::Alloc(error) => formatter.write_str(&error.to_string()),
            Error::TooLarge(requested) => formatter.write_str(&format!(
                "document size {requested} exceeds the 2^31 - 1 byte limit"
            )),
            Error::ReadOnly => formatter.write_str("document is read-only"),
            Error::EmbeddedNul => {
                formatter.write_str("embedded NUL byte in key or cstring value")
            }
            Error::Corrupt(offset) => {
                formatter.write_str(&format!("corrupt BSON at byte offset {offset}"))
            }
            Error::UnexpectedType(expected, actual) => formatter.write_str(&format!(
                "unexpected BSON type: expected {expected:?}, got {actual:?}"
            )),
        }
    }
}

impl std::error::Error for Error {}

impl From<TryReserveError> for Error {
    fn from(error: TryReserveError) -> Self {
        Error::Alloc(error)
    }
}
