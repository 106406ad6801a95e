///
/// Typed BLOB codec errors.
///
/// Every failure of `typed_blob::encode` and `typed_blob::decode`. None of
/// them are recoverable mid-call: the caller gets no partial output.
///

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BlobError {
    #[error("BLOB exceeds maximum allowed size ({size} > {max} bytes)")]
    SizeExceeded { size: usize, max: usize },

    #[error("payload holds {actual} bytes but the array needs {expected}")]
    LengthMismatch { expected: usize, actual: usize },

    #[error("typed BLOB magic tag mismatch")]
    BadMagic,

    #[error("unsupported typed BLOB header version {found} (expected {expected})")]
    UnsupportedVersion { found: i16, expected: i16 },

    #[error("unknown/unsupported typed BLOB header: {0}")]
    UnsupportedHeader(String),

    #[error("unknown element type id {0}")]
    UnknownElementType(i32),

    #[error("typed BLOB payload holds {actual} bytes, header describes {expected}")]
    SizeMismatch { expected: usize, actual: usize },

    #[error("memory allocation error ({size} bytes)")]
    OutOfMemory { size: usize },
}
