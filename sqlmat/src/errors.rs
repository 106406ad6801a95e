///
/// Bridge error types.
///
/// Every failure of a binder, materializer or codec call. Any of these
/// aborts the call; buffers allocated so far are dropped and no partial
/// result is returned. Conditions that let the call complete are
/// `crate::warning::Warning`s instead.
///
/// `Error::identifier()` gives a structured id for the host: engine failures
/// map to `SQLITE:<NAME>` from SQLite's primary result code, everything else
/// to `SQLMAT:<Kind>`.
///

use rusqlite::ffi;
use sqlmat_codec::BlobError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("no or wrong argument: {0}")]
    InvalidArgument(String),

    #[error("unexpected arguments passed: statement takes {expected}, got {given}")]
    UnexpectedArguments { expected: usize, given: usize },

    #[error("unsupported variable type: {0}")]
    UnsupportedType(String),

    #[error("BLOB exceeds maximum allowed size ({size} > {max} bytes)")]
    SizeExceeded { size: usize, max: usize },

    #[error("typed BLOB magic tag mismatch")]
    BadMagic,

    #[error("unsupported typed BLOB header version {found}")]
    UnsupportedVersion { found: i16 },

    #[error("typed BLOB payload holds {actual} bytes, header describes {expected}")]
    SizeMismatch { expected: usize, actual: usize },

    #[error("unknown/unsupported typed blob header: {0}")]
    UnsupportedTypedBlobHeader(String),

    #[error("memory allocation error ({0} bytes)")]
    MemoryError(usize),

    #[error("{message}")]
    Engine { code: i32, message: String },

    #[error("configuration error: {0}")]
    Config(String),

    #[error("{0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    pub fn kind_name(&self) -> &'static str {
        match self {
            Error::InvalidArgument(_) => "InvalidArgument",
            Error::UnexpectedArguments { .. } => "UnexpectedArguments",
            Error::UnsupportedType(_) => "UnsupportedType",
            Error::SizeExceeded { .. } => "SizeExceeded",
            Error::BadMagic => "BadMagic",
            Error::UnsupportedVersion { .. } => "UnsupportedVersion",
            Error::SizeMismatch { .. } => "SizeMismatch",
            Error::UnsupportedTypedBlobHeader(_) => "UnsupportedTypedBlobHeader",
            Error::MemoryError(_) => "MemoryError",
            Error::Engine { .. } => "EngineError",
            Error::Config(_) => "Config",
            Error::Io(_) => "Io",
        }
    }

    pub fn identifier(&self) -> String {
        match self {
            Error::Engine { code, .. } => engine_identifier(*code),
            other => format!("SQLMAT:{}", other.kind_name()),
        }
    }
}

impl From<rusqlite::Error> for Error {
    fn from(e: rusqlite::Error) -> Self {
        match e {
            rusqlite::Error::SqliteFailure(err, message) => Error::Engine {
                code: err.extended_code,
                message: message.unwrap_or_else(|| err.to_string()),
            },
            other => Error::Engine {
                code: -1,
                message: other.to_string(),
            },
        }
    }
}

impl From<BlobError> for Error {
    fn from(e: BlobError) -> Self {
        match e {
            BlobError::SizeExceeded { size, max } => Error::SizeExceeded { size, max },
            BlobError::LengthMismatch { .. } => Error::InvalidArgument(e.to_string()),
            BlobError::BadMagic => Error::BadMagic,
            BlobError::UnsupportedVersion { found, .. } => Error::UnsupportedVersion { found },
            BlobError::UnsupportedHeader(reason) => Error::UnsupportedTypedBlobHeader(reason),
            BlobError::UnknownElementType(id) => {
                Error::UnsupportedType(format!("typed BLOB element type id {}", id))
            }
            BlobError::SizeMismatch { expected, actual } => Error::SizeMismatch { expected, actual },
            BlobError::OutOfMemory { size } => Error::MemoryError(size),
        }
    }
}

/// `SQLITE:<NAME>` for the primary result code inside an extended code.
pub fn engine_identifier(code: i32) -> String {
    if code < 0 {
        return format!("SQLITE:{}", code);
    }
    let name = match code & 0xFF {
        ffi::SQLITE_OK => "OK",
        ffi::SQLITE_ERROR => "ERROR",
        ffi::SQLITE_INTERNAL => "INTERNAL",
        ffi::SQLITE_PERM => "PERM",
        ffi::SQLITE_ABORT => "ABORT",
        ffi::SQLITE_BUSY => "BUSY",
        ffi::SQLITE_LOCKED => "LOCKED",
        ffi::SQLITE_NOMEM => "NOMEM",
        ffi::SQLITE_READONLY => "READONLY",
        ffi::SQLITE_INTERRUPT => "INTERRUPT",
        ffi::SQLITE_IOERR => "IOERR",
        ffi::SQLITE_CORRUPT => "CORRUPT",
        ffi::SQLITE_NOTFOUND => "NOTFOUND",
        ffi::SQLITE_FULL => "FULL",
        ffi::SQLITE_CANTOPEN => "CANTOPEN",
        ffi::SQLITE_PROTOCOL => "PROTOCOL",
        ffi::SQLITE_EMPTY => "EMPTY",
        ffi::SQLITE_SCHEMA => "SCHEMA",
        ffi::SQLITE_TOOBIG => "TOOBIG",
        ffi::SQLITE_CONSTRAINT => "CONSTRAINT",
        ffi::SQLITE_MISMATCH => "MISMATCH",
        ffi::SQLITE_MISUSE => "MISUSE",
        ffi::SQLITE_NOLFS => "NOLFS",
        ffi::SQLITE_AUTH => "AUTH",
        ffi::SQLITE_FORMAT => "FORMAT",
        ffi::SQLITE_RANGE => "RANGE",
        ffi::SQLITE_NOTADB => "NOTADB",
        ffi::SQLITE_ROW => "ROW",
        ffi::SQLITE_DONE => "DONE",
        _ => return format!("SQLITE:{}", code),
    };
    format!("SQLITE:{}", name)
}
