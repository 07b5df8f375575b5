//! Error types for `RstKit`

use thiserror::Error;

/// The error type for `RstKit` operations.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum Error {
    // ==================== IO Errors ====================
    /// IO error from file operations.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // ==================== RST Format Errors ====================
    /// The file is not a valid string table (missing RST magic).
    #[error("invalid RST magic: expected RST, found {0:?}")]
    InvalidMagic([u8; 3]),

    /// The RST version byte is not supported.
    #[error("unsupported RST version: {0} (supported: 2-5)")]
    UnsupportedVersion(u8),

    /// The version name in a JSON document is not recognised.
    #[error("unsupported RST version name: {0:?}")]
    UnsupportedVersionName(String),

    /// A read would run past the end of the buffer (truncated or corrupt file).
    #[error("read of {len} bytes at offset {offset} exceeds buffer size {size}")]
    OutOfRange {
        /// Offset the read started at.
        offset: usize,
        /// Number of bytes requested.
        len: usize,
        /// Total size of the buffer.
        size: usize,
    },

    /// A content offset does not fit in the bits left above the hash mask.
    #[error("content offset {offset} does not fit in {bits} bits")]
    OffsetOverflow {
        /// The content offset that was being packed.
        offset: u64,
        /// Number of bits available for the offset.
        bits: u8,
    },

    /// A negative content offset was passed to a packing operation.
    #[error("content offset must not be negative, got {0}")]
    NegativeOffset(i64),

    /// Strict insert of a hash that is already present in the table.
    #[error("hash {0:x} is already present in the table")]
    KeyConflict(u64),

    // ==================== Argument Errors ====================
    /// A required argument was empty or otherwise unusable.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    // ==================== Parsing Errors ====================
    /// The document is structurally invalid (e.g. JSON without an `entries` object).
    #[error("invalid format: {0}")]
    InvalidFormat(String),

    /// JSON parsing or serialization error.
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    // ==================== File System Errors ====================
    /// Directory traversal error.
    #[error("directory walk error: {0}")]
    WalkDirError(String),

    /// Two inputs of a batch would write the same output, or an output
    /// would overwrite another input of the batch.
    #[error("output path {} is claimed by more than one input", .0.display())]
    OutputConflict(std::path::PathBuf),

    /// Persisting a temporary output file failed.
    #[error("failed to persist output file: {0}")]
    PersistError(String),
}

impl From<walkdir::Error> for Error {
    fn from(err: walkdir::Error) -> Self {
        Error::WalkDirError(err.to_string())
    }
}

impl From<tempfile::PersistError> for Error {
    fn from(err: tempfile::PersistError) -> Self {
        Error::PersistError(err.error.to_string())
    }
}

/// A specialized Result type for `RstKit` operations.
pub type Result<T> = std::result::Result<T, Error>;
