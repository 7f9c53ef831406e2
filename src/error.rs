//! Error types for document and query operations

use thiserror::Error;

/// Result type alias for query operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for hdt-query
#[derive(Error, Debug)]
pub enum Error {
    /// The filename handed to `Document::open` was empty
    #[error("Invalid filename: {0:?}")]
    InvalidFilename(String),

    /// The index file does not exist or cannot be read
    #[error("Could not open file \"{path}\"")]
    CouldNotOpen {
        /// Path as given by the caller
        path: String,
    },

    /// The file exists but does not decode as an index snapshot
    #[error("The file \"{path}\" is not a valid index file: {reason}")]
    InvalidFile {
        /// Path as given by the caller
        path: String,
        /// What failed while decoding
        reason: String,
    },

    /// The document was closed before or during the query
    #[error("The document cannot be accessed because it is closed")]
    Closed,

    /// The index or the requested role does not support the operation
    #[error("Unsupported operation: {0}")]
    Unsupported(String),

    /// Malformed request arguments
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// A positional seek past the end of a match set
    #[error("Cannot seek to offset {offset}, only {len} matches")]
    SeekOutOfRange {
        /// Requested position
        offset: usize,
        /// Number of matches
        len: usize,
    },

    /// Failure inside the triple index
    #[error("Index error: {0}")]
    Index(String),

    /// A query could not be scheduled or its worker failed
    #[error("Dispatch error: {0}")]
    Dispatch(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<bincode::Error> for Error {
    fn from(err: bincode::Error) -> Self {
        Error::Serialization(err.to_string())
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Serialization(err.to_string())
    }
}
