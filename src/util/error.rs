//! Error types for meshbundle operations.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for codec and container operations.
#[derive(Error, Debug)]
pub enum Error {
    /// The compression primitive produced no output
    #[error("Encoding failed: {0}")]
    Encoding(String),

    /// The decompression primitive reported a nonzero status
    #[error("Decoding {what} failed: error code {code}")]
    Decoding { what: &'static str, code: i32 },

    /// Caller violated a precondition
    #[error("Validation failed: {0}")]
    Validation(String),

    /// Expected file or archive entry is absent
    #[error("Not found: {0}")]
    NotFound(String),

    /// Malformed container (truncated header, bad JSON, corrupt data)
    #[error("Invalid format: {0}")]
    Format(String),

    /// Writing a combined bundle failed; the cause is kept as the source
    #[error("Failed to write {}: {source}", .path.display())]
    WriteFailed {
        path: PathBuf,
        #[source]
        source: Box<Error>,
    },

    /// Reading a combined bundle failed; the cause is kept as the source
    #[error("Failed to read {}: {source}", .path.display())]
    ReadFailed {
        path: PathBuf,
        #[source]
        source: Box<Error>,
    },

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Create a validation error.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Create a format error.
    pub fn format(msg: impl Into<String>) -> Self {
        Self::Format(msg.into())
    }

    /// Create a not-found error.
    pub fn not_found(what: impl Into<String>) -> Self {
        Self::NotFound(what.into())
    }

    /// Innermost error, looking through aggregate write/read failures.
    pub fn root_cause(&self) -> &Error {
        match self {
            Self::WriteFailed { source, .. } | Self::ReadFailed { source, .. } => {
                source.root_cause()
            }
            other => other,
        }
    }

    /// True if the root cause is a missing file or entry.
    pub fn is_not_found(&self) -> bool {
        matches!(self.root_cause(), Self::NotFound(_))
    }

    /// True if the root cause is a violated precondition.
    pub fn is_validation(&self) -> bool {
        matches!(self.root_cause(), Self::Validation(_))
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        use serde_json::error::Category;
        match e.classify() {
            Category::Io => Self::Io(e.into()),
            Category::Data => Self::Validation(format!("metadata: {}", e)),
            Category::Syntax | Category::Eof => Self::Format(format!("metadata JSON: {}", e)),
        }
    }
}

impl From<zip::result::ZipError> for Error {
    fn from(e: zip::result::ZipError) -> Self {
        use zip::result::ZipError;
        match e {
            ZipError::Io(io) => Self::Io(io),
            ZipError::FileNotFound => Self::NotFound("archive entry".to_string()),
            ZipError::InvalidArchive(msg) => Self::Validation(format!("invalid zip archive: {}", msg)),
            other => Self::Format(other.to_string()),
        }
    }
}

/// Result type alias for meshbundle operations.
pub type Result<T> = std::result::Result<T, Error>;
