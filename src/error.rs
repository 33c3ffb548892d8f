//! Global error handling for codemapper
//!
//! Per-file access problems never reach this type: they are folded into the
//! scan as skipped entries. Only configuration and final-write failures abort
//! a run.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Global error type for codemapper operations
#[derive(Error, Debug)]
pub enum CodeMapError {
    /// Malformed or contradictory configuration, detected before traversal
    #[error("Configuration error: {0}")]
    Config(String),

    /// File system errors outside of per-file classification
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// JSON processing errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Named profile could not be found or stored
    #[error("Profile error: {0}")]
    Profile(String),

    /// The finished map could not be written to its destination
    #[error("Failed to write map to {path}: {source}")]
    Serialization {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Invalid argument
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}

impl CodeMapError {
    pub(crate) fn serialization(path: impl Into<PathBuf>, source: io::Error) -> Self {
        CodeMapError::Serialization {
            path: path.into(),
            source,
        }
    }
}

/// Specialized Result type for codemapper operations
pub type Result<T> = std::result::Result<T, CodeMapError>;

/// Creates a CodeMapError with a formatted message
#[macro_export]
macro_rules! error {
    ($error_type:ident, $($arg:tt)*) => {
        $crate::error::CodeMapError::$error_type(format!($($arg)*))
    };
}

/// Returns an error result with a formatted message
#[macro_export]
macro_rules! bail {
    ($error_type:ident, $($arg:tt)*) => {
        return Err($crate::error!($error_type, $($arg)*))
    };
}

/// Ensures a condition is true, otherwise returns an error
#[macro_export]
macro_rules! ensure {
    ($cond:expr, $error_type:ident, $($arg:tt)*) => {
        if !($cond) {
            $crate::bail!($error_type, $($arg)*)
        }
    };
}

// main returns io::Result, same as the scan helpers used in tests
impl From<CodeMapError> for io::Error {
    fn from(err: CodeMapError) -> Self {
        match err {
            CodeMapError::Io(e) => e,
            other => io::Error::new(io::ErrorKind::Other, other.to_string()),
        }
    }
}
