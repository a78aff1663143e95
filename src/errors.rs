//! Error handling module
//!
//! Structured error types for the audit pipeline. Only whole-source failures
//! surface as errors; malformed individual records are skipped and logged by
//! the parsers so a single bad line never aborts a run.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for audit operations
#[derive(Error, Debug)]
pub enum AuditError {
    /// A source file exists but is unparseable as a whole
    #[error("invalid source format in {path}: {reason}")]
    SourceFormat { path: PathBuf, reason: String },

    /// A source was present but produced no usable records.
    /// Proceeding would silently leave every downstream finding incomplete,
    /// so this aborts before graph construction begins.
    #[error("no valid records found in {path}")]
    EmptySource { path: PathBuf },

    /// An archive could not be opened or safely extracted
    #[error("failed to extract archive {path}: {reason}")]
    Archive { path: PathBuf, reason: String },

    /// An input path resolved to no dump files at all
    #[error("no {expected} files found under {path}")]
    NoDumpFiles { path: PathBuf, expected: &'static str },

    /// I/O error
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Result type alias for audit operations
pub type Result<T> = std::result::Result<T, AuditError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_source_message_names_the_file() {
        let err = AuditError::EmptySource {
            path: PathBuf::from("dump/users.ntds"),
        };
        assert!(err.to_string().contains("users.ntds"));
    }

    #[test]
    fn test_io_error_is_transparent() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let err: AuditError = io.into();
        assert!(err.to_string().contains("gone"));
    }
}
