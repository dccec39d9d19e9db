// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Error types for DataSipper
//!
//! Record construction and mutation never fail. Errors only come from the
//! edges: parsing URLs handed in by a producer, strict identifier decoding,
//! configuration, and export I/O.

use std::path::PathBuf;

use thiserror::Error;

/// Result type alias for DataSipper operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for DataSipper
#[derive(Error, Debug)]
pub enum Error {
    /// Identifier is not one of the canonical event type strings
    #[error("Unknown network event type: '{0}'")]
    UnknownEventType(String),

    /// Identifier is not one of the canonical WebSocket message type strings
    #[error("Unknown WebSocket message type: '{0}'")]
    UnknownMessageType(String),

    /// URL parsing failed
    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),

    /// Filter pattern failed to compile
    #[error("Invalid filter pattern: {0}")]
    InvalidPattern(#[from] regex::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Reading or writing a file failed
    #[error("File error for {path}: {reason}")]
    File { path: PathBuf, reason: String },

    /// A JSON Lines stream contained a malformed record
    #[error("Malformed record on line {line}: {reason}")]
    MalformedRecord { line: usize, reason: String },

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl Error {
    /// Create a configuration error
    pub fn config<S: Into<String>>(msg: S) -> Self {
        Error::Config(msg.into())
    }

    /// Create a file error
    pub fn file(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Error::File {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Create a malformed record error
    pub fn malformed(line: usize, reason: impl Into<String>) -> Self {
        Error::MalformedRecord {
            line,
            reason: reason.into(),
        }
    }

    /// Check if this is an unrecognized identifier (either enumeration)
    pub fn is_unknown_identifier(&self) -> bool {
        matches!(
            self,
            Error::UnknownEventType(_) | Error::UnknownMessageType(_)
        )
    }

    /// Check if this came from file I/O
    pub fn is_io(&self) -> bool {
        matches!(
            self,
            Error::File { .. } | Error::MalformedRecord { .. } | Error::Io(_)
        )
    }

    /// Get the offending identifier, if this is a decode failure
    pub fn identifier(&self) -> Option<&str> {
        match self {
            Error::UnknownEventType(s) | Error::UnknownMessageType(s) => Some(s),
            _ => None,
        }
    }
}

/// Helper trait for adding context to errors
pub trait ErrorContext<T> {
    /// Attach a file path to the error
    fn with_path(self, path: &std::path::Path) -> Result<T>;
}

impl<T, E: Into<Error>> ErrorContext<T> for std::result::Result<T, E> {
    fn with_path(self, path: &std::path::Path) -> Result<T> {
        self.map_err(|e| match e.into() {
            err @ Error::File { .. } => err,
            other => Error::file(path, other.to_string()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_identifier() {
        let err = Error::UnknownEventType("bogus".to_string());

        assert!(err.is_unknown_identifier());
        assert_eq!(err.identifier(), Some("bogus"));
        assert_eq!(err.to_string(), "Unknown network event type: 'bogus'");
    }

    #[test]
    fn test_with_path() {
        let io: std::result::Result<(), std::io::Error> = Err(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            "missing",
        ));
        let err = io.with_path(std::path::Path::new("/tmp/capture.jsonl")).unwrap_err();

        assert!(err.is_io());
        match err {
            Error::File { path, reason } => {
                assert_eq!(path, PathBuf::from("/tmp/capture.jsonl"));
                assert!(reason.contains("missing"));
            }
            other => panic!("Expected File, got {:?}", other),
        }
    }
}
