//! Error types for the watermark removal library

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the watermark removal library
#[derive(Error, Debug)]
pub enum Error {
    /// PDF processing error (corrupt or unreadable document)
    #[error("PDF error: {0}")]
    Pdf(#[from] lopdf::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Document could not be decrypted with the given password
    #[error("Could not decrypt {}: {reason}", .path.display())]
    Decryption { path: PathBuf, reason: String },

    /// File not found
    #[error("File not found: {}", .0.display())]
    FileNotFound(PathBuf),

    /// Path exists but is not a directory
    #[error("Not a directory: {}", .0.display())]
    NotADirectory(PathBuf),

    /// Invalid glob pattern
    #[error("Invalid glob pattern: {0}")]
    InvalidGlob(String),

    /// File stem looked like a class path but could not be converted
    #[error("Cannot derive class file name from: {0}")]
    InvalidClassName(String),
}
