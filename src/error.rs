//! Error types for gird

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

/// gird errors
///
/// Fatal variants carry the path of the file that caused them so the
/// top-level driver can report `<path>: <cause>` and exit non-zero.
#[derive(Error, Debug)]
pub enum Error {
    #[error("parse error in {}: {message}", .path.display())]
    Parse { path: PathBuf, message: String },

    #[error("no Go files in {}", .0.display())]
    EmptyUnit(PathBuf),

    #[error("{}:{line}: @post directive outside any function", .path.display())]
    PostOutsideFunction { path: PathBuf, line: usize },

    #[error("walk {}: {source}", .path.display())]
    Walk {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("write {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("{0}")]
    Other(String),
}

impl From<&str> for Error {
    fn from(s: &str) -> Self {
        Error::Other(s.to_string())
    }
}

impl From<String> for Error {
    fn from(s: String) -> Self {
        Error::Other(s)
    }
}
