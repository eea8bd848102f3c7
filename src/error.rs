//! Error types
//!
//! Startup errors abort the process before a socket is bound.
//! Request errors are turned into a 500 response by the pipeline.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Fatal configuration errors raised while resolving `ServerConfig`
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("served directory does not exist: {}", .0.display())]
    DirectoryNotFound(PathBuf),

    #[error("served path is not a directory: {}", .0.display())]
    NotADirectory(PathBuf),

    #[error("cannot access served directory {}: {source}", path.display())]
    Inaccessible { path: PathBuf, source: io::Error },

    #[error("port must be a positive integer")]
    InvalidPort,

    #[error("invalid listen address '{addr}': {source}")]
    InvalidAddress {
        addr: String,
        source: std::net::AddrParseError,
    },

    #[error(transparent)]
    Settings(#[from] config::ConfigError),
}

/// Per-request failures that cannot be reported as 404
#[derive(Debug, Error)]
pub enum ServeError {
    #[error("failed to read {}: {source}", path.display())]
    Read { path: PathBuf, source: io::Error },
}
