//! Crate-level error type
//!
//! Only whole-run failures live here: unreadable input, a dump that is not a
//! JSON array, a server that cannot bind. A single malformed record is never
//! an error; the loader and normalizer turn it into a [`Rejected`] entry.
//!
//! [`Rejected`]: crate::normalize::Rejected

use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("failed to access {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid JSON in {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("{0} does not contain a JSON array of orders")]
    NotAnArray(PathBuf),

    #[error("no orders_*.json dump found under {0}")]
    NoDumpFound(PathBuf),

    #[error("failed to write report: {0}")]
    Report(#[from] std::io::Error),

    #[error("server error: {0}")]
    Server(String),
}

impl Error {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Error::Io { path: path.into(), source }
    }
}
