//! Engine-level error taxonomy.
//!
//! Only hard failures surface here: a missing capture path, an unreadable
//! capture file, or broken configuration. Everything about the *content* of a
//! page is a soft fact (a `None`, a `false`, an empty list), never an error.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("no capture path provided")]
    MissingCapturePath,

    #[error("capture file not found: {0}")]
    CaptureNotFound(PathBuf),

    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("unknown place '{0}' in catalog index")]
    UnknownPlace(String),

    #[error("invalid catalog config {path}: {source}")]
    Config {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },
}
