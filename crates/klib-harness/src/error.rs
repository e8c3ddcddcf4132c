//! Harness error type.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum HarnessError {
    #[error("io: {0}")]
    Io(#[from] std::io::Error),
    #[error("json: {0}")]
    Json(#[from] serde_json::Error),
    #[error("fixture {path}: {source}")]
    FixtureFile {
        path: PathBuf,
        #[source]
        source: Box<HarnessError>,
    },
    #[error("unknown function '{0}'")]
    UnknownFunction(String),
    #[error("invalid input for {function}: {message}")]
    InvalidInput { function: String, message: String },
    #[error("invalid argument '{0}' (expected int:N, uint:N or str:TEXT)")]
    InvalidArgument(String),
}
