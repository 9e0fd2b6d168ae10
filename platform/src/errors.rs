//! Error types for the skydock pipeline

use thiserror::Error;

/// Main error type shared by every pipeline component
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("HTTP error: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("Missing input: {0}")]
    MissingInput(String),

    #[error("Launch rejected: {0}")]
    LaunchRejected(String),

    #[error("Missing deployment identity: {0}")]
    MissingIdentity(String),

    #[error("Source not found: {0}")]
    SourceNotFound(String),

    #[error("Build failed with exit code {code}")]
    BuildFailed { code: i32 },

    #[error("Build output missing: {0}")]
    OutputMissing(String),

    #[error("Upload failed: {0}")]
    UploadFailed(String),

    #[error("Bus error: {0}")]
    BusError(String),

    #[error("Storage error: {0}")]
    StorageError(String),

    #[error("Server error: {0}")]
    ServerError(String),

    #[error("Shutdown error: {0}")]
    ShutdownError(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<anyhow::Error> for PipelineError {
    fn from(err: anyhow::Error) -> Self {
        PipelineError::Internal(err.to_string())
    }
}
