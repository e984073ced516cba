use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum OceanError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid server response: {0}")]
    InvalidEnvelope(String),

    #[error("Server returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Chunk {index} of {count} failed: {reason}")]
    ChunkFailed {
        index: u64,
        count: u64,
        reason: String,
    },

    #[error("Refusing to upload empty file {0}")]
    EmptyFile(PathBuf),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Format error: {0}")]
    Format(String),
}

// Convenient crate-wide result type
pub type Result<T> = std::result::Result<T, OceanError>;
