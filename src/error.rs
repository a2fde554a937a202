use std::io;

use thiserror::Error;

/// Cache persistence errors
#[derive(Debug, Error)]
pub enum CacheError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Encode error: {0}")]
    Encode(String),

    #[error("Deserialization error: {0}")]
    Deserialize(String),

    #[error("Cache version mismatch")]
    VersionMismatch,

    #[error("Cache not found")]
    NotFound,

    #[error("No free shard slot for key {0}")]
    SlotsExhausted(String),
}

impl From<bincode::Error> for CacheError {
    fn from(e: bincode::Error) -> Self {
        CacheError::Deserialize(e.to_string())
    }
}

/// Settings errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid glob pattern '{pattern}': {message}")]
    InvalidGlob { pattern: String, message: String },
}
