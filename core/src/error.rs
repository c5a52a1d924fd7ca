/// Error types for the sync engine
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ChatError {
    #[error("transport error: {0}")]
    Transport(String),

    #[error("format error: {0}")]
    Format(String),

    #[error("validation error: {0}")]
    Validation(String),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, ChatError>;
