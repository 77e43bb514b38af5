//! Sayit Error Types
//!
//! Centralized error handling for the speech add-on.

use thiserror::Error;

/// Central error type for Sayit
#[derive(Error, Debug)]
pub enum SayError {
    #[error("TTS engine error: {0}")]
    Tts(String),

    #[error("Settings error: {0}")]
    Settings(String),

    #[error("Unknown command: {0}")]
    UnknownCommand(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Result type alias for Sayit operations
pub type SayResult<T> = Result<T, SayError>;
