//! Error handling and custom error types
//!
//! Provides unified error handling across the client using thiserror.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    /// The backend answered with a non-success status and a `detail` message.
    #[error("Service error: {0}")]
    Service(String),

    /// The request/response cycle could not complete as expected.
    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Image processing error: {0}")]
    Image(#[from] image::ImageError),

    #[error("Image decode error: {0}")]
    Decode(String),

    #[error("Invalid upload: {0}")]
    InvalidUpload(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invariant violation: {0}")]
    Invariant(String),
}

impl Error {
    /// Errors raised while the generate request was in flight that are not a
    /// backend-reported failure.
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            Error::Http(_) | Error::Serialization(_) | Error::Transport(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, Error>;
