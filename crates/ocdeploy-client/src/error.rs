//! Client error types.

use thiserror::Error;

pub type ClientResult<T> = Result<T, ClientError>;

/// Errors talking to the orchestration platform.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("platform returned {status}: {message}")]
    Status { status: u16, message: String },

    #[error("invalid platform response: {0}")]
    Decode(String),

    #[error("invalid client configuration: {0}")]
    Config(String),
}
