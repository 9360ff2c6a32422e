// src/errors.rs

use thiserror::Error;

pub type ClientResult<T> = Result<T, ClientError>;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("configuration error: {0}")]
    Config(String),

    /// The request itself could not complete.
    #[error("request failed: {0}")]
    Transport(String),

    /// The server answered with something that is not the expected JSON.
    #[error("unreadable response: {0}")]
    Decode(String),

    /// Non-2xx status with a server-supplied reason.
    #[error("server rejected request ({status}): {message}")]
    Rejected { status: u16, message: String },

    #[error("{0} already in flight")]
    Busy(&'static str),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl ClientError {
    pub fn config_error(msg: impl Into<String>) -> Self {
        ClientError::Config(msg.into())
    }

    pub fn transport_error(msg: impl Into<String>) -> Self {
        ClientError::Transport(msg.into())
    }

    pub fn decode_error(msg: impl Into<String>) -> Self {
        ClientError::Decode(msg.into())
    }
}
