//! Client errors.

use beeconnect_types::GENERIC_ERROR_MESSAGE;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("Resource not found")]
    NotFound,

    #[error("Not authorized (HTTP {status})")]
    Unauthorized { status: u16 },

    #[error("HTTP {status}: {message}")]
    Api { status: u16, message: String },

    #[error("Invalid request URL: {0}")]
    Url(#[from] url::ParseError),

    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Failed to decode response: {0}")]
    Decode(#[from] serde_json::Error),
}

impl ClientError {
    /// Errors that policy lookup treats as "no assignment yet".
    pub fn is_absent(&self) -> bool {
        matches!(self, ClientError::NotFound | ClientError::Unauthorized { .. })
    }

    /// Message suitable for an error notice.
    pub fn user_message(&self) -> String {
        match self {
            ClientError::Api { message, .. } if !message.is_empty() => message.clone(),
            _ => GENERIC_ERROR_MESSAGE.to_string(),
        }
    }
}
