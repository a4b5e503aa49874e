//! Client error types

use thiserror::Error;

/// Client error type
#[derive(Debug, Error)]
pub enum ClientError {
    /// HTTP request failed (connectivity, timeout, body decoding)
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Backend returned a structured error body
    #[error("{message}")]
    Api {
        status: u16,
        code: Option<u16>,
        message: String,
    },

    /// Invalid response format
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Authentication required
    #[error("Authentication required")]
    Unauthorized,

    /// Permission denied
    #[error("Permission denied: {0}")]
    Forbidden(String),

    /// Resource not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Validation error (local or backend)
    #[error("Validation error: {0}")]
    Validation(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),

    /// The same action is already in flight
    #[error("{0} already in progress")]
    Busy(String),

    /// QR rendering failed
    #[error("Render error: {0}")]
    Render(#[from] crab_qr::RenderError),

    /// Clipboard unavailable or denied
    #[error("Clipboard error: {0}")]
    Clipboard(String),

    /// File write failed
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl ClientError {
    /// Text for the operator notification: the backend's own message when it
    /// sent one, our local reason for local failures, `fallback` otherwise.
    pub fn user_message(&self, fallback: &str) -> String {
        match self {
            ClientError::Api { message, .. } if !message.trim().is_empty() => message.clone(),
            ClientError::Validation(msg) if !msg.trim().is_empty() => msg.clone(),
            ClientError::Unauthorized
            | ClientError::Busy(_)
            | ClientError::Render(_)
            | ClientError::Clipboard(_)
            | ClientError::Io(_) => self.to_string(),
            _ => fallback.to_string(),
        }
    }

    /// Whether the target resource does not exist (locally or on the backend)
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            ClientError::NotFound(_) | ClientError::Api { status: 404, .. }
        )
    }
}

/// Result type for client operations
pub type ClientResult<T> = Result<T, ClientError>;
