//! Error types for mailbridge.

use thiserror::Error;

/// Errors that can occur when building or sending emails.
#[derive(Debug, Clone, Error)]
pub enum MailError {
    /// Configuration error (missing API key, invalid value, etc.)
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Invalid email address format.
    #[error("Invalid email address: {0}")]
    InvalidAddress(String),

    /// Attachment has no resolvable content. This is a contract violation
    /// on the caller's side: a structured MIME part must carry a payload.
    #[error("Attachment has no content: {0}")]
    AttachmentMissingContent(String),

    /// SendGrid rejected the request (non-2xx response).
    #[error("SendGrid error: {message}")]
    Provider {
        message: String,
        /// HTTP status code of the rejection, if one was received.
        status: Option<u16>,
    },

    /// HTTP request failed before a response was received.
    #[error("HTTP error: {0}")]
    Http(String),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(String),
}

impl MailError {
    /// Create a provider rejection error with the HTTP status.
    pub fn provider_with_status(message: impl Into<String>, status: u16) -> Self {
        Self::Provider {
            message: message.into(),
            status: Some(status),
        }
    }
}

impl From<reqwest::Error> for MailError {
    fn from(err: reqwest::Error) -> Self {
        Self::Http(err.to_string())
    }
}

impl From<serde_json::Error> for MailError {
    fn from(err: serde_json::Error) -> Self {
        Self::Json(err.to_string())
    }
}
