//! The delivery-driver seam and the SendGrid HTTP implementation.
//!
//! `#[async_trait]` is used instead of native async traits because the
//! backend holds an `Arc<dyn DeliveryDriver>` for driver injection, which
//! requires object safety. Email delivery is I/O-bound, so the per-call
//! future boxing is noise next to network latency.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

use crate::error::MailError;
use crate::payload::MailPayload;

const SENDGRID_API_URL: &str = "https://api.sendgrid.com/v3";

/// A transport that can deliver one payload.
///
/// [`SendGridClient`] is the production implementation; tests and callers
/// with custom transport needs can supply their own.
#[async_trait]
pub trait DeliveryDriver: Send + Sync {
    /// Issue one HTTP POST for the payload.
    ///
    /// Returns `Err(MailError::Provider { .. })` on a non-2xx response and
    /// `Err(MailError::Http(_))` when no response was received.
    async fn post(&self, payload: &MailPayload) -> Result<(), MailError>;

    /// Driver name for logging.
    fn driver_name(&self) -> &'static str {
        "unknown"
    }
}

/// SendGrid v3 API client.
pub struct SendGridClient {
    api_key: String,
    client: Client,
    base_url: String,
}

impl SendGridClient {
    /// Create a new client with the given API key.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            client: Client::new(),
            base_url: SENDGRID_API_URL.to_string(),
        }
    }

    /// Create with a custom reqwest client (timeouts, proxies, ...).
    pub fn with_client(api_key: impl Into<String>, client: Client) -> Self {
        Self {
            api_key: api_key.into(),
            client,
            base_url: SENDGRID_API_URL.to_string(),
        }
    }

    /// Set a custom base URL (for testing).
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }
}

#[async_trait]
impl DeliveryDriver for SendGridClient {
    async fn post(&self, payload: &MailPayload) -> Result<(), MailError> {
        let url = format!("{}/mail/send", self.base_url);

        tracing::debug!(url = %url, "Posting mail payload");

        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("User-Agent", format!("mailbridge/{}", crate::VERSION))
            .json(payload)
            .send()
            .await?;

        let status = response.status();

        // SendGrid returns 202 Accepted on success with no body
        if status.is_success() {
            return Ok(());
        }

        let error: SendGridError = response.json().await.unwrap_or(SendGridError {
            errors: vec![SendGridErrorDetail {
                message: "Unknown error".to_string(),
                field: None,
                help: None,
            }],
        });

        let message = error
            .errors
            .iter()
            .map(|e| e.message.clone())
            .collect::<Vec<_>>()
            .join("; ");

        Err(MailError::provider_with_status(message, status.as_u16()))
    }

    fn driver_name(&self) -> &'static str {
        "sendgrid"
    }
}

#[derive(Debug, Deserialize)]
struct SendGridError {
    errors: Vec<SendGridErrorDetail>,
}

#[derive(Debug, Deserialize)]
struct SendGridErrorDetail {
    message: String,
    #[allow(dead_code)]
    field: Option<String>,
    #[allow(dead_code)]
    help: Option<String>,
}
