//! The backend surface: configuration and sequential message sending.

use std::env;
use std::sync::Arc;

use crate::client::{DeliveryDriver, SendGridClient};
use crate::error::MailError;
use crate::message::Message;
use crate::payload::build_payload;

/// SendGrid web API backend.
///
/// Messages are translated and sent one at a time, in input order. The only
/// state shared across sends is the driver handle, read-only after
/// construction.
///
/// ```rust,ignore
/// use mailbridge::{Message, SendGridBackend};
///
/// let backend = SendGridBackend::from_env()?;
/// let sent = backend.send_messages(&[message]).await?;
/// ```
pub struct SendGridBackend {
    driver: Arc<dyn DeliveryDriver>,
    fail_silently: bool,
}

impl std::fmt::Debug for SendGridBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SendGridBackend")
            .field("driver", &self.driver.driver_name())
            .field("fail_silently", &self.fail_silently)
            .finish()
    }
}

impl SendGridBackend {
    /// Create a backend with the given API key.
    ///
    /// An empty key is a configuration error, raised here so misconfiguration
    /// surfaces before any message is processed.
    pub fn new(api_key: impl Into<String>) -> Result<Self, MailError> {
        let api_key = api_key.into();
        if api_key.is_empty() {
            return Err(MailError::Configuration(
                "SendGrid API key must not be empty".into(),
            ));
        }
        Ok(Self {
            driver: Arc::new(SendGridClient::new(api_key)),
            fail_silently: false,
        })
    }

    /// Create a backend from the `SENDGRID_API_KEY` environment variable.
    pub fn from_env() -> Result<Self, MailError> {
        let api_key = env::var("SENDGRID_API_KEY")
            .map_err(|_| MailError::Configuration("SENDGRID_API_KEY not set".into()))?;
        Self::new(api_key)
    }

    /// Create a backend with a custom delivery driver.
    pub fn with_driver(driver: Arc<dyn DeliveryDriver>) -> Self {
        Self {
            driver,
            fail_silently: false,
        }
    }

    /// Swallow delivery errors instead of propagating them.
    ///
    /// A failed message is skipped without incrementing the success count
    /// and iteration continues with the next message.
    pub fn fail_silently(mut self, enabled: bool) -> Self {
        self.fail_silently = enabled;
        self
    }

    /// Send messages sequentially, returning the number delivered.
    ///
    /// Returns 0 for empty input without touching the network. A translation
    /// error (malformed attachment) always aborts the batch. A delivery
    /// error aborts the remaining batch unless fail-silently is set.
    pub async fn send_messages(&self, messages: &[Message]) -> Result<usize, MailError> {
        let mut count = 0;

        for message in messages {
            let payload = build_payload(message)?;

            let span = tracing::info_span!(
                "mailbridge.send",
                driver = self.driver.driver_name(),
                to = ?message.to,
                subject = %message.subject,
            );
            let _guard = span.enter();

            match self.driver.post(&payload).await {
                Ok(()) => {
                    count += 1;
                    tracing::info!("Email delivered");
                }
                Err(error) if self.fail_silently => {
                    tracing::warn!(error = %error, "Email delivery failed, continuing");
                }
                Err(error) => {
                    tracing::error!(error = %error, "Email delivery failed");
                    return Err(error);
                }
            }
        }

        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_api_key_is_configuration_error() {
        let err = SendGridBackend::new("").unwrap_err();
        assert!(matches!(err, MailError::Configuration(_)));
    }

    #[test]
    fn valid_api_key_constructs() {
        assert!(SendGridBackend::new("SG.test-api-key").is_ok());
    }
}
