//! Email delivery.

use std::time::Duration;

use async_trait::async_trait;
use mockall::automock;
use reqwest::Client;
use serde::Serialize;
use thiserror::Error;
use tracing::info;

use crate::outbox::EmailMessage;

/// Configuration for an HTTP email delivery API.
#[derive(Debug, Clone)]
pub struct EmailConfig {
    /// Endpoint that accepts a JSON message, e.g. `"https://api.resend.com/emails"`.
    pub endpoint: String,

    /// Bearer token for the delivery API.
    pub api_key: String,

    /// Sending address, e.g. `"Bazaar <orders@bazaar.test>"`.
    pub from: String,

    /// Upper bound for one request to the delivery API, connect included. Keep it well
    /// under the outbox lease so a hung provider cannot outlive the claim.
    pub timeout: Duration,
}

/// Request timeout used when none is configured.
pub const DEFAULT_EMAIL_TIMEOUT: Duration = Duration::from_secs(10);

/// Email Sender
#[automock]
#[async_trait]
pub trait EmailSender: Send + Sync {
    /// Hand one message to the delivery channel.
    async fn send(&self, message: &EmailMessage) -> Result<(), EmailError>;
}

/// Delivers email through an HTTP API.
#[derive(Debug, Clone)]
pub struct HttpEmailSender {
    config: EmailConfig,
    http: Client,
}

impl HttpEmailSender {
    /// Build a sender whose requests give up after `config.timeout`.
    ///
    /// # Errors
    ///
    /// Returns an error when the HTTP client cannot be initialised.
    pub fn new(config: EmailConfig) -> Result<Self, EmailError> {
        let http = Client::builder()
            .timeout(config.timeout)
            .connect_timeout(config.timeout)
            .build()?;

        Ok(Self { config, http })
    }
}

#[derive(Debug, Serialize)]
struct SendEmailRequest<'a> {
    from: &'a str,
    to: [&'a str; 1],
    subject: &'a str,
    html: &'a str,
}

#[async_trait]
impl EmailSender for HttpEmailSender {
    async fn send(&self, message: &EmailMessage) -> Result<(), EmailError> {
        let body = SendEmailRequest {
            from: &self.config.from,
            to: [&message.to],
            subject: &message.subject,
            html: &message.html,
        };

        let response = self
            .http
            .post(&self.config.endpoint)
            .bearer_auth(&self.config.api_key)
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();

            return Err(EmailError::Rejected(format!(
                "email request failed with status {status}: {text}"
            )));
        }

        Ok(())
    }
}

/// Writes emails to the log instead of sending them, for local development.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogEmailSender;

#[async_trait]
impl EmailSender for LogEmailSender {
    async fn send(&self, message: &EmailMessage) -> Result<(), EmailError> {
        info!(to = %message.to, subject = %message.subject, "email delivered to log");

        Ok(())
    }
}

/// Email Delivery Error
#[derive(Debug, Error)]
pub enum EmailError {
    /// An HTTP transport, timeout or serialization error occurred.
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    /// The delivery API returned a non-2xx response.
    #[error("email rejected: {0}")]
    Rejected(String),
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use testresult::TestResult;

    use super::*;

    #[test]
    fn request_body_carries_the_configured_sender() -> TestResult {
        let message = EmailMessage {
            to: "buyer@example.com".to_string(),
            subject: "Order Approved".to_string(),
            html: "<p>Approved</p>".to_string(),
        };

        let body = SendEmailRequest {
            from: "orders@bazaar.test",
            to: [&message.to],
            subject: &message.subject,
            html: &message.html,
        };

        assert_eq!(
            serde_json::to_value(&body)?,
            json!({
                "from": "orders@bazaar.test",
                "to": ["buyer@example.com"],
                "subject": "Order Approved",
                "html": "<p>Approved</p>",
            }),
            "request body should match the delivery API shape"
        );

        Ok(())
    }

    #[tokio::test]
    async fn hung_provider_times_out() -> TestResult {
        // Accepts the connection and never answers.
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
        let endpoint = format!("http://{}/emails", listener.local_addr()?);

        let hold = tokio::spawn(async move {
            let accepted = listener.accept().await;

            tokio::time::sleep(Duration::from_secs(30)).await;

            drop(accepted);
        });

        let sender = HttpEmailSender::new(EmailConfig {
            endpoint,
            api_key: "key".to_string(),
            from: "orders@bazaar.test".to_string(),
            timeout: Duration::from_millis(200),
        })?;

        let message = EmailMessage {
            to: "buyer@example.com".to_string(),
            subject: "Order Shipped".to_string(),
            html: "<p>Shipped</p>".to_string(),
        };

        let started = std::time::Instant::now();
        let result = sender.send(&message).await;

        hold.abort();

        assert!(
            matches!(&result, Err(EmailError::Http(error)) if error.is_timeout()),
            "expected a timeout, got {result:?}"
        );
        assert!(
            started.elapsed() < Duration::from_secs(5),
            "send should give up at the configured timeout"
        );

        Ok(())
    }

    #[tokio::test]
    async fn log_sender_always_succeeds() {
        let message = EmailMessage {
            to: "buyer@example.com".to_string(),
            subject: "Order Shipped".to_string(),
            html: "<p>Your order <strong>ABCD1234</strong> has been shipped.</p>".to_string(),
        };

        assert!(
            LogEmailSender.send(&message).await.is_ok(),
            "log sender should never fail"
        );
    }
}
