//! Email Config

use std::time::Duration;

use bazaar_app::outbox::{DEFAULT_EMAIL_TIMEOUT, EmailConfig as ProviderConfig};
use clap::Args;

/// Outbound email provider settings. Email is only logged when no endpoint is set.
#[derive(Debug, Args)]
pub struct EmailConfig {
    /// HTTP endpoint of the email provider's send API.
    #[arg(long, env = "EMAIL_ENDPOINT")]
    pub email_endpoint: Option<String>,

    /// API key for the email provider.
    #[arg(long, env = "EMAIL_API_KEY", hide_env_values = true, default_value = "")]
    pub email_api_key: String,

    /// Sender address for outgoing email.
    #[arg(long, env = "EMAIL_FROM", default_value = "Bazaar <orders@bazaar.local>")]
    pub email_from: String,

    /// Seconds before a request to the provider is abandoned.
    #[arg(long, env = "EMAIL_TIMEOUT_SECONDS", default_value_t = DEFAULT_EMAIL_TIMEOUT.as_secs())]
    pub email_timeout_seconds: u64,
}

impl EmailConfig {
    /// Provider settings, when a provider is configured.
    #[must_use]
    pub fn provider(&self) -> Option<ProviderConfig> {
        self.email_endpoint.as_ref().map(|endpoint| ProviderConfig {
            endpoint: endpoint.clone(),
            api_key: self.email_api_key.clone(),
            from: self.email_from.clone(),
            timeout: Duration::from_secs(self.email_timeout_seconds.max(1)),
        })
    }
}
