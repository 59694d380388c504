//! Server configuration module

use clap::Parser;

use crate::config::{
    db::DatabaseConfig,
    email::EmailConfig,
    observability::{LoggingConfig, ObservabilityConfig},
    outbox::OutboxConfig,
    server::ServerRuntimeConfig,
};

pub(crate) mod db;
pub(crate) mod email;
pub(crate) mod observability;
pub(crate) mod outbox;
pub(crate) mod server;

/// Bazaar JSON API Server configuration
#[derive(Debug, Parser)]
#[command(name = "bazaar-json", about = "Bazaar JSON API Server", long_about = None)]
pub struct ServerConfig {
    /// Server network settings.
    #[command(flatten)]
    pub server: ServerRuntimeConfig,

    /// Logging output settings.
    #[command(flatten)]
    pub logging: LoggingConfig,

    /// Trace export settings.
    #[command(flatten)]
    pub observability: ObservabilityConfig,

    /// Application database settings.
    #[command(flatten)]
    pub database: DatabaseConfig,

    /// Outbound email settings.
    #[command(flatten)]
    pub email: EmailConfig,

    /// Outbox dispatcher and retry settings.
    #[command(flatten)]
    pub outbox: OutboxConfig,
}

impl ServerConfig {
    /// Load configuration from environment and CLI arguments
    ///
    /// # Errors
    ///
    /// Returns an error if configuration cannot be parsed
    pub fn load() -> Result<Self, clap::Error> {
        // Load .env file if present (ignore if missing)
        _ = dotenvy::dotenv();

        Self::try_parse()
    }

    /// Get the socket address for binding
    #[must_use]
    pub fn socket_addr(&self) -> String {
        self.server.socket_addr()
    }
}
