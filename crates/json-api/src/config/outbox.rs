//! Outbox and order workflow Config

use std::time::Duration;

use bazaar_app::{outbox::DispatcherConfig, retry::RetryPolicy};
use clap::Args;

/// Side-effect delivery and retry settings.
#[derive(Debug, Args)]
pub struct OutboxConfig {
    /// Run the outbox dispatcher inside this process.
    #[arg(long, env = "OUTBOX_DISPATCHER_ENABLED", default_value_t = true)]
    pub outbox_dispatcher_enabled: bool,

    /// Records claimed per dispatch pass.
    #[arg(long, env = "OUTBOX_BATCH_SIZE", default_value_t = 50_u32)]
    pub outbox_batch_size: u32,

    /// Seconds a claimed record stays reserved for one dispatcher.
    #[arg(long, env = "OUTBOX_LEASE_SECONDS", default_value_t = 60_u64)]
    pub outbox_lease_seconds: u64,

    /// Delivery attempts before a record is marked failed.
    #[arg(long, env = "OUTBOX_MAX_ATTEMPTS", default_value_t = 5_u32)]
    pub outbox_max_attempts: u32,

    /// Milliseconds to wait after a pass that found nothing.
    #[arg(long, env = "OUTBOX_POLL_INTERVAL_MS", default_value_t = 1_000_u64)]
    pub outbox_poll_interval_ms: u64,

    /// Seconds one delivery may take; capped at half the lease.
    #[arg(long, env = "OUTBOX_DELIVERY_TIMEOUT_SECONDS", default_value_t = 15_u64)]
    pub outbox_delivery_timeout_seconds: u64,

    /// Attempts for an order unit of work that keeps losing concurrency races.
    #[arg(long, env = "ORDER_MAX_ATTEMPTS", default_value_t = 5_u32)]
    pub order_max_attempts: u32,
}

impl OutboxConfig {
    #[must_use]
    pub fn dispatcher(&self) -> DispatcherConfig {
        let lease = Duration::from_secs(self.outbox_lease_seconds);

        DispatcherConfig {
            batch_size: self.outbox_batch_size.max(1),
            lease,
            delivery_timeout: Duration::from_secs(self.outbox_delivery_timeout_seconds)
                .min(lease / 2),
            max_attempts: self.outbox_max_attempts.max(1),
            poll_interval: Duration::from_millis(self.outbox_poll_interval_ms),
        }
    }

    #[must_use]
    pub fn order_retries(&self) -> RetryPolicy {
        RetryPolicy {
            max_attempts: self.order_max_attempts.max(1),
            ..RetryPolicy::default()
        }
    }
}
