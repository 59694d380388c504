//! Delivers committed side effects.

use std::{sync::Arc, time::Duration};

use tokio::{
    sync::watch,
    time::{Instant, sleep, timeout},
};
use tracing::{debug, error, info, warn};

use crate::{
    domain::notifications::NotificationsService,
    outbox::{
        SideEffect,
        email::EmailSender,
        errors::{DeliveryError, OutboxError},
        records::{OutboxRecord, OutboxStatus},
        store::OutboxStore,
    },
};

/// Dispatcher Config
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DispatcherConfig {
    /// Records claimed per pass.
    pub batch_size: u32,

    /// How long a claimed record is reserved before another dispatcher may take it.
    pub lease: Duration,

    /// Attempts before a record is marked failed.
    pub max_attempts: u32,

    /// Pause between passes that found nothing to do.
    pub poll_interval: Duration,

    /// Longest a single delivery may take before it counts as a failed attempt. No
    /// delivery is started unless it can finish inside the lease.
    pub delivery_timeout: Duration,
}

impl Default for DispatcherConfig {
    fn default() -> Self {
        Self {
            batch_size: 50,
            lease: Duration::from_secs(60),
            max_attempts: 5,
            poll_interval: Duration::from_secs(1),
            delivery_timeout: Duration::from_secs(15),
        }
    }
}

/// Dispatch Report
///
/// Result of one dispatch pass.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct DispatchReport {
    pub claimed: usize,
    pub delivered: usize,

    /// Failed this time and returned to pending.
    pub released: usize,

    /// Failed for the last time.
    pub failed: usize,

    /// Not attempted because the lease would have run out first. They are claimed
    /// again once it expires.
    pub deferred: usize,
}

/// Outbox Dispatcher
///
/// Claims outbox records and hands each effect to its delivery channel.
///
/// Delivery is at least once: a dispatcher that dies mid-batch leaves its records
/// in flight until the lease runs out. Notifications carry a fixed uuid, so a second
/// delivery stores nothing new.
pub struct OutboxDispatcher {
    store: Arc<dyn OutboxStore>,
    email: Arc<dyn EmailSender>,
    notifications: Arc<dyn NotificationsService>,
    config: DispatcherConfig,
}

impl std::fmt::Debug for OutboxDispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OutboxDispatcher")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl OutboxDispatcher {
    /// Deliver records claimed from `store` through `email` and `notifications`.
    #[must_use]
    pub fn new(
        store: Arc<dyn OutboxStore>,
        email: Arc<dyn EmailSender>,
        notifications: Arc<dyn NotificationsService>,
        config: DispatcherConfig,
    ) -> Self {
        Self {
            store,
            email,
            notifications,
            config,
        }
    }

    /// Claim one batch and try to deliver every record in it.
    ///
    /// # Errors
    ///
    /// Returns an error when the outbox itself cannot be read or updated. Delivery
    /// failures are recorded against the record instead.
    pub async fn dispatch_once(&self) -> Result<DispatchReport, OutboxError> {
        let records = self
            .store
            .claim(self.config.batch_size, self.config.lease)
            .await?;

        let lease_ends = Instant::now() + self.config.lease;

        let mut report = DispatchReport {
            claimed: records.len(),
            ..DispatchReport::default()
        };

        for (index, record) in records.iter().enumerate() {
            // Another dispatcher may claim the record once the lease lapses; starting
            // now could deliver it twice.
            if Instant::now() + self.config.delivery_timeout > lease_ends {
                report.deferred = report.claimed - index;

                warn!(
                    deferred = report.deferred,
                    "outbox lease nearly spent, leaving the rest of the batch to expire"
                );

                break;
            }

            let delivered = timeout(self.config.delivery_timeout, self.deliver(record))
                .await
                .unwrap_or(Err(DeliveryError::TimedOut(self.config.delivery_timeout)));

            match delivered {
                Ok(()) => {
                    self.store.mark_delivered(record.uuid).await?;

                    report.delivered += 1;
                }
                Err(delivery_error) => {
                    let status = self
                        .store
                        .record_failure(
                            record.uuid,
                            &delivery_error.to_string(),
                            self.config.max_attempts,
                        )
                        .await?;

                    if status == OutboxStatus::Failed {
                        error!(
                            outbox_uuid = %record.uuid,
                            kind = record.effect.kind(),
                            attempts = record.attempts,
                            error = %delivery_error,
                            "side effect failed permanently"
                        );

                        report.failed += 1;
                    } else {
                        warn!(
                            outbox_uuid = %record.uuid,
                            kind = record.effect.kind(),
                            attempts = record.attempts,
                            error = %delivery_error,
                            "side effect delivery failed, will retry"
                        );

                        report.released += 1;
                    }
                }
            }
        }

        if report.claimed > 0 {
            debug!(?report, "dispatch pass finished");
        }

        Ok(report)
    }

    async fn deliver(&self, record: &OutboxRecord) -> Result<(), DeliveryError> {
        match &record.effect {
            SideEffect::Email(message) => self.email.send(message).await?,
            SideEffect::Notification(notification) => {
                let created = self
                    .notifications
                    .create_notification(record.tenant_uuid, notification.clone())
                    .await?;

                if !created {
                    debug!(notification_uuid = %notification.uuid, "notification already stored");
                }
            }
        }

        Ok(())
    }

    /// Dispatch until `shutdown` flips to `true`. `on_pass` sees every report, for
    /// metrics.
    pub async fn run<F>(&self, mut shutdown: watch::Receiver<bool>, mut on_pass: F)
    where
        F: FnMut(&DispatchReport) + Send,
    {
        info!(config = ?self.config, "outbox dispatcher started");

        while !*shutdown.borrow() {
            let idle = match self.dispatch_once().await {
                Ok(report) => {
                    on_pass(&report);

                    report.claimed == 0
                }
                Err(outbox_error) => {
                    error!(error = %outbox_error, "outbox dispatch failed");

                    true
                }
            };

            if idle {
                tokio::select! {
                    () = sleep(self.config.poll_interval) => {}
                    changed = shutdown.changed() => {
                        if changed.is_err() {
                            break;
                        }
                    }
                }
            }
        }

        info!("outbox dispatcher stopped");
    }
}
