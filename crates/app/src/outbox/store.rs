//! Storage seam for the outbox dispatcher.

use std::time::Duration;

use async_trait::async_trait;
use mockall::automock;

use crate::{
    database::Db,
    outbox::{
        errors::OutboxError,
        records::{OutboxCounts, OutboxRecord, OutboxStatus, OutboxUuid},
        repository::PgOutboxRepository,
    },
};

/// Outbox Store
///
/// The dispatcher's view of the outbox. Records are written by the unit of work that
/// produced them, never through this trait.
#[automock]
#[async_trait]
pub trait OutboxStore: Send + Sync {
    /// Claim up to `batch` records for delivery, leasing them for `lease`.
    async fn claim(&self, batch: u32, lease: Duration) -> Result<Vec<OutboxRecord>, OutboxError>;

    async fn mark_delivered(&self, record: OutboxUuid) -> Result<(), OutboxError>;

    /// Release a record after a failed attempt and return its new status.
    async fn record_failure(
        &self,
        record: OutboxUuid,
        error: &str,
        max_attempts: u32,
    ) -> Result<OutboxStatus, OutboxError>;

    /// Records per status, for the healthcheck.
    async fn counts(&self) -> Result<OutboxCounts, OutboxError>;
}

/// Outbox store over `PostgreSQL`, one transaction per call.
#[derive(Debug, Clone)]
pub struct PgOutboxStore {
    db: Db,
    repository: PgOutboxRepository,
}

impl PgOutboxStore {
    #[must_use]
    pub fn new(db: Db) -> Self {
        Self {
            db,
            repository: PgOutboxRepository::new(),
        }
    }
}

#[async_trait]
impl OutboxStore for PgOutboxStore {
    async fn claim(&self, batch: u32, lease: Duration) -> Result<Vec<OutboxRecord>, OutboxError> {
        Ok(self.repository.claim(self.db.pool(), batch, lease).await?)
    }

    async fn mark_delivered(&self, record: OutboxUuid) -> Result<(), OutboxError> {
        Ok(self.repository.mark_delivered(self.db.pool(), record).await?)
    }

    async fn record_failure(
        &self,
        record: OutboxUuid,
        error: &str,
        max_attempts: u32,
    ) -> Result<OutboxStatus, OutboxError> {
        Ok(self
            .repository
            .record_failure(self.db.pool(), record, error, max_attempts)
            .await?)
    }

    async fn counts(&self) -> Result<OutboxCounts, OutboxError> {
        Ok(self.repository.count_by_status(self.db.pool()).await?)
    }
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use crate::{
        outbox::{EmailMessage, SideEffect},
        test::TestContext,
    };

    use super::*;

    async fn enqueue_email(ctx: &TestContext, to: &str) -> Result<OutboxUuid, sqlx::Error> {
        let mut tx = ctx.app_db.begin_tenant_transaction(ctx.tenant_uuid).await?;

        let uuid = PgOutboxRepository::new()
            .enqueue(
                &mut tx,
                &SideEffect::Email(EmailMessage {
                    to: to.to_string(),
                    subject: "Order Approved".to_string(),
                    html: "<p>Approved</p>".to_string(),
                }),
            )
            .await?;

        tx.commit().await?;

        Ok(uuid)
    }

    #[tokio::test]
    async fn claimed_records_are_not_claimed_again_while_leased() -> TestResult {
        let ctx = TestContext::new().await;
        let store = PgOutboxStore::new(ctx.app_db.clone());

        let uuid = enqueue_email(&ctx, "buyer@example.com").await?;

        let first = store.claim(10, Duration::from_secs(60)).await?;
        let second = store.claim(10, Duration::from_secs(60)).await?;

        assert_eq!(first.len(), 1, "pending record should be claimed");
        assert_eq!(first.first().map(|record| record.uuid), Some(uuid));
        assert_eq!(first.first().map(|record| record.attempts), Some(1));
        assert_eq!(
            first.first().map(|record| record.tenant_uuid),
            Some(ctx.tenant_uuid)
        );
        assert!(second.is_empty(), "leased record should not be reclaimed");

        Ok(())
    }

    #[tokio::test]
    async fn uncommitted_effects_are_never_claimed() -> TestResult {
        let ctx = TestContext::new().await;
        let store = PgOutboxStore::new(ctx.app_db.clone());

        let mut tx = ctx.app_db.begin_tenant_transaction(ctx.tenant_uuid).await?;

        PgOutboxRepository::new()
            .enqueue(
                &mut tx,
                &SideEffect::Email(EmailMessage {
                    to: "buyer@example.com".to_string(),
                    subject: "Order Approved".to_string(),
                    html: String::new(),
                }),
            )
            .await?;

        tx.rollback().await?;

        let claimed = store.claim(10, Duration::from_secs(60)).await?;

        assert!(claimed.is_empty(), "rolled back effect should not exist");

        Ok(())
    }

    #[tokio::test]
    async fn failures_return_records_to_pending_until_max_attempts() -> TestResult {
        let ctx = TestContext::new().await;
        let store = PgOutboxStore::new(ctx.app_db.clone());

        let uuid = enqueue_email(&ctx, "buyer@example.com").await?;

        let _first = store.claim(10, Duration::from_secs(60)).await?;
        let status = store.record_failure(uuid, "smtp down", 2).await?;

        assert_eq!(status, OutboxStatus::Pending, "first failure should retry");

        let retried = store.claim(10, Duration::from_secs(60)).await?;

        assert_eq!(retried.first().map(|record| record.attempts), Some(2));

        let status = store.record_failure(uuid, "smtp down", 2).await?;

        assert_eq!(status, OutboxStatus::Failed, "second failure should give up");
        assert!(
            store.claim(10, Duration::from_secs(60)).await?.is_empty(),
            "failed records should not be claimed"
        );

        let counts = store.counts().await?;

        assert_eq!(counts.failed, 1, "one record should be failed");

        Ok(())
    }

    #[tokio::test]
    async fn delivered_records_are_done() -> TestResult {
        let ctx = TestContext::new().await;
        let store = PgOutboxStore::new(ctx.app_db.clone());

        let uuid = enqueue_email(&ctx, "buyer@example.com").await?;

        let _claimed = store.claim(10, Duration::from_secs(60)).await?;
        store.mark_delivered(uuid).await?;

        let counts = store.counts().await?;

        assert_eq!(counts.delivered, 1, "record should be delivered");
        assert_eq!(counts.pending + counts.in_flight, 0, "nothing left to send");

        Ok(())
    }
}
