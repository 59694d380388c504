//! Notifications service.

use async_trait::async_trait;
use mockall::automock;

use crate::{
    database::Db,
    domain::{
        notifications::{
            data::NewNotification,
            errors::NotificationsServiceError,
            records::{NotificationRecord, NotificationUuid},
            repository::PgNotificationsRepository,
        },
        tenants::records::TenantUuid,
        users::records::Actor,
    },
};

#[derive(Debug, Clone)]
pub struct PgNotificationsService {
    db: Db,
    repository: PgNotificationsRepository,
}

impl PgNotificationsService {
    #[must_use]
    pub fn new(db: Db) -> Self {
        Self {
            db,
            repository: PgNotificationsRepository::new(),
        }
    }
}

#[async_trait]
impl NotificationsService for PgNotificationsService {
    async fn create_notification(
        &self,
        tenant: TenantUuid,
        notification: NewNotification,
    ) -> Result<bool, NotificationsServiceError> {
        let mut tx = self.db.begin_tenant_transaction(tenant).await?;

        let created = self
            .repository
            .create_notification(&mut tx, &notification)
            .await?;

        tx.commit().await?;

        Ok(created)
    }

    async fn list_notifications(
        &self,
        tenant: TenantUuid,
        actor: Actor,
    ) -> Result<Vec<NotificationRecord>, NotificationsServiceError> {
        let mut tx = self.db.begin_tenant_transaction(tenant).await?;

        let notifications = self
            .repository
            .list_notifications(&mut tx, actor.uuid)
            .await?;

        tx.commit().await?;

        Ok(notifications)
    }

    async fn mark_opened(
        &self,
        tenant: TenantUuid,
        actor: Actor,
        notification: NotificationUuid,
    ) -> Result<NotificationRecord, NotificationsServiceError> {
        let mut tx = self.db.begin_tenant_transaction(tenant).await?;

        let opened = self
            .repository
            .mark_opened(&mut tx, notification, actor.uuid)
            .await?;

        tx.commit().await?;

        Ok(opened)
    }
}

#[automock]
#[async_trait]
pub trait NotificationsService: Send + Sync {
    /// Stores a notification. Returns `false` if it had already been stored.
    async fn create_notification(
        &self,
        tenant: TenantUuid,
        notification: NewNotification,
    ) -> Result<bool, NotificationsServiceError>;

    /// Lists the acting user's notifications, newest first.
    async fn list_notifications(
        &self,
        tenant: TenantUuid,
        actor: Actor,
    ) -> Result<Vec<NotificationRecord>, NotificationsServiceError>;

    async fn mark_opened(
        &self,
        tenant: TenantUuid,
        actor: Actor,
        notification: NotificationUuid,
    ) -> Result<NotificationRecord, NotificationsServiceError>;
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;
    use uuid::Uuid;

    use crate::{domain::users::records::UserRole, test::TestContext};

    use super::*;

    fn notification_for(actor: Actor) -> NewNotification {
        NewNotification {
            uuid: NotificationUuid::new(),
            recipient: actor.uuid,
            sender: None,
            title: "Order Notification".to_string(),
            content: "Got new order".to_string(),
            kind: "Product order".to_string(),
            entity: Some(Uuid::now_v7()),
        }
    }

    #[tokio::test]
    async fn redelivered_notifications_are_stored_once() -> TestResult {
        let ctx = TestContext::new().await;
        let seller = ctx.create_user(UserRole::Seller).await;
        let notification = notification_for(seller.actor());

        let first = ctx
            .notifications
            .create_notification(ctx.tenant_uuid, notification.clone())
            .await?;
        let second = ctx
            .notifications
            .create_notification(ctx.tenant_uuid, notification)
            .await?;

        assert!(first, "first delivery should store the notification");
        assert!(!second, "second delivery should be a no-op");

        let listed = ctx
            .notifications
            .list_notifications(ctx.tenant_uuid, seller.actor())
            .await?;

        assert_eq!(listed.len(), 1);

        Ok(())
    }

    #[tokio::test]
    async fn users_only_see_their_own_notifications() -> TestResult {
        let ctx = TestContext::new().await;
        let seller = ctx.create_user(UserRole::Seller).await;
        let other = ctx.create_user(UserRole::Seller).await;

        ctx.notifications
            .create_notification(ctx.tenant_uuid, notification_for(seller.actor()))
            .await?;

        let listed = ctx
            .notifications
            .list_notifications(ctx.tenant_uuid, other.actor())
            .await?;

        assert!(listed.is_empty());

        Ok(())
    }

    #[tokio::test]
    async fn mark_opened_flags_the_notification() -> TestResult {
        let ctx = TestContext::new().await;
        let seller = ctx.create_user(UserRole::Seller).await;
        let notification = notification_for(seller.actor());

        ctx.notifications
            .create_notification(ctx.tenant_uuid, notification.clone())
            .await?;

        let opened = ctx
            .notifications
            .mark_opened(ctx.tenant_uuid, seller.actor(), notification.uuid)
            .await?;

        assert!(opened.opened);

        let stranger = ctx.create_user(UserRole::Buyer).await;
        let result = ctx
            .notifications
            .mark_opened(ctx.tenant_uuid, stranger.actor(), notification.uuid)
            .await;

        assert!(
            matches!(result, Err(NotificationsServiceError::NotFound)),
            "expected NotFound, got {result:?}"
        );

        Ok(())
    }
}
