//! Notifications Repository

use jiff_sqlx::Timestamp as SqlxTimestamp;
use sqlx::{FromRow, Postgres, Row, Transaction, postgres::PgRow, query, query_as};
use uuid::Uuid;

use crate::domain::{
    notifications::{
        data::NewNotification,
        records::{NotificationRecord, NotificationUuid},
    },
    users::records::UserUuid,
};

const CREATE_NOTIFICATION_SQL: &str = include_str!("sql/create_notification.sql");
const LIST_NOTIFICATIONS_SQL: &str = include_str!("sql/list_notifications.sql");
const MARK_OPENED_SQL: &str = include_str!("sql/mark_opened.sql");

#[derive(Debug, Clone, Default)]
pub(crate) struct PgNotificationsRepository;

impl PgNotificationsRepository {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self
    }

    /// Returns `false` when a notification with the same uuid was already stored.
    pub(crate) async fn create_notification(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        notification: &NewNotification,
    ) -> Result<bool, sqlx::Error> {
        let rows_affected = query(CREATE_NOTIFICATION_SQL)
            .bind(notification.uuid.into_uuid())
            .bind(notification.recipient.into_uuid())
            .bind(notification.sender.map(UserUuid::into_uuid))
            .bind(&notification.title)
            .bind(&notification.content)
            .bind(&notification.kind)
            .bind(notification.entity)
            .execute(&mut **tx)
            .await?
            .rows_affected();

        Ok(rows_affected > 0)
    }

    pub(crate) async fn list_notifications(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        recipient: UserUuid,
    ) -> Result<Vec<NotificationRecord>, sqlx::Error> {
        query_as::<Postgres, NotificationRecord>(LIST_NOTIFICATIONS_SQL)
            .bind(recipient.into_uuid())
            .fetch_all(&mut **tx)
            .await
    }

    pub(crate) async fn mark_opened(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        notification: NotificationUuid,
        recipient: UserUuid,
    ) -> Result<NotificationRecord, sqlx::Error> {
        query_as::<Postgres, NotificationRecord>(MARK_OPENED_SQL)
            .bind(notification.into_uuid())
            .bind(recipient.into_uuid())
            .fetch_one(&mut **tx)
            .await
    }
}

impl<'r> FromRow<'r, PgRow> for NotificationRecord {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        Ok(Self {
            uuid: NotificationUuid::from_uuid(row.try_get("uuid")?),
            recipient_uuid: UserUuid::from_uuid(row.try_get("recipient_uuid")?),
            sender_uuid: row
                .try_get::<Option<Uuid>, _>("sender_uuid")?
                .map(UserUuid::from_uuid),
            title: row.try_get("title")?,
            content: row.try_get("content")?,
            kind: row.try_get("kind")?,
            entity_uuid: row.try_get("entity_uuid")?,
            opened: row.try_get("opened")?,
            created_at: row.try_get::<SqlxTimestamp, _>("created_at")?.to_jiff(),
        })
    }
}
