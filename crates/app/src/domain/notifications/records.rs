//! Notification Records

use jiff::Timestamp;
use uuid::Uuid;

use crate::{domain::users::records::UserUuid, uuids::TypedUuid};

/// Notification UUID
pub type NotificationUuid = TypedUuid<NotificationRecord>;

/// Notification Record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationRecord {
    pub uuid: NotificationUuid,
    pub recipient_uuid: UserUuid,
    pub sender_uuid: Option<UserUuid>,
    pub title: String,
    pub content: String,
    pub kind: String,
    pub entity_uuid: Option<Uuid>,
    pub opened: bool,
    pub created_at: Timestamp,
}
