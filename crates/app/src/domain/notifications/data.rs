//! Notification Data

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::{notifications::records::NotificationUuid, users::records::UserUuid};

/// New Notification Data
///
/// The uuid is fixed when the notification is enqueued, so delivering it twice stores it
/// once.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewNotification {
    pub uuid: NotificationUuid,
    pub recipient: UserUuid,
    pub sender: Option<UserUuid>,
    pub title: String,
    pub content: String,
    pub kind: String,
    pub entity: Option<Uuid>,
}
