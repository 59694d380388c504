//! Notification Index Handler

use std::sync::Arc;

use salvo::{oapi::ToSchema, prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use bazaar_app::domain::notifications::records::NotificationRecord;

use crate::{extensions::*, notifications::errors::into_status_error, state::State};

/// Notification Response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub(crate) struct NotificationResponse {
    pub uuid: Uuid,
    pub sender_id: Option<Uuid>,
    pub title: String,
    pub content: String,
    pub kind: String,

    /// The order the notification is about
    pub entity_id: Option<Uuid>,
    pub opened: bool,
    pub created_at: String,
}

impl From<NotificationRecord> for NotificationResponse {
    fn from(notification: NotificationRecord) -> Self {
        Self {
            uuid: notification.uuid.into_uuid(),
            sender_id: notification.sender_uuid.map(|sender| sender.into_uuid()),
            title: notification.title,
            content: notification.content,
            kind: notification.kind,
            entity_id: notification.entity_uuid,
            opened: notification.opened,
            created_at: notification.created_at.to_string(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct NotificationsResponse {
    /// Newest first
    pub notifications: Vec<NotificationResponse>,
}

/// Notification Index Handler
///
/// Lists the caller's notifications.
#[endpoint(
    tags("notifications"),
    summary = "List Notifications",
    security(("bearer_auth" = []))
)]
pub(crate) async fn handler(
    depot: &mut Depot,
) -> Result<Json<NotificationsResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let principal = depot.principal_or_401()?;

    let notifications = state
        .app
        .notifications
        .list_notifications(principal.tenant, principal.actor)
        .await
        .map_err(into_status_error)?;

    Ok(Json(NotificationsResponse {
        notifications: notifications.into_iter().map(Into::into).collect(),
    }))
}
