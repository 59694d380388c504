//! Notification Opened Handler

use std::sync::Arc;

use salvo::{oapi::extract::PathParam, prelude::*};
use uuid::Uuid;

use crate::{
    extensions::*,
    notifications::{errors::into_status_error, index::NotificationResponse},
    state::State,
};

/// Notification Opened Handler
///
/// Marks one of the caller's notifications as opened. Repeating it is harmless.
#[endpoint(
    tags("notifications"),
    summary = "Mark Notification Opened",
    security(("bearer_auth" = [])),
    responses(
        (status_code = StatusCode::OK, description = "Notification opened"),
        (status_code = StatusCode::NOT_FOUND, description = "Notification not found"),
        (status_code = StatusCode::INTERNAL_SERVER_ERROR, description = "Internal Server Error"),
    ),
)]
pub(crate) async fn handler(
    notification: PathParam<Uuid>,
    depot: &mut Depot,
) -> Result<Json<NotificationResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let principal = depot.principal_or_401()?;

    let notification = state
        .app
        .notifications
        .mark_opened(
            principal.tenant,
            principal.actor,
            notification.into_inner().into(),
        )
        .await
        .map_err(into_status_error)?;

    Ok(Json(notification.into()))
}

#[cfg(test)]
mod tests {
    use salvo::test::{ResponseExt, TestClient};
    use testresult::TestResult;

    use bazaar_app::domain::notifications::{
        NotificationsServiceError, records::NotificationUuid,
    };

    use crate::test_helpers::{MockApp, TEST_TENANT, buyer_actor, make_notification, seller_actor};

    use super::*;

    fn route() -> Router {
        Router::with_path("notifications/{notification}/opened").post(handler)
    }

    #[tokio::test]
    async fn test_mark_opened() -> TestResult {
        let uuid = NotificationUuid::new();
        let mut app = MockApp::new();

        app.notifications
            .expect_mark_opened()
            .once()
            .withf(move |tenant, actor, n| {
                *tenant == TEST_TENANT && *actor == seller_actor() && *n == uuid
            })
            .return_once(move |_, _, _| Ok(make_notification(uuid, true)));

        let mut res = TestClient::post(format!("http://example.com/notifications/{uuid}/opened"))
            .send(&app.service(seller_actor(), route()))
            .await;

        let body: NotificationResponse = res.take_json().await?;

        assert_eq!(res.status_code, Some(StatusCode::OK));
        assert!(body.opened, "notification should be opened");

        Ok(())
    }

    #[tokio::test]
    async fn test_someone_elses_notification_returns_404() -> TestResult {
        let uuid = NotificationUuid::new();
        let mut app = MockApp::new();

        app.notifications
            .expect_mark_opened()
            .once()
            .return_once(|_, _, _| Err(NotificationsServiceError::NotFound));

        let res = TestClient::post(format!("http://example.com/notifications/{uuid}/opened"))
            .send(&app.service(buyer_actor(), route()))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::NOT_FOUND));

        Ok(())
    }
}
